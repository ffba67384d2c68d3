//! Decorator around the host's round controller
//!
//! [`OverlayRound`] implements [`RoundController`] itself, forwards every call
//! to the wrapped controller, and runs the overlay around it.

use tracing::{debug, error, info, warn};

use super::{BoardUpdate, HostView};
use crate::config::{OverlayConfig, RendererKind};
use crate::error::Result;
use crate::overlay::{CycleOutcome, OverlaySession};
use shakmaty::Color;

/// Entry points of the host's board controller.
pub trait RoundController {
    /// Boot hook; the overlay passes it through untouched.
    fn boot(&mut self, options: &serde_json::Value) -> Result<()>;

    /// Called once with the initial game data.
    fn app(&mut self, init: &BoardUpdate) -> Result<()>;

    /// Called for every board change.
    fn on_change(&mut self, update: &BoardUpdate);
}

pub struct OverlayRound<C, H> {
    inner: C,
    host: H,
    pending_config: OverlayConfig,
    session: Option<OverlaySession>,
}

impl<C: RoundController, H: HostView> OverlayRound<C, H> {
    pub fn new(inner: C, host: H, config: OverlayConfig) -> Self {
        Self {
            inner,
            host,
            pending_config: config,
            session: None,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// `None` until the host has called [`RoundController::app`].
    pub fn session(&self) -> Option<&OverlaySession> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &OverlayConfig {
        match &self.session {
            Some(session) => session.config(),
            None => &self.pending_config,
        }
    }

    pub fn set_show_own_moves(&mut self, enabled: bool) {
        match self.session.as_mut() {
            Some(session) => log_cycle(session.set_show_own_moves(enabled, &mut self.host)),
            None => self.pending_config.show_own_moves = enabled,
        }
    }

    pub fn set_show_opponent_moves(&mut self, enabled: bool) {
        match self.session.as_mut() {
            Some(session) => log_cycle(session.set_show_opponent_moves(enabled, &mut self.host)),
            None => self.pending_config.show_opponent_moves = enabled,
        }
    }

    pub fn set_renderer(&mut self, renderer: RendererKind) {
        match self.session.as_mut() {
            Some(session) => log_cycle(session.set_renderer(renderer, &mut self.host)),
            None => self.pending_config.renderer = renderer,
        }
    }

    /// Re-renders against freshly measured board geometry.
    pub fn on_resize(&mut self) {
        if let Some(session) = self.session.as_mut() {
            log_cycle(session.on_resize(&mut self.host));
        }
    }

    /// Builds the session from `update`, mounts the chrome and optionally
    /// runs a first cycle. A failure leaves no session; the next update
    /// tries again.
    fn start_session(&mut self, update: &BoardUpdate, render: bool) {
        match OverlaySession::from_update(update, self.config().clone()) {
            Ok(mut session) => {
                session.mount_chrome(&mut self.host);
                if render {
                    log_cycle(session.on_board_update(update, &self.host));
                }
                self.session = Some(session);
            }
            Err(e) => error!(error = %e, "Unable to start overlay session"),
        }
    }
}

impl<C: RoundController, H: HostView> RoundController for OverlayRound<C, H> {
    fn boot(&mut self, options: &serde_json::Value) -> Result<()> {
        debug!(?options, "Round boot");
        self.inner.boot(options)
    }

    fn app(&mut self, init: &BoardUpdate) -> Result<()> {
        info!(player = init.player.color.as_str(), "Round init");
        // black has nothing to react to until the first move arrives
        self.start_session(init, init.player_side() == Color::White);
        self.inner.app(init)
    }

    fn on_change(&mut self, update: &BoardUpdate) {
        match self.session.as_mut() {
            Some(session) => log_cycle(session.on_board_update(update, &self.host)),
            None => self.start_session(update, true),
        }
        self.inner.on_change(update);
    }
}

fn log_cycle(result: Result<CycleOutcome>) {
    match result {
        Ok(CycleOutcome::Skipped) => debug!("No steps, overlay unchanged"),
        Ok(CycleOutcome::Rendered(_)) => {}
        Err(e) if e.is_adapter_failure() => warn!(error = %e, "Update aborted"),
        Err(e) => error!(error = %e, "Update aborted"),
    }
}
