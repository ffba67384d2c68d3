//! Update orchestration
//!
//! [`OverlaySession`] is the per-game context: options, the shadow tracker,
//! and the render pipeline. Each host update is one cycle of
//! replay → clear → enumerate → draw.

use shakmaty::Color;
use tracing::{debug, error, info};

use crate::board::BoardGeometry;
use crate::config::{OverlayConfig, RendererKind};
use crate::error::{Error, Result};
use crate::host::{BoardUpdate, HostView, OptionsPanel, Watermark};
use crate::moves::{self, MoveIndicator};
use crate::render::{OverlaySurfaces, RenderPipeline};
use crate::tracker::{GameSnapshot, ShadowTracker, Step};

/// Result of one update or re-render.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Nothing to replay; the overlay was left alone.
    Skipped,
    /// The overlay was redrawn with these indicators.
    Rendered(Vec<MoveIndicator>),
}

impl CycleOutcome {
    pub fn indicators(&self) -> &[MoveIndicator] {
        match self {
            CycleOutcome::Skipped => &[],
            CycleOutcome::Rendered(indicators) => indicators,
        }
    }
}

#[derive(Debug)]
pub struct OverlaySession {
    config: OverlayConfig,
    tracker: ShadowTracker,
    pipeline: RenderPipeline,
    indicators: Vec<MoveIndicator>,
}

impl OverlaySession {
    pub fn new(player: Color, initial_fen: &str, config: OverlayConfig) -> Result<Self> {
        Ok(Self {
            config,
            tracker: ShadowTracker::new(player, initial_fen)?,
            pipeline: RenderPipeline::new(),
            indicators: Vec::new(),
        })
    }

    /// Session for the player and position of the host's first update.
    pub fn from_update(update: &BoardUpdate, config: OverlayConfig) -> Result<Self> {
        Self::new(update.player_side(), &update.game.fen, config)
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &GameSnapshot {
        self.tracker.snapshot()
    }

    pub fn player_side(&self) -> Color {
        self.tracker.player_side()
    }

    /// Indicators currently on screen.
    pub fn indicators(&self) -> &[MoveIndicator] {
        &self.indicators
    }

    pub fn surfaces(&self) -> Option<&OverlaySurfaces> {
        self.pipeline.surfaces()
    }

    /// Runs one update cycle for a host notification.
    ///
    /// On failure the snapshot is unchanged; the surfaces may already have
    /// been cleared.
    pub fn on_board_update<H: HostView>(
        &mut self,
        update: &BoardUpdate,
        host: &H,
    ) -> Result<CycleOutcome> {
        if update.steps.is_empty() {
            return Ok(CycleOutcome::Skipped);
        }

        let steps: Vec<Step> = update
            .steps
            .iter()
            .filter_map(|s| {
                let step = s.to_step();
                if step.is_none() {
                    debug!(ply = ?s.ply, "Step has neither SAN nor FEN, skipping it");
                }
                step
            })
            .collect();

        self.tracker.replay(&steps, &update.game.fen)?;
        self.render(host)
    }

    /// Rebuilds the overlay from the last known snapshot, without replaying.
    pub fn rerender<H: HostView>(&mut self, host: &mut H) -> Result<CycleOutcome> {
        self.pipeline.destroy();
        self.mount_chrome(host);
        self.render(host)
    }

    pub fn on_resize<H: HostView>(&mut self, host: &mut H) -> Result<CycleOutcome> {
        debug!("Board resized");
        self.rerender(host)
    }

    pub fn set_show_own_moves<H: HostView>(&mut self, enabled: bool, host: &mut H) -> Result<CycleOutcome> {
        self.config.show_own_moves = enabled;
        self.rerender(host)
    }

    pub fn set_show_opponent_moves<H: HostView>(
        &mut self,
        enabled: bool,
        host: &mut H,
    ) -> Result<CycleOutcome> {
        self.config.show_opponent_moves = enabled;
        self.rerender(host)
    }

    pub fn set_renderer<H: HostView>(&mut self, renderer: RendererKind, host: &mut H) -> Result<CycleOutcome> {
        self.config.renderer = renderer;
        self.rerender(host)
    }

    /// (Re)mounts the watermark and options panel. Missing host elements
    /// are logged and skipped.
    pub fn mount_chrome<H: HostView>(&self, host: &mut H) {
        match host.board_rect() {
            Some(board) => {
                let watermark = Watermark::new(self.player_side(), &board);
                if let Err(e) = host.mount_watermark(watermark) {
                    error!(error = %e, "Unable to create watermark");
                }
            }
            None => error!(error = %Error::MissingBoardElement, "Unable to create watermark"),
        }

        if let Err(e) = host.mount_options(OptionsPanel::from(&self.config)) {
            error!(error = %e, "Unable to create options menu");
        }
    }

    fn render<H: HostView>(&mut self, host: &H) -> Result<CycleOutcome> {
        let rect = host.board_rect().ok_or(Error::MissingBoardElement)?;
        let geometry = BoardGeometry::try_from_rect(rect)?;

        self.pipeline.clear(&geometry, &self.config);
        self.indicators.clear();

        let snapshot = self.tracker.snapshot();
        let indicators = moves::enumerate(snapshot, &self.config)?;
        for indicator in &indicators {
            self.pipeline
                .draw(&geometry, snapshot.player_side, indicator, &self.config);
        }

        info!(
            fen = %snapshot.board_fen,
            indicators = indicators.len(),
            renderer = self.config.renderer.as_str(),
            "Overlay rendered"
        );
        self.indicators = indicators.clone();
        Ok(CycleOutcome::Rendered(indicators))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardRect;
    use crate::host::{HostColor, HostGame, HostPlayer, HostStep, MemoryHost};
    use crate::STARTING_FEN;
    use shakmaty::Square;

    const KNIGHT_VS_PAWN: &str = "4k3/8/3p4/8/4N3/8/8/4K3 w - - 0 1";

    fn host() -> MemoryHost {
        MemoryHost::new(BoardRect {
            left: 0.0,
            top: 0.0,
            right: 480.0,
            bottom: 480.0,
        })
    }

    fn update(fen: &str, steps: Vec<HostStep>, color: HostColor) -> BoardUpdate {
        BoardUpdate {
            steps,
            game: HostGame { fen: fen.to_string() },
            player: HostPlayer { color },
        }
    }

    fn config(own: bool, opponent: bool) -> OverlayConfig {
        OverlayConfig {
            show_own_moves: own,
            show_opponent_moves: opponent,
            ..OverlayConfig::default()
        }
    }

    #[test]
    fn test_empty_steps_skip_render() {
        let mut session = OverlaySession::new(Color::White, STARTING_FEN, config(true, true)).unwrap();
        let before = session.snapshot().clone();

        let outcome = session
            .on_board_update(&update(STARTING_FEN, vec![], HostColor::White), &host())
            .unwrap();
        assert_eq!(outcome, CycleOutcome::Skipped);
        assert_eq!(session.snapshot(), &before);
        assert!(session.surfaces().is_none());
    }

    #[test]
    fn test_steps_without_san_or_fen_still_load_position() {
        let mut session = OverlaySession::new(Color::White, STARTING_FEN, config(true, true)).unwrap();
        let bare = HostStep {
            ply: Some(1),
            ..HostStep::default()
        };

        let outcome = session
            .on_board_update(&update(KNIGHT_VS_PAWN, vec![bare], HostColor::White), &host())
            .unwrap();
        assert_eq!(session.snapshot().board_fen, KNIGHT_VS_PAWN);
        assert_eq!(outcome.indicators().len(), 1);
        assert_eq!(outcome.indicators()[0].uci(), "e4d6");
    }

    #[test]
    fn test_first_move_scenario() {
        let mut session = OverlaySession::new(Color::White, STARTING_FEN, config(true, true)).unwrap();
        let outcome = session
            .on_board_update(
                &update(STARTING_FEN, vec![HostStep::fen(0, STARTING_FEN), HostStep::san(1, "e4")], HostColor::White),
                &host(),
            )
            .unwrap();

        assert_eq!(outcome, CycleOutcome::Rendered(vec![]));
        assert!(session.snapshot().board_fen.contains("4P3"));
        assert_eq!(session.snapshot().side_to_move, Color::Black);
        assert!(session.surfaces().unwrap().is_clear());
    }

    #[test]
    fn test_knight_scenario_draws_once() {
        let mut session = OverlaySession::new(Color::White, KNIGHT_VS_PAWN, config(true, true)).unwrap();
        let incoming = update(KNIGHT_VS_PAWN, vec![HostStep::fen(0, KNIGHT_VS_PAWN)], HostColor::White);

        let outcome = session.on_board_update(&incoming, &host()).unwrap();
        assert_eq!(
            outcome.indicators(),
            &[MoveIndicator {
                from: Square::E4,
                to: Square::D6,
                is_opponent_move: false,
            }]
        );
        assert_eq!(session.surfaces().unwrap().vector.indicator_count(), 1);
    }

    #[test]
    fn test_repeated_update_does_not_accumulate() {
        let mut session = OverlaySession::new(Color::White, STARTING_FEN, config(true, true)).unwrap();
        let incoming = update(
            STARTING_FEN,
            vec![
                HostStep::san(1, "e4"),
                HostStep::san(2, "d5"),
            ],
            HostColor::White,
        );

        let first = session.on_board_update(&incoming, &host()).unwrap();
        let snapshot = session.snapshot().clone();
        let second = session.on_board_update(&incoming, &host()).unwrap();

        assert_eq!(first, second);
        assert_eq!(session.snapshot(), &snapshot);
        // exd5 for white, dxe4 for black
        assert_eq!(first.indicators().len(), 2);
        assert_eq!(session.surfaces().unwrap().vector.indicator_count(), 2);
    }

    #[test]
    fn test_illegal_step_keeps_snapshot() {
        let mut session = OverlaySession::new(Color::White, STARTING_FEN, config(true, true)).unwrap();
        session
            .on_board_update(&update(STARTING_FEN, vec![HostStep::san(1, "e4")], HostColor::White), &host())
            .unwrap();
        let before = session.snapshot().clone();

        let err = session
            .on_board_update(&update(STARTING_FEN, vec![HostStep::san(1, "e5")], HostColor::White), &host())
            .unwrap_err();
        assert!(err.is_adapter_failure());
        assert_eq!(session.snapshot(), &before);
    }

    #[test]
    fn test_missing_board_aborts_cycle() {
        let mut session = OverlaySession::new(Color::White, STARTING_FEN, config(true, true)).unwrap();
        let err = session
            .on_board_update(
                &update(STARTING_FEN, vec![HostStep::san(1, "e4")], HostColor::White),
                &MemoryHost::default(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::MissingBoardElement));
        // replay still landed
        assert_eq!(session.snapshot().side_to_move, Color::Black);
    }

    #[test]
    fn test_unusable_board_rect_aborts_cycle() {
        let mut session = OverlaySession::new(Color::White, STARTING_FEN, config(true, true)).unwrap();
        let host = MemoryHost::new(BoardRect {
            left: 0.0,
            top: 0.0,
            right: 1.0e6,
            bottom: 1.0e6,
        });
        let err = session
            .on_board_update(&update(STARTING_FEN, vec![HostStep::san(1, "e4")], HostColor::White), &host)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBoard(_)));
        assert!(session.surfaces().is_none());
    }

    #[test]
    fn test_setters_rerender_from_snapshot() {
        let mut host = host();
        let mut session = OverlaySession::new(Color::White, KNIGHT_VS_PAWN, config(false, true)).unwrap();
        session
            .on_board_update(
                &update(KNIGHT_VS_PAWN, vec![HostStep::fen(0, KNIGHT_VS_PAWN)], HostColor::White),
                &host,
            )
            .unwrap();
        assert!(session.indicators().is_empty());

        let outcome = session.set_show_own_moves(true, &mut host).unwrap();
        assert_eq!(outcome.indicators().len(), 1);
        assert_eq!(host.options.as_ref().map(|o| o.show_own_moves), Some(true));
        assert!(host.watermark.is_some());

        session.set_renderer(RendererKind::Raster, &mut host).unwrap();
        let surfaces = session.surfaces().unwrap();
        assert_eq!(surfaces.vector.indicator_count(), 0);
        assert!(!surfaces.raster.is_blank());

        session.set_show_opponent_moves(false, &mut host).unwrap();
        assert!(!session.config().show_opponent_moves);
    }

    #[test]
    fn test_resize_recreates_surfaces() {
        let mut host = host();
        let mut session = OverlaySession::new(Color::Black, KNIGHT_VS_PAWN, config(true, true)).unwrap();
        session.rerender(&mut host).unwrap();
        assert_eq!(session.surfaces().unwrap().raster.width(), 480);

        host.board = Some(BoardRect {
            left: 10.0,
            top: 10.0,
            right: 330.0,
            bottom: 330.0,
        });
        session.on_resize(&mut host).unwrap();
        let surfaces = session.surfaces().unwrap();
        assert_eq!(surfaces.raster.width(), 320);
        assert_eq!(surfaces.vector.style().left, 10.0);
        assert_eq!(surfaces.vector.indicator_count(), 1);
    }

    #[test]
    fn test_missing_side_panel_does_not_abort() {
        let mut host = host();
        host.has_side_panel = false;
        let mut session = OverlaySession::new(Color::White, KNIGHT_VS_PAWN, config(true, false)).unwrap();
        let outcome = session.rerender(&mut host).unwrap();
        assert_eq!(outcome.indicators().len(), 1);
        assert!(host.options.is_none());
        assert!(host.watermark.is_some());
    }
}
