//! The page's own round controller, which the overlay wraps

use chrono::{DateTime, Utc};
use tracing::debug;

use lichess_overlay_core::{BoardUpdate, Result, RoundController};

#[derive(Debug, Default)]
pub struct PageRound {
    pub booted: bool,
    pub initialized: bool,
    pub updates: usize,
    pub last_fen: Option<String>,
    pub last_update_at: Option<DateTime<Utc>>,
}

impl PageRound {
    fn touch(&mut self, update: &BoardUpdate) {
        self.last_fen = update
            .steps
            .iter()
            .rev()
            .find_map(|s| s.fen.clone())
            .or_else(|| Some(update.game.fen.clone()));
        self.last_update_at = Some(Utc::now());
    }
}

impl RoundController for PageRound {
    fn boot(&mut self, _options: &serde_json::Value) -> Result<()> {
        self.booted = true;
        Ok(())
    }

    fn app(&mut self, init: &BoardUpdate) -> Result<()> {
        self.initialized = true;
        self.touch(init);
        Ok(())
    }

    fn on_change(&mut self, update: &BoardUpdate) {
        self.updates += 1;
        self.touch(update);
        debug!(updates = self.updates, "Page received update");
    }
}
