//! Shadow copy of the host's game state
//!
//! The host only reports history steps. Every update is replayed from the
//! host's authoritative position into a scratch [`RulesAdapter`], and the
//! snapshot is swapped in only once the whole replay succeeded.

use shakmaty::Color;
use tracing::debug;

use crate::board::RulesAdapter;
use crate::error::Result;

/// One entry of the host's game history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A move in SAN.
    Move(String),
    /// A full position, used by the host for takebacks and jumps.
    Position(String),
}

impl Step {
    /// Builds a step from the host's optional fields; SAN wins over FEN.
    pub fn from_parts(san: Option<&str>, fen: Option<&str>) -> Option<Self> {
        match (san, fen) {
            (Some(san), _) if !san.is_empty() => Some(Step::Move(san.to_string())),
            (_, Some(fen)) if !fen.is_empty() => Some(Step::Position(fen.to_string())),
            _ => None,
        }
    }
}

/// Authoritative copy of the position and whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub board_fen: String,
    pub side_to_move: Color,
    pub player_side: Color,
}

impl GameSnapshot {
    pub fn opponent_side(&self) -> Color {
        self.player_side.other()
    }
}

#[derive(Debug, Clone)]
pub struct ShadowTracker {
    snapshot: GameSnapshot,
}

impl ShadowTracker {
    /// Starts tracking from the host's initial position.
    pub fn new(player_side: Color, initial_fen: &str) -> Result<Self> {
        let adapter = RulesAdapter::from_fen(initial_fen)?;
        Ok(Self {
            snapshot: GameSnapshot {
                board_fen: adapter.fen(),
                side_to_move: adapter.side_to_move(),
                player_side,
            },
        })
    }

    pub fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    pub fn player_side(&self) -> Color {
        self.snapshot.player_side
    }

    /// Replays `steps` on top of `authoritative_fen`.
    ///
    /// Returns `Ok(None)` without touching the snapshot when `steps` is
    /// empty. On error the previous snapshot is kept.
    pub fn apply_update(
        &mut self,
        steps: &[Step],
        authoritative_fen: &str,
    ) -> Result<Option<&GameSnapshot>> {
        if steps.is_empty() {
            return Ok(None);
        }
        self.replay(steps, authoritative_fen).map(Some)
    }

    /// Loads `authoritative_fen`, plays `steps` on it and commits the result.
    /// An empty `steps` commits the authoritative position as is.
    pub fn replay(&mut self, steps: &[Step], authoritative_fen: &str) -> Result<&GameSnapshot> {
        let mut adapter = RulesAdapter::from_fen(authoritative_fen)?;
        for step in steps {
            adapter.apply_step(step)?;
        }

        self.snapshot.board_fen = adapter.fen();
        self.snapshot.side_to_move = adapter.side_to_move();
        debug!(
            fen = %self.snapshot.board_fen,
            turn = ?self.snapshot.side_to_move,
            steps = steps.len(),
            "Replayed host steps"
        );

        Ok(&self.snapshot)
    }
}
