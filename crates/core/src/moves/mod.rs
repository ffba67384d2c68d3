//! Decides which moves get an indicator
//!
//! Only captures are shown: for the viewer's pieces, captures of opponent
//! pieces; for the opponent's pieces, captures of the viewer's pieces.

use shakmaty::{Color, File, Rank, Square};
use tracing::debug;

use crate::board::RulesAdapter;
use crate::config::OverlayConfig;
use crate::error::{Error, Result};
use crate::tracker::GameSnapshot;

/// One arrow to draw, from the viewer's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIndicator {
    pub from: Square,
    pub to: Square,
    pub is_opponent_move: bool,
}

impl MoveIndicator {
    /// `e4d6` style label.
    pub fn uci(&self) -> String {
        format!("{}{}", self.from, self.to)
    }
}

/// Squares in scan order: files a to h, ranks 1 to 8 within each file.
pub fn scan_order() -> impl Iterator<Item = Square> {
    File::ALL
        .into_iter()
        .flat_map(|file| Rank::ALL.into_iter().map(move |rank| Square::from_coords(file, rank)))
}

/// Capture indicators for the snapshot's position under `config`.
pub fn enumerate(snapshot: &GameSnapshot, config: &OverlayConfig) -> Result<Vec<MoveIndicator>> {
    let player = snapshot.player_side;
    let mut adapter = RulesAdapter::from_fen(&snapshot.board_fen)?;
    let baseline = adapter.checkpoint();
    let mut indicators = Vec::new();

    for square in scan_order() {
        adapter.restore(&baseline);

        let piece = match adapter.piece_at(square) {
            Some(piece) => piece,
            None => continue,
        };

        let is_opponent_move = piece.color != player;
        let enabled = if is_opponent_move {
            config.show_opponent_moves
        } else {
            config.show_own_moves
        };
        if !enabled {
            continue;
        }

        let mover = piece.color;
        let victim = mover.other();
        let captures = adapter.with_side_to_move(mover, |a| {
            a.legal_moves_from(square)
                .into_iter()
                .filter(|m| a.piece_at(m.to).map(|p| p.color) == Some(victim))
                .collect::<Vec<_>>()
        });

        let captures = match captures {
            Ok(captures) => captures,
            Err(e @ Error::SideToMove { .. }) => {
                debug!(%square, error = %e, "Skipping square");
                continue;
            }
            Err(e) => return Err(e),
        };

        indicators.extend(captures.into_iter().map(|m| MoveIndicator {
            from: m.from,
            to: m.to,
            is_opponent_move,
        }));
    }

    adapter.restore(&baseline);

    Ok(indicators)
}

/// Convenience for callers holding a color rather than a snapshot.
pub fn enumerate_fen(
    fen: &str,
    player_side: Color,
    config: &OverlayConfig,
) -> Result<Vec<MoveIndicator>> {
    let adapter = RulesAdapter::from_fen(fen)?;
    let snapshot = GameSnapshot {
        board_fen: adapter.fen(),
        side_to_move: adapter.side_to_move(),
        player_side,
    };
    enumerate(&snapshot, config)
}
