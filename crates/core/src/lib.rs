//! Lichess Overlay Core Library
//!
//! Keeps a shadow copy of a host-driven chess game, works out which captures
//! are available to either side, and draws them as indicators on vector or
//! raster surfaces laid over the host's board.

pub mod board;
pub mod config;
pub mod error;
pub mod host;
pub mod moves;
pub mod overlay;
pub mod parser;
pub mod render;
pub mod tracker;

pub use board::{BoardGeometry, BoardRect, Point, RulesAdapter};
pub use config::{HexColor, OverlayConfig, RendererKind};
pub use error::{Error, Result};
pub use host::{BoardUpdate, HostView, OverlayRound, RoundController};
pub use moves::{enumerate, MoveIndicator};
pub use overlay::{CycleOutcome, OverlaySession};
pub use render::RenderPipeline;
pub use tracker::{GameSnapshot, ShadowTracker, Step};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
