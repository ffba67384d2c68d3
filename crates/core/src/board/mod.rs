//! Board geometry and the rules-engine adapter

pub mod coords;
pub mod rules;

pub use coords::{
    point_to_square, square_center, square_to_point, BoardGeometry, BoardRect, Point,
    MAX_BOARD_SIZE,
};
pub use rules::{Checkpoint, LegalMove, RulesAdapter};
