//! Board-to-screen coordinate mapping

use serde::{Deserialize, Serialize};
use shakmaty::{Color, File, Rank, Square};

use crate::error::{Error, Result};

/// Largest board edge, in pixels, a surface is allocated for.
pub const MAX_BOARD_SIZE: f64 = 8192.0;

/// A point in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding rectangle of the host's board element, as measured by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoardRect {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Rejects rects no surface can be laid over: non-finite edges, an
    /// empty area, or an edge above [`MAX_BOARD_SIZE`].
    pub fn validate(&self) -> Result<()> {
        let edges = [self.left, self.top, self.right, self.bottom];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidBoard("non-finite edge".to_string()));
        }
        let (width, height) = (self.width(), self.height());
        if width <= 0.0 || height <= 0.0 {
            return Err(Error::InvalidBoard(format!("empty area {}x{}", width, height)));
        }
        if width > MAX_BOARD_SIZE || height > MAX_BOARD_SIZE {
            return Err(Error::InvalidBoard(format!(
                "{}x{} exceeds {}px",
                width, height, MAX_BOARD_SIZE
            )));
        }
        Ok(())
    }
}

/// Board bounds plus the derived square size.
///
/// Built fresh from a [`BoardRect`] every render cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub square_size: f64,
}

impl BoardGeometry {
    pub fn from_rect(rect: BoardRect) -> Self {
        Self {
            left: rect.left,
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
            square_size: (rect.right - rect.left) / 8.0,
        }
    }

    /// [`from_rect`](Self::from_rect) for rects that passed
    /// [`BoardRect::validate`].
    pub fn try_from_rect(rect: BoardRect) -> Result<Self> {
        rect.validate()?;
        Ok(Self::from_rect(rect))
    }

    /// Side length of the (square) board.
    pub fn board_size(&self) -> f64 {
        self.right - self.left
    }

    /// Translates a page point into surface-local coordinates.
    pub fn to_local(&self, point: Point) -> Point {
        Point::new(point.x - self.left, point.y - self.top)
    }
}

/// Top-left corner of `square` in page coordinates.
///
/// `orientation` is the color whose perspective the board is drawn from.
pub fn square_to_point(square: Square, geometry: &BoardGeometry, orientation: Color) -> Point {
    let file = u32::from(square.file()) as f64;
    let rank = u32::from(square.rank()) as f64;
    let size = geometry.square_size;

    match orientation {
        Color::White => Point::new(
            geometry.left + file * size,
            geometry.bottom - (rank + 1.0) * size,
        ),
        Color::Black => Point::new(
            geometry.left + (7.0 - file) * size,
            geometry.top + rank * size,
        ),
    }
}

/// Centre of `square` in page coordinates.
pub fn square_center(square: Square, geometry: &BoardGeometry, orientation: Color) -> Point {
    let corner = square_to_point(square, geometry, orientation);
    let half = geometry.square_size * 0.5;
    Point::new(corner.x + half, corner.y + half)
}

/// Square under a page point, or `None` when the point is off the board.
pub fn point_to_square(point: Point, geometry: &BoardGeometry, orientation: Color) -> Option<Square> {
    let size = geometry.square_size;
    if size <= 0.0 {
        return None;
    }

    let col = ((point.x - geometry.left) / size).floor();
    let row = ((point.y - geometry.top) / size).floor();
    if !(0.0..8.0).contains(&col) || !(0.0..8.0).contains(&row) {
        return None;
    }
    let (col, row) = (col as u32, row as u32);

    let (file, rank) = match orientation {
        Color::White => (col, 7 - row),
        Color::Black => (7 - col, row),
    };
    Some(Square::from_coords(File::new(file), Rank::new(rank)))
}
