//! Canvas-style overlay surface backed by an RGBA pixel buffer

use crate::board::{BoardGeometry, Point, MAX_BOARD_SIZE};
use crate::config::HexColor;

use super::{SurfaceStyle, RASTER_SURFACE_ID};

const RASTER_Z_INDEX: u32 = 900;
const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

#[derive(Debug, Clone)]
pub struct RasterSurface {
    geometry: BoardGeometry,
    style: SurfaceStyle,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterSurface {
    pub fn new(geometry: &BoardGeometry) -> Self {
        let size = surface_size(geometry);
        Self {
            geometry: *geometry,
            style: SurfaceStyle::over_board(geometry, RASTER_Z_INDEX, None),
            width: size,
            height: size,
            pixels: vec![0; (size as usize) * (size as usize) * 4],
        }
    }

    pub fn id(&self) -> &'static str {
        RASTER_SURFACE_ID
    }

    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    pub fn style(&self) -> &SurfaceStyle {
        &self.style
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.offset(x, y);
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(out)
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&b| b == 0)
    }

    pub fn painted_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| *px != TRANSPARENT).count()
    }

    /// Strokes a segment of the given width with round ends.
    pub fn stroke_line(&mut self, from: Point, to: Point, color: HexColor, width: f64) {
        let half = width / 2.0;
        let bounds = (
            from.x.min(to.x) - half,
            from.y.min(to.y) - half,
            from.x.max(to.x) + half,
            from.y.max(to.y) + half,
        );
        self.paint(bounds, color, |p| distance_to_segment(p, from, to) <= half);
    }

    /// Strokes the outline of a circle.
    pub fn stroke_circle(&mut self, center: Point, radius: f64, color: HexColor, width: f64) {
        let half = width / 2.0;
        let reach = radius + half;
        let bounds = (
            center.x - reach,
            center.y - reach,
            center.x + reach,
            center.y + reach,
        );
        self.paint(bounds, color, |p| {
            let d = ((p.x - center.x).powi(2) + (p.y - center.y).powi(2)).sqrt();
            (d - radius).abs() <= half
        });
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Sets every pixel in `bounds` whose centre satisfies `covered`.
    fn paint(&mut self, bounds: (f64, f64, f64, f64), color: HexColor, covered: impl Fn(Point) -> bool) {
        let (x0, y0, x1, y1) = bounds;
        let x_start = x0.floor().max(0.0) as u32;
        let y_start = y0.floor().max(0.0) as u32;
        let x_end = (x1.ceil().max(0.0) as u32).min(self.width);
        let y_end = (y1.ceil().max(0.0) as u32).min(self.height);
        let rgba = color.rgba();

        for py in y_start..y_end {
            for px in x_start..x_end {
                if covered(Point::new(px as f64 + 0.5, py as f64 + 0.5)) {
                    let idx = self.offset(px, py);
                    self.pixels[idx..idx + 4].copy_from_slice(&rgba);
                }
            }
        }
    }
}

/// Pixel edge of the buffer for `geometry`, capped at [`MAX_BOARD_SIZE`].
fn surface_size(geometry: &BoardGeometry) -> u32 {
    geometry.board_size().round().clamp(0.0, MAX_BOARD_SIZE) as u32
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
