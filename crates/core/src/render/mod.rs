//! Overlay render pipeline
//!
//! Two surfaces sit over the board: a vector (SVG) one and a raster (canvas)
//! one. Board updates clear and reuse them; config changes and resizes
//! destroy them so they are rebuilt against fresh geometry and colours.

mod raster;
mod vector;

pub use raster::RasterSurface;
pub use vector::{ArrowMarker, SvgLine, VectorSurface};

use shakmaty::Color;
use tracing::debug;

use crate::board::{square_center, BoardGeometry};
use crate::config::{OverlayConfig, RendererKind};
use crate::moves::MoveIndicator;

pub const RASTER_SURFACE_ID: &str = "overlay_canvas";
pub const VECTOR_SURFACE_ID: &str = "overlay_svg";

/// Own or opponent indicator; selects colour and arrow marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    Own,
    Opponent,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 2] = [IndicatorKind::Own, IndicatorKind::Opponent];

    pub fn of(indicator: &MoveIndicator) -> Self {
        if indicator.is_opponent_move {
            IndicatorKind::Opponent
        } else {
            IndicatorKind::Own
        }
    }

    pub fn is_opponent(&self) -> bool {
        matches!(self, IndicatorKind::Opponent)
    }

    pub fn marker_id(&self) -> &'static str {
        match self {
            IndicatorKind::Own => "arrowhead-g-m",
            IndicatorKind::Opponent => "arrowhead-g-p",
        }
    }
}

/// Placement of a surface over the page.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceStyle {
    pub left: f64,
    pub top: f64,
    pub z_index: u32,
    pub opacity: Option<f64>,
    /// Always false: the board underneath must keep receiving input.
    pub pointer_events: bool,
}

impl SurfaceStyle {
    pub fn over_board(geometry: &BoardGeometry, z_index: u32, opacity: Option<f64>) -> Self {
        Self {
            left: geometry.left,
            top: geometry.top,
            z_index,
            opacity,
            pointer_events: false,
        }
    }

    pub fn css(&self) -> String {
        let mut css = format!(
            "position:absolute;top:{}px;left:{}px;z-index:{};pointer-events:{};",
            self.top,
            self.left,
            self.z_index,
            if self.pointer_events { "auto" } else { "none" }
        );
        if let Some(opacity) = self.opacity {
            css.push_str(&format!("opacity:{};", opacity));
        }
        css
    }
}

#[derive(Debug, Clone)]
pub struct OverlaySurfaces {
    pub vector: VectorSurface,
    pub raster: RasterSurface,
}

impl OverlaySurfaces {
    fn new(geometry: &BoardGeometry, config: &OverlayConfig) -> Self {
        Self {
            vector: VectorSurface::new(geometry, config),
            raster: RasterSurface::new(geometry),
        }
    }

    fn fits(&self, geometry: &BoardGeometry) -> bool {
        self.vector.geometry() == geometry && self.raster.geometry() == geometry
    }

    pub fn is_clear(&self) -> bool {
        self.vector.indicator_count() == 0 && self.raster.is_blank()
    }
}

#[derive(Debug, Default)]
pub struct RenderPipeline {
    surfaces: Option<OverlaySurfaces>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surfaces(&self) -> Option<&OverlaySurfaces> {
        self.surfaces.as_ref()
    }

    /// Returns the surfaces for `geometry`, creating them when missing and
    /// replacing them when the board moved or changed size.
    pub fn ensure_surfaces(
        &mut self,
        geometry: &BoardGeometry,
        config: &OverlayConfig,
    ) -> &mut OverlaySurfaces {
        if self.surfaces.as_ref().is_some_and(|s| !s.fits(geometry)) {
            debug!("Board geometry changed, recreating surfaces");
            self.surfaces = None;
        }

        self.surfaces.get_or_insert_with(|| {
            debug!(size = geometry.board_size(), "Creating overlay surfaces");
            OverlaySurfaces::new(geometry, config)
        })
    }

    /// Wipes both surfaces, creating them first if needed.
    pub fn clear(&mut self, geometry: &BoardGeometry, config: &OverlayConfig) {
        let surfaces = self.ensure_surfaces(geometry, config);
        surfaces.raster.clear();
        surfaces.vector.clear();
    }

    /// Draws one indicator on the surface selected by `config.renderer`.
    pub fn draw(
        &mut self,
        geometry: &BoardGeometry,
        orientation: Color,
        indicator: &MoveIndicator,
        config: &OverlayConfig,
    ) {
        let from = geometry.to_local(square_center(indicator.from, geometry, orientation));
        let to = geometry.to_local(square_center(indicator.to, geometry, orientation));
        let kind = IndicatorKind::of(indicator);
        let surfaces = self.ensure_surfaces(geometry, config);

        match config.renderer {
            RendererKind::Vector => surfaces.vector.draw_line(from, to, kind, config),
            RendererKind::Raster => {
                let color = config.color_for(kind.is_opponent());
                surfaces.raster.stroke_line(from, to, color, config.raster_stroke_width);
                surfaces
                    .raster
                    .stroke_circle(to, config.indicator_radius, color, config.raster_stroke_width);
            }
        }
    }

    /// Drops both surfaces.
    pub fn destroy(&mut self) {
        if self.surfaces.take().is_some() {
            debug!("Destroyed overlay surfaces");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardRect, Point};
    use shakmaty::Square;

    fn geometry(left: f64) -> BoardGeometry {
        BoardGeometry::from_rect(BoardRect {
            left,
            top: 40.0,
            right: left + 480.0,
            bottom: 520.0,
        })
    }

    fn knight_takes_pawn() -> MoveIndicator {
        MoveIndicator {
            from: Square::E4,
            to: Square::D6,
            is_opponent_move: false,
        }
    }

    #[test]
    fn test_ensure_surfaces_reuses() {
        let mut pipeline = RenderPipeline::new();
        let config = OverlayConfig::default();
        let g = geometry(100.0);

        pipeline.draw(&g, Color::White, &knight_takes_pawn(), &config);
        pipeline.ensure_surfaces(&g, &config);
        assert_eq!(pipeline.surfaces().unwrap().vector.indicator_count(), 1);
    }

    #[test]
    fn test_moved_board_recreates_surfaces() {
        let mut pipeline = RenderPipeline::new();
        let config = OverlayConfig::default();

        pipeline.draw(&geometry(100.0), Color::White, &knight_takes_pawn(), &config);
        let surfaces = pipeline.ensure_surfaces(&geometry(140.0), &config);
        assert_eq!(surfaces.vector.indicator_count(), 0);
        assert_eq!(surfaces.vector.style().left, 140.0);
    }

    #[test]
    fn test_vector_draw_uses_local_centres() {
        let mut pipeline = RenderPipeline::new();
        let config = OverlayConfig::default();
        let g = geometry(100.0);

        pipeline.draw(&g, Color::White, &knight_takes_pawn(), &config);
        let surfaces = pipeline.surfaces().unwrap();
        let line = &surfaces.vector.lines()[0];
        assert_eq!(line.from, Point::new(270.0, 270.0));
        assert_eq!(line.to, Point::new(210.0, 150.0));
        assert_eq!(line.kind, IndicatorKind::Own);
        assert!(surfaces.raster.is_blank());
    }

    #[test]
    fn test_black_orientation_flips_drawing() {
        let mut pipeline = RenderPipeline::new();
        let config = OverlayConfig::default();
        let g = geometry(100.0);

        pipeline.draw(&g, Color::Black, &knight_takes_pawn(), &config);
        let line = &pipeline.surfaces().unwrap().vector.lines()[0];
        assert_eq!(line.from, Point::new(210.0, 210.0));
        assert_eq!(line.to, Point::new(270.0, 330.0));
    }

    #[test]
    fn test_raster_draw_adds_destination_circle() {
        let mut pipeline = RenderPipeline::new();
        let config = OverlayConfig {
            renderer: RendererKind::Raster,
            ..OverlayConfig::default()
        };
        let g = geometry(100.0);

        pipeline.draw(&g, Color::White, &knight_takes_pawn(), &config);
        let surfaces = pipeline.surfaces().unwrap();
        assert_eq!(surfaces.vector.indicator_count(), 0);

        let raster = &surfaces.raster;
        // on the circle around d6's centre (210, 150), away from the line
        assert_eq!(raster.pixel(210 + 16, 150), Some(config.own_color.rgba()));
        // inside the circle but off the line
        assert_eq!(raster.pixel(200, 142), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_clear_leaves_markers_and_blank_raster() {
        let mut pipeline = RenderPipeline::new();
        let g = geometry(100.0);
        for renderer in [RendererKind::Vector, RendererKind::Raster] {
            let config = OverlayConfig {
                renderer,
                ..OverlayConfig::default()
            };
            pipeline.draw(&g, Color::White, &knight_takes_pawn(), &config);
        }
        assert!(!pipeline.surfaces().unwrap().is_clear());

        pipeline.clear(&g, &OverlayConfig::default());
        let surfaces = pipeline.surfaces().unwrap();
        assert!(surfaces.is_clear());
        assert_eq!(surfaces.vector.markers().len(), 2);
    }

    #[test]
    fn test_destroy() {
        let mut pipeline = RenderPipeline::new();
        pipeline.clear(&geometry(0.0), &OverlayConfig::default());
        assert!(pipeline.surfaces().is_some());
        pipeline.destroy();
        assert!(pipeline.surfaces().is_none());
    }

    #[test]
    fn test_style_css() {
        let style = SurfaceStyle::over_board(&geometry(100.0), 900, None);
        assert_eq!(
            style.css(),
            "position:absolute;top:40px;left:100px;z-index:900;pointer-events:none;"
        );
    }
}
