//! SVG overlay surface
//!
//! Kept as a small element tree: reusable arrow markers under `<defs>` plus
//! one `<line>` per indicator. Serialized on demand with [`VectorSurface::to_svg`].

use crate::board::{BoardGeometry, Point};
use crate::config::{HexColor, OverlayConfig};

use super::{IndicatorKind, SurfaceStyle, VECTOR_SURFACE_ID};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const VECTOR_Z_INDEX: u32 = 1000;

/// Arrow-head template referenced by `marker-end`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowMarker {
    pub kind: IndicatorKind,
    pub color: HexColor,
}

impl ArrowMarker {
    pub fn id(&self) -> &'static str {
        self.kind.marker_id()
    }

    fn to_svg(&self) -> String {
        format!(
            r#"<marker id="{}" orient="auto" markerWidth="4" markerHeight="8" refX="2.05" refY="2.01"><path d="M0,0 V4 L3,2 Z" fill="{}"></path></marker>"#,
            self.id(),
            self.color
        )
    }
}

/// One drawn indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgLine {
    pub from: Point,
    pub to: Point,
    pub kind: IndicatorKind,
    pub stroke: HexColor,
    pub stroke_width: f64,
}

impl SvgLine {
    fn to_svg(&self) -> String {
        format!(
            r#"<line stroke="{}" stroke-width="{}" stroke-linecap="round" marker-end="url(#{})" opacity="1" x1="{}" y1="{}" x2="{}" y2="{}"></line>"#,
            self.stroke,
            self.stroke_width,
            self.kind.marker_id(),
            self.from.x,
            self.from.y,
            self.to.x,
            self.to.y
        )
    }
}

#[derive(Debug, Clone)]
pub struct VectorSurface {
    geometry: BoardGeometry,
    style: SurfaceStyle,
    defs: Vec<ArrowMarker>,
    lines: Vec<SvgLine>,
}

impl VectorSurface {
    /// Surface covering the board, with one marker per indicator kind.
    pub fn new(geometry: &BoardGeometry, config: &OverlayConfig) -> Self {
        let defs = IndicatorKind::ALL
            .into_iter()
            .map(|kind| ArrowMarker {
                kind,
                color: config.color_for(kind.is_opponent()),
            })
            .collect();

        Self {
            geometry: *geometry,
            style: SurfaceStyle::over_board(geometry, VECTOR_Z_INDEX, Some(config.vector_opacity)),
            defs,
            lines: Vec::new(),
        }
    }

    pub fn id(&self) -> &'static str {
        VECTOR_SURFACE_ID
    }

    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    pub fn style(&self) -> &SurfaceStyle {
        &self.style
    }

    pub fn markers(&self) -> &[ArrowMarker] {
        &self.defs
    }

    pub fn lines(&self) -> &[SvgLine] {
        &self.lines
    }

    pub fn indicator_count(&self) -> usize {
        self.lines.len()
    }

    /// Removes every indicator, keeping the marker definitions.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Appends a line between two surface-local points.
    pub fn draw_line(&mut self, from: Point, to: Point, kind: IndicatorKind, config: &OverlayConfig) {
        self.lines.push(SvgLine {
            from,
            to,
            kind,
            stroke: config.color_for(kind.is_opponent()),
            stroke_width: config.vector_stroke_width,
        });
    }

    pub fn to_svg(&self) -> String {
        let size = self.geometry.board_size();
        let mut out = format!(
            r#"<svg id="{}" xmlns="{}" style="{}" width="{}px" height="{}px">"#,
            self.id(),
            SVG_NS,
            self.style.css(),
            size,
            size
        );

        out.push_str("<defs>");
        for marker in &self.defs {
            out.push_str(&marker.to_svg());
        }
        out.push_str("</defs>");

        for line in &self.lines {
            out.push_str(&line.to_svg());
        }

        out.push_str("</svg>");
        out
    }
}
