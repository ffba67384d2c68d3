//! Overlay display options

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Which surface indicators are drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Vector,
    Raster,
}

impl RendererKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RendererKind::Vector => "vector",
            RendererKind::Raster => "raster",
        }
    }
}

impl FromStr for RendererKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector" | "svg" => Ok(RendererKind::Vector),
            "raster" | "canvas" => Ok(RendererKind::Raster),
            other => Err(Error::Config(format!("unknown renderer '{}'", other))),
        }
    }
}

/// An opaque `#RRGGBB` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(Error::Config(format!("invalid colour '{}'", s)));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| Error::Config(format!("invalid colour '{}'", s)))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for HexColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

/// Process-wide overlay options. Every change re-renders the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub show_own_moves: bool,
    pub show_opponent_moves: bool,
    pub renderer: RendererKind,
    pub own_color: HexColor,
    pub opponent_color: HexColor,
    /// Radius of the destination circle on the raster surface.
    pub indicator_radius: f64,
    pub vector_stroke_width: f64,
    pub raster_stroke_width: f64,
    pub vector_opacity: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            show_own_moves: false,
            show_opponent_moves: true,
            renderer: RendererKind::Vector,
            own_color: HexColor::new(0x15, 0x78, 0x1B),
            opponent_color: HexColor::new(0x78, 0x1B, 0x15),
            indicator_radius: 16.0,
            vector_stroke_width: 14.6875,
            raster_stroke_width: 5.0,
            vector_opacity: 0.4,
        }
    }
}

impl OverlayConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Colour for own or opponent indicators.
    pub fn color_for(&self, is_opponent_move: bool) -> HexColor {
        if is_opponent_move {
            self.opponent_color
        } else {
            self.own_color
        }
    }

    fn validate(&self) -> Result<()> {
        if self.indicator_radius <= 0.0
            || self.vector_stroke_width <= 0.0
            || self.raster_stroke_width <= 0.0
        {
            return Err(Error::Config("sizes must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.vector_opacity) {
            return Err(Error::Config("opacity must be within 0..=1".to_string()));
        }
        Ok(())
    }
}
