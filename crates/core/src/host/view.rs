//! What the overlay needs from the host's page

use shakmaty::Color;

use crate::board::BoardRect;
use crate::config::{OverlayConfig, RendererKind};
use crate::error::{Error, Result};

/// Offset of the watermark above the board's top edge.
const WATERMARK_OFFSET: f64 = 16.0;

/// "Playing as" label anchored just above the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Watermark {
    pub text: String,
    pub left: f64,
    pub top: f64,
}

impl Watermark {
    pub fn new(player: Color, board: &BoardRect) -> Self {
        Self {
            text: format!("Lichess Overlay (playing {})", color_name(player)),
            left: board.left,
            top: board.top - WATERMARK_OFFSET,
        }
    }
}

/// State the options panel shows. `engine_hint` stays disabled.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionsPanel {
    pub show_own_moves: bool,
    pub show_opponent_moves: bool,
    pub engine_hint_available: bool,
    pub renderer: RendererKind,
}

impl From<&OverlayConfig> for OptionsPanel {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            show_own_moves: config.show_own_moves,
            show_opponent_moves: config.show_opponent_moves,
            engine_hint_available: false,
            renderer: config.renderer,
        }
    }
}

/// Host page the overlay is mounted on.
pub trait HostView {
    /// Bounding box of the board element, or `None` if it is not on the page.
    fn board_rect(&self) -> Option<BoardRect>;

    /// Replaces the options panel in the host's side panel.
    fn mount_options(&mut self, panel: OptionsPanel) -> Result<()>;

    /// Replaces the watermark.
    fn mount_watermark(&mut self, watermark: Watermark) -> Result<()>;
}

/// Host page state held in memory. The board rect is whatever was last
/// measured; used by the replay tool, the web harness, and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub board: Option<BoardRect>,
    pub has_side_panel: bool,
    pub options: Option<OptionsPanel>,
    pub watermark: Option<Watermark>,
}

impl MemoryHost {
    pub fn new(board: BoardRect) -> Self {
        Self {
            board: Some(board),
            has_side_panel: true,
            options: None,
            watermark: None,
        }
    }
}

impl HostView for MemoryHost {
    fn board_rect(&self) -> Option<BoardRect> {
        self.board
    }

    fn mount_options(&mut self, panel: OptionsPanel) -> Result<()> {
        if !self.has_side_panel {
            return Err(Error::MissingHostElement("round__side"));
        }
        self.options = Some(panel);
        Ok(())
    }

    fn mount_watermark(&mut self, watermark: Watermark) -> Result<()> {
        self.watermark = Some(watermark);
        Ok(())
    }
}

pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}
