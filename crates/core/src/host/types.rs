//! Board-update payloads as the host emits them

use serde::{Deserialize, Serialize};
use shakmaty::Color;

use crate::tracker::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostColor {
    White,
    Black,
}

impl HostColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostColor::White => "white",
            HostColor::Black => "black",
        }
    }
}

impl From<HostColor> for Color {
    fn from(color: HostColor) -> Self {
        match color {
            HostColor::White => Color::White,
            HostColor::Black => Color::Black,
        }
    }
}

impl From<Color> for HostColor {
    fn from(color: Color) -> Self {
        match color {
            Color::White => HostColor::White,
            Color::Black => HostColor::Black,
        }
    }
}

/// One history entry. The host sends `san` for moves and `fen` for
/// positions; the first step of a game usually only has `fen`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostStep {
    #[serde(default)]
    pub ply: Option<u32>,
    #[serde(default)]
    pub san: Option<String>,
    #[serde(default)]
    pub fen: Option<String>,
    #[serde(default)]
    pub uci: Option<String>,
}

impl HostStep {
    pub fn san(ply: u32, san: &str) -> Self {
        Self {
            ply: Some(ply),
            san: Some(san.to_string()),
            ..Self::default()
        }
    }

    pub fn fen(ply: u32, fen: &str) -> Self {
        Self {
            ply: Some(ply),
            fen: Some(fen.to_string()),
            ..Self::default()
        }
    }

    pub fn to_step(&self) -> Option<Step> {
        Step::from_parts(self.san.as_deref(), self.fen.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostGame {
    /// Position the step list is replayed from.
    pub fen: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostPlayer {
    pub color: HostColor,
}

/// Payload of the host's "on update" notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUpdate {
    #[serde(default)]
    pub steps: Vec<HostStep>,
    pub game: HostGame,
    pub player: HostPlayer,
}

impl BoardUpdate {
    pub fn player_side(&self) -> Color {
        self.player.color.into()
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
