//! Host application boundary: update payloads, page access, and the
//! controller decorator

pub mod hook;
mod types;
mod view;

pub use hook::{OverlayRound, RoundController};
pub use types::*;
pub use view::{color_name, HostView, OptionsPanel, MemoryHost, Watermark};
