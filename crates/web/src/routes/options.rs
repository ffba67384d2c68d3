//! Options panel forms and board measurement

use axum::{extract::State, http::StatusCode, response::Redirect, Form, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use lichess_overlay_core::{BoardRect, RendererKind};

use super::StateView;
use crate::AppState;

/// Checkbox form; an unchecked box sends no field.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub enabled: Option<String>,
}

impl ToggleForm {
    fn is_enabled(&self) -> bool {
        self.enabled.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct RendererForm {
    pub renderer: String,
}

pub async fn set_own_moves(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ToggleForm>,
) -> Redirect {
    debug!(enabled = form.is_enabled(), "Own moves toggled");
    state.round().set_show_own_moves(form.is_enabled());
    Redirect::to("/")
}

pub async fn set_opponent_moves(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ToggleForm>,
) -> Redirect {
    debug!(enabled = form.is_enabled(), "Opponent moves toggled");
    state.round().set_show_opponent_moves(form.is_enabled());
    Redirect::to("/")
}

pub async fn set_renderer(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RendererForm>,
) -> Result<Redirect, (StatusCode, String)> {
    let renderer: RendererKind = form.renderer.parse().map_err(|e: lichess_overlay_core::Error| {
        warn!(renderer = %form.renderer, "Unknown renderer");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;
    state.round().set_renderer(renderer);
    Ok(Redirect::to("/"))
}

/// The page reports the board's bounding box on load and on every resize.
pub async fn resize_board(
    State(state): State<Arc<AppState>>,
    Json(rect): Json<BoardRect>,
) -> Result<Json<StateView>, (StatusCode, String)> {
    rect.validate().map_err(|e| {
        warn!(error = %e, "Rejected board bounds");
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;

    let mut round = state.round();
    round.host_mut().board = Some(rect);
    round.on_resize();
    Ok(Json(StateView::of(&round)))
}
