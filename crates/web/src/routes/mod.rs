use askama::Template;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use lichess_overlay_core::host::color_name;
use lichess_overlay_core::{BoardUpdate, RendererKind, RoundController};

use crate::{AppState, Round};

pub mod options;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub watermark: Option<WatermarkView>,
    pub show_own_moves: bool,
    pub show_opponent_moves: bool,
    pub raster: bool,
    pub fen: String,
    pub svg: String,
    pub raster_pixels: usize,
    pub indicators: Vec<String>,
}

pub struct WatermarkView {
    pub text: String,
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Serialize)]
pub struct IndicatorView {
    pub uci: String,
    pub from: String,
    pub to: String,
    pub opponent: bool,
}

/// JSON view of the round, returned by `/state` and the round endpoints.
#[derive(Debug, Serialize)]
pub struct StateView {
    pub player: Option<&'static str>,
    pub fen: Option<String>,
    pub side_to_move: Option<&'static str>,
    pub renderer: &'static str,
    pub show_own_moves: bool,
    pub show_opponent_moves: bool,
    pub rendered: bool,
    pub indicators: Vec<IndicatorView>,
    pub raster_pixels: usize,
    pub booted: bool,
    pub updates: usize,
    pub host_fen: Option<String>,
    pub last_update_at: Option<String>,
}

impl StateView {
    pub fn of(round: &Round) -> Self {
        let config = round.config();
        let session = round.session();
        let page = round.inner();

        let indicators = session
            .map(|s| {
                s.indicators()
                    .iter()
                    .map(|i| IndicatorView {
                        uci: i.uci(),
                        from: i.from.to_string(),
                        to: i.to.to_string(),
                        opponent: i.is_opponent_move,
                    })
                    .collect()
            })
            .unwrap_or_default();
        let surfaces = session.and_then(|s| s.surfaces());

        Self {
            player: session.map(|s| color_name(s.player_side())),
            fen: session.map(|s| s.snapshot().board_fen.clone()),
            side_to_move: session.map(|s| color_name(s.snapshot().side_to_move)),
            renderer: config.renderer.as_str(),
            show_own_moves: config.show_own_moves,
            show_opponent_moves: config.show_opponent_moves,
            rendered: surfaces.is_some(),
            indicators,
            raster_pixels: surfaces.map(|s| s.raster.painted_pixels()).unwrap_or(0),
            booted: page.booted,
            updates: page.updates,
            host_fen: page.last_fen.clone(),
            last_update_at: page.last_update_at.map(|t| t.to_rfc3339()),
        }
    }
}

type ApiResult = Result<Json<StateView>, (StatusCode, String)>;

pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let round = state.round();
    let config = round.config();
    let session = round.session();
    let surfaces = session.and_then(|s| s.surfaces());

    let template = IndexTemplate {
        title: "Lichess Overlay".to_string(),
        watermark: round.host().watermark.as_ref().map(|w| WatermarkView {
            text: w.text.clone(),
            left: w.left,
            top: w.top,
        }),
        show_own_moves: config.show_own_moves,
        show_opponent_moves: config.show_opponent_moves,
        raster: config.renderer == RendererKind::Raster,
        fen: session
            .map(|s| s.snapshot().board_fen.clone())
            .unwrap_or_default(),
        svg: surfaces.map(|s| s.vector.to_svg()).unwrap_or_default(),
        raster_pixels: surfaces.map(|s| s.raster.painted_pixels()).unwrap_or(0),
        indicators: session
            .map(|s| s.indicators().iter().map(|i| i.uci()).collect())
            .unwrap_or_default(),
    };

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render index");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn state(State(state): State<Arc<AppState>>) -> Json<StateView> {
    Json(StateView::of(&state.round()))
}

pub async fn boot(
    State(state): State<Arc<AppState>>,
    Json(options): Json<serde_json::Value>,
) -> ApiResult {
    let mut round = state.round();
    round
        .boot(&options)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    Ok(Json(StateView::of(&round)))
}

pub async fn init(
    State(state): State<Arc<AppState>>,
    Json(update): Json<BoardUpdate>,
) -> ApiResult {
    let mut round = state.round();
    info!(steps = update.steps.len(), "Init received");
    round
        .app(&update)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    Ok(Json(StateView::of(&round)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Json(update): Json<BoardUpdate>,
) -> Json<StateView> {
    let mut round = state.round();
    round.on_change(&update);
    Json(StateView::of(&round))
}

pub async fn overlay_svg(State(state): State<Arc<AppState>>) -> Response {
    let round = state.round();
    match round.session().and_then(|s| s.surfaces()) {
        Some(surfaces) => (
            [(header::CONTENT_TYPE, "image/svg+xml")],
            surfaces.vector.to_svg(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Overlay not mounted").into_response(),
    }
}
