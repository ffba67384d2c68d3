use axum::{
    routing::{get, post},
    Router,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::{services::ServeDir, trace::TraceLayer};

use lichess_overlay_core::host::MemoryHost;
use lichess_overlay_core::{OverlayConfig, OverlayRound};

mod page;
mod routes;

use page::PageRound;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

pub type Round = OverlayRound<PageRound, MemoryHost>;

pub struct AppState {
    pub round: Mutex<Round>,
}

impl AppState {
    pub fn new(config: OverlayConfig) -> Self {
        let host = MemoryHost {
            has_side_panel: true,
            ..MemoryHost::default()
        };
        Self {
            round: Mutex::new(OverlayRound::new(PageRound::default(), host, config)),
        }
    }

    /// Locks the round. A poisoned lock is recovered; snapshots only change
    /// on a successful cycle.
    pub fn round(&self) -> MutexGuard<'_, Round> {
        self.round.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/state", get(routes::state))
        .route("/overlay.svg", get(routes::overlay_svg))
        .route("/round/boot", post(routes::boot))
        .route("/round/init", post(routes::init))
        .route("/round/update", post(routes::update))
        .route("/board", post(routes::options::resize_board))
        .route("/options/own", post(routes::options::set_own_moves))
        .route("/options/opponent", post(routes::options::set_opponent_moves))
        .route("/options/renderer", post(routes::options::set_renderer))
        .nest_service("/static", ServeDir::new("crates/web/static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match std::env::var("OVERLAY_CONFIG") {
        Ok(path) => OverlayConfig::from_json_file(&path).expect("Failed to load overlay config"),
        Err(_) => OverlayConfig::default(),
    };
    let addr = std::env::var("OVERLAY_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let state = Arc::new(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!("Server running at http://{}", addr);

    axum::serve(listener, app(state)).await.expect("Server error");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> (Arc<AppState>, Router) {
        let state = Arc::new(AppState::new(OverlayConfig::default()));
        let router = app(state.clone());
        (state, router)
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn board() -> serde_json::Value {
        serde_json::json!({"left": 0.0, "top": 40.0, "right": 480.0, "bottom": 520.0})
    }

    fn init_payload(color: &str) -> serde_json::Value {
        serde_json::json!({
            "steps": [{"ply": 0, "fen": lichess_overlay_core::STARTING_FEN}],
            "game": {"fen": lichess_overlay_core::STARTING_FEN},
            "player": {"color": color}
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (_, app) = test_app();
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_state_before_init() {
        let (_, app) = test_app();
        let response = app.oneshot(get("/state")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let state = json_body(response).await;
        assert_eq!(state["player"], serde_json::Value::Null);
        assert_eq!(state["show_opponent_moves"], true);
        assert_eq!(state["indicators"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_init_then_capture_update() {
        let (state, app) = test_app();

        let response = app.clone().oneshot(json_post("/board", board())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.clone().oneshot(json_post("/round/init", init_payload("black"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["player"], "black");
        assert_eq!(body["rendered"], false);

        let update = serde_json::json!({
            "steps": [
                {"ply": 0, "fen": lichess_overlay_core::STARTING_FEN},
                {"ply": 1, "san": "e4"},
                {"ply": 2, "san": "d5"}
            ],
            "game": {"fen": lichess_overlay_core::STARTING_FEN},
            "player": {"color": "black"}
        });
        let response = app.clone().oneshot(json_post("/round/update", update)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["side_to_move"], "white");
        assert_eq!(body["updates"], 1);
        assert!(body["last_update_at"].is_string());

        let indicators = body["indicators"].as_array().unwrap();
        assert_eq!(indicators.len(), 1);
        assert_eq!(indicators[0]["uci"], "e4d5");
        assert_eq!(indicators[0]["opponent"], true);

        assert!(state.round().host().watermark.is_some());
    }

    #[tokio::test]
    async fn test_oversized_board_rejected() {
        let (state, app) = test_app();
        let huge = serde_json::json!({"left": 0.0, "top": 0.0, "right": 1.0e6, "bottom": 1.0e6});
        let response = app.oneshot(json_post("/board", huge)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(state.round().host().board.is_none());
    }

    #[tokio::test]
    async fn test_overlay_svg() {
        let (_, app) = test_app();

        let response = app.clone().oneshot(get("/overlay.svg")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        app.clone().oneshot(json_post("/board", board())).await.unwrap();
        app.clone().oneshot(json_post("/round/init", init_payload("white"))).await.unwrap();

        let response = app.oneshot(get("/overlay.svg")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/svg+xml"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let svg = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(svg.contains("overlay_svg"));
    }

    #[tokio::test]
    async fn test_option_forms_redirect_and_apply() {
        let (state, app) = test_app();

        let response = app.clone().oneshot(form_post("/options/own", "enabled=on")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

        app.clone().oneshot(form_post("/options/opponent", "")).await.unwrap();
        app.clone()
            .oneshot(form_post("/options/renderer", "renderer=raster"))
            .await
            .unwrap();

        let round = state.round();
        assert!(round.config().show_own_moves);
        assert!(!round.config().show_opponent_moves);
        assert_eq!(round.config().renderer, lichess_overlay_core::RendererKind::Raster);
    }

    #[tokio::test]
    async fn test_unknown_renderer_rejected() {
        let (_, app) = test_app();
        let response = app.oneshot(form_post("/options/renderer", "renderer=webgl")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_update_rejected() {
        let (_, app) = test_app();
        let response = app
            .oneshot(json_post("/round/update", serde_json::json!({"steps": []})))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_index_renders() {
        let (_, app) = test_app();
        app.clone().oneshot(json_post("/board", board())).await.unwrap();
        app.clone().oneshot(json_post("/round/init", init_payload("white"))).await.unwrap();

        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Lichess Overlay (playing white)"));
        assert!(html.contains("<svg"));
    }
}
