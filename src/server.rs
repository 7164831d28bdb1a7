//! Web server for the earthquake map.
//!
//! Every page load runs the feed chain (earthquakes, then plates) on the
//! blocking pool and returns a freshly rendered map. Nothing is cached
//! between requests.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};

use crate::client::{FeedConfig, FeedSource, UsgsClient, load_feeds};
use crate::errors::QuakemapError;
use crate::map::MapSession;
use crate::render::render_page;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub feeds: FeedConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            feeds: FeedConfig::default(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Where each page load fetches its documents from
    source: Arc<dyn FeedSource>,
}

impl AppState {
    #[must_use]
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }
}

/// Errors surfaced to the browser.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// A feed could not be fetched or parsed
    #[error("{0}")]
    Feed(QuakemapError),

    /// The page could not be built
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<QuakemapError> for PageError {
    fn from(e: QuakemapError) -> Self {
        match e {
            QuakemapError::Render(msg) => Self::Internal(msg),
            other => Self::Feed(other),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        tracing::error!("map request failed: {}", self);

        let (status, message) = match &self {
            Self::Feed(_) => (StatusCode::BAD_GATEWAY, "Failed to load earthquake or plate data"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build the map"),
        };

        (status, Html(format!("<div class='error'>{message}</div>"))).into_response()
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/session.json", get(session_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Build the state backed by the USGS HTTP client.
///
/// The blocking client owns its own runtime, so it is constructed on the
/// blocking pool rather than on a runtime worker.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be initialized.
pub async fn app_state(config: FeedConfig) -> anyhow::Result<AppState> {
    let client = tokio::task::spawn_blocking(move || UsgsClient::new(config)).await??;
    Ok(AppState::new(Arc::new(client)))
}

/// Drop a state's feed source on the blocking pool.
///
/// # Errors
///
/// Returns an error if the blocking task panicked.
pub async fn release(state: AppState) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || drop(state)).await?;
    Ok(())
}

/// Start the web server.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = app_state(config.feeds.clone()).await?;

    let app = create_router(state.clone());

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("🌍 quakemap starting at http://{}", addr);

    let served = serve(&addr, app).await;
    release(state).await?;
    served
}

async fn serve(addr: &str, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Fetch both feeds and assemble a session off the async runtime.
async fn build_session(state: &AppState) -> Result<MapSession, PageError> {
    let source = Arc::clone(&state.source);
    let feeds = tokio::task::spawn_blocking(move || load_feeds(source.as_ref()))
        .await
        .map_err(|e| PageError::Internal(format!("fetch task failed: {e}")))??;

    Ok(MapSession::assemble(&feeds))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Main page handler - fetches the feeds and serves the map.
async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let session = build_session(&state).await?;
    tracing::info!(
        "serving map with {} earthquakes",
        session.earthquakes.markers.len()
    );
    Ok(Html(render_page(&session)?))
}

/// Session handler - the same map as JSON.
async fn session_handler(State(state): State<AppState>) -> Result<Json<MapSession>, PageError> {
    Ok(Json(build_session(&state).await?))
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::client::tests::RecordingSource;

    async fn get(source: RecordingSource, uri: &str) -> (StatusCode, String) {
        let app = create_router(AppState::new(Arc::new(source)));
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_index_serves_map() {
        let (status, body) = get(RecordingSource::new(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<div id="map"></div>"#));
        assert!(body.contains("10km NW of X"));
    }

    #[tokio::test]
    async fn test_session_json() {
        let (status, body) = get(RecordingSource::new(), "/session.json").await;
        assert_eq!(status, StatusCode::OK);

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["earthquakes"]["markers"].as_array().unwrap().len(), 3);
        assert_eq!(value["defaultBaseLayer"], "Satellite");
    }

    #[tokio::test]
    async fn test_feed_failure_is_bad_gateway() {
        let source = RecordingSource {
            fail_earthquakes: true,
            ..RecordingSource::new()
        };
        let (status, body) = get(source, "/").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("class='error'"));
    }

    #[tokio::test]
    async fn test_plate_failure_is_bad_gateway() {
        let source = RecordingSource {
            fail_plates: true,
            ..RecordingSource::new()
        };
        let (status, _) = get(source, "/session.json").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_usgs_state_builds_inside_runtime() {
        let state = app_state(FeedConfig::default()).await.unwrap();

        let response = create_router(state.clone())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        release(state).await.unwrap();
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(RecordingSource::new(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}
