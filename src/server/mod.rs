pub mod auth;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::Result;
use crate::config::Settings;
use crate::history::HistoryRecorder;
use crate::http::{Client, Normalizer};
use crate::identity::{IdentityProvider, JwtIdentity};

/// Application state shared across handlers
pub struct AppState {
    pub client: Client,
    pub normalizer: Normalizer,
    pub recorder: HistoryRecorder,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: Client::new(&settings.executor)?,
            normalizer: Normalizer::new(&settings.executor),
            recorder: HistoryRecorder::from_settings(&settings.history),
            identity: Arc::new(JwtIdentity::new(settings.auth.jwt_secret.as_bytes())),
        })
    }
}

pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let public_router = Router::new().route("/api/health", get(handlers::health_check));

    let protected_router = Router::new()
        .route("/api/request", post(handlers::execute_request))
        .route(
            "/api/history",
            get(handlers::list_history).delete(handlers::clear_history),
        )
        .route("/api/history/{id}", delete(handlers::delete_history))
        .route("/api/history/{id}/snippet", get(handlers::history_snippet))
        .route("/api/stats", get(handlers::get_stats))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    public_router
        .merge(protected_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Start the API server and run until Ctrl-C
pub async fn serve(settings: Settings) -> Result<()> {
    let state = Arc::new(AppState::from_settings(&settings)?);
    let router = build_router(state, &settings.server.cors_origins);

    let listener = tokio::net::TcpListener::bind(settings.server.bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    info!("History file: {}", settings.history.file_path().display());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
