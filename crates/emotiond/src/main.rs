use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod config;
mod engine;
mod error;
mod routes;

use config::{Config, CLASSIFIER_MODEL_PATH, FACE_CASCADE_PATH};
use routes::AppState;

/// Uploads larger than this are rejected before reaching the handler.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("emotiond starting");

    let config = Config::from_env();

    let pool = emotion_store::connect(&config.database_url()).await?;
    emotion_store::init_schema(&pool).await?;

    // Missing artifacts degrade the service instead of failing it closed:
    // `/` reports "Indisponible" and predictions answer 503.
    let engine = match engine::spawn_engine(FACE_CASCADE_PATH, CLASSIFIER_MODEL_PATH) {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "models unavailable, starting degraded");
            None
        }
    };

    let state = AppState { engine, pool };

    let app = Router::new()
        .route("/", get(routes::root))
        .route("/predict_emotion", post(routes::predict_emotion))
        .route("/history", get(routes::history))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "emotiond listening");

    axum::serve(listener, app).await?;

    Ok(())
}
