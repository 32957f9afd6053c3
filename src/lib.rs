//! Pic2Cook: photograph a dish, get a recipe and a grocery list.
//!
//! The uploaded photo is re-encoded as JPEG and sent to a Mistral vision model
//! together with a cooking prompt. The model's reply is normalized by
//! [`normalize::parse_model_output`] into a dish name, an HTML recipe and a
//! grocery list.
//!
//! # Configuration
//!
//! Read from the environment (and `.env`, if present):
//!
//! | Variable                   | Default                  |
//! |----------------------------|--------------------------|
//! | `PIC2COOK_BIND`            | `0.0.0.0`                |
//! | `PIC2COOK_PORT`            | `3000`                   |
//! | `MISTRAL_API_KEY`          | unset                    |
//! | `MISTRAL_BASE_URL`         | `https://api.mistral.ai` |
//! | `MISTRAL_MODEL`            | `pixtral-12b`            |
//! | `PIC2COOK_MAX_IMAGE_BYTES` | `5242880`                |
//! | `MISTRAL_TIMEOUT_SECS`     | `60`                     |
//!
//! Without `MISTRAL_API_KEY`, every request has to send its own key in the
//! `x-mistral-api-key` header.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod error;
pub mod gallery;
pub mod mistral;
pub mod normalize;
pub mod prompt;
pub mod recipes;
pub mod routes;
pub mod state;
pub mod upload;

use config::Config;
use routes::{data_url_handler, examples_handler, health, index, upload_handler};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    // room for multipart framing and base64 inflation
    let body_limit = state.config.max_image_bytes.saturating_mul(2);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/examples", get(examples_handler))
        .route("/api/recipe", post(upload_handler))
        .route("/api/recipe/data-url", post(data_url_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pic2cook=info,tower_http=info")),
        )
        .init();

    info!("Loading configuration...");
    let config = Config::load().context("invalid configuration")?;
    let address = config.address();

    let state = AppState::new(config).context("failed to build Mistral client")?;
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!("Server running on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
