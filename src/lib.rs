//! Documentation of a short-thought posting board.
//!
//! Clients post short messages ("thoughts"), read the 20 newest, and like them.
//!
//!
//!
//! # API
//! - `GET /`: welcome message and the list of endpoints
//! - `GET /thoughts`: newest 20 thoughts, newest first
//! - `POST /thoughts`: `{"message": "..."}`, 5 to 140 characters, returns 201 with the thought
//! - `POST /thoughts/{thought_id}/like`: adds one heart, returns the updated thought
//!
//! Thoughts serialize as `{id, message, hearts, createdAt}`. Failures are always `{error}`.
//!
//!
//!
//! # Storage
//! - Redis by default, see [`database`]
//! - `THOUGHTS_STORE=memory` swaps in [`memory::MemoryStore`] for local runs without Redis
//! - Handlers only see the [`store::ThoughtStore`] trait
//!
//!
//!
//! # Configuration
//!
//! Environment variables, read once at startup.
//! - `PORT`, default `8080`
//! - `REDIS_URL`, default `redis://127.0.0.1:6379`
//! - `THOUGHTS_STORE`, `redis` or `memory`, default `redis`
//! - `RUST_LOG`, default `info`
//!
//!
//!
//! # Setup
//!
//! Run against a local Redis.
//! ```sh
//! docker run -d -p 6379:6379 redis:7
//! cargo run
//! ```
//!
//! Run without Redis.
//! ```sh
//! THOUGHTS_STORE=memory cargo run
//! ```
//!
//! Include the Redis tests.
//! ```sh
//! cargo test -- --include-ignored
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
};

use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

pub mod config;
pub mod database;
pub mod error;
pub mod memory;
pub mod routes;
pub mod state;
pub mod store;
pub mod thought;
pub mod utils;

use config::Config;
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    routes::router().layer(cors).with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            return std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
