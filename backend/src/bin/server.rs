//! MA Stars HTTP Server Binary
//!
//! Loads the ratings dataset, sets up the HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! DATASET_PATH=data/ratings.json cargo run --bin ma-stars-server
//!
//! # Or point at a TOML file with [repository] and [engine] sections
//! MA_STARS_CONFIG=repository.toml cargo run --bin ma-stars-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: `local` or `json`
//! - `DATASET_PATH`: JSON dataset loaded at startup
//! - `MA_STARS_CONFIG`: Path of the TOML configuration file
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ma_stars::db;
use ma_stars::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting MA Stars HTTP Server");

    db::init_repository()?;
    let repository = Arc::clone(db::get_repository()?);
    let config = db::get_engine_config().clone();
    info!(
        "Repository initialized (proximity threshold {}, top movers {})",
        config.proximity_threshold, config.top_movers
    );

    let state = AppState::with_config(repository, config);
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
