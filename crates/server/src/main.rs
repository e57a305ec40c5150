//! feedline server entry point.
//!
//! Serves the feed endpoint and archive pages over HTTP. Logs go to stderr
//! as JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use feedline_core::{AppConfig, Db};
use tracing_subscriber::EnvFilter;

mod archive;
mod error;
mod handler;
mod nonce;
mod provider;

use handler::AppState;
use nonce::{DisabledNonce, HmacNonce, NonceVerifier};
use provider::FeedProvider;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let db = Db::open(&config.db_path)
        .await
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;

    let nonces: Arc<dyn NonceVerifier> = match config.nonce_secret.as_deref() {
        Some(secret) => Arc::new(HmacNonce::new(secret.as_bytes())?),
        None => {
            tracing::warn!("no nonce_secret configured; feed requests are not verified");
            Arc::new(DisabledNonce)
        }
    };

    let bind = config.bind.clone();
    let state = AppState { config: Arc::new(config), provider: Arc::new(FeedProvider::new(Arc::new(db))), nonces };
    let app = handler::router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(bind = %bind, "starting feedline server");

    axum::serve(listener, app).with_graceful_shutdown(shutdown()).await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
