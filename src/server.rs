//! HTTP server bootstrap.
//!
//! [`serve_http`] prepares the storage tree, wires the caption and background
//! services into a [`JobOrchestrator`], and serves the [`api`](crate::api)
//! router until ctrl-c.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{self, AppState};
use crate::config::KeepsakeConfig;
use crate::jobs::JobOrchestrator;
use crate::services;

/// Shared setup: storage dirs, external services, orchestrator.
pub fn build_state(config: &KeepsakeConfig) -> Result<AppState> {
    let paths = config.storage_paths();
    paths.ensure_dirs()?;
    tracing::info!(originals = %paths.originals.display(), "storage ready");

    let captions = services::create_caption_service(&config.caption)?;
    let background = services::create_background_service(
        &config.background,
        (config.collage.width, config.collage.height),
    )?;
    if config.background.endpoint.is_none() {
        tracing::warn!("no background endpoint configured, collages use the solid fallback");
    }

    let orchestrator = JobOrchestrator::from_config(config, captions, background);
    Ok(AppState {
        orchestrator,
        paths: Arc::new(paths),
    })
}

/// Serve the job API over HTTP.
pub async fn serve_http(config: KeepsakeConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = build_state(&config)?;
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "keepsake listening at http://{bind_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
