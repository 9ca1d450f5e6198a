// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use remote_key_auth::{
    api::router,
    auth::KeyCache,
    config::{Config, LogFormat},
    state::AppState,
    telemetry,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before reading any configuration (including RUST_LOG)
    let dotenv = dotenvy::dotenv();
    telemetry::init(LogFormat::from_env());

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => info!(".env not found, using system environment"),
        Err(e) => warn!(error = %e, "Failed to read .env file"),
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let addr = match config.bind_address() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "Invalid bind address");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = CancellationToken::new();

    // Fail fast: no key, no service
    let key_cache = match KeyCache::connect(config.key_cache_config(), shutdown.clone()).await {
        Ok(cache) => cache,
        Err(e) => {
            error!(
                url = %config.public_key_url,
                error = %e,
                error_code = e.error_code(),
                "Failed loading remote public key"
            );
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new(key_cache, config.token_verifier());
    let app = router(state);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    info!(%addr, "Remote key auth server listening (docs at /docs)");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await;

    // Stops the key refresher
    shutdown.cancel();

    if let Err(e) = result {
        error!(error = %e, "HTTP server failed");
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for shutdown signal");
                // Keep serving until cancelled some other way
                shutdown.cancelled().await;
            }
            info!("Shutdown signal received");
        }
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
