// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr};

use secure_file_storage::{
    api::router,
    config::{
        ConfigSource, DEFAULT_CONFIG_NAME, HOST_ENV, LOG_FORMAT_ENV, PORT_ENV,
        STORAGE_CONFIG_NAME_ENV,
    },
    crypto::generate_key,
    state::AppState,
    storage::SecureStorage,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // `gen-key` prints a fresh key for the `sysKey` config field.
    if env::args().nth(1).as_deref() == Some("gen-key") {
        println!("{}", generate_key().to_hex());
        return;
    }

    init_tracing();

    let config_name =
        env::var(STORAGE_CONFIG_NAME_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_NAME.to_string());
    let storage = match SecureStorage::init(ConfigSource::Named(config_name)).await {
        Ok(storage) => storage,
        Err(e) => {
            error!(error = %e, "Secure storage could not be initialized");
            std::process::exit(1);
        }
    };

    let app = router(AppState::new(storage));

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    info!(%addr, "Secure file storage listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if env::var(LOG_FORMAT_ENV).is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
