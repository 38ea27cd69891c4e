// server/src/cli/handlers.rs

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use lib::config::AppConfig;
use lib::identity::{resolve_role, Authenticator, StaticTokenVerifier};
use lib::storage_engine::create_storage;
use lib::{Database, SystemClock};
use log::{info, warn};
use patient_directory::HttpPatientDirectory;
use serde_yaml2 as serde_yaml;

use crate::rest::{routes, AppState};

pub async fn handle_serve(config: AppConfig) -> Result<()> {
    let ip: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host '{}'", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);

    let db = Database::new(&config, Arc::new(SystemClock)).await.context("failed to open storage")?;
    if config.access.tokens.is_empty() {
        warn!("No bearer tokens configured. Every authenticated endpoint will answer 403.");
    }
    let verifier = Arc::new(StaticTokenVerifier::new(&config.access.tokens));
    let authenticator = Authenticator::new(verifier, config.access.clone());
    let directory = Arc::new(HttpPatientDirectory::new(&config.directory)?);
    let state = AppState::new(db, authenticator, directory, config.public_client.clone());

    let filter = routes(state, config.server.static_dir.clone());
    let (bound, server) = warp::serve(filter)
        .try_bind_with_graceful_shutdown(addr, async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received interrupt, shutting down gracefully...");
            }
        })
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Scheduling API listening on http://{}", bound);
    server.await;
    info!("Server stopped");
    Ok(())
}

pub async fn handle_init_schema(config: AppConfig) -> Result<()> {
    let storage = create_storage(&config.storage).await?;
    storage.init_schema().await?;
    println!("Schema ready on {} storage.", storage.get_type());
    Ok(())
}

pub fn handle_resolve_role(config: &AppConfig, email: &str) -> Result<()> {
    let role = resolve_role(email, &config.access);
    let permitted = lib::identity::is_permitted_principal(email, &config.access);
    println!("{} -> {}{}", email, role, if permitted { "" } else { " (not authorized to sign in)" });
    Ok(())
}

pub fn handle_show_config(config: &AppConfig) -> Result<()> {
    let rendered = serde_yaml::to_string(&config.redacted()).context("failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}
