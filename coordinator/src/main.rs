mod config;
mod discovery;
mod dispatcher;
mod error;
mod handlers;
mod orchestrator;
mod partition;
mod routing;
mod state;
mod task_group;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::CoordinatorConfig;
use crate::orchestrator::Orchestrator;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coordinator=debug,tower_http=info")),
        )
        .init();

    // se valida una sola vez; cada petición reutiliza la misma config
    let config = CoordinatorConfig::parse();
    config.validate()?;
    info!(
        "workers por etapa={} map={}:{} shuffle={}:{} reduce={}:{}",
        config.workers,
        config.map_host,
        config.map_port,
        config.shuffle_service,
        config.shuffle_port,
        config.reduce_host,
        config.reduce_port,
    );

    let state = AppState::new(Orchestrator::from_config(&config));
    let app = handlers::build_router(state, config.max_body_bytes);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", config.bind))?;
    info!("coordinador escuchando en {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
