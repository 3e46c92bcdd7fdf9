mod worker;

use anyhow::Result;
use clap::Parser;

use crate::worker::WorkerArgs;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("worker=debug,axum=info")
        .init();

    worker::run(WorkerArgs::parse()).await
}
