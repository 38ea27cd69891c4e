// server/src/main.rs

use anyhow::Result;
use env_logger::Env;
use scheduling_server::cli::start_cli;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    start_cli().await
}
