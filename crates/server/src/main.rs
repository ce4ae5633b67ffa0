use clap::Parser;
use tracing_subscriber::EnvFilter;

use rota_server::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rota_core::config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let config = rota_core::Config::from_env();
    cli::dispatch(Cli::parse(), config).await
}
