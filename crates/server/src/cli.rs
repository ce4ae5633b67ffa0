//! CLI argument parsing and subcommand dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use rota_core::Config;

use crate::startup;

/// rota: agent schedules and the tasks inside them.
#[derive(Parser, Debug)]
#[command(name = "rota-server", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default).
    Serve(ServeArgs),
    /// Print the effective configuration as JSON and exit.
    Config,
}

/// Overrides for values otherwise read from the environment / `.env`.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Bind address (HOST).
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (PORT).
    #[arg(long)]
    pub port: Option<u16>,

    /// "memory" or "file" (STORAGE_BACKEND).
    #[arg(long)]
    pub storage_backend: Option<String>,

    /// Directory for the file backend snapshot (DATA_DIR).
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

impl ServeArgs {
    pub fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(backend) = self.storage_backend {
            config.storage.backend = backend;
        }
        if let Some(dir) = self.data_dir {
            config.storage.data_dir = dir;
        }
    }
}

/// Run the selected subcommand; no subcommand means `serve`.
pub async fn dispatch(cli: Cli, mut config: Config) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => {
            args.apply(&mut config);
            startup::serve(&config).await
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config.summary())?);
            Ok(())
        }
    }
}
