//! `capture` server binary.

use anyhow::Context;
use capture::config::ConfigLoader;
use capture::server::{CaptureService, Server};
use clap::Parser;

mod cli;

use cli::Args;

/// Read from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "capture.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new().with_file(path)?,
        None => ConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE)?,
    };
    let mut config = loader
        .with_dotenv()
        .with_env_prefix("CAPTURE")
        .load_unvalidated()?;
    args.apply(&mut config);
    config.validate().context("invalid configuration")?;

    capture::telemetry::init_logging(&config.logging.to_log_config())?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.socket_addr(),
        route = %config.server.route(),
        store = %config.store.url,
        table = %config.store.table,
        "starting capture service"
    );

    let store = capture::store::connect(&config.store.url, &config.store.table)
        .with_context(|| format!("failed to open store '{}'", config.store.url))?;
    let service = CaptureService::new(&config, store)?;

    Server::new(config.server.clone(), service).run().await?;
    Ok(())
}
