use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use mathsolve_core::Config;

/// Step-by-step math problem solver over HTTP.
#[derive(Debug, Parser)]
#[command(name = "mathsolve")]
struct Cli {
    /// TOML configuration file. Defaults to `MATHSOLVE_CONFIG` or
    /// `./mathsolve.toml`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration.
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Log at debug level.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => {
            let mut cfg = Config::from_path(path)?;
            cfg.apply_overrides(|key| std::env::var(key).ok())?;
            cfg
        }
        None => Config::load()?,
    };
    if let Some(listen) = cli.listen {
        cfg.server.host = listen.ip().to_string();
        cfg.server.port = listen.port();
    }
    cfg.server.debug |= cli.debug;

    mathsolve_server::init_tracing(cfg.server.debug);
    let (_addr, handle) = mathsolve_server::start(cfg)
        .await
        .context("starting server")?;
    handle.await?;
    Ok(())
}
