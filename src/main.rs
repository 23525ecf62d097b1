//! txdash main entry point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use txdash_api::start_server;
use txdash_config::{Config, ConfigErrorSeverity};
use txdash_core::Dashboard;

#[derive(Parser, Debug)]
#[command(name = "txdash")]
#[command(version = "0.1.0")]
#[command(about = "Transaction dashboard with month, search and page filters over a remote service", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Transaction service base URL, overrides service.base_url
    #[arg(long)]
    service_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (mut config, fallback) = match Config::load(args.config.clone()) {
        Ok(config) => (config, None),
        Err(err) if err.severity() == ConfigErrorSeverity::Warning => (Config::default(), Some(err)),
        Err(err) => {
            eprintln!("{}", err.to_details());
            return Err(err).context("Failed to load configuration");
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level)).init();

    if let Some(err) = fallback {
        log::warn!("{}", err.to_details());
        log::warn!("Using built-in defaults");
    } else {
        log::info!("Config loaded from {}", args.config.display());
    }

    if let Some(url) = args.service_url {
        config.service.base_url = url;
        if let Err(err) = config.validate() {
            log::error!("{}", err.to_details());
            return Err(err).context("Invalid --service-url");
        }
    }
    log::info!(
        "Transaction service at {} (timeout {}s)",
        config.service_base_url(),
        config.service.request_timeout_secs
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let dashboard = Arc::new(Dashboard::from_config(&config).context("Failed to create dashboard")?);
        dashboard.start().await;

        start_server(config, dashboard).await.context("Server failed")
    })
}
