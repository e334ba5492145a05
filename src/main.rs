//! Tutoring Finance server
//!
//! Serves the REST API. Configuration is read from
//! `~/.config/tutoring-finance/config.toml` or `$FINANCE_CONFIG`.

use tracing::{error, info};

use tutoring_finance::server::{init_tracing, ServerHandle, ServerOptions};
use tutoring_finance::{default_config_path, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = default_config_path();

    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg.logging);
            info!(path = %config_path.display(), "Configuration loaded");
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg.logging);
            error!(path = %config_path.display(), error = %e, "Failed to load config, using defaults");
            cfg
        }
    };

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: true,
    })
    .await?;
    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down");

    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}
