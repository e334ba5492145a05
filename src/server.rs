//! Process bootstrap
//!
//! [`ServerHandle::start`] wires the database, repositories, services and
//! REST API together. [`open_services`] does the same without the HTTP
//! surface for one-shot commands.

use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::{FinanceServices, SharedFinanceServices};
use crate::config::{AppConfig, LoggingConfig};
use crate::domain::RepositoryProvider;
use crate::infrastructure::{init_database, run_migrations, SeaOrmRepositoryProvider};
use crate::interfaces::http::create_api_router;
use crate::shared::errors::{AppError, InfraError};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// The global recorder can be installed once per process.
fn prometheus_handle() -> Result<PrometheusHandle, InfraError> {
    if let Some(handle) = PROMETHEUS.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| InfraError::Config(format!("install metrics recorder: {}", e)))?;
    Ok(PROMETHEUS.get_or_init(|| handle).clone())
}

/// Connect to the configured database and build the services over it.
pub async fn open_services(
    config: &AppConfig,
    auto_migrate: bool,
) -> Result<(DatabaseConnection, SharedFinanceServices), AppError> {
    let db = init_database(&config.database.to_database_config())
        .await
        .map_err(InfraError::from)?;
    if auto_migrate {
        run_migrations(&db).await.map_err(InfraError::from)?;
    }

    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
    let services = Arc::new(FinanceServices::new(
        repos,
        config.billing.invoice_prefix.clone(),
        config.billing.retry(),
    ));
    Ok((db, services))
}

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run pending migrations before serving.
    pub auto_migrate: bool,
}

pub struct ServerHandle {
    pub services: SharedFinanceServices,
    pub config: AppConfig,
    pub api_port: u16,
    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(options: ServerOptions) -> Result<Self, AppError> {
        let ServerOptions {
            config,
            auto_migrate,
        } = options;

        let prometheus = prometheus_handle()?;
        let (db, services) = open_services(&config, auto_migrate).await?;

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let router = create_api_router(services.clone(), Some(db.clone()), prometheus);

        let api_port = config.server.api_port;
        let api_addr = format!("{}:{}", config.server.api_host, api_port);
        let listener = tokio::net::TcpListener::bind(&api_addr)
            .await
            .map_err(InfraError::from)?;
        info!(address = %api_addr, "REST API listening");
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("REST API received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!(error = %e, "REST API server error");
            }
        });

        Ok(Self {
            services,
            config,
            api_port,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGINT / SIGTERM.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }

    /// Wait for in-flight requests (bounded by `server.shutdown_timeout`)
    /// after shutdown was triggered, then close the database.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            ..
        } = self;

        let drained = shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API stopped"),
                    Err(e) => error!(error = %e, "REST API task panicked"),
                }
            })
            .await;
        if !drained {
            warn!("REST API did not drain before the shutdown timeout");
        }

        match db.close().await {
            Ok(()) => info!("Database connection closed"),
            Err(e) => warn!(error = %e, "Error closing database connection"),
        }
        info!("Shutdown complete");
    }

    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }
}

/// Install the global subscriber on stderr. `RUST_LOG` wins over `logging.level`.
pub fn init_tracing(logging: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let initialized = if logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if initialized.is_err() {
        warn!("Tracing subscriber already installed");
    }
}
