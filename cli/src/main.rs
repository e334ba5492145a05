//! Tutoring Finance command line
//!
//! ```sh
//! # Serve the REST API
//! finance-cli serve --api-port 8080
//!
//! # Bill June, due on the 10th
//! finance-cli generate-billing --month 2024-06 --due-date 2024-06-10
//!
//! # Tutor pay for June
//! finance-cli calculate-pay --month 2024-06
//!
//! # Reports
//! finance-cli aging --as-of 2024-07-20
//! finance-cli cash-flow --from 2024-01 --to 2024-06
//! finance-cli profitability --from 2024-01 --to 2024-06
//! ```
//!
//! Command results are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use tutoring_finance::domain::PeriodRange;
use tutoring_finance::server::{init_tracing, open_services, ServerHandle, ServerOptions};
use tutoring_finance::{default_config_path, AppConfig};

#[derive(Parser, Debug)]
#[command(
    name = "finance-cli",
    version,
    about = "Tuition billing, tutor payouts and financial reports",
    long_about = "Runs the Tutoring Finance REST API or a single billing, payout or report \
                  command against the configured database.\n\n\
                  Default config: ~/.config/tutoring-finance/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "FINANCE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Skip database migrations on startup.
    #[arg(long, global = true)]
    no_migrate: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration and print the effective settings.
    Check,
    /// Serve the REST API until SIGINT / SIGTERM.
    Serve {
        #[arg(long)]
        api_port: Option<u16>,
    },
    /// Create invoices for every active enrollment in a month.
    GenerateBilling {
        /// Month to bill, YYYY-MM.
        #[arg(long)]
        month: String,
        #[arg(long)]
        due_date: NaiveDate,
        /// Restrict to these classes (repeatable).
        #[arg(long = "class-id")]
        class_ids: Vec<i32>,
    },
    /// Compute tutor pay for a month from valid sessions.
    CalculatePay {
        /// Month to pay, YYYY-MM.
        #[arg(long)]
        month: String,
    },
    /// Flip pending invoices past their due date to overdue.
    SweepOverdue {
        /// Defaults to today.
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Overdue invoices grouped into age buckets.
    Aging {
        /// Defaults to today.
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Monthly inflow, wages, expenses and net over a window.
    CashFlow {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Revenue, costs and margins over a window.
    Profitability {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
}

#[derive(Serialize)]
struct CheckReport {
    config_file: String,
    api_address: String,
    database: String,
    log_level: String,
    invoice_prefix: String,
}

#[derive(Serialize)]
struct SweepReport {
    as_of: NaiveDate,
    updated: u32,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(cli: &Cli) -> (PathBuf, AppConfig) {
    let path = cli.config.clone().unwrap_or_else(default_config_path);
    let loaded = AppConfig::load(&path);

    let mut config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging);

    match loaded {
        Ok(_) => info!(path = %path.display(), "Configuration loaded"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to load config, using defaults"),
    }
    (path, config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let (config_path, mut config) = load_config(&cli);
    let auto_migrate = !cli.no_migrate;

    match cli.command {
        Command::Check => {
            config.validate()?;
            print_json(&CheckReport {
                config_file: config_path.display().to_string(),
                api_address: format!("{}:{}", config.server.api_host, config.server.api_port),
                database: config.database.connection_url(),
                log_level: config.logging.level.clone(),
                invoice_prefix: config.billing.invoice_prefix.clone(),
            })?;
        }
        Command::Serve { api_port } => {
            if let Some(port) = api_port {
                info!(api_port = port, "CLI override");
                config.server.api_port = port;
            }
            let handle = ServerHandle::start(ServerOptions {
                config,
                auto_migrate,
            })
            .await?;
            handle.install_signal_handler();
            info!("Press Ctrl+C to shut down");
            handle.shutdown_signal().wait().await;
            handle.wait().await;
        }
        command => {
            let (db, services) = open_services(&config, auto_migrate).await?;
            let today = Utc::now().date_naive();

            match command {
                Command::GenerateBilling {
                    month,
                    due_date,
                    class_ids,
                } => {
                    let classes = (!class_ids.is_empty()).then_some(class_ids.as_slice());
                    let result = services
                        .billing
                        .generate_monthly_billing(&month, Some(due_date), classes)
                        .await?;
                    print_json(&result)?;
                }
                Command::CalculatePay { month } => {
                    let result = services.payouts.calculate_monthly_tutor_pay(&month).await?;
                    print_json(&result)?;
                }
                Command::SweepOverdue { as_of } => {
                    let as_of = as_of.unwrap_or(today);
                    let updated = services.billing.sweep_overdue(as_of).await?;
                    print_json(&SweepReport { as_of, updated })?;
                }
                Command::Aging { as_of } => {
                    let summary = services.aging.report(as_of.unwrap_or(today)).await?;
                    print_json(&summary)?;
                }
                Command::CashFlow { from, to } => {
                    let window = PeriodRange::parse(&from, &to)?;
                    print_json(&services.reports.cash_flow_series(window).await?)?;
                }
                Command::Profitability { from, to } => {
                    let window = PeriodRange::parse(&from, &to)?;
                    print_json(&services.reports.profitability(window).await?)?;
                }
                Command::Check | Command::Serve { .. } => {}
            }

            db.close().await?;
        }
    }

    Ok(())
}
