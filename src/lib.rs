//! # Tutoring Finance
//!
//! Tuition billing, tutor compensation and financial reporting for a
//! tutoring center.
//!
//! ## Architecture
//!
//! - **domain**: periods, invoices, payouts, rate history, expenses and repository traits
//! - **application**: billing generator, compensation calculator, aging and reports
//! - **infrastructure**: SeaORM/SQLite and in-memory repository providers
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: process bootstrap shared by the binaries

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use application::{FinanceServices, SharedFinanceServices};
pub use config::{default_config_path, AppConfig};
pub use infrastructure::{
    init_database, run_migrations, DatabaseConfig, InMemoryRepositoryProvider,
    SeaOrmRepositoryProvider,
};
pub use interfaces::http::create_api_router;
