//! Tuition billing aggregate
//!
//! Contains the TuitionBilling entity, invoice numbering and status transitions.

pub mod model;
pub mod repository;

pub use model::{format_invoice_number, TuitionBilling};
pub use repository::BillingRepository;
