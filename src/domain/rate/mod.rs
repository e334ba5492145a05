//! Teacher rate aggregate
//!
//! Append-only, effective-dated rate history and the pure resolution rule.

pub mod model;
pub mod repository;

pub use model::{resolve, Rate, RateChange, RateType, TeacherRate};
pub use repository::RateRepository;
