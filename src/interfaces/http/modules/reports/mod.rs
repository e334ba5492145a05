//! Financial report endpoints

pub mod handlers;

pub use handlers::*;
