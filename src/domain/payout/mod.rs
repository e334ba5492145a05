//! Tutor payout aggregate

pub mod model;
pub mod repository;

pub use model::{PayoutBasis, TutorPayment};
pub use repository::PayoutRepository;
