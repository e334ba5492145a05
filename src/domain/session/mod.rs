//! Teaching session records
//!
//! Sessions are recorded by the attendance collaborator; payouts read them.

pub mod model;
pub mod repository;

pub use model::SessionRecord;
pub use repository::SessionRepository;
