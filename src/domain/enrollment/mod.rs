//! Enrollment aggregate
//!
//! Enrollments and class tuition are owned by the class-management
//! collaborator; the engine only reads them.

pub mod model;
pub mod repository;

pub use model::{ClassTuitionRate, Enrollment};
pub use repository::EnrollmentRepository;
