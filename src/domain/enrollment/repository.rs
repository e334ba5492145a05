//! Enrollment repository interface

use async_trait::async_trait;

use super::model::{ClassTuitionRate, Enrollment};
use crate::domain::DomainResult;

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Enrollments in the given classes, or in every class when `class_ids` is `None`.
    async fn find_active(&self, class_ids: Option<&[i32]>) -> DomainResult<Vec<Enrollment>>;

    /// Current tuition for a class, if one has been configured.
    async fn find_tuition(&self, class_id: i32) -> DomainResult<Option<ClassTuitionRate>>;

    async fn find_all_tuition(&self) -> DomainResult<Vec<ClassTuitionRate>>;

    /// Record a join. Re-enrolling an existing (student, class) pair is a no-op.
    async fn enroll(&self, enrollment: Enrollment) -> DomainResult<()>;

    /// Remove an enrollment on withdrawal.
    async fn withdraw(&self, student_id: i32, class_id: i32) -> DomainResult<()>;

    async fn set_tuition(&self, tuition: ClassTuitionRate) -> DomainResult<()>;
}
