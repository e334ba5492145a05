//! Teacher rate repository interface

use async_trait::async_trait;

use super::model::TeacherRate;
use crate::domain::DomainResult;

#[async_trait]
pub trait RateRepository: Send + Sync {
    /// Full history for a teacher, ordered by effective date then id.
    async fn find_by_teacher(&self, teacher_id: i32) -> DomainResult<Vec<TeacherRate>>;

    /// Every active rate across all teachers.
    async fn find_active(&self) -> DomainResult<Vec<TeacherRate>>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<TeacherRate>>;

    async fn insert(&self, rate: TeacherRate) -> DomainResult<TeacherRate>;

    /// Write an in-place edit only while no payout references the rate.
    /// The check and the write are one atomic step; `false` means a payout
    /// references the rate and nothing was written.
    async fn update_unused(&self, rate: &TeacherRate) -> DomainResult<bool>;

    async fn deactivate(&self, id: i32) -> DomainResult<()>;
}
