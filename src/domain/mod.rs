pub mod batch;
pub mod billing;
pub mod enrollment;
pub mod expense;
pub mod payout;
pub mod period;
pub mod rate;
pub mod repositories;
pub mod session;
pub mod status;

// Re-export commonly used types
pub use batch::{BatchFailure, BatchResult, ItemOutcome};
pub use billing::{BillingRepository, TuitionBilling};
pub use enrollment::{ClassTuitionRate, Enrollment, EnrollmentRepository};
pub use expense::{CategoryType, Expense, ExpenseCategory, ExpenseRepository, RecurringInterval};
pub use payout::{PayoutBasis, PayoutRepository, TutorPayment};
pub use period::{Period, PeriodRange};
pub use rate::{Rate, RateChange, RateRepository, RateType, TeacherRate};
pub use repositories::{DomainResult, InsertOutcome, RepositoryProvider};
pub use session::{SessionRecord, SessionRepository};
pub use status::SettlementStatus;

pub use crate::shared::errors::DomainError;
