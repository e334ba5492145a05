//! Database entities module

pub mod class_tuition;
pub mod enrollment;
pub mod expense;
pub mod expense_category;
pub mod invoice_sequence;
pub mod session_record;
pub mod teacher_rate;
pub mod tuition_billing;
pub mod tutor_payment;

pub use class_tuition::Entity as ClassTuition;
pub use enrollment::Entity as Enrollment;
pub use expense::Entity as Expense;
pub use expense_category::Entity as ExpenseCategory;
pub use invoice_sequence::Entity as InvoiceSequence;
pub use session_record::Entity as SessionRecord;
pub use teacher_rate::Entity as TeacherRate;
pub use tuition_billing::Entity as TuitionBilling;
pub use tutor_payment::Entity as TutorPayment;
