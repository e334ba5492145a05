//! Generation runs against a migrated in-memory SQLite database.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

use tutoring_finance::application::FinanceServices;
use tutoring_finance::domain::{
    ClassTuitionRate, Enrollment, InsertOutcome, PayoutBasis, Period, RateType,
    RepositoryProvider, SessionRecord, SettlementStatus, TeacherRate, TuitionBilling, TutorPayment,
};
use tutoring_finance::shared::errors::DomainError;
use tutoring_finance::shared::retry::RetryConfig;
use tutoring_finance::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};

async fn sqlite_repos() -> Arc<dyn RepositoryProvider> {
    let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
    run_migrations(&db).await.unwrap();
    Arc::new(SeaOrmRepositoryProvider::new(db))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn june() -> Period {
    Period::new(2024, 6).unwrap()
}

async fn seed_class(repos: &Arc<dyn RepositoryProvider>, class_id: i32, students: &[i32]) {
    repos
        .enrollments()
        .set_tuition(ClassTuitionRate {
            class_id,
            amount: 450_000,
        })
        .await
        .unwrap();
    let enrolled_at = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
    for &student_id in students {
        repos
            .enrollments()
            .enroll(Enrollment::new(student_id, class_id, enrolled_at))
            .await
            .unwrap();
    }
}

async fn seed_session(repos: &Arc<dyn RepositoryProvider>, teacher_id: i32, day: u32) {
    repos
        .sessions()
        .record(SessionRecord {
            id: 0,
            teacher_id,
            class_id: 1,
            session_date: date(2024, 6, day),
            start_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
            is_valid: true,
            student_count: 4,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn rerun_billing_skips_existing_invoices() {
    let repos = sqlite_repos().await;
    seed_class(&repos, 1, &[100, 101, 102]).await;
    let services = FinanceServices::new(repos.clone(), "TUI", RetryConfig::with_attempts(1));

    let first = services
        .billing
        .generate_monthly_billing("2024-06", Some(date(2024, 6, 10)), None)
        .await
        .unwrap();
    assert_eq!((first.created, first.skipped), (3, 0));
    assert!(first.failed.is_empty());

    let second = services
        .billing
        .generate_monthly_billing("2024-06", Some(date(2024, 6, 10)), None)
        .await
        .unwrap();
    assert_eq!((second.created, second.skipped), (0, 3));

    let invoices = repos.billings().find_by_month(june()).await.unwrap();
    let numbers: Vec<&str> = invoices.iter().map(|b| b.invoice_number.as_str()).collect();
    assert_eq!(numbers, ["TUI-202406-0001", "TUI-202406-0002", "TUI-202406-0003"]);
    assert!(invoices.iter().all(|b| b.status == SettlementStatus::Pending));
}

#[tokio::test]
async fn unique_index_reports_duplicate_billing() {
    let repos = sqlite_repos().await;
    let billing = TuitionBilling::new_pending(100, 1, june(), 450_000, date(2024, 6, 10), "TUI-202406-0001");

    let first = repos.billings().insert(billing.clone()).await.unwrap();
    assert!(matches!(first, InsertOutcome::Inserted(_)));

    let mut again = billing;
    again.invoice_number = "TUI-202406-0002".to_string();
    let second = repos.billings().insert(again).await.unwrap();
    assert!(second.is_duplicate());
}

#[tokio::test]
async fn invoice_sequence_is_per_month() {
    let repos = sqlite_repos().await;
    let billings = repos.billings();

    assert_eq!(billings.next_invoice_sequence(june()).await.unwrap(), 1);
    assert_eq!(billings.next_invoice_sequence(june()).await.unwrap(), 2);
    assert_eq!(
        billings.next_invoice_sequence(Period::new(2024, 7).unwrap()).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn rerun_payout_skips_existing_payment() {
    let repos = sqlite_repos().await;
    let rate = repos
        .rates()
        .insert(TeacherRate::new(7, RateType::Hourly, 100_000, date(2024, 1, 1)).unwrap())
        .await
        .unwrap();
    seed_session(&repos, 7, 3).await;
    seed_session(&repos, 7, 10).await;
    let services = FinanceServices::new(repos.clone(), "TUI", RetryConfig::with_attempts(1));

    let first = services.payouts.calculate_monthly_tutor_pay("2024-06").await.unwrap();
    assert_eq!((first.created, first.skipped), (1, 0));

    let second = services.payouts.calculate_monthly_tutor_pay("2024-06").await.unwrap();
    assert_eq!((second.created, second.skipped), (0, 1));

    let payouts = repos.payouts().find_by_month(june()).await.unwrap();
    assert_eq!(payouts.len(), 1);
    assert_eq!(payouts[0].amount, 300_000);
    assert_eq!(payouts[0].rate_id, rate.id);

    assert_eq!(repos.payouts().count_by_rate(rate.id).await.unwrap(), 1);
}

#[tokio::test]
async fn unique_index_reports_duplicate_payout() {
    let repos = sqlite_repos().await;
    let rate = repos
        .rates()
        .insert(TeacherRate::new(7, RateType::MonthlyFixed, 2_000_000, date(2024, 1, 1)).unwrap())
        .await
        .unwrap();
    let basis = PayoutBasis {
        sessions_count: 1,
        students_count: 4,
        minutes_taught: 90,
    };
    let payment = TutorPayment::new_pending(7, june(), rate.id, rate.rate(), basis);

    let first = repos.payouts().insert(payment.clone()).await.unwrap();
    assert!(first.inserted().is_some());
    let second = repos.payouts().insert(payment).await.unwrap();
    assert!(second.is_duplicate());
}

#[tokio::test]
async fn stale_overdue_write_does_not_undo_payment() {
    let repos = sqlite_repos().await;
    let billing = TuitionBilling::new_pending(100, 1, june(), 450_000, date(2024, 6, 10), "TUI-202406-0001");
    let pending = repos.billings().insert(billing).await.unwrap().inserted().unwrap();
    let mut stale = pending.clone();

    let mut paid = pending;
    paid.mark_paid("bank_transfer", Utc.with_ymd_and_hms(2024, 6, 9, 10, 0, 0).unwrap())
        .unwrap();
    repos
        .billings()
        .update_status(&paid, SettlementStatus::Pending)
        .await
        .unwrap();

    stale.mark_overdue().unwrap();
    let err = repos
        .billings()
        .update_status(&stale, SettlementStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { ref from, .. } if from == "paid"));

    let stored = repos.billings().find_by_id(paid.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SettlementStatus::Paid);
    assert_eq!(stored.payment_method.as_deref(), Some("bank_transfer"));
    assert_eq!(stored.paid_at, paid.paid_at);
}

#[tokio::test]
async fn status_write_to_missing_payout_is_not_found() {
    let repos = sqlite_repos().await;
    let mut payment = TutorPayment::new_pending(
        7,
        june(),
        1,
        TeacherRate::new(7, RateType::MonthlyFixed, 2_000_000, date(2024, 1, 1)).unwrap().rate(),
        PayoutBasis::default(),
    );
    payment.id = 42;
    payment.cancel().unwrap();

    let err = repos
        .payouts()
        .update_status(&payment, SettlementStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn referenced_rate_is_not_edited_in_place() {
    let repos = sqlite_repos().await;
    let rate = repos
        .rates()
        .insert(TeacherRate::new(7, RateType::Hourly, 100_000, date(2024, 1, 1)).unwrap())
        .await
        .unwrap();

    let mut unused_edit = rate.clone();
    unused_edit.amount = 110_000;
    assert!(repos.rates().update_unused(&unused_edit).await.unwrap());

    let basis = PayoutBasis {
        sessions_count: 1,
        students_count: 4,
        minutes_taught: 60,
    };
    let stored = repos.rates().find_by_id(rate.id).await.unwrap().unwrap();
    repos
        .payouts()
        .insert(TutorPayment::new_pending(7, june(), rate.id, stored.rate(), basis))
        .await
        .unwrap();

    let mut late_edit = stored.clone();
    late_edit.amount = 150_000;
    assert!(!repos.rates().update_unused(&late_edit).await.unwrap());
    let after = repos.rates().find_by_id(rate.id).await.unwrap().unwrap();
    assert_eq!(after.amount, 110_000);
}
