//! In-memory repository provider
//!
//! Backs tests and local runs. Unique keys are enforced through the DashMap
//! entry API, so concurrent inserts of the same key yield exactly one row.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    BillingRepository, ClassTuitionRate, DomainResult, Enrollment, EnrollmentRepository, Expense,
    ExpenseCategory, ExpenseRepository, InsertOutcome, PayoutRepository, Period, PeriodRange,
    RateRepository, RepositoryProvider, SessionRecord, SessionRepository, SettlementStatus,
    TeacherRate, TuitionBilling, TutorPayment,
};
use crate::shared::errors::DomainError;

/// In-memory storage for development and testing
pub struct InMemoryRepositoryProvider {
    enrollments: DashMap<(i32, i32), Enrollment>,
    tuition: DashMap<i32, ClassTuitionRate>,
    billings: DashMap<i32, TuitionBilling>,
    billing_keys: DashMap<(i32, i32, Period), i32>,
    invoice_sequences: DashMap<Period, u32>,
    rates: DashMap<i32, TeacherRate>,
    payouts: DashMap<i32, TutorPayment>,
    payout_keys: DashMap<(i32, Period), i32>,
    /// Payouts per rate id; its entry lock serializes rate edits with payout inserts.
    rate_usage: DashMap<i32, u64>,
    sessions: DashMap<i32, SessionRecord>,
    expenses: DashMap<i32, Expense>,
    categories: DashMap<i32, ExpenseCategory>,
    billing_counter: AtomicI32,
    rate_counter: AtomicI32,
    payout_counter: AtomicI32,
    session_counter: AtomicI32,
    expense_counter: AtomicI32,
    category_counter: AtomicI32,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self {
            enrollments: DashMap::new(),
            tuition: DashMap::new(),
            billings: DashMap::new(),
            billing_keys: DashMap::new(),
            invoice_sequences: DashMap::new(),
            rates: DashMap::new(),
            payouts: DashMap::new(),
            payout_keys: DashMap::new(),
            rate_usage: DashMap::new(),
            sessions: DashMap::new(),
            expenses: DashMap::new(),
            categories: DashMap::new(),
            billing_counter: AtomicI32::new(1),
            rate_counter: AtomicI32::new(1),
            payout_counter: AtomicI32::new(1),
            session_counter: AtomicI32::new(1),
            expense_counter: AtomicI32::new(1),
            category_counter: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn enrollments(&self) -> &dyn EnrollmentRepository {
        self
    }

    fn billings(&self) -> &dyn BillingRepository {
        self
    }

    fn rates(&self) -> &dyn RateRepository {
        self
    }

    fn payouts(&self) -> &dyn PayoutRepository {
        self
    }

    fn sessions(&self) -> &dyn SessionRepository {
        self
    }

    fn expenses(&self) -> &dyn ExpenseRepository {
        self
    }
}

fn sorted_by_id<T: Clone>(map: &DashMap<i32, T>, keep: impl Fn(&T) -> bool) -> Vec<T> {
    let mut rows: Vec<(i32, T)> = map
        .iter()
        .filter(|e| keep(e.value()))
        .map(|e| (*e.key(), e.value().clone()))
        .collect();
    rows.sort_by_key(|(id, _)| *id);
    rows.into_iter().map(|(_, v)| v).collect()
}

fn paid_within(paid_at: Option<chrono::DateTime<chrono::Utc>>, start: NaiveDate, end: NaiveDate) -> bool {
    paid_at
        .map(|at| {
            let day = at.date_naive();
            day >= start && day <= end
        })
        .unwrap_or(false)
}

// ── Enrollments ────────────────────────────────────────────────

#[async_trait]
impl EnrollmentRepository for InMemoryRepositoryProvider {
    async fn find_active(&self, class_ids: Option<&[i32]>) -> DomainResult<Vec<Enrollment>> {
        let mut rows: Vec<Enrollment> = self
            .enrollments
            .iter()
            .filter(|e| class_ids.map_or(true, |ids| ids.contains(&e.class_id)))
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by_key(|e| (e.class_id, e.student_id));
        Ok(rows)
    }

    async fn find_tuition(&self, class_id: i32) -> DomainResult<Option<ClassTuitionRate>> {
        Ok(self.tuition.get(&class_id).map(|t| t.clone()))
    }

    async fn find_all_tuition(&self) -> DomainResult<Vec<ClassTuitionRate>> {
        Ok(self.tuition.iter().map(|t| t.value().clone()).collect())
    }

    async fn enroll(&self, enrollment: Enrollment) -> DomainResult<()> {
        self.enrollments
            .entry((enrollment.student_id, enrollment.class_id))
            .or_insert(enrollment);
        Ok(())
    }

    async fn withdraw(&self, student_id: i32, class_id: i32) -> DomainResult<()> {
        self.enrollments.remove(&(student_id, class_id));
        Ok(())
    }

    async fn set_tuition(&self, tuition: ClassTuitionRate) -> DomainResult<()> {
        self.tuition.insert(tuition.class_id, tuition);
        Ok(())
    }
}

// ── Billings ───────────────────────────────────────────────────

#[async_trait]
impl BillingRepository for InMemoryRepositoryProvider {
    async fn exists(&self, student_id: i32, class_id: i32, month: Period) -> DomainResult<bool> {
        Ok(self.billing_keys.contains_key(&(student_id, class_id, month)))
    }

    async fn insert(
        &self,
        mut billing: TuitionBilling,
    ) -> DomainResult<InsertOutcome<TuitionBilling>> {
        let key = (billing.student_id, billing.class_id, billing.billing_month);
        match self.billing_keys.entry(key) {
            Entry::Occupied(_) => Ok(InsertOutcome::Duplicate),
            Entry::Vacant(slot) => {
                billing.id = self.billing_counter.fetch_add(1, Ordering::SeqCst);
                self.billings.insert(billing.id, billing.clone());
                slot.insert(billing.id);
                Ok(InsertOutcome::Inserted(billing))
            }
        }
    }

    async fn next_invoice_sequence(&self, month: Period) -> DomainResult<u32> {
        let mut seq = self.invoice_sequences.entry(month).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<TuitionBilling>> {
        Ok(self.billings.get(&id).map(|b| b.clone()))
    }

    async fn update_status(&self, billing: &TuitionBilling, from: SettlementStatus) -> DomainResult<()> {
        let mut stored = self
            .billings
            .get_mut(&billing.id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "TuitionBilling",
                field: "id",
                value: billing.id.to_string(),
            })?;
        if stored.status != from {
            return Err(stored.status.rejected("TuitionBilling", billing.status));
        }
        stored.status = billing.status;
        stored.paid_at = billing.paid_at;
        stored.payment_method = billing.payment_method.clone();
        Ok(())
    }

    async fn find_by_month(&self, month: Period) -> DomainResult<Vec<TuitionBilling>> {
        Ok(sorted_by_id(&self.billings, |b| b.billing_month == month))
    }

    async fn find_in_range(&self, range: PeriodRange) -> DomainResult<Vec<TuitionBilling>> {
        Ok(sorted_by_id(&self.billings, |b| range.contains(&b.billing_month)))
    }

    async fn find_paid_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<TuitionBilling>> {
        Ok(sorted_by_id(&self.billings, |b| {
            b.status == SettlementStatus::Paid && paid_within(b.paid_at, start, end)
        }))
    }

    async fn find_unpaid_due_before(&self, as_of: NaiveDate) -> DomainResult<Vec<TuitionBilling>> {
        Ok(sorted_by_id(&self.billings, |b| b.is_overdue_on(as_of)))
    }
}

// ── Rates ──────────────────────────────────────────────────────

#[async_trait]
impl RateRepository for InMemoryRepositoryProvider {
    async fn find_by_teacher(&self, teacher_id: i32) -> DomainResult<Vec<TeacherRate>> {
        let mut rows = sorted_by_id(&self.rates, |r| r.teacher_id == teacher_id);
        rows.sort_by_key(|r| (r.effective_date, r.id));
        Ok(rows)
    }

    async fn find_active(&self) -> DomainResult<Vec<TeacherRate>> {
        Ok(sorted_by_id(&self.rates, |r| r.is_active))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<TeacherRate>> {
        Ok(self.rates.get(&id).map(|r| r.clone()))
    }

    async fn insert(&self, mut rate: TeacherRate) -> DomainResult<TeacherRate> {
        rate.id = self.rate_counter.fetch_add(1, Ordering::SeqCst);
        self.rates.insert(rate.id, rate.clone());
        Ok(rate)
    }

    async fn update_unused(&self, rate: &TeacherRate) -> DomainResult<bool> {
        let usage = self.rate_usage.entry(rate.id).or_insert(0);
        if *usage > 0 {
            return Ok(false);
        }
        let mut stored = self.rates.get_mut(&rate.id).ok_or_else(|| DomainError::NotFound {
            entity: "TeacherRate",
            field: "id",
            value: rate.id.to_string(),
        })?;
        *stored = rate.clone();
        drop(usage);
        Ok(true)
    }

    async fn deactivate(&self, id: i32) -> DomainResult<()> {
        let mut stored = self.rates.get_mut(&id).ok_or_else(|| DomainError::NotFound {
            entity: "TeacherRate",
            field: "id",
            value: id.to_string(),
        })?;
        stored.is_active = false;
        Ok(())
    }
}

// ── Payouts ────────────────────────────────────────────────────

#[async_trait]
impl PayoutRepository for InMemoryRepositoryProvider {
    async fn exists(&self, teacher_id: i32, month: Period) -> DomainResult<bool> {
        Ok(self.payout_keys.contains_key(&(teacher_id, month)))
    }

    async fn insert(&self, mut payment: TutorPayment) -> DomainResult<InsertOutcome<TutorPayment>> {
        match self.payout_keys.entry((payment.teacher_id, payment.payment_month)) {
            Entry::Occupied(_) => Ok(InsertOutcome::Duplicate),
            Entry::Vacant(slot) => {
                let mut usage = self.rate_usage.entry(payment.rate_id).or_insert(0);
                payment.id = self.payout_counter.fetch_add(1, Ordering::SeqCst);
                self.payouts.insert(payment.id, payment.clone());
                slot.insert(payment.id);
                *usage += 1;
                Ok(InsertOutcome::Inserted(payment))
            }
        }
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<TutorPayment>> {
        Ok(self.payouts.get(&id).map(|p| p.clone()))
    }

    async fn update_status(&self, payment: &TutorPayment, from: SettlementStatus) -> DomainResult<()> {
        let mut stored = self
            .payouts
            .get_mut(&payment.id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "TutorPayment",
                field: "id",
                value: payment.id.to_string(),
            })?;
        if stored.status != from {
            return Err(stored.status.rejected("TutorPayment", payment.status));
        }
        stored.status = payment.status;
        stored.paid_at = payment.paid_at;
        stored.payment_method = payment.payment_method.clone();
        Ok(())
    }

    async fn find_by_month(&self, month: Period) -> DomainResult<Vec<TutorPayment>> {
        Ok(sorted_by_id(&self.payouts, |p| p.payment_month == month))
    }

    async fn find_in_range(&self, range: PeriodRange) -> DomainResult<Vec<TutorPayment>> {
        Ok(sorted_by_id(&self.payouts, |p| range.contains(&p.payment_month)))
    }

    async fn find_paid_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<TutorPayment>> {
        Ok(sorted_by_id(&self.payouts, |p| {
            p.status == SettlementStatus::Paid && paid_within(p.paid_at, start, end)
        }))
    }

    async fn count_by_rate(&self, rate_id: i32) -> DomainResult<u64> {
        Ok(self.rate_usage.get(&rate_id).map_or(0, |n| *n))
    }
}

// ── Sessions ───────────────────────────────────────────────────

#[async_trait]
impl SessionRepository for InMemoryRepositoryProvider {
    async fn find_valid_for_teacher(
        &self,
        teacher_id: i32,
        month: Period,
    ) -> DomainResult<Vec<SessionRecord>> {
        Ok(sorted_by_id(&self.sessions, |s| {
            s.teacher_id == teacher_id && s.is_valid && month.contains(s.session_date)
        }))
    }

    async fn record(&self, mut session: SessionRecord) -> DomainResult<SessionRecord> {
        session.id = self.session_counter.fetch_add(1, Ordering::SeqCst);
        self.sessions.insert(session.id, session.clone());
        Ok(session)
    }
}

// ── Expenses ───────────────────────────────────────────────────

#[async_trait]
impl ExpenseRepository for InMemoryRepositoryProvider {
    async fn insert(&self, mut expense: Expense) -> DomainResult<Expense> {
        expense.id = self.expense_counter.fetch_add(1, Ordering::SeqCst);
        self.expenses.insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn find_relevant(&self, start: NaiveDate, end: NaiveDate) -> DomainResult<Vec<Expense>> {
        Ok(sorted_by_id(&self.expenses, |e| {
            if e.is_recurring() {
                e.expense_date <= end
            } else {
                e.expense_date >= start && e.expense_date <= end
            }
        }))
    }

    async fn find_all(&self) -> DomainResult<Vec<Expense>> {
        Ok(sorted_by_id(&self.expenses, |_| true))
    }

    async fn count_by_category(&self, category_id: i32) -> DomainResult<u64> {
        Ok(self
            .expenses
            .iter()
            .filter(|e| e.category_id == category_id)
            .count() as u64)
    }

    async fn insert_category(&self, mut category: ExpenseCategory) -> DomainResult<ExpenseCategory> {
        if self
            .categories
            .iter()
            .any(|c| c.name == category.name)
        {
            return Err(DomainError::Conflict(format!(
                "expense category '{}' already exists",
                category.name
            )));
        }
        category.id = self.category_counter.fetch_add(1, Ordering::SeqCst);
        self.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_category(&self, id: i32) -> DomainResult<Option<ExpenseCategory>> {
        Ok(self.categories.get(&id).map(|c| c.clone()))
    }

    async fn find_categories(&self) -> DomainResult<Vec<ExpenseCategory>> {
        Ok(sorted_by_id(&self.categories, |_| true))
    }

    async fn delete_category(&self, id: i32) -> DomainResult<()> {
        self.categories
            .remove(&id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "ExpenseCategory",
                field: "id",
                value: id.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn billing(student_id: i32) -> TuitionBilling {
        TuitionBilling::new_pending(
            student_id,
            1,
            Period::parse("2024-06").unwrap(),
            100,
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            format!("INV-202406-{:04}", student_id),
        )
    }

    #[tokio::test]
    async fn duplicate_billing_key_is_reported() {
        let repos = InMemoryRepositoryProvider::new();
        let first = repos.billings().insert(billing(1)).await.unwrap();
        assert!(matches!(first, InsertOutcome::Inserted(ref b) if b.id == 1));
        let second = repos.billings().insert(billing(1)).await.unwrap();
        assert!(second.is_duplicate());
        assert_eq!(repos.billings.len(), 1);
    }

    #[tokio::test]
    async fn invoice_sequence_is_per_month() {
        let repos = InMemoryRepositoryProvider::new();
        let june = Period::parse("2024-06").unwrap();
        let july = june.next();
        assert_eq!(repos.billings().next_invoice_sequence(june).await.unwrap(), 1);
        assert_eq!(repos.billings().next_invoice_sequence(june).await.unwrap(), 2);
        assert_eq!(repos.billings().next_invoice_sequence(july).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn stale_status_write_keeps_recorded_payment() {
        let repos = InMemoryRepositoryProvider::new();
        let pending = repos.billings().insert(billing(1)).await.unwrap().inserted().unwrap();
        let mut stale = pending.clone();

        let mut paid = pending;
        paid.mark_paid("cash", Utc::now()).unwrap();
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
        assert_eq!(stored.payment_method.as_deref(), Some("cash"));
        assert!(stored.paid_at.is_some());
    }

    #[tokio::test]
    async fn enroll_twice_keeps_first_join_date() {
        let repos = InMemoryRepositoryProvider::new();
        let joined = Utc::now();
        repos
            .enrollments()
            .enroll(Enrollment::new(1, 2, joined))
            .await
            .unwrap();
        repos
            .enrollments()
            .enroll(Enrollment::new(1, 2, joined + chrono::Duration::days(3)))
            .await
            .unwrap();
        let active = repos.enrollments().find_active(None).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].enrolled_at, joined);
    }

    #[tokio::test]
    async fn deactivating_unknown_rate_is_not_found() {
        let repos = InMemoryRepositoryProvider::new();
        let err = repos.rates().deactivate(42).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn rate_edit_is_refused_once_a_payout_references_it() {
        use crate::domain::{PayoutBasis, RateType};

        let repos = InMemoryRepositoryProvider::new();
        let june = Period::parse("2024-06").unwrap();
        let rate = repos
            .rates()
            .insert(
                TeacherRate::new(3, RateType::PerStudent, 80_000, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
                    .unwrap(),
            )
            .await
            .unwrap();
        repos
            .payouts()
            .insert(TutorPayment::new_pending(3, june, rate.id, rate.rate(), PayoutBasis::default()))
            .await
            .unwrap();
        assert_eq!(repos.payouts().count_by_rate(rate.id).await.unwrap(), 1);

        let mut edit = rate.clone();
        edit.amount = 95_000;
        assert!(!repos.rates().update_unused(&edit).await.unwrap());
        assert_eq!(repos.rates().find_by_id(rate.id).await.unwrap().unwrap().amount, 80_000);
    }
}
