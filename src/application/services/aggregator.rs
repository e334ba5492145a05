//! Period-based financial reporting
//!
//! Collection rate, cash flow, profitability, projected revenue and expense
//! breakdown. Cash flow is cash basis (by `paid_at`); profitability is accrual
//! basis (by billing / payment month).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::domain::{
    CategoryType, DomainResult, Period, PeriodRange, RepositoryProvider, SettlementStatus,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CollectionRate {
    #[schema(value_type = String, example = "2024-01")]
    pub from: Period,
    #[schema(value_type = String, example = "2024-06")]
    pub to: Period,
    pub billed: i64,
    pub collected: i64,
    /// Whole percent in `0..=100`
    pub rate: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyCashFlow {
    #[schema(value_type = String, example = "2024-06")]
    pub month: Period,
    pub inflow: i64,
    pub tutor_wages: i64,
    pub expenses: i64,
    pub net: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Profitability {
    #[schema(value_type = String, example = "2024-01")]
    pub from: Period,
    #[schema(value_type = String, example = "2024-06")]
    pub to: Period,
    pub revenue: i64,
    pub teacher_cost: i64,
    pub expenses: i64,
    pub net_profit: i64,
    /// Whole percent, negative on a loss
    pub net_profit_margin: i64,
    pub revenue_per_student: i64,
    /// Whole percent
    pub teacher_cost_ratio: i64,
    pub student_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProjectedRevenue {
    pub monthly: i64,
    pub annual: i64,
    pub enrollment_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryTotal {
    pub category_type: CategoryType,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExpenseBreakdown {
    #[schema(value_type = String, example = "2024-01")]
    pub from: Period,
    #[schema(value_type = String, example = "2024-06")]
    pub to: Period,
    pub categories: Vec<CategoryTotal>,
    pub total: i64,
}

pub struct FinancialAggregator {
    repos: Arc<dyn RepositoryProvider>,
}

impl FinancialAggregator {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn collection_rate(&self, window: PeriodRange) -> DomainResult<CollectionRate> {
        let billings = self.repos.billings().find_in_range(window).await?;

        let (billed, collected) = billings
            .iter()
            .filter(|b| b.is_billable())
            .fold((0i64, 0i64), |(billed, collected), b| {
                let paid = if b.status == SettlementStatus::Paid {
                    b.amount
                } else {
                    0
                };
                (billed + b.amount, collected + paid)
            });

        let rate = whole_percent(collected, billed).clamp(0, 100);

        debug!(%window, billed, collected, rate, "Collection rate computed");

        Ok(CollectionRate {
            from: window.from,
            to: window.to,
            billed,
            collected,
            rate,
        })
    }

    pub async fn monthly_cash_flow(&self, month: Period) -> DomainResult<MonthlyCashFlow> {
        let (start, end) = (month.first_day(), month.last_day());

        let inflow: i64 = self
            .repos
            .billings()
            .find_paid_between(start, end)
            .await?
            .iter()
            .map(|b| b.amount)
            .sum();
        let tutor_wages: i64 = self
            .repos
            .payouts()
            .find_paid_between(start, end)
            .await?
            .iter()
            .map(|p| p.amount)
            .sum();
        let expenses = self.expenses_in(PeriodRange::single(month)).await?;

        Ok(MonthlyCashFlow {
            month,
            inflow,
            tutor_wages,
            expenses,
            net: inflow - tutor_wages - expenses,
        })
    }

    /// One cash flow entry per month of the window.
    pub async fn cash_flow_series(&self, window: PeriodRange) -> DomainResult<Vec<MonthlyCashFlow>> {
        let mut series = Vec::with_capacity(window.len());
        for month in window.periods() {
            series.push(self.monthly_cash_flow(month).await?);
        }
        Ok(series)
    }

    pub async fn profitability(&self, window: PeriodRange) -> DomainResult<Profitability> {
        let revenue: i64 = self
            .repos
            .billings()
            .find_in_range(window)
            .await?
            .iter()
            .filter(|b| b.is_billable())
            .map(|b| b.amount)
            .sum();
        let teacher_cost: i64 = self
            .repos
            .payouts()
            .find_in_range(window)
            .await?
            .iter()
            .filter(|p| p.is_billable())
            .map(|p| p.amount)
            .sum();
        let expenses = self.expenses_in(window).await?;

        let student_count = self
            .repos
            .enrollments()
            .find_active(None)
            .await?
            .iter()
            .map(|e| e.student_id)
            .collect::<HashSet<_>>()
            .len() as u32;

        let net_profit = revenue - teacher_cost - expenses;
        let revenue_per_student = if student_count == 0 {
            0
        } else {
            revenue / i64::from(student_count)
        };

        Ok(Profitability {
            from: window.from,
            to: window.to,
            revenue,
            teacher_cost,
            expenses,
            net_profit,
            net_profit_margin: whole_percent(net_profit, revenue),
            revenue_per_student,
            teacher_cost_ratio: whole_percent(teacher_cost, revenue),
            student_count,
        })
    }

    /// Monthly tuition expected from current enrollments.
    pub async fn projected_revenue(&self) -> DomainResult<ProjectedRevenue> {
        let tuition: HashMap<i32, i64> = self
            .repos
            .enrollments()
            .find_all_tuition()
            .await?
            .into_iter()
            .map(|t| (t.class_id, t.amount))
            .collect();
        let enrollments = self.repos.enrollments().find_active(None).await?;

        let monthly: i64 = enrollments
            .iter()
            .filter_map(|e| tuition.get(&e.class_id))
            .sum();

        Ok(ProjectedRevenue {
            monthly,
            annual: monthly * 12,
            enrollment_count: enrollments.len() as u32,
        })
    }

    pub async fn expense_breakdown(&self, window: PeriodRange) -> DomainResult<ExpenseBreakdown> {
        let category_types: HashMap<i32, CategoryType> = self
            .repos
            .expenses()
            .find_categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c.category_type))
            .collect();

        let mut totals: BTreeMap<CategoryType, i64> =
            CategoryType::ALL.iter().map(|t| (*t, 0)).collect();
        for expense in self
            .repos
            .expenses()
            .find_relevant(window.start_date(), window.end_date())
            .await?
        {
            match category_types.get(&expense.category_id) {
                Some(category_type) => {
                    *totals.entry(*category_type).or_insert(0) += expense.amount_in(&window);
                }
                None => warn!(
                    expense_id = expense.id,
                    category_id = expense.category_id,
                    "Expense references unknown category"
                ),
            }
        }

        let categories: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category_type, total)| CategoryTotal {
                category_type,
                total,
            })
            .collect();

        Ok(ExpenseBreakdown {
            from: window.from,
            to: window.to,
            total: categories.iter().map(|c| c.total).sum(),
            categories,
        })
    }

    async fn expenses_in(&self, window: PeriodRange) -> DomainResult<i64> {
        Ok(self
            .repos
            .expenses()
            .find_relevant(window.start_date(), window.end_date())
            .await?
            .iter()
            .map(|e| e.amount_in(&window))
            .sum())
    }
}

/// `part / whole × 100`, 0 when `whole` is 0.
fn percent(part: i64, whole: i64) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole)
}

/// [`percent`] rounded half away from zero.
fn whole_percent(part: i64, whole: i64) -> i64 {
    percent(part, whole)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ClassTuitionRate, Enrollment, Expense, ExpenseCategory, PayoutBasis, Rate,
        RecurringInterval, TuitionBilling, TutorPayment,
    };
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(key: &str) -> Period {
        Period::parse(key).unwrap()
    }

    async fn bill(
        repos: &InMemoryRepositoryProvider,
        student_id: i32,
        month: &str,
        amount: i64,
    ) -> TuitionBilling {
        let p = period(month);
        repos
            .billings()
            .insert(TuitionBilling::new_pending(
                student_id,
                1,
                p,
                amount,
                p.clamped_day(10),
                format!("INV-{}-{}", p.compact(), student_id),
            ))
            .await
            .unwrap()
            .inserted()
            .unwrap()
    }

    async fn pay(repos: &InMemoryRepositoryProvider, mut billing: TuitionBilling, on: NaiveDate) {
        let at = Utc.from_utc_datetime(&on.and_hms_opt(12, 0, 0).unwrap());
        billing.mark_paid("cash", at).unwrap();
        repos.billings().update_status(&billing, SettlementStatus::Pending).await.unwrap();
    }

    #[tokio::test]
    async fn collection_rate_is_zero_without_billings() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let rate = FinancialAggregator::new(repos)
            .collection_rate(PeriodRange::single(period("2024-06")))
            .await
            .unwrap();
        assert_eq!((rate.billed, rate.collected, rate.rate), (0, 0, 0));
    }

    #[tokio::test]
    async fn collection_rate_ignores_cancelled() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let paid = bill(&repos, 1, "2024-06", 100).await;
        pay(&repos, paid, date(2024, 6, 5)).await;
        bill(&repos, 2, "2024-06", 200).await;
        let mut cancelled = bill(&repos, 3, "2024-06", 700).await;
        cancelled.cancel().unwrap();
        repos.billings().update_status(&cancelled, SettlementStatus::Pending).await.unwrap();

        let rate = FinancialAggregator::new(repos)
            .collection_rate(PeriodRange::single(period("2024-06")))
            .await
            .unwrap();
        assert_eq!(rate.billed, 300);
        assert_eq!(rate.collected, 100);
        assert_eq!(rate.rate, 33);
        assert!((0..=100).contains(&rate.rate));
    }

    #[tokio::test]
    async fn cash_flow_uses_paid_dates_and_recurring_expenses() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        // May invoice paid in June counts as June inflow
        let may = bill(&repos, 1, "2024-05", 400_000).await;
        pay(&repos, may, date(2024, 6, 2)).await;
        bill(&repos, 2, "2024-06", 400_000).await;

        let mut payout = repos
            .payouts()
            .insert(TutorPayment::new_pending(
                1,
                period("2024-05"),
                1,
                Rate::MonthlyFixed(150_000),
                PayoutBasis::default(),
            ))
            .await
            .unwrap()
            .inserted()
            .unwrap();
        payout
            .mark_paid("bank_transfer", Utc.with_ymd_and_hms(2024, 6, 5, 9, 0, 0).unwrap())
            .unwrap();
        repos.payouts().update_status(&payout, SettlementStatus::Pending).await.unwrap();

        let rent = ExpenseCategory {
            id: 0,
            name: "Rent".into(),
            category_type: CategoryType::Facility,
        };
        let rent = repos.expenses().insert_category(rent).await.unwrap();
        repos
            .expenses()
            .insert(
                Expense::new(rent.id, 50_000, date(2024, 1, 10), None, Some(RecurringInterval::Monthly))
                    .unwrap(),
            )
            .await
            .unwrap();

        let aggregator = FinancialAggregator::new(repos);
        let june = aggregator.monthly_cash_flow(period("2024-06")).await.unwrap();
        assert_eq!(june.inflow, 400_000);
        assert_eq!(june.tutor_wages, 150_000);
        assert_eq!(june.expenses, 50_000);
        assert_eq!(june.net, 200_000);

        let series = aggregator
            .cash_flow_series(PeriodRange::parse("2023-12", "2024-02").unwrap())
            .await
            .unwrap();
        let expenses: Vec<i64> = series.iter().map(|m| m.expenses).collect();
        assert_eq!(expenses, vec![0, 50_000, 50_000]);
    }

    #[tokio::test]
    async fn profitability_ratios() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let joined = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for (student, class) in [(1, 1), (2, 1), (1, 2)] {
            repos
                .enrollments()
                .enroll(Enrollment::new(student, class, joined))
                .await
                .unwrap();
        }
        bill(&repos, 1, "2024-06", 600_000).await;
        bill(&repos, 2, "2024-06", 400_000).await;
        repos
            .payouts()
            .insert(TutorPayment::new_pending(
                1,
                period("2024-06"),
                1,
                Rate::MonthlyFixed(300_000),
                PayoutBasis::default(),
            ))
            .await
            .unwrap();

        let report = FinancialAggregator::new(repos)
            .profitability(PeriodRange::single(period("2024-06")))
            .await
            .unwrap();
        assert_eq!(report.revenue, 1_000_000);
        assert_eq!(report.teacher_cost, 300_000);
        assert_eq!(report.net_profit, 700_000);
        assert_eq!(report.net_profit_margin, 70);
        assert_eq!(report.teacher_cost_ratio, 30);
        assert_eq!(report.student_count, 2);
        assert_eq!(report.revenue_per_student, 500_000);
    }

    #[tokio::test]
    async fn profitability_with_no_revenue_has_zero_ratios() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let report = FinancialAggregator::new(repos)
            .profitability(PeriodRange::single(period("2024-06")))
            .await
            .unwrap();
        assert_eq!(report.net_profit_margin, 0);
        assert_eq!(report.teacher_cost_ratio, 0);
        assert_eq!(report.revenue_per_student, 0);
    }

    #[tokio::test]
    async fn profitability_ratios_round_to_whole_percent() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        bill(&repos, 1, "2024-06", 300).await;
        repos
            .payouts()
            .insert(TutorPayment::new_pending(
                1,
                period("2024-06"),
                1,
                Rate::MonthlyFixed(100),
                PayoutBasis::default(),
            ))
            .await
            .unwrap();

        let report = FinancialAggregator::new(repos)
            .profitability(PeriodRange::single(period("2024-06")))
            .await
            .unwrap();
        assert_eq!(report.net_profit, 200);
        assert_eq!(report.net_profit_margin, 67);
        assert_eq!(report.teacher_cost_ratio, 33);
    }

    #[tokio::test]
    async fn loss_gives_negative_margin() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        bill(&repos, 1, "2024-06", 200).await;
        repos
            .payouts()
            .insert(TutorPayment::new_pending(
                1,
                period("2024-06"),
                1,
                Rate::MonthlyFixed(500),
                PayoutBasis::default(),
            ))
            .await
            .unwrap();

        let report = FinancialAggregator::new(repos)
            .profitability(PeriodRange::single(period("2024-06")))
            .await
            .unwrap();
        assert_eq!(report.net_profit_margin, -150);
        assert_eq!(report.teacher_cost_ratio, 250);
    }

    #[tokio::test]
    async fn projected_revenue_skips_classes_without_tuition() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let joined = Utc::now();
        for (student, class) in [(1, 1), (2, 1), (3, 2)] {
            repos
                .enrollments()
                .enroll(Enrollment::new(student, class, joined))
                .await
                .unwrap();
        }
        repos
            .enrollments()
            .set_tuition(ClassTuitionRate {
                class_id: 1,
                amount: 450_000,
            })
            .await
            .unwrap();

        let projection = FinancialAggregator::new(repos)
            .projected_revenue()
            .await
            .unwrap();
        assert_eq!(projection.monthly, 900_000);
        assert_eq!(projection.annual, 10_800_000);
        assert_eq!(projection.enrollment_count, 3);
    }

    #[tokio::test]
    async fn expense_breakdown_groups_by_category_type() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let facility = repos
            .expenses()
            .insert_category(ExpenseCategory {
                id: 0,
                name: "Rent".into(),
                category_type: CategoryType::Facility,
            })
            .await
            .unwrap();
        let marketing = repos
            .expenses()
            .insert_category(ExpenseCategory {
                id: 0,
                name: "Ads".into(),
                category_type: CategoryType::Marketing,
            })
            .await
            .unwrap();
        repos
            .expenses()
            .insert(
                Expense::new(facility.id, 100, date(2024, 1, 1), None, Some(RecurringInterval::Quarterly))
                    .unwrap(),
            )
            .await
            .unwrap();
        repos
            .expenses()
            .insert(Expense::new(marketing.id, 40, date(2024, 2, 14), None, None).unwrap())
            .await
            .unwrap();

        let breakdown = FinancialAggregator::new(repos)
            .expense_breakdown(PeriodRange::parse("2024-01", "2024-06").unwrap())
            .await
            .unwrap();
        let by_type: HashMap<CategoryType, i64> = breakdown
            .categories
            .iter()
            .map(|c| (c.category_type, c.total))
            .collect();
        assert_eq!(by_type[&CategoryType::Facility], 200);
        assert_eq!(by_type[&CategoryType::Marketing], 40);
        assert_eq!(by_type[&CategoryType::Operational], 0);
        assert_eq!(breakdown.total, 240);
    }
}
