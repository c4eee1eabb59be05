//! Monthly and per-trip spending analytics. Pure functions over ledger
//! entries; callers load the entries from the store.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Category, Source, Transaction, Trip};

/// Expense ratio reported when there are expenses but no income.
pub(crate) const NO_INCOME_RATIO: Decimal = Decimal::from_parts(999, 0, 0, false, 0);

const DAYS_PER_MONTH: Decimal = Decimal::from_parts(30, 0, 0, false, 0);
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum SummaryError {
    #[error("totals for {0} exceed the largest representable amount")]
    Overflow(String),
}

type Totals<T> = Result<T, SummaryError>;

fn overflow(scope: &str) -> SummaryError {
    SummaryError::Overflow(scope.to_string())
}

/// Sum that reports overflow instead of panicking.
fn checked_total(amounts: impl IntoIterator<Item = Decimal>, scope: &str) -> Totals<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| overflow(scope))
}

/// `part / whole * 100`, rounded to cents. `whole` must be non-zero.
fn percentage(part: Decimal, whole: Decimal, scope: &str) -> Totals<Decimal> {
    part.checked_div(whole)
        .and_then(|r| r.checked_mul(HUNDRED))
        .map(|p| p.round_dp(2))
        .ok_or_else(|| overflow(scope))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct CategoryTotal {
    pub(crate) category: Category,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SourceStat {
    pub(crate) source: Source,
    /// Every entry from this source, income included.
    pub(crate) count: usize,
    /// Sum of expense amounts only.
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) amount: Decimal,
}

/// Expense totals per category, in category declaration order. Categories
/// without spending are omitted.
pub(crate) fn category_distribution<'a>(
    txns: impl IntoIterator<Item = &'a Transaction>,
) -> Totals<Vec<CategoryTotal>> {
    let mut totals: Vec<CategoryTotal> = Category::all()
        .iter()
        .map(|&category| CategoryTotal {
            category,
            amount: Decimal::ZERO,
        })
        .collect();
    for txn in txns.into_iter().filter(|t| t.is_expense()) {
        if let Some(total) = totals.iter_mut().find(|t| t.category == txn.category) {
            total.amount = total
                .amount
                .checked_add(txn.amount)
                .ok_or_else(|| overflow(txn.category.as_str()))?;
        }
    }
    totals.retain(|t| t.amount > Decimal::ZERO);
    Ok(totals)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MonthlySummary {
    /// "YYYY-MM"
    pub(crate) month: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) total_expenses: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) balance: Decimal,
    pub(crate) category_distribution: Vec<CategoryTotal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) avg_daily_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) expense_ratio: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) savings_rate: Decimal,
    pub(crate) transaction_count: usize,
    pub(crate) biggest_expense: Option<Transaction>,
    pub(crate) source_analysis: Vec<SourceStat>,
}

impl MonthlySummary {
    /// Summary of a month without entries.
    pub(crate) fn empty(month: &str) -> Self {
        Self {
            month: month.to_string(),
            total_expenses: Decimal::ZERO,
            total_income: Decimal::ZERO,
            balance: Decimal::ZERO,
            category_distribution: Vec::new(),
            avg_daily_expense: Decimal::ZERO,
            expense_ratio: Decimal::ZERO,
            savings_rate: Decimal::ZERO,
            transaction_count: 0,
            biggest_expense: None,
            source_analysis: Vec::new(),
        }
    }

    /// Summarizes the entries dated in `month` ("YYYY-MM"). Entries from
    /// other months are ignored. Fails only when a total overflows.
    pub(crate) fn compute(month: &str, txns: &[Transaction]) -> Totals<Self> {
        let monthly: Vec<&Transaction> = txns.iter().filter(|t| t.month() == month).collect();

        let total_expenses = checked_total(
            monthly.iter().filter(|t| t.is_expense()).map(|t| t.amount),
            month,
        )?;
        let total_income = checked_total(
            monthly.iter().filter(|t| t.is_income()).map(|t| t.amount),
            month,
        )?;
        let balance = total_income
            .checked_sub(total_expenses)
            .ok_or_else(|| overflow(month))?;

        let avg_daily_expense = if total_expenses > Decimal::ZERO {
            (total_expenses / DAYS_PER_MONTH).round_dp(2)
        } else {
            Decimal::ZERO
        };

        let (expense_ratio, savings_rate) = if total_income > Decimal::ZERO {
            (
                total_expenses
                    .checked_div(total_income)
                    .ok_or_else(|| overflow(month))?
                    .round_dp(2),
                percentage(balance, total_income, month)?,
            )
        } else if total_expenses.is_zero() {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            (NO_INCOME_RATIO, Decimal::ZERO)
        };

        let mut biggest_expense: Option<&Transaction> = None;
        for &txn in monthly.iter().filter(|t| t.is_expense()) {
            if biggest_expense.map_or(true, |b| txn.amount > b.amount) {
                biggest_expense = Some(txn);
            }
        }

        let mut source_analysis: Vec<SourceStat> = Vec::new();
        for txn in &monthly {
            let stat = match source_analysis.iter().position(|s| s.source == txn.source) {
                Some(i) => &mut source_analysis[i],
                None => {
                    source_analysis.push(SourceStat {
                        source: txn.source,
                        count: 0,
                        amount: Decimal::ZERO,
                    });
                    let last = source_analysis.len() - 1;
                    &mut source_analysis[last]
                }
            };
            stat.count += 1;
            if txn.is_expense() {
                stat.amount = stat
                    .amount
                    .checked_add(txn.amount)
                    .ok_or_else(|| overflow(month))?;
            }
        }
        source_analysis.sort_by_key(|s| s.source);

        Ok(Self {
            month: month.to_string(),
            total_expenses,
            total_income,
            balance,
            category_distribution: category_distribution(monthly.iter().copied())?,
            avg_daily_expense,
            expense_ratio,
            savings_rate,
            transaction_count: monthly.len(),
            biggest_expense: biggest_expense.cloned(),
            source_analysis,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum TripStatus {
    OnTrack,
    OverBudget,
}

impl TripStatus {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::OnTrack => "on_track",
            Self::OverBudget => "over_budget",
        }
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TripSummary {
    pub(crate) trip: Trip,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) total_spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) daily_average: Decimal,
    pub(crate) duration: i64,
    /// Budget minus spending; zero when the trip has no budget.
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) budget_comparison: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) budget_percentage: Decimal,
    pub(crate) category_distribution: Vec<CategoryTotal>,
    pub(crate) transaction_count: usize,
    pub(crate) status: TripStatus,
}

impl TripSummary {
    /// Summarizes the entries linked to `trip`. Unlinked entries are ignored.
    /// Fails only when a total overflows.
    pub(crate) fn compute(trip: &Trip, txns: &[Transaction]) -> Totals<Self> {
        let linked: Vec<&Transaction> = txns
            .iter()
            .filter(|t| t.trip_id.is_some() && t.trip_id == trip.id)
            .collect();

        let total_spent = checked_total(
            linked.iter().filter(|t| t.is_expense()).map(|t| t.amount),
            &trip.name,
        )?;
        let duration = trip.duration_days();
        let daily_average = if duration > 0 {
            (total_spent / Decimal::from(duration)).round_dp(2)
        } else {
            Decimal::ZERO
        };

        let (budget_comparison, budget_percentage) = if trip.has_budget() {
            (
                trip.budget
                    .checked_sub(total_spent)
                    .ok_or_else(|| overflow(&trip.name))?,
                percentage(total_spent, trip.budget, &trip.name)?,
            )
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        Ok(Self {
            trip: trip.clone(),
            total_spent,
            daily_average,
            duration,
            budget_comparison,
            budget_percentage,
            category_distribution: category_distribution(linked.iter().copied())?,
            transaction_count: linked.len(),
            status: if budget_comparison < Decimal::ZERO {
                TripStatus::OverBudget
            } else {
                TripStatus::OnTrack
            },
        })
    }
}
