use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Trip {
    pub(crate) id: Option<i64>,
    pub(crate) name: String,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    /// Zero means the trip has no budget.
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) budget: Decimal,
    pub(crate) created_at: String,
}

impl Trip {
    pub(crate) fn new(
        name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        budget: Decimal,
    ) -> anyhow::Result<Self> {
        if name.trim().is_empty() {
            anyhow::bail!("Trip name cannot be empty");
        }
        if end_date < start_date {
            anyhow::bail!("Trip ends ({end_date}) before it starts ({start_date})");
        }
        if budget < Decimal::ZERO {
            anyhow::bail!("Trip budget cannot be negative: {budget}");
        }
        Ok(Self {
            id: None,
            name,
            start_date,
            end_date,
            budget,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Inclusive number of days covered by the trip.
    pub(crate) fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub(crate) fn has_budget(&self) -> bool {
        self.budget > Decimal::ZERO
    }
}

impl std::fmt::Display for Trip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
