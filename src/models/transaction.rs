use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Category, Currency};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum TransactionType {
    #[serde(rename = "despesa")]
    Expense,
    #[serde(rename = "ganho")]
    Income,
}

impl TransactionType {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "despesa",
            Self::Income => "ganho",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "despesa" | "expense" | "gasto" => Some(Self::Expense),
            "ganho" | "income" | "receita" => Some(Self::Income),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a ledger entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Source {
    Voice,
    Cli,
    Tui,
    Manual,
}

impl Source {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Voice => "voice",
            Self::Cli => "cli",
            Self::Tui => "tui",
            Self::Manual => "manual",
        }
    }

    /// Unknown sources are reported as manual entries.
    pub(crate) fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "voice" => Self::Voice,
            "cli" => Self::Cli,
            "tui" => Self::Tui,
            _ => Self::Manual,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Transaction {
    pub(crate) id: Option<i64>,
    /// Format: "YYYY-MM-DD"
    pub(crate) date: String,
    /// Always positive; the direction is carried by `kind`.
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) amount: Decimal,
    #[serde(rename = "type")]
    pub(crate) kind: TransactionType,
    pub(crate) category: Category,
    pub(crate) description: String,
    pub(crate) trip_id: Option<i64>,
    pub(crate) currency: Currency,
    pub(crate) source: Source,
    pub(crate) created_at: String,
}

impl Transaction {
    pub(crate) fn new(
        amount: Decimal,
        kind: TransactionType,
        category: Category,
        description: String,
        source: Source,
        currency: Currency,
    ) -> Self {
        let now = chrono::Local::now();
        Self {
            id: None,
            date: now.format("%Y-%m-%d").to_string(),
            amount: amount.abs(),
            kind,
            category,
            description,
            trip_id: None,
            currency,
            source,
            created_at: now.to_rfc3339(),
        }
    }

    pub(crate) fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub(crate) fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Amount with the direction applied: expenses are negative.
    pub(crate) fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    /// The "YYYY-MM" prefix of the entry date.
    pub(crate) fn month(&self) -> &str {
        self.date.get(..7).unwrap_or(&self.date)
    }
}
