use anyhow::Result;
use rust_decimal::Decimal;

use crate::db::{Database, TransactionFilter};
use crate::models::Transaction;
use crate::run::{current_month, Services};
use crate::summary::{MonthlySummary, TripSummary};

/// Most recent entries shown on the Transactions screen.
const TRANSACTION_LIMIT: u32 = 500;
const TREND_MONTHS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Transactions,
    Trips,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Dashboard, Self::Transactions, Self::Trips]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Transactions => write!(f, "Transactions"),
            Self::Trips => write!(f, "Trips"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    /// Typing a spoken-style phrase for the interpreter.
    Voice,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Voice => write!(f, "VOICE"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteTransaction { id: i64, description: String },
    DeleteTrip { id: i64, name: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) voice_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) current_month: String,
    pub(crate) services: Services,

    // Dashboard
    pub(crate) summary: MonthlySummary,
    pub(crate) monthly_trend: Vec<(String, Decimal, Decimal)>,

    // Transactions
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) transaction_index: usize,
    pub(crate) transaction_scroll: usize,
    pub(crate) transaction_count: i64,

    // Trips
    pub(crate) trips: Vec<TripSummary>,
    pub(crate) trip_index: usize,
    pub(crate) trip_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(services: Services) -> Self {
        let current_month = current_month();
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            voice_input: String::new(),
            status_message: String::new(),
            show_help: false,
            summary: MonthlySummary::empty(&current_month),
            current_month,
            services,

            monthly_trend: Vec::new(),

            transactions: Vec::new(),
            transaction_index: 0,
            transaction_scroll: 0,
            transaction_count: 0,

            trips: Vec::new(),
            trip_index: 0,
            trip_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn refresh_dashboard(&mut self, db: &Database) -> Result<()> {
        let month_txns = db.get_transactions(&TransactionFilter {
            month: Some(self.current_month.as_str()),
            ..Default::default()
        })?;
        // An unrepresentable total must not take the whole screen down.
        self.summary = match MonthlySummary::compute(&self.current_month, &month_txns) {
            Ok(summary) => summary,
            Err(e) => {
                self.set_status(e.to_string());
                MonthlySummary::empty(&self.current_month)
            }
        };
        self.monthly_trend = db.get_monthly_trend(TREND_MONTHS)?;
        self.transaction_count = db.get_transaction_count()?;
        Ok(())
    }

    pub(crate) fn refresh_transactions(&mut self, db: &Database) -> Result<()> {
        let search = if self.search_input.is_empty() {
            None
        } else {
            Some(self.search_input.as_str())
        };
        self.transactions = db.get_transactions(&TransactionFilter {
            month: Some(self.current_month.as_str()),
            search,
            limit: Some(TRANSACTION_LIMIT),
            ..Default::default()
        })?;
        self.transaction_count = db.get_transaction_count()?;
        if self.transaction_index >= self.transactions.len() {
            self.transaction_index = self.transactions.len().saturating_sub(1);
        }
        if self.transaction_scroll > self.transaction_index {
            self.transaction_scroll = self.transaction_index;
        }
        Ok(())
    }

    pub(crate) fn refresh_trips(&mut self, db: &Database) -> Result<()> {
        let trips = db.get_trips()?;
        let mut summaries = Vec::with_capacity(trips.len());
        for trip in &trips {
            let txns = match trip.id {
                Some(id) => db.get_trip_transactions(id)?,
                None => Vec::new(),
            };
            match TripSummary::compute(trip, &txns) {
                Ok(summary) => summaries.push(summary),
                Err(e) => self.set_status(e.to_string()),
            }
        }
        self.trips = summaries;
        if self.trip_index >= self.trips.len() {
            self.trip_index = self.trips.len().saturating_sub(1);
        }
        if self.trip_scroll > self.trip_index {
            self.trip_scroll = self.trip_index;
        }
        Ok(())
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.refresh_dashboard(db)?;
        self.refresh_transactions(db)?;
        self.refresh_trips(db)?;
        Ok(())
    }

    pub(crate) fn selected_transaction(&self) -> Option<&Transaction> {
        self.transactions.get(self.transaction_index)
    }

    pub(crate) fn selected_trip(&self) -> Option<&TripSummary> {
        self.trips.get(self.trip_index)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    /// Rows available to a list body (inside borders and header).
    pub(crate) fn page(&self) -> usize {
        self.visible_rows.max(1)
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
