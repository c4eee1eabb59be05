use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::interpret::{CommandOutcome, Interpreter};
use crate::models::{Category, Currency, Source, Transaction, TransactionType};

/// Fields of an entry about to be recorded. The store assigns id and dates.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewEntry {
    pub(crate) amount: Decimal,
    pub(crate) kind: TransactionType,
    pub(crate) category: Category,
    pub(crate) description: String,
    pub(crate) source: Source,
    pub(crate) currency: Currency,
    pub(crate) trip_id: Option<i64>,
}

impl NewEntry {
    pub(crate) fn expense(
        amount: Decimal,
        category: Category,
        description: String,
        source: Source,
        currency: Currency,
    ) -> Self {
        Self {
            amount,
            kind: TransactionType::Expense,
            category,
            description,
            source,
            currency,
            trip_id: None,
        }
    }

    pub(crate) fn into_transaction(self) -> Transaction {
        let mut txn = Transaction::new(
            self.amount,
            self.kind,
            self.category,
            self.description,
            self.source,
            self.currency,
        );
        txn.trip_id = self.trip_id;
        txn
    }
}

/// Append-only sink for recorded entries. Each append returns the stored
/// record, whose id is strictly greater than any id returned before.
pub(crate) trait Ledger {
    fn append(&mut self, entry: NewEntry) -> Result<Transaction>;
}

/// What happened to one spoken command.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct VoiceReceipt {
    pub(crate) outcome: CommandOutcome,
    pub(crate) transaction: Option<Transaction>,
    pub(crate) message: String,
}

impl VoiceReceipt {
    pub(crate) fn recorded(&self) -> bool {
        self.transaction.is_some()
    }
}

pub(crate) fn recorded_message(txn: &Transaction) -> String {
    format!(
        "Voice command recorded: {}{:.2} - {}",
        txn.currency.symbol(),
        txn.amount,
        txn.category
    )
}

/// Interprets `command` and, when understood, appends it as a voice expense.
/// Nothing is written for a command that is not understood.
pub(crate) fn record_voice_command<L: Ledger + ?Sized>(
    ledger: &mut L,
    interpreter: &Interpreter,
    command: &str,
    currency: Currency,
) -> Result<VoiceReceipt> {
    let outcome = interpreter.interpret(command);
    debug!(success = outcome.is_success(), "interpreted voice command");
    match &outcome {
        CommandOutcome::Success(interp) => {
            let entry = NewEntry::expense(
                interp.amount,
                interp.category,
                interp.description.clone(),
                Source::Voice,
                currency,
            );
            let txn = ledger.append(entry)?;
            info!(id = ?txn.id, amount = %txn.amount, category = %txn.category, "voice command recorded");
            Ok(VoiceReceipt {
                message: recorded_message(&txn),
                transaction: Some(txn),
                outcome,
            })
        }
        CommandOutcome::Failure(failure) => Ok(VoiceReceipt {
            message: failure.reason.clone(),
            transaction: None,
            outcome,
        }),
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
