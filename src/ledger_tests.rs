#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::db::Database;

/// In-memory ledger numbering entries from 1.
#[derive(Default)]
struct VecLedger {
    entries: Vec<Transaction>,
}

impl Ledger for VecLedger {
    fn append(&mut self, entry: NewEntry) -> Result<Transaction> {
        let mut txn = entry.into_transaction();
        txn.id = Some(self.entries.len() as i64 + 1);
        self.entries.push(txn.clone());
        Ok(txn)
    }
}

struct FailingLedger;

impl Ledger for FailingLedger {
    fn append(&mut self, _entry: NewEntry) -> Result<Transaction> {
        anyhow::bail!("disk full")
    }
}

fn interpreter() -> Interpreter {
    Interpreter::new().unwrap()
}

#[test]
fn test_record_success_appends_voice_expense() {
    let mut ledger = VecLedger::default();
    let receipt = record_voice_command(
        &mut ledger,
        &interpreter(),
        "Gravar 12 euros café starbucks",
        Currency::Eur,
    )
    .unwrap();

    assert!(receipt.recorded());
    assert!(receipt.outcome.is_success());
    assert_eq!(receipt.message, "Voice command recorded: €12.00 - alimentação");
    assert_eq!(ledger.entries.len(), 1);
    let txn = &ledger.entries[0];
    assert_eq!(txn.amount, dec!(12));
    assert_eq!(txn.kind, TransactionType::Expense);
    assert_eq!(txn.category, Category::Food);
    assert_eq!(txn.description, "café starbucks");
    assert_eq!(txn.source, Source::Voice);
    assert_eq!(txn.currency, Currency::Eur);
}

#[test]
fn test_record_failure_appends_nothing() {
    let mut ledger = VecLedger::default();
    let receipt =
        record_voice_command(&mut ledger, &interpreter(), "olá mundo", Currency::Eur).unwrap();
    assert!(!receipt.recorded());
    assert!(!receipt.outcome.is_success());
    assert!(ledger.entries.is_empty());
}

#[test]
fn test_record_propagates_ledger_error() {
    let result = record_voice_command(
        &mut FailingLedger,
        &interpreter(),
        "gastei 5 euros uber",
        Currency::Eur,
    );
    assert!(result.is_err());
}

#[test]
fn test_record_uses_currency_symbol() {
    let mut ledger = VecLedger::default();
    let receipt = record_voice_command(
        &mut ledger,
        &interpreter(),
        "paguei 8,5 reais padaria",
        Currency::Brl,
    )
    .unwrap();
    assert_eq!(receipt.message, "Voice command recorded: R$8.50 - alimentação");
}

#[test]
fn test_record_into_database_assigns_increasing_ids() {
    let mut db = Database::open_in_memory().unwrap();
    let interp = interpreter();
    let first = record_voice_command(&mut db, &interp, "gastei 25 euros uber centro", Currency::Eur)
        .unwrap();
    let second = record_voice_command(&mut db, &interp, "15 euros jantar restaurante", Currency::Eur)
        .unwrap();

    let a = first.transaction.unwrap().id.unwrap();
    let b = second.transaction.unwrap().id.unwrap();
    assert!(b > a);
    assert_eq!(db.get_transaction_count().unwrap(), 2);

    let stored = db.get_transaction(a).unwrap().unwrap();
    assert_eq!(stored.category, Category::Transport);
    assert_eq!(stored.source, Source::Voice);
}

#[test]
fn test_receipt_serializes_outcome() {
    let mut ledger = VecLedger::default();
    let receipt =
        record_voice_command(&mut ledger, &interpreter(), "gravar 15 pizza", Currency::Eur)
            .unwrap();
    let json = serde_json::to_value(&receipt).unwrap();
    assert_eq!(json["outcome"]["success"], true);
    assert_eq!(json["transaction"]["type"], "despesa");
    assert_eq!(json["transaction"]["source"], "voice");
}
