#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

// ── Transaction ───────────────────────────────────────────────

fn make_txn(amount: Decimal, kind: TransactionType) -> Transaction {
    Transaction {
        id: None,
        date: "2024-01-15".into(),
        amount,
        kind,
        category: Category::Food,
        description: "Test".into(),
        trip_id: None,
        currency: Currency::Eur,
        source: Source::Cli,
        created_at: String::new(),
    }
}

#[test]
fn test_income() {
    let txn = make_txn(dec!(100.00), TransactionType::Income);
    assert!(txn.is_income());
    assert!(!txn.is_expense());
    assert_eq!(txn.signed_amount(), dec!(100.00));
}

#[test]
fn test_expense() {
    let txn = make_txn(dec!(50.00), TransactionType::Expense);
    assert!(!txn.is_income());
    assert!(txn.is_expense());
    assert_eq!(txn.signed_amount(), dec!(-50.00));
}

#[test]
fn test_new_stores_positive_amount() {
    let txn = Transaction::new(
        dec!(-12.50),
        TransactionType::Expense,
        Category::Food,
        "café".into(),
        Source::Voice,
        Currency::Eur,
    );
    assert_eq!(txn.amount, dec!(12.50));
    assert!(txn.id.is_none());
    assert!(txn.trip_id.is_none());
    assert_eq!(txn.date.len(), 10);
    assert!(!txn.created_at.is_empty());
}

#[test]
fn test_month_prefix() {
    let txn = make_txn(dec!(1), TransactionType::Expense);
    assert_eq!(txn.month(), "2024-01");
}

#[test]
fn test_transaction_serializes_wire_names() {
    let txn = make_txn(dec!(12.5), TransactionType::Expense);
    let json = serde_json::to_value(&txn).unwrap();
    assert_eq!(json["type"], "despesa");
    assert_eq!(json["category"], "alimentação");
    assert_eq!(json["currency"], "EUR");
    assert_eq!(json["source"], "cli");
    assert_eq!(json["amount"], 12.5);
}

// ── TransactionType / Source ──────────────────────────────────

#[test]
fn test_transaction_type_parse() {
    assert_eq!(TransactionType::parse("despesa"), Some(TransactionType::Expense));
    assert_eq!(TransactionType::parse("EXPENSE"), Some(TransactionType::Expense));
    assert_eq!(TransactionType::parse("ganho"), Some(TransactionType::Income));
    assert_eq!(TransactionType::parse("income"), Some(TransactionType::Income));
    assert_eq!(TransactionType::parse("transfer"), None);
}

#[test]
fn test_source_roundtrip() {
    for source in [Source::Voice, Source::Cli, Source::Tui, Source::Manual] {
        assert_eq!(Source::parse(source.as_str()), source);
    }
}

#[test]
fn test_source_unknown_is_manual() {
    assert_eq!(Source::parse("web"), Source::Manual);
    assert_eq!(Source::parse(""), Source::Manual);
}

// ── Category ──────────────────────────────────────────────────

#[test]
fn test_category_parse() {
    assert_eq!(Category::parse("alimentação"), Some(Category::Food));
    assert_eq!(Category::parse("Alimentacao"), Some(Category::Food));
    assert_eq!(Category::parse("transporte"), Some(Category::Transport));
    assert_eq!(Category::parse("LAZER"), Some(Category::Leisure));
    assert_eq!(Category::parse("housing"), Some(Category::Housing));
    assert_eq!(Category::parse("outros"), Some(Category::Other));
    assert_eq!(Category::parse("groceries"), None);
}

#[test]
fn test_category_roundtrip() {
    for c in Category::all() {
        assert_eq!(Category::parse(c.as_str()), Some(*c), "Roundtrip failed for {c}");
    }
}

#[test]
fn test_category_scored_excludes_fallback() {
    assert_eq!(Category::scored().len(), Category::all().len() - 1);
    assert!(!Category::scored().contains(&Category::fallback()));
}

#[test]
fn test_category_display() {
    assert_eq!(format!("{}", Category::Food), "alimentação");
    assert_eq!(format!("{}", Category::Other), "outros");
}

// ── Currency ──────────────────────────────────────────────────

#[test]
fn test_currency_parse() {
    assert_eq!(Currency::parse("eur"), Some(Currency::Eur));
    assert_eq!(Currency::parse("€"), Some(Currency::Eur));
    assert_eq!(Currency::parse("USD"), Some(Currency::Usd));
    assert_eq!(Currency::parse("r$"), Some(Currency::Brl));
    assert_eq!(Currency::parse("GBP"), None);
}

#[test]
fn test_currency_symbols() {
    assert_eq!(Currency::Eur.symbol(), "€");
    assert_eq!(Currency::Usd.symbol(), "$");
    assert_eq!(Currency::Brl.symbol(), "R$");
}

// ── Trip ──────────────────────────────────────────────────────

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_trip_new() {
    let trip = Trip::new("Lisboa".into(), date("2024-03-01"), date("2024-03-05"), dec!(800)).unwrap();
    assert!(trip.id.is_none());
    assert_eq!(trip.name, "Lisboa");
    assert_eq!(trip.duration_days(), 5);
    assert!(trip.has_budget());
}

#[test]
fn test_trip_single_day() {
    let trip = Trip::new("Porto".into(), date("2024-03-01"), date("2024-03-01"), Decimal::ZERO).unwrap();
    assert_eq!(trip.duration_days(), 1);
    assert!(!trip.has_budget());
}

#[test]
fn test_trip_rejects_inverted_dates() {
    assert!(Trip::new("X".into(), date("2024-03-05"), date("2024-03-01"), dec!(1)).is_err());
}

#[test]
fn test_trip_rejects_negative_budget() {
    assert!(Trip::new("X".into(), date("2024-03-01"), date("2024-03-02"), dec!(-1)).is_err());
}

#[test]
fn test_trip_rejects_blank_name() {
    assert!(Trip::new("  ".into(), date("2024-03-01"), date("2024-03-02"), dec!(1)).is_err());
}
