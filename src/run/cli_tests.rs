#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::currency::CurrencyConverter;
use crate::interpret::Interpreter;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn services() -> Services {
    Services {
        interpreter: Interpreter::new().unwrap(),
        converter: CurrencyConverter::offline(),
        currency: Currency::Eur,
        base_currency: Currency::Brl,
    }
}

fn all_entries(db: &Database) -> Vec<Transaction> {
    db.get_transactions(&TransactionFilter::default()).unwrap()
}

// ── Argument helpers ──────────────────────────────────────────

#[test]
fn test_positional_skips_flags_and_values() {
    let a = args(&["12", "--trip", "3", "despesa", "--json", "lazer", "--month", "2024-01"]);
    assert_eq!(positional(&a), vec!["12", "despesa", "lazer"]);
}

#[test]
fn test_voice_phrase_keeps_flag_like_words() {
    let a = args(&["gastei", "12", "--month", "maio", "--json", "--trip", "x", "--dry-run"]);
    assert_eq!(voice_phrase(&a), "gastei 12 --month maio --trip x");
}

#[test]
fn test_flag_value() {
    let a = args(&["list", "--month", "2024-02"]);
    assert_eq!(flag_value(&a, "--month"), Some("2024-02"));
    assert_eq!(flag_value(&a, "--trip"), None);
}

#[test]
fn test_flag_without_value_is_none() {
    let a = args(&["list", "--month"]);
    assert_eq!(flag_value(&a, "--month"), None);
}

#[test]
fn test_month_arg() {
    assert_eq!(month_arg(Some("2024-03")).unwrap(), "2024-03");
    assert_eq!(month_arg(None).unwrap(), current_month());
    assert!(month_arg(Some("03/2024")).is_err());
}

// ── Dispatch ──────────────────────────────────────────────────

#[test]
fn test_unknown_command_is_error() {
    let mut db = Database::open_in_memory().unwrap();
    let err = as_cli(&args(&["voicebudget", "frobnicate"]), &mut db, &services()).unwrap_err();
    assert!(err.to_string().contains("frobnicate"));
}

#[test]
fn test_version_and_help() {
    let mut db = Database::open_in_memory().unwrap();
    as_cli(&args(&["voicebudget", "--version"]), &mut db, &services()).unwrap();
    as_cli(&args(&["voicebudget", "help"]), &mut db, &services()).unwrap();
}

// ── Voice ─────────────────────────────────────────────────────

#[test]
fn test_voice_records_expense() {
    let mut db = Database::open_in_memory().unwrap();
    cli_voice(&args(&["gravar", "12", "euros", "almoço"]), &mut db, &services()).unwrap();

    let txns = all_entries(&db);
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].amount, dec!(12));
    assert_eq!(txns[0].category, Category::Food);
    assert_eq!(txns[0].source, Source::Voice);
    assert_eq!(txns[0].currency, Currency::Eur);
}

#[test]
fn test_voice_failure_exits_with_error_and_records_nothing() {
    let mut db = Database::open_in_memory().unwrap();
    let err = cli_voice(&args(&["olá", "mundo"]), &mut db, &services()).unwrap_err();
    assert_eq!(err.to_string(), crate::interpret::UNRECOGNIZED_COMMAND);
    assert!(all_entries(&db).is_empty());
}

#[test]
fn test_voice_json_failure_still_errors() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(cli_voice(&args(&["nada", "--json"]), &mut db, &services()).is_err());
}

#[test]
fn test_voice_dry_run_records_nothing() {
    let mut db = Database::open_in_memory().unwrap();
    cli_voice(&args(&["gastei", "20", "reais", "uber", "--dry-run"]), &mut db, &services()).unwrap();
    assert!(all_entries(&db).is_empty());

    let err = cli_voice(&args(&["bom", "dia", "--dry-run"]), &mut db, &services()).unwrap_err();
    assert_eq!(err.to_string(), crate::interpret::UNRECOGNIZED_COMMAND);
}

#[test]
fn test_voice_description_keeps_dashed_words() {
    let mut db = Database::open_in_memory().unwrap();
    cli_voice(
        &args(&["gastei", "12", "euros", "jantar", "--trip", "lisboa", "--json"]),
        &mut db,
        &services(),
    )
    .unwrap();

    let txns = all_entries(&db);
    assert_eq!(txns.len(), 1);
    assert!(txns[0].description.contains("--trip lisboa"), "{}", txns[0].description);
}

#[test]
fn test_voice_without_phrase_is_usage_error() {
    let mut db = Database::open_in_memory().unwrap();
    let err = cli_voice(&args(&["--json"]), &mut db, &services()).unwrap_err();
    assert!(err.to_string().starts_with("Usage:"));
}

// ── Add / delete ──────────────────────────────────────────────

#[test]
fn test_add_income_with_currency() {
    let mut db = Database::open_in_memory().unwrap();
    cli_add(
        &args(&["1500,50", "ganho", "outros", "salário", "--currency", "BRL"]),
        &mut db,
        &services(),
    )
    .unwrap();

    let txns = all_entries(&db);
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].amount, dec!(1500.50));
    assert_eq!(txns[0].kind, TransactionType::Income);
    assert_eq!(txns[0].currency, Currency::Brl);
    assert_eq!(txns[0].description, "salário");
    assert_eq!(txns[0].source, Source::Cli);
}

#[test]
fn test_add_without_description_uses_category_name() {
    let mut db = Database::open_in_memory().unwrap();
    cli_add(&args(&["8", "despesa", "transporte"]), &mut db, &services()).unwrap();
    assert_eq!(all_entries(&db)[0].description, "transporte");
}

#[test]
fn test_add_rejects_bad_input() {
    let mut db = Database::open_in_memory().unwrap();
    let s = services();
    assert!(cli_add(&args(&["0", "despesa", "lazer"]), &mut db, &s).is_err());
    assert!(cli_add(&args(&["5", "talvez", "lazer"]), &mut db, &s).is_err());
    assert!(cli_add(&args(&["5", "despesa", "viagem"]), &mut db, &s).is_err());
    assert!(cli_add(&args(&["5", "despesa"]), &mut db, &s).is_err());
    assert!(cli_add(&args(&["5", "despesa", "lazer", "--currency", "JPY"]), &mut db, &s).is_err());
    assert!(all_entries(&db).is_empty());
}

#[test]
fn test_add_rejects_amount_above_ledger_maximum() {
    let mut db = Database::open_in_memory().unwrap();
    let huge = "79228162514264337593543950335";
    let err = cli_add(&args(&[huge, "despesa", "lazer"]), &mut db, &services()).unwrap_err();
    assert!(err.to_string().starts_with("Invalid amount"));
    assert!(all_entries(&db).is_empty());
}

#[test]
fn test_add_to_missing_trip_is_error() {
    let mut db = Database::open_in_memory().unwrap();
    let err = cli_add(
        &args(&["5", "despesa", "lazer", "--trip", "42"]),
        &mut db,
        &services(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("#42"));
}

#[test]
fn test_delete_entry() {
    let mut db = Database::open_in_memory().unwrap();
    cli_add(&args(&["8", "despesa", "lazer", "cinema"]), &mut db, &services()).unwrap();
    let id = all_entries(&db)[0].id.unwrap();

    cli_delete(&args(&[&id.to_string()]), &mut db).unwrap();
    assert!(all_entries(&db).is_empty());
    assert!(cli_delete(&args(&[&id.to_string()]), &mut db).is_err());
    assert!(cli_delete(&args(&["abc"]), &mut db).is_err());
}

// ── Trips ─────────────────────────────────────────────────────

#[test]
fn test_trip_lifecycle() {
    let mut db = Database::open_in_memory().unwrap();
    cli_trip(
        &args(&["new", "Lisboa", "2024-05-01", "2024-05-05", "500"]),
        &mut db,
    )
    .unwrap();
    let trips = db.get_trips().unwrap();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].budget, dec!(500));
    let id = trips[0].id.unwrap();

    cli_add(
        &args(&["40", "despesa", "alimentação", "jantar", "--trip", &id.to_string()]),
        &mut db,
        &services(),
    )
    .unwrap();
    cli_trip(&args(&["show", &id.to_string(), "--json"]), &mut db).unwrap();
    cli_trip(&args(&["list"]), &mut db).unwrap();

    cli_trip(&args(&["delete", &id.to_string()]), &mut db).unwrap();
    assert!(db.get_trips().unwrap().is_empty());
    let txns = all_entries(&db);
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].trip_id, None);
}

#[test]
fn test_trip_new_rejects_reversed_dates() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(cli_trip(&args(&["new", "Porto", "2024-05-05", "2024-05-01"]), &mut db).is_err());
    assert!(cli_trip(&args(&["new", "Porto", "5 de maio", "2024-05-01"]), &mut db).is_err());
    assert!(db.get_trips().unwrap().is_empty());
}

#[test]
fn test_trip_unknown_subcommand() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(cli_trip(&args(&["rename", "1"]), &mut db).is_err());
    assert!(cli_trip(&args(&["show", "9"]), &mut db).is_err());
}

// ── Recat ─────────────────────────────────────────────────────

#[test]
fn test_recat_persists_new_categories() {
    let mut db = Database::open_in_memory().unwrap();
    let s = services();
    cli_add(&args(&["30", "despesa", "outros", "uber", "aeroporto"]), &mut db, &s).unwrap();
    cli_add(&args(&["9", "despesa", "outros", "presente"]), &mut db, &s).unwrap();
    cli_add(&args(&["15", "despesa", "lazer", "almoço"]), &mut db, &s).unwrap();

    cli_recat(&mut db, &s).unwrap();

    let txns = all_entries(&db);
    let by_desc = |d: &str| txns.iter().find(|t| t.description == d).unwrap().category;
    assert_eq!(by_desc("uber aeroporto"), Category::Transport);
    assert_eq!(by_desc("presente"), Category::Other);
    // Only entries filed under the fallback are revisited.
    assert_eq!(by_desc("almoço"), Category::Leisure);
}

// ── Summary / convert / export ────────────────────────────────

#[test]
fn test_summary_rejects_bad_month() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(cli_summary(&args(&["2024-13"]), &mut db, &services()).is_err());
    cli_summary(&args(&["2024-01", "--json"]), &mut db, &services()).unwrap();
}

#[test]
fn test_convert_defaults_and_errors() {
    let s = services();
    cli_convert(&args(&["100"]), &s).unwrap();
    cli_convert(&args(&["10", "usd", "eur", "--json"]), &s).unwrap();
    assert!(cli_convert(&args(&["10", "EUR", "EUR"]), &s).is_err());
    assert!(cli_convert(&args(&["dez"]), &s).is_err());
    assert!(cli_convert(&args(&[]), &s).is_err());
    assert!(cli_convert(&args(&["79228162514264337593543950335"]), &s).is_err());
}

#[test]
fn test_summary_reports_overflowing_totals() {
    let mut db = Database::open_in_memory().unwrap();
    for _ in 0..2 {
        db.append(NewEntry::expense(
            Decimal::MAX,
            Category::Food,
            "importado".into(),
            Source::Manual,
            Currency::Eur,
        ))
        .unwrap();
    }
    let err = cli_summary(&args(&[]), &mut db, &services()).unwrap_err();
    assert!(err.to_string().contains("exceed"));
}

#[test]
fn test_export_writes_current_month() {
    let mut db = Database::open_in_memory().unwrap();
    cli_add(&args(&["8", "despesa", "lazer", "cinema"]), &mut db, &services()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    cli_export(&args(&[path.to_str().unwrap()]), &mut db).unwrap();
    let body = std::fs::read_to_string(&path).unwrap();
    assert!(body.contains("cinema"));
}
