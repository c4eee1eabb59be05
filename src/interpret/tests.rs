#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rust_decimal_macros::dec;

use super::extract::{parse_amount, RULE_PATTERNS};
use super::*;

fn interpreter() -> Interpreter {
    Interpreter::new().unwrap()
}

fn extracted(text: &str) -> Extraction {
    interpreter().extract(text).unwrap()
}

// ── Rule table ────────────────────────────────────────────────

#[test]
fn test_rule_table_compiles() {
    let ex = Extractor::new().unwrap();
    assert_eq!(ex.rule_count(), RULE_PATTERNS.len());
    assert_eq!(ex.rule_count(), 21);
    assert_eq!(ex.pattern(20), Some(r"(\d+(?:[.,]\d{1,2})?)\s+(.+)"));
    assert_eq!(ex.pattern(21), None);
}

#[test]
fn test_empty_rule_table_is_fatal() {
    assert!(matches!(
        Extractor::with_patterns(&[]),
        Err(RuleTableError::Empty)
    ));
}

#[test]
fn test_invalid_rule_is_fatal() {
    const BAD: &[&str] = &[r"(\d+)\s+(.+)", r"(unclosed"];
    match Extractor::with_patterns(BAD) {
        Err(RuleTableError::InvalidPattern { index, .. }) => assert_eq!(index, 1),
        _ => panic!("expected an invalid pattern error"),
    }
}

// ── Extraction per verb ───────────────────────────────────────

#[test]
fn test_extract_verb_with_unit() {
    let e = extracted("gravar 12 euros café starbucks");
    assert_eq!(e.amount, dec!(12.00));
    assert_eq!(e.description, "café starbucks");
    assert_eq!(e.rule_index, 0);
}

#[test]
fn test_extract_normalizes_case_and_whitespace() {
    let e = extracted("   Gravar 12 Euros Café Starbucks  ");
    assert_eq!(e.amount, dec!(12));
    assert_eq!(e.description, "café starbucks");
    assert_eq!(e.rule_index, 0);
}

#[test]
fn test_extract_verb_without_unit() {
    let e = extracted("gravar 15 pizza");
    assert_eq!(e.amount, dec!(15));
    assert_eq!(e.description, "pizza");
    assert_eq!(e.rule_index, 1);
}

#[test]
fn test_extract_each_verb() {
    let cases = [
        ("paguei 8 reais café da manhã", 2, "café da manhã"),
        ("paguei 8 padaria", 3, "padaria"),
        ("gastei 25 euros uber centro", 4, "uber centro"),
        ("gastei 25 uber centro", 5, "uber centro"),
        ("comprei 12 euros supermercado", 6, "supermercado"),
        ("comprei 12 supermercado", 7, "supermercado"),
        ("adicionar 30 euros gasolina", 8, "gasolina"),
        ("adicionar 30 gasolina", 9, "gasolina"),
        ("gasto 5 euro estacionamento", 10, "estacionamento"),
        ("gasto 5 estacionamento", 11, "estacionamento"),
    ];
    for (text, rule, desc) in cases {
        let e = extracted(text);
        assert_eq!(e.rule_index, rule, "wrong rule for {text:?}");
        assert_eq!(e.description, desc, "wrong description for {text:?}");
    }
}

#[test]
fn test_extract_euro_sign() {
    let e = extracted("gravar €15 pizza");
    assert_eq!(e.amount, dec!(15));
    assert_eq!(e.description, "pizza");
    assert_eq!(e.rule_index, 12);

    assert_eq!(extracted("paguei €3 pão").rule_index, 13);
    assert_eq!(extracted("gastei €3 pão").rule_index, 14);
    assert_eq!(extracted("comprei €3 pão").rule_index, 15);
}

#[test]
fn test_extract_optional_unit_verbs() {
    let e = extracted("registrar 10 almoço");
    assert_eq!((e.rule_index, e.description.as_str()), (16, "almoço"));

    let e = extracted("anotar 7 reais lanche");
    assert_eq!((e.rule_index, e.description.as_str()), (17, "lanche"));

    let e = extracted("despesa de 30 euros luz");
    assert_eq!(e.amount, dec!(30));
    assert_eq!((e.rule_index, e.description.as_str()), (18, "luz"));

    let e = extracted("despesa 30 luz");
    assert_eq!((e.rule_index, e.description.as_str()), (18, "luz"));
}

#[test]
fn test_extract_decimal_comma() {
    let e = extracted("paguei 8,50 reais padaria");
    assert_eq!(e.amount, dec!(8.50));
    let e = extracted("gastei 3.75 euros café");
    assert_eq!(e.amount, dec!(3.75));
}

#[test]
fn test_extract_bare_amount_with_unit() {
    let e = extracted("15 euros jantar restaurante");
    assert_eq!(e.amount, dec!(15.00));
    assert_eq!(e.description, "jantar restaurante");
    assert_eq!(e.rule_index, 19);
}

#[test]
fn test_extract_bare_amount_is_a_broad_match() {
    // Known broad match: any number followed by text is accepted by the last rule.
    let e = extracted("tenho 3 gatos");
    assert_eq!(e.amount, dec!(3));
    assert_eq!(e.description, "gatos");
    assert_eq!(e.rule_index, 20);
}

// ── Ordering ──────────────────────────────────────────────────

#[test]
fn test_extract_first_match_wins() {
    // Rule 0 and rule 4 both match; the earlier one is used.
    let e = extracted("gravar 20 euros gastei 5 euros taxi");
    assert_eq!(e.rule_index, 0);
    assert_eq!(e.amount, dec!(20));
    assert_eq!(e.description, "gastei 5 euros taxi");
}

#[test]
fn test_extract_verb_rule_beats_bare_rule() {
    // The bare number rule would also match, but it is tried last.
    let e = extracted("comprei 12 euros supermercado");
    assert_eq!(e.rule_index, 6);
}

// ── Validation fallthrough ────────────────────────────────────

#[test]
fn test_extract_amount_over_limit_is_no_match() {
    let no_match = interpreter().extract("gravar 50000 presente").unwrap_err();
    assert_eq!(no_match.rules_tried, 21);
    assert!(!no_match.is_structural());
    let rules: Vec<usize> = no_match.rejections.iter().map(Rejection::rule_index).collect();
    assert_eq!(rules, vec![1, 12, 20]);
    assert!(no_match.rejections.iter().all(Rejection::is_semantic));
    assert_eq!(
        no_match.rejections[0],
        Rejection::AmountOutOfRange {
            rule_index: 1,
            amount: dec!(50000)
        }
    );
}

#[test]
fn test_extract_limit_is_inclusive() {
    assert_eq!(extracted("gravar 10000 reforma").amount, MAX_AMOUNT);
    assert!(interpreter().extract("gravar 10000,01 reforma").is_err());
}

#[test]
fn test_extract_zero_amount_rejected() {
    assert!(interpreter().extract("gravar 0 nada").is_err());
}

#[test]
fn test_extract_short_description_falls_through_to_next_rule() {
    // Rule 0 yields the description "a" and is rejected; rule 1 then accepts.
    let interp = interpreter();
    let e = interp.extract("gravar 12 euros a").unwrap();
    assert_eq!(e.rule_index, 1);
    assert_eq!(e.description, "euros a");
    assert_eq!(e.amount, dec!(12));
}

#[test]
fn test_extract_short_description_everywhere_is_no_match() {
    let no_match = interpreter().extract("gravar 12 x").unwrap_err();
    assert!(no_match
        .rejections
        .iter()
        .all(|r| matches!(r, Rejection::DescriptionTooShort { .. })));
    assert_eq!(MIN_DESCRIPTION_CHARS, 2);
}

#[test]
fn test_extract_malformed_number_continues() {
    // Arabic-Indic digits satisfy \d but are not a decimal literal.
    let no_match = interpreter().extract("gravar ١٢ café").unwrap_err();
    assert!(!no_match.rejections.is_empty());
    assert!(no_match
        .rejections
        .iter()
        .all(|r| matches!(r, Rejection::MalformedNumber { .. })));
}

#[test]
fn test_extract_no_digits_is_structural_no_match() {
    let no_match = interpreter().extract("gravar café com leite").unwrap_err();
    assert!(no_match.is_structural());
    assert_eq!(no_match.rules_tried, 21);
}

#[test]
fn test_parse_amount() {
    assert_eq!(parse_amount("1,5"), Some(dec!(1.5)));
    assert_eq!(parse_amount("12.34"), Some(dec!(12.34)));
    assert_eq!(parse_amount("١٢"), None);
    assert_eq!(parse_amount(""), None);
}

// ── Interpreter ───────────────────────────────────────────────

#[test]
fn test_interpret_success() {
    match interpreter().interpret("Gravar 12 euros café starbucks") {
        CommandOutcome::Success(i) => {
            assert_eq!(i.amount, dec!(12));
            assert_eq!(i.description, "café starbucks");
            assert_eq!(i.category, Category::Food);
            assert_eq!(i.rule_index, 0);
        }
        CommandOutcome::Failure(f) => panic!("unexpected failure: {f:?}"),
    }
}

#[test]
fn test_interpret_examples_are_understood() {
    let interp = interpreter();
    for example in EXAMPLE_COMMANDS {
        assert!(interp.interpret(example).is_success(), "{example}");
    }
}

#[test]
fn test_interpret_failure_diagnostics() {
    match interpreter().interpret("  Olá Mundo  ") {
        CommandOutcome::Failure(f) => {
            assert_eq!(f.reason, UNRECOGNIZED_COMMAND);
            assert_eq!(f.received_command, "olá mundo");
            assert_eq!(f.examples.len(), EXAMPLE_COMMANDS.len());
            assert_eq!(f.diagnostics.command_length, 9);
            assert!(!f.diagnostics.has_numbers);
            assert_eq!(f.diagnostics.patterns_tested, 21);
            assert!(f.diagnostics.rejections.is_empty());
        }
        CommandOutcome::Success(i) => panic!("unexpected success: {i:?}"),
    }
}

#[test]
fn test_interpret_failure_reports_rejections() {
    match interpreter().interpret("gravar 50000 presente") {
        CommandOutcome::Failure(f) => {
            assert!(f.diagnostics.has_numbers);
            assert_eq!(f.diagnostics.rejections.len(), 3);
            assert!(f.diagnostics.rejections[0].contains("50000"));
        }
        CommandOutcome::Success(i) => panic!("unexpected success: {i:?}"),
    }
}

#[test]
fn test_interpret_unknown_description_goes_to_other() {
    match interpreter().interpret("gastei 9 euros xyz qualquer") {
        CommandOutcome::Success(i) => assert_eq!(i.category, Category::Other),
        CommandOutcome::Failure(f) => panic!("unexpected failure: {f:?}"),
    }
}

#[test]
fn test_outcome_success_wire_shape() {
    let outcome = interpreter().interpret("gravar 12 euros café starbucks");
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["amount"], 12.0);
    assert_eq!(json["category"], "alimentação");
    assert_eq!(json["description"], "café starbucks");
    assert_eq!(json["ruleIndex"], 0);
    assert!(json.get("error").is_none());
}

#[test]
fn test_outcome_failure_wire_shape() {
    let outcome = interpreter().interpret("sem numeros aqui");
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], UNRECOGNIZED_COMMAND);
    assert_eq!(json["receivedCommand"], "sem numeros aqui");
    assert_eq!(json["examples"].as_array().unwrap().len(), 5);
    assert_eq!(json["diagnostics"]["hasNumbers"], false);
    assert_eq!(json["diagnostics"]["patternsTested"], 21);
    assert!(json.get("amount").is_none());
}

// ── Classification ────────────────────────────────────────────

#[test]
fn test_classify_with_euro_sign() {
    let c = interpreter().classify("Café €3,50");
    assert_eq!(c.amount, dec!(3.50));
    assert_eq!(c.category, Category::Food);
    assert_eq!(c.kind, TransactionType::Expense);
    assert_eq!(c.confidence, Confidence::High);
}

#[test]
fn test_classify_currency_codes() {
    let interp = interpreter();
    assert_eq!(interp.classify("uber 12 eur").amount, dec!(12));
    assert_eq!(interp.classify("r$ 20 pizza").amount, dec!(20));
    assert_eq!(interp.classify("15 reais lanche").amount, dec!(15));
    assert_eq!(interp.classify("jantar 40 euros").amount, dec!(40));
}

#[test]
fn test_classify_without_amount() {
    let c = interpreter().classify("jantar");
    assert_eq!(c.amount, rust_decimal::Decimal::ZERO);
    assert_eq!(c.category, Category::Food);
    assert_eq!(c.confidence, Confidence::Medium);
}

#[test]
fn test_classify_plain_number_is_not_money() {
    // No currency marker, so nothing is spotted.
    assert_eq!(interpreter().classify("cinema 12").confidence, Confidence::Medium);
}

// ── Properties ────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_no_digit_never_matches(text in "[a-zA-Z çãõéêíóú€$,.]{0,40}") {
        prop_assert!(interpreter().extract(&text).is_err());
    }

    #[test]
    fn prop_interpret_is_pure(text in ".{0,60}") {
        let interp = interpreter();
        prop_assert_eq!(interp.interpret(&text), interp.interpret(&text));
        prop_assert_eq!(interp.categorize(&text), interp.categorize(&text));
    }

    #[test]
    fn prop_success_roundtrips_through_categorize(
        text in "(gravar|paguei|gastei|comprei|anotar) [1-9][0-9]{0,3}(,[0-9]{2})? (euros |reais )?[a-zçé ]{2,20}"
    ) {
        let interp = interpreter();
        if let CommandOutcome::Success(i) = interp.interpret(&text) {
            prop_assert!(i.amount > rust_decimal::Decimal::ZERO);
            prop_assert!(i.amount <= MAX_AMOUNT);
            prop_assert!(i.description.chars().count() >= MIN_DESCRIPTION_CHARS);
            prop_assert_eq!(interp.categorize(&i.description), i.category);
        }
    }
}
