#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

#[test]
fn test_shellexpand_home() {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    assert_eq!(shellexpand("~/out.csv"), format!("{home}/out.csv"));
}

#[test]
fn test_shellexpand_plain_path_untouched() {
    assert_eq!(shellexpand("/tmp/out.csv"), "/tmp/out.csv");
    assert_eq!(shellexpand("relative~/x"), "relative~/x");
}

#[test]
fn test_current_month_shape() {
    assert!(is_valid_month(&current_month()));
}

#[test]
fn test_is_valid_month() {
    assert!(is_valid_month("2024-01"));
    assert!(is_valid_month("2024-12"));
    assert!(!is_valid_month("2024-13"));
    assert!(!is_valid_month("2024-1"));
    assert!(!is_valid_month("janeiro"));
    assert!(!is_valid_month(""));
}

#[test]
fn test_parse_amount_decimal_point_and_comma() {
    assert_eq!(parse_amount("12.50"), Some(dec!(12.50)));
    assert_eq!(parse_amount("12,50"), Some(dec!(12.50)));
    assert_eq!(parse_amount(" 7 "), Some(dec!(7)));
}

#[test]
fn test_parse_amount_rejects_non_positive_and_garbage() {
    assert_eq!(parse_amount("0"), None);
    assert_eq!(parse_amount("-3"), None);
    assert_eq!(parse_amount("doze"), None);
    assert_eq!(parse_amount(""), None);
}

#[test]
fn test_parse_amount_caps_at_ledger_maximum() {
    assert_eq!(parse_amount("1000000000"), Some(MAX_ENTRY_AMOUNT));
    assert_eq!(parse_amount("1000000000.01"), None);
    assert_eq!(parse_amount("79228162514264337593543950335"), None);
}
