#![allow(clippy::unwrap_used)]

use super::*;

fn no_env() -> Option<HashMap<String, String>> {
    Some(HashMap::new())
}

#[test]
fn test_defaults_when_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load_with_env(&dir.path().join("config.toml"), no_env()).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.currency, Currency::Eur);
    assert_eq!(settings.base_currency, Currency::Brl);
    assert_eq!(settings.log.level, "info");
}

#[test]
fn test_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
currency = "BRL"
database = "/tmp/ledger.db"

[log]
level = "debug"

[keywords]
"alimentação" = ["padoca", "feira"]
"#,
    )
    .unwrap();

    let settings = Settings::load_with_env(&path, no_env()).unwrap();
    assert_eq!(settings.currency, Currency::Brl);
    assert_eq!(settings.base_currency, Currency::Brl);
    assert_eq!(settings.database, Some(PathBuf::from("/tmp/ledger.db")));
    assert_eq!(settings.log.level, "debug");
    assert_eq!(
        settings.keywords.get("alimentação"),
        Some(&vec!["padoca".to_string(), "feira".to_string()])
    );
}

#[test]
fn test_environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "currency = \"BRL\"\n").unwrap();

    let env = HashMap::from([
        ("VOICEBUDGET__CURRENCY".to_string(), "USD".to_string()),
        ("VOICEBUDGET__LOG__LEVEL".to_string(), "trace".to_string()),
    ]);
    let settings = Settings::load_with_env(&path, Some(env)).unwrap();
    assert_eq!(settings.currency, Currency::Usd);
    assert_eq!(settings.log.level, "trace");
}

#[test]
fn test_invalid_currency_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "currency = \"JPY\"\n").unwrap();
    assert!(Settings::load_with_env(&path, no_env()).is_err());
}
