//! Integration tests for Settings config loading with layered merge semantics.
//!
//! These tests pass an explicit (or no) global config file so the user's own
//! `~/.config/costtree/costtree.toml` never leaks into the results.

use std::fs;

use tempfile::TempDir;

use costtree::config::{local_config_path, Settings};

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    // Arrange
    let data_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(data_dir.path()),
        r#"
strict = true

[format]
symbol = "US$"
thousands_separator = ","
decimal_separator = "."
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load_with_global(None, Some(data_dir.path())).unwrap();

    // Assert
    assert!(settings.strict);
    assert_eq!(settings.format.symbol, "US$");
    assert_eq!(settings.format.thousands_separator, ",");
    assert_eq!(settings.format.decimal_separator, ".");
    // untouched fields keep their defaults
    assert_eq!(settings.format.decimals, 2);
    assert_eq!(settings.neutral_status, "N");
}

#[test]
fn given_global_and_local_config_when_load_then_local_wins() {
    // Arrange
    let global_dir = TempDir::new().unwrap();
    let global_path = global_dir.path().join("costtree.toml");
    fs::write(
        &global_path,
        r#"
neutral_status = "X"

[format]
symbol = "EUR"
decimals = 3
"#,
    )
    .unwrap();

    let data_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(data_dir.path()),
        r#"
[format]
symbol = "CHF"
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load_with_global(Some(&global_path), Some(data_dir.path())).unwrap();

    // Assert
    assert_eq!(settings.format.symbol, "CHF");
    assert_eq!(settings.format.decimals, 3);
    assert_eq!(settings.neutral_status, "X");
}

#[test]
fn given_missing_global_file_when_load_then_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("nope.toml");

    let settings = Settings::load_with_global(Some(&absent), None).unwrap();

    assert!(!settings.strict);
    assert_eq!(settings.format.symbol, "R$");
}

#[test]
fn given_invalid_local_config_when_load_then_errors() {
    let data_dir = TempDir::new().unwrap();
    fs::write(local_config_path(data_dir.path()), "strict = [not toml").unwrap();

    let result = Settings::load_with_global(None, Some(data_dir.path()));

    assert!(result.is_err());
}

#[test]
fn given_data_dir_in_local_config_when_load_then_is_kept() {
    let data_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(data_dir.path()),
        r#"data_dir = "/srv/budgets/2026""#,
    )
    .unwrap();

    let settings = Settings::load_with_global(None, Some(data_dir.path())).unwrap();

    assert_eq!(
        settings.data_dir.as_deref(),
        Some(std::path::Path::new("/srv/budgets/2026"))
    );
}
