// crates/sut-control-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Tests
// Description: Tests for TOML loading, size limits, and strict parsing.
// ============================================================================
//! ## Overview
//! Validates that configuration loading fails closed on missing files,
//! unknown fields, and non-UTF-8 content.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::path::Path;

use sut_control_config::ConfigError;
use sut_control_config::ControllerConfig;
use sut_control_config::SutMode;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const VALID_REMOTE_CONFIG: &str = r#"[server]
bind = "127.0.0.1:40100"

[sut]
mode = "remote"
base_url = "http://127.0.0.1:8080"
"#;

fn write_config(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("sut-control.toml");
    std::fs::write(&path, contents).expect("write config");
    path
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn loads_a_valid_remote_config() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = write_config(temp.path(), VALID_REMOTE_CONFIG);
    let config = ControllerConfig::load(Some(&path)).expect("load config");
    assert_eq!(config.sut.mode, SutMode::Remote);
    assert_eq!(config.server.bind, "127.0.0.1:40100");
    assert_eq!(config.sut.health_path, "/health");
    assert_eq!(config.sut.reset_path, "/reset");
    assert!(config.sut.shutdown_path.is_none());
}

#[test]
fn missing_file_is_an_io_error() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = temp.path().join("absent.toml");
    let result = ControllerConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn unknown_fields_are_rejected() {
    let temp = tempfile::tempdir().expect("temp dir");
    let contents = format!("{VALID_REMOTE_CONFIG}\n[surprise]\nvalue = 1\n");
    let path = write_config(temp.path(), &contents);
    let result = ControllerConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn non_utf8_content_is_rejected() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = temp.path().join("sut-control.toml");
    std::fs::write(&path, [0xff, 0xfe, 0x00]).expect("write config");
    let result = ControllerConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn oversized_file_is_rejected() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = temp.path().join("sut-control.toml");
    let padding = format!("{VALID_REMOTE_CONFIG}# {}\n", "x".repeat(1024 * 1024));
    std::fs::write(&path, padding).expect("write config");
    let result = ControllerConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}
