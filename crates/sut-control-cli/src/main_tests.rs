// crates/sut-control-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and handle construction.
// Purpose: Ensure the CLI maps configuration onto driver handles correctly.
// Dependencies: sut-control-cli main helpers
// ============================================================================

//! ## Overview
//! Validates CLI parsing, the config-to-hooks mapping, and the `check`
//! command against on-disk configuration files.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use sut_control_config::ReadinessConfig;
use sut_control_config::SutConfig;
use sut_control_config::SutMode;

use super::CheckCommand;
use super::Cli;
use super::Commands;
use super::build_handle;
use super::command_check;
use super::hooks_from;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn remote_sut_config() -> SutConfig {
    SutConfig {
        mode: SutMode::Remote,
        base_url: "http://127.0.0.1:8080".to_string(),
        command: Vec::new(),
        env: BTreeMap::new(),
        health_path: "/health".to_string(),
        reset_path: "/admin/reset".to_string(),
        shutdown_path: Some("/admin/shutdown".to_string()),
        request_timeout_ms: 1_500,
        readiness: ReadinessConfig {
            timeout_ms: 3_000,
            poll_interval_ms: 25,
        },
    }
}

// ============================================================================
// SECTION: Parsing Tests
// ============================================================================

#[test]
fn parses_serve_with_a_config_path() {
    let cli = Cli::try_parse_from(["sut-control", "serve", "--config", "controller.toml"])
        .expect("parse serve");
    match cli.command {
        Commands::Serve(command) => {
            assert_eq!(command.config, Some(PathBuf::from("controller.toml")));
        }
        Commands::Check(_) => panic!("expected serve command"),
    }
}

#[test]
fn parses_check_without_a_config_path() {
    let cli = Cli::try_parse_from(["sut-control", "check"]).expect("parse check");
    match cli.command {
        Commands::Check(command) => assert!(command.config.is_none()),
        Commands::Serve(_) => panic!("expected check command"),
    }
}

#[test]
fn rejects_unknown_subcommands() {
    assert!(Cli::try_parse_from(["sut-control", "launch"]).is_err());
}

// ============================================================================
// SECTION: Handle Construction Tests
// ============================================================================

#[test]
fn hooks_mapping_carries_paths_and_timings() {
    let sut = remote_sut_config();
    let hooks = hooks_from(&sut);
    assert_eq!(hooks.base_url, "http://127.0.0.1:8080");
    assert_eq!(hooks.health_path, "/health");
    assert_eq!(hooks.reset_path, "/admin/reset");
    assert_eq!(hooks.shutdown_path.as_deref(), Some("/admin/shutdown"));
    assert_eq!(hooks.request_timeout, Duration::from_millis(1_500));
    assert_eq!(hooks.readiness.timeout, Duration::from_millis(3_000));
    assert_eq!(hooks.readiness.poll_interval, Duration::from_millis(25));
}

#[test]
fn builds_handles_for_both_modes() {
    build_handle(&remote_sut_config()).expect("remote handle");
    let mut process = remote_sut_config();
    process.mode = SutMode::Process;
    process.command = vec!["./sample-sut".to_string()];
    build_handle(&process).expect("process handle");
}

// ============================================================================
// SECTION: Check Command Tests
// ============================================================================

#[test]
fn check_accepts_a_valid_config_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = temp.path().join("sut-control.toml");
    std::fs::write(
        &path,
        "[sut]\nmode = \"remote\"\nbase_url = \"http://127.0.0.1:8080\"\n",
    )
    .expect("write config");
    let command = CheckCommand {
        config: Some(path),
    };
    assert!(command_check(&command).is_ok());
}

#[test]
fn check_rejects_a_missing_config_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    let command = CheckCommand {
        config: Some(temp.path().join("absent.toml")),
    };
    assert!(command_check(&command).is_err());
}
