// crates/sut-control-cli/src/main.rs
// ============================================================================
// Module: SUT Control CLI
// Description: Command-line entry point for the controller service.
// Purpose: Serve a configured controller and validate configuration files.
// Dependencies: clap, sut-control-config, sut-control-drivers, sut-control-server
// ============================================================================

//! ## Overview
//! The CLI runs a controller service for a SUT described in a TOML file,
//! either addressing an independently started instance or spawning it as a
//! managed child process. All user-facing output goes to stderr; failures
//! map to a non-zero exit code with a single-line error.
//!
//! Security posture: CLI inputs are untrusted and must be validated; see
//! `Docs/security/threat_model.md`.

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use sut_control_config::ControllerConfig;
use sut_control_config::SutConfig;
use sut_control_config::SutMode;
use sut_control_core::ReadinessProbe;
use sut_control_core::SutHandle;
use sut_control_drivers::ProcessSut;
use sut_control_drivers::ProcessSutConfig;
use sut_control_drivers::RemoteSut;
use sut_control_drivers::SutHooksConfig;
use sut_control_server::ControllerServer;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Top-level CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "sut-control", about = "Controller service for systems under test")]
struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Supported subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the controller service for the configured SUT.
    Serve(ServeCommand),
    /// Validate a controller configuration file.
    Check(CheckCommand),
}

/// Configuration for the `serve` command.
#[derive(Debug, Args)]
struct ServeCommand {
    /// Path to the controller configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Configuration for the `check` command.
#[derive(Debug, Args)]
struct CheckCommand {
    /// Path to the controller configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: CLI Errors
// ============================================================================

/// User-facing CLI error.
#[derive(Debug)]
struct CliError {
    /// Single-line error message.
    message: String,
}

impl CliError {
    /// Creates a CLI error with the given message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result alias for CLI command handlers.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            let _ = write_stderr_line(&format!("error: {}", err.message));
            ExitCode::FAILURE
        }
    }
}

/// Dispatches the parsed CLI to its command handler.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Check(command) => command_check(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = ControllerConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let handle = build_handle(&config.sut)?;
    let bound = ControllerServer::new(config.server, handle)
        .bind()
        .await
        .map_err(|err| CliError::new(format!("controller bind failed: {err}")))?;
    write_stderr_line(&format!("controller listening on {}", bound.local_addr()))?;
    bound.serve().await.map_err(|err| CliError::new(format!("controller failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `check` command.
fn command_check(command: &CheckCommand) -> CliResult<ExitCode> {
    ControllerConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config invalid: {err}")))?;
    write_stderr_line("config ok")?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Handle Construction
// ============================================================================

/// Builds the SUT handle selected by the configuration.
fn build_handle(sut: &SutConfig) -> CliResult<Box<dyn SutHandle>> {
    let hooks = hooks_from(sut);
    let handle: Box<dyn SutHandle> = match sut.mode {
        SutMode::Remote => Box::new(
            RemoteSut::new(&hooks)
                .map_err(|err| CliError::new(format!("sut handle init failed: {err}")))?,
        ),
        SutMode::Process => Box::new(
            ProcessSut::new(ProcessSutConfig {
                command: sut.command.clone(),
                env: sut.env.clone(),
                hooks,
            })
            .map_err(|err| CliError::new(format!("sut handle init failed: {err}")))?,
        ),
    };
    Ok(handle)
}

/// Maps the SUT configuration onto hook addressing.
fn hooks_from(sut: &SutConfig) -> SutHooksConfig {
    SutHooksConfig {
        base_url: sut.base_url.clone(),
        health_path: sut.health_path.clone(),
        reset_path: sut.reset_path.clone(),
        shutdown_path: sut.shutdown_path.clone(),
        request_timeout: Duration::from_millis(sut.request_timeout_ms),
        readiness: ReadinessProbe {
            timeout: Duration::from_millis(sut.readiness.timeout_ms),
            poll_interval: Duration::from_millis(sut.readiness.poll_interval_ms),
        },
    }
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a single line to stderr, failing closed on I/O errors.
fn write_stderr_line(message: &str) -> CliResult<()> {
    let mut stderr = std::io::stderr().lock();
    writeln!(stderr, "{message}")
        .map_err(|err| CliError::new(format!("stderr write failed: {err}")))
}
