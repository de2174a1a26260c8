// crates/sut-control-drivers/src/process.rs
// ============================================================================
// Module: Process SUT Handle
// Description: Handle spawning and supervising the SUT as a child process.
// Purpose: Manage out-of-process SUT lifecycles without leaking the child.
// Dependencies: crate::hooks, sut-control-core
// ============================================================================

//! ## Overview
//! [`ProcessSut`] spawns the SUT with the configured command line, waits for
//! its health probe to answer, and kills the child on shutdown. A boot whose
//! readiness window expires kills the child before reporting failure, and a
//! drop guard kills it if the handle is abandoned, so no exit path leaks the
//! process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::process::Child;
use std::process::Command;
use std::process::Stdio;

use async_trait::async_trait;
use sut_control_core::SutEndpoint;
use sut_control_core::SutError;
use sut_control_core::SutHandle;

use crate::hooks::HookClient;
use crate::hooks::SutHooksConfig;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for a process-managed SUT.
///
/// # Invariants
/// - `command` is non-empty; the first element is the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSutConfig {
    /// Command line used to spawn the SUT.
    pub command: Vec<String>,
    /// Environment variables passed to the child.
    pub env: BTreeMap<String, String>,
    /// Hook addressing for the spawned instance.
    pub hooks: SutHooksConfig,
}

// ============================================================================
// SECTION: Process Handle
// ============================================================================

/// Handle spawning the SUT as a supervised child process.
///
/// # Invariants
/// - `child` is present exactly while a spawned instance may be running.
pub struct ProcessSut {
    /// Spawn configuration for the child.
    config: ProcessSutConfig,
    /// Hook client over the instance's admin endpoints.
    hooks: HookClient,
    /// Running child process, when booted.
    child: Option<Child>,
    /// Endpoint recorded at the last successful boot.
    endpoint: Option<SutEndpoint>,
}

impl ProcessSut {
    /// Creates a process handle for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SutError`] when the configuration is invalid.
    pub fn new(config: ProcessSutConfig) -> Result<Self, SutError> {
        if config.command.is_empty() {
            return Err(SutError::Boot("process sut requires a command".to_string()));
        }
        let hooks = HookClient::new(&config.hooks)?;
        Ok(Self {
            config,
            hooks,
            child: None,
            endpoint: None,
        })
    }

    /// Spawns the configured child process.
    fn spawn_child(&self) -> Result<Child, SutError> {
        let program = self
            .config
            .command
            .first()
            .ok_or_else(|| SutError::Boot("process sut requires a command".to_string()))?;
        let mut command = Command::new(program);
        command
            .args(&self.config.command[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        for (key, value) in &self.config.env {
            command.env(key, value);
        }
        command.spawn().map_err(|err| SutError::Boot(format!("spawn {program} failed: {err}")))
    }

    /// Kills and reaps the child, releasing the process resource.
    fn kill_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[async_trait]
impl SutHandle for ProcessSut {
    async fn boot(&mut self) -> Result<SutEndpoint, SutError> {
        let child = self.spawn_child()?;
        self.child = Some(child);
        if let Err(err) = self.hooks.await_ready().await {
            // A child that never became ready must not outlive the boot.
            self.kill_child();
            return Err(err);
        }
        let endpoint = self.hooks.endpoint();
        self.endpoint = Some(endpoint.clone());
        Ok(endpoint)
    }

    fn locate(&self) -> Option<SutEndpoint> {
        self.endpoint.clone()
    }

    async fn reset(&mut self) -> Result<(), SutError> {
        self.hooks.signal_reset().await
    }

    async fn shutdown(&mut self) -> Result<(), SutError> {
        self.endpoint = None;
        if self.child.is_some() {
            // Best-effort polite shutdown before the kill.
            let _ = self.hooks.signal_shutdown().await;
        }
        self.kill_child();
        Ok(())
    }
}

impl Drop for ProcessSut {
    fn drop(&mut self) {
        self.kill_child();
    }
}
