//! Centralized error types for locus-config
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use std::time::Duration;

use thiserror::Error;

/// Top-level error for the tool
#[derive(Error, Debug)]
pub enum LocusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Environment check failed: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Configuration store and stage settings errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: String },

    #[error("Failed to parse config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to write config {path}: {message}")]
    Write { path: String, message: String },

    #[error("Stage '{stage}' has no '{setting}' setting. Add it with `a` or edit the config file")]
    MissingSetting { stage: String, setting: String },

    #[error("Unknown stage '{stage}'. Use `l` to list configured stages")]
    UnknownStage { stage: String },

    #[error("No stages configured. Use `a` to add one")]
    NoStages,

    #[error("Failed to read environment file {path}: {message}")]
    EnvFile { path: String, message: String },

    #[error("Environment file {path} has no '{key}' entry. Deploy the API first")]
    MissingEnvKey { path: String, key: String },
}

/// External command errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to start `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("`{command}` failed with {}", exit_description(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("`{command}` timed out after {}", format_timeout(.timeout))]
    Timeout { command: String, timeout: Duration },
}

impl CommandError {
    /// Captured stdout of a command that ran but failed
    pub fn stdout(&self) -> Option<&str> {
        match self {
            Self::Failed { stdout, .. } if !stdout.trim().is_empty() => Some(stdout),
            _ => None,
        }
    }

    /// Captured stderr, when the command got far enough to produce any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } if !stderr.trim().is_empty() => Some(stderr),
            _ => None,
        }
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn format_timeout(timeout: &Duration) -> String {
    humantime::format_duration(*timeout).to_string()
}

/// Startup precondition errors
#[derive(Error, Debug)]
pub enum PreconditionError {
    #[error(
        "AWS CLI is not found please install https://docs.aws.amazon.com/cli/latest/userguide/install-windows.html"
    )]
    CloudCliUnavailable { detail: String },
}

/// Interactive session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to read input: {0}")]
    Input(#[from] std::io::Error),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}
