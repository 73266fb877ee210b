//! External command execution
//!
//! Every external tool the pipelines call goes through [`ProcessRunner`].
//! Success and failure come back on separate paths: a nonzero exit is an
//! `Err(CommandError::Failed)`, never an `Ok` with a status to inspect.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::{CredentialContext, PipelineStep};
use crate::error::CommandError;
use crate::tools::get_tool_path;

/// A command to run: tool, arguments, directory and extra environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Relative to the runner's project root
    pub working_dir: PathBuf,
    pub env: Vec<(String, String)>,
    /// Echo the command line and its output to the console
    pub echo: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            working_dir: PathBuf::from("."),
            env: Vec::new(),
            echo: true,
        }
    }

    /// Builder: apply the credential context to the child's environment
    pub fn with_credentials(mut self, credentials: &CredentialContext) -> Self {
        self.env.extend(
            credentials
                .env_vars()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v)),
        );
        self
    }

    /// Builder: do not echo anything to the console
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<&PipelineStep> for CommandSpec {
    fn from(step: &PipelineStep) -> Self {
        Self {
            program: step.program.clone(),
            args: step.args.clone(),
            working_dir: step.working_dir.clone(),
            env: Vec::new(),
            echo: true,
        }
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `spec` to completion
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

/// Runs commands as child processes of this tool
pub struct SystemRunner {
    root: PathBuf,
    /// No limit when `None`; a hung command then blocks the session
    step_timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            step_timeout: None,
        }
    }

    /// Builder: give every command a time limit
    pub fn with_timeout(mut self, step_timeout: Option<Duration>) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn spinner(command_line: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Running {}", command_line));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let command_line = spec.command_line();
        let working_dir = self.root.join(&spec.working_dir);

        if spec.echo {
            println!("{}", format!("#{}", command_line).bright_black());
        }
        debug!("Executing: {} in {:?}", command_line, working_dir);

        let mut cmd = Command::new(get_tool_path(&spec.program));
        cmd.args(&spec.args)
            .current_dir(&working_dir)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| CommandError::Spawn {
            command: command_line.clone(),
            message: e.to_string(),
        })?;

        let pb = spec.echo.then(|| Self::spinner(&command_line));

        let waited = match self.step_timeout {
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    if let Some(pb) = pb {
                        pb.finish_and_clear();
                    }
                    return Err(CommandError::Timeout {
                        command: command_line,
                        timeout: limit,
                    });
                }
            },
            None => child.wait_with_output().await,
        };

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        let output = waited.map_err(|e| CommandError::Spawn {
            command: command_line.clone(),
            message: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            if spec.echo && !stdout.trim().is_empty() {
                println!("{}", stdout.trim_end());
            }
            Ok(CommandOutput { stdout, stderr })
        } else {
            debug!("{} exited with {:?}", command_line, output.status.code());
            Err(CommandError::Failed {
                command: command_line,
                code: output.status.code(),
                stdout,
                stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_line_from_step() {
        let spec = CommandSpec::new("sls", &["create_domain", "--stage", "dev"]);
        assert_eq!(spec.command_line(), "sls create_domain --stage dev");
    }

    #[test]
    fn test_credentials_become_child_env() {
        let spec = CommandSpec::new("npm", &["install"])
            .with_credentials(&CredentialContext::with_profile("p1"));
        assert_eq!(
            spec.env,
            vec![("AWS_PROFILE".to_string(), "p1".to_string())]
        );

        let inherited =
            CommandSpec::new("npm", &["install"]).with_credentials(&CredentialContext::inherited());
        assert!(inherited.env.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_captures_stdout() {
        let dir = TempDir::new().unwrap();
        let runner = SystemRunner::new(dir.path());
        let spec = CommandSpec::new("sh", &["-c", "echo hello"]).quiet();

        let output = runner.run(&spec).await.unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failure_with_stderr() {
        let dir = TempDir::new().unwrap();
        let runner = SystemRunner::new(dir.path());
        let spec = CommandSpec::new("sh", &["-c", "echo broken >&2; exit 3"]).quiet();

        let err = runner.run(&spec).await.unwrap_err();
        match err {
            CommandError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_command_keeps_its_stdout() {
        let dir = TempDir::new().unwrap();
        let runner = SystemRunner::new(dir.path());
        let spec = CommandSpec::new(
            "sh",
            &["-c", "echo 'TESTRUNNER: 3 assertions failed'; exit 1"],
        )
        .quiet();

        let err = runner.run(&spec).await.unwrap_err();
        assert_eq!(err.stdout(), Some("TESTRUNNER: 3 assertions failed\n"));
        assert_eq!(err.stderr(), None);
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let runner = SystemRunner::new(dir.path());
        let spec = CommandSpec::new("locus-definitely-not-installed", &[]).quiet();

        let err = runner.run(&spec).await.unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_child_env_and_working_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("api")).unwrap();
        let runner = SystemRunner::new(dir.path());
        let mut spec = CommandSpec::new("sh", &["-c", "echo $AWS_PROFILE; basename $(pwd)"])
            .with_credentials(&CredentialContext::with_profile("locus-live"))
            .quiet();
        spec.working_dir = PathBuf::from("api");

        let output = runner.run(&spec).await.unwrap();
        let lines: Vec<&str> = output.stdout.lines().collect();
        assert_eq!(lines, vec!["locus-live", "api"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_hung_command() {
        let dir = TempDir::new().unwrap();
        let runner =
            SystemRunner::new(dir.path()).with_timeout(Some(Duration::from_millis(200)));
        let spec = CommandSpec::new("sh", &["-c", "sleep 5"]).quiet();

        let err = runner.run(&spec).await.unwrap_err();
        assert!(matches!(err, CommandError::Timeout { .. }));
    }
}
