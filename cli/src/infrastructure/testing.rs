//! Test doubles for the process runner and operator input

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{CommandError, SessionError};

use super::process::{CommandOutput, CommandSpec, ProcessRunner};
use super::prompt::{confirm_hint, parse_confirmation, Prompter};

/// Records every command instead of running it
///
/// Clones share the same log, so a test can keep a handle after moving the
/// runner into a service.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<CommandSpec>>>,
    /// Command-line prefix and the stdout the failing command leaves behind
    failing: Arc<Vec<(String, String)>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: make any command whose line starts with `prefix` fail
    pub fn failing_on(self, prefix: &str) -> Self {
        self.failing_with_output(prefix, "")
    }

    /// Builder: like [`failing_on`](Self::failing_on), printing `stdout` first
    pub fn failing_with_output(mut self, prefix: &str, stdout: &str) -> Self {
        let mut failing = (*self.failing).clone();
        failing.push((prefix.to_string(), stdout.to_string()));
        self.failing = Arc::new(failing);
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(CommandSpec::command_line).collect()
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push(spec.clone());

        let line = spec.command_line();
        let failure = self
            .failing
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()));
        if let Some((_, stdout)) = failure {
            return Err(CommandError::Failed {
                command: line,
                code: Some(1),
                stdout: stdout.clone(),
                stderr: "simulated failure".to_string(),
            });
        }

        Ok(CommandOutput::default())
    }
}

/// Answers prompts from a fixed script, then reports end of input
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
    pub notes: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
            notes: Vec::new(),
        }
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>, SessionError> {
        self.asked.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }

    async fn confirm(
        &mut self,
        prompt: &str,
        default: bool,
    ) -> Result<Option<bool>, SessionError> {
        let answer = self
            .ask(&format!("{} {}", prompt, confirm_hint(default)))
            .await?;
        Ok(answer.map(|a| parse_confirmation(&a, default)))
    }

    fn note(&mut self, text: &str) {
        self.notes.push(text.to_string());
    }
}
