//! Guided stage creation
//!
//! A fixed, ordered list of questions. The first answer names the stage;
//! every later answer (or its default) fills one setting.

use crate::config::{SettingKey, StageSettings};

/// Where a question's answer goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionTarget {
    /// The answer is the new stage's name
    StageName,
    Setting(SettingKey),
}

/// One wizard question
#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub target: QuestionTarget,
    pub text: &'static str,
    pub default: &'static str,
    /// Printed before the prompt when present
    pub details: Option<&'static str>,
}

impl Question {
    const fn setting(key: SettingKey, text: &'static str, default: &'static str) -> Self {
        Self {
            target: QuestionTarget::Setting(key),
            text,
            default,
            details: None,
        }
    }

    /// Prompt line, e.g. `AWS region [eu-west-1]?`
    pub fn prompt(&self) -> String {
        format!("{} [{}]?", self.text, self.default)
    }
}

pub const QUESTIONS: &[Question] = &[
    Question {
        target: QuestionTarget::StageName,
        text: "Stage name",
        default: "dev",
        details: Some(
            "Give the deployment stage a name, EG dev|test|live. \
             This is used to reference this profile in the future",
        ),
    },
    Question {
        target: QuestionTarget::Setting(SettingKey::Profile),
        text: "AWS profile to use",
        default: "default",
        details: Some(
            "You need aws cli install and configured to access your account, \
             enter the profile used here",
        ),
    },
    Question::setting(SettingKey::Region, "AWS region", "eu-west-1"),
    Question::setting(
        SettingKey::Cron,
        "Cron string to use for scraper",
        "cron(0/10 * ? * MON-FRI *)",
    ),
    Question::setting(
        SettingKey::Domain,
        "Domain name to use for website",
        "api.vialocus.co.uk",
    ),
    Question::setting(
        SettingKey::RestDomain,
        "Domain name to use for rest api",
        "api.vialocus.co.uk",
    ),
    Question::setting(
        SettingKey::WsDomain,
        "Domain name to use for websocket",
        "ws.vialocus.co.uk",
    ),
    Question::setting(
        SettingKey::CertArn,
        "AWS cert ARN",
        "arn:aws:acm:us-east-1:xxxxxxxxxxxxxxxx",
    ),
    Question::setting(SettingKey::AuroraDatabaseName, "Aurora database name", "locus"),
    Question::setting(SettingKey::AuroraMasterUser, "Aurora master user", "locus"),
    Question::setting(SettingKey::AuroraMasterPass, "Aurora master password", "CHANGEME"),
    Question::setting(
        SettingKey::OsDataHubProductUrl,
        "OS Data Hub Product URL (Data Downloads)",
        "https://api.os.uk/downloads/v1/products",
    ),
    Question::setting(
        SettingKey::Tmp,
        "Temporary local storage for downloads",
        "/tmp",
    ),
];

/// Answers collected so far for a new stage
#[derive(Debug, Clone)]
pub struct ConfigWizard {
    questions: &'static [Question],
    index: usize,
    stage: Option<String>,
    settings: StageSettings,
}

impl Default for ConfigWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigWizard {
    pub fn new() -> Self {
        Self::with_questions(QUESTIONS)
    }

    pub fn with_questions(questions: &'static [Question]) -> Self {
        Self {
            questions,
            index: 0,
            stage: None,
            settings: StageSettings::default(),
        }
    }

    /// Question awaiting an answer, or `None` once all are answered
    pub fn current(&self) -> Option<&'static Question> {
        self.questions.get(self.index)
    }

    /// Record the answer to the current question
    ///
    /// An empty answer takes the default; anything else is stored verbatim.
    /// Returns the value that was stored. Answers are not validated.
    pub fn answer(&mut self, input: &str) -> Option<String> {
        let question = self.current()?;
        let value = if input.is_empty() {
            question.default.to_string()
        } else {
            input.to_string()
        };

        match question.target {
            QuestionTarget::StageName => {
                self.stage = Some(value.clone());
                self.settings = StageSettings::default();
            }
            QuestionTarget::Setting(key) => self.settings.set(key, value.clone()),
        }

        self.index += 1;
        Some(value)
    }

    /// Name chosen for the stage, once the stage question has been answered
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.questions.len()
    }

    /// Stage name and settings, once every question has been answered
    pub fn finish(self) -> Option<(String, StageSettings)> {
        if !self.is_complete() {
            return None;
        }
        self.stage.map(|stage| (stage, self.settings))
    }
}
