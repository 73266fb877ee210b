//! Deployment pipeline domain types
//!
//! Each deployable unit is an ordered list of external commands. Plans are
//! pure data: they are built (and every setting they need is checked) before
//! the first command runs, and execution lives in
//! [`crate::services::DeployService`].

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{SettingKey, StageSettings};
use crate::error::ConfigError;
use crate::tools::tools;

/// Default answer for the web deploy path prompt
pub const DEFAULT_WEB_PATH: &str = "main";

/// Key the API export step writes the CDN distribution id under
pub const DISTRIBUTION_ENV_KEY: &str = "cfdist";

/// Environment file written by `sls export-env` in the API directory
pub const API_ENV_FILE: &str = "api/.env";

/// Units that can be deployed from the stage menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployUnit {
    Scrape,
    WebSocket,
    Api,
    Web,
    Sql,
    SqlUpgrade,
    Tests,
}

impl DeployUnit {
    /// Units run by `all`, in order
    pub const ALL_SEQUENCE: [DeployUnit; 4] = [
        DeployUnit::Api,
        DeployUnit::WebSocket,
        DeployUnit::Scrape,
        DeployUnit::Web,
    ];

    /// Menu command that selects this unit
    pub fn command(&self) -> &'static str {
        match self {
            Self::Scrape => "scrape",
            Self::WebSocket => "ws",
            Self::Api => "api",
            Self::Web => "web",
            Self::Sql => "sql",
            Self::SqlUpgrade => "usql",
            Self::Tests => "tests",
        }
    }

    pub fn from_command(cmd: &str) -> Option<Self> {
        match cmd {
            "scrape" => Some(Self::Scrape),
            "ws" => Some(Self::WebSocket),
            "api" => Some(Self::Api),
            "web" => Some(Self::Web),
            "sql" => Some(Self::Sql),
            "usql" => Some(Self::SqlUpgrade),
            "tests" => Some(Self::Tests),
            _ => None,
        }
    }

    /// Human-readable name for the unit
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scrape => "Scraper",
            Self::WebSocket => "Websocket",
            Self::Api => "API",
            Self::Web => "Web interface",
            Self::Sql => "SQL",
            Self::SqlUpgrade => "SQL upgrade",
            Self::Tests => "Tests",
        }
    }

    /// Verb for a successful run, read as "<name> <verb> <stage>"
    pub fn outcome_verb(&self) -> &'static str {
        match self {
            Self::SqlUpgrade => "applied to",
            Self::Tests => "passed on",
            _ => "deployed to",
        }
    }

    /// Directory (relative to the project root) the unit's commands run in
    pub fn working_dir(&self) -> &'static str {
        match self {
            Self::Scrape => "scrape",
            Self::WebSocket => "websocket",
            Self::Api => "api",
            Self::Web | Self::Sql | Self::SqlUpgrade | Self::Tests => ".",
        }
    }
}

/// Kind of work a single pipeline step performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Install,
    CreateDomain,
    Deploy,
    ExportEnv,
    Bundle,
    DeploySite,
    DeploySql,
    UpgradeSql,
    RunTests,
}

impl StepKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Install => "Install dependencies",
            Self::CreateDomain => "Create domain",
            Self::Deploy => "Deploy",
            Self::ExportEnv => "Export environment",
            Self::Bundle => "Bundle assets",
            Self::DeploySite => "Deploy site",
            Self::DeploySql => "Deploy SQL",
            Self::UpgradeSql => "Upgrade SQL",
            Self::RunTests => "Run tests",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Install => "📦",
            Self::CreateDomain => "🌐",
            Self::Deploy | Self::DeploySite => "🚀",
            Self::ExportEnv => "📝",
            Self::Bundle => "🔨",
            Self::DeploySql | Self::UpgradeSql => "🗃️",
            Self::RunTests => "🧪",
        }
    }
}

/// One external command in a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStep {
    pub kind: StepKind,
    /// Tool name, resolved to a binary by the process runner
    pub program: String,
    pub args: Vec<String>,
    /// Relative to the project root
    pub working_dir: PathBuf,
}

impl PipelineStep {
    fn new(kind: StepKind, unit: DeployUnit, program: &str, args: Vec<String>) -> Self {
        Self {
            kind,
            program: program.to_string(),
            args,
            working_dir: PathBuf::from(unit.working_dir()),
        }
    }

    /// Command line as echoed to the operator
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Inputs the web deploy needs beyond the stage settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebParams {
    /// CDN distribution id exported by the API deploy
    pub distribution: String,
    /// Site path to publish under
    pub path: String,
}

/// Fully resolved steps for one unit on one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    pub stage: String,
    pub unit: DeployUnit,
    pub steps: Vec<PipelineStep>,
}

impl DeployPlan {
    /// Build the plan for `unit`, failing if any setting it needs is absent
    ///
    /// `web` is only consulted for [`DeployUnit::Web`].
    pub fn build(
        unit: DeployUnit,
        stage: &str,
        settings: &StageSettings,
        web: Option<&WebParams>,
    ) -> Result<Self, ConfigError> {
        let stage_flag = || vec!["--stage".to_string(), stage.to_string()];
        let stage_eq = || format!("--stage={}", stage);

        let install = || PipelineStep::new(StepKind::Install, unit, tools::NPM, vec!["install".into()]);
        let create_domain = || {
            let mut args = vec!["create_domain".to_string()];
            args.extend(stage_flag());
            PipelineStep::new(StepKind::CreateDomain, unit, tools::SLS, args)
        };
        let deploy = || {
            let mut args = vec!["deploy".to_string()];
            args.extend(stage_flag());
            PipelineStep::new(StepKind::Deploy, unit, tools::SERVERLESS, args)
        };
        let grunt = |kind: StepKind, task: &str| {
            PipelineStep::new(kind, unit, tools::GRUNT, vec![task.to_string(), stage_eq()])
        };

        let steps = match unit {
            DeployUnit::Scrape => vec![install(), deploy()],
            DeployUnit::WebSocket => vec![install(), create_domain(), deploy()],
            DeployUnit::Api => {
                let mut args = vec!["export-env".to_string()];
                args.extend(stage_flag());
                let export = PipelineStep::new(StepKind::ExportEnv, unit, tools::SLS, args);
                vec![install(), create_domain(), deploy(), export]
            }
            DeployUnit::Web => {
                let web = web.ok_or_else(|| ConfigError::MissingEnvKey {
                    path: API_ENV_FILE.to_string(),
                    key: DISTRIBUTION_ENV_KEY.to_string(),
                })?;
                let profile = settings.require(stage, SettingKey::Profile)?;
                let domain = settings.require(stage, SettingKey::Domain)?;
                let region = settings.require(stage, SettingKey::Region)?;

                let bundle = PipelineStep::new(
                    StepKind::Bundle,
                    unit,
                    tools::WEBPACK,
                    vec!["--config".into(), "webpack.config.js".into()],
                );
                let site = PipelineStep::new(
                    StepKind::DeploySite,
                    unit,
                    tools::GRUNT,
                    vec![
                        "deploySite".to_string(),
                        format!("--profile={}", profile),
                        stage_eq(),
                        format!("--distribution={}", web.distribution),
                        format!("--bucket={}", domain),
                        format!("--region={}", region),
                        format!("--path={}", web.path),
                    ],
                );
                vec![bundle, site]
            }
            DeployUnit::Sql => vec![grunt(StepKind::DeploySql, "deploySQLFull")],
            DeployUnit::SqlUpgrade => vec![grunt(StepKind::UpgradeSql, "deploySQLupgrade")],
            DeployUnit::Tests => vec![grunt(StepKind::RunTests, "runTests")],
        };

        Ok(Self {
            stage: stage.to_string(),
            unit,
            steps,
        })
    }
}

/// Outcome of one executed step
#[derive(Debug, Clone)]
pub struct StepResult {
    pub kind: StepKind,
    pub command_line: String,
    pub success: bool,
    pub duration: Duration,
    pub message: Option<String>,
    /// Console output of a failed step
    pub output: Option<String>,
}

impl StepResult {
    pub fn success(step: &PipelineStep, duration: Duration) -> Self {
        Self {
            kind: step.kind,
            command_line: step.command_line(),
            success: true,
            duration,
            message: None,
            output: None,
        }
    }

    pub fn failure(step: &PipelineStep, duration: Duration, message: impl Into<String>) -> Self {
        Self {
            kind: step.kind,
            command_line: step.command_line(),
            success: false,
            duration,
            message: Some(message.into()),
            output: None,
        }
    }

    pub fn with_output(mut self, output: Option<&str>) -> Self {
        self.output = output.map(str::to_string);
        self
    }
}

/// Where a pipeline run ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Completed,
    /// Stopped at this step; later steps were not run
    Failed(StepKind),
}

/// Results of running one plan
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub stage: String,
    pub unit: DeployUnit,
    pub results: Vec<StepResult>,
    pub phase: PipelinePhase,
    /// Steps never started because an earlier one failed
    pub skipped: usize,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        self.phase == PipelinePhase::Completed
    }
}
