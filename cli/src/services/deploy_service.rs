//! Deploy service - runs pipeline plans
//!
//! Steps run strictly in order. The first failing step stops the plan;
//! nothing is retried or rolled back, so a partial deployment is possible.

use std::path::PathBuf;
use std::time::Instant;

use colored::Colorize;
use tracing::{debug, info, warn};

use crate::domain::pipeline::{
    PipelinePhase, StepResult, API_ENV_FILE, DEFAULT_WEB_PATH, DISTRIBUTION_ENV_KEY,
};
use crate::domain::{CredentialContext, DeployPlan, PipelineReport, WebParams};
use crate::error::{CommandError, ConfigError};
use crate::infrastructure::env_file::read_env_value;
use crate::infrastructure::{CommandSpec, ProcessRunner};
use crate::ui;

/// Service for executing deployment plans
pub struct DeployService<R: ProcessRunner> {
    runner: R,
    /// Directory holding `api/`, `scrape/`, `websocket/`
    root: PathBuf,
}

impl<R: ProcessRunner> DeployService<R> {
    pub fn new(runner: R, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
        }
    }

    /// Parameters for the web deploy: the exported CDN distribution and a site path
    ///
    /// A blank `path` falls back to [`DEFAULT_WEB_PATH`].
    pub fn web_params(&self, path: &str) -> Result<WebParams, ConfigError> {
        let distribution = read_env_value(&self.root.join(API_ENV_FILE), DISTRIBUTION_ENV_KEY)?;
        let path = match path.trim() {
            "" => DEFAULT_WEB_PATH.to_string(),
            p => p.to_string(),
        };
        Ok(WebParams { distribution, path })
    }

    /// Run every step of `plan`, stopping at the first failure
    pub async fn execute(&self, plan: &DeployPlan, credentials: &CredentialContext) -> PipelineReport {
        self.print_header(plan);
        info!("Running `{}` for stage {}", plan.unit.command(), plan.stage);
        if let Some(profile) = credentials.profile() {
            info!("Using AWS profile {}", profile);
        }

        let mut results = Vec::new();
        let mut phase = PipelinePhase::Completed;

        for (index, step) in plan.steps.iter().enumerate() {
            info!(
                "{} Starting: {} ({}/{})",
                step.kind.emoji(),
                step.kind.name(),
                index + 1,
                plan.steps.len()
            );

            let spec = CommandSpec::from(step).with_credentials(credentials);
            let start = Instant::now();
            let outcome = self.runner.run(&spec).await;
            let duration = start.elapsed();

            match outcome {
                Ok(_) => {
                    info!(
                        "{} completed in {:.1}s",
                        step.kind.name(),
                        duration.as_secs_f64()
                    );
                    results.push(StepResult::success(step, duration));
                }
                Err(e) => {
                    warn!("{} failed: {}", step.kind.name(), e);
                    ui::print_error(&format!("command FAILED! {}", e));
                    if let CommandError::Failed { code, .. } = &e {
                        debug!("{} exit code {:?}", step.kind.name(), code);
                    }
                    if let Some(stdout) = e.stdout() {
                        println!("{}", stdout.trim_end());
                    }
                    if let Some(stderr) = e.stderr() {
                        eprintln!("{}", stderr.trim_end().bright_black());
                    }
                    results.push(
                        StepResult::failure(step, duration, e.to_string()).with_output(e.stdout()),
                    );
                    phase = PipelinePhase::Failed(step.kind);
                    break;
                }
            }
        }

        let report = PipelineReport {
            stage: plan.stage.clone(),
            unit: plan.unit,
            skipped: plan.steps.len() - results.len(),
            results,
            phase,
        };
        self.print_summary(&report);
        report
    }

    fn print_header(&self, plan: &DeployPlan) {
        ui::print_header(&format!("Deploy {} → {}", plan.unit.name(), plan.stage));
    }

    fn print_summary(&self, report: &PipelineReport) {
        println!();
        println!(
            "{}",
            "════════════════════════════════════════════════════════════".bright_blue()
        );

        match report.phase {
            PipelinePhase::Completed => {
                ui::print_success(&format!(
                    "{} {} {}",
                    report.unit.name(),
                    report.unit.outcome_verb(),
                    report.stage
                ));
            }
            PipelinePhase::Failed(kind) => {
                ui::print_error(&format!(
                    "{} failed at {} on {}",
                    report.unit.name(),
                    kind.name(),
                    report.stage
                ));
            }
        }

        println!();
        for result in &report.results {
            let status = if result.success { "✅" } else { "❌" };
            println!(
                "   {} {} `{}` ({:.1}s)",
                status,
                result.kind.name(),
                result.command_line,
                result.duration.as_secs_f64()
            );
            if let Some(message) = &result.message {
                println!("      {}", message.bright_black());
            }
        }
        if report.skipped > 0 {
            println!("   ⏭️  {} step(s) not run", report.skipped);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SettingKey, StageSettings};
    use crate::domain::pipeline::StepKind;
    use crate::domain::DeployUnit;
    use crate::infrastructure::testing::RecordingRunner;
    use tempfile::TempDir;

    fn dev_settings() -> StageSettings {
        let mut s = StageSettings::default();
        s.set(SettingKey::Profile, "p1");
        s.set(SettingKey::Region, "eu-west-1");
        s.set(SettingKey::Domain, "d.example.com");
        s.set(SettingKey::CertArn, "arn:x");
        s
    }

    #[tokio::test]
    async fn test_api_deploy_runs_four_commands_in_order() {
        let runner = RecordingRunner::new();
        let service = DeployService::new(runner.clone(), ".");
        let plan = DeployPlan::build(DeployUnit::Api, "dev", &dev_settings(), None).unwrap();

        let report = service.execute(&plan, &CredentialContext::inherited()).await;

        assert!(report.succeeded());
        assert_eq!(
            runner.command_lines(),
            vec![
                "npm install",
                "sls create_domain --stage dev",
                "serverless deploy --stage dev",
                "sls export-env --stage dev",
            ]
        );
        assert!(runner
            .calls()
            .iter()
            .all(|c| c.working_dir == PathBuf::from("api")));
    }

    #[tokio::test]
    async fn test_failed_step_stops_the_pipeline() {
        let runner = RecordingRunner::new().failing_on("sls create_domain");
        let service = DeployService::new(runner.clone(), ".");
        let plan = DeployPlan::build(DeployUnit::Api, "dev", &dev_settings(), None).unwrap();

        let report = service.execute(&plan, &CredentialContext::inherited()).await;

        assert!(!report.succeeded());
        assert_eq!(report.phase, PipelinePhase::Failed(StepKind::CreateDomain));
        assert_eq!(report.skipped, 2);
        assert_eq!(
            runner.command_lines(),
            vec!["npm install", "sls create_domain --stage dev"]
        );
    }

    #[tokio::test]
    async fn test_failed_install_runs_nothing_else() {
        let runner = RecordingRunner::new().failing_on("npm install");
        let service = DeployService::new(runner.clone(), ".");
        let plan =
            DeployPlan::build(DeployUnit::Scrape, "dev", &StageSettings::default(), None).unwrap();

        let report = service.execute(&plan, &CredentialContext::inherited()).await;

        assert_eq!(report.results.len(), 1);
        assert_eq!(runner.command_lines(), vec!["npm install"]);
    }

    #[tokio::test]
    async fn test_failed_test_run_keeps_runner_output() {
        let runner = RecordingRunner::new()
            .failing_with_output("grunt runTests", "TESTRUNNER: 3 assertions failed\n");
        let service = DeployService::new(runner.clone(), ".");
        let plan =
            DeployPlan::build(DeployUnit::Tests, "dev", &StageSettings::default(), None).unwrap();

        let report = service.execute(&plan, &CredentialContext::inherited()).await;

        assert!(!report.succeeded());
        let failed = report.results.last().unwrap();
        assert!(!failed.success);
        assert_eq!(
            failed.output.as_deref(),
            Some("TESTRUNNER: 3 assertions failed\n")
        );
    }

    #[tokio::test]
    async fn test_silent_failure_has_no_output() {
        let runner = RecordingRunner::new().failing_on("npm install");
        let service = DeployService::new(runner.clone(), ".");
        let plan =
            DeployPlan::build(DeployUnit::Scrape, "dev", &StageSettings::default(), None).unwrap();

        let report = service.execute(&plan, &CredentialContext::inherited()).await;

        assert_eq!(report.results[0].output, None);
    }

    #[tokio::test]
    async fn test_credentials_reach_every_step() {
        let runner = RecordingRunner::new();
        let service = DeployService::new(runner.clone(), ".");
        let plan =
            DeployPlan::build(DeployUnit::WebSocket, "live", &StageSettings::default(), None)
                .unwrap();

        service
            .execute(&plan, &CredentialContext::with_profile("locus-live"))
            .await;

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        for call in calls {
            assert_eq!(
                call.env,
                vec![("AWS_PROFILE".to_string(), "locus-live".to_string())]
            );
        }
    }

    #[test]
    fn test_web_params_read_exported_distribution() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("api")).unwrap();
        std::fs::write(dir.path().join("api/.env"), "cfdist=E123\n").unwrap();
        let service = DeployService::new(RecordingRunner::new(), dir.path());

        let params = service.web_params("").unwrap();
        assert_eq!(params.distribution, "E123");
        assert_eq!(params.path, "main");

        let params = service.web_params("beta").unwrap();
        assert_eq!(params.path, "beta");
    }

    #[test]
    fn test_web_params_without_api_deploy() {
        let dir = TempDir::new().unwrap();
        let service = DeployService::new(RecordingRunner::new(), dir.path());
        assert!(matches!(
            service.web_params("main"),
            Err(ConfigError::EnvFile { .. })
        ));
    }
}
