//! Session service - drives the interactive command loop
//!
//! Reads a line, feeds it to [`transition`], performs the resulting
//! [`Action`], and repeats until the state machine reaches `Exited`.
//! Errors from individual actions are reported and the loop carries on;
//! only a broken input stream ends the session early.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::{ConfigStore, SettingKey};
use crate::domain::pipeline::DEFAULT_WEB_PATH;
use crate::domain::wizard::QuestionTarget;
use crate::domain::{
    transition, Action, ConfigWizard, CredentialContext, DeployPlan, DeployUnit, Event,
    SessionState,
};
use crate::error::{ConfigError, SessionError};
use crate::infrastructure::{ProcessRunner, Prompter};
use crate::services::DeployService;
use crate::ui;

/// Default answer for the delete prompt
const DEFAULT_DELETE_STAGE: &str = "dev";

/// Default answer for the load-data data set prompt
const DEFAULT_DATA_SET: &str = "OpenNames";

/// Outcome of collecting the input an action needs
enum Gathered<T> {
    Ready(T),
    /// Already reported to the operator; the action is dropped
    Rejected,
    /// Input ended part way through
    Closed,
}

/// One operator session
pub struct SessionService<R: ProcessRunner, P: Prompter> {
    store: ConfigStore,
    config_path: PathBuf,
    deploy: DeployService<R>,
    prompter: P,
    credentials: CredentialContext,
    state: SessionState,
    /// Store differs from what was last loaded or written
    dirty: bool,
}

impl<R: ProcessRunner, P: Prompter> SessionService<R, P> {
    pub fn new(
        store: ConfigStore,
        config_path: impl Into<PathBuf>,
        deploy: DeployService<R>,
        prompter: P,
    ) -> Self {
        Self {
            store,
            config_path: config_path.into(),
            deploy,
            prompter,
            credentials: CredentialContext::inherited(),
            state: SessionState::TopLevel,
            dirty: false,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Run until the operator quits or input ends
    pub async fn run(&mut self) -> Result<(), SessionError> {
        while let Some(prompt) = self.state.prompt() {
            let event = match self.prompter.ask(&prompt).await? {
                Some(line) => Event::Line(line),
                None => Event::EndOfInput,
            };
            self.handle(event).await?;
        }
        Ok(())
    }

    /// Apply one event and any follow-up events its action produces
    pub async fn handle(&mut self, event: Event) -> Result<(), SessionError> {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            debug!("{:?} <- {:?}", self.state, event);
            let t = transition(&self.state, event);
            self.state = t.next;
            next = self.perform(t.action).await?;
        }
        Ok(())
    }

    async fn perform(&mut self, action: Action) -> Result<Option<Event>, SessionError> {
        match action {
            Action::None => Ok(None),
            Action::ShowTopHelp => {
                ui::print_top_help();
                Ok(None)
            }
            Action::ShowDeployHelp => {
                ui::print_deploy_help();
                Ok(None)
            }
            Action::ListStages => {
                self.list_stages();
                Ok(None)
            }
            Action::AddStage => self.add_stage().await,
            Action::DeleteStage => self.delete_stage().await,
            Action::WriteConfig => {
                self.write_config();
                Ok(None)
            }
            Action::SelectDeployStage => self.select_deploy_stage().await,
            Action::LoadData => self.load_data().await,
            Action::RunUnit { stage, unit } => self.run_unit(&stage, unit).await,
            Action::RunAll { stage } => self.run_all(&stage).await,
            Action::Unknown { input } => {
                ui::print_warning(&format!("Unknown command [{}]", input));
                Ok(None)
            }
            Action::Exit => {
                if self.dirty {
                    ui::print_warning("Unsaved changes discarded (use w before q to keep them)");
                }
                Ok(None)
            }
        }
    }

    /// Ask a question with a default; `None` means input ended
    async fn ask_with_default(
        &mut self,
        text: &str,
        default: &str,
    ) -> Result<Option<String>, SessionError> {
        let answer = self
            .prompter
            .ask(&format!("{} [{}]?", text, default))
            .await?;
        Ok(answer.map(|a| if a.is_empty() { default.to_string() } else { a }))
    }

    pub fn list_stages(&self) {
        if self.store.is_empty() {
            ui::print_info("No stages configured");
            return;
        }
        for name in self.store.list() {
            println!("[{}]", name);
        }
    }

    async fn add_stage(&mut self) -> Result<Option<Event>, SessionError> {
        let mut wizard = ConfigWizard::new();

        while let Some(question) = wizard.current() {
            if let Some(details) = question.details {
                self.prompter.note(details);
            }
            let Some(answer) = self.prompter.ask(&question.prompt()).await? else {
                return Ok(Some(Event::EndOfInput));
            };
            wizard.answer(&answer);

            if question.target == QuestionTarget::StageName {
                let stage = wizard.stage().unwrap_or_default().to_string();
                if self.store.contains(&stage) && !self.confirm_overwrite(&stage).await? {
                    ui::print_warning(&format!("Stage {} left unchanged", stage));
                    return Ok(None);
                }
            }
        }

        if let Some((stage, settings)) = wizard.finish() {
            info!("Adding stage {}", stage);
            self.store.add_stage(stage.clone(), settings);
            self.dirty = true;
            ui::print_success(&format!("Stage {} added (w to write)", stage));
        }
        Ok(None)
    }

    async fn confirm_overwrite(&mut self, stage: &str) -> Result<bool, SessionError> {
        let confirmed = self
            .prompter
            .confirm(&format!("Stage {} already exists, overwrite?", stage), false)
            .await?;
        Ok(confirmed.unwrap_or(false))
    }

    async fn delete_stage(&mut self) -> Result<Option<Event>, SessionError> {
        let Some(stage) = self
            .ask_with_default("system stage", DEFAULT_DELETE_STAGE)
            .await?
        else {
            return Ok(Some(Event::EndOfInput));
        };

        if self.store.delete_stage(&stage) {
            self.dirty = true;
            ui::print_success(&format!("Stage {} deleted (w to write)", stage));
        } else {
            ui::print_info(&format!("Stage {} not configured, nothing to delete", stage));
        }
        Ok(None)
    }

    pub fn write_config(&mut self) {
        match self.store.save(&self.config_path) {
            Ok(()) => {
                self.dirty = false;
                ui::print_success("Config files written");
            }
            Err(e) => ui::print_error(&e.to_string()),
        }
    }

    /// Ask for a stage (defaulting to the first) and check it exists
    async fn choose_stage(&mut self, text: &str) -> Result<Gathered<String>, SessionError> {
        let Some(default) = self.store.first_stage().map(str::to_string) else {
            ui::print_error(&ConfigError::NoStages.to_string());
            return Ok(Gathered::Rejected);
        };

        let Some(stage) = self.ask_with_default(text, &default).await? else {
            return Ok(Gathered::Closed);
        };

        match self.store.stage(&stage) {
            Ok(_) => Ok(Gathered::Ready(stage)),
            Err(e) => {
                ui::print_error(&e.to_string());
                Ok(Gathered::Rejected)
            }
        }
    }

    async fn select_deploy_stage(&mut self) -> Result<Option<Event>, SessionError> {
        Ok(match self.choose_stage("Stage to deploy").await? {
            Gathered::Ready(stage) => Some(Event::StageSelected(stage)),
            Gathered::Rejected => None,
            Gathered::Closed => Some(Event::EndOfInput),
        })
    }

    async fn load_data(&mut self) -> Result<Option<Event>, SessionError> {
        let stage = match self.choose_stage("Stage to use").await? {
            Gathered::Ready(stage) => stage,
            Gathered::Rejected => return Ok(None),
            Gathered::Closed => return Ok(Some(Event::EndOfInput)),
        };

        let Some(data_set) = self
            .ask_with_default("Data set to load", DEFAULT_DATA_SET)
            .await?
        else {
            return Ok(Some(Event::EndOfInput));
        };

        let Some(settings) = self.store.get_mut(&stage) else {
            return Ok(None);
        };
        settings.set(SettingKey::DataSet, data_set.clone());
        let profile = settings.get(SettingKey::Profile).map(str::to_string);
        self.dirty = true;

        match profile {
            Some(profile) => {
                info!("Session credentials now use profile {}", profile);
                self.credentials = CredentialContext::with_profile(profile.clone());
                ui::print_info(&format!(
                    "Data set {} selected for {}, using AWS profile {}",
                    data_set, stage, profile
                ));
            }
            None => ui::print_warning(&format!(
                "Data set {} selected for {}, but the stage has no profile; credentials unchanged",
                data_set, stage
            )),
        }
        Ok(None)
    }

    /// Build the plan for one unit, prompting for the web path if `web_path` is not given
    async fn prepare_plan(
        &mut self,
        stage: &str,
        unit: DeployUnit,
        web_path: Option<&str>,
    ) -> Result<Gathered<DeployPlan>, SessionError> {
        let settings = match self.store.stage(stage) {
            Ok(settings) => settings.clone(),
            Err(e) => {
                ui::print_error(&e.to_string());
                return Ok(Gathered::Rejected);
            }
        };

        let web = if unit == DeployUnit::Web {
            let path = match web_path {
                Some(path) => path.to_string(),
                None => match self.ask_with_default("Path to use", DEFAULT_WEB_PATH).await? {
                    Some(path) => path,
                    None => return Ok(Gathered::Closed),
                },
            };
            match self.deploy.web_params(&path) {
                Ok(params) => Some(params),
                Err(e) => {
                    ui::print_error(&e.to_string());
                    return Ok(Gathered::Rejected);
                }
            }
        } else {
            None
        };

        match DeployPlan::build(unit, stage, &settings, web.as_ref()) {
            Ok(plan) => Ok(Gathered::Ready(plan)),
            Err(e) => {
                ui::print_error(&e.to_string());
                Ok(Gathered::Rejected)
            }
        }
    }

    async fn run_unit(&mut self, stage: &str, unit: DeployUnit) -> Result<Option<Event>, SessionError> {
        match self.prepare_plan(stage, unit, None).await? {
            Gathered::Ready(plan) => {
                self.deploy.execute(&plan, &self.credentials).await;
                Ok(None)
            }
            Gathered::Rejected => Ok(None),
            Gathered::Closed => Ok(Some(Event::EndOfInput)),
        }
    }

    /// Deploy every unit in [`DeployUnit::ALL_SEQUENCE`], stopping at the first failure
    ///
    /// Each plan is built right before it runs: the web plan reads the
    /// environment file the API export step writes.
    async fn run_all(&mut self, stage: &str) -> Result<Option<Event>, SessionError> {
        let web_path = if DeployUnit::ALL_SEQUENCE.contains(&DeployUnit::Web) {
            match self.ask_with_default("Path to use", DEFAULT_WEB_PATH).await? {
                Some(path) => Some(path),
                None => return Ok(Some(Event::EndOfInput)),
            }
        } else {
            None
        };

        for unit in DeployUnit::ALL_SEQUENCE {
            let plan = match self.prepare_plan(stage, unit, web_path.as_deref()).await? {
                Gathered::Ready(plan) => plan,
                Gathered::Rejected => {
                    ui::print_warning(&format!("Deploy all stopped before {}", unit.name()));
                    return Ok(None);
                }
                Gathered::Closed => return Ok(Some(Event::EndOfInput)),
            };

            let report = self.deploy.execute(&plan, &self.credentials).await;
            if !report.succeeded() {
                ui::print_warning(&format!("Deploy all stopped at {}", unit.name()));
                return Ok(None);
            }
        }

        ui::print_success(&format!("All units deployed to {}", stage));
        Ok(None)
    }
}
