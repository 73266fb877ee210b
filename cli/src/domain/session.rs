//! Command loop state machine
//!
//! `transition(state, event) -> (next state, action)` is pure. The session
//! service performs the action (prompts, pipelines, file writes) and feeds
//! the next event back in.

use super::pipeline::DeployUnit;

/// Where the operator currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    TopLevel,
    StageDeployMenu { stage: String },
    Exited,
}

impl SessionState {
    /// Prompt shown while waiting for the next command
    pub fn prompt(&self) -> Option<String> {
        match self {
            Self::TopLevel => Some("Command[h for help]?".to_string()),
            Self::StageDeployMenu { stage } => Some(format!(
                "Deploy command for stage {} [h for help]?",
                stage
            )),
            Self::Exited => None,
        }
    }
}

/// Input to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A command line typed at the menu prompt
    Line(String),
    /// The operator picked a stage after `e`
    StageSelected(String),
    /// Standard input closed
    EndOfInput,
}

/// Work the session must perform after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    ShowTopHelp,
    ListStages,
    AddStage,
    DeleteStage,
    WriteConfig,
    /// Ask which stage to deploy, then feed back [`Event::StageSelected`]
    SelectDeployStage,
    LoadData,
    Exit,
    ShowDeployHelp,
    RunUnit { stage: String, unit: DeployUnit },
    RunAll { stage: String },
    Unknown { input: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: SessionState,
    pub action: Action,
}

impl Transition {
    fn stay(state: &SessionState, action: Action) -> Self {
        Self {
            next: state.clone(),
            action,
        }
    }
}

pub fn transition(state: &SessionState, event: Event) -> Transition {
    match (state, event) {
        (SessionState::Exited, _) => Transition::stay(state, Action::None),

        (_, Event::EndOfInput) => Transition {
            next: SessionState::Exited,
            action: Action::Exit,
        },

        (SessionState::TopLevel, Event::StageSelected(stage)) => Transition {
            next: SessionState::StageDeployMenu { stage },
            action: Action::None,
        },
        // Stage selection only means something right after `e`
        (SessionState::StageDeployMenu { .. }, Event::StageSelected(_)) => {
            Transition::stay(state, Action::None)
        }

        (SessionState::TopLevel, Event::Line(line)) => top_level(state, line.trim()),
        (SessionState::StageDeployMenu { stage }, Event::Line(line)) => {
            deploy_menu(state, stage, line.trim())
        }
    }
}

fn top_level(state: &SessionState, cmd: &str) -> Transition {
    let action = match cmd {
        "h" => Action::ShowTopHelp,
        "l" => Action::ListStages,
        "a" => Action::AddStage,
        "d" => Action::DeleteStage,
        "w" => Action::WriteConfig,
        "e" => Action::SelectDeployStage,
        "ld" => Action::LoadData,
        "q" => {
            return Transition {
                next: SessionState::Exited,
                action: Action::Exit,
            }
        }
        other => Action::Unknown {
            input: other.to_string(),
        },
    };
    Transition::stay(state, action)
}

fn deploy_menu(state: &SessionState, stage: &str, cmd: &str) -> Transition {
    let action = match cmd {
        "h" => Action::ShowDeployHelp,
        "all" => Action::RunAll {
            stage: stage.to_string(),
        },
        "q" => {
            return Transition {
                next: SessionState::TopLevel,
                action: Action::None,
            }
        }
        other => match DeployUnit::from_command(other) {
            Some(unit) => Action::RunUnit {
                stage: stage.to_string(),
                unit,
            },
            None => Action::Unknown {
                input: other.to_string(),
            },
        },
    };
    Transition::stay(state, action)
}
