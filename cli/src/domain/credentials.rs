//! Credential context passed to external commands
//!
//! Replaces mutating `AWS_PROFILE` on the tool's own process: the selected
//! profile travels with each command and is applied to the child only.

/// Environment variable the AWS tooling reads the profile from
pub const AWS_PROFILE_VAR: &str = "AWS_PROFILE";

/// Cloud credentials selected for the current session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialContext {
    profile: Option<String>,
}

impl CredentialContext {
    /// No profile selected; children inherit whatever the operator's shell has
    pub fn inherited() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: impl Into<String>) -> Self {
        Self {
            profile: Some(profile.into()),
        }
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Environment overrides to apply to a child process
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        self.profile
            .iter()
            .map(|profile| (AWS_PROFILE_VAR, profile.clone()))
            .collect()
    }
}
