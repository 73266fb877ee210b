//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod credentials;
pub mod pipeline;
pub mod session;
pub mod wizard;

// Re-export commonly used types
pub use credentials::CredentialContext;
pub use pipeline::{DeployPlan, DeployUnit, PipelineReport, PipelineStep, WebParams};
pub use session::{transition, Action, Event, SessionState};
pub use wizard::ConfigWizard;
