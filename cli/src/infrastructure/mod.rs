//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - Child processes (npm, serverless, webpack, grunt)
//! - The AWS CLI precondition check
//! - `.env` files exported by the API deploy
//! - Operator input on stdin

pub mod aws;
pub mod env_file;
pub mod process;
pub mod prompt;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types
pub use process::{CommandSpec, ProcessRunner, SystemRunner};
pub use prompt::{Prompter, StdinPrompter};
