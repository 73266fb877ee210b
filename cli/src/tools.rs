//! Runtime tool path resolution
//!
//! For each external tool (e.g. `grunt`) we:
//! 1. Check for an environment variable `{TOOL}_BIN` (e.g. `GRUNT_BIN`)
//! 2. Fall back to a `PATH` lookup, and finally to the bare name
//!
//! The override lets a project pin a local `node_modules/.bin` tool, and
//! makes tests independent of what happens to be installed.

use std::env;

/// Environment variable consulted for a tool's path
pub fn tool_env_var(tool: &str) -> String {
    format!("{}_BIN", tool.to_uppercase().replace('-', "_"))
}

/// Get the path to an external tool
///
/// # Examples
///
/// ```rust,ignore
/// // With GRUNT_BIN="/srv/locus/node_modules/.bin/grunt"
/// assert_eq!(get_tool_path("grunt"), "/srv/locus/node_modules/.bin/grunt");
///
/// // Without GRUNT_BIN set, and grunt on PATH
/// assert_eq!(get_tool_path("grunt"), "/usr/local/bin/grunt");
/// ```
pub fn get_tool_path(tool: &str) -> String {
    if let Ok(path) = env::var(tool_env_var(tool)) {
        if !path.is_empty() {
            return path;
        }
    }

    which::which(tool)
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| tool.to_string())
}

/// Tool names invoked by the deployment pipelines
pub mod tools {
    pub const AWS: &str = "aws";
    pub const NPM: &str = "npm";
    pub const SERVERLESS: &str = "serverless";
    pub const SLS: &str = "sls";
    pub const WEBPACK: &str = "webpack";
    pub const GRUNT: &str = "grunt";
}
