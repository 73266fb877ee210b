//! Reading `.env` files written by `sls export-env`

use std::path::Path;

use crate::error::ConfigError;

/// Look up `key` in a dotenv file
pub fn read_env_value(path: &Path, key: &str) -> Result<String, ConfigError> {
    let env_err = |message: String| ConfigError::EnvFile {
        path: path.display().to_string(),
        message,
    };

    let entries = dotenvy::from_path_iter(path).map_err(|e| env_err(e.to_string()))?;
    for entry in entries {
        let (name, value) = entry.map_err(|e| env_err(e.to_string()))?;
        if name == key && !value.trim().is_empty() {
            return Ok(value);
        }
    }

    Err(ConfigError::MissingEnvKey {
        path: path.display().to_string(),
        key: key.to_string(),
    })
}
