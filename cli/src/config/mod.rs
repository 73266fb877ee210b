//! # Stage Configuration Store
//!
//! Ordered mapping of stage name → [`StageSettings`], persisted as YAML
//! (`locus-custom.yml` by default):
//!
//! ```yaml
//! dev:
//!   profile: default
//!   region: eu-west-1
//!   domain: dev.vialocus.co.uk
//! live:
//!   profile: locus-live
//!   region: eu-west-1
//! ```
//!
//! The in-memory store is the source of truth for a session. Nothing is
//! written back until [`ConfigStore::save`] is called.

mod stage;

pub use stage::{SettingKey, StageSettings};

use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::error::ConfigError;

/// Stage configurations in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    stages: Vec<(String, StageSettings)>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from a YAML file
    ///
    /// An absent file is [`ConfigError::NotFound`]; callers treat that as a
    /// fresh start. Anything that is not a mapping of stage → settings is
    /// [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                });
            }
            Err(e) => {
                return Err(ConfigError::Parse {
                    path: path.display().to_string(),
                    message: e.to_string(),
                });
            }
        };

        let store = Self::from_yaml(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })?;

        info!("Loaded {} stage(s) from {}", store.len(), path.display());
        Ok(store)
    }

    fn from_yaml(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;

        let mapping = match value {
            serde_yaml::Value::Null => return Ok(Self::new()),
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => return Err("top level must be a mapping of stage name to settings".to_string()),
        };

        let mut store = Self::new();
        for (key, value) in mapping {
            let name = match key {
                serde_yaml::Value::String(name) => name,
                other => {
                    return Err(format!("stage names must be strings, found {:?}", other));
                }
            };
            let settings: StageSettings = match value {
                serde_yaml::Value::Null => StageSettings::default(),
                value => serde_yaml::from_value(value)
                    .map_err(|e| format!("stage '{}': {}", name, e))?,
            };
            store.add_stage(name, settings);
        }

        Ok(store)
    }

    /// Serialize the whole store, preserving stage order
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        let mut mapping = serde_yaml::Mapping::new();
        for (name, settings) in &self.stages {
            mapping.insert(
                serde_yaml::Value::String(name.clone()),
                serde_yaml::to_value(settings)?,
            );
        }
        serde_yaml::to_string(&serde_yaml::Value::Mapping(mapping))
    }

    /// Write the store to `path`, replacing the file
    ///
    /// Writes to a temporary file in the same directory and renames it over
    /// the target, so a crash mid-write leaves the previous file intact.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |message: String| ConfigError::Write {
            path: path.display().to_string(),
            message,
        };

        let yaml = self.to_yaml().map_err(|e| write_err(e.to_string()))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;
        tmp.write_all(yaml.as_bytes())
            .map_err(|e| write_err(e.to_string()))?;
        tmp.persist(path).map_err(|e| write_err(e.error.to_string()))?;

        debug!("Wrote {} bytes to {}", yaml.len(), path.display());
        Ok(())
    }

    /// Stage names in insertion order
    pub fn list(&self) -> Vec<&str> {
        self.stages.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Insert a stage, replacing any existing stage of the same name in place
    pub fn add_stage(&mut self, name: impl Into<String>, settings: StageSettings) {
        let name = name.into();
        match self.stages.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = settings,
            None => self.stages.push((name, settings)),
        }
    }

    /// Remove a stage; returns whether it existed
    pub fn delete_stage(&mut self, name: &str) -> bool {
        let before = self.stages.len();
        self.stages.retain(|(existing, _)| existing != name);
        self.stages.len() != before
    }

    pub fn get(&self, name: &str) -> Option<&StageSettings> {
        self.stages
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, settings)| settings)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut StageSettings> {
        self.stages
            .iter_mut()
            .find(|(existing, _)| existing == name)
            .map(|(_, settings)| settings)
    }

    /// Look up a stage or fail with [`ConfigError::UnknownStage`]
    pub fn stage(&self, name: &str) -> Result<&StageSettings, ConfigError> {
        self.get(name).ok_or_else(|| ConfigError::UnknownStage {
            stage: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// First stage in file order, used as the default answer for stage prompts
    pub fn first_stage(&self) -> Option<&str> {
        self.stages.first().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(profile: &str, region: &str) -> StageSettings {
        let mut s = StageSettings::default();
        s.set(SettingKey::Profile, profile);
        s.set(SettingKey::Region, region);
        s
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = ConfigStore::load(&dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_load_malformed_yaml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locus-custom.yml");
        std::fs::write(&path, "dev: [unclosed\n").unwrap();
        let err = ConfigStore::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_scalar_top_level_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locus-custom.yml");
        std::fs::write(&path, "just a string\n").unwrap();
        let err = ConfigStore::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_empty_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locus-custom.yml");
        std::fs::write(&path, "").unwrap();
        let store = ConfigStore::load(&path).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips_settings_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locus-custom.yml");

        let mut store = ConfigStore::new();
        let mut live = settings("locus-live", "eu-west-2");
        live.set(SettingKey::CertArn, "arn:aws:acm:us-east-1:123");
        live.set(SettingKey::DataSet, "OpenNames");
        store.add_stage("live", live);
        store.add_stage("dev", settings("default", "eu-west-1"));
        store.add_stage("test", StageSettings::default());

        store.save(&path).unwrap();
        let loaded = ConfigStore::load(&path).unwrap();

        assert_eq!(loaded, store);
        assert_eq!(loaded.list(), vec!["live", "dev", "test"]);
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locus-custom.yml");
        std::fs::write(&path, "old:\n  profile: gone\n").unwrap();

        let mut store = ConfigStore::new();
        store.add_stage("dev", settings("p1", "eu-west-1"));
        store.save(&path).unwrap();

        let loaded = ConfigStore::load(&path).unwrap();
        assert_eq!(loaded.list(), vec!["dev"]);
    }

    #[test]
    fn test_add_existing_stage_replaces_in_place() {
        let mut store = ConfigStore::new();
        store.add_stage("dev", settings("a", "r1"));
        store.add_stage("live", settings("b", "r2"));
        store.add_stage("dev", settings("c", "r3"));

        assert_eq!(store.list(), vec!["dev", "live"]);
        let dev = store.get("dev").unwrap();
        assert_eq!(dev.get(SettingKey::Profile), Some("c"));
    }

    #[test]
    fn test_delete_stage_is_idempotent() {
        let mut store = ConfigStore::new();
        store.add_stage("dev", StageSettings::default());

        assert!(store.delete_stage("dev"));
        assert!(!store.list().contains(&"dev"));
        assert!(!store.delete_stage("dev"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_nonexistent_leaves_store_unchanged() {
        let mut store = ConfigStore::new();
        store.add_stage("dev", settings("p1", "eu-west-1"));
        let before = store.clone();

        assert!(!store.delete_stage("nonexistent"));
        assert_eq!(store, before);
    }

    #[test]
    fn test_stage_lookup_errors_for_unknown() {
        let store = ConfigStore::new();
        assert!(matches!(
            store.stage("dev"),
            Err(ConfigError::UnknownStage { .. })
        ));
        assert_eq!(store.first_stage(), None);
    }

    #[test]
    fn test_stage_with_null_body_loads_as_empty_settings() {
        let store = ConfigStore::from_yaml("dev:\nlive:\n  region: eu-west-1\n").unwrap();
        assert_eq!(store.list(), vec!["dev", "live"]);
        assert_eq!(store.get("dev"), Some(&StageSettings::default()));
    }

    #[test]
    fn test_hand_edited_numbers_and_booleans_load_as_text() {
        let store = ConfigStore::from_yaml(
            "dev:\n  profile: default\n  auroraDatabaseName: 2024\n  auroraMasterPass: 12345\n  tmp: true\n",
        )
        .unwrap();
        let dev = store.get("dev").unwrap();
        assert_eq!(dev.get(SettingKey::AuroraDatabaseName), Some("2024"));
        assert_eq!(dev.get(SettingKey::AuroraMasterPass), Some("12345"));
        assert_eq!(dev.get(SettingKey::Tmp), Some("true"));
    }

    #[test]
    fn test_list_valued_setting_is_rejected() {
        let err = ConfigStore::from_yaml("dev:\n  region:\n    - eu-west-1\n").unwrap_err();
        assert!(err.contains("dev"));
        assert!(err.contains("a list"));
    }
}
