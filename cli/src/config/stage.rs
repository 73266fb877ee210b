//! Per-stage deployment settings.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Settings recognised in a stage record
///
/// The string form is the key used in the YAML file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Profile,
    Region,
    Cron,
    Domain,
    RestDomain,
    WsDomain,
    CertArn,
    AuroraDatabaseName,
    AuroraMasterUser,
    AuroraMasterPass,
    OsDataHubProductUrl,
    Tmp,
    DataSet,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Region => "region",
            Self::Cron => "cron",
            Self::Domain => "domain",
            Self::RestDomain => "restdomain",
            Self::WsDomain => "wsdomain",
            Self::CertArn => "certARN",
            Self::AuroraDatabaseName => "auroraDatabaseName",
            Self::AuroraMasterUser => "auroraMasterUser",
            Self::AuroraMasterPass => "auroraMasterPass",
            Self::OsDataHubProductUrl => "osDataHubProductURL",
            Self::Tmp => "tmp",
            Self::DataSet => "dataSet",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings record for one deployment stage (e.g. `dev`, `live`)
///
/// Every field is optional on disk because the file is hand-editable.
/// Pipelines look values up through [`StageSettings::require`], which
/// turns an absent or blank value into a [`ConfigError::MissingSetting`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageSettings {
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Schedule expression for the scraper
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,

    /// Website domain; also the target bucket for the web deploy
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub restdomain: Option<String>,

    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub wsdomain: Option<String>,

    #[serde(
        rename = "certARN",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub cert_arn: Option<String>,

    #[serde(
        rename = "auroraDatabaseName",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub aurora_database_name: Option<String>,

    #[serde(
        rename = "auroraMasterUser",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub aurora_master_user: Option<String>,

    #[serde(
        rename = "auroraMasterPass",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub aurora_master_pass: Option<String>,

    #[serde(
        rename = "osDataHubProductURL",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub os_data_hub_product_url: Option<String>,

    /// Local scratch directory for downloads
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub tmp: Option<String>,

    /// Data set chosen by the last `ld` (load data) run
    #[serde(
        rename = "dataSet",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_set: Option<String>,

    /// Keys this tool does not know about, kept so hand edits survive a write
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Read a setting as text, accepting hand-written numbers and booleans
///
/// `auroraDatabaseName: 2024` becomes `"2024"`. Sequences and mappings are
/// rejected.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(None),
        serde_yaml::Value::String(s) => Ok(Some(s)),
        serde_yaml::Value::Number(n) => Ok(Some(n.to_string())),
        serde_yaml::Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a plain value, found {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Sequence(_) => "a list",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
        _ => "a scalar",
    }
}

impl StageSettings {
    fn slot(&self, key: SettingKey) -> &Option<String> {
        match key {
            SettingKey::Profile => &self.profile,
            SettingKey::Region => &self.region,
            SettingKey::Cron => &self.cron,
            SettingKey::Domain => &self.domain,
            SettingKey::RestDomain => &self.restdomain,
            SettingKey::WsDomain => &self.wsdomain,
            SettingKey::CertArn => &self.cert_arn,
            SettingKey::AuroraDatabaseName => &self.aurora_database_name,
            SettingKey::AuroraMasterUser => &self.aurora_master_user,
            SettingKey::AuroraMasterPass => &self.aurora_master_pass,
            SettingKey::OsDataHubProductUrl => &self.os_data_hub_product_url,
            SettingKey::Tmp => &self.tmp,
            SettingKey::DataSet => &self.data_set,
        }
    }

    fn slot_mut(&mut self, key: SettingKey) -> &mut Option<String> {
        match key {
            SettingKey::Profile => &mut self.profile,
            SettingKey::Region => &mut self.region,
            SettingKey::Cron => &mut self.cron,
            SettingKey::Domain => &mut self.domain,
            SettingKey::RestDomain => &mut self.restdomain,
            SettingKey::WsDomain => &mut self.wsdomain,
            SettingKey::CertArn => &mut self.cert_arn,
            SettingKey::AuroraDatabaseName => &mut self.aurora_database_name,
            SettingKey::AuroraMasterUser => &mut self.aurora_master_user,
            SettingKey::AuroraMasterPass => &mut self.aurora_master_pass,
            SettingKey::OsDataHubProductUrl => &mut self.os_data_hub_product_url,
            SettingKey::Tmp => &mut self.tmp,
            SettingKey::DataSet => &mut self.data_set,
        }
    }

    /// Value of a setting, if present and non-blank
    pub fn get(&self, key: SettingKey) -> Option<&str> {
        self.slot(key)
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    pub fn set(&mut self, key: SettingKey, value: impl Into<String>) {
        *self.slot_mut(key) = Some(value.into());
    }

    /// Value of a setting the caller cannot proceed without
    pub fn require(&self, stage: &str, key: SettingKey) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingSetting {
            stage: stage.to_string(),
            setting: key.to_string(),
        })
    }
}
