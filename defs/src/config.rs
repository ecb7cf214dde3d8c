use std::{path::PathBuf, str::FromStr, time::Duration};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::FrontendError;

// Raw settings as written by the user, every field optional

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFrontendConfig {
    /// Older configurations keep the dist dir at the top level.
    pub dist_dir: Option<String>,
    pub stack_name: Option<String>,
    pub build: Option<RawCommandConfig>,
    pub offline: Option<RawCommandConfig>,
    pub deploy: Option<RawDeployConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCommandConfig {
    pub command: Option<Vec<String>>,
    pub cwd_dir: Option<String>,
    pub env: Option<IndexMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDeployConfig {
    pub dist_dir: Option<String>,
    pub mode: Option<String>,
    pub bucket: Option<RawBucketConfig>,
    pub distribution: Option<RawDistributionConfig>,
    pub mime_types: Option<IndexMap<String, String>>,
    pub security_headers: Option<IndexMap<String, HeaderSetting>>,
    pub poll_interval_ms: Option<u64>,
    pub max_poll_attempts: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBucketConfig {
    pub name: Option<String>,
    pub existing: Option<bool>,
    pub index_document: Option<String>,
    pub error_document: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDistributionConfig {
    pub dns_name: Option<String>,
    pub alt_dns_name: Option<String>,
    pub hosted_zone_name: Option<String>,
    pub acm_certificate_arn: Option<String>,
}

/// A security header knob: `false` disables it, `true` keeps the default,
/// anything else overrides the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderSetting {
    Toggle(bool),
    Number(u64),
    Value(String),
}

// Normalized configuration

#[derive(Debug, Clone, PartialEq)]
pub struct PluginConfiguration {
    pub service: String,
    pub stage: String,
    pub region: Option<String>,
    pub stack_name: String,
    pub build: CommandSpec,
    pub offline: CommandSpec,
    pub deploy: DeployConfig,
}

/// A program with its arguments, working directory and environment overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: IndexMap<String, String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: vec![],
            cwd: PathBuf::from("."),
            env: IndexMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeployConfig {
    pub dist_dir: PathBuf,
    pub mode: TemplateMode,
    pub bucket: BucketConfig,
    pub distribution: DistributionConfig,
    /// Lowercased extension without the leading dot, to content type.
    pub mime_types: IndexMap<String, String>,
    pub security_headers: Option<SecurityHeaders>,
    pub poll_interval: Duration,
    pub max_poll_attempts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketConfig {
    pub name: String,
    /// Managed outside of the stack, never created or emptied by the plugin.
    pub existing: bool,
    pub index_document: String,
    pub error_document: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionConfig {
    pub dns_name: String,
    pub alt_dns_name: String,
    pub hosted_zone_name: String,
    pub acm_certificate_arn: String,
}

/// Resolved header knobs in parameter order. An empty value disables the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityHeaders {
    pub knobs: IndexMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateMode {
    Cloudfront,
    Bucket,
}

impl FromStr for TemplateMode {
    type Err = FrontendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cloudfront" => Ok(TemplateMode::Cloudfront),
            "bucket" => Ok(TemplateMode::Bucket),
            other => Err(FrontendError::InvalidConfig(format!(
                "unknown deploy mode '{}', expected 'cloudfront' or 'bucket'",
                other
            ))),
        }
    }
}
