//! Stack configuration types (tessera.yaml)

use crate::node::RemovalPolicy;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Default directory templates are written to
pub const DEFAULT_OUTPUT_DIR: &str = "tessera.out";

/// Root of a tessera.yaml file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    /// Stack name, also used for the template file name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub env: Environment,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl StackConfig {
    /// Configuration with every optional section at its default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            env: Environment::default(),
            defaults: DefaultsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Deployment target. Unset fields stay deferred as pseudo parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
}

impl Environment {
    /// Domain suffix for service endpoints, known only when the partition is
    pub fn url_suffix(&self) -> Option<&'static str> {
        match self.partition.as_deref()? {
            "aws" | "aws-us-gov" => Some("amazonaws.com"),
            "aws-cn" => Some("amazonaws.com.cn"),
            _ => None,
        }
    }

    /// Whether both account and region are pinned
    pub fn is_resolved(&self) -> bool {
        self.account.is_some() && self.region.is_some()
    }
}

/// Removal policies applied when a construct does not choose one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsConfig {
    #[serde(default = "default_secret_removal_policy")]
    pub secret_removal_policy: RemovalPolicy,

    #[serde(default = "default_key_removal_policy")]
    pub key_removal_policy: RemovalPolicy,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            secret_removal_policy: default_secret_removal_policy(),
            key_removal_policy: default_key_removal_policy(),
        }
    }
}

fn default_secret_removal_policy() -> RemovalPolicy {
    RemovalPolicy::Destroy
}

fn default_key_removal_policy() -> RemovalPolicy {
    RemovalPolicy::Retain
}

/// Rendered template format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

/// Where and how synthesized templates are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: Utf8PathBuf,

    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            format: OutputFormat::default(),
        }
    }
}

fn default_output_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_OUTPUT_DIR)
}
