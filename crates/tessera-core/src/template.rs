//! Rendered templates
//!
//! A [`Template`] is the output of synthesis: plain JSON with every deferred
//! reference already turned into intrinsic functions. It can be rendered as
//! JSON or YAML and written into the stack's output directory.

use crate::config::OutputFormat;
use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use tracing::debug;

/// One entry of the `Outputs` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A synthesized template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    resources: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    outputs: Map<String, Value>,
}

impl Template {
    pub(crate) fn new(
        description: Option<String>,
        resources: Map<String, Value>,
        outputs: Map<String, Value>,
    ) -> Self {
        Self {
            description,
            resources,
            outputs,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn resources(&self) -> &Map<String, Value> {
        &self.resources
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Value> {
        self.resources.get(logical_id)
    }

    /// Resources whose `Type` matches, as `(logical id, resource)` pairs
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, resource)| resource["Type"] == resource_type)
    }

    pub fn outputs(&self) -> &Map<String, Value> {
        &self.outputs
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => self.to_json_pretty(),
            OutputFormat::Yaml => self.to_yaml(),
        }
    }

    /// Write `<stack_name>.template.<ext>` into `directory`, creating it if
    /// needed, and return the file path
    pub fn write_to(
        &self,
        directory: &Utf8Path,
        stack_name: &str,
        format: OutputFormat,
    ) -> Result<Utf8PathBuf> {
        let content = self.render(format)?;
        fs::create_dir_all(directory)?;

        let path = directory.join(format!("{}.template.{}", stack_name, format.extension()));
        fs::write(&path, content)?;
        debug!("Wrote template to: {}", path);
        Ok(path)
    }
}
