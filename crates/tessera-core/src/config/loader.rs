//! Configuration file loading and parsing

use super::types::StackConfig;
use crate::error::{Error, Result};
use crate::schema::SchemaValidator;
use crate::stack::Stack;
use crate::template::Template;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::{debug, info};

/// Configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["tessera.yaml", "tessera.yml"];

/// Schema used to validate configuration files
const CONFIG_SCHEMA: &str = "stack";

/// A loaded configuration together with where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: StackConfig,

    /// Path to the configuration file
    pub config_path: Utf8PathBuf,

    /// Directory containing the configuration file
    pub working_dir: Utf8PathBuf,
}

impl LoadedConfig {
    /// Load configuration from the specified path or search for it
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let (config_path, content) = match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        Error::config_not_found(p.as_str())
                    } else {
                        Error::Io(e)
                    }
                })?;
                (p.to_owned(), content)
            }
            None => find_config()?,
        };

        let working_dir = config_path
            .parent()
            .map(|p| p.to_owned())
            .unwrap_or_else(|| Utf8PathBuf::from("."));

        let config = StackConfig::from_yaml(&content)?;
        info!("Loaded stack configuration from {}", config_path);

        Ok(Self {
            config,
            config_path,
            working_dir,
        })
    }

    /// Output directory, relative paths taken from the config file's directory
    pub fn output_dir(&self) -> Utf8PathBuf {
        let directory = &self.config.output.directory;
        if directory.is_absolute() {
            directory.clone()
        } else {
            self.working_dir.join(directory)
        }
    }

    /// Create a stack from this configuration
    pub fn stack(&self) -> Stack {
        Stack::new(self.config.clone())
    }

    /// Write a synthesized template where this configuration says to
    pub fn write_template(&self, template: &Template) -> Result<Utf8PathBuf> {
        template.write_to(
            &self.output_dir(),
            &self.config.name,
            self.config.output.format,
        )
    }
}

impl StackConfig {
    /// Validate YAML against the stack schema, then parse it
    pub fn from_yaml(content: &str) -> Result<Self> {
        SchemaValidator::global()?.validate_yaml(content, CONFIG_SCHEMA)?;
        let config: StackConfig = serde_yaml_ng::from_str(content)?;
        debug!("Parsed configuration for stack '{}'", config.name);
        Ok(config)
    }
}

/// Find a configuration file in the current directory or its parents
fn find_config() -> Result<(Utf8PathBuf, String)> {
    let cwd = std::env::current_dir().map_err(Error::Io)?;
    let cwd = Utf8PathBuf::try_from(cwd)
        .map_err(|_| Error::invalid_config("Current directory path is not valid UTF-8"))?;

    find_config_from(&cwd)
}

fn find_config_from(start: &Utf8Path) -> Result<(Utf8PathBuf, String)> {
    let mut current = start;

    loop {
        for name in CONFIG_FILE_NAMES {
            let path = current.join(name);
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                return Ok((path, content));
            }
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    Err(Error::config_not_found(
        "tessera.yaml (searched current and parent directories)",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::node::RemovalPolicy;
    use tempfile::TempDir;

    fn utf8_dir(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = StackConfig::from_yaml("name: app\n").unwrap();
        assert_eq!(config.name, "app");
        assert_eq!(config.defaults.secret_removal_policy, RemovalPolicy::Destroy);
        assert_eq!(config.defaults.key_removal_policy, RemovalPolicy::Retain);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.env.account.is_none());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
name: payments
description: Payment service secrets
env:
  account: "123456789012"
  region: eu-central-1
  partition: aws
defaults:
  secretRemovalPolicy: retain
  keyRemovalPolicy: destroy
output:
  directory: build/templates
  format: yaml
"#;
        let config = StackConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.env.region.as_deref(), Some("eu-central-1"));
        assert!(config.env.is_resolved());
        assert_eq!(config.defaults.secret_removal_policy, RemovalPolicy::Retain);
        assert_eq!(config.output.format, OutputFormat::Yaml);
        assert_eq!(config.output.directory, Utf8PathBuf::from("build/templates"));
    }

    #[test]
    fn test_schema_rejects_missing_name() {
        let err = StackConfig::from_yaml("env:\n  region: us-east-1\n").unwrap_err();
        assert!(matches!(err, Error::SchemaValidation { .. }));
    }

    #[test]
    fn test_schema_rejects_unknown_removal_policy() {
        let yaml = "name: app\ndefaults:\n  secretRemovalPolicy: forever\n";
        assert!(StackConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempfile::tempdir().unwrap();
        let dir = utf8_dir(&temp);
        let path = dir.join("tessera.yaml");
        fs::write(&path, "name: explicit\n").unwrap();

        let loaded = LoadedConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.config.name, "explicit");
        assert_eq!(loaded.working_dir, dir);
        assert_eq!(loaded.output_dir(), dir.join("tessera.out"));
    }

    #[test]
    fn test_load_missing_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = utf8_dir(&temp).join("absent.yaml");
        let err = LoadedConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_find_config_in_parent() {
        let temp = tempfile::tempdir().unwrap();
        let dir = utf8_dir(&temp);
        fs::write(dir.join("tessera.yml"), "name: parent\n").unwrap();
        let nested = dir.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let (path, content) = find_config_from(&nested).unwrap();
        assert_eq!(path, dir.join("tessera.yml"));
        assert!(content.contains("parent"));
    }
}
