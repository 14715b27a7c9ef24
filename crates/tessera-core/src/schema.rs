//! JSON Schema validation for stack configuration and rendered templates

use crate::error::{Error, Result};
use jsonschema::Validator;
use rust_embed::RustEmbed;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Schemas shipped in `schemas/`, one `<name>.schema.json` per document kind
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/schemas/"]
#[prefix = ""]
struct EmbeddedSchemas;

const SCHEMA_SUFFIX: &str = ".schema.json";

/// Compiled validators for stack configuration and rendered templates
#[derive(Debug)]
pub struct SchemaValidator {
    schemas: HashMap<String, Validator>,
}

static VALIDATOR: OnceLock<SchemaValidator> = OnceLock::new();

/// Compile one embedded file, skipping anything that is not a schema
fn compile_embedded(file: &str) -> Result<Option<(String, Validator)>> {
    let Some(name) = file.strip_suffix(SCHEMA_SUFFIX) else {
        return Ok(None);
    };
    let Some(content) = EmbeddedSchemas::get(file) else {
        return Ok(None);
    };

    let schema: Value = serde_json::from_slice(&content.data)?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| Error::invalid_config(format!("Schema '{}' does not compile: {}", name, e)))?;

    debug!("Compiled schema: {}", name);
    Ok(Some((name.to_string(), validator)))
}

impl SchemaValidator {
    /// Compile every embedded schema
    pub fn new() -> Result<Self> {
        let mut schemas = HashMap::new();
        for file in EmbeddedSchemas::iter() {
            if let Some((name, validator)) = compile_embedded(&file)? {
                schemas.insert(name, validator);
            }
        }

        if schemas.is_empty() {
            return Err(Error::schema_not_found("no embedded schemas"));
        }
        Ok(Self { schemas })
    }

    /// Shared instance, compiled on first use
    pub fn global() -> Result<&'static SchemaValidator> {
        if let Some(validator) = VALIDATOR.get() {
            return Ok(validator);
        }
        let validator = SchemaValidator::new()?;
        Ok(VALIDATOR.get_or_init(|| validator))
    }

    /// Check `value` against the schema called `schema_name`, reporting every
    /// violation with its JSON pointer
    pub fn validate(&self, value: &Value, schema_name: &str) -> Result<()> {
        let validator = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| Error::schema_not_found(schema_name))?;

        let violations: Vec<String> = validator
            .iter_errors(value)
            .map(|violation| match violation.instance_path().to_string() {
                pointer if pointer.is_empty() => format!("  - {}", violation),
                pointer => format!("  - {}: {}", pointer, violation),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::schema_validation(violations))
        }
    }

    /// Parse YAML and check it like [`SchemaValidator::validate`]
    pub fn validate_yaml(&self, yaml: &str, schema_name: &str) -> Result<()> {
        let value: Value = serde_yaml_ng::from_str(yaml)?;
        self.validate(&value, schema_name)
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }
}
