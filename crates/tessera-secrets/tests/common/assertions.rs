//! Assertion helpers over synthesized templates

use serde_json::{json, Value};
use tessera_core::{LogicalId, Template};

/// The single resource of a type, failing the test otherwise
pub fn only_resource<'a>(template: &'a Template, resource_type: &'a str) -> (&'a str, &'a Value) {
    let matches: Vec<_> = template.resources_of_type(resource_type).collect();
    assert_eq!(
        matches.len(),
        1,
        "expected exactly one {} in {}",
        resource_type,
        template.to_json_pretty().unwrap_or_default()
    );
    (matches[0].0.as_str(), matches[0].1)
}

pub fn properties<'a>(template: &'a Template, logical_id: &LogicalId) -> &'a Value {
    let resource = template
        .resource(logical_id.as_str())
        .unwrap_or_else(|| panic!("resource {} not in template", logical_id));
    &resource["Properties"]
}

/// Statements of a policy document value
pub fn statements(document: &Value) -> &Vec<Value> {
    document["Statement"]
        .as_array()
        .unwrap_or_else(|| panic!("not a policy document: {}", document))
}

pub fn ref_to(logical_id: &LogicalId) -> Value {
    json!({ "Ref": logical_id.as_str() })
}

pub fn arn_of(logical_id: &LogicalId) -> Value {
    json!({ "Fn::GetAtt": [logical_id.as_str(), "Arn"] })
}

pub fn assert_synthesis_error(err: &tessera_core::Error, fragment: &str) {
    match err {
        tessera_core::Error::Synthesis { errors, .. } => assert!(
            errors.contains(fragment),
            "synthesis errors do not mention '{}':\n{}",
            fragment,
            errors
        ),
        other => panic!("expected a synthesis error, got {:?}", other),
    }
}
