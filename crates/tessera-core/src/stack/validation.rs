//! Synthesis-time validations
//!
//! Constructs register a [`Validation`] with the stack for every invariant
//! that can only be checked once the whole graph has been built. The stack
//! runs all of them at the start of synthesis.

use super::Stack;
use crate::node::LogicalId;
use crate::policy::PolicyKind;
use std::fmt;

/// A deferred check over the finished graph
pub trait Validation: fmt::Debug {
    /// Return one message per violated invariant
    fn validate(&self, stack: &Stack) -> Vec<String>;
}

/// Checks the statements of a policy-document property
#[derive(Debug, Clone)]
pub struct PolicyValidation {
    logical_id: LogicalId,
    property: String,
    kind: PolicyKind,
}

impl PolicyValidation {
    pub fn new(logical_id: LogicalId, property: impl Into<String>, kind: PolicyKind) -> Self {
        Self {
            logical_id,
            property: property.into(),
            kind,
        }
    }
}

impl Validation for PolicyValidation {
    fn validate(&self, stack: &Stack) -> Vec<String> {
        let Some(node) = stack.node(&self.logical_id) else {
            return vec![format!(
                "[{}] resource carrying a {} policy is missing from the stack",
                self.logical_id, self.kind
            )];
        };

        match node.policy(&self.property) {
            Some(doc) => doc
                .validate(self.kind)
                .into_iter()
                .map(|error| format!("[{}] {}: {}", self.logical_id, self.property, error))
                .collect(),
            None => vec![format!(
                "[{}] expected a {} policy document in property '{}'",
                self.logical_id, self.kind, self.property
            )],
        }
    }
}
