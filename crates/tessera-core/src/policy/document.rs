//! Policy documents

use super::statement::PolicyStatement;
use crate::error::Result;
use crate::token::ReferenceContext;
use serde_json::{json, Value};
use std::fmt;

/// Policy language version emitted in every document
pub const POLICY_VERSION: &str = "2012-10-17";

/// Where a policy document is attached, which decides the rules its
/// statements must follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Attached to a role, user or group
    Identity,
    /// Attached to the resource itself (secret, key, ...)
    Resource,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Identity => write!(f, "identity-based"),
            PolicyKind::Resource => write!(f, "resource-based"),
        }
    }
}

/// An ordered collection of statements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyDocument {
    statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statement(mut self, statement: PolicyStatement) -> Self {
        self.add_statement(statement);
        self
    }

    /// Append a statement. Order is preserved and nothing is deduplicated.
    pub fn add_statement(&mut self, statement: PolicyStatement) {
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Collect every rule violation, prefixed with the statement index
    pub fn validate(&self, kind: PolicyKind) -> Vec<String> {
        self.statements
            .iter()
            .enumerate()
            .flat_map(|(index, statement)| {
                let errors = match kind {
                    PolicyKind::Identity => statement.validate_for_identity_policy(),
                    PolicyKind::Resource => statement.validate_for_resource_policy(),
                };
                errors
                    .into_iter()
                    .map(move |error| format!("Statement {}: {}", index, error))
            })
            .collect()
    }

    /// `{"Version": ..., "Statement": [...]}` in insertion order
    pub fn to_json(&self, ctx: &dyn ReferenceContext) -> Result<Value> {
        let statements = self
            .statements
            .iter()
            .map(|statement| statement.to_json(ctx))
            .collect::<Result<Vec<_>>>()?;
        Ok(json!({
            "Statement": statements,
            "Version": POLICY_VERSION,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::LogicalId;
    use crate::policy::PolicyPrincipal;
    use crate::token::Pseudo;

    struct AllKnown;

    impl ReferenceContext for AllKnown {
        fn pseudo_value(&self, _pseudo: Pseudo) -> Option<String> {
            None
        }

        fn has_resource(&self, _logical_id: &LogicalId) -> bool {
            true
        }
    }

    #[test]
    fn test_empty_document_shape() {
        let doc = PolicyDocument::new();
        assert_eq!(
            doc.to_json(&AllKnown).unwrap(),
            json!({ "Statement": [], "Version": "2012-10-17" })
        );
    }

    #[test]
    fn test_statements_kept_in_order_without_dedup() {
        let statement = PolicyStatement::new()
            .with_actions(["secretsmanager:GetSecretValue"])
            .with_resources(["*"]);
        let mut doc = PolicyDocument::new().with_statement(statement.clone());
        doc.add_statement(
            PolicyStatement::new()
                .with_actions(["secretsmanager:PutSecretValue"])
                .with_resources(["*"]),
        );
        doc.add_statement(statement);

        assert_eq!(doc.statement_count(), 3);
        let rendered = doc.to_json(&AllKnown).unwrap();
        assert_eq!(
            rendered["Statement"][1]["Action"],
            json!("secretsmanager:PutSecretValue")
        );
        assert_eq!(rendered["Statement"][0], rendered["Statement"][2]);
    }

    #[test]
    fn test_validate_reports_statement_index() {
        let doc = PolicyDocument::new()
            .with_statement(
                PolicyStatement::new()
                    .with_actions(["secretsmanager:GetSecretValue"])
                    .with_principal(PolicyPrincipal::account_root())
                    .with_resources(["*"]),
            )
            .with_statement(PolicyStatement::new().with_resources(["*"]));

        let errors = doc.validate(PolicyKind::Resource);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.starts_with("Statement 1:")));
    }

    #[test]
    fn test_valid_identity_document() {
        let doc = PolicyDocument::new().with_statement(
            PolicyStatement::new()
                .with_actions(["kms:Decrypt"])
                .with_resources(["arn:aws:kms:us-east-1:123456789012:key/abc"]),
        );
        assert!(doc.validate(PolicyKind::Identity).is_empty());
    }
}
