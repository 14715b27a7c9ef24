//! IAM roles
//!
//! A [`Role`] is the usual grantee: grants land in its default policy, an
//! `AWS::IAM::Policy` node created the first time a statement is added.

use crate::error::Result;
use crate::grant::Grantable;
use crate::node::{LogicalId, Property, ResourceNode};
use crate::policy::{PolicyDocument, PolicyKind, PolicyPrincipal, PolicyStatement};
use crate::stack::{ConstructPath, PolicyValidation, Stack};
use crate::token::Token;
use tracing::debug;

const DEFAULT_POLICY_ID: &str = "DefaultPolicy";

/// Properties for a new role
#[derive(Debug, Clone)]
pub struct RoleProps {
    /// Who may assume the role
    pub assumed_by: PolicyPrincipal,
    pub role_name: Option<String>,
    pub description: Option<String>,
}

impl RoleProps {
    pub fn assumed_by(principal: PolicyPrincipal) -> Self {
        Self {
            assumed_by: principal,
            role_name: None,
            description: None,
        }
    }
}

/// An IAM role owned by the stack
#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    path: ConstructPath,
    logical_id: LogicalId,
}

impl Role {
    pub fn new(stack: &mut Stack, id: &str, props: RoleProps) -> Result<Self> {
        let path = stack.register_construct(None, id)?;

        let trust = PolicyDocument::new().with_statement(
            PolicyStatement::new()
                .with_actions(["sts:AssumeRole"])
                .with_principal(props.assumed_by),
        );
        let node = ResourceNode::new("AWS::IAM::Role")
            .with_property("AssumeRolePolicyDocument", trust)
            .with_optional_property("RoleName", props.role_name)
            .with_optional_property("Description", props.description);

        let logical_id = stack.add_node(Some(&path), "Resource", node)?;
        stack.add_validation(Box::new(PolicyValidation::new(
            logical_id.clone(),
            "AssumeRolePolicyDocument",
            PolicyKind::Resource,
        )));

        Ok(Self { path, logical_id })
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    pub fn path(&self) -> &ConstructPath {
        &self.path
    }

    pub fn role_arn(&self) -> Token {
        Token::get_att(&self.logical_id, "Arn")
    }

    pub fn role_name(&self) -> Token {
        Token::reference(&self.logical_id)
    }

    /// Logical id of the default policy, if a statement was ever added
    pub fn default_policy(&self, stack: &Stack) -> Option<LogicalId> {
        stack.logical_id_at(&self.path, DEFAULT_POLICY_ID).cloned()
    }

    fn ensure_default_policy(&self, stack: &mut Stack) -> Result<LogicalId> {
        if let Some(existing) = self.default_policy(stack) {
            return Ok(existing);
        }

        let node = ResourceNode::new("AWS::IAM::Policy")
            .with_property("PolicyDocument", PolicyDocument::new())
            .with_property("Roles", Property::tokens([self.role_name()]));
        let policy_id = stack.add_node(Some(&self.path), DEFAULT_POLICY_ID, node)?;

        if let Some(node) = stack.node_mut(&policy_id) {
            node.set_property("PolicyName", policy_id.to_string());
        }
        stack.add_validation(Box::new(PolicyValidation::new(
            policy_id.clone(),
            "PolicyDocument",
            PolicyKind::Identity,
        )));

        debug!("Created default policy {} for role {}", policy_id, self.path);
        Ok(policy_id)
    }
}

impl Grantable for Role {
    fn grant_principal(&self) -> PolicyPrincipal {
        PolicyPrincipal::arn(self.role_arn())
    }

    fn add_to_principal_policy(
        &self,
        stack: &mut Stack,
        statement: PolicyStatement,
    ) -> Result<bool> {
        let policy_id = self.ensure_default_policy(stack)?;
        stack
            .policy_mut(&policy_id, "PolicyDocument")?
            .add_statement(statement);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::{Grant, ResourceWithPolicy};
    use serde_json::json;
    use std::cell::RefCell;

    fn lambda_role(stack: &mut Stack) -> Role {
        Role::new(
            stack,
            "Role",
            RoleProps::assumed_by(PolicyPrincipal::service("lambda.amazonaws.com")),
        )
        .unwrap()
    }

    #[derive(Default)]
    struct RecordingResource {
        statements: RefCell<Vec<PolicyStatement>>,
        accepts: bool,
    }

    impl ResourceWithPolicy for RecordingResource {
        fn add_to_resource_policy(
            &self,
            _stack: &mut Stack,
            statement: PolicyStatement,
        ) -> Result<bool> {
            if self.accepts {
                self.statements.borrow_mut().push(statement);
            }
            Ok(self.accepts)
        }
    }

    #[test]
    fn test_role_renders_trust_policy() {
        let mut stack = Stack::named("test");
        let role = lambda_role(&mut stack);
        let template = stack.synth().unwrap();

        let resource = template.resource(role.logical_id().as_str()).unwrap();
        assert_eq!(resource["Type"], json!("AWS::IAM::Role"));
        assert_eq!(
            resource["Properties"]["AssumeRolePolicyDocument"],
            json!({
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" }
                }],
                "Version": "2012-10-17"
            })
        );
    }

    #[test]
    fn test_default_policy_created_once() {
        let mut stack = Stack::named("test");
        let role = lambda_role(&mut stack);
        assert!(role.default_policy(&stack).is_none());

        for action in ["s3:GetObject", "s3:PutObject"] {
            let statement = PolicyStatement::new().with_actions([action]).with_resources(["*"]);
            assert!(role.add_to_principal_policy(&mut stack, statement).unwrap());
        }

        let policy_id = role.default_policy(&stack).unwrap();
        let template = stack.synth().unwrap();
        assert_eq!(template.resources_of_type("AWS::IAM::Policy").count(), 1);

        let policy = template.resource(policy_id.as_str()).unwrap();
        assert_eq!(
            policy["Properties"]["PolicyName"],
            json!(policy_id.as_str())
        );
        assert_eq!(
            policy["Properties"]["Roles"],
            json!([{ "Ref": role.logical_id().as_str() }])
        );
        assert_eq!(
            policy["Properties"]["PolicyDocument"]["Statement"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_identity_statement_without_resource_fails_synthesis() {
        let mut stack = Stack::named("test");
        let role = lambda_role(&mut stack);
        role.add_to_principal_policy(
            &mut stack,
            PolicyStatement::new().with_actions(["s3:GetObject"]),
        )
        .unwrap();

        assert!(stack.synth().is_err());
    }

    #[test]
    fn test_grant_prefers_identity_policy() {
        let mut stack = Stack::named("test");
        let role = lambda_role(&mut stack);
        let resource = RecordingResource {
            accepts: true,
            ..Default::default()
        };

        let grant = Grant::add_to_principal_or_resource(
            &mut stack,
            &role,
            PolicyStatement::new().with_actions(["s3:GetObject"]).with_resources(["*"]),
            &resource,
        )
        .unwrap();

        assert!(grant.principal_statement.is_some());
        assert!(grant.resource_statement.is_none());
        assert!(resource.statements.borrow().is_empty());
    }

    #[test]
    fn test_grant_falls_back_to_resource_policy() {
        let mut stack = Stack::named("test");
        let account = PolicyPrincipal::account("111122223333");
        let resource = RecordingResource {
            accepts: true,
            ..Default::default()
        };

        let grant = Grant::add_to_principal_or_resource(
            &mut stack,
            &account,
            PolicyStatement::new().with_actions(["s3:GetObject"]).with_resources(["*"]),
            &resource,
        )
        .unwrap();

        let statement = grant.resource_statement.unwrap();
        assert_eq!(statement.principals(), &[account]);
        assert_eq!(resource.statements.borrow().len(), 1);
    }

    #[test]
    fn test_grant_without_any_policy_is_unsuccessful() {
        let mut stack = Stack::named("test");
        let resource = RecordingResource::default();
        let grant = Grant::add_to_principal_or_resource(
            &mut stack,
            &PolicyPrincipal::Any,
            PolicyStatement::new().with_actions(["s3:GetObject"]),
            &resource,
        )
        .unwrap();
        assert!(!grant.success());
    }
}
