//! Builders for test stacks and constructs

use tessera_core::config::Environment;
use tessera_core::{LogicalId, PolicyPrincipal, ResourceNode, Role, RoleProps, Stack, StackConfig};
use tessera_secrets::{
    AttachmentTargetProps, AttachmentTargetType, Key, KeyProps, KeyRef, Secret, SecretProps,
};

/// Stack with no pinned environment; pseudo parameters stay deferred
pub fn test_stack() -> Stack {
    Stack::named("test-stack")
}

/// Stack pinned to an account and region
pub fn pinned_stack() -> Stack {
    let mut config = StackConfig::new("pinned-stack");
    config.env = Environment {
        account: Some(super::ACCOUNT.to_string()),
        region: Some(super::REGION.to_string()),
        partition: Some("aws".to_string()),
    };
    Stack::new(config)
}

pub fn lambda_role(stack: &mut Stack, id: &str) -> Role {
    Role::new(
        stack,
        id,
        RoleProps::assumed_by(PolicyPrincipal::service("lambda.amazonaws.com")),
    )
    .unwrap()
}

pub fn owned_key(stack: &mut Stack) -> Key {
    Key::new(stack, "Key", KeyProps::default()).unwrap()
}

pub fn encrypted_secret(stack: &mut Stack, key: &Key) -> Secret {
    Secret::new(
        stack,
        "Secret",
        SecretProps {
            encryption_key: Some(KeyRef::from(key)),
            ..Default::default()
        },
    )
    .unwrap()
}

/// A database instance node to attach secrets to
pub fn database_instance(stack: &mut Stack) -> (LogicalId, AttachmentTargetProps) {
    let node = ResourceNode::new("AWS::RDS::DBInstance")
        .with_property("Engine", "postgres")
        .with_property("DBInstanceClass", "db.t3.micro");
    let logical_id = stack.add_resource("Database", node).unwrap();
    let target = AttachmentTargetProps::from_resource(&logical_id, AttachmentTargetType::RdsDbInstance);
    (logical_id, target)
}

pub fn rotation_function(stack: &mut Stack) -> LogicalId {
    let node = ResourceNode::new("AWS::Lambda::Function")
        .with_property("Runtime", "python3.12")
        .with_property("Handler", "index.handler");
    stack.add_resource("RotationFunction", node).unwrap()
}
