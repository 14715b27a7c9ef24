//! Attachment targets
//!
//! Attaching a secret to a database records the connection details
//! (host, port, engine) in the secret through an
//! `AWS::SecretsManager::SecretTargetAttachment` resource.

use std::fmt;
use tessera_core::{LogicalId, Token};

/// Resource kinds a secret can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentTargetType {
    RdsDbInstance,
    RdsDbCluster,
    RdsDbProxy,
    RedshiftCluster,
    DocdbDbInstance,
    DocdbDbCluster,
}

impl AttachmentTargetType {
    /// The `TargetType` value
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentTargetType::RdsDbInstance => "AWS::RDS::DBInstance",
            AttachmentTargetType::RdsDbCluster => "AWS::RDS::DBCluster",
            AttachmentTargetType::RdsDbProxy => "AWS::RDS::DBProxy",
            AttachmentTargetType::RedshiftCluster => "AWS::Redshift::Cluster",
            AttachmentTargetType::DocdbDbInstance => "AWS::DocDB::DBInstance",
            AttachmentTargetType::DocdbDbCluster => "AWS::DocDB::DBCluster",
        }
    }
}

impl fmt::Display for AttachmentTargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentTargetProps {
    pub target_id: Token,
    pub target_type: AttachmentTargetType,
}

impl AttachmentTargetProps {
    pub fn new(target_id: impl Into<Token>, target_type: AttachmentTargetType) -> Self {
        Self {
            target_id: target_id.into(),
            target_type,
        }
    }

    /// Target a resource node of this stack by `Ref`
    pub fn from_resource(logical_id: &LogicalId, target_type: AttachmentTargetType) -> Self {
        Self::new(Token::reference(logical_id), target_type)
    }
}

/// Something a secret can be attached to
pub trait SecretAttachmentTarget {
    fn as_secret_attachment_target(&self) -> AttachmentTargetProps;
}

impl SecretAttachmentTarget for AttachmentTargetProps {
    fn as_secret_attachment_target(&self) -> AttachmentTargetProps {
        self.clone()
    }
}
