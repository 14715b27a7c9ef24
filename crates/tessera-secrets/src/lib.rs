//! Secrets Manager constructs for Tessera
//!
//! This crate builds on `tessera-core` with:
//! - **Secrets**: generated values, KMS encryption, removal policies
//! - **Imports**: existing secrets by ARN, by ARN with key, or by name
//! - **Access**: read/write grants and lazily created resource policies
//! - **Databases**: target attachments and rotation schedules
//! - **Dynamic references**: `{{resolve:secretsmanager:...}}` values

pub mod arn;
pub mod attachment;
pub mod dynamic_reference;
pub mod error;
pub mod generation;
pub mod key;
pub mod rotation;
pub mod secret;

pub use arn::{parse_secret_name, Arn};
pub use attachment::{AttachmentTargetProps, AttachmentTargetType, SecretAttachmentTarget};
pub use dynamic_reference::{DynamicReference, DynamicReferenceService, SecretValueOptions};
pub use error::{Error, Result};
pub use generation::SecretStringGenerator;
pub use key::{Key, KeyProps, KeyRef};
pub use rotation::{RotationLambda, RotationSchedule, RotationScheduleOptions};
pub use secret::{Secret, SecretAttributes, SecretProps};

// Traits needed to call grant and policy methods on handles
pub use tessera_core::{Grantable, ResourceWithPolicy};
