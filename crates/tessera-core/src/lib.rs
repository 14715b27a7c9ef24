//! # tessera-core
//!
//! Core library for Tessera providing:
//! - Deferred references resolved at synthesis time
//! - Resource nodes and the stack that owns them
//! - IAM policy documents, principals, roles and grants
//! - Template synthesis with JSON Schema validation
//! - Configuration file parsing (tessera.yaml)

pub mod config;
pub mod error;
pub mod grant;
pub mod node;
pub mod policy;
pub mod role;
pub mod schema;
pub mod stack;
pub mod template;
pub mod token;

pub use config::{LoadedConfig, StackConfig};
pub use error::{Error, Result};
pub use grant::{Grant, Grantable, ResourceWithPolicy};
pub use node::{LogicalId, Property, RemovalPolicy, ResourceNode};
pub use policy::{Effect, PolicyDocument, PolicyKind, PolicyPrincipal, PolicyStatement};
pub use role::{Role, RoleProps};
pub use schema::SchemaValidator;
pub use stack::{ConstructPath, PolicyValidation, Stack, Validation};
pub use template::{Output, Template};
pub use token::{Pseudo, Reference, ReferenceContext, Token};
