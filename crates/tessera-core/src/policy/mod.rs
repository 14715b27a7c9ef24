//! Access policy building
//!
//! Statements are accumulated into [`PolicyDocument`]s attached to resource
//! nodes. Documents are validated once, during synthesis, against the rules of
//! their [`PolicyKind`].

mod document;
mod principal;
mod statement;

pub use document::{PolicyDocument, PolicyKind, POLICY_VERSION};
pub use principal::PolicyPrincipal;
pub use statement::{Effect, PolicyStatement};
