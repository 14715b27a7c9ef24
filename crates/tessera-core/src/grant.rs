//! Permission grants
//!
//! A grant puts a statement wherever it can take effect: on the grantee's own
//! identity policy when it has one, otherwise on the resource's policy with
//! the grantee named as principal.

use crate::error::Result;
use crate::policy::{PolicyPrincipal, PolicyStatement};
use crate::stack::Stack;
use tracing::{debug, warn};

/// Something that can be granted permissions
pub trait Grantable {
    /// The principal to name in resource policies
    fn grant_principal(&self) -> PolicyPrincipal;

    /// Add a statement to this grantee's identity policy.
    ///
    /// Returns `false` when the grantee has no identity policy of its own.
    fn add_to_principal_policy(
        &self,
        stack: &mut Stack,
        statement: PolicyStatement,
    ) -> Result<bool>;
}

/// A resource that carries its own access policy
pub trait ResourceWithPolicy {
    /// Add a statement to the resource policy.
    ///
    /// Returns `false` when the resource's policy cannot be modified.
    fn add_to_resource_policy(&self, stack: &mut Stack, statement: PolicyStatement)
        -> Result<bool>;
}

/// Principals without an identity policy (accounts, services, anyone)
impl Grantable for PolicyPrincipal {
    fn grant_principal(&self) -> PolicyPrincipal {
        self.clone()
    }

    fn add_to_principal_policy(
        &self,
        _stack: &mut Stack,
        _statement: PolicyStatement,
    ) -> Result<bool> {
        Ok(false)
    }
}

/// Where the statements of a grant ended up
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grant {
    pub principal_statement: Option<PolicyStatement>,
    pub resource_statement: Option<PolicyStatement>,
}

impl Grant {
    /// Whether any statement was added
    pub fn success(&self) -> bool {
        self.principal_statement.is_some() || self.resource_statement.is_some()
    }

    /// Try the grantee's identity policy first, then the resource policy.
    ///
    /// `statement` must not name a principal; the grantee's principal is added
    /// when falling back to the resource policy.
    pub fn add_to_principal_or_resource(
        stack: &mut Stack,
        grantee: &dyn Grantable,
        statement: PolicyStatement,
        resource: &dyn ResourceWithPolicy,
    ) -> Result<Grant> {
        if grantee.add_to_principal_policy(stack, statement.clone())? {
            debug!("Granted {:?} through identity policy", statement.actions());
            return Ok(Grant {
                principal_statement: Some(statement),
                resource_statement: None,
            });
        }

        let principal = grantee.grant_principal();
        let resource_statement = statement.with_principal(principal.clone());
        if resource.add_to_resource_policy(stack, resource_statement.clone())? {
            debug!("Granted {} through resource policy", principal);
            return Ok(Grant {
                principal_statement: None,
                resource_statement: Some(resource_statement),
            });
        }

        warn!(
            "Could not grant {:?} to {}: neither an identity nor a resource policy is available",
            resource_statement.actions(),
            principal
        );
        Ok(Grant::default())
    }

    /// Add only to the grantee's identity policy
    pub fn add_to_principal(
        stack: &mut Stack,
        grantee: &dyn Grantable,
        statement: PolicyStatement,
    ) -> Result<Grant> {
        if grantee.add_to_principal_policy(stack, statement.clone())? {
            Ok(Grant {
                principal_statement: Some(statement),
                resource_statement: None,
            })
        } else {
            warn!(
                "{} has no identity policy; {:?} not granted",
                grantee.grant_principal(),
                statement.actions()
            );
            Ok(Grant::default())
        }
    }
}
