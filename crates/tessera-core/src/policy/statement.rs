//! Policy statements

use super::principal::PolicyPrincipal;
use crate::error::Result;
use crate::node::Property;
use crate::token::{ReferenceContext, Token};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Whether a statement allows or denies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Allow => write!(f, "Allow"),
            Effect::Deny => write!(f, "Deny"),
        }
    }
}

/// One access-control statement.
///
/// Statements are never validated when built: a grant may create a statement
/// in one place and another call may enrich it later. Invariants are checked
/// by the policy document during synthesis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyStatement {
    sid: Option<String>,
    effect: Effect,
    actions: Vec<String>,
    not_actions: Vec<String>,
    resources: Vec<Token>,
    not_resources: Vec<Token>,
    principals: Vec<PolicyPrincipal>,
    conditions: BTreeMap<String, BTreeMap<String, Property>>,
}

impl PolicyStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_actions(actions);
        self
    }

    pub fn with_not_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_not_actions(actions);
        self
    }

    pub fn with_resources<I, T>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.add_resources(resources);
        self
    }

    pub fn with_not_resources<I, T>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        for resource in resources {
            push_unique(&mut self.not_resources, resource.into());
        }
        self
    }

    pub fn with_principal(mut self, principal: PolicyPrincipal) -> Self {
        self.add_principal(principal);
        self
    }

    pub fn with_condition(
        mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Property>,
    ) -> Self {
        self.add_condition(operator, key, value);
        self
    }

    pub fn add_actions<I, S>(&mut self, actions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for action in actions {
            push_unique(&mut self.actions, action.into());
        }
    }

    pub fn add_not_actions<I, S>(&mut self, actions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for action in actions {
            push_unique(&mut self.not_actions, action.into());
        }
    }

    pub fn add_resources<I, T>(&mut self, resources: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        for resource in resources {
            push_unique(&mut self.resources, resource.into());
        }
    }

    pub fn add_principal(&mut self, principal: PolicyPrincipal) {
        push_unique(&mut self.principals, principal);
    }

    /// Set `Condition.<operator>.<key>`, replacing any previous value for the key
    pub fn add_condition(
        &mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Property>,
    ) {
        self.conditions
            .entry(operator.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn not_actions(&self) -> &[String] {
        &self.not_actions
    }

    pub fn resources(&self) -> &[Token] {
        &self.resources
    }

    pub fn principals(&self) -> &[PolicyPrincipal] {
        &self.principals
    }

    pub fn condition(&self, operator: &str, key: &str) -> Option<&Property> {
        self.conditions.get(operator).and_then(|keys| keys.get(key))
    }

    pub fn has_principal(&self) -> bool {
        !self.principals.is_empty()
    }

    pub fn has_resource(&self) -> bool {
        !self.resources.is_empty() || !self.not_resources.is_empty()
    }

    /// Checks that apply to a statement in any policy
    pub fn validate_for_any_policy(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.actions.is_empty() && self.not_actions.is_empty() {
            errors.push(
                "A PolicyStatement must specify at least one 'action' or 'notAction'.".to_string(),
            );
        }
        errors
    }

    /// Checks for a statement attached to a resource
    pub fn validate_for_resource_policy(&self) -> Vec<String> {
        let mut errors = self.validate_for_any_policy();
        if !self.has_principal() {
            errors.push(
                "A PolicyStatement used in a resource-based policy must specify at least one IAM principal."
                    .to_string(),
            );
        }
        errors
    }

    /// Checks for a statement attached to an identity
    pub fn validate_for_identity_policy(&self) -> Vec<String> {
        let mut errors = self.validate_for_any_policy();
        if self.has_principal() {
            errors.push(
                "A PolicyStatement used in an identity-based policy cannot specify any IAM principals."
                    .to_string(),
            );
        }
        if !self.has_resource() {
            errors.push(
                "A PolicyStatement used in an identity-based policy must specify at least one resource."
                    .to_string(),
            );
        }
        errors
    }

    /// Render the statement as a template value
    pub fn to_json(&self, ctx: &dyn ReferenceContext) -> Result<Value> {
        let mut map = Map::new();

        if !self.actions.is_empty() {
            map.insert("Action".into(), strings_value(&self.actions));
        }
        if !self.not_actions.is_empty() {
            map.insert("NotAction".into(), strings_value(&self.not_actions));
        }

        if !self.conditions.is_empty() {
            let mut operators = Map::new();
            for (operator, keys) in &self.conditions {
                let mut resolved = Map::new();
                for (key, value) in keys {
                    resolved.insert(key.clone(), value.resolve(ctx)?);
                }
                operators.insert(operator.clone(), Value::Object(resolved));
            }
            map.insert("Condition".into(), Value::Object(operators));
        }

        map.insert("Effect".into(), Value::String(self.effect.to_string()));

        if !self.principals.is_empty() {
            let mut grouped: BTreeMap<&'static str, Vec<Value>> = BTreeMap::new();
            for principal in &self.principals {
                let (key, value) = principal.policy_fragment();
                grouped.entry(key).or_default().push(value.resolve(ctx)?);
            }
            let principal: Map<String, Value> = grouped
                .into_iter()
                .map(|(key, values)| (key.to_string(), scalar_or_list(values)))
                .collect();
            map.insert("Principal".into(), Value::Object(principal));
        }

        if !self.resources.is_empty() {
            map.insert("Resource".into(), tokens_value(&self.resources, ctx)?);
        }
        if !self.not_resources.is_empty() {
            map.insert("NotResource".into(), tokens_value(&self.not_resources, ctx)?);
        }

        if let Some(sid) = &self.sid {
            map.insert("Sid".into(), Value::String(sid.clone()));
        }

        Ok(Value::Object(map))
    }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

fn scalar_or_list(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

fn strings_value(items: &[String]) -> Value {
    scalar_or_list(items.iter().cloned().map(Value::String).collect())
}

fn tokens_value(tokens: &[Token], ctx: &dyn ReferenceContext) -> Result<Value> {
    let values = tokens
        .iter()
        .map(|token| token.resolve(ctx))
        .collect::<Result<Vec<_>>>()?;
    Ok(scalar_or_list(values))
}
