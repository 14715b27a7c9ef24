//! Resource nodes
//!
//! A [`ResourceNode`] is one entry of the rendered `Resources` section: a
//! resource type, a property bag and lifecycle attributes. Property values
//! stay structured ([`Property`]) until synthesis so that tokens and policy
//! documents can still be amended after the node has been registered.

use crate::error::Result;
use crate::policy::PolicyDocument;
use crate::token::{ReferenceContext, Token};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Stack-unique identifier of a resource node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for LogicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What the provisioning engine does with a resource when it leaves the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    #[default]
    Destroy,
    Retain,
    Snapshot,
}

impl RemovalPolicy {
    /// Value of the `DeletionPolicy` / `UpdateReplacePolicy` attributes
    pub fn as_deletion_policy(&self) -> &'static str {
        match self {
            RemovalPolicy::Destroy => "Delete",
            RemovalPolicy::Retain => "Retain",
            RemovalPolicy::Snapshot => "Snapshot",
        }
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalPolicy::Destroy => write!(f, "destroy"),
            RemovalPolicy::Retain => write!(f, "retain"),
            RemovalPolicy::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// A property value that is resolved during synthesis
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// A possibly deferred string
    Token(Token),
    /// A value with no deferred parts
    Value(Value),
    List(Vec<Property>),
    Map(BTreeMap<String, Property>),
    /// A policy document that may still receive statements
    Policy(PolicyDocument),
}

impl Property {
    /// Build a list property from anything convertible to tokens
    pub fn tokens<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        Property::List(
            items
                .into_iter()
                .map(|item| Property::Token(item.into()))
                .collect(),
        )
    }

    pub fn as_policy(&self) -> Option<&PolicyDocument> {
        match self {
            Property::Policy(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_policy_mut(&mut self) -> Option<&mut PolicyDocument> {
        match self {
            Property::Policy(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn resolve(&self, ctx: &dyn ReferenceContext) -> Result<Value> {
        match self {
            Property::Token(token) => token.resolve(ctx),
            Property::Value(value) => Ok(value.clone()),
            Property::List(items) => items
                .iter()
                .map(|item| item.resolve(ctx))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Property::Map(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.resolve(ctx)?);
                }
                Ok(Value::Object(map))
            }
            Property::Policy(doc) => doc.to_json(ctx),
        }
    }
}

impl From<Token> for Property {
    fn from(value: Token) -> Self {
        Property::Token(value)
    }
}

impl From<&str> for Property {
    fn from(value: &str) -> Self {
        Property::Token(Token::literal(value))
    }
}

impl From<String> for Property {
    fn from(value: String) -> Self {
        Property::Token(Token::Literal(value))
    }
}

impl From<Value> for Property {
    fn from(value: Value) -> Self {
        Property::Value(value)
    }
}

impl From<bool> for Property {
    fn from(value: bool) -> Self {
        Property::Value(Value::Bool(value))
    }
}

impl From<u32> for Property {
    fn from(value: u32) -> Self {
        Property::Value(Value::from(value))
    }
}

impl From<PolicyDocument> for Property {
    fn from(value: PolicyDocument) -> Self {
        Property::Policy(value)
    }
}

/// A typed node in the resource graph
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceNode {
    resource_type: String,
    properties: BTreeMap<String, Property>,
    removal_policy: Option<RemovalPolicy>,
    depends_on: BTreeSet<LogicalId>,
}

impl ResourceNode {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties: BTreeMap::new(),
            removal_policy: None,
            depends_on: BTreeSet::new(),
        }
    }

    /// Builder-style property setter
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Property>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Set a property only when a value is present
    pub fn with_optional_property<P: Into<Property>>(
        mut self,
        name: impl Into<String>,
        value: Option<P>,
    ) -> Self {
        if let Some(value) = value {
            self.set_property(name, value);
        }
        self
    }

    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = Some(policy);
        self
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Property>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &BTreeMap<String, Property> {
        &self.properties
    }

    /// Mutable access to a policy-document property
    pub fn policy_mut(&mut self, name: &str) -> Option<&mut PolicyDocument> {
        self.properties.get_mut(name).and_then(Property::as_policy_mut)
    }

    pub fn policy(&self, name: &str) -> Option<&PolicyDocument> {
        self.properties.get(name).and_then(Property::as_policy)
    }

    pub fn removal_policy(&self) -> Option<RemovalPolicy> {
        self.removal_policy
    }

    pub fn apply_removal_policy(&mut self, policy: RemovalPolicy) {
        self.removal_policy = Some(policy);
    }

    pub fn add_dependency(&mut self, logical_id: LogicalId) {
        self.depends_on.insert(logical_id);
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &LogicalId> {
        self.depends_on.iter()
    }

    /// Render the node as a template resource entry
    pub fn to_template(&self, ctx: &dyn ReferenceContext) -> Result<Value> {
        let mut entry = Map::new();
        entry.insert("Type".into(), Value::String(self.resource_type.clone()));

        if !self.properties.is_empty() {
            let mut properties = Map::new();
            for (name, value) in &self.properties {
                properties.insert(name.clone(), value.resolve(ctx)?);
            }
            entry.insert("Properties".into(), Value::Object(properties));
        }

        if let Some(policy) = self.removal_policy {
            let value = Value::String(policy.as_deletion_policy().to_string());
            entry.insert("DeletionPolicy".into(), value.clone());
            entry.insert("UpdateReplacePolicy".into(), value);
        }

        if !self.depends_on.is_empty() {
            let mut depends_on = Vec::with_capacity(self.depends_on.len());
            for id in &self.depends_on {
                if !ctx.has_resource(id) {
                    return Err(crate::error::Error::dangling_reference(id.as_str()));
                }
                depends_on.push(Value::String(id.to_string()));
            }
            entry.insert("DependsOn".into(), Value::Array(depends_on));
        }

        Ok(Value::Object(entry))
    }
}
