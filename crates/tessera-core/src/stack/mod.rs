//! The stack: construct scope, resource graph and synthesis
//!
//! Every construct is created against a `&mut Stack`. The stack owns the
//! construct tree (to detect id collisions), the logical id to node map, and
//! the validations gathered while the graph is built. [`Stack::synth`] runs
//! those validations and resolves every deferred reference in one pass; it
//! either returns a complete template or fails without producing output.

mod path;
mod validation;

pub use path::ConstructPath;
pub use validation::{PolicyValidation, Validation};

use crate::config::{Environment, StackConfig};
use crate::error::{Error, Result};
use crate::node::{LogicalId, ResourceNode};
use crate::policy::PolicyDocument;
use crate::schema::SchemaValidator;
use crate::template::{Output, Template};
use crate::token::{Pseudo, ReferenceContext, Token};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// A deployable unit of resources
#[derive(Debug)]
pub struct Stack {
    config: StackConfig,
    constructs: HashSet<ConstructPath>,
    node_paths: HashMap<ConstructPath, LogicalId>,
    resources: BTreeMap<LogicalId, ResourceNode>,
    outputs: BTreeMap<String, (Token, Option<String>)>,
    validations: Vec<Box<dyn Validation>>,
}

impl Stack {
    pub fn new(config: StackConfig) -> Self {
        debug!("Creating stack: {}", config.name);
        Self {
            config,
            constructs: HashSet::new(),
            node_paths: HashMap::new(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
            validations: Vec::new(),
        }
    }

    /// Stack with default configuration and the given name
    pub fn named(name: &str) -> Self {
        Self::new(StackConfig::new(name))
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.config.env
    }

    /// Claim `id` under `parent` (or at the top level)
    pub fn register_construct(
        &mut self,
        parent: Option<&ConstructPath>,
        id: &str,
    ) -> Result<ConstructPath> {
        path::validate_id(id)?;

        let path = match parent {
            Some(parent) => parent.child(id),
            None => ConstructPath::root(id),
        };

        if !self.constructs.insert(path.clone()) {
            return Err(Error::duplicate_construct(path.to_string()));
        }

        debug!("Registered construct: {}", path);
        Ok(path)
    }

    pub fn has_construct(&self, path: &ConstructPath) -> bool {
        self.constructs.contains(path)
    }

    /// Whether `parent` already has a child construct named `id`
    pub fn has_child(&self, parent: &ConstructPath, id: &str) -> bool {
        self.constructs.contains(&parent.child(id))
    }

    /// Register a construct at `parent/id` holding `node`, returning the
    /// node's logical id
    pub fn add_node(
        &mut self,
        parent: Option<&ConstructPath>,
        id: &str,
        node: ResourceNode,
    ) -> Result<LogicalId> {
        let path = self.register_construct(parent, id)?;
        let logical_id = path::allocate_logical_id(&path);

        if self.resources.contains_key(&logical_id) {
            self.constructs.remove(&path);
            return Err(Error::DuplicateLogicalId {
                logical_id: logical_id.to_string(),
                path: path.to_string(),
            });
        }

        debug!(
            "Added {} as {} ({})",
            node.resource_type(),
            logical_id,
            path
        );
        self.node_paths.insert(path, logical_id.clone());
        self.resources.insert(logical_id.clone(), node);
        Ok(logical_id)
    }

    /// Add a top-level resource of any type
    pub fn add_resource(&mut self, id: &str, node: ResourceNode) -> Result<LogicalId> {
        self.add_node(None, id, node)
    }

    /// Logical id of the node registered at `parent/id`, if any
    pub fn logical_id_at(&self, parent: &ConstructPath, id: &str) -> Option<&LogicalId> {
        self.node_paths.get(&parent.child(id))
    }

    pub fn node(&self, logical_id: &LogicalId) -> Option<&ResourceNode> {
        self.resources.get(logical_id)
    }

    pub fn node_mut(&mut self, logical_id: &LogicalId) -> Option<&mut ResourceNode> {
        self.resources.get_mut(logical_id)
    }

    /// The policy document stored in `property` of a node
    pub fn policy_mut(
        &mut self,
        logical_id: &LogicalId,
        property: &str,
    ) -> Result<&mut PolicyDocument> {
        self.resources
            .get_mut(logical_id)
            .and_then(|node| node.policy_mut(property))
            .ok_or_else(|| Error::missing_property(logical_id.as_str(), property, "policy"))
    }

    pub fn resources(&self) -> impl Iterator<Item = (&LogicalId, &ResourceNode)> {
        self.resources.iter()
    }

    /// Nodes of a given resource type, in logical id order
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a LogicalId, &'a ResourceNode)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, node)| node.resource_type() == resource_type)
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Register a check that runs during synthesis
    pub fn add_validation(&mut self, validation: Box<dyn Validation>) {
        self.validations.push(validation);
    }

    /// Export a value from the stack
    pub fn add_output(
        &mut self,
        id: &str,
        value: impl Into<Token>,
        description: Option<&str>,
    ) -> Result<()> {
        path::validate_output_id(id)?;
        self.register_construct(None, id)?;
        self.outputs.insert(
            id.to_string(),
            (value.into(), description.map(str::to_string)),
        );
        Ok(())
    }

    /// Resolve a token against this stack
    pub fn resolve(&self, token: &Token) -> Result<Value> {
        token.resolve(self)
    }

    /// Run every registered validation and return all violations
    pub fn validate(&self) -> Vec<String> {
        self.validations
            .iter()
            .flat_map(|validation| validation.validate(self))
            .collect()
    }

    /// Validate the graph and render it into a template
    pub fn synth(&self) -> Result<Template> {
        info!(
            "Synthesizing stack '{}' ({} resources)",
            self.name(),
            self.resources.len()
        );

        let errors = self.validate();
        if !errors.is_empty() {
            return Err(Error::synthesis(errors));
        }

        let mut resources = Map::new();
        for (logical_id, node) in &self.resources {
            resources.insert(logical_id.to_string(), node.to_template(self)?);
        }

        let mut outputs = Map::new();
        for (id, (value, description)) in &self.outputs {
            let output = Output {
                value: value.resolve(self)?,
                description: description.clone(),
            };
            outputs.insert(id.clone(), serde_json::to_value(output)?);
        }

        let template = Template::new(self.config.description.clone(), resources, outputs);
        SchemaValidator::global()?.validate(&template.to_value()?, "template")?;

        debug!("Stack '{}' synthesized", self.name());
        Ok(template)
    }
}

impl ReferenceContext for Stack {
    fn pseudo_value(&self, pseudo: Pseudo) -> Option<String> {
        let env = &self.config.env;
        match pseudo {
            Pseudo::Partition => env.partition.clone(),
            Pseudo::Region => env.region.clone(),
            Pseudo::AccountId => env.account.clone(),
            Pseudo::StackName => None,
            Pseudo::UrlSuffix => env.url_suffix().map(str::to_string),
        }
    }

    fn has_resource(&self, logical_id: &LogicalId) -> bool {
        self.resources.contains_key(logical_id)
    }
}
