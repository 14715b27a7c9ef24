//! Deferred references
//!
//! A [`Token`] stands in for a string whose final value is only known when the
//! template is rendered: a resource's generated identifier, one of its
//! attributes, or a pseudo parameter such as the deployment region. Tokens are
//! composed by interpolation and resolved exactly once, during synthesis.
//!
//! Composition never evaluates anything eagerly. The only simplification done
//! at construction time is merging adjacent literals, so interpolating only
//! literals yields a literal.

use crate::error::{Error, Result};
use crate::node::LogicalId;
use serde_json::{json, Value};
use std::fmt;

/// Stack-level values the provisioning engine supplies at deploy time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pseudo {
    Partition,
    Region,
    AccountId,
    StackName,
    UrlSuffix,
}

impl Pseudo {
    /// Name of the pseudo parameter in the rendered template
    pub fn parameter_name(self) -> &'static str {
        match self {
            Pseudo::Partition => "AWS::Partition",
            Pseudo::Region => "AWS::Region",
            Pseudo::AccountId => "AWS::AccountId",
            Pseudo::StackName => "AWS::StackName",
            Pseudo::UrlSuffix => "AWS::URLSuffix",
        }
    }
}

/// An opaque reference to a value produced by the provisioning engine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// The primary identifier of a resource (`Ref`)
    Ref(LogicalId),
    /// A named attribute of a resource (`Fn::GetAtt`)
    GetAtt {
        logical_id: LogicalId,
        attribute: String,
    },
    /// A pseudo parameter of the enclosing stack
    Pseudo(Pseudo),
}

impl Reference {
    /// Logical id of the referenced resource, if any
    pub fn logical_id(&self) -> Option<&LogicalId> {
        match self {
            Reference::Ref(id) => Some(id),
            Reference::GetAtt { logical_id, .. } => Some(logical_id),
            Reference::Pseudo(_) => None,
        }
    }
}

/// Values the resolver needs from the enclosing stack
pub trait ReferenceContext {
    /// Concrete value for a pseudo parameter, when the stack pins it
    fn pseudo_value(&self, pseudo: Pseudo) -> Option<String>;

    /// Whether a resource with this logical id exists
    fn has_resource(&self, logical_id: &LogicalId) -> bool;
}

/// A string-like value that may be unknown until synthesis
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Literal(String),
    Deferred(Reference),
    Composite(Vec<Token>),
}

impl Token {
    pub fn literal(value: impl Into<String>) -> Self {
        Token::Literal(value.into())
    }

    /// `Ref` to a resource
    pub fn reference(logical_id: &LogicalId) -> Self {
        Token::Deferred(Reference::Ref(logical_id.clone()))
    }

    /// `Fn::GetAtt` on a resource
    pub fn get_att(logical_id: &LogicalId, attribute: impl Into<String>) -> Self {
        Token::Deferred(Reference::GetAtt {
            logical_id: logical_id.clone(),
            attribute: attribute.into(),
        })
    }

    pub fn pseudo(pseudo: Pseudo) -> Self {
        Token::Deferred(Reference::Pseudo(pseudo))
    }

    /// Interpolate segments in order.
    ///
    /// Nested composites are flattened and adjacent literals merged; if every
    /// segment is a literal the result is a single literal.
    pub fn concat<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        let mut segments = Vec::new();
        for part in parts {
            push_segment(&mut segments, part.into());
        }

        match segments.len() {
            0 => Token::Literal(String::new()),
            1 => segments.remove(0),
            _ => Token::Composite(segments),
        }
    }

    /// Interpolate segments with a literal separator between them
    pub fn join<I, T>(separator: &str, parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        let mut interleaved = Vec::new();
        for (index, part) in parts.into_iter().enumerate() {
            if index > 0 {
                interleaved.push(Token::literal(separator));
            }
            interleaved.push(part.into());
        }
        Token::concat(interleaved)
    }

    /// The literal value, when no part of this token is deferred
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Token::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        !matches!(self, Token::Literal(_))
    }

    /// Every resource this token references, in order of appearance
    pub fn referenced_resources(&self) -> Vec<&LogicalId> {
        let mut found = Vec::new();
        self.collect_references(&mut found);
        found
    }

    fn collect_references<'a>(&'a self, found: &mut Vec<&'a LogicalId>) {
        match self {
            Token::Literal(_) => {}
            Token::Deferred(reference) => found.extend(reference.logical_id()),
            Token::Composite(parts) => {
                for part in parts {
                    part.collect_references(found);
                }
            }
        }
    }

    /// Render this token into its template representation
    pub fn resolve(&self, ctx: &dyn ReferenceContext) -> Result<Value> {
        match self {
            Token::Literal(value) => Ok(Value::String(value.clone())),
            Token::Deferred(reference) => resolve_reference(reference, ctx),
            Token::Composite(parts) => {
                let mut resolved: Vec<Value> = Vec::with_capacity(parts.len());
                for part in parts {
                    let value = part.resolve(ctx)?;
                    if let Value::String(next) = &value {
                        if let Some(Value::String(prev)) = resolved.last_mut() {
                            prev.push_str(next);
                            continue;
                        }
                    }
                    resolved.push(value);
                }

                match resolved.len() {
                    0 => Ok(Value::String(String::new())),
                    1 => Ok(resolved.remove(0)),
                    _ => Ok(json!({ "Fn::Join": ["", resolved] })),
                }
            }
        }
    }
}

fn push_segment(segments: &mut Vec<Token>, token: Token) {
    match token {
        Token::Composite(inner) => {
            for part in inner {
                push_segment(segments, part);
            }
        }
        Token::Literal(value) => {
            if value.is_empty() {
                return;
            }
            if let Some(Token::Literal(last)) = segments.last_mut() {
                last.push_str(&value);
            } else {
                segments.push(Token::Literal(value));
            }
        }
        deferred => segments.push(deferred),
    }
}

fn resolve_reference(reference: &Reference, ctx: &dyn ReferenceContext) -> Result<Value> {
    match reference {
        Reference::Ref(logical_id) => {
            ensure_known(logical_id, ctx)?;
            Ok(json!({ "Ref": logical_id.as_str() }))
        }
        Reference::GetAtt {
            logical_id,
            attribute,
        } => {
            ensure_known(logical_id, ctx)?;
            Ok(json!({ "Fn::GetAtt": [logical_id.as_str(), attribute] }))
        }
        Reference::Pseudo(pseudo) => Ok(match ctx.pseudo_value(*pseudo) {
            Some(value) => Value::String(value),
            None => json!({ "Ref": pseudo.parameter_name() }),
        }),
    }
}

fn ensure_known(logical_id: &LogicalId, ctx: &dyn ReferenceContext) -> Result<()> {
    if ctx.has_resource(logical_id) {
        Ok(())
    } else {
        Err(Error::dangling_reference(logical_id.as_str()))
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::Literal(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::Literal(value)
    }
}

impl From<&String> for Token {
    fn from(value: &String) -> Self {
        Token::Literal(value.clone())
    }
}

impl From<Pseudo> for Token {
    fn from(value: Pseudo) -> Self {
        Token::pseudo(value)
    }
}

impl From<&Token> for Token {
    fn from(value: &Token) -> Self {
        value.clone()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(value) => write!(f, "{}", value),
            Token::Deferred(Reference::Ref(id)) => write!(f, "${{Token[Ref.{}]}}", id),
            Token::Deferred(Reference::GetAtt {
                logical_id,
                attribute,
            }) => write!(f, "${{Token[{}.{}]}}", logical_id, attribute),
            Token::Deferred(Reference::Pseudo(pseudo)) => {
                write!(f, "${{Token[{}]}}", pseudo.parameter_name())
            }
            Token::Composite(parts) => {
                for part in parts {
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
        }
    }
}
