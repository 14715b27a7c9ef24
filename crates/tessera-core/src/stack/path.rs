//! Construct paths and logical id allocation

use crate::error::{Error, Result};
use crate::node::LogicalId;
use sha2::{Digest, Sha256};
use std::fmt;

/// Path component that is left out of the human-readable part of a logical id
const HIDDEN_ID: &str = "Resource";

/// Same as [`HIDDEN_ID`], for constructs whose child is their default node
const HIDDEN_DEFAULT_ID: &str = "Default";

const HASH_LEN: usize = 8;

/// Upper bound for the human-readable part, leaving room for the hash
const MAX_HUMAN_LEN: usize = 240;

/// Longest logical id or output id a template accepts
const MAX_ID_LEN: usize = 255;

/// Location of a construct in the tree, e.g. `Secret/Attachment`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstructPath(Vec<String>);

impl ConstructPath {
    pub(crate) fn root(id: &str) -> Self {
        Self(vec![id.to_string()])
    }

    pub(crate) fn child(&self, id: &str) -> Self {
        let mut components = self.0.clone();
        components.push(id.to_string());
        Self(components)
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    /// The construct's own id (last component)
    pub fn id(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ConstructPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Reject ids that cannot be placed in a path or turned into a logical id
pub(crate) fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::invalid_construct_id(id, "id must not be empty"));
    }
    if id.chars().count() > MAX_ID_LEN {
        return Err(Error::invalid_construct_id(
            id,
            format!("id must be at most {} characters", MAX_ID_LEN),
        ));
    }
    if id.contains('/') {
        return Err(Error::invalid_construct_id(
            id,
            "id must not contain the path separator '/'",
        ));
    }
    if !id.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::invalid_construct_id(
            id,
            "id must contain at least one alphanumeric character",
        ));
    }
    Ok(())
}

/// Output ids appear verbatim in the template, so only ASCII letters and
/// digits are allowed
pub(crate) fn validate_output_id(id: &str) -> Result<()> {
    validate_id(id)?;
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::invalid_construct_id(
            id,
            "output id must contain only ASCII letters and digits",
        ));
    }
    Ok(())
}

/// Derive the logical id for a node at `path`.
///
/// Top-level nodes keep their (sanitized) id. Nested nodes get the
/// concatenated path components followed by a hash of the full path, so that
/// `A/BC` and `AB/C` never collide.
pub(crate) fn allocate_logical_id(path: &ConstructPath) -> LogicalId {
    let components = path.components();
    if components.len() == 1 {
        return LogicalId::new(sanitize(&components[0]));
    }

    let mut human: String = components
        .iter()
        .filter(|c| c.as_str() != HIDDEN_ID && c.as_str() != HIDDEN_DEFAULT_ID)
        .map(|c| sanitize(c))
        .collect();
    human.truncate(MAX_HUMAN_LEN);

    LogicalId::new(format!("{}{}", human, path_hash(components)))
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn path_hash(components: &[String]) -> String {
    let digest = Sha256::digest(components.join("/").as_bytes());
    let mut encoded = hex::encode_upper(digest);
    encoded.truncate(HASH_LEN);
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_top_level_id_kept() {
        let path = ConstructPath::root("DatabaseInstance");
        assert_eq!(allocate_logical_id(&path).as_str(), "DatabaseInstance");
    }

    #[test]
    fn test_nested_id_gets_hash_and_hides_resource() {
        let path = ConstructPath::root("Secret").child("Resource");
        let id = allocate_logical_id(&path);
        assert!(id.as_str().starts_with("Secret"));
        assert_eq!(id.as_str().len(), "Secret".len() + HASH_LEN);
        assert!(!id.as_str().contains("Resource"));
    }

    #[test]
    fn test_allocation_is_deterministic() {
        let path = ConstructPath::root("Secret").child("Attachment");
        assert_eq!(allocate_logical_id(&path), allocate_logical_id(&path));
    }

    #[test]
    fn test_ambiguous_paths_do_not_collide() {
        let a = ConstructPath::root("A").child("BC");
        let b = ConstructPath::root("AB").child("C");
        assert_ne!(allocate_logical_id(&a), allocate_logical_id(&b));
    }

    #[test]
    fn test_sanitizes_punctuation() {
        let path = ConstructPath::root("my-secret").child("rotation_1");
        let id = allocate_logical_id(&path);
        assert!(id.as_str().starts_with("mysecretrotation1"));
    }

    #[test_case("" ; "empty")]
    #[test_case("a/b" ; "separator")]
    #[test_case("--" ; "no alphanumerics")]
    fn test_invalid_ids_rejected(id: &str) {
        assert!(validate_id(id).is_err());
    }

    #[test]
    fn test_overlong_id_rejected() {
        let longest = "A".repeat(MAX_ID_LEN);
        assert!(validate_id(&longest).is_ok());
        assert_eq!(
            allocate_logical_id(&ConstructPath::root(&longest)).as_str().len(),
            MAX_ID_LEN
        );
        assert!(validate_id(&"A".repeat(MAX_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_deep_path_logical_id_fits() {
        let long = "B".repeat(MAX_ID_LEN);
        let path = ConstructPath::root(&long).child(&long);
        assert!(allocate_logical_id(&path).as_str().len() <= MAX_ID_LEN);
    }

    #[test_case("SecretArn", true ; "alphanumeric")]
    #[test_case("secret-arn", false ; "hyphen")]
    #[test_case("secret_arn", false ; "underscore")]
    fn test_output_ids(id: &str, ok: bool) {
        assert_eq!(validate_output_id(id).is_ok(), ok);
    }

    #[test]
    fn test_path_display() {
        let path = ConstructPath::root("Secret").child("Attachment").child("Rotation");
        assert_eq!(path.to_string(), "Secret/Attachment/Rotation");
        assert_eq!(path.id(), "Rotation");
        assert_eq!(path.depth(), 3);
    }
}
