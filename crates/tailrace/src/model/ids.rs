//! Typed identifiers for nodes and edges.
//!
//! Ids are the strings written to the diagram file. They are validated once
//! at construction; a value of type [`NodeId`] or [`EdgeId`] is always
//! non-empty and free of surrounding whitespace.

use std::{borrow::Borrow, fmt, marker::PhantomData, str::FromStr};

use thiserror::Error;

/// A validated identifier tagged with the kind of element it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

/// Reasons an id string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
    #[error("id `{0}` must not start or end with whitespace")]
    Whitespace(String),
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty);
        }
        if value.trim() != value {
            return Err(IdError::Whitespace(value));
        }
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Wraps an id produced by the graph's own generators, which never
    /// yield empty or padded strings.
    pub(crate) fn generated(value: String) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeIdTag {}
pub type NodeId = Id<NodeIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeIdTag {}
pub type EdgeId = Id<EdgeIdTag>;

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_id_rejects_empty() {
        assert_eq!(NodeId::new(""), Err(IdError::Empty));
    }

    #[test]
    fn test_id_rejects_padded() {
        assert_eq!(
            EdgeId::new(" edge_1"),
            Err(IdError::Whitespace(" edge_1".to_string()))
        );
    }

    #[test]
    fn test_id_allows_inner_spaces_and_symbols() {
        let id: NodeId = "Pit 3 / sump".parse().unwrap();
        assert_eq!(id.as_str(), "Pit 3 / sump");
        assert_eq!(id.to_string(), "Pit 3 / sump");
    }

    #[test]
    fn test_id_borrow_lookup() {
        let mut map = HashMap::new();
        map.insert(NodeId::new("dam").unwrap(), 1);
        assert_eq!(map.get("dam"), Some(&1));
    }
}
