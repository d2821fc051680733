//! Error types for Tailrace operations.
//!
//! Each concern has its own enum: [`ModelError`] for graph mutations,
//! [`ParseError`] for diagram files, [`DrawingError`] for committing a drawn
//! edge. [`TailraceError`] wraps them together with I/O failures for callers
//! that drive whole workflows, such as the command line front end.

use std::{fmt, io};

use thiserror::Error;

use crate::validate::{SegmentError, ValidationError};

/// The kind of element an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Node,
    Edge,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => f.write_str("node"),
            Self::Edge => f.write_str("edge"),
        }
    }
}

/// A graph mutation was rejected. The graph is unchanged when one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{kind} `{id}` already exists")]
    DuplicateId { kind: ElementKind, id: String },

    #[error("edge endpoint `{0}` does not name an existing node")]
    UnknownEndpoint(String),

    #[error("node `{0}` not found")]
    NodeNotFound(String),

    #[error("edge `{0}` not found")]
    EdgeNotFound(String),

    #[error("zone {0} not found")]
    ZoneNotFound(usize),

    #[error("invalid segments: {0}")]
    InvalidSegments(#[from] SegmentError),

    #[error("node `{0}` is locked")]
    Locked(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A diagram file could not be loaded. No part of the document is kept.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed diagram file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("node {index} is invalid: {source}")]
    InvalidNode {
        index: usize,
        source: ValidationError,
    },

    #[error("edge {index} is invalid: {source}")]
    InvalidEdge { index: usize, source: ModelError },

    #[error("zone {index} is invalid: {source}")]
    InvalidZone {
        index: usize,
        source: ValidationError,
    },

    #[error("duplicate node id `{0}`")]
    DuplicateNodeId(String),

    #[error("duplicate edge id `{0}`")]
    DuplicateEdgeId(String),
}

/// Committing a drawn edge failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawingError {
    #[error("no edge is waiting for details")]
    NotAwaitingDetails,

    #[error("cannot commit edge: {0}")]
    Model(#[from] ModelError),
}

/// The main error type for Tailrace workflows.
#[derive(Debug, Error)]
pub enum TailraceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Drawing(#[from] DrawingError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_messages() {
        let err = ModelError::DuplicateId {
            kind: ElementKind::Node,
            id: "pit".to_string(),
        };
        assert_eq!(err.to_string(), "node `pit` already exists");

        let err = ModelError::from(SegmentError::TooFew(1));
        assert_eq!(
            err.to_string(),
            "invalid segments: an edge needs at least two points, got 1"
        );
    }

    #[test]
    fn test_tailrace_error_wraps_parse_error() {
        let err: TailraceError = ParseError::DuplicateNodeId("pit".to_string()).into();
        assert!(matches!(err, TailraceError::Parse(_)));
        assert_eq!(err.to_string(), "duplicate node id `pit`");
    }

    #[test]
    fn test_drawing_error_from_model_error() {
        let err: DrawingError = ModelError::UnknownEndpoint("gone".to_string()).into();
        assert_eq!(
            err.to_string(),
            "cannot commit edge: edge endpoint `gone` does not name an existing node"
        );
    }
}
