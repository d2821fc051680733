//! The diagram data model.
//!
//! [`Graph`] owns every [`Node`], [`Edge`] and [`Zone`] and is the only
//! place they are mutated. [`Diagram`] adds the header fields stored in a
//! diagram file.

mod diagram;
mod edge;
mod graph;
mod ids;
mod node;
mod zone;

pub use diagram::Diagram;
pub use edge::{
    DEFAULT_LABEL_FONT_SIZE, Edge, EdgeDetails, EdgePatch, EdgeSpec, EdgeTarget, ExcelMapping,
    FlowType, JUNCTION_PREFIX, Junction, format_caption,
};
pub use graph::Graph;
pub use ids::{EdgeId, EdgeIdTag, Id, IdError, NodeId, NodeIdTag};
pub use node::{
    DEFAULT_NODE_FONT_SIZE, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH, Node, NodeKind, NodePatch,
    NodeShape, NodeSpec,
};
pub use zone::Zone;

/// A reference to one element of a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Node(NodeId),
    Edge(EdgeId),
    /// Index into [`Graph::zones`].
    Zone(usize),
}

impl ElementRef {
    pub fn as_node(&self) -> Option<&NodeId> {
        match self {
            Self::Node(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&EdgeId> {
        match self {
            Self::Edge(id) => Some(id),
            _ => None,
        }
    }
}
