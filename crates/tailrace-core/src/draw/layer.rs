//! Layer-based z-ordering for SVG output.
//!
//! Drawables report which [`RenderLayer`] each SVG element belongs to and
//! [`LayeredOutput`] emits them bottom to top, one `<g data-layer=...>` group
//! per non-empty layer.
//!
//! ```
//! # use tailrace_core::draw::{LayeredOutput, RenderLayer};
//! # use svg::node::element::{Circle, Rectangle};
//! let mut output = LayeredOutput::new();
//! output.add_to_layer(RenderLayer::Node, Box::new(Rectangle::new()));
//! output.add_to_layer(RenderLayer::Zone, Box::new(Rectangle::new()));
//! output.add_to_layer(RenderLayer::Junction, Box::new(Circle::new()));
//!
//! let groups = output.render();
//! assert_eq!(groups.len(), 3);
//! ```

use svg::node::element as svg_element;

/// Type alias for boxed SVG nodes.
pub type SvgNode = Box<dyn svg::Node>;

/// Rendering layers, bottom to top in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Decorative background zones
    Zone,
    /// Edge polylines
    Edge,
    /// Junction dots where an edge ends on another edge
    Junction,
    /// Node shapes
    Node,
    /// Arrowheads, drawn over node outlines they touch
    Arrow,
    /// Node captions and edge labels
    Text,
    /// Selection highlights and the in-progress drawing preview
    Overlay,
}

impl RenderLayer {
    /// Returns a human-readable name for this layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Zone => "zone",
            Self::Edge => "edge",
            Self::Junction => "junction",
            Self::Node => "node",
            Self::Arrow => "arrow",
            Self::Text => "text",
            Self::Overlay => "overlay",
        }
    }
}

/// SVG nodes collected by rendering layer.
#[derive(Debug, Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    /// Creates a new empty `LayeredOutput`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single node to the specified layer. Nodes keep insertion order
    /// within a layer.
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    /// Appends every node of `other` to this output.
    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    /// Returns `true` if there are no nodes in any layer.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Renders all layers to SVG groups, consuming the output.
    ///
    /// Each non-empty layer becomes one `<g>` element carrying a `data-layer`
    /// attribute; groups are returned bottom layer first.
    pub fn render(mut self) -> Vec<SvgNode> {
        if self.is_empty() {
            return Vec::new();
        }

        // Stable: keeps per-layer insertion order
        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result = Vec::new();
        let mut current_layer = self.items[0].0;
        let mut current_group = svg_element::Group::new().set("data-layer", current_layer.name());

        for (layer, node) in self.items {
            if layer != current_layer {
                result.push(Box::new(current_group) as SvgNode);
                current_layer = layer;
                current_group = svg_element::Group::new().set("data-layer", layer.name());
            }
            current_group = current_group.add(node);
        }

        result.push(Box::new(current_group) as SvgNode);
        result
    }
}
