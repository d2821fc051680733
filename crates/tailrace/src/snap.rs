//! Pointer snapping.
//!
//! [`SnapResolver`] classifies a canvas point as a node anchor, a point on an
//! existing edge, or a free point. Classification walks three tiers in
//! priority order, each with its own radius from [`SnapConfig`]:
//!
//! 1. node anchors: the eight corners and side midpoints of each node
//! 2. edge junctions: the nearest point on each edge's route
//! 3. waypoint alignment: the nearest line point, or the previous point's
//!    axis
//!
//! The first tier with a candidate inside its radius wins. Within a tier the
//! closest candidate wins, and equal distances go to the element added
//! first. Resolution never fails.

use log::trace;
use serde::Deserialize;

use tailrace_core::geometry::{AnchorSide, Point, project_onto_polyline};

use crate::model::{EdgeId, Graph, NodeId};

/// Snap radii in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    node_anchor_radius: f32,
    junction_radius: f32,
    waypoint_radius: f32,
}

impl SnapConfig {
    pub fn new(node_anchor_radius: f32, junction_radius: f32, waypoint_radius: f32) -> Self {
        Self {
            node_anchor_radius,
            junction_radius,
            waypoint_radius,
        }
    }

    pub fn node_anchor_radius(&self) -> f32 {
        self.node_anchor_radius
    }

    pub fn junction_radius(&self) -> f32 {
        self.junction_radius
    }

    pub fn waypoint_radius(&self) -> f32 {
        self.waypoint_radius
    }
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self::new(30.0, 15.0, 8.0)
    }
}

/// Result of snapping a point.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapTarget {
    NodeAnchor {
        node: NodeId,
        side: AnchorSide,
        position: Point,
    },
    EdgeJunction {
        edge: EdgeId,
        position: Point,
    },
    FreePoint {
        position: Point,
    },
}

impl SnapTarget {
    /// Where the snapped point lies on the canvas.
    pub fn position(&self) -> Point {
        match self {
            Self::NodeAnchor { position, .. }
            | Self::EdgeJunction { position, .. }
            | Self::FreePoint { position } => *position,
        }
    }
}

/// Context of one snap request.
#[derive(Debug, Clone, Default)]
pub struct SnapQuery {
    junctions: bool,
    excluded_edges: Vec<EdgeId>,
    excluded_nodes: Vec<NodeId>,
    previous: Option<Point>,
}

impl SnapQuery {
    /// A query that may resolve to any tier.
    pub fn new() -> Self {
        Self {
            junctions: true,
            ..Self::default()
        }
    }

    /// Allows or forbids junction results.
    pub fn with_junctions(mut self, junctions: bool) -> Self {
        self.junctions = junctions;
        self
    }

    /// Keeps `edge` out of junction matching. It still takes part in
    /// waypoint alignment.
    pub fn excluding(mut self, edge: EdgeId) -> Self {
        self.excluded_edges.push(edge);
        self
    }

    /// Keeps `node` out of anchor matching.
    pub fn excluding_node(mut self, node: NodeId) -> Self {
        self.excluded_nodes.push(node);
        self
    }

    /// Sets the previous point of the path being drawn, for axis alignment.
    pub fn with_previous(mut self, previous: Point) -> Self {
        self.previous = Some(previous);
        self
    }

    fn is_excluded(&self, edge: &EdgeId) -> bool {
        self.excluded_edges.contains(edge)
    }
}

/// Resolves pointer positions against a graph.
#[derive(Debug, Clone, Copy)]
pub struct SnapResolver<'a> {
    graph: &'a Graph,
    config: &'a SnapConfig,
}

impl<'a> SnapResolver<'a> {
    pub fn new(graph: &'a Graph, config: &'a SnapConfig) -> Self {
        Self { graph, config }
    }

    /// Resolves `point` with every tier enabled.
    pub fn resolve(&self, point: Point) -> SnapTarget {
        self.resolve_with(point, &SnapQuery::new())
    }

    pub fn resolve_with(&self, point: Point, query: &SnapQuery) -> SnapTarget {
        if let Some(target) = self.nearest_anchor(point, query) {
            trace!(point:?, target:?; "Snapped to node anchor");
            return target;
        }
        if query.junctions {
            if let Some(target) = self.nearest_junction(point, query) {
                trace!(point:?, target:?; "Snapped to edge");
                return target;
            }
        }
        let position = self.align_waypoint(point, query);
        trace!(point:?, position:?; "Free point");
        SnapTarget::FreePoint { position }
    }

    fn nearest_anchor(&self, point: Point, query: &SnapQuery) -> Option<SnapTarget> {
        let mut best: Option<(f32, SnapTarget)> = None;
        for node in self.graph.nodes() {
            if query.excluded_nodes.contains(node.id()) {
                continue;
            }
            for (side, position) in node.bounds().anchors() {
                let distance = position.distance(point);
                if distance <= self.config.node_anchor_radius
                    && best.as_ref().is_none_or(|(d, _)| distance < *d)
                {
                    best = Some((
                        distance,
                        SnapTarget::NodeAnchor {
                            node: node.id().clone(),
                            side,
                            position,
                        },
                    ));
                }
            }
        }
        best.map(|(_, target)| target)
    }

    fn nearest_junction(&self, point: Point, query: &SnapQuery) -> Option<SnapTarget> {
        let mut best: Option<(f32, SnapTarget)> = None;
        for edge in self.graph.edges() {
            if query.is_excluded(edge.id()) {
                continue;
            }
            let route = self.graph.route(edge);
            let Some(projection) = project_onto_polyline(&route, point) else {
                continue;
            };
            if projection.distance <= self.config.junction_radius
                && best.as_ref().is_none_or(|(d, _)| projection.distance < *d)
            {
                best = Some((
                    projection.distance,
                    SnapTarget::EdgeJunction {
                        edge: edge.id().clone(),
                        position: projection.point,
                    },
                ));
            }
        }
        best.map(|(_, target)| target)
    }

    /// Waypoint tier. Edges already offered as junctions are skipped.
    fn align_waypoint(&self, point: Point, query: &SnapQuery) -> Point {
        let radius = self.config.waypoint_radius;

        let mut best: Option<(f32, Point)> = None;
        for edge in self.graph.edges() {
            if query.junctions && !query.is_excluded(edge.id()) {
                continue;
            }
            let route = self.graph.route(edge);
            if let Some(projection) = project_onto_polyline(&route, point) {
                if projection.distance <= radius
                    && best.is_none_or(|(d, _)| projection.distance < d)
                {
                    best = Some((projection.distance, projection.point));
                }
            }
        }
        if let Some((_, position)) = best {
            return position;
        }

        let Some(previous) = query.previous else {
            return point;
        };
        let mut aligned = point;
        if (point.x() - previous.x()).abs() <= radius {
            aligned = aligned.with_x(previous.x());
        }
        if (point.y() - previous.y()).abs() <= radius {
            aligned = aligned.with_y(previous.y());
        }
        aligned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeDetails, EdgeSpec, EdgeTarget, NodeKind, NodeSpec};

    /// A(100,100) and B(400,100), both 120x40, joined by a straight edge.
    fn graph() -> Graph {
        let mut graph = Graph::new();
        for (id, x) in [("a", 100.0), ("b", 400.0)] {
            graph
                .add_node(NodeSpec::new(id, NodeKind::Process, Point::new(x, 100.0)))
                .unwrap();
        }
        graph
            .add_edge(EdgeSpec {
                id: Some("ab".to_string()),
                from: NodeId::new("a").unwrap(),
                to: EdgeTarget::Node(NodeId::new("b").unwrap()),
                segments: vec![Point::new(220.0, 120.0), Point::new(400.0, 120.0)],
                details: EdgeDetails::default(),
            })
            .unwrap();
        graph
    }

    #[test]
    fn test_snap_to_nearest_anchor() {
        let graph = graph();
        let config = SnapConfig::default();
        let target = SnapResolver::new(&graph, &config).resolve(Point::new(225.0, 118.0));
        assert_eq!(
            target,
            SnapTarget::NodeAnchor {
                node: NodeId::new("a").unwrap(),
                side: AnchorSide::Right,
                position: Point::new(220.0, 120.0),
            }
        );
    }

    #[test]
    fn test_anchor_outranks_edge() {
        // (250, 120) is on the edge but within 30 of a's right anchor
        let graph = graph();
        let config = SnapConfig::default();
        let target = SnapResolver::new(&graph, &config).resolve(Point::new(245.0, 121.0));
        assert!(matches!(target, SnapTarget::NodeAnchor { .. }));
    }

    #[test]
    fn test_snap_to_edge_interior() {
        let graph = graph();
        let config = SnapConfig::default();
        let target = SnapResolver::new(&graph, &config).resolve(Point::new(310.0, 130.0));
        assert_eq!(
            target,
            SnapTarget::EdgeJunction {
                edge: EdgeId::new("ab").unwrap(),
                position: Point::new(310.0, 120.0),
            }
        );
    }

    #[test]
    fn test_junctions_disabled_aligns_to_line() {
        let graph = graph();
        let config = SnapConfig::default();
        let query = SnapQuery::new().with_junctions(false);
        let resolver = SnapResolver::new(&graph, &config);

        let near = resolver.resolve_with(Point::new(310.0, 126.0), &query);
        assert_eq!(near, SnapTarget::FreePoint { position: Point::new(310.0, 120.0) });

        // Outside the waypoint radius the point is kept as is
        let far = resolver.resolve_with(Point::new(310.0, 130.0), &query);
        assert_eq!(far, SnapTarget::FreePoint { position: Point::new(310.0, 130.0) });
    }

    #[test]
    fn test_excluded_edge_never_becomes_junction() {
        let graph = graph();
        let config = SnapConfig::default();
        let query = SnapQuery::new().excluding(EdgeId::new("ab").unwrap());
        let target = SnapResolver::new(&graph, &config).resolve_with(Point::new(310.0, 125.0), &query);
        assert_eq!(target, SnapTarget::FreePoint { position: Point::new(310.0, 120.0) });
    }

    #[test]
    fn test_excluded_node_offers_no_anchor() {
        let graph = graph();
        let config = SnapConfig::default();
        let query = SnapQuery::new()
            .with_junctions(false)
            .excluding_node(NodeId::new("a").unwrap());
        let target = SnapResolver::new(&graph, &config).resolve_with(Point::new(225.0, 118.0), &query);
        assert_eq!(target, SnapTarget::FreePoint { position: Point::new(225.0, 120.0) });
    }

    #[test]
    fn test_axis_alignment_to_previous_point() {
        let graph = Graph::new();
        let config = SnapConfig::default();
        let resolver = SnapResolver::new(&graph, &config);
        let query = SnapQuery::new().with_previous(Point::new(100.0, 100.0));

        let target = resolver.resolve_with(Point::new(105.0, 300.0), &query);
        assert_eq!(target.position(), Point::new(100.0, 300.0));

        let target = resolver.resolve_with(Point::new(300.0, 93.0), &query);
        assert_eq!(target.position(), Point::new(300.0, 100.0));

        let target = resolver.resolve_with(Point::new(300.0, 300.0), &query);
        assert_eq!(target.position(), Point::new(300.0, 300.0));
    }

    #[test]
    fn test_equal_distance_prefers_earlier_node() {
        let mut graph = Graph::new();
        for (id, x) in [("first", 0.0), ("second", 240.0)] {
            graph
                .add_node(NodeSpec::new(id, NodeKind::Loss, Point::new(x, 0.0)))
                .unwrap();
        }
        // Midway between first's right anchor (120, 20) and second's left anchor (240, 20)
        let config = SnapConfig::new(60.0, 15.0, 8.0);
        let target = SnapResolver::new(&graph, &config).resolve(Point::new(180.0, 20.0));
        assert!(matches!(
            target,
            SnapTarget::NodeAnchor { node, .. } if node.as_str() == "first"
        ));
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: SnapConfig = serde_json::from_str(r#"{"junction_radius": 20.0}"#).unwrap();
        assert_eq!(config.junction_radius(), 20.0);
        assert_eq!(config.node_anchor_radius(), 30.0);
        assert_eq!(config.waypoint_radius(), 8.0);
    }
}
