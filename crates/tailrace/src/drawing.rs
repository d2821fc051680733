//! Multi-click edge construction.
//!
//! Drawing an edge takes several pointer clicks: one on the origin node,
//! any number on empty canvas to place waypoints, and a final one on a
//! destination node or an existing edge. The path then waits for the edge
//! prompt to supply a flow type and volume before anything is added to the
//! graph.
//!
//! ```text
//!            down on node                  click on node / edge
//!   Idle ─────────────────▶ Drawing ────────────────────────────▶ AwaitingDetails
//!    ▲                        │  ▲  click on canvas                     │
//!    │        cancel          │  └──── (adds waypoint)                  │
//!    ├────────────────────────┘                                         │
//!    └──────────────────────── complete / abandon ──────────────────────┘
//! ```

use std::mem;

use log::debug;

use tailrace_core::geometry::{AnchorSide, Point};

use crate::{
    error::DrawingError,
    model::{EdgeDetails, EdgeId, EdgeSpec, EdgeTarget, Graph, Junction, Node, NodeId},
    snap::{SnapConfig, SnapQuery, SnapResolver, SnapTarget},
};

/// A path being drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPath {
    origin: NodeId,
    origin_side: AnchorSide,
    start: Point,
    waypoints: Vec<Point>,
    cursor: Option<Point>,
}

impl PendingPath {
    pub fn origin(&self) -> &NodeId {
        &self.origin
    }

    pub fn origin_side(&self) -> AnchorSide {
        self.origin_side
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    fn last_point(&self) -> Point {
        self.waypoints.last().copied().unwrap_or(self.start)
    }
}

/// A finished path waiting for its edge details.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEdge {
    from: NodeId,
    to: EdgeTarget,
    segments: Vec<Point>,
}

impl CandidateEdge {
    pub fn from(&self) -> &NodeId {
        &self.from
    }

    pub fn to(&self) -> &EdgeTarget {
        &self.to
    }

    pub fn segments(&self) -> &[Point] {
        &self.segments
    }

    pub fn is_junction(&self) -> bool {
        matches!(self.to, EdgeTarget::Junction(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DrawingState {
    #[default]
    Idle,
    Drawing(PendingPath),
    AwaitingDetails(CandidateEdge),
}

/// What a pointer click did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The click changed nothing.
    Ignored,
    /// A new path started on the node.
    Started(NodeId),
    /// A waypoint was appended.
    WaypointAdded(Point),
    /// The path is complete; edge details are now required.
    AwaitingDetails,
}

/// The edge drawing state machine.
#[derive(Debug, Clone, Default)]
pub struct DrawingMachine {
    state: DrawingState,
}

impl DrawingMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DrawingState::Idle)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawingState::Drawing(_))
    }

    pub fn candidate(&self) -> Option<&CandidateEdge> {
        match &self.state {
            DrawingState::AwaitingDetails(candidate) => Some(candidate),
            _ => None,
        }
    }

    /// Handles a primary click at `point`, in canvas coordinates.
    pub fn click(&mut self, graph: &Graph, config: &SnapConfig, point: Point) -> ClickOutcome {
        let resolver = SnapResolver::new(graph, config);
        match mem::take(&mut self.state) {
            DrawingState::Idle => self.start(graph, &resolver, point),
            DrawingState::Drawing(path) => self.extend(graph, &resolver, path, point),
            awaiting @ DrawingState::AwaitingDetails(_) => {
                self.state = awaiting;
                ClickOutcome::Ignored
            }
        }
    }

    /// Tracks the pointer for the preview line.
    pub fn hover(&mut self, point: Point) {
        if let DrawingState::Drawing(path) = &mut self.state {
            path.cursor = Some(point);
        }
    }

    /// Drops the path being drawn. Returns `true` if there was one.
    pub fn cancel(&mut self) -> bool {
        if self.is_drawing() {
            self.state = DrawingState::Idle;
            debug!("Drawing cancelled");
            true
        } else {
            false
        }
    }

    /// Removes the last waypoint of the path being drawn.
    pub fn undo_waypoint(&mut self) -> Option<Point> {
        match &mut self.state {
            DrawingState::Drawing(path) => path.waypoints.pop(),
            _ => None,
        }
    }

    /// The rubber-band line: start anchor, waypoints and the pointer.
    pub fn preview(&self) -> Option<Vec<Point>> {
        let DrawingState::Drawing(path) = &self.state else {
            return None;
        };
        let mut points = Vec::with_capacity(path.waypoints.len() + 2);
        points.push(path.start);
        points.extend_from_slice(&path.waypoints);
        if let Some(cursor) = path.cursor {
            if points.last() != Some(&cursor) {
                points.push(cursor);
            }
        }
        Some(points)
    }

    /// Commits the waiting edge with `details`.
    ///
    /// The machine is idle afterwards whether or not the commit succeeds.
    pub fn complete(
        &mut self,
        graph: &mut Graph,
        details: EdgeDetails,
    ) -> Result<EdgeId, DrawingError> {
        if self.candidate().is_none() {
            return Err(DrawingError::NotAwaitingDetails);
        }
        let DrawingState::AwaitingDetails(candidate) = mem::take(&mut self.state) else {
            return Err(DrawingError::NotAwaitingDetails);
        };
        let id = graph.add_edge(EdgeSpec {
            id: None,
            from: candidate.from,
            to: candidate.to,
            segments: candidate.segments,
            details,
        })?;
        debug!(edge = id.as_str(); "Edge committed");
        Ok(id)
    }

    /// Discards the waiting edge. Returns `true` if there was one.
    pub fn abandon(&mut self) -> bool {
        if self.candidate().is_some() {
            self.state = DrawingState::Idle;
            debug!("Edge candidate abandoned");
            true
        } else {
            false
        }
    }

    fn start(&mut self, graph: &Graph, resolver: &SnapResolver<'_>, point: Point) -> ClickOutcome {
        let query = SnapQuery::new().with_junctions(false);
        let start = match resolver.resolve_with(point, &query) {
            SnapTarget::NodeAnchor {
                node,
                side,
                position,
            } => Some((node, side, position)),
            _ => node_under(graph, point).map(|node| {
                let (side, position) = node.bounds().nearest_anchor(point);
                (node.id().clone(), side, position)
            }),
        };

        let Some((origin, origin_side, start)) = start else {
            return ClickOutcome::Ignored;
        };
        debug!(origin = origin.as_str(), side = origin_side.name(); "Drawing started");
        self.state = DrawingState::Drawing(PendingPath {
            origin: origin.clone(),
            origin_side,
            start,
            waypoints: Vec::new(),
            cursor: None,
        });
        ClickOutcome::Started(origin)
    }

    fn extend(
        &mut self,
        graph: &Graph,
        resolver: &SnapResolver<'_>,
        mut path: PendingPath,
        point: Point,
    ) -> ClickOutcome {
        let previous = path.last_point();
        // Until a waypoint exists the origin's own anchors are plain canvas
        let leaving_origin = path.waypoints.is_empty();
        let mut query = SnapQuery::new().with_previous(previous);
        if leaving_origin {
            query = query.excluding_node(path.origin.clone());
        }
        let mut target = resolver.resolve_with(point, &query);

        // A click inside a node body ends on that node even far from anchors
        if let SnapTarget::FreePoint { .. } = target {
            if let Some(node) = node_under(graph, point) {
                let on_origin_outline =
                    leaving_origin && node.id() == &path.origin && on_outline(node, point);
                if !on_origin_outline {
                    let (side, position) = node.bounds().nearest_anchor(previous);
                    target = SnapTarget::NodeAnchor {
                        node: node.id().clone(),
                        side,
                        position,
                    };
                }
            }
        }

        match target {
            SnapTarget::NodeAnchor { node, position, .. } => {
                if node == path.origin && path.waypoints.is_empty() {
                    self.state = DrawingState::Drawing(path);
                    ClickOutcome::Ignored
                } else {
                    self.finish(path, EdgeTarget::Node(node), position)
                }
            }
            SnapTarget::EdgeJunction { edge, position } => {
                self.finish(path, EdgeTarget::Junction(Junction::on(&edge, position)), position)
            }
            SnapTarget::FreePoint { position } => {
                if position == previous {
                    self.state = DrawingState::Drawing(path);
                    return ClickOutcome::Ignored;
                }
                path.waypoints.push(position);
                self.state = DrawingState::Drawing(path);
                ClickOutcome::WaypointAdded(position)
            }
        }
    }

    /// Moves to `AwaitingDetails`, or ignores the click if the path would
    /// collapse to a single point.
    fn finish(&mut self, path: PendingPath, to: EdgeTarget, end: Point) -> ClickOutcome {
        let mut segments = Vec::with_capacity(path.waypoints.len() + 2);
        segments.push(path.start);
        segments.extend_from_slice(&path.waypoints);
        segments.push(end);
        segments.dedup();

        if segments.len() < 2 {
            self.state = DrawingState::Drawing(path);
            return ClickOutcome::Ignored;
        }

        debug!(
            from = path.origin.as_str(),
            to = to.reference(),
            points = segments.len();
            "Path complete, awaiting edge details"
        );
        self.state = DrawingState::AwaitingDetails(CandidateEdge {
            from: path.origin,
            to,
            segments,
        });
        ClickOutcome::AwaitingDetails
    }
}

/// The topmost node whose outline contains `point`.
pub(crate) fn node_under(graph: &Graph, point: Point) -> Option<&Node> {
    graph.nodes().rev().find(|node| node.contains(point))
}

/// Whether `point` lies on the edge of the node's bounding box.
fn on_outline(node: &Node, point: Point) -> bool {
    let bounds = node.bounds();
    point.x() == bounds.min_x()
        || point.x() == bounds.max_x()
        || point.y() == bounds.min_y()
        || point.y() == bounds.max_y()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FlowType, NodeKind, NodeSpec};

    /// A(100,100), B(400,100), C(100,400), all 120x40.
    fn graph() -> Graph {
        let mut graph = Graph::new();
        for (id, x, y) in [("a", 100.0, 100.0), ("b", 400.0, 100.0), ("c", 100.0, 400.0)] {
            graph
                .add_node(NodeSpec::new(id, NodeKind::Process, Point::new(x, y)))
                .unwrap();
        }
        graph
    }

    fn drawing_from_a(graph: &Graph) -> DrawingMachine {
        let mut machine = DrawingMachine::new();
        let outcome = machine.click(graph, &SnapConfig::default(), Point::new(222.0, 121.0));
        assert_eq!(outcome, ClickOutcome::Started(NodeId::new("a").unwrap()));
        machine
    }

    #[test]
    fn test_click_on_empty_canvas_stays_idle() {
        let graph = graph();
        let mut machine = DrawingMachine::new();
        let outcome = machine.click(&graph, &SnapConfig::default(), Point::new(700.0, 700.0));
        assert_eq!(outcome, ClickOutcome::Ignored);
        assert!(machine.is_idle());
    }

    #[test]
    fn test_click_inside_node_starts_at_nearest_anchor() {
        let mut graph = Graph::new();
        graph
            .add_node(
                NodeSpec::new("big", NodeKind::Plant, Point::new(0.0, 0.0)).with_size(400.0, 200.0),
            )
            .unwrap();
        let mut machine = DrawingMachine::new();
        machine.click(&graph, &SnapConfig::default(), Point::new(150.0, 60.0));
        let DrawingState::Drawing(path) = machine.state() else {
            panic!("expected drawing state");
        };
        assert_eq!(path.origin_side(), AnchorSide::Top);
        assert_eq!(path.start(), Point::new(200.0, 0.0));
    }

    #[test]
    fn test_waypoints_then_node_finishes() {
        let graph = graph();
        let config = SnapConfig::default();
        let mut machine = drawing_from_a(&graph);

        assert_eq!(
            machine.click(&graph, &config, Point::new(300.0, 300.0)),
            ClickOutcome::WaypointAdded(Point::new(300.0, 300.0))
        );
        assert_eq!(
            machine.click(&graph, &config, Point::new(402.0, 138.0)),
            ClickOutcome::AwaitingDetails
        );

        let candidate = machine.candidate().unwrap();
        assert_eq!(candidate.from().as_str(), "a");
        assert_eq!(candidate.to(), &EdgeTarget::Node(NodeId::new("b").unwrap()));
        assert_eq!(
            candidate.segments(),
            &[
                Point::new(220.0, 120.0),
                Point::new(300.0, 300.0),
                Point::new(400.0, 140.0)
            ]
        );
    }

    #[test]
    fn test_first_waypoint_may_sit_on_origin_outline() {
        let graph = graph();
        let config = SnapConfig::default();
        let mut machine = DrawingMachine::new();
        machine.click(&graph, &config, Point::new(160.0, 120.0));

        // a's top-right corner
        assert_eq!(
            machine.click(&graph, &config, Point::new(220.0, 100.0)),
            ClickOutcome::WaypointAdded(Point::new(220.0, 100.0))
        );
        assert_eq!(
            machine.click(&graph, &config, Point::new(400.0, 120.0)),
            ClickOutcome::AwaitingDetails
        );
        assert_eq!(
            machine.candidate().unwrap().segments(),
            &[
                Point::new(160.0, 100.0),
                Point::new(220.0, 100.0),
                Point::new(400.0, 120.0)
            ]
        );
    }

    #[test]
    fn test_origin_anchor_near_miss_becomes_waypoint() {
        let graph = graph();
        let config = SnapConfig::default();
        let mut machine = drawing_from_a(&graph);
        assert_eq!(
            machine.click(&graph, &config, Point::new(240.0, 160.0)),
            ClickOutcome::WaypointAdded(Point::new(240.0, 160.0))
        );
    }

    #[test]
    fn test_duplicate_click_is_ignored() {
        let graph = graph();
        let config = SnapConfig::default();
        let mut machine = drawing_from_a(&graph);
        machine.click(&graph, &config, Point::new(300.0, 300.0));
        assert_eq!(
            machine.click(&graph, &config, Point::new(300.0, 300.0)),
            ClickOutcome::Ignored
        );
        let DrawingState::Drawing(path) = machine.state() else {
            panic!("expected drawing state");
        };
        assert_eq!(path.waypoints(), &[Point::new(300.0, 300.0)]);
    }

    #[test]
    fn test_self_loop_needs_a_waypoint() {
        let graph = graph();
        let config = SnapConfig::default();
        let mut machine = drawing_from_a(&graph);

        assert_eq!(
            machine.click(&graph, &config, Point::new(150.0, 125.0)),
            ClickOutcome::Ignored
        );
        assert!(machine.is_drawing());

        machine.click(&graph, &config, Point::new(160.0, 250.0));
        assert_eq!(
            machine.click(&graph, &config, Point::new(100.0, 140.0)),
            ClickOutcome::AwaitingDetails
        );
        let candidate = machine.candidate().unwrap();
        assert_eq!(candidate.to(), &EdgeTarget::Node(NodeId::new("a").unwrap()));
    }

    #[test]
    fn test_click_on_edge_finishes_junction() {
        let mut graph = graph();
        let config = SnapConfig::default();
        let host = graph
            .add_edge(EdgeSpec {
                id: None,
                from: NodeId::new("a").unwrap(),
                to: EdgeTarget::Node(NodeId::new("b").unwrap()),
                segments: vec![Point::new(220.0, 120.0), Point::new(400.0, 120.0)],
                details: EdgeDetails::default(),
            })
            .unwrap();

        let mut machine = DrawingMachine::new();
        machine.click(&graph, &config, Point::new(160.0, 402.0));
        assert_eq!(
            machine.click(&graph, &config, Point::new(310.0, 128.0)),
            ClickOutcome::AwaitingDetails
        );
        let candidate = machine.candidate().unwrap();
        assert!(candidate.is_junction());
        let junction = candidate.to().junction().unwrap();
        assert_eq!(junction.host(), Some(host));
        assert_eq!(junction.position(), Point::new(310.0, 120.0));
        assert_eq!(candidate.segments().last(), Some(&Point::new(310.0, 120.0)));
    }

    #[test]
    fn test_cancel_discards_path() {
        let graph = graph();
        let mut machine = drawing_from_a(&graph);
        machine.click(&graph, &SnapConfig::default(), Point::new(300.0, 300.0));
        assert!(machine.cancel());
        assert!(machine.is_idle());
        assert!(machine.preview().is_none());
        assert!(!machine.cancel());
    }

    #[test]
    fn test_undo_waypoint_and_preview() {
        let graph = graph();
        let config = SnapConfig::default();
        let mut machine = drawing_from_a(&graph);
        machine.click(&graph, &config, Point::new(300.0, 300.0));
        machine.click(&graph, &config, Point::new(250.0, 500.0));
        machine.hover(Point::new(260.0, 520.0));
        assert_eq!(machine.preview().map(|p| p.len()), Some(4));

        assert_eq!(machine.undo_waypoint(), Some(Point::new(250.0, 500.0)));
        assert_eq!(
            machine.preview(),
            Some(vec![
                Point::new(220.0, 120.0),
                Point::new(300.0, 300.0),
                Point::new(260.0, 520.0)
            ])
        );
    }

    #[test]
    fn test_complete_commits_edge() {
        let mut graph = graph();
        let config = SnapConfig::default();
        let mut machine = drawing_from_a(&graph);
        machine.click(&graph, &config, Point::new(402.0, 121.0));

        let id = machine
            .complete(&mut graph, EdgeDetails::new(FlowType::Clean).with_volume(500.0))
            .unwrap();
        assert!(machine.is_idle());
        let edge = graph.edge(id.as_str()).unwrap();
        assert_eq!(edge.volume(), Some(500.0));
        assert_eq!(edge.segments().len(), 2);
    }

    #[test]
    fn test_complete_failure_returns_to_idle_without_mutation() {
        let mut graph = graph();
        let config = SnapConfig::default();
        let mut machine = drawing_from_a(&graph);
        machine.click(&graph, &config, Point::new(402.0, 121.0));
        graph.remove_node("a").unwrap();

        let result = machine.complete(&mut graph, EdgeDetails::default());
        assert!(matches!(result, Err(DrawingError::Model(_))));
        assert!(machine.is_idle());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_complete_without_candidate() {
        let mut graph = graph();
        let mut machine = DrawingMachine::new();
        assert_eq!(
            machine.complete(&mut graph, EdgeDetails::default()),
            Err(DrawingError::NotAwaitingDetails)
        );
    }

    #[test]
    fn test_abandon_discards_candidate() {
        let mut graph = graph();
        let config = SnapConfig::default();
        let mut machine = drawing_from_a(&graph);
        machine.click(&graph, &config, Point::new(402.0, 121.0));
        assert!(machine.abandon());
        assert!(machine.is_idle());
        assert!(machine.complete(&mut graph, EdgeDetails::default()).is_err());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_clicks_ignored_while_awaiting_details() {
        let graph = graph();
        let config = SnapConfig::default();
        let mut machine = drawing_from_a(&graph);
        machine.click(&graph, &config, Point::new(402.0, 121.0));
        assert_eq!(
            machine.click(&graph, &config, Point::new(160.0, 402.0)),
            ClickOutcome::Ignored
        );
        assert!(machine.candidate().is_some());
    }
}
