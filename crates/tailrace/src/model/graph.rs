//! The authoritative store of nodes, edges and zones.
//!
//! Nodes and edges live in insertion-ordered maps: iteration order is both
//! the save order and the drawing order, so later-added nodes sit on top.

use std::collections::VecDeque;

use indexmap::IndexMap;
use log::{debug, warn};

use tailrace_core::geometry::{Bounds, Point, project_onto_polyline};

use crate::{
    error::{ElementKind, ModelError},
    model::{
        Edge, EdgeId, EdgePatch, EdgeSpec, EdgeTarget, Node, NodeId, NodeKind, NodePatch,
        NodeSpec, Zone,
    },
    validate::{ValidationError, check_point},
};

/// Nodes, edges and zones of one diagram, with referential integrity.
///
/// Every edge's `from`, and every non-junction `to`, names a node in the
/// graph. Junction edges may outlive their host edge; see
/// [`Graph::orphaned_junction_edges`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    zones: Vec<Zone>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.zones.is_empty()
    }

    // --- Nodes ---

    /// Validates `spec` and adds the node.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateId`] if a node with the same id exists, or a
    /// validation error for any out-of-range field. The graph is unchanged
    /// on error.
    pub fn add_node(&mut self, spec: NodeSpec) -> Result<NodeId, ModelError> {
        let node = Node::from_spec(spec)?;
        self.insert_node(node)
    }

    /// Adds an already validated node.
    pub fn insert_node(&mut self, node: Node) -> Result<NodeId, ModelError> {
        if self.nodes.contains_key(node.id()) {
            return Err(ModelError::DuplicateId {
                kind: ElementKind::Node,
                id: node.id().to_string(),
            });
        }
        let id = node.id().clone();
        debug!(node = id.as_str(), kind = node.kind().as_str(); "Added node");
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in insertion order, bottom-most first.
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Removes a node together with every edge that starts or ends on it.
    ///
    /// The cascade is transitive: junction edges sitting on a removed edge
    /// are removed too, and so on. Returns the ids of all removed edges in
    /// removal order.
    pub fn remove_node(&mut self, id: &str) -> Result<Vec<EdgeId>, ModelError> {
        let Some((node_id, _)) = self.nodes.shift_remove_entry(id) else {
            return Err(ModelError::NodeNotFound(id.to_string()));
        };

        let mut queue: VecDeque<EdgeId> = self
            .edges
            .values()
            .filter(|edge| edge.touches(&node_id))
            .map(|edge| edge.id().clone())
            .collect();

        let mut removed = Vec::new();
        while let Some(edge_id) = queue.pop_front() {
            if self.edges.shift_remove(&edge_id).is_none() {
                continue;
            }
            queue.extend(
                self.junction_dependents(edge_id.as_str())
                    .into_iter()
                    .map(|edge| edge.id().clone()),
            );
            removed.push(edge_id);
        }

        debug!(node = node_id.as_str(), edges = removed.len(); "Removed node");
        Ok(removed)
    }

    /// Applies a property edit.
    ///
    /// Position changes here bypass `locked`; only dragging honours it.
    /// Edges touching the node are re-pinned when its geometry changes.
    pub fn update_node(&mut self, id: &str, patch: &NodePatch) -> Result<(), ModelError> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))?;
        let patched = node.patched(patch)?;
        let geometry_changed = patched.bounds() != node.bounds();

        let node_id = patched.id().clone();
        self.nodes.insert(node_id.clone(), patched);
        if geometry_changed {
            self.repin_edges(&node_id);
        }
        debug!(node = node_id.as_str(); "Updated node");
        Ok(())
    }

    /// Moves a node's top-left corner to `position`. This is the drag path.
    ///
    /// # Errors
    ///
    /// [`ModelError::Locked`] for locked nodes.
    pub fn move_node(&mut self, id: &str, position: Point) -> Result<(), ModelError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))?;
        if node.locked() {
            return Err(ModelError::Locked(id.to_string()));
        }
        node.set_position(check_point("position", position)?);

        let node_id = node.id().clone();
        self.repin_edges(&node_id);
        Ok(())
    }

    /// Generates the first free id of the form `<type>_<n>`.
    pub fn next_node_id(&self, kind: NodeKind) -> NodeId {
        let value = (1..)
            .map(|n| format!("{}_{n}", kind.as_str()))
            .find(|candidate| !self.nodes.contains_key(candidate.as_str()))
            .unwrap_or_default();
        NodeId::generated(value)
    }

    // --- Edges ---

    /// Validates and adds an edge.
    ///
    /// # Errors
    ///
    /// - [`ModelError::UnknownEndpoint`] if `from`, or a node `to`, is not
    ///   in the graph
    /// - [`ModelError::DuplicateId`] on an edge id clash
    /// - [`ModelError::InvalidSegments`] for fewer than two points or
    ///   consecutive duplicates
    pub fn add_edge(&mut self, spec: EdgeSpec) -> Result<EdgeId, ModelError> {
        if !self.nodes.contains_key(&spec.from) {
            return Err(ModelError::UnknownEndpoint(spec.from.to_string()));
        }
        if let EdgeTarget::Node(to) = &spec.to {
            if !self.nodes.contains_key(to) {
                return Err(ModelError::UnknownEndpoint(to.to_string()));
            }
        }

        let id = match spec.id {
            Some(id) => EdgeId::new(id).map_err(ValidationError::from)?,
            None => self.next_edge_id(),
        };
        if self.edges.contains_key(&id) {
            return Err(ModelError::DuplicateId {
                kind: ElementKind::Edge,
                id: id.to_string(),
            });
        }

        let edge = Edge::new(id.clone(), spec.from, spec.to, spec.segments, spec.details)?;
        debug!(
            edge = id.as_str(),
            from = edge.from().as_str(),
            to = edge.to().reference(),
            points = edge.segments().len();
            "Added edge"
        );
        self.edges.insert(id.clone(), edge);
        Ok(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl DoubleEndedIterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Removes exactly one edge.
    ///
    /// Junction edges sitting on it stay in the graph as orphans; their ids
    /// are returned.
    pub fn remove_edge(&mut self, id: &str) -> Result<Vec<EdgeId>, ModelError> {
        if self.edges.shift_remove(id).is_none() {
            return Err(ModelError::EdgeNotFound(id.to_string()));
        }
        let orphaned: Vec<EdgeId> = self
            .junction_dependents(id)
            .into_iter()
            .map(|edge| edge.id().clone())
            .collect();
        if !orphaned.is_empty() {
            warn!(edge = id, orphaned = orphaned.len(); "Removed edge leaves junction edges without a host");
        }
        debug!(edge = id; "Removed edge");
        Ok(orphaned)
    }

    /// Applies a property edit. The graph is unchanged on error.
    pub fn update_edge(&mut self, id: &str, patch: &EdgePatch) -> Result<(), ModelError> {
        let edge = self
            .edges
            .get(id)
            .ok_or_else(|| ModelError::EdgeNotFound(id.to_string()))?;
        let patched = edge.patched(patch)?;
        self.edges.insert(patched.id().clone(), patched);
        debug!(edge = id; "Updated edge");
        Ok(())
    }

    /// Sets an edge's volume and nothing else. Used by the volume loader.
    pub fn update_edge_volume(&mut self, id: &str, volume: Option<f64>) -> Result<(), ModelError> {
        let edge = self
            .edges
            .get_mut(id)
            .ok_or_else(|| ModelError::EdgeNotFound(id.to_string()))?;
        edge.set_volume(volume)?;
        debug!(edge = id, volume:? = volume; "Updated edge volume");
        Ok(())
    }

    /// Finds hosts for junction edges whose reference names no edge.
    ///
    /// Each such junction is attached to the edge whose route passes
    /// nearest its position, if that is within `radius`. Ties go to the
    /// earlier edge. Junction edges still lacking a host are never offered
    /// as hosts themselves. Returns the `(edge, host)` pairs attached.
    pub fn rehost_junctions(&mut self, radius: f32) -> Vec<(EdgeId, EdgeId)> {
        let unhosted: Vec<(EdgeId, Point)> = self
            .edges
            .values()
            .filter_map(|edge| {
                let junction = edge.to().junction()?;
                junction
                    .host()
                    .is_none()
                    .then(|| (edge.id().clone(), junction.position()))
            })
            .collect();

        let attached: Vec<(EdgeId, EdgeId)> = unhosted
            .iter()
            .filter_map(|(id, position)| {
                let mut best: Option<(f32, &EdgeId)> = None;
                for candidate in self.edges.values() {
                    if unhosted.iter().any(|(other, _)| other == candidate.id()) {
                        continue;
                    }
                    let Some(projection) = project_onto_polyline(&self.route(candidate), *position)
                    else {
                        continue;
                    };
                    if projection.distance <= radius
                        && best.is_none_or(|(distance, _)| projection.distance < distance)
                    {
                        best = Some((projection.distance, candidate.id()));
                    }
                }
                best.map(|(_, host)| (id.clone(), host.clone()))
            })
            .collect();

        for (id, host) in &attached {
            if let Some(edge) = self.edges.get_mut(id) {
                edge.set_junction_host(host);
                debug!(edge = id.as_str(), host = host.as_str(); "Attached junction to host edge");
            }
        }
        attached
    }

    /// Generates the first free id of the form `edge_<n>`.
    pub fn next_edge_id(&self) -> EdgeId {
        let value = (1..)
            .map(|n| format!("edge_{n}"))
            .find(|candidate| !self.edges.contains_key(candidate.as_str()))
            .unwrap_or_default();
        EdgeId::generated(value)
    }

    // --- Zones ---

    /// Adds a zone and returns its index.
    pub fn add_zone(&mut self, zone: Zone) -> usize {
        self.zones.push(zone);
        self.zones.len() - 1
    }

    pub fn remove_zone(&mut self, index: usize) -> Result<Zone, ModelError> {
        if index >= self.zones.len() {
            return Err(ModelError::ZoneNotFound(index));
        }
        Ok(self.zones.remove(index))
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    // --- Queries ---

    /// Edges starting or ending on the node `id`.
    pub fn edges_touching(&self, id: &str) -> Vec<&Edge> {
        self.edges
            .values()
            .filter(|edge| {
                edge.from().as_str() == id || edge.to().node().is_some_and(|to| to.as_str() == id)
            })
            .collect()
    }

    /// Junction edges whose junction sits on the edge `id`.
    pub fn junction_dependents(&self, id: &str) -> Vec<&Edge> {
        self.edges
            .values()
            .filter(|edge| edge.to().junction().is_some_and(|j| j.is_on(id)))
            .collect()
    }

    /// Junction edges whose host edge does not exist.
    pub fn orphaned_junction_edges(&self) -> Vec<&Edge> {
        self.edges
            .values()
            .filter(|edge| {
                edge.to().junction().is_some_and(|junction| {
                    junction
                        .host()
                        .is_none_or(|host| !self.edges.contains_key(&host))
                })
            })
            .collect()
    }

    /// The polyline an edge is drawn along.
    ///
    /// Node ends are resolved from the node's current bounds, using the
    /// anchor nearest to the adjacent waypoint. An edge without waypoints
    /// aims each node end at the center of the opposite end instead. A
    /// junction end is the junction position.
    pub fn route(&self, edge: &Edge) -> Vec<Point> {
        let mut points = edge.segments().to_vec();
        let last = points.len() - 1;
        let direct = points.len() == 2;

        let from_bounds = self.nodes.get(edge.from()).map(Node::bounds);
        let to_end = match edge.to() {
            EdgeTarget::Node(id) => self.nodes.get(id).map(|node| node.bounds().center()),
            EdgeTarget::Junction(junction) => Some(junction.position()),
        };

        if let Some(bounds) = from_bounds {
            let toward = match (direct, to_end) {
                (true, Some(end)) => end,
                _ => points[1],
            };
            points[0] = bounds.nearest_anchor(toward).1;
        }
        match edge.to() {
            EdgeTarget::Node(id) => {
                if let Some(node) = self.nodes.get(id) {
                    let toward = match (direct, from_bounds) {
                        (true, Some(bounds)) => bounds.center(),
                        _ => points[last - 1],
                    };
                    points[last] = node.bounds().nearest_anchor(toward).1;
                }
            }
            EdgeTarget::Junction(junction) => points[last] = junction.position(),
        }
        points
    }

    /// Smallest bounds holding every node and every edge route. `None` for
    /// a graph without nodes or edges.
    pub fn bounds(&self) -> Option<Bounds> {
        let node_points = self.nodes.values().flat_map(|node| {
            let bounds = node.bounds();
            [bounds.min_point(), bounds.max_point()]
        });
        let edge_points = self.edges.values().flat_map(|edge| self.route(edge));
        Bounds::from_points(node_points.chain(edge_points))
    }

    /// Writes the resolved endpoints of every edge touching `node` back into
    /// the stored segments.
    fn repin_edges(&mut self, node: &NodeId) {
        let updates: Vec<(EdgeId, Vec<Point>)> = self
            .edges
            .values()
            .filter(|edge| edge.touches(node))
            .filter_map(|edge| {
                let mut pinned = self.route(edge);
                pinned.dedup();
                // Overlapping nodes can collapse an edge; keep the old points
                (pinned.len() >= 2 && pinned != edge.segments())
                    .then(|| (edge.id().clone(), pinned))
            })
            .collect();

        for (id, points) in updates {
            if let Some(edge) = self.edges.get_mut(&id) {
                edge.set_segments(points);
            }
        }
    }
}
