//! Hit-testing, selection, dragging and deletion.

use indexmap::IndexSet;
use log::{debug, info};
use serde::Deserialize;

use tailrace_core::geometry::{Point, project_onto_polyline};

use crate::{
    drawing::node_under,
    error::ModelError,
    model::{EdgeId, ElementRef, Graph, NodeId},
};

/// Selection settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// How far from an edge's route a click still hits the edge.
    edge_tolerance: f32,
}

impl SelectionConfig {
    pub fn new(edge_tolerance: f32) -> Self {
        Self { edge_tolerance }
    }

    pub fn edge_tolerance(&self) -> f32 {
        self.edge_tolerance
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self::new(6.0)
    }
}

/// Finds the element under `point`.
///
/// Nodes win over edges, and later-added nodes over earlier ones. Among
/// edges within `edge_tolerance` the closest wins, the later-added on ties.
pub fn hit_test(graph: &Graph, point: Point, edge_tolerance: f32) -> Option<ElementRef> {
    if let Some(node) = node_under(graph, point) {
        return Some(ElementRef::Node(node.id().clone()));
    }

    let mut best: Option<(f32, &EdgeId)> = None;
    for edge in graph.edges().rev() {
        let route = graph.route(edge);
        let Some(projection) = project_onto_polyline(&route, point) else {
            continue;
        };
        if projection.distance <= edge_tolerance
            && best.is_none_or(|(d, _)| projection.distance < d)
        {
            best = Some((projection.distance, edge.id()));
        }
    }
    best.map(|(_, id)| ElementRef::Edge(id.clone()))
}

/// What a deletion removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteReport {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
    /// Indices the removed zones had.
    pub zones: Vec<usize>,
    /// Junction edges left without a host. They are still in the graph.
    pub orphaned: Vec<EdgeId>,
}

impl DeleteReport {
    /// Number of elements removed.
    pub fn count(&self) -> usize {
        self.nodes.len() + self.edges.len() + self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Drag {
    node: NodeId,
    grab_offset: Point,
}

/// The current selection.
///
/// A single node or edge can be selected, and independently a set of edges
/// can be accumulated for batch deletion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    current: Option<ElementRef>,
    edge_set: IndexSet<EdgeId>,
    drag: Option<Drag>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ElementRef> {
        self.current.as_ref()
    }

    /// Edges accumulated for batch deletion, in the order they were added.
    pub fn edge_set(&self) -> &IndexSet<EdgeId> {
        &self.edge_set
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.edge_set.is_empty()
    }

    /// Returns `true` if `element` is highlighted.
    pub fn is_selected(&self, element: &ElementRef) -> bool {
        self.current.as_ref() == Some(element)
            || element
                .as_edge()
                .is_some_and(|id| self.edge_set.contains(id))
    }

    /// Selects the element under `point`, replacing any previous selection.
    pub fn select_at(&mut self, graph: &Graph, point: Point, edge_tolerance: f32) -> Option<&ElementRef> {
        self.edge_set.clear();
        self.current = hit_test(graph, point, edge_tolerance);
        self.current.as_ref()
    }

    pub fn select(&mut self, element: ElementRef) {
        self.edge_set.clear();
        self.current = Some(element);
    }

    /// Adds the edge under `point` to the edge set, or removes it if it is
    /// already there. Clicks that miss every edge change nothing.
    pub fn toggle_edge_at(&mut self, graph: &Graph, point: Point, edge_tolerance: f32) -> Option<EdgeId> {
        let Some(ElementRef::Edge(id)) = hit_test(graph, point, edge_tolerance) else {
            return None;
        };
        self.toggle_edge(id.clone());
        Some(id)
    }

    /// Returns `true` if the edge is in the set afterwards.
    pub fn toggle_edge(&mut self, id: EdgeId) -> bool {
        if self.edge_set.shift_remove(&id) {
            false
        } else {
            self.edge_set.insert(id);
            true
        }
    }

    pub fn select_all_edges(&mut self, graph: &Graph) {
        self.current = None;
        self.edge_set = graph.edges().map(|edge| edge.id().clone()).collect();
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.edge_set.clear();
        self.drag = None;
    }

    /// Starts dragging if `point` is on the selected node and the node is
    /// not locked.
    pub fn begin_drag(&mut self, graph: &Graph, point: Point) -> bool {
        let Some(ElementRef::Node(id)) = &self.current else {
            return false;
        };
        let Some(node) = graph.node(id.as_str()) else {
            return false;
        };
        if node.locked() || !node.contains(point) {
            return false;
        }
        self.drag = Some(Drag {
            node: id.clone(),
            grab_offset: point.sub_point(node.position()),
        });
        true
    }

    /// Moves the dragged node so the grab point follows `point`. Returns
    /// `false` when no drag is in progress.
    pub fn drag_to(&mut self, graph: &mut Graph, point: Point) -> Result<bool, ModelError> {
        let Some(drag) = &self.drag else {
            return Ok(false);
        };
        graph.move_node(drag.node.as_str(), point.sub_point(drag.grab_offset))?;
        Ok(true)
    }

    /// Ends a drag. Returns `true` if one was in progress.
    pub fn end_drag(&mut self) -> bool {
        let dragged = self.drag.take();
        if let Some(drag) = &dragged {
            debug!(node = drag.node.as_str(); "Drag finished");
        }
        dragged.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Removes exactly the edges in the edge set and empties it.
    pub fn delete_edge_set(&mut self, graph: &mut Graph) -> DeleteReport {
        let mut report = DeleteReport::default();
        for id in std::mem::take(&mut self.edge_set) {
            // Already gone edges are skipped
            if let Ok(orphaned) = graph.remove_edge(id.as_str()) {
                report.orphaned.extend(orphaned);
                report.edges.push(id);
            }
        }
        report.orphaned.retain(|id| graph.contains_edge(id.as_str()));
        if self
            .current
            .as_ref()
            .and_then(ElementRef::as_edge)
            .is_some_and(|id| !graph.contains_edge(id.as_str()))
        {
            self.current = None;
        }
        info!(count = report.count(); "Deleted selected edges");
        report
    }

    /// Deletes the selection: the edge set if it is non-empty, otherwise
    /// the single selected node (with its edges) or edge.
    pub fn delete_selection(&mut self, graph: &mut Graph) -> Result<DeleteReport, ModelError> {
        if !self.edge_set.is_empty() {
            return Ok(self.delete_edge_set(graph));
        }

        let mut report = DeleteReport::default();
        match self.current.take() {
            Some(ElementRef::Node(id)) => {
                report.edges = graph.remove_node(id.as_str())?;
                report.nodes.push(id);
            }
            Some(ElementRef::Edge(id)) => {
                report.orphaned = graph.remove_edge(id.as_str())?;
                report.edges.push(id);
            }
            Some(ElementRef::Zone(index)) => {
                graph.remove_zone(index)?;
                report.zones.push(index);
            }
            None => {}
        }
        self.drag = None;
        Ok(report)
    }

    /// Forgets selected elements that are no longer in the graph.
    pub fn prune(&mut self, graph: &Graph) {
        let stale = match &self.current {
            Some(ElementRef::Node(id)) => !graph.contains_node(id.as_str()),
            Some(ElementRef::Edge(id)) => !graph.contains_edge(id.as_str()),
            Some(ElementRef::Zone(index)) => *index >= graph.zones().len(),
            None => false,
        };
        if stale {
            self.current = None;
        }
        self.edge_set.retain(|id| graph.contains_edge(id.as_str()));
        if self
            .drag
            .as_ref()
            .is_some_and(|drag| !graph.contains_node(drag.node.as_str()))
        {
            self.drag = None;
        }
    }
}
