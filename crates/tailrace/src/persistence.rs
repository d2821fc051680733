//! Reading and writing diagram files.
//!
//! The file is a single JSON document holding the diagram header, nodes,
//! edges and background zones. Loading is all-or-nothing for structural
//! problems; edges whose endpoints do not resolve are dropped with a
//! [`DiagnosticCode::W101`] warning instead. Junction edges whose `to` is
//! not a `junction:<edge id>` reference are attached to the edge they lie
//! on, when one is within the default junction snap radius.

use std::{
    collections::HashSet,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;

use tailrace_core::{
    draw::FontWeight,
    geometry::{Point, Size},
};

use crate::{
    diagnostic::{Diagnostic, DiagnosticCode},
    error::{ModelError, ParseError, TailraceError},
    model::{
        DEFAULT_LABEL_FONT_SIZE, DEFAULT_NODE_FONT_SIZE, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH,
        Diagram, Edge, EdgeDetails, EdgeSpec, EdgeTarget, ExcelMapping, FlowType, Graph, Junction,
        Node, NodeId, NodeKind, NodeShape, NodeSpec, Zone,
    },
    snap::SnapConfig,
};

fn default_node_width() -> f32 {
    DEFAULT_NODE_WIDTH
}

fn default_node_height() -> f32 {
    DEFAULT_NODE_HEIGHT
}

fn default_font_size() -> f32 {
    DEFAULT_NODE_FONT_SIZE
}

fn default_label_font_size() -> f32 {
    DEFAULT_LABEL_FONT_SIZE
}

#[derive(Debug, Serialize, Deserialize)]
struct DiagramRecord {
    #[serde(default)]
    area_code: String,
    #[serde(default)]
    title: String,
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
    #[serde(default)]
    zone_bg: Vec<ZoneRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default)]
    shape: NodeShape,
    x: f32,
    y: f32,
    #[serde(default = "default_node_width")]
    width: f32,
    #[serde(default = "default_node_height")]
    height: f32,
    #[serde(default)]
    fill: Option<String>,
    #[serde(default)]
    outline: Option<String>,
    #[serde(default)]
    locked: bool,
    #[serde(default = "default_font_size")]
    font_size: f32,
    #[serde(default)]
    font_weight: FontWeight,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    from: String,
    to: String,
    segments: Vec<[f32; 2]>,
    #[serde(default)]
    flow_type: FlowType,
    #[serde(default)]
    volume: Option<f64>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    label: String,
    #[serde(default)]
    bidirectional: bool,
    #[serde(default = "default_label_font_size")]
    label_font_size: f32,
    #[serde(default)]
    is_junction: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    junction_pos: Option<[f32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    excel_mapping: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ZoneRecord {
    #[serde(default)]
    name: String,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    color: String,
}

fn point([x, y]: [f32; 2]) -> Point {
    Point::new(x, y)
}

fn pair(point: Point) -> [f32; 2] {
    [point.x(), point.y()]
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id().to_string(),
            label: Some(node.label().to_string()),
            kind: node.kind(),
            shape: node.shape(),
            x: node.position().x(),
            y: node.position().y(),
            width: node.size().width(),
            height: node.size().height(),
            fill: Some(node.fill().to_string()),
            outline: Some(node.outline().to_string()),
            locked: node.locked(),
            font_size: node.font_size(),
            font_weight: node.font_weight(),
        }
    }
}

impl From<NodeRecord> for NodeSpec {
    fn from(record: NodeRecord) -> Self {
        Self {
            id: record.id,
            label: record.label,
            kind: record.kind,
            shape: Some(record.shape),
            position: Point::new(record.x, record.y),
            width: Some(record.width),
            height: Some(record.height),
            fill: record.fill,
            outline: record.outline,
            locked: record.locked,
            font_size: Some(record.font_size),
            font_weight: record.font_weight,
        }
    }
}

impl From<&Edge> for EdgeRecord {
    fn from(edge: &Edge) -> Self {
        Self {
            id: Some(edge.id().to_string()),
            from: edge.from().to_string(),
            to: edge.to().reference().to_string(),
            segments: edge.segments().iter().copied().map(pair).collect(),
            flow_type: edge.flow_type(),
            volume: edge.volume(),
            color: Some(edge.color().to_string()),
            label: edge.label().to_string(),
            bidirectional: edge.bidirectional(),
            label_font_size: edge.label_font_size(),
            is_junction: edge.is_junction(),
            junction_pos: edge.junction_pos().map(pair),
            excel_mapping: edge.excel_mapping().map(|mapping| mapping.value().clone()),
        }
    }
}

impl From<&Zone> for ZoneRecord {
    fn from(zone: &Zone) -> Self {
        let bounds = zone.bounds();
        Self {
            name: zone.name().to_string(),
            x: bounds.min_x(),
            y: bounds.min_y(),
            width: bounds.width(),
            height: bounds.height(),
            color: zone.color().to_string(),
        }
    }
}

/// Parses a diagram file.
///
/// Returns the diagram together with its diagnostics: one `W101` per edge
/// dropped because an endpoint did not resolve, followed by the diagram's
/// own consistency warnings.
///
/// # Errors
///
/// Returns a [`ParseError`] if the document is not valid JSON, lacks the
/// `nodes` or `edges` arrays, uses an unknown enumerated value, contains an
/// invalid node, edge or zone, or repeats a node or edge id.
pub fn load(bytes: &[u8]) -> Result<(Diagram, Vec<Diagnostic>), ParseError> {
    let record: DiagramRecord = serde_json::from_slice(bytes)?;
    let mut graph = Graph::new();
    let mut diagnostics = Vec::new();

    for (index, node) in record.nodes.into_iter().enumerate() {
        let node = Node::from_spec(NodeSpec::from(node))
            .map_err(|source| ParseError::InvalidNode { index, source })?;
        let id = node.id().to_string();
        if graph.insert_node(node).is_err() {
            return Err(ParseError::DuplicateNodeId(id));
        }
    }

    let ids = assign_edge_ids(&record.edges)?;
    for (index, (edge, id)) in record.edges.into_iter().zip(ids).enumerate() {
        let added = edge_spec(edge, id).and_then(|spec| graph.add_edge(spec));
        match added {
            Ok(_) => {}
            Err(ModelError::UnknownEndpoint(endpoint)) => {
                warn!(index, endpoint = endpoint.as_str(); "Dropping edge with unresolved endpoint");
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::W101,
                    format!("edge #{index} dropped: node `{endpoint}` does not exist"),
                ));
            }
            Err(source) => return Err(ParseError::InvalidEdge { index, source }),
        }
    }

    let attached = graph.rehost_junctions(SnapConfig::default().junction_radius());
    if !attached.is_empty() {
        info!(count = attached.len(); "Attached legacy junction references to host edges");
    }

    for (index, zone) in record.zone_bg.into_iter().enumerate() {
        let zone = Zone::new(
            zone.name,
            Point::new(zone.x, zone.y),
            Size::new(zone.width, zone.height),
            &zone.color,
        )
        .map_err(|source| ParseError::InvalidZone { index, source })?;
        graph.add_zone(zone);
    }

    let diagram = Diagram::new(record.area_code, record.title, graph);
    diagnostics.extend(diagram.diagnostics());
    Ok((diagram, diagnostics))
}

/// Explicit ids as written, then `edge_<n>` for edges without one, skipping
/// every id already taken.
fn assign_edge_ids(edges: &[EdgeRecord]) -> Result<Vec<String>, ParseError> {
    let mut taken = HashSet::new();
    for id in edges.iter().filter_map(|edge| edge.id.as_deref()) {
        if !taken.insert(id.to_string()) {
            return Err(ParseError::DuplicateEdgeId(id.to_string()));
        }
    }

    let mut next = 1usize;
    Ok(edges
        .iter()
        .map(|edge| match &edge.id {
            Some(id) => id.clone(),
            None => {
                let id = (next..)
                    .map(|n| format!("edge_{n}"))
                    .find(|candidate| !taken.contains(candidate))
                    .unwrap_or_default();
                next += 1;
                taken.insert(id.clone());
                id
            }
        })
        .collect())
}

/// Converts an edge record. Endpoints that cannot be node ids at all are
/// reported the same way as ids missing from the graph.
fn edge_spec(record: EdgeRecord, id: String) -> Result<EdgeSpec, ModelError> {
    let segments: Vec<Point> = record.segments.into_iter().map(point).collect();

    let from = NodeId::new(record.from.as_str())
        .map_err(|_| ModelError::UnknownEndpoint(record.from.clone()))?;
    let to = if record.is_junction {
        // A junction without a position sits on the end of its own path.
        let position = record
            .junction_pos
            .map(point)
            .or_else(|| segments.last().copied())
            .unwrap_or_default();
        EdgeTarget::Junction(Junction::from_reference(record.to, position))
    } else {
        let to = NodeId::new(record.to.as_str())
            .map_err(|_| ModelError::UnknownEndpoint(record.to.clone()))?;
        EdgeTarget::Node(to)
    };

    Ok(EdgeSpec {
        id: Some(id),
        from,
        to,
        segments,
        details: EdgeDetails {
            flow_type: record.flow_type,
            volume: record.volume,
            label: record.label,
            color: record.color,
            bidirectional: record.bidirectional,
            label_font_size: Some(record.label_font_size),
            excel_mapping: record.excel_mapping.map(ExcelMapping::new),
        },
    })
}

/// Serializes a diagram as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`TailraceError::Export`] if serialization fails, which only
/// happens for non-finite numbers that validation would have rejected.
pub fn save(diagram: &Diagram) -> Result<Vec<u8>, TailraceError> {
    let graph = diagram.graph();
    let record = DiagramRecord {
        area_code: diagram.area_code().to_string(),
        title: diagram.title().to_string(),
        nodes: graph.nodes().map(NodeRecord::from).collect(),
        edges: graph.edges().map(EdgeRecord::from).collect(),
        zone_bg: graph.zones().iter().map(ZoneRecord::from).collect(),
    };
    let mut bytes =
        serde_json::to_vec_pretty(&record).map_err(|err| TailraceError::Export(err.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Reads and parses a diagram file.
pub fn load_file(path: impl AsRef<Path>) -> Result<(Diagram, Vec<Diagnostic>), TailraceError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let (diagram, diagnostics) = load(&bytes)?;
    info!(
        path:? = path,
        nodes = diagram.graph().node_count(),
        edges = diagram.graph().edge_count(),
        warnings = diagnostics.len();
        "Loaded diagram"
    );
    Ok((diagram, diagnostics))
}

/// Writes a diagram file atomically.
///
/// The content goes to a temporary file next to `path`, which is then
/// renamed over it. On failure the temporary file is removed and `path` is
/// left as it was.
pub fn save_file(path: impl AsRef<Path>, diagram: &Diagram) -> Result<(), TailraceError> {
    let path = path.as_ref();
    let bytes = save(diagram)?;

    let mut temp = NamedTempFile::new_in(parent_dir(path))?;
    temp.write_all(&bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;

    info!(path:? = path, bytes = bytes.len(); "Saved diagram");
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
