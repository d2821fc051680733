//! Diagram edges: water flows between nodes, or from a node onto another flow.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tailrace_core::{
    color::HexColor,
    draw::{ArrowDirection, StrokeStyle},
    geometry::Point,
};

use crate::{
    error::ModelError,
    model::{EdgeId, NodeId},
    validate::{
        FONT_SIZE_RANGE, ValidationError, check_point, check_range, check_segments, check_volume,
        parse_color,
    },
};

/// Prefix of the `to` reference written for junction edges.
pub const JUNCTION_PREFIX: &str = "junction:";

pub const DEFAULT_LABEL_FONT_SIZE: f32 = 8.0;

/// Classification of the water carried by an edge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    #[default]
    Clean,
    Dirty,
    Process,
    Recirculation,
    Evaporation,
    Seepage,
    Rainfall,
    Runoff,
    Spill,
    Other,
}

impl FlowType {
    pub const ALL: [FlowType; 10] = [
        Self::Clean,
        Self::Dirty,
        Self::Process,
        Self::Recirculation,
        Self::Evaporation,
        Self::Seepage,
        Self::Rainfall,
        Self::Runoff,
        Self::Spill,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Dirty => "dirty",
            Self::Process => "process",
            Self::Recirculation => "recirculation",
            Self::Evaporation => "evaporation",
            Self::Seepage => "seepage",
            Self::Rainfall => "rainfall",
            Self::Runoff => "runoff",
            Self::Spill => "spill",
            Self::Other => "other",
        }
    }

    /// Color given to a new edge of this type when none is supplied.
    pub fn default_color(self) -> &'static str {
        match self {
            Self::Clean => "#1e88e5",
            Self::Dirty => "#6d4c41",
            Self::Process => "#8e24aa",
            Self::Recirculation => "#00897b",
            Self::Evaporation => "#fb8c00",
            Self::Seepage => "#546e7a",
            Self::Rainfall => "#039be5",
            Self::Runoff => "#43a047",
            Self::Spill => "#e53935",
            Self::Other => "#757575",
        }
    }

    /// Line pattern the renderer uses for this type.
    pub fn stroke_style(self) -> StrokeStyle {
        match self {
            Self::Evaporation => StrokeStyle::Dotted,
            Self::Seepage => StrokeStyle::Dashed,
            _ => StrokeStyle::Solid,
        }
    }
}

impl FromStr for FlowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flow| flow.as_str() == s)
            .ok_or_else(|| format!("unknown flow type `{s}`"))
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The end of an edge that terminates on another edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    reference: String,
    position: Point,
}

impl Junction {
    /// A junction on the edge `host` at `position`.
    pub fn on(host: &EdgeId, position: Point) -> Self {
        Self {
            reference: format!("{JUNCTION_PREFIX}{host}"),
            position,
        }
    }

    /// A junction with a reference read from a file. References that do
    /// not follow the `junction:<edge id>` form are kept verbatim and have
    /// no host.
    pub fn from_reference(reference: impl Into<String>, position: Point) -> Self {
        Self {
            reference: reference.into(),
            position,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// The edge this junction sits on, if the reference names one.
    pub fn host(&self) -> Option<EdgeId> {
        self.reference
            .strip_prefix(JUNCTION_PREFIX)
            .and_then(|id| EdgeId::new(id).ok())
    }

    /// Returns `true` if the reference names the edge `host`.
    pub fn is_on(&self, host: &str) -> bool {
        self.reference.strip_prefix(JUNCTION_PREFIX) == Some(host)
    }
}

/// Where an edge ends.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeTarget {
    Node(NodeId),
    Junction(Junction),
}

impl EdgeTarget {
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Junction(_) => None,
        }
    }

    pub fn junction(&self) -> Option<&Junction> {
        match self {
            Self::Node(_) => None,
            Self::Junction(junction) => Some(junction),
        }
    }

    /// The string written to the `to` field of the diagram file.
    pub fn reference(&self) -> &str {
        match self {
            Self::Node(id) => id.as_str(),
            Self::Junction(junction) => junction.reference(),
        }
    }
}

/// Spreadsheet binding used by the volume loader.
///
/// The value is kept exactly as read and written back unchanged. Only the
/// `enabled` flag is interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcelMapping(Value);

impl ExcelMapping {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn enabled(&self) -> bool {
        self.0
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// A flow of water drawn as a polyline.
///
/// `segments` holds every stored point of the line, endpoints included.
/// The first point is re-pinned to the `from` node, and the last to the
/// `to` node, whenever those nodes move.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: EdgeId,
    from: NodeId,
    to: EdgeTarget,
    segments: Vec<Point>,
    flow_type: FlowType,
    volume: Option<f64>,
    color: HexColor,
    label: String,
    bidirectional: bool,
    label_font_size: f32,
    excel_mapping: Option<ExcelMapping>,
}

impl Edge {
    /// Builds an edge, validating its points and details. Endpoint
    /// resolution is the graph's job.
    pub fn new(
        id: EdgeId,
        from: NodeId,
        to: EdgeTarget,
        segments: Vec<Point>,
        details: EdgeDetails,
    ) -> Result<Self, ModelError> {
        check_segments(&segments)?;
        if let EdgeTarget::Junction(junction) = &to {
            check_point("junction_pos", junction.position())?;
        }
        let color = match &details.color {
            Some(color) => parse_color("color", color)?,
            None => parse_color("color", details.flow_type.default_color())?,
        };
        let label_font_size = check_range(
            "label_font_size",
            details.label_font_size.unwrap_or(DEFAULT_LABEL_FONT_SIZE),
            &FONT_SIZE_RANGE,
        )?;

        Ok(Self {
            id,
            from,
            to,
            segments,
            flow_type: details.flow_type,
            volume: check_volume(details.volume)?,
            color,
            label: details.label,
            bidirectional: details.bidirectional,
            label_font_size,
            excel_mapping: details.excel_mapping,
        })
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn from(&self) -> &NodeId {
        &self.from
    }

    pub fn to(&self) -> &EdgeTarget {
        &self.to
    }

    /// Stored points, endpoints included. See [`Graph::route`] for the
    /// line as drawn.
    ///
    /// [`Graph::route`]: crate::model::Graph::route
    pub fn segments(&self) -> &[Point] {
        &self.segments
    }

    pub fn flow_type(&self) -> FlowType {
        self.flow_type
    }

    pub fn volume(&self) -> Option<f64> {
        self.volume
    }

    pub fn color(&self) -> &HexColor {
        &self.color
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bidirectional(&self) -> bool {
        self.bidirectional
    }

    pub fn label_font_size(&self) -> f32 {
        self.label_font_size
    }

    pub fn excel_mapping(&self) -> Option<&ExcelMapping> {
        self.excel_mapping.as_ref()
    }

    /// Whether the volume loader should fill in this edge's volume.
    pub fn excel_mapping_enabled(&self) -> bool {
        self.excel_mapping.as_ref().is_some_and(ExcelMapping::enabled)
    }

    pub fn is_junction(&self) -> bool {
        matches!(self.to, EdgeTarget::Junction(_))
    }

    pub fn junction_pos(&self) -> Option<Point> {
        self.to.junction().map(Junction::position)
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        self.from == *node || self.to.node() == Some(node)
    }

    /// Arrowheads drawn from the edge's own settings, before any sink rule.
    pub fn arrow_direction(&self) -> ArrowDirection {
        if self.bidirectional {
            ArrowDirection::Bidirectional
        } else {
            ArrowDirection::Forward
        }
    }

    /// The label as drawn: label text followed by the formatted volume.
    ///
    /// ```
    /// # use tailrace::model::format_caption;
    /// assert_eq!(format_caption("Raw water", Some(1500.0)), "Raw water 1,500");
    /// assert_eq!(format_caption("", Some(12.25)), "12.25");
    /// assert_eq!(format_caption("Spill", None), "Spill");
    /// ```
    pub fn caption(&self) -> String {
        format_caption(&self.label, self.volume)
    }

    /// Returns a validated copy with `patch` applied.
    pub fn patched(&self, patch: &EdgePatch) -> Result<Self, ModelError> {
        let mut edge = self.clone();
        if let Some(flow_type) = patch.flow_type {
            edge.flow_type = flow_type;
        }
        if let Some(volume) = patch.volume {
            edge.volume = check_volume(volume)?;
        }
        if let Some(color) = &patch.color {
            edge.color = parse_color("color", color)?;
        }
        if let Some(label) = &patch.label {
            edge.label = label.clone();
        }
        if let Some(bidirectional) = patch.bidirectional {
            edge.bidirectional = bidirectional;
        }
        if let Some(size) = patch.label_font_size {
            edge.label_font_size = check_range("label_font_size", size, &FONT_SIZE_RANGE)?;
        }
        if let Some(segments) = &patch.segments {
            check_segments(segments)?;
            edge.segments = segments.clone();
        }
        if let Some(mapping) = &patch.excel_mapping {
            edge.excel_mapping = mapping.clone();
        }
        Ok(edge)
    }

    pub(crate) fn set_volume(&mut self, volume: Option<f64>) -> Result<(), ValidationError> {
        self.volume = check_volume(volume)?;
        Ok(())
    }

    pub(crate) fn set_segments(&mut self, segments: Vec<Point>) {
        self.segments = segments;
    }

    /// Points a junction end at `host`, keeping its position.
    pub(crate) fn set_junction_host(&mut self, host: &EdgeId) {
        let position = match &self.to {
            EdgeTarget::Junction(junction) => junction.position(),
            EdgeTarget::Node(_) => return,
        };
        self.to = EdgeTarget::Junction(Junction::on(host, position));
    }
}

/// Formats an edge caption from its label and volume.
pub fn format_caption(label: &str, volume: Option<f64>) -> String {
    let volume = volume.map(format_volume);
    match (label.is_empty(), volume) {
        (_, None) => label.to_string(),
        (true, Some(volume)) => volume,
        (false, Some(volume)) => format!("{label} {volume}"),
    }
}

/// Formats a volume with thousands separators and at most two decimals.
fn format_volume(volume: f64) -> String {
    let rounded = (volume * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let fraction = fraction.trim_end_matches('0');
    let sign = if negative { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

/// Details the edge prompt supplies before a drawn edge is committed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeDetails {
    pub flow_type: FlowType,
    pub volume: Option<f64>,
    pub label: String,
    /// `None` uses the flow type's default color.
    pub color: Option<String>,
    pub bidirectional: bool,
    pub label_font_size: Option<f32>,
    pub excel_mapping: Option<ExcelMapping>,
}

impl EdgeDetails {
    pub fn new(flow_type: FlowType) -> Self {
        Self {
            flow_type,
            ..Self::default()
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = bidirectional;
        self
    }
}

/// Everything needed to add an edge to a graph directly.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    /// `None` lets the graph generate an id.
    pub id: Option<String>,
    pub from: NodeId,
    pub to: EdgeTarget,
    pub segments: Vec<Point>,
    pub details: EdgeDetails,
}

/// A partial update from the edge properties dialog.
///
/// `volume` and `excel_mapping` are doubly optional: the outer `None`
/// leaves the field alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePatch {
    pub flow_type: Option<FlowType>,
    pub volume: Option<Option<f64>>,
    pub color: Option<String>,
    pub label: Option<String>,
    pub bidirectional: Option<bool>,
    pub label_font_size: Option<f32>,
    pub segments: Option<Vec<Point>>,
    pub excel_mapping: Option<Option<ExcelMapping>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn edge(details: EdgeDetails) -> Result<Edge, ModelError> {
        Edge::new(
            EdgeId::new("edge_1").unwrap(),
            NodeId::new("a").unwrap(),
            EdgeTarget::Node(NodeId::new("b").unwrap()),
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            details,
        )
    }

    #[test]
    fn test_new_edge_uses_flow_type_color() {
        let edge = edge(EdgeDetails::new(FlowType::Spill)).unwrap();
        assert_eq!(edge.color().as_str(), "#e53935");
        assert_eq!(edge.label_font_size(), 8.0);
        assert!(!edge.bidirectional());
        assert!(!edge.is_junction());
        assert_eq!(edge.junction_pos(), None);
    }

    #[test]
    fn test_new_edge_rejects_invalid_details() {
        assert!(matches!(
            edge(EdgeDetails::new(FlowType::Clean).with_color("navy")),
            Err(ModelError::Validation(ValidationError::Color { .. }))
        ));
        assert!(edge(EdgeDetails::new(FlowType::Clean).with_volume(f64::NAN)).is_err());
        let details = EdgeDetails {
            label_font_size: Some(40.0),
            ..EdgeDetails::default()
        };
        assert!(edge(details).is_err());
    }

    #[test]
    fn test_new_edge_rejects_short_segments() {
        let result = Edge::new(
            EdgeId::new("e").unwrap(),
            NodeId::new("a").unwrap(),
            EdgeTarget::Node(NodeId::new("b").unwrap()),
            vec![Point::new(0.0, 0.0)],
            EdgeDetails::default(),
        );
        assert!(matches!(result, Err(ModelError::InvalidSegments(_))));
    }

    #[test]
    fn test_junction_host() {
        let host = EdgeId::new("edge_7").unwrap();
        let junction = Junction::on(&host, Point::new(5.0, 5.0));
        assert_eq!(junction.reference(), "junction:edge_7");
        assert_eq!(junction.host(), Some(host.clone()));
        assert!(junction.is_on(host.as_str()));

        let foreign = Junction::from_reference("junction_1700000000", Point::default());
        assert_eq!(foreign.host(), None);
        assert!(!foreign.is_on("edge_7"));
    }

    #[test]
    fn test_excel_mapping_enabled() {
        let mapping = ExcelMapping::new(json!({"enabled": true, "sheet": "Flows", "column": "C"}));
        assert!(mapping.enabled());
        assert!(!ExcelMapping::new(json!({"sheet": "Flows"})).enabled());

        let details = EdgeDetails {
            excel_mapping: Some(mapping),
            ..EdgeDetails::default()
        };
        assert!(edge(details).unwrap().excel_mapping_enabled());
    }

    #[test]
    fn test_patch_clears_volume() {
        let edge = edge(EdgeDetails::new(FlowType::Clean).with_volume(500.0)).unwrap();
        let patched = edge
            .patched(&EdgePatch {
                volume: Some(None),
                ..EdgePatch::default()
            })
            .unwrap();
        assert_eq!(patched.volume(), None);
        assert_eq!(edge.volume(), Some(500.0));
    }

    #[test]
    fn test_patch_validates_segments() {
        let edge = edge(EdgeDetails::default()).unwrap();
        let p = Point::new(1.0, 1.0);
        let result = edge.patched(&EdgePatch {
            segments: Some(vec![p, p]),
            ..EdgePatch::default()
        });
        assert!(matches!(result, Err(ModelError::InvalidSegments(_))));
    }

    #[test]
    fn test_format_caption() {
        assert_eq!(format_caption("", None), "");
        assert_eq!(format_caption("Return", Some(500.0)), "Return 500");
        assert_eq!(format_caption("", Some(1234567.891)), "1,234,567.89");
        assert_eq!(format_caption("", Some(-2500.5)), "-2,500.5");
        assert_eq!(format_caption("", Some(999.999)), "1,000");
    }

    #[test]
    fn test_flow_type_parse() {
        for flow in FlowType::ALL {
            assert_eq!(flow.as_str().parse::<FlowType>(), Ok(flow));
        }
        assert!("grey".parse::<FlowType>().is_err());
        assert_eq!(FlowType::Seepage.stroke_style(), StrokeStyle::Dashed);
    }
}
