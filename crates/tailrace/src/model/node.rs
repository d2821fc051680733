//! Diagram nodes: facility components such as sources, plants and dams.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use tailrace_core::{
    color::HexColor,
    draw::{
        DiamondDefinition, FontWeight, OvalDefinition, RectangleDefinition, ShapeDefinition,
        StrokeDefinition,
    },
    geometry::{Bounds, Point, Size},
};

use crate::{
    model::NodeId,
    validate::{
        FONT_SIZE_RANGE, NODE_HEIGHT_RANGE, NODE_WIDTH_RANGE, ValidationError, check_point,
        check_range, parse_color,
    },
};

pub const DEFAULT_NODE_WIDTH: f32 = 120.0;
pub const DEFAULT_NODE_HEIGHT: f32 = 40.0;
pub const DEFAULT_NODE_FONT_SIZE: f32 = 10.0;

/// The kind of facility component a node stands for.
///
/// The kind only selects the default shape and colors when a node is
/// created. Nothing else depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Source,
    Process,
    Storage,
    Consumption,
    Building,
    Treatment,
    Plant,
    Tsf,
    Reservoir,
    Loss,
    Discharge,
}

impl NodeKind {
    pub const ALL: [NodeKind; 11] = [
        Self::Source,
        Self::Process,
        Self::Storage,
        Self::Consumption,
        Self::Building,
        Self::Treatment,
        Self::Plant,
        Self::Tsf,
        Self::Reservoir,
        Self::Loss,
        Self::Discharge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Process => "process",
            Self::Storage => "storage",
            Self::Consumption => "consumption",
            Self::Building => "building",
            Self::Treatment => "treatment",
            Self::Plant => "plant",
            Self::Tsf => "tsf",
            Self::Reservoir => "reservoir",
            Self::Loss => "loss",
            Self::Discharge => "discharge",
        }
    }

    pub fn default_shape(self) -> NodeShape {
        match self {
            Self::Source | Self::Reservoir | Self::Discharge => NodeShape::Oval,
            Self::Treatment | Self::Loss => NodeShape::Diamond,
            _ => NodeShape::Rect,
        }
    }

    /// Default `(fill, outline)` colors.
    pub fn default_colors(self) -> (&'static str, &'static str) {
        match self {
            Self::Source => ("#e3f2fd", "#1565c0"),
            Self::Process => ("#fff3e0", "#ef6c00"),
            Self::Storage => ("#e8f5e9", "#2e7d32"),
            Self::Consumption => ("#fce4ec", "#ad1457"),
            Self::Building => ("#f3e5f5", "#6a1b9a"),
            Self::Treatment => ("#e0f7fa", "#00838f"),
            Self::Plant => ("#ede7f6", "#4527a0"),
            Self::Tsf => ("#efebe9", "#4e342e"),
            Self::Reservoir => ("#e1f5fe", "#0277bd"),
            Self::Loss => ("#ffebee", "#c62828"),
            Self::Discharge => ("#f1f8e9", "#558b2f"),
        }
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown node type `{s}`"))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outline drawn for a node, also used for hit-testing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    #[default]
    Rect,
    Oval,
    Diamond,
}

impl NodeShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Oval => "oval",
            Self::Diamond => "diamond",
        }
    }

    /// Creates the drawable definition for this shape.
    ///
    /// `rounded` only affects rectangles.
    pub fn definition(
        self,
        fill: &HexColor,
        stroke: StrokeDefinition,
        rounded: f32,
    ) -> Box<dyn ShapeDefinition> {
        let mut shape: Box<dyn ShapeDefinition> = match self {
            Self::Rect => {
                let mut rect = RectangleDefinition::new();
                // Rectangles always accept a radius
                let _ = rect.set_rounded(rounded);
                Box::new(rect)
            }
            Self::Oval => Box::new(OvalDefinition::new()),
            Self::Diamond => Box::new(DiamondDefinition::new()),
        };
        shape.set_fill_color(Some(fill.to_color()));
        shape.set_stroke(stroke);
        shape
    }
}

impl FromStr for NodeShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rect" => Ok(Self::Rect),
            "oval" => Ok(Self::Oval),
            "diamond" => Ok(Self::Diamond),
            _ => Err(format!(
                "invalid shape `{s}`, valid values: rect, oval, diamond"
            )),
        }
    }
}

/// A facility component placed on the canvas.
///
/// Position is the top-left corner of the node's bounding box. All fields
/// are validated on construction and on every patch.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    label: String,
    kind: NodeKind,
    shape: NodeShape,
    position: Point,
    size: Size,
    fill: HexColor,
    outline: HexColor,
    locked: bool,
    font_size: f32,
    font_weight: FontWeight,
}

impl Node {
    /// Builds a node from a dialog or file record.
    ///
    /// Fields the [`NodeSpec`] leaves out come from the node kind's
    /// defaults; the label defaults to the id.
    pub fn from_spec(spec: NodeSpec) -> Result<Self, ValidationError> {
        let id = NodeId::new(spec.id)?;
        let (default_fill, default_outline) = spec.kind.default_colors();
        let fill = parse_color("fill", spec.fill.as_deref().unwrap_or(default_fill))?;
        let outline = parse_color("outline", spec.outline.as_deref().unwrap_or(default_outline))?;
        let position = check_point("position", spec.position)?;
        let width = check_range(
            "width",
            spec.width.unwrap_or(DEFAULT_NODE_WIDTH),
            &NODE_WIDTH_RANGE,
        )?;
        let height = check_range(
            "height",
            spec.height.unwrap_or(DEFAULT_NODE_HEIGHT),
            &NODE_HEIGHT_RANGE,
        )?;
        let font_size = check_range(
            "font_size",
            spec.font_size.unwrap_or(DEFAULT_NODE_FONT_SIZE),
            &FONT_SIZE_RANGE,
        )?;

        Ok(Self {
            label: spec.label.unwrap_or_else(|| id.to_string()),
            id,
            kind: spec.kind,
            shape: spec.shape.unwrap_or_else(|| spec.kind.default_shape()),
            position,
            size: Size::new(width, height),
            fill,
            outline,
            locked: spec.locked,
            font_size,
            font_weight: spec.font_weight,
        })
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn shape(&self) -> NodeShape {
        self.shape
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(self.position, self.size)
    }

    pub fn fill(&self) -> &HexColor {
        &self.fill
    }

    pub fn outline(&self) -> &HexColor {
        &self.outline
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn font_weight(&self) -> FontWeight {
        self.font_weight
    }

    /// Returns `true` if `point` lies inside the node's outline.
    ///
    /// Rectangles test their bounding box, ovals the inscribed ellipse and
    /// diamonds the inscribed rhombus.
    pub fn contains(&self, point: Point) -> bool {
        let stroke = StrokeDefinition::default();
        self.shape
            .definition(&self.fill, stroke, 0.0)
            .contains(self.bounds(), point)
    }

    /// Returns a validated copy with `patch` applied. `self` is untouched
    /// when validation fails.
    pub fn patched(&self, patch: &NodePatch) -> Result<Self, ValidationError> {
        let mut node = self.clone();
        if let Some(label) = &patch.label {
            node.label = label.clone();
        }
        if let Some(kind) = patch.kind {
            node.kind = kind;
        }
        if let Some(shape) = patch.shape {
            node.shape = shape;
        }
        if let Some(position) = patch.position {
            node.position = check_point("position", position)?;
        }
        if let Some(width) = patch.width {
            node.size = Size::new(
                check_range("width", width, &NODE_WIDTH_RANGE)?,
                node.size.height(),
            );
        }
        if let Some(height) = patch.height {
            node.size = Size::new(
                node.size.width(),
                check_range("height", height, &NODE_HEIGHT_RANGE)?,
            );
        }
        if let Some(fill) = &patch.fill {
            node.fill = parse_color("fill", fill)?;
        }
        if let Some(outline) = &patch.outline {
            node.outline = parse_color("outline", outline)?;
        }
        if let Some(locked) = patch.locked {
            node.locked = locked;
        }
        if let Some(font_size) = patch.font_size {
            node.font_size = check_range("font_size", font_size, &FONT_SIZE_RANGE)?;
        }
        if let Some(font_weight) = patch.font_weight {
            node.font_weight = font_weight;
        }
        Ok(node)
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }
}

/// Field values supplied when creating a node.
///
/// ```
/// # use tailrace::model::{NodeKind, NodeSpec};
/// # use tailrace::geometry::Point;
/// let spec = NodeSpec::new("pit_1", NodeKind::Source, Point::new(100.0, 100.0))
///     .with_label("Pit dewatering")
///     .with_size(120.0, 40.0);
/// assert_eq!(spec.label.as_deref(), Some("Pit dewatering"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub id: String,
    pub label: Option<String>,
    pub kind: NodeKind,
    pub shape: Option<NodeShape>,
    pub position: Point,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub fill: Option<String>,
    pub outline: Option<String>,
    pub locked: bool,
    pub font_size: Option<f32>,
    pub font_weight: FontWeight,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, kind: NodeKind, position: Point) -> Self {
        Self {
            id: id.into(),
            label: None,
            kind,
            shape: None,
            position,
            width: None,
            height: None,
            fill: None,
            outline: None,
            locked: false,
            font_size: None,
            font_weight: FontWeight::Normal,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_shape(mut self, shape: NodeShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_colors(mut self, fill: impl Into<String>, outline: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self.outline = Some(outline.into());
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_font(mut self, size: f32, weight: FontWeight) -> Self {
        self.font_size = Some(size);
        self.font_weight = weight;
        self
    }
}

/// A partial update from the node properties dialog. `None` leaves a
/// field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub label: Option<String>,
    pub kind: Option<NodeKind>,
    pub shape: Option<NodeShape>,
    pub position: Option<Point>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub fill: Option<String>,
    pub outline: Option<String>,
    pub locked: Option<bool>,
    pub font_size: Option<f32>,
    pub font_weight: Option<FontWeight>,
}

impl NodePatch {
    /// Returns `true` if applying the patch can move or resize the node.
    pub fn changes_geometry(&self) -> bool {
        self.position.is_some() || self.width.is_some() || self.height.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> NodeSpec {
        NodeSpec::new("pit", NodeKind::Source, Point::new(100.0, 100.0))
    }

    #[test]
    fn test_from_spec_applies_kind_defaults() {
        let node = Node::from_spec(spec()).unwrap();
        assert_eq!(node.label(), "pit");
        assert_eq!(node.shape(), NodeShape::Oval);
        assert_eq!(node.fill().as_str(), "#e3f2fd");
        assert_eq!(node.outline().as_str(), "#1565c0");
        assert_eq!(node.size(), Size::new(120.0, 40.0));
        assert_eq!(node.font_size(), 10.0);
        assert_eq!(node.font_weight(), FontWeight::Normal);
        assert!(!node.locked());
    }

    #[test]
    fn test_from_spec_explicit_values_win() {
        let node = Node::from_spec(
            spec()
                .with_shape(NodeShape::Rect)
                .with_colors("#fff", "#000")
                .with_size(200.0, 60.0),
        )
        .unwrap();
        assert_eq!(node.shape(), NodeShape::Rect);
        assert_eq!(node.fill().as_str(), "#fff");
        assert_eq!(node.bounds().max_x(), 300.0);
    }

    #[test]
    fn test_from_spec_rejects_invalid_fields() {
        assert!(matches!(
            Node::from_spec(NodeSpec::new("", NodeKind::Plant, Point::default())),
            Err(ValidationError::Id(_))
        ));
        assert!(Node::from_spec(spec().with_size(39.0, 40.0)).is_err());
        assert!(Node::from_spec(spec().with_size(120.0, 201.0)).is_err());
        assert!(Node::from_spec(spec().with_colors("blue", "#000")).is_err());
        assert!(Node::from_spec(spec().with_font(3.5, FontWeight::Bold)).is_err());
        assert!(
            Node::from_spec(NodeSpec::new("x", NodeKind::Plant, Point::new(f32::NAN, 0.0)))
                .is_err()
        );
    }

    #[test]
    fn test_patched_leaves_original_on_error() {
        let node = Node::from_spec(spec()).unwrap();
        let patch = NodePatch {
            label: Some("Renamed".to_string()),
            width: Some(1000.0),
            ..NodePatch::default()
        };
        assert!(node.patched(&patch).is_err());
        assert_eq!(node.label(), "pit");
    }

    #[test]
    fn test_patched_applies_every_field() {
        let node = Node::from_spec(spec()).unwrap();
        let patch = NodePatch {
            label: Some("Main pit".to_string()),
            shape: Some(NodeShape::Diamond),
            position: Some(Point::new(10.0, 20.0)),
            height: Some(80.0),
            locked: Some(true),
            font_weight: Some(FontWeight::Bold),
            ..NodePatch::default()
        };
        assert!(patch.changes_geometry());
        let patched = node.patched(&patch).unwrap();
        assert_eq!(patched.label(), "Main pit");
        assert_eq!(patched.shape(), NodeShape::Diamond);
        assert_eq!(patched.position(), Point::new(10.0, 20.0));
        assert_eq!(patched.size(), Size::new(120.0, 80.0));
        assert!(patched.locked());
        assert_eq!(patched.font_weight(), FontWeight::Bold);
        // Kind changes never restyle
        assert_eq!(patched.fill(), node.fill());
    }

    #[test]
    fn test_contains_follows_shape() {
        let corner = Point::new(101.0, 101.0);
        let rect = Node::from_spec(spec().with_shape(NodeShape::Rect)).unwrap();
        let oval = Node::from_spec(spec().with_shape(NodeShape::Oval)).unwrap();
        assert!(rect.contains(corner));
        assert!(!oval.contains(corner));
        assert!(oval.contains(Point::new(160.0, 120.0)));
    }

    #[test]
    fn test_node_kind_round_trips_through_str() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.as_str().parse::<NodeKind>(), Ok(kind));
        }
        assert!("lake".parse::<NodeKind>().is_err());
    }

    #[test]
    fn test_node_shape_parse() {
        assert_eq!("diamond".parse::<NodeShape>(), Ok(NodeShape::Diamond));
        assert!("hexagon".parse::<NodeShape>().is_err());
    }
}
