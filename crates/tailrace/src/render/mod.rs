//! Turns a [`Graph`] into a [`Scene`] under a zoom transform.
//!
//! Every coordinate the renderer emits is a canvas coordinate multiplied by
//! the frame's zoom. The scene is rebuilt from the model on every frame, so
//! its [`RenderIndex`] never outlives the graph it was drawn from.

mod scene;
mod sink;
mod viewport;

pub use scene::{Handle, Primitive, RenderIndex, Scene, SceneItem};
pub use sink::{SinkConfig, SinkPolicy};
pub use viewport::Viewport;

use log::debug;
use serde::Deserialize;

use tailrace_core::{
    color::Color,
    draw::{
        ArrowheadDefinition, RectangleDefinition, RenderLayer, ShapeDefinition, StrokeDefinition,
        StrokeJoin, TextDefinition,
    },
    geometry::{Bounds, Insets, Point, longest_segment},
};

use crate::{
    error::TailraceError,
    model::{Edge, ElementRef, Graph, Node, Zone},
    selection::Selection,
};

/// Renderer settings.
///
/// Lengths are in canvas units at zoom 1.0. Colors are CSS color strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    padding: f32,
    min_zoom: f32,
    max_zoom: f32,
    zoom_step: f32,
    edge_width: f32,
    node_stroke_width: f32,
    corner_radius: f32,
    arrow_length: f32,
    arrow_half_width: f32,
    junction_radius: f32,
    zone_label_font_size: f32,
    font_family: String,
    selection_color: String,
    label_background: Option<String>,
    background_color: Option<String>,
}

impl RenderConfig {
    /// Margin around the content, before zoom.
    pub fn padding(&self) -> f32 {
        self.padding
    }

    pub fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    /// Factor applied per zoom-in step; zooming out divides by it.
    pub fn zoom_step(&self) -> f32 {
        self.zoom_step
    }

    pub fn edge_width(&self) -> f32 {
        self.edge_width
    }

    pub fn node_stroke_width(&self) -> f32 {
        self.node_stroke_width
    }

    pub fn corner_radius(&self) -> f32 {
        self.corner_radius
    }

    pub fn arrowhead(&self) -> ArrowheadDefinition {
        ArrowheadDefinition::new(self.arrow_length, self.arrow_half_width)
    }

    pub fn junction_radius(&self) -> f32 {
        self.junction_radius
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Clamps `zoom` to `[min_zoom, max_zoom]`. Non-finite values become 1.0.
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        let zoom = if zoom.is_finite() { zoom } else { 1.0 };
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    /// Returns the parsed highlight [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured string is not a valid color.
    pub fn selection_color(&self) -> Result<Color, String> {
        Color::new(&self.selection_color)
            .map_err(|err| format!("Invalid selection color in config: {err}"))
    }

    /// Returns the parsed edge label background, or `None` for transparent labels.
    pub fn label_background(&self) -> Result<Option<Color>, String> {
        self.label_background
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid label background in config: {err}"))
    }

    /// Returns the parsed document background, or `None` if no color is configured.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            padding: 50.0,
            min_zoom: 0.25,
            max_zoom: 4.0,
            zoom_step: 1.2,
            edge_width: 2.0,
            node_stroke_width: 1.5,
            corner_radius: 4.0,
            arrow_length: 10.0,
            arrow_half_width: 5.0,
            junction_radius: 4.0,
            zone_label_font_size: 9.0,
            font_family: "sans-serif".to_string(),
            selection_color: "#ff6f00".to_string(),
            label_background: Some("#ffffff".to_string()),
            background_color: None,
        }
    }
}

/// Per-frame inputs that are not part of the model.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    zoom: f32,
    selection: Option<&'a Selection>,
    preview: Option<&'a [Point]>,
}

impl<'a> FrameContext<'a> {
    pub fn new(zoom: f32) -> Self {
        Self {
            zoom,
            selection: None,
            preview: None,
        }
    }

    pub fn with_selection(mut self, selection: &'a Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// In-progress drawing path, in canvas coordinates.
    pub fn with_preview(mut self, preview: &'a [Point]) -> Self {
        self.preview = Some(preview);
        self
    }
}

impl Default for FrameContext<'_> {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Draws graphs into scenes.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: RenderConfig,
    sink: SinkPolicy,
    selection_color: Color,
    label_background: Option<Color>,
    background: Option<Color>,
}

impl Renderer {
    /// Creates a renderer, resolving the configured colors once.
    ///
    /// # Errors
    ///
    /// Returns [`TailraceError::Config`] if a configured color is invalid or
    /// the zoom range is empty.
    pub fn new(config: RenderConfig, sink: SinkPolicy) -> Result<Self, TailraceError> {
        if !(config.min_zoom > 0.0 && config.min_zoom <= config.max_zoom) {
            return Err(TailraceError::Config(format!(
                "invalid zoom range {}..={}",
                config.min_zoom, config.max_zoom
            )));
        }
        let selection_color = config.selection_color().map_err(TailraceError::Config)?;
        let label_background = config.label_background().map_err(TailraceError::Config)?;
        let background = config.background_color().map_err(TailraceError::Config)?;
        Ok(Self {
            config,
            sink,
            selection_color,
            label_background,
            background,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn sink_policy(&self) -> &SinkPolicy {
        &self.sink
    }

    /// Renders `graph` with zones, edges, nodes and overlays.
    pub fn render(&self, graph: &Graph, frame: &FrameContext<'_>) -> Scene {
        let zoom = self.config.clamp_zoom(frame.zoom);
        let mut scene = Scene::new(zoom, self.background);

        for (index, zone) in graph.zones().iter().enumerate() {
            self.draw_zone(&mut scene, index, zone, zoom);
        }
        for edge in graph.edges() {
            self.draw_edge(&mut scene, graph, edge, zoom);
        }
        for node in graph.nodes() {
            self.draw_node(&mut scene, node, zoom);
        }
        if let Some(selection) = frame.selection {
            self.draw_selection(&mut scene, graph, selection, zoom);
        }
        if let Some(preview) = frame.preview {
            self.draw_preview(&mut scene, preview, zoom);
        }

        scene.set_scroll_region(self.scroll_region(graph, zoom));
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            items = scene.items().len(),
            zoom;
            "Rendered scene"
        );
        scene
    }

    /// Content bounds plus padding, zoomed. An empty graph yields the
    /// padding-only region around the origin.
    pub fn scroll_region(&self, graph: &Graph, zoom: f32) -> Bounds {
        let content = graph
            .zones()
            .iter()
            .map(Zone::bounds)
            .fold(graph.bounds(), |acc, zone| match acc {
                Some(bounds) => Some(bounds.merge(&zone)),
                None => Some(zone),
            })
            .unwrap_or_default();
        content
            .scale(zoom)
            .add_padding(Insets::uniform(self.config.padding * zoom))
    }

    fn draw_zone(&self, scene: &mut Scene, index: usize, zone: &Zone, zoom: f32) {
        let bounds = zone.bounds().scale(zoom);
        let color = zone.color().to_color();
        let mut rect = RectangleDefinition::new();
        rect.set_fill_color(Some(color.with_alpha(0.5)));
        rect.set_stroke(StrokeDefinition::solid(color, zoom));

        let owner = ElementRef::Zone(index);
        scene.push(
            RenderLayer::Zone,
            Some(owner.clone()),
            Primitive::Shape {
                definition: Box::new(rect),
                bounds,
            },
        );
        if !zone.name().is_empty() {
            let font_size = self.config.zone_label_font_size * zoom;
            scene.push(
                RenderLayer::Text,
                Some(owner),
                Primitive::Label {
                    position: Point::new(bounds.center().x(), bounds.min_y() + font_size),
                    text: zone.name().to_string(),
                    style: self.text_style(font_size),
                },
            );
        }
    }

    fn draw_edge(&self, scene: &mut Scene, graph: &Graph, edge: &Edge, zoom: f32) {
        let owner = ElementRef::Edge(edge.id().clone());
        let color = edge.color().to_color();
        let points: Vec<Point> = graph
            .route(edge)
            .into_iter()
            .map(|point| point.scale(zoom))
            .collect();

        let stroke = StrokeDefinition::new(color, self.config.edge_width * zoom)
            .with_style(edge.flow_type().stroke_style())
            .with_join(StrokeJoin::Round);
        scene.push(
            RenderLayer::Edge,
            Some(owner.clone()),
            Primitive::Polyline {
                points: points.clone(),
                stroke,
            },
        );

        if let Some(position) = edge.junction_pos() {
            scene.push(
                RenderLayer::Junction,
                Some(owner.clone()),
                Primitive::Dot {
                    center: position.scale(zoom),
                    radius: self.config.junction_radius * zoom,
                    color,
                },
            );
        }

        let destination = edge
            .to()
            .node()
            .and_then(|id| graph.node(id.as_str()))
            .map(Node::label);
        let direction = self.sink.arrow_direction(edge.arrow_direction(), destination);
        let head = self.config.arrowhead().scaled(zoom);

        let mut tips = vec![arrowhead_at_end(head, points.iter().rev())];
        if direction.has_start_marker() {
            tips.push(arrowhead_at_end(head, points.iter()));
        }
        for triangle in tips.into_iter().flatten() {
            scene.push(
                RenderLayer::Arrow,
                Some(owner.clone()),
                Primitive::Arrowhead {
                    points: triangle,
                    color,
                },
            );
        }

        let caption = edge.caption();
        if caption.is_empty() {
            return;
        }
        if let Some(segment) = longest_segment(&points) {
            let style = self
                .text_style(edge.label_font_size() * zoom)
                .with_background_color(self.label_background)
                .with_padding(Insets::uniform(2.0 * zoom));
            scene.push(
                RenderLayer::Text,
                Some(owner),
                Primitive::Label {
                    position: segment.midpoint(),
                    text: caption,
                    style,
                },
            );
        }
    }

    fn draw_node(&self, scene: &mut Scene, node: &Node, zoom: f32) {
        let owner = ElementRef::Node(node.id().clone());
        let bounds = node.bounds().scale(zoom);
        let stroke = StrokeDefinition::solid(
            node.outline().to_color(),
            self.config.node_stroke_width * zoom,
        );
        let definition = node
            .shape()
            .definition(node.fill(), stroke, self.config.corner_radius * zoom);

        scene.push(
            RenderLayer::Node,
            Some(owner.clone()),
            Primitive::Shape { definition, bounds },
        );
        scene.push(
            RenderLayer::Text,
            Some(owner),
            Primitive::Label {
                position: bounds.center(),
                text: node.label().to_string(),
                style: self
                    .text_style(node.font_size() * zoom)
                    .with_font_weight(node.font_weight()),
            },
        );
    }

    fn draw_selection(&self, scene: &mut Scene, graph: &Graph, selection: &Selection, zoom: f32) {
        let mut edges: Vec<&Edge> = selection
            .edge_set()
            .iter()
            .filter_map(|id| graph.edge(id.as_str()))
            .collect();

        match selection.current() {
            Some(ElementRef::Node(id)) => {
                if let Some(node) = graph.node(id.as_str()) {
                    let bounds = node
                        .bounds()
                        .scale(zoom)
                        .add_padding(Insets::uniform(3.0 * zoom));
                    let mut outline = RectangleDefinition::new();
                    outline.set_stroke(
                        StrokeDefinition::dashed(self.selection_color, 2.0 * zoom),
                    );
                    scene.push(
                        RenderLayer::Overlay,
                        Some(ElementRef::Node(id.clone())),
                        Primitive::Shape {
                            definition: Box::new(outline),
                            bounds,
                        },
                    );
                }
            }
            Some(ElementRef::Edge(id)) => {
                if let Some(edge) = graph.edge(id.as_str()) {
                    if !selection.edge_set().contains(id) {
                        edges.push(edge);
                    }
                }
            }
            Some(ElementRef::Zone(_)) | None => {}
        }

        let highlight = StrokeDefinition::new(
            self.selection_color.with_alpha(0.4),
            (self.config.edge_width + 4.0) * zoom,
        );
        for edge in edges {
            let points = graph
                .route(edge)
                .into_iter()
                .map(|point| point.scale(zoom))
                .collect();
            scene.push(
                RenderLayer::Overlay,
                Some(ElementRef::Edge(edge.id().clone())),
                Primitive::Polyline {
                    points,
                    stroke: highlight.clone(),
                },
            );
        }
    }

    fn draw_preview(&self, scene: &mut Scene, preview: &[Point], zoom: f32) {
        if preview.len() < 2 {
            return;
        }
        scene.push(
            RenderLayer::Overlay,
            None,
            Primitive::Polyline {
                points: preview.iter().map(|point| point.scale(zoom)).collect(),
                stroke: StrokeDefinition::dashed(self.selection_color, self.config.edge_width * zoom),
            },
        );
    }

    fn text_style(&self, font_size: f32) -> TextDefinition {
        TextDefinition::new()
            .with_font_family(&self.config.font_family)
            .with_font_size(font_size)
    }
}

/// Arrowhead at the first point of `points`, aimed along the line from the
/// nearest distinct point before it.
fn arrowhead_at_end<'a>(
    head: ArrowheadDefinition,
    mut points: impl Iterator<Item = &'a Point>,
) -> Option<[Point; 3]> {
    let tip = *points.next()?;
    let from = points.find(|point| **point != tip)?;
    head.triangle(tip, *from)
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;
    use crate::model::{
        EdgeDetails, EdgeId, EdgeSpec, EdgeTarget, FlowType, Junction, NodeId, NodeKind,
        NodeSpec,
    };

    fn renderer() -> Renderer {
        Renderer::new(
            RenderConfig::default(),
            SinkPolicy::from(&SinkConfig::default()),
        )
        .unwrap()
    }

    fn graph(destination_label: &str, bidirectional: bool) -> (Graph, EdgeId) {
        let mut graph = Graph::new();
        graph
            .add_node(NodeSpec::new("a", NodeKind::Source, Point::new(0.0, 0.0)))
            .unwrap();
        graph
            .add_node(
                NodeSpec::new("b", NodeKind::Storage, Point::new(300.0, 0.0))
                    .with_label(destination_label),
            )
            .unwrap();
        let id = graph
            .add_edge(EdgeSpec {
                id: None,
                from: NodeId::new("a").unwrap(),
                to: EdgeTarget::Node(NodeId::new("b").unwrap()),
                segments: vec![Point::new(120.0, 20.0), Point::new(300.0, 20.0)],
                details: EdgeDetails::new(FlowType::Clean)
                    .with_volume(500.0)
                    .with_bidirectional(bidirectional),
            })
            .unwrap();
        (graph, id)
    }

    fn count_arrowheads(scene: &Scene, edge: &EdgeId) -> usize {
        scene
            .items_for(&ElementRef::Edge(edge.clone()))
            .filter(|item| matches!(item.primitive(), Primitive::Arrowhead { .. }))
            .count()
    }

    #[test]
    fn test_node_origin_scales_with_zoom() {
        let (graph, _) = graph("Plant", false);
        let scene = renderer().render(&graph, &FrameContext::new(2.0));
        let bounds = scene
            .shape_bounds(&ElementRef::Node(NodeId::new("b").unwrap()))
            .unwrap();
        assert_eq!(bounds.min_point(), Point::new(600.0, 0.0));
        assert_eq!(bounds.width(), 240.0);
        assert_eq!(bounds.height(), 80.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let (graph, _) = graph("Plant", false);
        let renderer = renderer();
        assert_eq!(renderer.render(&graph, &FrameContext::new(10.0)).zoom(), 4.0);
        assert_eq!(renderer.render(&graph, &FrameContext::new(0.01)).zoom(), 0.25);
        assert_eq!(renderer.render(&graph, &FrameContext::new(f32::NAN)).zoom(), 1.0);
    }

    #[test]
    fn test_forward_edge_has_one_arrowhead_at_destination() {
        let (graph, id) = graph("Plant", false);
        let scene = renderer().render(&graph, &FrameContext::default());
        assert_eq!(count_arrowheads(&scene, &id), 1);
        let tip = scene
            .items_for(&ElementRef::Edge(id))
            .find_map(|item| match item.primitive() {
                Primitive::Arrowhead { points, .. } => Some(points[0]),
                _ => None,
            })
            .unwrap();
        assert_eq!(tip, Point::new(300.0, 20.0));
    }

    #[test]
    fn test_bidirectional_edge_has_two_arrowheads() {
        let (graph, id) = graph("Plant", true);
        let scene = renderer().render(&graph, &FrameContext::default());
        assert_eq!(count_arrowheads(&scene, &id), 2);
    }

    #[test]
    fn test_edge_bends_are_rounded() {
        let (graph, id) = graph("Plant", false);
        let scene = renderer().render(&graph, &FrameContext::default());
        let stroke = scene
            .items_for(&ElementRef::Edge(id))
            .find_map(|item| match item.primitive() {
                Primitive::Polyline { stroke, .. } => Some(stroke.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(stroke.join(), StrokeJoin::Round);
        assert_eq!(stroke.style(), FlowType::Clean.stroke_style());
    }

    #[test]
    fn test_sink_destination_draws_incoming_arrowhead_only() {
        let (graph, id) = graph("North Dam", true);
        let scene = renderer().render(&graph, &FrameContext::default());
        assert_eq!(count_arrowheads(&scene, &id), 1);

        let lenient = Renderer::new(RenderConfig::default(), SinkPolicy::disabled()).unwrap();
        let scene = lenient.render(&graph, &FrameContext::default());
        assert_eq!(count_arrowheads(&scene, &id), 2);
    }

    #[test]
    fn test_caption_at_longest_segment_midpoint() {
        let (graph, id) = graph("Plant", false);
        let scene = renderer().render(&graph, &FrameContext::default());
        let (position, text, style) = scene
            .items_for(&ElementRef::Edge(id))
            .find_map(|item| match item.primitive() {
                Primitive::Label {
                    position,
                    text,
                    style,
                } => Some((*position, text.clone(), style.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(position, Point::new(210.0, 20.0));
        assert_eq!(text, "500");
        assert!(approx_eq!(f32, style.font_size(), 8.0));
    }

    #[test]
    fn test_junction_dot_at_scaled_position() {
        let (mut graph, host) = graph("Plant", false);
        graph
            .add_node(NodeSpec::new("c", NodeKind::Process, Point::new(150.0, 200.0)))
            .unwrap();
        let junction = graph
            .add_edge(EdgeSpec {
                id: None,
                from: NodeId::new("c").unwrap(),
                to: EdgeTarget::Junction(Junction::on(&host, Point::new(210.0, 20.0))),
                segments: vec![Point::new(210.0, 200.0), Point::new(210.0, 20.0)],
                details: EdgeDetails::new(FlowType::Dirty),
            })
            .unwrap();

        let scene = renderer().render(&graph, &FrameContext::new(2.0));
        let dot = scene
            .items_for(&ElementRef::Edge(junction))
            .find_map(|item| match item.primitive() {
                Primitive::Dot { center, radius, .. } => Some((*center, *radius)),
                _ => None,
            })
            .unwrap();
        assert_eq!(dot, (Point::new(420.0, 40.0), 8.0));
    }

    #[test]
    fn test_empty_graph_scroll_region_is_padding_around_origin() {
        let renderer = renderer();
        let scene = renderer.render(&Graph::new(), &FrameContext::new(2.0));
        let region = scene.scroll_region();
        assert_eq!(region.min_point(), Point::new(-100.0, -100.0));
        assert_eq!(region.max_point(), Point::new(100.0, 100.0));
        assert!(scene.items().is_empty());
    }

    #[test]
    fn test_scroll_region_covers_nodes_and_zones() {
        let (mut graph, _) = graph("Plant", false);
        graph.add_zone(
            Zone::new(
                "North",
                Point::new(-100.0, -100.0),
                tailrace_core::geometry::Size::new(50.0, 50.0),
                "#f5f5f5",
            )
            .unwrap(),
        );
        let region = renderer().scroll_region(&graph, 1.0);
        assert_eq!(region.min_point(), Point::new(-150.0, -150.0));
        assert_eq!(region.max_point(), Point::new(470.0, 90.0));
    }

    #[test]
    fn test_selection_and_preview_overlays() {
        let (graph, id) = graph("Plant", false);
        let mut selection = Selection::new();
        selection.select(ElementRef::Node(NodeId::new("a").unwrap()));
        selection.toggle_edge(id.clone());
        let preview = [Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        let frame = FrameContext::new(1.0)
            .with_selection(&selection)
            .with_preview(&preview);

        let scene = renderer().render(&graph, &frame);
        let overlays: Vec<&SceneItem> = scene
            .items()
            .iter()
            .filter(|item| item.layer() == RenderLayer::Overlay)
            .collect();
        assert_eq!(overlays.len(), 3);
        assert!(overlays.iter().any(|item| item.owner().is_none()));
    }

    #[test]
    fn test_invalid_config_color_is_rejected() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"background_color": "not-a-color"}"#).unwrap();
        let err = Renderer::new(config, SinkPolicy::disabled()).unwrap_err();
        assert!(matches!(err, TailraceError::Config(_)));
    }

    #[test]
    fn test_inverted_zoom_range_is_rejected() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"min_zoom": 3.0, "max_zoom": 2.0}"#).unwrap();
        assert!(Renderer::new(config, SinkPolicy::disabled()).is_err());
    }

    #[test]
    fn test_svg_export() {
        let (graph, _) = graph("Plant", false);
        let svg = renderer().render(&graph, &FrameContext::default()).to_svg();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("viewBox=\"-50 -50 520 140\""));
        assert!(svg.contains("<polygon"));
    }
}
