//! Render output: an ordered list of primitives plus a handle index.

use indexmap::IndexMap;
use svg::{Document, node::element as svg_element};

use tailrace_core::{
    color::Color,
    draw::{
        LayeredOutput, RenderLayer, ShapeDefinition, StrokeDefinition, SvgNode, Text,
        TextDefinition, render_arrowhead, render_polyline,
    },
    geometry::{Bounds, Point},
};

use crate::model::ElementRef;

/// Identifies one item of a [`Scene`]. Handles are only meaningful for the
/// scene that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Something to draw, in zoomed canvas coordinates.
#[derive(Debug, Clone)]
pub enum Primitive {
    /// A node outline, zone or selection box.
    Shape {
        definition: Box<dyn ShapeDefinition>,
        bounds: Bounds,
    },
    Polyline {
        points: Vec<Point>,
        stroke: StrokeDefinition,
    },
    /// A filled triangle `[tip, left base, right base]`.
    Arrowhead { points: [Point; 3], color: Color },
    /// A filled circle, used for junction markers.
    Dot {
        center: Point,
        radius: f32,
        color: Color,
    },
    /// Text centered on `position`.
    Label {
        position: Point,
        text: String,
        style: TextDefinition,
    },
}

impl Primitive {
    fn render(&self, layer: RenderLayer, output: &mut LayeredOutput) {
        match self {
            Self::Shape { definition, bounds } => {
                output.add_to_layer(layer, definition.render_to_svg(*bounds));
            }
            Self::Polyline { points, stroke } => {
                output.add_to_layer(layer, render_polyline(points, stroke));
            }
            Self::Arrowhead { points, color } => {
                output.add_to_layer(layer, render_arrowhead(points, *color));
            }
            Self::Dot {
                center,
                radius,
                color,
            } => {
                let circle = svg_element::Circle::new()
                    .set("cx", center.x())
                    .set("cy", center.y())
                    .set("r", *radius)
                    .set("fill", color.to_string())
                    .set("fill-opacity", color.alpha());
                output.add_to_layer(layer, Box::new(circle) as SvgNode);
            }
            Self::Label {
                position,
                text,
                style,
            } => output.merge(Text::new(style, text).render_to_layers(*position)),
        }
    }
}

/// One entry of a scene.
#[derive(Debug, Clone)]
pub struct SceneItem {
    handle: Handle,
    layer: RenderLayer,
    owner: Option<ElementRef>,
    primitive: Primitive,
}

impl SceneItem {
    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn layer(&self) -> RenderLayer {
        self.layer
    }

    /// The element this item was drawn for. `None` for the drawing preview.
    pub fn owner(&self) -> Option<&ElementRef> {
        self.owner.as_ref()
    }

    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }
}

/// Maps scene handles back to diagram elements.
#[derive(Debug, Clone, Default)]
pub struct RenderIndex {
    owners: IndexMap<Handle, ElementRef>,
    handles: IndexMap<ElementRef, Vec<Handle>>,
}

impl RenderIndex {
    fn insert(&mut self, handle: Handle, owner: ElementRef) {
        self.handles.entry(owner.clone()).or_default().push(handle);
        self.owners.insert(handle, owner);
    }

    pub fn element(&self, handle: Handle) -> Option<&ElementRef> {
        self.owners.get(&handle)
    }

    /// Handles drawn for `element`, in drawing order.
    pub fn handles(&self, element: &ElementRef) -> &[Handle] {
        self.handles.get(element).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// A rendered frame.
#[derive(Debug, Clone)]
pub struct Scene {
    items: Vec<SceneItem>,
    index: RenderIndex,
    scroll_region: Bounds,
    zoom: f32,
    background: Option<Color>,
}

impl Scene {
    pub(crate) fn new(zoom: f32, background: Option<Color>) -> Self {
        Self {
            items: Vec::new(),
            index: RenderIndex::default(),
            scroll_region: Bounds::default(),
            zoom,
            background,
        }
    }

    pub(crate) fn push(
        &mut self,
        layer: RenderLayer,
        owner: Option<ElementRef>,
        primitive: Primitive,
    ) -> Handle {
        let handle = Handle(self.items.len());
        if let Some(owner) = &owner {
            self.index.insert(handle, owner.clone());
        }
        self.items.push(SceneItem {
            handle,
            layer,
            owner,
            primitive,
        });
        handle
    }

    pub(crate) fn set_scroll_region(&mut self, region: Bounds) {
        self.scroll_region = region;
    }

    /// Items in the order they were drawn.
    pub fn items(&self) -> &[SceneItem] {
        &self.items
    }

    pub fn item(&self, handle: Handle) -> Option<&SceneItem> {
        self.items.get(handle.0)
    }

    pub fn index(&self) -> &RenderIndex {
        &self.index
    }

    /// Items drawn for `element`.
    pub fn items_for<'a>(&'a self, element: &ElementRef) -> impl Iterator<Item = &'a SceneItem> {
        self.index
            .handles(element)
            .iter()
            .filter_map(|handle| self.item(*handle))
    }

    /// Bounds of the first shape drawn for `element`.
    pub fn shape_bounds(&self, element: &ElementRef) -> Option<Bounds> {
        self.items_for(element)
            .find_map(|item| match item.primitive() {
                Primitive::Shape { bounds, .. } => Some(*bounds),
                _ => None,
            })
    }

    /// Extent of the drawing in zoomed coordinates, padding included.
    pub fn scroll_region(&self) -> Bounds {
        self.scroll_region
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Builds an SVG document covering the scroll region, one group per
    /// render layer.
    pub fn to_document(&self) -> Document {
        let region = self.scroll_region;
        let mut doc = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    region.min_x(),
                    region.min_y(),
                    region.width(),
                    region.height()
                ),
            )
            .set("width", region.width())
            .set("height", region.height());

        if let Some(color) = self.background {
            let background = svg_element::Rectangle::new()
                .set("x", region.min_x())
                .set("y", region.min_y())
                .set("width", region.width())
                .set("height", region.height())
                .set("fill", color.to_string())
                .set("fill-opacity", color.alpha());
            doc = doc.add(background);
        }

        let mut output = LayeredOutput::new();
        for item in &self.items {
            item.primitive.render(item.layer, &mut output);
        }
        for group in output.render() {
            doc = doc.add(group);
        }
        doc
    }

    pub fn to_svg(&self) -> String {
        self.to_document().to_string()
    }
}

#[cfg(test)]
mod tests {
    use tailrace_core::draw::RectangleDefinition;
    use tailrace_core::geometry::Size;

    use super::*;
    use crate::model::{EdgeId, NodeId};

    fn scene() -> Scene {
        let mut scene = Scene::new(1.0, None);
        let node = ElementRef::Node(NodeId::new("a").unwrap());
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(120.0, 40.0));
        scene.push(
            RenderLayer::Node,
            Some(node.clone()),
            Primitive::Shape {
                definition: Box::new(RectangleDefinition::new()),
                bounds,
            },
        );
        scene.push(
            RenderLayer::Text,
            Some(node),
            Primitive::Label {
                position: bounds.center(),
                text: "Pit".to_string(),
                style: TextDefinition::new(),
            },
        );
        scene.push(
            RenderLayer::Edge,
            Some(ElementRef::Edge(EdgeId::new("e").unwrap())),
            Primitive::Polyline {
                points: vec![Point::new(0.0, 0.0), Point::new(50.0, 0.0)],
                stroke: StrokeDefinition::default(),
            },
        );
        scene.push(
            RenderLayer::Overlay,
            None,
            Primitive::Polyline {
                points: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
                stroke: StrokeDefinition::default(),
            },
        );
        scene.set_scroll_region(Bounds::new_from_top_left(
            Point::new(-50.0, -50.0),
            Size::new(230.0, 150.0),
        ));
        scene
    }

    #[test]
    fn test_render_index_maps_handles_to_owners() {
        let scene = scene();
        let node = ElementRef::Node(NodeId::new("a").unwrap());
        assert_eq!(scene.index().len(), 3);
        assert_eq!(scene.index().handles(&node), &[Handle(0), Handle(1)]);
        assert_eq!(scene.index().element(Handle(2)), Some(&ElementRef::Edge(EdgeId::new("e").unwrap())));
        assert_eq!(scene.index().element(Handle(3)), None);
        assert!(scene.item(Handle(3)).unwrap().owner().is_none());
    }

    #[test]
    fn test_shape_bounds() {
        let scene = scene();
        let node = ElementRef::Node(NodeId::new("a").unwrap());
        assert_eq!(scene.shape_bounds(&node).unwrap().min_point(), Point::new(10.0, 10.0));
        assert!(
            scene
                .shape_bounds(&ElementRef::Node(NodeId::new("zz").unwrap()))
                .is_none()
        );
    }

    #[test]
    fn test_to_svg_orders_layers() {
        let svg = scene().to_svg();
        assert!(svg.contains("viewBox=\"-50 -50 230 150\""));
        let edge = svg.find("data-layer=\"edge\"").unwrap();
        let node = svg.find("data-layer=\"node\"").unwrap();
        let text = svg.find("data-layer=\"text\"").unwrap();
        let overlay = svg.find("data-layer=\"overlay\"").unwrap();
        assert!(edge < node && node < text && text < overlay);
        assert!(svg.contains("Pit"));
    }

    #[test]
    fn test_background_rect() {
        let mut scene = Scene::new(1.0, Some(Color::new("#fafafa").unwrap()));
        scene.set_scroll_region(Bounds::new_from_top_left(Point::default(), Size::new(10.0, 10.0)));
        assert!(scene.to_svg().contains("<rect"));
    }
}
