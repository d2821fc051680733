//! Diamond shape definition.

use svg::node::element as svg_element;

use super::ShapeDefinition;
use crate::{
    apply_stroke,
    color::Color,
    draw::{StrokeDefinition, SvgNode},
    geometry::{AnchorSide, Bounds, Point, point_in_polygon},
};

/// Rhombus whose vertices are the side midpoints of the bounding box.
#[derive(Debug, Clone, Default)]
pub struct DiamondDefinition {
    fill_color: Option<Color>,
    stroke: StrokeDefinition,
}

impl DiamondDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertices clockwise from the top.
    pub fn vertices(bounds: Bounds) -> [Point; 4] {
        [
            bounds.anchor(AnchorSide::Top),
            bounds.anchor(AnchorSide::Right),
            bounds.anchor(AnchorSide::Bottom),
            bounds.anchor(AnchorSide::Left),
        ]
    }
}

impl ShapeDefinition for DiamondDefinition {
    fn contains(&self, bounds: Bounds, point: Point) -> bool {
        point_in_polygon(&Self::vertices(bounds), point)
    }

    fn render_to_svg(&self, bounds: Bounds) -> SvgNode {
        let points = Self::vertices(bounds)
            .iter()
            .map(|p| format!("{},{}", p.x(), p.y()))
            .collect::<Vec<_>>()
            .join(" ");

        let mut polygon = svg_element::Polygon::new()
            .set("points", points)
            .set("fill", "none");

        if let Some(fill_color) = self.fill_color {
            polygon = polygon
                .set("fill", fill_color.to_string())
                .set("fill-opacity", fill_color.alpha());
        }

        Box::new(apply_stroke!(polygon, &self.stroke))
    }

    fn clone_box(&self) -> Box<dyn ShapeDefinition> {
        Box::new(self.clone())
    }

    fn fill_color(&self) -> Option<Color> {
        self.fill_color
    }

    fn set_fill_color(&mut self, color: Option<Color>) {
        self.fill_color = color;
    }

    fn stroke(&self) -> &StrokeDefinition {
        &self.stroke
    }

    fn set_stroke(&mut self, stroke: StrokeDefinition) {
        self.stroke = stroke;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn bounds() -> Bounds {
        Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 40.0))
    }

    #[test]
    fn test_vertices_are_side_midpoints() {
        let vertices = DiamondDefinition::vertices(bounds());
        assert_eq!(vertices[0], Point::new(50.0, 0.0));
        assert_eq!(vertices[1], Point::new(100.0, 20.0));
        assert_eq!(vertices[2], Point::new(50.0, 40.0));
        assert_eq!(vertices[3], Point::new(0.0, 20.0));
    }

    #[test]
    fn test_contains_follows_slanted_edges() {
        let diamond = DiamondDefinition::new();
        assert!(diamond.contains(bounds(), Point::new(50.0, 20.0)));
        assert!(diamond.contains(bounds(), Point::new(20.0, 20.0)));
        // Above the top-left edge
        assert!(!diamond.contains(bounds(), Point::new(20.0, 5.0)));
        assert!(!diamond.contains(bounds(), Point::new(95.0, 35.0)));
    }

    #[test]
    fn test_render_polygon() {
        let svg = DiamondDefinition::new().render_to_svg(bounds()).to_string();
        assert!(svg.contains("<polygon"));
        assert!(svg.contains("50,0 100,20 50,40 0,20"));
    }
}
