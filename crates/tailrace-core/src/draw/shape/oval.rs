//! Oval shape definition.

use svg::node::element as svg_element;

use super::ShapeDefinition;
use crate::{
    apply_stroke,
    color::Color,
    draw::{StrokeDefinition, SvgNode},
    geometry::{Bounds, Point},
};

/// Ellipse inscribed in the node's bounding box.
#[derive(Debug, Clone, Default)]
pub struct OvalDefinition {
    fill_color: Option<Color>,
    stroke: StrokeDefinition,
}

impl OvalDefinition {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShapeDefinition for OvalDefinition {
    /// Exact ellipse test: `(dx/rx)^2 + (dy/ry)^2 <= 1`.
    fn contains(&self, bounds: Bounds, point: Point) -> bool {
        let rx = bounds.width() / 2.0;
        let ry = bounds.height() / 2.0;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let offset = point.sub_point(bounds.center());
        let nx = offset.x() / rx;
        let ny = offset.y() / ry;
        nx * nx + ny * ny <= 1.0
    }

    fn render_to_svg(&self, bounds: Bounds) -> SvgNode {
        let center = bounds.center();
        let mut ellipse = svg_element::Ellipse::new()
            .set("cx", center.x())
            .set("cy", center.y())
            .set("rx", bounds.width() / 2.0)
            .set("ry", bounds.height() / 2.0)
            .set("fill", "none");

        if let Some(fill_color) = self.fill_color {
            ellipse = ellipse
                .set("fill", fill_color.to_string())
                .set("fill-opacity", fill_color.alpha());
        }

        Box::new(apply_stroke!(ellipse, &self.stroke))
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
        Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 50.0))
    }

    #[test]
    fn test_contains_axis_extremes() {
        let oval = OvalDefinition::new();
        assert!(oval.contains(bounds(), Point::new(0.0, 25.0)));
        assert!(oval.contains(bounds(), Point::new(100.0, 25.0)));
        assert!(oval.contains(bounds(), Point::new(50.0, 0.0)));
        assert!(!oval.contains(bounds(), Point::new(50.0, -0.5)));
    }

    #[test]
    fn test_excludes_bounding_box_corners() {
        let oval = OvalDefinition::new();
        // Inside the box, outside the ellipse: (0.8)^2 + (0.8)^2 > 1
        assert!(!oval.contains(bounds(), Point::new(90.0, 45.0)));
        // (0.5)^2 + (0.5)^2 < 1
        assert!(oval.contains(bounds(), Point::new(75.0, 37.5)));
    }

    #[test]
    fn test_degenerate_bounds_contain_nothing() {
        let oval = OvalDefinition::new();
        let flat = Bounds::new_from_top_left(Point::default(), Size::new(10.0, 0.0));
        assert!(!oval.contains(flat, Point::new(5.0, 0.0)));
    }

    #[test]
    fn test_render_ellipse() {
        let svg = OvalDefinition::new().render_to_svg(bounds()).to_string();
        assert!(svg.contains("<ellipse"));
        assert!(svg.contains("cx=\"50\""));
        assert!(svg.contains("ry=\"25\""));
    }
}
