//! Rectangle shape definition.

use svg::node::element as svg_element;

use super::ShapeDefinition;
use crate::{
    apply_stroke,
    color::Color,
    draw::{StrokeDefinition, SvgNode},
    geometry::{Bounds, Point},
};

/// Rectangle with optional rounded corners.
///
/// Hit-testing uses the full bounding box; rounding is visual only.
#[derive(Debug, Clone, Default)]
pub struct RectangleDefinition {
    fill_color: Option<Color>,
    stroke: StrokeDefinition,
    rounded: f32,
}

impl RectangleDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rounded(&self) -> f32 {
        self.rounded
    }
}

impl ShapeDefinition for RectangleDefinition {
    fn contains(&self, bounds: Bounds, point: Point) -> bool {
        bounds.contains(point)
    }

    fn render_to_svg(&self, bounds: Bounds) -> SvgNode {
        let mut rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("fill", "none");

        if self.rounded > 0.0 {
            rect = rect.set("rx", self.rounded);
        }

        if let Some(fill_color) = self.fill_color {
            rect = rect
                .set("fill", fill_color.to_string())
                .set("fill-opacity", fill_color.alpha());
        }

        Box::new(apply_stroke!(rect, &self.stroke))
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

    fn set_rounded(&mut self, radius: f32) -> Result<(), &'static str> {
        self.rounded = radius.max(0.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    #[test]
    fn test_render_uses_bounds_and_rounding() {
        let mut rect = RectangleDefinition::new();
        rect.set_rounded(4.0).unwrap();
        rect.set_fill_color(Some(Color::new("#fff3e0").unwrap()));

        let bounds = Bounds::new_from_top_left(Point::new(10.0, 20.0), Size::new(120.0, 40.0));
        let svg = rect.render_to_svg(bounds).to_string();

        assert!(svg.contains("x=\"10\""));
        assert!(svg.contains("y=\"20\""));
        assert!(svg.contains("width=\"120\""));
        assert!(svg.contains("rx=\"4\""));
        assert!(!svg.contains("fill=\"none\""));
    }

    #[test]
    fn test_unfilled_renders_fill_none() {
        let rect = RectangleDefinition::new();
        let bounds = Bounds::new_from_top_left(Point::default(), Size::new(40.0, 20.0));
        assert!(rect.render_to_svg(bounds).to_string().contains("fill=\"none\""));
    }

    #[test]
    fn test_negative_rounding_clamped() {
        let mut rect = RectangleDefinition::new();
        rect.set_rounded(-3.0).unwrap();
        assert_eq!(rect.rounded(), 0.0);
    }
}
