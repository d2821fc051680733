//! Edge polylines and arrowheads.
//!
//! Edges are drawn as straight polylines through their waypoints. Arrowheads
//! are filled triangles whose tip sits exactly on the polyline's end point
//! and whose axis follows the final segment.

use std::str;

use svg::node::element as svg_element;

use crate::{
    apply_stroke,
    color::Color,
    draw::{StrokeDefinition, SvgNode},
    geometry::Point,
};

/// Which ends of an edge carry an arrowhead.
///
/// - `Forward`: arrowhead at the destination only
/// - `Bidirectional`: arrowheads at both ends
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    #[default]
    Forward,
    Bidirectional,
}

impl ArrowDirection {
    /// Returns `true` if an arrowhead is drawn at the source end.
    pub fn has_start_marker(self) -> bool {
        matches!(self, Self::Bidirectional)
    }
}

impl str::FromStr for ArrowDirection {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "->" => Ok(Self::Forward),
            "<->" => Ok(Self::Bidirectional),
            _ => Err("Invalid arrow direction"),
        }
    }
}

/// Size of a triangular arrowhead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowheadDefinition {
    length: f32,
    half_width: f32,
}

impl ArrowheadDefinition {
    pub fn new(length: f32, half_width: f32) -> Self {
        Self { length, half_width }
    }

    pub fn length(self) -> f32 {
        self.length
    }

    /// Returns a copy with both dimensions multiplied by `factor` (zoom).
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            length: self.length * factor,
            half_width: self.half_width * factor,
        }
    }

    /// Computes the triangle for an arrowhead at `tip` pointing away from `from`.
    ///
    /// Returns `[tip, left base, right base]`, or `None` when the two points
    /// coincide and no direction can be derived.
    ///
    /// ```
    /// # use tailrace_core::draw::ArrowheadDefinition;
    /// # use tailrace_core::geometry::Point;
    /// let head = ArrowheadDefinition::new(10.0, 5.0);
    /// let [tip, left, right] = head.triangle(Point::new(100.0, 0.0), Point::new(0.0, 0.0)).unwrap();
    /// assert_eq!(tip, Point::new(100.0, 0.0));
    /// assert_eq!(left, Point::new(90.0, -5.0));
    /// assert_eq!(right, Point::new(90.0, 5.0));
    /// ```
    pub fn triangle(self, tip: Point, from: Point) -> Option<[Point; 3]> {
        let direction = tip.sub_point(from);
        let length = direction.hypot();
        if length < f32::EPSILON {
            return None;
        }
        let unit = direction.scale(1.0 / length);
        let normal = Point::new(unit.y(), -unit.x());
        let base = tip.sub_point(unit.scale(self.length));
        Some([
            tip,
            base.add_point(normal.scale(self.half_width)),
            base.sub_point(normal.scale(self.half_width)),
        ])
    }
}

impl Default for ArrowheadDefinition {
    fn default() -> Self {
        Self::new(10.0, 5.0)
    }
}

/// Formats points as an SVG `points` attribute value.
pub fn points_attribute(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x(), p.y()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders an unfilled polyline through `points`.
pub fn render_polyline(points: &[Point], stroke: &StrokeDefinition) -> SvgNode {
    let polyline = svg_element::Polyline::new()
        .set("points", points_attribute(points))
        .set("fill", "none");
    Box::new(apply_stroke!(polyline, stroke))
}

/// Renders a filled arrowhead triangle.
pub fn render_arrowhead(triangle: &[Point; 3], color: Color) -> SvgNode {
    Box::new(
        svg_element::Polygon::new()
            .set("points", points_attribute(triangle))
            .set("fill", color.to_string())
            .set("fill-opacity", color.alpha())
            .set("stroke", "none"),
    )
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn test_arrow_direction_markers() {
        assert!(!ArrowDirection::Forward.has_start_marker());
        assert!(ArrowDirection::Bidirectional.has_start_marker());
    }

    #[test]
    fn test_arrow_direction_from_str() {
        assert_eq!("->".parse(), Ok(ArrowDirection::Forward));
        assert_eq!("<->".parse(), Ok(ArrowDirection::Bidirectional));
        assert!("<-".parse::<ArrowDirection>().is_err());
    }

    #[test]
    fn test_triangle_vertical() {
        let head = ArrowheadDefinition::new(10.0, 4.0);
        let [tip, left, right] = head
            .triangle(Point::new(0.0, 50.0), Point::new(0.0, 0.0))
            .unwrap();
        assert_eq!(tip, Point::new(0.0, 50.0));
        assert!(approx_eq!(f32, left.y(), 40.0));
        assert!(approx_eq!(f32, right.y(), 40.0));
        assert!(approx_eq!(f32, left.distance(right), 8.0));
    }

    #[test]
    fn test_triangle_degenerate() {
        let head = ArrowheadDefinition::default();
        let p = Point::new(3.0, 3.0);
        assert!(head.triangle(p, p).is_none());
    }

    #[test]
    fn test_scaled_arrowhead() {
        let head = ArrowheadDefinition::new(10.0, 5.0).scaled(2.0);
        assert_eq!(head.length(), 20.0);
        assert_eq!(head.half_width, 10.0);
    }

    #[test]
    fn test_points_attribute() {
        let points = [Point::new(0.0, 0.0), Point::new(10.5, 20.0)];
        assert_eq!(points_attribute(&points), "0,0 10.5,20");
    }

    #[test]
    fn test_render_polyline_is_unfilled() {
        let points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let svg = render_polyline(&points, &StrokeDefinition::default()).to_string();
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("fill=\"none\""));
    }
}
