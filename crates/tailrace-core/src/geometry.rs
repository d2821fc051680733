//! Geometric primitives for flow diagram editing.
//!
//! This module provides the geometric types used throughout Tailrace for
//! positioning nodes, routing edges and hit-testing pointer input.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in canvas space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//! - [`Insets`] - Padding/margin values for four sides
//! - [`AnchorSide`] - The eight connection anchors of a bounding box
//! - [`Segment`] - A straight line between two points, with closest-point queries
//!
//! # Coordinate System
//!
//! Tailrace uses a coordinate system consistent with SVG and screen canvases:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Node positions are the top-left corner of the node's bounding box.

/// A 2D point representing a position in canvas coordinate space.
///
/// # Examples
///
/// ```
/// # use tailrace_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 7.5);
/// assert_eq!(mid.y(), 12.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Returns `true` when neither coordinate is NaN or infinite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance between two points.
    ///
    /// ```
    /// # use tailrace_core::geometry::Point;
    /// assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    /// ```
    pub fn distance(self, other: Point) -> f32 {
        self.sub_point(other).hypot()
    }

    /// Dot product, treating both points as vectors from the origin.
    fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Linear interpolation: `t = 0` yields `self`, `t = 1` yields `other`.
    fn lerp(self, other: Point, t: f32) -> Self {
        self.add_point(other.sub_point(self).scale(t))
    }

    /// Multiplies both coordinates by the given factor.
    ///
    /// ```
    /// # use tailrace_core::geometry::Point;
    /// let point = Point::new(10.0, 20.0);
    /// let doubled = point.scale(2.0);
    /// assert_eq!(doubled.x(), 20.0);
    /// assert_eq!(doubled.y(), 40.0);
    /// ```
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Converts a top-left point and a size into a bounds rectangle
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds::new_from_top_left(self, size)
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

}

/// One of the eight connection anchors on a bounding box: four corners and
/// four side midpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorSide {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl AnchorSide {
    /// All anchors, clockwise from the top-left corner.
    pub const ALL: [AnchorSide; 8] = [
        AnchorSide::TopLeft,
        AnchorSide::Top,
        AnchorSide::TopRight,
        AnchorSide::Right,
        AnchorSide::BottomRight,
        AnchorSide::Bottom,
        AnchorSide::BottomLeft,
        AnchorSide::Left,
    ];

    /// Returns a human-readable name for this anchor.
    pub fn name(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::Top => "top",
            Self::TopRight => "top-right",
            Self::Right => "right",
            Self::BottomRight => "bottom-right",
            Self::Bottom => "bottom",
            Self::BottomLeft => "bottom-left",
            Self::Left => "left",
        }
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the smallest bounds containing every point, or `None` for an
    /// empty iterator.
    ///
    /// ```
    /// # use tailrace_core::geometry::{Bounds, Point};
    /// let bounds = Bounds::from_points([Point::new(5.0, 1.0), Point::new(-2.0, 8.0)]).unwrap();
    /// assert_eq!(bounds.min_x(), -2.0);
    /// assert_eq!(bounds.max_y(), 8.0);
    /// assert!(Bounds::from_points([]).is_none());
    /// ```
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            let single = Self {
                min_x: p.x,
                min_y: p.y,
                max_x: p.x,
                max_y: p.y,
            };
            Some(match acc {
                Some(bounds) => bounds.merge(&single),
                None => single,
            })
        })
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point {
            x: self.min_x,
            y: self.min_y,
        }
    }

    /// Returns the bottom-right corner as a Point
    pub fn max_point(self) -> Point {
        Point {
            x: self.max_x,
            y: self.max_y,
        }
    }

    /// Returns `true` if the point lies inside or on the edge of the bounds.
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Returns the position of the given anchor on this bounding box.
    ///
    /// ```
    /// # use tailrace_core::geometry::{AnchorSide, Bounds, Point, Size};
    /// let bounds = Bounds::new_from_top_left(Point::new(100.0, 100.0), Size::new(120.0, 40.0));
    /// assert_eq!(bounds.anchor(AnchorSide::Right), Point::new(220.0, 120.0));
    /// assert_eq!(bounds.anchor(AnchorSide::BottomLeft), Point::new(100.0, 140.0));
    /// ```
    pub fn anchor(self, side: AnchorSide) -> Point {
        let center = self.center();
        match side {
            AnchorSide::TopLeft => Point::new(self.min_x, self.min_y),
            AnchorSide::Top => Point::new(center.x, self.min_y),
            AnchorSide::TopRight => Point::new(self.max_x, self.min_y),
            AnchorSide::Right => Point::new(self.max_x, center.y),
            AnchorSide::BottomRight => Point::new(self.max_x, self.max_y),
            AnchorSide::Bottom => Point::new(center.x, self.max_y),
            AnchorSide::BottomLeft => Point::new(self.min_x, self.max_y),
            AnchorSide::Left => Point::new(self.min_x, center.y),
        }
    }

    /// Returns all eight anchors with their positions, in [`AnchorSide::ALL`] order.
    pub fn anchors(self) -> [(AnchorSide, Point); 8] {
        AnchorSide::ALL.map(|side| (side, self.anchor(side)))
    }

    /// Returns the anchor closest to `target`. Ties resolve to the earlier
    /// anchor in [`AnchorSide::ALL`] order.
    pub fn nearest_anchor(self, target: Point) -> (AnchorSide, Point) {
        let mut best = (AnchorSide::TopLeft, self.anchor(AnchorSide::TopLeft));
        let mut best_distance = best.1.distance(target);
        for (side, position) in self.anchors().into_iter().skip(1) {
            let distance = position.distance(target);
            if distance < best_distance {
                best = (side, position);
                best_distance = distance;
            }
        }
        best
    }

    /// Merges two bounds to create a larger bounds that contains both.
    ///
    /// ```
    /// # use tailrace_core::geometry::{Bounds, Point, Size};
    /// let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 30.0));
    /// let b = Bounds::new_from_top_left(Point::new(10.0, 40.0), Size::new(120.0, 80.0));
    ///
    /// let combined = a.merge(&b);
    /// assert_eq!(combined.width(), 130.0);
    /// assert_eq!(combined.height(), 120.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Multiplies every coordinate by `factor`, scaling about the origin.
    pub fn scale(&self, factor: f32) -> Self {
        Self {
            min_x: self.min_x * factor,
            min_y: self.min_y * factor,
            max_x: self.max_x * factor,
            max_y: self.max_y * factor,
        }
    }

    /// Expands the bounds by adding insets.
    pub fn add_padding(&self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left(),
            min_y: self.min_y - insets.top(),
            max_x: self.max_x + insets.right(),
            max_y: self.max_y + insets.bottom(),
        }
    }
}

/// Represents spacing around an element (padding, margin, etc.)
/// with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates new insets with specified values for each side
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates uniform insets with the same value for all sides
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Returns the top inset value
    pub fn top(self) -> f32 {
        self.top
    }

    /// Returns the right inset value
    pub fn right(self) -> f32 {
        self.right
    }

    /// Returns the bottom inset value
    pub fn bottom(self) -> f32 {
        self.bottom
    }

    /// Returns the left inset value
    pub fn left(self) -> f32 {
        self.left
    }
}

/// A straight line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: Point,
    end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn start(self) -> Point {
        self.start
    }

    pub fn end(self) -> Point {
        self.end
    }

    pub fn length(self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn midpoint(self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Returns the point on the segment closest to `point`.
    ///
    /// The projection parameter is clamped to the segment, so points beyond
    /// either end project onto that endpoint. Degenerate segments return
    /// their start point.
    ///
    /// ```
    /// # use tailrace_core::geometry::{Point, Segment};
    /// let segment = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    /// assert_eq!(segment.closest_point(Point::new(4.0, 3.0)), Point::new(4.0, 0.0));
    /// assert_eq!(segment.closest_point(Point::new(-5.0, 1.0)), Point::new(0.0, 0.0));
    /// ```
    pub fn closest_point(self, point: Point) -> Point {
        let direction = self.end.sub_point(self.start);
        let length_sq = direction.dot(direction);
        if length_sq <= f32::EPSILON {
            return self.start;
        }
        let t = (point.sub_point(self.start).dot(direction) / length_sq).clamp(0.0, 1.0);
        self.start.lerp(self.end, t)
    }
}

/// The nearest point on a polyline to some query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylineProjection {
    /// Index of the segment (`points[i]` to `points[i + 1]`) holding the point.
    pub segment_index: usize,
    /// The closest point on the polyline.
    pub point: Point,
    /// Distance from the query point to [`Self::point`].
    pub distance: f32,
}

/// Iterates over the consecutive segments of a polyline.
pub fn segments(points: &[Point]) -> impl Iterator<Item = Segment> + '_ {
    points.windows(2).map(|pair| Segment::new(pair[0], pair[1]))
}

/// Projects `point` onto the polyline through `points`.
///
/// Returns `None` for polylines with fewer than two points. When two
/// segments are equally close the earlier one wins.
pub fn project_onto_polyline(points: &[Point], point: Point) -> Option<PolylineProjection> {
    let mut best: Option<PolylineProjection> = None;
    for (segment_index, segment) in segments(points).enumerate() {
        let closest = segment.closest_point(point);
        let distance = closest.distance(point);
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(PolylineProjection {
                segment_index,
                point: closest,
                distance,
            });
        }
    }
    best
}

/// Returns the longest segment of the polyline, the earliest on ties.
pub fn longest_segment(points: &[Point]) -> Option<Segment> {
    segments(points).fold(None, |best: Option<Segment>, segment| match best {
        Some(b) if b.length() >= segment.length() => Some(b),
        _ => Some(segment),
    })
}

/// Even-odd point-in-polygon test. Points exactly on an edge may fall on
/// either side.
///
/// ```
/// # use tailrace_core::geometry::{point_in_polygon, Point};
/// let diamond = [
///     Point::new(10.0, 0.0),
///     Point::new(20.0, 10.0),
///     Point::new(10.0, 20.0),
///     Point::new(0.0, 10.0),
/// ];
/// assert!(point_in_polygon(&diamond, Point::new(10.0, 10.0)));
/// assert!(!point_in_polygon(&diamond, Point::new(1.0, 1.0)));
/// ```
pub fn point_in_polygon(vertices: &[Point], point: Point) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (a, b) = (vertices[i], vertices[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let cross_x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..500.0,
            1.0f32..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)))
    }

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Point addition should be commutative: p1 + p2 == p2 + p1.
    fn check_point_add_is_commutative(p1: Point, p2: Point) -> Result<(), TestCaseError> {
        let result1 = p1.add_point(p2);
        let result2 = p2.add_point(p1);

        prop_assert!(approx_eq!(f32, result1.x(), result2.x()));
        prop_assert!(approx_eq!(f32, result1.y(), result2.y()));
        Ok(())
    }

    /// Merged bounds should contain both original bounds.
    fn check_bounds_merge_contains_both(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let merged = b1.merge(&b2);

        for b in [b1, b2] {
            prop_assert!(merged.contains(b.min_point()));
            prop_assert!(merged.contains(b.max_point()));
        }
        Ok(())
    }

    /// The closest point on a segment is never farther than either endpoint.
    fn check_closest_point_beats_endpoints(
        a: Point,
        b: Point,
        p: Point,
    ) -> Result<(), TestCaseError> {
        let segment = Segment::new(a, b);
        let distance = segment.closest_point(p).distance(p);

        prop_assert!(distance <= a.distance(p) + 0.01);
        prop_assert!(distance <= b.distance(p) + 0.01);
        Ok(())
    }

    /// Every anchor lies on the boundary of its bounds.
    fn check_anchors_on_boundary(bounds: Bounds) -> Result<(), TestCaseError> {
        for (_, anchor) in bounds.anchors() {
            prop_assert!(bounds.contains(anchor));
            let on_vertical = approx_eq!(f32, anchor.x(), bounds.min_x())
                || approx_eq!(f32, anchor.x(), bounds.max_x());
            let on_horizontal = approx_eq!(f32, anchor.y(), bounds.min_y())
                || approx_eq!(f32, anchor.y(), bounds.max_y());
            prop_assert!(on_vertical || on_horizontal);
        }
        Ok(())
    }

    /// A rectangle polygon agrees with `Bounds::contains` away from its edges.
    fn check_polygon_matches_bounds(bounds: Bounds, p: Point) -> Result<(), TestCaseError> {
        let near_edge = (p.x() - bounds.min_x()).abs() < 0.01
            || (p.x() - bounds.max_x()).abs() < 0.01
            || (p.y() - bounds.min_y()).abs() < 0.01
            || (p.y() - bounds.max_y()).abs() < 0.01;
        prop_assume!(!near_edge);

        let polygon = [
            bounds.anchor(AnchorSide::TopLeft),
            bounds.anchor(AnchorSide::TopRight),
            bounds.anchor(AnchorSide::BottomRight),
            bounds.anchor(AnchorSide::BottomLeft),
        ];
        prop_assert_eq!(point_in_polygon(&polygon, p), bounds.contains(p));
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn point_add_is_commutative(p1 in point_strategy(), p2 in point_strategy()) {
            check_point_add_is_commutative(p1, p2)?;
        }

        #[test]
        fn bounds_merge_contains_both(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_bounds_merge_contains_both(b1, b2)?;
        }

        #[test]
        fn closest_point_beats_endpoints(a in point_strategy(), b in point_strategy(), p in point_strategy()) {
            check_closest_point_beats_endpoints(a, b, p)?;
        }

        #[test]
        fn anchors_on_boundary(bounds in bounds_strategy()) {
            check_anchors_on_boundary(bounds)?;
        }

        #[test]
        fn polygon_matches_bounds(bounds in bounds_strategy(), p in point_strategy()) {
            check_polygon_matches_bounds(bounds, p)?;
        }
    }
}
