//! Node shape definitions.
//!
//! A [`ShapeDefinition`] knows how to draw itself into a bounding box and how
//! to answer whether a point falls inside it. The same definition therefore
//! drives both rendering and hit-testing, so what the user sees is what the
//! pointer selects.

use std::fmt;

use crate::{
    color::Color,
    draw::{SvgNode, StrokeDefinition},
    geometry::{Bounds, Point},
};

mod diamond;
mod oval;
mod rectangle;

pub use diamond::DiamondDefinition;
pub use oval::OvalDefinition;
pub use rectangle::RectangleDefinition;

/// A stateless description of how a node shape looks and where it is solid.
pub trait ShapeDefinition: fmt::Debug {
    /// Returns `true` if `point` lies inside the shape drawn into `bounds`.
    fn contains(&self, bounds: Bounds, point: Point) -> bool;

    /// Renders the shape filling `bounds`.
    fn render_to_svg(&self, bounds: Bounds) -> SvgNode;

    /// Creates a boxed clone of this shape definition.
    fn clone_box(&self) -> Box<dyn ShapeDefinition>;

    /// Returns the fill color, `None` for an unfilled shape.
    fn fill_color(&self) -> Option<Color>;

    fn set_fill_color(&mut self, color: Option<Color>);

    fn stroke(&self) -> &StrokeDefinition;

    fn set_stroke(&mut self, stroke: StrokeDefinition);

    /// Set the corner rounding radius
    fn set_rounded(&mut self, _radius: f32) -> Result<(), &'static str> {
        Err("rounded corners are not supported for this shape")
    }
}

impl Clone for Box<dyn ShapeDefinition> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
