//! Visual definitions for flow diagram elements.
//!
//! - [`ShapeDefinition`] and its rectangle, oval and diamond implementations
//! - [`StrokeDefinition`] for outlines and edge lines
//! - [`TextDefinition`] / [`Text`] for captions and labels
//! - [`ArrowheadDefinition`] and polyline helpers for edges
//! - [`RenderLayer`] / [`LayeredOutput`] for z-ordered SVG output

mod arrow;
mod layer;
mod shape;
mod stroke;
mod text;

pub use arrow::{
    ArrowDirection, ArrowheadDefinition, points_attribute, render_arrowhead, render_polyline,
};
pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use shape::{DiamondDefinition, OvalDefinition, RectangleDefinition, ShapeDefinition};
pub use stroke::{StrokeDefinition, StrokeJoin, StrokeStyle};
pub use text::{FontWeight, Text, TextDefinition};
