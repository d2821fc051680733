//! Tailrace - an editor core for water and process flow diagrams.
//!
//! The crate holds the diagram model, the snap resolver, the edge drawing
//! state machine, selection and deletion, the renderer and the diagram file
//! format. [`editor::Editor`] ties them together behind an event API; the
//! modules can also be used on their own.

pub mod config;
pub mod diagnostic;
pub mod drawing;
pub mod editor;
pub mod model;
pub mod persistence;
pub mod render;
pub mod selection;
pub mod snap;

mod error;
mod validate;

pub use tailrace_core::{color, draw, geometry};

pub use error::{DrawingError, ElementKind, ModelError, ParseError, TailraceError};
pub use validate::{
    FONT_SIZE_RANGE, NODE_HEIGHT_RANGE, NODE_WIDTH_RANGE, SegmentError, ValidationError,
};

use log::info;

use config::AppConfig;
use model::Diagram;
use render::{FrameContext, Renderer, SinkPolicy};

/// Renders a diagram to an SVG document at `zoom`.
///
/// # Examples
///
/// ```
/// use tailrace::{config::AppConfig, model::Diagram, render_svg};
///
/// let svg = render_svg(&Diagram::default(), &AppConfig::default(), 1.0).unwrap();
/// assert!(svg.contains("<svg"));
/// ```
///
/// # Errors
///
/// Returns [`TailraceError::Config`] if the render configuration names an
/// invalid color.
pub fn render_svg(diagram: &Diagram, config: &AppConfig, zoom: f32) -> Result<String, TailraceError> {
    let renderer = Renderer::new(config.render().clone(), SinkPolicy::from(config.sink()))?;
    let scene = renderer.render(diagram.graph(), &FrameContext::new(zoom));
    info!(
        title = diagram.title(),
        zoom = scene.zoom(),
        items = scene.items().len();
        "SVG rendered"
    );
    Ok(scene.to_svg())
}
