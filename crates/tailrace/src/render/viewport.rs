use tailrace_core::geometry::Point;

use crate::render::RenderConfig;

/// Zoom and scroll state of the canvas view.
///
/// Canvas coordinates are diagram units. Screen coordinates are pixels
/// relative to the top-left corner of the visible area. A canvas point `c`
/// is drawn at `c * zoom - scroll`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f32,
    scroll: Point,
    min_zoom: f32,
    max_zoom: f32,
}

impl Viewport {
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            zoom: 1.0_f32.max(min_zoom).min(max_zoom),
            scroll: Point::default(),
            min_zoom,
            max_zoom,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.min_zoom(), config.max_zoom())
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn scroll(&self) -> Point {
        self.scroll
    }

    /// Sets the zoom, clamped to the allowed range. Returns the zoom applied.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            self.zoom = zoom.max(self.min_zoom).min(self.max_zoom);
        }
        self.zoom
    }

    /// Multiplies the zoom by `factor`, keeping the canvas point under the
    /// screen point `anchor` in place.
    pub fn zoom_at(&mut self, factor: f32, anchor: Point) -> f32 {
        let fixed = self.screen_to_canvas(anchor);
        self.set_zoom(self.zoom * factor);
        self.scroll = fixed.scale(self.zoom).sub_point(anchor);
        self.zoom
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(1.0);
        self.scroll = Point::default();
    }

    /// Pans the view by `delta` screen pixels.
    pub fn scroll_by(&mut self, delta: Point) {
        self.scroll = self.scroll.add_point(delta);
    }

    pub fn screen_to_canvas(&self, point: Point) -> Point {
        point.add_point(self.scroll).scale(1.0 / self.zoom)
    }

    pub fn canvas_to_screen(&self, point: Point) -> Point {
        point.scale(self.zoom).sub_point(self.scroll)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}
