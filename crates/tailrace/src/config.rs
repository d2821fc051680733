//! Configuration types for the Tailrace editor.
//!
//! Every section implements [`serde::Deserialize`] and falls back to its
//! defaults when absent, so a configuration file only needs the values it
//! changes.
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`SnapConfig`] - Snap radii for anchors, junctions and waypoints.
//! - [`RenderConfig`] - Zoom limits, stroke widths and colors.
//! - [`SinkConfig`] - The sink arrow rule.
//! - [`SelectionConfig`] - Hit-test tolerance for edges.
//!
//! # Example
//!
//! ```
//! # use tailrace::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.snap().node_anchor_radius(), 30.0);
//! assert!(config.render().background_color().is_ok());
//! ```

use serde::Deserialize;

pub use crate::{
    render::{RenderConfig, SinkConfig},
    selection::SelectionConfig,
    snap::SnapConfig,
};

/// Top-level editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Snap radii section.
    #[serde(default)]
    snap: SnapConfig,

    /// Renderer section.
    #[serde(default)]
    render: RenderConfig,

    /// Sink arrow rule section.
    #[serde(default)]
    sink: SinkConfig,

    /// Selection section.
    #[serde(default)]
    selection: SelectionConfig,
}

impl AppConfig {
    pub fn new(
        snap: SnapConfig,
        render: RenderConfig,
        sink: SinkConfig,
        selection: SelectionConfig,
    ) -> Self {
        Self {
            snap,
            render,
            sink,
            selection,
        }
    }

    pub fn snap(&self) -> &SnapConfig {
        &self.snap
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    pub fn sink(&self) -> &SinkConfig {
        &self.sink
    }

    pub fn selection(&self) -> &SelectionConfig {
        &self.selection
    }
}
