//! Stroke and line-style definitions.
//!
//! Node outlines, edge polylines, zone borders and selection highlights all
//! describe their line with a [`StrokeDefinition`]. The
//! [`apply_stroke!`](crate::apply_stroke!) macro writes one onto any SVG element.
//!
//! | Property | SVG attribute |
//! |----------|---------------|
//! | `color`  | `stroke`, `stroke-opacity` |
//! | `width`  | `stroke-width` |
//! | `style`  | `stroke-dasharray` |
//! | `join`   | `stroke-linejoin` |

use std::str::FromStr;

use crate::color::Color;

/// Line pattern of a stroke.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    #[default]
    Solid,
    /// 6px dash, 4px gap
    Dashed,
    /// 2px dot, 3px gap
    Dotted,
    /// 10px dash, 4px gap, 2px dot, 4px gap
    DashDot,
}

impl StrokeStyle {
    /// Returns the SVG dasharray value for this style, or None for solid lines
    pub fn to_svg_value(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("6,4"),
            Self::Dotted => Some("2,3"),
            Self::DashDot => Some("10,4,2,4"),
        }
    }
}

impl FromStr for StrokeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "dash-dot" => Ok(Self::DashDot),
            _ => Err(format!(
                "invalid stroke style `{s}`, valid values: solid, dashed, dotted, dash-dot"
            )),
        }
    }
}

/// Defines how polyline corners are rendered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl StrokeJoin {
    /// Returns the SVG stroke-linejoin value
    pub fn to_svg_value(self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
        }
    }
}

/// A stroke definition for rendering lines and borders.
///
/// # Examples
///
/// ```
/// use tailrace_core::color::Color;
/// use tailrace_core::draw::{StrokeDefinition, StrokeJoin, StrokeStyle};
///
/// let stroke = StrokeDefinition::solid(Color::new("#1e88e5").unwrap(), 2.0)
///     .with_join(StrokeJoin::Round);
/// assert_eq!(stroke.style(), StrokeStyle::Solid);
///
/// let dashed = StrokeDefinition::dashed(Color::new("blue").unwrap(), 1.5);
/// assert_eq!(dashed.style(), StrokeStyle::Dashed);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    style: StrokeStyle,
    join: StrokeJoin,
}

impl StrokeDefinition {
    /// Creates a new solid stroke with the given color and width.
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            ..Self::default()
        }
    }

    /// Creates a solid stroke. Equivalent to [`StrokeDefinition::new`].
    pub fn solid(color: Color, width: f32) -> Self {
        Self::new(color, width)
    }

    /// Creates a dashed stroke.
    pub fn dashed(color: Color, width: f32) -> Self {
        Self::new(color, width).with_style(StrokeStyle::Dashed)
    }

    /// Returns the stroke color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the stroke width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Returns the stroke style.
    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    /// Returns the stroke join style.
    pub fn join(&self) -> StrokeJoin {
        self.join
    }

    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_join(mut self, join: StrokeJoin) -> Self {
        self.join = join;
        self
    }

    /// Returns a copy with every length multiplied by `factor` (zoom).
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            ..self.clone()
        }
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self {
            color: Color::default(),
            width: 1.0,
            style: StrokeStyle::default(),
            join: StrokeJoin::default(),
        }
    }
}

/// Apply all stroke attributes to an SVG element.
///
/// # Examples
///
/// ```
/// use tailrace_core::color::Color;
/// use tailrace_core::draw::StrokeDefinition;
/// use svg::node::element as svg_element;
///
/// let stroke = StrokeDefinition::solid(Color::new("black").unwrap(), 2.0);
/// let line = svg_element::Polyline::new().set("points", "0,0 10,10");
/// let line = tailrace_core::apply_stroke!(line, &stroke);
/// ```
#[macro_export]
macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {{
        let mut elem = $element
            .set("stroke", $stroke.color().to_string())
            .set("stroke-opacity", $stroke.color().alpha())
            .set("stroke-width", $stroke.width())
            .set("stroke-linejoin", $stroke.join().to_svg_value());

        if let Some(dasharray) = $stroke.style().to_svg_value() {
            elem = elem.set("stroke-dasharray", dasharray);
        }

        elem
    }};
}
