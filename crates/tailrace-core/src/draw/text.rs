//! Text styling, measurement and rendering.
//!
//! [`TextDefinition`] carries the font settings of a node caption or edge
//! label; [`Text`] pairs one with content so it can be measured and drawn.
//!
//! Measurement is an approximation based on average glyph proportions for
//! sans-serif fonts. It is used to size label backgrounds, not to lay out
//! nodes, so it only needs to be close.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use svg::node::{Text as SvgText, element as svg_element};

use crate::{
    color::Color,
    draw::{LayeredOutput, RenderLayer},
    geometry::{Insets, Point, Size},
};

/// Average advance width of a glyph relative to the font size.
const AVERAGE_GLYPH_WIDTH: f32 = 0.6;
/// Additional advance for bold glyphs relative to the font size.
const BOLD_EXTRA_WIDTH: f32 = 0.05;
/// Line height relative to the font size.
const LINE_HEIGHT: f32 = 1.2;

/// Font weight of a caption or label.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bold => "bold",
        }
    }
}

impl FromStr for FontWeight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "bold" => Ok(Self::Bold),
            _ => Err(format!(
                "invalid font weight `{s}`, valid values: normal, bold"
            )),
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual style for text elements.
///
/// | Property | Default |
/// |----------|---------|
/// | Font family | `"sans-serif"` |
/// | Font size | `10.0` |
/// | Font weight | normal |
/// | Text color | `None` (SVG default, black) |
/// | Background color | `None` |
/// | Padding | Zero on all sides |
///
/// ```
/// # use tailrace_core::draw::{FontWeight, TextDefinition};
/// let style = TextDefinition::new()
///     .with_font_size(8.0)
///     .with_font_weight(FontWeight::Bold);
/// assert_eq!(style.font_size(), 8.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TextDefinition {
    font_family: String,
    font_size: f32,
    font_weight: FontWeight,
    color: Option<Color>,
    background_color: Option<Color>,
    padding: Insets,
}

impl TextDefinition {
    /// Creates a new text definition with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn font_weight(&self) -> FontWeight {
        self.font_weight
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn background_color(&self) -> Option<Color> {
        self.background_color
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }

    pub fn with_font_family(mut self, family: &str) -> Self {
        self.font_family = family.to_string();
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_font_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = weight;
        self
    }

    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    /// Sets a background drawn behind the text, e.g. to keep edge labels
    /// readable over crossing lines.
    pub fn with_background_color(mut self, color: Option<Color>) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    /// Returns a copy with font size and padding multiplied by `factor` (zoom).
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            font_size: self.font_size * factor,
            padding: Insets::new(
                self.padding.top() * factor,
                self.padding.right() * factor,
                self.padding.bottom() * factor,
                self.padding.left() * factor,
            ),
            ..self.clone()
        }
    }
}

impl Default for TextDefinition {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 10.0,
            font_weight: FontWeight::Normal,
            color: None,
            background_color: None,
            padding: Insets::default(),
        }
    }
}

/// A renderable text element combining content with styling.
///
/// ```
/// # use tailrace_core::draw::{Text, TextDefinition};
/// # use tailrace_core::geometry::Point;
/// let style = TextDefinition::new();
/// let text = Text::new(&style, "Pit dewatering");
///
/// let output = text.render_to_layers(Point::new(100.0, 40.0));
/// assert!(!output.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Text<'a> {
    definition: &'a TextDefinition,
    content: &'a str,
}

impl<'a> Text<'a> {
    pub fn new(definition: &'a TextDefinition, content: &'a str) -> Self {
        Self {
            definition,
            content,
        }
    }

    /// Estimated size of the glyphs alone, before padding.
    fn measure(&self) -> Size {
        let font_size = self.definition.font_size();
        let glyph_width = match self.definition.font_weight() {
            FontWeight::Normal => AVERAGE_GLYPH_WIDTH,
            FontWeight::Bold => AVERAGE_GLYPH_WIDTH + BOLD_EXTRA_WIDTH,
        } * font_size;

        let (line_count, widest) = self
            .content
            .lines()
            .fold((0usize, 0usize), |(count, widest), line| {
                (count + 1, widest.max(line.chars().count()))
            });

        Size::new(
            widest as f32 * glyph_width,
            line_count as f32 * font_size * LINE_HEIGHT,
        )
    }

    /// Renders the text centered on `position`.
    ///
    /// The text goes to [`RenderLayer::Text`]; an optional background
    /// rectangle goes to the same layer, emitted first so it sits beneath.
    pub fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let lines: Vec<&str> = self.content.lines().collect();
        if lines.is_empty() {
            return output;
        }

        let text_size = self.measure();
        let line_height = text_size.height() / lines.len() as f32;
        let y_offset = -(text_size.height() + line_height) / 2.0;

        if let Some(bg_color) = self.definition.background_color() {
            let bg_bounds = Point::new(
                position.x() - text_size.width() / 2.0,
                position.y() - text_size.height() / 2.0,
            )
            .to_bounds(text_size)
            .add_padding(self.definition.padding());

            let bg = svg_element::Rectangle::new()
                .set("x", bg_bounds.min_x())
                .set("y", bg_bounds.min_y())
                .set("width", bg_bounds.width())
                .set("height", bg_bounds.height())
                .set("fill", bg_color.to_string())
                .set("fill-opacity", bg_color.alpha())
                .set("rx", 2.0);
            output.add_to_layer(RenderLayer::Text, Box::new(bg));
        }

        let mut rendered_text = svg_element::Text::new("")
            .set("x", position.x())
            .set("y", position.y() + y_offset)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", self.definition.font_family())
            .set("font-size", self.definition.font_size())
            .set("font-weight", self.definition.font_weight().as_str());

        if let Some(color) = self.definition.color() {
            rendered_text = rendered_text
                .set("fill", color.to_string())
                .set("fill-opacity", color.alpha());
        }

        for line in lines {
            let tspan = svg_element::TSpan::new("")
                .set("x", position.x())
                .set("dy", line_height)
                .add(SvgText::new(line));
            rendered_text = rendered_text.add(tspan);
        }

        output.add_to_layer(RenderLayer::Text, Box::new(rendered_text));
        output
    }
}
