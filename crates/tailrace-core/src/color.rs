//! Color handling for Tailrace diagrams
//!
//! Two color types live here:
//!
//! - [`Color`] wraps the `DynamicColor` type from the color crate and is what
//!   the renderer works with. It accepts any CSS color string.
//! - [`HexColor`] is the validated `#rgb` / `#rrggbb` form stored on nodes,
//!   edges and zones. It keeps the text exactly as written so diagram files
//!   round-trip unchanged.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::DynamicColor;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Color {
    /// Create a new `Color` from a string
    /// This will parse CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    ///
    /// # Examples
    ///
    /// ```
    /// use tailrace_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// let blue = Color::new("blue").unwrap();
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Creates a new color with the specified alpha (transparency) value.
    ///
    /// # Examples
    ///
    /// ```
    /// use tailrace_core::color::Color;
    ///
    /// let red = Color::new("red").unwrap();
    /// let semi_transparent_red = red.with_alpha(0.5);
    /// assert_eq!(semi_transparent_red.alpha(), 0.5);
    /// ```
    pub fn with_alpha(self, alpha: f32) -> Self {
        Color {
            color: self.color.with_alpha(alpha),
        }
    }

    /// Returns the alpha component of this color, between 0.0 and 1.0.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl From<&Color> for svg::node::Value {
    fn from(color: &Color) -> Self {
        Self::from(color.to_string())
    }
}

/// Error returned when a string is not a `#rgb` or `#rrggbb` hex triplet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a hex color (expected #rgb or #rrggbb)")]
pub struct HexColorError(pub String);

/// A color written as a hex triplet, e.g. `#1e88e5` or `#fff`.
///
/// The original spelling is preserved; comparison is case-sensitive on the
/// stored text, matching how the value is written back to disk.
///
/// # Examples
///
/// ```
/// use tailrace_core::color::HexColor;
///
/// let fill: HexColor = "#e3f2fd".parse().unwrap();
/// assert_eq!(fill.as_str(), "#e3f2fd");
/// assert!("blue".parse::<HexColor>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Returns the color text as written, including the leading `#`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts to a renderable [`Color`].
    pub fn to_color(&self) -> Color {
        match Color::new(&self.0) {
            Ok(color) => color,
            Err(err) => {
                // Unreachable for validated values; keep rendering regardless.
                warn!(color = self.0.as_str(), err = err.as_str(); "Falling back to default color");
                Color::default()
            }
        }
    }

    fn is_valid(value: &str) -> bool {
        let Some(digits) = value.strip_prefix('#') else {
            return false;
        };
        matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl FromStr for HexColor {
    type Err = HexColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(HexColorError(s.to_string()))
        }
    }
}

impl TryFrom<String> for HexColor {
    type Error = HexColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(HexColorError(value))
        }
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&HexColor> for Color {
    fn from(value: &HexColor) -> Self {
        value.to_color()
    }
}
