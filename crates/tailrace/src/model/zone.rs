use tailrace_core::{
    color::HexColor,
    geometry::{Bounds, Point, Size},
};

use crate::validate::{ValidationError, check_finite, check_point, parse_color};

/// A decorative background rectangle grouping part of the diagram.
///
/// Zones have no effect on nodes or edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    name: String,
    bounds: Bounds,
    color: HexColor,
}

impl Zone {
    pub fn new(
        name: impl Into<String>,
        position: Point,
        size: Size,
        color: &str,
    ) -> Result<Self, ValidationError> {
        let position = check_point("zone position", position)?;
        for (field, value) in [("zone width", size.width()), ("zone height", size.height())] {
            if check_finite(field, value)? < 0.0 {
                return Err(ValidationError::Negative { field, value });
            }
        }
        Ok(Self {
            name: name.into(),
            bounds: Bounds::new_from_top_left(position, size),
            color: parse_color("zone color", color)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn color(&self) -> &HexColor {
        &self.color
    }
}
