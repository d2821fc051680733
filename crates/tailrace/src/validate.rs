//! Field validation shared by the model, the editing dialogs and the loader.
//!
//! Every value that reaches a [`Node`](crate::model::Node) or
//! [`Edge`](crate::model::Edge) passes through one of these checks first, so
//! a stored element always satisfies the documented ranges.

use std::ops::RangeInclusive;

use thiserror::Error;

use tailrace_core::{
    color::{HexColor, HexColorError},
    geometry::Point,
};

use crate::model::IdError;

/// Allowed node widths in canvas units.
pub const NODE_WIDTH_RANGE: RangeInclusive<f32> = 40.0..=400.0;
/// Allowed node heights in canvas units.
pub const NODE_HEIGHT_RANGE: RangeInclusive<f32> = 20.0..=200.0;
/// Allowed font sizes for node captions and edge labels.
pub const FONT_SIZE_RANGE: RangeInclusive<f32> = 4.0..=36.0;

/// A field value was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid id: {0}")]
    Id(#[from] IdError),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("{field}: {source}")]
    Color {
        field: &'static str,
        source: HexColorError,
    },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
}

/// An edge's point list was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("an edge needs at least two points, got {0}")]
    TooFew(usize),

    #[error("point {index} repeats the point before it")]
    ConsecutiveDuplicate { index: usize },

    #[error("point {index} is not finite")]
    NotFinite { index: usize },
}

/// Checks that `value` is finite and inside `range`.
pub fn check_range(
    field: &'static str,
    value: f32,
    range: &RangeInclusive<f32>,
) -> Result<f32, ValidationError> {
    check_finite(field, value)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

pub fn check_finite(field: &'static str, value: f32) -> Result<f32, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

pub fn check_point(field: &'static str, point: Point) -> Result<Point, ValidationError> {
    if point.is_finite() {
        Ok(point)
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

/// A volume is either absent or a finite number.
pub fn check_volume(volume: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match volume {
        Some(v) if !v.is_finite() => Err(ValidationError::NotFinite { field: "volume" }),
        other => Ok(other),
    }
}

pub fn parse_color(field: &'static str, value: &str) -> Result<HexColor, ValidationError> {
    value
        .parse()
        .map_err(|source| ValidationError::Color { field, source })
}

/// Checks an edge's points: at least two, all finite, no point equal to the
/// one before it.
pub fn check_segments(points: &[Point]) -> Result<(), SegmentError> {
    if points.len() < 2 {
        return Err(SegmentError::TooFew(points.len()));
    }
    for (index, point) in points.iter().enumerate() {
        if !point.is_finite() {
            return Err(SegmentError::NotFinite { index });
        }
        if index > 0 && points[index - 1] == *point {
            return Err(SegmentError::ConsecutiveDuplicate { index });
        }
    }
    Ok(())
}
