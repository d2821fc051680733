//! Tailrace Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Tailrace flow
//! diagram editor. It includes:
//!
//! - **Colors**: CSS color handling ([`color::Color`]) and validated hex
//!   colors as stored in diagram files ([`color::HexColor`])
//! - **Geometry**: Points, sizes, bounds, anchors and segment math ([`geometry`] module)
//! - **Draw**: Visual definitions for shapes, strokes, text and arrowheads ([`draw`] module)

pub mod color;
pub mod draw;
pub mod geometry;
