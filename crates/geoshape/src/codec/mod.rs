//! Binary encoding/decoding for shapes.
//!
//! This module implements the legacy spatial payload: a version byte, a
//! properties byte, the vertex table and, unless the shape is a single point
//! or a single line segment, the figure and shape tables.

pub mod primitives;
pub mod shape;

pub use primitives::{Reader, Writer};
pub use shape::{decode_shape, decode_shape_from, encode_shape, encode_shape_into};
