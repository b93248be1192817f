//! Well-Known Text reading and writing.
//!
//! The reader drives any [`GeometrySink`](crate::GeometrySink); the writer
//! walks a [`ShapeModel`]. Both honor a [`CoordinateOrder`] so a geodetic
//! caller can keep "long lat" text while storing latitude first.

pub mod reader;
pub mod writer;

use std::fmt;
use std::str::FromStr;

use crate::error::WktError;
use crate::limits::MAX_NESTING_DEPTH;
use crate::model::ShapeModel;

pub use reader::{parse_wkt, read_wkt};
pub use writer::{Wkt, write_wkt};

/// Order of the two leading numbers of a WKT coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateOrder {
    /// The first number is X, the second Y.
    #[default]
    XY,
    /// Text is "long lat"; the second number is stored first.
    LatLong,
}

/// Options for reading WKT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WktReadOptions {
    pub order: CoordinateOrder,
    /// Maximum nesting of tagged geometries (the root counts as 1).
    pub max_depth: usize,
}

impl Default for WktReadOptions {
    fn default() -> Self {
        Self {
            order: CoordinateOrder::XY,
            max_depth: MAX_NESTING_DEPTH,
        }
    }
}

impl WktReadOptions {
    /// Creates default XY reading options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for geodetic ("long lat") text.
    pub fn lat_long() -> Self {
        Self {
            order: CoordinateOrder::LatLong,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Options for writing WKT.
///
/// Z and M values are only written when requested and present for the
/// vertex; missing values are never padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WktWriteOptions {
    pub order: CoordinateOrder,
    pub emit_z: bool,
    pub emit_m: bool,
}

impl WktWriteOptions {
    /// Creates default XY options without Z/M output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for geodetic ("long lat") text.
    pub fn lat_long() -> Self {
        Self {
            order: CoordinateOrder::LatLong,
            ..Self::default()
        }
    }

    pub fn with_z(mut self) -> Self {
        self.emit_z = true;
        self
    }

    pub fn with_m(mut self) -> Self {
        self.emit_m = true;
        self
    }
}

/// Writes XY-ordered WKT including any Z and M values.
impl fmt::Display for ShapeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Wkt::new(self, WktWriteOptions::new().with_z().with_m()), f)
    }
}

/// Parses XY-ordered WKT.
impl FromStr for ShapeModel {
    type Err = WktError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_wkt(s, WktReadOptions::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_from_str() {
        let model: ShapeModel = "linestring (1 2 3, 4 5 6)".parse().unwrap();
        assert_eq!(model.to_string(), "LINESTRING (1 2 3, 4 5 6)");
    }

    #[test]
    fn test_options_builders() {
        let read = WktReadOptions::lat_long().with_max_depth(4);
        assert_eq!(read.order, CoordinateOrder::LatLong);
        assert_eq!(read.max_depth, 4);

        let write = WktWriteOptions::new().with_m();
        assert!(!write.emit_z);
        assert!(write.emit_m);
        assert_eq!(write.order, CoordinateOrder::XY);
    }
}
