//! Geoshape: a flattened OGC Simple-Features shape model with two codecs.
//!
//! This crate provides the in-memory geometry representation, the builder
//! used to construct it, a bit-exact binary codec compatible with a legacy
//! relational database's spatial payload, and a WKT reader/writer.
//!
//! # Overview
//!
//! A [`ShapeModel`] stores points, lines, polygons and their multi/collection
//! variants as flat tables addressed by offsets:
//! - **Vertices** with optional per-vertex Z and M values
//! - **Figures**: contiguous vertex runs (rings, lines, points)
//! - **Shapes**: tree nodes in pre-order with parent links
//!
//! Sub-geometries (collection members, polygon rings) are extracted from the
//! tables directly, without rebuilding the tree.
//!
//! # Quick Start
//!
//! ```rust
//! use geoshape::{decode_shape, encode_shape, parse_wkt, write_wkt};
//! use geoshape::{GeometryType, WktReadOptions, WktWriteOptions};
//!
//! // Parse WKT
//! let model = parse_wkt(
//!     "GEOMETRYCOLLECTION (POINT (10 11), LINESTRING (20 30, 20 40))",
//!     WktReadOptions::new(),
//! )
//! .unwrap();
//! assert_eq!(model.num_geometries(), 2);
//!
//! // Extract a member
//! let line = model.get_geometry_n(2).unwrap();
//! assert_eq!(line.geometry_type(), GeometryType::LineString);
//!
//! // Encode to binary and decode back
//! let bytes = encode_shape(&model).unwrap();
//! let decoded = decode_shape(&bytes).unwrap();
//! assert_eq!(model, decoded);
//!
//! // Write WKT
//! assert_eq!(
//!     write_wkt(&line, WktWriteOptions::new()),
//!     "LINESTRING (20 30, 20 40)"
//! );
//! ```
//!
//! # Modules
//!
//! - [`model`]: Shape model, geometry types and the builder
//! - [`codec`]: Binary encoding/decoding
//! - [`wkt`]: WKT reading and writing
//! - [`validate`]: Structural validation
//! - [`error`]: Error types
//! - [`limits`]: Wire constants and limits
//!
//! # Security
//!
//! The decoders are designed to safely handle untrusted input:
//! - Counts are checked against the remaining input before allocating
//! - Decoded tables are structurally validated before use
//! - WKT nesting is bounded by a configurable depth
//!
//! # Wire Format
//!
//! A payload is a version byte, a properties byte, a vertex count, the XY
//! vertex table, then the Z and M sections when the properties flag them,
//! then the figure and shape tables. All numbers are little-endian.
//!
//! Single points and single two-vertex line strings use a compact layout:
//! the vertex count and both tables are left out, but the Z and M sections
//! are still written after the XY values.

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod validate;
pub mod wkt;

// Re-export commonly used types at crate root
pub use codec::{decode_shape, decode_shape_from, encode_shape, encode_shape_into};
pub use error::{BuildError, DecodeError, EncodeError, ErrorCode, ValidationError, WktError};
pub use model::{
    Coordinate, Figure, FigureAttribute, GeometrySink, GeometryType, Shape, ShapeBuilder,
    ShapeModel, Vertex,
};
pub use validate::validate_structure;
pub use wkt::{
    CoordinateOrder, Wkt, WktReadOptions, WktWriteOptions, parse_wkt, read_wkt, write_wkt,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
