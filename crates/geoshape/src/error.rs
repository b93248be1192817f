//! Error types for shape encoding/decoding, WKT parsing and construction.

use thiserror::Error;

use crate::model::{FigureAttribute, GeometryType};

/// Error classes shared by every failure surface of the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// S001: Invalid or unsupported payload version
    UnsupportedVersion,
    /// S002: Malformed binary payload
    MalformedBinary,
    /// S003: Malformed WKT text
    MalformedWkt,
    /// S004: Illegal builder call sequence
    InvalidCallSequence,
    /// S005: Curve/arc operation that is not implemented
    Unsupported,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "S001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::UnsupportedVersion => "S001",
            ErrorCode::MalformedBinary => "S002",
            ErrorCode::MalformedWkt => "S003",
            ErrorCode::InvalidCallSequence => "S004",
            ErrorCode::Unsupported => "S005",
        }
    }

    /// Returns true for every class that signals malformed input rather
    /// than a missing capability.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, ErrorCode::Unsupported)
    }
}

/// Error during binary decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === S001: Unsupported version ===
    #[error("[S001] unsupported version: {version}")]
    UnsupportedVersion { version: u8 },

    // === S002: Malformed payload ===
    #[error("[S002] unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("[S002] {field} count {count} is negative")]
    NegativeCount { field: &'static str, count: i32 },

    #[error("[S002] {field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("[S002] reserved bits are non-zero in {context}")]
    ReservedBitsSet { context: &'static str },

    #[error("[S002] malformed encoding: {context}")]
    MalformedEncoding { context: &'static str },

    #[error("[S002] invalid figure attribute: {value}")]
    InvalidFigureAttribute { value: u8 },

    #[error("[S002] invalid geometry type: {value}")]
    InvalidGeometryType { value: u8 },

    #[error("[S002] {count} trailing bytes after shape payload")]
    TrailingBytes { count: usize },

    #[error("[S002] {0}")]
    Structure(#[from] ValidationError),

    // === S005: Unsupported ===
    #[error("[S005] geometry type {kind:?} is not supported")]
    UnsupportedGeometryType { kind: GeometryType },
}

impl DecodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::UnsupportedVersion { .. } => ErrorCode::UnsupportedVersion,
            DecodeError::UnsupportedGeometryType { .. } => ErrorCode::Unsupported,
            _ => ErrorCode::MalformedBinary,
        }
    }
}

/// Error during binary encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("geometry type {kind:?} is not supported")]
    UnsupportedGeometryType { kind: GeometryType },

    #[error("figure attribute {attribute:?} is not supported")]
    UnsupportedFigureAttribute { attribute: FigureAttribute },
}

impl EncodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EncodeError::LengthExceedsLimit { .. } => ErrorCode::MalformedBinary,
            EncodeError::UnsupportedGeometryType { .. }
            | EncodeError::UnsupportedFigureAttribute { .. } => ErrorCode::Unsupported,
        }
    }
}

/// Error raised by an illegal sequence of builder/sink calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("[S004] expected {expected}, got {actual}")]
    InvalidCall {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("[S004] AddLine is not allowed inside a point; points take a single coordinate")]
    LineInPoint,

    #[error("[S004] a point takes exactly one coordinate")]
    PointHasCoordinate,

    #[error("[S004] a point has at most one figure")]
    PointHasFigure,

    #[error("[S004] no geometry was started")]
    NoGeometry,

    #[error("[S004] {depth} geometries or figures left open")]
    Unclosed { depth: usize },

    #[error("[S004] the root geometry is already closed")]
    RootClosed,

    #[error("[S005] geometry type {kind:?} is not supported")]
    UnsupportedGeometryType { kind: GeometryType },

    #[error("[S005] circular arcs are not supported")]
    UnsupportedArc,
}

impl BuildError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BuildError::UnsupportedGeometryType { .. } | BuildError::UnsupportedArc => {
                ErrorCode::Unsupported
            }
            _ => ErrorCode::InvalidCallSequence,
        }
    }
}

/// Error during WKT parsing.
///
/// Positions are byte offsets into the input text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WktError {
    #[error("[S003] empty input")]
    EmptyInput,

    #[error("[S003] expected {expected} at position {position}, found {found:?}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        position: usize,
    },

    #[error("[S003] expected {expected} at position {position}, found end of input")]
    UnexpectedEnd {
        expected: &'static str,
        position: usize,
    },

    #[error("[S003] unrecognized geometry tag {tag:?} at position {position}")]
    UnknownTag { tag: String, position: usize },

    #[error("[S005] geometry tag {tag:?} at position {position} is not supported")]
    UnsupportedTag { tag: String, position: usize },

    #[error("[S003] expected a number at position {position}, found {token:?}")]
    InvalidNumber { token: String, position: usize },

    #[error("[S003] nesting exceeds maximum depth {max} at position {position}")]
    NestingTooDeep { max: usize, position: usize },

    #[error("{0}")]
    Build(#[from] BuildError),
}

impl WktError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            WktError::UnsupportedTag { .. } => ErrorCode::Unsupported,
            WktError::Build(e) => e.code(),
            _ => ErrorCode::MalformedWkt,
        }
    }
}

/// Structural invariant violation in a shape model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("shape model has no root shape")]
    MissingRoot,

    #[error("root shape has parent {parent} (expected -1)")]
    InvalidRootParent { parent: i32 },

    #[error("shape {shape} has parent {parent} which does not precede it")]
    InvalidParent { shape: usize, parent: i32 },

    #[error("shape {shape} figure offset {offset} out of range (figures: {figures})")]
    FigureOffsetOutOfRange {
        shape: usize,
        offset: i32,
        figures: usize,
    },

    #[error("shape {shape} figure offset {offset} precedes an earlier shape's offset")]
    FigureOffsetNotMonotonic { shape: usize, offset: i32 },

    #[error("figure {figure} vertex offset {offset} out of range (vertices: {vertices})")]
    VertexOffsetOutOfRange {
        figure: usize,
        offset: i32,
        vertices: usize,
    },

    #[error("figure {figure} vertex offset {offset} precedes the previous figure's offset")]
    VertexOffsetNotMonotonic { figure: usize, offset: i32 },

    #[error("{dimension} array has {len} values for {vertices} vertices")]
    MisalignedDimension {
        dimension: &'static str,
        len: usize,
        vertices: usize,
    },
}
