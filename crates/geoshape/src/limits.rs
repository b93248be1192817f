//! Wire constants and security limits.

/// Payload version written by the encoder.
pub const FORMAT_VERSION: u8 = 1;

/// Oldest payload version the decoder accepts.
pub const MIN_FORMAT_VERSION: u8 = 1;

/// Default nesting bound for WKT collections.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Counts are written as signed 32-bit integers.
pub const MAX_VERTICES: usize = i32::MAX as usize;
pub const MAX_FIGURES: usize = i32::MAX as usize;
pub const MAX_SHAPES: usize = i32::MAX as usize;

// Properties byte
pub const PROP_HAS_Z: u8 = 0x01;
pub const PROP_HAS_M: u8 = 0x02;
pub const PROP_IS_VALID: u8 = 0x04;
pub const PROP_IS_SINGLE_POINT: u8 = 0x08;
pub const PROP_IS_SINGLE_LINE_SEGMENT: u8 = 0x10;
pub const PROP_IS_LARGER_THAN_A_HEMISPHERE: u8 = 0x20;
