//! Primitive encoding/decoding for the shape payload.
//!
//! All multi-byte values are little-endian: counts and offsets are signed
//! 32-bit integers, coordinates are IEEE 754 doubles.

use crate::error::DecodeError;

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and provides methods for reading primitives
/// with bounds checking and error handling.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        if self.pos >= self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly N bytes.
    #[inline]
    pub fn read_array<const N: usize>(
        &mut self,
        context: &'static str,
    ) -> Result<[u8; N], DecodeError> {
        if self.remaining_len() < N {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(bytes)
    }

    /// Reads a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self, context: &'static str) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.read_array(context)?))
    }

    /// Reads a little-endian f64. NaN is a legal value (missing Z/M).
    #[inline]
    pub fn read_f64(&mut self, context: &'static str) -> Result<f64, DecodeError> {
        Ok(f64::from_le_bytes(self.read_array(context)?))
    }

    /// Reads a non-negative i32 count.
    ///
    /// Besides `max`, the count is bounded by the bytes left in the input:
    /// each element occupies at least `min_element_size` bytes. This keeps
    /// allocations proportional to the input.
    pub fn read_count(
        &mut self,
        field: &'static str,
        max: usize,
        min_element_size: usize,
    ) -> Result<usize, DecodeError> {
        let count = self.read_i32(field)?;
        if count < 0 {
            return Err(DecodeError::NegativeCount { field, count });
        }
        let count = count as usize;
        if count > max {
            return Err(DecodeError::LengthExceedsLimit {
                field,
                len: count,
                max,
            });
        }
        if count.saturating_mul(min_element_size) > self.remaining_len() {
            return Err(DecodeError::UnexpectedEof { context: field });
        }
        Ok(count)
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a little-endian i32.
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian f64.
    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i32_roundtrip() {
        for v in [0i32, 1, -1, 255, 256, i32::MAX, i32::MIN] {
            let mut writer = Writer::new();
            writer.write_i32(v);
            assert_eq!(writer.len(), 4);

            let mut reader = Reader::new(writer.as_bytes());
            assert_eq!(reader.read_i32("test").unwrap(), v, "failed for {}", v);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn test_i32_little_endian() {
        let mut writer = Writer::new();
        writer.write_i32(1);
        assert_eq!(writer.as_bytes(), &[1, 0, 0, 0]);
    }

    #[test]
    fn test_f64_nan_preserved() {
        let mut writer = Writer::new();
        writer.write_f64(f64::NAN);

        let mut reader = Reader::new(writer.as_bytes());
        assert!(reader.read_f64("test").unwrap().is_nan());
    }

    #[test]
    fn test_negative_count_rejected() {
        let mut writer = Writer::new();
        writer.write_i32(-3);

        let mut reader = Reader::new(writer.as_bytes());
        let result = reader.read_count("figures", 100, 5);
        assert!(matches!(
            result,
            Err(DecodeError::NegativeCount { count: -3, .. })
        ));
    }

    #[test]
    fn test_count_bounded_by_input() {
        let mut writer = Writer::new();
        writer.write_i32(1000);
        writer.write_bytes(&[0u8; 16]);

        let mut reader = Reader::new(writer.as_bytes());
        let result = reader.read_count("vertices", usize::MAX, 16);
        assert!(matches!(result, Err(DecodeError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_unexpected_eof() {
        let data = [0u8; 5];
        let mut reader = Reader::new(&data);
        reader.read_i32("first").unwrap();
        let result = reader.read_i32("second");
        assert_eq!(result, Err(DecodeError::UnexpectedEof { context: "second" }));
    }
}
