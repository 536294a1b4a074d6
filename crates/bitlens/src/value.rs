//! The width-tagged value produced by parsing a literal.

use std::fmt;

use crate::bits::{Magnitude, round_up};

/// Widest value a literal may declare explicitly.
pub const MAX_BIT_WIDTH: usize = 1 << 16;

/// Granularity used when a literal has no explicit width.
pub const IMPLICIT_WIDTH_UNIT: usize = 8;

/// An unsigned magnitude together with the number of bits it occupies.
///
/// Invariant: `magnitude < 2^bit_width` and `bit_width >= 1`. Values are never mutated;
/// extraction and comparison build new ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedValue {
    magnitude: Magnitude,
    bit_width: usize,
}

impl ParsedValue {
    /// Creates a value of `bit_width` bits, keeping only the low `bit_width` bits of
    /// `magnitude`. Callers have already rejected a zero width.
    pub(crate) fn new(magnitude: Magnitude, bit_width: usize) -> Self {
        debug_assert!(bit_width > 0, "bit width must be positive");
        ParsedValue {
            magnitude: magnitude.masked(bit_width),
            bit_width,
        }
    }

    /// Creates a value whose width is the magnitude's length rounded up to a byte, minimum 8.
    pub fn with_implicit_width(magnitude: Magnitude) -> Self {
        let bit_width = round_up(magnitude.bit_len(), IMPLICIT_WIDTH_UNIT);
        ParsedValue {
            magnitude,
            bit_width: bit_width.max(IMPLICIT_WIDTH_UNIT),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_u64(value: u64, bit_width: usize) -> Self {
        Self::new(Magnitude::from_u64(value), bit_width)
    }

    pub fn magnitude(&self) -> &Magnitude {
        &self.magnitude
    }

    pub fn bit_width(&self) -> usize {
        self.bit_width
    }

    /// Number of whole or partial bytes covered by `bit_width`.
    pub fn byte_len(&self) -> usize {
        self.bit_width.div_ceil(8)
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.magnitude.to_u64()
    }
}

/// Formats as a Verilog hex literal, e.g. `12'ha3f`.
impl fmt::Display for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.bit_width.div_ceil(4);
        write!(f, "{}'h", self.bit_width)?;
        for nibble in (0..digits).rev() {
            write!(f, "{:x}", self.magnitude.chunk(nibble * 4, 4))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_masks_to_width() {
        let value = ParsedValue::from_u64(0xFF, 4);
        assert_eq!(value.to_u64(), Some(0xF));
        assert_eq!(value.bit_width(), 4);
    }

    fn implicit_width(value: u64) -> usize {
        ParsedValue::with_implicit_width(Magnitude::from_u64(value)).bit_width()
    }

    #[test]
    fn test_implicit_width() {
        assert_eq!(implicit_width(0), 8);
        assert_eq!(implicit_width(0xFF), 8);
        assert_eq!(implicit_width(0x100), 16);
        assert_eq!(implicit_width(0x1234), 16);
    }

    #[test]
    fn test_display() {
        assert_eq!(ParsedValue::from_u64(0xA3F, 12).to_string(), "12'ha3f");
        assert_eq!(ParsedValue::from_u64(1, 1).to_string(), "1'h1");
        assert_eq!(ParsedValue::from_u64(0x5, 16).to_string(), "16'h0005");
    }
}
