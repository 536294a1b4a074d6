//! Named bit fields and the raw definitions they are loaded from.

use std::fmt;

/// A validated named bit range `high..=low` (LSB = bit 0).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    /// Case-sensitive name, unique within a [crate::field_map::FieldMap].
    pub name: String,
    /// Lowest bit of the field.
    pub low: usize,
    /// Highest bit of the field, `>= low`.
    pub high: usize,
}

impl FieldSpec {
    pub fn is_single_bit(&self) -> bool {
        self.low == self.high
    }
}

/// Formats as `name: bit low-high`.
impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_bit() {
            write!(f, "{}: bit {}", self.name, self.low)
        } else {
            write!(f, "{}: bit {}-{}", self.name, self.low, self.high)
        }
    }
}

/// An unvalidated field definition, as decoded from an external source.
///
/// Bit positions are signed so that out-of-range input survives decoding and is rejected by
/// [crate::field_map::FieldMap::load] with a precise cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSource {
    pub name: String,
    pub range: SourceRange,
}

impl FieldSource {
    pub fn span(name: impl Into<String>, low: i64, high: i64) -> Self {
        FieldSource {
            name: name.into(),
            range: SourceRange::Span { low, high },
        }
    }

    pub fn bit(name: impl Into<String>, bit: i64) -> Self {
        FieldSource {
            name: name.into(),
            range: SourceRange::Bit(bit),
        }
    }
}

/// Bit range of a [FieldSource]: an explicit span or a single bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRange {
    Span { low: i64, high: i64 },
    Bit(i64),
}

impl SourceRange {
    /// `(low, high)`, with a single bit normalized to `low == high`.
    pub fn bounds(self) -> (i64, i64) {
        match self {
            SourceRange::Span { low, high } => (low, high),
            SourceRange::Bit(bit) => (bit, bit),
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::FieldDef> for FieldSource {
    fn from(value: crate::serde::FieldDef) -> Self {
        FieldSource {
            name: value.name,
            range: value.range.into(),
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::RangeDef> for SourceRange {
    fn from(value: crate::serde::RangeDef) -> Self {
        match value {
            crate::serde::RangeDef::Span { low, high } => SourceRange::Span { low, high },
            crate::serde::RangeDef::Bit { bit } => SourceRange::Bit(bit),
        }
    }
}
