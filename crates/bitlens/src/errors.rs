//! Error types for literal parsing, field-map loading and bit extraction.

use std::fmt;

use crate::literal::Radix;

/// Errors produced by [crate::literal::parse]. Every variant means the text is not a valid
/// literal; [ParseError::offending] returns the part of the input that was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input is empty or whitespace only.
    Empty,
    /// Whitespace appears inside the literal.
    InternalWhitespace(String),
    /// Character after `'` is not one of `h`, `b`, `d`.
    UnknownRadix(String),
    /// Width prefix is not a decimal integer >= 1.
    InvalidWidth(String),
    /// Width prefix is larger than [crate::value::MAX_BIT_WIDTH].
    WidthTooLarge(String),
    /// Radix marker or prefix is not followed by any digit.
    MissingDigits(String),
    /// Character outside the digit set of the radix.
    InvalidDigit { digit: char, radix: Radix },
    /// `_` at the start or end of a digit run.
    MisplacedSeparator(String),
}

impl ParseError {
    /// The substring of the input the parser rejected.
    pub fn offending(&self) -> String {
        match self {
            ParseError::Empty => String::new(),
            ParseError::InternalWhitespace(text)
            | ParseError::UnknownRadix(text)
            | ParseError::InvalidWidth(text)
            | ParseError::WidthTooLarge(text)
            | ParseError::MissingDigits(text)
            | ParseError::MisplacedSeparator(text) => text.clone(),
            ParseError::InvalidDigit { digit, .. } => digit.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "invalid literal: empty input"),
            ParseError::InternalWhitespace(text) => {
                write!(f, "invalid literal '{text}': contains whitespace")
            }
            ParseError::UnknownRadix(text) => write!(
                f,
                "invalid literal: unknown radix '{text}' (expected h, b or d)"
            ),
            ParseError::InvalidWidth(text) => write!(
                f,
                "invalid literal: width '{text}' must be a decimal integer >= 1"
            ),
            ParseError::WidthTooLarge(text) => write!(
                f,
                "invalid literal: width {text} exceeds {} bits",
                crate::value::MAX_BIT_WIDTH
            ),
            ParseError::MissingDigits(text) => write!(f, "invalid literal '{text}': no digits"),
            ParseError::InvalidDigit { digit, radix } => {
                write!(f, "invalid literal: '{digit}' is not a {radix} digit")
            }
            ParseError::MisplacedSeparator(text) => write!(
                f,
                "invalid literal '{text}': '_' cannot start or end a digit run"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Causes of an invalid field map. A failed load never replaces the current map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMapError {
    /// Field at this position has an empty name.
    EmptyName { index: usize },
    /// Two fields share a name.
    DuplicateName(String),
    /// Field range has `low > high`.
    InvertedRange { name: String, low: i64, high: i64 },
    /// Field range uses a negative bit position.
    NegativeBit { name: String, bit: i64 },
    /// Field `high` bit is at or beyond the configured maximum width.
    ExceedsMaxWidth { name: String, high: i64, max_width: usize },
}

impl fmt::Display for FieldMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldMapError::EmptyName { index } => {
                write!(f, "invalid field map: field #{index} has an empty name")
            }
            FieldMapError::DuplicateName(name) => {
                write!(f, "invalid field map: duplicate name {name}")
            }
            FieldMapError::InvertedRange { name, low, high } => write!(
                f,
                "invalid field map: {name} has range low>high ({low} > {high})"
            ),
            FieldMapError::NegativeBit { name, bit } => {
                write!(f, "invalid field map: {name} uses negative bit {bit}")
            }
            FieldMapError::ExceedsMaxWidth {
                name,
                high,
                max_width,
            } => write!(
                f,
                "invalid field map: {name} bit {high} exceeds maximum width {max_width}"
            ),
        }
    }
}

impl std::error::Error for FieldMapError {}

/// Errors produced when extracting a bit range or named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Name is not present in the field map.
    FieldNotFound(String),
    /// `low > high`, or `high` is at or beyond the value's bit width.
    RangeOutOfBounds {
        low: usize,
        high: usize,
        bit_width: usize,
    },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::FieldNotFound(name) => write!(f, "field not found: {name}"),
            ExtractError::RangeOutOfBounds {
                low,
                high,
                bit_width,
            } if low > high => write!(
                f,
                "range out of bounds: low {low} is above high {high} (value is {bit_width} bits)"
            ),
            ExtractError::RangeOutOfBounds {
                low,
                high,
                bit_width,
            } => write!(
                f,
                "range out of bounds: bits {low}-{high} exceed a {bit_width}-bit value"
            ),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Any error an engine operation can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Parse(ParseError),
    FieldMap(FieldMapError),
    Extract(ExtractError),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<FieldMapError> for Error {
    fn from(err: FieldMapError) -> Self {
        Error::FieldMap(err)
    }
}

impl From<ExtractError> for Error {
    fn from(err: ExtractError) -> Self {
        Error::Extract(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::FieldMap(err) => err.fmt(f),
            Error::Extract(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::FieldMap(err) => Some(err),
            Error::Extract(err) => Some(err),
        }
    }
}
