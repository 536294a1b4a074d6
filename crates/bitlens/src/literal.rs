//! Literal parser for Verilog-style and plain numeric text.
//!
//! Accepted forms, tried in order:
//! 1. `<width>'<radix><digits>`, e.g. `8'hFF`, `12'b1010_0000_1111`
//! 2. `'<radix><digits>`, e.g. `'b1010_0011`
//! 3. `0x<hex>` / `0b<binary>`
//! 4. a bare digit run, read in the radix of the [InputMode] (decimal by default)
//!
//! Radix markers and prefixes are case-insensitive. `_` may separate digits but cannot start
//! or end a digit run. Surrounding whitespace is trimmed; whitespace inside is an error.

use std::{fmt, str::FromStr};

use log::trace;

use crate::{
    bits::Magnitude,
    errors::ParseError,
    value::{MAX_BIT_WIDTH, ParsedValue},
};

/// Numeric base of a digit run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Binary,
    Decimal,
    Hex,
}

impl Radix {
    /// Maps a Verilog radix marker (`h`, `b`, `d`, any case).
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker.to_ascii_lowercase() {
            'h' => Some(Radix::Hex),
            'b' => Some(Radix::Binary),
            'd' => Some(Radix::Decimal),
            _ => None,
        }
    }

    pub fn base(self) -> u32 {
        match self {
            Radix::Binary => 2,
            Radix::Decimal => 10,
            Radix::Hex => 16,
        }
    }
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Radix::Binary => "binary",
            Radix::Decimal => "decimal",
            Radix::Hex => "hex",
        };
        f.write_str(name)
    }
}

/// How a bare digit run (no prefix, no radix marker) is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Bare digits are decimal.
    #[default]
    Auto,
    Hex,
    Decimal,
    Binary,
}

impl InputMode {
    pub fn bare_radix(self) -> Radix {
        match self {
            InputMode::Auto | InputMode::Decimal => Radix::Decimal,
            InputMode::Hex => Radix::Hex,
            InputMode::Binary => Radix::Binary,
        }
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(InputMode::Auto),
            "hex" => Ok(InputMode::Hex),
            "dec" | "decimal" => Ok(InputMode::Decimal),
            "bin" | "binary" => Ok(InputMode::Binary),
            other => Err(format!("unknown input mode: {other}")),
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputMode::Auto => "auto",
            InputMode::Hex => "hex",
            InputMode::Decimal => "dec",
            InputMode::Binary => "bin",
        };
        f.write_str(name)
    }
}

/// Parses `text` with bare digit runs read as decimal.
pub fn parse(text: &str) -> Result<ParsedValue, ParseError> {
    parse_with_mode(text, InputMode::Auto)
}

/// Parses `text`, reading a bare digit run in the radix selected by `mode`.
pub fn parse_with_mode(text: &str, mode: InputMode) -> Result<ParsedValue, ParseError> {
    let literal = text.trim();
    trace!("parsing literal {literal:?} in {mode} mode");

    if literal.is_empty() {
        return Err(ParseError::Empty);
    }
    if literal.contains(char::is_whitespace) {
        return Err(ParseError::InternalWhitespace(literal.to_string()));
    }

    if let Some((width, rest)) = literal.split_once('\'') {
        let width = match width {
            "" => None,
            width => Some(parse_width(width)?),
        };

        let mut chars = rest.chars();
        let radix = match chars.next() {
            Some(marker) => Radix::from_marker(marker)
                .ok_or_else(|| ParseError::UnknownRadix(marker.to_string()))?,
            None => return Err(ParseError::MissingDigits(literal.to_string())),
        };

        return match width {
            Some(width) => {
                let magnitude = parse_digits(chars.as_str(), radix, literal, width)?;
                Ok(ParsedValue::new(magnitude, width))
            }
            None => {
                let magnitude = parse_digits(chars.as_str(), radix, literal, usize::MAX)?;
                Ok(ParsedValue::with_implicit_width(magnitude))
            }
        };
    }

    let (digits, radix) = if let Some(digits) = strip_prefix_ignore_case(literal, "0x") {
        (digits, Radix::Hex)
    } else if let Some(digits) = strip_prefix_ignore_case(literal, "0b") {
        (digits, Radix::Binary)
    } else {
        (literal, mode.bare_radix())
    };

    let magnitude = parse_digits(digits, radix, literal, usize::MAX)?;
    Ok(ParsedValue::with_implicit_width(magnitude))
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

fn parse_width(text: &str) -> Result<usize, ParseError> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidWidth(text.to_string()));
    }

    let width: usize = text
        .parse()
        .map_err(|_| ParseError::WidthTooLarge(text.to_string()))?;

    if width == 0 {
        return Err(ParseError::InvalidWidth(text.to_string()));
    }
    if width > MAX_BIT_WIDTH {
        return Err(ParseError::WidthTooLarge(text.to_string()));
    }

    Ok(width)
}

/// Validates every digit, then keeps the low `width` bits of the value.
fn parse_digits(
    digits: &str,
    radix: Radix,
    literal: &str,
    width: usize,
) -> Result<Magnitude, ParseError> {
    if digits.is_empty() {
        return Err(ParseError::MissingDigits(literal.to_string()));
    }
    if digits.starts_with('_') || digits.ends_with('_') {
        return Err(ParseError::MisplacedSeparator(digits.to_string()));
    }

    let mut values = Vec::with_capacity(digits.len());
    for c in digits.chars().filter(|&c| c != '_') {
        let value = c
            .to_digit(radix.base())
            .ok_or(ParseError::InvalidDigit { digit: c, radix })?;
        values.push(value as u8);
    }

    Ok(Magnitude::from_digits_masked(&values, radix.base(), width))
}
