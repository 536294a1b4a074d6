//! Text rendering of [ParsedValue]s: hex, decimal and binary, grouped by byte or 32-bit word.
//!
//! [render] produces a single literal-style line. [breakdown] and [render_breakdown] produce
//! the aligned per-unit view, where every byte (and, for [Alignment::DWord], every word) is
//! labelled with its absolute `[high:low]` bit range, highest unit first.

use std::{fmt, fmt::Write as _, str::FromStr};

use crate::{bits::round_up, value::ParsedValue};

/// Bits per row in the labelled binary view.
const BITS_PER_ROW: usize = 16;
/// Column width of one bit cell in the labelled binary view.
const CELL_WIDTH: usize = 6;

/// Numeric base used for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Hex,
    Decimal,
    Binary,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Ok(OutputFormat::Hex),
            "dec" | "decimal" => Ok(OutputFormat::Decimal),
            "bin" | "binary" => Ok(OutputFormat::Binary),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Hex => "hex",
            OutputFormat::Decimal => "dec",
            OutputFormat::Binary => "bin",
        };
        f.write_str(name)
    }
}

/// Grouping unit for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// 8-bit units.
    #[default]
    Byte,
    /// 32-bit units.
    DWord,
}

impl Alignment {
    pub fn unit_bits(self) -> usize {
        match self {
            Alignment::Byte => 8,
            Alignment::DWord => 32,
        }
    }
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "byte_align" | "byte" => Ok(Alignment::Byte),
            "dw_align" | "dword" | "dw" => Ok(Alignment::DWord),
            other => Err(format!("unknown alignment: {other}")),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Alignment::Byte => "byte_align",
            Alignment::DWord => "dw_align",
        };
        f.write_str(name)
    }
}

/// Presentation settings. They never change parsing or numeric results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayOptions {
    pub output_format: OutputFormat,
    pub alignment: Alignment,
}

impl DisplayOptions {
    pub fn new(output_format: OutputFormat, alignment: Alignment) -> Self {
        DisplayOptions {
            output_format,
            alignment,
        }
    }
}

/// Renders `value` as one line.
///
/// - hex: `<width>'h` then digits zero-padded to a whole number of units, `_` between units
/// - decimal: the plain magnitude
/// - binary: `<width>'b` then exactly `width` bits, `_` at every unit boundary
pub fn render(value: &ParsedValue, options: &DisplayOptions) -> String {
    match options.output_format {
        OutputFormat::Hex => render_hex(value, options.alignment),
        OutputFormat::Decimal => value.magnitude().to_decimal_string(),
        OutputFormat::Binary => render_binary(value, options.alignment),
    }
}

fn render_hex(value: &ParsedValue, alignment: Alignment) -> String {
    let unit = alignment.unit_bits();
    let padded = round_up(value.bit_width(), unit);
    let digits_per_unit = unit / 4;

    let mut out = format!("{}'h", value.bit_width());
    for (i, nibble) in (0..padded / 4).rev().enumerate() {
        if i > 0 && i % digits_per_unit == 0 {
            out.push('_');
        }
        let digit = value.magnitude().chunk(nibble * 4, 4);
        let _ = write!(out, "{digit:x}");
    }
    out
}

fn render_binary(value: &ParsedValue, alignment: Alignment) -> String {
    let unit = alignment.unit_bits();
    let mut out = format!("{}'b", value.bit_width());
    out.push_str(&grouped_bits(value, unit));
    out
}

fn grouped_bits(value: &ParsedValue, unit: usize) -> String {
    let mut out = String::with_capacity(value.bit_width() + value.bit_width() / unit);
    for bit in (0..value.bit_width()).rev() {
        out.push(if value.magnitude().bit(bit) { '1' } else { '0' });
        if bit > 0 && bit % unit == 0 {
            out.push('_');
        }
    }
    out
}

/// Exactly `bit_width` binary digits, most significant first, no prefix or separators.
pub fn binary_digits(value: &ParsedValue) -> String {
    (0..value.bit_width())
        .rev()
        .map(|bit| if value.magnitude().bit(bit) { '1' } else { '0' })
        .collect()
}

/// One byte or word of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit {
    /// Position counted from the least significant unit.
    pub index: usize,
    pub low: usize,
    /// True upper bit; below `low + unit - 1` for a partial top unit.
    pub high: usize,
    pub value: u64,
}

impl Unit {
    pub fn width(&self) -> usize {
        self.high - self.low + 1
    }
}

/// A 32-bit word with its aggregate value and the bytes it holds, highest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub unit: Unit,
    pub bytes: Vec<Unit>,
}

/// The aligned per-unit view of a value, highest unit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Breakdown {
    Bytes(Vec<Unit>),
    Words(Vec<Word>),
}

impl Breakdown {
    pub fn byte_count(&self) -> usize {
        match self {
            Breakdown::Bytes(bytes) => bytes.len(),
            Breakdown::Words(words) => words.iter().map(|word| word.bytes.len()).sum(),
        }
    }
}

/// Splits `value` into units of `unit_bits` starting at `first_low`, stopping at the value's
/// width or after `count` units. Returned highest first.
fn units(value: &ParsedValue, unit_bits: usize, first_low: usize, count: usize) -> Vec<Unit> {
    let width = value.bit_width();
    let mut out: Vec<Unit> = (0..count)
        .map(|i| first_low + i * unit_bits)
        .take_while(|&low| low < width)
        .map(|low| {
            let high = (low + unit_bits - 1).min(width - 1);
            Unit {
                index: low / unit_bits,
                low,
                high,
                value: value.magnitude().chunk(low, high - low + 1),
            }
        })
        .collect();
    out.reverse();
    out
}

/// Builds the aligned view of `value`.
pub fn breakdown(value: &ParsedValue, alignment: Alignment) -> Breakdown {
    match alignment {
        Alignment::Byte => Breakdown::Bytes(units(value, 8, 0, value.byte_len())),
        Alignment::DWord => {
            let word_count = value.bit_width().div_ceil(32);
            let words = units(value, 32, 0, word_count)
                .into_iter()
                .map(|unit| Word {
                    bytes: units(value, 8, unit.low, 4),
                    unit,
                })
                .collect();
            Breakdown::Words(words)
        }
    }
}

fn format_unit(unit: &Unit, format: OutputFormat) -> String {
    let width = unit.width();
    let digits = width.div_ceil(4);
    match format {
        OutputFormat::Hex => format!("{width}'h{:0digits$x}", unit.value),
        OutputFormat::Decimal => unit.value.to_string(),
        OutputFormat::Binary => format!("{width}'b{:0width$b}", unit.value),
    }
}

/// Rows of absolute bit labels over bit values, [BITS_PER_ROW] bits per row.
fn bit_rows(out: &mut String, unit: &Unit) {
    let bits: Vec<usize> = (unit.low..=unit.high).rev().collect();
    for row in bits.chunks(BITS_PER_ROW) {
        out.push_str("  ");
        for &bit in row {
            let _ = write!(out, "{:>width$}", format!("b{bit}"), width = CELL_WIDTH);
        }
        out.push_str("\n  ");
        for &bit in row {
            let set = (unit.value >> (bit - unit.low)) & 1;
            let _ = write!(out, "{set:>width$}", width = CELL_WIDTH);
        }
        out.push('\n');
    }
}

/// Renders the aligned view: a line per unit, labelled bit rows in binary format, and a
/// total line.
pub fn render_breakdown(value: &ParsedValue, options: &DisplayOptions) -> String {
    let format = options.output_format;
    let view = breakdown(value, options.alignment);
    let mut out = String::new();

    match &view {
        Breakdown::Bytes(bytes) => {
            for byte in bytes {
                let _ = writeln!(
                    out,
                    "byte{} [{}:{}]: {}",
                    byte.index,
                    byte.high,
                    byte.low,
                    format_unit(byte, format)
                );
                if format == OutputFormat::Binary {
                    bit_rows(&mut out, byte);
                }
            }
            let _ = write!(out, "--- Total {} bytes ---", view.byte_count());
        }
        Breakdown::Words(words) => {
            for word in words {
                let unit = &word.unit;
                let _ = writeln!(
                    out,
                    "dw{} [{}:{}]: {}",
                    unit.index,
                    unit.high,
                    unit.low,
                    format_unit(unit, format)
                );
                if format == OutputFormat::Binary {
                    bit_rows(&mut out, unit);
                }
                for byte in &word.bytes {
                    let _ = writeln!(
                        out,
                        "  byte{} [{}:{}]: {}",
                        byte.index,
                        byte.high,
                        byte.low,
                        format_unit(byte, format)
                    );
                }
            }
            let _ = write!(
                out,
                "--- Total {} bytes, {} x 32-bit words ---",
                view.byte_count(),
                words.len()
            );
        }
    }

    out
}
