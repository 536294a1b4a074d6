//! # bitlens
//!
//! A value-interpretation engine for Verilog-style numeric literals.
//!
//! Parse a literal of any radix and width, render it in hex, decimal or binary with byte or
//! 32-bit word alignment, extract bit ranges or named fields, and compare two values field
//! by field. Every operation is pure: callers own the "last value" and the current
//! [FieldMap], and pass them in.
//!
//! ## Example
//!
//! ```
//! use bitlens::{FieldMap, FieldSource, DisplayOptions};
//!
//! let value = bitlens::parse("16'h12_34").unwrap();
//! assert_eq!(bitlens::render(&value, &DisplayOptions::default()), "16'h12_34");
//!
//! let map = FieldMap::load(&[FieldSource::span("flag", 4, 6)]).unwrap();
//! let flag = bitlens::extract_field(&value, &map, "flag").unwrap();
//! assert_eq!(flag.to_u64(), Some(3));
//!
//! let other = bitlens::parse("0x1274").unwrap();
//! let diff = bitlens::compare(&value, &other, &map);
//! assert!(diff.fields[0].changed);
//! ```

pub mod bits;
pub mod compare;
pub mod errors;
pub mod extract;
pub mod field;
pub mod field_map;
pub mod literal;
pub mod render;
#[cfg(feature = "serde")]
pub mod serde;
pub mod value;

pub use compare::{BitRun, Diff, FieldDiff, Subvalue, compare};
pub use errors::{Error, ExtractError, FieldMapError, ParseError};
pub use extract::{extract_field, extract_range};
pub use field::{FieldSource, FieldSpec, SourceRange};
pub use field_map::FieldMap;
pub use literal::{InputMode, parse, parse_with_mode};
pub use render::{Alignment, DisplayOptions, OutputFormat, render, render_breakdown};
pub use value::ParsedValue;

/// Validates already-decoded field definitions into a [FieldMap].
pub fn load_field_map(source: &[FieldSource]) -> Result<FieldMap, FieldMapError> {
    FieldMap::load(source)
}
