//! Bit-range and named-field extraction.

use crate::{errors::ExtractError, field_map::FieldMap, value::ParsedValue};

/// Bits `low..=high` of `value` as a new value of width `high - low + 1`.
pub fn extract_range(
    value: &ParsedValue,
    low: usize,
    high: usize,
) -> Result<ParsedValue, ExtractError> {
    if low > high || high >= value.bit_width() {
        return Err(ExtractError::RangeOutOfBounds {
            low,
            high,
            bit_width: value.bit_width(),
        });
    }

    let magnitude = value.magnitude().range(low, high);
    Ok(ParsedValue::new(magnitude, high - low + 1))
}

/// The field `name` of `value`, resolved through `map`.
pub fn extract_field(
    value: &ParsedValue,
    map: &FieldMap,
    name: &str,
) -> Result<ParsedValue, ExtractError> {
    let field = map.resolve(name)?;
    extract_range(value, field.low, field.high)
}
