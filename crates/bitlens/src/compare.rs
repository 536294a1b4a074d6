//! Field-by-field and bit-level comparison of two values.

use std::fmt::Write as _;

use log::debug;

use crate::{
    extract::extract_range,
    field_map::FieldMap,
    render::{DisplayOptions, render},
    value::ParsedValue,
};

/// A field's content in one compared value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subvalue {
    Value(ParsedValue),
    /// The field reaches past this value's bit width.
    NotApplicable,
}

impl Subvalue {
    pub fn value(&self) -> Option<&ParsedValue> {
        match self {
            Subvalue::Value(value) => Some(value),
            Subvalue::NotApplicable => None,
        }
    }
}

/// Comparison record for one field of the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub name: String,
    pub low: usize,
    pub high: usize,
    pub v1: Subvalue,
    pub v2: Subvalue,
    /// `v1 != v2`; a field missing from only one side counts as changed.
    pub changed: bool,
}

/// A maximal run of adjacent differing bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRun {
    pub low: usize,
    pub high: usize,
}

/// Result of [compare]. Holds every field of the map, changed or not, in map order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub value1: ParsedValue,
    pub value2: ParsedValue,
    /// Magnitudes are equal (widths may still differ).
    pub equal: bool,
    pub fields: Vec<FieldDiff>,
    /// Differing bit runs, highest first.
    pub differing_bits: Vec<BitRun>,
}

impl Diff {
    pub fn changed_fields(&self) -> impl Iterator<Item = &FieldDiff> {
        self.fields.iter().filter(|field| field.changed)
    }

    /// Text report: both values, the verdict, differing bit runs and changed fields only.
    pub fn report(&self, options: &DisplayOptions) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Value 1: {}", render(&self.value1, options));
        let _ = writeln!(out, "Value 2: {}", render(&self.value2, options));

        if self.equal {
            out.push_str("Values are identical");
            return out;
        }
        out.push_str("Values differ\n");

        let runs: Vec<String> = self
            .differing_bits
            .iter()
            .map(|run| {
                if run.low == run.high {
                    format!("bit {}", run.low)
                } else {
                    format!("bits {}-{}", run.low, run.high)
                }
            })
            .collect();
        let _ = writeln!(out, "Differing bits: {}", runs.join(", "));

        let mut changed = self.changed_fields().peekable();
        if changed.peek().is_none() {
            out.push_str("No mapped field differs");
            return out;
        }

        out.push_str("Differing fields:");
        for field in changed {
            let _ = write!(
                out,
                "\n  {} [{}:{}]: {} -> {}",
                field.name,
                field.high,
                field.low,
                format_subvalue(&field.v1, options),
                format_subvalue(&field.v2, options)
            );
        }
        out
    }
}

fn format_subvalue(subvalue: &Subvalue, options: &DisplayOptions) -> String {
    subvalue
        .value()
        .map_or_else(|| "n/a".to_string(), |value| render(value, options))
}

fn subvalue(value: &ParsedValue, low: usize, high: usize) -> Subvalue {
    extract_range(value, low, high).map_or(Subvalue::NotApplicable, Subvalue::Value)
}

fn differing_runs(value1: &ParsedValue, value2: &ParsedValue) -> Vec<BitRun> {
    let width = value1.bit_width().max(value2.bit_width());
    let (a, b) = (value1.magnitude(), value2.magnitude());

    let mut runs: Vec<BitRun> = Vec::new();
    let mut open: Option<usize> = None;

    for bit in 0..=width {
        let differs = bit < width && a.bit(bit) != b.bit(bit);
        match (differs, open) {
            (true, None) => open = Some(bit),
            (false, Some(low)) => {
                let high = bit - 1;
                runs.push(BitRun { low, high });
                open = None;
            }
            _ => {}
        }
    }

    runs.reverse();
    runs
}

/// Compares two values against every field of `map`.
///
/// A field that does not fit one of the values is reported as [Subvalue::NotApplicable] for
/// that side instead of failing the comparison.
pub fn compare(value1: &ParsedValue, value2: &ParsedValue, map: &FieldMap) -> Diff {
    let fields: Vec<FieldDiff> = map
        .iter()
        .map(|field| {
            let v1 = subvalue(value1, field.low, field.high);
            let v2 = subvalue(value2, field.low, field.high);
            FieldDiff {
                name: field.name.clone(),
                low: field.low,
                high: field.high,
                changed: v1 != v2,
                v1,
                v2,
            }
        })
        .collect();

    let diff = Diff {
        value1: value1.clone(),
        value2: value2.clone(),
        equal: value1.magnitude() == value2.magnitude(),
        differing_bits: differing_runs(value1, value2),
        fields,
    };

    let changed = diff.changed_fields().count();
    let total = diff.fields.len();
    debug!("{value1} vs {value2}: {changed} of {total} fields changed");

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field::FieldSource, literal::parse};

    fn map() -> FieldMap {
        FieldMap::load(&[
            FieldSource::span("valid", 0, 3),
            FieldSource::span("flag", 4, 6),
            FieldSource::span("address", 16, 23),
        ])
        .unwrap()
    }

    fn compare_literals(value1: &str, value2: &str) -> Diff {
        compare(&parse(value1).unwrap(), &parse(value2).unwrap(), &map())
    }

    #[test]
    fn test_changed_field() {
        let diff = compare_literals("0x1234", "0x1274");

        assert!(!diff.equal);
        assert_eq!(diff.fields.len(), 3);

        let flag = &diff.fields[1];
        assert_eq!(flag.name, "flag");
        assert!(flag.changed);
        assert_eq!(flag.v1, Subvalue::Value(ParsedValue::from_u64(3, 3)));
        assert_eq!(flag.v2, Subvalue::Value(ParsedValue::from_u64(7, 3)));

        let valid = &diff.fields[0];
        assert!(!valid.changed);
        assert_eq!(valid.v1.value().and_then(ParsedValue::to_u64), Some(4));
    }

    #[test]
    fn test_not_applicable_fields() {
        let diff = compare_literals("0x1234", "0x1274");
        let address = &diff.fields[2];
        assert_eq!(address.v1, Subvalue::NotApplicable);
        assert_eq!(address.v2, Subvalue::NotApplicable);
        assert!(!address.changed);

        let diff = compare_literals("0x1234", "0x561234");
        let address = &diff.fields[2];
        assert_eq!(address.v1, Subvalue::NotApplicable);
        assert_eq!(address.v2, Subvalue::Value(ParsedValue::from_u64(0x56, 8)));
        assert!(address.changed);
    }

    #[test]
    fn test_equal_magnitudes_with_different_widths() {
        let diff = compare_literals("8'h12", "16'h12");
        assert!(diff.equal);
        assert!(diff.differing_bits.is_empty());
    }

    #[test]
    fn test_differing_runs() {
        let diff = compare(
            &parse("16'b1111_0000_0000_0001").unwrap(),
            &parse("16'b0011_0000_0000_0000").unwrap(),
            &FieldMap::empty(),
        );
        assert_eq!(
            diff.differing_bits,
            vec![BitRun { low: 14, high: 15 }, BitRun { low: 0, high: 0 }]
        );
    }

    #[test]
    fn test_report_lists_changed_fields_only() {
        let diff = compare_literals("0x1234", "0x1274");
        let report = diff.report(&DisplayOptions::default());
        assert_eq!(
            report,
            "Value 1: 16'h12_34\nValue 2: 16'h12_74\nValues differ\n\
             Differing bits: bit 6\nDiffering fields:\n  flag [6:4]: 3'h03 -> 3'h07"
        );
    }

    #[test]
    fn test_report_identical() {
        let value = parse("0x1234").unwrap();
        let diff = compare(&value, &value, &map());
        let report = diff.report(&DisplayOptions::default());
        assert!(report.ends_with("Values are identical"));
    }

    #[test]
    fn test_report_no_mapped_field() {
        let diff = compare_literals("0x1234", "0x9234");
        let report = diff.report(&DisplayOptions::default());
        assert!(report.contains("Differing bits: bit 15"));
        assert!(report.ends_with("No mapped field differs"));
    }
}
