//! JSON-deserializable field-map description.
//!
//! These types describe the *shape* of a field-map document. Decoding (including stripping
//! JSONC comments) is the caller's job; the result converts into [crate::field::FieldSource]
//! values or straight into a [crate::field_map::FieldMap].
//!
//! ```json
//! [
//!   { "name": "opcode", "low": 8, "high": 12 },
//!   { "name": "enable", "bit": 31 }
//! ]
//! ```
//!
//! The same list may also be wrapped as `{ "fields": [...] }`.

use serde::{Deserialize, Serialize};

/// A whole field-map document.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum FieldMapDef {
    /// A bare array of fields.
    List(Vec<FieldDef>),
    /// An object with a `fields` array.
    Document { fields: Vec<FieldDef> },
}

impl FieldMapDef {
    pub fn into_fields(self) -> Vec<FieldDef> {
        match self {
            FieldMapDef::List(fields) | FieldMapDef::Document { fields } => fields,
        }
    }
}

/// Description of a single named field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    /// Field name; must be unique in the document.
    pub name: String,
    /// Bit range of the field.
    #[serde(flatten)]
    pub range: RangeDef,
}

/// Either an inclusive `low`/`high` span or a single `bit`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
#[serde(untagged)]
pub enum RangeDef {
    Span { low: i64, high: i64 },
    Bit { bit: i64 },
}
