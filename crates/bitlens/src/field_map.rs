//! FieldMap: an ordered, validated set of named bit fields. Build one with [FieldMap::load],
//! then resolve names with [FieldMap::resolve].

use std::collections::HashMap;

use log::debug;

use crate::{
    errors::{ExtractError, FieldMapError},
    field::{FieldSource, FieldSpec},
    value::MAX_BIT_WIDTH,
};

/// Ceiling on `high` used by [FieldMap::load].
pub const DEFAULT_MAX_FIELD_WIDTH: usize = MAX_BIT_WIDTH;

/// Field names in insertion order, each mapped to a bit range. Ranges may overlap; names
/// may not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
    max_width: usize,
}

impl FieldMap {
    /// A map with no fields.
    pub fn empty() -> Self {
        FieldMap {
            fields: Vec::new(),
            index: HashMap::new(),
            max_width: DEFAULT_MAX_FIELD_WIDTH,
        }
    }

    /// Validates `source` into a map. Fails on the first invalid definition.
    pub fn load(source: &[FieldSource]) -> Result<Self, FieldMapError> {
        Self::load_with_max_width(source, DEFAULT_MAX_FIELD_WIDTH)
    }

    /// Like [FieldMap::load], rejecting any field whose `high` bit is `>= max_width`.
    pub fn load_with_max_width(
        source: &[FieldSource],
        max_width: usize,
    ) -> Result<Self, FieldMapError> {
        let mut fields: Vec<FieldSpec> = Vec::with_capacity(source.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(source.len());

        for (position, def) in source.iter().enumerate() {
            let spec = validate(position, def, max_width)?;

            if index.contains_key(&spec.name) {
                return Err(FieldMapError::DuplicateName(spec.name));
            }

            index.insert(spec.name.clone(), fields.len());
            fields.push(spec);
        }

        debug!("loaded field map with {} fields", fields.len());

        Ok(Self {
            fields,
            index,
            max_width,
        })
    }

    /// Replaces every field with the ones in `source`, keeping this map's width ceiling.
    /// On error the map is left exactly as it was.
    pub fn replace(&mut self, source: &[FieldSource]) -> Result<(), FieldMapError> {
        let next = Self::load_with_max_width(source, self.max_width)?;
        debug!(
            "replacing field map ({} -> {} fields)",
            self.fields.len(),
            next.fields.len()
        );
        *self = next;
        Ok(())
    }

    /// Looks up a field by exact name.
    pub fn resolve(&self, name: &str) -> Result<&FieldSpec, ExtractError> {
        self.index
            .get(name)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| ExtractError::FieldNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All fields in insertion order.
    pub fn all(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldSpec> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The built-in instruction-word layout.
impl Default for FieldMap {
    fn default() -> Self {
        let source = [
            FieldSource::span("opcode", 8, 12),
            FieldSource::span("valid", 0, 3),
            FieldSource::span("flag", 4, 7),
            FieldSource::span("address", 16, 23),
            FieldSource::span("immediate", 24, 31),
        ];

        match Self::load(&source) {
            Ok(map) => map,
            Err(_) => unreachable!("built-in field map is valid"),
        }
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = &'a FieldSpec;
    type IntoIter = std::slice::Iter<'a, FieldSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(feature = "serde")]
impl TryFrom<crate::serde::FieldMapDef> for FieldMap {
    type Error = FieldMapError;

    fn try_from(value: crate::serde::FieldMapDef) -> Result<Self, Self::Error> {
        let source: Vec<FieldSource> = value.into_fields().into_iter().map(Into::into).collect();
        FieldMap::load(&source)
    }
}

fn validate(
    position: usize,
    def: &FieldSource,
    max_width: usize,
) -> Result<FieldSpec, FieldMapError> {
    if def.name.trim().is_empty() {
        return Err(FieldMapError::EmptyName { index: position });
    }

    let (low, high) = def.range.bounds();
    let name = def.name.clone();

    if let Some(bit) = [low, high].into_iter().find(|&bit| bit < 0) {
        return Err(FieldMapError::NegativeBit { name, bit });
    }
    if low > high {
        return Err(FieldMapError::InvertedRange { name, low, high });
    }
    if high as u64 >= max_width as u64 {
        return Err(FieldMapError::ExceedsMaxWidth {
            name,
            high,
            max_width,
        });
    }

    Ok(FieldSpec {
        name,
        low: low as usize,
        high: high as usize,
    })
}
