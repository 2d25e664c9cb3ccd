//! Schema matching of an attribute set against an operator's attribute list.
//!
//! A schema is an ordered list of [`AttrSpec`]s. Matching checks presence of
//! required attributes and the data type of every present one against the
//! metadata table. Attributes in the set that the schema does not name are
//! caught generically: if fewer attributes matched than the set holds, the
//! rest are excess.

use super::attribute::Attribute;
use super::set::{AttributeSet, MAX_ATTRIBUTES};
use crate::error::{PxlError, Result};
use crate::model::{AttributeId, attribute_info};
use smallvec::SmallVec;

/// One expected attribute of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrSpec {
    pub id: AttributeId,
    pub required: bool,
}

impl AttrSpec {
    pub const fn required(id: AttributeId) -> Self {
        Self { id, required: true }
    }

    pub const fn optional(id: AttributeId) -> Self {
        Self {
            id,
            required: false,
        }
    }
}

/// How an operator's schema is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Required attributes must be present; nothing outside the schema may be.
    Exact,
    /// As `Exact`, and at least one schema attribute must be present.
    AtLeastOne,
    /// The operator takes no attributes.
    Empty,
}

/// Result of a successful match: for each schema entry, the attribute found.
#[derive(Debug, Default)]
pub struct Matched<'a> {
    entries: SmallVec<[(AttributeId, Option<&'a Attribute>); MAX_ATTRIBUTES]>,
    matches: usize,
}

impl<'a> Matched<'a> {
    /// The matched attribute for `id`, if the schema names it and it was present.
    pub fn get(&self, id: AttributeId) -> Option<&'a Attribute> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .and_then(|(_, attr)| *attr)
    }

    /// Like `get`, but absence is a `MissingAttribute` error.
    pub fn require(&self, id: AttributeId) -> Result<&'a Attribute> {
        self.get(id).ok_or(PxlError::MissingAttribute {
            attribute: id.name(),
        })
    }

    pub fn contains(&self, id: AttributeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of schema entries that matched.
    pub const fn matches(&self) -> usize {
        self.matches
    }

    /// Matched attributes in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Attribute> + '_ {
        self.entries.iter().filter_map(|(_, attr)| *attr)
    }
}

fn do_match_one<'a>(set: &'a AttributeSet, spec: AttrSpec, matched: &mut Matched<'a>) -> Result<()> {
    let Some(attr) = set.get(spec.id) else {
        matched.entries.push((spec.id, None));
        return if spec.required {
            Err(PxlError::MissingAttribute {
                attribute: spec.id.name(),
            })
        } else {
            Ok(())
        };
    };

    if !attribute_info(spec.id).accepts(attr.data_type) {
        return Err(PxlError::IllegalAttributeDataType {
            attribute: spec.id.name(),
            data_type: attr.data_type,
        });
    }

    matched.matches += 1;
    matched.entries.push((spec.id, Some(attr)));
    Ok(())
}

fn match_all<'a>(set: &'a AttributeSet, schema: &[AttrSpec]) -> Result<Matched<'a>> {
    let mut matched = Matched {
        entries: SmallVec::with_capacity(schema.len()),
        matches: 0,
    };
    for &spec in schema {
        do_match_one(set, spec, &mut matched)?;
    }
    Ok(matched)
}

fn check_excess(set: &AttributeSet, matched: &Matched<'_>) -> Result<()> {
    if matched.matches < set.len() {
        return Err(PxlError::ExcessAttributes {
            matched: matched.matches,
            present: set.len(),
        });
    }
    Ok(())
}

/// Match a fixed schema; unlisted attributes are `ExcessAttributes`.
pub fn match_exact<'a>(set: &'a AttributeSet, schema: &[AttrSpec]) -> Result<Matched<'a>> {
    let matched = match_all(set, schema)?;
    check_excess(set, &matched)?;
    Ok(matched)
}

/// Match a schema of alternatives, at least one of which must be present.
///
/// "Nothing matched" is reported as `MissingAttribute` (naming the first
/// alternative) in preference to any excess.
pub fn match_at_least_one<'a>(set: &'a AttributeSet, schema: &[AttrSpec]) -> Result<Matched<'a>> {
    let matched = match_all(set, schema)?;
    if matched.matches == 0 {
        return Err(PxlError::MissingAttribute {
            attribute: schema.first().map_or("attribute", |spec| spec.id.name()),
        });
    }
    check_excess(set, &matched)?;
    Ok(matched)
}

/// The operator takes no attributes.
pub fn match_empty(set: &AttributeSet) -> Result<()> {
    if !set.is_empty() {
        return Err(PxlError::ExcessAttributes {
            matched: 0,
            present: set.len(),
        });
    }
    Ok(())
}

/// Apply `schema` under `mode`.
pub fn match_schema<'a>(
    set: &'a AttributeSet,
    mode: MatchMode,
    schema: &[AttrSpec],
) -> Result<Matched<'a>> {
    match mode {
        MatchMode::Exact => match_exact(set, schema),
        MatchMode::AtLeastOne => match_at_least_one(set, schema),
        MatchMode::Empty => match_empty(set).map(|()| Matched::default()),
    }
}
