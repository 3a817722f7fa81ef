//! Field registry views and scalar/vector classification.
//!
//! The host exposes the current step's field values through a
//! [`FieldRegistry`]; a single classification pass sorts the configured
//! names into two ordered groups by inspecting each field's value kind.
//! Names that are absent or of an unsupported kind are excluded without
//! error: users routinely list fields that do not exist at a given time.
//!
//! The registry content (which names exist and their kinds) must be
//! identical on every rank; only the value counts may differ. That is the
//! host's contract for a decomposed mesh, and the collective protocol
//! depends on it.

use itertools::Itertools;
use std::collections::BTreeMap;

/// Values of one field on this rank, one entry per cell or patch face.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldData {
    Scalar(Vec<f64>),
    /// Row-major: each entry holds all three components of one cell/face.
    Vector(Vec<[f64; 3]>),
}

impl FieldData {
    pub fn len(&self) -> usize {
        match self {
            FieldData::Scalar(v) => v.len(),
            FieldData::Vector(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn components(&self) -> usize {
        match self {
            FieldData::Scalar(_) => 1,
            FieldData::Vector(_) => 3,
        }
    }
}

/// Read-only accessor for the current step's field values.
#[derive(Clone, Debug, Default)]
pub struct FieldRegistry {
    internal: BTreeMap<String, FieldData>,
    patch: BTreeMap<String, BTreeMap<String, FieldData>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an internal (cell-centred) field for this step.
    pub fn insert_internal(&mut self, name: impl Into<String>, data: FieldData) {
        self.internal.insert(name.into(), data);
    }

    /// Register a field's values on one boundary patch.
    pub fn insert_patch(
        &mut self,
        patch: impl Into<String>,
        name: impl Into<String>,
        data: FieldData,
    ) {
        self.patch
            .entry(patch.into())
            .or_default()
            .insert(name.into(), data);
    }

    pub fn internal(&self, name: &str) -> Option<&FieldData> {
        self.internal.get(name)
    }

    pub fn patch_field(&self, patch: &str, name: &str) -> Option<&FieldData> {
        self.patch.get(patch).and_then(|m| m.get(name))
    }
}

/// Configured field names split by value kind, in configuration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldGroups {
    pub scalar_fields: Vec<String>,
    pub vector_fields: Vec<String>,
}

impl FieldGroups {
    pub fn n_fields(&self) -> usize {
        self.scalar_fields.len() + self.vector_fields.len()
    }
}

/// Classify configured names against the registry's internal fields.
///
/// Each requested name lands in at most one group, or nowhere if the
/// registry does not know it. The pass is idempotent: the same name list
/// against the same registry always yields the same grouping.
pub fn classify_fields(names: &[String], registry: &FieldRegistry) -> FieldGroups {
    let mut groups = FieldGroups::default();
    for name in names.iter().unique() {
        match registry.internal(name) {
            Some(FieldData::Scalar(_)) => groups.scalar_fields.push(name.clone()),
            Some(FieldData::Vector(_)) => groups.vector_fields.push(name.clone()),
            None => {
                log::debug!("field `{name}` not present this step, excluded");
            }
        }
    }
    groups
}
