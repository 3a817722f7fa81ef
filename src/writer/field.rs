//! Field writer: internal-mesh and patch field values for one time step.
//!
//! One dataset per field per step, sized by the global cell count (internal)
//! or the patch's global face count, positioned at this rank's offset.
//! Vectors are row-major `[rows, 3]`; scalars `[rows]`. The classified name
//! groups and the registry contents must be rank-uniform (only the value
//! counts differ across ranks); the dataset creation sequence is derived
//! from them, so divergence would unbalance the collective protocol.

use crate::archive::{vectors_to_rows, write_rows_1d, write_rows_2d, ArchiveSession};
use crate::chunk::DatasetSpec;
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::field::{FieldData, FieldGroups, FieldRegistry};
use crate::layout::{GlobalInventory, GlobalLayout};
use hdf5::Group;

const REAL_SIZE: usize = std::mem::size_of::<f64>();

/// Write all classified fields for the step rooted at `step_path`.
pub fn write_fields(
    session: &ArchiveSession,
    registry: &FieldRegistry,
    groups: &FieldGroups,
    inv: &GlobalInventory,
    config: &ExportConfig,
    step_path: &str,
) -> Result<(), ExportError> {
    let internal = session.ensure_group(&format!("{step_path}/internalField"))?;
    for name in &groups.scalar_fields {
        if let Some(FieldData::Scalar(values)) = registry.internal(name) {
            write_scalar(session, &internal, name, values, &inv.cells, config)?;
        }
    }
    for name in &groups.vector_fields {
        if let Some(FieldData::Vector(values)) = registry.internal(name) {
            write_vector(session, &internal, name, values, &inv.cells, config)?;
        }
    }

    for patch in &inv.patches {
        let group = session.ensure_group(&format!("{step_path}/patches/{}", patch.name))?;
        for name in &groups.scalar_fields {
            match registry.patch_field(&patch.name, name) {
                Some(FieldData::Scalar(values)) => {
                    write_scalar(session, &group, name, values, &patch.faces, config)?;
                }
                Some(_) => log::warn!(
                    "patch `{}` field `{name}`: kind differs from internal field, skipped",
                    patch.name
                ),
                None => {}
            }
        }
        for name in &groups.vector_fields {
            match registry.patch_field(&patch.name, name) {
                Some(FieldData::Vector(values)) => {
                    write_vector(session, &group, name, values, &patch.faces, config)?;
                }
                Some(_) => log::warn!(
                    "patch `{}` field `{name}`: kind differs from internal field, skipped",
                    patch.name
                ),
                None => {}
            }
        }
    }
    Ok(())
}

fn write_scalar(
    session: &ArchiveSession,
    group: &Group,
    name: &str,
    values: &[f64],
    layout: &GlobalLayout,
    config: &ExportConfig,
) -> Result<(), ExportError> {
    check_rows(name, values.len(), layout)?;
    let spec = DatasetSpec::new(name, 1, layout.total(), config.chunk_size, REAL_SIZE);
    let ds = session.create_dataset::<f64>(group, &spec)?;
    write_rows_1d(&ds, layout.my_offset(), values)
}

fn write_vector(
    session: &ArchiveSession,
    group: &Group,
    name: &str,
    values: &[[f64; 3]],
    layout: &GlobalLayout,
    config: &ExportConfig,
) -> Result<(), ExportError> {
    check_rows(name, values.len(), layout)?;
    let spec = DatasetSpec::new(name, 3, layout.total(), config.chunk_size, REAL_SIZE);
    let ds = session.create_dataset::<f64>(group, &spec)?;
    write_rows_2d(&ds, layout.my_offset(), vectors_to_rows(values).view())
}

fn check_rows(name: &str, actual: usize, layout: &GlobalLayout) -> Result<(), ExportError> {
    if actual as u64 != layout.my_count() {
        return Err(ExportError::RowCountMismatch {
            name: name.to_string(),
            expected: layout.my_count(),
            actual: actual as u64,
        });
    }
    Ok(())
}
