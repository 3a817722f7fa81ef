//! Cloud writer: per-particle attributes for one time step.
//!
//! Particle counts change every step, so the cloud layouts in the inventory
//! are always freshly exchanged. An attribute with no data on any rank is
//! written as a present-but-empty dataset, never skipped: downstream tooling
//! expects a stable dataset name set across time steps.
//!
//! The attribute's value kind must agree across the ranks that hold data;
//! the kind is settled by one extra all-gather per (cloud, attribute) pair,
//! walked in configuration order on every rank.

use crate::archive::{vectors_to_rows, write_rows_1d, write_rows_2d, ArchiveSession};
use crate::chunk::DatasetSpec;
use crate::cloud::{AttributeData, CloudView};
use crate::comm::Communicator;
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::layout::{CloudLayout, GlobalInventory};
use hdf5::Group;

const REAL_SIZE: usize = std::mem::size_of::<f64>();
const LABEL_SIZE: usize = std::mem::size_of::<i64>();

/// Write every configured attribute of every configured cloud for the step.
pub fn write_clouds<C: Communicator>(
    session: &ArchiveSession,
    comm: &C,
    clouds: &[CloudView],
    inv: &GlobalInventory,
    config: &ExportConfig,
    step_path: &str,
) -> Result<(), ExportError> {
    for cloud_layout in &inv.clouds {
        let group =
            session.ensure_group(&format!("{step_path}/clouds/{}", cloud_layout.name))?;
        let view = clouds.iter().find(|c| c.name() == cloud_layout.name);
        for attrib in &config.cloud_attribs {
            write_attribute(session, comm, &group, view, cloud_layout, attrib, config)?;
        }
    }
    Ok(())
}

fn write_attribute<C: Communicator>(
    session: &ArchiveSession,
    comm: &C,
    group: &Group,
    view: Option<&CloudView>,
    cloud_layout: &CloudLayout,
    attrib: &str,
    config: &ExportConfig,
) -> Result<(), ExportError> {
    let data = view.and_then(|v| v.attribute(attrib));
    let local_kind = data.map_or(0, AttributeData::kind_code);
    let kinds = comm.all_gather_counts(local_kind)?;

    // Agree on the value kind: every rank computes the same verdict from the
    // same gathered table, so error and success stay collective-consistent.
    let agreed = kinds.iter().copied().max().unwrap_or(0);
    if kinds.iter().any(|&k| k != 0 && k != agreed) {
        return Err(ExportError::AttributeKindMismatch {
            cloud: cloud_layout.name.clone(),
            attrib: attrib.to_string(),
        });
    }
    let layout = &cloud_layout.particles;
    // A rank holding particles but no data for an agreed attribute is also
    // a host divergence. Judged from the gathered tables, never from
    // rank-local state, so all ranks reach the same verdict.
    if agreed != 0
        && (0..layout.n_ranks()).any(|r| kinds[r] == 0 && layout.count(r) > 0)
    {
        return Err(ExportError::AttributeKindMismatch {
            cloud: cloud_layout.name.clone(),
            attrib: attrib.to_string(),
        });
    }

    match agreed {
        0 => {
            // No data anywhere: keep the name set stable with an empty
            // scalar dataset.
            let spec = DatasetSpec::new(attrib, 1, 0, config.chunk_size, REAL_SIZE);
            session.create_dataset::<f64>(group, &spec)?;
            Ok(())
        }
        1 => {
            let spec =
                DatasetSpec::new(attrib, 1, layout.total(), config.chunk_size, REAL_SIZE);
            let ds = session.create_dataset::<f64>(group, &spec)?;
            match data {
                Some(AttributeData::Scalar(values)) => {
                    write_rows_1d(&ds, layout.my_offset(), values)
                }
                _ => Ok(()),
            }
        }
        2 => {
            let spec =
                DatasetSpec::new(attrib, 3, layout.total(), config.chunk_size, REAL_SIZE);
            let ds = session.create_dataset::<f64>(group, &spec)?;
            match data {
                Some(AttributeData::Vector(values)) => {
                    write_rows_2d(&ds, layout.my_offset(), vectors_to_rows(values).view())
                }
                _ => Ok(()),
            }
        }
        _ => {
            let spec =
                DatasetSpec::new(attrib, 1, layout.total(), config.chunk_size, LABEL_SIZE);
            let ds = session.create_dataset::<i64>(group, &spec)?;
            match data {
                Some(AttributeData::Label(values)) => {
                    write_rows_1d(&ds, layout.my_offset(), values)
                }
                _ => Ok(()),
            }
        }
    }
}
