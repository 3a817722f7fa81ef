//! Mesh topology writer: points, cells grouped by shape, patch faces.
//!
//! Point coordinates are flattened consecutively across ranks; local point
//! index `i` on rank `r` becomes global index `point_offset(r) + i`, and all
//! connectivity is remapped with the same rule. Fixed-width shapes get one
//! `[M, width]` dataset each; polyhedra and variable-length patch faces are
//! written as a flat index table plus an exclusive-prefix-sum offset table
//! (one entry per element plus a final total), so each polygon's exact point
//! list and order can be reconstructed.
//!
//! The shape-dataset creation order is fixed (`CellShape::FIXED`, then the
//! polyhedron fallback, then patches in configuration order); every rank
//! walks it identically, issuing the same all-gathers and creation calls
//! even for shapes it does not hold locally.

use crate::archive::{write_rows_1d, write_rows_2d, ArchiveSession};
use crate::chunk::DatasetSpec;
use crate::comm::Communicator;
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::layout::{GlobalInventory, GlobalLayout};
use crate::mesh::LocalMesh;
use crate::shape::CellShape;
use hdf5::Group;
use ndarray::Array2;
use std::collections::BTreeMap;

const REAL_SIZE: usize = std::mem::size_of::<f64>();
const INDEX_SIZE: usize = std::mem::size_of::<i64>();

/// Write the full mesh subtree under `group_path` ("mesh" on the first
/// write, a step-tagged name after a topology change).
pub fn write_mesh<C: Communicator>(
    session: &ArchiveSession,
    comm: &C,
    mesh: &LocalMesh,
    inv: &GlobalInventory,
    config: &ExportConfig,
    group_path: &str,
) -> Result<(), ExportError> {
    let root = session.ensure_group(group_path)?;
    write_points(session, mesh, inv, config, &root)?;
    write_cells(session, comm, mesh, inv, config, &root)?;
    write_patch_faces(session, mesh, inv, config, &root)?;
    Ok(())
}

fn write_points(
    session: &ArchiveSession,
    mesh: &LocalMesh,
    inv: &GlobalInventory,
    config: &ExportConfig,
    root: &Group,
) -> Result<(), ExportError> {
    let spec = DatasetSpec::new("points", 3, inv.points.total(), config.chunk_size, REAL_SIZE);
    let ds = session.create_dataset::<f64>(root, &spec)?;
    let rows = crate::archive::vectors_to_rows(mesh.points());
    write_rows_2d(&ds, inv.points.my_offset(), rows.view())
}

fn write_cells<C: Communicator>(
    session: &ArchiveSession,
    comm: &C,
    mesh: &LocalMesh,
    inv: &GlobalInventory,
    config: &ExportConfig,
    root: &Group,
) -> Result<(), ExportError> {
    let point_base = inv.points.my_offset();

    // Group cells by effective shape, remapping to global point numbering.
    let mut fixed: BTreeMap<CellShape, Vec<i64>> = BTreeMap::new();
    let mut poly_flat: Vec<i64> = Vec::new();
    let mut poly_lengths: Vec<u64> = Vec::new();
    for cell in mesh.cells() {
        let global = cell.vertices().iter().map(|&v| (v + point_base) as i64);
        match cell.write_shape() {
            CellShape::Unknown | CellShape::Polyhedron => {
                poly_lengths.push(cell.vertices().len() as u64);
                poly_flat.extend(global);
            }
            shape => fixed.entry(shape).or_default().extend(global),
        }
    }

    let cells_group = session.ensure_group(&format!("{}/cells", root.name()))?;

    // Fixed-width shapes, in protocol order. A shape present on any rank is
    // created on all ranks; a globally absent shape gets no dataset.
    for shape in CellShape::FIXED {
        let width = shape
            .vertex_count()
            .unwrap_or(1); // FIXED shapes always carry a width
        let flat = fixed.get(&shape).map_or(&[][..], Vec::as_slice);
        let local = (flat.len() / width) as u64;
        let layout = GlobalLayout::exchange(local, comm)?;
        if layout.total() == 0 {
            continue;
        }
        let spec = DatasetSpec::new(
            shape.dataset_name(),
            width,
            layout.total(),
            config.chunk_size,
            INDEX_SIZE,
        );
        let ds = session.create_dataset::<i64>(&cells_group, &spec)?;
        let table = Array2::from_shape_fn((local as usize, width), |(i, j)| flat[i * width + j]);
        write_rows_2d(&ds, layout.my_offset(), table.view())?;
    }

    // Polyhedron fallback: flat table + offsets.
    let poly_cells = GlobalLayout::exchange(poly_lengths.len() as u64, comm)?;
    let poly_indices = GlobalLayout::exchange(poly_flat.len() as u64, comm)?;
    if poly_cells.total() > 0 {
        write_indexed_table(
            session,
            &cells_group,
            "polyhedra",
            "polyhedraOffsets",
            &poly_flat,
            &poly_lengths,
            &poly_cells,
            &poly_indices,
            config.chunk_size,
        )?;
    }
    Ok(())
}

fn write_patch_faces(
    session: &ArchiveSession,
    mesh: &LocalMesh,
    inv: &GlobalInventory,
    config: &ExportConfig,
    root: &Group,
) -> Result<(), ExportError> {
    let point_base = inv.points.my_offset();
    for patch_layout in &inv.patches {
        let group =
            session.ensure_group(&format!("{}/patches/{}", root.name(), patch_layout.name))?;

        let mut flat: Vec<i64> = Vec::new();
        let mut lengths: Vec<u64> = Vec::new();
        if let Some(patch) = mesh.patch(&patch_layout.name) {
            for face in patch.faces() {
                lengths.push(face.len() as u64);
                flat.extend(face.iter().map(|&v| (v + point_base) as i64));
            }
        }
        if lengths.len() as u64 != patch_layout.faces.my_count()
            || flat.len() as u64 != patch_layout.face_points.my_count()
        {
            return Err(ExportError::RowCountMismatch {
                name: format!("patches/{}/faces", patch_layout.name),
                expected: patch_layout.faces.my_count(),
                actual: lengths.len() as u64,
            });
        }

        write_indexed_table(
            session,
            &group,
            "faces",
            "offsets",
            &flat,
            &lengths,
            &patch_layout.faces,
            &patch_layout.face_points,
            config.chunk_size,
        )?;
    }
    Ok(())
}

/// Flat index table plus offset table for variable-length elements.
///
/// The offset table holds one entry per element (the element's starting
/// index in the flat table, in global numbering) plus a final entry equal to
/// the flat table's total length, written by rank 0. Element `i` of rank `r`
/// starts at `flat_offset(r) + sum(lengths[..i])`.
#[allow(clippy::too_many_arguments)]
fn write_indexed_table(
    session: &ArchiveSession,
    group: &Group,
    table_name: &str,
    offsets_name: &str,
    flat: &[i64],
    lengths: &[u64],
    elems: &GlobalLayout,
    flat_layout: &GlobalLayout,
    chunk_size: u64,
) -> Result<(), ExportError> {
    let offsets_spec = DatasetSpec::new(
        offsets_name,
        1,
        elems.total() + 1,
        chunk_size,
        INDEX_SIZE,
    );
    let offsets_ds = session.create_dataset::<i64>(group, &offsets_spec)?;

    let mut running = flat_layout.my_offset();
    let mut local_offsets = Vec::with_capacity(lengths.len());
    for &len in lengths {
        local_offsets.push(running as i64);
        running += len;
    }
    write_rows_1d(&offsets_ds, elems.my_offset(), &local_offsets)?;
    if elems.rank() == 0 {
        // rank 0 owns the terminator entry
        write_rows_1d(&offsets_ds, elems.total(), &[flat_layout.total() as i64])?;
    }

    let table_spec = DatasetSpec::new(table_name, 1, flat_layout.total(), chunk_size, INDEX_SIZE);
    let table_ds = session.create_dataset::<i64>(group, &table_spec)?;
    write_rows_1d(&table_ds, flat_layout.my_offset(), flat)
}
