//! Archive session: lifecycle of one HDF5 file handle across a write event.
//!
//! Dataset *creation* is collective: every rank must issue the identical
//! creation call (same name, same shape) even when it contributes zero rows,
//! otherwise the collective metadata operation deadlocks or corrupts the
//! file. Data *transfer* runs in independent mode: each rank writes its own
//! row range without synchronizing on every call, which tolerates arbitrarily
//! uneven per-rank row counts including zero.
//!
//! The session owns the only raw HDF5 handles in the crate. Handles are
//! RAII-scoped: dropping the session (or any returned group/dataset) flushes
//! and releases it on every exit path, including error paths.

use crate::chunk::DatasetSpec;
use crate::comm::Communicator;
use crate::error::ExportError;
use hdf5::types::H5Type;
use hdf5::{Dataset, File, Group};
use ndarray::{s, Array2, ArrayView2};
use std::path::Path;

/// Open HDF5 archive for the duration of one write event.
pub struct ArchiveSession {
    file: File,
}

impl ArchiveSession {
    /// Create the archive, truncating any previous file. First write only.
    pub fn create<C: Communicator>(path: &Path, comm: &C) -> Result<Self, ExportError> {
        log::debug!("rank {}: creating archive {}", comm.rank(), path.display());
        Ok(Self {
            file: comm.file_builder().create(path)?,
        })
    }

    /// Open an existing archive for appending new per-step groups.
    pub fn append<C: Communicator>(path: &Path, comm: &C) -> Result<Self, ExportError> {
        log::debug!("rank {}: appending to archive {}", comm.rank(), path.display());
        Ok(Self {
            file: comm.file_builder().append(path)?,
        })
    }

    /// Open (or create) a group at a slash-separated path from the root.
    pub fn ensure_group(&self, path: &str) -> Result<Group, ExportError> {
        let mut current = self.file.group("/")?;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = match current.group(part) {
                Ok(g) => g,
                Err(_) => current.create_group(part)?,
            };
        }
        Ok(current)
    }

    pub fn has_group(&self, path: &str) -> bool {
        self.file.group(path).is_ok()
    }

    /// Collective dataset creation. Every rank calls this with an identical
    /// spec; the shape, chunk layout, and the XDMF-facing attributes
    /// (`elementCount`, `componentCount`, `chunkRows`) are fixed here and
    /// never vary per rank.
    pub fn create_dataset<T: H5Type>(
        &self,
        parent: &Group,
        spec: &DatasetSpec,
    ) -> Result<Dataset, ExportError> {
        let rows = spec.rows as usize;
        let ds = if spec.components == 1 {
            let builder = parent.new_dataset::<T>().shape([rows]);
            match spec.chunk_rows {
                Some(c) => builder.chunk([c as usize]).create(spec.name.as_str())?,
                None => builder.no_chunk().create(spec.name.as_str())?,
            }
        } else {
            let builder = parent.new_dataset::<T>().shape([rows, spec.components]);
            match spec.chunk_rows {
                Some(c) => builder
                    .chunk([c as usize, spec.components])
                    .create(spec.name.as_str())?,
                None => builder.no_chunk().create(spec.name.as_str())?,
            }
        };
        ds.new_attr::<u64>()
            .create("elementCount")?
            .write_scalar(&spec.rows)?;
        ds.new_attr::<u32>()
            .create("componentCount")?
            .write_scalar(&(spec.components as u32))?;
        if let Some(c) = spec.chunk_rows {
            ds.new_attr::<u64>().create("chunkRows")?.write_scalar(&c)?;
        }
        Ok(ds)
    }

    /// Flush and release the file identifier. Dropping the session has the
    /// same effect; this form surfaces close errors.
    pub fn close(self) -> Result<(), ExportError> {
        self.file.close()?;
        Ok(())
    }
}

/// Independent transfer of a rank's rows into a 1-D dataset. A zero-row
/// contribution is a no-op; the creation call has already happened on every
/// rank, which keeps the collective protocol balanced.
pub fn write_rows_1d<T: H5Type>(
    ds: &Dataset,
    offset: u64,
    data: &[T],
) -> Result<(), ExportError> {
    if data.is_empty() {
        return Ok(());
    }
    let start = offset as usize;
    ds.write_slice(data, s![start..start + data.len()])?;
    Ok(())
}

/// Independent transfer of a rank's rows into a 2-D dataset.
pub fn write_rows_2d<T: H5Type>(
    ds: &Dataset,
    offset: u64,
    data: ArrayView2<'_, T>,
) -> Result<(), ExportError> {
    if data.nrows() == 0 {
        return Ok(());
    }
    let start = offset as usize;
    ds.write_slice(data, s![start..start + data.nrows(), ..])?;
    Ok(())
}

/// Row-major `[n, 3]` table from a slice of 3-vectors.
pub fn vectors_to_rows(values: &[[f64; 3]]) -> Array2<f64> {
    Array2::from_shape_fn((values.len(), 3), |(i, j)| values[i][j])
}
