//! Dataset planning: extents and chunk dimensions for a dataset about to be
//! created.
//!
//! The growth axis is always the first dimension. One dataset is written per
//! field per time step, so datasets never extend; chunking exists purely for
//! the storage layout (compression, partial reads), and the operator can
//! disable it outright with a target chunk size of 0 when the
//! fragmentation/performance trade-off is not worth it on small archives.

use serde::{Deserialize, Serialize};

/// Shape of one dataset to be created collectively on every rank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Dataset name within its parent group.
    pub name: String,
    /// Values per row: 1 for scalars, 3 for vectors.
    pub components: usize,
    /// Global row count (the sum over all ranks).
    pub rows: u64,
    /// Rows per chunk, or `None` for a single contiguous extent.
    pub chunk_rows: Option<u64>,
}

impl DatasetSpec {
    /// Plan a dataset of `rows` x `components` elements of `elem_size` bytes,
    /// chunked to approximate `target_chunk_bytes`.
    pub fn new(
        name: impl Into<String>,
        components: usize,
        rows: u64,
        target_chunk_bytes: u64,
        elem_size: usize,
    ) -> Self {
        Self {
            name: name.into(),
            components,
            rows,
            chunk_rows: plan_chunking(rows, components, target_chunk_bytes, elem_size),
        }
    }
}

/// Decide the chunk row count for a dataset.
///
/// Returns `None` (contiguous layout) when chunking is disabled
/// (`target_chunk_bytes == 0`) or the dataset is empty. Otherwise the chunk
/// holds as many whole rows as fit into the target byte size, at least one
/// and at most `rows`.
pub fn plan_chunking(
    rows: u64,
    components: usize,
    target_chunk_bytes: u64,
    elem_size: usize,
) -> Option<u64> {
    if target_chunk_bytes == 0 || rows == 0 {
        return None;
    }
    let row_bytes = (components as u64) * (elem_size as u64);
    Some((target_chunk_bytes / row_bytes).clamp(1, rows))
}
