//! Rank inventory: per-rank counts and the global write layout derived from
//! them.
//!
//! Every dataset in the archive is laid out by the same rule: each rank owns
//! the contiguous row range `[offset, offset + count)` where `offset` is the
//! exclusive prefix sum of the counts of all lower ranks. The file is the
//! one shared resource; these non-overlapping ranges are the sole
//! mutual-exclusion mechanism, so the offset arithmetic must be identical on
//! every rank.
//!
//! [`RankCounts::compute`] is purely local (no communication).
//! [`GlobalLayout::exchange`] is collective: every rank must call it in the
//! same order every write event.

use crate::cloud::CloudView;
use crate::comm::Communicator;
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::mesh::LocalMesh;
use serde::{Deserialize, Serialize};

/// Local counts for one rank, computed fresh at each write event.
///
/// Patch and cloud entries follow the configuration's list order, which is
/// what fixes the collective call order during the exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankCounts {
    pub n_points: u64,
    pub n_cells: u64,
    pub patches: Vec<PatchCounts>,
    pub clouds: Vec<CloudCounts>,
}

/// Per-patch local counts: faces and the summed lengths of their point lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchCounts {
    pub name: String,
    pub n_faces: u64,
    pub n_face_points: u64,
}

/// Per-cloud local particle count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudCounts {
    pub name: String,
    pub n_particles: u64,
}

impl RankCounts {
    /// Read local topology and cloud sizes. No communication happens here.
    ///
    /// A configured patch the local mesh does not carry contributes zero
    /// faces; a configured cloud with no local particles contributes zero.
    /// Both are ordinary outcomes of domain decomposition, not errors.
    pub fn compute(mesh: &LocalMesh, clouds: &[CloudView], config: &ExportConfig) -> Self {
        let patches = config
            .patch_names
            .iter()
            .map(|name| match mesh.patch(name) {
                Some(patch) => PatchCounts {
                    name: name.clone(),
                    n_faces: patch.n_faces() as u64,
                    n_face_points: patch.n_face_points() as u64,
                },
                None => PatchCounts {
                    name: name.clone(),
                    ..PatchCounts::default()
                },
            })
            .collect();
        let clouds = config
            .cloud_names
            .iter()
            .map(|name| CloudCounts {
                name: name.clone(),
                n_particles: clouds
                    .iter()
                    .find(|c| c.name() == name.as_str())
                    .map_or(0, |c| c.n_particles() as u64),
            })
            .collect();
        Self {
            n_points: mesh.n_points() as u64,
            n_cells: mesh.n_cells() as u64,
            patches,
            clouds,
        }
    }
}

/// Global row layout for one dataset axis: every rank's count, the derived
/// exclusive-prefix-sum offsets, and the shared total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalLayout {
    counts: Vec<u64>,
    offsets: Vec<u64>,
    total: u64,
    rank: usize,
}

impl GlobalLayout {
    /// Derive offsets from a full count table. `rank` selects whose
    /// `my_offset`/`my_count` this layout answers for.
    pub fn from_counts(counts: &[u64], rank: usize) -> Result<Self, ExportError> {
        if rank >= counts.len() {
            return Err(ExportError::RankOutOfRange {
                rank,
                n_ranks: counts.len(),
            });
        }
        let mut offsets = Vec::with_capacity(counts.len());
        let mut running = 0u64;
        for &c in counts {
            offsets.push(running);
            running += c;
        }
        Ok(Self {
            counts: counts.to_vec(),
            offsets,
            total: running,
            rank,
        })
    }

    /// Collective all-gather of one local count per rank.
    ///
    /// Every rank must call this in the same sequence during a write event.
    /// A communication fault here is fatal; MPI gives no graceful recovery
    /// at this layer.
    pub fn exchange<C: Communicator>(local: u64, comm: &C) -> Result<Self, ExportError> {
        let counts = comm.all_gather_counts(local)?;
        Self::from_counts(&counts, comm.rank())
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn n_ranks(&self) -> usize {
        self.counts.len()
    }

    /// The rank this layout answers `my_*` queries for.
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn my_count(&self) -> u64 {
        self.counts[self.rank]
    }

    pub fn my_offset(&self) -> u64 {
        self.offsets[self.rank]
    }

    pub fn count(&self, rank: usize) -> u64 {
        self.counts[rank]
    }

    pub fn offset(&self, rank: usize) -> u64 {
        self.offsets[rank]
    }
}

/// All layouts one write event needs, exchanged in a fixed order:
/// points, cells, then per configured patch (faces, face points), then per
/// configured cloud (particles). Clouds migrate between ranks every step, so
/// the whole inventory is recomputed at every write.
#[derive(Clone, Debug)]
pub struct GlobalInventory {
    pub points: GlobalLayout,
    pub cells: GlobalLayout,
    pub patches: Vec<PatchLayout>,
    pub clouds: Vec<CloudLayout>,
}

#[derive(Clone, Debug)]
pub struct PatchLayout {
    pub name: String,
    pub faces: GlobalLayout,
    pub face_points: GlobalLayout,
}

#[derive(Clone, Debug)]
pub struct CloudLayout {
    pub name: String,
    pub particles: GlobalLayout,
}

impl GlobalInventory {
    /// Run the full layout exchange. Collective: identical call order on
    /// every rank, one all-gather per axis.
    pub fn exchange<C: Communicator>(
        counts: &RankCounts,
        comm: &C,
    ) -> Result<Self, ExportError> {
        let points = GlobalLayout::exchange(counts.n_points, comm)?;
        let cells = GlobalLayout::exchange(counts.n_cells, comm)?;
        let mut patches = Vec::with_capacity(counts.patches.len());
        for p in &counts.patches {
            patches.push(PatchLayout {
                name: p.name.clone(),
                faces: GlobalLayout::exchange(p.n_faces, comm)?,
                face_points: GlobalLayout::exchange(p.n_face_points, comm)?,
            });
        }
        let mut clouds = Vec::with_capacity(counts.clouds.len());
        for c in &counts.clouds {
            clouds.push(CloudLayout {
                name: c.name.clone(),
                particles: GlobalLayout::exchange(c.n_particles, comm)?,
            });
        }
        Ok(Self {
            points,
            cells,
            patches,
            clouds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_exclusive_prefix_sums() {
        let layout = GlobalLayout::from_counts(&[3, 0, 5, 2], 2).unwrap();
        assert_eq!(layout.total(), 10);
        assert_eq!(layout.offset(0), 0);
        assert_eq!(layout.offset(1), 3);
        assert_eq!(layout.offset(2), 3);
        assert_eq!(layout.offset(3), 8);
        assert_eq!(layout.my_offset(), 3);
        assert_eq!(layout.my_count(), 5);
    }

    #[test]
    fn zero_everywhere_is_a_valid_layout() {
        let layout = GlobalLayout::from_counts(&[0, 0, 0], 1).unwrap();
        assert_eq!(layout.total(), 0);
        assert_eq!(layout.my_offset(), 0);
        assert_eq!(layout.my_count(), 0);
    }

    #[test]
    fn rank_out_of_range_is_rejected() {
        let err = GlobalLayout::from_counts(&[1, 2], 2).unwrap_err();
        assert!(matches!(err, ExportError::RankOutOfRange { rank: 2, n_ranks: 2 }));
    }

    #[test]
    fn ranges_cover_total_without_overlap() {
        let counts = [4u64, 0, 7, 1, 0, 3];
        let total: u64 = counts.iter().sum();
        for rank in 0..counts.len() {
            let layout = GlobalLayout::from_counts(&counts, rank).unwrap();
            assert!(layout.my_offset() + layout.my_count() <= layout.total());
            assert_eq!(layout.total(), total);
        }
    }
}
