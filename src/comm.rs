//! Thin façade over the process group driving a collective write.
//!
//! The write engine needs exactly three things from the communicator: its
//! place in a fixed rank order, an all-gather of one `u64` count per rank,
//! and a way to open the shared archive with the right file-access
//! properties. `NoComm` serves serial runs and unit tests (a communicator of
//! size 1 is a valid process group); `MpiComm` (feature `mpi-support`) wraps
//! an MPI world communicator.
//!
//! Every rank must issue the same sequence of `all_gather_counts` calls
//! during a write event. A rank that skips one deadlocks the group; that is
//! MPI semantics, not something this layer can recover from.

use crate::error::ExportError;

/// Collective-communication interface (minimal by design).
pub trait Communicator {
    /// This process's position in the fixed rank order.
    fn rank(&self) -> usize;

    /// Number of ranks in the group.
    fn size(&self) -> usize;

    /// Gather one count from every rank, returned in rank order on all ranks.
    fn all_gather_counts(&self, local: u64) -> Result<Vec<u64>, ExportError>;

    /// File builder carrying the access properties this group needs
    /// (serial by default, MPI-IO for the MPI backend).
    fn file_builder(&self) -> hdf5::FileBuilder {
        hdf5::FileBuilder::new()
    }
}

/// Serial no-op communicator: a process group of size 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_gather_counts(&self, local: u64) -> Result<Vec<u64>, ExportError> {
        Ok(vec![local])
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::Communicator;
    use crate::error::ExportError;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::*;

    /// MPI world communicator. Holds the MPI universe for the lifetime of
    /// the exporter so finalization happens after the last write.
    pub struct MpiComm {
        _universe: mpi::environment::Universe,
        world: SimpleCommunicator,
    }

    impl MpiComm {
        /// Initialize MPI (or attach to an already initialized runtime).
        pub fn new() -> Result<Self, ExportError> {
            let universe = mpi::initialize().ok_or_else(|| ExportError::Comm {
                rank: 0,
                detail: "MPI initialization failed".into(),
            })?;
            let world = universe.world();
            Ok(Self {
                _universe: universe,
                world,
            })
        }
    }

    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.world.rank() as usize
        }

        fn size(&self) -> usize {
            self.world.size() as usize
        }

        fn all_gather_counts(&self, local: u64) -> Result<Vec<u64>, ExportError> {
            let mut counts = vec![0u64; self.size()];
            self.world.all_gather_into(&local, &mut counts[..]);
            Ok(counts)
        }

        fn file_builder(&self) -> hdf5::FileBuilder {
            let raw = self.world.as_raw();
            hdf5::FileBuilder::new().with_fapl(move |p| p.mpio(raw, None))
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
