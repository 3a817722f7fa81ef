//! ExportError: unified error type for the h5export public APIs.
//!
//! Collective I/O faults (HDF5 create/write failures, communicator failures)
//! are fatal by design: a partially written collective dataset has undefined
//! content on the other ranks, so no partial-write recovery is attempted.
//! Configuration problems are *not* surfaced through this type; they are
//! logged once per offending entry at read time and the entry is dropped.

use thiserror::Error;

/// Unified error type for export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failure inside the HDF5 library (file, group, dataset or attribute).
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// A collective exchange failed or returned inconsistent data.
    #[error("communication failure on rank {rank}: {detail}")]
    Comm { rank: usize, detail: String },

    /// A rank index outside the gathered count table.
    #[error("rank {rank} out of range for {n_ranks} gathered counts")]
    RankOutOfRange { rank: usize, n_ranks: usize },

    /// Local data length disagrees with the count this rank advertised
    /// during the layout exchange.
    #[error("dataset `{name}`: advertised {expected} local rows, got {actual}")]
    RowCountMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    /// Ranks disagree on the value kind of a cloud attribute.
    #[error("cloud `{cloud}` attribute `{attrib}`: ranks disagree on value kind")]
    AttributeKindMismatch { cloud: String, attrib: String },

    /// Per-particle attribute data whose length does not match the cloud size.
    #[error("cloud `{cloud}` attribute `{attrib}`: {actual} values for {expected} particles")]
    AttributeLengthMismatch {
        cloud: String,
        attrib: String,
        expected: u64,
        actual: u64,
    },
}
