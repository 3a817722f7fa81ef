//! # h5export
//!
//! h5export consolidates the state of a parallel, domain-decomposed CFD
//! simulation — mesh geometry, volume and patch fields, particle-cloud
//! attributes — into a single HDF5 archive laid out for XDMF consumers, so
//! the dataset reads as one logical mesh instead of N per-process fragments.
//!
//! The crate is the parallel data-collection and collective-write engine:
//! per-rank counts are exchanged into global write offsets, datasets are
//! sized and chunked collectively, and each rank transfers its own row range
//! independently. No process ever holds the global dataset in memory, and
//! the layout is correct regardless of how unevenly cells, faces, or
//! particles are distributed (zero-count ranks included).
//!
//! ## Collective discipline
//!
//! The archive is the one shared resource. Non-overlapping row ranges from
//! the layout exchange are the sole mutual-exclusion mechanism: every rank
//! issues the same sequence of count exchanges and dataset-creation calls,
//! and only the data-transfer extents vary per rank. A rank that skips a
//! creation call because it is locally empty would deadlock the group or
//! corrupt the file; the writers here always create and only conditionally
//! transfer.
//!
//! ## Usage
//!
//! ```no_run
//! use h5export::prelude::*;
//!
//! # fn demo(mesh: LocalMesh, fields: FieldRegistry) -> Result<(), h5export::ExportError> {
//! let config = ExportConfig {
//!     field_names: vec!["U".into(), "p".into()],
//!     patch_names: vec!["inlet".into(), "outlet".into()],
//!     write_interval: 20,
//!     ..ExportConfig::default()
//! };
//! let mut exporter = H5Exporter::new(NoComm, config);
//! // once per simulation step:
//! exporter.write(&mesh, &fields, &[])?;
//! # Ok(())
//! # }
//! ```
//!
//! With the `mpi-support` feature, pass an
//! [`MpiComm`](crate::comm::MpiComm) instead of [`NoComm`](crate::comm::NoComm)
//! and the archive is opened with MPI-IO access properties.

pub mod archive;
pub mod chunk;
pub mod cloud;
pub mod comm;
pub mod config;
pub mod error;
pub mod field;
pub mod layout;
pub mod mesh;
pub mod schedule;
pub mod shape;
pub mod writer;

pub use error::ExportError;

/// A convenient prelude for the most-used types.
pub mod prelude {
    pub use crate::chunk::{plan_chunking, DatasetSpec};
    pub use crate::cloud::{AttributeData, CloudView};
    #[cfg(feature = "mpi-support")]
    pub use crate::comm::MpiComm;
    pub use crate::comm::{Communicator, NoComm};
    pub use crate::config::ExportConfig;
    pub use crate::error::ExportError;
    pub use crate::field::{classify_fields, FieldData, FieldGroups, FieldRegistry};
    pub use crate::layout::{GlobalInventory, GlobalLayout, RankCounts};
    pub use crate::mesh::{Cell, LocalMesh, LocalPatch};
    pub use crate::schedule::WriteClock;
    pub use crate::shape::CellShape;
    pub use crate::writer::H5Exporter;
}
