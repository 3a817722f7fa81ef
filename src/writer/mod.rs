//! The exporter: host call-ins and the write pipeline.
//!
//! `H5Exporter` is instantiated by the host's run-time selection layer and
//! driven once per simulation step through `write()`. When the clock says a
//! write is due the pipeline runs in dependency order: open the archive,
//! exchange the rank inventory, write mesh topology (first write only, or
//! after a topology-change signal), then fields and clouds for the step, and
//! close the archive. Every rank traverses the exact same sequence; that is
//! the whole collective contract.

pub mod cloud;
pub mod field;
pub mod mesh;

use crate::archive::ArchiveSession;
use crate::cloud::CloudView;
use crate::comm::Communicator;
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::field::{classify_fields, FieldRegistry};
use crate::layout::{GlobalInventory, RankCounts};
use crate::mesh::LocalMesh;
use crate::schedule::WriteClock;

/// Exports distributed simulation state into one consolidated HDF5 archive.
pub struct H5Exporter<C: Communicator> {
    comm: C,
    config: ExportConfig,
    clock: WriteClock,
    step: u64,
    writes_done: u64,
    mesh_written: bool,
    mesh_changed: bool,
}

impl<C: Communicator> H5Exporter<C> {
    /// Construct from an already-validated configuration. Content problems
    /// (duplicate/empty names) are diagnosed once and dropped here.
    pub fn new(comm: C, mut config: ExportConfig) -> Self {
        config.sanitize();
        let clock = WriteClock::new(config.write_interval);
        Self {
            comm,
            config,
            clock,
            step: 0,
            writes_done: 0,
            mesh_written: false,
            mesh_changed: false,
        }
    }

    /// Re-apply configuration (host `read()` call-in). Resets the write
    /// clock; the archive and step counter carry on.
    pub fn read(&mut self, mut config: ExportConfig) {
        config.sanitize();
        self.clock = WriteClock::new(config.write_interval);
        self.config = config;
    }

    /// Host `execute()` call-in. Hook point, currently no action.
    pub fn execute(&mut self) {}

    /// Host `end()` call-in at the final time loop. Hook point, currently
    /// no action.
    pub fn end(&mut self) {}

    /// Host signal that the mesh topology changed (motion, refinement).
    /// The next write re-exports topology under a step-tagged group.
    pub fn signal_mesh_changed(&mut self) {
        self.mesh_changed = true;
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn comm(&self) -> &C {
        &self.comm
    }

    /// Number of completed write events.
    pub fn writes_done(&self) -> u64 {
        self.writes_done
    }

    /// Host `write()` call-in, once per simulation step. Returns whether a
    /// write event actually ran. Collective whenever it returns `Ok(true)`;
    /// the clock arithmetic is deterministic, so all ranks agree on whether
    /// the pipeline runs.
    pub fn write(
        &mut self,
        mesh: &LocalMesh,
        fields: &FieldRegistry,
        clouds: &[CloudView],
    ) -> Result<bool, ExportError> {
        self.step += 1;
        if !self.clock.tick() {
            return Ok(false);
        }
        self.perform_write(mesh, fields, clouds)?;
        self.clock.rearm();
        Ok(true)
    }

    fn perform_write(
        &mut self,
        mesh: &LocalMesh,
        fields: &FieldRegistry,
        clouds: &[CloudView],
    ) -> Result<(), ExportError> {
        let counts = RankCounts::compute(mesh, clouds, &self.config);
        let session = if self.writes_done == 0 {
            ArchiveSession::create(&self.config.archive_path, &self.comm)?
        } else {
            ArchiveSession::append(&self.config.archive_path, &self.comm)?
        };
        let inv = GlobalInventory::exchange(&counts, &self.comm)?;

        let step_id = format!("{:010}", self.step);
        if !self.mesh_written || self.mesh_changed {
            let group_path = if self.mesh_written {
                format!("mesh_{step_id}")
            } else {
                "mesh".to_string()
            };
            mesh::write_mesh(&session, &self.comm, mesh, &inv, &self.config, &group_path)?;
            self.mesh_written = true;
            self.mesh_changed = false;
        }

        let step_path = format!("steps/{step_id}");
        session.ensure_group(&step_path)?;
        if self.config.suppress_field_data {
            log::debug!("step {step_id}: field data suppressed, mesh-only export");
        } else {
            let groups = classify_fields(&self.config.field_names, fields);
            field::write_fields(&session, fields, &groups, &inv, &self.config, &step_path)?;
        }
        cloud::write_clouds(&session, &self.comm, clouds, &inv, &self.config, &step_path)?;

        self.writes_done += 1;
        log::info!(
            "rank {}: wrote step {step_id} ({} cells, {} points global)",
            self.comm.rank(),
            inv.cells.total(),
            inv.points.total()
        );
        session.close()
    }
}
