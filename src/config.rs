//! Export configuration: already-parsed plain values from the host.
//!
//! The host's dictionary parser hands these over validated for syntax; this
//! module only sanitizes content (duplicate or empty names) and reports each
//! dropped entry once. Names that do not match any field, patch or cloud at
//! write time are an expected outcome, not an error, and are diagnosed by
//! the classification pass instead.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Plain-value configuration for one exporter instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Path of the consolidated archive.
    pub archive_path: PathBuf,
    /// Volume fields to export (internal mesh and requested patches).
    pub field_names: Vec<String>,
    /// Boundary patches whose geometry and fields are exported.
    pub patch_names: Vec<String>,
    /// Particle clouds to export.
    pub cloud_names: Vec<String>,
    /// Per-particle attributes written for every exported cloud.
    pub cloud_attribs: Vec<String>,
    /// Target chunk size in bytes; 0 disables chunking entirely.
    pub chunk_size: u64,
    /// Write every N simulation steps; 0 means never.
    pub write_interval: u64,
    /// Skip field data for every step (mesh-only export).
    pub suppress_field_data: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from("export.h5"),
            field_names: Vec::new(),
            patch_names: Vec::new(),
            cloud_names: Vec::new(),
            cloud_attribs: Vec::new(),
            chunk_size: 0,
            write_interval: 1,
            suppress_field_data: false,
        }
    }
}

impl ExportConfig {
    /// Drop empty and duplicate names from every list, logging one warning
    /// per dropped entry. Order of the surviving entries is preserved; the
    /// list order fixes the collective call order during a write, so it must
    /// be identical on every rank.
    pub fn sanitize(&mut self) {
        for (what, list) in [
            ("field", &mut self.field_names),
            ("patch", &mut self.patch_names),
            ("cloud", &mut self.cloud_names),
            ("cloud attribute", &mut self.cloud_attribs),
        ] {
            let before = list.len();
            let cleaned: Vec<String> = list
                .iter()
                .filter(|n| {
                    if n.is_empty() {
                        log::warn!("dropping empty {what} name from configuration");
                        false
                    } else {
                        true
                    }
                })
                .unique()
                .cloned()
                .collect();
            if cleaned.len() < before {
                log::warn!(
                    "{} {what} entries dropped during configuration read",
                    before - cleaned.len()
                );
            }
            *list = cleaned;
        }
        if self.write_interval == 0 {
            log::info!("write interval 0: exporter disarmed, no writes will trigger");
        }
    }
}
