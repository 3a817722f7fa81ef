//! Cloud-attribute kind agreement must be judged from the gathered tables
//! alone, so every rank reaches the same verdict before any creation call.
//! These tests emulate the ranks of a group one at a time: each emulated
//! rank gets its own layout view and a communicator replaying the same
//! gathered kind table the real collective would have produced.

use h5export::cloud::{AttributeData, CloudView};
use h5export::comm::Communicator;
use h5export::config::ExportConfig;
use h5export::error::ExportError;
use h5export::layout::{CloudLayout, GlobalInventory, GlobalLayout};
use h5export::writer::cloud::write_clouds;
use h5export::archive::ArchiveSession;
use h5export::comm::NoComm;
use serial_test::serial;

/// Replays one pre-agreed gather result, as seen from `rank`.
struct ScriptedComm {
    rank: usize,
    gathered: Vec<u64>,
}

impl Communicator for ScriptedComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.gathered.len()
    }

    fn all_gather_counts(&self, local: u64) -> Result<Vec<u64>, ExportError> {
        assert_eq!(
            self.gathered[self.rank], local,
            "emulated rank contributed a value the script did not expect"
        );
        Ok(self.gathered.clone())
    }
}

fn inventory(particle_counts: &[u64], rank: usize) -> GlobalInventory {
    let zeros = vec![0u64; particle_counts.len()];
    GlobalInventory {
        points: GlobalLayout::from_counts(&zeros, rank).unwrap(),
        cells: GlobalLayout::from_counts(&zeros, rank).unwrap(),
        patches: Vec::new(),
        clouds: vec![CloudLayout {
            name: "dust".to_string(),
            particles: GlobalLayout::from_counts(particle_counts, rank).unwrap(),
        }],
    }
}

fn config() -> ExportConfig {
    ExportConfig {
        cloud_names: vec!["dust".into()],
        cloud_attribs: vec!["d".into()],
        ..ExportConfig::default()
    }
}

fn run_rank(
    rank: usize,
    gathered_kinds: Vec<u64>,
    particle_counts: &[u64],
    view: Option<CloudView>,
) -> Result<(), ExportError> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("rank{rank}.h5"));
    let session = ArchiveSession::create(&path, &NoComm).unwrap();
    let comm = ScriptedComm {
        rank,
        gathered: gathered_kinds,
    };
    let views: Vec<CloudView> = view.into_iter().collect();
    let result = write_clouds(
        &session,
        &comm,
        &views,
        &inventory(particle_counts, rank),
        &config(),
        "steps/0000000001",
    );
    session.close().unwrap();
    result
}

#[test]
#[serial]
fn data_less_rank_with_particles_fails_on_every_rank() {
    // rank 0 holds data, rank 1 holds particles but never registered the
    // attribute: the whole group must reject the attribute identically.
    let kinds = vec![1u64, 0];
    let particles = [3u64, 5];

    let mut with_data = CloudView::new("dust", 3);
    with_data
        .insert_attribute("d", AttributeData::Scalar(vec![0.1, 0.2, 0.3]))
        .unwrap();
    let r0 = run_rank(0, kinds.clone(), &particles, Some(with_data));
    assert!(matches!(r0, Err(ExportError::AttributeKindMismatch { .. })));

    let without_data = CloudView::new("dust", 5);
    let r1 = run_rank(1, kinds, &particles, Some(without_data));
    assert!(matches!(r1, Err(ExportError::AttributeKindMismatch { .. })));
}

#[test]
#[serial]
fn disagreeing_kinds_fail_on_every_rank() {
    // rank 0 registered a scalar, rank 1 a vector
    let kinds = vec![1u64, 2];
    let particles = [2u64, 2];

    let mut scalar_view = CloudView::new("dust", 2);
    scalar_view
        .insert_attribute("d", AttributeData::Scalar(vec![1.0, 2.0]))
        .unwrap();
    let r0 = run_rank(0, kinds.clone(), &particles, Some(scalar_view));
    assert!(matches!(r0, Err(ExportError::AttributeKindMismatch { .. })));

    let mut vector_view = CloudView::new("dust", 2);
    vector_view
        .insert_attribute("d", AttributeData::Vector(vec![[1.0; 3], [2.0; 3]]))
        .unwrap();
    let r1 = run_rank(1, kinds, &particles, Some(vector_view));
    assert!(matches!(r1, Err(ExportError::AttributeKindMismatch { .. })));
}

#[test]
#[serial]
fn empty_rank_without_data_is_not_a_divergence() {
    // rank 1 has no particles at all, so its missing attribute is fine
    let kinds = vec![1u64, 0];
    let particles = [3u64, 0];

    let mut with_data = CloudView::new("dust", 3);
    with_data
        .insert_attribute("d", AttributeData::Scalar(vec![0.1, 0.2, 0.3]))
        .unwrap();
    run_rank(0, kinds.clone(), &particles, Some(with_data)).unwrap();
    run_rank(1, kinds, &particles, None).unwrap();
}
