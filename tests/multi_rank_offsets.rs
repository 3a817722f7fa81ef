//! Offset arithmetic against a real file: per-rank contributions written at
//! layout offsets must reassemble exactly, including ranks that contribute
//! nothing. Ranks are emulated sequentially; each one uses only its own
//! layout view, exactly as a real rank would.

use h5export::archive::{write_rows_1d, ArchiveSession};
use h5export::chunk::DatasetSpec;
use h5export::comm::NoComm;
use h5export::layout::GlobalLayout;
use serial_test::serial;

#[test]
#[serial]
fn scalar_rows_reassemble_with_a_zero_count_rank() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ranks.h5");

    let counts = [3u64, 0, 2];
    let per_rank: [&[f64]; 3] = [&[1.0, 1.0, 1.0], &[], &[3.0, 3.0]];

    {
        let session = ArchiveSession::create(&path, &NoComm).unwrap();
        let group = session.ensure_group("steps/0000000001/internalField").unwrap();
        let total = counts.iter().sum::<u64>();
        let spec = DatasetSpec::new("p", 1, total, 32, 8);
        let ds = session.create_dataset::<f64>(&group, &spec).unwrap();
        for rank in 0..counts.len() {
            let layout = GlobalLayout::from_counts(&counts, rank).unwrap();
            assert_eq!(layout.my_count() as usize, per_rank[rank].len());
            write_rows_1d(&ds, layout.my_offset(), per_rank[rank]).unwrap();
        }
        session.close().unwrap();
    }

    let file = hdf5::File::open(&path).unwrap();
    let ds = file.dataset("steps/0000000001/internalField/p").unwrap();
    let all = ds.read_raw::<f64>().unwrap();
    assert_eq!(all, vec![1.0, 1.0, 1.0, 3.0, 3.0]);

    // reassemble each rank's slice from its recorded offset
    for rank in 0..counts.len() {
        let layout = GlobalLayout::from_counts(&counts, rank).unwrap();
        let start = layout.my_offset() as usize;
        let end = start + layout.my_count() as usize;
        assert_eq!(&all[start..end], per_rank[rank]);
    }
}

#[test]
#[serial]
fn variable_length_faces_reconstruct_across_ranks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("faces.h5");

    // rank 0: a quad and a triangle; rank 1: nothing; rank 2: a pentagon
    let rank_faces: [&[&[i64]]; 3] = [&[&[0, 1, 2, 3], &[4, 5, 6]], &[], &[&[7, 8, 9, 10, 11]]];
    let face_counts: Vec<u64> = rank_faces.iter().map(|f| f.len() as u64).collect();
    let point_counts: Vec<u64> = rank_faces
        .iter()
        .map(|f| f.iter().map(|face| face.len() as u64).sum())
        .collect();

    {
        let session = ArchiveSession::create(&path, &NoComm).unwrap();
        let group = session.ensure_group("mesh/patches/inlet").unwrap();
        let n_faces: u64 = face_counts.iter().sum();
        let n_points: u64 = point_counts.iter().sum();
        let offsets_ds = session
            .create_dataset::<i64>(&group, &DatasetSpec::new("offsets", 1, n_faces + 1, 0, 8))
            .unwrap();
        let faces_ds = session
            .create_dataset::<i64>(&group, &DatasetSpec::new("faces", 1, n_points, 0, 8))
            .unwrap();

        for rank in 0..3 {
            let elems = GlobalLayout::from_counts(&face_counts, rank).unwrap();
            let flat = GlobalLayout::from_counts(&point_counts, rank).unwrap();
            let mut running = flat.my_offset() as i64;
            let mut local_offsets = Vec::new();
            let mut local_flat = Vec::new();
            for face in rank_faces[rank] {
                local_offsets.push(running);
                running += face.len() as i64;
                local_flat.extend_from_slice(face);
            }
            write_rows_1d(&offsets_ds, elems.my_offset(), &local_offsets).unwrap();
            write_rows_1d(&faces_ds, flat.my_offset(), &local_flat).unwrap();
            if rank == 0 {
                write_rows_1d(&offsets_ds, elems.total(), &[flat.total() as i64]).unwrap();
            }
        }
        session.close().unwrap();
    }

    let file = hdf5::File::open(&path).unwrap();
    let offsets = file
        .dataset("mesh/patches/inlet/offsets")
        .unwrap()
        .read_raw::<i64>()
        .unwrap();
    let flat = file
        .dataset("mesh/patches/inlet/faces")
        .unwrap()
        .read_raw::<i64>()
        .unwrap();
    assert_eq!(offsets, vec![0, 4, 7, 12]);
    let rebuilt: Vec<Vec<i64>> = offsets
        .windows(2)
        .map(|w| flat[w[0] as usize..w[1] as usize].to_vec())
        .collect();
    assert_eq!(
        rebuilt,
        vec![vec![0, 1, 2, 3], vec![4, 5, 6], vec![7, 8, 9, 10, 11]]
    );
}

#[test]
#[serial]
fn append_session_adds_to_an_existing_archive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("append.h5");

    {
        let session = ArchiveSession::create(&path, &NoComm).unwrap();
        let group = session.ensure_group("mesh").unwrap();
        let ds = session
            .create_dataset::<f64>(&group, &DatasetSpec::new("points", 3, 2, 0, 8))
            .unwrap();
        let rows = h5export::archive::vectors_to_rows(&[[0.0; 3], [1.0, 1.0, 1.0]]);
        h5export::archive::write_rows_2d(&ds, 0, rows.view()).unwrap();
        session.close().unwrap();
    }
    {
        let session = ArchiveSession::append(&path, &NoComm).unwrap();
        assert!(session.has_group("mesh"));
        let group = session.ensure_group("steps/0000000005").unwrap();
        let ds = session
            .create_dataset::<f64>(&group, &DatasetSpec::new("p", 1, 2, 0, 8))
            .unwrap();
        write_rows_1d(&ds, 0, &[4.0, 5.0]).unwrap();
        session.close().unwrap();
    }

    let file = hdf5::File::open(&path).unwrap();
    assert!(file.dataset("mesh/points").is_ok());
    assert_eq!(
        file.dataset("steps/0000000005/p")
            .unwrap()
            .read_raw::<f64>()
            .unwrap(),
        vec![4.0, 5.0]
    );
}
