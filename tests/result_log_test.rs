//! Durability and exactness of the on-disk result log.

mod common;

use std::io::Write;

use common::temp_dir;
use meshsweep::domain::models::{Coefficients, ResultRecord, SamplePair};
use meshsweep::domain::ports::ResultStore;
use meshsweep::{FileResultStore, SweepError};

fn record(inner: f64, outer: f64) -> ResultRecord {
    ResultRecord::new(
        &SamplePair::new(inner, outer, 0, 0),
        Coefficients {
            lift: 0.327_557_123_456_789,
            drag: 0.022_364,
            moment: -0.083_1,
            efficiency: 0.327_557_123_456_789 / 0.022_364,
        },
    )
}

#[tokio::test]
async fn densities_reload_bit_for_bit() {
    let dir = temp_dir();
    let path = dir.path().join("convergenceResult.txt");

    let awkward = [0.1 + 0.2, 1.0 / 3.0, 0.00495, 1.905_000_000_000_000_1];
    let mut store = FileResultStore::open(&path).await.unwrap();
    for &inner in &awkward {
        store.append(&record(inner, 2.0 / 3.0)).await.unwrap();
    }
    drop(store);

    let reloaded = FileResultStore::read_records(&path).await.unwrap();
    assert_eq!(reloaded.len(), awkward.len());
    for (record, &inner) in reloaded.iter().zip(&awkward) {
        assert_eq!(record.inner.to_bits(), inner.to_bits());
        assert_eq!(record.outer.to_bits(), (2.0_f64 / 3.0).to_bits());
        assert_eq!(record.lift, 0.327_557_123_456_789);
    }
}

#[tokio::test]
async fn interrupted_write_keeps_complete_records() {
    let dir = temp_dir();
    let path = dir.path().join("convergenceResult.txt");
    {
        let mut store = FileResultStore::open(&path).await.unwrap();
        store.append(&record(0.1, 2.0)).await.unwrap();
        store.append(&record(0.05, 2.0)).await.unwrap();
    }
    // Simulate a crash halfway through the third line.
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"0.01,2,0.31").unwrap();
    drop(file);

    let records = FileResultStore::read_records(&path).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].inner, 0.05);
}

#[tokio::test]
async fn corrupt_line_names_its_position() {
    let dir = temp_dir();
    let path = dir.path().join("convergenceResult.txt");
    std::fs::write(
        &path,
        "0.1,2,0.3,0.02,-0.08,15\n0.05,2,oops,0.02,-0.08,15\n",
    )
    .unwrap();

    let err = FileResultStore::read_records(&path).await.unwrap_err();
    match err {
        SweepError::ResultLogParse { line, reason, .. } => {
            assert_eq!(line, 2);
            assert!(reason.contains("lift"), "{reason}");
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn log_lines_use_six_comma_separated_fields() {
    let dir = temp_dir();
    let path = dir.path().join("nested").join("log.txt");
    let mut store = FileResultStore::open(&path).await.unwrap();
    store.append(&record(0.01, 1.0)).await.unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let line = text.strip_suffix('\n').unwrap();
    assert_eq!(line.split(',').count(), 6);
    assert!(line.starts_with("0.01,1,0.327557123456789,0.022364,-0.0831,"));
}

#[tokio::test]
async fn reopening_after_a_torn_write_keeps_the_log_readable() {
    let dir = temp_dir();
    let path = dir.path().join("convergenceResult.txt");
    {
        let mut store = FileResultStore::open(&path).await.unwrap();
        store.append(&record(0.1, 1.0)).await.unwrap();
    }
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"0.05,1,0.4").unwrap();
    drop(file);

    let mut store = FileResultStore::open(&path).await.unwrap();
    store.append(&record(0.2, 1.0)).await.unwrap();

    let records = store.read_all().await.unwrap();
    let inner: Vec<f64> = records.iter().map(|r| r.inner).collect();
    assert_eq!(inner, vec![0.1, 0.2]);
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(!text.contains("0.05"));
}
