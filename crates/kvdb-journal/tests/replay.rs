// Integration tests for journal replay and crash handling

mod common;

use common::JournalTestFixture;
use kvdb_core::{Error, SyncMode};
use kvdb_journal::{torn_tail_path, Journal, JournalRecord};
use std::io::Write;

fn replay(fixture: &JournalTestFixture) -> (Journal, Vec<JournalRecord>, u64) {
    let mut records = Vec::new();
    let (journal, stats) = Journal::open(fixture.path(), SyncMode::Flush, |r| records.push(r))
        .expect("Failed to open journal");
    (journal, records, stats.truncated_bytes)
}

#[test]
fn test_open_missing_journal_creates_it() {
    let fixture = JournalTestFixture::new();

    let (journal, records, truncated) = replay(&fixture);

    assert!(records.is_empty());
    assert_eq!(truncated, 0);
    assert!(fixture.path().exists());
    assert_eq!(journal.size(), 0);
}

#[test]
fn test_records_survive_reopen() {
    let fixture = JournalTestFixture::new();
    {
        let (mut journal, _, _) = replay(&fixture);
        journal.append(&JournalRecord::put("user:1", "Alice")).unwrap();
        journal.append(&JournalRecord::put("user:2", "Bob")).unwrap();
        journal.append(&JournalRecord::put("user:1", "Carol")).unwrap();
    }

    let (_, records, _) = replay(&fixture);
    assert_eq!(
        records,
        vec![
            JournalRecord::put("user:1", "Alice"),
            JournalRecord::put("user:2", "Bob"),
            JournalRecord::put("user:1", "Carol"),
        ]
    );
}

#[test]
fn test_torn_tail_is_truncated_and_appends_continue() {
    let fixture = JournalTestFixture::new();
    {
        let (mut journal, _, _) = replay(&fixture);
        journal.append(&JournalRecord::put("a", "1")).unwrap();
    }
    let good_len = fixture.file_len();

    // Half of a second record, as if the process died mid-write
    let partial = JournalRecord::put("b", "2").encode().unwrap();
    std::fs::OpenOptions::new()
        .append(true)
        .open(fixture.path())
        .unwrap()
        .write_all(&partial[..partial.len() / 2])
        .unwrap();

    {
        let (mut journal, records, truncated) = replay(&fixture);
        assert_eq!(records, vec![JournalRecord::put("a", "1")]);
        assert_eq!(truncated, (partial.len() / 2) as u64);
        assert_eq!(fixture.file_len(), good_len);
        assert_eq!(
            std::fs::read(torn_tail_path(fixture.path())).unwrap(),
            &partial[..partial.len() / 2]
        );
        journal.append(&JournalRecord::put("c", "3")).unwrap();
    }

    let (_, records, truncated) = replay(&fixture);
    assert_eq!(truncated, 0);
    assert_eq!(
        records,
        vec![JournalRecord::put("a", "1"), JournalRecord::put("c", "3")]
    );
}

#[test]
fn test_corruption_in_middle_is_reported() {
    let fixture = JournalTestFixture::new();
    {
        let (mut journal, _, _) = replay(&fixture);
        journal.append(&JournalRecord::put("a", "1")).unwrap();
        journal.append(&JournalRecord::put("b", "2")).unwrap();
    }

    let mut bytes = std::fs::read(fixture.path()).unwrap();
    bytes[6] ^= 0xFF;
    std::fs::write(fixture.path(), &bytes).unwrap();

    let result = Journal::open(fixture.path(), SyncMode::Flush, |_| {});
    assert!(matches!(result, Err(Error::Storage(_))));
}

#[test]
fn test_corrupt_length_prefix_keeps_every_record() {
    let fixture = JournalTestFixture::new();
    {
        let (mut journal, _, _) = replay(&fixture);
        journal.append(&JournalRecord::put("a", "1")).unwrap();
        journal.append(&JournalRecord::put("b", "2")).unwrap();
        journal.append(&JournalRecord::put("c", "3")).unwrap();
    }

    let mut bytes = std::fs::read(fixture.path()).unwrap();
    let len_before = bytes.len() as u64;
    // High byte of the first record's length prefix
    bytes[3] ^= 0xFF;
    std::fs::write(fixture.path(), &bytes).unwrap();

    let result = Journal::open(fixture.path(), SyncMode::Flush, |_| {});
    assert!(matches!(result, Err(Error::Storage(_))));
    assert_eq!(fixture.file_len(), len_before);
    assert_eq!(std::fs::read(fixture.path()).unwrap(), bytes);
    assert!(!torn_tail_path(fixture.path()).exists());
}
