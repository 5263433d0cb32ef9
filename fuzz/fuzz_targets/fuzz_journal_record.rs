#![no_main]

use kvdb_journal::record::JournalRecord;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1_000_000 {
        return;
    }

    // Must never panic; anything that decodes must survive a re-encode
    if let Ok((record, consumed)) = JournalRecord::decode(data) {
        assert!(consumed <= data.len());
        let encoded = record.encode().unwrap();
        let (again, _) = JournalRecord::decode(&encoded).unwrap();
        assert_eq!(again, record);
    }
});
