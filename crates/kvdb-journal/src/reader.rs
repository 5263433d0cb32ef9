// Journal reader - replays framed records from the start of a journal file
//
// A frame that runs past the end of the file is a torn write from a crash
// and ends the replay cleanly. A complete frame that fails its checksum, or a
// length prefix no writer could have produced, is corruption and is reported
// as an error.

use crate::record::{JournalRecord, CRC_SIZE, LENGTH_SIZE, MAX_RECORD_SIZE};
use kvdb_core::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Sequential reader over a journal file
pub struct JournalReader {
    reader: BufReader<File>,
    file_len: u64,
    /// End of the last complete record
    offset: u64,
    torn_tail: bool,
}

impl JournalReader {
    /// Open a journal file for replay
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::Storage(format!("Failed to open journal {:?}: {}", path, e)))?;
        let file_len = file.metadata()?.len();

        Ok(Self {
            reader: BufReader::new(file),
            file_len,
            offset: 0,
            torn_tail: false,
        })
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at the end of the file, including when the final
    /// frame is incomplete.
    pub fn next_record(&mut self) -> Result<Option<JournalRecord>> {
        if self.torn_tail {
            return Ok(None);
        }

        let mut len_buf = [0u8; LENGTH_SIZE];
        let n = read_up_to(&mut self.reader, &mut len_buf)?;
        if n == 0 {
            return Ok(None);
        }
        if n < LENGTH_SIZE {
            return Ok(self.mark_torn());
        }

        let length = u32::from_le_bytes(len_buf) as u64;
        // Only a plausible length may be taken for a torn tail
        if length == 0 || length > MAX_RECORD_SIZE as u64 {
            return Err(Error::Storage(format!(
                "Corrupt journal length prefix {} at offset {}",
                length, self.offset
            )));
        }
        let frame_len = LENGTH_SIZE as u64 + length + CRC_SIZE as u64;
        if self.offset + frame_len > self.file_len {
            return Ok(self.mark_torn());
        }

        let mut frame = vec![0u8; frame_len as usize];
        frame[..LENGTH_SIZE].copy_from_slice(&len_buf);
        let n = read_up_to(&mut self.reader, &mut frame[LENGTH_SIZE..])?;
        if n < frame.len() - LENGTH_SIZE {
            return Ok(self.mark_torn());
        }

        let (record, consumed) = JournalRecord::decode(&frame).map_err(|e| {
            Error::Storage(format!("Corrupt journal record at offset {}: {}", self.offset, e))
        })?;
        self.offset += consumed as u64;

        Ok(Some(record))
    }

    /// Read every remaining record
    pub fn read_all(&mut self) -> Result<Vec<JournalRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Length of the valid prefix read so far
    pub fn valid_len(&self) -> u64 {
        self.offset
    }

    /// Whether replay stopped at an incomplete trailing frame
    pub fn has_torn_tail(&self) -> bool {
        self.torn_tail
    }

    fn mark_torn(&mut self) -> Option<JournalRecord> {
        tracing::warn!(
            offset = self.offset,
            file_len = self.file_len,
            "ignoring incomplete record at end of journal"
        );
        self.torn_tail = true;
        None
    }
}

/// Read until `buf` is full or the reader is exhausted
fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(filled)
}
