// Journal record format and encoding/decoding
//
// Record format (binary):
// [length: u32 LE] [type: u8] [payload bytes] [crc32: u32 LE]
//
// `length` covers the type byte and the payload. The CRC covers the same
// bytes. Payloads are bincode-encoded.

use crc32fast::Hasher;
use kvdb_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Size of the length prefix
pub const LENGTH_SIZE: usize = 4;
/// Size of the trailing checksum
pub const CRC_SIZE: usize = 4;
/// Smallest possible frame: length + type + empty payload + crc
pub const MIN_FRAME_SIZE: usize = LENGTH_SIZE + 1 + CRC_SIZE;
/// Largest value the length prefix may hold (type byte + payload)
pub const MAX_RECORD_SIZE: usize = 16 * 1024 * 1024;
/// Largest possible frame
pub const MAX_FRAME_SIZE: usize = LENGTH_SIZE + MAX_RECORD_SIZE + CRC_SIZE;

/// Journal record types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordType {
    Put = 1,
}

impl TryFrom<u8> for RecordType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(RecordType::Put),
            _ => Err(Error::Serialization(format!(
                "Unknown journal record type: {}",
                value
            ))),
        }
    }
}

/// A journal record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalRecord {
    /// Upsert of a single key
    Put { key: String, value: String },
}

impl JournalRecord {
    /// Create a PUT record
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        JournalRecord::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The type tag written in front of the payload
    pub fn record_type(&self) -> RecordType {
        match self {
            JournalRecord::Put { .. } => RecordType::Put,
        }
    }

    /// Encode record to bytes with framing and CRC
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize record: {}", e)))?;
        let type_byte = self.record_type() as u8;
        let content_len = 1 + payload.len();
        if content_len > MAX_RECORD_SIZE {
            return Err(Error::Serialization(format!(
                "Record of {} bytes exceeds the {} byte limit",
                content_len, MAX_RECORD_SIZE
            )));
        }

        let mut hasher = Hasher::new();
        hasher.update(&[type_byte]);
        hasher.update(&payload);
        let crc = hasher.finalize();

        let mut frame = Vec::with_capacity(LENGTH_SIZE + content_len + CRC_SIZE);
        frame.extend_from_slice(&(content_len as u32).to_le_bytes());
        frame.push(type_byte);
        frame.extend_from_slice(&payload);
        frame.extend_from_slice(&crc.to_le_bytes());
        Ok(frame)
    }

    /// Decode one record from the front of `data`.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < MIN_FRAME_SIZE {
            return Err(Error::Serialization("Incomplete record frame".to_string()));
        }

        let length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if length == 0 {
            return Err(Error::Serialization("Empty record frame".to_string()));
        }
        if length > MAX_RECORD_SIZE {
            return Err(Error::Serialization(format!(
                "Record length {} exceeds the {} byte limit",
                length, MAX_RECORD_SIZE
            )));
        }
        let total_size = LENGTH_SIZE
            .checked_add(length)
            .and_then(|n| n.checked_add(CRC_SIZE))
            .ok_or_else(|| Error::Serialization("Record length overflow".to_string()))?;
        if data.len() < total_size {
            return Err(Error::Serialization(format!(
                "Incomplete record: expected {} bytes, got {}",
                total_size,
                data.len()
            )));
        }

        let content = &data[LENGTH_SIZE..LENGTH_SIZE + length];
        let crc_offset = LENGTH_SIZE + length;
        let expected_crc = u32::from_le_bytes([
            data[crc_offset],
            data[crc_offset + 1],
            data[crc_offset + 2],
            data[crc_offset + 3],
        ]);
        let actual_crc = crc32fast::hash(content);
        if actual_crc != expected_crc {
            return Err(Error::Storage(format!(
                "CRC mismatch: expected {}, got {}",
                expected_crc, actual_crc
            )));
        }

        let record_type = RecordType::try_from(content[0])?;
        let record: JournalRecord = bincode::deserialize(&content[1..])
            .map_err(|e| Error::Serialization(format!("Failed to deserialize record: {}", e)))?;
        if record.record_type() != record_type {
            return Err(Error::Serialization(format!(
                "Record type tag {:?} does not match payload",
                record_type
            )));
        }

        Ok((record, total_size))
    }
}
