//! Chunk-scoped fertility records and their binary format
//!
//! Layout, big-endian:
//!
//! ```text
//! i32 version (= 2)
//! i32 count
//! count x { i32 packed_key, i8 base_fertility, i64 last_update_ms, f64 concentration }
//! ```
//!
//! Base fertility occupies one byte. Bytes above 150 read back as negative,
//! so the representable range is [-105, 150]. A non-finite or negative
//! concentration reads back as 0.

use ahash::AHashMap;
use nom::combinator::verify;
use nom::multi::count;
use nom::number::complete::{be_f64, be_i32, be_i64, be_u8};
use nom::{IResult, Parser};

use crate::core::error::{FarmError, Result};
use crate::core::types::{ChunkKey, LocalPos, Timestamp};
use crate::fertility::record::FertilityRecord;
use crate::storage::ChunkPayload;

pub const FORMAT_VERSION: i32 = 2;

/// Largest base fertility value that decodes as non-negative
const BYTE_POSITIVE_LIMIT: i32 = 150;

/// Smallest base fertility value the byte can hold
const BYTE_NEGATIVE_LIMIT: i32 = BYTE_POSITIVE_LIMIT - 255;

/// Sparse fertility records of one chunk keyed by packed local coordinate
#[derive(Debug, Clone, Default)]
pub struct ChunkFertilityStore {
    records: AHashMap<i32, FertilityRecord>,
    dirty: bool,
}

impl PartialEq for ChunkFertilityStore {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl ChunkFertilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, local: LocalPos) -> Option<&FertilityRecord> {
        self.records.get(&local.packed())
    }

    /// Insert or replace a record and mark the chunk dirty
    pub fn set(&mut self, local: LocalPos, record: FertilityRecord) {
        self.records.insert(local.packed(), record);
        self.dirty = true;
    }

    /// Move a record's clock without touching its values
    pub fn touch(&mut self, local: LocalPos, now: Timestamp) -> bool {
        match self.records.get_mut(&local.packed()) {
            Some(record) => {
                record.last_update = now;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, local: LocalPos) -> Option<FertilityRecord> {
        let removed = self.records.remove(&local.packed());
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LocalPos, &FertilityRecord)> {
        self.records.iter().map(|(key, r)| (LocalPos::unpack(*key), r))
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut keys: Vec<i32> = self.records.keys().copied().collect();
        keys.sort_unstable();

        let mut out = Vec::with_capacity(8 + keys.len() * 21);
        out.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
        out.extend_from_slice(&(keys.len() as i32).to_be_bytes());
        for key in keys {
            let record = &self.records[&key];
            out.extend_from_slice(&key.to_be_bytes());
            let byte = fertility_byte(record.base_fertility).unwrap_or_else(|e| {
                tracing::warn!("{}, storing the nearest representable value", e);
                let nearest = record
                    .base_fertility
                    .clamp(BYTE_NEGATIVE_LIMIT, BYTE_POSITIVE_LIMIT);
                nearest.rem_euclid(256) as u8
            });
            out.push(byte);
            out.extend_from_slice(&(record.last_update as i64).to_be_bytes());
            out.extend_from_slice(&record.concentration.to_be_bytes());
        }
        out
    }

    /// Decode a chunk payload
    ///
    /// Empty input, a foreign version or truncated data all give an empty
    /// store.
    pub fn deserialize(bytes: &[u8]) -> Self {
        let mut store = Self::default();
        if bytes.is_empty() {
            return store;
        }
        match entries(bytes) {
            Ok((_, entries)) => {
                for (key, fertility, last_update, concentration) in entries {
                    store.records.insert(key, decode_record(fertility, last_update, concentration));
                }
            }
            Err(e) => {
                tracing::warn!("Resetting unreadable fertility data: {}", e);
            }
        }
        store
    }
}

type RawEntry = (i32, u8, i64, f64);

fn entry(input: &[u8]) -> IResult<&[u8], RawEntry> {
    (be_i32, be_u8, be_i64, be_f64).parse(input)
}

fn entries(input: &[u8]) -> IResult<&[u8], Vec<RawEntry>> {
    (
        verify(be_i32, |v: &i32| *v == FORMAT_VERSION),
        verify(be_i32, |n: &i32| *n >= 0),
    )
        .flat_map(|(_, n)| count(entry, n as usize))
        .parse(input)
}

/// One-byte encoding of a base fertility in [-105, 150]
pub fn fertility_byte(fertility: i32) -> Result<u8> {
    if !(BYTE_NEGATIVE_LIMIT..=BYTE_POSITIVE_LIMIT).contains(&fertility) {
        return Err(FarmError::FertilityOutOfRange(fertility));
    }
    u8::try_from(fertility.rem_euclid(256)).map_err(|_| FarmError::FertilityOutOfRange(fertility))
}

fn decode_record(fertility: u8, last_update: i64, concentration: f64) -> FertilityRecord {
    let fertility = fertility as i32;
    let base_fertility = if fertility > BYTE_POSITIVE_LIMIT {
        fertility - 256
    } else {
        fertility
    };
    FertilityRecord {
        base_fertility,
        concentration: if concentration.is_finite() {
            concentration.max(0.0)
        } else {
            0.0
        },
        last_update: last_update.max(0) as Timestamp,
    }
}

impl ChunkPayload for ChunkFertilityStore {
    const SLOT: &'static str = "fertility";

    fn decode(chunk: ChunkKey, bytes: &[u8]) -> Self {
        let store = Self::deserialize(bytes);
        tracing::debug!("Decoded {} fertility records for chunk {}", store.len(), chunk);
        store
    }

    fn encode(&self) -> Vec<u8> {
        self.serialize()
    }

    fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
