//! Chunk-scoped persistence
//!
//! The host owns a small persistent container per chunk. Each subsystem keeps
//! its data in a named slot of that container and caches the decoded form in
//! memory while the chunk is loaded:
//! - lazy load on first touch
//! - flush-if-dirty, then evict, on unload
//! - reload is idempotent

pub mod cache;

pub use cache::{ChunkCache, ChunkPayload};

use ahash::AHashMap;

use crate::core::types::ChunkKey;

/// Host chunk-local persistent container
pub trait ChunkStorage {
    /// Bytes stored in `slot` of `chunk`, if any
    fn load(&self, chunk: ChunkKey, slot: &str) -> Option<Vec<u8>>;

    /// Replace the contents of `slot`
    fn store(&mut self, chunk: ChunkKey, slot: &str, bytes: Vec<u8>);

    /// Delete `slot` entirely
    fn remove(&mut self, chunk: ChunkKey, slot: &str);
}

/// In-memory chunk storage for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryChunkStorage {
    slots: AHashMap<(ChunkKey, String), Vec<u8>>,
    writes: usize,
}

impl MemoryChunkStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `store` calls so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Number of non-empty slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl ChunkStorage for MemoryChunkStorage {
    fn load(&self, chunk: ChunkKey, slot: &str) -> Option<Vec<u8>> {
        self.slots.get(&(chunk, slot.to_string())).cloned()
    }

    fn store(&mut self, chunk: ChunkKey, slot: &str, bytes: Vec<u8>) {
        self.writes += 1;
        self.slots.insert((chunk, slot.to_string()), bytes);
    }

    fn remove(&mut self, chunk: ChunkKey, slot: &str) {
        self.slots.remove(&(chunk, slot.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WorldId;

    #[test]
    fn test_memory_storage_slots_are_independent() {
        let mut storage = MemoryChunkStorage::new();
        let chunk = ChunkKey::new(WorldId(0), 1, 2);
        storage.store(chunk, "a", vec![1]);
        storage.store(chunk, "b", vec![2]);
        assert_eq!(storage.load(chunk, "a"), Some(vec![1]));
        storage.remove(chunk, "a");
        assert_eq!(storage.load(chunk, "a"), None);
        assert_eq!(storage.load(chunk, "b"), Some(vec![2]));
        assert_eq!(storage.write_count(), 2);
    }
}
