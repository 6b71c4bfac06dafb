//! Lazy per-chunk cache over a [`ChunkStorage`]

use std::collections::BTreeMap;

use crate::core::types::ChunkKey;
use crate::storage::ChunkStorage;

/// Decoded form of one storage slot
pub trait ChunkPayload: Default {
    /// Slot name inside the chunk container
    const SLOT: &'static str;

    /// Decode stored bytes; unreadable data yields an empty payload
    fn decode(chunk: ChunkKey, bytes: &[u8]) -> Self;

    fn encode(&self) -> Vec<u8>;

    fn is_empty(&self) -> bool;

    fn is_dirty(&self) -> bool;

    fn mark_clean(&mut self);
}

/// Loaded payloads keyed by chunk
#[derive(Debug, Clone)]
pub struct ChunkCache<P> {
    loaded: BTreeMap<ChunkKey, P>,
}

impl<P> Default for ChunkCache<P> {
    fn default() -> Self {
        Self {
            loaded: BTreeMap::new(),
        }
    }
}

impl<P: ChunkPayload> ChunkCache<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self, chunk: ChunkKey) -> bool {
        self.loaded.contains_key(&chunk)
    }

    pub fn get_or_load(&mut self, chunk: ChunkKey, storage: &dyn ChunkStorage) -> &P {
        self.get_mut_or_load(chunk, storage)
    }

    pub fn get_mut_or_load(&mut self, chunk: ChunkKey, storage: &dyn ChunkStorage) -> &mut P {
        self.loaded.entry(chunk).or_insert_with(|| {
            let payload = match storage.load(chunk, P::SLOT) {
                Some(bytes) => P::decode(chunk, &bytes),
                None => P::default(),
            };
            tracing::debug!("Loaded {} for chunk {}", P::SLOT, chunk);
            payload
        })
    }

    /// Write a payload back if it changed
    ///
    /// Returns true when storage was touched.
    fn flush(chunk: ChunkKey, payload: &mut P, storage: &mut dyn ChunkStorage) -> bool {
        if !payload.is_dirty() {
            return false;
        }
        if payload.is_empty() {
            storage.remove(chunk, P::SLOT);
        } else {
            storage.store(chunk, P::SLOT, payload.encode());
        }
        payload.mark_clean();
        true
    }

    /// Flush if dirty, then evict; a chunk that is not loaded is left alone
    pub fn unload(&mut self, chunk: ChunkKey, storage: &mut dyn ChunkStorage) -> bool {
        let Some(mut payload) = self.loaded.remove(&chunk) else {
            return false;
        };
        let flushed = Self::flush(chunk, &mut payload, storage);
        tracing::debug!("Evicted {} for chunk {} (flushed: {})", P::SLOT, chunk, flushed);
        flushed
    }

    /// Flush every dirty payload, keeping them loaded
    pub fn flush_all(&mut self, storage: &mut dyn ChunkStorage) -> usize {
        let mut flushed = 0;
        for (chunk, payload) in self.loaded.iter_mut() {
            if Self::flush(*chunk, payload, storage) {
                flushed += 1;
            }
        }
        flushed
    }
}
