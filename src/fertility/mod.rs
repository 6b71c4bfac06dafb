//! Soil fertility and fertilizer concentration
//!
//! Sparse per-cell records, created the first time a soil cell is tilled or
//! fertilized, persisted per chunk in a versioned binary format.

pub mod chunk;
pub mod record;
pub mod recovery;
pub mod store;

pub use chunk::ChunkFertilityStore;
pub use record::FertilityRecord;
pub use recovery::Projection;
pub use store::FertilityStore;
