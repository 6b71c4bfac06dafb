pub mod config;
pub mod error;
pub mod types;

pub use config::FarmingConfig;
pub use error::{FarmError, Result};
pub use types::{BlockPos, ChunkKey, LocalPos, Tick, Timestamp, WorldId};
