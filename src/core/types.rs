//! Core type definitions used throughout the codebase
//!
//! Positions are plain value types. Chunk-scoped state is keyed by
//! [`ChunkKey`], never by a handle to a host-owned chunk object.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Wall-clock timestamp in milliseconds
pub type Timestamp = u64;

/// Host tick counter (one host tick = 50ms at the nominal rate)
pub type Tick = u64;

/// Chunks are 16x16 columns of cells
pub const CHUNK_SHIFT: i32 = 4;
pub const CHUNK_MASK: i32 = 15;

/// Identifier of a host world (dimension)
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[display(fmt = "w{}", _0)]
pub struct WorldId(pub u32);

/// Absolute cell coordinate in a world
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "{}:{},{},{}", world, x, y, z)]
pub struct BlockPos {
    pub world: WorldId,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(world: WorldId, x: i32, y: i32, z: i32) -> Self {
        Self { world, x, y, z }
    }

    /// Cell at the given offset in the same world
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            world: self.world,
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// The soil cell a crop stands on
    pub fn below(&self) -> Self {
        self.offset(0, -1, 0)
    }

    /// Chunk containing this cell
    pub fn chunk(&self) -> ChunkKey {
        ChunkKey {
            world: self.world,
            x: self.x >> CHUNK_SHIFT,
            z: self.z >> CHUNK_SHIFT,
        }
    }

    /// Coordinate relative to the owning chunk
    pub fn local(&self) -> LocalPos {
        LocalPos {
            x: (self.x & CHUNK_MASK) as u8,
            y: self.y,
            z: (self.z & CHUNK_MASK) as u8,
        }
    }
}

/// Plain `(world, chunkX, chunkZ)` key for all chunk-scoped state
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "{}[{},{}]", world, x, z)]
pub struct ChunkKey {
    pub world: WorldId,
    pub x: i32,
    pub z: i32,
}

impl ChunkKey {
    pub fn new(world: WorldId, x: i32, z: i32) -> Self {
        Self { world, x, z }
    }

    /// Absolute position of a local coordinate inside this chunk
    pub fn block(&self, local: LocalPos) -> BlockPos {
        BlockPos {
            world: self.world,
            x: (self.x << CHUNK_SHIFT) | local.x as i32,
            y: local.y,
            z: (self.z << CHUNK_SHIFT) | local.z as i32,
        }
    }
}

/// Chunk-relative coordinate, packable into one 32-bit key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: u8,
    pub y: i32,
    pub z: u8,
}

impl LocalPos {
    /// `(x&0xFF)<<24 | (y&0xFFFF)<<8 | (z&0xFF)`
    pub fn packed(&self) -> i32 {
        let x = (self.x as u32) & 0xFF;
        let y = (self.y as u32) & 0xFFFF;
        let z = (self.z as u32) & 0xFF;
        ((x << 24) | (y << 8) | z) as i32
    }

    /// Inverse of [`LocalPos::packed`]; `y` is sign-extended from 16 bits
    pub fn unpack(key: i32) -> Self {
        let key = key as u32;
        Self {
            x: ((key >> 24) & 0xFF) as u8,
            y: ((key >> 8) & 0xFFFF) as u16 as i16 as i32,
            z: (key & 0xFF) as u8,
        }
    }
}
