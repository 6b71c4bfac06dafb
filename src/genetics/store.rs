//! Chunk-scoped genotype storage
//!
//! Planted crops keep their genotype in the chunk, keyed by absolute cell
//! coordinate. Pollen applied to a crop lives in a second slot with the same
//! text format:
//!
//! ```text
//! 12,64,-3|ID=1,GROWTH_SPEED=A2:a1,YIELD=B1:b1,...;13,64,-3|ID=0,...;
//! ```
//!
//! Malformed records are skipped with a warning; the rest of the chunk loads.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use derive_more::{Deref, DerefMut};
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, i32 as int32};
use nom::combinator::all_consuming;
use nom::multi::separated_list1;
use nom::sequence::{preceded, separated_pair};
use nom::{IResult, Parser};

use crate::core::types::{BlockPos, ChunkKey};
use crate::genetics::gene_pair::GenePair;
use crate::genetics::genotype::Genotype;
use crate::genetics::trait_kind::Trait;
use crate::storage::{ChunkCache, ChunkPayload, ChunkStorage};

/// Genotypes of one chunk keyed by cell
#[derive(Debug, Clone, Default)]
pub struct GeneTable {
    entries: BTreeMap<BlockPos, Genotype>,
    dirty: bool,
}

impl GeneTable {
    pub fn get(&self, pos: &BlockPos) -> Option<&Genotype> {
        self.entries.get(pos)
    }

    pub fn insert(&mut self, pos: BlockPos, genotype: Genotype) {
        self.entries.insert(pos, genotype);
        self.dirty = true;
    }

    pub fn remove(&mut self, pos: &BlockPos) -> Option<Genotype> {
        let removed = self.entries.remove(pos);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockPos, &Genotype)> {
        self.entries.iter()
    }

    /// Render every record in the chunk text format
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (pos, genotype) in &self.entries {
            let _ = write!(out, "{},{},{}|{};", pos.x, pos.y, pos.z, genotype.encode_fields());
        }
        out
    }

    /// Parse the chunk text format; bad records are dropped
    pub fn from_text(chunk: ChunkKey, text: &str) -> Self {
        let mut table = Self::default();
        for raw in text.split(';').map(str::trim).filter(|r| !r.is_empty()) {
            match all_consuming(record).parse(raw) {
                Ok((_, ((x, y, z), fields))) => {
                    let pos = BlockPos::new(chunk.world, x, y, z);
                    table.entries.insert(pos, genotype_from_fields(&fields));
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed gene record in chunk {}: {:?} ({})", chunk, raw, e);
                }
            }
        }
        table
    }
}

fn coords(input: &str) -> IResult<&str, (i32, i32, i32)> {
    (int32, preceded(char(','), int32), preceded(char(','), int32)).parse(input)
}

fn field(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while1(|c: char| c.is_ascii_uppercase() || c == '_'),
        char('='),
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == ':'),
    )
    .parse(input)
}

type Record<'a> = ((i32, i32, i32), Vec<(&'a str, &'a str)>);

fn record(input: &str) -> IResult<&str, Record<'_>> {
    separated_pair(coords, char('|'), separated_list1(char(','), field)).parse(input)
}

/// Build a genotype from parsed `KEY=VALUE` fields
///
/// Traits that are missing, unknown or carry bad codes stay neutral.
fn genotype_from_fields(fields: &[(&str, &str)]) -> Genotype {
    let mut genotype = Genotype::neutral();
    for &(key, value) in fields {
        if key == "ID" {
            genotype.identified = value == "1";
            continue;
        }
        let Ok(t) = key.parse::<Trait>() else {
            tracing::warn!("Ignoring unknown trait {} in gene record", key);
            continue;
        };
        let pair = value.split_once(':').and_then(|(a, b)| {
            Some(GenePair::new(t.parse_allele_code(a)?, t.parse_allele_code(b)?))
        });
        match pair {
            Some(pair) => genotype.set_pair(t, pair),
            None => tracing::warn!("Ignoring bad allele codes {} for {}", value, t),
        }
    }
    genotype
}

impl ChunkPayload for GeneTable {
    const SLOT: &'static str = "genes";

    fn decode(chunk: ChunkKey, bytes: &[u8]) -> Self {
        Self::from_text(chunk, &String::from_utf8_lossy(bytes))
    }

    fn encode(&self) -> Vec<u8> {
        self.to_text().into_bytes()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// Pollen applied to planted crops, one entry per pollinated cell
#[derive(Debug, Clone, Default, Deref, DerefMut)]
pub struct PollenTable(GeneTable);

impl ChunkPayload for PollenTable {
    const SLOT: &'static str = "pollen";

    fn decode(chunk: ChunkKey, bytes: &[u8]) -> Self {
        Self(GeneTable::decode(chunk, bytes))
    }

    fn encode(&self) -> Vec<u8> {
        self.0.encode()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn is_dirty(&self) -> bool {
        self.0.dirty
    }

    fn mark_clean(&mut self) {
        self.0.dirty = false;
    }
}

/// Genotypes and pollen of every loaded chunk
#[derive(Debug, Default)]
pub struct ChunkGeneStore {
    genes: ChunkCache<GeneTable>,
    pollen: ChunkCache<PollenTable>,
}

impl ChunkGeneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn genotype(&mut self, pos: BlockPos, storage: &dyn ChunkStorage) -> Option<Genotype> {
        self.genes.get_or_load(pos.chunk(), storage).get(&pos).copied()
    }

    pub fn set_genotype(&mut self, pos: BlockPos, genotype: Genotype, storage: &dyn ChunkStorage) {
        self.genes.get_mut_or_load(pos.chunk(), storage).insert(pos, genotype);
    }

    pub fn pollen(&mut self, pos: BlockPos, storage: &dyn ChunkStorage) -> Option<Genotype> {
        self.pollen.get_or_load(pos.chunk(), storage).get(&pos).copied()
    }

    pub fn set_pollen(&mut self, pos: BlockPos, pollen: Genotype, storage: &dyn ChunkStorage) {
        self.pollen.get_mut_or_load(pos.chunk(), storage).insert(pos, pollen);
    }

    /// Drop genotype and pollen of a cell, returning both
    pub fn remove(
        &mut self,
        pos: BlockPos,
        storage: &dyn ChunkStorage,
    ) -> (Option<Genotype>, Option<Genotype>) {
        let genotype = self.genes.get_mut_or_load(pos.chunk(), storage).remove(&pos);
        let pollen = self.pollen.get_mut_or_load(pos.chunk(), storage).remove(&pos);
        (genotype, pollen)
    }

    pub fn is_loaded(&self, chunk: ChunkKey) -> bool {
        self.genes.is_loaded(chunk) || self.pollen.is_loaded(chunk)
    }

    /// Flush and evict both slots of a chunk
    pub fn unload(&mut self, chunk: ChunkKey, storage: &mut dyn ChunkStorage) -> bool {
        let genes = self.genes.unload(chunk, storage);
        let pollen = self.pollen.unload(chunk, storage);
        genes || pollen
    }

    pub fn save_all(&mut self, storage: &mut dyn ChunkStorage) -> usize {
        self.genes.flush_all(storage) + self.pollen.flush_all(storage)
    }
}
