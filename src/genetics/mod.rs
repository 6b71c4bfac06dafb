//! Crop genetics
//!
//! Every seed and planted crop carries a [`Genotype`]: one [`GenePair`] per
//! [`Trait`], each pair made of two [`Allele`]s. Heterozygous pairs score
//! double (hybrid vigor), so breeding rewards crossing distinct lines.

pub mod allele;
pub mod engine;
pub mod gene_pair;
pub mod genotype;
pub mod pollination;
pub mod store;
pub mod trait_kind;

pub use allele::Allele;
pub use engine::{Deviation, GeneticsEngine};
pub use gene_pair::GenePair;
pub use genotype::Genotype;
pub use store::{ChunkGeneStore, GeneTable, PollenTable};
pub use trait_kind::Trait;
