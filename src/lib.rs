//! Cuisine Farming - crop genetics and soil fertility simulation
//!
//! The host game owns blocks and time; this crate owns what it layers on top:
//! - per-crop genotypes with Mendelian inheritance and mutation
//! - per-soil fertility and fertilizer concentration, projected lazily
//! - a growth efficiency that throttles or accelerates the host's growth
//!
//! Hosts create one [`simulation::FarmSimulation`] and feed it their events.

pub mod core;
pub mod fertility;
pub mod genetics;
pub mod growth;
pub mod simulation;
pub mod storage;
pub mod world;
