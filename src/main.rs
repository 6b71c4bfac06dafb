//! Headless farm runner
//!
//! Tills a rectangular field, plants random seeds and runs the host growth
//! stream together with the farming core for a number of ticks.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cuisine_farming::core::config::FarmingConfig;
use cuisine_farming::core::error::Result;
use cuisine_farming::core::types::{BlockPos, WorldId};
use cuisine_farming::genetics::Trait;
use cuisine_farming::simulation::{FarmSimulation, FertilizerKind};
use cuisine_farming::world::{CropKind, FarmWorld, MemoryField, Soil};

/// Milliseconds per host tick
const TICK_MILLIS: u64 = 50;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Fertilizer {
    None,
    Organic,
    Chemical,
}

/// Farm runner - grow a field of random seeds and report the results
#[derive(Parser, Debug)]
#[command(name = "farm_sim")]
#[command(about = "Simulate crop growth with genetics and soil fertility")]
struct Args {
    /// Field width in blocks
    #[arg(long, default_value_t = 9)]
    width: i32,

    /// Field depth in blocks
    #[arg(long, default_value_t = 9)]
    depth: i32,

    /// Host ticks to simulate (20 per second)
    #[arg(long, default_value_t = 24_000)]
    ticks: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Fertilizer applied to every soil cell after planting
    #[arg(long, value_enum, default_value = "organic")]
    fertilizer: Fertilizer,

    /// Host random tick speed
    #[arg(long, default_value_t = 3)]
    random_tick_speed: u32,

    /// TOML config overriding the default constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct CropReport {
    x: i32,
    z: i32,
    stage: u8,
    fertility: i32,
    efficiency: f64,
    stars: u8,
    genes: String,
}

#[derive(Serialize)]
struct FieldReport {
    seed: u64,
    ticks: u64,
    mature: usize,
    crops: Vec<CropReport>,
    vetoed: usize,
    extra_stages: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cuisine_farming=info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => FarmingConfig::load(path)?,
        None => FarmingConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    let section_volume = config.scheduler.section_volume;
    let numerator = config.scheduler.growth_points_numerator;

    let mut sim = FarmSimulation::new(config, seed)?;
    let mut field = MemoryField::new().with_random_tick_speed(args.random_tick_speed);
    let mut host_rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);

    let crops = plant_field(&mut sim, &mut field, args.width, args.depth)?;
    if let Some(kind) = match args.fertilizer {
        Fertilizer::None => None,
        Fertilizer::Organic => Some(FertilizerKind::Organic),
        Fertilizer::Chemical => Some(FertilizerKind::Chemical),
    } {
        for &crop in &crops {
            sim.on_fertilize(&field, crop, kind)?;
        }
    }
    tracing::info!("Planted {} crops, running {} ticks", crops.len(), args.ticks);

    let mut vetoed = 0;
    let mut extra_stages = 0;
    for _ in 0..args.ticks {
        field.advance_time(TICK_MILLIS);
        for crop in field.host_growth_attempts(section_volume, numerator, &mut host_rng) {
            if sim.on_growth_attempt(&field, crop).is_allowed() {
                field.advance_stage(crop);
            } else {
                vetoed += 1;
            }
        }
        extra_stages += sim.tick(&mut field);
    }
    sim.drain_events();

    let report = build_report(&mut sim, &field, &crops, seed, args.ticks, vetoed, extra_stages);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    sim.save_all();
    Ok(())
}

/// Till and plant the field with analyzed random seeds
fn plant_field(
    sim: &mut FarmSimulation,
    field: &mut MemoryField,
    width: i32,
    depth: i32,
) -> Result<Vec<BlockPos>> {
    let mut crops = Vec::new();
    for x in 0..width.max(1) {
        for z in 0..depth.max(1) {
            let crop = BlockPos::new(WorldId(0), x, 64, z);
            // Leave every fourth row untilled
            if z % 4 == 3 {
                continue;
            }
            field.set_soil(crop.below(), Soil::wet());
            sim.on_till(&*field, crop.below());
            field.plant(crop, CropKind(0), 7);
            let seed = sim.random_seed();
            let seed = sim.analyze_seed(Some(seed));
            sim.on_plant(&*field, crop, Some(seed))?;
            crops.push(crop);
        }
    }
    Ok(crops)
}

fn build_report(
    sim: &mut FarmSimulation,
    field: &MemoryField,
    crops: &[BlockPos],
    seed: u64,
    ticks: u64,
    vetoed: usize,
    extra_stages: u32,
) -> FieldReport {
    let mut reports = Vec::with_capacity(crops.len());
    for &crop in crops {
        let stage = field.crop(crop).map_or(0, |c| c.stage);
        let genotype = sim.genotype(crop).unwrap_or_default();
        reports.push(CropReport {
            x: crop.x,
            z: crop.z,
            stage,
            fertility: sim.fertility(field, crop.below()),
            efficiency: sim
                .efficiency_breakdown(field, crop)
                .map_or(0.0, |b| b.total),
            stars: genotype.star_rating(),
            genes: genotype.pair(Trait::GrowthSpeed).display(Trait::GrowthSpeed),
        });
    }
    FieldReport {
        seed,
        ticks,
        mature: crops
            .iter()
            .filter(|&&c| field.crop(c).is_some_and(|c| c.is_mature()))
            .count(),
        crops: reports,
        vetoed,
        extra_stages,
    }
}

fn print_report(report: &FieldReport) {
    println!("\n=== FARM REPORT (seed {}) ===", report.seed);
    println!(
        "{} ticks, {}/{} crops mature, {} growth vetoes, {} extra stages",
        report.ticks,
        report.mature,
        report.crops.len(),
        report.vetoed,
        report.extra_stages
    );
    println!("{:>4} {:>4} {:>5} {:>9} {:>10} {:>5}  speed", "x", "z", "stage", "fertility", "efficiency", "stars");
    for crop in &report.crops {
        println!(
            "{:>4} {:>4} {:>5} {:>9} {:>10.2} {:>5}  {}",
            crop.x, crop.z, crop.stage, crop.fertility, crop.efficiency, crop.stars, crop.genes
        );
    }
}
