//! Headless driver: runs the colony for a number of ticks, logging statistics, then
//! extracts the final isosurface.

use antvox::constants::*;
use antvox::{FieldLayer, SimulationConfig, SimulationState};
use clap::{Parser, ValueEnum};
use std::time::Instant;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "antvox")]
#[command(about = "Ant colony foraging on a 3-D voxel grid")]
struct Args {
    /// World grid edge length in cells
    #[arg(long, default_value_t = DEFAULT_CUBE_LENGTH)]
    cube_length: u32,

    /// Number of ants
    #[arg(long, default_value_t = DEFAULT_NUM_ANTS)]
    num_ants: u32,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Random seed for reproducibility; omit to seed from entropy
    #[arg(long)]
    seed: Option<u64>,

    /// Probability an ant moves to a random neighbour
    #[arg(long, default_value_t = DEFAULT_RANDOM_MOVEMENT_PROBABILITY)]
    random_movement: f32,

    /// Per-cell probability of food at start
    #[arg(long, default_value_t = DEFAULT_INITIAL_FOOD_RATIO)]
    food_ratio: f32,

    /// Fraction of trail lost per tick
    #[arg(long, default_value_t = DEFAULT_TRAIL_DISSIPATION_PER_FRAME)]
    trail_dissipation: f32,

    /// Fraction of a cell's food taken per pickup
    #[arg(long, default_value_t = DEFAULT_FOOD_PICKUP_RATE)]
    food_pickup_rate: f32,

    /// Field the final isosurface is extracted from
    #[arg(long, value_enum, default_value_t = Layer::Combined)]
    layer: Layer,

    /// Iso level of the extracted surface
    #[arg(long, default_value_t = DEFAULT_ISO_LEVEL)]
    iso: f32,

    /// Respect the update interval between ticks instead of running flat out
    #[arg(long)]
    paced: bool,

    /// Snap every option into the control panel's limits
    #[arg(long)]
    clamp_to_ui: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Layer {
    Food,
    Trail,
    Nest,
    Combined,
}

impl From<Layer> for FieldLayer {
    fn from(layer: Layer) -> Self {
        match layer {
            Layer::Food => FieldLayer::Food,
            Layer::Trail => FieldLayer::Trail,
            Layer::Nest => FieldLayer::Nest,
            Layer::Combined => FieldLayer::Combined,
        }
    }
}

impl Args {
    fn to_config(&self) -> SimulationConfig {
        let config = SimulationConfig {
            cube_length: self.cube_length,
            num_ants: self.num_ants,
            random_movement_probability: self.random_movement,
            initial_food_ratio: self.food_ratio,
            trail_dissipation_per_frame: self.trail_dissipation,
            food_pickup_rate: self.food_pickup_rate,
            seed: self.seed,
            ..SimulationConfig::default()
        };
        if self.clamp_to_ui {
            config.clamped_to_ui_limits()
        } else {
            config
        }
    }
}

// --- Main Function ---
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut simulation_state = SimulationState::started(args.to_config())?;
    log::info!(
        "Running {} ticks (seed {}, {})",
        args.ticks,
        simulation_state.seed(),
        if args.paced { "paced" } else { "unpaced" }
    );

    let start_time = Instant::now();
    while simulation_state.tick_count() < args.ticks {
        if args.paced {
            if !simulation_state.tick() {
                std::thread::yield_now();
                continue;
            }
        } else {
            simulation_state.step()?;
        }

        if simulation_state.tick_count() % STATS_LOG_INTERVAL_TICKS == 0 {
            let stats = simulation_state.stats();
            log::info!(
                "Tick {}: food {:.2} in {} cells, trail {:.2}, {} carrying, {} delivered",
                stats.tick,
                stats.total_food,
                stats.food_cells,
                stats.total_trail,
                stats.ants_carrying,
                stats.deliveries
            );
        }
    }
    let elapsed = start_time.elapsed().as_secs_f64();
    log::info!(
        "Simulated {} ticks in {:.3}s ({:.1} ticks/s)",
        args.ticks,
        elapsed,
        args.ticks as f64 / elapsed.max(f64::EPSILON)
    );

    let layer = FieldLayer::from(args.layer);
    let surface = simulation_state.extract(&layer, args.iso)?;
    log::info!(
        "Extracted {:?} surface at iso {}: {} triangles, {} bytes of vertex data",
        layer,
        args.iso,
        surface.triangle_count(),
        surface.as_bytes().len()
    );
    Ok(())
}
