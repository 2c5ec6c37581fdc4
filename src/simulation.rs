use crate::ants::{self, Ant, AntGrid, AntKernel};
use crate::config::SimulationConfig;
use crate::error::{SimulationError, SimulationResult};
use crate::grid::GridDims;
use crate::isosurface::{IsoSurface, IsosurfaceExtractor, ScalarField};
use crate::utils::cell_center;
use crate::world::{self, Cell, CellEventBuffer, WorldGrid};
use glam::{IVec3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::TryReserveError;
use std::time::{Duration, Instant};

pub type SimRng = StdRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No grids yet, or the last allocation attempt failed.
    Uninitialized,
    Running,
    Paused,
}

/// Aggregate view of the committed snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulationStats {
    pub tick: u64,
    pub total_food: f64,
    pub total_trail: f64,
    pub food_cells: usize,
    pub ants_carrying: usize,
    /// Food loads dropped at the nest since the last restart.
    pub deliveries: u64,
}

// Storage owned by one run. Dropped as a whole when the grid shape changes.
struct Grids {
    world: WorldGrid,
    ants: AntGrid,
    events: CellEventBuffer,
    nest: IVec3,
}

impl Grids {
    fn allocate(dims: GridDims, ant_dims: GridDims) -> Result<Self, TryReserveError> {
        Ok(Self {
            world: WorldGrid::try_new(dims, Cell::EMPTY)?,
            ants: AntGrid::try_new(ant_dims, Ant::default())?,
            events: CellEventBuffer::try_new(dims.len())?,
            nest: dims.center(),
        })
    }
}

/// The simulation engine: owns both double-buffered populations and schedules ticks.
///
/// Every mutating operation takes `&mut self`, so a tick can never overlap a restart.
pub struct SimulationState {
    pub config: SimulationConfig,
    rng: SimRng,
    run_state: RunState,
    grids: Option<Grids>,
    last_tick: Option<Instant>,
    tick_count: u64,
    deliveries: u64,
    seed: u64,
}

impl SimulationState {
    /// Creates an engine in the `Uninitialized` state; nothing is allocated until `restart`.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            rng: SimRng::from_entropy(),
            run_state: RunState::Uninitialized,
            grids: None,
            last_tick: None,
            tick_count: 0,
            deliveries: 0,
            seed: 0,
        }
    }

    /// Creates an engine and immediately restarts it.
    pub fn started(config: SimulationConfig) -> SimulationResult<Self> {
        let mut state = Self::new(config);
        state.restart()?;
        Ok(state)
    }

    /// Reinitializes the world and ants from the current configuration and enters `Running`.
    ///
    /// On a configuration error the previous run is left untouched. On an allocation
    /// failure the engine ends up `Uninitialized` with no grids.
    pub fn restart(&mut self) -> SimulationResult<()> {
        let (dims, ant_dims) = self.target_dims()?;
        self.prepare_grids(dims, ant_dims)?;
        self.reseed();

        let Some(grids) = self.grids.as_mut() else {
            return Err(SimulationError::NotInitialized);
        };
        let food_cells = world::populate(&mut grids.world, grids.nest, &self.config, &mut self.rng);
        ants::populate(&mut grids.ants, grids.nest);
        grids.events.clear();
        self.begin_run();

        log::info!(
            "Restarted: {}^3 cells, {} ants, {} food cells, nest at {}, seed {}",
            dims.size.x,
            ant_dims.len(),
            food_cells,
            dims.center(),
            self.seed
        );
        Ok(())
    }

    /// Like `restart`, but installs the given world and ant population instead of a random
    /// scatter. Values are clamped into range; ant positions are clamped onto the grid.
    pub fn restart_from(&mut self, cells: &[Cell], ants: &[Ant]) -> SimulationResult<()> {
        let (dims, ant_dims) = self.target_dims()?;
        for (expected, actual) in [(dims.len(), cells.len()), (ant_dims.len(), ants.len())] {
            if expected != actual {
                return Err(SimulationError::StateMismatch { expected, actual });
            }
        }
        self.prepare_grids(dims, ant_dims)?;
        self.reseed();

        let Some(grids) = self.grids.as_mut() else {
            return Err(SimulationError::NotInitialized);
        };
        let cells: Vec<Cell> = cells.iter().map(|cell| cell.clamped()).collect();
        let ants: Vec<Ant> = ants
            .iter()
            .map(|ant| Ant {
                position: dims.clamp(ant.position),
                carrying_food: ant.carrying_food,
                ..Ant::default()
            })
            .collect();
        grids.world.load(&cells);
        grids.ants.load(&ants);
        grids.events.clear();
        self.begin_run();

        log::info!(
            "Restarted from provided state: {}^3 cells, {} ants, seed {}",
            dims.size.x,
            ant_dims.len(),
            self.seed
        );
        Ok(())
    }

    fn target_dims(&self) -> SimulationResult<(GridDims, GridDims)> {
        if let Err(err) = self.config.validate() {
            log::warn!("Rejected configuration: {err}");
            return Err(err);
        }
        let cube_length = self.config.cube_length;
        let dims = GridDims::checked_cube(cube_length)
            .ok_or(SimulationError::GridTooLarge { cube_length })?;
        Ok((dims, GridDims::row(self.config.num_ants)))
    }

    // Reuses the existing storage when the shape is unchanged.
    fn prepare_grids(&mut self, dims: GridDims, ant_dims: GridDims) -> SimulationResult<()> {
        if let Some(grids) = &self.grids {
            if grids.world.dims() == dims && grids.ants.dims() == ant_dims {
                return Ok(());
            }
            log::info!(
                "Resizing grids to {}^3 cells and {} ants",
                dims.size.x,
                ant_dims.len()
            );
        }

        // Release the old run before reserving the new one.
        self.grids = None;
        self.run_state = RunState::Uninitialized;

        match Grids::allocate(dims, ant_dims) {
            Ok(grids) => {
                self.grids = Some(grids);
                Ok(())
            }
            Err(reserve_error) => {
                let err = SimulationError::Allocation {
                    cells: dims.len(),
                    ants: ant_dims.len(),
                };
                log::error!("{err}: {reserve_error}");
                Err(err)
            }
        }
    }

    fn reseed(&mut self) {
        self.seed = self.config.seed.unwrap_or_else(rand::random);
        self.rng = SimRng::seed_from_u64(self.seed);
    }

    fn begin_run(&mut self) {
        self.run_state = RunState::Running;
        self.last_tick = None;
        self.tick_count = 0;
        self.deliveries = 0;
    }

    /// Advances the simulation if it is running and a tick is due. Returns whether a tick ran.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// [`SimulationState::tick`] against an explicit clock reading.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        if self.run_state != RunState::Running {
            return false;
        }
        if let Some(last) = self.last_tick {
            let interval = Duration::try_from_secs_f32(self.config.update_interval_seconds)
                .unwrap_or(Duration::ZERO);
            if now.saturating_duration_since(last) < interval {
                return false;
            }
        }
        self.run_tick();
        self.last_tick = Some(now);
        true
    }

    /// Runs exactly one tick regardless of pacing or pause state.
    pub fn step(&mut self) -> SimulationResult<()> {
        if self.grids.is_none() {
            return Err(SimulationError::NotInitialized);
        }
        self.run_tick();
        self.last_tick = Some(Instant::now());
        Ok(())
    }

    fn run_tick(&mut self) {
        let Some(grids) = self.grids.as_mut() else {
            return;
        };
        let dims = grids.world.dims();
        let tick_seed: u64 = self.rng.r#gen();

        // Ant kernel: previous world + previous ants -> current ants.
        let kernel = AntKernel::new(grids.world.read(), dims, grids.nest, &self.config, tick_seed);
        ants::update_ants(&mut grids.ants, &kernel);

        // Post-move positions feed the world kernel.
        grids.events.clear();
        let mut delivered = 0;
        for ant in grids.ants.current() {
            grids.events.record(dims.index(ant.position), ant.picked_up);
            delivered += u64::from(ant.delivered);
        }

        // World kernel: previous world + current ants -> current world.
        world::update_world(&mut grids.world, &grids.events, &self.config);

        grids.world.swap();
        grids.ants.swap();
        self.tick_count += 1;
        self.deliveries += delivered;
        log::trace!(
            "Tick {} committed: {} occupied cells, {} deliveries",
            self.tick_count,
            grids.events.occupied_count(),
            delivered
        );
    }

    pub fn toggle_pause(&mut self) {
        self.run_state = match self.run_state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::Uninitialized => {
                log::warn!("Cannot pause: simulation is not initialized");
                return;
            }
        };
        log::info!(
            "Simulation {}",
            if self.is_paused() { "paused" } else { "resumed" }
        );
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.run_state == RunState::Paused
    }

    /// Dimensions of the live world grid, which may differ from `config.cube_length`
    /// until the next restart.
    pub fn dims(&self) -> Option<GridDims> {
        self.grids.as_ref().map(|grids| grids.world.dims())
    }

    /// The committed world snapshot.
    pub fn world(&self) -> Option<&[Cell]> {
        self.grids.as_ref().map(|grids| grids.world.read())
    }

    /// The committed ant snapshot.
    pub fn ants(&self) -> Option<&[Ant]> {
        self.grids.as_ref().map(|grids| grids.ants.read())
    }

    pub fn nest(&self) -> Option<IVec3> {
        self.grids.as_ref().map(|grids| grids.nest)
    }

    /// Ant cell centres in the normalised cube, for drawing markers.
    pub fn ant_positions(&self) -> Vec<Vec3> {
        let Some(grids) = &self.grids else {
            return Vec::new();
        };
        let dims = grids.world.dims();
        grids
            .ants
            .read()
            .iter()
            .map(|ant| cell_center(ant.position, dims))
            .collect()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Seed of the current run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stats(&self) -> SimulationStats {
        let Some(grids) = &self.grids else {
            return SimulationStats::default();
        };
        let cells = grids.world.read();
        SimulationStats {
            tick: self.tick_count,
            total_food: world::total_food(cells),
            total_trail: world::total_trail(cells),
            food_cells: world::food_cell_count(cells),
            ants_carrying: grids.ants.read().iter().filter(|ant| ant.carrying_food).count(),
            deliveries: self.deliveries,
        }
    }

    /// Triangulates the committed world snapshot. Read-only.
    pub fn extract<F: ScalarField + ?Sized>(
        &self,
        field: &F,
        iso_level: f32,
    ) -> SimulationResult<IsoSurface> {
        let grids = self.grids.as_ref().ok_or(SimulationError::NotInitialized)?;
        let extractor =
            IsosurfaceExtractor::new(iso_level).with_trail_opacity(self.config.trail_opacity);
        Ok(extractor.extract(grids.world.dims(), grids.world.read(), field))
    }
}
