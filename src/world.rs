use crate::config::SimulationConfig;
use crate::constants::{FULL_FOOD_LEVEL, MAX_TRAIL_LEVEL, MIN_FOOD_LEVEL};
use crate::grid::{DoubleBufferedGrid, GridDims};
use glam::IVec3;
use rand::Rng;
use rayon::prelude::*;
use std::collections::TryReserveError;

/// State of one lattice point of the world.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cell {
    /// Fixed at initialization.
    pub is_nest: bool,
    /// In `[0, 1]`; only ever decreases within a run.
    pub food: f32,
    /// Pheromone concentration in `[0, 1]`.
    pub trail: f32,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        is_nest: false,
        food: 0.0,
        trail: 0.0,
    };

    pub const NEST: Cell = Cell {
        is_nest: true,
        food: 0.0,
        trail: 0.0,
    };

    pub fn with_food(food: f32) -> Self {
        Self {
            food,
            ..Self::EMPTY
        }
    }

    pub fn with_trail(trail: f32) -> Self {
        Self {
            trail,
            ..Self::EMPTY
        }
    }

    /// Forces `food` and `trail` back into `[0, 1]`; NaN collapses to 0.
    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            is_nest: self.is_nest,
            food: clamp_unit(self.food),
            trail: clamp_unit(self.trail),
        }
    }
}

#[inline]
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

pub type WorldGrid = DoubleBufferedGrid<Cell>;

/// What the ant kernel did to one cell during the tick in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellEvents {
    /// At least one ant stands on the cell after moving.
    pub occupied: bool,
    /// At least one ant picked food up here.
    pub pickup: bool,
}

/// Per-cell events for one tick.
///
/// Sized like the world grid and reused across ticks; only the entries touched by the
/// previous tick are cleared, so resetting costs O(ants) rather than O(cells).
#[derive(Debug, Clone)]
pub struct CellEventBuffer {
    events: Vec<CellEvents>,
    touched: Vec<usize>,
}

impl CellEventBuffer {
    pub fn try_new(len: usize) -> Result<Self, TryReserveError> {
        let mut events = Vec::new();
        events.try_reserve_exact(len)?;
        events.resize(len, CellEvents::default());
        Ok(Self {
            events,
            touched: Vec::new(),
        })
    }

    pub fn clear(&mut self) {
        for &index in &self.touched {
            self.events[index] = CellEvents::default();
        }
        self.touched.clear();
    }

    pub fn record(&mut self, index: usize, pickup: bool) {
        let entry = &mut self.events[index];
        if !entry.occupied {
            self.touched.push(index);
        }
        entry.occupied = true;
        entry.pickup |= pickup;
    }

    #[inline]
    pub fn get(&self, index: usize) -> CellEvents {
        self.events[index]
    }

    pub fn as_slice(&self) -> &[CellEvents] {
        &self.events
    }

    pub fn occupied_count(&self) -> usize {
        self.touched.len()
    }
}

/// Next state of a single cell given its previous state and this tick's events.
///
/// Deposit is applied before dissipation, so a dissipation of 1 clears every cell. The
/// flip side is that trail stays strictly below 1 whenever dissipation is nonzero.
#[inline]
pub fn next_cell(previous: &Cell, events: CellEvents, config: &SimulationConfig) -> Cell {
    let deposit = if events.occupied {
        config.trail_deposit_amount
    } else {
        0.0
    };
    let trail = ((previous.trail + deposit).min(MAX_TRAIL_LEVEL))
        * (1.0 - config.trail_dissipation_per_frame);

    let food = if events.pickup {
        let remaining = previous.food * (1.0 - config.food_pickup_rate);
        if remaining < MIN_FOOD_LEVEL { 0.0 } else { remaining }
    } else {
        previous.food
    };

    Cell {
        is_nest: previous.is_nest,
        food,
        trail,
    }
    .clamped()
}

/// World kernel: every output cell is computed independently from the previous snapshot
/// and the events the ant kernel recorded for this tick.
pub fn update_world(world: &mut WorldGrid, events: &CellEventBuffer, config: &SimulationConfig) {
    let (previous, current) = world.split();
    current
        .par_iter_mut()
        .zip(previous.par_iter())
        .zip(events.as_slice().par_iter())
        .for_each(|((out, prev), &cell_events)| {
            *out = next_cell(prev, cell_events, config);
        });
}

/// Whether `pos` lies inside the nest cube of Chebyshev radius `radius` around `center`.
#[inline]
pub fn in_nest(pos: IVec3, center: IVec3, radius: u32) -> bool {
    (pos - center).abs().max_element() <= radius as i32
}

/// `radius` limited to the largest extent the grid can hold.
#[inline]
pub fn effective_nest_radius(radius: u32, dims: GridDims) -> u32 {
    let max_radius = (dims.size.max_element() - 1).max(0) as u32;
    radius.min(max_radius)
}

/// Rebuilds the world in place: nest around `nest`, food scattered independently per
/// cell with probability `initial_food_ratio`, trail zeroed.
///
/// The nest radius is capped at `cube_length - 1`, so a one-cell world is all nest.
///
/// Returns the number of food cells placed.
pub fn populate<R: Rng + ?Sized>(
    world: &mut WorldGrid,
    nest: IVec3,
    config: &SimulationConfig,
    rng: &mut R,
) -> usize {
    let dims: GridDims = world.dims();
    let food_ratio = config.initial_food_ratio as f64;
    let nest_radius = effective_nest_radius(config.nest_radius, dims);
    let mut food_cells = 0;
    world.reset_with(|index| {
        let pos = dims.position(index);
        if in_nest(pos, nest, nest_radius) {
            Cell::NEST
        } else if rng.gen_bool(food_ratio) {
            food_cells += 1;
            Cell::with_food(FULL_FOOD_LEVEL)
        } else {
            Cell::EMPTY
        }
    });
    food_cells
}

pub fn total_food(cells: &[Cell]) -> f64 {
    cells.par_iter().map(|cell| cell.food as f64).sum()
}

pub fn total_trail(cells: &[Cell]) -> f64 {
    cells.par_iter().map(|cell| cell.trail as f64).sum()
}

pub fn food_cell_count(cells: &[Cell]) -> usize {
    cells.par_iter().filter(|cell| cell.food > 0.0).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config() -> SimulationConfig {
        SimulationConfig {
            trail_dissipation_per_frame: 0.1,
            trail_deposit_amount: 0.2,
            food_pickup_rate: 0.5,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_trail_decays_without_ants() {
        let next = next_cell(&Cell::with_trail(0.5), CellEvents::default(), &config());
        assert!((next.trail - 0.45).abs() < 1e-6);
        assert_eq!(next.food, 0.0);
    }

    #[test]
    fn test_occupied_cell_gains_trail_capped_at_one() {
        let occupied = CellEvents {
            occupied: true,
            pickup: false,
        };
        let next = next_cell(&Cell::with_trail(0.1), occupied, &config());
        assert!((next.trail - 0.27).abs() < 1e-6);

        let saturated = next_cell(&Cell::with_trail(0.95), occupied, &config());
        assert!(saturated.trail <= 1.0);
        assert!((saturated.trail - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_pickup_discounts_food_and_snaps_small_remainders() {
        let pickup = CellEvents {
            occupied: true,
            pickup: true,
        };
        let next = next_cell(&Cell::with_food(0.8), pickup, &config());
        assert!((next.food - 0.4).abs() < 1e-6);

        let exhausted = next_cell(&Cell::with_food(0.0015), pickup, &config());
        assert_eq!(exhausted.food, 0.0);

        let untouched = next_cell(&Cell::with_food(0.8), CellEvents::default(), &config());
        assert_eq!(untouched.food, 0.8);
    }

    #[test]
    fn test_trail_never_saturates_under_dissipation() {
        let occupied = CellEvents {
            occupied: true,
            pickup: false,
        };
        let mut cell = Cell::with_trail(1.0);
        for _ in 0..50 {
            cell = next_cell(&cell, occupied, &config());
            assert!(cell.trail < 1.0);
        }
        assert!((cell.trail - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_full_dissipation_clears_deposits() {
        let mut config = config();
        config.trail_dissipation_per_frame = 1.0;
        let occupied = CellEvents {
            occupied: true,
            pickup: false,
        };
        assert_eq!(next_cell(&Cell::with_trail(1.0), occupied, &config).trail, 0.0);
    }

    #[test]
    fn test_clamped_recovers_from_drift() {
        let drifted = Cell {
            is_nest: true,
            food: 1.2,
            trail: f32::NAN,
        };
        let clamped = drifted.clamped();
        assert!(clamped.is_nest);
        assert_eq!(clamped.food, 1.0);
        assert_eq!(clamped.trail, 0.0);
    }

    #[test]
    fn test_event_buffer_clears_only_touched_entries() {
        let mut events = CellEventBuffer::try_new(8).unwrap();
        events.record(3, false);
        events.record(3, true);
        events.record(5, false);
        assert_eq!(events.occupied_count(), 2);
        assert!(events.get(3).pickup);
        assert!(!events.get(5).pickup);

        events.clear();
        assert!(events.as_slice().iter().all(|e| *e == CellEvents::default()));
        assert_eq!(events.occupied_count(), 0);
    }

    #[test]
    fn test_populate_places_nest_without_food() {
        let dims = GridDims::cube(9);
        let mut world = WorldGrid::try_new(dims, Cell::EMPTY).unwrap();
        let mut config = SimulationConfig::default();
        config.initial_food_ratio = 1.0;
        config.nest_radius = 1;
        let mut rng = StdRng::seed_from_u64(7);

        let food_cells = populate(&mut world, dims.center(), &config, &mut rng);

        let nest_cells = world.read().iter().filter(|c| c.is_nest).count();
        assert_eq!(nest_cells, 27);
        assert_eq!(food_cells, dims.len() - 27);
        assert!(world.read().iter().all(|c| c.is_nest != (c.food > 0.0)));
        assert_eq!(world.read(), world.current());
    }

    #[test]
    fn test_nest_radius_is_capped_by_the_grid() {
        assert_eq!(effective_nest_radius(1, GridDims::cube(1)), 0);
        assert_eq!(effective_nest_radius(u32::MAX, GridDims::cube(4)), 3);
        assert_eq!(effective_nest_radius(2, GridDims::cube(32)), 2);

        let dims = GridDims::cube(1);
        let mut world = WorldGrid::try_new(dims, Cell::EMPTY).unwrap();
        let config = SimulationConfig {
            initial_food_ratio: 1.0,
            nest_radius: 7,
            ..SimulationConfig::default()
        };
        let food_cells = populate(&mut world, dims.center(), &config, &mut StdRng::seed_from_u64(1));
        assert_eq!(food_cells, 0);
        assert_eq!(world.read(), &[Cell::NEST]);
    }

    #[test]
    fn test_update_world_reads_previous_snapshot_only() {
        let dims = GridDims::row(3);
        let mut world = WorldGrid::try_new(dims, Cell::EMPTY).unwrap();
        world.load(&[Cell::with_trail(1.0), Cell::EMPTY, Cell::with_food(1.0)]);
        let mut events = CellEventBuffer::try_new(3).unwrap();
        events.record(2, true);

        update_world(&mut world, &events, &config());

        // The committed snapshot is untouched until swap.
        assert_eq!(world.read()[0].trail, 1.0);
        world.swap();
        let cells = world.read();
        assert!((cells[0].trail - 0.9).abs() < 1e-6);
        assert_eq!(cells[1].trail, 0.0);
        assert!((cells[2].food - 0.5).abs() < 1e-6);
        assert!((cells[2].trail - 0.18).abs() < 1e-6);
    }
}
