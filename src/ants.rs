use crate::config::SimulationConfig;
use crate::constants::ANT_STREAM_MIX;
use crate::grid::{DoubleBufferedGrid, GridDims, manhattan_distance};
use crate::world::Cell;
use glam::IVec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// One agent. Ants are never created or destroyed during a run, only moved and toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ant {
    pub position: IVec3,
    pub carrying_food: bool,
    /// Picked food up on the tick that produced this record.
    pub picked_up: bool,
    /// Dropped food at the nest on the tick that produced this record.
    pub delivered: bool,
}

impl Ant {
    pub fn at(position: IVec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

pub type AntGrid = DoubleBufferedGrid<Ant>;

/// Read-only inputs shared by every ant-kernel invocation of one tick.
pub struct AntKernel<'a> {
    world: &'a [Cell],
    dims: GridDims,
    nest: IVec3,
    config: &'a SimulationConfig,
    tick_seed: u64,
    max_nest_distance: f32,
}

impl<'a> AntKernel<'a> {
    pub fn new(
        world: &'a [Cell],
        dims: GridDims,
        nest: IVec3,
        config: &'a SimulationConfig,
        tick_seed: u64,
    ) -> Self {
        let max_nest_distance = manhattan_distance(IVec3::ZERO, dims.size - IVec3::ONE).max(1) as f32;
        Self {
            world,
            dims,
            nest,
            config,
            tick_seed,
            max_nest_distance,
        }
    }

    /// Independent random stream for ant `index` on this tick.
    fn rng_for(&self, index: usize) -> SmallRng {
        SmallRng::seed_from_u64(self.tick_seed ^ (index as u64 + 1).wrapping_mul(ANT_STREAM_MIX))
    }

    /// How strongly a cell pulls an ant: food for searchers, the nest for carriers.
    pub fn attraction(&self, pos: IVec3, cell: &Cell, carrying_food: bool) -> f32 {
        if !carrying_food {
            cell.food
        } else if cell.is_nest {
            1.0
        } else {
            let distance = manhattan_distance(pos, self.nest) as f32;
            self.config.nest_homing_weight * (1.0 - distance / self.max_nest_distance).max(0.0)
        }
    }

    pub fn score(&self, pos: IVec3, carrying_food: bool) -> f32 {
        let cell = &self.world[self.dims.index(pos)];
        self.config.food_nest_score_multiplier * self.attraction(pos, cell, carrying_food)
            + self.config.trail_score_multiplier * cell.trail
    }

    /// Highest-scoring neighbour; the first one in enumeration order wins ties.
    pub fn best_neighbor(&self, neighbors: &[IVec3; 6], carrying_food: bool) -> IVec3 {
        let mut best = neighbors[0];
        let mut best_score = self.score(best, carrying_food);
        for &candidate in &neighbors[1..] {
            let score = self.score(candidate, carrying_food);
            if score > best_score {
                best = candidate;
                best_score = score;
            }
        }
        best
    }

    /// Computes the next record of ant `index` from its previous one.
    pub fn step(&self, index: usize, ant: &Ant) -> Ant {
        let mut rng = self.rng_for(index);
        let position = self.dims.clamp(ant.position);
        let neighbors = self.dims.neighbors(position);

        let roll: f32 = rng.r#gen();
        let target = if roll > self.config.free_will_threshold() {
            neighbors[rng.gen_range(0..neighbors.len())]
        } else {
            self.best_neighbor(&neighbors, ant.carrying_food)
        };

        let destination = &self.world[self.dims.index(target)];
        let mut next = Ant::at(target);
        if !ant.carrying_food && destination.food > 0.0 {
            next.carrying_food = true;
            next.picked_up = true;
        } else if ant.carrying_food && destination.is_nest {
            next.delivered = true;
        } else {
            next.carrying_food = ant.carrying_food;
        }
        next
    }
}

/// Ant kernel: every output record depends only on the previous ant snapshot and the
/// previous world snapshot held by `kernel`.
pub fn update_ants(ants: &mut AntGrid, kernel: &AntKernel<'_>) {
    let (previous, current) = ants.split();
    current
        .par_iter_mut()
        .zip(previous.par_iter())
        .enumerate()
        .for_each(|(index, (out, prev))| {
            *out = kernel.step(index, prev);
        });
}

/// Places every ant on the nest cell, empty-handed.
pub fn populate(ants: &mut AntGrid, nest: IVec3) {
    ants.reset_with(|_| Ant::at(nest));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greedy_config() -> SimulationConfig {
        SimulationConfig {
            random_movement_probability: 0.0,
            ..SimulationConfig::default()
        }
    }

    fn world_with(dims: GridDims, cells: &[(IVec3, Cell)]) -> Vec<Cell> {
        let mut world = vec![Cell::EMPTY; dims.len()];
        for &(pos, cell) in cells {
            world[dims.index(pos)] = cell;
        }
        world
    }

    #[test]
    fn test_searching_ant_moves_onto_food_and_picks_it_up() {
        let dims = GridDims::cube(5);
        let start = IVec3::new(2, 2, 2);
        let food = IVec3::new(2, 3, 2);
        let world = world_with(dims, &[(food, Cell::with_food(1.0))]);
        let config = greedy_config();
        let kernel = AntKernel::new(&world, dims, IVec3::ZERO, &config, 1);

        let next = kernel.step(0, &Ant::at(start));
        assert_eq!(next.position, food);
        assert!(next.carrying_food);
        assert!(next.picked_up);
    }

    #[test]
    fn test_ties_break_towards_negative_x() {
        let dims = GridDims::cube(5);
        let world = vec![Cell::EMPTY; dims.len()];
        let config = greedy_config();
        let kernel = AntKernel::new(&world, dims, IVec3::ZERO, &config, 1);

        let next = kernel.step(0, &Ant::at(IVec3::new(2, 2, 2)));
        assert_eq!(next.position, IVec3::new(1, 2, 2));
    }

    #[test]
    fn test_trail_guides_searching_ant() {
        let dims = GridDims::cube(5);
        let trail = IVec3::new(2, 2, 3);
        let world = world_with(dims, &[(trail, Cell::with_trail(0.5))]);
        let config = greedy_config();
        let kernel = AntKernel::new(&world, dims, IVec3::ZERO, &config, 1);

        assert_eq!(kernel.step(3, &Ant::at(IVec3::new(2, 2, 2))).position, trail);
    }

    #[test]
    fn test_carrier_heads_home_and_delivers() {
        let dims = GridDims::cube(7);
        let nest = IVec3::new(3, 3, 3);
        let world = world_with(dims, &[(nest, Cell::NEST)]);
        let config = greedy_config();
        let kernel = AntKernel::new(&world, dims, nest, &config, 9);

        let mut ant = Ant {
            position: IVec3::new(0, 3, 3),
            carrying_food: true,
            ..Ant::default()
        };
        for _ in 0..3 {
            ant = kernel.step(0, &ant);
        }
        assert_eq!(ant.position, nest);
        assert!(ant.delivered);
        assert!(!ant.carrying_food);
    }

    #[test]
    fn test_random_movement_stays_in_bounds() {
        let dims = GridDims::cube(3);
        let world = vec![Cell::EMPTY; dims.len()];
        let config = SimulationConfig {
            random_movement_probability: 1.0,
            ..SimulationConfig::default()
        };
        let mut ant = Ant::at(IVec3::ZERO);
        for tick in 0..200u64 {
            let kernel = AntKernel::new(&world, dims, IVec3::ONE, &config, tick);
            ant = kernel.step(0, &ant);
            assert!(dims.contains(ant.position));
        }
    }

    #[test]
    fn test_update_ants_is_independent_of_thread_scheduling() {
        let dims = GridDims::cube(8);
        let world = vec![Cell::with_trail(0.25); dims.len()];
        let config = SimulationConfig {
            random_movement_probability: 0.5,
            ..SimulationConfig::default()
        };
        let kernel = AntKernel::new(&world, dims, dims.center(), &config, 42);

        let mut ants = AntGrid::try_new(GridDims::row(64), Ant::default()).unwrap();
        populate(&mut ants, dims.center());
        update_ants(&mut ants, &kernel);

        let sequential: Vec<Ant> = (0..64)
            .map(|i| kernel.step(i, &Ant::at(dims.center())))
            .collect();
        assert_eq!(ants.current(), sequential.as_slice());
    }
}
