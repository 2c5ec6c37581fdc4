//! Ant colony foraging on a 3-D voxel grid.
//!
//! A [`SimulationState`] owns two double-buffered populations, world cells and ants, and
//! advances them in lockstep: the ant kernel moves every ant using the previous snapshots,
//! then the world kernel folds the ants' new positions into pheromone trail and food.
//! [`IsosurfaceExtractor`] turns the committed world snapshot into a triangle mesh with
//! marching cubes.

pub mod ants;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod isosurface;
pub mod simulation;
pub mod utils;
pub mod world;

pub use ants::Ant;
pub use config::SimulationConfig;
pub use error::{SimulationError, SimulationResult};
pub use grid::{DoubleBufferedGrid, GridDims};
pub use isosurface::{FieldLayer, IsoSurface, IsosurfaceExtractor, ScalarField, SurfaceVertex};
pub use simulation::{RunState, SimulationState, SimulationStats};
pub use world::Cell;
