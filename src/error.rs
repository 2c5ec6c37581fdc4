use thiserror::Error;

/// Errors surfaced by the simulation engine to its host.
///
/// Numerical drift is never reported here; every field write is clamped instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// A structural configuration value is unusable (e.g. a zero-sized grid).
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// A numeric option lies outside the range the kernels are defined on.
    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// `cube_length³` does not fit in the address space.
    #[error("cube length {cube_length} is too large to address")]
    GridTooLarge { cube_length: u32 },

    /// Grid storage could not be reserved.
    #[error("failed to allocate {cells} cells and {ants} ants")]
    Allocation { cells: usize, ants: usize },

    /// A caller-provided state does not match the configured dimensions.
    #[error("state size mismatch: expected {expected}, got {actual}")]
    StateMismatch { expected: usize, actual: usize },

    /// The engine has no grids yet; call `restart` first.
    #[error("simulation is not initialized")]
    NotInitialized,
}

pub type SimulationResult<T> = Result<T, SimulationError>;
