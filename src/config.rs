use crate::constants::*;
use crate::error::{SimulationError, SimulationResult};

/// Runtime-tunable parameters consumed by both kernels.
///
/// `cube_length`, `num_ants`, `nest_radius` and `seed` only take effect on the next
/// `restart`; everything else is read fresh every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// World grid edge length in cells.
    pub cube_length: u32,
    /// Agent population size.
    pub num_ants: u32,
    /// Per-cell probability of food at initialization.
    pub initial_food_ratio: f32,
    /// Probability an ant ignores scoring and picks a random neighbour.
    pub random_movement_probability: f32,
    pub food_nest_score_multiplier: f32,
    pub trail_score_multiplier: f32,
    /// Fraction of trail lost per tick.
    pub trail_dissipation_per_frame: f32,
    /// Fraction of a cell's food removed by a pickup.
    pub food_pickup_rate: f32,
    /// Minimum wall-clock spacing between ticks.
    pub update_interval_seconds: f32,
    /// Trail added to every occupied cell per tick.
    pub trail_deposit_amount: f32,
    /// Weight of nest proximity for ants carrying food, off the nest itself.
    pub nest_homing_weight: f32,
    /// Chebyshev radius of the nest cube around the grid centre.
    pub nest_radius: u32,
    /// Fixed seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,

    // Rendering only, never read by the kernels.
    pub trail_opacity: f32,
    pub camera_distance: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cube_length: DEFAULT_CUBE_LENGTH,
            num_ants: DEFAULT_NUM_ANTS,
            initial_food_ratio: DEFAULT_INITIAL_FOOD_RATIO,
            random_movement_probability: DEFAULT_RANDOM_MOVEMENT_PROBABILITY,
            food_nest_score_multiplier: DEFAULT_FOOD_NEST_SCORE_MULTIPLIER,
            trail_score_multiplier: DEFAULT_TRAIL_SCORE_MULTIPLIER,
            trail_dissipation_per_frame: DEFAULT_TRAIL_DISSIPATION_PER_FRAME,
            food_pickup_rate: DEFAULT_FOOD_PICKUP_RATE,
            update_interval_seconds: DEFAULT_UPDATE_INTERVAL_SECONDS,
            trail_deposit_amount: DEFAULT_TRAIL_DEPOSIT_AMOUNT,
            nest_homing_weight: DEFAULT_NEST_HOMING_WEIGHT,
            nest_radius: DEFAULT_NEST_RADIUS,
            seed: None,
            trail_opacity: DEFAULT_TRAIL_OPACITY,
            camera_distance: DEFAULT_CAMERA_DISTANCE,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Threshold a uniform draw must exceed for an ant to move randomly.
    #[inline]
    pub fn free_will_threshold(&self) -> f32 {
        1.0 - self.random_movement_probability
    }

    /// Checks every option the kernels depend on.
    ///
    /// Score multipliers only need to be finite and non-negative here; the tighter
    /// UI ranges are applied by [`SimulationConfig::clamped_to_ui_limits`].
    pub fn validate(&self) -> SimulationResult<()> {
        if self.cube_length == 0 {
            return Err(SimulationError::InvalidConfig("cube_length must be positive"));
        }
        if self.num_ants == 0 {
            return Err(SimulationError::InvalidConfig("num_ants must be positive"));
        }
        if self.num_ants > i32::MAX as u32 {
            return Err(SimulationError::InvalidConfig("num_ants is too large"));
        }

        let unit_options = [
            ("initial_food_ratio", self.initial_food_ratio),
            ("random_movement_probability", self.random_movement_probability),
            ("trail_dissipation_per_frame", self.trail_dissipation_per_frame),
            ("food_pickup_rate", self.food_pickup_rate),
            ("trail_deposit_amount", self.trail_deposit_amount),
            ("nest_homing_weight", self.nest_homing_weight),
            ("trail_opacity", self.trail_opacity),
        ];
        for (name, value) in unit_options {
            check_range(name, value, UNIT_LIMITS)?;
        }

        let open_options = [
            ("food_nest_score_multiplier", self.food_nest_score_multiplier),
            ("trail_score_multiplier", self.trail_score_multiplier),
            ("update_interval_seconds", self.update_interval_seconds),
            ("camera_distance", self.camera_distance),
        ];
        for (name, value) in open_options {
            check_range(name, value, (0.0, f32::MAX))?;
        }
        Ok(())
    }

    /// Returns a copy with every option forced into the control panel's limits.
    pub fn clamped_to_ui_limits(&self) -> Self {
        let clamp = |value: f32, (min, max): (f32, f32)| value.clamp(min, max);
        let mut config = self.clone();
        config.num_ants = self.num_ants.clamp(NUM_ANTS_LIMITS.0, NUM_ANTS_LIMITS.1);
        config.cube_length = nearest_supported_cube_length(self.cube_length);
        config.initial_food_ratio = clamp(self.initial_food_ratio, UNIT_LIMITS);
        config.random_movement_probability = clamp(self.random_movement_probability, UNIT_LIMITS);
        config.food_nest_score_multiplier =
            clamp(self.food_nest_score_multiplier, SCORE_MULTIPLIER_LIMITS);
        config.trail_score_multiplier = clamp(self.trail_score_multiplier, SCORE_MULTIPLIER_LIMITS);
        config.trail_dissipation_per_frame = clamp(self.trail_dissipation_per_frame, UNIT_LIMITS);
        config.food_pickup_rate = clamp(self.food_pickup_rate, UNIT_LIMITS);
        config.update_interval_seconds = clamp(self.update_interval_seconds, UPDATE_INTERVAL_LIMITS);
        config.trail_deposit_amount = clamp(self.trail_deposit_amount, UNIT_LIMITS);
        config.nest_homing_weight = clamp(self.nest_homing_weight, UNIT_LIMITS);
        config.trail_opacity = clamp(self.trail_opacity, UNIT_LIMITS);
        config.camera_distance = clamp(self.camera_distance, CAMERA_DISTANCE_LIMITS);
        config.nest_radius = self.nest_radius.min(config.cube_length - 1);
        config
    }
}

fn check_range(name: &'static str, value: f32, (min, max): (f32, f32)) -> SimulationResult<()> {
    // NaN fails both comparisons, so test for containment rather than exclusion.
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(SimulationError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

/// Snaps a requested edge length to the closest size the control panel offers.
pub fn nearest_supported_cube_length(cube_length: u32) -> u32 {
    SUPPORTED_CUBE_LENGTHS
        .iter()
        .copied()
        .min_by_key(|&supported| supported.abs_diff(cube_length))
        .unwrap_or(DEFAULT_CUBE_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cube_length, 32);
        assert_eq!(config.num_ants, 4);
        assert!((config.free_will_threshold() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let mut config = SimulationConfig::default();
        config.cube_length = 0;
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfig(_))
        ));

        let mut config = SimulationConfig::default();
        config.num_ants = 0;
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_oversized_nest_radius_is_accepted() {
        let config = SimulationConfig {
            cube_length: 1,
            num_ants: 1,
            nest_radius: 5,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.clamped_to_ui_limits().nest_radius, 5);
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let mut config = SimulationConfig::default();
        config.random_movement_probability = 1.5;
        match config.validate() {
            Err(SimulationError::OutOfRange { name, .. }) => {
                assert_eq!(name, "random_movement_probability")
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }

        config.random_movement_probability = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamped_to_ui_limits() {
        let mut config = SimulationConfig::default();
        config.num_ants = 1000;
        config.cube_length = 70;
        config.food_nest_score_multiplier = 0.0;
        config.update_interval_seconds = 2.0;
        let clamped = config.clamped_to_ui_limits();
        assert_eq!(clamped.num_ants, 128);
        assert_eq!(clamped.cube_length, 64);
        assert_eq!(clamped.food_nest_score_multiplier, 1.0);
        assert_eq!(clamped.update_interval_seconds, 0.1);
        assert!(clamped.validate().is_ok());
    }

    #[test]
    fn test_nearest_supported_cube_length() {
        assert_eq!(nearest_supported_cube_length(1), 32);
        assert_eq!(nearest_supported_cube_length(100), 128);
        assert_eq!(nearest_supported_cube_length(4096), 128);
    }
}
