// --- Default Simulation Parameters ---
// Values the control panel starts with.
pub const DEFAULT_CUBE_LENGTH: u32 = 32;
pub const DEFAULT_NUM_ANTS: u32 = 4;
pub const DEFAULT_INITIAL_FOOD_RATIO: f32 = 0.005;
pub const DEFAULT_RANDOM_MOVEMENT_PROBABILITY: f32 = 0.1;
pub const DEFAULT_FOOD_NEST_SCORE_MULTIPLIER: f32 = 10.0;
pub const DEFAULT_TRAIL_SCORE_MULTIPLIER: f32 = 1.0;
pub const DEFAULT_TRAIL_DISSIPATION_PER_FRAME: f32 = 0.001;
// Setting this to 1.0 empties a food cell on the first visit, which starves the swarm of trails.
pub const DEFAULT_FOOD_PICKUP_RATE: f32 = 0.5;
pub const DEFAULT_UPDATE_INTERVAL_SECONDS: f32 = 0.01;
pub const DEFAULT_TRAIL_OPACITY: f32 = 0.5;
pub const DEFAULT_CAMERA_DISTANCE: f32 = 3.0;
pub const DEFAULT_TRAIL_DEPOSIT_AMOUNT: f32 = 0.1;
pub const DEFAULT_NEST_HOMING_WEIGHT: f32 = 0.5;
pub const DEFAULT_NEST_RADIUS: u32 = 1;

// --- Control Panel Limits ---
pub const SUPPORTED_CUBE_LENGTHS: [u32; 3] = [32, 64, 128];
pub const NUM_ANTS_LIMITS: (u32, u32) = (1, 128);
pub const SCORE_MULTIPLIER_LIMITS: (f32, f32) = (1.0, 50.0);
pub const UPDATE_INTERVAL_LIMITS: (f32, f32) = (0.0, 0.1);
pub const CAMERA_DISTANCE_LIMITS: (f32, f32) = (0.0, 10.0);
pub const UNIT_LIMITS: (f32, f32) = (0.0, 1.0);

// --- Field Constants ---
// A food level below this after a pickup counts as exhausted.
pub const MIN_FOOD_LEVEL: f32 = 1e-3;
pub const FULL_FOOD_LEVEL: f32 = 1.0;
pub const MAX_TRAIL_LEVEL: f32 = 1.0;

// --- Geometry ---
// Extracted geometry lives in the normalised cube [-1, 1]^3.
pub const NORMALISED_CUBE_MIN: f32 = -1.0;
pub const NORMALISED_CUBE_EXTENT: f32 = 2.0;
pub const DEFAULT_ISO_LEVEL: f32 = 0.5;

// --- Legend Colours (RGBA) ---
pub const NEST_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0]; // Red
pub const FOOD_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0]; // Green, fades as consumed
pub const TRAIL_COLOR: [f32; 4] = [0.0, 0.0, 1.0, 1.0]; // Blue, alpha from trail opacity
pub const EMPTY_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

// Mixes the per-tick seed with an ant index so every ant draws from its own stream.
pub const ANT_STREAM_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

// Headless driver
pub const STATS_LOG_INTERVAL_TICKS: u64 = 100;
