// Physical constants
pub const GRAVITY: f32 = 9.81;

// Wave set limits (must match the array lengths the water shaders declare)
pub const MIN_WAVES: usize = 1;
pub const MAX_WAVES: usize = 3;

// Default water grid: 10m square, 2m below the origin
pub const DEFAULT_GRID_ROWS: u32 = 50;
pub const DEFAULT_GRID_COLUMNS: u32 = 50;
pub const DEFAULT_GRID_ORIGIN: [f32; 3] = [-5.0, -2.0, -5.0];
pub const DEFAULT_GRID_SIZE: f32 = 10.0;

// Default wave
pub const DEFAULT_WAVELENGTH: f32 = 2.0;
pub const DEFAULT_AMPLITUDE: f32 = 0.7;
pub const DEFAULT_HEADING: [f32; 3] = [0.0, 0.0, 1.0];

// Seconds per radian of heading rotation for rotating waves
pub const DEFAULT_DRIFT_PERIOD: f32 = 5.0;

// Uniform block layout
pub const VEC4_SIZE: usize = 16;
pub const MAT4_SIZE: usize = 64;
pub const BLOCK_ALIGNMENT: usize = 16;

// Default camera (left-handed, depth in [0, 1])
pub const CAMERA_FOV_Y: f32 = std::f32::consts::PI / 3.0;
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_EYE: [f32; 3] = [0.0, 4.0, -10.0];

// Headless runner
pub const DEFAULT_FRAME_RATE: f64 = 60.0;
pub const DEFAULT_FRAME_LIMIT: u32 = 600;
