//! Default simulation parameters.
//!
//! Units are arbitrary but consistent: lengths in the same unit as the
//! sphere radius, time in the same unit as the timestep.

/// Sphere radius.
pub const DEFAULT_RADIUS: f64 = 6000.0;

/// Smallest mesh tier with at least this many faces is used.
pub const DEFAULT_MINIMUM_FACES: i64 = 400;

/// Planetary rotation, in cycles per unit time.
pub const DEFAULT_ROTATION_FREQUENCY: f64 = 1.0 / 1000.0;

pub const DEFAULT_GRAVITY: f64 = 9.81;

/// Gravity waves travel at `sqrt(g h)`; with the default depth this keeps the
/// Courant number around 0.1 on the default mesh.
pub const DEFAULT_TIMESTEP: f64 = 10.0;

/// Gauss-Seidel sweeps per streamfunction solve (warm-started each step).
pub const DEFAULT_RELAXATION_ITERATIONS: usize = 20;

pub const DEFAULT_SEED: u64 = 42;

/// Mean fluid depth.
pub const DEFAULT_HEIGHT_AVERAGE: f64 = 10.0;
pub const DEFAULT_HEIGHT_DEVIATION: f64 = 0.1;

/// Zonal wind speed at the equator.
pub const DEFAULT_VELOCITY_AVERAGE: f64 = 0.0;
pub const DEFAULT_VELOCITY_DEVIATION: f64 = 0.0;

/// Derivative snapshots kept for the multistep integrator.
pub const DERIVATIVE_HISTORY: usize = 2;
