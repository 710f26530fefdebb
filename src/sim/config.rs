use super::constants::*;
use crate::error::ConfigError;

/// Mesh resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshConfig {
    pub radius: f64,
    /// Refinement stops at the first tier with at least this many faces.
    pub minimum_faces: i64,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            minimum_faces: DEFAULT_MINIMUM_FACES,
        }
    }
}

/// Physical and numerical parameters of the shallow-water step.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicsConfig {
    /// Cycles per unit time about the z axis; drives the Coriolis term.
    pub rotation_frequency: f64,
    pub gravity: f64,
    pub timestep: f64,
    /// Gauss-Seidel sweeps per streamfunction solve.
    pub relaxation_iterations: usize,
    /// Advect the passive tracer with the streamfunction.
    pub advect_tracer: bool,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            rotation_frequency: DEFAULT_ROTATION_FREQUENCY,
            gravity: DEFAULT_GRAVITY,
            timestep: DEFAULT_TIMESTEP,
            relaxation_iterations: DEFAULT_RELAXATION_ITERATIONS,
            advect_tracer: true,
        }
    }
}

/// Inputs to the initial-condition generators.
#[derive(Clone, Debug, PartialEq)]
pub struct InitialConfig {
    pub seed: u64,
    pub height_average: f64,
    pub height_deviation: f64,
    pub velocity_average: f64,
    pub velocity_deviation: f64,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            height_average: DEFAULT_HEIGHT_AVERAGE,
            height_deviation: DEFAULT_HEIGHT_DEVIATION,
            velocity_average: DEFAULT_VELOCITY_AVERAGE,
            velocity_deviation: DEFAULT_VELOCITY_DEVIATION,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationConfig {
    pub mesh: MeshConfig,
    pub dynamics: DynamicsConfig,
    pub initial: InitialConfig,
}

impl SimulationConfig {
    /// Reject parameters that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mesh = &self.mesh;
        if !(mesh.radius.is_finite() && mesh.radius > 0.0) {
            return Err(ConfigError::InvalidRadius(mesh.radius));
        }
        if mesh.minimum_faces <= 0 {
            return Err(ConfigError::NonPositiveFaceCount(mesh.minimum_faces));
        }

        let dynamics = &self.dynamics;
        if !(dynamics.timestep.is_finite() && dynamics.timestep > 0.0) {
            return Err(ConfigError::InvalidTimestep(dynamics.timestep));
        }
        if !(dynamics.gravity.is_finite() && dynamics.gravity >= 0.0) {
            return Err(ConfigError::InvalidGravity(dynamics.gravity));
        }
        if !dynamics.rotation_frequency.is_finite() {
            return Err(ConfigError::InvalidRotation(dynamics.rotation_frequency));
        }
        if dynamics.relaxation_iterations == 0 {
            return Err(ConfigError::ZeroRelaxationIterations);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = SimulationConfig::default();
        config.mesh.minimum_faces = 0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveFaceCount(0)));

        let mut config = SimulationConfig::default();
        config.dynamics.timestep = -1.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTimestep(-1.0)));

        let mut config = SimulationConfig::default();
        config.dynamics.relaxation_iterations = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroRelaxationIterations));

        let mut config = SimulationConfig::default();
        config.dynamics.rotation_frequency = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRotation(_))));

        let mut config = SimulationConfig::default();
        config.mesh.radius = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidRadius(0.0)));
    }
}
