//! Error types for mesh construction, configuration and the simulation driver.

use glam::DVec3;
use thiserror::Error;

/// Errors raised while building or transforming a polyhedron.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// No faces were supplied.
    #[error("Mesh has no faces")]
    EmptyMesh,

    /// A face has fewer than three distinct vertices.
    #[error("Face {face} has only {len} distinct vertices")]
    FaceTooSmall { face: usize, len: usize },

    /// The subdivider was handed a non-triangular face.
    #[error("Face {face} has {len} vertices, expected a triangle")]
    NotTriangular { face: usize, len: usize },

    /// An edge is not shared by exactly two faces.
    #[error("Edge ({a}, {b}) borders {faces} faces, expected 2")]
    NonManifoldEdge { a: usize, b: usize, faces: usize },

    /// Two faces traverse a shared edge in the same direction.
    #[error("Faces sharing edge ({a}, {b}) are wound inconsistently")]
    InconsistentWinding { a: usize, b: usize },

    /// The faces around a vertex do not form a single closed fan.
    #[error("Faces around vertex {vertex} do not form a closed fan")]
    OpenFan { vertex: usize },

    /// A vertex sits at the origin and cannot be projected to a sphere.
    #[error("Vertex {index} at {position:?} cannot be normalized")]
    DegenerateVertex { index: usize, position: DVec3 },
}

/// Invalid mesh or dynamics parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Minimum face count must be positive, got {0}")]
    NonPositiveFaceCount(i64),

    #[error("Sphere radius must be positive and finite, got {0}")]
    InvalidRadius(f64),

    #[error("Timestep must be positive and finite, got {0}")]
    InvalidTimestep(f64),

    #[error("Gravity must be non-negative and finite, got {0}")]
    InvalidGravity(f64),

    #[error("Rotation frequency must be finite, got {0}")]
    InvalidRotation(f64),

    #[error("Relaxation solver needs at least one iteration")]
    ZeroRelaxationIterations,
}

/// Arithmetic between fields that live on different meshes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Field from mesh {left} combined with field from mesh {right}")]
    MeshMismatch { left: u64, right: u64 },

    #[error("Field has {actual} values but the mesh has {expected} {entity}")]
    LengthMismatch {
        entity: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Errors surfaced by the simulation driver and its background worker.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("Simulation worker is already running")]
    AlreadyStarted,

    #[error("Simulation worker has not been started")]
    NotRunning,

    #[error("Simulation worker has been terminated")]
    Terminated,

    #[error("Simulation worker panicked")]
    WorkerPanicked,

    #[error("Failed to spawn simulation worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Result type for simulation-level operations.
pub type Result<T, E = SimulationError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::NonPositiveFaceCount(-3);
        assert_eq!(format!("{err}"), "Minimum face count must be positive, got -3");

        let err = GeometryError::NonManifoldEdge { a: 1, b: 4, faces: 3 };
        assert!(format!("{err}").contains("(1, 4)"));

        let err: SimulationError = ConfigError::ZeroRelaxationIterations.into();
        assert!(matches!(err, SimulationError::Config(_)));
    }
}
