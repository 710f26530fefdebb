use std::fmt;
use std::sync::Arc;

use super::{Entity, FaceScalar, ScalarField, VertexVector};

/// Time derivatives of every prognostic field at one time level.
#[derive(Clone, Debug)]
pub struct Derivatives {
    pub height: FaceScalar,
    pub velocity: VertexVector,
    pub tracer: FaceScalar,
}

/// Simulation state at one time level.
///
/// A bundle is never modified after it is published; each step produces a new
/// one. Consumers hold it behind an `Arc` and may read it from any thread.
#[derive(Clone, Debug)]
pub struct PrognosticFields {
    /// Number of steps taken to reach this state.
    pub step: u64,
    /// Simulated time.
    pub time: f64,
    /// Fluid depth on faces.
    pub height: FaceScalar,
    /// Horizontal velocity on vertices (tangent to the sphere).
    pub velocity: VertexVector,
    /// Passive tracer on faces, advected by the rotational part of the flow.
    pub tracer: FaceScalar,
    /// Relative vorticity on faces (diagnostic).
    pub vorticity: FaceScalar,
    /// Streamfunction with `Laplacian(psi) = vorticity` (diagnostic).
    pub streamfunction: FaceScalar,
    /// Derivatives evaluated at the previous level and used to reach this one.
    /// `None` for an initial state.
    pub tendencies: Option<Arc<Derivatives>>,
}

/// Borrowed view of one named field in a bundle.
#[derive(Clone, Copy, Debug)]
pub enum FieldRef<'a> {
    FaceScalar(&'a FaceScalar),
    VertexVector(&'a VertexVector),
}

/// Min/max/mean of a scalar field, or of vector magnitudes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl fmt::Display for FieldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "min {:.4e} max {:.4e} mean {:.4e}", self.min, self.max, self.mean)
    }
}

impl FieldSummary {
    pub fn of<E: Entity>(field: &ScalarField<E>) -> Self {
        Self {
            min: field.min(),
            max: field.max(),
            mean: field.mean(),
        }
    }
}

impl FieldRef<'_> {
    pub fn summary(&self) -> FieldSummary {
        match self {
            FieldRef::FaceScalar(field) => FieldSummary::of(*field),
            FieldRef::VertexVector(field) => FieldSummary::of(&field.norm()),
        }
    }
}

impl PrognosticFields {
    /// Every field in the bundle, in a fixed order, with its name.
    pub fn entries(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        vec![
            ("height", FieldRef::FaceScalar(&self.height)),
            ("velocity", FieldRef::VertexVector(&self.velocity)),
            ("tracer", FieldRef::FaceScalar(&self.tracer)),
            ("vorticity", FieldRef::FaceScalar(&self.vorticity)),
            ("streamfunction", FieldRef::FaceScalar(&self.streamfunction)),
        ]
    }

    /// Log a one-line summary per field at DEBUG level.
    pub fn log_summary(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        for (name, field) in self.entries() {
            log::debug!("step {} {:>14}: {}", self.step, name, field.summary());
        }
    }
}
