//! Discrete differential operators on a face/vertex staggered mesh.
//!
//! Scalars live on faces, vectors on vertices. Each operator is built once
//! per mesh, holds a shared handle to its [`MeshTables`], and precomputes
//! whatever coefficients it needs; applying it is a parallel pass over
//! entities that never mutates its inputs.

mod averaging;
mod curl;
mod divergence;
mod gradient;
mod jacobian;
mod laplacian;

pub use averaging::{KineticEnergy, VertexAverage};
pub use curl::Curl;
pub use divergence::FluxDivergence;
pub use gradient::Gradient;
pub use jacobian::Jacobian;
pub use laplacian::Laplacian;

use std::sync::Arc;

use super::MeshTables;
use crate::util::Timed;

/// Every operator the dynamics needs, built for one mesh.
#[derive(Debug)]
pub struct Operators {
    pub tables: Arc<MeshTables>,
    pub gradient: Gradient,
    pub flux_divergence: FluxDivergence,
    pub curl: Curl,
    pub laplacian: Laplacian,
    pub jacobian: Jacobian,
    pub vertex_average: VertexAverage,
    pub kinetic_energy: KineticEnergy,
}

impl Operators {
    pub fn new(tables: Arc<MeshTables>) -> Self {
        let _t = Timed::debug("Operator coefficients");
        Self {
            gradient: Gradient::new(Arc::clone(&tables)),
            flux_divergence: FluxDivergence::new(Arc::clone(&tables)),
            curl: Curl::new(Arc::clone(&tables)),
            laplacian: Laplacian::new(Arc::clone(&tables)),
            jacobian: Jacobian::new(Arc::clone(&tables)),
            vertex_average: VertexAverage::new(Arc::clone(&tables)),
            kinetic_energy: KineticEnergy::new(Arc::clone(&tables)),
            tables,
        }
    }
}
