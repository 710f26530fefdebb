use std::sync::Arc;

use rayon::prelude::*;

use crate::fields::{FaceScalar, VertexScalar, VertexVector};
use crate::numerics::MeshTables;

/// Face-area-weighted mean of a face field over the faces around each vertex.
#[derive(Debug)]
pub struct VertexAverage {
    tables: Arc<MeshTables>,
}

impl VertexAverage {
    pub fn new(tables: Arc<MeshTables>) -> Self {
        Self { tables }
    }

    pub fn apply(&self, field: &FaceScalar) -> VertexScalar {
        let t = &self.tables;
        t.check(field.mesh_id());
        let values = field.values();
        let out: Vec<f64> = (0..t.num_vertices())
            .into_par_iter()
            .map(|v| {
                let ring = t.vertex_faces.row(v);
                let weight: f64 = ring.iter().map(|&f| t.face_areas[f]).sum();
                let total: f64 = ring.iter().map(|&f| t.face_areas[f] * values[f]).sum();
                total / weight
            })
            .collect();
        VertexScalar::from_raw(t.mesh_id(), out)
    }
}

/// Kinetic energy per unit mass `|u|^2 / 2` on faces, from vertex velocities
/// weighted by the vertex areas.
#[derive(Debug)]
pub struct KineticEnergy {
    tables: Arc<MeshTables>,
}

impl KineticEnergy {
    pub fn new(tables: Arc<MeshTables>) -> Self {
        Self { tables }
    }

    pub fn apply(&self, velocity: &VertexVector) -> FaceScalar {
        let t = &self.tables;
        t.check(velocity.mesh_id());
        let u = velocity.values();
        let out: Vec<f64> = (0..t.num_faces())
            .into_par_iter()
            .map(|f| {
                let corners = t.face_vertices.row(f);
                let weight: f64 = corners.iter().map(|&v| t.vertex_areas[v]).sum();
                let total: f64 = corners
                    .iter()
                    .map(|&v| t.vertex_areas[v] * 0.5 * u[v].length_squared())
                    .sum();
                total / weight
            })
            .collect();
        FaceScalar::from_raw(t.mesh_id(), out)
    }
}
