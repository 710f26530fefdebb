use std::sync::Arc;

use rayon::prelude::*;

use crate::fields::{FaceScalar, VertexVector};
use crate::numerics::MeshTables;

/// Divergence of `velocity * scalar`, evaluated at faces.
///
/// The flux through each edge is computed once, from the mean of the two
/// endpoint velocities and the mean of the two adjacent face values, and then
/// added to one face and subtracted from the other. Whatever leaves a face
/// enters its neighbour, so the area integral of the result is zero.
#[derive(Debug)]
pub struct FluxDivergence {
    tables: Arc<MeshTables>,
}

impl FluxDivergence {
    pub fn new(tables: Arc<MeshTables>) -> Self {
        Self { tables }
    }

    pub fn apply(&self, velocity: &VertexVector, scalar: &FaceScalar) -> FaceScalar {
        let t = &self.tables;
        t.check(velocity.mesh_id());
        t.check(scalar.mesh_id());
        let u = velocity.values();
        let h = scalar.values();

        // Flux from edge_faces[e][0] into edge_faces[e][1]
        let fluxes: Vec<f64> = (0..t.num_edges())
            .into_par_iter()
            .map(|e| {
                let [a, b] = t.edge_vertices[e];
                let [l, r] = t.edge_faces[e];
                let normal_speed = t.edge_normals[e].dot(0.5 * (u[a] + u[b]));
                t.edge_lengths[e] * normal_speed * 0.5 * (h[l] + h[r])
            })
            .collect();

        let out: Vec<f64> = (0..t.num_faces())
            .into_par_iter()
            .map(|f| {
                let outflow: f64 = t
                    .face_edges
                    .row(f)
                    .iter()
                    .zip(t.face_edge_signs.row(f))
                    .map(|(&e, &s)| s * fluxes[e])
                    .sum();
                outflow / t.face_areas[f]
            })
            .collect();
        FaceScalar::from_raw(t.mesh_id(), out)
    }

    /// Plain velocity divergence.
    pub fn divergence(&self, velocity: &VertexVector) -> FaceScalar {
        let ones = FaceScalar::from_raw(self.tables.mesh_id(), vec![1.0; self.tables.num_faces()]);
        self.apply(velocity, &ones)
    }
}
