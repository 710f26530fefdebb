use std::sync::Arc;

use glam::DVec3;
use rayon::prelude::*;

use crate::fields::{FaceScalar, FaceVector, VertexVector};
use crate::numerics::{Csr, MeshTables};

/// Curl of a vertex vector field, evaluated at faces.
///
/// Uses the face-boundary form `(1/A) sum_edges l n x u`, with `u` on each
/// edge taken as the mean of its endpoints. Grouping by vertex gives one
/// coefficient per face corner: half the sum of the length-weighted outward
/// normals of the two edges meeting there.
#[derive(Debug)]
pub struct Curl {
    tables: Arc<MeshTables>,
    /// Aligned with `tables.face_vertices`, already divided by face area.
    coefficients: Csr<DVec3>,
}

impl Curl {
    pub fn new(tables: Arc<MeshTables>) -> Self {
        let coefficients = Csr::from_rows((0..tables.num_faces()).map(|f| {
            let edges = tables.face_edges.row(f);
            let signs = tables.face_edge_signs.row(f);
            let n = edges.len();
            let outward: Vec<DVec3> = (0..n)
                .map(|k| signs[k] * tables.edge_lengths[edges[k]] * tables.edge_normals[edges[k]])
                .collect();
            let area = tables.face_areas[f];
            // Corner k is shared by edges k - 1 and k
            (0..n)
                .map(|k| 0.5 * (outward[(k + n - 1) % n] + outward[k]) / area)
                .collect::<Vec<_>>()
        }));
        Self {
            tables,
            coefficients,
        }
    }

    pub fn apply(&self, velocity: &VertexVector) -> FaceVector {
        let t = &self.tables;
        t.check(velocity.mesh_id());
        let u = velocity.values();
        let out: Vec<DVec3> = (0..t.num_faces())
            .into_par_iter()
            .map(|f| {
                t.face_vertices
                    .row(f)
                    .iter()
                    .zip(self.coefficients.row(f))
                    .map(|(&v, &c)| c.cross(u[v]))
                    .sum::<DVec3>()
            })
            .collect();
        FaceVector::from_raw(t.mesh_id(), out)
    }

    /// Radial component of the curl: relative vorticity.
    pub fn vorticity(&self, velocity: &VertexVector) -> FaceScalar {
        let curl = self.apply(velocity);
        let normals = FaceVector::from_raw(self.tables.mesh_id(), self.tables.face_normals.clone());
        curl.dot(&normals)
    }
}
