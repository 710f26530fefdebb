use std::sync::Arc;

use glam::DVec3;
use rayon::prelude::*;

use crate::fields::{FaceScalar, VertexVector};
use crate::numerics::{Csr, MeshTables};

/// Gradient of a face scalar, evaluated at vertices.
///
/// Around each vertex the centers of the surrounding faces form a small
/// polygon. Integrating the field around that polygon (trapezoid rule on each
/// side, outward side normals in the vertex tangent plane) and dividing by its
/// area gives the gradient. Each face then contributes one fixed vector
/// coefficient, built once here.
#[derive(Debug)]
pub struct Gradient {
    tables: Arc<MeshTables>,
    /// Aligned with `tables.vertex_faces`.
    coefficients: Csr<DVec3>,
}

impl Gradient {
    pub fn new(tables: Arc<MeshTables>) -> Self {
        let coefficients = Csr::from_rows((0..tables.num_vertices()).map(|v| {
            let up = tables.vertex_normals[v];
            let area = tables.vertex_areas[v];
            let ring = tables.vertex_faces.row(v);
            let n = ring.len();
            if area <= 0.0 {
                return vec![DVec3::ZERO; n];
            }

            // Side k runs from center k to center k + 1
            let sides: Vec<DVec3> = (0..n)
                .map(|k| {
                    let from = tables.face_centers[ring[k]];
                    let to = tables.face_centers[ring[(k + 1) % n]];
                    (to - from).cross(up)
                })
                .collect();
            (0..n)
                .map(|k| 0.5 * (sides[(k + n - 1) % n] + sides[k]) / area)
                .collect::<Vec<_>>()
        }));
        Self {
            tables,
            coefficients,
        }
    }

    pub fn apply(&self, field: &FaceScalar) -> VertexVector {
        let t = &self.tables;
        t.check(field.mesh_id());
        let values = field.values();
        let out: Vec<DVec3> = (0..t.num_vertices())
            .into_par_iter()
            .map(|v| {
                t.vertex_faces
                    .row(v)
                    .iter()
                    .zip(self.coefficients.row(v))
                    .map(|(&f, &c)| c * values[f])
                    .sum::<DVec3>()
            })
            .collect();
        VertexVector::from_raw(t.mesh_id(), out)
    }
}
