use std::sync::Arc;

use rayon::prelude::*;

use crate::fields::FaceScalar;
use crate::numerics::MeshTables;

/// Two-point flux Laplacian on faces.
///
/// Edge `e` couples its two faces with weight `l_e / d_e` (edge length over
/// center distance).
#[derive(Debug)]
pub struct Laplacian {
    tables: Arc<MeshTables>,
    weights: Vec<f64>,
}

impl Laplacian {
    pub fn new(tables: Arc<MeshTables>) -> Self {
        let weights = tables
            .edge_lengths
            .iter()
            .zip(&tables.edge_center_distances)
            .map(|(&l, &d)| if d > 0.0 { l / d } else { 0.0 })
            .collect();
        Self { tables, weights }
    }

    /// Edge weights `l_e / d_e`, indexed by edge.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn tables(&self) -> &Arc<MeshTables> {
        &self.tables
    }

    pub fn apply(&self, field: &FaceScalar) -> FaceScalar {
        let t = &self.tables;
        t.check(field.mesh_id());
        let values = field.values();

        let fluxes: Vec<f64> = (0..t.num_edges())
            .into_par_iter()
            .map(|e| {
                let [l, r] = t.edge_faces[e];
                self.weights[e] * (values[r] - values[l])
            })
            .collect();

        let out: Vec<f64> = (0..t.num_faces())
            .into_par_iter()
            .map(|f| {
                let total: f64 = t
                    .face_edges
                    .row(f)
                    .iter()
                    .zip(t.face_edge_signs.row(f))
                    .map(|(&e, &s)| s * fluxes[e])
                    .sum();
                total / t.face_areas[f]
            })
            .collect();
        FaceScalar::from_raw(t.mesh_id(), out)
    }
}
