use std::sync::Arc;

use rayon::prelude::*;

use crate::fields::FaceScalar;
use crate::numerics::MeshTables;

/// Arakawa-style Jacobian `J(a, b) = n . (grad a x grad b)` on faces.
///
/// Written as the boundary integral of `a db`: across edge `k` of a face,
/// `a` is the mean of the two faces sharing the edge and `db` is the change
/// of `b` between the edge's endpoints, where `b` at a vertex is the mean of
/// the faces meeting there. On a trivalent mesh this reduces to
///
/// `J_f = 1/(6 A_f) * sum_k (a_f + a_{g_k}) (b_{g_{k+1}} - b_{g_{k-1}})`
///
/// over the ordered neighbours `g_k`, which vanishes for `a == b`, is
/// antisymmetric, and integrates to zero over a closed surface.
#[derive(Debug)]
pub struct Jacobian {
    tables: Arc<MeshTables>,
}

impl Jacobian {
    pub fn new(tables: Arc<MeshTables>) -> Self {
        Self { tables }
    }

    pub fn apply(&self, a: &FaceScalar, b: &FaceScalar) -> FaceScalar {
        let t = &self.tables;
        t.check(a.mesh_id());
        t.check(b.mesh_id());
        let a = a.values();
        let b = b.values();

        let b_corner: Vec<f64> = (0..t.num_vertices())
            .into_par_iter()
            .map(|v| {
                let ring = t.vertex_faces.row(v);
                ring.iter().map(|&f| b[f]).sum::<f64>() / ring.len() as f64
            })
            .collect();

        // Along each edge's a -> b direction, i.e. as seen from edge_faces[e][0]
        let fluxes: Vec<f64> = (0..t.num_edges())
            .into_par_iter()
            .map(|e| {
                let [from, to] = t.edge_vertices[e];
                let [l, r] = t.edge_faces[e];
                0.5 * (a[l] + a[r]) * (b_corner[to] - b_corner[from])
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
