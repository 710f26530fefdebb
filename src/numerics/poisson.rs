use std::sync::Arc;

use super::{Csr, MeshTables};
use crate::fields::FaceScalar;
use crate::util::Timed;

/// Iterative solver for `Laplacian(u) = f` on faces.
///
/// Gauss-Seidel sweeps over the same two-point stencil as
/// [`super::operators::Laplacian`], for a fixed number of iterations. On a
/// closed surface constants are in the null space, so the right-hand side has
/// its area-weighted mean removed first and the solution is returned with
/// zero mean.
#[derive(Debug)]
pub struct PoissonSolver {
    tables: Arc<MeshTables>,
    /// `(neighbour face, l_e / d_e)` per face, in edge order.
    stencil: Csr<(usize, f64)>,
    iterations: usize,
}

impl PoissonSolver {
    pub fn new(tables: Arc<MeshTables>, iterations: usize) -> Self {
        let stencil = Csr::from_rows((0..tables.num_faces()).map(|f| {
            tables
                .face_edges
                .row(f)
                .iter()
                .zip(tables.face_neighbors.row(f))
                .map(|(&e, &g)| {
                    let d = tables.edge_center_distances[e];
                    let w = if d > 0.0 { tables.edge_lengths[e] / d } else { 0.0 };
                    (g, w)
                })
                .collect::<Vec<_>>()
        }));
        Self {
            tables,
            stencil,
            iterations,
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Solve starting from `warm_start`, or from zero.
    pub fn solve(&self, rhs: &FaceScalar, warm_start: Option<&FaceScalar>) -> FaceScalar {
        let t = &self.tables;
        t.check(rhs.mesh_id());
        let _t = Timed::at(log::Level::Trace, "Poisson solve");

        let f = self.compatible(rhs);
        let mut u: Vec<f64> = match warm_start {
            Some(start) => {
                t.check(start.mesh_id());
                start.values().to_vec()
            }
            None => vec![0.0; t.num_faces()],
        };

        for _ in 0..self.iterations {
            for face in 0..u.len() {
                let mut weight = 0.0;
                let mut total = 0.0;
                for &(g, w) in self.stencil.row(face) {
                    weight += w;
                    total += w * u[g];
                }
                if weight > 0.0 {
                    u[face] = (total - t.face_areas[face] * f[face]) / weight;
                }
            }
        }

        let mean = area_mean(t, &u);
        for value in &mut u {
            *value -= mean;
        }
        FaceScalar::from_raw(t.mesh_id(), u)
    }

    /// Relative residual `|Lap(u) - f| / |f|` in the area-weighted L2 norm,
    /// after removing the mean of `f`. Returns the absolute residual norm
    /// when `f` is zero.
    pub fn residual(&self, solution: &FaceScalar, rhs: &FaceScalar) -> f64 {
        let t = &self.tables;
        t.check(solution.mesh_id());
        t.check(rhs.mesh_id());
        let f = self.compatible(rhs);
        let u = solution.values();

        let mut error = 0.0;
        let mut norm = 0.0;
        for face in 0..t.num_faces() {
            let lap: f64 = self
                .stencil
                .row(face)
                .iter()
                .map(|&(g, w)| w * (u[g] - u[face]))
                .sum::<f64>()
                / t.face_areas[face];
            let a = t.face_areas[face];
            error += a * (lap - f[face]).powi(2);
            norm += a * f[face].powi(2);
        }
        if norm > 0.0 {
            (error / norm).sqrt()
        } else {
            error.sqrt()
        }
    }

    fn compatible(&self, rhs: &FaceScalar) -> Vec<f64> {
        let mean = area_mean(&self.tables, rhs.values());
        rhs.values().iter().map(|v| v - mean).collect()
    }
}

fn area_mean(t: &MeshTables, values: &[f64]) -> f64 {
    let total: f64 = values.iter().zip(&t.face_areas).map(|(v, a)| v * a).sum();
    total / t.total_area()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeodesicSphere;
    use crate::numerics::operators::Laplacian;

    fn tables(min_faces: i64) -> Arc<MeshTables> {
        let sphere = GeodesicSphere::build(1.0, min_faces).expect("sphere builds");
        Arc::new(MeshTables::new(Arc::new(sphere.mesh)))
    }

    fn zonal(t: &MeshTables) -> FaceScalar {
        let values = t.face_normals.iter().map(|n| n.z + 0.5 * n.x * n.y).collect();
        FaceScalar::from_raw(t.mesh_id(), values)
    }

    #[test]
    fn test_residual_decreases_with_iterations() {
        let t = tables(162);
        let f = zonal(&t);
        let coarse = PoissonSolver::new(Arc::clone(&t), 15);
        let fine = PoissonSolver::new(Arc::clone(&t), 400);

        let r_coarse = coarse.residual(&coarse.solve(&f, None), &f);
        let r_fine = fine.residual(&fine.solve(&f, None), &f);
        assert!(r_fine < 1e-2, "residual {r_fine}");
        assert!(r_fine < r_coarse, "{r_fine} !< {r_coarse}");
    }

    #[test]
    fn test_recovers_known_potential() {
        let t = tables(162);
        let lap = Laplacian::new(Arc::clone(&t));
        let expected = zonal(&t);
        let f = lap.apply(&expected);

        let solver = PoissonSolver::new(Arc::clone(&t), 1000);
        let u = solver.solve(&f, None);
        let mean = area_mean(&t, expected.values());
        for (got, want) in u.iter().zip(expected.iter()) {
            assert!((got - (want - mean)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_warm_start_from_solution_stays_put() {
        let t = tables(42);
        let f = zonal(&t);
        let solver = PoissonSolver::new(Arc::clone(&t), 500);
        let u = solver.solve(&f, None);
        let again = solver.with_iterations(1).solve(&f, Some(&u));
        assert!(u.sub(&again).iter().all(|d| d.abs() < 1e-8));
    }

    #[test]
    fn test_zero_rhs_gives_zero() {
        let t = tables(42);
        let zero = t.zeros::<crate::fields::OnFaces>();
        let solver = PoissonSolver::new(Arc::clone(&t), 10);
        let u = solver.solve(&zero, None);
        assert!(u.iter().all(|v| v == 0.0));
        assert_eq!(solver.residual(&u, &zero), 0.0);
    }
}
