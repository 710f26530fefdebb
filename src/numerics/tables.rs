//! Flat, densely indexed geometry and adjacency tables for a mesh.
//!
//! The operators never walk the [`Polyhedron`] directly: everything they need
//! is copied once into arrays indexed by face, vertex or edge number, with
//! variable-length adjacency stored as offset + data pairs.

use std::sync::Arc;

use glam::DVec3;

use crate::fields::{Entity, FaceScalar, OnFaces, OnVertices, ScalarField, VectorField};
use crate::geometry::{arc_length, triangle_area, MeshId, Polyhedron};
use crate::util::Timed;

/// Compressed rows: row `i` is `data[offsets[i]..offsets[i + 1]]`.
#[derive(Debug, Clone)]
pub struct Csr<T = usize> {
    offsets: Vec<usize>,
    data: Vec<T>,
}

impl<T: Copy> Csr<T> {
    pub fn from_rows<R, I>(rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = T>,
    {
        let mut offsets = vec![0];
        let mut data = Vec::new();
        for row in rows {
            data.extend(row);
            offsets.push(data.len());
        }
        Self { offsets, data }
    }

    pub fn row(&self, i: usize) -> &[T] {
        &self.data[self.offsets[i]..self.offsets[i + 1]]
    }

    pub fn num_rows(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn row_len(&self, i: usize) -> usize {
        self.offsets[i + 1] - self.offsets[i]
    }

    /// Total number of entries across all rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Precomputed geometry for one mesh.
///
/// Orientation conventions follow [`Polyhedron`]: face rows run anticlockwise
/// seen from outside, `face_edges` row entry `k` joins face vertices `k` and
/// `k + 1`, `face_neighbors` entry `k` lies across that edge, and each edge
/// normal points from `edge_faces[e][0]` into `edge_faces[e][1]`.
#[derive(Debug)]
pub struct MeshTables {
    mesh: Arc<Polyhedron>,
    /// Mean vertex radius.
    pub radius: f64,

    pub face_centers: Vec<DVec3>,
    pub face_normals: Vec<DVec3>,
    pub face_areas: Vec<f64>,
    pub face_vertices: Csr,
    pub face_edges: Csr,
    pub face_neighbors: Csr,
    /// +1 where the face is `edge_faces[e][0]` (edge normal points out), else -1.
    pub face_edge_signs: Csr<f64>,

    pub vertex_positions: Vec<DVec3>,
    pub vertex_normals: Vec<DVec3>,
    /// Area of the polygon joining the centers of the faces around a vertex.
    pub vertex_areas: Vec<f64>,
    pub vertex_faces: Csr,
    pub vertex_edges: Csr,

    pub edge_vertices: Vec<[usize; 2]>,
    pub edge_faces: Vec<[usize; 2]>,
    /// Geodesic edge lengths.
    pub edge_lengths: Vec<f64>,
    /// Geodesic distance between the centers of the two faces of each edge.
    pub edge_center_distances: Vec<f64>,
    /// Unit tangent normals, from `edge_faces[e][0]` toward `edge_faces[e][1]`.
    pub edge_normals: Vec<DVec3>,
}

impl MeshTables {
    pub fn new(mesh: Arc<Polyhedron>) -> Self {
        let _t = Timed::debug("Mesh tables");
        let m = mesh.as_ref();

        let face_centers: Vec<DVec3> = m.face_ids().map(|f| m.face_center(f)).collect();
        let face_normals: Vec<DVec3> = face_centers.iter().map(|c| c.normalize_or_zero()).collect();

        let face_vertices = Csr::from_rows(
            m.face_ids()
                .map(|f| m.face(f).vertices().iter().map(|v| v.index()).collect::<Vec<_>>()),
        );
        let face_edges = Csr::from_rows(
            m.face_ids()
                .map(|f| m.face_edges(f).iter().map(|e| e.index()).collect::<Vec<_>>()),
        );
        let face_neighbors = Csr::from_rows(
            m.face_ids()
                .map(|f| m.face_neighbors(f).into_iter().map(|g| g.index()).collect::<Vec<_>>()),
        );
        let face_edge_signs = Csr::from_rows(m.face_ids().map(|f| {
            m.face_edges(f)
                .iter()
                .map(|&e| if m.edge_faces(e)[0] == f { 1.0 } else { -1.0 })
                .collect::<Vec<_>>()
        }));

        let face_areas: Vec<f64> = m
            .face_ids()
            .map(|f| {
                let center = face_centers[f.index()];
                let p = m.face_positions(f);
                let n = p.len();
                (0..n).map(|k| triangle_area(center, p[k], p[(k + 1) % n])).sum()
            })
            .collect();

        let vertex_positions: Vec<DVec3> = m.vertices().iter().map(|v| v.position).collect();
        let vertex_normals: Vec<DVec3> =
            vertex_positions.iter().map(|p| p.normalize_or_zero()).collect();
        let vertex_faces = Csr::from_rows(
            m.vertex_ids()
                .map(|v| m.vertex_faces(v).iter().map(|f| f.index()).collect::<Vec<_>>()),
        );
        let vertex_edges = Csr::from_rows(
            m.vertex_ids()
                .map(|v| m.vertex_edges(v).iter().map(|e| e.index()).collect::<Vec<_>>()),
        );

        // Shoelace area of the surrounding face centers, in the tangent plane
        let vertex_areas: Vec<f64> = (0..vertex_positions.len())
            .map(|v| {
                let origin = vertex_positions[v];
                let up = vertex_normals[v];
                let ring = vertex_faces.row(v);
                let n = ring.len();
                0.5 * (0..n)
                    .map(|k| {
                        let a = face_centers[ring[k]] - origin;
                        let b = face_centers[ring[(k + 1) % n]] - origin;
                        a.cross(b).dot(up)
                    })
                    .sum::<f64>()
            })
            .collect();

        let edge_vertices: Vec<[usize; 2]> = m
            .edge_ids()
            .map(|e| {
                let (a, b) = m.edge(e).endpoints();
                [a.index(), b.index()]
            })
            .collect();
        let edge_faces: Vec<[usize; 2]> = m
            .edge_ids()
            .map(|e| {
                let [l, r] = m.edge_faces(e);
                [l.index(), r.index()]
            })
            .collect();
        let edge_lengths: Vec<f64> = m.edge_ids().map(|e| m.edge_length(e)).collect();
        let edge_center_distances: Vec<f64> = edge_faces
            .iter()
            .map(|&[l, r]| arc_length(face_centers[l], face_centers[r]))
            .collect();

        // edge_faces[e][0] walks a -> b anticlockwise, so it lies to the left of
        // a -> b and the outward normal is (b - a) x up.
        let edge_normals: Vec<DVec3> = edge_vertices
            .iter()
            .map(|&[a, b]| {
                let pa = vertex_positions[a];
                let pb = vertex_positions[b];
                let up = (pa + pb).normalize_or_zero();
                (pb - pa).cross(up).normalize_or_zero()
            })
            .collect();

        let radius = m.mean_radius();

        Self {
            mesh,
            radius,
            face_centers,
            face_normals,
            face_areas,
            face_vertices,
            face_edges,
            face_neighbors,
            face_edge_signs,
            vertex_positions,
            vertex_normals,
            vertex_areas,
            vertex_faces,
            vertex_edges,
            edge_vertices,
            edge_faces,
            edge_lengths,
            edge_center_distances,
            edge_normals,
        }
    }

    pub fn mesh(&self) -> &Polyhedron {
        &self.mesh
    }

    pub fn mesh_id(&self) -> MeshId {
        self.mesh.id()
    }

    pub fn num_faces(&self) -> usize {
        self.face_centers.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertex_positions.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edge_vertices.len()
    }

    /// Sum of the face areas.
    pub fn total_area(&self) -> f64 {
        self.face_areas.iter().sum()
    }

    /// Area integral of a face field.
    pub fn integrate_faces(&self, field: &ScalarField<OnFaces>) -> f64 {
        self.check(field.mesh_id());
        field.weighted_sum(&self.face_areas)
    }

    /// Area integral of a face vector field.
    pub fn integrate_face_vectors(&self, field: &VectorField<OnFaces>) -> DVec3 {
        self.check(field.mesh_id());
        field.weighted_sum(&self.face_areas)
    }

    /// Area integral of a vertex field, using the dual vertex areas.
    pub fn integrate_vertices(&self, field: &ScalarField<OnVertices>) -> f64 {
        self.check(field.mesh_id());
        field.weighted_sum(&self.vertex_areas)
    }

    /// Coriolis parameter `2 * Omega * (n . z)` on faces, where
    /// `Omega = 2 pi * rotation_frequency` about the z axis.
    pub fn coriolis_parameter(&self, rotation_frequency: f64) -> FaceScalar {
        let omega = std::f64::consts::TAU * rotation_frequency;
        let values = self.face_normals.iter().map(|n| 2.0 * omega * n.z).collect();
        ScalarField::from_raw(self.mesh_id(), values)
    }

    /// Panics unless `mesh` is the mesh these tables were built from.
    pub(crate) fn check(&self, mesh: MeshId) {
        assert_eq!(
            mesh,
            self.mesh_id(),
            "field from mesh {:?} used with tables for mesh {:?}",
            mesh,
            self.mesh_id()
        );
    }

    /// Faces whose centers lie within `distance` (geodesic) of `point`.
    pub fn faces_within(&self, point: DVec3, distance: f64) -> Vec<usize> {
        let target = point.normalize_or_zero() * self.radius;
        self.face_centers
            .iter()
            .enumerate()
            .filter(|(_, &c)| arc_length(c, target) <= distance)
            .map(|(i, _)| i)
            .collect()
    }

    /// Face whose center is closest to `point`.
    pub fn nearest_face(&self, point: DVec3) -> usize {
        let dir = point.normalize_or_zero();
        self.face_normals
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.dot(dir).total_cmp(&b.1.dot(dir)))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// An all-zero field of entity kind `E` on this mesh.
    pub fn zeros<E: Entity>(&self) -> ScalarField<E> {
        ScalarField::from_raw(self.mesh_id(), vec![0.0; E::count(&self.mesh)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeodesicSphere;
    use approx::assert_relative_eq;

    fn tables(min_faces: i64) -> MeshTables {
        let sphere = GeodesicSphere::build(1.0, min_faces).expect("sphere builds");
        MeshTables::new(Arc::new(sphere.mesh))
    }

    #[test]
    fn test_csr_rows() {
        let csr: Csr = Csr::from_rows(vec![vec![1, 2], vec![], vec![3, 4, 5]]);
        assert_eq!(csr.num_rows(), 3);
        assert_eq!(csr.row(0), &[1, 2]);
        assert!(csr.row(1).is_empty());
        assert_eq!(csr.row(2), &[3, 4, 5]);
        assert_eq!(csr.row_len(2), 3);
        assert_eq!(csr.len(), 5);
    }

    #[test]
    fn test_areas_cover_sphere() {
        let t = tables(642);
        let sphere_area = 4.0 * std::f64::consts::PI;
        // Planar facets slightly under-estimate the sphere
        assert_relative_eq!(t.total_area(), sphere_area, max_relative = 0.01);
        let vertex_total: f64 = t.vertex_areas.iter().sum();
        assert_relative_eq!(vertex_total, sphere_area, max_relative = 0.01);
        assert!(t.face_areas.iter().all(|&a| a > 0.0));
        assert!(t.vertex_areas.iter().all(|&a| a > 0.0));

        let ones = ScalarField::<OnVertices>::constant(t.mesh(), 1.0);
        assert_relative_eq!(t.integrate_vertices(&ones), vertex_total, max_relative = 1e-12);
    }

    #[test]
    fn test_edge_normals_point_from_left_to_right_face() {
        let t = tables(162);
        for e in 0..t.num_edges() {
            let [l, r] = t.edge_faces[e];
            let n = t.edge_normals[e];
            assert!(n.dot(t.face_centers[r] - t.face_centers[l]) > 0.0);
            assert_relative_eq!(n.length(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_signs_match_edge_faces() {
        let t = tables(42);
        for f in 0..t.num_faces() {
            for (k, &e) in t.face_edges.row(f).iter().enumerate() {
                let sign = t.face_edge_signs.row(f)[k];
                let neighbor = t.face_neighbors.row(f)[k];
                if sign > 0.0 {
                    assert_eq!(t.edge_faces[e], [f, neighbor]);
                } else {
                    assert_eq!(t.edge_faces[e], [neighbor, f]);
                }
            }
        }
    }

    #[test]
    fn test_coriolis_antisymmetric_about_equator() {
        let t = tables(162);
        let f = t.coriolis_parameter(1.0);
        assert_relative_eq!(t.integrate_faces(&f), 0.0, epsilon = 1e-9);
        assert!(f.max() <= 4.0 * std::f64::consts::PI + 1e-12);
    }

    #[test]
    fn test_faces_within_and_nearest() {
        let t = tables(162);
        let near = t.nearest_face(DVec3::Z);
        let within = t.faces_within(DVec3::Z, 0.3);
        assert!(within.contains(&near));
        assert!(within.len() < t.num_faces() / 4);
    }

    #[test]
    fn test_nearest_face_matches_brute_force() {
        use crate::geometry::random_sphere_points_with_rng;
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let t = tables(162);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for p in random_sphere_points_with_rng(50, 3.0, &mut rng) {
            let nearest = t.nearest_face(p);
            let best = (0..t.num_faces())
                .map(|f| arc_length(t.face_centers[f], p.normalize()))
                .fold(f64::INFINITY, f64::min);
            assert_relative_eq!(arc_length(t.face_centers[nearest], p.normalize()), best);
        }
    }
}
