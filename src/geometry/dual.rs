//! Dual meshes and the geodesic sphere pipeline.
//!
//! The geodesic sphere is the dual of a subdivided icosahedron: one vertex per
//! triangle (at its circumcenter) and one face per triangle vertex. The 12
//! original icosahedron vertices become pentagons; every other face is a hexagon.

use glam::DVec3;

use super::{
    circumcenter_on_sphere, icosahedron, project_to_sphere, subdivide_times, Polyhedron,
};
use crate::error::{ConfigError, GeometryError};
use crate::util::Timed;

/// Vertex, edge and face counts of a subdivided icosahedron.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefinementTier {
    /// Number of subdivisions applied to the icosahedron.
    pub subdivisions: u32,
    pub vertices: u64,
    pub edges: u64,
    pub faces: u64,
}

impl RefinementTier {
    /// The icosahedron itself.
    pub const BASE: RefinementTier = RefinementTier {
        subdivisions: 0,
        vertices: 12,
        edges: 30,
        faces: 20,
    };

    /// Counts after one more subdivision.
    pub fn next(self) -> Self {
        Self {
            subdivisions: self.subdivisions + 1,
            vertices: self.vertices + self.edges,
            edges: 2 * self.edges + 3 * self.faces,
            faces: 4 * self.faces,
        }
    }

    /// Number of faces of the dual of this tier.
    pub fn dual_faces(&self) -> u64 {
        self.vertices
    }

    /// Smallest tier whose dual has at least `minimum_faces` faces.
    ///
    /// The counts grow strictly, so this terminates for every positive target.
    pub fn for_minimum_faces(minimum_faces: i64) -> Result<Self, ConfigError> {
        if minimum_faces <= 0 {
            return Err(ConfigError::NonPositiveFaceCount(minimum_faces));
        }
        let mut tier = Self::BASE;
        while tier.dual_faces() < minimum_faces as u64 {
            tier = tier.next();
        }
        Ok(tier)
    }
}

/// Build the dual of a triangular mesh.
///
/// Each triangle contributes its circumcenter; each old vertex contributes the
/// face formed by the circumcenters of its surrounding triangles, taken in the
/// vertex's anticlockwise face order.
pub fn dual(mesh: &Polyhedron) -> Result<Polyhedron, GeometryError> {
    let centers: Vec<DVec3> = mesh
        .face_ids()
        .map(|f| {
            let face = mesh.face(f);
            if face.len() != 3 {
                return Err(GeometryError::NotTriangular {
                    face: f.index(),
                    len: face.len(),
                });
            }
            let v = face.vertices();
            Ok(circumcenter_on_sphere(
                mesh.position(v[0]),
                mesh.position(v[1]),
                mesh.position(v[2]),
            ))
        })
        .collect::<Result<_, _>>()?;

    let faces: Vec<Vec<DVec3>> = mesh
        .vertex_ids()
        .map(|v| {
            mesh.vertex_faces(v)
                .iter()
                .map(|f| centers[f.index()])
                .collect()
        })
        .collect();

    Polyhedron::from_faces(&faces)
}

/// A hexagon/pentagon mesh on a sphere, plus the triangulation it came from.
#[derive(Debug, Clone)]
pub struct GeodesicSphere {
    pub radius: f64,
    pub tier: RefinementTier,
    /// The subdivided icosahedron on the unit sphere.
    pub icosasphere: Polyhedron,
    /// The dual mesh at `radius`.
    pub mesh: Polyhedron,
}

impl GeodesicSphere {
    /// Build the smallest geodesic sphere with at least `minimum_faces` faces.
    pub fn build(radius: f64, minimum_faces: i64) -> crate::Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::InvalidRadius(radius).into());
        }
        let tier = RefinementTier::for_minimum_faces(minimum_faces)?;

        let _t = Timed::info("Geodesic sphere");
        let ico = icosahedron()?;
        let fine = subdivide_times(&ico, tier.subdivisions)?;
        let icosasphere = project_to_sphere(&fine, 1.0)?;
        let unit_dual = dual(&icosasphere)?;
        let mesh = project_to_sphere(&unit_dual, radius)?;

        log::info!(
            "Geodesic sphere: {} subdivisions, {} faces, {} vertices, {} edges",
            tier.subdivisions,
            mesh.num_faces(),
            mesh.num_vertices(),
            mesh.num_edges()
        );

        Ok(Self {
            radius,
            tier,
            icosasphere,
            mesh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tier_recurrence() {
        let t1 = RefinementTier::BASE.next();
        assert_eq!((t1.vertices, t1.edges, t1.faces), (42, 120, 80));
        let t2 = t1.next();
        assert_eq!((t2.vertices, t2.edges, t2.faces), (162, 480, 320));
        for tier in [RefinementTier::BASE, t1, t2, t2.next()] {
            assert_eq!(tier.vertices as i64 - tier.edges as i64 + tier.faces as i64, 2);
        }
    }

    #[test]
    fn test_tier_selection() {
        assert_eq!(RefinementTier::for_minimum_faces(1).unwrap().dual_faces(), 12);
        assert_eq!(RefinementTier::for_minimum_faces(12).unwrap().dual_faces(), 12);
        assert_eq!(RefinementTier::for_minimum_faces(13).unwrap().dual_faces(), 42);
        assert_eq!(RefinementTier::for_minimum_faces(42).unwrap().dual_faces(), 42);
        assert_eq!(RefinementTier::for_minimum_faces(43).unwrap().dual_faces(), 162);
        assert_eq!(RefinementTier::for_minimum_faces(400).unwrap().dual_faces(), 642);
    }

    #[test]
    fn test_tier_rejects_non_positive() {
        assert_eq!(
            RefinementTier::for_minimum_faces(0),
            Err(ConfigError::NonPositiveFaceCount(0))
        );
        assert!(RefinementTier::for_minimum_faces(-5).is_err());
    }

    #[test]
    fn test_geodesic_face_counts_match_tiers() {
        assert_eq!(GeodesicSphere::build(1.0, 42).unwrap().mesh.num_faces(), 42);
        assert_eq!(GeodesicSphere::build(1.0, 43).unwrap().mesh.num_faces(), 162);
    }

    #[test]
    fn test_geodesic_face_composition() {
        let sphere = GeodesicSphere::build(2.0, 162).expect("sphere builds");
        let mesh = &sphere.mesh;
        assert_eq!(mesh.euler_characteristic(), 2);

        let pentagons = mesh.faces().iter().filter(|f| f.len() == 5).count();
        let hexagons = mesh.faces().iter().filter(|f| f.len() == 6).count();
        assert_eq!(pentagons, 12);
        assert_eq!(pentagons + hexagons, mesh.num_faces());

        for v in mesh.vertex_ids() {
            assert_eq!(mesh.vertex_faces(v).len(), 3);
            assert_eq!(mesh.vertex_edges(v).len(), 3);
            assert_relative_eq!(mesh.position(v).length(), 2.0, epsilon = 1e-12);
        }
        for e in mesh.edge_ids() {
            let [l, r] = mesh.edge_faces(e);
            assert_ne!(l, r);
        }
    }

    #[test]
    fn test_circumcenter_bisects_edges() {
        // Moving from an edge midpoint toward the face's circumcenter stays
        // equidistant from both endpoints.
        let sphere = GeodesicSphere::build(1.0, 162).expect("sphere builds");
        let tri = &sphere.icosasphere;
        for f in tri.face_ids() {
            let p = tri.face_positions(f);
            let center = circumcenter_on_sphere(p[0], p[1], p[2]);
            for k in 0..3 {
                let (a, b) = (p[k], p[(k + 1) % 3]);
                let mid = 0.5 * (a + b);
                for t in [0.25, 0.5, 1.0] {
                    let q = mid + (center - mid) * t;
                    assert_relative_eq!((q - a).length(), (q - b).length(), epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_build_rejects_bad_radius() {
        assert!(GeodesicSphere::build(0.0, 42).is_err());
        assert!(GeodesicSphere::build(f64::NAN, 42).is_err());
    }
}
