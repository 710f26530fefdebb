//! Validation utilities for polyhedral sphere meshes.
//!
//! These checks catch topology and winding problems that would silently break
//! the finite-volume operators (which rely on consistent cyclic ordering).

use std::collections::BTreeMap;

use glam::DVec3;

use super::{spherical_triangle_area, AngularOrder, Polyhedron};

/// Results of validating a polyhedron that is meant to tile a sphere.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Euler characteristic components (V - E + F should equal 2)
    pub euler_v: usize,
    pub euler_e: usize,
    pub euler_f: usize,
    /// Number of faces with each vertex count
    pub face_degrees: BTreeMap<usize, usize>,
    /// Number of vertices with each face count
    pub vertex_valences: BTreeMap<usize, usize>,
    /// Faces whose stored order is clockwise seen from outside
    pub wrong_winding_faces: Vec<usize>,
    /// Vertices whose face fan is not anticlockwise or whose spokes don't interleave
    pub broken_fans: Vec<usize>,
    /// Edges with zero geodesic length
    pub zero_length_edges: Vec<usize>,
    /// Total spherical area of the faces, measured on the unit sphere (4pi expected)
    pub total_area: f64,
}

impl ValidationResult {
    /// Check if the mesh is valid (no hard errors)
    pub fn is_valid(&self) -> bool {
        self.wrong_winding_faces.is_empty()
            && self.broken_fans.is_empty()
            && self.zero_length_edges.is_empty()
            && self.euler_check()
    }

    /// Check Euler characteristic: V - E + F = 2 for a sphere
    pub fn euler_check(&self) -> bool {
        (self.euler_v as i64) - (self.euler_e as i64) + (self.euler_f as i64) == 2
    }

    /// Check if total area is close to 4pi (within 1%)
    pub fn area_check(&self) -> bool {
        let expected = 4.0 * std::f64::consts::PI;
        (self.total_area - expected).abs() / expected < 0.01
    }

    /// True for the pentagon/hexagon composition of a geodesic sphere.
    pub fn is_geodesic(&self) -> bool {
        self.face_degrees.get(&5).copied() == Some(12)
            && self.face_degrees.keys().all(|&d| d == 5 || d == 6)
            && self.vertex_valences.keys().all(|&d| d == 3)
    }

    /// Total number of hard issues found
    pub fn issue_count(&self) -> usize {
        self.wrong_winding_faces.len()
            + self.broken_fans.len()
            + self.zero_length_edges.len()
            + if self.euler_check() { 0 } else { 1 }
    }

    /// Log a summary of validation results
    pub fn log_summary(&self) {
        log::info!(
            "Mesh validation: V={} E={} F={} (V-E+F={}), area {:.6} (expected {:.6})",
            self.euler_v,
            self.euler_e,
            self.euler_f,
            (self.euler_v as i64) - (self.euler_e as i64) + (self.euler_f as i64),
            self.total_area,
            4.0 * std::f64::consts::PI
        );
        log::info!("  Face degrees: {:?}", self.face_degrees);
        if !self.is_valid() {
            log::warn!(
                "  {} issues: {} wrong winding, {} broken fans, {} zero-length edges",
                self.issue_count(),
                self.wrong_winding_faces.len(),
                self.broken_fans.len(),
                self.zero_length_edges.len()
            );
        }
    }
}

/// Validate topology, winding and coverage of a sphere mesh.
pub fn validate(mesh: &Polyhedron) -> ValidationResult {
    let mut result = ValidationResult {
        euler_v: mesh.num_vertices(),
        euler_e: mesh.num_edges(),
        euler_f: mesh.num_faces(),
        ..Default::default()
    };

    for f in mesh.face_ids() {
        let positions = mesh.face_positions(f);
        *result.face_degrees.entry(positions.len()).or_default() += 1;

        let centroid = mesh.face_centroid(f);
        let order = AngularOrder::around(centroid);
        let n = positions.len();
        let wound_ok = (0..n).all(|k| {
            order.is_anticlockwise(positions[k], positions[(k + 1) % n], positions[(k + 2) % n])
        });
        if !wound_ok {
            result.wrong_winding_faces.push(f.index());
        }

        // Fan triangulation from the centroid, measured on the unit sphere
        let center = centroid.normalize_or_zero();
        for k in 0..n {
            result.total_area +=
                spherical_triangle_area(center, positions[k], positions[(k + 1) % n]);
        }
    }

    for v in mesh.vertex_ids() {
        let fan = mesh.vertex_faces(v);
        let spokes = mesh.vertex_edges(v);
        *result.vertex_valences.entry(fan.len()).or_default() += 1;

        let up = mesh.position(v);
        let centers: Vec<DVec3> = fan.iter().map(|&f| mesh.face_centroid(f)).collect();
        let n = fan.len();
        let anticlockwise = (0..n).all(|k| {
            let a = centers[k] - up;
            let b = centers[(k + 1) % n] - up;
            a.cross(b).dot(up) > 0.0
        });
        let interleaved = spokes.len() == n
            && (0..n).all(|k| {
                let faces = mesh.edge_faces(spokes[k]);
                faces.contains(&fan[k]) && faces.contains(&fan[(k + 1) % n])
            });
        if !(anticlockwise && interleaved) {
            result.broken_fans.push(v.index());
        }
    }

    for e in mesh.edge_ids() {
        if mesh.edge_length(e) <= 0.0 {
            result.zero_length_edges.push(e.index());
        }
    }

    result
}
