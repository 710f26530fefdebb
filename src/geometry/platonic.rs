//! The regular icosahedron inscribed in the unit sphere.

use std::f64::consts::{PI, TAU};

use glam::DVec3;

use super::Polyhedron;
use crate::error::GeometryError;

/// Colatitude of the upper ring of five vertices.
///
/// `cos(theta) = (1 + sqrt 5) / (5 + sqrt 5) = 1 / sqrt 5`.
pub fn ring_colatitude() -> f64 {
    let sqrt5 = 5.0_f64.sqrt();
    ((1.0 + sqrt5) / (5.0 + sqrt5)).acos()
}

fn unit_from_spherical(colatitude: f64, azimuth: f64) -> DVec3 {
    let (sin_c, cos_c) = colatitude.sin_cos();
    let (sin_a, cos_a) = azimuth.sin_cos();
    DVec3::new(sin_c * cos_a, sin_c * sin_a, cos_c)
}

/// The 12 icosahedron vertices: north pole, upper ring, lower ring, south pole.
///
/// The lower ring is rotated by pi/5 relative to the upper ring.
pub fn icosahedron_vertices() -> [DVec3; 12] {
    let upper = ring_colatitude();
    let lower = PI - upper;

    let mut vertices = [DVec3::ZERO; 12];
    vertices[0] = DVec3::Z;
    for k in 0..5 {
        let azimuth = TAU * k as f64 / 5.0;
        vertices[1 + k] = unit_from_spherical(upper, azimuth);
        vertices[6 + k] = unit_from_spherical(lower, azimuth + PI / 5.0);
    }
    vertices[11] = -DVec3::Z;
    vertices
}

/// The 20 icosahedron faces as position triples: five northern caps, five
/// southern caps and ten equatorial triangles of alternating orientation.
pub fn icosahedron_faces() -> Vec<Vec<DVec3>> {
    let v = icosahedron_vertices();
    let north = v[0];
    let south = v[11];
    let upper = |k: usize| v[1 + k % 5];
    let lower = |k: usize| v[6 + k % 5];

    let mut faces = Vec::with_capacity(20);
    for k in 0..5 {
        faces.push(vec![north, upper(k), upper(k + 1)]);
    }
    for k in 0..5 {
        faces.push(vec![south, lower(k + 1), lower(k)]);
    }
    for k in 0..5 {
        faces.push(vec![upper(k), lower(k), upper(k + 1)]);
        faces.push(vec![lower(k), lower(k + 1), upper(k + 1)]);
    }
    faces
}

/// Build the unit icosahedron.
pub fn icosahedron() -> Result<Polyhedron, GeometryError> {
    Polyhedron::from_faces(&icosahedron_faces())
}
