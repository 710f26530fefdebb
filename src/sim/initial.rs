//! Initial-condition generators.
//!
//! A generator receives the mesh tables, an average and a deviation, and the
//! simulation's seeded generator, and returns a fresh field. Generators are
//! boxed so callers can inject their own.

use glam::DVec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::fields::{FaceScalar, VertexVector};
use crate::geometry::to_tangent_plane;
use crate::numerics::MeshTables;

pub type ScalarGenerator =
    Box<dyn Fn(&MeshTables, f64, f64, &mut ChaCha8Rng) -> FaceScalar + Send + Sync>;
pub type VectorGenerator =
    Box<dyn Fn(&MeshTables, f64, f64, &mut ChaCha8Rng) -> VertexVector + Send + Sync>;

/// Generators for every prognostic field.
pub struct InitialConditions {
    pub height: ScalarGenerator,
    pub velocity: VectorGenerator,
    pub tracer: ScalarGenerator,
}

impl Default for InitialConditions {
    /// Slightly perturbed depth, fluid at rest, banded tracer.
    fn default() -> Self {
        Self {
            height: uniform_height(),
            velocity: zonal_velocity(),
            tracer: latitude_bands(6),
        }
    }
}

impl InitialConditions {
    /// Flat surface, no motion.
    pub fn still_water() -> Self {
        Self {
            height: constant_height(),
            velocity: zero_velocity(),
            tracer: latitude_bands(6),
        }
    }
}

impl std::fmt::Debug for InitialConditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("InitialConditions { .. }")
    }
}

/// Every face at `average`; the deviation is ignored.
pub fn constant_height() -> ScalarGenerator {
    Box::new(|tables: &MeshTables, average: f64, _deviation: f64, _rng: &mut ChaCha8Rng| {
        FaceScalar::from_raw(tables.mesh_id(), vec![average; tables.num_faces()])
    })
}

/// Uniform noise in `average +- deviation`.
pub fn uniform_height() -> ScalarGenerator {
    Box::new(|tables: &MeshTables, average: f64, deviation: f64, rng: &mut ChaCha8Rng| {
        let values = (0..tables.num_faces())
            .map(|_| {
                if deviation > 0.0 {
                    average + rng.gen_range(-deviation..deviation)
                } else {
                    average
                }
            })
            .collect();
        FaceScalar::from_raw(tables.mesh_id(), values)
    })
}

/// Normally distributed values with the given mean and standard deviation.
pub fn gaussian_height() -> ScalarGenerator {
    Box::new(|tables: &MeshTables, average: f64, deviation: f64, rng: &mut ChaCha8Rng| {
        let values = match Normal::new(average, deviation) {
            Ok(normal) => (0..tables.num_faces()).map(|_| normal.sample(rng)).collect(),
            Err(_) => vec![average; tables.num_faces()],
        };
        FaceScalar::from_raw(tables.mesh_id(), values)
    })
}

/// A smooth bump of height `deviation` centered on the +x axis, on top of
/// `average`. Deterministic.
pub fn cosine_bell() -> ScalarGenerator {
    Box::new(|tables: &MeshTables, average: f64, deviation: f64, _rng: &mut ChaCha8Rng| {
        let width = std::f64::consts::FRAC_PI_4;
        let values = tables
            .face_normals
            .iter()
            .map(|n| {
                let angle = n.dot(DVec3::X).clamp(-1.0, 1.0).acos();
                if angle < width {
                    average + deviation * 0.5 * (1.0 + (std::f64::consts::PI * angle / width).cos())
                } else {
                    average
                }
            })
            .collect();
        FaceScalar::from_raw(tables.mesh_id(), values)
    })
}

pub fn zero_velocity() -> VectorGenerator {
    Box::new(|tables: &MeshTables, _average: f64, _deviation: f64, _rng: &mut ChaCha8Rng| {
        VertexVector::from_raw(tables.mesh_id(), vec![DVec3::ZERO; tables.num_vertices()])
    })
}

/// Solid-body eastward flow with equatorial speed `average`, plus random
/// tangent perturbations of size up to `deviation`.
pub fn zonal_velocity() -> VectorGenerator {
    Box::new(|tables: &MeshTables, average: f64, deviation: f64, rng: &mut ChaCha8Rng| {
        let values = tables
            .vertex_normals
            .iter()
            .map(|&n| {
                let zonal = DVec3::Z.cross(n) * average;
                zonal + random_tangent(n, deviation, rng)
            })
            .collect();
        VertexVector::from_raw(tables.mesh_id(), values)
    })
}

/// Random tangent vectors of length up to `deviation`; the average is ignored.
pub fn random_velocity() -> VectorGenerator {
    Box::new(|tables: &MeshTables, _average: f64, deviation: f64, rng: &mut ChaCha8Rng| {
        let values = tables
            .vertex_normals
            .iter()
            .map(|&n| random_tangent(n, deviation, rng))
            .collect();
        VertexVector::from_raw(tables.mesh_id(), values)
    })
}

/// Alternating bands of `average - deviation` and `average + deviation`
/// by latitude, `bands` of them from pole to pole.
pub fn latitude_bands(bands: u32) -> ScalarGenerator {
    Box::new(move |tables: &MeshTables, average: f64, deviation: f64, _rng: &mut ChaCha8Rng| {
        let values = tables
            .face_normals
            .iter()
            .map(|n| {
                let colatitude = n.z.clamp(-1.0, 1.0).acos();
                let band = (colatitude / std::f64::consts::PI * bands as f64) as u32;
                if band % 2 == 0 {
                    average + deviation
                } else {
                    average - deviation
                }
            })
            .collect();
        FaceScalar::from_raw(tables.mesh_id(), values)
    })
}

fn random_tangent(normal: DVec3, magnitude: f64, rng: &mut ChaCha8Rng) -> DVec3 {
    if magnitude <= 0.0 {
        return DVec3::ZERO;
    }
    let v = DVec3::new(
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
    );
    to_tangent_plane(v, normal).clamp_length_max(1.0) * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeodesicSphere;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn tables() -> MeshTables {
        let sphere = GeodesicSphere::build(6000.0, 162).expect("sphere builds");
        MeshTables::new(Arc::new(sphere.mesh))
    }

    #[test]
    fn test_constant_and_uniform() {
        let t = tables();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let h = constant_height()(&t, 5.0, 1.0, &mut rng);
        assert!(h.iter().all(|v| v == 5.0));

        let h = uniform_height()(&t, 5.0, 1.0, &mut rng);
        assert!(h.iter().all(|v| (4.0..6.0).contains(&v)));
        assert!(h.max() > h.min());
    }

    #[test]
    fn test_seeded_generators_reproduce() {
        let t = tables();
        let a = gaussian_height()(&t, 0.0, 2.0, &mut ChaCha8Rng::seed_from_u64(9));
        let b = gaussian_height()(&t, 0.0, 2.0, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
        let c = gaussian_height()(&t, 0.0, 2.0, &mut ChaCha8Rng::seed_from_u64(10));
        assert_ne!(a, c);
    }

    #[test]
    fn test_velocities_are_tangent() {
        let t = tables();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for u in [
            zonal_velocity()(&t, 10.0, 1.0, &mut rng),
            random_velocity()(&t, 0.0, 3.0, &mut rng),
        ] {
            for (v, n) in u.iter().zip(&t.vertex_normals) {
                assert!(v.dot(*n).abs() < 1e-9);
            }
        }
        let still = zero_velocity()(&t, 10.0, 1.0, &mut rng);
        assert_eq!(still.max_norm(), 0.0);
    }

    #[test]
    fn test_bands_and_bell() {
        let t = tables();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let c = latitude_bands(4)(&t, 0.5, 0.5, &mut rng);
        assert!(c.iter().all(|v| v == 0.0 || v == 1.0));
        assert_eq!(c.at(t.nearest_face(DVec3::Z)), 1.0);

        let bell = cosine_bell()(&t, 1.0, 2.0, &mut rng);
        assert_eq!(bell.at(t.nearest_face(-DVec3::X)), 1.0);
        assert!(bell.at(t.nearest_face(DVec3::X)) > 2.5);
    }
}
