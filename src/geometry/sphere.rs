use glam::DVec3;
use rand::Rng;

/// Generate `n` uniformly distributed points on a sphere of the given radius.
pub fn random_sphere_points_with_rng<R: Rng>(n: usize, radius: f64, rng: &mut R) -> Vec<DVec3> {
    (0..n)
        .map(|_| {
            // Uniform z in [-1, 1] plus uniform azimuth gives uniform area density
            let z: f64 = rng.gen_range(-1.0..1.0);
            let theta: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            let r = (1.0 - z * z).sqrt();
            DVec3::new(r * theta.cos(), r * theta.sin(), z) * radius
        })
        .collect()
}

/// Great-circle distance between two points, measured on the sphere whose
/// radius is the mean of the two point radii.
pub fn arc_length(a: DVec3, b: DVec3) -> f64 {
    let radius = 0.5 * (a.length() + b.length());
    let cos = a.normalize_or_zero().dot(b.normalize_or_zero()).clamp(-1.0, 1.0);
    radius * cos.acos()
}

/// Circumcenter of a triangle whose corners share a sphere, projected back to
/// that sphere on the same side as the triangle.
pub fn circumcenter_on_sphere(a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    let radius = (a.length() + b.length() + c.length()) / 3.0;
    let normal = (b - a).cross(c - a);
    let center = normal.normalize_or_zero() * radius;

    // The cross product flips with winding; keep the hemisphere of the triangle.
    if center.dot(a + b + c) < 0.0 {
        -center
    } else {
        center
    }
}

/// Area of a planar triangle.
pub fn triangle_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    0.5 * (b - a).cross(c - a).length()
}

/// Area of a spherical triangle on a unit sphere (spherical excess).
pub fn spherical_triangle_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let (a, b, c) = (a.normalize(), b.normalize(), c.normalize());
    let numerator = a.dot(b.cross(c)).abs();
    let denominator = 1.0 + a.dot(b) + b.dot(c) + c.dot(a);
    2.0 * numerator.atan2(denominator)
}

/// Project `v` onto the plane tangent to the sphere at `at`.
pub fn to_tangent_plane(v: DVec3, at: DVec3) -> DVec3 {
    let n = at.normalize_or_zero();
    v - n * n.dot(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_points_on_sphere() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let points = random_sphere_points_with_rng(100, 3.0, &mut rng);
        for p in &points {
            assert_relative_eq!(p.length(), 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_arc_length_quarter_circle() {
        let d = arc_length(DVec3::X * 2.0, DVec3::Y * 2.0);
        assert_relative_eq!(d, std::f64::consts::PI, epsilon = 1e-12);
    }

    #[test]
    fn test_circumcenter_equidistant() {
        let a = DVec3::new(1.0, 0.2, 0.1).normalize();
        let b = DVec3::new(0.3, 1.0, -0.2).normalize();
        let c = DVec3::new(0.1, 0.4, 1.0).normalize();
        let center = circumcenter_on_sphere(a, c, b);

        assert_relative_eq!(center.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!((center - a).length(), (center - b).length(), epsilon = 1e-12);
        assert_relative_eq!((center - a).length(), (center - c).length(), epsilon = 1e-12);
        assert!(center.dot(a + b + c) > 0.0);
    }

    #[test]
    fn test_octant_area() {
        let area = spherical_triangle_area(DVec3::X, DVec3::Y, DVec3::Z);
        assert_relative_eq!(area, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }
}
