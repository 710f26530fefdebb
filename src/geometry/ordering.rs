//! Anticlockwise ordering of points around a center on a sphere.
//!
//! The comparator splits the tangent plane into two half-planes relative to a
//! reference direction and then compares by the sign of
//! `dot(cross(a - center, b - center), view)`. Within a half-plane the spread is
//! below pi, so the cross-product sign is transitive and the comparator is a
//! total order. No fallback to an unordered result is ever needed.

use std::cmp::Ordering;

use glam::DVec3;

/// Sorts points anticlockwise around `center` as seen by an observer looking
/// down `-view` (i.e. from outside the sphere when `view` points outward).
#[derive(Debug, Clone, Copy)]
pub struct AngularOrder {
    center: DVec3,
    view: DVec3,
    reference: DVec3,
}

impl AngularOrder {
    /// Build an ordering around `center`, viewed along `view`.
    ///
    /// A zero-length view vector (e.g. a face whose centroid is the origin)
    /// falls back to the z axis. That yields a deterministic order, but it is
    /// only meaningful when the points actually lie around the fallback axis.
    pub fn new(center: DVec3, view: DVec3) -> Self {
        let view = match view.try_normalize() {
            Some(v) => v,
            None => {
                log::warn!(
                    "Angular ordering around {:?} has no view direction, falling back to +Z",
                    center
                );
                DVec3::Z
            }
        };

        let up = if view.y.abs() < 0.9 { DVec3::Y } else { DVec3::X };
        let reference = view.cross(up).normalize();

        Self {
            center,
            view,
            reference,
        }
    }

    /// Ordering around a point on the sphere, viewed from outside.
    pub fn around(point: DVec3) -> Self {
        Self::new(point, point)
    }

    pub fn view(&self) -> DVec3 {
        self.view
    }

    fn tangent(&self, p: DVec3) -> DVec3 {
        let d = p - self.center;
        d - self.view * self.view.dot(d)
    }

    /// 0 for angles in [0, pi), 1 for [pi, 2pi), measured from the reference.
    fn half(&self, t: DVec3) -> u8 {
        let side = self.reference.cross(t).dot(self.view);
        if side > 0.0 || (side == 0.0 && self.reference.dot(t) >= 0.0) {
            0
        } else {
            1
        }
    }

    /// `Less` when `a` comes before `b` going anticlockwise from the reference.
    pub fn compare(&self, a: DVec3, b: DVec3) -> Ordering {
        let ta = self.tangent(a);
        let tb = self.tangent(b);

        let (ha, hb) = (self.half(ta), self.half(tb));
        if ha != hb {
            return ha.cmp(&hb);
        }

        let turn = ta.cross(tb).dot(self.view);
        if turn > 0.0 {
            Ordering::Less
        } else if turn < 0.0 {
            Ordering::Greater
        } else {
            // Collinear and on the same side: nearer first
            ta.length_squared().total_cmp(&tb.length_squared())
        }
    }

    /// Sort `items` anticlockwise by the position each one maps to.
    pub fn sort_by_position<T, F>(&self, items: &mut [T], position: F)
    where
        F: Fn(&T) -> DVec3,
    {
        items.sort_by(|a, b| self.compare(position(a), position(b)));
    }

    /// True if `a`, `b`, `c` turn anticlockwise around the center.
    pub fn is_anticlockwise(&self, a: DVec3, b: DVec3, c: DVec3) -> bool {
        (b - a).cross(c - b).dot(self.view) > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize, z: f64) -> Vec<DVec3> {
        (0..n)
            .map(|i| {
                let angle = std::f64::consts::TAU * i as f64 / n as f64;
                DVec3::new(angle.cos(), angle.sin(), z)
            })
            .collect()
    }

    #[test]
    fn test_sorts_shuffled_ring_anticlockwise() {
        let points = ring(7, 1.0);
        let order = AngularOrder::around(DVec3::new(0.0, 0.0, 1.0));

        let mut shuffled = vec![3usize, 6, 0, 5, 1, 4, 2];
        order.sort_by_position(&mut shuffled, |&i| points[i]);

        // Must be a rotation of 0..7
        let start = shuffled[0];
        for (k, &i) in shuffled.iter().enumerate() {
            assert_eq!(i, (start + k) % 7);
        }
    }

    #[test]
    fn test_view_from_below_reverses_order() {
        let points = ring(5, -1.0);
        let order = AngularOrder::around(DVec3::new(0.0, 0.0, -1.0));

        let mut idx: Vec<usize> = (0..5).collect();
        order.sort_by_position(&mut idx, |&i| points[i]);

        let start = idx[0];
        for (k, &i) in idx.iter().enumerate() {
            assert_eq!(i, (start + 5 - k) % 5);
        }
    }

    #[test]
    fn test_zero_view_falls_back() {
        let order = AngularOrder::new(DVec3::ZERO, DVec3::ZERO);
        assert_eq!(order.view(), DVec3::Z);

        let points = ring(4, 0.0);
        let mut idx = vec![2usize, 0, 3, 1];
        order.sort_by_position(&mut idx, |&i| points[i]);
        let start = idx[0];
        for (k, &i) in idx.iter().enumerate() {
            assert_eq!(i, (start + k) % 4);
        }
    }
}
