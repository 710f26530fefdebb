//! Local edits to a field, producing a new field.
//!
//! Used by interactive tooling to raise or lower the height over a patch of
//! faces; the result is handed to a running simulation as a replacement.

use glam::DVec3;

use super::{FaceScalar, OnFaces, ScalarField};
use crate::geometry::FaceId;
use crate::numerics::MeshTables;

/// Apply `transform` to the value at each listed face, leaving the input untouched.
///
/// `transform` receives the face id and its current value.
pub fn adjust<F>(field: &FaceScalar, faces: &[FaceId], transform: F) -> FaceScalar
where
    F: Fn(FaceId, f64) -> f64,
{
    let mut values = field.values().to_vec();
    for &f in faces {
        values[f.index()] = transform(f, values[f.index()]);
    }
    ScalarField::<OnFaces>::from_raw(field.mesh_id(), values)
}

/// Apply `transform` to every face whose center is within `distance` of
/// `point`, measured along the sphere. The transform also receives the
/// distance, so edits can taper toward the rim.
pub fn adjust_within<F>(
    field: &FaceScalar,
    tables: &MeshTables,
    point: DVec3,
    distance: f64,
    transform: F,
) -> FaceScalar
where
    F: Fn(f64, f64) -> f64,
{
    tables.check(field.mesh_id());
    let target = point.normalize_or_zero() * tables.radius;
    let faces: Vec<FaceId> = tables
        .faces_within(point, distance)
        .into_iter()
        .map(FaceId)
        .collect();
    log::debug!("Adjusting {} faces within {:.3} of {:?}", faces.len(), distance, point);
    adjust(field, &faces, |f, value| {
        let d = crate::geometry::arc_length(tables.face_centers[f.index()], target);
        transform(value, d)
    })
}

/// Raise (or lower, for negative `amount`) a field by a cosine bump of the
/// given radius centered on `point`.
pub fn add_bump(
    field: &FaceScalar,
    tables: &MeshTables,
    point: DVec3,
    radius: f64,
    amount: f64,
) -> FaceScalar {
    adjust_within(field, tables, point, radius, |value, d| {
        let shape = 0.5 * (1.0 + (std::f64::consts::PI * d / radius).cos());
        value + amount * shape
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeodesicSphere;
    use std::sync::Arc;

    #[test]
    fn test_adjust_listed_faces_only() {
        let sphere = GeodesicSphere::build(1.0, 42).expect("sphere builds");
        let field = FaceScalar::constant(&sphere.mesh, 1.0);
        let edited = adjust(&field, &[FaceId(2), FaceId(9)], |f, v| v + f.index() as f64);
        assert_eq!(edited.get(FaceId(2)), 3.0);
        assert_eq!(edited.get(FaceId(9)), 10.0);
        assert_eq!(edited.get(FaceId(0)), 1.0);
        assert_eq!(field.get(FaceId(2)), 1.0);
    }

    #[test]
    fn test_bump_is_local_and_peaks_at_center() {
        let sphere = GeodesicSphere::build(1.0, 642).expect("sphere builds");
        let tables = MeshTables::new(Arc::new(sphere.mesh));
        let field = tables.zeros::<OnFaces>();
        let bumped = add_bump(&field, &tables, DVec3::X, 0.4, 5.0);

        let peak = tables.nearest_face(DVec3::X);
        assert_eq!(bumped.max(), bumped.at(peak));
        assert!(bumped.at(peak) > 4.0);
        assert_eq!(bumped.at(tables.nearest_face(-DVec3::X)), 0.0);
        assert!(bumped.min() >= 0.0);
    }
}
