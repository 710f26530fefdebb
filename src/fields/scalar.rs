use std::marker::PhantomData;

use super::entity::Entity;
use super::Field;
use crate::error::FieldError;
use crate::geometry::{MeshId, Polyhedron};

/// A dense array of one scalar per entity of kind `E` on a specific mesh.
///
/// Fields are values: every arithmetic method allocates a new field and
/// leaves its inputs untouched, so a published field can be shared freely.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarField<E: Entity> {
    mesh: MeshId,
    values: Vec<f64>,
    _entity: PhantomData<E>,
}

impl<E: Entity> ScalarField<E> {
    /// Wrap `values`, checking there is exactly one per entity.
    pub fn from_values(mesh: &Polyhedron, values: Vec<f64>) -> Result<Self, FieldError> {
        let expected = E::count(mesh);
        if values.len() != expected {
            return Err(FieldError::LengthMismatch {
                entity: E::NAME,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self::from_raw(mesh.id(), values))
    }

    pub(crate) fn from_raw(mesh: MeshId, values: Vec<f64>) -> Self {
        Self {
            mesh,
            values,
            _entity: PhantomData,
        }
    }

    pub fn constant(mesh: &Polyhedron, value: f64) -> Self {
        Self::from_raw(mesh.id(), vec![value; E::count(mesh)])
    }

    pub fn zeros(mesh: &Polyhedron) -> Self {
        Self::constant(mesh, 0.0)
    }

    /// Build a field by evaluating `f` for every entity id.
    pub fn from_fn<F>(mesh: &Polyhedron, f: F) -> Self
    where
        F: Fn(E::Id) -> f64,
    {
        let values = (0..E::count(mesh)).map(|i| f(E::id(i))).collect();
        Self::from_raw(mesh.id(), values)
    }

    pub fn mesh_id(&self) -> MeshId {
        self.mesh
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Value for an entity id.
    pub fn get(&self, id: E::Id) -> f64 {
        self.values[E::index(id)]
    }

    /// Value at a raw array index.
    pub fn at(&self, index: usize) -> f64 {
        self.values[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    fn check_compatible(&self, other: &Self) {
        assert_eq!(
            self.mesh, other.mesh,
            "field arithmetic across meshes: {:?} vs {:?} ({})",
            self.mesh, other.mesh, E::NAME
        );
    }

    /// Checked counterpart of the mesh assertion used by the arithmetic methods.
    pub fn ensure_same_mesh(&self, other: &Self) -> Result<(), FieldError> {
        if self.mesh == other.mesh {
            Ok(())
        } else {
            Err(FieldError::MeshMismatch {
                left: self.mesh.0,
                right: other.mesh.0,
            })
        }
    }

    /// Apply `f` element-wise.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self::from_raw(self.mesh, self.values.iter().map(|&v| f(v)).collect())
    }

    /// Combine two fields element-wise. Panics if the meshes differ.
    pub fn zip_map<F>(&self, other: &Self, f: F) -> Self
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_compatible(other);
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Self::from_raw(self.mesh, values)
    }

    pub fn add(&self, other: &Self) -> Self {
        self.zip_map(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.zip_map(other, |a, b| a - b)
    }

    /// Element-wise product.
    pub fn mul(&self, other: &Self) -> Self {
        self.zip_map(other, |a, b| a * b)
    }

    pub fn scale(&self, k: f64) -> Self {
        self.map(|v| v * k)
    }

    pub fn offset(&self, k: f64) -> Self {
        self.map(|v| v + k)
    }

    pub fn neg(&self) -> Self {
        self.map(|v| -v)
    }

    /// `self + k * other`.
    pub fn add_scaled(&self, other: &Self, k: f64) -> Self {
        self.zip_map(other, |a, b| a + k * b)
    }

    /// Like [`ScalarField::add`] but reports a mesh mismatch instead of panicking.
    pub fn try_add(&self, other: &Self) -> Result<Self, FieldError> {
        self.ensure_same_mesh(other)?;
        Ok(self.add(other))
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum() / self.values.len() as f64
        }
    }

    /// Sum of `weights[i] * value[i]`, e.g. an area integral.
    pub fn weighted_sum(&self, weights: &[f64]) -> f64 {
        debug_assert_eq!(weights.len(), self.values.len());
        self.values.iter().zip(weights).map(|(v, w)| v * w).sum()
    }

    /// Root mean square of the values.
    pub fn rms(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        (self.values.iter().map(|v| v * v).sum::<f64>() / self.values.len() as f64).sqrt()
    }

    /// Copy of this field with `f` applied to the listed entities only.
    pub fn with_updates<F>(&self, ids: &[E::Id], f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        let mut values = self.values.clone();
        for &id in ids {
            let i = E::index(id);
            values[i] = f(values[i]);
        }
        Self::from_raw(self.mesh, values)
    }
}

impl<E: Entity> Field for ScalarField<E> {
    fn mesh_id(&self) -> MeshId {
        self.mesh
    }

    fn add_scaled(&self, other: &Self, k: f64) -> Self {
        ScalarField::add_scaled(self, other, k)
    }

    fn scale(&self, k: f64) -> Self {
        ScalarField::scale(self, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{OnFaces, OnVertices};
    use crate::geometry::{icosahedron, FaceId, VertexId};

    #[test]
    fn test_arithmetic() {
        let mesh = icosahedron().expect("icosahedron builds");
        let a = ScalarField::<OnFaces>::from_fn(&mesh, |f| f.index() as f64);
        let b = ScalarField::<OnFaces>::constant(&mesh, 2.0);

        assert_eq!(a.add(&b).get(FaceId(3)), 5.0);
        assert_eq!(a.sub(&b).get(FaceId(3)), 1.0);
        assert_eq!(a.mul(&b).get(FaceId(3)), 6.0);
        assert_eq!(a.scale(0.5).get(FaceId(4)), 2.0);
        assert_eq!(a.add_scaled(&b, 3.0).get(FaceId(1)), 7.0);
        assert_eq!(a.len(), 20);
        assert_eq!(a.sum(), 190.0);
        assert_eq!(a.max(), 19.0);
        assert_eq!(a.min(), 0.0);
    }

    #[test]
    fn test_inputs_untouched() {
        let mesh = icosahedron().expect("icosahedron builds");
        let a = ScalarField::<OnVertices>::constant(&mesh, 1.0);
        let b = a.with_updates(&[VertexId(0), VertexId(5)], |v| v + 10.0);
        assert_eq!(a.get(VertexId(0)), 1.0);
        assert_eq!(b.get(VertexId(0)), 11.0);
        assert_eq!(b.get(VertexId(5)), 11.0);
        assert_eq!(b.get(VertexId(1)), 1.0);
    }

    #[test]
    #[should_panic(expected = "field arithmetic across meshes")]
    fn test_mismatched_meshes_panic() {
        let m1 = icosahedron().expect("icosahedron builds");
        let m2 = icosahedron().expect("icosahedron builds");
        let a = ScalarField::<OnFaces>::zeros(&m1);
        let b = ScalarField::<OnFaces>::zeros(&m2);
        let _ = a.add(&b);
    }

    #[test]
    fn test_mismatched_meshes_checked() {
        let m1 = icosahedron().expect("icosahedron builds");
        let m2 = icosahedron().expect("icosahedron builds");
        let a = ScalarField::<OnFaces>::zeros(&m1);
        let b = ScalarField::<OnFaces>::zeros(&m2);
        assert!(matches!(a.try_add(&b), Err(FieldError::MeshMismatch { .. })));
    }

    #[test]
    fn test_from_values_checks_length() {
        let mesh = icosahedron().expect("icosahedron builds");
        let err = ScalarField::<OnVertices>::from_values(&mesh, vec![0.0; 20]).unwrap_err();
        assert_eq!(
            err,
            FieldError::LengthMismatch {
                entity: "vertices",
                expected: 12,
                actual: 20
            }
        );
    }
}
