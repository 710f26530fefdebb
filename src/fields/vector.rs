use std::marker::PhantomData;

use glam::DVec3;

use super::entity::Entity;
use super::{Field, ScalarField};
use crate::error::FieldError;
use crate::geometry::{MeshId, Polyhedron};

/// A dense array of one 3-vector per entity of kind `E` on a specific mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorField<E: Entity> {
    mesh: MeshId,
    values: Vec<DVec3>,
    _entity: PhantomData<E>,
}

impl<E: Entity> VectorField<E> {
    pub fn from_values(mesh: &Polyhedron, values: Vec<DVec3>) -> Result<Self, FieldError> {
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

    pub(crate) fn from_raw(mesh: MeshId, values: Vec<DVec3>) -> Self {
        Self {
            mesh,
            values,
            _entity: PhantomData,
        }
    }

    pub fn constant(mesh: &Polyhedron, value: DVec3) -> Self {
        Self::from_raw(mesh.id(), vec![value; E::count(mesh)])
    }

    pub fn zeros(mesh: &Polyhedron) -> Self {
        Self::constant(mesh, DVec3::ZERO)
    }

    pub fn from_fn<F>(mesh: &Polyhedron, f: F) -> Self
    where
        F: Fn(E::Id) -> DVec3,
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

    pub fn values(&self) -> &[DVec3] {
        &self.values
    }

    pub fn get(&self, id: E::Id) -> DVec3 {
        self.values[E::index(id)]
    }

    pub fn at(&self, index: usize) -> DVec3 {
        self.values[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.values.iter().copied()
    }

    fn check_compatible(&self, other_mesh: MeshId) {
        assert_eq!(
            self.mesh, other_mesh,
            "field arithmetic across meshes: {:?} vs {:?} ({})",
            self.mesh, other_mesh, E::NAME
        );
    }

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

    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(DVec3) -> DVec3,
    {
        Self::from_raw(self.mesh, self.values.iter().map(|&v| f(v)).collect())
    }

    pub fn zip_map<F>(&self, other: &Self, f: F) -> Self
    where
        F: Fn(DVec3, DVec3) -> DVec3,
    {
        self.check_compatible(other.mesh);
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

    pub fn scale(&self, k: f64) -> Self {
        self.map(|v| v * k)
    }

    pub fn neg(&self) -> Self {
        self.map(|v| -v)
    }

    pub fn add_scaled(&self, other: &Self, k: f64) -> Self {
        self.zip_map(other, |a, b| a + b * k)
    }

    pub fn try_add(&self, other: &Self) -> Result<Self, FieldError> {
        self.ensure_same_mesh(other)?;
        Ok(self.add(other))
    }

    /// Multiply each vector by the matching scalar.
    pub fn scale_by(&self, factors: &ScalarField<E>) -> Self {
        self.check_compatible(factors.mesh_id());
        let values = self
            .values
            .iter()
            .zip(factors.values())
            .map(|(&v, &k)| v * k)
            .collect();
        Self::from_raw(self.mesh, values)
    }

    /// Element-wise dot product.
    pub fn dot(&self, other: &Self) -> ScalarField<E> {
        self.check_compatible(other.mesh);
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a.dot(*b))
            .collect();
        ScalarField::from_raw(self.mesh, values)
    }

    /// Element-wise cross product `self x other`.
    pub fn cross(&self, other: &Self) -> Self {
        self.zip_map(other, |a, b| a.cross(b))
    }

    /// Element-wise vector length.
    pub fn norm(&self) -> ScalarField<E> {
        ScalarField::from_raw(self.mesh, self.values.iter().map(|v| v.length()).collect())
    }

    pub fn norm_squared(&self) -> ScalarField<E> {
        ScalarField::from_raw(
            self.mesh,
            self.values.iter().map(|v| v.length_squared()).collect(),
        )
    }

    /// Plain sum of all vectors.
    pub fn sum(&self) -> DVec3 {
        self.values.iter().copied().sum()
    }

    pub fn weighted_sum(&self, weights: &[f64]) -> DVec3 {
        debug_assert_eq!(weights.len(), self.values.len());
        self.values.iter().zip(weights).map(|(&v, &w)| v * w).sum()
    }

    /// Largest vector length.
    pub fn max_norm(&self) -> f64 {
        self.values.iter().map(|v| v.length()).fold(0.0, f64::max)
    }

    pub fn with_updates<F>(&self, ids: &[E::Id], f: F) -> Self
    where
        F: Fn(DVec3) -> DVec3,
    {
        let mut values = self.values.clone();
        for &id in ids {
            let i = E::index(id);
            values[i] = f(values[i]);
        }
        Self::from_raw(self.mesh, values)
    }
}

impl<E: Entity> Field for VectorField<E> {
    fn mesh_id(&self) -> MeshId {
        self.mesh
    }

    fn add_scaled(&self, other: &Self, k: f64) -> Self {
        VectorField::add_scaled(self, other, k)
    }

    fn scale(&self, k: f64) -> Self {
        VectorField::scale(self, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::OnVertices;
    use crate::geometry::{icosahedron, VertexId};

    #[test]
    fn test_products() {
        let mesh = icosahedron().expect("icosahedron builds");
        let x = VectorField::<OnVertices>::constant(&mesh, DVec3::X);
        let y = VectorField::<OnVertices>::constant(&mesh, DVec3::Y * 2.0);

        assert_eq!(x.cross(&y).get(VertexId(0)), DVec3::Z * 2.0);
        assert_eq!(x.dot(&y).get(VertexId(3)), 0.0);
        assert_eq!(y.norm().get(VertexId(7)), 2.0);
        assert_eq!(y.norm_squared().sum(), 4.0 * 12.0);
        assert_eq!(x.add(&y).sub(&x), y);
    }

    #[test]
    fn test_scale_by_scalar_field() {
        let mesh = icosahedron().expect("icosahedron builds");
        let v = VectorField::<OnVertices>::constant(&mesh, DVec3::ONE);
        let k = ScalarField::<OnVertices>::from_fn(&mesh, |id| id.index() as f64);
        let scaled = v.scale_by(&k);
        assert_eq!(scaled.get(VertexId(4)), DVec3::splat(4.0));
        assert_eq!(scaled.sum(), DVec3::splat(66.0));
    }

    #[test]
    #[should_panic(expected = "field arithmetic across meshes")]
    fn test_mismatched_meshes_panic() {
        let m1 = icosahedron().expect("icosahedron builds");
        let m2 = icosahedron().expect("icosahedron builds");
        let _ = VectorField::<OnVertices>::zeros(&m1).cross(&VectorField::zeros(&m2));
    }
}
