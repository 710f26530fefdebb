//! Typed per-entity fields and the simulation state bundle.
//!
//! Scalars usually live on faces (cell centers) and vectors on vertices
//! (cell corners). The entity kind is part of the type; the mesh identity is
//! checked at runtime, and mixing meshes is a programmer error that panics.

pub mod edit;
mod entity;
mod prognostic;
mod scalar;
mod vector;

pub use entity::{Entity, OnFaces, OnVertices};
pub use prognostic::{Derivatives, FieldRef, FieldSummary, PrognosticFields};
pub use scalar::ScalarField;
pub use vector::VectorField;

use crate::geometry::MeshId;

/// Operations the time integrator needs from a field.
pub trait Field: Clone + Send + Sync {
    fn mesh_id(&self) -> MeshId;

    /// `self + k * other`, as a new field.
    fn add_scaled(&self, other: &Self, k: f64) -> Self;

    fn scale(&self, k: f64) -> Self;
}

/// Scalar field on faces.
pub type FaceScalar = ScalarField<OnFaces>;
/// Scalar field on vertices.
pub type VertexScalar = ScalarField<OnVertices>;
/// Vector field on faces.
pub type FaceVector = VectorField<OnFaces>;
/// Vector field on vertices.
pub type VertexVector = VectorField<OnVertices>;
