//! Mesh construction: icosahedron, subdivision, projection, duals.

mod dual;
mod ordering;
mod platonic;
mod polyhedron;
mod sphere;
mod subdivide;
pub mod validation;

pub use dual::*;
pub use ordering::AngularOrder;
pub use platonic::*;
pub use polyhedron::{Edge, EdgeId, Face, FaceId, MeshId, Polyhedron, Vertex, VertexId};
pub use sphere::*;
pub use subdivide::*;

#[cfg(test)]
pub(crate) use polyhedron::tests::cube;
