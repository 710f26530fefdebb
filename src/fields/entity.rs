//! Entity kinds a field can live on.

use std::fmt::Debug;

use crate::geometry::{FaceId, Polyhedron, VertexId};

/// The kind of mesh entity a field is indexed by.
///
/// Implemented by zero-sized markers so a face field and a vertex field are
/// distinct types even though both are dense arrays.
pub trait Entity: Copy + Debug + Send + Sync + 'static {
    /// Id type used to address one entity.
    type Id: Copy + Debug;

    /// Plural name for diagnostics.
    const NAME: &'static str;

    fn count(mesh: &Polyhedron) -> usize;

    fn index(id: Self::Id) -> usize;

    fn id(index: usize) -> Self::Id;
}

/// Values stored per face (cell centers).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OnFaces;

/// Values stored per vertex (cell corners).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OnVertices;

impl Entity for OnFaces {
    type Id = FaceId;
    const NAME: &'static str = "faces";

    fn count(mesh: &Polyhedron) -> usize {
        mesh.num_faces()
    }

    fn index(id: FaceId) -> usize {
        id.index()
    }

    fn id(index: usize) -> FaceId {
        FaceId(index)
    }
}

impl Entity for OnVertices {
    type Id = VertexId;
    const NAME: &'static str = "vertices";

    fn count(mesh: &Polyhedron) -> usize {
        mesh.num_vertices()
    }

    fn index(id: VertexId) -> usize {
        id.index()
    }

    fn id(index: usize) -> VertexId {
        VertexId(index)
    }
}
