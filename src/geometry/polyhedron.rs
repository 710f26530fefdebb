//! Closed polyhedral meshes with full incidence information.
//!
//! A [`Polyhedron`] is built from a list of faces given as vertex positions.
//! Construction deduplicates vertices by value, derives the edge set, sorts
//! every incidence list anticlockwise (viewed from outside the sphere) and
//! assigns stable zero-based indices in first-seen order.
//!
//! Ordering conventions relied on by the numerical operators:
//! - `face.vertices()[k]` runs anticlockwise around the face.
//! - `face_edges(f)[k]` joins vertex `k` and vertex `k + 1` of the face.
//! - `vertex_faces(v)` runs anticlockwise around the vertex, and
//!   `vertex_edges(v)[k]` is the edge shared by faces `k` and `k + 1`.
//! - `edge_faces(e)[0]` traverses the edge from `a` to `b` when walking its
//!   vertices anticlockwise; `edge_faces(e)[1]` traverses it from `b` to `a`.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use glam::DVec3;
use rustc_hash::FxHashMap;

use super::ordering::AngularOrder;
use super::sphere::arc_length;
use crate::error::GeometryError;

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a constructed mesh, used to reject arithmetic between
/// fields from different meshes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

impl MeshId {
    fn fresh() -> Self {
        MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Stable index of a vertex within its mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// Stable index of an edge within its mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// Stable index of a face within its mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub usize);

impl VertexId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl FaceId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Bit pattern of a position, with -0.0 folded into +0.0.
type PositionKey = [u64; 3];

fn position_key(p: DVec3) -> PositionKey {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}

/// A mesh vertex. Two vertices are the same vertex iff their positions are
/// bitwise equal.
#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    pub position: DVec3,
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        position_key(self.position) == position_key(other.position)
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        position_key(self.position).hash(state);
    }
}

/// An unordered pair of vertices, stored with the smaller id first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    a: VertexId,
    b: VertexId,
}

impl Edge {
    pub fn new(a: VertexId, b: VertexId) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    /// Endpoints with the smaller id first.
    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.a, self.b)
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.a == v || self.b == v
    }

    /// The endpoint that is not `v`.
    pub fn other(&self, v: VertexId) -> VertexId {
        if self.a == v {
            self.b
        } else {
            self.a
        }
    }
}

/// A cyclic sequence of vertices, stored anticlockwise as seen from outside.
/// Equality compares the vertex sets, not the rotation.
#[derive(Clone, Debug)]
pub struct Face {
    vertices: Vec<VertexId>,
}

impl Face {
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn sorted_ids(&self) -> Vec<VertexId> {
        let mut ids = self.vertices.clone();
        ids.sort_unstable();
        ids
    }
}

impl PartialEq for Face {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.sorted_ids() == other.sorted_ids()
    }
}

impl Eq for Face {}

/// A closed polyhedron with vertex, edge and face incidence.
#[derive(Debug, Clone)]
pub struct Polyhedron {
    id: MeshId,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    vertex_edges: Vec<Vec<EdgeId>>,
    vertex_faces: Vec<Vec<FaceId>>,
    face_edges: Vec<Vec<EdgeId>>,
    edge_faces: Vec<[FaceId; 2]>,
    vertex_lookup: FxHashMap<PositionKey, VertexId>,
    edge_lookup: FxHashMap<Edge, EdgeId>,
}

impl Polyhedron {
    /// Build a polyhedron from faces given as vertex positions.
    ///
    /// The vertex order within each input face does not matter; faces are
    /// re-sorted anticlockwise around their centroid.
    pub fn from_faces(faces: &[Vec<DVec3>]) -> Result<Self, GeometryError> {
        if faces.is_empty() {
            return Err(GeometryError::EmptyMesh);
        }

        // Step 1: deduplicate vertices by value, in first-seen order
        let mut vertices: Vec<Vertex> = Vec::new();
        let mut vertex_lookup: FxHashMap<PositionKey, VertexId> =
            FxHashMap::with_capacity_and_hasher(faces.len() * 2, Default::default());

        let mut face_list: Vec<Face> = Vec::with_capacity(faces.len());
        for (face_idx, positions) in faces.iter().enumerate() {
            let mut ids: Vec<VertexId> = Vec::with_capacity(positions.len());
            for &p in positions {
                let id = *vertex_lookup.entry(position_key(p)).or_insert_with(|| {
                    vertices.push(Vertex { position: p });
                    VertexId(vertices.len() - 1)
                });
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            if ids.len() < 3 {
                return Err(GeometryError::FaceTooSmall {
                    face: face_idx,
                    len: ids.len(),
                });
            }

            let centroid = ids
                .iter()
                .map(|id| vertices[id.0].position)
                .sum::<DVec3>()
                / ids.len() as f64;
            AngularOrder::new(centroid, centroid)
                .sort_by_position(&mut ids, |id| vertices[id.0].position);

            face_list.push(Face { vertices: ids });
        }

        // Step 2: edges from consecutive vertex pairs, with oriented face slots
        let mut edges: Vec<Edge> = Vec::new();
        let mut edge_lookup: FxHashMap<Edge, EdgeId> =
            FxHashMap::with_capacity_and_hasher(faces.len() * 3, Default::default());
        let mut edge_slots: Vec<[Option<FaceId>; 2]> = Vec::new();
        let mut edge_counts: Vec<usize> = Vec::new();
        let mut face_edges: Vec<Vec<EdgeId>> = Vec::with_capacity(face_list.len());

        for (face_idx, face) in face_list.iter().enumerate() {
            let n = face.len();
            let mut ids = Vec::with_capacity(n);
            for k in 0..n {
                let from = face.vertices[k];
                let to = face.vertices[(k + 1) % n];
                let edge = Edge::new(from, to);
                let edge_id = *edge_lookup.entry(edge).or_insert_with(|| {
                    edges.push(edge);
                    edge_slots.push([None, None]);
                    edge_counts.push(0);
                    EdgeId(edges.len() - 1)
                });

                edge_counts[edge_id.0] += 1;
                let slot = if from == edge.a { 0 } else { 1 };
                if edge_slots[edge_id.0][slot].is_some() {
                    return Err(GeometryError::InconsistentWinding {
                        a: edge.a.0,
                        b: edge.b.0,
                    });
                }
                edge_slots[edge_id.0][slot] = Some(FaceId(face_idx));
                ids.push(edge_id);
            }
            face_edges.push(ids);
        }

        let mut edge_faces: Vec<[FaceId; 2]> = Vec::with_capacity(edges.len());
        for (i, slots) in edge_slots.iter().enumerate() {
            match slots {
                [Some(left), Some(right)] => edge_faces.push([*left, *right]),
                _ => {
                    return Err(GeometryError::NonManifoldEdge {
                        a: edges[i].a.0,
                        b: edges[i].b.0,
                        faces: edge_counts[i],
                    })
                }
            }
        }

        // Step 3: faces around each vertex, sorted anticlockwise
        let mut vertex_faces: Vec<Vec<FaceId>> = vec![Vec::new(); vertices.len()];
        for (face_idx, face) in face_list.iter().enumerate() {
            for v in &face.vertices {
                vertex_faces[v.0].push(FaceId(face_idx));
            }
        }

        let centroids: Vec<DVec3> = face_list
            .iter()
            .map(|face| {
                face.vertices
                    .iter()
                    .map(|v| vertices[v.0].position)
                    .sum::<DVec3>()
                    / face.len() as f64
            })
            .collect();

        for (v, fan) in vertex_faces.iter_mut().enumerate() {
            AngularOrder::around(vertices[v].position)
                .sort_by_position(fan, |f| centroids[f.0]);
        }

        // Step 4: the k-th edge around a vertex separates its k-th and (k+1)-th faces
        let mut vertex_edge_candidates: Vec<Vec<EdgeId>> = vec![Vec::new(); vertices.len()];
        for (i, edge) in edges.iter().enumerate() {
            vertex_edge_candidates[edge.a.0].push(EdgeId(i));
            vertex_edge_candidates[edge.b.0].push(EdgeId(i));
        }

        let mut vertex_edges: Vec<Vec<EdgeId>> = Vec::with_capacity(vertices.len());
        for (v, fan) in vertex_faces.iter().enumerate() {
            let n = fan.len();
            if vertex_edge_candidates[v].len() != n {
                return Err(GeometryError::OpenFan { vertex: v });
            }
            let mut ordered = Vec::with_capacity(n);
            for k in 0..n {
                let (f0, f1) = (fan[k], fan[(k + 1) % n]);
                let shared = vertex_edge_candidates[v].iter().copied().find(|e| {
                    let [l, r] = edge_faces[e.0];
                    (l == f0 && r == f1) || (l == f1 && r == f0)
                });
                match shared {
                    Some(e) => ordered.push(e),
                    None => return Err(GeometryError::OpenFan { vertex: v }),
                }
            }
            vertex_edges.push(ordered);
        }

        let polyhedron = Self {
            id: MeshId::fresh(),
            vertices,
            edges,
            faces: face_list,
            vertex_edges,
            vertex_faces,
            face_edges,
            edge_faces,
            vertex_lookup,
            edge_lookup,
        };

        log::trace!(
            "Built polyhedron {:?}: V={} E={} F={}",
            polyhedron.id,
            polyhedron.num_vertices(),
            polyhedron.num_edges(),
            polyhedron.num_faces()
        );

        Ok(polyhedron)
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// `V - E + F`, which is 2 for every closed genus-0 mesh.
    pub fn euler_characteristic(&self) -> i64 {
        self.num_vertices() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len()).map(VertexId)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len()).map(EdgeId)
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> {
        (0..self.faces.len()).map(FaceId)
    }

    pub fn vertex(&self, v: VertexId) -> &Vertex {
        &self.vertices[v.0]
    }

    pub fn edge(&self, e: EdgeId) -> &Edge {
        &self.edges[e.0]
    }

    pub fn face(&self, f: FaceId) -> &Face {
        &self.faces[f.0]
    }

    pub fn position(&self, v: VertexId) -> DVec3 {
        self.vertices[v.0].position
    }

    /// Edges around a vertex, anticlockwise.
    pub fn vertex_edges(&self, v: VertexId) -> &[EdgeId] {
        &self.vertex_edges[v.0]
    }

    /// Faces around a vertex, anticlockwise.
    pub fn vertex_faces(&self, v: VertexId) -> &[FaceId] {
        &self.vertex_faces[v.0]
    }

    /// Edges of a face; edge `k` joins vertices `k` and `k + 1`.
    pub fn face_edges(&self, f: FaceId) -> &[EdgeId] {
        &self.face_edges[f.0]
    }

    /// The two faces of an edge; see the module docs for orientation.
    pub fn edge_faces(&self, e: EdgeId) -> [FaceId; 2] {
        self.edge_faces[e.0]
    }

    /// Faces adjacent to `f`, in the same order as its edges.
    pub fn face_neighbors(&self, f: FaceId) -> Vec<FaceId> {
        self.face_edges[f.0]
            .iter()
            .map(|e| {
                let [l, r] = self.edge_faces[e.0];
                if l == f {
                    r
                } else {
                    l
                }
            })
            .collect()
    }

    /// Look up a vertex by its exact position.
    pub fn find_vertex(&self, position: DVec3) -> Option<VertexId> {
        self.vertex_lookup.get(&position_key(position)).copied()
    }

    /// Look up the edge joining two vertices, in either order.
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_lookup.get(&Edge::new(a, b)).copied()
    }

    /// Face positions in their stored (anticlockwise) order.
    pub fn face_positions(&self, f: FaceId) -> Vec<DVec3> {
        self.faces[f.0]
            .vertices
            .iter()
            .map(|v| self.vertices[v.0].position)
            .collect()
    }

    /// All faces as position lists, suitable for rebuilding a mesh.
    pub fn all_face_positions(&self) -> Vec<Vec<DVec3>> {
        self.face_ids().map(|f| self.face_positions(f)).collect()
    }

    /// Mean of the face's vertex positions.
    pub fn face_centroid(&self, f: FaceId) -> DVec3 {
        let face = &self.faces[f.0];
        face.vertices
            .iter()
            .map(|v| self.vertices[v.0].position)
            .sum::<DVec3>()
            / face.len() as f64
    }

    /// Face centroid pushed out to the face's mean vertex radius.
    pub fn face_center(&self, f: FaceId) -> DVec3 {
        let face = &self.faces[f.0];
        let radius = face
            .vertices
            .iter()
            .map(|v| self.vertices[v.0].position.length())
            .sum::<f64>()
            / face.len() as f64;
        self.face_centroid(f).normalize_or_zero() * radius
    }

    /// Midpoint of the straight segment joining an edge's endpoints.
    pub fn edge_midpoint(&self, e: EdgeId) -> DVec3 {
        let edge = self.edges[e.0];
        0.5 * (self.position(edge.a) + self.position(edge.b))
    }

    /// Geodesic length of an edge.
    pub fn edge_length(&self, e: EdgeId) -> f64 {
        let edge = self.edges[e.0];
        arc_length(self.position(edge.a), self.position(edge.b))
    }

    /// Mean distance of the vertices from the origin.
    pub fn mean_radius(&self) -> f64 {
        if self.vertices.is_empty() {
            return 0.0;
        }
        self.vertices.iter().map(|v| v.position.length()).sum::<f64>()
            / self.vertices.len() as f64
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Axis-aligned cube with corners at (+-1, +-1, +-1).
    pub(crate) fn cube() -> Polyhedron {
        let c = |x: f64, y: f64, z: f64| DVec3::new(x, y, z);
        let faces = vec![
            vec![c(1., -1., -1.), c(1., 1., -1.), c(1., 1., 1.), c(1., -1., 1.)],
            vec![c(-1., -1., -1.), c(-1., -1., 1.), c(-1., 1., 1.), c(-1., 1., -1.)],
            vec![c(-1., 1., -1.), c(-1., 1., 1.), c(1., 1., 1.), c(1., 1., -1.)],
            vec![c(-1., -1., -1.), c(1., -1., -1.), c(1., -1., 1.), c(-1., -1., 1.)],
            vec![c(-1., -1., 1.), c(1., -1., 1.), c(1., 1., 1.), c(-1., 1., 1.)],
            // Deliberately scrambled input order
            vec![c(1., 1., -1.), c(-1., -1., -1.), c(1., -1., -1.), c(-1., 1., -1.)],
        ];
        Polyhedron::from_faces(&faces).expect("cube should build")
    }

    #[test]
    fn test_cube_counts() {
        let cube = cube();
        assert_eq!(cube.num_vertices(), 8);
        assert_eq!(cube.num_edges(), 12);
        assert_eq!(cube.num_faces(), 6);
        assert_eq!(cube.euler_characteristic(), 2);
    }

    #[test]
    fn test_faces_wound_anticlockwise_from_outside() {
        let cube = cube();
        for f in cube.face_ids() {
            let p = cube.face_positions(f);
            let normal = (p[1] - p[0]).cross(p[2] - p[1]);
            assert!(
                normal.dot(cube.face_centroid(f)) > 0.0,
                "face {:?} is wound clockwise",
                f
            );
        }
    }

    #[test]
    fn test_face_edges_follow_vertices() {
        let cube = cube();
        for f in cube.face_ids() {
            let verts = cube.face(f).vertices();
            for (k, &e) in cube.face_edges(f).iter().enumerate() {
                let edge = cube.edge(e);
                assert!(edge.contains(verts[k]));
                assert!(edge.contains(verts[(k + 1) % verts.len()]));
            }
        }
    }

    #[test]
    fn test_edge_face_orientation() {
        let cube = cube();
        for e in cube.edge_ids() {
            let (a, b) = cube.edge(e).endpoints();
            let [left, right] = cube.edge_faces(e);
            assert_ne!(left, right);

            let traverses = |f: FaceId, from: VertexId, to: VertexId| {
                let v = cube.face(f).vertices();
                (0..v.len()).any(|k| v[k] == from && v[(k + 1) % v.len()] == to)
            };
            assert!(traverses(left, a, b));
            assert!(traverses(right, b, a));
        }
    }

    #[test]
    fn test_vertex_edges_interleave_faces() {
        let cube = cube();
        for v in cube.vertex_ids() {
            let fan = cube.vertex_faces(v);
            let spokes = cube.vertex_edges(v);
            assert_eq!(fan.len(), 3);
            assert_eq!(spokes.len(), 3);
            for k in 0..fan.len() {
                let faces = cube.edge_faces(spokes[k]);
                assert!(faces.contains(&fan[k]));
                assert!(faces.contains(&fan[(k + 1) % fan.len()]));
            }
        }
    }

    #[test]
    fn test_vertex_identity_by_value() {
        let cube = cube();
        let v = cube.find_vertex(DVec3::new(1.0, 1.0, 1.0)).expect("corner exists");
        assert_eq!(cube.vertex(v), &Vertex { position: DVec3::new(1.0, 1.0, 1.0) });
        assert_eq!(cube.find_vertex(DVec3::new(0.5, 1.0, 1.0)), None);
    }

    #[test]
    fn test_edge_and_face_equality() {
        assert_eq!(Edge::new(VertexId(3), VertexId(1)), Edge::new(VertexId(1), VertexId(3)));

        let a = Face { vertices: vec![VertexId(0), VertexId(1), VertexId(2)] };
        let b = Face { vertices: vec![VertexId(2), VertexId(0), VertexId(1)] };
        let c = Face { vertices: vec![VertexId(2), VertexId(0), VertexId(3)] };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_open_mesh_rejected() {
        let faces = vec![vec![DVec3::X, DVec3::Y, DVec3::Z]];
        let err = Polyhedron::from_faces(&faces).unwrap_err();
        assert!(matches!(err, GeometryError::NonManifoldEdge { faces: 1, .. }));
    }

    #[test]
    fn test_degenerate_face_rejected() {
        let faces = vec![vec![DVec3::X, DVec3::X, DVec3::Y]];
        let err = Polyhedron::from_faces(&faces).unwrap_err();
        assert_eq!(err, GeometryError::FaceTooSmall { face: 0, len: 2 });
    }

    #[test]
    fn test_find_edge_either_order() {
        let cube = cube();
        for e in cube.edge_ids() {
            let (a, b) = cube.edge(e).endpoints();
            assert_eq!(cube.find_edge(a, b), Some(e));
            assert_eq!(cube.find_edge(b, a), Some(e));
        }
        // Opposite corners of a face share no edge
        let v = cube.face(FaceId(0)).vertices();
        assert_eq!(cube.find_edge(v[0], v[2]), None);
    }

    #[test]
    fn test_edge_midpoint_bisects_toward_faces() {
        let cube = cube();
        for e in cube.edge_ids() {
            let (a, b) = cube.edge(e).endpoints();
            let (pa, pb) = (cube.position(a), cube.position(b));
            let mid = cube.edge_midpoint(e);
            for f in cube.edge_faces(e) {
                let p = mid + 0.5 * (cube.face_centroid(f) - mid);
                assert!((p.distance(pa) - p.distance(pb)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_rebuild_from_face_positions() {
        let cube = cube();
        let rebuilt = Polyhedron::from_faces(&cube.all_face_positions()).expect("rebuilds");
        assert_eq!(rebuilt.num_vertices(), cube.num_vertices());
        assert_eq!(rebuilt.num_edges(), cube.num_edges());
        assert_eq!(rebuilt.num_faces(), cube.num_faces());
        assert_ne!(rebuilt.id(), cube.id());
    }

    #[test]
    fn test_mesh_ids_unique() {
        assert_ne!(cube().id(), cube().id());
    }
}
