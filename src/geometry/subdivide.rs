//! Triangle subdivision and projection onto a sphere.

use glam::DVec3;

use super::Polyhedron;
use crate::error::GeometryError;

/// Midpoint of a chord, pushed out to the mean radius of its endpoints.
fn sphere_midpoint(a: DVec3, b: DVec3) -> DVec3 {
    let radius = 0.5 * (a.length() + b.length());
    (a + b).normalize_or_zero() * radius
}

/// Split every triangle into four by inserting one vertex per edge.
///
/// Each old face yields three corner triangles (an old vertex plus the two
/// adjacent midpoints) and one central triangle joining the midpoints.
pub fn subdivide(mesh: &Polyhedron) -> Result<Polyhedron, GeometryError> {
    // One midpoint per distinct edge, so shared edges agree on the new vertex
    let midpoints: Vec<DVec3> = mesh
        .edge_ids()
        .map(|e| {
            let (a, b) = mesh.edge(e).endpoints();
            sphere_midpoint(mesh.position(a), mesh.position(b))
        })
        .collect();

    let mut faces = Vec::with_capacity(mesh.num_faces() * 4);
    for f in mesh.face_ids() {
        let face = mesh.face(f);
        if face.len() != 3 {
            return Err(GeometryError::NotTriangular {
                face: f.index(),
                len: face.len(),
            });
        }

        let corners = face.vertices();
        let edges = mesh.face_edges(f);
        let mid = |k: usize| midpoints[edges[k % 3].index()];

        // Edge k joins corner k and corner k + 1
        for k in 0..3 {
            faces.push(vec![mesh.position(corners[k]), mid(k), mid(k + 2)]);
        }
        faces.push(vec![mid(0), mid(1), mid(2)]);
    }

    Polyhedron::from_faces(&faces)
}

/// Apply [`subdivide`] `levels` times.
pub fn subdivide_times(mesh: &Polyhedron, levels: u32) -> Result<Polyhedron, GeometryError> {
    let mut current = mesh.clone();
    for _ in 0..levels {
        current = subdivide(&current)?;
    }
    Ok(current)
}

fn project_vertex(index: usize, position: DVec3, radius: f64) -> Result<DVec3, GeometryError> {
    position
        .try_normalize()
        .map(|n| n * radius)
        .ok_or(GeometryError::DegenerateVertex { index, position })
}

/// Rescale every vertex to lie at `radius` from the origin.
///
/// Faces are rebuilt from the same vertices, so indices and incidence are
/// preserved. A vertex at the origin cannot be projected and is reported.
pub fn project_to_sphere(mesh: &Polyhedron, radius: f64) -> Result<Polyhedron, GeometryError> {
    let projected: Vec<DVec3> = mesh
        .vertex_ids()
        .map(|v| project_vertex(v.index(), mesh.position(v), radius))
        .collect::<Result<_, _>>()?;

    let faces: Vec<Vec<DVec3>> = mesh
        .faces()
        .iter()
        .map(|face| face.vertices().iter().map(|v| projected[v.index()]).collect())
        .collect();

    Polyhedron::from_faces(&faces)
}
