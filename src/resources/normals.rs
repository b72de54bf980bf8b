//! Flat normals for primitives that do not provide any.

use cgmath::{InnerSpace, Vector3};

use crate::pipelines::Topology;

const UP: [f32; 3] = [0.0, 1.0, 0.0];

/// Vertex triples of the triangles a topology encodes over `vertex_count`
/// vertices, first vertex first.
pub fn triangles(topology: Topology, vertex_count: usize) -> Vec<[usize; 3]> {
    match topology {
        Topology::TriangleList => (0..vertex_count / 3)
            .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
            .collect(),
        // every other strip triangle is flipped to keep the winding
        Topology::TriangleStrip => (0..vertex_count.saturating_sub(2))
            .map(|i| {
                if i % 2 == 0 {
                    [i, i + 1, i + 2]
                } else {
                    [i, i + 2, i + 1]
                }
            })
            .collect(),
        Topology::TriangleFan => (0..vertex_count.saturating_sub(2))
            .map(|i| [i + 1, i + 2, 0])
            .collect(),
        _ => Vec::new(),
    }
}

/// Unit normal of the triangle (p0, p1, p2), counter-clockwise front.
///
/// A degenerate triangle falls back to a vector perpendicular to the edge
/// `p0 -> p1` in the xy plane, and to the up vector when that is degenerate
/// too.
pub fn face_normal(p0: [f32; 3], p1: [f32; 3], p2: [f32; 3]) -> [f32; 3] {
    let origin = Vector3::from(p0);
    let edge = Vector3::from(p1) - origin;
    let normal = edge.cross(Vector3::from(p2) - origin);
    if normal.magnitude2() > 0.0 {
        return normal.normalize().into();
    }
    let perpendicular = Vector3::new(-edge.y, edge.x, 0.0);
    if perpendicular.magnitude2() > 0.0 {
        return perpendicular.normalize().into();
    }
    UP
}

/**
 * Fills `normals` with one flat normal per vertex of `positions`.
 *
 * Triangle lists get the face normal on all three corners, so the positions must already be
 * unshared. Strips and fans share vertices between triangles and only the leading vertex of
 * each triangle is written. Vertices no triangle writes keep the up vector.
 * Returns false for points and lines.
 */
pub fn generate(positions: &[[f32; 3]], normals: &mut Vec<[f32; 3]>, topology: Topology) -> bool {
    if !topology.is_triangles() {
        return false;
    }
    normals.clear();
    normals.resize(positions.len(), UP);

    for [i0, i1, i2] in triangles(topology, positions.len()) {
        let normal = face_normal(positions[i0], positions[i1], positions[i2]);
        normals[i0] = normal;
        if topology == Topology::TriangleList {
            normals[i1] = normal;
            normals[i2] = normal;
        }
    }
    true
}
