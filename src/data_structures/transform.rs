//! Node transforms.
//!
//! glTF nodes carry either a column-major 4x4 matrix or a translation /
//! rotation / scale triple. Both are turned into a double precision
//! `cgmath::Matrix4`; identities are detected up front so the traversal can
//! emit plain groups instead of matrix nodes.

use cgmath::{Matrix4, One, Quaternion, Vector3, Vector4};

use crate::data_structures::document::Node;

/// Translation, rotation (as quaternion), and scale of a node.
///
/// Components that are absent or have the wrong number of elements stay at
/// their identity value.
#[derive(Clone, Debug, PartialEq)]
pub struct Trs {
    pub translation: Vector3<f64>,
    pub rotation: Quaternion<f64>,
    pub scale: Vector3<f64>,
}

impl Trs {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_node(node: &Node) -> Self {
        let mut trs = Self::new();
        if let [x, y, z] = node.translation[..] {
            trs.translation = Vector3::new(x, y, z);
        }
        // glTF stores quaternions as [x, y, z, w]
        if let [x, y, z, w] = node.rotation[..] {
            trs.rotation = Quaternion::new(w, x, y, z);
        }
        if let [x, y, z] = node.scale[..] {
            trs.scale = Vector3::new(x, y, z);
        }
        trs
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::new()
    }

    /// Standard TRS composition: translation * rotation * scale.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Trs {
    fn default() -> Self {
        Self::new()
    }
}

/// True for a 16 element matrix with ones on the diagonal and zeroes
/// everywhere else.
pub fn is_gltf_identity(matrix: &[f64]) -> bool {
    matrix.len() == 16
        && matrix.iter().enumerate().all(|(i, &value)| {
            if i % 5 == 0 {
                value == 1.0
            } else {
                value == 0.0
            }
        })
}

/// Converts a column-major glTF matrix; anything but 16 values is rejected.
pub fn matrix_from_gltf(matrix: &[f64]) -> Option<Matrix4<f64>> {
    if matrix.len() != 16 {
        return None;
    }
    let column = |c: usize| {
        Vector4::new(
            matrix[c * 4],
            matrix[c * 4 + 1],
            matrix[c * 4 + 2],
            matrix[c * 4 + 3],
        )
    };
    Some(Matrix4::from_cols(column(0), column(1), column(2), column(3)))
}

/// The local transform of a node, or `None` when it is an identity and the
/// node can be represented by a plain group.
pub fn node_transform(node: &Node) -> Option<Matrix4<f64>> {
    if is_gltf_identity(&node.matrix) {
        return None;
    }
    if let Some(matrix) = matrix_from_gltf(&node.matrix) {
        return Some(matrix);
    }
    let trs = Trs::from_node(node);
    if trs.is_identity() {
        None
    } else {
        Some(trs.to_matrix())
    }
}
