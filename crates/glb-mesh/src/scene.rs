//! Local transform of the node that owns a mesh.

use serde::Serialize;

use crate::document::{Document, Node};

/// Translation, rotation (quaternion `[x, y, z, w]`) and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

impl Transform {
    /// Transform of a node. TRS properties take precedence; a node that only
    /// carries `matrix` is decomposed.
    pub fn from_node(node: &Node) -> Self {
        let has_trs = node.translation.is_some() || node.rotation.is_some() || node.scale.is_some();
        match node.matrix {
            Some(matrix) if !has_trs => Self::from_matrix(&matrix),
            _ => {
                let default = Self::default();
                Self {
                    translation: node.translation.unwrap_or(default.translation),
                    rotation: node.rotation.unwrap_or(default.rotation),
                    scale: node.scale.unwrap_or(default.scale),
                }
            }
        }
    }

    /// Decompose a column-major affine matrix. Shear is discarded.
    pub fn from_matrix(m: &[f32; 16]) -> Self {
        let translation = [m[12], m[13], m[14]];

        let column = |c: usize| [m[c * 4], m[c * 4 + 1], m[c * 4 + 2]];
        let length = |v: [f32; 3]| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        let (c0, c1, c2) = (column(0), column(1), column(2));
        let mut scale = [length(c0), length(c1), length(c2)];

        // A negative determinant means a mirrored basis; fold it into x.
        let det = c0[0] * (c1[1] * c2[2] - c1[2] * c2[1]) - c1[0] * (c0[1] * c2[2] - c0[2] * c2[1])
            + c2[0] * (c0[1] * c1[2] - c0[2] * c1[1]);
        if det < 0.0 {
            scale[0] = -scale[0];
        }

        // r[row][col] of the pure rotation.
        let mut r = [[0.0f32; 3]; 3];
        for (col, c) in [c0, c1, c2].iter().enumerate() {
            for row in 0..3 {
                r[row][col] = if scale[col] == 0.0 { 0.0 } else { c[row] / scale[col] };
            }
        }

        Self {
            translation,
            rotation: quaternion_from_rotation(&r),
            scale,
        }
    }

    /// Compose T * R * S into a column-major 4x4 matrix.
    pub fn to_matrix(&self) -> [f32; 16] {
        let [qx, qy, qz, qw] = self.rotation;
        let (xx, yy, zz) = (qx * qx, qy * qy, qz * qz);
        let (xy, xz, yz) = (qx * qy, qx * qz, qy * qz);
        let (wx, wy, wz) = (qw * qx, qw * qy, qw * qz);

        // Rotation matrix (row-major)
        let rot = [
            [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy)],
            [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx)],
            [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy)],
        ];

        let s = self.scale;
        let t = self.translation;
        [
            rot[0][0] * s[0], rot[1][0] * s[0], rot[2][0] * s[0], 0.0, //
            rot[0][1] * s[1], rot[1][1] * s[1], rot[2][1] * s[1], 0.0, //
            rot[0][2] * s[2], rot[1][2] * s[2], rot[2][2] * s[2], 0.0, //
            t[0], t[1], t[2], 1.0,
        ]
    }
}

fn quaternion_from_rotation(r: &[[f32; 3]; 3]) -> [f32; 4] {
    let trace = r[0][0] + r[1][1] + r[2][2];
    if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        [
            (r[2][1] - r[1][2]) / s,
            (r[0][2] - r[2][0]) / s,
            (r[1][0] - r[0][1]) / s,
            0.25 * s,
        ]
    } else if r[0][0] > r[1][1] && r[0][0] > r[2][2] {
        let s = (1.0 + r[0][0] - r[1][1] - r[2][2]).sqrt() * 2.0;
        [
            0.25 * s,
            (r[0][1] + r[1][0]) / s,
            (r[0][2] + r[2][0]) / s,
            (r[2][1] - r[1][2]) / s,
        ]
    } else if r[1][1] > r[2][2] {
        let s = (1.0 + r[1][1] - r[0][0] - r[2][2]).sqrt() * 2.0;
        [
            (r[0][1] + r[1][0]) / s,
            0.25 * s,
            (r[1][2] + r[2][1]) / s,
            (r[0][2] - r[2][0]) / s,
        ]
    } else {
        let s = (1.0 + r[2][2] - r[0][0] - r[1][1]).sqrt() * 2.0;
        [
            (r[0][2] + r[2][0]) / s,
            (r[1][2] + r[2][1]) / s,
            0.25 * s,
            (r[1][0] - r[0][1]) / s,
        ]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SceneResolver<'a> {
    document: &'a Document,
}

impl<'a> SceneResolver<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Transform of the first node referencing `mesh_index`, or `None` when
    /// no node does.
    pub fn resolve(&self, mesh_index: usize) -> Option<Transform> {
        self.document
            .node_for_mesh(mesh_index)
            .map(|(_, node)| Transform::from_node(node))
    }
}
