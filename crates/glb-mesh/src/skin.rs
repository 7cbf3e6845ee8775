//! Skeleton binding for the node that owns a mesh.

use serde::Serialize;

use crate::accessor::{AccessorResolver, ComponentType, ElementType};
use crate::attributes::check_layout;
use crate::error::{DecodeError, Result};
use crate::options::ComponentPolicy;

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, //
];

/// One joint of a skin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoneRecord {
    /// Node index of the joint.
    pub joint_id: usize,
    /// Position of the joint within `skin.joints`.
    pub joint_index: usize,
    pub name: Option<String>,
    pub translation: Option<[f32; 3]>,
    pub scale: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub children: Option<Vec<usize>>,
    /// Column-major, exactly as stored in the BIN chunk.
    pub inverse_bind_matrix: [f32; 16],
}

#[derive(Debug, Clone, Copy)]
pub struct SkinResolver<'a> {
    resolver: AccessorResolver<'a>,
}

impl<'a> SkinResolver<'a> {
    pub fn new(resolver: AccessorResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Bones of the skin on the first node that references `mesh_index`, or
    /// `None` when no node owns the mesh or the owner has no skin.
    pub fn resolve(&self, mesh_index: usize) -> Result<Option<Vec<BoneRecord>>> {
        let document = self.resolver.document();
        let Some((_, node)) = document.node_for_mesh(mesh_index) else {
            return Ok(None);
        };
        let Some(skin_index) = node.skin else {
            return Ok(None);
        };
        self.resolve_skin(skin_index).map(Some)
    }

    pub fn resolve_skin(&self, skin_index: usize) -> Result<Vec<BoneRecord>> {
        let document = self.resolver.document();
        let skin = document.skin(skin_index)?;

        let matrices = match skin.inverse_bind_matrices {
            Some(accessor) => {
                let view = self.resolver.view(accessor)?;
                check_layout(
                    "inverseBindMatrices",
                    &view,
                    ComponentType::Float,
                    ElementType::Mat4,
                    ComponentPolicy::Strict,
                )?;
                if view.count() < skin.joints.len() {
                    return Err(DecodeError::InvalidGltf(format!(
                        "Skin {} has {} joints but {} inverse bind matrices",
                        skin_index,
                        skin.joints.len(),
                        view.count()
                    )));
                }
                view.decode().into_f32().ok_or_else(|| {
                    DecodeError::InvalidGltf(format!(
                        "Skin {} inverse bind matrices are not FLOAT",
                        skin_index
                    ))
                })?
            }
            None => IDENTITY.repeat(skin.joints.len()),
        };

        let mut bones = Vec::with_capacity(skin.joints.len());
        for ((joint_index, &joint_id), matrix) in skin
            .joints
            .iter()
            .enumerate()
            .zip(matrices.chunks_exact(16))
        {
            let node = document.node(joint_id)?;
            let mut inverse_bind_matrix = [0.0f32; 16];
            inverse_bind_matrix.copy_from_slice(matrix);

            bones.push(BoneRecord {
                joint_id,
                joint_index,
                name: node.name.clone(),
                translation: node.translation,
                scale: node.scale,
                rotation: node.rotation,
                children: node.children.clone(),
                inverse_bind_matrix,
            });
        }

        tracing::debug!(skin = skin_index, bones = bones.len(), "resolved skin");
        Ok(bones)
    }
}
