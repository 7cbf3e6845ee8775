//! Typed, read-only view over the glTF JSON document.
//!
//! The JSON text is parsed by `serde_json` into a generic [`Value`] tree; this
//! module maps the subset of that tree the mesh pipeline needs onto typed
//! structs and exposes range-checked lookups into each top-level array.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{DecodeError, Result};

// ============================================================================
// glTF JSON Schema (the subset used by mesh assembly)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GltfRoot {
    #[serde(default)]
    accessors: Vec<Accessor>,
    #[serde(default)]
    buffer_views: Vec<BufferView>,
    #[serde(default)]
    buffers: Vec<Buffer>,
    #[serde(default)]
    meshes: Vec<Mesh>,
    #[serde(default)]
    materials: Vec<Material>,
    #[serde(default)]
    textures: Vec<Texture>,
    #[serde(default)]
    images: Vec<Image>,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    skins: Vec<Skin>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    pub buffer_view: Option<usize>,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: u32,
    pub count: usize,
    /// `SCALAR`, `VEC2`, ... as written in the document.
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub normalized: bool,
    pub sparse: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    /// Set for external buffers; the GLB BIN chunk has none.
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mesh {
    pub name: Option<String>,
    #[serde(default)]
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Primitive {
    /// Semantic name to accessor index.
    #[serde(default)]
    pub attributes: BTreeMap<String, usize>,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    /// Morph targets; carried so their presence can be reported, never decoded.
    #[serde(default)]
    pub targets: Vec<Value>,
    #[serde(default)]
    pub extensions: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    pub normal_texture: Option<TextureInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    pub base_color_texture: Option<TextureInfo>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureInfo {
    pub index: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Texture {
    pub source: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub buffer_view: Option<usize>,
    pub mime_type: Option<String>,
    pub uri: Option<String>,
}

/// A node in the scene graph.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub name: Option<String>,
    /// Index into meshes array.
    pub mesh: Option<usize>,
    /// Index into skins array.
    pub skin: Option<usize>,
    /// Child node indices.
    pub children: Option<Vec<usize>>,
    /// Translation (T in TRS).
    pub translation: Option<[f32; 3]>,
    /// Rotation quaternion [x, y, z, w] (R in TRS).
    pub rotation: Option<[f32; 4]>,
    /// Scale (S in TRS).
    pub scale: Option<[f32; 3]>,
    /// 4x4 transformation matrix (column-major).
    pub matrix: Option<[f32; 16]>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skin {
    pub inverse_bind_matrices: Option<usize>,
    pub joints: Vec<usize>,
}

// ============================================================================
// Document
// ============================================================================

/// The parsed glTF document. Owns no binary bytes.
#[derive(Debug)]
pub struct Document {
    root: GltfRoot,
}

impl Document {
    /// Build a document from an already-parsed JSON tree.
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(DecodeError::InvalidGltf(
                "Document root is not a JSON object".into(),
            ));
        }
        let root = GltfRoot::deserialize(value)?;
        Ok(Self { root })
    }

    /// Parse JSON chunk bytes and build a document from them.
    pub fn from_json_slice(json: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(json)?;
        Self::from_value(&value)
    }

    pub fn mesh_count(&self) -> usize {
        self.root.meshes.len()
    }

    pub fn node_count(&self) -> usize {
        self.root.nodes.len()
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.root.buffers
    }

    pub fn mesh(&self, index: usize) -> Result<&Mesh> {
        lookup(&self.root.meshes, "mesh", index)
    }

    pub fn accessor(&self, index: usize) -> Result<&Accessor> {
        lookup(&self.root.accessors, "accessor", index)
    }

    pub fn buffer_view(&self, index: usize) -> Result<&BufferView> {
        lookup(&self.root.buffer_views, "bufferView", index)
    }

    pub fn material(&self, index: usize) -> Result<&Material> {
        lookup(&self.root.materials, "material", index)
    }

    pub fn texture(&self, index: usize) -> Result<&Texture> {
        lookup(&self.root.textures, "texture", index)
    }

    pub fn image(&self, index: usize) -> Result<&Image> {
        lookup(&self.root.images, "image", index)
    }

    pub fn node(&self, index: usize) -> Result<&Node> {
        lookup(&self.root.nodes, "node", index)
    }

    pub fn skin(&self, index: usize) -> Result<&Skin> {
        lookup(&self.root.skins, "skin", index)
    }

    /// The first node, in node array order, whose `mesh` is `mesh_index`.
    ///
    /// Instanced meshes (several nodes sharing one mesh) resolve to that
    /// first node only.
    pub fn node_for_mesh(&self, mesh_index: usize) -> Option<(usize, &Node)> {
        self.root
            .nodes
            .iter()
            .enumerate()
            .find(|(_, node)| node.mesh == Some(mesh_index))
    }
}

fn lookup<'a, T>(items: &'a [T], kind: &'static str, index: usize) -> Result<&'a T> {
    items
        .get(index)
        .ok_or_else(|| DecodeError::out_of_range(kind, index, items.len()))
}
