//! Decoder for binary glTF (GLB) containers.
//!
//! This crate turns the bytes of a `.glb` file into renderer-ready mesh
//! records: vertex attributes, index buffers, embedded texture byte ranges,
//! skeletal bind data and the local transform of each mesh's node.
//!
//! # Pipeline
//!
//! | Stage                   | Module         | Output                        |
//! |-------------------------|----------------|-------------------------------|
//! | Container framing       | [`container`]  | JSON and BIN chunk slices     |
//! | JSON document           | [`document`]   | range-checked typed lookups   |
//! | Accessor resolution     | [`accessor`]   | validated, typed sequences    |
//! | Vertex attributes       | [`attributes`] | position, normal, ... indices |
//! | Material textures       | [`texture`]    | byte range + format hint      |
//! | Skin                    | [`skin`]       | bone records                  |
//! | Node transform          | [`scene`]      | translation/rotation/scale    |
//! | Assembly                | [`mesh`]       | `Vec<MeshRecord>`             |
//!
//! # Example
//!
//! ```ignore
//! let bytes = std::fs::read("character.glb")?;
//! for mesh in glb_mesh::parse(&bytes)? {
//!     println!(
//!         "mesh {} ({:?}): {} position floats, {} indices",
//!         mesh.id,
//!         mesh.name,
//!         mesh.attributes.position.len(),
//!         mesh.attributes.indices.len(),
//!     );
//! }
//! ```
//!
//! # Limits
//!
//! - Only `primitives[0]` of each mesh is decoded.
//! - A mesh referenced by several nodes takes its skin and transform from the
//!   first such node in node array order.
//! - Only the embedded BIN chunk is a data source; sparse accessors, morph
//!   targets and `KHR_draco_mesh_compression` are not decoded.

#![allow(clippy::needless_range_loop)]

pub mod accessor;
pub mod attributes;
pub mod container;
pub mod document;
pub mod error;
pub mod mesh;
pub mod options;
pub mod reader;
pub mod scene;
pub mod skin;
pub mod texture;

pub use accessor::{AccessorData, AccessorResolver, AccessorView, ComponentType, ElementType};
pub use attributes::{AttributeExtractor, Attributes, Semantic};
pub use container::Container;
pub use document::Document;
pub use error::{DecodeError, Result};
pub use mesh::{MeshAssembler, MeshRecord};
pub use options::{ComponentPolicy, DecodeOptions};
pub use reader::GlbReader;
pub use scene::{SceneResolver, Transform};
pub use skin::{BoneRecord, SkinResolver};
pub use texture::{ByteRange, ImageFormat, TextureRef, TextureResolver, Textures};

/// Decode every mesh of a GLB buffer with default options.
pub fn parse(data: &[u8]) -> Result<Vec<MeshRecord>> {
    parse_with_options(data, &DecodeOptions::default())
}

pub fn parse_with_options(data: &[u8], options: &DecodeOptions) -> Result<Vec<MeshRecord>> {
    GlbReader::with_options(data, options.clone())?.meshes()
}
