//! Per-mesh assembly of attributes, textures, skin and transform.

use serde::Serialize;

use crate::accessor::AccessorResolver;
use crate::attributes::{AttributeExtractor, Attributes};
use crate::document::Document;
use crate::error::Result;
use crate::options::DecodeOptions;
use crate::scene::{SceneResolver, Transform};
use crate::skin::{BoneRecord, SkinResolver};
use crate::texture::{TextureResolver, Textures};

/// Everything a renderer needs for one mesh of the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshRecord {
    /// Index of the mesh in the document's `meshes` array.
    pub id: usize,
    pub name: Option<String>,
    pub attributes: Attributes,
    pub textures: Textures,
    /// Bones of the owning node's skin, if it has one.
    pub skin: Option<Vec<BoneRecord>>,
    /// Local transform of the owning node, if any node references the mesh.
    pub transform: Option<Transform>,
}

/// Builds [`MeshRecord`]s for a document against its BIN chunk.
#[derive(Debug, Clone)]
pub struct MeshAssembler<'a> {
    resolver: AccessorResolver<'a>,
    options: DecodeOptions,
}

impl<'a> MeshAssembler<'a> {
    pub fn new(document: &'a Document, binary: &'a [u8], options: &DecodeOptions) -> Self {
        Self {
            resolver: AccessorResolver::new(document, binary),
            options: options.clone(),
        }
    }

    pub fn assemble_mesh(&self, mesh_index: usize) -> Result<MeshRecord> {
        let document = self.resolver.document();
        let mesh = document.mesh(mesh_index)?;

        let attributes = AttributeExtractor::new(self.resolver, self.options.component_policy())
            .extract(mesh_index)?;
        let textures = TextureResolver::new(self.resolver).resolve(mesh_index)?;
        let skin = SkinResolver::new(self.resolver).resolve(mesh_index)?;
        let transform = SceneResolver::new(document).resolve(mesh_index);

        Ok(MeshRecord {
            id: mesh_index,
            name: mesh.name.clone(),
            attributes,
            textures,
            skin,
            transform,
        })
    }

    /// Assemble every mesh in document order. On failure the error of the
    /// lowest failing mesh index is returned.
    pub fn assemble(&self) -> Result<Vec<MeshRecord>> {
        let count = self.resolver.document().mesh_count();
        tracing::debug!(meshes = count, parallel = self.options.parallel(), "assembling meshes");

        if self.options.parallel() && count > 1 {
            self.assemble_parallel(count)
        } else {
            self.assemble_sequential(count)
        }
    }

    fn assemble_sequential(&self, count: usize) -> Result<Vec<MeshRecord>> {
        let mut meshes = Vec::with_capacity(count);
        for mesh_index in 0..count {
            meshes.push(self.assemble_mesh(mesh_index)?);
        }
        Ok(meshes)
    }

    #[cfg(feature = "parallel")]
    fn assemble_parallel(&self, count: usize) -> Result<Vec<MeshRecord>> {
        use rayon::prelude::*;

        // Collected per mesh first so the reported error is the lowest index.
        let results: Vec<Result<MeshRecord>> = (0..count)
            .into_par_iter()
            .map(|mesh_index| self.assemble_mesh(mesh_index))
            .collect();
        results.into_iter().collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn assemble_parallel(&self, count: usize) -> Result<Vec<MeshRecord>> {
        self.assemble_sequential(count)
    }
}
