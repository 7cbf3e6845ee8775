//! GLB reader over an in-memory buffer.
//!
//! # Example
//!
//! ```ignore
//! use glb_mesh::GlbReader;
//!
//! let bytes = std::fs::read("model.glb")?;
//! let reader = GlbReader::from_slice(&bytes)?;
//!
//! for mesh in reader.meshes()? {
//!     if let Some(albedo) = &mesh.textures.albedo {
//!         let encoded = albedo.bytes(reader.binary_chunk());
//!         // hand `encoded` and `albedo.format` to an image decoder
//!     }
//! }
//! ```

use crate::accessor::AccessorResolver;
use crate::container::Container;
use crate::document::Document;
use crate::error::Result;
use crate::mesh::{MeshAssembler, MeshRecord};
use crate::options::DecodeOptions;

/// A validated container plus its parsed document. Borrows the input bytes.
#[derive(Debug)]
pub struct GlbReader<'a> {
    container: Container<'a>,
    document: Document,
    options: DecodeOptions,
}

impl<'a> GlbReader<'a> {
    pub fn from_slice(data: &'a [u8]) -> Result<Self> {
        Self::with_options(data, DecodeOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: DecodeOptions) -> Result<Self> {
        let container = Container::read(data)?;
        let document = Document::from_json_slice(container.json())?;
        Ok(Self {
            container,
            document,
            options,
        })
    }

    pub fn container(&self) -> &Container<'a> {
        &self.container
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// BIN chunk payload; texture ranges are relative to it.
    pub fn binary_chunk(&self) -> &'a [u8] {
        self.container.binary()
    }

    pub fn num_meshes(&self) -> usize {
        self.document.mesh_count()
    }

    pub fn accessors(&self) -> AccessorResolver<'_> {
        AccessorResolver::new(&self.document, self.container.binary())
    }

    fn assembler(&self) -> MeshAssembler<'_> {
        MeshAssembler::new(&self.document, self.container.binary(), &self.options)
    }

    /// Assemble a single mesh.
    pub fn mesh(&self, mesh_index: usize) -> Result<MeshRecord> {
        self.assembler().assemble_mesh(mesh_index)
    }

    /// Assemble every mesh in document order.
    pub fn meshes(&self) -> Result<Vec<MeshRecord>> {
        self.assembler().assemble()
    }
}
