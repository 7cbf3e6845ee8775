//! Material texture slots resolved to encoded image bytes in the BIN chunk.
//!
//! Pixels are never decoded here; callers hand [`TextureRef::bytes`] and
//! [`TextureRef::format`] to an image decoder.

use serde::Serialize;

use crate::accessor::AccessorResolver;
use crate::document::TextureInfo;
use crate::error::{DecodeError, Result};

/// Encoded image format, from the image's MIME type or its leading bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
    Ktx2,
    /// A MIME type this crate has no name for.
    Other(String),
    Unknown,
}

impl ImageFormat {
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => ImageFormat::Png,
            "image/jpeg" | "image/jpg" => ImageFormat::Jpeg,
            "image/webp" => ImageFormat::Webp,
            "image/ktx2" => ImageFormat::Ktx2,
            _ => ImageFormat::Other(mime.to_string()),
        }
    }

    /// Guess the format from signature bytes.
    pub fn sniff(bytes: &[u8]) -> Self {
        const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];
        const KTX2: &[u8] = &[0xAB, b'K', b'T', b'X', b' ', b'2', b'0', 0xBB];

        if bytes.starts_with(PNG) {
            ImageFormat::Png
        } else if bytes.starts_with(JPEG) {
            ImageFormat::Jpeg
        } else if bytes.starts_with(KTX2) {
            ImageFormat::Ktx2
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            ImageFormat::Webp
        } else {
            ImageFormat::Unknown
        }
    }
}

/// A byte range relative to the start of the BIN chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    pub offset: usize,
    pub length: usize,
}

impl ByteRange {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// An embedded image referenced by a material slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextureRef {
    pub texture: usize,
    pub image: usize,
    pub range: ByteRange,
    pub format: ImageFormat,
}

impl TextureRef {
    /// The encoded image bytes. `binary` must be the BIN chunk this
    /// reference was resolved against.
    pub fn bytes<'a>(&self, binary: &'a [u8]) -> Option<&'a [u8]> {
        binary.get(self.range.offset..self.range.end())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Textures {
    pub albedo: Option<TextureRef>,
    pub normal: Option<TextureRef>,
}

#[derive(Debug, Clone, Copy)]
pub struct TextureResolver<'a> {
    resolver: AccessorResolver<'a>,
}

impl<'a> TextureResolver<'a> {
    pub fn new(resolver: AccessorResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Resolve the albedo and normal slots of the first primitive's material.
    pub fn resolve(&self, mesh_index: usize) -> Result<Textures> {
        let document = self.resolver.document();
        let mesh = document.mesh(mesh_index)?;

        let Some(material_index) = mesh.primitives.first().and_then(|p| p.material) else {
            return Ok(Textures::default());
        };
        let material = document.material(material_index)?;

        let albedo = material
            .pbr_metallic_roughness
            .as_ref()
            .and_then(|pbr| pbr.base_color_texture);

        Ok(Textures {
            albedo: albedo.map(|info| self.texture(info)).transpose()?,
            normal: material.normal_texture.map(|info| self.texture(info)).transpose()?,
        })
    }

    fn texture(&self, info: TextureInfo) -> Result<TextureRef> {
        let document = self.resolver.document();
        let texture = document.texture(info.index)?;

        let image_index = texture.source.ok_or_else(|| {
            DecodeError::Unsupported(format!("Texture {} has no image source", info.index))
        })?;
        let image = document.image(image_index)?;

        let view_index = match (image.buffer_view, &image.uri) {
            (Some(view), _) => view,
            (None, Some(_)) => {
                return Err(DecodeError::Unsupported(format!(
                    "Image {} is referenced by URI",
                    image_index
                )));
            }
            (None, None) => {
                return Err(DecodeError::InvalidGltf(format!(
                    "Image {} has neither bufferView nor uri",
                    image_index
                )));
            }
        };

        let range = self.resolver.buffer_view_range(view_index)?;
        let format = match &image.mime_type {
            Some(mime) => ImageFormat::from_mime(mime),
            None => ImageFormat::sniff(&self.resolver.binary()[range.clone()]),
        };

        Ok(TextureRef {
            texture: info.index,
            image: image_index,
            range: ByteRange {
                offset: range.start,
                length: range.len(),
            },
            format,
        })
    }
}
