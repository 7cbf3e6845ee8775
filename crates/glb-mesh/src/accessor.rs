//! Accessor resolution: turns a JSON accessor into typed numbers read out of
//! the BIN chunk.
//!
//! Resolution is split in two steps. [`AccessorResolver::view`] performs all
//! of the index and bounds validation up front and yields an
//! [`AccessorView`] that borrows the BIN chunk and decodes lazily;
//! [`AccessorView::decode`] (or [`AccessorResolver::resolve`]) collects it
//! into an owned [`AccessorData`] that never aliases the input.

use std::fmt;
use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::document::Document;
use crate::error::{DecodeError, Result};

// ============================================================================
// Dispatch table
// ============================================================================

/// Component types the decoder understands. Every other glTF component code
/// is rejected with `UnsupportedComponentType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    UnsignedByte,
    UnsignedShort,
    Float,
}

impl ComponentType {
    pub const UNSIGNED_BYTE: u32 = 5121;
    pub const UNSIGNED_SHORT: u32 = 5123;
    pub const FLOAT: u32 = 5126;

    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            Self::UNSIGNED_BYTE => Ok(ComponentType::UnsignedByte),
            Self::UNSIGNED_SHORT => Ok(ComponentType::UnsignedShort),
            Self::FLOAT => Ok(ComponentType::Float),
            other => Err(DecodeError::UnsupportedComponentType(other)),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            ComponentType::UnsignedByte => Self::UNSIGNED_BYTE,
            ComponentType::UnsignedShort => Self::UNSIGNED_SHORT,
            ComponentType::Float => Self::FLOAT,
        }
    }

    pub fn byte_length(self) -> usize {
        match self {
            ComponentType::UnsignedByte => 1,
            ComponentType::UnsignedShort => 2,
            ComponentType::Float => 4,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentType::UnsignedByte => "UNSIGNED_BYTE",
            ComponentType::UnsignedShort => "UNSIGNED_SHORT",
            ComponentType::Float => "FLOAT",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "SCALAR" => Ok(ElementType::Scalar),
            "VEC2" => Ok(ElementType::Vec2),
            "VEC3" => Ok(ElementType::Vec3),
            "VEC4" => Ok(ElementType::Vec4),
            "MAT2" => Ok(ElementType::Mat2),
            "MAT3" => Ok(ElementType::Mat3),
            "MAT4" => Ok(ElementType::Mat4),
            other => Err(DecodeError::UnsupportedElementType(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementType::Scalar => "SCALAR",
            ElementType::Vec2 => "VEC2",
            ElementType::Vec3 => "VEC3",
            ElementType::Vec4 => "VEC4",
            ElementType::Mat2 => "MAT2",
            ElementType::Mat3 => "MAT3",
            ElementType::Mat4 => "MAT4",
        }
    }

    pub fn component_count(self) -> usize {
        match self {
            ElementType::Scalar => 1,
            ElementType::Vec2 => 2,
            ElementType::Vec3 => 3,
            ElementType::Vec4 | ElementType::Mat2 => 4,
            ElementType::Mat3 => 9,
            ElementType::Mat4 => 16,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A scalar that can be read little-endian out of the BIN chunk.
pub trait Component: Copy + 'static {
    const TYPE: ComponentType;

    /// Read one value from the start of `bytes`.
    fn read(bytes: &[u8]) -> Self;
}

impl Component for u8 {
    const TYPE: ComponentType = ComponentType::UnsignedByte;

    fn read(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl Component for u16 {
    const TYPE: ComponentType = ComponentType::UnsignedShort;

    fn read(bytes: &[u8]) -> Self {
        LittleEndian::read_u16(bytes)
    }
}

impl Component for f32 {
    const TYPE: ComponentType = ComponentType::Float;

    fn read(bytes: &[u8]) -> Self {
        LittleEndian::read_f32(bytes)
    }
}

// ============================================================================
// Decoded data
// ============================================================================

/// An owned, flat sequence of decoded components.
///
/// Serializes as a plain JSON array of numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AccessorData {
    F32(Vec<f32>),
    U16(Vec<u16>),
    U8(Vec<u8>),
}

impl AccessorData {
    pub fn empty(component_type: ComponentType) -> Self {
        match component_type {
            ComponentType::Float => AccessorData::F32(Vec::new()),
            ComponentType::UnsignedShort => AccessorData::U16(Vec::new()),
            ComponentType::UnsignedByte => AccessorData::U8(Vec::new()),
        }
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            AccessorData::F32(_) => ComponentType::Float,
            AccessorData::U16(_) => ComponentType::UnsignedShort,
            AccessorData::U8(_) => ComponentType::UnsignedByte,
        }
    }

    /// Number of components (not elements).
    pub fn len(&self) -> usize {
        match self {
            AccessorData::F32(v) => v.len(),
            AccessorData::U16(v) => v.len(),
            AccessorData::U8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            AccessorData::F32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<&[u16]> {
        match self {
            AccessorData::U16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            AccessorData::U8(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_f32(self) -> Option<Vec<f32>> {
        match self {
            AccessorData::F32(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// AccessorView
// ============================================================================

/// A validated accessor over the BIN chunk. Nothing is decoded until the
/// view is iterated.
#[derive(Debug, Clone)]
pub struct AccessorView<'a> {
    index: usize,
    component_type: ComponentType,
    element_type: ElementType,
    count: usize,
    normalized: bool,
    stride: usize,
    /// From the first byte of element 0 to the last byte of the last element.
    data: &'a [u8],
}

impl<'a> AccessorView<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Number of elements.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn normalized(&self) -> bool {
        self.normalized
    }

    pub fn element_size(&self) -> usize {
        self.component_type.byte_length() * self.element_type.component_count()
    }

    /// Distance in bytes between the starts of consecutive elements.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw bytes of each element, in order.
    pub fn elements(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let data = self.data;
        let stride = self.stride;
        let size = self.element_size();
        (0..self.count).map(move |i| &data[i * stride..i * stride + size])
    }

    /// Lazily decoded components, or `None` when `T` is not the stored type.
    pub fn components<T: Component>(&self) -> Option<impl Iterator<Item = T> + 'a> {
        if T::TYPE != self.component_type {
            return None;
        }
        let width = self.component_type.byte_length();
        let per_element = self.element_type.component_count();
        Some(
            self.elements()
                .flat_map(move |element| (0..per_element).map(move |c| T::read(&element[c * width..]))),
        )
    }

    /// Decode every component into a fresh buffer.
    pub fn decode(&self) -> AccessorData {
        match self.component_type {
            ComponentType::Float => AccessorData::F32(self.collect::<f32>()),
            ComponentType::UnsignedShort => AccessorData::U16(self.collect::<u16>()),
            ComponentType::UnsignedByte => AccessorData::U8(self.collect::<u8>()),
        }
    }

    fn collect<T: Component>(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.count * self.element_type.component_count());
        if let Some(components) = self.components::<T>() {
            out.extend(components);
        }
        out
    }
}

// ============================================================================
// AccessorResolver
// ============================================================================

/// Resolves accessors of one document against one BIN chunk.
#[derive(Debug, Clone, Copy)]
pub struct AccessorResolver<'a> {
    document: &'a Document,
    binary: &'a [u8],
}

impl<'a> AccessorResolver<'a> {
    pub fn new(document: &'a Document, binary: &'a [u8]) -> Self {
        Self { document, binary }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn binary(&self) -> &'a [u8] {
        self.binary
    }

    /// Byte range of a buffer view within the BIN chunk.
    pub fn buffer_view_range(&self, view_index: usize) -> Result<Range<usize>> {
        let view = self.document.buffer_view(view_index)?;
        if view.buffer != 0 {
            return Err(DecodeError::Unsupported(format!(
                "Buffer view {} references buffer {}; only the GLB BIN chunk is supported",
                view_index, view.buffer
            )));
        }
        // Without a `buffers` array the BIN chunk is still buffer 0.
        if let Some(uri) = self.document.buffers().first().and_then(|b| b.uri.as_deref()) {
            return Err(DecodeError::Unsupported(format!(
                "Buffer view {} reads buffer 0, which is external ({})",
                view_index, uri
            )));
        }

        let end = view
            .byte_offset
            .checked_add(view.byte_length)
            .filter(|&end| end <= self.binary.len())
            .ok_or(DecodeError::BufferViewOutOfBounds {
                buffer_view: view_index,
                end: view.byte_offset.saturating_add(view.byte_length),
                chunk_len: self.binary.len(),
            })?;

        Ok(view.byte_offset..end)
    }

    /// Validate an accessor and return a lazy view over its elements.
    pub fn view(&self, accessor_index: usize) -> Result<AccessorView<'a>> {
        let accessor = self.document.accessor(accessor_index)?;

        if accessor.sparse.is_some() {
            return Err(DecodeError::Unsupported(format!(
                "Sparse accessor {}",
                accessor_index
            )));
        }

        let component_type = ComponentType::from_code(accessor.component_type)?;
        let element_type = ElementType::from_name(&accessor.element_type)?;

        let view_index = accessor.buffer_view.ok_or_else(|| {
            DecodeError::Unsupported(format!("Accessor {} has no bufferView", accessor_index))
        })?;
        let buffer_view = self.document.buffer_view(view_index)?;
        let range = self.buffer_view_range(view_index)?;
        let view_bytes = &self.binary[range];

        let element_size = component_type.byte_length() * element_type.component_count();
        let stride = match buffer_view.byte_stride {
            Some(stride) if stride < element_size => {
                return Err(DecodeError::InvalidByteStride {
                    buffer_view: view_index,
                    stride,
                    element_size,
                });
            }
            Some(stride) => stride,
            None => element_size,
        };

        // Last element ends at offset + (count - 1) * stride + element_size;
        // for tightly packed data that is offset + count * element_size.
        let required = match accessor.count.checked_sub(1) {
            None => Some(accessor.byte_offset),
            Some(last) => last
                .checked_mul(stride)
                .and_then(|n| n.checked_add(element_size))
                .and_then(|n| n.checked_add(accessor.byte_offset)),
        }
        .unwrap_or(usize::MAX);

        if required > buffer_view.byte_length {
            return Err(DecodeError::AccessorOutOfBounds {
                accessor: accessor_index,
                required,
                available: buffer_view.byte_length,
            });
        }

        Ok(AccessorView {
            index: accessor_index,
            component_type,
            element_type,
            count: accessor.count,
            normalized: accessor.normalized,
            stride,
            data: &view_bytes[accessor.byte_offset..required],
        })
    }

    /// Validate and decode an accessor into an owned sequence.
    pub fn resolve(&self, accessor_index: usize) -> Result<AccessorData> {
        let view = self.view(accessor_index)?;
        tracing::trace!(
            accessor = accessor_index,
            count = view.count(),
            component_type = %view.component_type(),
            element_type = %view.element_type(),
            "resolving accessor"
        );
        Ok(view.decode())
    }
}
