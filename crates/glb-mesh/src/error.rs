//! Error type shared by every stage of GLB decoding.

use thiserror::Error;

use crate::accessor::{ComponentType, ElementType};

/// Errors that can occur while decoding a GLB container.
///
/// Every variant is fatal for the whole parse: no partial mesh list is
/// returned. Optional data that is simply absent (a texture slot, a skin, an
/// owning node) is reported as `None` instead.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Input too small for GLB header: {0} bytes")]
    TruncatedHeader(usize),

    #[error("Invalid GLB magic: {0:#010x}")]
    InvalidMagic(u32),

    #[error("Unsupported GLB version: {0}")]
    UnsupportedVersion(u32),

    #[error("GLB header declares {declared} bytes but input has {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("First chunk is not a JSON chunk")]
    MissingJsonChunk,

    #[error("Second chunk is not a BIN chunk")]
    MissingBinaryChunk,

    #[error("Chunk at offset {offset} needs {needed} bytes but only {remaining} remain")]
    TruncatedChunk {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {kind} index: {index} (have {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Unsupported component type: {0}")]
    UnsupportedComponentType(u32),

    #[error("Unsupported accessor type: {0}")]
    UnsupportedElementType(String),

    #[error("Accessor {accessor} needs {required} bytes but its buffer view has {available}")]
    AccessorOutOfBounds {
        accessor: usize,
        required: usize,
        available: usize,
    },

    #[error("Buffer view {buffer_view} ends at byte {end} past BIN chunk length {chunk_len}")]
    BufferViewOutOfBounds {
        buffer_view: usize,
        end: usize,
        chunk_len: usize,
    },

    #[error("Buffer view {buffer_view} stride {stride} is smaller than element size {element_size}")]
    InvalidByteStride {
        buffer_view: usize,
        stride: usize,
        element_size: usize,
    },

    #[error("{slot} expects {expected} components but accessor stores {found}")]
    ComponentTypeMismatch {
        slot: &'static str,
        expected: ComponentType,
        found: ComponentType,
    },

    #[error("{slot} expects {expected} elements but accessor stores {found}")]
    ElementTypeMismatch {
        slot: &'static str,
        expected: ElementType,
        found: ElementType,
    },

    #[error("Invalid glTF: {0}")]
    InvalidGltf(String),

    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

impl DecodeError {
    pub(crate) fn out_of_range(kind: &'static str, index: usize, len: usize) -> Self {
        DecodeError::IndexOutOfRange { kind, index, len }
    }
}
