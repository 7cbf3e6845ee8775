//! GLB container framing: the 12-byte file header followed by a JSON chunk
//! and a BIN chunk.
//!
//! ```text
//! +--------+---------+--------+  +--------+------+---------+  +--------+------+---------+
//! | magic  | version | length |  | length | JSON | payload |  | length | BIN  | payload |
//! +--------+---------+--------+  +--------+------+---------+  +--------+------+---------+
//!   u32 LE   u32 LE    u32 LE      u32 LE   u32               u32 LE   u32
//! ```

use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DecodeError, Result};

pub const GLB_MAGIC: u32 = 0x46546C67; // "glTF" in little-endian
pub const GLB_VERSION: u32 = 2;
pub const GLB_CHUNK_JSON: u32 = 0x4E4F534A; // "JSON"
pub const GLB_CHUNK_BIN: u32 = 0x004E4942; // "BIN\0"

pub const HEADER_SIZE: usize = 12;
pub const CHUNK_HEADER_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub magic: u32,
    pub version: u32,
    pub total_length: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Json,
    Binary,
    Unknown(u32),
}

impl ChunkKind {
    pub fn from_tag(tag: u32) -> Self {
        match tag {
            GLB_CHUNK_JSON => ChunkKind::Json,
            GLB_CHUNK_BIN => ChunkKind::Binary,
            other => ChunkKind::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub length: u32,
    pub kind: ChunkKind,
}

/// A validated GLB container borrowing the input buffer.
///
/// Holds no parsed state; the JSON chunk is handed to the document layer and
/// the BIN chunk is shared read-only with every resolver.
#[derive(Debug, Clone)]
pub struct Container<'a> {
    header: ContainerHeader,
    json: &'a [u8],
    binary: &'a [u8],
    binary_range: Range<usize>,
}

impl<'a> Container<'a> {
    /// Validate the header and both chunk headers of `data`.
    pub fn read(data: &'a [u8]) -> Result<Self> {
        let header = read_header(data)?;

        let (json_header, json_range) = read_chunk(data, HEADER_SIZE)?;
        if json_header.kind != ChunkKind::Json {
            return Err(DecodeError::MissingJsonChunk);
        }

        let bin_offset = json_range.end;
        if bin_offset >= data.len() {
            return Err(DecodeError::MissingBinaryChunk);
        }
        let (bin_header, binary_range) = read_chunk(data, bin_offset)?;
        if bin_header.kind != ChunkKind::Binary {
            return Err(DecodeError::MissingBinaryChunk);
        }

        tracing::debug!(
            json_len = json_range.len(),
            bin_len = binary_range.len(),
            "read GLB container"
        );

        Ok(Self {
            header,
            json: &data[json_range],
            binary: &data[binary_range.clone()],
            binary_range,
        })
    }

    pub fn header(&self) -> ContainerHeader {
        self.header
    }

    /// JSON chunk payload, including any trailing space padding.
    pub fn json(&self) -> &'a [u8] {
        self.json
    }

    /// BIN chunk payload.
    pub fn binary(&self) -> &'a [u8] {
        self.binary
    }

    /// Byte range of the BIN payload within the original input.
    pub fn binary_range(&self) -> Range<usize> {
        self.binary_range.clone()
    }
}

fn read_header(data: &[u8]) -> Result<ContainerHeader> {
    if data.len() < HEADER_SIZE {
        return Err(DecodeError::TruncatedHeader(data.len()));
    }

    let header = ContainerHeader {
        magic: LittleEndian::read_u32(&data[0..4]),
        version: LittleEndian::read_u32(&data[4..8]),
        total_length: LittleEndian::read_u32(&data[8..12]),
    };

    if header.magic != GLB_MAGIC {
        return Err(DecodeError::InvalidMagic(header.magic));
    }
    if header.version != GLB_VERSION {
        return Err(DecodeError::UnsupportedVersion(header.version));
    }
    if header.total_length as usize != data.len() {
        return Err(DecodeError::LengthMismatch {
            declared: header.total_length as usize,
            actual: data.len(),
        });
    }

    Ok(header)
}

/// Read the chunk header at `offset` and return it with the payload range.
fn read_chunk(data: &[u8], offset: usize) -> Result<(ChunkHeader, Range<usize>)> {
    let remaining = data.len().saturating_sub(offset);
    if remaining < CHUNK_HEADER_SIZE {
        return Err(DecodeError::TruncatedChunk {
            offset,
            needed: CHUNK_HEADER_SIZE,
            remaining,
        });
    }

    let length = LittleEndian::read_u32(&data[offset..offset + 4]);
    let kind = ChunkKind::from_tag(LittleEndian::read_u32(&data[offset + 4..offset + 8]));

    let start = offset + CHUNK_HEADER_SIZE;
    let payload_remaining = data.len() - start;
    if length as usize > payload_remaining {
        return Err(DecodeError::TruncatedChunk {
            offset,
            needed: length as usize,
            remaining: payload_remaining,
        });
    }

    Ok((ChunkHeader { length, kind }, start..start + length as usize))
}
