//! Synthetic GLB construction for integration tests.

#![allow(dead_code)]

use serde_json::Value;

pub const GLB_MAGIC: u32 = 0x46546C67;
pub const CHUNK_JSON: u32 = 0x4E4F534A;
pub const CHUNK_BIN: u32 = 0x004E4942;

/// Accumulates BIN chunk contents and frames them with a JSON document.
#[derive(Default)]
pub struct GlbBuilder {
    bin: Vec<u8>,
}

impl GlbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes at a 4-byte aligned offset. Returns `(offset, len)`.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> (usize, usize) {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        (offset, bytes.len())
    }

    pub fn push_f32(&mut self, values: &[f32]) -> (usize, usize) {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push_bytes(&bytes)
    }

    pub fn push_u16(&mut self, values: &[u16]) -> (usize, usize) {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push_bytes(&bytes)
    }

    pub fn bin(&self) -> &[u8] {
        &self.bin
    }

    pub fn build(&self, json: &Value) -> Vec<u8> {
        let mut json_bytes = serde_json::to_vec(json).unwrap();
        while json_bytes.len() % 4 != 0 {
            json_bytes.push(b' ');
        }
        let mut bin = self.bin.clone();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }
        frame(&[(CHUNK_JSON, &json_bytes), (CHUNK_BIN, &bin)])
    }
}

/// Route decoder logs to the test harness. Set `RUST_LOG=glb_mesh=trace` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Wrap `(tag, payload)` chunks in a GLB header with a correct total length.
pub fn frame(chunks: &[(u32, &[u8])]) -> Vec<u8> {
    let body_len: usize = chunks.iter().map(|(_, p)| 8 + p.len()).sum();
    let mut out = Vec::with_capacity(12 + body_len);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&((12 + body_len) as u32).to_le_bytes());
    for (tag, payload) in chunks {
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(payload);
    }
    out
}
