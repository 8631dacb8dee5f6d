//! Decoding of the `/user/memory` payload.
//!
//! Memory is stored either as plain JSON or as `gz:` followed by base64 of
//! a gzip stream. Nothing here fails: a broken blob becomes
//! [`DecodedMemory::Unavailable`] and the report carries on.

use base64::{engine::general_purpose::STANDARD, Engine};
use flate2::read::GzDecoder;
use serde_json::Value;
use std::io::Read;

use crate::values::map_f64;

const GZIP_PREFIX: &str = "gz:";

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedMemory {
    /// Inflated from a `gz:` blob.
    Decoded(Value),
    /// Stored uncompressed.
    Plain(Value),
    Unavailable(String),
}

impl DecodedMemory {
    pub fn value(&self) -> Option<&Value> {
        match self {
            DecodedMemory::Decoded(value) | DecodedMemory::Plain(value) => Some(value),
            DecodedMemory::Unavailable(_) => None,
        }
    }

    pub fn stats(&self) -> MemoryStats {
        self.value()
            .and_then(|memory| memory.get("stats"))
            .map(MemoryStats::from_value)
            .unwrap_or_default()
    }
}

/// The parts of `Memory.stats` the report reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStats {
    pub cpu: Option<f64>,
    pub time: Option<f64>,
    pub creeps: Option<f64>,
}

impl MemoryStats {
    fn from_value(stats: &Value) -> Self {
        MemoryStats {
            cpu: map_f64(stats, "cpu"),
            time: map_f64(stats, "time"),
            creeps: map_f64(stats, "creeps"),
        }
    }
}

/// Decode the `data` field of a memory response.
pub fn decode(raw: Option<&Value>) -> DecodedMemory {
    match raw {
        None | Some(Value::Null) => DecodedMemory::Unavailable("no memory returned".to_string()),
        Some(Value::String(text)) => decode_text(text),
        Some(value @ Value::Object(_)) => DecodedMemory::Plain(value.clone()),
        Some(other) => DecodedMemory::Unavailable(format!("unexpected memory value: {}", other)),
    }
}

fn decode_text(text: &str) -> DecodedMemory {
    if let Some(encoded) = text.strip_prefix(GZIP_PREFIX) {
        return match inflate(encoded) {
            Ok(value) => DecodedMemory::Decoded(value),
            Err(reason) => {
                tracing::warn!(%reason, "failed to decode compressed memory");
                DecodedMemory::Unavailable(reason)
            }
        };
    }

    if text.trim().is_empty() {
        return DecodedMemory::Unavailable("memory is empty".to_string());
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => DecodedMemory::Plain(value),
        Err(error) => DecodedMemory::Unavailable(format!("memory is not JSON: {}", error)),
    }
}

fn inflate(encoded: &str) -> Result<Value, String> {
    let compressed = STANDARD
        .decode(encoded.trim())
        .map_err(|error| format!("invalid base64: {}", error))?;

    let mut json = String::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_string(&mut json)
        .map_err(|error| format!("invalid gzip stream: {}", error))?;

    serde_json::from_str(&json).map_err(|error| format!("invalid JSON: {}", error))
}

/// Size of the stored memory as the server holds it.
pub fn raw_size(raw: Option<&Value>) -> usize {
    match raw {
        Some(Value::String(text)) => text.len(),
        Some(Value::Null) | None => 0,
        Some(other) => other.to_string().len(),
    }
}
