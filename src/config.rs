//! Configuration for wire decoding
//!
//! Limits applied by readers before allocating buffers for length-prefixed
//! fields. These can be loaded from JSON or passed programmatically; the
//! defaults never reject a payload a well-behaved peer can produce.

use crate::error::{Result, WireError};
use serde::{Deserialize, Serialize};

/// Allocation limits for length-prefixed reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLimits {
    /// Maximum length accepted for a varint-prefixed byte field (default: 32 MiB)
    #[serde(default = "default_max_bytes_length")]
    pub max_bytes_length: usize,

    /// Maximum length accepted for a varint-prefixed text field (default: 256 KiB)
    #[serde(default = "default_max_string_length")]
    pub max_string_length: usize,
}

fn default_max_bytes_length() -> usize {
    32 * 1024 * 1024
}

fn default_max_string_length() -> usize {
    256 * 1024
}

impl Default for WireLimits {
    fn default() -> Self {
        Self {
            max_bytes_length: default_max_bytes_length(),
            max_string_length: default_max_string_length(),
        }
    }
}

impl WireLimits {
    /// Parse limits from a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| WireError::Config(e.to_string()))
    }

    /// Serialize limits to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| WireError::Config(e.to_string()))
    }
}
