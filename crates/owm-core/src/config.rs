//! Resource limits applied while parsing map sources.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits that keep a parse bounded on oversized or hostile input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    /// Input beyond this many bytes is ignored, cut at the last full line.
    pub max_input_bytes: usize,
    /// Trimmed lines longer than this many characters are skipped.
    pub max_line_chars: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 1024 * 1024,
            max_line_chars: 4_096,
        }
    }
}

impl ParserConfig {
    /// Reject limits that would discard every line.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_input_bytes == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_input_bytes",
            });
        }
        if self.max_line_chars == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_line_chars",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroLimit { field: &'static str },
}
