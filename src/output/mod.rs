pub mod compact;
pub mod normalize;
pub mod projection;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("compact encoding exceeded maximum nesting depth of {0}")]
    DepthExceeded(usize),
    #[error("compact encoding cannot represent control character {0:?}")]
    UnsupportedCharacter(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Compact,
    Json,
}

impl OutputFormat {
    /// `"json"` (any case) selects JSON; anything else is compact.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Compact
        }
    }

    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Compact
        }
    }
}

/// Encodes `value` in a single format. No fallback happens here.
pub fn encode<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String, EncodeError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Compact => compact::to_compact(&serde_json::to_value(value)?),
    }
}
