//! JSON rendering for recognized tables.

use crate::error::{Error, Result};
use crate::model::TableSet;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a table set to JSON.
pub fn to_json(tables: &TableSet, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(tables),
        JsonFormat::Compact => serde_json::to_string(tables),
    };

    result.map_err(|e| Error::Output(format!("JSON serialization error: {}", e)))
}
