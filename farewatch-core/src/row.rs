//! A tracked destination row as stored in the sheet.

use serde::{Deserialize, Serialize};

/// One row of the flight-price sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: i64,
    pub city: String,

    /// Sheety omits empty cells, so a missing column reads as empty.
    #[serde(default)]
    pub iata_code: String,

    /// Other columns (e.g. `lowestPrice`), kept but never written by sync.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Row {
    pub fn new(id: i64, city: impl Into<String>, iata_code: impl Into<String>) -> Self {
        Self {
            id,
            city: city.into(),
            iata_code: iata_code.into(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn needs_code(&self) -> bool {
        self.iata_code.trim().is_empty()
    }
}
