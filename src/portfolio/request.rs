//! Page request payload
//!
//! The portfolio endpoint takes its query as base64-encoded JSON appended to
//! the URL path instead of query parameters.

use crate::error::ExtractError;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Query for one page of an index portfolio
///
/// Field order is the order the service documents and is preserved on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub language: String,
    pub page_number: u32,
    pub page_size: u32,
    pub index: String,
    pub segment: String,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            language: "pt-br".to_string(),
            page_number: 1,
            page_size: 20,
            index: "IBOV".to_string(),
            segment: "1".to_string(),
        }
    }
}

impl PageRequest {
    /// The same query pointed at another page
    pub fn page(&self, page_number: u32) -> Self {
        Self {
            page_number,
            ..self.clone()
        }
    }

    /// Serialize to JSON and base64-encode for the URL path
    pub fn encode(&self) -> Result<String, ExtractError> {
        let json = serde_json::to_string(self)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(json))
    }

    /// Reverse of [`PageRequest::encode`]
    pub fn decode(encoded: &str) -> eyre::Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
