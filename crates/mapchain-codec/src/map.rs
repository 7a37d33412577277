//! Revision 3 source map documents

use crate::error::{CodecError, CodecResult};
use crate::types::SegmentTable;
use crate::vlq;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// The `version` every document produced here carries
pub const SOURCE_MAP_VERSION: u32 = 3;

const DATA_URL_PREFIX: &str = "data:application/json;charset=utf-8;base64,";

/// A source map document as it appears on the wire
///
/// `sources` and `sources_content` are parallel arrays; `names` is
/// referenced by index from `mappings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

impl Default for RawSourceMap {
    fn default() -> Self {
        RawSourceMap {
            version: SOURCE_MAP_VERSION,
            file: None,
            source_root: None,
            sources: Vec::new(),
            sources_content: None,
            names: Vec::new(),
            mappings: String::new(),
        }
    }
}

impl RawSourceMap {
    /// Parse a JSON document
    pub fn from_json(json: &str) -> CodecResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a `data:` URL carrying a base64 JSON document
    pub fn from_data_url(url: &str) -> CodecResult<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| CodecError::UnsupportedUrl(url.to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CodecError::UnsupportedUrl(url.to_string()))?;

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default();
        if !mime.is_empty() && mime != "application/json" {
            return Err(CodecError::UnsupportedUrl(url.to_string()));
        }
        if !params.any(|p| p == "base64") {
            return Err(CodecError::UnsupportedUrl(url.to_string()));
        }

        let bytes = STANDARD.decode(payload.trim())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn to_json(&self) -> CodecResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> CodecResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize as a `data:` URL suitable for an inline `sourceMappingURL`
    pub fn to_url(&self) -> CodecResult<String> {
        let json = self.to_json()?;
        Ok(format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(json)))
    }

    /// Decode the `mappings` field
    pub fn decode_mappings(&self) -> CodecResult<SegmentTable> {
        vlq::decode(&self.mappings)
    }

    /// Content of `sources[index]`, if embedded
    pub fn source_content(&self, index: usize) -> Option<&str> {
        self.sources_content
            .as_ref()
            .and_then(|contents| contents.get(index))
            .and_then(Option::as_deref)
    }
}
