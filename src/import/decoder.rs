//! Record decoders for import sources.

use super::ImportDocument;
use crate::error::ImportError;
use std::path::Path;

/// Turns raw import bytes into a record tree
pub trait RecordDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<ImportDocument, ImportError>;

    /// Short format name, for logs
    fn format(&self) -> &'static str;
}

pub struct JsonRecordDecoder;

impl RecordDecoder for JsonRecordDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<ImportDocument, ImportError> {
        serde_json::from_slice(bytes).map_err(|e| ImportError::Decode(e.to_string()))
    }

    fn format(&self) -> &'static str {
        "json"
    }
}

pub struct YamlRecordDecoder;

impl RecordDecoder for YamlRecordDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<ImportDocument, ImportError> {
        serde_yaml::from_slice(bytes).map_err(|e| ImportError::Decode(e.to_string()))
    }

    fn format(&self) -> &'static str {
        "yaml"
    }
}

/// Decoder for a format name (`json`, `yaml`/`yml`)
pub fn decoder_for(format: &str) -> Result<Box<dyn RecordDecoder>, ImportError> {
    match format.to_ascii_lowercase().as_str() {
        "json" => Ok(Box::new(JsonRecordDecoder)),
        "yaml" | "yml" => Ok(Box::new(YamlRecordDecoder)),
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

/// Decoder chosen from the file extension, falling back to `default_format`
pub fn decoder_for_path(
    path: &Path,
    default_format: &str,
) -> Result<Box<dyn RecordDecoder>, ImportError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if decoder_for(ext).is_ok() => decoder_for(ext),
        _ => decoder_for(default_format),
    }
}
