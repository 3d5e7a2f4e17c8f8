//! JSON record-file connector.
//!
//! Record-oriented: the file holds a top-level array of objects whose
//! required fields depend on the requested document type. Also exposes a
//! single-record convenience used when JSON is embedded inside another
//! structure.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::connector::{Connector, invalid};
use crate::constants::connectors;
use crate::document::{
    Conversation, Document, DocumentType, ImportedItem, Metadata, MultiDocument, TextUnit,
};
use crate::errors::ImportError;
use crate::options::{OptionMap, OptionSpec};

/// Options declared by the JSON connector (none).
pub const OPTION_SPECS: &[OptionSpec] = &[];

/// Connector for files that parse as JSON.
pub struct JsonConnector;

impl JsonConnector {
    /// Build the connector from the flat option map.
    pub fn from_options(_options: &OptionMap) -> Result<Self, ImportError> {
        Ok(Self)
    }

    /// Parse one JSON string holding exactly one record.
    ///
    /// Accepts a bare object or a one-element array; anything else is an
    /// invalid resource.
    pub fn import_single(
        &self,
        json: &str,
        document_type: DocumentType,
    ) -> Result<ImportedItem, ImportError> {
        let resource = "<inline json>";
        let value: Value = serde_json::from_str(json)
            .map_err(|err| ImportError::invalid(resource, format!("not valid JSON: {err}")))?;
        let records = match value {
            Value::Object(record) => vec![record],
            other => as_records(resource, other)?,
        };
        let [record] = records.as_slice() else {
            return Err(ImportError::invalid(
                resource,
                format!("expected exactly one record, got {}", records.len()),
            ));
        };
        build_item(resource, record, document_type)
    }
}

impl Connector for JsonConnector {
    fn name(&self) -> &'static str {
        connectors::JSON
    }

    fn check_data(&self, path: &Path, _document_type: DocumentType) -> bool {
        if !path.is_file() {
            return false;
        }
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str::<Value>(&content).is_ok(),
            Err(_) => false,
        }
    }

    fn import_data(
        &self,
        path: &Path,
        document_type: DocumentType,
    ) -> Result<Vec<ImportedItem>, ImportError> {
        if !path.is_file() {
            return Err(ImportError::ResourceNotFound(path.display().to_string()));
        }
        let resource = path.display().to_string();
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|err| invalid(path, format!("not valid JSON: {err}")))?;
        let records = as_records(&resource, value)?;
        records
            .iter()
            .map(|record| build_item(&resource, record, document_type))
            .collect()
    }
}

fn as_records(resource: &str, value: Value) -> Result<Vec<Map<String, Value>>, ImportError> {
    let entries = match value {
        Value::Array(entries) => entries,
        _ => {
            return Err(ImportError::invalid(
                resource,
                "expected a top-level array of record objects",
            ));
        }
    };
    entries
        .into_iter()
        .map(|entry| match entry {
            Value::Object(record) => Ok(record),
            other => Err(ImportError::invalid(
                resource,
                format!("expected a record object, got {other}"),
            )),
        })
        .collect()
}

fn build_item(
    resource: &str,
    record: &Map<String, Value>,
    document_type: DocumentType,
) -> Result<ImportedItem, ImportError> {
    match document_type {
        DocumentType::Document => {
            let text = required_text(resource, record, "text")?;
            Ok(ImportedItem::Document(Document::new(
                text,
                optional_text(record, "summary"),
                meta_field(record),
            )))
        }
        DocumentType::MultiDocument => {
            let entries = record
                .get("documents")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    ImportError::invalid(resource, "record has no 'documents' array")
                })?;
            let mut documents = Vec::with_capacity(entries.len());
            for entry in entries {
                let Value::Object(inner) = entry else {
                    return Err(ImportError::invalid(
                        resource,
                        "'documents' entries must be objects",
                    ));
                };
                let text = required_text(resource, inner, "text")?;
                documents.push(Document::new(text, None, meta_field(inner)));
            }
            Ok(ImportedItem::MultiDocument(MultiDocument::new(
                documents,
                optional_text(record, "summary"),
                meta_field(record),
            )))
        }
        DocumentType::Conversation => {
            let entries = record
                .get("conversation_units")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    ImportError::invalid(resource, "record has no 'conversation_units' array")
                })?;
            let mut units = Vec::with_capacity(entries.len());
            for entry in entries {
                let Value::Object(inner) = entry else {
                    return Err(ImportError::invalid(
                        resource,
                        "'conversation_units' entries must be objects",
                    ));
                };
                let text = required_text(resource, inner, "text")?;
                let speaker = required_text(resource, inner, "speaker")?;
                let metadata = inner.contains_key("meta").then(|| meta_field(inner));
                units.push(TextUnit {
                    text,
                    speaker,
                    metadata,
                });
            }
            Ok(ImportedItem::Conversation(Conversation::new(
                units,
                optional_text(record, "summary"),
                meta_field(record),
            )))
        }
    }
}

fn required_text(
    resource: &str,
    record: &Map<String, Value>,
    field: &str,
) -> Result<String, ImportError> {
    match record.get(field) {
        Some(Value::String(text)) if !text.is_empty() => Ok(text.clone()),
        _ => Err(ImportError::invalid(
            resource,
            format!("record has no non-empty '{field}' field"),
        )),
    }
}

fn optional_text(record: &Map<String, Value>, field: &str) -> Option<String> {
    match record.get(field) {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

fn meta_field(record: &Map<String, Value>) -> Metadata {
    let mut metadata = Metadata::new();
    if let Some(Value::Object(entries)) = record.get("meta") {
        for (key, value) in entries {
            metadata.insert(key.clone(), value.clone());
        }
    }
    metadata
}
