//! Resource envelope produced by the fetch step and consumed by connectors.
//!
//! Remote acquisition (download, clone, archive extraction) happens in an
//! external collaborator; everything here operates on local paths only.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ImportError;
use crate::types::ResourceName;

/// Closed vocabulary classifying a fetched resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    /// Plain file, identified by its lowercased extension (empty when none).
    Extension(String),
    /// Directory tree.
    Directory,
    /// Comma/character-separated tabular file.
    Csv,
    /// Parquet tabular file.
    Parquet,
}

impl ResourceType {
    /// Classify a local path, failing when it does not exist.
    pub fn classify(path: &Path) -> Result<Self, ImportError> {
        if !path.exists() {
            return Err(ImportError::ResourceNotFound(path.display().to_string()));
        }
        if path.is_dir() {
            return Ok(Self::Directory);
        }
        Ok(Self::from_extension(path))
    }

    /// Classify a file path by extension alone, without touching the disk.
    pub fn from_extension(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Self::Csv,
            "parquet" => Self::Parquet,
            _ => Self::Extension(ext),
        }
    }

    /// Whether this resource is a single file of any kind.
    pub fn is_file(&self) -> bool {
        !matches!(self, Self::Directory)
    }
}

/// Role of a leaf inside a fetched directory tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKind {
    /// Leaf holds primary content.
    Text,
    /// Leaf holds a reference summary.
    Summary,
}

/// Metadata attached to every envelope node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceMeta {
    /// Name of the resource (path, file name, or item identifier).
    pub resource_name: ResourceName,
    /// Classification of the resource.
    pub resource_type: ResourceType,
    /// Leaf role inside a directory tree, `None` for standalone resources.
    pub data_kind: Option<DataKind>,
}

/// Payload of an envelope node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RawPayload {
    /// Decoded text content.
    Text(String),
    /// Undecoded bytes (tabular formats decoded by their connector).
    Bytes(Vec<u8>),
    /// Nested envelopes (directory trees).
    Nested(Vec<RawData>),
}

/// Pre-fetched content plus metadata, the contract between the fetch step
/// and the connectors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawData {
    /// Node payload.
    pub payload: RawPayload,
    /// Node metadata.
    pub metadata: ResourceMeta,
}

impl RawData {
    /// Build a text leaf.
    pub fn text_leaf(
        resource_name: impl Into<ResourceName>,
        resource_type: ResourceType,
        data_kind: Option<DataKind>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            payload: RawPayload::Text(text.into()),
            metadata: ResourceMeta {
                resource_name: resource_name.into(),
                resource_type,
                data_kind,
            },
        }
    }

    /// Build a nested node over child envelopes.
    pub fn nested(
        resource_name: impl Into<ResourceName>,
        resource_type: ResourceType,
        children: Vec<RawData>,
    ) -> Self {
        Self {
            payload: RawPayload::Nested(children),
            metadata: ResourceMeta {
                resource_name: resource_name.into(),
                resource_type,
                data_kind: None,
            },
        }
    }

    /// Fetch a single local file into a text leaf.
    pub fn fetch_file(path: &Path) -> Result<Self, ImportError> {
        if !path.is_file() {
            return Err(ImportError::ResourceNotFound(path.display().to_string()));
        }
        let text = fs::read_to_string(path)?;
        let name = file_name(path);
        Ok(Self::text_leaf(
            name,
            ResourceType::from_extension(path),
            None,
            text,
        ))
    }

    /// Borrow the text payload, when this node is a text leaf.
    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            RawPayload::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Borrow the child envelopes, when this node is nested.
    pub fn children(&self) -> &[RawData] {
        match &self.payload {
            RawPayload::Nested(children) => children,
            _ => &[],
        }
    }
}

/// File name of a path as a string (lossy for non-UTF-8 names).
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Name-sorted entries of a directory, for deterministic listing order.
pub(crate) fn sorted_entries(path: &Path) -> Result<Vec<PathBuf>, ImportError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    Ok(entries)
}
