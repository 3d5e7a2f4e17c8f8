#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Format connectors and the capability contract they implement.
pub mod connector;
/// Default option values, connector names, and reserved metadata keys.
pub mod constants;
/// Canonical document containers produced by every import.
pub mod document;
/// Error types surfaced by resolution and import.
pub mod errors;
/// Connector option maps and introspectable option specs.
pub mod options;
/// Raw resource envelope for staged directory imports.
pub mod raw;
/// Connector registry and resource resolution.
pub mod registry;
/// Regex-driven conversation segmentation.
pub mod splitter;
/// Domain-vocabulary type aliases.
pub mod types;

pub use connector::Connector;
pub use document::{
    Conversation, Document, DocumentType, ImportedItem, Metadata, MultiDocument, TextUnit,
};
pub use errors::ImportError;
pub use options::{OptionKind, OptionMap, OptionSpec};
pub use raw::{DataKind, RawData, RawPayload, ResourceMeta, ResourceType};
pub use registry::{ConnectorRegistry, import_data};
pub use splitter::split_conversation;
