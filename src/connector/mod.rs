//! Format connectors: the capability contract and its five built-in
//! implementations.
//!
//! Each connector encodes one on-disk convention and exposes the same pair
//! of operations: `check_data` (does this path belong to me?) and
//! `import_data` (normalize it into canonical containers). Connectors are
//! constructed fresh per resolve call from the option map and hold no
//! cross-call state.

use std::path::Path;

use regex::Regex;

use crate::constants::metadata::RESOURCE_NAME_KEY;
use crate::document::{DocumentType, ImportedItem, Metadata, TextUnit};
use crate::errors::ImportError;
use crate::splitter::split_conversation;

/// Columnar (csv/parquet) connector.
pub mod columnar;
/// Plain single-file connector.
pub mod file;
/// Directory-convention connector.
pub mod folder;
/// JSON record-file connector.
pub mod json;
/// Parallel `.source`/`.target` connector.
pub mod source_target;

/// Format-specific import capability.
///
/// Implementations claim a resource via `check_data` and normalize it via
/// `import_data`. They raise immediately on structural violations and never
/// return partially populated lists.
pub trait Connector {
    /// Registered connector name.
    fn name(&self) -> &'static str;

    /// Whether this connector claims the resource at `path` for
    /// `document_type`.
    fn check_data(&self, path: &Path, document_type: DocumentType) -> bool;

    /// Import the resource at `path` into canonical containers.
    fn import_data(
        &self,
        path: &Path,
        document_type: DocumentType,
    ) -> Result<Vec<ImportedItem>, ImportError>;
}

/// Metadata carrying only the item identifier.
pub(crate) fn resource_metadata(identifier: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(RESOURCE_NAME_KEY.to_string(), identifier.into());
    metadata
}

/// Split conversation text into turns, dropping empty utterances.
pub(crate) fn conversation_units(text: &str, tag: &Regex) -> Vec<TextUnit> {
    split_conversation(text, tag)
        .into_iter()
        .filter(|(_, utterance)| !utterance.is_empty())
        .map(|(speaker, utterance)| TextUnit::new(utterance, speaker))
        .collect()
}

/// Reject an unexpected structural state with a reason.
pub(crate) fn invalid(path: &Path, reason: impl Into<String>) -> ImportError {
    ImportError::invalid(path.display().to_string(), reason)
}
