//! Plain single-file connector, the catch-all for text files no other
//! convention claims.

use std::path::Path;

use regex::Regex;

use crate::connector::{Connector, conversation_units, resource_metadata};
use crate::constants::connectors;
use crate::constants::text::{DEFAULT_MULTI_DOC_DELIMITER, DEFAULT_SPEAKER_PATTERN};
use crate::document::{Conversation, Document, DocumentType, ImportedItem, Metadata, MultiDocument};
use crate::errors::ImportError;
use crate::options::{OptionKind, OptionMap, OptionSpec, pattern_option, text_option};
use crate::raw::RawData;

/// Options declared by the file connector.
pub const OPTION_SPECS: &[OptionSpec] = &[
    OptionSpec {
        name: "multi_document_delimiter",
        kind: OptionKind::Text,
        default: DEFAULT_MULTI_DOC_DELIMITER,
        help: "token separating embedded documents inside the file",
    },
    OptionSpec {
        name: "conversation_pattern",
        kind: OptionKind::Pattern,
        default: DEFAULT_SPEAKER_PATTERN,
        help: "speaker-tag pattern used to segment conversation content",
    },
];

/// Connector for a single plain text file.
pub struct FileConnector {
    multi_doc_delimiter: String,
    conversation_tag: Regex,
}

impl FileConnector {
    /// Build the connector from the flat option map.
    pub fn from_options(options: &OptionMap) -> Result<Self, ImportError> {
        Ok(Self {
            multi_doc_delimiter: text_option(
                options,
                "multi_document_delimiter",
                DEFAULT_MULTI_DOC_DELIMITER,
            ),
            conversation_tag: pattern_option(
                options,
                "conversation_pattern",
                DEFAULT_SPEAKER_PATTERN,
            )?,
        })
    }
}

impl Connector for FileConnector {
    fn name(&self) -> &'static str {
        connectors::FILE
    }

    fn check_data(&self, path: &Path, _document_type: DocumentType) -> bool {
        path.is_file()
    }

    fn import_data(
        &self,
        path: &Path,
        document_type: DocumentType,
    ) -> Result<Vec<ImportedItem>, ImportError> {
        let raw = RawData::fetch_file(path)?;
        let text = raw.as_text().unwrap_or_default();
        let metadata = resource_metadata(&raw.metadata.resource_name);

        let item = match document_type {
            DocumentType::Document => {
                ImportedItem::Document(Document::new(text, None, metadata))
            }
            DocumentType::MultiDocument => {
                let documents = text
                    .split(self.multi_doc_delimiter.as_str())
                    .filter(|unit| !unit.is_empty())
                    .map(|unit| Document::new(unit, None, Metadata::new()))
                    .collect();
                ImportedItem::MultiDocument(MultiDocument::new(documents, None, metadata))
            }
            DocumentType::Conversation => {
                let units = conversation_units(text, &self.conversation_tag);
                ImportedItem::Conversation(Conversation::new(units, None, metadata))
            }
        };
        Ok(vec![item])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn connector() -> FileConnector {
        FileConnector::from_options(&OptionMap::new()).unwrap()
    }

    #[test]
    fn imports_whole_file_as_one_document() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("note.txt");
        std::fs::write(&path, "whole body").unwrap();

        let items = connector()
            .import_data(&path, DocumentType::Document)
            .unwrap();
        assert_eq!(items.len(), 1);
        let doc = items[0].as_document().unwrap();
        assert_eq!(doc.text, "whole body");
        assert_eq!(doc.summary, None);
        assert_eq!(doc.metadata["resource_name"], "note.txt");
    }

    #[test]
    fn delimiter_splits_into_a_multi_document() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bundle.txt");
        std::fs::write(&path, "one#DOCUMENT#two#DOCUMENT#three").unwrap();

        let items = connector()
            .import_data(&path, DocumentType::MultiDocument)
            .unwrap();
        let group = items[0].as_multi_document().unwrap();
        let texts: Vec<&str> = group.documents.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn conversation_splits_by_speaker_tags() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("chat.txt");
        std::fs::write(&path, "#A# hello#B# hi there").unwrap();

        let items = connector()
            .import_data(&path, DocumentType::Conversation)
            .unwrap();
        let conversation = items[0].as_conversation().unwrap();
        assert_eq!(conversation.text_units.len(), 2);
        assert_eq!(conversation.text_units[1].text, "hi there");
    }

    #[test]
    fn claims_files_but_not_directories() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("note.txt");
        std::fs::write(&path, "body").unwrap();
        let connector = connector();
        assert!(connector.check_data(&path, DocumentType::Document));
        assert!(!connector.check_data(temp.path(), DocumentType::Document));
    }
}
