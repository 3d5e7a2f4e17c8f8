//! Resolution order and dispatch behavior of the connector registry.

use std::path::Path;

use corpora::{
    Connector, ConnectorRegistry, Document, DocumentType, ImportError, ImportedItem, Metadata,
    OptionMap,
};
use tempfile::tempdir;

struct ClaimEverything(&'static str);

impl Connector for ClaimEverything {
    fn name(&self) -> &'static str {
        self.0
    }

    fn check_data(&self, _path: &Path, _document_type: DocumentType) -> bool {
        true
    }

    fn import_data(
        &self,
        _path: &Path,
        _document_type: DocumentType,
    ) -> Result<Vec<ImportedItem>, ImportError> {
        Ok(vec![ImportedItem::Document(Document::new(
            self.0,
            None,
            Metadata::new(),
        ))])
    }
}

#[test]
fn first_registered_plugin_wins_when_several_claim() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("note.txt");
    std::fs::write(&path, "body").unwrap();

    let mut registry = ConnectorRegistry::default();
    registry.register_plugin("first", &[], |_| Ok(Box::new(ClaimEverything("first"))));
    registry.register_plugin("second", &[], |_| Ok(Box::new(ClaimEverything("second"))));
    assert_eq!(&registry.connector_names()[..2], ["first", "second"]);

    let items = registry
        .resolve(&path, DocumentType::Document, None, &OptionMap::new())
        .unwrap();
    assert_eq!(items[0].as_document().unwrap().text, "first");
    // Repeated resolution is deterministic.
    let again = registry
        .resolve(&path, DocumentType::Document, None, &OptionMap::new())
        .unwrap();
    assert_eq!(again[0].as_document().unwrap().text, "first");
}

#[test]
fn source_target_outranks_folder_for_paired_directories() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("pair.source"), "s").unwrap();
    std::fs::write(temp.path().join("pair.target"), "t").unwrap();

    let items = ConnectorRegistry::default()
        .resolve(temp.path(), DocumentType::Document, None, &OptionMap::new())
        .unwrap();
    assert_eq!(items.len(), 1);
    // Target content became the summary, so the source-target connector ran.
    assert_eq!(items[0].summary(), Some("t"));
}

#[test]
fn plain_files_fall_through_to_the_file_connector() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("note.txt");
    std::fs::write(&path, "plain body, not json").unwrap();

    let items = ConnectorRegistry::default()
        .resolve(&path, DocumentType::Document, None, &OptionMap::new())
        .unwrap();
    assert_eq!(items[0].as_document().unwrap().text, "plain body, not json");
    assert_eq!(items[0].metadata()["resource_name"], "note.txt");
}

#[test]
fn missing_resources_and_unknown_options_fail_up_front() {
    let registry = ConnectorRegistry::default();
    let err = registry
        .resolve(
            Path::new("/no/such/path"),
            DocumentType::Document,
            None,
            &OptionMap::new(),
        )
        .unwrap_err();
    assert!(matches!(err, ImportError::ResourceNotFound(_)));

    let temp = tempdir().unwrap();
    let path = temp.path().join("note.txt");
    std::fs::write(&path, "body").unwrap();
    let mut options = OptionMap::new();
    options.insert("mystery".to_string(), "value".to_string());
    let err = registry
        .resolve(&path, DocumentType::Document, None, &options)
        .unwrap_err();
    assert!(matches!(err, ImportError::Configuration(_)));
}

#[test]
fn language_hint_does_not_change_dispatch() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("note.txt");
    std::fs::write(&path, "body").unwrap();

    let registry = ConnectorRegistry::default();
    let without = registry
        .resolve(&path, DocumentType::Document, None, &OptionMap::new())
        .unwrap();
    let with = registry
        .resolve(&path, DocumentType::Document, Some("de"), &OptionMap::new())
        .unwrap();
    assert_eq!(without, with);
}
