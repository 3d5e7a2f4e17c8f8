//! End-to-end `.source`/`.target` imports through the default registry.

use corpora::{DocumentType, ImportError, OptionMap, import_data};
use tempfile::tempdir;

#[test]
fn paired_directories_resolve_to_the_source_target_connector() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("train.source"), "s one\ns two").unwrap();
    std::fs::write(temp.path().join("train.target"), "t one\nt two").unwrap();

    let items = import_data(temp.path(), DocumentType::Document, &OptionMap::new()).unwrap();
    assert_eq!(items.len(), 2);
    let first = items[0].as_document().unwrap();
    assert_eq!(first.text, "s one");
    assert_eq!(first.summary.as_deref(), Some("t one"));
    assert_eq!(first.metadata["resource_name"], "train.source-0");
}

#[test]
fn single_pair_member_resolves_to_its_sibling() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("val.source"), "body").unwrap();
    std::fs::write(temp.path().join("val.target"), "ref").unwrap();

    let items = import_data(
        temp.path().join("val.target"),
        DocumentType::Document,
        &OptionMap::new(),
    )
    .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_document().unwrap().text, "body");
    assert_eq!(items[0].summary(), Some("ref"));
}

#[test]
fn unit_count_mismatch_fails_instead_of_importing_partially() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("bad.source"), "one\ntwo\nthree").unwrap();
    std::fs::write(temp.path().join("bad.target"), "uno\ndos").unwrap();

    let err = import_data(temp.path(), DocumentType::Document, &OptionMap::new()).unwrap_err();
    assert!(matches!(err, ImportError::InvalidResource { .. }));
}

#[test]
fn custom_separator_realigns_the_units() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("pair.source"), "a|b").unwrap();
    std::fs::write(temp.path().join("pair.target"), "x|y").unwrap();

    let mut options = OptionMap::new();
    options.insert("separator".to_string(), "|".to_string());
    let items = import_data(temp.path(), DocumentType::Document, &options).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].as_document().unwrap().text, "b");
    assert_eq!(items[1].summary(), Some("y"));
}
