//! Directory-convention connector.
//!
//! Each item in the directory is a primary content file (or a subdirectory
//! of content files) with optional sidecars: `<base><summary_suffix>.*`
//! holding the reference summary and `<base><metadata_suffix>.json` holding
//! a metadata record. Content may embed a multi-document delimiter token;
//! splitting on it yields several units sharing one identifier.

use std::path::Path;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::connector::{Connector, conversation_units, invalid, resource_metadata};
use crate::constants::connectors;
use crate::constants::folder::{DEFAULT_METADATA_SUFFIX, DEFAULT_SUMMARY_SUFFIX};
use crate::constants::metadata::RESERVED_KEYS;
use crate::constants::source_target::{SOURCE_EXTENSION, TARGET_EXTENSION};
use crate::constants::text::{DEFAULT_MULTI_DOC_DELIMITER, DEFAULT_SPEAKER_PATTERN};
use crate::document::{Conversation, Document, DocumentType, ImportedItem, Metadata, MultiDocument};
use crate::errors::ImportError;
use crate::options::{OptionKind, OptionMap, OptionSpec, pattern_option, text_option};
use crate::raw::{DataKind, RawData, ResourceType, file_name, sorted_entries};
use crate::types::Identifier;

/// Options declared by the folder connector.
pub const OPTION_SPECS: &[OptionSpec] = &[
    OptionSpec {
        name: "summary_suffix",
        kind: OptionKind::Text,
        default: DEFAULT_SUMMARY_SUFFIX,
        help: "suffix marking a sibling file as an item's reference summary",
    },
    OptionSpec {
        name: "metadata_suffix",
        kind: OptionKind::Text,
        default: DEFAULT_METADATA_SUFFIX,
        help: "suffix marking a sibling .json file as an item's metadata record",
    },
    OptionSpec {
        name: "multi_document_delimiter",
        kind: OptionKind::Text,
        default: DEFAULT_MULTI_DOC_DELIMITER,
        help: "token separating embedded documents inside one content file",
    },
    OptionSpec {
        name: "conversation_pattern",
        kind: OptionKind::Pattern,
        default: DEFAULT_SPEAKER_PATTERN,
        help: "speaker-tag pattern used to segment conversation content",
    },
];

/// Connector for directory trees following the sidecar naming convention.
pub struct FolderConnector {
    summary_suffix: String,
    metadata_suffix: String,
    multi_doc_delimiter: String,
    conversation_tag: Regex,
}

/// One item assembled from the fetched envelope tree.
struct FolderItem {
    identifier: Identifier,
    texts: Vec<String>,
    summary: Option<String>,
    metadata: Metadata,
}

impl FolderConnector {
    /// Build the connector from the flat option map.
    pub fn from_options(options: &OptionMap) -> Result<Self, ImportError> {
        Ok(Self {
            summary_suffix: text_option(options, "summary_suffix", DEFAULT_SUMMARY_SUFFIX),
            metadata_suffix: text_option(options, "metadata_suffix", DEFAULT_METADATA_SUFFIX),
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

    /// Fetch a directory into a resource envelope tree.
    ///
    /// The root node nests one child per item; item leaves are tagged
    /// `Text`/`Summary`, metadata sidecars stay untagged `json` leaves.
    pub fn fetch(&self, path: &Path) -> Result<RawData, ImportError> {
        if !path.is_dir() {
            return Err(ImportError::ResourceNotFound(path.display().to_string()));
        }
        let entries = sorted_entries(path)?;
        let names: Vec<String> = entries.iter().map(|entry| file_name(entry)).collect();

        let mut items = Vec::new();
        for entry in &entries {
            let name = file_name(entry);
            if entry.is_file() {
                if self.is_sidecar(&name, &names) {
                    continue;
                }
                if let Some(item) = self.fetch_file_item(entry, &entries)? {
                    items.push(item);
                }
            } else if entry.is_dir() {
                items.push(self.fetch_dir_item(entry, &entries)?);
            }
        }

        Ok(RawData::nested(
            path.display().to_string(),
            ResourceType::Directory,
            items,
        ))
    }

    /// Normalize a fetched envelope tree into canonical containers.
    pub fn import_raw(
        &self,
        raw: &RawData,
        document_type: DocumentType,
    ) -> Result<Vec<ImportedItem>, ImportError> {
        let resource = Path::new(&raw.metadata.resource_name);
        let mut imported = Vec::new();
        for node in raw.children() {
            let item = self.assemble_item(node)?;
            imported.push(self.build_container(resource, item, document_type)?);
        }
        Ok(imported)
    }

    fn fetch_file_item(
        &self,
        path: &Path,
        siblings: &[std::path::PathBuf],
    ) -> Result<Option<RawData>, ImportError> {
        let identifier = file_name(path);
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping unreadable content file");
                return Ok(None);
            }
        };

        let mut children = vec![RawData::text_leaf(
            identifier.clone(),
            ResourceType::from_extension(path),
            Some(DataKind::Text),
            text,
        )];
        self.push_sidecar_leaves(&identifier, siblings, &mut children)?;

        Ok(Some(RawData::nested(
            identifier,
            ResourceType::Directory,
            children,
        )))
    }

    fn fetch_dir_item(
        &self,
        dir: &Path,
        parent_entries: &[std::path::PathBuf],
    ) -> Result<RawData, ImportError> {
        let identifier = file_name(dir);
        let inner = sorted_entries(dir)?;
        let inner_summary_name = self.summary_suffix.trim_start_matches('_').to_string();
        let inner_metadata_name = format!("{}.json", self.metadata_suffix.trim_start_matches('_'));

        let mut children = Vec::new();
        let mut summary_leaf = None;
        let mut metadata_leaf = None;
        for entry in &inner {
            if !entry.is_file() {
                continue;
            }
            let name = file_name(entry);
            let stem = file_stem(&name);
            let text = match std::fs::read_to_string(entry) {
                Ok(text) => text,
                Err(err) => {
                    warn!(file = %entry.display(), error = %err, "skipping unreadable content file");
                    continue;
                }
            };
            if stem == inner_summary_name {
                summary_leaf = Some(RawData::text_leaf(
                    name,
                    ResourceType::from_extension(entry),
                    Some(DataKind::Summary),
                    text,
                ));
            } else if name == inner_metadata_name {
                metadata_leaf = Some(RawData::text_leaf(
                    name,
                    ResourceType::Extension("json".to_string()),
                    None,
                    text,
                ));
            } else {
                children.push(RawData::text_leaf(
                    name,
                    ResourceType::from_extension(entry),
                    Some(DataKind::Text),
                    text,
                ));
            }
        }

        // Parent-level sidecars take precedence over inner ones.
        let mut parent_sidecars = Vec::new();
        self.push_sidecar_leaves(&identifier, parent_entries, &mut parent_sidecars)?;
        let has_parent_summary = parent_sidecars
            .iter()
            .any(|leaf| leaf.metadata.data_kind == Some(DataKind::Summary));
        let has_parent_metadata = parent_sidecars
            .iter()
            .any(|leaf| leaf.metadata.data_kind.is_none());
        children.extend(parent_sidecars);
        if !has_parent_summary && let Some(leaf) = summary_leaf {
            children.push(leaf);
        }
        if !has_parent_metadata && let Some(leaf) = metadata_leaf {
            children.push(leaf);
        }

        Ok(RawData::nested(
            identifier,
            ResourceType::Directory,
            children,
        ))
    }

    fn push_sidecar_leaves(
        &self,
        identifier: &str,
        siblings: &[std::path::PathBuf],
        children: &mut Vec<RawData>,
    ) -> Result<(), ImportError> {
        let stem = file_stem(identifier);
        if let Some(path) = find_suffixed(siblings, identifier, &stem, &self.summary_suffix, None) {
            let text = std::fs::read_to_string(&path)?;
            children.push(RawData::text_leaf(
                file_name(&path),
                ResourceType::from_extension(&path),
                Some(DataKind::Summary),
                text,
            ));
        }
        if let Some(path) =
            find_suffixed(siblings, identifier, &stem, &self.metadata_suffix, Some("json"))
        {
            let text = std::fs::read_to_string(&path)?;
            children.push(RawData::text_leaf(
                file_name(&path),
                ResourceType::Extension("json".to_string()),
                None,
                text,
            ));
        }
        Ok(())
    }

    fn is_sidecar(&self, name: &str, names: &[String]) -> bool {
        names.iter().any(|other| {
            if other == name {
                return false;
            }
            let stem = file_stem(other);
            for base in [other.as_str(), stem.as_str()] {
                if name.starts_with(&format!("{base}{}", self.summary_suffix))
                    || name.starts_with(&format!("{base}{}", self.metadata_suffix))
                {
                    return true;
                }
            }
            false
        })
    }

    fn assemble_item(&self, node: &RawData) -> Result<FolderItem, ImportError> {
        let identifier = node.metadata.resource_name.clone();
        let mut texts = Vec::new();
        let mut summary = None;
        let mut metadata = resource_metadata(&identifier);

        for leaf in node.children() {
            let Some(content) = leaf.as_text() else {
                continue;
            };
            match leaf.metadata.data_kind {
                Some(DataKind::Text) => {
                    for unit in content.split(self.multi_doc_delimiter.as_str()) {
                        if !unit.is_empty() {
                            texts.push(unit.to_string());
                        }
                    }
                }
                Some(DataKind::Summary) => summary = Some(content.to_string()),
                None => merge_metadata_record(&identifier, content, &mut metadata)?,
            }
        }

        Ok(FolderItem {
            identifier,
            texts,
            summary,
            metadata,
        })
    }

    fn build_container(
        &self,
        resource: &Path,
        item: FolderItem,
        document_type: DocumentType,
    ) -> Result<ImportedItem, ImportError> {
        match document_type {
            DocumentType::Document => {
                let text = single_text(resource, &item, document_type)?;
                Ok(ImportedItem::Document(Document::new(
                    text,
                    item.summary,
                    item.metadata,
                )))
            }
            DocumentType::MultiDocument => {
                let documents = item
                    .texts
                    .into_iter()
                    .map(|text| Document::new(text, None, Metadata::new()))
                    .collect();
                Ok(ImportedItem::MultiDocument(MultiDocument::new(
                    documents,
                    item.summary,
                    item.metadata,
                )))
            }
            DocumentType::Conversation => {
                let text = single_text(resource, &item, document_type)?;
                let units = conversation_units(&text, &self.conversation_tag);
                Ok(ImportedItem::Conversation(Conversation::new(
                    units,
                    item.summary,
                    item.metadata,
                )))
            }
        }
    }
}

impl Connector for FolderConnector {
    fn name(&self) -> &'static str {
        connectors::FOLDER
    }

    fn check_data(&self, path: &Path, _document_type: DocumentType) -> bool {
        path.is_dir() && !contains_source_target_files(path)
    }

    fn import_data(
        &self,
        path: &Path,
        document_type: DocumentType,
    ) -> Result<Vec<ImportedItem>, ImportError> {
        let raw = self.fetch(path)?;
        debug!(
            resource = %path.display(),
            items = raw.children().len(),
            "fetched directory envelope"
        );
        self.import_raw(&raw, document_type)
    }
}

/// Whether a directory holds any `.source`/`.target` files (reserved for the
/// source-target connector).
pub(crate) fn contains_source_target_files(path: &Path) -> bool {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .any(|entry| {
            matches!(
                entry.path().extension().and_then(|ext| ext.to_str()),
                Some(SOURCE_EXTENSION) | Some(TARGET_EXTENSION)
            )
        })
}

fn single_text(
    resource: &Path,
    item: &FolderItem,
    document_type: DocumentType,
) -> Result<String, ImportError> {
    match item.texts.as_slice() {
        [text] => Ok(text.clone()),
        texts => Err(invalid(
            resource,
            format!(
                "item '{}' has {} text units, exactly one expected for {}",
                item.identifier,
                texts.len(),
                document_type
            ),
        )),
    }
}

fn merge_metadata_record(
    identifier: &str,
    content: &str,
    metadata: &mut Metadata,
) -> Result<(), ImportError> {
    let record: Value = serde_json::from_str(content).map_err(|err| {
        ImportError::invalid(
            identifier.to_string(),
            format!("metadata sidecar is not valid JSON: {err}"),
        )
    })?;
    let Value::Object(entries) = record else {
        return Err(ImportError::invalid(
            identifier.to_string(),
            "metadata sidecar must be a JSON object",
        ));
    };
    for (key, value) in entries {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        metadata.insert(key, value);
    }
    Ok(())
}

fn file_stem(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(stem, _)| stem.to_string())
        .unwrap_or_else(|| name.to_string())
}

fn find_suffixed(
    siblings: &[std::path::PathBuf],
    name: &str,
    stem: &str,
    suffix: &str,
    required_ext: Option<&str>,
) -> Option<std::path::PathBuf> {
    siblings.iter().cloned().find(|candidate| {
        if !candidate.is_file() {
            return false;
        }
        let candidate_name = file_name(candidate);
        if let Some(ext) = required_ext
            && !candidate_name.ends_with(&format!(".{ext}"))
        {
            return false;
        }
        candidate_name.starts_with(&format!("{name}{suffix}"))
            || candidate_name.starts_with(&format!("{stem}{suffix}"))
    })
}
