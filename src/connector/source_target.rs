//! Parallel `.source`/`.target` connector.
//!
//! A resource is either one file of a pair (the sibling with the other
//! extension must exist) or a directory searched recursively where every
//! `.source` file has a matching `.target` file. Each matched pair is split
//! by a configurable separator into aligned unit arrays; unequal counts are
//! a hard structural failure, never a partial import.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::connector::{Connector, conversation_units, invalid, resource_metadata};
use crate::constants::connectors;
use crate::constants::source_target::{
    DEFAULT_UNIT_SEPARATOR, SOURCE_EXTENSION, TARGET_EXTENSION,
};
use crate::constants::text::{DEFAULT_MULTI_DOC_DELIMITER, DEFAULT_SPEAKER_PATTERN};
use crate::document::{Conversation, Document, DocumentType, ImportedItem, Metadata, MultiDocument};
use crate::errors::ImportError;
use crate::options::{OptionKind, OptionMap, OptionSpec, pattern_option, text_option};
use crate::raw::file_name;

/// Options declared by the source-target connector.
pub const OPTION_SPECS: &[OptionSpec] = &[
    OptionSpec {
        name: "separator",
        kind: OptionKind::Text,
        default: DEFAULT_UNIT_SEPARATOR,
        help: "separator splitting each file into aligned units",
    },
    OptionSpec {
        name: "multi_document_delimiter",
        kind: OptionKind::Text,
        default: DEFAULT_MULTI_DOC_DELIMITER,
        help: "token splitting a source unit into several documents",
    },
    OptionSpec {
        name: "conversation_pattern",
        kind: OptionKind::Pattern,
        default: DEFAULT_SPEAKER_PATTERN,
        help: "speaker-tag pattern used to segment source units",
    },
];

/// Connector for aligned `.source`/`.target` file pairs.
pub struct SourceTargetConnector {
    separator: String,
    multi_doc_delimiter: String,
    conversation_tag: Regex,
}

/// One matched pair's contents plus the source file name.
struct PairContent {
    source: String,
    target: String,
    name: String,
}

impl SourceTargetConnector {
    /// Build the connector from the flat option map.
    pub fn from_options(options: &OptionMap) -> Result<Self, ImportError> {
        Ok(Self {
            separator: text_option(options, "separator", DEFAULT_UNIT_SEPARATOR),
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

    fn collect_pairs(&self, path: &Path) -> Result<Vec<PairContent>, ImportError> {
        if path.is_file() {
            let (source_path, target_path) = match pair_paths(path) {
                Some(paths) => paths,
                None => {
                    return Err(invalid(
                        path,
                        "file is not a .source/.target pair member",
                    ));
                }
            };
            return Ok(vec![read_pair(&source_path, &target_path)?]);
        }
        if !path.is_dir() {
            return Err(ImportError::ResourceNotFound(path.display().to_string()));
        }

        let mut pairs = Vec::new();
        for source_path in source_files(path) {
            let target_path = source_path.with_extension(TARGET_EXTENSION);
            if !target_path.is_file() {
                return Err(invalid(
                    path,
                    format!("missing target for {}", source_path.display()),
                ));
            }
            pairs.push(read_pair(&source_path, &target_path)?);
        }
        Ok(pairs)
    }

    fn aligned_units<'a>(
        &self,
        resource: &Path,
        pair: &'a PairContent,
    ) -> Result<Vec<(&'a str, &'a str)>, ImportError> {
        let sources: Vec<&str> = pair.source.split(self.separator.as_str()).collect();
        let targets: Vec<&str> = pair.target.split(self.separator.as_str()).collect();
        if sources.len() != targets.len() {
            return Err(invalid(
                resource,
                format!(
                    "'{}' has {} source units but {} target units",
                    pair.name,
                    sources.len(),
                    targets.len()
                ),
            ));
        }
        Ok(sources.into_iter().zip(targets).collect())
    }

    fn unit_metadata(pair: &PairContent, index: usize) -> Metadata {
        resource_metadata(&format!("{}-{index}", pair.name))
    }
}

impl Connector for SourceTargetConnector {
    fn name(&self) -> &'static str {
        connectors::SOURCE_TARGET
    }

    fn check_data(&self, path: &Path, _document_type: DocumentType) -> bool {
        if path.is_file() {
            return match pair_paths(path) {
                Some((source_path, target_path)) => {
                    source_path.is_file() && target_path.is_file()
                }
                None => false,
            };
        }
        if !path.is_dir() {
            return false;
        }
        let sources = source_files(path);
        if sources.is_empty() {
            return false;
        }
        let target_count = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| has_extension(entry.path(), TARGET_EXTENSION))
            .count();
        sources.len() == target_count
            && sources
                .iter()
                .all(|source| source.with_extension(TARGET_EXTENSION).is_file())
    }

    fn import_data(
        &self,
        path: &Path,
        document_type: DocumentType,
    ) -> Result<Vec<ImportedItem>, ImportError> {
        let pairs = self.collect_pairs(path)?;
        debug!(resource = %path.display(), pairs = pairs.len(), "matched source/target pairs");

        let mut items = Vec::new();
        for pair in &pairs {
            for (index, (source_unit, target_unit)) in
                self.aligned_units(path, pair)?.into_iter().enumerate()
            {
                let metadata = Self::unit_metadata(pair, index);
                let summary = Some(target_unit.to_string());
                items.push(match document_type {
                    DocumentType::Document => {
                        ImportedItem::Document(Document::new(source_unit, summary, metadata))
                    }
                    DocumentType::MultiDocument => {
                        let documents = source_unit
                            .split(self.multi_doc_delimiter.as_str())
                            .filter(|unit| !unit.is_empty())
                            .map(|unit| Document::new(unit, None, Metadata::new()))
                            .collect();
                        ImportedItem::MultiDocument(MultiDocument::new(
                            documents, summary, metadata,
                        ))
                    }
                    DocumentType::Conversation => {
                        let units = conversation_units(source_unit, &self.conversation_tag);
                        ImportedItem::Conversation(Conversation::new(units, summary, metadata))
                    }
                });
            }
        }
        Ok(items)
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(extension)
}

/// Resolve a pair member into `(source_path, target_path)`.
fn pair_paths(path: &Path) -> Option<(PathBuf, PathBuf)> {
    if has_extension(path, SOURCE_EXTENSION) {
        Some((path.to_path_buf(), path.with_extension(TARGET_EXTENSION)))
    } else if has_extension(path, TARGET_EXTENSION) {
        Some((path.with_extension(SOURCE_EXTENSION), path.to_path_buf()))
    } else {
        None
    }
}

/// All `.source` files under a directory, in deterministic path order.
fn source_files(path: &Path) -> Vec<PathBuf> {
    WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), SOURCE_EXTENSION))
        .map(|entry| entry.path().to_path_buf())
        .collect()
}

fn read_pair(source_path: &Path, target_path: &Path) -> Result<PairContent, ImportError> {
    Ok(PairContent {
        source: std::fs::read_to_string(source_path)?,
        target: std::fs::read_to_string(target_path)?,
        name: file_name(source_path),
    })
}
