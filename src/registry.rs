//! Connector registry and resource resolution.
//!
//! The registry holds connector factories in a fixed probe order: plugins
//! first (most recently registered wins), then the built-in conventions from
//! most specific to most general. Resolution asks each factory's connector
//! whether it claims the resource and dispatches to the first claimant.

use std::path::Path;

use tracing::debug;

use crate::connector::columnar::ColumnarConnector;
use crate::connector::file::FileConnector;
use crate::connector::folder::FolderConnector;
use crate::connector::json::JsonConnector;
use crate::connector::source_target::SourceTargetConnector;
use crate::connector::{Connector, columnar, file, folder, json, source_target};
use crate::constants::connectors;
use crate::document::{DocumentType, ImportedItem};
use crate::errors::ImportError;
use crate::options::{OptionMap, OptionSpec};

/// Factory producing a configured connector from the flat option map.
type ConnectorBuilder = fn(&OptionMap) -> Result<Box<dyn Connector>, ImportError>;

/// One registered connector: its name, declared options, and builder.
struct RegisteredConnector {
    name: &'static str,
    specs: &'static [OptionSpec],
    builder: ConnectorBuilder,
}

/// Ordered collection of connector factories.
///
/// [`ConnectorRegistry::default`] carries the built-in conventions; plugins
/// registered afterwards are probed before every built-in.
pub struct ConnectorRegistry {
    plugins: Vec<RegisteredConnector>,
    builtins: Vec<RegisteredConnector>,
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ConnectorRegistry {
    /// Registry with only the built-in connectors, most specific first.
    pub fn with_builtins() -> Self {
        Self {
            plugins: Vec::new(),
            builtins: vec![
                RegisteredConnector {
                    name: connectors::SOURCE_TARGET,
                    specs: source_target::OPTION_SPECS,
                    builder: |options| {
                        Ok(Box::new(SourceTargetConnector::from_options(options)?))
                    },
                },
                RegisteredConnector {
                    name: connectors::COLUMNAR,
                    specs: columnar::OPTION_SPECS,
                    builder: |options| Ok(Box::new(ColumnarConnector::from_options(options)?)),
                },
                RegisteredConnector {
                    name: connectors::JSON,
                    specs: json::OPTION_SPECS,
                    builder: |options| Ok(Box::new(JsonConnector::from_options(options)?)),
                },
                RegisteredConnector {
                    name: connectors::FOLDER,
                    specs: folder::OPTION_SPECS,
                    builder: |options| Ok(Box::new(FolderConnector::from_options(options)?)),
                },
                RegisteredConnector {
                    name: connectors::FILE,
                    specs: file::OPTION_SPECS,
                    builder: |options| Ok(Box::new(FileConnector::from_options(options)?)),
                },
            ],
        }
    }

    /// Registry with no connectors at all.
    pub fn empty() -> Self {
        Self {
            plugins: Vec::new(),
            builtins: Vec::new(),
        }
    }

    /// Register a plugin connector probed before every built-in.
    ///
    /// Plugins keep their registration order, so callers feeding in an
    /// externally discovered list preserve its discovery order.
    pub fn register_plugin(
        &mut self,
        name: &'static str,
        specs: &'static [OptionSpec],
        builder: ConnectorBuilder,
    ) {
        self.plugins.push(RegisteredConnector {
            name,
            specs,
            builder,
        });
    }

    /// Names of all registered connectors in probe order.
    pub fn connector_names(&self) -> Vec<&'static str> {
        self.registered().map(|entry| entry.name).collect()
    }

    /// Declared option specs of every registered connector, in probe order.
    ///
    /// Duplicated names across connectors appear once, first declaration
    /// wins.
    pub fn option_specs(&self) -> Vec<&'static OptionSpec> {
        let mut seen = Vec::new();
        let mut specs = Vec::new();
        for spec in self.registered().flat_map(|entry| entry.specs) {
            if !seen.contains(&spec.name) {
                seen.push(spec.name);
                specs.push(spec);
            }
        }
        specs
    }

    /// Resolve the resource at `path` and import it with the first
    /// connector that claims it.
    ///
    /// `language` is advisory only; it is recorded in the trace output and
    /// does not influence connector selection.
    pub fn resolve(
        &self,
        path: &Path,
        document_type: DocumentType,
        language: Option<&str>,
        options: &OptionMap,
    ) -> Result<Vec<ImportedItem>, ImportError> {
        self.validate_options(options)?;
        if !path.exists() {
            return Err(ImportError::ResourceNotFound(path.display().to_string()));
        }
        debug!(
            resource = %path.display(),
            document_type = %document_type,
            language = language.unwrap_or("unspecified"),
            "resolving resource"
        );

        for entry in self.registered() {
            let connector = (entry.builder)(options)?;
            if connector.check_data(path, document_type) {
                debug!(connector = entry.name, resource = %path.display(), "connector claimed resource");
                return connector.import_data(path, document_type);
            }
        }
        Err(ImportError::UnknownResource(path.display().to_string()))
    }

    fn registered(&self) -> impl Iterator<Item = &RegisteredConnector> {
        self.plugins.iter().chain(self.builtins.iter())
    }

    fn validate_options(&self, options: &OptionMap) -> Result<(), ImportError> {
        for key in options.keys() {
            let known = self
                .registered()
                .flat_map(|entry| entry.specs)
                .any(|spec| spec.name == key);
            if !known {
                return Err(ImportError::Configuration(format!(
                    "unknown option '{key}'"
                )));
            }
        }
        Ok(())
    }
}

/// Import a resource with the default registry.
pub fn import_data(
    path: impl AsRef<Path>,
    document_type: DocumentType,
    options: &OptionMap,
) -> Result<Vec<ImportedItem>, ImportError> {
    ConnectorRegistry::default().resolve(path.as_ref(), document_type, None, options)
}
