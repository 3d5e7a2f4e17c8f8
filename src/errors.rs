use std::io;

use thiserror::Error;

use crate::types::ResourceName;

/// Error type for resource resolution, structural validation, and IO failures.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The path does not exist on disk.
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceName),
    /// The resource exists but violates the claiming connector's structure.
    #[error("invalid resource '{resource}': {reason}")]
    InvalidResource {
        /// Name of the offending resource.
        resource: ResourceName,
        /// Human-readable description of the violation.
        reason: String,
    },
    /// No registered connector claimed the resource.
    #[error("unknown resource '{0}': no connector found for this resource")]
    UnknownResource(ResourceName),
    /// Underlying filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An option map entry was unknown or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ImportError {
    /// Build an `InvalidResource` error with a human-readable reason.
    pub fn invalid(resource: impl Into<ResourceName>, reason: impl Into<String>) -> Self {
        Self::InvalidResource {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}
