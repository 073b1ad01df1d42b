//! Error types for registry loading and resolution.
//!
//! [`RegistryError`] covers reading, locating and configuring: XML syntax,
//! document structure, model construction, I/O and serialization.
//! [`ResolveError`] is the one failure the resolver itself can produce.

use std::path::PathBuf;

use thiserror::Error;
use vk_dispatch_core::{FeatureKind, ModelError};

/// Errors that can occur while loading a registry document.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The document is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// A feature entry is neither `<feature>` nor `<extension>`.
    #[error("the tag \"{0}\" is unrecognized")]
    UnrecognizedTag(String),

    /// A required attribute or child element is absent.
    #[error("<{element}> is missing its \"{attribute}\"")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    /// No `VK_HEADER_VERSION` define in `<types>`.
    #[error("the specification is corrupt: VK_HEADER_VERSION was not found")]
    MissingHeaderVersion,

    /// The `VK_HEADER_VERSION` value is not an integer.
    #[error("invalid VK_HEADER_VERSION value \"{0}\"")]
    InvalidHeaderVersion(String),

    /// Building the model from raw entries failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No search location holds a registry file.
    #[error("failed to find an appropriate Vulkan specification file")]
    SpecificationNotFound,

    /// The given path is missing or is not a regular file.
    #[error("the path \"{}\" does not exist or is not a regular file", .0.display())]
    NotAFile(PathBuf),
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that abort resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// An enabled feature's own dependency does not hold against the set of
    /// enabled feature names.
    #[error(
        "the Vulkan {kind} \"{feature}\" has an unmet dependency; the required dependency is \"{dependency}\""
    )]
    UnsatisfiedDependency {
        feature: String,
        kind: FeatureKind,
        dependency: String,
    },

    /// The selection names a different API than the specification was
    /// built for.
    #[error(
        "the selection targets the API \"{selected}\" but the specification was loaded for \"{loaded}\""
    )]
    ApiMismatch { selected: String, loaded: String },
}
