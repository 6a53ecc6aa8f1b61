//! Error types and error handling
//!
//! Each pipeline layer owns a narrow error enum. [`GenproError`] aggregates
//! them for callers that only need to know whether a run step failed.
//!
//! Propagation policy:
//! - [`ConfigError`] and [`SchemaError::UnsupportedDriver`] are fatal to the
//!   whole run.
//! - Everything else is scoped to a single (artifact kind, model) pair; the
//!   registry reports it and moves on to the next pair.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error, raised before any model is touched
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No renderer bindings exist for the configured output style
    #[error("unknown output style: '{0}'")]
    UnknownOutputStyle(String),

    /// The `models` map is empty
    #[error("configuration declares no models")]
    NoModels,

    /// The output style key is absent or blank
    #[error("configuration is missing an output style")]
    MissingOutputStyle,

    /// A model uses a schema source tag nobody understands
    #[error("model '{model}' has unsupported schema source '{source_tag}'")]
    UnknownSchemaSource {
        /// Model name
        model: String,
        /// Offending tag
        source_tag: String,
    },

    /// A database-sourced model was declared without `driver`/`dsn`
    #[error("model '{0}' is database-sourced but no driver/dsn is configured")]
    MissingConnection(String),

    /// A text-sourced model has no fields
    #[error("model '{0}' declares no schema")]
    MissingSchema(String),

    /// The template bundle directory does not exist locally
    #[error(
        "template bundle not found at {path}; fetch {url} (ref {reference}) into it first"
    )]
    BundleMissing {
        /// Expected local path
        path: PathBuf,
        /// Remote bundle location
        url: String,
        /// Remote branch or tag
        reference: String,
    },

    /// The configuration sources could not be merged or deserialized
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// Schema resolution error
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A field entry could not be parsed or its type token is unknown
    #[error("malformed field spec '{spec}': {reason}")]
    MalformedFieldSpec {
        /// Raw field entry
        spec: String,
        /// Why it was rejected
        reason: String,
    },

    /// The field list is empty
    #[error("model '{0}' has an empty schema")]
    EmptySchema(String),

    /// No translation table is registered for the driver
    #[error("generating from '{0}' databases is not supported")]
    UnsupportedDriver(String),

    /// The catalog has no table with this name
    #[error("table '{0}' not found in database catalog")]
    TableNotFound(String),

    /// A database-sourced model was resolved without an open catalog connection
    #[error("no database connection is available to resolve '{0}'")]
    CatalogUnavailable(String),

    /// Opening the catalog connection failed
    #[error("could not connect to '{driver}' database: {message}")]
    ConnectFailed {
        /// Driver name
        driver: String,
        /// Driver error text
        message: String,
    },

    /// The table reader failed while querying the catalog
    #[error("catalog query for '{table}' failed: {message}")]
    Catalog {
        /// Table being read
        table: String,
        /// Driver error text
        message: String,
    },
}

impl SchemaError {
    /// Whether this error must stop the whole run rather than one model
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::UnsupportedDriver(_) | Self::ConnectFailed { .. })
    }
}

/// Template engine error
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template was not found in the bundle
    #[error("template not found: {0}")]
    NotFound(String),

    /// Template rendering failed
    #[error("template render error in '{template}': {source}")]
    Render {
        /// Template id
        template: String,
        /// Engine error
        #[source]
        source: minijinja::Error,
    },
}

/// Filesystem materialization error
#[derive(Debug, Error)]
pub enum FsError {
    /// Destination exists and overwriting is disabled
    #[error("file already exists: {0}")]
    FileAlreadyExists(PathBuf),

    /// Renaming the existing file to its backup path failed
    #[error("failed to back up {path} to {backup}: {source}")]
    BackupFailed {
        /// Live file
        path: PathBuf,
        /// Intended backup path
        backup: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Parent directory could not be created
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Generated text is not valid for its target language
    #[error("failed to format {path}: {message}")]
    FormatFailed {
        /// Destination path
        path: PathBuf,
        /// Formatter diagnostic
        message: String,
    },

    /// Writing the final bytes failed
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Aggregate error for one pipeline step
#[derive(Debug, Error)]
pub enum GenproError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Schema resolution error
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Template rendering error
    #[error(transparent)]
    Render(#[from] TemplateError),

    /// Filesystem error
    #[error(transparent)]
    FileSystem(#[from] FsError),
}

impl GenproError {
    /// Whether this error aborts the whole run
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Schema(err) => err.is_fatal(),
            Self::Render(_) | Self::FileSystem(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality() {
        assert!(GenproError::from(ConfigError::NoModels).is_fatal());
        assert!(GenproError::from(SchemaError::UnsupportedDriver("oracle".into())).is_fatal());
        assert!(!GenproError::from(SchemaError::TableNotFound("post".into())).is_fatal());
        assert!(!GenproError::from(FsError::FileAlreadyExists(PathBuf::from("a.rs"))).is_fatal());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = SchemaError::MalformedFieldSpec {
            spec: "title".into(),
            reason: "expected name:type".into(),
        };
        assert_eq!(err.to_string(), "malformed field spec 'title': expected name:type");

        let err = ConfigError::UnknownOutputStyle("fancy".into());
        assert_eq!(err.to_string(), "unknown output style: 'fancy'");
    }
}
