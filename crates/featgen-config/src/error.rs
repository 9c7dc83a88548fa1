//! Error types for the config layer
//!
//! Provides error handling for:
//! - Reading configuration documents (file → features)
//! - Writing generated documents (features → file)

use std::path::PathBuf;

/// Errors reading or writing server configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error on a configuration file
    #[error("io error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML
    #[error("malformed XML in {path}: {source}")]
    Xml {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: quick_xml::Error,
    },

    /// Document has no `<server>` root element
    #[error("no <server> root element in {0}")]
    MissingRoot(PathBuf),

    /// Rendering a document failed
    #[error("failed to render document: {0}")]
    Render(#[source] quick_xml::Error),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create XML error for path
    pub fn xml_error(path: impl Into<PathBuf>, source: quick_xml::Error) -> Self {
        Self::Xml {
            path: path.into(),
            source,
        }
    }

    /// Short classification used when wrapping this error
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IoError",
            Self::Xml { .. } => "XmlError",
            Self::MissingRoot(_) => "MissingRoot",
            Self::Render(_) => "RenderError",
        }
    }
}

/// Result type alias for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;
