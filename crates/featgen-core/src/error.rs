//! Error types for feature reconciliation
//!
//! Every terminal failure renders as one sentence that names the concrete
//! feature sets involved. Analysis-stage errors are raised before anything
//! is written; [`ReconciliationError::ArtifactWriteFailed`] is the only
//! persistence-stage error.

use featgen_config::ConfigError;
use featgen_model::FeatureSet;
use std::path::PathBuf;

/// Main reconciliation error type
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    /// Mutually incompatible features with no workable suggestion
    #[error(
        "A working set of features could not be generated due to conflicts in the required \
         features: {conflicts}. Review and update your application to ensure it is not using \
         conflicting features and APIs from different levels of MicroProfile, Java EE, or \
         Jakarta EE."
    )]
    Conflict {
        /// Conflicting features
        conflicts: FeatureSet,
    },

    /// Conflict among the user-declared features alone
    #[error(
        "A working set of features could not be generated due to conflicts in the features \
         configured in the server configuration: {conflicts}. Review and update your server \
         configuration to ensure it is not using conflicting features from different levels \
         of MicroProfile, Java EE, or Jakarta EE. Refer to the following set of suggested \
         features for guidance: {suggestions}."
    )]
    ConflictExisting {
        /// Conflicting user-declared features
        conflicts: FeatureSet,
        /// Suggested resolution
        suggestions: FeatureSet,
    },

    /// Conflict between declared features and detected API usage
    #[error(
        "A working set of features could not be generated due to conflicts between configured \
         features and the application's API usage: {conflicts}. Review and update your server \
         configuration and application to ensure they are not using conflicting features and \
         APIs from different levels of MicroProfile, Java EE, or Jakarta EE. Refer to the \
         following set of suggested features for guidance: {suggestions}."
    )]
    ConflictGeneral {
        /// Offending features
        conflicts: FeatureSet,
        /// Suggested working set
        suggestions: FeatureSet,
    },

    /// Features that do not exist at the resolved platform levels
    #[error(
        "A working set of features could not be generated due to conflicts in the required \
         features: {conflicts} and required levels of MicroProfile: {mp}, Java EE or Jakarta EE: \
         {ee}. The following features are not available at those levels: {unavailable}. \
         Review and update your application to ensure it is using the correct levels of \
         MicroProfile, Java EE, or Jakarta EE.",
        mp = level_or_unspecified(.mp_level),
        ee = level_or_unspecified(.ee_level)
    )]
    FeatureUnavailable {
        /// Conflicting features
        conflicts: FeatureSet,
        /// MicroProfile level the analyzer resolved
        mp_level: Option<String>,
        /// EE level the analyzer resolved
        ee_level: Option<String>,
        /// Features missing at those levels
        unavailable: FeatureSet,
    },

    /// Unexpected underlying failure
    #[error("An error occurred while generating features ({kind}): {message}")]
    Fatal {
        /// Type of the underlying failure
        kind: String,
        /// Description of the underlying failure
        message: String,
    },

    /// Persisting the generated configuration failed
    #[error("Failed to write generated features to {path}: {source}")]
    ArtifactWriteFailed {
        /// File being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: ConfigError,
    },
}

/// Error kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// [`ReconciliationError::Conflict`]
    Conflict,
    /// [`ReconciliationError::ConflictExisting`]
    ConflictExisting,
    /// [`ReconciliationError::ConflictGeneral`]
    ConflictGeneral,
    /// [`ReconciliationError::FeatureUnavailable`]
    FeatureUnavailable,
    /// [`ReconciliationError::Fatal`]
    Fatal,
    /// [`ReconciliationError::ArtifactWriteFailed`]
    ArtifactWriteFailed,
}

impl ReconciliationError {
    /// Kind of this error
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::ConflictExisting { .. } => ErrorKind::ConflictExisting,
            Self::ConflictGeneral { .. } => ErrorKind::ConflictGeneral,
            Self::FeatureUnavailable { .. } => ErrorKind::FeatureUnavailable,
            Self::Fatal { .. } => ErrorKind::Fatal,
            Self::ArtifactWriteFailed { .. } => ErrorKind::ArtifactWriteFailed,
        }
    }

    /// Whether the error came from analysis rather than persistence
    #[inline]
    #[must_use]
    pub fn is_analysis_failure(&self) -> bool {
        !matches!(self, Self::ArtifactWriteFailed { .. })
    }

    /// Create fatal error
    #[inline]
    pub fn fatal(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fatal {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Wrap a configuration read failure as fatal
    #[must_use]
    pub fn from_config(err: &ConfigError) -> Self {
        Self::fatal(err.kind(), err.to_string())
    }

    /// Wrap a persistence failure
    #[inline]
    pub fn write_failed(path: impl Into<PathBuf>, source: ConfigError) -> Self {
        Self::ArtifactWriteFailed {
            path: path.into(),
            source,
        }
    }
}

fn level_or_unspecified(level: &Option<String>) -> &str {
    level.as_deref().unwrap_or("unspecified")
}
