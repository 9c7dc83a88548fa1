//! Data exchanged between the pipeline stages

use featgen_model::{EeLevel, FeatureSet, MpLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Everything the analyzer needs for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    /// Declared platform features; custom features never appear here
    pub existing_platform_features: FeatureSet,
    /// Explicit class files to analyze; `None` analyzes the class directories
    pub explicit_class_inputs: Option<Vec<String>>,
    /// Directories holding compiled classes
    pub class_directories: BTreeSet<PathBuf>,
    /// Where the analyzer writes its own log
    pub log_target: PathBuf,
    /// Resolved EE level, `None` to let the analyzer detect it
    pub ee_version: Option<EeLevel>,
    /// Resolved MicroProfile level, `None` to let the analyzer detect it
    pub mp_version: Option<MpLevel>,
    /// Whether the analyzer should reduce the feature list
    pub optimize: bool,
}

/// Failure reported by the analyzer itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerFailure {
    /// Type of failure
    pub kind: String,
    /// Description
    pub message: String,
}

impl AnalyzerFailure {
    /// Create failure
    #[inline]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for AnalyzerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// What the analyzer concluded
///
/// Serialized with an `outcome` tag, e.g.
/// `{"outcome":"resolved","features":["cdi-2.0"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Features the application needs
    Resolved {
        /// Scanned features
        features: FeatureSet,
    },
    /// Incompatible features with no suggestion
    Conflict {
        /// Conflicting features
        conflicting: FeatureSet,
    },
    /// Incompatible features with a suggested replacement
    ConflictWithSuggestions {
        /// Conflicting features
        conflicting: FeatureSet,
        /// Suggested replacement set
        suggested: FeatureSet,
    },
    /// A working set exists, but it changes the declared features
    Modified {
        /// Working set proposed by the analyzer
        working_set: FeatureSet,
        /// Suggestion to show if the working set is rejected
        suggested: FeatureSet,
    },
    /// Features do not exist at the resolved platform levels
    Unavailable {
        /// Conflicting features
        conflicting: FeatureSet,
        /// MicroProfile level the analyzer used
        #[serde(default)]
        mp_level: Option<String>,
        /// EE level the analyzer used
        #[serde(default)]
        ee_level: Option<String>,
        /// Features missing at those levels
        unavailable: FeatureSet,
    },
    /// Analyzer failed
    Fatal {
        /// What went wrong
        cause: AnalyzerFailure,
    },
}

impl AnalysisOutcome {
    /// Short label for logging
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Resolved { .. } => "resolved",
            Self::Conflict { .. } => "conflict",
            Self::ConflictWithSuggestions { .. } => "conflict_with_suggestions",
            Self::Modified { .. } => "modified",
            Self::Unavailable { .. } => "unavailable",
            Self::Fatal { .. } => "fatal",
        }
    }
}

/// Decision on what to do with the generated artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationPlan {
    /// Write these features
    Write(FeatureSet),
    /// The artifact already holds exactly these features
    Noop(FeatureSet),
    /// Nothing is missing; clear the artifact if it exists
    ClearOrNoop {
        /// Whether a generated artifact is currently on disk
        artifact_exists: bool,
    },
}

impl ReconciliationPlan {
    /// Features the artifact should hold after this plan runs
    #[must_use]
    pub fn features(&self) -> FeatureSet {
        match self {
            Self::Write(features) | Self::Noop(features) => features.clone(),
            Self::ClearOrNoop { .. } => FeatureSet::new(),
        }
    }
}

/// What the artifact writer did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Artifact written with new content
    Written {
        /// Artifact path
        path: PathBuf,
        /// Features written
        features: FeatureSet,
        /// Whether the pointer comment was added to the primary configuration
        pointer_added: bool,
    },
    /// Artifact already up to date; nothing touched
    Regenerated {
        /// Features the artifact holds
        features: FeatureSet,
    },
    /// Artifact replaced by a placeholder with no features
    Cleared {
        /// Artifact path
        path: PathBuf,
    },
    /// No artifact and nothing to write
    NothingToWrite,
}

impl WriteOutcome {
    /// Whether anything on disk was modified
    #[inline]
    #[must_use]
    pub fn touched_disk(&self) -> bool {
        matches!(self, Self::Written { .. } | Self::Cleared { .. })
    }
}

/// Summary of one generator run
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    /// Request handed to the analyzer
    pub request: AnalysisRequest,
    /// Features the analyzer settled on
    pub scanned: FeatureSet,
    /// Reconciliation decision
    pub plan: ReconciliationPlan,
    /// What was persisted
    pub outcome: WriteOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(names: &[&str]) -> FeatureSet {
        FeatureSet::from_names(names).unwrap()
    }

    #[test]
    fn outcome_wire_format() {
        let outcome: AnalysisOutcome = serde_json::from_str(
            r#"{"outcome":"modified","working_set":["servlet-4.0"],"suggested":["jaxrs-2.1"]}"#,
        )
        .unwrap();
        assert_eq!(
            outcome,
            AnalysisOutcome::Modified {
                working_set: set(&["servlet-4.0"]),
                suggested: set(&["jaxrs-2.1"]),
            }
        );
        assert_eq!(outcome.label(), "modified");
    }

    #[test]
    fn unavailable_levels_are_optional() {
        let outcome: AnalysisOutcome = serde_json::from_str(
            r#"{"outcome":"unavailable","conflicting":["a-1.0"],"unavailable":["b-1.0"]}"#,
        )
        .unwrap();
        match outcome {
            AnalysisOutcome::Unavailable {
                mp_level, ee_level, ..
            } => {
                assert_eq!(mp_level, None);
                assert_eq!(ee_level, None);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn fatal_outcome_carries_cause() {
        let outcome: AnalysisOutcome = serde_json::from_str(
            r#"{"outcome":"fatal","cause":{"kind":"IOException","message":"no classes"}}"#,
        )
        .unwrap();
        assert_eq!(
            outcome,
            AnalysisOutcome::Fatal {
                cause: AnalyzerFailure::new("IOException", "no classes")
            }
        );
    }

    #[test]
    fn request_serializes_levels_as_labels() {
        let request = AnalysisRequest {
            existing_platform_features: set(&["cdi-2.0"]),
            explicit_class_inputs: None,
            class_directories: BTreeSet::new(),
            log_target: PathBuf::from("analyzer.log"),
            ee_version: Some(EeLevel::EE8),
            mp_version: None,
            optimize: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["ee_version"], "ee8");
        assert!(json["mp_version"].is_null());
        assert_eq!(json["existing_platform_features"][0], "cdi-2.0");
    }

    #[test]
    fn plan_features() {
        let plan = ReconciliationPlan::Write(set(&["a-1.0"]));
        assert_eq!(plan.features(), set(&["a-1.0"]));
        assert!(ReconciliationPlan::ClearOrNoop {
            artifact_exists: true
        }
        .features()
        .is_empty());
    }
}
