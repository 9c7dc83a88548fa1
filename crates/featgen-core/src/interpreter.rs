//! Analysis outcome interpretation
//!
//! Turns an [`AnalysisOutcome`] into either the scanned feature set or the
//! matching [`ReconciliationError`].

use crate::error::ReconciliationError;
use crate::types::AnalysisOutcome;
use featgen_model::FeatureSet;

/// Interpret an analyzer outcome
///
/// `existing` is the declared feature set the request was built from.
/// Outcomes that compare against the user's own features need them without
/// the generated artifact: with `optimize` on that is `existing`, otherwise
/// `recompute` is called once to re-read them.
///
/// # Errors
/// Every outcome other than `Resolved` and an accepted `Modified` maps to
/// its error kind; a failing `recompute` is returned as is.
pub fn interpret<F>(
    outcome: AnalysisOutcome,
    optimize: bool,
    existing: &FeatureSet,
    recompute: F,
) -> Result<FeatureSet, ReconciliationError>
where
    F: FnOnce() -> Result<FeatureSet, ReconciliationError>,
{
    match outcome {
        AnalysisOutcome::Resolved { features } => Ok(features),

        AnalysisOutcome::Conflict { conflicting } => Err(ReconciliationError::Conflict {
            conflicts: conflicting,
        }),

        AnalysisOutcome::ConflictWithSuggestions {
            conflicting,
            suggested,
        } => {
            let user_features = user_declared(optimize, existing, recompute)?;
            if is_existing_conflict(&conflicting, &user_features) {
                Err(ReconciliationError::ConflictExisting {
                    conflicts: conflicting,
                    suggestions: suggested,
                })
            } else {
                Err(ReconciliationError::ConflictGeneral {
                    conflicts: conflicting,
                    suggestions: suggested,
                })
            }
        }

        AnalysisOutcome::Modified {
            working_set,
            suggested,
        } => {
            let user_features = user_declared(optimize, existing, recompute)?;
            // Custom features never reach the analyzer, so only the
            // platform part can be compared against the working set.
            if working_set.is_superset(&user_features.platform_only()) {
                tracing::warn!(
                    "The analyzer returned a working set of features that differs from the \
                     ones requested; continuing with {working_set}"
                );
                Ok(working_set)
            } else {
                Err(ReconciliationError::ConflictGeneral {
                    conflicts: suggested.union(&user_features),
                    suggestions: working_set,
                })
            }
        }

        AnalysisOutcome::Unavailable {
            conflicting,
            mp_level,
            ee_level,
            unavailable,
        } => Err(ReconciliationError::FeatureUnavailable {
            conflicts: conflicting,
            mp_level,
            ee_level,
            unavailable,
        }),

        AnalysisOutcome::Fatal { cause } => Err(ReconciliationError::Fatal {
            kind: cause.kind,
            message: cause.message,
        }),
    }
}

/// User-declared features, excluding anything the generator wrote earlier
fn user_declared<F>(
    optimize: bool,
    existing: &FeatureSet,
    recompute: F,
) -> Result<FeatureSet, ReconciliationError>
where
    F: FnOnce() -> Result<FeatureSet, ReconciliationError>,
{
    if optimize {
        Ok(existing.clone())
    } else {
        recompute()
    }
}

/// Whether a suggested conflict lies entirely within the user's platform features
fn is_existing_conflict(conflicting: &FeatureSet, user_features: &FeatureSet) -> bool {
    let declared = user_features.platform_only();
    !declared.is_empty() && !conflicting.is_empty() && conflicting.is_subset(&declared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::AnalyzerFailure;
    use pretty_assertions::assert_eq;

    fn set(names: &[&str]) -> FeatureSet {
        FeatureSet::from_names(names).unwrap()
    }

    fn no_recompute() -> Result<FeatureSet, ReconciliationError> {
        panic!("recompute must not be called")
    }

    #[test]
    fn resolved_passes_through() {
        let scanned = interpret(
            AnalysisOutcome::Resolved {
                features: set(&["cdi-2.0"]),
            },
            true,
            &FeatureSet::new(),
            no_recompute,
        )
        .unwrap();
        assert_eq!(scanned, set(&["cdi-2.0"]));
    }

    #[test]
    fn plain_conflict() {
        let err = interpret(
            AnalysisOutcome::Conflict {
                conflicting: set(&["cdi-1.2", "cdi-2.0"]),
            },
            true,
            &FeatureSet::new(),
            no_recompute,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn suggestion_within_declared_features_is_existing_conflict() {
        let existing = set(&["servlet-3.1", "servlet-4.0", "usr:x-1.0"]);
        let err = interpret(
            AnalysisOutcome::ConflictWithSuggestions {
                conflicting: set(&["servlet-3.1", "servlet-4.0"]),
                suggested: set(&["servlet-4.0"]),
            },
            true,
            &existing,
            no_recompute,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConflictExisting);
    }

    #[test]
    fn suggestion_beyond_declared_features_is_general_conflict() {
        let err = interpret(
            AnalysisOutcome::ConflictWithSuggestions {
                conflicting: set(&["servlet-3.1", "jaxrs-2.1"]),
                suggested: set(&["servlet-4.0", "jaxrs-2.1"]),
            },
            true,
            &set(&["servlet-3.1"]),
            no_recompute,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConflictGeneral);
    }

    #[test]
    fn suggestion_without_declared_features_is_general_conflict() {
        let err = interpret(
            AnalysisOutcome::ConflictWithSuggestions {
                conflicting: set(&["servlet-3.1"]),
                suggested: set(&["servlet-4.0"]),
            },
            true,
            &FeatureSet::new(),
            no_recompute,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConflictGeneral);
    }

    #[test]
    fn suggestion_involving_generated_features_is_general_conflict_without_optimize() {
        // servlet-4.0 only comes from the generated artifact
        let err = interpret(
            AnalysisOutcome::ConflictWithSuggestions {
                conflicting: set(&["servlet-3.1", "servlet-4.0"]),
                suggested: set(&["servlet-4.0"]),
            },
            false,
            &set(&["servlet-3.1", "servlet-4.0"]),
            || Ok(set(&["servlet-3.1"])),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConflictGeneral);
    }

    #[test]
    fn suggestion_within_user_features_is_existing_conflict_without_optimize() {
        let err = interpret(
            AnalysisOutcome::ConflictWithSuggestions {
                conflicting: set(&["servlet-3.1", "servlet-4.0"]),
                suggested: set(&["servlet-4.0"]),
            },
            false,
            &set(&["servlet-3.1", "servlet-4.0", "jaxrs-2.1"]),
            || Ok(set(&["servlet-3.1", "servlet-4.0"])),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConflictExisting);
    }

    #[test]
    fn modified_superset_is_accepted_when_optimizing() {
        let scanned = interpret(
            AnalysisOutcome::Modified {
                working_set: set(&["servlet-4.0", "jaxrs-2.1"]),
                suggested: FeatureSet::new(),
            },
            true,
            &set(&["servlet-4.0", "usr:custom-1.0"]),
            no_recompute,
        )
        .unwrap();
        assert_eq!(scanned, set(&["jaxrs-2.1", "servlet-4.0"]));
    }

    #[test]
    fn modified_missing_user_feature_is_general_conflict() {
        let err = interpret(
            AnalysisOutcome::Modified {
                working_set: set(&["servlet-4.0"]),
                suggested: set(&["jaxrs-2.1"]),
            },
            true,
            &set(&["servlet-3.1"]),
            no_recompute,
        )
        .unwrap_err();
        match err {
            ReconciliationError::ConflictGeneral {
                conflicts,
                suggestions,
            } => {
                assert_eq!(conflicts, set(&["jaxrs-2.1", "servlet-3.1"]));
                assert_eq!(suggestions, set(&["servlet-4.0"]));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn modified_recomputes_user_features_without_optimize() {
        let mut called = false;
        let scanned = interpret(
            AnalysisOutcome::Modified {
                working_set: set(&["servlet-4.0"]),
                suggested: FeatureSet::new(),
            },
            false,
            &set(&["servlet-4.0", "jaxrs-2.1"]),
            || {
                called = true;
                Ok(set(&["SERVLET-4.0"]))
            },
        )
        .unwrap();
        assert!(called);
        assert_eq!(scanned, set(&["servlet-4.0"]));
    }

    #[test]
    fn modified_ignores_custom_features_missing_from_working_set() {
        // the analyzer never sees usr:custom-1.0, so it cannot keep it
        let working = set(&["servlet-4.0", "jaxrs-2.1"]);
        let scanned = interpret(
            AnalysisOutcome::Modified {
                working_set: working.clone(),
                suggested: FeatureSet::new(),
            },
            false,
            &set(&["servlet-4.0", "usr:custom-1.0"]),
            || Ok(set(&["servlet-4.0", "usr:custom-1.0"])),
        )
        .unwrap();
        assert!(!scanned.contains_name("usr:custom-1.0"));
        assert_eq!(scanned, working);
    }

    #[test]
    fn recompute_failure_propagates() {
        let err = interpret(
            AnalysisOutcome::Modified {
                working_set: FeatureSet::new(),
                suggested: FeatureSet::new(),
            },
            false,
            &FeatureSet::new(),
            || Err(ReconciliationError::fatal("IoError", "gone")),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fatal);
    }

    #[test]
    fn unavailable_and_fatal() {
        let err = interpret(
            AnalysisOutcome::Unavailable {
                conflicting: set(&["mpHealth-3.0"]),
                mp_level: Some("mp1.0".to_string()),
                ee_level: Some("ee7".to_string()),
                unavailable: set(&["mpHealth-3.0"]),
            },
            true,
            &FeatureSet::new(),
            no_recompute,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FeatureUnavailable);

        let err = interpret(
            AnalysisOutcome::Fatal {
                cause: AnalyzerFailure::new("IOException", "boom"),
            },
            true,
            &FeatureSet::new(),
            no_recompute,
        )
        .unwrap_err();
        assert!(err.to_string().contains("IOException"));
        assert!(err.to_string().contains("boom"));
    }
}
