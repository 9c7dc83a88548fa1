//! Reconciliation of scanned and declared features

use crate::collector::FeatureCollector;
use crate::error::ReconciliationError;
use crate::types::ReconciliationPlan;
use featgen_model::FeatureSet;

/// Features the application needs that the user has not declared
#[inline]
#[must_use]
pub fn missing_features(scanned: &FeatureSet, user_defined: &FeatureSet) -> FeatureSet {
    scanned.difference(user_defined)
}

/// Decides what the generated artifact should hold
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    /// Create engine
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compare scanned features against user declarations and plan the write
    ///
    /// With `optimize`, `existing` already holds exactly the user-declared
    /// features. Without it, the user-declared features are re-read with
    /// the generated artifact excluded.
    ///
    /// # Errors
    /// `ReconciliationError::Fatal` if the configuration cannot be re-read
    pub fn reconcile(
        &self,
        scanned: &FeatureSet,
        existing: &FeatureSet,
        optimize: bool,
        collector: &FeatureCollector<'_>,
    ) -> Result<ReconciliationPlan, ReconciliationError> {
        let user_defined = if optimize {
            existing.clone()
        } else {
            collector.collect(true)?
        };

        let missing = missing_features(scanned, &user_defined);
        tracing::debug!(
            "scanned {} features, {} declared by the user, {} missing",
            scanned.len(),
            user_defined.len(),
            missing.len()
        );

        if missing.is_empty() {
            let artifact_exists = collector.layout().generated_features_path().is_file();
            return Ok(ReconciliationPlan::ClearOrNoop { artifact_exists });
        }

        match collector.previous_generated() {
            Some(previous) if previous == missing => Ok(ReconciliationPlan::Noop(missing)),
            _ => Ok(ReconciliationPlan::Write(missing)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featgen_config::ServerConfigReader;
    use featgen_test_utils::{features, ServerFixture};
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_is_case_insensitive_difference() {
        assert_eq!(
            missing_features(
                &features(&["servlet-4.0", "jaxrs-2.1"]),
                &features(&["SERVLET-4.0"])
            ),
            features(&["jaxrs-2.1"])
        );
    }

    #[test]
    fn new_features_are_written() {
        let fixture = ServerFixture::new().with_server_xml(&["servlet-4.0"]);
        let reader = ServerConfigReader::new();
        let collector = FeatureCollector::new(&reader, fixture.layout());
        let plan = ReconciliationEngine::new()
            .reconcile(
                &features(&["servlet-4.0", "jaxrs-2.1"]),
                &features(&["servlet-4.0"]),
                true,
                &collector,
            )
            .unwrap();
        assert_eq!(plan, ReconciliationPlan::Write(features(&["jaxrs-2.1"])));
    }

    #[test]
    fn unchanged_artifact_is_noop() {
        let fixture = ServerFixture::new()
            .with_server_xml(&["servlet-4.0"])
            .with_generated(&["jaxrs-2.1"]);
        let reader = ServerConfigReader::new();
        let collector = FeatureCollector::new(&reader, fixture.layout());
        let plan = ReconciliationEngine::new()
            .reconcile(
                &features(&["servlet-4.0", "JAXRS-2.1"]),
                &features(&["servlet-4.0"]),
                true,
                &collector,
            )
            .unwrap();
        assert_eq!(plan, ReconciliationPlan::Noop(features(&["jaxrs-2.1"])));
    }

    #[test]
    fn changed_artifact_is_rewritten() {
        let fixture = ServerFixture::new()
            .with_server_xml(&["servlet-4.0"])
            .with_generated(&["jaxrs-2.1"]);
        let reader = ServerConfigReader::new();
        let collector = FeatureCollector::new(&reader, fixture.layout());
        let plan = ReconciliationEngine::new()
            .reconcile(
                &features(&["servlet-4.0", "cdi-2.0"]),
                &features(&["servlet-4.0"]),
                true,
                &collector,
            )
            .unwrap();
        assert_eq!(plan, ReconciliationPlan::Write(features(&["cdi-2.0"])));
    }

    #[test]
    fn nothing_missing_reports_artifact_presence() {
        let fixture = ServerFixture::new()
            .with_server_xml(&["servlet-4.0"])
            .with_generated(&["jaxrs-2.1"]);
        let reader = ServerConfigReader::new();
        let collector = FeatureCollector::new(&reader, fixture.layout());
        let engine = ReconciliationEngine::new();

        let plan = engine
            .reconcile(
                &features(&["servlet-4.0"]),
                &features(&["servlet-4.0"]),
                true,
                &collector,
            )
            .unwrap();
        assert_eq!(
            plan,
            ReconciliationPlan::ClearOrNoop {
                artifact_exists: true
            }
        );

        let bare = ServerFixture::new().with_server_xml(&["servlet-4.0"]);
        let collector = FeatureCollector::new(&reader, bare.layout());
        let plan = engine
            .reconcile(&FeatureSet::new(), &FeatureSet::new(), true, &collector)
            .unwrap();
        assert_eq!(
            plan,
            ReconciliationPlan::ClearOrNoop {
                artifact_exists: false
            }
        );
    }

    #[test]
    fn without_optimize_user_features_are_reread() {
        // `existing` includes the generated artifact; the re-read must not
        let fixture = ServerFixture::new()
            .with_server_xml(&["servlet-4.0"])
            .with_generated(&["jaxrs-2.1"]);
        let reader = ServerConfigReader::new();
        let collector = FeatureCollector::new(&reader, fixture.layout());
        let plan = ReconciliationEngine::new()
            .reconcile(
                &features(&["servlet-4.0", "jaxrs-2.1"]),
                &features(&["servlet-4.0", "jaxrs-2.1"]),
                false,
                &collector,
            )
            .unwrap();
        assert_eq!(plan, ReconciliationPlan::Noop(features(&["jaxrs-2.1"])));
    }
}
