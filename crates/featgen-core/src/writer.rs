//! Generated artifact persistence
//!
//! The generated artifact is machine-owned and rewritten in full. The
//! primary configuration only ever receives a single pointer comment.

use crate::error::ReconciliationError;
use crate::types::{ReconciliationPlan, WriteOutcome};
use featgen_config::{has_pointer_comment, insert_pointer_comment, ConfigDocument, ServerLayout};
use featgen_model::FeatureSet;
use std::path::PathBuf;

/// Header comment at the top of every generated artifact
pub const HEADER: &str = "This file was generated by the featgen feature generator and will be \
                          overwritten on subsequent runs. Do not edit it by hand; commit it to \
                          version control alongside server.xml.";

/// Comment introducing generated features
pub const FEATURES_COMMENT: &str =
    "The following features were generated based on detected API usage in your application";

/// Comment in a placeholder artifact
pub const NO_FEATURES_COMMENT: &str = "No additional features generated";

/// Pointer comment added once to the primary configuration
///
/// `reference` locates the generated artifact from the primary
/// configuration file, see [`ServerLayout::generated_features_reference`].
#[must_use]
pub fn pointer_comment(reference: &str) -> String {
    format!(
        "The featgen feature generator added features required by your application to \
         {reference}"
    )
}

/// Applies a [`ReconciliationPlan`] to disk
#[derive(Debug, Clone)]
pub struct GeneratedArtifactWriter {
    layout: ServerLayout,
}

impl GeneratedArtifactWriter {
    /// Create writer for `layout`
    #[inline]
    #[must_use]
    pub fn new(layout: ServerLayout) -> Self {
        Self { layout }
    }

    /// Path of the generated artifact
    #[inline]
    #[must_use]
    pub fn artifact_path(&self) -> PathBuf {
        self.layout.generated_features_path()
    }

    /// Execute `plan`
    ///
    /// # Errors
    /// `ReconciliationError::ArtifactWriteFailed` if the artifact or the
    /// pointer comment cannot be written
    pub fn write(&self, plan: &ReconciliationPlan) -> Result<WriteOutcome, ReconciliationError> {
        match plan {
            ReconciliationPlan::Write(features) => {
                let path = self.write_features(features)?;
                let pointer_added = self.ensure_pointer()?;
                tracing::info!("Generated the following features: {features}");
                Ok(WriteOutcome::Written {
                    path,
                    features: features.clone(),
                    pointer_added,
                })
            }
            ReconciliationPlan::Noop(features) => {
                tracing::info!("Regenerated the following features: {features}");
                Ok(WriteOutcome::Regenerated {
                    features: features.clone(),
                })
            }
            ReconciliationPlan::ClearOrNoop {
                artifact_exists: true,
            } => {
                let path = self.write_placeholder()?;
                tracing::info!("No additional features were generated.");
                Ok(WriteOutcome::Cleared { path })
            }
            ReconciliationPlan::ClearOrNoop {
                artifact_exists: false,
            } => {
                tracing::info!("No additional features were generated.");
                Ok(WriteOutcome::NothingToWrite)
            }
        }
    }

    fn write_features(&self, features: &FeatureSet) -> Result<PathBuf, ReconciliationError> {
        let mut doc = ConfigDocument::new();
        doc.create_comment(HEADER)
            .create_feature_manager_comment(FEATURES_COMMENT);
        for feature in features {
            doc.create_feature(feature.name());
        }
        self.persist(&doc)
    }

    fn write_placeholder(&self) -> Result<PathBuf, ReconciliationError> {
        let mut doc = ConfigDocument::new();
        doc.create_comment(HEADER)
            .create_feature_manager_comment(NO_FEATURES_COMMENT);
        self.persist(&doc)
    }

    fn persist(&self, doc: &ConfigDocument) -> Result<PathBuf, ReconciliationError> {
        let path = self.artifact_path();
        doc.write(&path)
            .map_err(|e| ReconciliationError::write_failed(&path, e))?;
        tracing::debug!("wrote {}", path.display());
        Ok(path)
    }

    /// Add the pointer comment unless one is already there
    fn ensure_pointer(&self) -> Result<bool, ReconciliationError> {
        let server_xml = self.layout.server_xml();
        if !server_xml.is_file() {
            return Ok(false);
        }
        let reference = self.layout.generated_features_reference();
        let present = has_pointer_comment(server_xml, &reference)
            .map_err(|e| ReconciliationError::write_failed(server_xml, e))?;
        if present {
            return Ok(false);
        }
        insert_pointer_comment(server_xml, &pointer_comment(&reference))
            .map_err(|e| ReconciliationError::write_failed(server_xml, e))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use featgen_config::{CaseMode, ServerConfigReader, GENERATED_FEATURES_PATH};
    use featgen_test_utils::{features, ServerFixture};
    use pretty_assertions::assert_eq;
    use std::fs;

    fn read_back(path: &std::path::Path) -> FeatureSet {
        ServerConfigReader::new()
            .read_file_features(path, CaseMode::Preserve)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn write_plan_creates_artifact_and_pointer() {
        let fixture = ServerFixture::new().with_server_xml(&["servlet-4.0"]);
        let writer = GeneratedArtifactWriter::new(fixture.layout().clone());

        let outcome = writer
            .write(&ReconciliationPlan::Write(features(&["jaxrs-2.1", "cdi-2.0"])))
            .unwrap();
        let (path, pointer_added) = match outcome {
            WriteOutcome::Written {
                path,
                pointer_added,
                ..
            } => (path, pointer_added),
            other => panic!("unexpected outcome {other:?}"),
        };
        assert!(pointer_added);
        assert_eq!(read_back(&path), features(&["cdi-2.0", "jaxrs-2.1"]));

        let artifact = fs::read_to_string(&path).unwrap();
        assert!(artifact.contains(HEADER));
        assert!(artifact.contains(FEATURES_COMMENT));
        assert!(
            artifact.find("cdi-2.0").unwrap() < artifact.find("jaxrs-2.1").unwrap(),
            "features are written in sorted order"
        );

        let server_xml = fs::read_to_string(fixture.layout().server_xml()).unwrap();
        assert!(server_xml.contains(GENERATED_FEATURES_PATH));
        assert!(server_xml.contains("<feature>servlet-4.0</feature>"));
    }

    #[test]
    fn pointer_is_added_once() {
        let fixture = ServerFixture::new().with_server_xml(&["servlet-4.0"]);
        let writer = GeneratedArtifactWriter::new(fixture.layout().clone());
        writer
            .write(&ReconciliationPlan::Write(features(&["jaxrs-2.1"])))
            .unwrap();
        let outcome = writer
            .write(&ReconciliationPlan::Write(features(&["cdi-2.0"])))
            .unwrap();
        assert!(matches!(
            outcome,
            WriteOutcome::Written {
                pointer_added: false,
                ..
            }
        ));
        let server_xml = fs::read_to_string(fixture.layout().server_xml()).unwrap();
        assert_eq!(server_xml.matches(GENERATED_FEATURES_PATH).count(), 1);
    }

    #[test]
    fn noop_touches_nothing() {
        let fixture = ServerFixture::new()
            .with_server_xml(&["servlet-4.0"])
            .with_generated(&["jaxrs-2.1"]);
        let before = fs::read_to_string(fixture.generated_path()).unwrap();
        let outcome = GeneratedArtifactWriter::new(fixture.layout().clone())
            .write(&ReconciliationPlan::Noop(features(&["jaxrs-2.1"])))
            .unwrap();
        assert!(!outcome.touched_disk());
        assert_eq!(fs::read_to_string(fixture.generated_path()).unwrap(), before);
    }

    #[test]
    fn clear_writes_placeholder() {
        let fixture = ServerFixture::new()
            .with_server_xml(&["servlet-4.0"])
            .with_generated(&["jaxrs-2.1"]);
        let outcome = GeneratedArtifactWriter::new(fixture.layout().clone())
            .write(&ReconciliationPlan::ClearOrNoop {
                artifact_exists: true,
            })
            .unwrap();
        assert!(matches!(outcome, WriteOutcome::Cleared { .. }));

        let artifact = fs::read_to_string(fixture.generated_path()).unwrap();
        assert!(artifact.contains(NO_FEATURES_COMMENT));
        assert!(read_back(&fixture.generated_path()).is_empty());
    }

    #[test]
    fn nothing_to_write_creates_nothing() {
        let fixture = ServerFixture::new().with_server_xml(&["servlet-4.0"]);
        let outcome = GeneratedArtifactWriter::new(fixture.layout().clone())
            .write(&ReconciliationPlan::ClearOrNoop {
                artifact_exists: false,
            })
            .unwrap();
        assert_eq!(outcome, WriteOutcome::NothingToWrite);
        assert!(!fixture.generated_path().exists());
    }

    #[test]
    fn pointer_outside_config_dir_names_artifact_path() {
        let fixture = ServerFixture::new();
        let elsewhere = fixture.root().join("elsewhere");
        fs::create_dir_all(&elsewhere).unwrap();
        let server_xml = elsewhere.join("server.xml");
        fs::write(
            &server_xml,
            "<server>\n    <featureManager>\n        <feature>servlet-4.0</feature>\n    \
             </featureManager>\n</server>\n",
        )
        .unwrap();
        let layout = fixture.layout().clone().with_server_xml(&server_xml);
        let writer = GeneratedArtifactWriter::new(layout);

        writer
            .write(&ReconciliationPlan::Write(features(&["jaxrs-2.1"])))
            .unwrap();
        let text = fs::read_to_string(&server_xml).unwrap();
        let artifact = fixture.generated_path().display().to_string();
        assert!(text.contains(&pointer_comment(&artifact)));

        // the full path is also what marks the pointer as present
        let outcome = writer
            .write(&ReconciliationPlan::Write(features(&["cdi-2.0"])))
            .unwrap();
        assert!(matches!(
            outcome,
            WriteOutcome::Written {
                pointer_added: false,
                ..
            }
        ));
        let text = fs::read_to_string(&server_xml).unwrap();
        assert_eq!(text.matches(&artifact).count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn unwritable_location_is_write_failure() {
        let fixture = ServerFixture::new().with_server_xml(&["servlet-4.0"]);
        // a file where the overrides directory should be
        let dropins = fixture.layout().config_dir().join("configDropins");
        fs::write(&dropins, "not a directory").unwrap();

        let err = GeneratedArtifactWriter::new(fixture.layout().clone())
            .write(&ReconciliationPlan::Write(features(&["jaxrs-2.1"])))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArtifactWriteFailed);
    }
}
