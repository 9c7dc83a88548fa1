//! Declared-feature collection

use crate::error::ReconciliationError;
use featgen_config::{CaseMode, ReadOptions, ServerConfigReader, ServerLayout};
use featgen_model::FeatureSet;

/// Collects the features a server declares
///
/// Read failures surface as [`ReconciliationError::Fatal`] since they
/// happen during analysis.
#[derive(Debug, Clone, Copy)]
pub struct FeatureCollector<'a> {
    reader: &'a ServerConfigReader,
    layout: &'a ServerLayout,
}

impl<'a> FeatureCollector<'a> {
    /// Create collector over `layout`
    #[inline]
    #[must_use]
    pub fn new(reader: &'a ServerConfigReader, layout: &'a ServerLayout) -> Self {
        Self { reader, layout }
    }

    /// Server layout being read
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &'a ServerLayout {
        self.layout
    }

    /// Declared features with their original case
    ///
    /// # Errors
    /// `ReconciliationError::Fatal` if any configuration file cannot be read
    pub fn collect(&self, exclude_generated: bool) -> Result<FeatureSet, ReconciliationError> {
        self.collect_with(exclude_generated, CaseMode::Preserve)
    }

    /// Declared features, optionally skipping the generated artifact
    ///
    /// # Errors
    /// `ReconciliationError::Fatal` if any configuration file cannot be read
    pub fn collect_with(
        &self,
        exclude_generated: bool,
        case: CaseMode,
    ) -> Result<FeatureSet, ReconciliationError> {
        let mut options = ReadOptions::new(case);
        if exclude_generated {
            options = options.exclude(self.layout.generated_features_path());
        }
        self.reader
            .read_features(self.layout, &options)
            .map_err(|e| ReconciliationError::from_config(&e))
    }

    /// Features held by the generated artifact, `None` if it does not exist
    ///
    /// A malformed artifact is treated as absent; it is machine-owned and
    /// will be rewritten.
    #[must_use]
    pub fn previous_generated(&self) -> Option<FeatureSet> {
        let path = self.layout.generated_features_path();
        match self.reader.read_file_features(&path, CaseMode::Preserve) {
            Ok(features) => features,
            Err(e) => {
                tracing::warn!("ignoring unreadable generated features: {e}");
                None
            }
        }
    }
}
