//! Feature generation pipeline
//!
//! ```text
//! collect ─► analyze ─► interpret ─► reconcile ─► write
//! ```
//!
//! Every analysis-stage step runs before anything touches the disk, so a
//! failed run leaves the server configuration exactly as it was.

use crate::analyzer::FeatureAnalyzer;
use crate::classes::ClassDirectories;
use crate::collector::FeatureCollector;
use crate::config::GeneratorConfig;
use crate::engine::ReconciliationEngine;
use crate::error::ReconciliationError;
use crate::interpreter::interpret;
use crate::types::{AnalysisRequest, GenerationReport};
use crate::writer::GeneratedArtifactWriter;
use featgen_config::{ServerConfigReader, ServerLayout};
use featgen_model::{FeatureSet, VersionResolver};

/// Runs one feature generation
#[derive(Debug)]
pub struct FeatureGenerator<A> {
    config: GeneratorConfig,
    layout: ServerLayout,
    reader: ServerConfigReader,
    analyzer: A,
    engine: ReconciliationEngine,
    writer: GeneratedArtifactWriter,
}

impl<A: FeatureAnalyzer> FeatureGenerator<A> {
    /// Create generator
    pub fn new(config: GeneratorConfig, analyzer: A) -> Self {
        let layout = config.layout();
        let reader = config.reader();
        let writer = GeneratedArtifactWriter::new(layout.clone());
        Self {
            config,
            layout,
            reader,
            analyzer,
            engine: ReconciliationEngine::new(),
            writer,
        }
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Server layout
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &ServerLayout {
        &self.layout
    }

    /// Analyzer
    #[inline]
    #[must_use]
    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Collector over this server
    #[must_use]
    pub fn collector(&self) -> FeatureCollector<'_> {
        FeatureCollector::new(&self.reader, &self.layout)
    }

    /// Build the analyzer request for `existing`
    #[must_use]
    pub fn build_request(&self, existing: &FeatureSet) -> AnalysisRequest {
        let levels = VersionResolver::resolve(&self.config.dependencies);
        AnalysisRequest {
            existing_platform_features: existing.platform_only(),
            explicit_class_inputs: self.config.class_files.clone(),
            class_directories: ClassDirectories::discover(&self.config.class_dirs),
            log_target: self.config.log_target_path(),
            ee_version: levels.ee,
            mp_version: levels.mp,
            optimize: self.config.optimize,
        }
    }

    /// Generate features and update the generated artifact
    ///
    /// # Errors
    /// - Analysis-stage errors (`Conflict`, `ConflictExisting`,
    ///   `ConflictGeneral`, `FeatureUnavailable`, `Fatal`) leave the disk
    ///   untouched
    /// - `ArtifactWriteFailed` if persisting fails
    pub fn run(&self) -> Result<GenerationReport, ReconciliationError> {
        let optimize = self.config.optimize;
        let collector = self.collector();

        tracing::info!(
            "Generating features for {} (optimize: {optimize})",
            self.layout.server_xml().display()
        );

        let existing = collector.collect(optimize)?;
        let request = self.build_request(&existing);
        tracing::debug!(
            "analyzer request: {} platform features, {} class directories, ee={:?}, mp={:?}",
            request.existing_platform_features.len(),
            request.class_directories.len(),
            request.ee_version,
            request.mp_version
        );

        let outcome = self.analyzer.analyze(&request);
        tracing::debug!("analyzer outcome: {}", outcome.label());

        let scanned = interpret(outcome, optimize, &existing, || collector.collect(true))?;
        let plan = self
            .engine
            .reconcile(&scanned, &existing, optimize, &collector)?;
        let outcome = self.writer.write(&plan)?;

        Ok(GenerationReport {
            request,
            scanned,
            plan,
            outcome,
        })
    }
}
