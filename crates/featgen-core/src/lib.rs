//! Featgen Core - Feature Reconciliation Engine
//!
//! Drives one feature generation run:
//! - Collects the features the server configuration declares
//! - Asks an analyzer which features the compiled application needs
//! - Turns the analyzer's verdict into a scanned feature set or an error
//! - Works out which features are missing from the user's configuration
//! - Persists them to `configDropins/overrides/generated-features.xml`
//!
//! # Example
//!
//! ```rust,ignore
//! use featgen_core::{AnalysisOutcome, AnalysisRequest, FeatureGenerator, GeneratorConfig};
//!
//! let config = GeneratorConfig::new("src/main/liberty/config")
//!     .with_class_dirs(["target/classes"]);
//! let generator = FeatureGenerator::new(config, |req: &AnalysisRequest| {
//!     AnalysisOutcome::Resolved { features: req.existing_platform_features.clone() }
//! });
//!
//! let report = generator.run()?;
//! println!("{:?}", report.outcome);
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod analyzer;
pub mod classes;
pub mod collector;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod interpreter;
pub mod types;
pub mod writer;

// Re-exports for convenience
pub use analyzer::{FeatureAnalyzer, ProcessAnalyzer};
pub use classes::ClassDirectories;
pub use collector::FeatureCollector;
pub use config::{AnalyzerCommand, GeneratorConfig, LoadError, DEFAULT_LOG_FILE};
pub use engine::{missing_features, ReconciliationEngine};
pub use error::{ErrorKind, ReconciliationError};
pub use generator::FeatureGenerator;
pub use interpreter::interpret;
pub use types::{
    AnalysisOutcome, AnalysisRequest, AnalyzerFailure, GenerationReport, ReconciliationPlan,
    WriteOutcome,
};
pub use writer::GeneratedArtifactWriter;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running feature generation
    pub use crate::{
        AnalysisOutcome, AnalysisRequest, FeatureAnalyzer, FeatureGenerator, GeneratorConfig,
        ProcessAnalyzer, ReconciliationError, WriteOutcome,
    };
    pub use featgen_model::{Feature, FeatureSet};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use featgen_test_utils::{features, ServerFixture};
    use std::fs;

    #[test]
    fn generate_then_clear() {
        let fixture = ServerFixture::new().with_server_xml(&["servlet-4.0"]);
        let config = GeneratorConfig::new(fixture.layout().config_dir());

        let needs_jaxrs = FeatureGenerator::new(config.clone(), |_: &AnalysisRequest| {
            AnalysisOutcome::Resolved {
                features: features(&["servlet-4.0", "jaxrs-2.1"]),
            }
        });
        let report = needs_jaxrs.run().unwrap();
        assert!(report.outcome.touched_disk());
        assert!(fs::read_to_string(fixture.generated_path())
            .unwrap()
            .contains("<feature>jaxrs-2.1</feature>"));

        let needs_nothing = FeatureGenerator::new(config, |_: &AnalysisRequest| {
            AnalysisOutcome::Resolved {
                features: features(&["servlet-4.0"]),
            }
        });
        let report = needs_nothing.run().unwrap();
        assert!(matches!(report.outcome, WriteOutcome::Cleared { .. }));
        assert!(!fs::read_to_string(fixture.generated_path())
            .unwrap()
            .contains("<feature>"));
    }
}
