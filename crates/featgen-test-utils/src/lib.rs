//! Testing utilities for the featgen workspace
//!
//! Shared fixtures, scripted analyzers and logging setup.

#![allow(missing_docs)]

use featgen_config::{ConfigDocument, ServerLayout};
use featgen_core::{AnalysisOutcome, AnalysisRequest, FeatureAnalyzer};
use featgen_model::FeatureSet;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

pub fn features(names: &[&str]) -> FeatureSet {
    FeatureSet::from_names(names).unwrap()
}

/// Install a test-writer subscriber; later calls are no-ops
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .compact()
        .try_init();
}

/// Analyzer that plays back canned outcomes and records every request
///
/// Outcomes are consumed in order; the last one repeats.
#[derive(Debug, Default)]
pub struct ScriptedAnalyzer {
    outcomes: RefCell<VecDeque<AnalysisOutcome>>,
    requests: RefCell<Vec<AnalysisRequest>>,
}

impl ScriptedAnalyzer {
    pub fn new(outcomes: impl IntoIterator<Item = AnalysisOutcome>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into_iter().collect()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn always(outcome: AnalysisOutcome) -> Self {
        Self::new([outcome])
    }

    pub fn resolving(names: &[&str]) -> Self {
        Self::always(AnalysisOutcome::Resolved {
            features: features(names),
        })
    }

    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<AnalysisRequest> {
        self.requests.borrow().last().cloned()
    }
}

impl FeatureAnalyzer for ScriptedAnalyzer {
    fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        self.requests.borrow_mut().push(request.clone());
        let mut outcomes = self.outcomes.borrow_mut();
        if outcomes.len() > 1 {
            outcomes.pop_front().unwrap()
        } else {
            outcomes.front().cloned().unwrap_or_else(|| AnalysisOutcome::Fatal {
                cause: featgen_core::AnalyzerFailure::new("Scripted", "no outcome scripted"),
            })
        }
    }
}

/// Analyzer that needs the declared platform features plus `extra`
pub fn requiring(extra: &[&str]) -> impl Fn(&AnalysisRequest) -> AnalysisOutcome {
    let extra = features(extra);
    move |request: &AnalysisRequest| AnalysisOutcome::Resolved {
        features: request.existing_platform_features.union(&extra),
    }
}

/// Server configuration directory in a temp dir
pub struct ServerFixture {
    dir: TempDir,
    layout: ServerLayout,
}

impl Default for ServerFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let layout = ServerLayout::new(dir.path());
        Self { dir, layout }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> &ServerLayout {
        &self.layout
    }

    pub fn generated_path(&self) -> PathBuf {
        self.layout.generated_features_path()
    }

    pub fn server_xml_text(&self) -> String {
        fs::read_to_string(self.layout.server_xml()).unwrap()
    }

    /// `server.xml` declaring `names`
    pub fn with_server_xml(self, names: &[&str]) -> Self {
        let xml = server_document(names, "");
        self.with_raw_server_xml(&xml)
    }

    /// `server.xml` declaring `names` and including `includes`
    pub fn with_server_xml_including(self, names: &[&str], includes: &[&str]) -> Self {
        let extra: String = includes
            .iter()
            .map(|loc| format!("    <include location=\"{loc}\"/>\n"))
            .collect();
        let xml = server_document(names, &extra);
        self.with_raw_server_xml(&xml)
    }

    pub fn with_raw_server_xml(self, xml: &str) -> Self {
        fs::write(self.layout.server_xml(), xml).unwrap();
        self
    }

    /// Config document declaring `names` at `relative`
    pub fn with_config_file(self, relative: &str, names: &[&str]) -> Self {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, server_document(names, "")).unwrap();
        self
    }

    /// Generated artifact holding `names`
    pub fn with_generated(self, names: &[&str]) -> Self {
        let mut doc = ConfigDocument::new();
        doc.create_feature_manager();
        for name in names {
            doc.create_feature(*name);
        }
        doc.write(&self.generated_path()).unwrap();
        self
    }
}

fn server_document(names: &[&str], extra: &str) -> String {
    let features: String = names
        .iter()
        .map(|n| format!("        <feature>{n}</feature>\n"))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<server description=\"test server\">\n    <featureManager>\n{features}    </featureManager>\n{extra}</server>\n"
    )
}
