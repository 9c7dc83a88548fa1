//! Analyzer seam
//!
//! The analyzer inspects compiled classes and decides which platform
//! features they need. This crate never performs that analysis; it only
//! hands over an [`AnalysisRequest`] and interprets the [`AnalysisOutcome`].
//!
//! Any `Fn(&AnalysisRequest) -> AnalysisOutcome` is an analyzer. For an
//! external tool, [`ProcessAnalyzer`] exchanges JSON over stdin/stdout.

use crate::types::{AnalysisOutcome, AnalysisRequest, AnalyzerFailure};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

/// Decides which features a set of classes needs
///
/// # Contract
/// - Must not touch the server configuration
/// - Reports its own failures as [`AnalysisOutcome::Fatal`]
#[cfg_attr(test, mockall::automock)]
pub trait FeatureAnalyzer {
    /// Analyze one request
    fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome;
}

impl<F> FeatureAnalyzer for F
where
    F: Fn(&AnalysisRequest) -> AnalysisOutcome,
{
    fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        self(request)
    }
}

/// Runs an external analyzer program
///
/// The request is written to the child's stdin as JSON; the child must
/// print one JSON [`AnalysisOutcome`] on stdout and exit successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessAnalyzer {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessAnalyzer {
    /// Create analyzer for `program`
    #[inline]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra arguments passed to the program
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Program path
    #[inline]
    #[must_use]
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn run(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, AnalyzerFailure> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| AnalyzerFailure::new("SerializationError", e.to_string()))?;

        tracing::debug!("spawning analyzer {}", self.program.display());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AnalyzerFailure::new(
                    "SpawnError",
                    format!("could not start {}: {e}", self.program.display()),
                )
            })?;

        // stdout and stderr are drained while the request is still being written;
        // stdin closes when the writer thread drops its handle
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || -> io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&payload)?;
            }
            Ok(())
        });

        let output = child
            .wait_with_output()
            .map_err(|e| AnalyzerFailure::new("IoError", e.to_string()))?;
        let written = writer
            .join()
            .map_err(|_| AnalyzerFailure::new("IoError", "request writer panicked"))?;
        if !output.status.success() {
            return Err(AnalyzerFailure::new(
                "AnalyzerExit",
                format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        match written {
            // the child answered without reading the whole request
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!("analyzer closed its input early");
            }
            Err(e) => return Err(AnalyzerFailure::new("IoError", e.to_string())),
            Ok(()) => {}
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| AnalyzerFailure::new("InvalidOutput", e.to_string()))
    }
}

impl FeatureAnalyzer for ProcessAnalyzer {
    fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        self.run(request).unwrap_or_else(|cause| {
            tracing::debug!("analyzer process failed: {cause}");
            AnalysisOutcome::Fatal { cause }
        })
    }
}
