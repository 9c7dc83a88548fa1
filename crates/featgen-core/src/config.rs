//! Generator configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! server_dir = "src/main/liberty/config"
//! class_dirs = ["target/classes"]
//! optimize = true
//!
//! [analyzer]
//! program = "bin/featgen-analyzer"
//! args = ["--json"]
//!
//! [[dependencies]]
//! group = "javax"
//! name = "javaee-api"
//! version = "8.0"
//! ```

use featgen_config::{ServerConfigReader, ServerLayout};
use featgen_model::Dependency;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default analyzer log file name
pub const DEFAULT_LOG_FILE: &str = "featgen-analyzer.log";

/// Errors loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File could not be read
    #[error("cannot read configuration {path}: {source}")]
    Io {
        /// Configuration file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid configuration TOML
    #[error("invalid configuration {path}: {source}")]
    Parse {
        /// Configuration file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
}

/// External analyzer command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerCommand {
    /// Program to run
    pub program: PathBuf,
    /// Arguments
    #[serde(default)]
    pub args: Vec<String>,
}

/// Configuration of one generator run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Server configuration directory
    pub server_dir: PathBuf,

    /// Primary configuration; defaults to `server.xml` in `server_dir`
    #[serde(default)]
    pub server_xml: Option<PathBuf>,

    /// Value of `${shared.config.dir}` in include locations
    #[serde(default)]
    pub shared_config_dir: Option<PathBuf>,

    /// Candidate compiled-class directories
    #[serde(default)]
    pub class_dirs: Vec<PathBuf>,

    /// Explicit class files to analyze
    #[serde(default)]
    pub class_files: Option<Vec<String>>,

    /// Analyzer log file
    #[serde(default)]
    pub log_target: Option<PathBuf>,

    /// Let the analyzer reduce the feature list
    #[serde(default = "default_optimize")]
    pub optimize: bool,

    /// External analyzer
    #[serde(default)]
    pub analyzer: Option<AnalyzerCommand>,

    /// Build dependencies used for platform level resolution
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

fn default_optimize() -> bool {
    true
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl GeneratorConfig {
    /// Create configuration for `server_dir`
    pub fn new(server_dir: impl Into<PathBuf>) -> Self {
        Self {
            server_dir: server_dir.into(),
            server_xml: None,
            shared_config_dir: None,
            class_dirs: Vec::new(),
            class_files: None,
            log_target: None,
            optimize: true,
            analyzer: None,
            dependencies: Vec::new(),
        }
    }

    /// Load from a TOML file; relative paths resolve against its directory
    ///
    /// # Errors
    /// - `LoadError::Io` if the file cannot be read
    /// - `LoadError::Parse` if it is not valid configuration
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&text, base).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse TOML; relative paths resolve against `base_dir`
    ///
    /// # Errors
    /// Returns the TOML error if `text` is not valid configuration
    pub fn from_toml_str(text: &str, base_dir: &Path) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(text)?;
        config.resolve_paths(base_dir);
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.server_dir);
        self.server_xml.iter_mut().for_each(resolve);
        self.shared_config_dir.iter_mut().for_each(resolve);
        self.class_dirs.iter_mut().for_each(resolve);
        self.log_target.iter_mut().for_each(resolve);
        // bare program names are looked up on PATH
        if let Some(analyzer) = &mut self.analyzer {
            if analyzer.program.components().count() > 1 {
                resolve(&mut analyzer.program);
            }
        }
    }

    /// Set optimize flag
    #[must_use]
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Set primary configuration path
    #[must_use]
    pub fn with_server_xml(mut self, server_xml: impl Into<PathBuf>) -> Self {
        self.server_xml = Some(server_xml.into());
        self
    }

    /// Set shared configuration directory
    #[must_use]
    pub fn with_shared_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shared_config_dir = Some(dir.into());
        self
    }

    /// Set candidate class directories
    #[must_use]
    pub fn with_class_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.class_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Set explicit class files
    #[must_use]
    pub fn with_class_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class_files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    /// Set analyzer log file
    #[must_use]
    pub fn with_log_target(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_target = Some(path.into());
        self
    }

    /// Set external analyzer
    #[must_use]
    pub fn with_analyzer(mut self, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        self.analyzer = Some(AnalyzerCommand {
            program: program.into(),
            args,
        });
        self
    }

    /// Set build dependencies
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Server layout described by this configuration
    #[must_use]
    pub fn layout(&self) -> ServerLayout {
        let layout = ServerLayout::new(&self.server_dir);
        match &self.server_xml {
            Some(server_xml) => layout.with_server_xml(server_xml),
            None => layout,
        }
    }

    /// Configuration reader for this server
    #[must_use]
    pub fn reader(&self) -> ServerConfigReader {
        let reader = ServerConfigReader::new();
        match &self.shared_config_dir {
            Some(dir) => reader.with_shared_config_dir(dir),
            None => reader,
        }
    }

    /// Analyzer log file, with the default applied
    #[must_use]
    pub fn log_target_path(&self) -> PathBuf {
        if let Some(path) = &self.log_target {
            return path.clone();
        }
        self.class_dirs
            .first()
            .and_then(|dir| dir.parent())
            .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), |p| p.join(DEFAULT_LOG_FILE))
    }
}
