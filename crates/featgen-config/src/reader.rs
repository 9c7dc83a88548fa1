//! Declared-feature reader
//!
//! Walks a server's configuration the way the runtime merges it:
//! `configDropins/defaults`, then `server.xml` with its includes, then
//! `configDropins/overrides`. Every `<feature>` inside a `<featureManager>`
//! contributes to the result.
//!
//! Case handling is an explicit argument of every read ([`ReadOptions`]);
//! the reader holds no mode that callers would need to restore.

use crate::error::{ConfigError, ConfigResult};
use crate::layout::ServerLayout;
use featgen_model::{Feature, FeatureSet};
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// `${name}` references in include locations
static VARIABLE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid variable pattern"));

/// How declared feature spellings are returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseMode {
    /// Return features as written
    #[default]
    Preserve,
    /// Return features lowercased
    Fold,
}

/// Options for a single read
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    case: CaseMode,
    exclude: Vec<PathBuf>,
}

impl ReadOptions {
    /// Options with the given case mode and no exclusions
    #[inline]
    #[must_use]
    pub fn new(case: CaseMode) -> Self {
        Self {
            case,
            exclude: Vec::new(),
        }
    }

    /// Skip a file wherever it appears (drop-in or include)
    #[inline]
    #[must_use]
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude.push(path.into());
        self
    }

    /// Case mode
    #[inline]
    #[must_use]
    pub fn case(&self) -> CaseMode {
        self.case
    }

    /// Whether `path` is one of the excluded files
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let candidate = normalize(path);
        self.exclude.iter().any(|e| normalize(e) == candidate)
    }
}

/// Reads declared features from server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfigReader {
    /// Value of `${shared.config.dir}`, when known
    shared_config_dir: Option<PathBuf>,
}

impl ServerConfigReader {
    /// Create reader
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide a value for `${shared.config.dir}`
    #[inline]
    #[must_use]
    pub fn with_shared_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shared_config_dir = Some(dir.into());
        self
    }

    /// Read every declared feature of the server
    ///
    /// Returns an empty set when the primary configuration does not exist.
    ///
    /// # Errors
    /// - `ConfigError::Io` if a present file cannot be read
    /// - `ConfigError::Xml` if a document is malformed
    /// - `ConfigError::MissingRoot` if a document has no `<server>` root
    pub fn read_features(
        &self,
        layout: &ServerLayout,
        options: &ReadOptions,
    ) -> ConfigResult<FeatureSet> {
        if !layout.server_xml().is_file() {
            tracing::debug!(
                "no server configuration at {}",
                layout.server_xml().display()
            );
            return Ok(FeatureSet::new());
        }

        let mut session = ReadSession::new(options, true);
        session.define("server.config.dir", layout.config_dir());
        if let Some(shared) = &self.shared_config_dir {
            session.define("shared.config.dir", shared);
        }

        session.read_dropins(&layout.defaults_dir())?;
        session.read_document(layout.server_xml())?;
        session.read_dropins(&layout.overrides_dir())?;

        tracing::debug!(
            "read {} declared features from {}",
            session.features.len(),
            layout.config_dir().display()
        );
        Ok(session.features)
    }

    /// Read the features of one document, ignoring its includes
    ///
    /// Returns `None` when the file does not exist.
    ///
    /// # Errors
    /// Same as [`ServerConfigReader::read_features`]
    pub fn read_file_features(
        &self,
        path: &Path,
        case: CaseMode,
    ) -> ConfigResult<Option<FeatureSet>> {
        if !path.is_file() {
            return Ok(None);
        }
        let options = ReadOptions::new(case);
        let mut session = ReadSession::new(&options, false);
        session.read_document(path)?;
        Ok(Some(session.features))
    }
}

/// An `<include>` found while parsing
struct Include {
    location: String,
    optional: bool,
}

/// State of one read
struct ReadSession<'o> {
    options: &'o ReadOptions,
    follow_includes: bool,
    variables: HashMap<String, String>,
    visited: HashSet<PathBuf>,
    features: FeatureSet,
}

impl<'o> ReadSession<'o> {
    fn new(options: &'o ReadOptions, follow_includes: bool) -> Self {
        Self {
            options,
            follow_includes,
            variables: HashMap::new(),
            visited: HashSet::new(),
            features: FeatureSet::new(),
        }
    }

    fn define(&mut self, name: &str, dir: &Path) {
        self.variables
            .insert(name.to_string(), dir.display().to_string());
    }

    fn read_dropins(&mut self, dir: &Path) -> ConfigResult<()> {
        for file in xml_files_in(dir)? {
            self.read_document(&file)?;
        }
        Ok(())
    }

    fn read_document(&mut self, path: &Path) -> ConfigResult<()> {
        if self.options.is_excluded(path) {
            tracing::debug!("skipping excluded configuration {}", path.display());
            return Ok(());
        }
        if !self.visited.insert(normalize(path)) {
            tracing::debug!("already read {}, skipping", path.display());
            return Ok(());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let includes = self.parse(path, &content)?;

        if !self.follow_includes {
            return Ok(());
        }
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for include in includes {
            self.read_include(base, &include)?;
        }
        Ok(())
    }

    /// Collect features and variables; return the includes in document order
    fn parse(&mut self, path: &Path, content: &str) -> ConfigResult<Vec<Include>> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(true);

        let mut stack: Vec<String> = Vec::new();
        let mut includes = Vec::new();
        let mut saw_root = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = local_name(&e);
                    if stack.is_empty() {
                        check_root(path, &name)?;
                        saw_root = true;
                    } else {
                        self.element(path, &e, &name, &stack, &mut includes)?;
                    }
                    stack.push(name);
                }
                Ok(Event::Empty(e)) => {
                    let name = local_name(&e);
                    if stack.is_empty() {
                        check_root(path, &name)?;
                        saw_root = true;
                    } else {
                        self.element(path, &e, &name, &stack, &mut includes)?;
                    }
                }
                Ok(Event::Text(t)) => {
                    if in_feature(&stack) {
                        let text = t.unescape().map_err(|e| ConfigError::xml_error(path, e))?;
                        self.add_feature(path, &text);
                    }
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ConfigError::xml_error(path, e)),
                _ => {}
            }
        }

        if !saw_root {
            return Err(ConfigError::MissingRoot(path.to_path_buf()));
        }
        Ok(includes)
    }

    /// Handle a server-level `<include>` or `<variable>`
    fn element(
        &mut self,
        path: &Path,
        e: &BytesStart<'_>,
        name: &str,
        stack: &[String],
        includes: &mut Vec<Include>,
    ) -> ConfigResult<()> {
        if stack.len() != 1 {
            return Ok(());
        }
        match name {
            "include" => match attribute(path, e, "location")? {
                Some(location) => {
                    let optional = attribute(path, e, "optional")?
                        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
                    includes.push(Include { location, optional });
                }
                None => tracing::warn!("<include> without location in {}", path.display()),
            },
            "variable" => {
                if let Some(var) = attribute(path, e, "name")? {
                    if let Some(value) = attribute(path, e, "value")? {
                        self.variables.insert(var, value);
                    } else if let Some(default) = attribute(path, e, "defaultValue")? {
                        self.variables.entry(var).or_insert(default);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn add_feature(&mut self, path: &Path, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        match Feature::new(text) {
            Ok(feature) => {
                let feature = match self.options.case() {
                    CaseMode::Preserve => feature,
                    CaseMode::Fold => feature.to_folded(),
                };
                self.features.insert(feature);
            }
            Err(e) => tracing::warn!("ignoring feature in {}: {}", path.display(), e),
        }
    }

    fn read_include(&mut self, base: &Path, include: &Include) -> ConfigResult<()> {
        let location = self.expand(&include.location);
        if location.starts_with("http://") || location.starts_with("https://") {
            tracing::warn!("remote include {} is not read", location);
            return Ok(());
        }

        let target = {
            let p = PathBuf::from(location.as_str());
            if p.is_absolute() {
                p
            } else {
                base.join(p)
            }
        };

        if target.is_dir() {
            for file in xml_files_in(&target)? {
                self.read_document(&file)?;
            }
        } else if target.is_file() {
            self.read_document(&target)?;
        } else if include.optional {
            tracing::debug!("optional include {} not found", target.display());
        } else {
            tracing::warn!("include {} not found", target.display());
        }
        Ok(())
    }

    fn expand(&self, location: &str) -> String {
        VARIABLE_REF
            .replace_all(location, |caps: &Captures<'_>| {
                self.variables
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn check_root(path: &Path, name: &str) -> ConfigResult<()> {
    if name == "server" {
        Ok(())
    } else {
        Err(ConfigError::MissingRoot(path.to_path_buf()))
    }
}

fn in_feature(stack: &[String]) -> bool {
    matches!(stack, [.., parent, leaf] if parent == "featureManager" && leaf == "feature")
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(path: &Path, e: &BytesStart<'_>, key: &str) -> ConfigResult<Option<String>> {
    let Some(attr) = e
        .try_get_attribute(key)
        .map_err(|err| ConfigError::xml_error(path, err))?
    else {
        return Ok(None);
    };
    let value = attr
        .unescape_value()
        .map_err(|err| ConfigError::xml_error(path, err))?;
    Ok(Some(value.into_owned()))
}

/// `.xml` files directly inside `dir`, sorted by file name
fn xml_files_in(dir: &Path) -> ConfigResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ConfigError::io_error(dir, e))? {
        let entry = entry.map_err(|e| ConfigError::io_error(dir, e))?;
        let path = entry.path();
        let is_xml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
        if is_xml && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn normalize(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
