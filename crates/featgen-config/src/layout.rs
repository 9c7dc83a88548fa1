//! Server configuration directory layout

use std::path::{Path, PathBuf};

/// File name of the generated features fragment
pub const GENERATED_FEATURES_FILE: &str = "generated-features.xml";

/// Location of the generated fragment relative to the server config directory
pub const GENERATED_FEATURES_PATH: &str = "configDropins/overrides/generated-features.xml";

/// Primary configuration file name
const SERVER_XML: &str = "server.xml";

/// Where a server's configuration files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerLayout {
    config_dir: PathBuf,
    server_xml: PathBuf,
}

impl ServerLayout {
    /// Layout rooted at `config_dir` with the default `server.xml`
    #[inline]
    #[must_use]
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let server_xml = config_dir.join(SERVER_XML);
        Self {
            config_dir,
            server_xml,
        }
    }

    /// Override the primary configuration file
    #[inline]
    #[must_use]
    pub fn with_server_xml(mut self, server_xml: impl Into<PathBuf>) -> Self {
        self.server_xml = server_xml.into();
        self
    }

    /// Server configuration directory
    #[inline]
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Primary configuration file
    #[inline]
    #[must_use]
    pub fn server_xml(&self) -> &Path {
        &self.server_xml
    }

    /// `configDropins/defaults`, read before the primary configuration
    #[inline]
    #[must_use]
    pub fn defaults_dir(&self) -> PathBuf {
        self.config_dir.join("configDropins").join("defaults")
    }

    /// `configDropins/overrides`, read after the primary configuration
    #[inline]
    #[must_use]
    pub fn overrides_dir(&self) -> PathBuf {
        self.config_dir.join("configDropins").join("overrides")
    }

    /// The machine-owned generated features fragment
    #[inline]
    #[must_use]
    pub fn generated_features_path(&self) -> PathBuf {
        self.overrides_dir().join(GENERATED_FEATURES_FILE)
    }

    /// The generated fragment as seen from the primary configuration file
    ///
    /// Relative to the directory holding `server.xml`, `/`-separated, when
    /// the fragment lies beneath it; the full path otherwise.
    #[must_use]
    pub fn generated_features_reference(&self) -> String {
        let generated = self.generated_features_path();
        let base = self.server_xml.parent().unwrap_or_else(|| Path::new(""));
        match generated.strip_prefix(base) {
            Ok(relative) if !base.as_os_str().is_empty() => relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            _ => generated.display().to_string(),
        }
    }
}
