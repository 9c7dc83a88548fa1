//! Build dependency coordinates

use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved build dependency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Group (organisation) coordinate
    pub group: String,
    /// Artifact name coordinate
    pub name: String,
    /// Version string as declared
    pub version: String,
}

impl Dependency {
    /// Create dependency descriptor
    #[inline]
    #[must_use]
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Whether group and name match
    #[inline]
    #[must_use]
    pub fn is(&self, group: &str, name: &str) -> bool {
        self.group == group && self.name == name
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}
