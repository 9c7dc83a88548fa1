//! Compiled class directory discovery

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Locates compiled class directories
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassDirectories;

impl ClassDirectories {
    /// Existing class directories among `candidates`
    ///
    /// Missing directories are skipped. An empty result is allowed; the
    /// analyzer then only checks the declared features.
    #[must_use]
    pub fn discover(candidates: &[PathBuf]) -> BTreeSet<PathBuf> {
        let mut found = BTreeSet::new();
        for dir in candidates {
            if !dir.is_dir() {
                tracing::debug!("class directory {} does not exist", dir.display());
                continue;
            }
            let classes = count_class_files(dir);
            if classes == 0 {
                tracing::debug!("no class files under {}", dir.display());
            } else {
                tracing::debug!("found {classes} class files under {}", dir.display());
            }
            found.insert(dir.clone());
        }
        if found.is_empty() {
            tracing::warn!(
                "Could not find classes for the application; features will only be checked \
                 against the server configuration"
            );
        }
        found
    }
}

fn count_class_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "class"))
        .count()
}
