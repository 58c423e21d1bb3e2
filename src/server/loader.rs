//! Filesystem-driven discovery of extension modules
//!
//! Walks a directory tree and loads extensions by naming convention: a
//! module file `foo.rs` maps to the class name `Foo` and the identifier
//! `{package}.foo.Foo` in the factory table. A subdirectory carrying a
//! `mod.rs` marker is either represented atomically by its own
//! `{package}.{dir}.extension` hook, or walked file-by-file like its
//! parent.

use crate::core::error::{ExtensionError, ManifoldError};
use crate::server::extension_registry::{ExtensionManager, FactoryRef, LoadOutcome};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Marker file giving a subdirectory package status
const PACKAGE_MARKER: &str = "mod.rs";

/// Module-file suffix considered during the walk
const MODULE_SUFFIX: &str = "rs";

/// Discovers and loads convention-named extension modules
///
/// Loading is best-effort: every candidate yields a [`LoadOutcome`] and
/// a failing candidate never stops the walk.
pub struct ExtensionLoader {
    root: PathBuf,
    package: String,
    allow_list: Option<HashSet<String>>,
}

impl ExtensionLoader {
    /// Create a loader over `root`, qualifying identifiers with `package`
    pub fn new(root: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            package: package.into(),
            allow_list: None,
        }
    }

    /// Restrict the walk to the given class names
    pub fn with_allow_list<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_list = Some(classes.into_iter().map(Into::into).collect());
        self
    }

    /// Walk the tree and load every admitted candidate
    pub fn load(&self, mgr: &mut ExtensionManager) -> Vec<LoadOutcome> {
        let mut outcomes = Vec::new();
        self.walk_dir(&self.root, "", mgr, &mut outcomes);
        outcomes
    }

    fn walk_dir(
        &self,
        dir: &Path,
        relpkg: &str,
        mgr: &mut ExtensionManager,
        outcomes: &mut Vec<LoadOutcome>,
    ) {
        let entries = match sorted_entries(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Cannot read extension directory");
                return;
            }
        };

        for path in &entries {
            if !path.is_file() {
                continue;
            }
            let (Some(stem), Some(ext)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.extension().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            // Skip package markers and anything that's not a module file
            if ext != MODULE_SUFFIX || format!("{}.{}", stem, ext) == PACKAGE_MARKER {
                continue;
            }

            let class_name = capitalize_first(stem);
            let identifier = format!("{}{}.{}.{}", self.package, relpkg, stem, class_name);

            if let Some(allow) = &self.allow_list
                && !allow.contains(&class_name)
            {
                tracing::debug!(identifier = %identifier, "Skipping extension");
                outcomes.push(LoadOutcome::Skipped {
                    identifier,
                    reason: "not in allow list".to_string(),
                });
                continue;
            }

            outcomes.push(self.try_load(mgr, identifier));
        }

        for path in &entries {
            if !path.is_dir() {
                continue;
            }
            // Skip directories without a package marker
            if !path.join(PACKAGE_MARKER).is_file() {
                continue;
            }
            let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };

            // A package-level hook represents the whole subdirectory;
            // only when it is absent do we walk the files ourselves.
            let hook = format!("{}{}.{}.extension", self.package, relpkg, dir_name);
            if mgr.factory_registered(&hook) {
                outcomes.push(self.try_load(mgr, hook));
            } else {
                let sub_relpkg = format!("{}.{}", relpkg, dir_name);
                self.walk_dir(path, &sub_relpkg, mgr, outcomes);
            }
        }
    }

    fn try_load(&self, mgr: &mut ExtensionManager, identifier: String) -> LoadOutcome {
        match mgr.load_extension(FactoryRef::Path(identifier.clone())) {
            Ok(()) => LoadOutcome::Loaded { identifier },
            Err(error) => {
                tracing::warn!(
                    identifier = %identifier,
                    error = %error,
                    "Failed to load extension"
                );
                LoadOutcome::Failed { identifier, error }
            }
        }
    }
}

/// Directory entries sorted by name, for deterministic load order
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ManifoldError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| ExtensionError::LoadFailure {
            identifier: dir.display().to_string(),
            message: e.to_string(),
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    Ok(entries)
}

/// Upper-case exactly the first letter: `foo_bar` becomes `Foo_bar`
///
/// Extension authors rely on this exact mapping; do not generalize it.
fn capitalize_first(stem: &str) -> String {
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_first_letter_only() {
        assert_eq!(capitalize_first("foo"), "Foo");
        assert_eq!(capitalize_first("quota_classes"), "Quota_classes");
        assert_eq!(capitalize_first("f"), "F");
        assert_eq!(capitalize_first(""), "");
    }
}
