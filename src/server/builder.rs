//! Builder for wiring the extension manager at startup
//!
//! The manager is an explicit object owned by the server's startup
//! sequence, never a process-wide singleton. The builder runs the eager
//! factory list and optional filesystem discovery, then hands back the
//! shared manager together with every load outcome.
//!
//! # Example
//!
//! ```ignore
//! let (manager, outcomes) = ExtensionManagerBuilder::new(factories)
//!     .with_config(config)
//!     .with_discovery("plugins/api", "api")
//!     .build();
//! let resources = manager.get_resources();
//! ```

use crate::config::ExtensionsConfig;
use crate::server::extension_registry::{ExtensionManager, FactoryTable, LoadOutcome};
use crate::server::loader::ExtensionLoader;
use std::path::PathBuf;
use std::sync::Arc;

pub struct ExtensionManagerBuilder {
    factories: FactoryTable,
    config: ExtensionsConfig,
    discovery: Option<(PathBuf, String)>,
}

impl ExtensionManagerBuilder {
    pub fn new(factories: FactoryTable) -> Self {
        Self {
            factories,
            config: ExtensionsConfig::default(),
            discovery: None,
        }
    }

    /// Set the extension configuration (eager factories, allow-list)
    pub fn with_config(mut self, config: ExtensionsConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable filesystem discovery under `root`, qualified by `package`
    pub fn with_discovery(
        mut self,
        root: impl Into<PathBuf>,
        package: impl Into<String>,
    ) -> Self {
        self.discovery = Some((root.into(), package.into()));
        self
    }

    /// Load everything and return the shared manager
    ///
    /// Per-candidate failures are reported in the outcome list; the
    /// build itself always succeeds with whatever loaded.
    pub fn build(self) -> (Arc<ExtensionManager>, Vec<LoadOutcome>) {
        let mut mgr = ExtensionManager::new(self.config.factories.clone(), self.factories);
        let mut outcomes = mgr.load_configured_extensions();

        if let Some((root, package)) = self.discovery {
            let mut loader = ExtensionLoader::new(root, package);
            if let Some(allow) = self.config.allow_list {
                loader = loader.with_allow_list(allow);
            }
            outcomes.extend(loader.load(&mut mgr));
        }

        let loaded = outcomes.iter().filter(|o| o.is_loaded()).count();
        tracing::info!(
            loaded,
            attempted = outcomes.len(),
            "Extension loading complete"
        );
        (Arc::new(mgr), outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extension::Extension;
    use std::sync::Arc;

    struct Stub;

    impl Extension for Stub {
        fn name(&self) -> &str {
            "Stub"
        }

        fn alias(&self) -> &str {
            "stub"
        }

        fn namespace(&self) -> Option<&str> {
            Some("http://docs.example.com/ext/stub/api/v1.0")
        }

        fn updated(&self) -> Option<&str> {
            Some("2011-01-22T13:25:27-06:00")
        }
    }

    #[test]
    fn test_build_runs_eager_factories() {
        let mut table = FactoryTable::new();
        table.register("api.stub.Stub", |mgr: &mut ExtensionManager| {
            mgr.register(Arc::new(Stub))
        });
        let config = ExtensionsConfig {
            factories: vec!["api.stub.Stub".to_string()],
            allow_list: None,
        };
        let (mgr, outcomes) = ExtensionManagerBuilder::new(table)
            .with_config(config)
            .build();
        assert!(mgr.is_loaded("stub"));
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_loaded());
    }

    #[test]
    fn test_build_without_config_is_empty() {
        let (mgr, outcomes) = ExtensionManagerBuilder::new(FactoryTable::new()).build();
        assert!(outcomes.is_empty());
        assert!(mgr.sorted_extensions().is_empty());
    }
}
