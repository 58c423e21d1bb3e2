//! Tests for the extension manager and filesystem discovery
//!
//! Covers registration invariants, aggregation order, the eager load
//! sequence and convention-based discovery over a real directory tree.

use manifold::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "manifold=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Minimal valid legacy extension
struct TestExtension {
    name: String,
    alias: String,
}

impl TestExtension {
    fn new(name: &str, alias: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            alias: alias.to_string(),
        })
    }
}

impl Extension for TestExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn alias(&self) -> &str {
        &self.alias
    }

    fn description(&self) -> &str {
        "test extension"
    }

    fn namespace(&self) -> Option<&str> {
        Some("http://docs.example.com/ext/test/api/v1.0")
    }

    fn updated(&self) -> Option<&str> {
        Some("2011-01-22T13:25:27-06:00")
    }
}

fn factory_for(name: &'static str, alias: &'static str) -> impl Fn(&mut ExtensionManager) -> ManifoldResult<()> {
    move |mgr: &mut ExtensionManager| mgr.register(TestExtension::new(name, alias))
}

// =============================================================================
// Registration invariants
// =============================================================================

mod registration_tests {
    use super::*;

    #[test]
    fn test_duplicate_alias_keeps_first_registration() {
        init_tracing();
        let mut mgr = ExtensionManager::new(Vec::new(), FactoryTable::new());
        mgr.register(TestExtension::new("First", "os-hosts")).unwrap();
        let err = mgr
            .register(TestExtension::new("Second", "os-hosts"))
            .unwrap_err();
        assert!(matches!(
            err,
            ManifoldError::Extension(ExtensionError::DuplicateRegistration { .. })
        ));
        assert_eq!(mgr.extension("os-hosts").unwrap().name(), "First");
    }

    #[test]
    fn test_invalid_extension_excluded_everywhere() {
        init_tracing();
        struct NoNamespace;
        impl Extension for NoNamespace {
            fn name(&self) -> &str {
                "No Namespace"
            }
            fn alias(&self) -> &str {
                "no-namespace"
            }
            fn updated(&self) -> Option<&str> {
                Some("2011-01-22T13:25:27-06:00")
            }
        }

        let mut mgr = ExtensionManager::new(Vec::new(), FactoryTable::new());
        mgr.register(Arc::new(NoNamespace)).unwrap();
        assert!(!mgr.is_loaded("no-namespace"));
        assert!(mgr.sorted_extensions().is_empty());
        let mgr = Arc::new(mgr);
        assert_eq!(mgr.get_resources().len(), 1); // self-listing only
        assert!(mgr.get_controller_extensions().is_empty());
    }

    #[test]
    fn test_sorted_order_independent_of_registration_order() {
        let mut mgr = ExtensionManager::new(Vec::new(), FactoryTable::new());
        mgr.register(TestExtension::new("B", "b")).unwrap();
        mgr.register(TestExtension::new("A", "a")).unwrap();
        let aliases: Vec<String> = mgr
            .sorted_extensions()
            .iter()
            .map(|e| e.alias().to_string())
            .collect();
        assert_eq!(aliases, vec!["a", "b"]);
    }
}

// =============================================================================
// Self-listing resource
// =============================================================================

mod listing_tests {
    use super::*;

    #[tokio::test]
    async fn test_index_lists_catalog_sorted_by_alias() {
        let mut mgr = ExtensionManager::new(Vec::new(), FactoryTable::new());
        mgr.register(TestExtension::new("Zebra", "os-zebra")).unwrap();
        mgr.register(TestExtension::new("Aardvark", "os-aardvark"))
            .unwrap();
        let mgr = Arc::new(mgr);

        let resources = mgr.get_resources();
        let controller = resources[0]
            .controller
            .as_ref()
            .expect("self-listing resource has a controller");

        let ctx = RequestContext::new("p1", "u1");
        let body = controller.index(&ctx).await.unwrap();
        let entries = body["extensions"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["alias"], "os-aardvark");
        assert_eq!(entries[1]["alias"], "os-zebra");
        assert_eq!(entries[0]["name"], "Aardvark");
        assert_eq!(
            entries[0]["namespace"],
            "http://docs.example.com/ext/test/api/v1.0"
        );
        assert_eq!(entries[0]["updated"], "2011-01-22T13:25:27-06:00");
        assert!(entries[0]["links"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_show_unknown_alias_is_not_found() {
        let mgr = Arc::new(ExtensionManager::new(Vec::new(), FactoryTable::new()));
        let resources = mgr.get_resources();
        let controller = resources[0].controller.as_ref().unwrap();
        let ctx = RequestContext::new("p1", "u1");
        let err = controller.show(&ctx, "os-missing").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_catalog_is_immutable_from_the_api() {
        let mgr = Arc::new(ExtensionManager::new(Vec::new(), FactoryTable::new()));
        let resources = mgr.get_resources();
        let controller = resources[0].controller.as_ref().unwrap();
        let ctx = RequestContext::new("p1", "u1");
        let err = controller
            .create(&ctx, serde_json::json!({"alias": "new"}))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let err = controller.delete(&ctx, "os-anything").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}

// =============================================================================
// Filesystem discovery
// =============================================================================

mod discovery_tests {
    use super::*;

    fn touch(path: &Path) {
        fs::write(path, "// extension module\n").unwrap();
    }

    /// Build the standard fixture tree:
    ///
    /// ```text
    /// root/
    ///   mod.rs
    ///   foo.rs                  -> api.foo.Foo
    ///   nested/ (mod.rs)
    ///     bar.rs                -> api.nested.bar.Bar
    ///   hooked/ (mod.rs)        -> api.hooked.extension (hook)
    ///     baz.rs                   (must not be walked)
    ///   unmarked/ (no mod.rs)
    ///     qux.rs                   (must be ignored)
    /// ```
    fn fixture_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(&root.join("mod.rs"));
        touch(&root.join("foo.rs"));
        fs::create_dir(root.join("nested")).unwrap();
        touch(&root.join("nested/mod.rs"));
        touch(&root.join("nested/bar.rs"));
        fs::create_dir(root.join("hooked")).unwrap();
        touch(&root.join("hooked/mod.rs"));
        touch(&root.join("hooked/baz.rs"));
        fs::create_dir(root.join("unmarked")).unwrap();
        touch(&root.join("unmarked/qux.rs"));
        tmp
    }

    fn fixture_factories() -> FactoryTable {
        let mut table = FactoryTable::new();
        table.register("api.foo.Foo", factory_for("Foo", "foo"));
        table.register("api.nested.bar.Bar", factory_for("Bar", "bar"));
        table.register("api.hooked.extension", factory_for("Hooked", "hooked"));
        table.register("api.hooked.baz.Baz", factory_for("Baz", "baz"));
        table.register("api.unmarked.qux.Qux", factory_for("Qux", "qux"));
        table
    }

    #[test]
    fn test_walk_registers_convention_named_modules() {
        init_tracing();
        let tmp = fixture_tree();
        let mut mgr = ExtensionManager::new(Vec::new(), fixture_factories());
        let outcomes = ExtensionLoader::new(tmp.path(), "api").load(&mut mgr);

        assert!(mgr.is_loaded("foo"));
        assert!(mgr.is_loaded("bar"));
        let loaded: Vec<&str> = outcomes
            .iter()
            .filter(|o| o.is_loaded())
            .map(|o| o.identifier())
            .collect();
        assert!(loaded.contains(&"api.foo.Foo"));
        assert!(loaded.contains(&"api.nested.bar.Bar"));
        // mod.rs is a package marker, never a candidate
        assert!(!outcomes.iter().any(|o| o.identifier().contains(".mod.")));
    }

    #[test]
    fn test_directory_hook_takes_over_the_subtree() {
        init_tracing();
        let tmp = fixture_tree();
        let mut mgr = ExtensionManager::new(Vec::new(), fixture_factories());
        ExtensionLoader::new(tmp.path(), "api").load(&mut mgr);

        assert!(mgr.is_loaded("hooked"));
        // The hook represented the directory; baz.rs was not walked.
        assert!(!mgr.is_loaded("baz"));
    }

    #[test]
    fn test_directory_without_marker_is_ignored() {
        let tmp = fixture_tree();
        let mut mgr = ExtensionManager::new(Vec::new(), fixture_factories());
        let outcomes = ExtensionLoader::new(tmp.path(), "api").load(&mut mgr);

        assert!(!mgr.is_loaded("qux"));
        assert!(!outcomes.iter().any(|o| o.identifier().contains("qux")));
    }

    #[test]
    fn test_allow_list_excludes_other_classes() {
        init_tracing();
        let tmp = fixture_tree();
        let mut mgr = ExtensionManager::new(Vec::new(), fixture_factories());
        let outcomes = ExtensionLoader::new(tmp.path(), "api")
            .with_allow_list(["Bar"])
            .load(&mut mgr);

        assert!(!mgr.is_loaded("foo"));
        assert!(mgr.is_loaded("bar"));
        assert!(outcomes.iter().any(|o| matches!(
            o,
            LoadOutcome::Skipped { identifier, .. } if identifier == "api.foo.Foo"
        )));
    }

    #[test]
    fn test_unresolvable_candidate_fails_without_stopping_walk() {
        init_tracing();
        let tmp = fixture_tree();
        // Leave Foo out of the table so it cannot resolve.
        let mut table = FactoryTable::new();
        table.register("api.nested.bar.Bar", factory_for("Bar", "bar"));
        table.register("api.hooked.extension", factory_for("Hooked", "hooked"));
        let mut mgr = ExtensionManager::new(Vec::new(), table);
        let outcomes = ExtensionLoader::new(tmp.path(), "api").load(&mut mgr);

        assert!(outcomes.iter().any(|o| matches!(
            o,
            LoadOutcome::Failed { identifier, .. } if identifier == "api.foo.Foo"
        )));
        assert!(mgr.is_loaded("bar"));
        assert!(mgr.is_loaded("hooked"));
    }
}

// =============================================================================
// Startup builder
// =============================================================================

mod builder_tests {
    use super::*;

    #[test]
    fn test_builder_combines_eager_and_discovery() {
        init_tracing();
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("foo.rs"), "// extension module\n").unwrap();

        let mut table = FactoryTable::new();
        table.register("api.foo.Foo", factory_for("Foo", "foo"));
        table.register("api.eager.Eager", factory_for("Eager", "eager"));

        let config = ExtensionsConfig {
            factories: vec![
                "api.eager.Eager".to_string(),
                "api.broken.Broken".to_string(),
            ],
            allow_list: None,
        };

        let (mgr, outcomes) = ExtensionManagerBuilder::new(table)
            .with_config(config)
            .with_discovery(tmp.path(), "api")
            .build();

        assert!(mgr.is_loaded("eager"));
        assert!(mgr.is_loaded("foo"));
        // The broken eager identifier is reported but does not abort.
        assert!(outcomes.iter().any(|o| matches!(
            o,
            LoadOutcome::Failed { identifier, .. } if identifier == "api.broken.Broken"
        )));
        assert_eq!(outcomes.iter().filter(|o| o.is_loaded()).count(), 2);
    }
}
