//! Extension manager: registration, ordering and aggregation
//!
//! The manager is the single registry of loaded extensions. It is built
//! by the server's startup sequence, fed by the eager factory list and
//! the filesystem loader, then shared read-only with the dispatcher.
//! Factories resolve through an explicit [`FactoryTable`] instead of
//! reflection; a string identifier is only ever a table key.

use crate::core::context::RequestContext;
use crate::core::error::{ExtensionError, ManifoldError, ManifoldResult, RequestError};
use crate::core::extension::{
    Controller, ControllerExtension, Extension, ExtensionInfo, ResourceExtension,
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Factory identifiers under this prefix moved to the legacy namespace
const DEPRECATED_CONTRIB_PREFIX: &str = "manifold.contrib";

/// Callable that registers one or more extensions with the manager
pub type ExtensionFactory = Arc<dyn Fn(&mut ExtensionManager) -> ManifoldResult<()> + Send + Sync>;

/// A factory reference: either a table identifier or a resolved callable
#[derive(Clone)]
pub enum FactoryRef {
    /// Dotted identifier resolved through the factory table
    Path(String),
    /// Already-resolved factory
    Callable(ExtensionFactory),
}

impl From<&str> for FactoryRef {
    fn from(path: &str) -> Self {
        FactoryRef::Path(path.to_string())
    }
}

/// Explicit identifier-to-factory registration table
///
/// Populated at build time by the hosting application; the filesystem
/// loader and the eager startup list both resolve against it.
#[derive(Default, Clone)]
pub struct FactoryTable {
    factories: HashMap<String, ExtensionFactory>,
}

impl FactoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a dotted identifier
    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F)
    where
        F: Fn(&mut ExtensionManager) -> ManifoldResult<()> + Send + Sync + 'static,
    {
        self.factories.insert(identifier.into(), Arc::new(factory));
    }

    pub fn get(&self, identifier: &str) -> Option<ExtensionFactory> {
        self.factories.get(identifier).cloned()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }
}

/// Outcome of one load attempt
///
/// Load paths are best-effort: a failed candidate never aborts the
/// sequence, but every candidate's fate is reported so callers and tests
/// can assert on it.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The factory ran and registered its extension(s)
    Loaded { identifier: String },
    /// The candidate was excluded before any load attempt
    Skipped { identifier: String, reason: String },
    /// Resolution or factory invocation failed
    Failed {
        identifier: String,
        error: ManifoldError,
    },
}

impl LoadOutcome {
    pub fn identifier(&self) -> &str {
        match self {
            LoadOutcome::Loaded { identifier }
            | LoadOutcome::Skipped { identifier, .. }
            | LoadOutcome::Failed { identifier, .. } => identifier,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Registry of all loaded extensions
///
/// Registration happens under `&mut` during startup; afterwards the
/// manager is shared behind an `Arc` and only read. The sorted view is a
/// lazily recomputed memo invalidated by each successful registration.
pub struct ExtensionManager {
    extensions: HashMap<String, Arc<dyn Extension>>,
    sorted: Mutex<Option<Vec<Arc<dyn Extension>>>>,
    factories: FactoryTable,
    eager: Vec<String>,
}

impl ExtensionManager {
    pub fn new(eager: Vec<String>, factories: FactoryTable) -> Self {
        Self {
            extensions: HashMap::new(),
            sorted: Mutex::new(None),
            factories,
            eager,
        }
    }

    /// Register an extension
    ///
    /// An extension failing its validity check is logged and skipped
    /// without error, so best-effort load paths continue undisturbed. A
    /// duplicate alias is a hard error; the original entry is untouched.
    pub fn register(&mut self, ext: Arc<dyn Extension>) -> ManifoldResult<()> {
        if let Err(e) = ext.is_valid() {
            tracing::warn!(extension = ext.name(), error = %e, "Skipping invalid extension");
            return Ok(());
        }

        let alias = ext.alias().to_string();
        if self.extensions.contains_key(&alias) {
            return Err(ExtensionError::DuplicateRegistration { alias }.into());
        }
        tracing::debug!(alias = %alias, name = ext.name(), "Registered extension");
        self.extensions.insert(alias, ext);
        *self
            .sorted
            .get_mut()
            .unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }

    /// Whether an extension with this alias has been registered
    pub fn is_loaded(&self, alias: &str) -> bool {
        self.extensions.contains_key(alias)
    }

    /// Look up one extension by alias
    pub fn extension(&self, alias: &str) -> Option<Arc<dyn Extension>> {
        self.extensions.get(alias).cloned()
    }

    /// Registered extensions in ascending alias order
    ///
    /// The order is deterministic across runs; it fixes the order
    /// resources are aggregated and therefore route-registration
    /// precedence.
    pub fn sorted_extensions(&self) -> Vec<Arc<dyn Extension>> {
        let mut cache = self.sorted.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .get_or_insert_with(|| {
                let mut exts: Vec<_> = self.extensions.values().cloned().collect();
                exts.sort_by(|a, b| a.alias().cmp(b.alias()));
                exts
            })
            .clone()
    }

    /// All resources for the dispatcher
    ///
    /// The built-in self-listing `extensions` resource always comes
    /// first, followed by every extension's contributions in sorted
    /// order.
    pub fn get_resources(self: &Arc<Self>) -> Vec<ResourceExtension> {
        let mut resources = vec![
            ResourceExtension::new("extensions")
                .with_controller(Arc::new(ExtensionsController::new(Arc::clone(self)))),
        ];
        for ext in self.sorted_extensions() {
            resources.extend(ext.get_resources());
        }
        resources
    }

    /// All controller extensions for the dispatcher, in sorted order
    pub fn get_controller_extensions(&self) -> Vec<ControllerExtension> {
        let mut controller_exts = Vec::new();
        for ext in self.sorted_extensions() {
            controller_exts.extend(ext.get_controller_extensions());
        }
        controller_exts
    }

    /// Whether an identifier resolves in the factory table
    pub fn factory_registered(&self, identifier: &str) -> bool {
        self.factories.contains(identifier)
    }

    /// Execute an extension factory
    ///
    /// A string identifier is resolved through the factory table; an
    /// identifier under the deprecated contrib prefix is rewritten to the
    /// current one first. The factory is expected to call `register` at
    /// least once. Resolution and invocation errors propagate to the
    /// caller; the bulk load paths are the ones that catch and continue.
    pub fn load_extension(&mut self, factory: impl Into<FactoryRef>) -> ManifoldResult<()> {
        let factory = match factory.into() {
            FactoryRef::Path(mut path) => {
                tracing::debug!(identifier = %path, "Loading extension");
                if path.starts_with(DEPRECATED_CONTRIB_PREFIX) {
                    tracing::warn!(
                        identifier = %path,
                        "Extension factories moved from 'manifold.contrib' to \
                         'manifold.legacy.contrib'. Use the new identifier."
                    );
                    path = path.replacen("contrib", "legacy.contrib", 1);
                }
                self.factories.get(&path).ok_or_else(|| {
                    ManifoldError::from(ExtensionError::LoadFailure {
                        identifier: path.clone(),
                        message: "no factory registered under this identifier".to_string(),
                    })
                })?
            }
            FactoryRef::Callable(factory) => factory,
        };

        (*factory)(self)
    }

    /// Load the statically configured factory list
    ///
    /// This is the eager startup entry point, distinct from filesystem
    /// discovery. A failing identifier is logged and recorded; the rest
    /// of the list is still attempted.
    pub fn load_configured_extensions(&mut self) -> Vec<LoadOutcome> {
        let identifiers = self.eager.clone();
        let mut outcomes = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            match self.load_extension(FactoryRef::Path(identifier.clone())) {
                Ok(()) => outcomes.push(LoadOutcome::Loaded { identifier }),
                Err(error) => {
                    tracing::warn!(
                        identifier = %identifier,
                        error = %error,
                        "Failed to load extension"
                    );
                    outcomes.push(LoadOutcome::Failed { identifier, error });
                }
            }
        }
        outcomes
    }
}

impl ExtensionInfo for ExtensionManager {
    fn is_loaded(&self, alias: &str) -> bool {
        ExtensionManager::is_loaded(self, alias)
    }
}

// =============================================================================
// Self-listing resource
// =============================================================================

/// Read-only controller over the extension catalog itself
///
/// `GET /extensions` enumerates all registered extensions sorted by
/// alias; `GET /extensions/{alias}` shows one. The catalog cannot be
/// changed through the API, so create and delete answer not-found.
pub struct ExtensionsController {
    manager: Arc<ExtensionManager>,
}

#[derive(Debug, Serialize)]
struct ExtensionRecord {
    name: String,
    alias: String,
    description: String,
    namespace: Option<String>,
    updated: Option<String>,
    links: Vec<Value>,
}

impl ExtensionsController {
    pub fn new(manager: Arc<ExtensionManager>) -> Self {
        Self { manager }
    }

    fn translate(ext: &dyn Extension) -> ExtensionRecord {
        ExtensionRecord {
            name: ext.name().to_string(),
            alias: ext.alias().to_string(),
            description: ext.description().to_string(),
            namespace: ext.namespace().map(str::to_string),
            updated: ext.updated().map(str::to_string),
            links: Vec::new(),
        }
    }
}

#[async_trait]
impl Controller for ExtensionsController {
    async fn index(&self, _ctx: &RequestContext) -> ManifoldResult<Value> {
        let extensions: Vec<ExtensionRecord> = self
            .manager
            .sorted_extensions()
            .iter()
            .map(|ext| Self::translate(ext.as_ref()))
            .collect();
        Ok(serde_json::json!({ "extensions": extensions }))
    }

    async fn show(&self, _ctx: &RequestContext, id: &str) -> ManifoldResult<Value> {
        // The alias doubles as the resource id.
        let ext = self.manager.extension(id).ok_or(RequestError::NotFound {
            resource: format!("extensions/{}", id),
        })?;
        Ok(serde_json::json!({ "extension": Self::translate(ext.as_ref()) }))
    }

    async fn create(&self, _ctx: &RequestContext, _body: Value) -> ManifoldResult<Value> {
        Err(RequestError::NotFound {
            resource: "extensions".to_string(),
        }
        .into())
    }

    async fn delete(&self, _ctx: &RequestContext, id: &str) -> ManifoldResult<()> {
        Err(RequestError::NotFound {
            resource: format!("extensions/{}", id),
        }
        .into())
    }
}

// =============================================================================
// Tests
// =============================================================================
