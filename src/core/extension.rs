//! Extension contract and the records extensions contribute
//!
//! Defines the capability set the registry depends on, in two
//! generations:
//! - [`Extension`]: the registry-facing trait. Implemented directly by
//!   legacy-style extensions, where resource contribution is optional and
//!   validity requires `name`, `alias`, `updated` and `namespace`.
//! - [`ExtensionBase`]: the strict generation. `name`, `alias` and
//!   `version` plus both contribution methods are required; a blanket
//!   impl maps every `ExtensionBase` into the capability set.

use crate::core::context::RequestContext;
use crate::core::error::{ExtensionError, ManifoldResult, RequestError};
use async_trait::async_trait;
use axum::Router;
use axum::http::Method;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Capability set every registered extension satisfies
///
/// `name` and `alias` are always present; the remaining identifying
/// fields depend on the generation. Extensions that do not contribute
/// resources or controller extensions simply inherit the empty defaults.
pub trait Extension: Send + Sync {
    /// Human-readable label, e.g. "Fox In Socks"
    fn name(&self) -> &str;

    /// Unique short key, also used as the URL segment
    fn alias(&self) -> &str;

    /// One-line description for the self-listing resource
    fn description(&self) -> &str {
        ""
    }

    /// XML-era namespace URI (legacy generation)
    fn namespace(&self) -> Option<&str> {
        None
    }

    /// ISO-8601 timestamp of the last update (legacy generation)
    fn updated(&self) -> Option<&str> {
        None
    }

    /// Extension version (strict generation)
    fn version(&self) -> Option<&str> {
        None
    }

    /// Validate the required identifying fields
    ///
    /// The default applies the legacy rule: `name`, `alias`, `updated`
    /// and `namespace` must all be present and non-empty. The error
    /// lists every missing field.
    fn is_valid(&self) -> Result<(), ExtensionError> {
        let mut missing = Vec::new();
        if self.name().is_empty() {
            missing.push("name");
        }
        if self.alias().is_empty() {
            missing.push("alias");
        }
        if self.updated().is_none_or(str::is_empty) {
            missing.push("updated");
        }
        if self.namespace().is_none_or(str::is_empty) {
            missing.push("namespace");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ExtensionError::InvalidExtension {
                name: self.name().to_string(),
                missing,
            })
        }
    }

    /// Resources contributed by this extension
    ///
    /// Resources define new nouns, accessible through URLs.
    fn get_resources(&self) -> Vec<ResourceExtension> {
        Vec::new()
    }

    /// Controller extensions contributed by this extension
    ///
    /// Controller extensions extend existing collections' controllers.
    fn get_controller_extensions(&self) -> Vec<ControllerExtension> {
        Vec::new()
    }
}

/// Strict extension contract
///
/// All current-generation extensions must implement every method here,
/// even if the contribution methods just return an empty list. Instances
/// are constructed with a shared [`ExtensionInfo`] handle.
pub trait ExtensionBase: Send + Sync {
    /// Name of the extension
    fn name(&self) -> &str;

    /// Alias for the extension
    fn alias(&self) -> &str;

    /// Version of the extension
    fn version(&self) -> &str;

    /// One-line description for the self-listing resource
    fn description(&self) -> &str {
        ""
    }

    /// Resources contributed by this extension; may be empty
    fn resources(&self) -> Vec<ResourceExtension>;

    /// Controller extensions contributed by this extension; may be empty
    fn controller_extensions(&self) -> Vec<ControllerExtension>;
}

impl<T: ExtensionBase> Extension for T {
    fn name(&self) -> &str {
        ExtensionBase::name(self)
    }

    fn alias(&self) -> &str {
        ExtensionBase::alias(self)
    }

    fn description(&self) -> &str {
        ExtensionBase::description(self)
    }

    fn version(&self) -> Option<&str> {
        Some(ExtensionBase::version(self))
    }

    fn is_valid(&self) -> Result<(), ExtensionError> {
        let mut missing = Vec::new();
        if ExtensionBase::name(self).is_empty() {
            missing.push("name");
        }
        if ExtensionBase::alias(self).is_empty() {
            missing.push("alias");
        }
        if ExtensionBase::version(self).is_empty() {
            missing.push("version");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ExtensionError::InvalidExtension {
                name: ExtensionBase::name(self).to_string(),
                missing,
            })
        }
    }

    fn get_resources(&self) -> Vec<ResourceExtension> {
        self.resources()
    }

    fn get_controller_extensions(&self) -> Vec<ControllerExtension> {
        self.controller_extensions()
    }
}

/// Lookup over the set of loaded extensions
///
/// Shared with strict-generation extensions so they can branch on the
/// availability of optional features.
pub trait ExtensionInfo: Send + Sync {
    fn is_loaded(&self, alias: &str) -> bool;
}

/// Handler for a collection exposed by an extension
///
/// The hosting dispatcher invokes these per request. Operations an
/// implementation does not provide answer not-found, so a read-only
/// controller only overrides `index` and `show`.
#[async_trait]
pub trait Controller: Send + Sync {
    async fn index(&self, _ctx: &RequestContext) -> ManifoldResult<Value> {
        Err(RequestError::NotFound {
            resource: "index".to_string(),
        }
        .into())
    }

    async fn show(&self, _ctx: &RequestContext, id: &str) -> ManifoldResult<Value> {
        Err(RequestError::NotFound {
            resource: id.to_string(),
        }
        .into())
    }

    async fn create(&self, _ctx: &RequestContext, _body: Value) -> ManifoldResult<Value> {
        Err(RequestError::NotFound {
            resource: "create".to_string(),
        }
        .into())
    }

    async fn delete(&self, _ctx: &RequestContext, id: &str) -> ManifoldResult<()> {
        Err(RequestError::NotFound {
            resource: id.to_string(),
        }
        .into())
    }
}

/// Callback that grafts custom routes onto the dispatcher's router
pub type CustomRoutesFn = Arc<dyn Fn(Router) -> Router + Send + Sync>;

/// Parent linkage for a sub-collection resource
#[derive(Debug, Clone)]
pub struct ParentResource {
    /// Collection the resource nests under
    pub collection: String,
    /// Singular member name within the parent collection
    pub member_name: String,
}

/// A top-level resource contributed by an extension
///
/// A plain value record consumed by the external dispatcher to build its
/// route tables. Immutable after construction; optional parts are set
/// through the `with_*` builders.
#[derive(Clone)]
pub struct ResourceExtension {
    /// URL-visible plural noun
    pub collection: String,
    /// Handler for the collection, if any
    pub controller: Option<Arc<dyn Controller>>,
    /// Parent-resource linkage, if nested
    pub parent: Option<ParentResource>,
    /// Extra collection-level actions (verb name to HTTP method)
    pub collection_actions: IndexMap<String, Method>,
    /// Extra member-level actions (verb name to HTTP method)
    pub member_actions: IndexMap<String, Method>,
    /// Hook for routes that do not fit the collection pattern
    pub custom_routes_fn: Option<CustomRoutesFn>,
    /// Collection whose routing rules this resource inherits
    pub inherits: Option<String>,
    /// Singular member name, when it differs from the default
    pub member_name: Option<String>,
}

impl ResourceExtension {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            controller: None,
            parent: None,
            collection_actions: IndexMap::new(),
            member_actions: IndexMap::new(),
            custom_routes_fn: None,
            inherits: None,
            member_name: None,
        }
    }

    pub fn with_controller(mut self, controller: Arc<dyn Controller>) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn with_parent(mut self, parent: ParentResource) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_collection_action(mut self, name: impl Into<String>, method: Method) -> Self {
        self.collection_actions.insert(name.into(), method);
        self
    }

    pub fn with_member_action(mut self, name: impl Into<String>, method: Method) -> Self {
        self.member_actions.insert(name.into(), method);
        self
    }

    pub fn with_custom_routes(mut self, f: CustomRoutesFn) -> Self {
        self.custom_routes_fn = Some(f);
        self
    }

    pub fn with_inherits(mut self, collection: impl Into<String>) -> Self {
        self.inherits = Some(collection.into());
        self
    }

    pub fn with_member_name(mut self, member_name: impl Into<String>) -> Self {
        self.member_name = Some(member_name.into());
        self
    }
}

impl std::fmt::Debug for ResourceExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceExtension")
            .field("collection", &self.collection)
            .field("has_controller", &self.controller.is_some())
            .field("parent", &self.parent)
            .field("collection_actions", &self.collection_actions)
            .field("member_actions", &self.member_actions)
            .field("inherits", &self.inherits)
            .field("member_name", &self.member_name)
            .finish()
    }
}

/// Augmentation of an existing collection's controller
#[derive(Clone)]
pub struct ControllerExtension {
    /// Alias of the owning extension
    pub extension_alias: String,
    /// Collection whose controller is extended
    pub collection: String,
    /// The extending controller
    pub controller: Arc<dyn Controller>,
}

impl ControllerExtension {
    pub fn new(
        extension_alias: impl Into<String>,
        collection: impl Into<String>,
        controller: Arc<dyn Controller>,
    ) -> Self {
        Self {
            extension_alias: extension_alias.into(),
            collection: collection.into(),
            controller,
        }
    }
}

impl std::fmt::Debug for ControllerExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerExtension")
            .field("extension_alias", &self.extension_alias)
            .field("collection", &self.collection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FoxInSocks;

    impl Extension for FoxInSocks {
        fn name(&self) -> &str {
            "Fox In Socks"
        }

        fn alias(&self) -> &str {
            "FOXNSOX"
        }

        fn namespace(&self) -> Option<&str> {
            Some("http://docs.example.com/ext/foxnsox/api/v1.0")
        }

        fn updated(&self) -> Option<&str> {
            Some("2011-01-22T13:25:27-06:00")
        }
    }

    struct MissingUpdated;

    impl Extension for MissingUpdated {
        fn name(&self) -> &str {
            "Half Done"
        }

        fn alias(&self) -> &str {
            "half-done"
        }

        fn namespace(&self) -> Option<&str> {
            Some("http://docs.example.com/ext/half/api/v1.0")
        }
    }

    struct StrictHosts;

    impl ExtensionBase for StrictHosts {
        fn name(&self) -> &str {
            "Hosts"
        }

        fn alias(&self) -> &str {
            "os-hosts"
        }

        fn version(&self) -> &str {
            "1"
        }

        fn resources(&self) -> Vec<ResourceExtension> {
            vec![ResourceExtension::new("os-hosts")]
        }

        fn controller_extensions(&self) -> Vec<ControllerExtension> {
            Vec::new()
        }
    }

    struct StrictNoVersion;

    impl ExtensionBase for StrictNoVersion {
        fn name(&self) -> &str {
            "Nameless"
        }

        fn alias(&self) -> &str {
            "nameless"
        }

        fn version(&self) -> &str {
            ""
        }

        fn resources(&self) -> Vec<ResourceExtension> {
            Vec::new()
        }

        fn controller_extensions(&self) -> Vec<ControllerExtension> {
            Vec::new()
        }
    }

    #[test]
    fn test_legacy_extension_with_all_fields_is_valid() {
        assert!(FoxInSocks.is_valid().is_ok());
    }

    #[test]
    fn test_legacy_extension_missing_updated_is_invalid() {
        let err = MissingUpdated.is_valid().unwrap_err();
        match err {
            ExtensionError::InvalidExtension { missing, .. } => {
                assert_eq!(missing, vec!["updated"]);
            }
            other => panic!("Expected InvalidExtension, got {:?}", other),
        }
    }

    #[test]
    fn test_legacy_extension_contributes_nothing_by_default() {
        assert!(FoxInSocks.get_resources().is_empty());
        assert!(FoxInSocks.get_controller_extensions().is_empty());
    }

    #[test]
    fn test_strict_extension_maps_into_capability_set() {
        let ext: &dyn Extension = &StrictHosts;
        assert_eq!(ext.version(), Some("1"));
        assert!(ext.namespace().is_none());
        assert!(ext.is_valid().is_ok());
        assert_eq!(ext.get_resources().len(), 1);
    }

    #[test]
    fn test_strict_extension_requires_version() {
        let ext: &dyn Extension = &StrictNoVersion;
        let err = ext.is_valid().unwrap_err();
        match err {
            ExtensionError::InvalidExtension { missing, .. } => {
                assert_eq!(missing, vec!["version"]);
            }
            other => panic!("Expected InvalidExtension, got {:?}", other),
        }
    }

    #[test]
    fn test_resource_extension_builder() {
        let res = ResourceExtension::new("os-hosts")
            .with_member_name("host")
            .with_collection_action("detail", Method::GET)
            .with_member_action("startup", Method::GET)
            .with_inherits("servers");
        assert_eq!(res.collection, "os-hosts");
        assert_eq!(res.member_name.as_deref(), Some("host"));
        assert_eq!(res.collection_actions.get("detail"), Some(&Method::GET));
        assert_eq!(res.member_actions.get("startup"), Some(&Method::GET));
        assert_eq!(res.inherits.as_deref(), Some("servers"));
        assert!(res.controller.is_none());
    }

    #[test]
    fn test_controller_defaults_answer_not_found() {
        struct Bare;
        impl Controller for Bare {}

        let ctx = RequestContext::new("p1", "u1");
        let err = tokio_test::block_on(Bare.show(&ctx, "abc")).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
