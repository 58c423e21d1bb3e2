//! # Manifold Framework
//!
//! An extension registry and request-authorization framework for building
//! modular REST APIs in Rust.
//!
//! ## Features
//!
//! - **Extension Registry**: register optional feature modules under a
//!   unique alias, with duplicate detection and deterministic ordering
//! - **Two Contract Generations**: a duck-typed legacy descriptor and a
//!   strict base contract, unified behind one capability set
//! - **Filesystem Discovery**: walk a plugin tree and load modules by
//!   naming convention, with per-candidate outcomes
//! - **Composable Authorization**: hard (raising) and soft (boolean)
//!   policy checks over a pluggable evaluator
//! - **Error Normalization**: declared expected statuses per handler;
//!   everything else is sanitized into a generic internal error
//! - **Self-Describing API**: a built-in read-only `extensions` resource
//!   listing the loaded catalog
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use manifold::prelude::*;
//!
//! struct Hosts;
//!
//! impl ExtensionBase for Hosts {
//!     fn name(&self) -> &str { "Hosts" }
//!     fn alias(&self) -> &str { "os-hosts" }
//!     fn version(&self) -> &str { "1" }
//!     fn resources(&self) -> Vec<ResourceExtension> {
//!         vec![ResourceExtension::new("os-hosts")]
//!     }
//!     fn controller_extensions(&self) -> Vec<ControllerExtension> { vec![] }
//! }
//!
//! let mut factories = FactoryTable::new();
//! factories.register("api.hosts.Hosts", |mgr: &mut ExtensionManager| {
//!     mgr.register(std::sync::Arc::new(Hosts))
//! });
//!
//! let (manager, _outcomes) = ExtensionManagerBuilder::new(factories)
//!     .with_config(ExtensionsConfig {
//!         factories: vec!["api.hosts.Hosts".to_string()],
//!         allow_list: None,
//!     })
//!     .build();
//!
//! // Hand these to the dispatcher
//! let resources = manager.get_resources();
//! ```

pub mod config;
pub mod core;
pub mod server;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        auth::{
            AllowAllEnforcer, Authorizer, PolicyEnforcer, PolicyTarget, SoftAuthorizer,
            core_authorizer, extension_authorizer, soft_core_authorizer,
            soft_extension_authorizer,
        },
        context::RequestContext,
        error::{
            ConfigError, ErrorResponse, ExtensionError, ManifoldError, ManifoldResult,
            PolicyError, RequestError, ValidationError,
        },
        expected::ExpectedErrors,
        extension::{
            Controller, ControllerExtension, CustomRoutesFn, Extension, ExtensionBase,
            ExtensionInfo, ParentResource, ResourceExtension,
        },
    };

    // === Config ===
    pub use crate::config::ExtensionsConfig;

    // === Server ===
    pub use crate::server::{
        ExtensionFactory, ExtensionLoader, ExtensionManager, ExtensionManagerBuilder,
        ExtensionsController, FactoryRef, FactoryTable, LoadOutcome,
    };

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::{
        Router,
        http::{Method, StatusCode},
    };
}
