//! Core module containing fundamental traits and types for the framework

pub mod auth;
pub mod context;
pub mod error;
pub mod expected;
pub mod extension;

pub use auth::{
    AllowAllEnforcer, Authorizer, PolicyEnforcer, PolicyTarget, SoftAuthorizer, core_authorizer,
    extension_authorizer, soft_core_authorizer, soft_extension_authorizer,
};
pub use context::RequestContext;
pub use error::{
    ConfigError, ErrorResponse, ExtensionError, ManifoldError, ManifoldResult, PolicyError,
    RequestError, ValidationError,
};
pub use expected::ExpectedErrors;
pub use extension::{
    Controller, ControllerExtension, CustomRoutesFn, Extension, ExtensionBase, ExtensionInfo,
    ParentResource, ResourceExtension,
};
