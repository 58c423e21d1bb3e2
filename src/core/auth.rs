//! Authorization checks for API extensions
//!
//! Provides hard (error-raising) and soft (boolean) authorizers built on
//! top of an external policy evaluator:
//! - [`Authorizer`]: raises [`PolicyError::Forbidden`] on denial
//! - [`SoftAuthorizer`]: converts denial into `false`, never raises
//!
//! Two permission namespacing schemes are supported; see
//! [`core_authorizer`] and [`extension_authorizer`].

use crate::core::context::RequestContext;
use crate::core::error::{ManifoldError, ManifoldResult, PolicyError};
use std::sync::Arc;

/// Target of a policy check
///
/// Defaults to the identity pair derived from the request context when
/// the caller does not supply one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTarget {
    pub project_id: String,
    pub user_id: String,
}

impl From<&RequestContext> for PolicyTarget {
    fn from(ctx: &RequestContext) -> Self {
        Self {
            project_id: ctx.project_id.clone(),
            user_id: ctx.user_id.clone(),
        }
    }
}

/// External policy evaluator
///
/// Implementations hold the rule storage and decide whether `action` may
/// be performed against `target`. Denial must be reported as
/// [`PolicyError::Forbidden`] so soft authorizers can recognize it.
pub trait PolicyEnforcer: Send + Sync {
    fn enforce(
        &self,
        ctx: &RequestContext,
        action: &str,
        target: &PolicyTarget,
    ) -> ManifoldResult<()>;
}

/// Default permissive evaluator (for development and tests)
pub struct AllowAllEnforcer;

impl PolicyEnforcer for AllowAllEnforcer {
    fn enforce(
        &self,
        _ctx: &RequestContext,
        _action: &str,
        _target: &PolicyTarget,
    ) -> ManifoldResult<()> {
        Ok(())
    }
}

/// Hard authorization check for one API feature
///
/// Assembles the permission string for the configured namespacing scheme
/// and delegates to the policy evaluator. Denial propagates as
/// [`PolicyError::Forbidden`].
#[derive(Clone)]
pub struct Authorizer {
    enforcer: Arc<dyn PolicyEnforcer>,
    api_name: String,
    feature_name: String,
}

impl Authorizer {
    fn new(
        enforcer: Arc<dyn PolicyEnforcer>,
        api_name: impl Into<String>,
        feature_name: impl Into<String>,
    ) -> Self {
        Self {
            enforcer,
            api_name: api_name.into(),
            feature_name: feature_name.into(),
        }
    }

    /// The permission string for an optional action
    fn action_string(&self, action: Option<&str>) -> String {
        match action {
            Some(action) => format!("{}:{}:{}", self.api_name, self.feature_name, action),
            None => format!("{}:{}", self.api_name, self.feature_name),
        }
    }

    /// Run the check; `target` defaults to the context-derived identity pair
    pub fn authorize(
        &self,
        ctx: &RequestContext,
        target: Option<PolicyTarget>,
        action: Option<&str>,
    ) -> ManifoldResult<()> {
        let target = target.unwrap_or_else(|| PolicyTarget::from(ctx));
        self.enforcer.enforce(ctx, &self.action_string(action), &target)
    }

    /// Wrap into a boolean-returning check
    pub fn soft(self) -> SoftAuthorizer {
        SoftAuthorizer { hard: self }
    }
}

/// Soft authorization check
///
/// Catches exactly the forbidden error from the wrapped hard authorizer
/// and converts it to `false`; every other error propagates unchanged.
#[derive(Clone)]
pub struct SoftAuthorizer {
    hard: Authorizer,
}

impl SoftAuthorizer {
    pub fn authorize(
        &self,
        ctx: &RequestContext,
        target: Option<PolicyTarget>,
        action: Option<&str>,
    ) -> ManifoldResult<bool> {
        match self.hard.authorize(ctx, target, action) {
            Ok(()) => Ok(true),
            Err(ManifoldError::Policy(PolicyError::Forbidden { .. })) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Build a hard authorizer using the current namespacing scheme:
/// `"{api}:{feature}[:{action}]"`
pub fn core_authorizer(
    enforcer: Arc<dyn PolicyEnforcer>,
    api_name: impl Into<String>,
    feature_name: impl Into<String>,
) -> Authorizer {
    Authorizer::new(enforcer, api_name, feature_name)
}

/// Build a hard authorizer using the legacy namespacing scheme:
/// `"{api}_extension:{feature}[:{action}]"`
pub fn extension_authorizer(
    enforcer: Arc<dyn PolicyEnforcer>,
    api_name: impl Into<String>,
    feature_name: impl Into<String>,
) -> Authorizer {
    core_authorizer(enforcer, format!("{}_extension", api_name.into()), feature_name)
}

/// Soft variant of [`core_authorizer`]
pub fn soft_core_authorizer(
    enforcer: Arc<dyn PolicyEnforcer>,
    api_name: impl Into<String>,
    feature_name: impl Into<String>,
) -> SoftAuthorizer {
    core_authorizer(enforcer, api_name, feature_name).soft()
}

/// Soft variant of [`extension_authorizer`]
pub fn soft_extension_authorizer(
    enforcer: Arc<dyn PolicyEnforcer>,
    api_name: impl Into<String>,
    feature_name: impl Into<String>,
) -> SoftAuthorizer {
    extension_authorizer(enforcer, api_name, feature_name).soft()
}
