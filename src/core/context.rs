//! Request context carried into authorization checks and controllers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the caller for a single request
///
/// Built by the hosting dispatcher once per request and passed by
/// reference into authorizers and controllers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Project (tenant) the caller is acting in
    pub project_id: String,

    /// The calling user
    pub user_id: String,

    /// Unique id for log correlation
    pub request_id: Uuid,
}

impl RequestContext {
    /// Create a context with a fresh request id
    pub fn new(project_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            user_id: user_id.into(),
            request_id: Uuid::new_v4(),
        }
    }
}
