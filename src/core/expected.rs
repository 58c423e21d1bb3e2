//! Normalization of handler failures into declared outcomes
//!
//! A handler declares the status codes it may legitimately produce; any
//! other failure is logged and replaced by a sanitized internal error.
//! Authorization denials and validation errors always pass through, so
//! handlers never need to declare them.
//!
//! ```rust,ignore
//! let expected = ExpectedErrors::single(StatusCode::NOT_FOUND);
//! let result = expected.run(controller.show(&ctx, id)).await;
//! ```

use crate::core::error::{ManifoldError, ManifoldResult};
use axum::http::StatusCode;
use std::future::Future;

/// Declared set of outward-facing status codes for one handler
#[derive(Debug, Clone)]
pub struct ExpectedErrors {
    codes: Vec<StatusCode>,
}

impl ExpectedErrors {
    /// Declare a set of expected status codes
    pub fn new<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = StatusCode>,
    {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    /// Declare a single expected status code
    pub fn single(code: StatusCode) -> Self {
        Self { codes: vec![code] }
    }

    fn is_declared(&self, code: StatusCode) -> bool {
        self.codes.contains(&code)
    }

    /// Normalize a handler outcome
    ///
    /// Success is returned unchanged. A failure passes through when it is
    /// an authorization denial, a validation error, or a structured error
    /// whose status code was declared; anything else is logged in full
    /// and replaced by [`ManifoldError::Unexpected`].
    pub fn normalize<T>(&self, result: ManifoldResult<T>) -> ManifoldResult<T> {
        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let type_name = match &err {
            // Handlers never need to declare authorization denials.
            ManifoldError::Policy(_) => return Err(err),
            // Invalid API parameters are likewise always anticipated.
            ManifoldError::Validation(_) => return Err(err),
            ManifoldError::Other { type_name, .. } => type_name.to_string(),
            structured => {
                if self.is_declared(structured.status_code()) {
                    return Err(err);
                }
                structured.error_code().to_string()
            }
        };

        tracing::error!(error = %err, "Unexpected exception in API method");
        Err(ManifoldError::Unexpected { type_name })
    }

    /// Run a handler future and normalize its outcome
    pub async fn run<T, F>(&self, fut: F) -> ManifoldResult<T>
    where
        F: Future<Output = ManifoldResult<T>>,
    {
        self.normalize(fut.await)
    }
}
