//! Typed error handling for the manifold framework
//!
//! This module provides the error type hierarchy that enables clients to
//! handle errors specifically rather than dealing with generic
//! `anyhow::Error` types.
//!
//! # Error Categories
//!
//! - [`ExtensionError`]: Errors related to extension registration and loading
//! - [`PolicyError`]: Errors related to authorization
//! - [`ValidationError`]: Errors related to input validation
//! - [`RequestError`]: HTTP-level errors a handler may legitimately produce
//! - [`ConfigError`]: Errors related to configuration parsing
//!
//! # Example
//!
//! ```rust,ignore
//! use manifold::prelude::*;
//!
//! match manager.register(ext) {
//!     Ok(()) => {}
//!     Err(ManifoldError::Extension(ExtensionError::DuplicateRegistration { alias })) => {
//!         eprintln!("alias '{}' already registered", alias);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for the manifold framework
///
/// This enum encompasses all possible errors that can occur within the
/// framework. Each variant contains a more specific error type for that
/// category.
#[derive(Debug)]
pub enum ManifoldError {
    /// Extension registration and loading errors
    Extension(ExtensionError),

    /// Authorization errors
    Policy(PolicyError),

    /// Validation errors
    Validation(ValidationError),

    /// HTTP-level request errors
    Request(RequestError),

    /// Configuration errors
    Config(ConfigError),

    /// Sanitized replacement for an unanticipated handler failure
    Unexpected { type_name: String },

    /// An arbitrary failure that escaped a handler
    Other {
        type_name: &'static str,
        source: anyhow::Error,
    },
}

impl fmt::Display for ManifoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifoldError::Extension(e) => write!(f, "{}", e),
            ManifoldError::Policy(e) => write!(f, "{}", e),
            ManifoldError::Validation(e) => write!(f, "{}", e),
            ManifoldError::Request(e) => write!(f, "{}", e),
            ManifoldError::Config(e) => write!(f, "{}", e),
            ManifoldError::Unexpected { type_name } => {
                write!(
                    f,
                    "Unexpected API error ({}). Please report this issue to \
                     the service operators and attach the API log if possible.",
                    type_name
                )
            }
            ManifoldError::Other { source, .. } => write!(f, "{}", source),
        }
    }
}

impl std::error::Error for ManifoldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifoldError::Extension(e) => Some(e),
            ManifoldError::Policy(e) => Some(e),
            ManifoldError::Validation(e) => Some(e),
            ManifoldError::Request(e) => Some(e),
            ManifoldError::Config(e) => Some(e),
            ManifoldError::Unexpected { .. } => None,
            ManifoldError::Other { source, .. } => Some(source.as_ref()),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ManifoldError {
    /// Wrap an arbitrary failure, capturing its type name for the
    /// sanitized message produced by the unexpected-error fallback.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ManifoldError::Other {
            type_name: std::any::type_name::<E>(),
            source: anyhow::Error::new(err),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ManifoldError::Extension(e) => e.status_code(),
            ManifoldError::Policy(e) => e.status_code(),
            ManifoldError::Validation(_) => StatusCode::BAD_REQUEST,
            ManifoldError::Request(e) => e.status_code(),
            ManifoldError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ManifoldError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ManifoldError::Other { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ManifoldError::Extension(e) => e.error_code(),
            ManifoldError::Policy(e) => e.error_code(),
            ManifoldError::Validation(_) => "VALIDATION_ERROR",
            ManifoldError::Request(e) => e.error_code(),
            ManifoldError::Config(_) => "CONFIG_ERROR",
            ManifoldError::Unexpected { .. } => "UNEXPECTED_ERROR",
            ManifoldError::Other { .. } => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ManifoldError::Extension(ExtensionError::DuplicateRegistration { alias }) => {
                Some(serde_json::json!({ "alias": alias }))
            }
            ManifoldError::Extension(ExtensionError::InvalidExtension { name, missing }) => {
                Some(serde_json::json!({ "name": name, "missing": missing }))
            }
            ManifoldError::Extension(ExtensionError::LoadFailure { identifier, .. }) => {
                Some(serde_json::json!({ "identifier": identifier }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ManifoldError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Extension Errors
// =============================================================================

/// Errors related to extension registration and loading
#[derive(Debug)]
pub enum ExtensionError {
    /// A second extension was registered under an existing alias
    DuplicateRegistration { alias: String },

    /// An extension is missing required identifying attributes
    InvalidExtension {
        name: String,
        missing: Vec<&'static str>,
    },

    /// A factory could not be resolved or failed while running
    LoadFailure {
        identifier: String,
        message: String,
    },
}

impl fmt::Display for ExtensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionError::DuplicateRegistration { alias } => {
                write!(f, "Found duplicate extension: {}", alias)
            }
            ExtensionError::InvalidExtension { name, missing } => {
                write!(
                    f,
                    "Extension '{}' is missing required attributes: {}",
                    name,
                    missing.join(", ")
                )
            }
            ExtensionError::LoadFailure {
                identifier,
                message,
            } => {
                write!(f, "Failed to load extension {}: {}", identifier, message)
            }
        }
    }
}

impl std::error::Error for ExtensionError {}

impl ExtensionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ExtensionError::DuplicateRegistration { .. } => StatusCode::CONFLICT,
            ExtensionError::InvalidExtension { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ExtensionError::LoadFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ExtensionError::DuplicateRegistration { .. } => "DUPLICATE_EXTENSION",
            ExtensionError::InvalidExtension { .. } => "INVALID_EXTENSION",
            ExtensionError::LoadFailure { .. } => "EXTENSION_LOAD_FAILURE",
        }
    }
}

impl From<ExtensionError> for ManifoldError {
    fn from(err: ExtensionError) -> Self {
        ManifoldError::Extension(err)
    }
}

// =============================================================================
// Policy Errors
// =============================================================================

/// Errors related to authorization
#[derive(Debug)]
pub enum PolicyError {
    /// The policy evaluator denied the action
    Forbidden { action: String },
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::Forbidden { action } => {
                write!(f, "Policy doesn't allow {} to be performed", action)
            }
        }
    }
}

impl std::error::Error for PolicyError {}

impl PolicyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PolicyError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PolicyError::Forbidden { .. } => "FORBIDDEN",
        }
    }
}

impl From<PolicyError> for ManifoldError {
    fn from(err: PolicyError) -> Self {
        ManifoldError::Policy(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Invalid JSON format
    InvalidJson { message: String },

    /// Missing required argument
    MissingArgument { argument: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
            ValidationError::MissingArgument { argument } => {
                write!(f, "Missing required argument: {}", argument)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ManifoldError {
    fn from(err: ValidationError) -> Self {
        ManifoldError::Validation(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// HTTP-level errors a handler may legitimately produce
#[derive(Debug)]
pub enum RequestError {
    /// Resource not found
    NotFound { resource: String },

    /// Method not allowed on this resource
    MethodNotAllowed { method: String, resource: String },

    /// Malformed request
    BadRequest { message: String },

    /// Operation conflicts with current resource state
    Conflict { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NotFound { resource } => {
                write!(f, "Resource '{}' not found", resource)
            }
            RequestError::MethodNotAllowed { method, resource } => {
                write!(f, "Method {} not allowed on {}", method, resource)
            }
            RequestError::BadRequest { message } => {
                write!(f, "Bad request: {}", message)
            }
            RequestError::Conflict { message } => {
                write!(f, "Conflict: {}", message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RequestError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RequestError::Conflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::NotFound { .. } => "NOT_FOUND",
            RequestError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            RequestError::BadRequest { .. } => "BAD_REQUEST",
            RequestError::Conflict { .. } => "CONFLICT",
        }
    }
}

impl From<RequestError> for ManifoldError {
    fn from(err: RequestError) -> Self {
        ManifoldError::Request(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for ManifoldError {
    fn from(err: ConfigError) -> Self {
        ManifoldError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for ManifoldError {
    fn from(err: serde_json::Error) -> Self {
        ManifoldError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for ManifoldError {
    fn from(err: serde_yaml::Error) -> Self {
        ManifoldError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for ManifoldError {
    fn from(err: std::io::Error) -> Self {
        ManifoldError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for ManifoldError {
    fn from(err: anyhow::Error) -> Self {
        ManifoldError::Other {
            type_name: "anyhow::Error",
            source: err,
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for manifold operations
pub type ManifoldResult<T> = Result<T, ManifoldError>;

// =============================================================================
// Tests
// =============================================================================
