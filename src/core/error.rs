//! Typed error handling for the order desk
//!
//! Every fallible operation in the crate returns [`DeskResult`]. The error
//! hierarchy mirrors the failure classes of the aggregation pipeline:
//!
//! - [`ValidationError`]: a malformed filter, rejected before any query runs
//! - [`StorageError`]: query execution failure, timeout or lost connectivity
//! - [`ConfigError`]: configuration parsing and loading
//!
//! Decoding failures of serialized address payloads are recovered inside the
//! presentation layer and never appear here.
//!
//! # Example
//!
//! ```rust,ignore
//! match board.warning_orders(&filter).await {
//!     Ok(ids) => println!("{} orders need attention", ids.len()),
//!     Err(DeskError::Validation(e)) => eprintln!("bad filter: {}", e),
//!     Err(e) => eprintln!("lookup failed: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for the order desk
#[derive(Debug)]
pub enum DeskError {
    /// Malformed filter or request input
    Validation(ValidationError),

    /// Storage backend errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for DeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeskError::Validation(e) => write!(f, "{}", e),
            DeskError::Storage(e) => write!(f, "{}", e),
            DeskError::Config(e) => write!(f, "{}", e),
            DeskError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DeskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeskError::Validation(e) => Some(e),
            DeskError::Storage(e) => Some(e),
            DeskError::Config(e) => Some(e),
            DeskError::Internal(_) => None,
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

impl DeskError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeskError::Validation(_) => StatusCode::BAD_REQUEST,
            DeskError::Storage(e) => e.status_code(),
            DeskError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DeskError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DeskError::Validation(e) => e.error_code(),
            DeskError::Storage(e) => e.error_code(),
            DeskError::Config(_) => "CONFIG_ERROR",
            DeskError::Internal(_) => "INTERNAL_ERROR",
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

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            DeskError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            DeskError::Validation(ValidationError::InvalidSortField { value }) => {
                Some(serde_json::json!({ "sort_field": value }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for DeskError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to filter and request validation
#[derive(Debug)]
pub enum ValidationError {
    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Tenant scope missing or not positive
    MissingTenant,

    /// Sort field is not one of the sortable columns
    InvalidSortField {
        value: String,
    },

    /// Date range lower bound is after its upper bound
    InvalidDateRange {
        from: i64,
        to: i64,
    },

    /// Invalid JSON format
    InvalidJson {
        message: String,
    },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::MissingTenant => {
                write!(f, "Tenant id is required and must be positive")
            }
            ValidationError::InvalidSortField { value } => {
                write!(f, "Unsupported sort field: '{}'", value)
            }
            ValidationError::InvalidDateRange { from, to } => {
                write!(f, "Invalid date range: {} is after {}", from, to)
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::MissingTenant => "MISSING_TENANT",
            ValidationError::InvalidSortField { .. } => "INVALID_SORT_FIELD",
            ValidationError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
        }
    }
}

impl From<ValidationError> for DeskError {
    fn from(err: ValidationError) -> Self {
        DeskError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for DeskError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DeskError::Validation(errors.into())
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Connection error
    ConnectionError {
        backend: String,
        message: String,
    },

    /// Query execution error
    QueryError {
        backend: String,
        message: String,
    },

    /// The caller-supplied deadline elapsed
    Timeout {
        operation: String,
    },

    /// Backend not available
    Unavailable {
        backend: String,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionError { backend, message } => {
                write!(f, "Failed to connect to {}: {}", backend, message)
            }
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
            StorageError::Timeout { operation } => {
                write!(f, "Deadline exceeded while running {}", operation)
            }
            StorageError::Unavailable { backend } => {
                write!(f, "Storage backend '{}' is unavailable", backend)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl StorageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            StorageError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::ConnectionError { .. } => "STORAGE_CONNECTION_ERROR",
            StorageError::QueryError { .. } => "STORAGE_QUERY_ERROR",
            StorageError::Timeout { .. } => "STORAGE_TIMEOUT",
            StorageError::Unavailable { .. } => "STORAGE_UNAVAILABLE",
        }
    }

    /// Shorthand for a query failure in the named backend
    pub fn query(backend: &str, message: impl fmt::Display) -> Self {
        StorageError::QueryError {
            backend: backend.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<StorageError> for DeskError {
    fn from(err: StorageError) -> Self {
        DeskError::Storage(err)
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

    /// Missing required setting
    MissingField {
        field: String,
        context: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    IoError {
        message: String,
    },
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
            ConfigError::MissingField { field, context } => {
                write!(f, "Missing required field '{}' in {}", field, context)
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for DeskError {
    fn from(err: ConfigError) -> Self {
        DeskError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for DeskError {
    fn from(err: serde_json::Error) -> Self {
        DeskError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for DeskError {
    fn from(err: std::io::Error) -> Self {
        DeskError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for DeskError {
    fn from(err: serde_yaml::Error) -> Self {
        DeskError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "mysql")]
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StorageError::Timeout {
                operation: "connection acquire".to_string(),
            },
            sqlx::Error::PoolClosed => StorageError::Unavailable {
                backend: "MySQL".to_string(),
            },
            sqlx::Error::Io(e) => StorageError::ConnectionError {
                backend: "MySQL".to_string(),
                message: e.to_string(),
            },
            other => StorageError::query("MySQL", other),
        }
    }
}

#[cfg(feature = "mysql")]
impl From<sqlx::Error> for DeskError {
    fn from(err: sqlx::Error) -> Self {
        DeskError::Storage(err.into())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for order desk operations
pub type DeskResult<T> = Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_status_code() {
        let err: DeskError = ValidationError::MissingTenant.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "MISSING_TENANT");
    }

    #[test]
    fn test_storage_error_status_codes() {
        let err: DeskError = StorageError::query("MySQL", "syntax error").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, DeskError::Storage(StorageError::QueryError { .. })));

        let err: DeskError = StorageError::Timeout {
            operation: "count".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.error_code(), "STORAGE_TIMEOUT");
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::ConnectionError {
            backend: "MySQL".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("MySQL"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_sort_field_details() {
        let err = DeskError::Validation(ValidationError::InvalidSortField {
            value: "o.status_time; DROP TABLE".to_string(),
        });
        let response = err.to_response();
        assert_eq!(response.code, "INVALID_SORT_FIELD");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_validation_error_multiple_fields() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError {
                field: "tenant_id".to_string(),
                message: "must be positive".to_string(),
            },
            FieldValidationError {
                field: "bad_rating_max".to_string(),
                message: "out of range".to_string(),
            },
        ]);
        let display = err.to_string();
        assert!(display.contains("tenant_id"));
        assert!(display.contains("bad_rating_max"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: DeskError = json_err.into();
        assert!(matches!(
            err,
            DeskError::Validation(ValidationError::InvalidJson { .. })
        ));
    }
}
