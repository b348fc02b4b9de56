// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::portal::PortalError;
use crate::store::StorageError;
use crate::tree::TreeError;

/// HTTP API error with appropriate status codes and client-friendly
/// messages. Domain errors carry their own stable kind tag through `code`.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError { message: String, code: &'static str },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound { message: String, code: &'static str },

    // 409 Conflict
    Conflict { message: String, code: &'static str },

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound { message, .. } => message,
            ApiError::Conflict { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Stable code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { code, .. } => code,
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound { code, .. } => code,
            ApiError::Conflict { code, .. } => code,
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
            code: "NOT_FOUND",
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<TreeError> for ApiError {
    fn from(err: TreeError) -> Self {
        let code = err.kind();
        match &err {
            TreeError::InvalidCategoryForParent { .. }
            | TreeError::RootCategoryImmutable
            | TreeError::IncompatibleChildCategories
            | TreeError::SelfParent
            | TreeError::WouldCreateCycle
            | TreeError::CannotMoveRoot
            | TreeError::RootAlreadyExists => ApiError::ValidationError {
                message: err.to_string(),
                code,
            },
            TreeError::NodeHasChildren => ApiError::Conflict {
                message: err.to_string(),
                code,
            },
            TreeError::ParentNotFound(_) | TreeError::NodeNotFound(_) => ApiError::NotFound {
                message: err.to_string(),
                code,
            },
            TreeError::CorruptTree(_) => {
                tracing::error!("tree corruption detected: {}", err);
                ApiError::internal_server_error("tree structure is inconsistent")
            }
            TreeError::Storage(inner) => storage_to_api(inner),
        }
    }
}

impl From<PortalError> for ApiError {
    fn from(err: PortalError) -> Self {
        match err {
            PortalError::ConfigNotFound(_) => ApiError::NotFound {
                message: err.to_string(),
                code: "CONFIG_NOT_FOUND",
            },
            PortalError::NodeNotFound(_) => ApiError::NotFound {
                message: err.to_string(),
                code: "NODE_NOT_FOUND",
            },
            PortalError::Tree(inner) => inner.into(),
            PortalError::Storage(inner) => storage_to_api(&inner),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        storage_to_api(&err)
    }
}

fn storage_to_api(err: &StorageError) -> ApiError {
    match err {
        StorageError::NotFound(msg) => ApiError::not_found(msg.clone()),
        StorageError::Connection(msg) => {
            tracing::error!("storage connection error: {}", msg);
            ApiError::service_unavailable("storage temporarily unavailable")
        }
        StorageError::Query(msg) => {
            // Don't expose internal storage errors to clients
            tracing::error!("storage query error: {}", msg);
            ApiError::internal_server_error("an error occurred while processing your request")
        }
        StorageError::Sqlx(sqlx_err) => {
            tracing::error!("sqlx error: {}", sqlx_err);
            ApiError::internal_server_error("database error occurred")
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn tree_errors_map_to_stable_codes() {
        let err: ApiError = TreeError::NodeHasChildren.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "NODE_HAS_CHILDREN");

        let err: ApiError = TreeError::SelfParent.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "SELF_PARENT");

        let err: ApiError = TreeError::NodeNotFound(Uuid::new_v4()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn portal_errors_map_to_stable_codes() {
        let err: ApiError = PortalError::ConfigNotFound(Uuid::new_v4()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "CONFIG_NOT_FOUND");

        let err: ApiError = PortalError::NodeNotFound(Uuid::new_v4()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "NODE_NOT_FOUND");
    }

    #[test]
    fn connection_errors_surface_as_unavailable() {
        let err: ApiError = StorageError::Connection("refused".into()).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn corrupt_tree_is_hidden_behind_500() {
        let err: ApiError = TreeError::CorruptTree(Uuid::new_v4()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
