//! Service error type mapping to HTTP status codes and a JSON envelope.
//!
//! Every foreseeable failure is converted into a catalogued client-facing
//! error here; internal faults never reach the caller as raw traces.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::catalog::CatalogError;
use crate::classifier::ClassifierError;

#[derive(Debug)]
pub enum ApiError {
    /// The upload is missing, is not an image, or cannot be decoded.
    InvalidUpload(String),
    /// The gender parameter is outside the configured set.
    InvalidGender(String),
    /// The catalog is gendered but no gender parameter was supplied.
    GenderRequired,
    /// A browse request matched no eligible assets.
    NoStylesFound { category: String },
    /// The classifier failed on a decoded image.
    Classifier(ClassifierError),
    /// Anything else server-side.
    Internal(String),
}

impl From<ClassifierError> for ApiError {
    fn from(e: ClassifierError) -> Self {
        ApiError::Classifier(e)
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::GenderRequired => ApiError::GenderRequired,
            CatalogError::Io(e) => ApiError::Internal(format!("Asset store error: {}", e)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::InvalidUpload(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_UPLOAD", msg.clone())
            }
            ApiError::InvalidGender(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_GENDER", msg.clone())
            }
            ApiError::GenderRequired => (
                StatusCode::BAD_REQUEST,
                "GENDER_REQUIRED",
                "This deployment partitions styles by gender; pass a 'gender' parameter".to_string(),
            ),
            ApiError::NoStylesFound { category } => (
                StatusCode::NOT_FOUND,
                "NO_STYLES_FOUND",
                format!("No styles found for category '{}'", category),
            ),
            ApiError::Classifier(e) => {
                log::error!("Classifier failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CLASSIFIER_ERROR",
                    "Failed to classify the uploaded image".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_gender_required_maps_to_client_error() {
        let err: ApiError = CatalogError::GenderRequired.into();
        assert!(matches!(err, ApiError::GenderRequired));
    }

    #[test]
    fn test_catalog_io_maps_to_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ApiError = CatalogError::Io(io).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
