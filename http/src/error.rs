use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use sentinel_application::ApplicationError;
use sentinel_domain::DomainError;

#[derive(Debug)]
pub enum HttpError {
    Validation { message: String },
    InvalidInput { message: String },
    Internal { message: String },
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::Validation { message } => (StatusCode::UNPROCESSABLE_ENTITY, message),
            HttpError::InvalidInput { message } => (StatusCode::BAD_REQUEST, message),
            HttpError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (
            status,
            Json(json!({
                "error": message,
            })),
        )
            .into_response()
    }
}

impl From<ApplicationError> for HttpError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::Validation(message) => HttpError::Validation { message },
            ApplicationError::Domain(DomainError::InvalidInput(message)) => {
                HttpError::InvalidInput { message }
            }
            other => HttpError::Internal {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_unprocessable_entity() {
        let error = HttpError::from(ApplicationError::Validation("audio missing".to_string()));
        assert!(matches!(error, HttpError::Validation { .. }));
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let error = HttpError::from(ApplicationError::Domain(DomainError::invalid_input(
            "audio sample is empty",
        )));
        assert!(matches!(error, HttpError::InvalidInput { .. }));
    }

    #[test]
    fn internal_errors_map_to_server_error() {
        let error = HttpError::from(ApplicationError::Internal("wiring broke".to_string()));
        assert!(matches!(error, HttpError::Internal { .. }));
    }
}
