use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::services::ServiceError;
use log::error;
use serde_json::{Map, json};

/// Error returned by handlers; renders as a JSON body with the matching status
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self(ServiceError::Unauthenticated)
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Protected(_) => StatusCode::CONFLICT,
            ServiceError::Password(_) | ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self.0 {
            ServiceError::Validation { field, message } => {
                let mut errors = Map::new();
                errors.insert(field.to_string(), json!([message]));
                json!({ "errors": errors })
            }
            ServiceError::Password(_) | ServiceError::Db(_) => {
                error!("Request failed: {}", self.0);
                json!({ "detail": "Internal server error" })
            }
            other => json!({ "detail": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
