use crate::error::ServiceError;
use crate::transport::http::types::ApiResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidIdentifier(_) | ServiceError::Validation(_) => {
            StatusCode::BAD_REQUEST
        }
        ServiceError::Database(_) | ServiceError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: ServiceError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        error!(error = %err, "request failed");
    }
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(err.to_string()),
            code: Some(err.error_code().to_string()),
        }),
    )
        .into_response()
}

pub fn failure(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            code: None,
        }),
    )
        .into_response()
}

pub fn success<T: Serialize>(status: StatusCode, data: &T) -> Response {
    match serde_json::to_value(data) {
        Ok(data) => (
            status,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
                code: None,
            }),
        )
            .into_response(),
        Err(e) => error_response(ServiceError::Decode(e)),
    }
}

pub fn parse_key(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        failure(
            StatusCode::BAD_REQUEST,
            format!("Invalid primary key '{}' (expected a UUID)", raw),
        )
    })
}

pub fn json_body<T>(request: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match request {
        Ok(Json(v)) => Ok(v),
        Err(e) => Err(failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Invalid JSON body: {}", e),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_status() {
        assert_eq!(
            status_for(&ServiceError::Conflict("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ServiceError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ServiceError::InvalidIdentifier("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ServiceError::Database(sqlx::Error::PoolTimedOut)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn parses_keys() {
        assert!(parse_key("0b8e5a52-2f62-4c8e-9a43-6b0f1c1f7d10").is_ok());
        let resp = parse_key("42").unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
