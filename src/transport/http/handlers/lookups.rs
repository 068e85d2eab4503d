use crate::domain::lookup::{CreateLookup, UpdateLookup};
use crate::transport::http::handlers::common::{error_response, json_body, parse_key, success};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/lookups",
    responses(
        (status = 200, description = "All lookup types, ascending by primary key", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn list_lookups_handler(State(state): State<AppState>) -> Response {
    match state.db_service.find().await {
        Ok(rows) => success(StatusCode::OK, &rows),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/lookups",
    request_body = CreateLookup,
    responses(
        (status = 201, description = "Lookup type and its values table created", body = ApiResponse),
        (status = 400, description = "Invalid lookup_type or payload", body = ApiResponse),
        (status = 409, description = "Primary key, lookup_type or meaning already in use", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn create_lookup_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateLookup>, JsonRejection>,
) -> Response {
    let data = match json_body(request) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.db_service.create(data).await {
        Ok(row) => success(StatusCode::CREATED, &row),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/lookups/{uuid}",
    params(
        ("uuid" = String, Path, description = "Primary key of the lookup type")
    ),
    responses(
        (status = 200, description = "Lookup type", body = ApiResponse),
        (status = 400, description = "Malformed primary key", body = ApiResponse),
        (status = 404, description = "No lookup type at this key", body = ApiResponse)
    )
)]
pub async fn get_lookup_handler(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Response {
    let key = match parse_key(&uuid) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    match state.db_service.find_one(key).await {
        Ok(row) => success(StatusCode::OK, &row),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/lookups/{uuid}",
    params(
        ("uuid" = String, Path, description = "Primary key of the lookup type")
    ),
    request_body = UpdateLookup,
    responses(
        (status = 200, description = "Updated (or unchanged) lookup type", body = ApiResponse),
        (status = 400, description = "Invalid lookup_type or malformed key", body = ApiResponse),
        (status = 404, description = "No lookup type at this key", body = ApiResponse),
        (status = 409, description = "lookup_type or meaning already in use", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn update_lookup_handler(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    request: Result<Json<UpdateLookup>, JsonRejection>,
) -> Response {
    let key = match parse_key(&uuid) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let changes = match json_body(request) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.db_service.update(key, changes).await {
        Ok(row) => success(StatusCode::OK, &row),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/lookups/{uuid}",
    params(
        ("uuid" = String, Path, description = "Primary key of the lookup type")
    ),
    responses(
        (status = 204, description = "Lookup type and its values table removed"),
        (status = 400, description = "Malformed primary key", body = ApiResponse),
        (status = 404, description = "No lookup type at this key", body = ApiResponse)
    )
)]
pub async fn delete_lookup_handler(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Response {
    let key = match parse_key(&uuid) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    match state.db_service.delete(key).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
