use crate::domain::lookup::{CreateLookup, LookupRow, UpdateLookup};
use crate::transport::http::handlers::{health, lookups};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        lookups::list_lookups_handler,
        lookups::create_lookup_handler,
        lookups::get_lookup_handler,
        lookups::update_lookup_handler,
        lookups::delete_lookup_handler
    ),
    components(schemas(ApiResponse, LookupRow, CreateLookup, UpdateLookup))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/api/lookups",
            get(lookups::list_lookups_handler).post(lookups::create_lookup_handler),
        )
        .route(
            "/api/lookups/:uuid",
            get(lookups::get_lookup_handler)
                .patch(lookups::update_lookup_handler)
                .delete(lookups::delete_lookup_handler),
        )
        .with_state(app_state)
}
