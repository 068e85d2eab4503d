// src/bin/api_server.rs

use lookup_service::infra::telemetry::init_tracing;
use lookup_service::transport;
use lookup_service::{AppConfig, DatabaseService};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;

    // --- Service Initialization ---
    info!(
        table = %config.lookup.table,
        primary_key = %config.lookup.primary_key,
        "initializing DatabaseService"
    );
    let db_service = DatabaseService::connect(&config).await?;

    // Report registry rows whose values table has gone missing (helps debug manual schema edits).
    match db_service.missing_values_tables().await {
        Ok(missing) if missing.is_empty() => info!("all lookup values tables present"),
        Ok(missing) => {
            for row in missing {
                error!(uuid = %row.uuid, lookup_type = %row.lookup_type, "lookup values table missing");
            }
        }
        Err(e) => error!(error = %e, "could not audit lookup values tables"),
    }

    let app_state = transport::http::AppState {
        db_service: Arc::new(db_service),
    };

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "API server listening");
    info!("Swagger UI available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("graceful shutdown complete");
    Ok(())
}
