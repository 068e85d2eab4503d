//! HTTP round trip: start the router in-process on an ephemeral port and drive
//! the lookup endpoints with reqwest. Needs `DATABASE_URL`; passes with a note otherwise.

use lookup_service::{transport, DatabaseService, LookupConfig, LookupService};
use serde_json::{json, Value as JsonValue};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lookup_endpoints() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let Ok(url) = env::var("DATABASE_URL") else {
        println!("DATABASE_URL not set; skipping");
        return Ok(());
    };

    let suffix = Uuid::new_v4().simple().to_string()[..12].to_string();
    let registry = format!("_lookups_{}", suffix);
    let status = format!("status_{}", suffix);
    let state = format!("state_{}", suffix);

    let pool = PgPoolOptions::new().max_connections(4).connect(&url).await?;
    let lookups = LookupService::new(LookupConfig {
        table: registry.clone(),
        ..LookupConfig::default()
    })?;
    let db = DatabaseService::from_pool(pool.clone(), lookups);
    db.ensure_registry().await?;

    let router = transport::http::create_router(transport::http::AppState {
        db_service: Arc::new(db),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let base_url = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();

    let health = client.get(format!("{}/health", base_url)).send().await?;
    assert_eq!(health.status(), 200);

    // --- create ---
    let resp = client
        .post(format!("{}/api/lookups", base_url))
        .json(&json!({ "lookup_type": status, "meaning": "Status Codes", "description": "order states" }))
        .send()
        .await?;
    assert_eq!(resp.status(), 201);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["lookup_type"], json!(status));
    let key = body["data"]["uuid"].as_str().unwrap().to_string();

    let resp = client
        .post(format!("{}/api/lookups", base_url))
        .json(&json!({ "lookup_type": status, "meaning": "Other" }))
        .send()
        .await?;
    assert_eq!(resp.status(), 409);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["code"], "CONFLICT");

    let resp = client
        .post(format!("{}/api/lookups", base_url))
        .json(&json!({ "lookup_type": "Bad Name", "meaning": "Bad" }))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(format!("{}/api/lookups", base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(resp.status(), 422);

    // --- read ---
    let resp = client.get(format!("{}/api/lookups", base_url)).send().await?;
    assert_eq!(resp.status(), 200);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(1));

    let resp = client
        .get(format!("{}/api/lookups/{}", base_url, key))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["data"]["meaning"], "Status Codes");

    let resp = client
        .get(format!("{}/api/lookups/not-a-uuid", base_url))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    // --- update ---
    let resp = client
        .patch(format!("{}/api/lookups/{}", base_url, key))
        .json(&json!({ "lookup_type": state, "description": null }))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["data"]["lookup_type"], json!(state));
    assert_eq!(body["data"]["description"], JsonValue::Null);

    let renamed: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
        .bind(format!("{}_lookup_values", state))
        .fetch_one(&pool)
        .await?;
    assert!(renamed);

    // --- delete ---
    let resp = client
        .delete(format!("{}/api/lookups/{}", base_url, key))
        .send()
        .await?;
    assert_eq!(resp.status(), 204);
    assert!(resp.bytes().await?.is_empty());

    let resp = client
        .get(format!("{}/api/lookups/{}", base_url, key))
        .send()
        .await?;
    assert_eq!(resp.status(), 404);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["code"], "NOT_FOUND");

    let dropped: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NULL")
        .bind(format!("{}_lookup_values", state))
        .fetch_one(&pool)
        .await?;
    assert!(dropped);

    server_handle.abort();
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", registry))
        .execute(&pool)
        .await?;
    Ok(())
}
