use lookup_service::infra::telemetry::init_tracing;
use lookup_service::{AppConfig, DatabaseService};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--no-bootstrap]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL\n\
         Optional:\n\
           LOOKUP_TABLE, LOOKUP_PRIMARY_KEY, LOOKUP_ALLOW_CALLER_KEY, DB_MAX_CONNECTIONS\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let bootstrap = !args.iter().any(|a| a == "--no-bootstrap");

    let config = AppConfig::from_env()?;

    println!("> Preflight:");
    println!("  LOOKUP_TABLE={}", config.lookup.table);
    println!("  LOOKUP_PRIMARY_KEY={}", config.lookup.primary_key);
    println!("  LOOKUP_ALLOW_CALLER_KEY={}", config.lookup.allow_caller_primary_key);

    let db = if bootstrap {
        DatabaseService::connect(&config).await?
    } else {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        DatabaseService::from_pool(pool, lookup_service::LookupService::new(config.lookup.clone())?)
    };

    db.ping().await?;
    println!("  Database: reachable");

    let rows = db.find().await?;
    println!("  Lookup types: {}", rows.len());

    let missing = db.missing_values_tables().await?;
    if missing.is_empty() {
        println!("  Values tables: all present");
        return Ok(());
    }

    for row in &missing {
        println!(
            "  MISSING: {}_lookup_values (uuid={}, meaning={})",
            row.lookup_type, row.uuid, row.meaning
        );
    }
    Err(anyhow::anyhow!(
        "{} lookup type(s) have no values table",
        missing.len()
    ))
}
