pub mod app;
pub mod domain;
pub mod error;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::database_service::DatabaseService;
pub use domain::{CreateLookup, LookupConfig, LookupRow, LookupService, UpdateLookup};
pub use error::{Result, ServiceError};
pub use infra::config::AppConfig;
