use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::{db_url, DbProfile};
use crate::error::AppError;

fn db_engine(profile: &DbProfile) -> &'static str {
    if profile.is_sqlite() {
        "sqlite"
    } else {
        "postgresql"
    }
}

/// Open a pooled connection for the profile without touching the schema.
pub async fn connect_db(profile: &DbProfile) -> Result<DatabaseConnection, AppError> {
    let url = db_url(profile)?;
    let mut opts = ConnectOptions::new(url);
    opts.connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    match profile {
        // Each in-memory connection is its own database, so the pool must stay at one.
        DbProfile::InMemory => {
            opts.max_connections(1).min_connections(1);
        }
        DbProfile::SqliteFile { .. } => {
            opts.max_connections(4);
        }
        DbProfile::Prod | DbProfile::Test => {
            opts.max_connections(16).min_connections(1);
        }
    }

    let conn = Database::connect(opts).await.map_err(|e| {
        warn!(engine = db_engine(profile), error = %e, "database connect failed");
        AppError::db_unavailable(format!("database connect failed: {e}"))
    })?;
    info!(engine = db_engine(profile), "database connected");
    Ok(conn)
}

/// Connect and bring the schema up to date.
pub async fn bootstrap_db(profile: &DbProfile) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(profile).await?;
    migrate(&conn, MigrationCommand::Up)
        .await
        .map_err(|e| AppError::config(format!("migrations failed: {e}")))?;
    Ok(conn)
}
