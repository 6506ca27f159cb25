use std::env;

use crate::error::AppError;

/// Database profile for different environments
#[derive(Debug, Clone, PartialEq)]
pub enum DbProfile {
    /// Production PostgreSQL database
    Prod,
    /// Test PostgreSQL database - enforces the `_test` naming rule
    Test,
    /// Private SQLite in-memory database (one pooled connection)
    InMemory,
    /// SQLite database file, created when missing
    SqliteFile { file: String },
}

impl DbProfile {
    pub fn is_sqlite(&self) -> bool {
        matches!(self, DbProfile::InMemory | DbProfile::SqliteFile { .. })
    }
}

/// Builds a database URL for the profile.
///
/// PostgreSQL profiles honour `DATABASE_URL` when set and otherwise assemble
/// the URL from `POSTGRES_*` variables.
pub fn db_url(profile: &DbProfile) -> Result<String, AppError> {
    match profile {
        DbProfile::InMemory => Ok("sqlite::memory:".to_string()),
        DbProfile::SqliteFile { file } => Ok(format!("sqlite://{file}?mode=rwc")),
        DbProfile::Prod | DbProfile::Test => {
            if let Ok(url) = env::var("DATABASE_URL") {
                if *profile == DbProfile::Test && !url.trim_end_matches('/').ends_with("_test") {
                    return Err(AppError::config(
                        "Test profile requires DATABASE_URL to name a database ending with '_test'",
                    ));
                }
                return Ok(url);
            }
            let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
            let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
            let db_name = db_name(profile)?;
            let username = must_var("POSTGRES_USER")?;
            let password = must_var("POSTGRES_PASSWORD")?;
            Ok(format!(
                "postgresql://{username}:{password}@{host}:{port}/{db_name}"
            ))
        }
    }
}

fn db_name(profile: &DbProfile) -> Result<String, AppError> {
    match profile {
        DbProfile::Test => {
            let db_name = must_var("TEST_DB")?;
            if !db_name.ends_with("_test") {
                return Err(AppError::config(format!(
                    "Test profile requires database name to end with '_test', but got: '{db_name}'"
                )));
            }
            Ok(db_name)
        }
        _ => must_var("PROD_DB"),
    }
}

/// Get required environment variable or return error
fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}
