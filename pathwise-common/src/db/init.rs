//! Database initialization

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open the database, creating file and schema on first run.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL keeps concurrent request handlers from serializing on reads
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    // Idempotent, safe to run on every startup
    create_students_table(&pool).await?;
    create_predictions_table(&pool).await?;

    Ok(pool)
}

/// Create the students table
///
/// One row per submitted inference input: identity, the five subject
/// scores, and the interest after vocabulary fallback.
pub async fn create_students_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            english REAL NOT NULL,
            math REAL NOT NULL,
            science REAL NOT NULL,
            history REAL NOT NULL,
            geography REAL NOT NULL,
            interest TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the predictions table
///
/// One row per students row, linked by guid. Confidence is NULL when the
/// model cannot estimate one, never 0.
pub async fn create_predictions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS predictions (
            guid TEXT PRIMARY KEY,
            student_id TEXT NOT NULL REFERENCES students(guid) ON DELETE CASCADE,
            career TEXT NOT NULL,
            confidence REAL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (confidence IS NULL OR (confidence >= 0.0 AND confidence <= 100.0))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_predictions_student ON predictions(student_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_predictions_created ON predictions(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}
