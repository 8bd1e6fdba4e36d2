//! emotion-store — PostgreSQL persistence for prediction records.
//!
//! One append-only table; the schema is created at startup if absent.

pub mod record;

pub use record::{EmotionRecord, EmotionRecords};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const MAX_CONNECTIONS: u32 = 5;

/// Create a connection pool to the PostgreSQL database.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
}

/// Create the `emotion_records` table and its history index if absent.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS emotion_records (
            id          SERIAL PRIMARY KEY,
            emotion     TEXT NOT NULL,
            confidence  DOUBLE PRECISION NOT NULL
                        CHECK (confidence >= 0.0 AND confidence <= 1.0),
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS emotion_records_created_at_idx \
         ON emotion_records (created_at DESC)",
    )
    .execute(pool)
    .await?;

    tracing::info!("emotion_records schema ready");
    Ok(())
}
