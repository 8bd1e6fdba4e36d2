//! Prediction record type and repository.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// One persisted prediction outcome.
///
/// Created exactly once per successful prediction, never mutated or
/// deleted. `created_at` serializes as an ISO-8601 timestamp.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EmotionRecord {
    pub id: i32,
    pub emotion: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// Repository for prediction records.
pub struct EmotionRecords;

impl EmotionRecords {
    /// Insert a new record and return it with the generated id and timestamp.
    pub async fn insert(
        pool: &PgPool,
        emotion: &str,
        confidence: f64,
    ) -> Result<EmotionRecord, sqlx::Error> {
        sqlx::query_as::<_, EmotionRecord>(
            r#"
            INSERT INTO emotion_records (emotion, confidence)
            VALUES ($1, $2)
            RETURNING id, emotion, confidence, created_at
            "#,
        )
        .bind(emotion)
        .bind(confidence)
        .fetch_one(pool)
        .await
    }

    /// The most recent records, newest first. `id` breaks timestamp ties
    /// so the ordering is deterministic.
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<EmotionRecord>, sqlx::Error> {
        sqlx::query_as::<_, EmotionRecord>(
            r#"
            SELECT id, emotion, confidence, created_at
            FROM emotion_records
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
