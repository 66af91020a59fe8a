// ABOUTME: Storage for the analysis handoff between requirements intake and scenario derivation
// ABOUTME: A single keyed JSON payload that is written on analysis and consumed once

use chrono::Utc;
use reqflow_core::{AnalysisHandoff, HANDOFF_KEY};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::{StorageError, StorageResult};

#[derive(Clone)]
pub struct HandoffStorage {
    pool: SqlitePool,
}

impl HandoffStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store the handoff, replacing any previous one
    pub async fn store(&self, handoff: &AnalysisHandoff) -> StorageResult<()> {
        let payload = serde_json::to_string(handoff)?;

        sqlx::query(
            r#"
            INSERT INTO analysis_handoffs (key, payload, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                created_at = excluded.created_at
            "#,
        )
        .bind(HANDOFF_KEY)
        .bind(&payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        debug!("Stored analysis handoff ({} bytes)", payload.len());
        Ok(())
    }

    /// Read the handoff without consuming it
    pub async fn get(&self) -> StorageResult<Option<AnalysisHandoff>> {
        let row = sqlx::query("SELECT payload FROM analysis_handoffs WHERE key = ?")
            .bind(HANDOFF_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(row) => {
                let payload: String = row.try_get("payload").map_err(StorageError::Sqlx)?;
                Ok(Some(serde_json::from_str(&payload)?))
            }
            None => Ok(None),
        }
    }

    /// Read and remove the handoff in one transaction
    pub async fn take(&self) -> StorageResult<Option<AnalysisHandoff>> {
        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let row = sqlx::query("SELECT payload FROM analysis_handoffs WHERE key = ?")
            .bind(HANDOFF_KEY)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = row.try_get("payload").map_err(StorageError::Sqlx)?;
        let handoff: AnalysisHandoff = serde_json::from_str(&payload)?;

        sqlx::query("DELETE FROM analysis_handoffs WHERE key = ?")
            .bind(HANDOFF_KEY)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        tx.commit().await.map_err(StorageError::Sqlx)?;
        Ok(Some(handoff))
    }

    pub async fn clear(&self) -> StorageResult<()> {
        sqlx::query("DELETE FROM analysis_handoffs WHERE key = ?")
            .bind(HANDOFF_KEY)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;
        Ok(())
    }
}
