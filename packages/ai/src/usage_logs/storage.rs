// ABOUTME: AI usage log storage layer using SQLite
// ABOUTME: Records one row per model call and aggregates them into usage statistics

use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{AiUsageLog, AiUsageQuery, AiUsageStats, ModelStats, OperationStats};
use reqflow_storage::StorageError;

#[derive(Clone)]
pub struct AiUsageLogStorage {
    pool: SqlitePool,
}

/// WHERE clause and its bind values, in placeholder order
fn build_filters(query: &AiUsageQuery) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    if let Some(start_date) = &query.start_date {
        conditions.push("created_at >= ?");
        values.push(start_date.to_rfc3339());
    }
    if let Some(end_date) = &query.end_date {
        conditions.push("created_at <= ?");
        values.push(end_date.to_rfc3339());
    }
    if let Some(operation) = &query.operation {
        conditions.push("operation = ?");
        values.push(operation.clone());
    }
    if let Some(model) = &query.model {
        conditions.push("model = ?");
        values.push(model.clone());
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, values)
}

impl AiUsageLogStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new AI usage log entry
    pub async fn create_log(&self, log: &AiUsageLog) -> Result<AiUsageLog, StorageError> {
        sqlx::query(
            r#"
            INSERT INTO ai_usage_logs (
                id, operation, model, provider, input_tokens, output_tokens,
                total_tokens, duration_ms, error, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.id)
        .bind(&log.operation)
        .bind(&log.model)
        .bind(&log.provider)
        .bind(log.input_tokens)
        .bind(log.output_tokens)
        .bind(log.total_tokens)
        .bind(log.duration_ms)
        .bind(&log.error)
        .bind(log.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(log.clone())
    }

    /// List AI usage logs with optional filtering, newest first
    pub async fn list_logs(&self, query: &AiUsageQuery) -> Result<Vec<AiUsageLog>, StorageError> {
        let (where_clause, values) = build_filters(query);
        let sql = format!(
            "SELECT * FROM ai_usage_logs {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );

        debug!("Fetching AI usage logs with query: {}", sql);

        let mut db_query = sqlx::query(&sql);
        for value in &values {
            db_query = db_query.bind(value);
        }
        db_query = db_query
            .bind(query.limit.unwrap_or(100))
            .bind(query.offset.unwrap_or(0));

        let rows = db_query
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_log).collect()
    }

    /// Get aggregate statistics for AI usage
    pub async fn get_stats(&self, query: &AiUsageQuery) -> Result<AiUsageStats, StorageError> {
        let (where_clause, values) = build_filters(query);

        let overall_sql = format!(
            r#"
            SELECT
                COUNT(*) as total_requests,
                COALESCE(SUM(CASE WHEN error IS NULL THEN 1 ELSE 0 END), 0) as successful_requests,
                COALESCE(SUM(CASE WHEN error IS NOT NULL THEN 1 ELSE 0 END), 0) as failed_requests,
                COALESCE(SUM(input_tokens), 0) as total_input_tokens,
                COALESCE(SUM(output_tokens), 0) as total_output_tokens,
                COALESCE(SUM(total_tokens), 0) as total_tokens,
                COALESCE(AVG(duration_ms), 0.0) as average_duration_ms
            FROM ai_usage_logs
            {}
            "#,
            where_clause
        );

        debug!("Fetching overall stats with query: {}", overall_sql);

        let mut overall_query = sqlx::query(&overall_sql);
        for value in &values {
            overall_query = overall_query.bind(value);
        }

        let row = overall_query
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let by_operation = self.get_operation_stats(&where_clause, &values).await?;
        let by_model = self.get_model_stats(&where_clause, &values).await?;

        Ok(AiUsageStats {
            total_requests: row.try_get("total_requests").unwrap_or(0),
            successful_requests: row.try_get("successful_requests").unwrap_or(0),
            failed_requests: row.try_get("failed_requests").unwrap_or(0),
            total_input_tokens: row.try_get("total_input_tokens").unwrap_or(0),
            total_output_tokens: row.try_get("total_output_tokens").unwrap_or(0),
            total_tokens: row.try_get("total_tokens").unwrap_or(0),
            average_duration_ms: row.try_get("average_duration_ms").unwrap_or(0.0),
            by_operation,
            by_model,
        })
    }

    /// Get statistics grouped by operation
    async fn get_operation_stats(
        &self,
        where_clause: &str,
        values: &[String],
    ) -> Result<Vec<OperationStats>, StorageError> {
        let sql = format!(
            r#"
            SELECT
                operation,
                COUNT(*) as count,
                COALESCE(SUM(CASE WHEN error IS NOT NULL THEN 1 ELSE 0 END), 0) as failed,
                COALESCE(SUM(total_tokens), 0) as total_tokens
            FROM ai_usage_logs
            {}
            GROUP BY operation
            ORDER BY count DESC, operation ASC
            "#,
            where_clause
        );

        let mut db_query = sqlx::query(&sql);
        for value in values {
            db_query = db_query.bind(value);
        }

        let rows = db_query
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(rows
            .iter()
            .map(|row| OperationStats {
                operation: row.try_get("operation").unwrap_or_default(),
                count: row.try_get("count").unwrap_or(0),
                failed: row.try_get("failed").unwrap_or(0),
                total_tokens: row.try_get("total_tokens").unwrap_or(0),
            })
            .collect())
    }

    /// Get statistics grouped by model
    async fn get_model_stats(
        &self,
        where_clause: &str,
        values: &[String],
    ) -> Result<Vec<ModelStats>, StorageError> {
        let sql = format!(
            r#"
            SELECT
                model,
                COUNT(*) as count,
                COALESCE(SUM(total_tokens), 0) as total_tokens
            FROM ai_usage_logs
            {}
            GROUP BY model
            ORDER BY total_tokens DESC
            "#,
            where_clause
        );

        let mut db_query = sqlx::query(&sql);
        for value in values {
            db_query = db_query.bind(value);
        }

        let rows = db_query
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(rows
            .iter()
            .map(|row| ModelStats {
                model: row.try_get("model").unwrap_or_default(),
                count: row.try_get("count").unwrap_or(0),
                total_tokens: row.try_get("total_tokens").unwrap_or(0),
            })
            .collect())
    }
}

/// Convert a database row to an AiUsageLog
fn row_to_log(row: &sqlx::sqlite::SqliteRow) -> Result<AiUsageLog, StorageError> {
    let created_at_str: String = row.try_get("created_at").map_err(StorageError::Sqlx)?;
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| {
            StorageError::Database(format!("Failed to parse created_at timestamp: {}", e))
        })?
        .with_timezone(&chrono::Utc);

    Ok(AiUsageLog {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        operation: row.try_get("operation").map_err(StorageError::Sqlx)?,
        model: row.try_get("model").map_err(StorageError::Sqlx)?,
        provider: row.try_get("provider").map_err(StorageError::Sqlx)?,
        input_tokens: row.try_get("input_tokens").map_err(StorageError::Sqlx)?,
        output_tokens: row.try_get("output_tokens").map_err(StorageError::Sqlx)?,
        total_tokens: row.try_get("total_tokens").map_err(StorageError::Sqlx)?,
        duration_ms: row.try_get("duration_ms").map_err(StorageError::Sqlx)?,
        error: row.try_get("error").map_err(StorageError::Sqlx)?,
        created_at,
    })
}
