// ABOUTME: Storage for project details confirmed before requirements analysis
// ABOUTME: Keeps a history of confirmations; the latest one is the current project

use chrono::{DateTime, Utc};
use reqflow_core::ProjectDetails;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use crate::{parse_timestamp, StorageError, StorageResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProjectDetails {
    pub id: String,
    #[serde(flatten)]
    pub details: ProjectDetails,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ProjectDetailsStorage {
    pool: SqlitePool,
}

impl ProjectDetailsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, details: &ProjectDetails) -> StorageResult<StoredProjectDetails> {
        let stored = StoredProjectDetails {
            id: format!("pd-{}", nanoid::nanoid!(10)),
            details: details.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO project_details (id, app_name, objective, features, tech_stack, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&stored.id)
        .bind(&details.app_name)
        .bind(&details.objective)
        .bind(serde_json::to_string(&details.features)?)
        .bind(serde_json::to_string(&details.tech_stack)?)
        .bind(stored.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(stored)
    }

    /// Most recently confirmed details, if any
    pub async fn latest(&self) -> StorageResult<Option<StoredProjectDetails>> {
        let row = sqlx::query(
            "SELECT * FROM project_details ORDER BY created_at DESC, rowid DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_details).transpose()
    }

    pub async fn list(&self, limit: i64) -> StorageResult<Vec<StoredProjectDetails>> {
        let rows = sqlx::query(
            "SELECT * FROM project_details ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_details).collect()
    }
}

fn row_to_details(row: &sqlx::sqlite::SqliteRow) -> StorageResult<StoredProjectDetails> {
    let features: String = row.try_get("features").map_err(StorageError::Sqlx)?;
    let tech_stack: String = row.try_get("tech_stack").map_err(StorageError::Sqlx)?;
    let created_at: String = row.try_get("created_at").map_err(StorageError::Sqlx)?;

    Ok(StoredProjectDetails {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        details: ProjectDetails {
            app_name: row.try_get("app_name").map_err(StorageError::Sqlx)?,
            objective: row.try_get("objective").map_err(StorageError::Sqlx)?,
            features: serde_json::from_str(&features)?,
            tech_stack: serde_json::from_str(&tech_stack)?,
        },
        created_at: parse_timestamp(&created_at)?,
    })
}
