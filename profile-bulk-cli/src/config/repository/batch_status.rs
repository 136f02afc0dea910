//! Batch status repository (`user_bulk_upload`)

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::bulk::store::{BatchStatusRecord, BatchStatusStore, BatchStatusUpdate};
use crate::bulk::types::BatchStatus;

/// Upsert the fields present in `update`; the rest keep their stored values.
/// The update timestamp is always refreshed.
pub async fn update_status(
    pool: &SqlitePool,
    organization_id: &str,
    batch_id: &str,
    update: &BatchStatusUpdate,
) -> Result<()> {
    let status = update.status.map(|s| s.as_str());
    let total = update.total.map(i64::from);
    let successful = update.successful.map(i64::from);
    let failed = update.failed.map(i64::from);

    sqlx::query(
        r#"
        INSERT INTO user_bulk_upload (root_org_id, identifier, status, total_records,
                                      successful_records, failed_records, date_updated_on)
        VALUES (?, ?, ?, COALESCE(?, 0), COALESCE(?, 0), COALESCE(?, 0), ?)
        ON CONFLICT(root_org_id, identifier) DO UPDATE SET
            status = COALESCE(?, user_bulk_upload.status),
            total_records = COALESCE(?, user_bulk_upload.total_records),
            successful_records = COALESCE(?, user_bulk_upload.successful_records),
            failed_records = COALESCE(?, user_bulk_upload.failed_records),
            date_updated_on = excluded.date_updated_on
        "#,
    )
    .bind(organization_id)
    .bind(batch_id)
    .bind(status)
    .bind(total)
    .bind(successful)
    .bind(failed)
    .bind(Utc::now())
    .bind(status)
    .bind(total)
    .bind(successful)
    .bind(failed)
    .execute(pool)
    .await
    .with_context(|| {
        format!(
            "Failed to update status of batch {} for organisation {}",
            batch_id, organization_id
        )
    })?;

    Ok(())
}

pub async fn get_status(
    pool: &SqlitePool,
    organization_id: &str,
    batch_id: &str,
) -> Result<Option<BatchStatusRecord>> {
    let row = sqlx::query(
        "SELECT root_org_id, identifier, status, total_records, successful_records,
                failed_records, date_updated_on
         FROM user_bulk_upload WHERE root_org_id = ? AND identifier = ?",
    )
    .bind(organization_id)
    .bind(batch_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get batch status")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let status = match row.try_get::<Option<String>, _>("status")? {
        Some(s) => Some(
            BatchStatus::parse(&s).ok_or_else(|| anyhow!("Unknown batch status '{}'", s))?,
        ),
        None => None,
    };

    Ok(Some(BatchStatusRecord {
        organization_id: row.try_get("root_org_id")?,
        batch_id: row.try_get("identifier")?,
        status,
        total: row.try_get::<i64, _>("total_records")? as u32,
        successful: row.try_get::<i64, _>("successful_records")? as u32,
        failed: row.try_get::<i64, _>("failed_records")? as u32,
        updated_on: row.try_get::<DateTime<Utc>, _>("date_updated_on")?,
    }))
}

/// [`BatchStatusStore`] over the `user_bulk_upload` table
#[derive(Clone)]
pub struct SqliteBatchStatusStore {
    pool: SqlitePool,
}

impl SqliteBatchStatusStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BatchStatusStore for SqliteBatchStatusStore {
    async fn update_status(
        &self,
        organization_id: &str,
        batch_id: &str,
        update: &BatchStatusUpdate,
    ) -> Result<()> {
        update_status(&self.pool, organization_id, batch_id, update).await
    }

    async fn get_status(
        &self,
        organization_id: &str,
        batch_id: &str,
    ) -> Result<Option<BatchStatusRecord>> {
        get_status(&self.pool, organization_id, batch_id).await
    }
}
