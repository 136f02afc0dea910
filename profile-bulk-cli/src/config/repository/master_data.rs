//! Enumeration master data (`master_data`)

use std::path::Path;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::bulk::cache::MasterDataSource;

/// Every value stored for a category, sorted
pub async fn values_for(pool: &SqlitePool, context_type: &str) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT context_name FROM master_data WHERE context_type = ? ORDER BY context_name",
    )
    .bind(context_type)
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to get master data for '{}'", context_type))?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Add values to a category; returns how many were new
pub async fn insert_values(
    pool: &SqlitePool,
    context_type: &str,
    values: &[String],
) -> Result<u64> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let mut inserted = 0;
    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let result = sqlx::query(
            "INSERT OR IGNORE INTO master_data (context_type, context_name) VALUES (?, ?)",
        )
        .bind(context_type)
        .bind(value)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to insert master data value '{}'", value))?;
        inserted += result.rows_affected();
    }

    tx.commit().await.context("Failed to commit transaction")?;
    Ok(inserted)
}

/// Header names accepted for the category and value columns
const TYPE_HEADERS: &[&str] = &["context_type", "contexttype"];
const NAME_HEADERS: &[&str] = &["context_name", "contextname"];

fn header_index(headers: &csv::StringRecord, accepted: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| accepted.contains(&h.trim().to_ascii_lowercase().as_str()))
}

/// Load `context_type,context_name` rows from a CSV file.
/// Returns the number of new values.
pub async fn import_csv(pool: &SqlitePool, path: &Path) -> Result<u64> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let (Some(type_idx), Some(name_idx)) = (
        header_index(&headers, TYPE_HEADERS),
        header_index(&headers, NAME_HEADERS),
    ) else {
        bail!(
            "CSV file {} must have context_type and context_name columns",
            path.display()
        );
    };

    let mut by_type: Vec<(String, Vec<String>)> = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Invalid CSV record at line {}", line + 2))?;
        let context_type = record.get(type_idx).unwrap_or("").trim();
        let context_name = record.get(name_idx).unwrap_or("").trim();
        if context_type.is_empty() || context_name.is_empty() {
            continue;
        }
        match by_type.iter_mut().find(|(t, _)| t == context_type) {
            Some((_, values)) => values.push(context_name.to_string()),
            None => by_type.push((context_type.to_string(), vec![context_name.to_string()])),
        }
    }

    let mut inserted = 0;
    for (context_type, values) in &by_type {
        inserted += insert_values(pool, context_type, values).await?;
    }
    log::info!(
        "Imported {} new master data value(s) across {} categories from {}",
        inserted,
        by_type.len(),
        path.display()
    );
    Ok(inserted)
}

/// [`MasterDataSource`] over the `master_data` table
#[derive(Clone)]
pub struct SqliteMasterData {
    pool: SqlitePool,
}

impl SqliteMasterData {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MasterDataSource for SqliteMasterData {
    async fn values_for(&self, category: &str) -> Result<Vec<String>> {
        values_for(&self.pool, category).await
    }
}
