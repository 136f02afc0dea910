//! Schema creation for the record stores

use anyhow::{Context, Result};
use sqlx::SqlitePool;

const SCHEMA: &[(&str, &str)] = &[
    (
        "wf_status",
        r#"
        CREATE TABLE IF NOT EXISTS wf_status (
            wf_id TEXT PRIMARY KEY NOT NULL,
            application_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            root_org TEXT NOT NULL,
            dept_name TEXT NOT NULL DEFAULT '',
            current_status TEXT NOT NULL,
            in_workflow INTEGER NOT NULL,
            service_name TEXT NOT NULL,
            actor_uuid TEXT NOT NULL DEFAULT '',
            comment TEXT NOT NULL DEFAULT '',
            update_field_values TEXT NOT NULL,
            created_on TEXT NOT NULL,
            last_updated_on TEXT NOT NULL
        )
        "#,
    ),
    (
        "wf_status index",
        "CREATE INDEX IF NOT EXISTS idx_wf_status_user ON wf_status (user_id, in_workflow)",
    ),
    (
        "user_bulk_upload",
        r#"
        CREATE TABLE IF NOT EXISTS user_bulk_upload (
            root_org_id TEXT NOT NULL,
            identifier TEXT NOT NULL,
            status TEXT,
            total_records INTEGER NOT NULL DEFAULT 0,
            successful_records INTEGER NOT NULL DEFAULT 0,
            failed_records INTEGER NOT NULL DEFAULT 0,
            date_updated_on TEXT NOT NULL,
            PRIMARY KEY (root_org_id, identifier)
        )
        "#,
    ),
    (
        "master_data",
        r#"
        CREATE TABLE IF NOT EXISTS master_data (
            context_type TEXT NOT NULL,
            context_name TEXT NOT NULL,
            PRIMARY KEY (context_type, context_name)
        )
        "#,
    ),
];

/// Create every table and index that does not exist yet
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    for (name, statement) in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to create {}", name))?;
    }
    log::debug!("Database schema ready");
    Ok(())
}
