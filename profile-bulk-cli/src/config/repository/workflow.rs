//! Workflow request repository (`wf_status`)

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::bulk::store::WorkflowStore;
use crate::bulk::types::{FieldChange, WorkflowRequest, WorkflowState};

const COLUMNS: &str = "wf_id, application_id, user_id, root_org, dept_name, current_status, \
    in_workflow, service_name, actor_uuid, comment, update_field_values, created_on, last_updated_on";

fn request_from_row(row: &SqliteRow) -> Result<WorkflowRequest> {
    let wf_id: String = row.try_get("wf_id")?;
    let state: String = row.try_get("current_status")?;
    let state = WorkflowState::parse(&state)
        .ok_or_else(|| anyhow!("Workflow request {} has unknown state '{}'", wf_id, state))?;
    let changes: String = row.try_get("update_field_values")?;
    let field_changes: Vec<FieldChange> = serde_json::from_str(&changes)
        .with_context(|| format!("Failed to parse field changes of workflow request {}", wf_id))?;

    Ok(WorkflowRequest {
        application_id: row.try_get("application_id")?,
        user_id: row.try_get("user_id")?,
        root_org: row.try_get("root_org")?,
        dept_name: row.try_get("dept_name")?,
        state,
        in_workflow: row.try_get("in_workflow")?,
        service_name: row.try_get("service_name")?,
        actor_user_id: row.try_get("actor_uuid")?,
        comment: row.try_get("comment")?,
        field_changes,
        created_on: row.try_get::<DateTime<Utc>, _>("created_on")?,
        last_updated_on: row.try_get::<DateTime<Utc>, _>("last_updated_on")?,
        wf_id,
    })
}

/// Requests for a user still awaiting approval, in insertion order
pub async fn find_pending(pool: &SqlitePool, user_id: &str) -> Result<Vec<WorkflowRequest>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM wf_status WHERE user_id = ? AND in_workflow = 1 ORDER BY rowid",
        COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to get pending workflow requests")?;

    rows.iter().map(request_from_row).collect()
}

pub async fn find_by_id(pool: &SqlitePool, wf_id: &str) -> Result<Option<WorkflowRequest>> {
    let row = sqlx::query(&format!("SELECT {} FROM wf_status WHERE wf_id = ?", COLUMNS))
        .bind(wf_id)
        .fetch_optional(pool)
        .await
        .context("Failed to get workflow request")?;

    row.as_ref().map(request_from_row).transpose()
}

/// Insert a request, or replace the stored one with the same `wf_id`
pub async fn upsert(pool: &SqlitePool, request: &WorkflowRequest) -> Result<()> {
    let changes = serde_json::to_string(&request.field_changes)
        .context("Failed to serialize field changes")?;

    sqlx::query(
        r#"
        INSERT INTO wf_status (wf_id, application_id, user_id, root_org, dept_name, current_status,
                               in_workflow, service_name, actor_uuid, comment, update_field_values,
                               created_on, last_updated_on)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(wf_id) DO UPDATE SET
            application_id = excluded.application_id,
            user_id = excluded.user_id,
            root_org = excluded.root_org,
            dept_name = excluded.dept_name,
            current_status = excluded.current_status,
            in_workflow = excluded.in_workflow,
            service_name = excluded.service_name,
            actor_uuid = excluded.actor_uuid,
            comment = excluded.comment,
            update_field_values = excluded.update_field_values,
            last_updated_on = excluded.last_updated_on
        "#,
    )
    .bind(&request.wf_id)
    .bind(&request.application_id)
    .bind(&request.user_id)
    .bind(&request.root_org)
    .bind(&request.dept_name)
    .bind(request.state.as_str())
    .bind(request.in_workflow)
    .bind(&request.service_name)
    .bind(&request.actor_user_id)
    .bind(&request.comment)
    .bind(changes)
    .bind(request.created_on)
    .bind(request.last_updated_on)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to save workflow request {}", request.wf_id))?;

    Ok(())
}

/// [`WorkflowStore`] over the `wf_status` table
#[derive(Clone)]
pub struct SqliteWorkflowStore {
    pool: SqlitePool,
}

impl SqliteWorkflowStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowStore for SqliteWorkflowStore {
    async fn find_pending(&self, user_id: &str) -> Result<Vec<WorkflowRequest>> {
        find_pending(&self.pool, user_id).await
    }

    async fn find_by_id(&self, wf_id: &str) -> Result<Option<WorkflowRequest>> {
        find_by_id(&self.pool, wf_id).await
    }

    async fn upsert(&self, request: &WorkflowRequest) -> Result<()> {
        upsert(&self.pool, request).await
    }
}
