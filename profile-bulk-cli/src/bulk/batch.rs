//! Batch aggregation
//!
//! Drives one uploaded file from download to published result: every data
//! row is processed independently, its outcome written next to it, and the
//! batch record is kept current in the status store.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::cache::CachedEnumLookup;
use super::consumer::{BatchRunner, TriggerMessage};
use super::error::{BatchError, RowError, USER_NOT_FOUND};
use super::excel::{Sheet, read_first_sheet, write_sheet};
use super::extract::{ExtractedRow, RowExtractor, is_end_of_data};
use super::profile::ProfileUpdater;
use super::reconcile::PendingReconciler;
use super::resolver::UserResolver;
use super::storage::{FileStorage, LocalFileStorage};
use super::store::{BatchStatusStore, BatchStatusUpdate};
use super::submit::RequestSubmitter;
use super::types::{
    BatchJob, Cell, IdentityHint, RowOutcome, RowSchema, SchemaChoice, UserIdentity,
};
use super::validate::AllowLists;
use crate::api::{HttpProfileClient, HttpUserDirectory};
use crate::config::Config;
use crate::config::repository::{SqliteBatchStatusStore, SqliteMasterData, SqliteWorkflowStore};

/// Everything a processor delegates to
pub struct Collaborators {
    pub extractor: RowExtractor,
    pub resolver: UserResolver,
    pub reconciler: PendingReconciler,
    pub submitter: RequestSubmitter,
    pub storage: Arc<dyn FileStorage>,
    pub status_store: Arc<dyn BatchStatusStore>,
}

pub struct BulkUploadProcessor {
    extractor: RowExtractor,
    resolver: UserResolver,
    reconciler: PendingReconciler,
    submitter: RequestSubmitter,
    storage: Arc<dyn FileStorage>,
    status_store: Arc<dyn BatchStatusStore>,
    schema_choice: SchemaChoice,
    persist_progress_per_row: bool,
}

impl BulkUploadProcessor {
    pub fn new(collaborators: Collaborators, schema_choice: SchemaChoice) -> Self {
        let Collaborators {
            extractor,
            resolver,
            reconciler,
            submitter,
            storage,
            status_store,
        } = collaborators;
        Self {
            extractor,
            resolver,
            reconciler,
            submitter,
            storage,
            status_store,
            schema_choice,
            persist_progress_per_row: false,
        }
    }

    /// Also persist counters after every row
    pub fn with_progress_per_row(mut self, enabled: bool) -> Self {
        self.persist_progress_per_row = enabled;
        self
    }

    /// Wire the HTTP clients and SQLite stores described by `config`
    pub fn from_config(config: &Config, pool: SqlitePool) -> anyhow::Result<Self> {
        let workflows = Arc::new(SqliteWorkflowStore::new(pool.clone()));
        let profile = Arc::new(HttpProfileClient::new(&config.profile)?);
        let directory = Arc::new(HttpUserDirectory::new(&config.directory)?);
        let updater = Arc::new(ProfileUpdater::new(profile, workflows.clone()));
        let enums = Arc::new(CachedEnumLookup::new(
            Arc::new(SqliteMasterData::new(pool.clone())),
            config.cache.ttl(),
        ));

        let collaborators = Collaborators {
            extractor: RowExtractor::new(enums, AllowLists::from(&config.validation)),
            resolver: UserResolver::new(directory),
            reconciler: PendingReconciler::new(workflows.clone(), updater.clone()),
            submitter: RequestSubmitter::new(workflows, updater),
            storage: Arc::new(LocalFileStorage::new(&config.storage)),
            status_store: Arc::new(SqliteBatchStatusStore::new(pool)),
        };

        Ok(Self::new(collaborators, config.batch.row_schema)
            .with_progress_per_row(config.batch.persist_progress_per_row))
    }

    /// Process one uploaded file to completion.
    ///
    /// Never fails: every problem ends up in the returned job and in the
    /// status store.
    pub async fn run(&self, message: &TriggerMessage) -> BatchJob {
        let started = Instant::now();
        let mut job = BatchJob::new(&message.organization_id, &message.batch_id);
        job.start();
        self.persist(&job, BatchStatusUpdate::from_job(&job)).await;

        log::info!(
            "Processing bulk upload {} for organisation {}: {}",
            message.batch_id,
            message.organization_id,
            message.file_name
        );

        let result = match self.storage.download(&message.file_name).await {
            Ok(local) => {
                let result = self.execute(message, &local, &mut job).await;
                if let Err(e) = tokio::fs::remove_file(&local).await {
                    log::warn!("Failed to delete local file {}: {}", local.display(), e);
                }
                result
            }
            Err(e) => Err(BatchError::FileMissing(format!("{:#}", e))),
        };

        if let Err(e) = result {
            log::error!("Bulk upload {} failed: {}", message.batch_id, e);
            job.fail();
        }

        self.persist(&job, BatchStatusUpdate::from_job(&job)).await;
        log::info!(
            "Bulk upload {} finished as {} ({} total, {} successful, {} failed) in {} ms",
            message.batch_id,
            job.status,
            job.total,
            job.successful,
            job.failed,
            started.elapsed().as_millis()
        );
        job
    }

    async fn execute(
        &self,
        message: &TriggerMessage,
        local: &Path,
        job: &mut BatchJob,
    ) -> Result<(), BatchError> {
        let metadata = tokio::fs::metadata(local)
            .await
            .map_err(|e| BatchError::FileMissing(e.to_string()))?;
        if metadata.len() == 0 {
            return Err(BatchError::FileEmpty(message.file_name.clone()));
        }

        let mut sheet =
            read_first_sheet(local).map_err(|e| BatchError::Workbook(format!("{:#}", e)))?;
        let schema = message
            .row_schema
            .unwrap_or(self.schema_choice)
            .resolve(sheet.header());
        log::info!("Using {} row layout for {}", schema, message.file_name);
        sheet.annotate_header(schema);

        self.process_rows(&mut sheet, schema, job).await;

        if job.total == 0 {
            sheet.append_empty_file_marker(schema);
        }

        write_sheet(&sheet, local).map_err(|e| BatchError::Workbook(format!("{:#}", e)))?;
        match self.storage.upload(local, &message.file_name).await {
            Ok(location) => {
                log::info!("Result file published to {}", location);
                job.complete(true);
                Ok(())
            }
            Err(e) => {
                job.complete(false);
                Err(BatchError::Upload(format!("{:#}", e)))
            }
        }
    }

    async fn process_rows(&self, sheet: &mut Sheet, schema: RowSchema, job: &mut BatchJob) {
        let last_row = sheet.rows.len();
        for index in 1..last_row {
            let row: Vec<Cell> = sheet.row(index).to_vec();
            if is_end_of_data(&row, schema) {
                break;
            }

            let started = Instant::now();
            let outcome = self.process_row(&row, schema, &job.organization_id).await;
            log::info!(
                "Record {} processed as {} in {} ms",
                index,
                if outcome.is_success() { "SUCCESS" } else { "FAILED" },
                started.elapsed().as_millis()
            );

            sheet.set_outcome(index, schema, &outcome);
            job.record(&outcome);
            if self.persist_progress_per_row {
                self.persist(job, BatchStatusUpdate::counters(job)).await;
            }
        }
    }

    /// Outcome of one data row
    pub async fn process_row(
        &self,
        row: &[Cell],
        schema: RowSchema,
        organization_id: &str,
    ) -> RowOutcome {
        match self.try_row(row, schema, organization_id).await {
            Ok(()) => RowOutcome::Success,
            Err(e) => {
                log::warn!("Row failed: {}", e);
                RowOutcome::Failure(e.messages())
            }
        }
    }

    async fn try_row(
        &self,
        row: &[Cell],
        schema: RowSchema,
        organization_id: &str,
    ) -> Result<(), RowError> {
        let ExtractedRow {
            identity,
            mut changes,
            errors,
        } = self.extractor.extract(row, schema).await;

        let Some(user) = self.find_user(&identity.hints()).await? else {
            let mut all = identity.errors();
            all.push(USER_NOT_FOUND);
            all.merge(errors);
            return Err(RowError::UserNotFound(all.into_vec()));
        };

        if schema.checks_organization() && !user.belongs_to(organization_id) {
            return Err(RowError::OrganizationMismatch);
        }
        if !errors.is_empty() {
            return Err(RowError::Validation(errors.into_vec()));
        }

        let reconciliation = self.reconciler.reconcile(&user.user_id, &mut changes).await?;
        if !reconciliation.approved.is_empty() || !reconciliation.rejected.is_empty() {
            log::info!(
                "User {}: approved {:?}, rejected {:?}",
                user.user_id,
                reconciliation.approved,
                reconciliation.rejected
            );
        }

        if !changes.is_empty() {
            let request = self.submitter.submit(&user, &changes, schema).await?;
            log::debug!("Workflow request {} is {}", request.wf_id, request.state);
        }

        if reconciliation.update_failed {
            return Err(RowError::ReconciliationUpdateFailure);
        }
        Ok(())
    }

    /// Try each identity hint in order until one resolves
    async fn find_user(&self, hints: &[IdentityHint]) -> Result<Option<UserIdentity>, RowError> {
        for hint in hints {
            if let Some(user) = self.resolver.resolve(hint.field, &hint.value).await? {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    async fn persist(&self, job: &BatchJob, update: BatchStatusUpdate) {
        if let Err(e) = self
            .status_store
            .update_status(&job.organization_id, &job.batch_id, &update)
            .await
        {
            log::error!(
                "Failed to update status of batch {}: {:#}",
                job.batch_id,
                e
            );
        }
    }
}

#[async_trait]
impl BatchRunner for BulkUploadProcessor {
    async fn run(&self, message: &TriggerMessage) -> BatchJob {
        BulkUploadProcessor::run(self, message).await
    }
}
