//! Source and result file storage

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;

use crate::config::StorageConfig;

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Fetch an uploaded file into the local work area and return its path
    async fn download(&self, file_name: &str) -> Result<PathBuf>;

    /// Publish a result file and return where it went
    async fn upload(&self, local: &Path, file_name: &str) -> Result<String>;
}

/// Directory-backed storage: uploads are read from `inbox_dir`, worked on in
/// `work_dir` and published under `outbox_dir/result_folder`.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    inbox_dir: PathBuf,
    work_dir: PathBuf,
    result_dir: PathBuf,
}

/// File names must be a single plain path component
fn check_file_name(file_name: &str) -> Result<()> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => bail!("Invalid file name: '{}'", file_name),
    }
}

impl LocalFileStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            inbox_dir: config.inbox_dir.clone(),
            work_dir: config.work_dir.clone(),
            result_dir: config.outbox_dir.join(&config.result_folder),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn download(&self, file_name: &str) -> Result<PathBuf> {
        check_file_name(file_name)?;
        let source = self.inbox_dir.join(file_name);
        let target = self.work_dir.join(file_name);

        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .with_context(|| format!("Failed to create work directory: {}", self.work_dir.display()))?;
        tokio::fs::copy(&source, &target)
            .await
            .with_context(|| format!("Failed to fetch {}", source.display()))?;

        Ok(target)
    }

    async fn upload(&self, local: &Path, file_name: &str) -> Result<String> {
        check_file_name(file_name)?;
        let target = self.result_dir.join(file_name);

        tokio::fs::create_dir_all(&self.result_dir)
            .await
            .with_context(|| {
                format!("Failed to create result directory: {}", self.result_dir.display())
            })?;
        tokio::fs::copy(local, &target)
            .await
            .with_context(|| format!("Failed to publish {}", target.display()))?;

        Ok(target.display().to_string())
    }
}
