//! On-disk artifact persistence for research runs.
//!
//! Every run owns one directory under the store root; step reports, the final
//! report, the persisted run record and the search log all live there. Report
//! writes are fire-and-forget: a failed write is logged and never fails the
//! step that produced the report.

use crate::types::{AppError, ResearchRun, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Filesystem-backed artifact store rooted at one output directory.
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at `root` (`{root}/{run_id}/...`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory all of `run_id`'s artifacts live under.
    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root.join(run_id)
    }

    /// Writes one artifact under the run's namespace as
    /// `{step_key}_{filename}`. Fire-and-forget: failures are logged, never
    /// propagated.
    pub async fn save(&self, run_id: &str, step_key: &str, filename: &str, content: &str) {
        if let Err(e) = self.save_artifact(run_id, step_key, filename, content).await {
            tracing::warn!(
                run_id,
                step_key,
                filename,
                error = %e,
                "failed to persist artifact"
            );
        }
    }

    async fn save_artifact(
        &self,
        run_id: &str,
        step_key: &str,
        filename: &str,
        content: &str,
    ) -> Result<PathBuf> {
        let dir = self.run_dir(run_id);
        fs::create_dir_all(&dir).await.map_err(storage)?;

        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{ext}")),
            None => (filename, String::new()),
        };

        // Never overwrite: an existing file gets a counter suffix.
        let mut path = dir.join(format!("{step_key}_{filename}"));
        let mut counter = 0;
        while fs::try_exists(&path).await.map_err(storage)? {
            counter += 1;
            path = dir.join(format!("{step_key}_{stem}_{counter}{ext}"));
        }

        fs::write(&path, content).await.map_err(storage)?;
        tracing::debug!(path = %path.display(), "artifact written");
        Ok(path)
    }

    /// Persists the run record as `run.json`.
    pub async fn save_run(&self, run: &ResearchRun) -> Result<()> {
        let dir = self.run_dir(&run.run_id);
        fs::create_dir_all(&dir).await.map_err(storage)?;

        let json = serde_json::to_string_pretty(run)
            .map_err(|e| AppError::Storage(format!("failed to serialize run: {e}")))?;
        fs::write(dir.join("run.json"), json).await.map_err(storage)
    }

    /// Re-loads a persisted run record by id.
    pub async fn load_run(&self, run_id: &str) -> Result<ResearchRun> {
        let path = self.run_dir(run_id).join("run.json");
        let raw = fs::read_to_string(&path)
            .await
            .map_err(|_| AppError::NotFound(format!("no persisted run '{run_id}'")))?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::Storage(format!("corrupt run record '{run_id}': {e}")))
    }

    /// Appends one query/result entry to the run's search log.
    /// Fire-and-forget, like [`ArtifactStore::save`].
    pub async fn append_search_log(&self, run_id: &str, query: &str, urls: &[String]) {
        if let Err(e) = self.append_log_entry(run_id, query, urls).await {
            tracing::warn!(run_id, error = %e, "failed to append search log");
        }
    }

    async fn append_log_entry(&self, run_id: &str, query: &str, urls: &[String]) -> Result<()> {
        let dir = self.run_dir(run_id);
        fs::create_dir_all(&dir).await.map_err(storage)?;

        let divider = "=".repeat(80);
        let mut entry = format!(
            "\n{divider}\nSEARCH LOG - {}\n{divider}\nQuery: {query}\n\nRESULTS:\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
        );
        if urls.is_empty() {
            entry.push_str("No results found.\n");
        } else {
            for (i, url) in urls.iter().enumerate() {
                entry.push_str(&format!("{}. {url}\n", i + 1));
            }
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("search_logs.txt"))
            .await
            .map_err(storage)?;
        file.write_all(entry.as_bytes()).await.map_err(storage)?;
        Ok(())
    }

    /// The store root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn storage(e: std::io::Error) -> AppError {
    AppError::Storage(e.to_string())
}
