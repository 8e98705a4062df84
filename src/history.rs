use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

const SEARCH_LOG_FILE: &str = "search_log.json";
const DOWNLOAD_HISTORY_FILE: &str = "history.json";

/// The search log keeps only the most recent entries.
const SEARCH_LOG_CAP: usize = 30;

/// Placeholder shown for wildcard searches with no keyword.
const EMPTY_QUERY_LABEL: &str = "(no keyword)";

/// One remembered search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchLogEntry {
    pub query: String,
    pub mode: String,
    pub time: String,
}

/// One downloaded video, keyed externally by video id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub title: String,
    pub date: String,
}

/// JSON-file backed store for the search log and download history.
///
/// Missing or corrupt files read as empty; persistence failures are not
/// fatal to a research run, callers decide whether to surface them.
pub struct HistoryStore {
    data_dir: PathBuf,
}

impl HistoryStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn search_log_path(&self) -> PathBuf {
        self.data_dir.join(SEARCH_LOG_FILE)
    }

    fn download_history_path(&self) -> PathBuf {
        self.data_dir.join(DOWNLOAD_HISTORY_FILE)
    }

    /// Most-recent-first search log.
    pub async fn load_search_log(&self) -> Vec<SearchLogEntry> {
        read_json(&self.search_log_path()).await.unwrap_or_default()
    }

    /// Remember a search. Entries are de-duplicated case-insensitively by
    /// (query, mode) with the newest kept up front, and the log is capped
    /// at [`SEARCH_LOG_CAP`] entries.
    pub async fn record_search(&self, query: &str, mode: &str) -> Result<()> {
        let display_query = if query.trim().is_empty() {
            EMPTY_QUERY_LABEL.to_string()
        } else {
            query.trim().to_string()
        };

        let mut log = self.load_search_log().await;
        log.retain(|entry| {
            !entry.query.eq_ignore_ascii_case(&display_query) || entry.mode != mode
        });
        log.insert(
            0,
            SearchLogEntry {
                query: display_query,
                mode: mode.to_string(),
                time: Local::now().format("%d/%m %H:%M").to_string(),
            },
        );
        log.truncate(SEARCH_LOG_CAP);

        write_json(&self.search_log_path(), &log).await
    }

    /// Drop one entry by position; out-of-range indexes are ignored.
    pub async fn remove_search(&self, index: usize) -> Result<()> {
        let mut log = self.load_search_log().await;
        if index < log.len() {
            log.remove(index);
            write_json(&self.search_log_path(), &log).await?;
        }
        Ok(())
    }

    pub async fn clear_search_log(&self) -> Result<()> {
        write_json(&self.search_log_path(), &Vec::<SearchLogEntry>::new()).await
    }

    pub async fn load_downloads(&self) -> HashMap<String, DownloadRecord> {
        read_json(&self.download_history_path())
            .await
            .unwrap_or_default()
    }

    /// Record that a video was downloaded.
    pub async fn mark_downloaded(&self, video_id: &str, title: &str) -> Result<()> {
        let mut downloads = self.load_downloads().await;
        downloads.insert(
            video_id.to_string(),
            DownloadRecord {
                title: title.to_string(),
                date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            },
        );
        write_json(&self.download_history_path(), &downloads).await
    }

    pub async fn is_downloaded(&self, video_id: &str) -> bool {
        self.load_downloads().await.contains_key(video_id)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let content = fs::read_to_string(path).await.ok()?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("ignoring corrupt history file {}: {}", path.display(), e);
            None
        }
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).await?;
    Ok(())
}
