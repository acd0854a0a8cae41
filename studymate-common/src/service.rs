//! Serialized access to persisted progress and chat history
//!
//! The engine itself is pure; this layer does the load, compute, save
//! round trip. [`ProgressTracker`] holds an async mutex and runs each
//! session inside one `BEGIN IMMEDIATE` transaction, so two sessions
//! finishing at once (in this process or another) can't both read the same
//! HP and overwrite each other.

use crate::db;
use crate::focus_log::{self, FocusSession};
use crate::progress::{apply_session, peek_state, EngineResult};
use crate::similarity::{check_recall, HistoryEntry, RecallSettings, SessionKind};
use crate::time::{local_day_start, Clock};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Records focus sessions and reports boss state
pub struct ProgressTracker {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl ProgressTracker {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Apply a completed session and log it under `task_name`.
    ///
    /// Nothing is written if the engine rejects the input.
    pub async fn record_session(&self, task_name: &str, focus_minutes: i64) -> Result<EngineResult> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        // IMMEDIATE takes the write lock up front, so another process
        // waits on busy_timeout instead of failing the read-to-write upgrade
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result = match apply_and_log(&mut conn, task_name, focus_minutes, now).await {
            Ok(result) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                result
            }
            Err(e) => {
                if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                    warn!("Rollback after failed session failed: {}", rollback);
                }
                return Err(e);
            }
        };

        info!(
            task = task_name,
            minutes = focus_minutes,
            level = result.level,
            hp = result.current_hp,
            "Recorded focus session"
        );
        Ok(result)
    }

    /// Current boss state with accrued healing; writes nothing
    pub async fn current_state(&self) -> Result<EngineResult> {
        let state = db::load_progress_state(&self.pool).await?.unwrap_or_default();
        peek_state(&state, self.clock.now())
    }

    /// Forget boss progress (logout / clear data)
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        db::clear_progress_state(&self.pool).await?;
        info!("Boss progress reset");
        Ok(())
    }

    /// Delete the focus-session log
    pub async fn clear_sessions(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        db::clear_focus_sessions(&self.pool).await
    }

    /// All logged sessions, most recent first
    pub async fn sessions(&self) -> Result<Vec<FocusSession>> {
        db::load_focus_sessions(&self.pool).await
    }

    /// Minutes per task since local midnight
    pub async fn today_stats(&self) -> Result<BTreeMap<String, i64>> {
        let sessions = self.sessions().await?;
        Ok(focus_log::today_stats(&sessions, local_day_start(self.clock.now())))
    }
}

/// Load, apply and save inside the caller's open transaction
async fn apply_and_log(
    conn: &mut SqliteConnection,
    task_name: &str,
    focus_minutes: i64,
    now: DateTime<Utc>,
) -> Result<EngineResult> {
    let state = db::load_progress_state(&mut *conn).await?.unwrap_or_default();
    let (next_state, result) = apply_session(&state, focus_minutes, now)?;

    db::save_progress_state(&mut *conn, &next_state).await?;
    db::record_focus_session(&mut *conn, task_name, focus_minutes, now).await?;
    Ok(result)
}

/// Per-assistant chat histories and the "asked before" check
pub struct ChatHistory {
    pool: SqlitePool,
}

impl ChatHistory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, kind: SessionKind, text: &str, is_from_user: bool) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::InvalidArgument("message text must not be empty".to_string()));
        }
        let entry = HistoryEntry {
            text: text.to_string(),
            is_from_user,
        };
        db::append_message(&self.pool, kind, &entry).await
    }

    pub async fn history(&self, kind: SessionKind) -> Result<Vec<HistoryEntry>> {
        db::load_history(&self.pool, kind).await
    }

    pub async fn clear(&self, kind: SessionKind) -> Result<u64> {
        db::clear_history(&self.pool, kind).await
    }

    /// History as a JSON array of `{"content", "isUser"}` objects
    pub async fn export_json(&self, kind: SessionKind) -> Result<String> {
        let entries = self.history(kind).await?;
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    /// Replace the history with a JSON array in the export format
    pub async fn import_json(&self, kind: SessionKind, json: &str) -> Result<usize> {
        let entries: Vec<HistoryEntry> = serde_json::from_str(json)?;
        db::replace_history(&self.pool, kind, &entries).await?;
        Ok(entries.len())
    }

    /// Earlier tutor question similar to `text`, if any.
    ///
    /// Only the tutor history is searched.
    pub async fn check_recall(&self, text: &str, settings: &RecallSettings) -> Result<Option<String>> {
        // Same gate as similarity::check_recall, checked here to skip the load
        if text.chars().count() <= settings.query_min_length {
            return Ok(None);
        }
        let history = self.history(SessionKind::Tutor).await?;
        Ok(check_recall(text, &history, settings).map(str::to_string))
    }
}
