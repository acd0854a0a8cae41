//! Focus-session log persistence

use crate::focus_log::FocusSession;
use crate::time::from_millis;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

/// Record a completed focus session
pub async fn record_focus_session<'e, E>(
    executor: E,
    task_name: &str,
    duration_minutes: i64,
    recorded_at: DateTime<Utc>,
) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO focus_sessions (task_name, duration_minutes, recorded_at_ms) VALUES (?, ?, ?)",
    )
    .bind(task_name)
    .bind(duration_minutes)
    .bind(recorded_at.timestamp_millis())
    .execute(executor)
    .await?;
    Ok(())
}

/// All recorded sessions, most recent first
pub async fn load_focus_sessions<'e, E>(executor: E) -> Result<Vec<FocusSession>>
where
    E: SqliteExecutor<'e>,
{
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT task_name, duration_minutes, recorded_at_ms
        FROM focus_sessions
        ORDER BY recorded_at_ms DESC, id DESC
        "#,
    )
    .fetch_all(executor)
    .await?;

    rows.into_iter()
        .map(|(task_name, duration_minutes, recorded_at_ms)| {
            let recorded_at = from_millis(recorded_at_ms).ok_or_else(|| {
                Error::InvalidArgument(format!("stored session time {} out of range", recorded_at_ms))
            })?;
            Ok(FocusSession {
                task_name,
                duration_minutes,
                recorded_at,
            })
        })
        .collect()
}

/// Delete the whole session log
pub async fn clear_focus_sessions<'e, E>(executor: E) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("DELETE FROM focus_sessions")
        .execute(executor)
        .await?;
    Ok(())
}
