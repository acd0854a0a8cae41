//! Chat history persistence, one ordered history per session kind

use crate::similarity::{HistoryEntry, SessionKind};
use crate::Result;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

/// Append a message to the end of `kind`'s history
pub async fn append_message<'e, E>(executor: E, kind: SessionKind, entry: &HistoryEntry) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("INSERT INTO chat_messages (kind, content, is_user) VALUES (?, ?, ?)")
        .bind(kind.as_str())
        .bind(entry.text.as_str())
        .bind(entry.is_from_user)
        .execute(executor)
        .await?;
    Ok(())
}

/// All messages of `kind` in the order they were recorded
pub async fn load_history<'e, E>(executor: E, kind: SessionKind) -> Result<Vec<HistoryEntry>>
where
    E: SqliteExecutor<'e>,
{
    let rows: Vec<(String, bool)> = sqlx::query_as(
        "SELECT content, is_user FROM chat_messages WHERE kind = ? ORDER BY id",
    )
    .bind(kind.as_str())
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(text, is_from_user)| HistoryEntry { text, is_from_user })
        .collect())
}

/// Delete every message of `kind`
pub async fn clear_history<'e, E>(executor: E, kind: SessionKind) -> Result<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM chat_messages WHERE kind = ?")
        .bind(kind.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Replace `kind`'s history with `entries` atomically
pub async fn replace_history(pool: &SqlitePool, kind: SessionKind, entries: &[HistoryEntry]) -> Result<()> {
    let mut tx = pool.begin().await?;

    let removed = clear_history(&mut *tx, kind).await?;
    for entry in entries {
        append_message(&mut *tx, kind, entry).await?;
    }

    tx.commit().await?;

    debug!(
        kind = %kind,
        removed,
        inserted = entries.len(),
        "Replaced chat history"
    );
    Ok(())
}
