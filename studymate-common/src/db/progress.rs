//! Boss progress persistence

use crate::progress::ProgressState;
use crate::time::from_millis;
use crate::{Error, Result};
use sqlx::SqliteExecutor;

/// Load the saved game state, or `None` if nothing has been saved yet.
///
/// A negative stored HP marks an unset boss and a non-positive timestamp
/// means "never", matching how older saves encoded those values.
pub async fn load_progress_state<'e, E>(executor: E) -> Result<Option<ProgressState>>
where
    E: SqliteExecutor<'e>,
{
    let row: Option<(i64, Option<i64>, Option<i64>)> = sqlx::query_as(
        "SELECT level, current_hp, last_update_ms FROM boss_progress WHERE id = 1",
    )
    .fetch_optional(executor)
    .await?;

    let Some((level, current_hp, last_update_ms)) = row else {
        return Ok(None);
    };

    let level = u32::try_from(level)
        .ok()
        .filter(|l| *l >= 1)
        .ok_or_else(|| Error::InvalidArgument(format!("stored boss level {} is invalid", level)))?;

    Ok(Some(ProgressState {
        level,
        current_hp: current_hp.filter(|hp| *hp >= 0),
        last_update: last_update_ms.filter(|ms| *ms > 0).and_then(from_millis),
    }))
}

/// Insert or overwrite the saved game state
pub async fn save_progress_state<'e, E>(executor: E, state: &ProgressState) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO boss_progress (id, level, current_hp, last_update_ms, updated_at)
        VALUES (1, ?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(id) DO UPDATE SET
            level = excluded.level,
            current_hp = excluded.current_hp,
            last_update_ms = excluded.last_update_ms,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(i64::from(state.level))
    .bind(state.current_hp)
    .bind(state.last_update.map(|t| t.timestamp_millis()))
    .execute(executor)
    .await?;

    Ok(())
}

/// Forget all boss progress; the next load starts from a fresh level 1
pub async fn clear_progress_state<'e, E>(executor: E) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("DELETE FROM boss_progress")
        .execute(executor)
        .await?;
    Ok(())
}
