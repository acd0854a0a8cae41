//! Completed focus sessions and daily totals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single completed focus session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    pub task_name: String,
    pub duration_minutes: i64,
    pub recorded_at: DateTime<Utc>,
}

/// Total focused minutes per task for sessions recorded at or after `day_start`
pub fn today_stats(sessions: &[FocusSession], day_start: DateTime<Utc>) -> BTreeMap<String, i64> {
    let mut totals = BTreeMap::new();
    for session in sessions.iter().filter(|s| s.recorded_at >= day_start) {
        *totals.entry(session.task_name.clone()).or_insert(0) += session.duration_minutes;
    }
    totals
}

/// The `n` most recent sessions, newest first
pub fn recent(sessions: &[FocusSession], n: usize) -> Vec<&FocusSession> {
    let mut sorted: Vec<&FocusSession> = sessions.iter().collect();
    sorted.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    sorted.truncate(n);
    sorted
}
