//! Boss progress engine
//!
//! Converts completed focus time into damage against the current boss.
//! Between sessions the boss regenerates a share of its HP for every
//! whole idle hour. Damage that exceeds the boss's remaining HP carries
//! over to the next tier, possibly clearing several tiers in one call.
//!
//! The engine is pure: callers load a [`ProgressState`], pass in "now",
//! and persist the returned state themselves.

use crate::boss::{boss_info, BossDefinition};
use crate::time::whole_hours_between;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Damage dealt per focused minute
pub const DAMAGE_PER_MINUTE: i64 = 10;

/// Percent of max HP regenerated per whole idle hour
pub const HEAL_PERCENT_PER_HOUR: i64 = 5;

/// Status message reported by [`peek_state`]
pub const WAITING_MESSAGE: &str = "Boss is waiting...";

/// Persisted game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Current boss tier (>= 1)
    pub level: u32,
    /// Remaining HP of the current boss; `None` means a fresh boss at full HP
    pub current_hp: Option<i64>,
    /// Time of the last processed session; `None` means never
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            level: 1,
            current_hp: None,
            last_update: None,
        }
    }
}

/// Outcome of an engine call, derived fresh every time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineResult {
    pub level: u32,
    pub name: String,
    pub current_hp: i64,
    pub max_hp: i64,
    pub status_message: String,
    /// Number of bosses defeated by this call
    pub levels_gained: u32,
    /// Passive healing reported for this call, if any
    pub healed: Option<i64>,
}

/// Boss currently being fought and its remaining HP
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fight {
    boss: BossDefinition,
    hp: i64,
}

/// One step of damage resolution
struct Strike {
    fight: Fight,
    remaining: i64,
    defeated: Option<&'static str>,
}

/// Everything computed for a call before it is turned into a result
struct Resolution {
    fight: Fight,
    total_damage: i64,
    healed: Option<i64>,
    last_defeated: Option<&'static str>,
    levels_gained: u32,
}

/// Apply a completed focus session of `focus_minutes` at time `now`.
///
/// Returns the state to persist (timestamp always set to `now`, even for a
/// zero-minute call) together with the display result.
pub fn apply_session(
    state: &ProgressState,
    focus_minutes: i64,
    now: DateTime<Utc>,
) -> Result<(ProgressState, EngineResult)> {
    let resolution = resolve(state, focus_minutes, now)?;

    let status_message = match resolution.last_defeated {
        Some(defeated) => format!(
            "Overkill! Defeated {}! Remaining damage hit {}!",
            defeated, resolution.fight.boss.name
        ),
        None => {
            let heal_note = resolution
                .healed
                .map(|amount| format!(" (Boss healed {}!)", amount))
                .unwrap_or_default();
            format!("You dealt {} damage!{}", resolution.total_damage, heal_note)
        }
    };

    if resolution.levels_gained > 0 {
        info!(
            from_level = state.level,
            to_level = resolution.fight.boss.level,
            boss = resolution.fight.boss.name,
            "Boss defeated"
        );
    }

    let next_state = ProgressState {
        level: resolution.fight.boss.level,
        current_hp: Some(resolution.fight.hp),
        last_update: Some(now),
    };

    Ok((next_state, resolution.into_result(status_message)))
}

/// Report the current boss without dealing damage.
///
/// Passive healing accrued since the last session is shown, but nothing is
/// meant to be persisted: the healing baseline only moves when a session
/// is applied.
pub fn peek_state(state: &ProgressState, now: DateTime<Utc>) -> Result<EngineResult> {
    let resolution = resolve(state, 0, now)?;
    Ok(resolution.into_result(WAITING_MESSAGE.to_string()))
}

fn resolve(state: &ProgressState, focus_minutes: i64, now: DateTime<Utc>) -> Result<Resolution> {
    if focus_minutes < 0 {
        return Err(Error::InvalidArgument(format!(
            "focus minutes must not be negative (got {})",
            focus_minutes
        )));
    }
    let total_damage = focus_minutes.checked_mul(DAMAGE_PER_MINUTE).ok_or_else(|| {
        Error::InvalidArgument(format!("focus minutes too large ({})", focus_minutes))
    })?;

    let boss = boss_info(state.level)?;
    let hp = starting_hp(state, &boss)?;

    let mut last_defeated = None;
    let mut levels_gained = 0u32;

    // A boss stored at 0 HP fell without being replaced; finish that kill first
    let Fight { boss, hp } = if hp == 0 {
        let pending = hit(Fight { boss, hp }, 0)?;
        last_defeated = pending.defeated;
        levels_gained += 1;
        pending.fight
    } else {
        Fight { boss, hp }
    };

    let (hp, healed) = match state.last_update {
        Some(last) => heal(&boss, hp, whole_hours_between(last, now)),
        None => (hp, None),
    };

    let mut strike = Strike {
        fight: Fight { boss, hp },
        remaining: total_damage,
        defeated: None,
    };

    while strike.remaining > 0 {
        strike = hit(strike.fight, strike.remaining)?;
        if let Some(name) = strike.defeated {
            last_defeated = Some(name);
            levels_gained += 1;
        }
    }

    debug!(
        level = strike.fight.boss.level,
        hp = strike.fight.hp,
        max_hp = strike.fight.boss.max_hp,
        damage = total_damage,
        healed = ?healed,
        "Resolved focus session"
    );

    Ok(Resolution {
        fight: strike.fight,
        total_damage,
        healed,
        last_defeated,
        levels_gained,
    })
}

/// HP the boss starts this call with, before healing
fn starting_hp(state: &ProgressState, boss: &BossDefinition) -> Result<i64> {
    match state.current_hp {
        None => Ok(boss.max_hp),
        Some(hp) if hp < 0 => Err(Error::InvalidArgument(format!(
            "stored boss HP must not be negative (got {})",
            hp
        ))),
        Some(hp) if hp > boss.max_hp => {
            warn!(
                level = boss.level,
                hp,
                max_hp = boss.max_hp,
                "Stored boss HP above maximum, clamping"
            );
            Ok(boss.max_hp)
        }
        Some(hp) => Ok(hp),
    }
}

/// Regenerate HP for `hours` idle hours.
///
/// `max_hp * 5 * hours / 100` in integer arithmetic is exactly
/// `floor(max_hp * 0.05 * hours)`.
fn heal(boss: &BossDefinition, hp: i64, hours: i64) -> (i64, Option<i64>) {
    if hours < 1 {
        return (hp, None);
    }

    let amount = boss
        .max_hp
        .saturating_mul(HEAL_PERCENT_PER_HOUR)
        .saturating_mul(hours)
        / 100;

    if amount > 0 && hp < boss.max_hp {
        (hp.saturating_add(amount).min(boss.max_hp), Some(amount))
    } else {
        (hp, None)
    }
}

/// Deal `remaining` damage to the current boss, moving to the next tier if
/// it falls.
fn hit(fight: Fight, remaining: i64) -> Result<Strike> {
    if fight.hp > remaining {
        return Ok(Strike {
            fight: Fight {
                hp: fight.hp - remaining,
                ..fight
            },
            remaining: 0,
            defeated: None,
        });
    }

    let next_level = fight
        .boss
        .level
        .checked_add(1)
        .ok_or_else(|| Error::InvalidArgument("boss level overflow".to_string()))?;
    let next = boss_info(next_level)?;

    Ok(Strike {
        remaining: remaining - fight.hp,
        defeated: Some(fight.boss.name),
        fight: Fight {
            hp: next.max_hp,
            boss: next,
        },
    })
}

impl Resolution {
    fn into_result(self, status_message: String) -> EngineResult {
        EngineResult {
            level: self.fight.boss.level,
            name: self.fight.boss.name.to_string(),
            current_hp: self.fight.hp,
            max_hp: self.fight.boss.max_hp,
            status_message,
            levels_gained: self.levels_gained,
            healed: self.healed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn state(level: u32, hp: Option<i64>, last: Option<DateTime<Utc>>) -> ProgressState {
        ProgressState {
            level,
            current_hp: hp,
            last_update: last,
        }
    }

    #[test]
    fn test_fresh_state_takes_damage() {
        let (next, result) = apply_session(&ProgressState::default(), 10, t0()).unwrap();

        assert_eq!(result.level, 1);
        assert_eq!(result.name, "Procrastination Slime");
        assert_eq!(result.max_hp, 300);
        assert_eq!(result.current_hp, 200);
        assert_eq!(result.status_message, "You dealt 100 damage!");
        assert_eq!(result.levels_gained, 0);
        assert_eq!(result.healed, None);

        assert_eq!(next, state(1, Some(200), Some(t0())));
    }

    #[test]
    fn test_overkill_chains_through_two_bosses() {
        let (next, result) = apply_session(&state(1, Some(5), None), 200, t0()).unwrap();

        // 2000 damage: 5 clears the slime, 1200 clears the goblin, 795 hits the demon
        assert_eq!(result.level, 3);
        assert_eq!(result.name, "Social Media Demon");
        assert_eq!(result.current_hp, 3000 - 795);
        assert_eq!(result.levels_gained, 2);
        assert_eq!(
            result.status_message,
            "Overkill! Defeated Distraction Goblin! Remaining damage hit Social Media Demon!"
        );
        assert_eq!(next.level, 3);
        assert_eq!(next.current_hp, Some(2205));
    }

    #[test]
    fn test_exact_kill_spawns_full_hp_boss() {
        let (next, result) = apply_session(&state(1, Some(300), None), 30, t0()).unwrap();

        assert_eq!(result.level, 2);
        assert_eq!(result.current_hp, 1200);
        assert_eq!(
            result.status_message,
            "Overkill! Defeated Procrastination Slime! Remaining damage hit Distraction Goblin!"
        );
        assert_eq!(next.current_hp, Some(1200));
    }

    #[test]
    fn test_boss_survives_with_one_hp() {
        let (_, result) = apply_session(&state(1, Some(101), None), 10, t0()).unwrap();
        assert_eq!(result.level, 1);
        assert_eq!(result.current_hp, 1);
    }

    #[test]
    fn test_damage_into_extrapolated_tiers() {
        // Level 4 at 1 HP, then level 5 (20000) and level 6 (22000)
        let (_, result) = apply_session(&state(4, Some(1), None), 4_000, t0()).unwrap();

        assert_eq!(result.level, 6);
        assert_eq!(result.name, "Burnout Dragon");
        assert_eq!(result.max_hp, 22000);
        assert_eq!(result.current_hp, 22000 - (40_000 - 1 - 20000));
        assert_eq!(result.levels_gained, 2);
        assert_eq!(
            result.status_message,
            "Overkill! Defeated Burnout Dragon! Remaining damage hit Burnout Dragon!"
        );
    }

    #[test]
    fn test_healing_after_idle_hours() {
        let last = t0();
        let now = last + Duration::hours(3) + Duration::minutes(59);
        let (next, result) = apply_session(&state(2, Some(500), Some(last)), 1, now).unwrap();

        // 1200 * 0.05 * 3 = 180 healed, then 10 damage
        assert_eq!(result.healed, Some(180));
        assert_eq!(result.current_hp, 500 + 180 - 10);
        assert_eq!(result.status_message, "You dealt 10 damage! (Boss healed 180!)");
        assert_eq!(next.last_update, Some(now));
    }

    #[test]
    fn test_no_healing_under_one_hour() {
        let last = t0();
        let now = last + Duration::minutes(59);
        let (_, result) = apply_session(&state(1, Some(100), Some(last)), 0, now).unwrap();

        assert_eq!(result.healed, None);
        assert_eq!(result.current_hp, 100);
        assert_eq!(result.status_message, "You dealt 0 damage!");
    }

    #[test]
    fn test_healing_is_capped_at_max() {
        let last = t0();
        let now = last + Duration::hours(48);
        let (_, result) = apply_session(&state(1, Some(290), Some(last)), 0, now).unwrap();

        assert_eq!(result.current_hp, 300);
        // Reported amount is the computed regeneration, not the capped delta
        assert_eq!(result.healed, Some(720));
    }

    #[test]
    fn test_full_hp_boss_does_not_report_healing() {
        let last = t0();
        let now = last + Duration::hours(2);
        let (_, result) = apply_session(&state(1, None, Some(last)), 1, now).unwrap();

        assert_eq!(result.healed, None);
        assert_eq!(result.status_message, "You dealt 10 damage!");
    }

    #[test]
    fn test_healing_uses_pre_damage_boss() {
        // Heal is 5% of the slime's 300, not of the goblin's 1200
        let last = t0();
        let now = last + Duration::hours(1);
        let (_, result) = apply_session(&state(1, Some(100), Some(last)), 15, now).unwrap();

        // 100 + 15 healed = 115 HP; 150 damage clears it with 35 left over
        assert_eq!(result.level, 2);
        assert_eq!(result.current_hp, 1200 - 35);
        assert_eq!(result.healed, Some(15));
    }

    #[test]
    fn test_clock_moving_backwards_does_not_heal() {
        let last = t0();
        let now = last - Duration::hours(10);
        let (_, result) = apply_session(&state(1, Some(100), Some(last)), 0, now).unwrap();
        assert_eq!(result.current_hp, 100);
        assert_eq!(result.healed, None);
    }

    #[test]
    fn test_zero_minute_session_moves_timestamp() {
        let last = t0();
        let now = last + Duration::minutes(30);
        let (next, _) = apply_session(&state(1, Some(100), Some(last)), 0, now).unwrap();
        assert_eq!(next.last_update, Some(now));
        assert_eq!(next.current_hp, Some(100));
    }

    #[test]
    fn test_peek_is_idempotent() {
        let last = t0();
        let now = last + Duration::hours(2);
        let current = state(3, Some(1000), Some(last));

        let first = peek_state(&current, now).unwrap();
        let second = peek_state(&current, now).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.status_message, WAITING_MESSAGE);
        assert_eq!(first.level, 3);
        // Displayed HP includes accrued healing: 3000 * 0.05 * 2 = 300
        assert_eq!(first.current_hp, 1300);
    }

    #[test]
    fn test_peek_fresh_state() {
        let result = peek_state(&ProgressState::default(), t0()).unwrap();
        assert_eq!(result.level, 1);
        assert_eq!(result.current_hp, 300);
        assert_eq!(result.max_hp, 300);
    }

    #[test]
    fn test_zero_hp_boss_is_replaced_on_peek() {
        let zero = state(1, Some(0), None);
        let result = peek_state(&zero, t0()).unwrap();

        assert_eq!(result.level, 2);
        assert_eq!(result.name, "Distraction Goblin");
        assert_eq!(result.current_hp, 1200);
        assert_eq!(result.max_hp, 1200);
        assert_eq!(result.levels_gained, 1);
        assert_eq!(result.status_message, WAITING_MESSAGE);
    }

    #[test]
    fn test_zero_hp_boss_is_replaced_on_zero_minute_session() {
        let last = t0() - Duration::hours(5);
        let (next, result) = apply_session(&state(1, Some(0), Some(last)), 0, t0()).unwrap();

        assert_eq!(result.level, 2);
        assert_eq!(result.current_hp, 1200);
        assert_eq!(result.healed, None);
        assert_eq!(result.levels_gained, 1);
        assert_eq!(next, state(2, Some(1200), Some(t0())));
    }

    #[test]
    fn test_zero_hp_boss_replaced_before_damage() {
        let (next, result) = apply_session(&state(1, Some(0), None), 10, t0()).unwrap();

        assert_eq!(result.level, 2);
        assert_eq!(result.current_hp, 1100);
        assert_eq!(
            result.status_message,
            "Overkill! Defeated Procrastination Slime! Remaining damage hit Distraction Goblin!"
        );
        assert_eq!(next.current_hp, Some(1100));
    }

    #[test]
    fn test_negative_minutes_rejected() {
        let err = apply_session(&ProgressState::default(), -1, t0()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_level_zero_rejected() {
        let err = apply_session(&state(0, None, None), 5, t0()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(peek_state(&state(0, None, None), t0()).is_err());
    }

    #[test]
    fn test_negative_stored_hp_rejected() {
        let err = apply_session(&state(1, Some(-5), None), 5, t0()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_damage_overflow_rejected() {
        let err = apply_session(&ProgressState::default(), i64::MAX, t0()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_stored_hp_above_max_is_clamped() {
        let (_, result) = apply_session(&state(1, Some(5000), None), 0, t0()).unwrap();
        assert_eq!(result.current_hp, 300);
    }

    #[test]
    fn test_hp_stays_in_range_and_level_never_drops() {
        let start = state(2, Some(700), Some(t0()));
        for minutes in [0, 1, 7, 69, 70, 71, 120, 500, 1_000, 10_000] {
            for hours in [0, 1, 5, 30] {
                let now = t0() + Duration::hours(hours);
                let (next, result) = apply_session(&start, minutes, now).unwrap();
                assert!(result.current_hp > 0);
                assert!(result.current_hp <= result.max_hp);
                assert!(result.level >= start.level);
                assert_eq!(next.level, result.level);
                assert_eq!(next.current_hp, Some(result.current_hp));
            }
        }
    }
}
