//! Boss tiers for the focus progress game
//!
//! Four named tiers are defined. Levels past the last tier reuse its name
//! and scale HP linearly with the level.

use crate::{Error, Result};
use serde::Serialize;

/// HP added per level for bosses past the defined table
pub const EXTRAPOLATED_HP_PER_LEVEL: i64 = 2000;

/// Defined tiers: (level, name, max HP)
const BOSS_TABLE: [(u32, &str, i64); 4] = [
    (1, "Procrastination Slime", 300),
    (2, "Distraction Goblin", 1200),
    (3, "Social Media Demon", 3000),
    (4, "Burnout Dragon", 10000),
];

/// Static description of the boss at a given level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BossDefinition {
    pub level: u32,
    pub name: &'static str,
    pub max_hp: i64,
}

/// Look up the boss for `level`.
///
/// Levels beyond the table get `last.max_hp + level * 2000` HP and the
/// last tier's name. Level 0 is rejected.
pub fn boss_info(level: u32) -> Result<BossDefinition> {
    if level == 0 {
        return Err(Error::InvalidArgument("boss level must be at least 1".to_string()));
    }

    let index = (level as usize).min(BOSS_TABLE.len()) - 1;
    let (_, name, base_hp) = BOSS_TABLE[index];

    let max_hp = if level as usize > BOSS_TABLE.len() {
        base_hp.saturating_add(i64::from(level).saturating_mul(EXTRAPOLATED_HP_PER_LEVEL))
    } else {
        base_hp
    };

    Ok(BossDefinition { level, name, max_hp })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defined_tiers() {
        let expected = [
            (1, "Procrastination Slime", 300),
            (2, "Distraction Goblin", 1200),
            (3, "Social Media Demon", 3000),
            (4, "Burnout Dragon", 10000),
        ];
        for (level, name, hp) in expected {
            let boss = boss_info(level).unwrap();
            assert_eq!(boss.level, level);
            assert_eq!(boss.name, name);
            assert_eq!(boss.max_hp, hp);
        }
    }

    #[test]
    fn test_level_five_extrapolates() {
        let boss = boss_info(5).unwrap();
        assert_eq!(boss.name, "Burnout Dragon");
        assert_eq!(boss.max_hp, 20000);
    }

    #[test]
    fn test_high_levels_keep_growing() {
        assert_eq!(boss_info(6).unwrap().max_hp, 22000);
        assert_eq!(boss_info(10).unwrap().max_hp, 30000);
        assert_eq!(boss_info(100).unwrap().name, "Burnout Dragon");
    }

    #[test]
    fn test_level_zero_rejected() {
        assert!(matches!(boss_info(0), Err(Error::InvalidArgument(_))));
    }
}
