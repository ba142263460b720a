//! Stats and stat stages.
//!
//! Permanent stats ([`Stat`]) are computed once from base values and level.
//! Battle stats ([`BattleStat`]) carry a stage in `[-6, 6]` that scales the
//! permanent value while the combatant is on the field. Accuracy and evasion
//! have stages but no permanent value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest reachable stage.
pub const MIN_STAGE: i8 = -6;
/// Highest reachable stage.
pub const MAX_STAGE: i8 = 6;

/// A permanent stat.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpAttack,
    SpDefense,
    Speed,
}

/// A stat that carries an in-battle stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum BattleStat {
    Attack,
    Defense,
    SpAttack,
    SpDefense,
    Speed,
    Accuracy,
    Evasion,
}

impl BattleStat {
    /// Every battle stat, in stage-array order.
    pub const ALL: [BattleStat; 7] = [
        BattleStat::Attack,
        BattleStat::Defense,
        BattleStat::SpAttack,
        BattleStat::SpDefense,
        BattleStat::Speed,
        BattleStat::Accuracy,
        BattleStat::Evasion,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// Returns the permanent stat this stage scales, if any.
    #[must_use]
    pub const fn permanent(self) -> Option<Stat> {
        match self {
            BattleStat::Attack => Some(Stat::Attack),
            BattleStat::Defense => Some(Stat::Defense),
            BattleStat::SpAttack => Some(Stat::SpAttack),
            BattleStat::SpDefense => Some(Stat::SpDefense),
            BattleStat::Speed => Some(Stat::Speed),
            BattleStat::Accuracy | BattleStat::Evasion => None,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BattleStat::Attack => "Attack",
            BattleStat::Defense => "Defense",
            BattleStat::SpAttack => "Sp. Atk",
            BattleStat::SpDefense => "Sp. Def",
            BattleStat::Speed => "Speed",
            BattleStat::Accuracy => "accuracy",
            BattleStat::Evasion => "evasiveness",
        }
    }
}

impl fmt::Display for BattleStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Multiplier a stage applies to an attack, defense or speed value.
#[must_use]
pub fn stage_multiplier(stage: i8) -> f64 {
    let stage = f64::from(stage.clamp(MIN_STAGE, MAX_STAGE));
    if stage >= 0.0 {
        (2.0 + stage) / 2.0
    } else {
        2.0 / (2.0 - stage)
    }
}

// =============================================================================
// Base and computed stats
// =============================================================================

/// Species base values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub sp_attack: u32,
    pub sp_defense: u32,
    pub speed: u32,
}

impl BaseStats {
    /// Creates base stats in `hp, atk, def, spa, spd, spe` order.
    #[must_use]
    pub const fn new(
        hp: u32,
        attack: u32,
        defense: u32,
        sp_attack: u32,
        sp_defense: u32,
        speed: u32,
    ) -> Self {
        Self {
            hp,
            attack,
            defense,
            sp_attack,
            sp_defense,
            speed,
        }
    }
}

/// Permanent stats at a given level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    values: [u32; 6],
}

impl StatBlock {
    /// Computes stats from base values and level.
    #[must_use]
    pub fn from_base(base: &BaseStats, level: u32) -> Self {
        let scaled = |value: u32| 2 * value * level / 100;
        Self {
            values: [
                scaled(base.hp) + level + 10,
                scaled(base.attack) + 5,
                scaled(base.defense) + 5,
                scaled(base.sp_attack) + 5,
                scaled(base.sp_defense) + 5,
                scaled(base.speed) + 5,
            ],
        }
    }

    /// Returns one stat.
    #[must_use]
    pub const fn get(&self, stat: Stat) -> u32 {
        self.values[stat as usize]
    }
}

// =============================================================================
// Stages
// =============================================================================

/// Per-combatant stage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatStages {
    stages: [i8; 7],
}

impl StatStages {
    /// Returns the stage of one stat.
    #[must_use]
    pub const fn get(&self, stat: BattleStat) -> i8 {
        self.stages[stat.index()]
    }

    /// Adds `delta` to a stage, clamped to `[-6, 6]`.
    ///
    /// Returns the change actually applied, which is 0 when the stage is
    /// already at the limit.
    pub fn change(&mut self, stat: BattleStat, delta: i8) -> i8 {
        let slot = &mut self.stages[stat.index()];
        let before = *slot;
        *slot = before.saturating_add(delta).clamp(MIN_STAGE, MAX_STAGE);
        *slot - before
    }

    /// Returns how far a stage can still move in the direction of `delta`.
    #[must_use]
    pub fn headroom(&self, stat: BattleStat, delta: i8) -> i8 {
        let current = self.get(stat);
        if delta >= 0 {
            MAX_STAGE - current
        } else {
            current - MIN_STAGE
        }
    }

    /// Resets every stage to zero.
    pub fn reset(&mut self) {
        self.stages = [0; 7];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod stage_tests {
        use super::*;

        #[test]
        fn change_clamps_and_reports_applied_delta() {
            let mut stages = StatStages::default();
            assert_eq!(stages.change(BattleStat::Attack, 4), 4);
            assert_eq!(stages.change(BattleStat::Attack, 4), 2);
            assert_eq!(stages.get(BattleStat::Attack), 6);
            assert_eq!(stages.change(BattleStat::Attack, 1), 0);
        }

        #[test]
        fn negative_changes_floor_at_minus_six() {
            let mut stages = StatStages::default();
            assert_eq!(stages.change(BattleStat::Evasion, -8), -6);
            assert_eq!(stages.headroom(BattleStat::Evasion, -1), 0);
            assert_eq!(stages.headroom(BattleStat::Evasion, 1), 12);
        }

        #[test]
        fn reset_zeroes_everything() {
            let mut stages = StatStages::default();
            for stat in BattleStat::ALL {
                stages.change(stat, 2);
            }
            stages.reset();
            assert_eq!(stages, StatStages::default());
        }

        #[test]
        fn multipliers_follow_two_over_two() {
            assert_eq!(stage_multiplier(0), 1.0);
            assert_eq!(stage_multiplier(2), 2.0);
            assert_eq!(stage_multiplier(6), 4.0);
            assert_eq!(stage_multiplier(-2), 0.5);
            assert_eq!(stage_multiplier(-6), 0.25);
        }
    }

    #[test]
    fn stat_block_formula() {
        let base = BaseStats::new(100, 100, 100, 100, 100, 100);
        let block = StatBlock::from_base(&base, 50);
        assert_eq!(block.get(Stat::Hp), 160);
        assert_eq!(block.get(Stat::Attack), 105);
        assert_eq!(block.get(Stat::Speed), 105);
    }
}
