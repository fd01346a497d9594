//! Tunable constants of the combat pipeline.
//!
//! Every field has a default matching the classic rules, and every section
//! deserializes with `#[serde(default)]`, so a config file only needs to name
//! the values it changes. [`CombatConfig::validate`] rejects tunables the
//! pipeline cannot run with.

use crate::error::ConfigError;

/// Complete set of combat tunables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    pub hit: HitConfig,
    pub damage: DamageConfig,
    pub stab: StabConfig,
    pub speed: SpeedConfig,
    pub brand: BrandConfig,
}

// ============================================================================
// To-hit
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HitConfig {
    /// Flat base of the player's melee accuracy die.
    pub player_base: i32,
    /// Flat base of the player's auxiliary unarmed accuracy die.
    pub aux_base: i32,
    /// Unarmed baseline added in place of a weapon skill roll.
    pub unarmed_bonus: i32,
    pub monster_vs_player_base: i32,
    pub monster_vs_player_hd_weight: i32,
    pub monster_vs_monster_base: i32,
    pub monster_vs_monster_hd_weight: i32,
    /// 1-in-N natural hit for player attackers and monsters attacking the player.
    pub natural_hit: i32,
    /// 1-in-N natural hit for monster vs monster.
    pub monster_natural_hit: i32,
    pub water_bonus: i32,
    pub invisible_self_penalty: i32,
    /// Energy at or below which a defender counts as mid-recovery.
    pub helpless_energy: i32,
    /// Player attackers miss a helpless defender 1-in-(this + stabbing).
    pub helpless_miss_base: i32,
    /// Monster attackers miss a helpless defender 1-in-N.
    pub monster_helpless_miss: i32,
    pub evasion_limit: i32,
    pub seen_attacker_penalty: i32,
    pub unseen_attacker_penalty: i32,
    pub delayed_penalty: i32,
    pub block_base: i32,
    pub block_repeat_weight: i32,
}

impl Default for HitConfig {
    fn default() -> Self {
        Self {
            player_base: 15,
            aux_base: 13,
            unarmed_bonus: 2,
            monster_vs_player_base: 16,
            monster_vs_player_hd_weight: 1,
            monster_vs_monster_base: 20,
            monster_vs_monster_hd_weight: 5,
            natural_hit: 30,
            monster_natural_hit: 20,
            water_bonus: 5,
            invisible_self_penalty: 5,
            helpless_energy: 60,
            helpless_miss_base: 10,
            monster_helpless_miss: 20,
            evasion_limit: 40,
            seen_attacker_penalty: 2,
            unseen_attacker_penalty: 14,
            delayed_penalty: 5,
            block_base: 15,
            block_repeat_weight: 5,
        }
    }
}

// ============================================================================
// Damage
// ============================================================================

/// Stat multiplier centred on the neutral band `[low, high]`.
///
/// Above `high` the multiplier grows by `d(stat - high) * bonus_mul /
/// bonus_div`; below `low` it shrinks by `d(low - stat) * penalty_mul /
/// penalty_div`. The result is `damage * multiplier / base`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatScaling {
    pub base: i32,
    pub high: i32,
    pub low: i32,
    pub bonus_mul: i32,
    pub bonus_div: i32,
    pub penalty_mul: i32,
    pub penalty_div: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageFormula {
    pub stat: StatScaling,
    pub weapon_skill_divisor: i32,
    pub fighting_divisor: i32,
}

impl DamageFormula {
    pub const MAIN: Self = Self {
        stat: StatScaling {
            base: 78,
            high: 11,
            low: 9,
            bonus_mul: 2,
            bonus_div: 1,
            penalty_mul: 3,
            penalty_div: 1,
        },
        weapon_skill_divisor: 25,
        fighting_divisor: 30,
    };

    pub const AUXILIARY: Self = Self {
        stat: StatScaling {
            base: 10,
            high: 11,
            low: 9,
            bonus_mul: 1,
            bonus_div: 3,
            penalty_mul: 1,
            penalty_div: 2,
        },
        weapon_skill_divisor: 25,
        fighting_divisor: 40,
    };
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DamageConfig {
    /// Keys left out of a `[damage.main]` table keep the [`DamageFormula::MAIN`] value.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "formula_serde::main"))]
    pub main: DamageFormula,
    /// Keys left out of a `[damage.auxiliary]` table keep the [`DamageFormula::AUXILIARY`] value.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "formula_serde::auxiliary"))]
    pub auxiliary: DamageFormula,
    /// Might adds `1 + d(might_die)`.
    pub might_die: i32,
    /// Monster attacks from the water multiply their damage by this.
    pub water_multiplier: i32,
    /// Player attacks from the water add `roll_avg(player_water_die, player_water_rolls)`
    /// to the die before it is rolled.
    pub player_water_die: i32,
    pub player_water_rolls: i32,
    /// Cap on the heavy-armour minimum reduction, in percent of the die.
    pub heavy_armour_max_percent: i32,
    /// Monster weapons lose `1 + d(this)` before the natural die is added.
    pub monster_weapon_penalty_die: i32,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            main: DamageFormula::MAIN,
            auxiliary: DamageFormula::AUXILIARY,
            might_die: 10,
            water_multiplier: 2,
            player_water_die: 10,
            player_water_rolls: 2,
            heavy_armour_max_percent: 50,
            monster_weapon_penalty_die: 3,
        }
    }
}

/// Partial `[damage.*]` tables laid over the formula constants.
#[cfg(feature = "serde")]
mod formula_serde {
    use serde::{Deserialize, Deserializer};

    use super::DamageFormula;

    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct StatPatch {
        base: Option<i32>,
        high: Option<i32>,
        low: Option<i32>,
        bonus_mul: Option<i32>,
        bonus_div: Option<i32>,
        penalty_mul: Option<i32>,
        penalty_div: Option<i32>,
    }

    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct FormulaPatch {
        stat: StatPatch,
        weapon_skill_divisor: Option<i32>,
        fighting_divisor: Option<i32>,
    }

    impl FormulaPatch {
        fn over(self, mut formula: DamageFormula) -> DamageFormula {
            let stat = &mut formula.stat;
            stat.base = self.stat.base.unwrap_or(stat.base);
            stat.high = self.stat.high.unwrap_or(stat.high);
            stat.low = self.stat.low.unwrap_or(stat.low);
            stat.bonus_mul = self.stat.bonus_mul.unwrap_or(stat.bonus_mul);
            stat.bonus_div = self.stat.bonus_div.unwrap_or(stat.bonus_div);
            stat.penalty_mul = self.stat.penalty_mul.unwrap_or(stat.penalty_mul);
            stat.penalty_div = self.stat.penalty_div.unwrap_or(stat.penalty_div);
            formula.weapon_skill_divisor = self.weapon_skill_divisor.unwrap_or(formula.weapon_skill_divisor);
            formula.fighting_divisor = self.fighting_divisor.unwrap_or(formula.fighting_divisor);
            formula
        }
    }

    pub fn main<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DamageFormula, D::Error> {
        FormulaPatch::deserialize(deserializer).map(|patch| patch.over(DamageFormula::MAIN))
    }

    pub fn auxiliary<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DamageFormula, D::Error> {
        FormulaPatch::deserialize(deserializer).map(|patch| patch.over(DamageFormula::AUXILIARY))
    }
}

// ============================================================================
// Stabbing
// ============================================================================

/// How simultaneous stab conditions pick a tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StabOrder {
    /// Highest applicable tier wins: unaware, then distracted, then sleeping.
    #[default]
    Priority,
    /// Checks run unaware, confused, fleeing, sleeping and the last match
    /// overwrites earlier ones.
    Sequential,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StabConfig {
    pub order: StabOrder,
    /// Gate roll die: a stab triggers when `d(gate_die) <= stabbing + dex`.
    pub gate_die: i32,
    /// Whether stabbing a sleeper can leave it groggy.
    pub stagger: bool,
}

impl Default for StabConfig {
    fn default() -> Self {
        Self {
            order: StabOrder::Priority,
            gate_die: 200,
            stagger: true,
        }
    }
}

// ============================================================================
// Speed
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpeedConfig {
    /// Absolute fastest recovery, in tenths of a turn.
    pub min_delay: i32,
    pub short_blade_floor: i32,
    pub two_hand_floor: i32,
    /// Hand-and-a-half grip only speeds attacks slower than this.
    pub hand_half_threshold: i32,
    pub unarmed_delay: i32,
    pub unarmed_floor: i32,
    pub unarmed_skill_divisor: i32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            min_delay: 3,
            short_blade_floor: 5,
            two_hand_floor: 7,
            hand_half_threshold: 10,
            unarmed_delay: 10,
            unarmed_floor: 5,
            unarmed_skill_divisor: 5,
        }
    }
}

// ============================================================================
// Brands
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BrandConfig {
    /// Resistance level at which elemental brands do nothing.
    pub immune_level: i32,
    /// Venom fails 1-in-(venom_base + weapon_skill / venom_skill_divisor).
    pub venom_base: i32,
    pub venom_skill_divisor: i32,
    pub venom_poison: i32,
    /// Monster attackers check head severing only 1-in-N of the time.
    pub monster_sever_one_in: i32,
    /// Heads stop regrowing at this count.
    pub max_heads: u8,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            immune_level: 3,
            venom_base: 2,
            venom_skill_divisor: 3,
            venom_poison: 1,
            monster_sever_one_in: 4,
            max_heads: 19,
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

impl CombatConfig {
    /// Rejects divisors that are zero or negative.
    ///
    /// Dice sizes and one-in chances of zero are allowed: they roll 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (section, formula) in [("main", &self.damage.main), ("auxiliary", &self.damage.auxiliary)] {
            let stat = &formula.stat;
            for (field, value) in [
                ("stat.base", stat.base),
                ("stat.bonus_div", stat.bonus_div),
                ("stat.penalty_div", stat.penalty_div),
                ("weapon_skill_divisor", formula.weapon_skill_divisor),
                ("fighting_divisor", formula.fighting_divisor),
            ] {
                if value <= 0 {
                    return Err(ConfigError::NonPositive {
                        section: "damage",
                        field: format!("{section}.{field}"),
                        value,
                    });
                }
            }
        }

        let checks = [
            ("speed", "unarmed_skill_divisor", self.speed.unarmed_skill_divisor),
            ("brand", "venom_skill_divisor", self.brand.venom_skill_divisor),
        ];
        for (section, field, value) in checks {
            if value <= 0 {
                return Err(ConfigError::NonPositive {
                    section,
                    field: field.to_owned(),
                    value,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_rules() {
        let config = CombatConfig::default();
        assert_eq!(config.hit.natural_hit, 30);
        assert_eq!(config.damage.main.stat.base, 78);
        assert_eq!(config.damage.auxiliary.fighting_divisor, 40);
        assert_eq!(config.stab.order, StabOrder::Priority);
        assert_eq!(config.speed.min_delay, 3);
    }

    #[test]
    fn defaults_validate() {
        assert_eq!(CombatConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_divisors_are_rejected() {
        let mut config = CombatConfig::default();
        config.damage.main.weapon_skill_divisor = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::NonPositive {
                section: "damage",
                field: "main.weapon_skill_divisor".into(),
                value: 0,
            }
        );

        let mut config = CombatConfig::default();
        config.damage.auxiliary.stat.penalty_div = -1;
        assert!(config.validate().is_err());

        let mut config = CombatConfig::default();
        config.speed.unarmed_skill_divisor = 0;
        assert!(config.validate().is_err());
    }
}
