//! Attack recovery time.
//!
//! The player pays for an attack in action time scaled by the weapon's
//! recovery; monsters instead gain or lose energy per weapon blow.

use tracing::trace;

use crate::config::SpeedConfig;
use crate::env::RngOracle;
use crate::model::{Combatant, CombatantFlags, Shield, SkillId, Weapon};

/// Effect of one action on the attacker's timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedAdjustment {
    /// Recovery in tenths of a normal action (10 = normal).
    pub recovery_tenths: i32,
    /// Energy added to (positive) or removed from the attacker.
    pub energy_delta: i32,
}

impl SpeedAdjustment {
    pub const NORMAL: Self = Self {
        recovery_tenths: 10,
        energy_delta: 0,
    };

    /// Scales a base action time by the recovery, never below one tick.
    pub fn apply(&self, base_time: i32) -> i32 {
        (base_time * self.recovery_tenths / 10).max(1)
    }
}

impl Default for SpeedAdjustment {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Recovery of a wielded weapon after skill, before the shield.
///
/// # Formula
///
/// ```text
/// delay = speed - skill / 2
/// floor = max(3, min(speed / 2, 5 short blades, 7 two hands))
/// delay = max(floor, delay - [h&h and delay > 10])
/// delay = hasted ? (delay + 1) / 2 : delay
/// ```
pub fn weapon_delay(
    attacker: &Combatant,
    weapon: &Weapon,
    hand_half: bool,
    hasted: bool,
    config: &SpeedConfig,
) -> i32 {
    let mut delay = weapon.speed - attacker.skill(weapon.skill) / 2;

    let mut floor = weapon.speed / 2;
    if weapon.is_short_blade() {
        floor = floor.min(config.short_blade_floor);
    }
    if weapon.hands == crate::model::Hands::Two || hand_half {
        floor = floor.min(config.two_hand_floor);
    }
    floor = floor.max(config.min_delay);

    if hand_half && delay > config.hand_half_threshold {
        delay -= 1;
    }
    delay = delay.max(floor);

    if hasted {
        delay = (delay + 1) / 2;
    }
    delay
}

/// Recovery of a bare-handed attack. A practised, unburdened fighter
/// strikes faster unless heavy armour gets in the way.
pub fn unarmed_delay(
    attacker: &Combatant,
    heavy_armour: i32,
    config: &SpeedConfig,
    rng: &mut impl RngOracle,
) -> i32 {
    if attacker.has_flag(CombatantFlags::UNENCUMBERED) && rng.one_in(heavy_armour + 1) {
        let skilled = config.unarmed_delay
            - attacker.skill(SkillId::UnarmedCombat) / config.unarmed_skill_divisor.max(1);
        skilled.max(config.unarmed_floor)
    } else {
        config.unarmed_delay
    }
}

/// Extra recovery for carrying a shield, shrinking with shields skill.
pub fn shield_delay(attacker: &Combatant, rng: &mut impl RngOracle) -> i32 {
    let shields = attacker.skill(SkillId::Shields);
    let mut delay = 0;
    match attacker.shield {
        Some(Shield::Large) => {
            if shields <= 10 + rng.roll_uniform(17) {
                delay += 1;
            }
            if shields <= 3 + rng.roll_uniform(17) {
                delay += 1;
            }
        }
        Some(Shield::Shield) => {
            if shields <= 3 + rng.roll_uniform(17) {
                delay += 1;
            }
        }
        Some(Shield::Buckler) | None => {}
    }
    delay
}

/// Timing of a player melee action.
pub fn player_speed(
    attacker: &Combatant,
    weapon: Option<&Weapon>,
    hand_half: bool,
    hasted: bool,
    heavy_armour: i32,
    config: &SpeedConfig,
    rng: &mut impl RngOracle,
) -> SpeedAdjustment {
    let base = match weapon {
        Some(weapon) => weapon_delay(attacker, weapon, hand_half, hasted, config),
        None => unarmed_delay(attacker, heavy_armour, config, rng),
    };
    let recovery = (base + shield_delay(attacker, rng)).max(config.min_delay);
    trace!(base, recovery, "player recovery");

    SpeedAdjustment {
        recovery_tenths: recovery,
        energy_delta: 0,
    }
}

/// Energy change for one monster weapon blow.
///
/// `weapon_blows` counts earlier weapon blows this action; only the first
/// counts fully, later ones a third as much.
pub fn monster_weapon_energy(weapon: &Weapon, hasted: bool, weapon_blows: usize) -> i32 {
    let mut speed = weapon.speed;
    if hasted {
        speed = (speed + 1) / 2;
    }
    if weapon_blows > 0 {
        speed = (20 + speed) / 3;
    }
    -((speed - 10) / 2)
}
