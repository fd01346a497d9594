//! Damage calculation.
//!
//! Every stage is a pure function over the two combatants and the shared RNG
//! stream. Intermediate values may go negative; only the final value is
//! clamped.

use tracing::debug;

use crate::config::{DamageConfig, DamageFormula, StatScaling};
use crate::env::RngOracle;
use crate::model::{Combatant, SkillId, Transformation, Weapon, WeaponTraits};

use super::outcome::DamageRoll;
use super::stab::StabTier;

// ============================================================================
// Helpers
// ============================================================================

/// Compresses `value` above `first`: each `stepping` band up to `last` only
/// counts half. `ceiling` caps the result.
///
/// # Formula
///
/// ```text
/// for step in first..=last (by stepping):
///     if value > step: value = (value - step) / 2 + step
/// ```
pub fn stepdown_value(
    value: i32,
    stepping: i32,
    first: i32,
    last: i32,
    ceiling: Option<i32>,
) -> i32 {
    if let Some(cap) = ceiling
        && cap < first
    {
        return cap;
    }
    if value <= first {
        return value;
    }

    let mut result = value;
    let mut step = first;
    while step <= last {
        if result > step {
            result = (result - step) / 2 + step;
        } else {
            break;
        }
        step += stepping.max(1);
    }

    ceiling.map_or(result, |cap| result.min(cap))
}

/// Scales `damage` by a stat-dependent multiplier centred on the neutral
/// band `low..=high`.
pub fn stat_modify(damage: i32, stat: i32, scaling: &StatScaling, rng: &mut impl RngOracle) -> i32 {
    let mut multiplier = scaling.base;
    if stat > scaling.high {
        multiplier += rng.roll_uniform(stat - scaling.high) * scaling.bonus_mul / scaling.bonus_div;
    } else if stat < scaling.low {
        multiplier -= rng.roll_uniform(scaling.low - stat) * scaling.penalty_mul / scaling.penalty_div;
    }
    damage * multiplier / scaling.base
}

/// Multiplies by `(divisor + d(skill + 1)) / divisor`.
fn skill_scale(damage: i32, skill: i32, divisor: i32, rng: &mut impl RngOracle) -> i32 {
    damage * (divisor + rng.roll_uniform(skill + 1)) / divisor
}

/// Weapon to-damage enchantment: positive pluses are rolled, negative ones
/// always cost at least a point.
fn enchantment_term(plus: i32, rng: &mut impl RngOracle) -> i32 {
    if plus >= 0 {
        rng.roll_uniform(1 + plus)
    } else {
        -(1 + rng.roll_uniform(-plus))
    }
}

/// Bare-handed damage die, including transformations.
pub fn unarmed_base_damage(attacker: &Combatant) -> i32 {
    let stats = &attacker.stats;
    let base = match attacker.transformation {
        Transformation::None => {
            3 + i32::from(attacker.body.claws) * 2 + attacker.body.bare_hand_bonus
        }
        Transformation::Spider | Transformation::Lich => 5,
        Transformation::IceBeast => 12,
        Transformation::BladeHands => 12 + stats.strength / 4 + stats.dexterity / 4,
        Transformation::Statue => 12 + stats.strength,
        Transformation::Dragon | Transformation::SerpentOfHell => 20 + stats.strength,
        Transformation::Air => return 0,
    };
    base + attacker.skill(SkillId::UnarmedCombat)
}

// ============================================================================
// Stabbing
// ============================================================================

/// Short-blade bonus added before the stab multipliers.
fn short_blade_bonus(attacker: &Combatant, weapon: &Weapon) -> i32 {
    let stabbing = attacker.skill(SkillId::Stabbing);
    let mut bonus = attacker.stats.dexterity * (stabbing + 1) / 5;
    if !weapon.traits.contains(WeaponTraits::DAGGER) {
        bonus /= 2;
    }
    stepdown_value(bonus, 10, 10, 30, Some(30))
}

/// Stab multiplier chain.
///
/// # Formula
///
/// ```text
/// short blades: damage += stepdown(dex * (stab + 1) / 5)
/// short/long:   damage *= (10 + stab / (tier + [0 short | 1 long])) / 10
/// all:          damage *= (12 + stab / tier) / 12
/// ```
pub fn apply_stab(damage: i32, attacker: &Combatant, weapon: Option<&Weapon>, tier: StabTier) -> i32 {
    let divisor = tier.value();
    if divisor == 0 {
        return damage;
    }

    let stabbing = attacker.skill(SkillId::Stabbing);
    let mut damage = damage.max(1);

    if let Some(weapon) = weapon {
        let short = weapon.is_short_blade();
        if short {
            damage += short_blade_bonus(attacker, weapon);
        }
        if short || weapon.is_long_blade() {
            let tier_div = divisor + if short { 0 } else { 1 };
            damage = damage * (10 + stabbing / tier_div) / 10;
        }
    }

    damage * (12 + stabbing / divisor) / 12
}

// ============================================================================
// Armour
// ============================================================================

/// Subtracts the defender's armour roll from `damage`.
///
/// Stabs first shave `d(stab / tier)` off the armour class. `die_size`
/// feeds the heavy-armour minimum, which only a player defender in heavy body
/// armour enjoys.
pub fn mitigate(
    damage: i32,
    defender: &Combatant,
    attacker: &Combatant,
    tier: StabTier,
    die_size: i32,
    config: &DamageConfig,
    rng: &mut impl RngOracle,
) -> i32 {
    let mut ac = defender.armour_class();
    if ac <= 0 {
        return damage;
    }

    if tier.is_stab() {
        ac -= rng.roll_uniform(attacker.skill(SkillId::Stabbing) / tier.value());
        if ac <= 0 {
            return damage;
        }
    }

    let mut reduction = rng.roll_uniform(ac + 1);

    if defender.is_player()
        && let Some(armour) = defender.body_armour
        && !armour.is_light()
    {
        let percent = (2 * (defender.skill(SkillId::Armour) + armour.armour_class))
            .min(config.heavy_armour_max_percent);
        let minimum = (1 + die_size * percent / 100).min(ac / 2);
        reduction = reduction.max(minimum);
    }

    damage - reduction
}

// ============================================================================
// Player Damage
// ============================================================================

/// Per-slot inputs for the player's damage chain.
#[derive(Clone, Copy, Debug)]
pub struct DamageInputs<'w> {
    /// Damage die before stat scaling.
    pub base: i32,
    pub formula: DamageFormula,
    /// Wielded weapon, for enchantment and the stab chain.
    pub weapon: Option<&'w Weapon>,
    /// Skill scaling the rolled die, if any.
    pub skill: Option<SkillId>,
    /// Strength weight feeding the stat blend.
    pub str_weight: i32,
    pub water_attack: bool,
    pub hand_half: bool,
    pub stab: StabTier,
}

impl<'w> DamageInputs<'w> {
    /// Main-hand slot with a weapon or bare hands.
    pub fn main_hand(
        attacker: &Combatant,
        weapon: Option<&'w Weapon>,
        str_weight: i32,
        formula: DamageFormula,
    ) -> Self {
        let (base, skill) = match weapon {
            Some(weapon) => (weapon.damage, Some(weapon.skill)),
            None => (unarmed_base_damage(attacker), None),
        };
        Self {
            base,
            formula,
            weapon,
            skill,
            str_weight,
            water_attack: false,
            hand_half: false,
            stab: StabTier::None,
        }
    }

    /// Kick, headbutt, tail-slap or punch.
    pub fn auxiliary(base: i32, str_weight: i32, formula: DamageFormula) -> Self {
        Self {
            base,
            formula,
            weapon: None,
            skill: Some(SkillId::UnarmedCombat),
            str_weight,
            water_attack: false,
            hand_half: false,
            stab: StabTier::None,
        }
    }
}

/// Rolls the player's damage for one landed slot.
///
/// # Formula
///
/// ```text
/// scaled   = stat_modify(base) + (water ? avg(d10, d11) : 0)
/// rolled   = 1 + d(scaled)
/// damage   = rolled * skill mult * fighting mult + might + plus (+ d(3) h&h)
/// damage   = stab chain (if stabbing)
/// final    = max(0, damage - armour roll)
/// ```
pub fn roll_player_damage(
    attacker: &Combatant,
    defender: &Combatant,
    inputs: &DamageInputs<'_>,
    config: &DamageConfig,
    rng: &mut impl RngOracle,
) -> DamageRoll {
    let formula = &inputs.formula;
    let stat = attacker.stats.to_damage_base(inputs.str_weight);

    let mut scaled = stat_modify(inputs.base, stat, &formula.stat, rng);
    if inputs.water_attack {
        scaled += rng.roll_avg(config.player_water_die, config.player_water_rolls);
    }

    let rolled = if scaled > 0 { 1 + rng.roll_uniform(scaled) } else { 0 };

    let mut damage = rolled;
    if let Some(skill) = inputs.skill {
        damage = skill_scale(damage, attacker.skill(skill), formula.weapon_skill_divisor, rng);
    }
    damage = skill_scale(
        damage,
        attacker.skill(SkillId::Fighting),
        formula.fighting_divisor,
        rng,
    );

    if attacker.has_might() {
        damage += 1 + rng.roll_uniform(config.might_die);
    }

    if let Some(weapon) = inputs.weapon {
        damage += enchantment_term(weapon.to_dam, rng);
        if inputs.hand_half {
            damage += rng.roll_uniform(3);
        }
    }

    let pre_stab = damage;
    let pre_armour = apply_stab(damage, attacker, inputs.weapon, inputs.stab);
    let final_damage = mitigate(pre_armour, defender, attacker, inputs.stab, scaled, config, rng).max(0);

    debug!(
        base = inputs.base,
        scaled, rolled, pre_stab, pre_armour, final_damage, "player damage"
    );

    DamageRoll {
        base: inputs.base,
        scaled,
        rolled,
        pre_stab,
        pre_armour,
        final_damage,
    }
}

// ============================================================================
// Monster Damage
// ============================================================================

/// Rolls a monster's damage for one landed natural-attack slot.
///
/// # Formula
///
/// ```text
/// weapon   = d(weapon.damage) + plus term - (1 + d(3))    (melee weapons only)
/// damage   = weapon + 1 + d(natural)
/// damage  *= water ? 2 : 1
/// final    = max(0, stab chain(damage) - armour roll)
/// ```
pub fn roll_monster_damage(
    attacker: &Combatant,
    defender: &Combatant,
    natural: i32,
    weapon: Option<&Weapon>,
    water_attack: bool,
    stab: StabTier,
    config: &DamageConfig,
    rng: &mut impl RngOracle,
) -> DamageRoll {
    let mut die_size = natural;
    let mut damage = 0;

    let weapon = weapon.filter(|w| !w.is_launcher());
    if let Some(weapon) = weapon {
        die_size += weapon.damage;
        damage += rng.roll_uniform(weapon.damage);
        damage += enchantment_term(weapon.to_dam, rng);
        damage -= 1 + rng.roll_uniform(config.monster_weapon_penalty_die);
    }

    let rolled = 1 + rng.roll_uniform(natural);
    damage += rolled;

    if water_attack {
        damage *= config.water_multiplier;
    }

    let pre_stab = damage;
    let pre_armour = apply_stab(damage, attacker, weapon, stab);
    let final_damage = mitigate(pre_armour, defender, attacker, stab, die_size, config, rng).max(0);

    debug!(natural, die_size, pre_stab, pre_armour, final_damage, "monster damage");

    DamageRoll {
        base: die_size,
        scaled: die_size,
        rolled,
        pre_stab,
        pre_armour,
        final_damage,
    }
}
