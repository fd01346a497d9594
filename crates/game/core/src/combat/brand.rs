//! Weapon and ammunition brands.
//!
//! A [`BrandTable`] maps each [`Brand`] to a [`BrandEffect`] descriptor. The
//! resolver only interprets descriptor kinds, so adding a brand is a new table
//! row rather than a new match arm.

use std::collections::HashMap;

use tracing::debug;

use crate::config::BrandConfig;
use crate::env::{EffectSink, LevelDrain, Relocation, RngOracle};
use crate::model::{Brand, Combatant, CombatantFlags, Element, Holiness, SkillId};

use super::apply::apply_effect;
use super::outcome::{AppliedEffect, Fatality};

// ============================================================================
// Descriptors
// ============================================================================

/// Who a slaying brand is tuned against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlayTarget {
    /// Undead take the full die, demons one and a half.
    Unholy,
    Orcs,
}

/// Relative odds of each distortion outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DistortionWeights {
    pub small: i32,
    pub large: i32,
    pub blink: i32,
    pub teleport: i32,
    pub defeat: i32,
    pub nothing: i32,
}

impl Default for DistortionWeights {
    fn default() -> Self {
        Self {
            small: 9,
            large: 6,
            blink: 4,
            teleport: 4,
            defeat: 2,
            nothing: 2,
        }
    }
}

impl DistortionWeights {
    pub fn total(&self) -> i32 {
        self.small + self.large + self.blink + self.teleport + self.defeat + self.nothing
    }
}

/// What a brand does on a landed, damaging blow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BrandEffect {
    #[default]
    Inert,
    /// Bonus damage scaled by the defender's resistance to the element.
    Elemental(Element),
    /// Occasional burst of sparks that ignores flyers.
    Electrocution,
    /// Permanent level loss, no bonus damage.
    Drain,
    /// Heals the attacker from natural defenders.
    Vampiric,
    Venom,
    Distortion(DistortionWeights),
    Slaying(SlayTarget),
    /// Heavy bonus against the undead.
    Disruption,
    /// Necromancy-scaled bonus against the living.
    Pain,
    Confusion { turns: i32 },
    Vorpal,
    /// Read by the speed stage; no effect on the defender.
    Haste,
}

/// Brand descriptors keyed by brand.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BrandTable {
    entries: HashMap<Brand, BrandEffect>,
}

impl BrandTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The stock brand set.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table
            .insert(Brand::Flaming, BrandEffect::Elemental(Element::Fire))
            .insert(Brand::Freezing, BrandEffect::Elemental(Element::Cold))
            .insert(Brand::Electrocution, BrandEffect::Electrocution)
            .insert(Brand::Venom, BrandEffect::Venom)
            .insert(Brand::Draining, BrandEffect::Drain)
            .insert(Brand::Vampiric, BrandEffect::Vampiric)
            .insert(
                Brand::Distortion,
                BrandEffect::Distortion(DistortionWeights::default()),
            )
            .insert(Brand::HolyWrath, BrandEffect::Slaying(SlayTarget::Unholy))
            .insert(Brand::OrcSlaying, BrandEffect::Slaying(SlayTarget::Orcs))
            .insert(Brand::Vorpal, BrandEffect::Vorpal)
            .insert(Brand::Pain, BrandEffect::Pain)
            .insert(Brand::Disruption, BrandEffect::Disruption)
            .insert(Brand::Speed, BrandEffect::Haste)
            .insert(Brand::Confusion, BrandEffect::Confusion { turns: 5 });
        table
    }

    pub fn insert(&mut self, brand: Brand, effect: BrandEffect) -> &mut Self {
        self.entries.insert(brand, effect);
        self
    }

    /// Descriptor for `brand`; unknown brands are inert.
    pub fn effect(&self, brand: Brand) -> BrandEffect {
        self.entries.get(&brand).copied().unwrap_or_default()
    }

    /// Whether `brand` halves weapon recovery.
    pub fn hastes(&self, brand: Brand) -> bool {
        self.effect(brand) == BrandEffect::Haste
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BrandTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// What the brand added to one slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BrandResult {
    pub bonus_damage: i32,
    pub effects: Vec<AppliedEffect>,
    pub fatality: Option<Fatality>,
}

/// Slot facts the brand needs.
#[derive(Clone, Copy, Debug)]
pub struct BrandContext {
    pub brand: Brand,
    /// Damage the slot dealt after armour.
    pub dealt: i32,
    /// Skill of the weapon carrying the brand.
    pub weapon_skill: i32,
}

/// Elemental bonus: `d(dealt)/2 + 1`, divided by `1 + res²` when resisted,
/// doubled when vulnerable, zero when immune.
pub fn elemental_bonus(
    dealt: i32,
    resist: i32,
    config: &BrandConfig,
    rng: &mut impl RngOracle,
) -> i32 {
    if resist >= config.immune_level {
        return 0;
    }
    let base = rng.roll_uniform(dealt) / 2 + 1;
    match resist {
        r if r > 0 => base / (1 + r * r),
        r if r < 0 => base * 2,
        _ => base,
    }
}

/// Negative-energy losses: a hit die one time in five, and a few points of
/// both maximum and current hit points.
pub fn roll_level_drain(rng: &mut impl RngOracle) -> LevelDrain {
    LevelDrain {
        hit_dice: i32::from(rng.one_in(5)),
        max_hp: 2 + rng.roll_uniform(3),
        hp: 2 + rng.roll_uniform(3),
    }
}

/// Resolves the brand of a landed slot, applying its side effects.
///
/// Nothing happens unless the slot dealt damage.
pub fn resolve_brand(
    ctx: &BrandContext,
    table: &BrandTable,
    attacker: &mut Combatant,
    defender: &mut Combatant,
    config: &BrandConfig,
    sink: &mut impl EffectSink,
    rng: &mut impl RngOracle,
) -> BrandResult {
    let mut result = BrandResult::default();
    if ctx.dealt <= 0 {
        return result;
    }

    let dealt = ctx.dealt;
    let effect = table.effect(ctx.brand);
    let target = defender.id;

    match effect {
        BrandEffect::Inert | BrandEffect::Haste => {}

        BrandEffect::Elemental(element) => {
            result.bonus_damage = elemental_bonus(dealt, defender.resist(element), config, rng);
        }

        BrandEffect::Electrocution => {
            if !defender.has_flag(CombatantFlags::FLIES)
                && defender.resist(Element::Electricity) <= 0
                && rng.one_in(3)
            {
                result.bonus_damage = rng.roll_avg(28, 3);
            }
        }

        BrandEffect::Drain => {
            if defender.resist(Element::Negative) <= 0 && !rng.one_in(3) {
                let drain = roll_level_drain(rng);
                let applied = apply_effect(AppliedEffect::LevelDrained { target, drain }, defender, sink);
                result.effects.push(applied);
            }
        }

        BrandEffect::Vampiric => {
            if defender.holiness == Holiness::Natural
                && defender.resist(Element::Negative) <= 0
                && attacker.hp < attacker.max_hp
                && !rng.one_in(5)
            {
                let amount = 1 + rng.roll_uniform(dealt);
                let applied = apply_effect(
                    AppliedEffect::Healed {
                        target: attacker.id,
                        amount,
                    },
                    attacker,
                    sink,
                );
                result.effects.push(applied);
            }
        }

        BrandEffect::Venom => {
            let fail_one_in = config.venom_base + ctx.weapon_skill / config.venom_skill_divisor.max(1);
            if defender.resist(Element::Poison) <= 0 && !rng.one_in(fail_one_in) {
                let applied = apply_effect(
                    AppliedEffect::Poisoned {
                        target,
                        amount: config.venom_poison,
                    },
                    defender,
                    sink,
                );
                result.effects.push(applied);
            }
        }

        BrandEffect::Distortion(weights) => distort(&weights, defender, &mut result, sink, rng),

        BrandEffect::Slaying(SlayTarget::Unholy) => {
            result.bonus_damage = match defender.holiness {
                Holiness::Undead => 1 + rng.roll_uniform(dealt),
                Holiness::Demonic => 1 + rng.roll_uniform(dealt * 15) / 10,
                Holiness::Natural | Holiness::Holy => 0,
            };
        }

        BrandEffect::Slaying(SlayTarget::Orcs) => {
            if defender.has_flag(CombatantFlags::ORCISH) {
                result.bonus_damage = 1 + rng.roll_uniform(dealt);
            }
        }

        BrandEffect::Disruption => {
            if defender.is_undead() && !rng.one_in(3) {
                result.bonus_damage = rng.roll_avg(1 + dealt * 3, 3);
            }
        }

        BrandEffect::Pain => {
            let necromancy = attacker.skill(SkillId::Necromancy);
            if defender.resist(Element::Negative) <= 0 && rng.roll_uniform(8) <= necromancy {
                result.bonus_damage = rng.roll_uniform(1 + necromancy);
            }
        }

        BrandEffect::Confusion { turns } => {
            let applied = apply_effect(AppliedEffect::Confused { target, turns }, defender, sink);
            result.effects.push(applied);
        }

        BrandEffect::Vorpal => {
            result.bonus_damage = 1 + rng.roll_uniform(dealt) / 2;
        }
    }

    debug!(
        brand = %ctx.brand,
        dealt,
        bonus = result.bonus_damage,
        effects = result.effects.len(),
        "brand"
    );

    result
}

fn distort(
    weights: &DistortionWeights,
    defender: &mut Combatant,
    result: &mut BrandResult,
    sink: &mut impl EffectSink,
    rng: &mut impl RngOracle,
) {
    let target = defender.id;

    if defender.has_flag(CombatantFlags::DISTORTION_AFFINITY) {
        if rng.one_in(5) {
            let amount = 1 + rng.roll_avg(7, 2);
            let applied = apply_effect(AppliedEffect::Healed { target, amount }, defender, sink);
            result.effects.push(applied);
        }
        return;
    }

    let mut pick = rng.roll_uniform(weights.total());

    pick -= weights.small;
    if pick < 0 {
        result.bonus_damage = 1 + rng.roll_avg(7, 2);
        return;
    }
    pick -= weights.large;
    if pick < 0 {
        result.bonus_damage = 3 + rng.roll_avg(24, 2);
        return;
    }

    let relocation = if pick < weights.blink {
        Some(Relocation::Blink)
    } else if pick < weights.blink + weights.teleport {
        Some(Relocation::Teleport)
    } else {
        None
    };
    if let Some(mode) = relocation {
        let applied = apply_effect(AppliedEffect::Relocated { target, mode }, defender, sink);
        result.effects.push(applied);
        return;
    }

    pick -= weights.blink + weights.teleport;
    if pick < weights.defeat {
        let applied = apply_effect(AppliedEffect::Defeated { target }, defender, sink);
        result.effects.push(applied);
        result.fatality = Some(Fatality::InstantDefeat);
    }
}
