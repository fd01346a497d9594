//! Species reactive effects.
//!
//! When a monster's blow lands and hurts, its species may poison, paralyse,
//! drain or otherwise afflict the defender. The behaviour lives in a
//! [`SpecialAttackTable`] keyed by [`SpeciesId`]; new species are data rows.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::BrandConfig;
use crate::env::{EffectSink, Relocation, RngOracle};
use crate::model::{Combatant, Element, SpeciesId, StatKind};

use super::apply::apply_effect;
use super::brand::roll_level_drain;
use super::outcome::AppliedEffect;

// ============================================================================
// Descriptors
// ============================================================================

/// When a reactive effect fires.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Trigger {
    #[default]
    Always,
    /// One time in `n`.
    OneIn(i32),
    /// Every time except one in `n`.
    Unless(i32),
    /// A flat `1-in-flat_one_in` chance, or `then` once the blow dealt more
    /// than `damage_over`.
    Scaled {
        flat_one_in: i32,
        damage_over: i32,
        then: Box<Trigger>,
    },
}

impl Trigger {
    pub fn fires(&self, dealt: i32, rng: &mut impl RngOracle) -> bool {
        match self {
            Self::Always => true,
            Self::OneIn(n) => rng.one_in(*n),
            Self::Unless(n) => !rng.one_in(*n),
            Self::Scaled {
                flat_one_in,
                damage_over,
                then,
            } => rng.one_in(*flat_one_in) || (dealt > *damage_over && then.fires(dealt, rng)),
        }
    }

    /// `1-in-flat`, or `1-in-n` above `over` damage.
    pub fn scaled(flat: i32, over: i32, then: Trigger) -> Self {
        Self::Scaled {
            flat_one_in: flat,
            damage_over: over,
            then: Box::new(then),
        }
    }
}

/// How large an effect is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Magnitude {
    Fixed(i32),
    /// `num` dice of `size` sides.
    Dice { num: i32, size: i32 },
    /// `min + d(spread)`.
    Range { min: i32, spread: i32 },
    /// `base + avg(max, rolls)`.
    Avg { base: i32, max: i32, rolls: i32 },
    /// `hd + d(2 * hd)` of the attacker.
    HitDice,
    /// `d(dealt)`.
    OfDamage,
}

impl Magnitude {
    pub fn roll(&self, hit_dice: i32, dealt: i32, rng: &mut impl RngOracle) -> i32 {
        match *self {
            Self::Fixed(n) => n,
            Self::Dice { num, size } => rng.roll_dice(num, size),
            Self::Range { min, spread } => min + rng.roll_uniform(spread),
            Self::Avg { base, max, rolls } => base + rng.roll_avg(max, rolls),
            Self::HitDice => hit_dice + rng.roll_uniform(hit_dice * 2),
            Self::OfDamage => rng.roll_uniform(dealt),
        }
    }
}

/// What a reactive effect does.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReactiveKind {
    Poison(Magnitude),
    Paralysis(Magnitude),
    StatDrain { stat: StatKind, amount: Magnitude },
    Disease(Magnitude),
    LevelDrain,
    Rot(Magnitude),
    /// Extra elemental damage; rolled twice against a vulnerable target.
    Elemental { element: Element, amount: Magnitude },
    /// Corrodes body armour.
    Acid(Magnitude),
    /// Heals the effect's target (normally the attacker).
    LifeSteal(Magnitude),
    Mutation,
    Blink,
    Confusion(Magnitude),
    Slow(Magnitude),
    /// The attacker burns itself out.
    SelfDestruct,
    /// Borrows the reactive effects of one species picked at random.
    Chaos(Vec<SpeciesId>),
}

impl ReactiveKind {
    /// Whether the defender shrugs the effect off before any roll. Effects
    /// aimed at the attacker still depend on what it bit.
    fn resisted(&self, defender: &Combatant, rng: &mut impl RngOracle) -> bool {
        match self {
            Self::Poison(_) | Self::Paralysis(_) => defender.resist(Element::Poison) > 0,
            Self::LevelDrain => defender.resist(Element::Negative) > 0,
            Self::StatDrain { .. } => defender.resist(Element::Negative) > rng.roll_uniform(3),
            Self::Disease(_) | Self::Rot(_) | Self::LifeSteal(_) => defender.is_undead(),
            _ => false,
        }
    }
}

/// Who receives the effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReactiveTarget {
    #[default]
    Defender,
    Attacker,
}

/// One row of a species' reactive effects.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactiveEffect {
    #[cfg_attr(feature = "serde", serde(default))]
    pub trigger: Trigger,
    pub kind: ReactiveKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: ReactiveTarget,
    /// Only fires on this attack slot.
    #[cfg_attr(feature = "serde", serde(default))]
    pub slot: Option<usize>,
}

impl ReactiveEffect {
    pub fn new(trigger: Trigger, kind: ReactiveKind) -> Self {
        Self {
            trigger,
            kind,
            target: ReactiveTarget::Defender,
            slot: None,
        }
    }

    pub fn on_attacker(mut self) -> Self {
        self.target = ReactiveTarget::Attacker;
        self
    }

    pub fn on_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }
}

/// Species → reactive effects.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SpecialAttackTable {
    entries: HashMap<SpeciesId, Vec<ReactiveEffect>>,
}

impl SpecialAttackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small built-in table covering the common reactive families.
    pub fn standard() -> Self {
        use Magnitude::{Fixed, HitDice, OfDamage, Range};
        use ReactiveKind as K;
        use Trigger::{Always, OneIn, Unless};

        let bite = || Trigger::scaled(20, 3, OneIn(4));
        let mut table = Self::new();

        table.insert("giant_ant", vec![ReactiveEffect::new(bite(), K::Poison(Fixed(1)))]);
        table.insert(
            "redback",
            vec![ReactiveEffect::new(
                bite(),
                K::Poison(Magnitude::Avg {
                    base: 3,
                    max: 9,
                    rolls: 2,
                }),
            )],
        );
        table.insert(
            "killer_bee",
            vec![ReactiveEffect::new(Trigger::scaled(20, 2, OneIn(3)), K::Poison(Fixed(1)))],
        );
        table.insert("queen_bee", vec![ReactiveEffect::new(Always, K::Poison(Fixed(2)))]);
        table.insert(
            "snake",
            vec![ReactiveEffect::new(Trigger::scaled(15, 2, OneIn(4)), K::Poison(Fixed(1)))],
        );
        table.insert(
            "yellow_wasp",
            vec![ReactiveEffect::new(
                Trigger::scaled(20, 2, Unless(3)),
                K::Paralysis(Range { min: 1, spread: 3 }),
            )],
        );
        table.insert(
            "necrophage",
            vec![
                ReactiveEffect::new(Trigger::scaled(20, 2, OneIn(3)), K::Rot(Range { min: 2, spread: 3 })),
                ReactiveEffect::new(OneIn(4), K::Disease(Range { min: 50, spread: 100 })),
            ],
        );
        table.insert(
            "giant_mosquito",
            vec![ReactiveEffect::new(Unless(3), K::Disease(Range { min: 50, spread: 100 }))],
        );
        table.insert(
            "wraith",
            vec![ReactiveEffect::new(
                Trigger::Scaled {
                    flat_one_in: 30,
                    damage_over: 5,
                    then: Box::new(OneIn(2)),
                },
                K::LevelDrain,
            )],
        );
        table.insert(
            "fire_elemental",
            vec![ReactiveEffect::new(
                Always,
                K::Elemental {
                    element: Element::Fire,
                    amount: Range { min: 15, spread: 15 },
                },
            )],
        );
        table.insert(
            "fire_vortex",
            vec![
                ReactiveEffect::new(
                    Always,
                    K::Elemental {
                        element: Element::Fire,
                        amount: Range { min: 15, spread: 15 },
                    },
                ),
                ReactiveEffect::new(Always, K::SelfDestruct).on_attacker(),
            ],
        );
        table.insert(
            "ice_beast",
            vec![ReactiveEffect::new(
                Always,
                K::Elemental {
                    element: Element::Cold,
                    amount: HitDice,
                },
            )],
        );
        table.insert(
            "electric_golem",
            vec![ReactiveEffect::new(
                Always,
                K::Elemental {
                    element: Element::Electricity,
                    amount: HitDice,
                },
            )],
        );
        table.insert("acid_blob", vec![ReactiveEffect::new(Always, K::Acid(Fixed(1)))]);
        table.insert(
            "vampire",
            vec![ReactiveEffect::new(Always, K::LifeSteal(OfDamage)).on_attacker()],
        );
        table.insert(
            "shadow",
            vec![ReactiveEffect::new(
                Trigger::scaled(20, 0, OneIn(3)),
                K::StatDrain {
                    stat: StatKind::Strength,
                    amount: Fixed(1),
                },
            )],
        );
        table.insert(
            "phantom",
            vec![ReactiveEffect::new(OneIn(3), K::Blink).on_attacker()],
        );
        table.insert("pulsating_lump", vec![ReactiveEffect::new(OneIn(3), K::Mutation)]);
        table.insert(
            "killer_klown",
            vec![ReactiveEffect::new(
                Always,
                K::Chaos(
                    ["snake", "necrophage", "wraith", "fire_elemental", "ice_beast", "phantom"]
                        .into_iter()
                        .map(SpeciesId::from)
                        .collect(),
                ),
            )],
        );

        table
    }

    pub fn insert(&mut self, species: impl Into<SpeciesId>, effects: Vec<ReactiveEffect>) {
        self.entries.insert(species.into(), effects);
    }

    pub fn effects_for(&self, species: SpeciesId) -> &[ReactiveEffect] {
        self.entries.get(&species).map_or(&[], Vec::as_slice)
    }

    pub fn species(&self) -> impl Iterator<Item = SpeciesId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// What the species added to one slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReactiveResult {
    /// Extra damage to the defender.
    pub bonus_damage: i32,
    pub effects: Vec<AppliedEffect>,
}

/// Slot facts the reactive stage needs.
#[derive(Clone, Copy, Debug)]
pub struct ReactiveContext {
    pub species: SpeciesId,
    pub slot: usize,
    pub dealt: i32,
}

/// Fires the reactive effects of the attacker's species for one slot.
///
/// Nothing happens unless the slot dealt damage.
pub fn resolve_reactive(
    ctx: &ReactiveContext,
    table: &SpecialAttackTable,
    attacker: &mut Combatant,
    defender: &mut Combatant,
    config: &BrandConfig,
    sink: &mut impl EffectSink,
    rng: &mut impl RngOracle,
) -> ReactiveResult {
    let mut result = ReactiveResult::default();
    if ctx.dealt <= 0 {
        return result;
    }

    for effect in table.effects_for(ctx.species) {
        if let ReactiveKind::Chaos(pool) = &effect.kind {
            if pool.is_empty() || !effect.trigger.fires(ctx.dealt, rng) {
                continue;
            }
            let borrowed = pool[rng.roll_uniform(pool.len() as i32) as usize];
            trace!(%borrowed, "chaos");
            // Borrowed rows never chain into another chaos pick.
            for inner in table.effects_for(borrowed) {
                if !matches!(inner.kind, ReactiveKind::Chaos(_)) {
                    fire(inner, ctx, attacker, defender, config, sink, rng, &mut result);
                }
            }
            continue;
        }
        fire(effect, ctx, attacker, defender, config, sink, rng, &mut result);
    }

    debug!(
        species = %ctx.species,
        bonus = result.bonus_damage,
        effects = result.effects.len(),
        "reactive"
    );
    result
}

#[allow(clippy::too_many_arguments)]
fn fire(
    effect: &ReactiveEffect,
    ctx: &ReactiveContext,
    attacker: &mut Combatant,
    defender: &mut Combatant,
    config: &BrandConfig,
    sink: &mut impl EffectSink,
    rng: &mut impl RngOracle,
    result: &mut ReactiveResult,
) {
    if effect.slot.is_some_and(|slot| slot != ctx.slot) {
        return;
    }

    let hit_dice = attacker.hit_dice;
    let dealt = ctx.dealt;

    if effect.kind.resisted(defender, rng) || !effect.trigger.fires(dealt, rng) {
        return;
    }

    let target = match effect.target {
        ReactiveTarget::Defender => defender,
        ReactiveTarget::Attacker => attacker,
    };

    let id = target.id;
    let applied = match &effect.kind {
        ReactiveKind::Poison(m) => AppliedEffect::Poisoned {
            target: id,
            amount: m.roll(hit_dice, dealt, rng),
        },
        ReactiveKind::Paralysis(m) => AppliedEffect::Paralysed {
            target: id,
            turns: m.roll(hit_dice, dealt, rng),
        },
        ReactiveKind::StatDrain { stat, amount } => AppliedEffect::StatDrained {
            target: id,
            stat: *stat,
            amount: amount.roll(hit_dice, dealt, rng),
        },
        ReactiveKind::Disease(m) => AppliedEffect::Diseased {
            target: id,
            turns: m.roll(hit_dice, dealt, rng),
        },
        ReactiveKind::LevelDrain => AppliedEffect::LevelDrained {
            target: id,
            drain: roll_level_drain(rng),
        },
        ReactiveKind::Rot(m) => AppliedEffect::Rotted {
            target: id,
            amount: m.roll(hit_dice, dealt, rng),
        },
        ReactiveKind::Elemental { element, amount } => {
            let resist = target.resist(*element);
            if resist >= config.immune_level {
                return;
            }
            let mut extra = amount.roll(hit_dice, dealt, rng);
            if resist > 0 {
                extra /= 1 + resist * resist;
            } else if resist < 0 {
                extra += amount.roll(hit_dice, dealt, rng);
            }
            result.bonus_damage += extra;
            return;
        }
        ReactiveKind::Acid(m) => AppliedEffect::Corroded {
            target: id,
            amount: m.roll(hit_dice, dealt, rng),
        },
        ReactiveKind::LifeSteal(m) => AppliedEffect::Healed {
            target: id,
            amount: m.roll(hit_dice, dealt, rng),
        },
        ReactiveKind::Mutation => AppliedEffect::Mutated { target: id },
        ReactiveKind::Blink => AppliedEffect::Relocated {
            target: id,
            mode: Relocation::Blink,
        },
        ReactiveKind::Confusion(m) => AppliedEffect::Confused {
            target: id,
            turns: m.roll(hit_dice, dealt, rng),
        },
        ReactiveKind::Slow(m) => AppliedEffect::Slowed {
            target: id,
            turns: m.roll(hit_dice, dealt, rng),
        },
        ReactiveKind::SelfDestruct => AppliedEffect::SelfDestructed { target: id },
        ReactiveKind::Chaos(_) => return,
    };

    result.effects.push(apply_effect(applied, target, sink));
}
