//! Sneak-attack detection.

use tracing::trace;

use crate::config::{StabConfig, StabOrder};
use crate::env::RngOracle;
use crate::model::{Combatant, CombatantFlags, SkillId};

/// Stab bonus tier. The numeric value divides stabbing skill in the damage
/// chain, so lower tiers hit harder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StabTier {
    #[default]
    None,
    Sleeping,
    /// Confused or fleeing.
    Distracted,
    /// Not paying attention to the attacker.
    Unaware,
}

impl StabTier {
    pub const fn value(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Sleeping => 1,
            Self::Distracted => 2,
            Self::Unaware => 3,
        }
    }

    pub const fn is_stab(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Sleeping stabs always land; the others need a skill roll.
    pub const fn needs_roll(self) -> bool {
        matches!(self, Self::Distracted | Self::Unaware)
    }
}

fn is_unaware_of(defender: &Combatant, attacker: &Combatant) -> bool {
    defender.foe != Some(attacker.id) && !defender.has_flag(CombatantFlags::BATTY)
}

fn is_distracted(defender: &Combatant) -> bool {
    let confused =
        defender.is_confused() && !defender.has_flag(CombatantFlags::PERMA_CONFUSED);
    confused || defender.is_fleeing()
}

/// Picks the candidate tier from the defender's state, before any roll.
pub fn classify(attacker: &Combatant, defender: &Combatant, order: StabOrder) -> StabTier {
    if defender.has_flag(CombatantFlags::HELPLESS) {
        return StabTier::None;
    }

    let unaware = is_unaware_of(defender, attacker);
    let distracted = is_distracted(defender);
    let sleeping = defender.is_sleeping();

    match order {
        StabOrder::Priority => {
            if unaware {
                StabTier::Unaware
            } else if distracted {
                StabTier::Distracted
            } else if sleeping {
                StabTier::Sleeping
            } else {
                StabTier::None
            }
        }
        StabOrder::Sequential => {
            let mut tier = StabTier::None;
            if unaware {
                tier = StabTier::Unaware;
            }
            if distracted {
                tier = StabTier::Distracted;
            }
            if sleeping {
                tier = StabTier::Sleeping;
            }
            tier
        }
    }
}

/// Decides whether this attack is a stab and at which tier.
///
/// No stab is possible on a defender the attacker cannot see.
pub fn detect_stab(
    attacker: &Combatant,
    defender: &Combatant,
    config: &StabConfig,
    rng: &mut impl RngOracle,
) -> StabTier {
    if !attacker.can_see(defender) {
        return StabTier::None;
    }

    let tier = classify(attacker, defender, config.order);
    if !tier.needs_roll() {
        return tier;
    }

    let chance = attacker.skill(SkillId::Stabbing) + attacker.stats.dexterity;
    let roll = rng.roll_uniform(config.gate_die);
    trace!(?tier, roll, chance, "stab gate");

    if roll <= chance { tier } else { StabTier::None }
}

/// Energy knocked off a sleeping defender by a successful stab, if any.
pub fn stagger_amount(
    attacker: &Combatant,
    config: &StabConfig,
    rng: &mut impl RngOracle,
) -> Option<i32> {
    if !config.stagger {
        return None;
    }
    let chance = attacker.skill(SkillId::Stabbing) + attacker.stats.dexterity;
    (rng.roll_uniform(config.gate_die) <= chance)
        .then(|| rng.roll_uniform(attacker.stats.dexterity + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedRng;
    use crate::model::{Behaviour, CombatantId, SpeciesId, StatusKind};

    fn pair() -> (Combatant, Combatant) {
        let you = Combatant::player("you", 20);
        let orc = Combatant::monster(CombatantId(1), SpeciesId::from("orc"), "orc", 10)
            .with_foe(CombatantId::PLAYER)
            .with_behaviour(Behaviour::Hunting);
        (you, orc)
    }

    #[test]
    fn attentive_defender_grants_nothing() {
        let (you, orc) = pair();
        assert_eq!(classify(&you, &orc, StabOrder::Priority), StabTier::None);
    }

    #[test]
    fn frightened_sleeper_resolves_by_order() {
        let (you, mut orc) = pair();
        orc.behaviour = Behaviour::Sleeping;
        orc.statuses.add(StatusKind::Fear, 6);
        assert!(orc.is_fleeing() && orc.is_sleeping());

        assert_eq!(classify(&you, &orc, StabOrder::Priority), StabTier::Distracted);
        assert_eq!(classify(&you, &orc, StabOrder::Sequential), StabTier::Sleeping);
    }

    #[test]
    fn confused_sleeper_resolves_by_order() {
        let (you, mut orc) = pair();
        orc.behaviour = Behaviour::Sleeping;
        orc.statuses.add(StatusKind::Confusion, 4);

        assert_eq!(classify(&you, &orc, StabOrder::Priority), StabTier::Distracted);
        assert_eq!(classify(&you, &orc, StabOrder::Sequential), StabTier::Sleeping);
    }

    #[test]
    fn unaware_outranks_everything() {
        let (you, mut orc) = pair();
        orc.foe = None;
        orc.behaviour = Behaviour::Fleeing;
        assert_eq!(classify(&you, &orc, StabOrder::Priority), StabTier::Unaware);
        assert_eq!(classify(&you, &orc, StabOrder::Sequential), StabTier::Distracted);
    }

    #[test]
    fn batty_and_perma_confused_do_not_count() {
        let (you, mut bat) = pair();
        bat.foe = None;
        bat.flags |= CombatantFlags::BATTY | CombatantFlags::PERMA_CONFUSED;
        bat.statuses.add(StatusKind::Confusion, 4);
        assert_eq!(classify(&you, &bat, StabOrder::Priority), StabTier::None);
    }

    #[test]
    fn helpless_and_unseen_targets_are_never_stabbed() {
        let (you, mut plant) = pair();
        plant.behaviour = Behaviour::Sleeping;
        plant.flags |= CombatantFlags::HELPLESS;
        assert_eq!(classify(&you, &plant, StabOrder::Priority), StabTier::None);

        let (you, mut orc) = pair();
        orc.behaviour = Behaviour::Sleeping;
        orc.statuses.add(StatusKind::Invisibility, 5);
        let mut rng = ScriptedRng::always_min();
        assert_eq!(detect_stab(&you, &orc, &StabConfig::default(), &mut rng), StabTier::None);
    }

    #[test]
    fn gate_roll_uses_stabbing_and_dex() {
        let (you, mut orc) = pair();
        orc.behaviour = Behaviour::Fleeing;
        let you = you.with_skill(SkillId::Stabbing, 9);
        let config = StabConfig::default();

        // 9 stabbing + 11 dex = 20.
        let mut rng = ScriptedRng::new([20]);
        assert_eq!(detect_stab(&you, &orc, &config, &mut rng), StabTier::Distracted);
        let mut rng = ScriptedRng::new([21]);
        assert_eq!(detect_stab(&you, &orc, &config, &mut rng), StabTier::None);
    }

    #[test]
    fn sleeping_stab_needs_no_roll() {
        let (you, mut orc) = pair();
        orc.behaviour = Behaviour::Sleeping;
        let mut rng = ScriptedRng::new([199]);
        assert_eq!(
            detect_stab(&you, &orc, &StabConfig::default(), &mut rng),
            StabTier::Sleeping
        );
        assert_eq!(rng.draws(), 0);
    }
}
