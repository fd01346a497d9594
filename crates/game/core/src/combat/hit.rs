//! Accuracy, evasion and the hit check.
//!
//! Accuracy is a die size, not a bonus: the attacker rolls `d(accuracy)` and
//! must reach the defender's evasion. Natural hits and the helpless rule let
//! weak attackers land blows anyway.

use tracing::trace;

use crate::config::HitConfig;
use crate::env::RngOracle;
use crate::model::{
    Combatant, CombatantFlags, Hands, Shield, SkillId, Transformation, UNARMED_STR_WEIGHT, Weapon,
};

use super::outcome::{HitCheck, HitVerdict};

/// Whose accuracy formula applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccuracySource {
    /// Player main attack, armed or bare-handed.
    Player,
    /// Player auxiliary unarmed attack (kick, headbutt, ...).
    Auxiliary,
    Monster,
}

/// Per-slot inputs to the accuracy roll.
#[derive(Clone, Copy, Debug)]
pub struct AccuracyInputs<'w> {
    pub source: AccuracySource,
    pub weapon: Option<&'w Weapon>,
    /// Flat accuracy on top of the weapon (ammunition enchantment).
    pub bonus: i32,
    pub water_attack: bool,
    /// Gripping a hand-and-a-half weapon with both hands.
    pub hand_half: bool,
    /// Player heavy-armour penalty rolled for this action.
    pub heavy_armour: i32,
}

impl<'w> AccuracyInputs<'w> {
    pub fn new(source: AccuracySource, weapon: Option<&'w Weapon>) -> Self {
        Self {
            source,
            weapon,
            bonus: 0,
            water_attack: false,
            hand_half: false,
            heavy_armour: 0,
        }
    }
}

/// Rolls the player's armour and shield encumbrance for one action.
pub fn heavy_armour_penalty(attacker: &Combatant, rng: &mut impl RngOracle) -> i32 {
    let shields = attacker.skill(SkillId::Shields);
    let mut penalty = 0;

    match attacker.shield {
        Some(Shield::Shield) => {
            if shields < rng.roll_uniform(7) {
                penalty += 1;
            }
        }
        Some(Shield::Large) => {
            if attacker.has_flag(CombatantFlags::LARGE_FRAME) {
                if shields < rng.roll_uniform(13) {
                    penalty += 1;
                }
            } else {
                for _ in 0..3 {
                    if shields < rng.roll_uniform(13) {
                        penalty += rng.roll_uniform(3);
                    }
                }
            }
        }
        Some(Shield::Buckler) | None => {}
    }

    if let Some(armour) = attacker.body_armour {
        let ev_pen = armour.evasion_penalty;
        if ev_pen < 0 && rng.roll_uniform(attacker.skill(SkillId::Armour)) < ev_pen.abs() {
            penalty += rng.roll_uniform(ev_pen.abs());
        }
    }

    if attacker.weapon.is_none() {
        penalty *= if rng.coin_flip() { 3 } else { 2 };
    }

    penalty
}

/// Whether a bare-handed player fights well enough to add auxiliary attacks.
pub fn fights_well_unarmed(attacker: &Combatant, heavy_armour: i32, rng: &mut impl RngOracle) -> bool {
    attacker.has_flag(CombatantFlags::UNENCUMBERED)
        && rng.roll_uniform(20) < attacker.skill(SkillId::UnarmedCombat)
        && rng.roll_uniform(1 + heavy_armour) < 2
}

fn transformation_accuracy(form: Transformation) -> Option<i32> {
    match form {
        Transformation::Spider
        | Transformation::IceBeast
        | Transformation::Dragon
        | Transformation::SerpentOfHell
        | Transformation::Lich => Some(10),
        Transformation::BladeHands => Some(12),
        Transformation::Statue => Some(9),
        Transformation::Air | Transformation::None => None,
    }
}

/// Rolls the accuracy die and returns `(die, roll)`.
///
/// Player dice include random skill contributions, so the die itself is
/// drawn before the roll.
pub fn roll_accuracy(
    attacker: &Combatant,
    defender: &Combatant,
    inputs: &AccuracyInputs<'_>,
    config: &HitConfig,
    rng: &mut impl RngOracle,
) -> (i32, i32) {
    match inputs.source {
        AccuracySource::Player => roll_player_accuracy(attacker, inputs, config, rng),
        AccuracySource::Auxiliary => {
            let die = config.aux_base
                + attacker.stats.dexterity / 2
                + attacker.skill(SkillId::UnarmedCombat) / 2
                + attacker.skill(SkillId::Fighting) / 5;
            (die, rng.roll_uniform(die))
        }
        AccuracySource::Monster => {
            let (base, weight) = if defender.is_player() {
                (config.monster_vs_player_base, config.monster_vs_player_hd_weight)
            } else {
                (config.monster_vs_monster_base, config.monster_vs_monster_hd_weight)
            };
            let mut die = base + attacker.hit_dice * weight + inputs.bonus;
            if inputs.water_attack {
                die += config.water_bonus;
            }
            if let Some(weapon) = inputs.weapon {
                die += weapon.to_hit + weapon.accuracy;
            }
            (die, rng.roll_uniform(die))
        }
    }
}

/// Strength weight of the player's grip, shared by the accuracy and damage
/// stat blends. A free hand on a hand-and-a-half weapon adds one.
pub fn player_str_weight(attacker: &Combatant, weapon: Option<&Weapon>) -> i32 {
    match weapon {
        Some(weapon) => {
            let bonus = i32::from(weapon.hands == Hands::HandAndAHalf && attacker.shield.is_none());
            weapon.str_weight() + bonus
        }
        None => UNARMED_STR_WEIGHT,
    }
}

fn roll_player_accuracy(
    attacker: &Combatant,
    inputs: &AccuracyInputs<'_>,
    config: &HitConfig,
    rng: &mut impl RngOracle,
) -> (i32, i32) {
    let str_weight = player_str_weight(attacker, inputs.weapon);
    let mut die = config.player_base + attacker.stats.to_hit_base(str_weight) / 2;

    if inputs.water_attack {
        die += config.water_bonus;
    }
    if attacker.is_invisible() && !attacker.has_flag(CombatantFlags::SEES_INVISIBLE) {
        die -= config.invisible_self_penalty;
    }

    die += rng.roll_uniform(1 + attacker.skill(SkillId::Fighting));

    match inputs.weapon {
        Some(weapon) => {
            die += rng.roll_uniform(attacker.skill(weapon.skill) + 1);
            die += weapon.to_hit + weapon.accuracy;
        }
        None => {
            die += config.unarmed_bonus;
            die += rng.roll_uniform(1 + attacker.skill(SkillId::UnarmedCombat));
        }
    }

    die += inputs.bonus;
    die -= inputs.heavy_armour;

    let mut roll = rng.roll_uniform(die);
    trace!(die, roll, "player accuracy");

    if inputs.hand_half {
        roll += rng.roll_uniform(3);
    }

    if inputs.weapon.is_none() {
        match attacker.transformation {
            Transformation::Air => roll = 0,
            form => {
                if let Some(extra) = transformation_accuracy(form) {
                    roll += rng.roll_uniform(extra);
                }
            }
        }
    }

    (die, roll)
}

/// Effective evasion of the defender against this attacker.
///
/// Monsters defend with a flat value; the player rolls a limited evasion
/// plus a dexterity term, penalised when the attacker is unseen or the player
/// is busy.
pub fn defender_evasion(
    defender: &Combatant,
    attacker: &Combatant,
    config: &HitConfig,
    rng: &mut impl RngOracle,
) -> i32 {
    if !defender.is_player() {
        return defender.evasion();
    }

    let sight = if defender.can_see(attacker) {
        config.seen_attacker_penalty
    } else {
        config.unseen_attacker_penalty
    };
    let delayed = if defender.is_delayed() {
        config.delayed_penalty
    } else {
        0
    };

    rng.roll_limited(defender.evasion(), config.evasion_limit)
        + rng.roll_uniform(defender.stats.dexterity) / 3
        - sight
        - delayed
}

/// Whether the defender's shield stops the blow.
pub fn shield_blocks(
    attacker: &Combatant,
    defender: &Combatant,
    config: &HitConfig,
    rng: &mut impl RngOracle,
) -> bool {
    let shield_class = defender.shield_class();
    if shield_class <= 0
        || defender.is_paralysed()
        || defender.is_delayed()
        || defender.is_confused()
        || !defender.can_see(attacker)
    {
        return false;
    }

    let blocks = defender.shield_blocks as i32;
    let against = rng.roll_uniform(
        config.block_base + attacker.hit_dice / 2 + config.block_repeat_weight * blocks * blocks,
    );
    let for_block = rng.roll_uniform(shield_class)
        + rng.roll_uniform(defender.stats.dexterity) / 4
        + rng.roll_uniform(defender.skill(SkillId::Shields)) / 4
        - 1;

    against <= for_block
}

/// Whether a monster defender is in no state to avoid a blow.
///
/// The player never counts; a busy player pays in evasion instead.
pub fn is_helpless_target(defender: &Combatant, config: &HitConfig) -> bool {
    !defender.is_player()
        && (defender.is_sleeping()
            || defender.is_paralysed()
            || defender.energy <= config.helpless_energy)
}

/// Compares an accuracy roll against evasion, applying the natural-hit and
/// helpless-defender rules.
pub fn resolve_roll(
    die: i32,
    roll: i32,
    evasion: i32,
    natural_one_in: i32,
    helpless_miss_one_in: Option<i32>,
    rng: &mut impl RngOracle,
) -> HitCheck {
    let mut check = HitCheck {
        verdict: HitVerdict::Miss,
        die,
        roll,
        evasion,
        natural: false,
    };

    if roll >= evasion {
        check.verdict = HitVerdict::Hit;
    } else if rng.one_in(natural_one_in)
        || helpless_miss_one_in.is_some_and(|n| !rng.one_in(n))
    {
        check.verdict = HitVerdict::Hit;
        check.natural = true;
    }

    check
}

/// Full to-hit stage for one slot: block, accuracy, evasion, verdict.
pub fn check_hit(
    attacker: &Combatant,
    defender: &Combatant,
    inputs: &AccuracyInputs<'_>,
    config: &HitConfig,
    rng: &mut impl RngOracle,
) -> HitCheck {
    if shield_blocks(attacker, defender, config, rng) {
        return HitCheck {
            verdict: HitVerdict::Blocked,
            ..HitCheck::default()
        };
    }

    let (die, roll) = roll_accuracy(attacker, defender, inputs, config, rng);
    let evasion = defender_evasion(defender, attacker, config, rng);

    let natural_one_in = if attacker.is_player() || defender.is_player() {
        config.natural_hit
    } else {
        config.monster_natural_hit
    };

    let helpless_miss = is_helpless_target(defender, config).then(|| {
        if attacker.is_player() {
            config.helpless_miss_base + attacker.skill(SkillId::Stabbing)
        } else {
            config.monster_helpless_miss
        }
    });

    resolve_roll(die, roll, evasion, natural_one_in, helpless_miss, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Exhausted, ScriptedRng};
    use crate::model::{BodyArmour, CombatantId, SpeciesId};

    fn goblin() -> Combatant {
        Combatant::monster(CombatantId(1), SpeciesId::from("goblin"), "goblin", 10).with_defences(0, 10)
    }

    #[test]
    fn max_roll_on_die_twenty_beats_evasion_ten() {
        let mut rng = ScriptedRng::always_max();
        let check = resolve_roll(20, 19, 10, 30, None, &mut rng);
        assert!(check.landed());
        assert!(!check.natural);
    }

    #[test]
    fn zero_accuracy_still_lands_natural_hits() {
        // First draw answers the natural-hit one_in(30).
        let mut rng = ScriptedRng::new([0]);
        let check = resolve_roll(0, 0, 10, 30, None, &mut rng);
        assert!(check.landed());
        assert!(check.natural);

        let mut rng = ScriptedRng::new([5]);
        assert!(!resolve_roll(0, 0, 10, 30, None, &mut rng).landed());
    }

    #[test]
    fn helpless_defender_is_hit_unless_lucky() {
        // Natural-hit draw fails, helpless one_in(20) fails -> hit.
        let mut rng = ScriptedRng::new([5, 5]);
        let check = resolve_roll(10, 0, 10, 30, Some(20), &mut rng);
        assert!(check.landed());

        // Helpless miss roll succeeds -> miss.
        let mut rng = ScriptedRng::new([5, 0]);
        assert!(!resolve_roll(10, 0, 10, 30, Some(20), &mut rng).landed());
    }

    #[test]
    fn only_monsters_are_helpless_targets() {
        let config = HitConfig::default();

        let mut orc = goblin();
        assert!(!is_helpless_target(&orc, &config));
        orc.energy = config.helpless_energy;
        assert!(is_helpless_target(&orc, &config));

        let mut you = Combatant::player("you", 20);
        you.energy = 0;
        you.statuses.add(crate::model::StatusKind::Paralysis, 3);
        assert!(!is_helpless_target(&you, &config));
    }

    #[test]
    fn monster_accuracy_depends_on_target() {
        let mut ogre = Combatant::monster(CombatantId(2), SpeciesId::from("ogre"), "ogre", 30);
        ogre.hit_dice = 5;
        let you = Combatant::player("you", 20);
        let config = HitConfig::default();
        let inputs = AccuracyInputs::new(AccuracySource::Monster, None);
        let mut rng = ScriptedRng::always_max();

        assert_eq!(roll_accuracy(&ogre, &you, &inputs, &config, &mut rng).0, 21);
        assert_eq!(roll_accuracy(&ogre, &goblin(), &inputs, &config, &mut rng).0, 45);
    }

    #[test]
    fn player_evasion_drops_against_unseen_attackers() {
        let you = Combatant::player("you", 20).with_defences(0, 0);
        let mut ghost = goblin();
        ghost.statuses.add(crate::model::StatusKind::Invisibility, 3);
        let config = HitConfig::default();
        let mut rng = ScriptedRng::always_min();

        assert_eq!(defender_evasion(&you, &goblin(), &config, &mut rng), -2);
        assert_eq!(defender_evasion(&you, &ghost, &config, &mut rng), -14);
    }

    #[test]
    fn unarmed_heavy_armour_penalty_is_multiplied() {
        let mut you = Combatant::player("you", 20);
        you.body_armour = Some(BodyArmour {
            armour_class: 10,
            evasion_penalty: -6,
        });
        // Untrained armour skill always fails its check: penalty d(6) = 5,
        // then a won coin flip triples it.
        let mut rng = ScriptedRng::new([5, 0]).then(Exhausted::Min);
        assert_eq!(heavy_armour_penalty(&you, &mut rng), 15);
    }

    #[test]
    fn shields_need_sight_of_the_attacker() {
        let mut you = Combatant::player("you", 20);
        you.shield = Some(Shield::Large);
        let mut ghost = goblin();
        ghost.statuses.add(crate::model::StatusKind::Invisibility, 3);
        let config = HitConfig::default();
        let mut rng = ScriptedRng::always_min();

        assert!(!shield_blocks(&ghost, &you, &config, &mut rng));
        // Minimum rolls leave the block side at -1.
        assert!(!shield_blocks(&goblin(), &you, &config, &mut rng));
    }
}
