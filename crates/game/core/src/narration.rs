//! Message formatting for resolved attacks.
//!
//! Narration runs after resolution and reads only the [`AttackReport`]; the
//! pipeline never looks at the messages it produces.

use crate::combat::{AppliedEffect, AttackOutcome, AttackReport, Fatality, HitVerdict, StabTier};
use crate::env::{MessageSink, Relocation};
use crate::model::{Combatant, CombatantId};

/// Damage thresholds for the exclamation marks after a hit.
const HIT_WEAK: i32 = 7;
const HIT_MED: i32 = 18;
const HIT_STRONG: i32 = 36;

/// How the two sides of a report are referred to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Names<'a> {
    pub attacker_id: CombatantId,
    pub defender_id: CombatantId,
    pub attacker: &'a str,
    pub defender: &'a str,
    pub attacker_is_player: bool,
    pub defender_is_player: bool,
}

impl<'a> Names<'a> {
    pub fn of(attacker: &'a Combatant, defender: &'a Combatant) -> Self {
        Self {
            attacker_id: attacker.id,
            defender_id: defender.id,
            attacker: &attacker.name,
            defender: &defender.name,
            attacker_is_player: attacker.is_player(),
            defender_is_player: defender.is_player(),
        }
    }

    fn subject(&self) -> String {
        if self.attacker_is_player {
            String::from("You")
        } else {
            format!("The {}", self.attacker)
        }
    }

    fn object(&self) -> String {
        if self.defender_is_player {
            String::from("you")
        } else {
            format!("the {}", self.defender)
        }
    }

    fn defender_subject(&self) -> String {
        if self.defender_is_player {
            String::from("You")
        } else {
            format!("The {}", self.defender)
        }
    }

    /// Third-person verb agreement: "You hit" but "The orc hits".
    fn verb(&self, base: &str) -> String {
        if self.attacker_is_player {
            base.to_owned()
        } else if base.ends_with('s') {
            format!("{base}es")
        } else {
            format!("{base}s")
        }
    }

    /// Subject form of whichever side `id` names.
    fn named(&self, id: CombatantId) -> (String, bool) {
        let (name, is_player) = if id == self.attacker_id {
            (self.attacker, self.attacker_is_player)
        } else {
            (self.defender, self.defender_is_player)
        };
        if is_player {
            (String::from("You"), true)
        } else {
            (format!("The {name}"), false)
        }
    }
}

fn punctuation(damage: i32) -> &'static str {
    match damage {
        d if d < HIT_WEAK => ".",
        d if d < HIT_MED => "!",
        d if d < HIT_STRONG => "!!",
        _ => "!!!",
    }
}

/// Emits the messages for every slot of `report`.
pub fn narrate(report: &AttackReport, names: &Names<'_>, sink: &mut impl MessageSink) {
    for outcome in &report.outcomes {
        narrate_outcome(outcome, names, sink);
    }
}

fn narrate_outcome(outcome: &AttackOutcome, names: &Names<'_>, sink: &mut impl MessageSink) {
    let (subject, object) = (names.subject(), names.object());

    match outcome.check.verdict {
        HitVerdict::Fumbled => {
            let message = if names.attacker_is_player {
                String::from("Unstable footing causes you to fumble your attack.")
            } else {
                format!("{subject} splashes around in the water.")
            };
            sink.emit(&message);
            return;
        }
        HitVerdict::Blocked => {
            let message = if names.defender_is_player {
                format!("You block {}'s attack.", subject.to_lowercase())
            } else {
                format!("{} blocks {}.", names.defender_subject(), attack_phrase(outcome, names))
            };
            sink.emit(&message);
            return;
        }
        HitVerdict::Miss => {
            let message = if outcome.slot > 0 && names.attacker_is_player {
                format!("Your {} misses {object}.", outcome.attack_name)
            } else {
                format!("{subject} {} {object}.", names.verb("miss"))
            };
            sink.emit(&message);
            return;
        }
        HitVerdict::Hit => {}
    }

    if let Some(message) = stab_message(outcome.stab, names) {
        sink.emit(&message);
    }

    let verb = if outcome.slot > 0 && names.attacker_is_player {
        outcome.attack_name.clone()
    } else {
        names.verb("hit")
    };
    let damage = outcome.damage.final_damage;
    let message = if damage > 0 {
        format!("{subject} {verb} {object}{}", punctuation(damage))
    } else {
        format!("{subject} {verb} {object}, but do no damage.")
    };
    sink.emit(&message);

    for effect in &outcome.effects {
        if let Some(message) = effect_message(effect, names) {
            sink.emit(&message);
        }
    }

    match outcome.fatality {
        Some(Fatality::Slain) if names.defender_is_player => sink.emit("You die..."),
        Some(Fatality::Slain) => sink.emit(&format!("{subject} {} {object}!", names.verb("kill"))),
        Some(Fatality::Decapitated) => {
            sink.emit(&format!("{subject} {} {object}'s last head off!", names.verb("cut")));
        }
        Some(Fatality::InstantDefeat) => {
            sink.emit(&format!("{} is sucked into another dimension!", names.defender_subject()));
        }
        None => {}
    }
}

fn attack_phrase(outcome: &AttackOutcome, names: &Names<'_>) -> String {
    if names.attacker_is_player {
        format!("your {}", outcome.attack_name)
    } else {
        format!("the {}'s attack", names.attacker)
    }
}

fn stab_message(tier: StabTier, names: &Names<'_>) -> Option<String> {
    if !names.attacker_is_player {
        return None;
    }
    let object = names.object();
    match tier {
        StabTier::None => None,
        StabTier::Unaware => Some(format!("You strike {object} from a blind spot!")),
        StabTier::Distracted => Some(format!("You catch {object} completely off-guard!")),
        StabTier::Sleeping => Some(format!("{} fails to defend itself.", names.defender_subject())),
    }
}

fn effect_message(effect: &AppliedEffect, names: &Names<'_>) -> Option<String> {
    let (target, is_you) = names.named(effect.target());
    let be = if is_you { "are" } else { "is" };

    let message = match effect {
        AppliedEffect::Poisoned { .. } => format!("{target} {be} poisoned."),
        AppliedEffect::Confused { .. } => format!("{target} {be} confused."),
        AppliedEffect::Paralysed { .. } => format!("{target} {be} paralysed."),
        AppliedEffect::Slowed { .. } => format!("{target} {be} slowed."),
        AppliedEffect::Diseased { .. } => format!("{target} {be} diseased."),
        AppliedEffect::LevelDrained { .. } => format!("{target} {be} drained."),
        AppliedEffect::Rotted { .. } => format!("{target} {be} rotting."),
        AppliedEffect::StatDrained { stat, .. } => format!("{target} {be} weakened ({stat})."),
        AppliedEffect::Mutated { .. } => format!("{target} {be} mutated."),
        AppliedEffect::Healed { amount, .. } if *amount > 0 => {
            format!("{target} {} better.", if is_you { "feel" } else { "looks" })
        }
        AppliedEffect::Healed { .. } => return None,
        AppliedEffect::Relocated { mode: Relocation::Blink, .. } => format!("{target} {be} jerked sideways."),
        AppliedEffect::Relocated { mode: Relocation::Teleport, .. } => {
            format!("{target} {be} teleported away.")
        }
        AppliedEffect::Corroded { .. } if is_you => String::from("Your armour corrodes."),
        AppliedEffect::Corroded { .. } => format!("{target}'s armour corrodes."),
        AppliedEffect::Staggered { .. } => format!("{target} {be} knocked off balance."),
        AppliedEffect::HeadSevered { remaining, .. } if *remaining > 0 => {
            format!("{target} loses one of its heads.")
        }
        AppliedEffect::HeadSevered { .. } | AppliedEffect::Defeated { .. } => return None,
        AppliedEffect::HeadsRegrown { .. } => format!("{target} grows two more!"),
        AppliedEffect::Cauterised { .. } => String::from("The flame cauterises the wound!"),
        AppliedEffect::SelfDestructed { .. } => format!("{target} explodes!"),
    };
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{AttackOutcome, DamageRoll, HitCheck, SpeedAdjustment, Termination};
    use crate::env::MessageLog;
    use crate::model::{CombatantId, SkillSet, SpeciesId};

    fn report(outcomes: Vec<AttackOutcome>) -> AttackReport {
        AttackReport {
            attacker: CombatantId::PLAYER,
            defender: CombatantId(1),
            outcomes,
            exercised: SkillSet::empty(),
            speed: SpeedAdjustment::NORMAL,
            termination: Termination::SlotsExhausted,
        }
    }

    fn landed(slot: usize, name: &str, damage: i32) -> AttackOutcome {
        AttackOutcome {
            slot,
            attack_name: name.into(),
            hit: true,
            check: HitCheck {
                verdict: HitVerdict::Hit,
                ..HitCheck::default()
            },
            damage: DamageRoll {
                final_damage: damage,
                ..DamageRoll::default()
            },
            total_damage: damage,
            ..AttackOutcome::default()
        }
    }

    #[test]
    fn player_hits_scale_punctuation() {
        let you = Combatant::player("you", 20);
        let orc = Combatant::monster(CombatantId(1), SpeciesId::from("orc"), "orc", 20);
        let mut log = MessageLog::default();

        let mut kick = landed(1, "kick", 0);
        kick.damage.final_damage = 0;
        let mut miss = AttackOutcome {
            slot: 3,
            attack_name: "punch".into(),
            ..AttackOutcome::default()
        };
        miss.check.verdict = HitVerdict::Miss;

        narrate(
            &report(vec![landed(0, "long sword", 20), kick, miss]),
            &Names::of(&you, &orc),
            &mut log,
        );

        assert_eq!(
            log.messages,
            [
                "You hit the orc!!",
                "You kick the orc, but do no damage.",
                "Your punch misses the orc.",
            ]
        );
    }

    #[test]
    fn monster_verbs_agree() {
        let you = Combatant::player("you", 20);
        let orc = Combatant::monster(CombatantId(1), SpeciesId::from("orc"), "orc", 20);
        let mut log = MessageLog::default();

        let mut miss = AttackOutcome::default();
        miss.check.verdict = HitVerdict::Miss;
        let mut kill = landed(1, "hit", 3);
        kill.fatality = Some(Fatality::Slain);
        kill.effects.push(AppliedEffect::Poisoned {
            target: CombatantId::PLAYER,
            amount: 1,
        });

        narrate(&report(vec![miss, kill]), &Names::of(&orc, &you), &mut log);

        assert_eq!(
            log.messages,
            ["The orc misses you.", "The orc hits you.", "You are poisoned.", "You die..."]
        );
    }

    #[test]
    fn stab_flavour_precedes_the_hit() {
        let you = Combatant::player("you", 20);
        let orc = Combatant::monster(CombatantId(1), SpeciesId::from("orc"), "orc", 20);
        let mut log = MessageLog::default();

        let mut stab = landed(0, "dagger", 40);
        stab.stab = StabTier::Sleeping;
        stab.fatality = Some(Fatality::Slain);

        narrate(&report(vec![stab]), &Names::of(&you, &orc), &mut log);

        assert_eq!(
            log.messages,
            ["The orc fails to defend itself.", "You hit the orc!!!", "You kill the orc!"]
        );
    }
}
