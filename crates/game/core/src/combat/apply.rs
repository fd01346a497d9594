//! Routes [`AppliedEffect`] descriptions to the effect sink.

use crate::env::EffectSink;
use crate::model::Combatant;

use super::outcome::AppliedEffect;

/// Hit points a self-destructing attacker is left with.
const SELF_DESTRUCT_HP: i32 = -10;

/// Applies one effect to `target` and returns it as it actually happened.
///
/// Healing reports the amount restored after the cap, not the amount asked
/// for. The sink observes the returned value.
pub(crate) fn apply_effect(
    effect: AppliedEffect,
    target: &mut Combatant,
    sink: &mut impl EffectSink,
) -> AppliedEffect {
    debug_assert_eq!(effect.target(), target.id, "effect routed to the wrong combatant");

    let applied = match effect {
        AppliedEffect::Poisoned { amount, .. } => {
            sink.apply_poison(target, amount);
            effect
        }
        AppliedEffect::Confused { turns, .. } => {
            sink.apply_confusion(target, turns);
            effect
        }
        AppliedEffect::Paralysed { turns, .. } => {
            sink.apply_paralysis(target, turns);
            effect
        }
        AppliedEffect::Slowed { turns, .. } => {
            sink.apply_slow(target, turns);
            effect
        }
        AppliedEffect::Diseased { turns, .. } => {
            sink.apply_disease(target, turns);
            effect
        }
        AppliedEffect::LevelDrained { drain, .. } => {
            sink.drain_level(target, drain);
            effect
        }
        AppliedEffect::Rotted { amount, .. } => {
            sink.rot(target, amount);
            effect
        }
        AppliedEffect::StatDrained { stat, amount, .. } => {
            sink.drain_stat(target, stat, amount);
            effect
        }
        AppliedEffect::Mutated { .. } => {
            sink.mutate(target);
            effect
        }
        AppliedEffect::Healed { target: id, amount } => {
            let cap = target.max_hp;
            let amount = sink.heal_combatant(target, amount, cap);
            AppliedEffect::Healed { target: id, amount }
        }
        AppliedEffect::Relocated { mode, .. } => {
            sink.force_relocate(target, mode);
            effect
        }
        AppliedEffect::Corroded { amount, .. } => {
            sink.corrode(target, amount);
            effect
        }
        AppliedEffect::Staggered { target: id, energy } => {
            let before = target.energy;
            target.energy = (before - energy).max(0);
            AppliedEffect::Staggered {
                target: id,
                energy: before - target.energy,
            }
        }
        AppliedEffect::HeadSevered { remaining, .. } => {
            target.parts = Some(remaining);
            if remaining == 0 {
                target.hp = -1;
            }
            effect
        }
        AppliedEffect::HeadsRegrown { target: id, heads, healed } => {
            target.parts = Some(heads);
            let cap = target.max_hp;
            let healed = sink.heal_combatant(target, healed, cap);
            AppliedEffect::HeadsRegrown { target: id, heads, healed }
        }
        AppliedEffect::SelfDestructed { .. } => {
            target.hp = SELF_DESTRUCT_HP;
            effect
        }
        AppliedEffect::Cauterised { .. } | AppliedEffect::Defeated { .. } => effect,
    };

    sink.record(&applied);
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::RecordingEffects;
    use crate::model::{CombatantId, SpeciesId};

    #[test]
    fn healing_reports_capped_amount() {
        let mut you = Combatant::player("you", 20);
        you.hp = 18;
        let mut sink = RecordingEffects::new();

        let applied = apply_effect(
            AppliedEffect::Healed {
                target: CombatantId::PLAYER,
                amount: 9,
            },
            &mut you,
            &mut sink,
        );

        assert_eq!(you.hp, 20);
        assert_eq!(
            applied,
            AppliedEffect::Healed {
                target: CombatantId::PLAYER,
                amount: 2
            }
        );
        assert_eq!(sink.log(), &[applied]);
    }

    #[test]
    fn last_head_kills() {
        let id = CombatantId(3);
        let mut hydra = Combatant::monster(id, SpeciesId::from("hydra"), "hydra", 30);
        hydra.parts = Some(1);

        apply_effect(
            AppliedEffect::HeadSevered {
                target: id,
                remaining: 0,
            },
            &mut hydra,
            &mut RecordingEffects::new(),
        );

        assert_eq!(hydra.parts, Some(0));
        assert_eq!(hydra.hp, -1);
    }

    #[test]
    fn stagger_stops_at_zero_energy() {
        let id = CombatantId(2);
        let mut orc = Combatant::monster(id, SpeciesId::from("orc"), "orc", 10);
        orc.energy = 4;

        let applied = apply_effect(
            AppliedEffect::Staggered { target: id, energy: 9 },
            &mut orc,
            &mut RecordingEffects::new(),
        );

        assert_eq!(orc.energy, 0);
        assert_eq!(applied, AppliedEffect::Staggered { target: id, energy: 4 });
    }
}
