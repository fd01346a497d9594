//! Status-effect collaborator.
//!
//! The pipeline decides *what* happens to a combatant and hands the
//! mutation to an [`EffectSink`]. The default method bodies apply the change
//! directly to the [`Combatant`] record; a host game overrides the ones it
//! tracks elsewhere (mutations, positions, experience).

use crate::combat::AppliedEffect;
use crate::model::{Combatant, StatKind, StatusKind};

/// Forced relocation modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Relocation {
    Blink,
    Teleport,
}

/// Permanent losses from negative energy, rolled by the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelDrain {
    pub hit_dice: i32,
    pub max_hp: i32,
    pub hp: i32,
}

fn clamp_u16(value: i32) -> u16 {
    value.clamp(0, i32::from(u16::MAX)) as u16
}

/// Mutators invoked on combatants during resolution.
pub trait EffectSink {
    fn apply_poison(&mut self, target: &mut Combatant, amount: i32) {
        target.statuses.add(StatusKind::Poison, clamp_u16(amount));
    }

    fn apply_confusion(&mut self, target: &mut Combatant, turns: i32) {
        target.statuses.add(StatusKind::Confusion, clamp_u16(turns));
    }

    fn apply_paralysis(&mut self, target: &mut Combatant, turns: i32) {
        target.statuses.add(StatusKind::Paralysis, clamp_u16(turns));
    }

    fn apply_slow(&mut self, target: &mut Combatant, turns: i32) {
        target.statuses.add(StatusKind::Slow, clamp_u16(turns));
    }

    fn apply_disease(&mut self, target: &mut Combatant, turns: i32) {
        target.statuses.add(StatusKind::Disease, clamp_u16(turns));
    }

    fn drain_level(&mut self, target: &mut Combatant, drain: LevelDrain) {
        target.hit_dice -= drain.hit_dice;
        target.max_hp = (target.max_hp - drain.max_hp).max(1);
        target.hp = (target.hp - drain.hp).min(target.max_hp);
        if target.hit_dice < 1 {
            target.hp = target.hp.min(0);
        }
    }

    /// Permanent loss of maximum hit points.
    fn rot(&mut self, target: &mut Combatant, amount: i32) {
        target.max_hp = (target.max_hp - amount).max(1);
        target.hp = target.hp.min(target.max_hp);
    }

    fn drain_stat(&mut self, target: &mut Combatant, stat: StatKind, amount: i32) {
        target.stats.drain(stat, amount);
    }

    /// Random mutation. The combatant record has nothing to mutate, so the
    /// default only exists as a hook.
    fn mutate(&mut self, _target: &mut Combatant) {}

    /// Heals up to `cap` hit points and returns the amount actually restored.
    fn heal_combatant(&mut self, target: &mut Combatant, amount: i32, cap: i32) -> i32 {
        let before = target.hp;
        target.hp = (target.hp + amount.max(0)).min(cap.max(before));
        target.hp - before
    }

    /// Moves the target elsewhere. Positions live outside the engine.
    fn force_relocate(&mut self, _target: &mut Combatant, _mode: Relocation) {}

    /// Acid damage to worn armour.
    fn corrode(&mut self, target: &mut Combatant, amount: i32) {
        if let Some(armour) = target.body_armour.as_mut() {
            armour.armour_class = (armour.armour_class - amount).max(0);
        }
    }

    /// Observes every effect the pipeline applied, after it was applied.
    fn record(&mut self, _effect: &AppliedEffect) {}
}

/// Default sink: applies effects to the record and keeps a log of them.
#[derive(Clone, Debug, Default)]
pub struct RecordingEffects {
    log: Vec<AppliedEffect>,
}

impl RecordingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &[AppliedEffect] {
        &self.log
    }

    pub fn take(&mut self) -> Vec<AppliedEffect> {
        std::mem::take(&mut self.log)
    }
}

impl EffectSink for RecordingEffects {
    fn record(&mut self, effect: &AppliedEffect) {
        self.log.push(effect.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BodyArmour;

    #[test]
    fn heal_respects_cap() {
        let mut sink = RecordingEffects::new();
        let mut c = Combatant::player("you", 20);
        c.hp = 5;

        let cap = c.max_hp;
        assert_eq!(sink.heal_combatant(&mut c, 30, cap), 15);
        assert_eq!(c.hp, 20);
    }

    #[test]
    fn heal_never_lowers_hp_above_cap() {
        let mut sink = RecordingEffects::new();
        let mut c = Combatant::player("you", 20);
        c.hp = 25;

        assert_eq!(sink.heal_combatant(&mut c, 3, 20), 0);
        assert_eq!(c.hp, 25);
    }

    #[test]
    fn level_drain_kills_at_zero_hit_dice() {
        let mut sink = RecordingEffects::new();
        let mut c = Combatant::player("you", 20);
        c.hit_dice = 1;

        sink.drain_level(
            &mut c,
            LevelDrain {
                hit_dice: 1,
                max_hp: 2,
                hp: 3,
            },
        );

        assert_eq!(c.max_hp, 18);
        assert!(!c.is_alive());
    }

    #[test]
    fn rot_and_corrode_adjust_record() {
        let mut sink = RecordingEffects::new();
        let mut c = Combatant::player("you", 20);
        c.body_armour = Some(BodyArmour {
            armour_class: 2,
            evasion_penalty: 0,
        });

        sink.rot(&mut c, 4);
        sink.corrode(&mut c, 3);
        sink.apply_poison(&mut c, 2);
        sink.apply_poison(&mut c, 1);

        assert_eq!((c.hp, c.max_hp), (16, 16));
        assert_eq!(c.armour_class(), 0);
        assert_eq!(c.statuses.amount(StatusKind::Poison), 3);
    }
}
