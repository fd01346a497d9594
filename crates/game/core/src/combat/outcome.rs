//! Structured results of a resolution.
//!
//! Outcomes carry everything narration, death handling and skill training
//! need, so none of those concerns leak into the numeric pipeline.

use crate::env::{LevelDrain, Relocation};
use crate::model::{CombatantId, SkillSet, StatKind};

use super::speed::SpeedAdjustment;
use super::stab::StabTier;

/// Result of the to-hit stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitVerdict {
    Hit,
    #[default]
    Miss,
    /// Stopped by the defender's shield.
    Blocked,
    /// Lost footing or splashed about; the attack never happened.
    Fumbled,
}

/// Raw diagnostics of one to-hit check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitCheck {
    pub verdict: HitVerdict,
    /// Accuracy die size.
    pub die: i32,
    /// Rolled accuracy, post-roll bonuses included.
    pub roll: i32,
    /// Evasion the roll was compared against.
    pub evasion: i32,
    /// Landed through the natural-hit or helpless rule despite the roll.
    pub natural: bool,
}

impl HitCheck {
    pub const fn landed(&self) -> bool {
        matches!(self.verdict, HitVerdict::Hit)
    }

    pub const fn fumbled() -> Self {
        Self {
            verdict: HitVerdict::Fumbled,
            die: 0,
            roll: 0,
            evasion: 0,
            natural: false,
        }
    }
}

/// Intermediate values of the damage chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRoll {
    /// Base die before stat scaling.
    pub base: i32,
    /// Die after stat scaling and water bonus.
    pub scaled: i32,
    /// Value rolled from the scaled die.
    pub rolled: i32,
    /// After skill, might and enchantment modifiers.
    pub pre_stab: i32,
    /// After the stab chain, before armour.
    pub pre_armour: i32,
    /// Clamped result after armour.
    pub final_damage: i32,
}

/// How a slot ended the defender, when it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fatality {
    /// Hit points fell to the death threshold.
    Slain,
    /// The last head was cut off.
    Decapitated,
    /// Removed outright by a distortion effect. Death processing must not
    /// also run for hit points.
    InstantDefeat,
}

/// One status mutation applied during resolution, for narration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AppliedEffect {
    Poisoned { target: CombatantId, amount: i32 },
    Confused { target: CombatantId, turns: i32 },
    Paralysed { target: CombatantId, turns: i32 },
    Slowed { target: CombatantId, turns: i32 },
    Diseased { target: CombatantId, turns: i32 },
    LevelDrained { target: CombatantId, drain: LevelDrain },
    Rotted { target: CombatantId, amount: i32 },
    StatDrained { target: CombatantId, stat: StatKind, amount: i32 },
    Mutated { target: CombatantId },
    Healed { target: CombatantId, amount: i32 },
    Relocated { target: CombatantId, mode: Relocation },
    Corroded { target: CombatantId, amount: i32 },
    Staggered { target: CombatantId, energy: i32 },
    HeadSevered { target: CombatantId, remaining: u8 },
    HeadsRegrown { target: CombatantId, heads: u8, healed: i32 },
    Cauterised { target: CombatantId },
    SelfDestructed { target: CombatantId },
    Defeated { target: CombatantId },
}

impl AppliedEffect {
    pub const fn target(&self) -> CombatantId {
        match *self {
            Self::Poisoned { target, .. }
            | Self::Confused { target, .. }
            | Self::Paralysed { target, .. }
            | Self::Slowed { target, .. }
            | Self::Diseased { target, .. }
            | Self::LevelDrained { target, .. }
            | Self::Rotted { target, .. }
            | Self::StatDrained { target, .. }
            | Self::Mutated { target }
            | Self::Healed { target, .. }
            | Self::Relocated { target, .. }
            | Self::Corroded { target, .. }
            | Self::Staggered { target, .. }
            | Self::HeadSevered { target, .. }
            | Self::HeadsRegrown { target, .. }
            | Self::Cauterised { target }
            | Self::SelfDestructed { target }
            | Self::Defeated { target } => target,
        }
    }
}

/// Result record of one attack slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackOutcome {
    pub slot: usize,
    /// Weapon name or natural attack verb ("bite", "kick", ...).
    pub attack_name: String,
    pub hit: bool,
    pub check: HitCheck,
    pub stab: StabTier,
    pub damage: DamageRoll,
    /// Extra damage from the weapon or ammunition brand.
    pub brand_damage: i32,
    /// Extra damage from species reactive effects.
    pub special_damage: i32,
    /// Everything subtracted from the defender's hit points by this slot.
    pub total_damage: i32,
    pub effects: Vec<AppliedEffect>,
    pub fatality: Option<Fatality>,
    /// Description for death messages; never read by the pipeline.
    pub cause: String,
}

/// Why the sequence stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    #[default]
    SlotsExhausted,
    DefenderDied,
    InstantDefeat,
}

/// Everything one attacker's action produced.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackReport {
    pub attacker: CombatantId,
    pub defender: CombatantId,
    pub outcomes: Vec<AttackOutcome>,
    /// Skills the caller may train.
    pub exercised: SkillSet,
    pub speed: SpeedAdjustment,
    pub termination: Termination,
}

impl AttackReport {
    pub fn total_damage(&self) -> i32 {
        self.outcomes.iter().map(|o| o.total_damage).sum()
    }

    pub fn any_hit(&self) -> bool {
        self.outcomes.iter().any(|o| o.hit)
    }

    /// Whether the caller must run death processing for the defender.
    pub fn defender_died(&self) -> bool {
        self.termination == Termination::DefenderDied
    }
}
