//! Timed statuses carried by a combatant.
//!
//! Durations are counted in turns and ticked down by the surrounding
//! scheduler; the combat pipeline only reads them and adds new ones. Poison
//! is a stack rather than a timer, so repeated applications accumulate.

use arrayvec::ArrayVec;

/// Types of timed statuses relevant to combat resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatusKind {
    // ========================================================================
    // Debuffs
    // ========================================================================
    /// Acts erratically; grants a distracted stab window.
    Confusion,

    /// Accumulating poison stack.
    Poison,

    /// Cannot act or block.
    Paralysis,

    /// Acts at reduced speed.
    Slow,

    /// Lingering sickness from rot-bearing attackers.
    Disease,

    /// Frightened. Counts as fleeing even while asleep or held in place.
    Fear,

    // ========================================================================
    // Buffs
    // ========================================================================
    /// Acts at increased speed.
    Haste,

    /// Frenzied melee; implies might.
    Berserk,

    /// Bonus melee damage.
    Might,

    /// Unseen by observers without see-invisible.
    Invisibility,

    // ========================================================================
    // Temporary resistances
    // ========================================================================
    ResistFire,
    ResistCold,
    ResistElectricity,
    ResistPoison,
    LifeProtection,
}

impl StatusKind {
    /// Whether repeated applications add to the existing amount.
    pub const fn stacks(self) -> bool {
        matches!(self, Self::Poison)
    }
}

/// A single active status and its remaining amount (turns or stack size).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    pub kind: StatusKind,
    pub amount: u16,
}

/// Active statuses on a combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusSet {
    statuses: ArrayVec<Status, { StatusSet::CAPACITY }>,
}

impl StatusSet {
    pub const CAPACITY: usize = 16;

    pub fn empty() -> Self {
        Self {
            statuses: ArrayVec::new(),
        }
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.amount(kind) > 0
    }

    /// Remaining amount of a status, 0 when absent.
    pub fn amount(&self, kind: StatusKind) -> u16 {
        self.statuses
            .iter()
            .find(|s| s.kind == kind)
            .map_or(0, |s| s.amount)
    }

    /// Adds a status.
    ///
    /// Stacking kinds accumulate; timers extend to the longer duration.
    /// A full set silently drops new kinds.
    pub fn add(&mut self, kind: StatusKind, amount: u16) {
        if amount == 0 {
            return;
        }

        if let Some(existing) = self.statuses.iter_mut().find(|s| s.kind == kind) {
            existing.amount = if kind.stacks() {
                existing.amount.saturating_add(amount)
            } else {
                existing.amount.max(amount)
            };
            return;
        }

        if !self.statuses.is_full() {
            self.statuses.push(Status { kind, amount });
        }
    }

    /// Builder form of [`StatusSet::add`].
    #[must_use]
    pub fn with(mut self, kind: StatusKind, amount: u16) -> Self {
        self.add(kind, amount);
        self
    }

    pub fn remove(&mut self, kind: StatusKind) {
        self.statuses.retain(|s| s.kind != kind);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Status> {
        self.statuses.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
