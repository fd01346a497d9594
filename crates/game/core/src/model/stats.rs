//! Primary attributes and skill proficiencies.

use strum::{EnumCount, IntoEnumIterator};

/// The three primary attributes that feed accuracy and damage.
///
/// Monsters without meaningful attributes carry the neutral value, which
/// leaves every stat-scaled term unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
}

impl Stats {
    /// Attribute value that neither helps nor hurts stat-scaled rolls.
    pub const NEUTRAL: i32 = 11;

    pub const fn new(strength: i32, dexterity: i32, intelligence: i32) -> Self {
        Self {
            strength,
            dexterity,
            intelligence,
        }
    }

    pub const fn neutral() -> Self {
        Self::new(Self::NEUTRAL, Self::NEUTRAL, Self::NEUTRAL)
    }

    /// Dexterity pulled toward strength by `str_weight` tenths.
    ///
    /// `str_weight` is 0..=10. At 10 the result sits halfway between the two
    /// attributes; heavier weapons carry larger weights.
    pub fn to_hit_base(&self, str_weight: i32) -> i32 {
        let towards_str = (self.strength - self.dexterity) / 2;
        self.dexterity + towards_str * str_weight / 10
    }

    /// Strength pulled toward dexterity by the complementary weight.
    pub fn to_damage_base(&self, str_weight: i32) -> i32 {
        let dex_weight = 10 - str_weight;
        let towards_dex = (self.dexterity - self.strength) / 2;
        self.strength + towards_dex * dex_weight / 10
    }
}

/// Selects one primary attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StatKind {
    Strength,
    Dexterity,
    Intelligence,
}

impl Stats {
    pub fn get(&self, kind: StatKind) -> i32 {
        match kind {
            StatKind::Strength => self.strength,
            StatKind::Dexterity => self.dexterity,
            StatKind::Intelligence => self.intelligence,
        }
    }

    /// Lowers one attribute, never below 1.
    pub fn drain(&mut self, kind: StatKind, amount: i32) {
        let slot = match kind {
            StatKind::Strength => &mut self.strength,
            StatKind::Dexterity => &mut self.dexterity,
            StatKind::Intelligence => &mut self.intelligence,
        };
        *slot = (*slot - amount).max(1);
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Trainable proficiencies consulted by the combat pipeline.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumCount,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SkillId {
    Fighting,
    ShortBlades,
    LongSwords,
    Axes,
    MacesFlails,
    Polearms,
    Staves,
    Slings,
    Bows,
    Crossbows,
    Throwing,
    UnarmedCombat,
    Stabbing,
    Shields,
    Armour,
    Dodging,
    Necromancy,
}

impl SkillId {
    const fn index(self) -> usize {
        self as usize
    }

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Skill levels indexed by [`SkillId`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skills {
    levels: [u8; SkillId::COUNT],
}

impl Skills {
    pub const MAX_LEVEL: u8 = 27;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, skill: SkillId) -> i32 {
        i32::from(self.levels[skill.index()])
    }

    pub fn set(&mut self, skill: SkillId, level: u8) {
        self.levels[skill.index()] = level.min(Self::MAX_LEVEL);
    }

    /// Builder form of [`Skills::set`].
    #[must_use]
    pub fn with(mut self, skill: SkillId, level: u8) -> Self {
        self.set(skill, level);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillId, i32)> + '_ {
        SkillId::iter().map(|skill| (skill, self.level(skill)))
    }
}

/// Set of skills exercised during one resolution.
///
/// The engine never trains skills itself; callers read this set and feed
/// their own training hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillSet(u32);

impl SkillSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, skill: SkillId) {
        self.0 |= skill.bit();
    }

    pub const fn contains(&self, skill: SkillId) -> bool {
        self.0 & skill.bit() != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = SkillId> + '_ {
        SkillId::iter().filter(|skill| self.contains(*skill))
    }
}

impl FromIterator<SkillId> for SkillSet {
    fn from_iter<T: IntoIterator<Item = SkillId>>(iter: T) -> Self {
        let mut set = Self::empty();
        for skill in iter {
            set.insert(skill);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_blend_leans_by_weight() {
        let stats = Stats::new(18, 10, 10);

        // Pure dexterity weapon ignores strength entirely.
        assert_eq!(stats.to_hit_base(0), 10);
        // Full strength weight moves halfway toward strength.
        assert_eq!(stats.to_hit_base(10), 14);
        assert_eq!(stats.to_damage_base(10), 18);
        assert_eq!(stats.to_damage_base(0), 14);
    }

    #[test]
    fn drain_floors_at_one() {
        let mut stats = Stats::new(3, 10, 10);
        stats.drain(StatKind::Strength, 5);
        assert_eq!(stats.get(StatKind::Strength), 1);
    }

    #[test]
    fn skill_levels_are_capped() {
        let skills = Skills::new().with(SkillId::Stabbing, 40);
        assert_eq!(skills.level(SkillId::Stabbing), 27);
        assert_eq!(skills.level(SkillId::Fighting), 0);
    }

    #[test]
    fn skill_set_tracks_membership() {
        let set: SkillSet = [SkillId::Fighting, SkillId::Stabbing].into_iter().collect();
        assert!(set.contains(SkillId::Fighting));
        assert!(!set.contains(SkillId::Axes));
        assert_eq!(set.iter().count(), 2);
    }
}
