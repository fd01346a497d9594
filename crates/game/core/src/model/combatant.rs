//! The combatant record read and mutated by one attack resolution.

use bitflags::bitflags;

use super::{BodyArmour, Shield, SkillId, Skills, SpeciesId, Stats, StatusKind, StatusSet, Weapon};

/// Stable handle into the [`super::CombatantRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl CombatantId {
    pub const PLAYER: Self = Self(0);
}

impl core::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Player character or monster instance of a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatantKind {
    Player,
    Monster { species: SpeciesId },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Holiness {
    #[default]
    Natural,
    Undead,
    Demonic,
    Holy,
}

/// Resistance channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Element {
    Fire,
    Cold,
    Electricity,
    Poison,
    Negative,
}

impl Element {
    /// Timed status that grants one extra level of this resistance.
    pub const fn status(self) -> StatusKind {
        match self {
            Self::Fire => StatusKind::ResistFire,
            Self::Cold => StatusKind::ResistCold,
            Self::Electricity => StatusKind::ResistElectricity,
            Self::Poison => StatusKind::ResistPoison,
            Self::Negative => StatusKind::LifeProtection,
        }
    }
}

/// Intrinsic resistance levels. Negative values mean vulnerability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Resistances {
    pub fire: i32,
    pub cold: i32,
    pub electricity: i32,
    pub poison: i32,
    pub negative: i32,
}

impl Resistances {
    pub const fn level(&self, element: Element) -> i32 {
        match element {
            Element::Fire => self.fire,
            Element::Cold => self.cold,
            Element::Electricity => self.electricity,
            Element::Poison => self.poison,
            Element::Negative => self.negative,
        }
    }
}

bitflags! {
    /// Body and behaviour properties consulted by the pipeline.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CombatantFlags: u16 {
        const FLIES               = 1 << 0;
        const AMPHIBIOUS          = 1 << 1;
        /// Cannot fight back (plants, fungi); never grants a stab.
        const HELPLESS            = 1 << 2;
        /// Erratic movers never count as unaware.
        const BATTY               = 1 << 3;
        /// Confusion is natural and grants no stab window.
        const PERMA_CONFUSED      = 1 << 4;
        const SEES_INVISIBLE      = 1 << 5;
        const ORCISH              = 1 << 6;
        const TWO_WEAPONS         = 1 << 7;
        /// Large-framed bodies handle large shields easily.
        const LARGE_FRAME         = 1 << 8;
        const UNENCUMBERED        = 1 << 9;
        /// Heals from distortion instead of suffering it.
        const DISTORTION_AFFINITY = 1 << 10;
        /// Player is undead (immune to rot, disease and vampiric draining).
        const IS_UNDEAD_FORM      = 1 << 11;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Behaviour {
    Idle,
    #[default]
    Wandering,
    Hunting,
    Fleeing,
    Sleeping,
}

/// Up to four natural attack damage values. A zero ends the list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NaturalAttack(pub [i32; 4]);

impl NaturalAttack {
    pub const fn new(damage: [i32; 4]) -> Self {
        Self(damage)
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied().take_while(|&d| d > 0)
    }

    pub fn get(&self, slot: usize) -> Option<i32> {
        self.iter().nth(slot)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Player body features that unlock auxiliary unarmed attacks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BodyTraits {
    pub hooves: bool,
    pub horns: u8,
    /// Pecks instead of headbutting.
    pub beak: bool,
    pub tail: bool,
    pub stinger: u8,
    pub claws: u8,
    /// Bonus to bare-handed base damage from the body itself.
    pub bare_hand_bonus: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Transformation {
    #[default]
    None,
    Spider,
    IceBeast,
    BladeHands,
    Statue,
    Dragon,
    SerpentOfHell,
    Lich,
    Air,
}

impl Transformation {
    /// Forms whose bodies cannot kick, headbutt or punch.
    pub const fn blocks_limb_attacks(self) -> bool {
        matches!(
            self,
            Self::SerpentOfHell | Self::IceBeast | Self::Dragon | Self::Spider
        )
    }
}

/// A participant in combat.
///
/// The engine only ever borrows combatants from a registry; it mutates hit
/// points, statuses and a handful of counters in place and never creates or
/// destroys them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: CombatantId,
    pub kind: CombatantKind,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    /// Hit dice for monsters, experience level for the player.
    pub hit_dice: i32,
    pub base_ac: i32,
    pub base_ev: i32,
    pub stats: Stats,
    pub skills: Skills,
    pub weapon: Option<Weapon>,
    /// Second weapon for species that wield two.
    pub offhand: Option<Weapon>,
    /// Quivered ammunition for launchers.
    pub ammo: Option<Weapon>,
    pub shield: Option<Shield>,
    pub body_armour: Option<BodyArmour>,
    pub statuses: StatusSet,
    pub resistances: Resistances,
    pub holiness: Holiness,
    pub flags: CombatantFlags,
    pub behaviour: Behaviour,
    pub foe: Option<CombatantId>,
    pub attacks: NaturalAttack,
    pub body: BodyTraits,
    pub transformation: Transformation,
    /// Remaining heads of a multi-headed species.
    pub parts: Option<u8>,
    /// Action-state counter; low values mean the combatant is mid-recovery.
    pub energy: i32,
    /// Blocks made this turn; each makes the next harder.
    pub shield_blocks: u32,
}

impl Combatant {
    pub const DEFAULT_ENERGY: i32 = 80;

    /// Creates a player character with neutral stats and no equipment.
    pub fn player(name: impl Into<String>, hp: i32) -> Self {
        Self::blank(CombatantId::PLAYER, CombatantKind::Player, name.into(), hp)
    }

    /// Creates a bare monster record. Species data normally comes from
    /// [`super::SpeciesTemplate::spawn`].
    pub fn monster(id: CombatantId, species: SpeciesId, name: impl Into<String>, hp: i32) -> Self {
        Self::blank(id, CombatantKind::Monster { species }, name.into(), hp)
    }

    fn blank(id: CombatantId, kind: CombatantKind, name: String, hp: i32) -> Self {
        Self {
            id,
            kind,
            name,
            hp,
            max_hp: hp,
            hit_dice: 1,
            base_ac: 0,
            base_ev: 0,
            stats: Stats::neutral(),
            skills: Skills::default(),
            weapon: None,
            offhand: None,
            ammo: None,
            shield: None,
            body_armour: None,
            statuses: StatusSet::empty(),
            resistances: Resistances::default(),
            holiness: Holiness::Natural,
            flags: CombatantFlags::empty(),
            behaviour: Behaviour::Wandering,
            foe: None,
            attacks: NaturalAttack::default(),
            body: BodyTraits::default(),
            transformation: Transformation::None,
            parts: None,
            energy: Self::DEFAULT_ENERGY,
            shield_blocks: 0,
        }
    }

    pub const fn is_player(&self) -> bool {
        matches!(self.kind, CombatantKind::Player)
    }

    pub const fn species(&self) -> Option<SpeciesId> {
        match self.kind {
            CombatantKind::Monster { species } => Some(species),
            CombatantKind::Player => None,
        }
    }

    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Flat damage reduction, never negative.
    pub fn armour_class(&self) -> i32 {
        let body = self.body_armour.map_or(0, |a| a.armour_class);
        (self.base_ac + body).max(0)
    }

    /// Accuracy resistance, never negative.
    pub fn evasion(&self) -> i32 {
        let penalty = self.body_armour.map_or(0, |a| a.evasion_penalty);
        (self.base_ev + penalty).max(0)
    }

    /// Effective resistance level including temporary resist statuses.
    pub fn resist(&self, element: Element) -> i32 {
        let bonus = i32::from(self.statuses.has(element.status()));
        self.resistances.level(element) + bonus
    }

    pub fn skill(&self, skill: SkillId) -> i32 {
        self.skills.level(skill)
    }

    pub fn has_flag(&self, flag: CombatantFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_invisible(&self) -> bool {
        self.statuses.has(StatusKind::Invisibility)
    }

    /// Whether this combatant can perceive `other`.
    pub fn can_see(&self, other: &Combatant) -> bool {
        !other.is_invisible() || self.has_flag(CombatantFlags::SEES_INVISIBLE)
    }

    pub fn is_sleeping(&self) -> bool {
        self.behaviour == Behaviour::Sleeping
    }

    pub fn is_fleeing(&self) -> bool {
        self.behaviour == Behaviour::Fleeing || self.statuses.has(StatusKind::Fear)
    }

    pub fn is_paralysed(&self) -> bool {
        self.statuses.has(StatusKind::Paralysis)
    }

    pub fn is_confused(&self) -> bool {
        self.statuses.has(StatusKind::Confusion)
    }

    /// Busy with a multi-turn action or otherwise unable to react.
    pub fn is_delayed(&self) -> bool {
        self.is_paralysed()
    }

    pub fn is_undead(&self) -> bool {
        self.holiness == Holiness::Undead || self.has_flag(CombatantFlags::IS_UNDEAD_FORM)
    }

    pub fn has_might(&self) -> bool {
        self.statuses.has(StatusKind::Might) || self.statuses.has(StatusKind::Berserk)
    }

    /// Blocking value of the worn shield scaled by shields skill.
    pub fn shield_class(&self) -> i32 {
        self.shield
            .map_or(0, |s| s.base_class() * (20 + self.skill(SkillId::Shields)) / 20)
    }

    /// Melee weapon for an attack slot. Slot 1 uses the offhand weapon of a
    /// two-weapon wielder.
    pub fn weapon_for_slot(&self, slot: usize) -> Option<&Weapon> {
        if slot == 1 && self.has_flag(CombatantFlags::TWO_WEAPONS) && self.offhand.is_some() {
            return self.offhand.as_ref();
        }
        if slot == 0 || self.is_player() {
            return self.weapon.as_ref();
        }
        None
    }

    /// Builder helpers used by tests and tools.
    #[must_use]
    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    #[must_use]
    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    #[must_use]
    pub fn with_skill(mut self, skill: SkillId, level: u8) -> Self {
        self.skills.set(skill, level);
        self
    }

    #[must_use]
    pub fn with_defences(mut self, ac: i32, ev: i32) -> Self {
        self.base_ac = ac;
        self.base_ev = ev;
        self
    }

    #[must_use]
    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: CombatantFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[must_use]
    pub fn with_foe(mut self, foe: CombatantId) -> Self {
        self.foe = Some(foe);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defences_clamp_at_zero() {
        let mut c = Combatant::player("you", 10).with_defences(2, 3);
        c.body_armour = Some(BodyArmour {
            armour_class: -5,
            evasion_penalty: -6,
        });

        assert_eq!(c.armour_class(), 0);
        assert_eq!(c.evasion(), 0);
    }

    #[test]
    fn resist_status_adds_a_level() {
        let mut c = Combatant::player("you", 10);
        c.resistances.fire = -1;
        c.statuses.add(StatusKind::ResistFire, 10);

        assert_eq!(c.resist(Element::Fire), 0);
        assert_eq!(c.resist(Element::Cold), 0);
    }

    #[test]
    fn natural_attacks_stop_at_zero() {
        let attacks = NaturalAttack::new([8, 0, 5, 3]);
        assert_eq!(attacks.len(), 1);
        assert_eq!(attacks.get(1), None);
    }

    #[test]
    fn invisible_target_needs_see_invisible() {
        let mut ghost = Combatant::monster(CombatantId(1), SpeciesId::from("phantom"), "phantom", 10);
        ghost.statuses.add(StatusKind::Invisibility, 5);
        let you = Combatant::player("you", 10);

        assert!(!you.can_see(&ghost));
        assert!(you.with_flags(CombatantFlags::SEES_INVISIBLE).can_see(&ghost));
    }

    #[test]
    fn offhand_weapon_only_for_two_weapon_wielders() {
        let mut ettin = Combatant::monster(CombatantId(2), SpeciesId::from("ettin"), "ettin", 60)
            .with_weapon(Weapon::default());
        ettin.offhand = Some(Weapon::new("flail", SkillId::MacesFlails, 9, 14));

        assert!(ettin.weapon_for_slot(1).is_none());
        ettin.flags |= CombatantFlags::TWO_WEAPONS;
        assert_eq!(ettin.weapon_for_slot(1).map(|w| w.name.as_str()), Some("flail"));
        assert!(ettin.weapon_for_slot(2).is_none());
    }
}
