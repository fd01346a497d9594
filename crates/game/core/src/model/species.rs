//! Species identifiers and spawn templates.

use arrayvec::ArrayString;

use super::{
    Behaviour, BodyArmour, Combatant, CombatantFlags, CombatantId, Holiness, NaturalAttack,
    Resistances, Shield, Stats, Weapon,
};

/// Short species tag such as `"hydra"` or `"killer_bee"`.
///
/// Species are data: new ones appear by adding content, so the tag is a
/// bounded string rather than an enum. Longer names are truncated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SpeciesId(ArrayString<{ SpeciesId::MAX_LEN }>);

impl SpeciesId {
    pub const MAX_LEN: usize = 24;

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for SpeciesId {
    fn from(name: &str) -> Self {
        let mut tag = ArrayString::new();
        for ch in name.chars() {
            if tag.try_push(ch).is_err() {
                break;
            }
        }
        Self(tag)
    }
}

impl core::fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of a monster species, instantiated with [`spawn`].
///
/// [`spawn`]: SpeciesTemplate::spawn
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesTemplate {
    pub id: SpeciesId,
    pub name: String,
    pub hit_dice: i32,
    pub hp: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub armour_class: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub evasion: i32,
    pub attacks: NaturalAttack,
    #[cfg_attr(feature = "serde", serde(default))]
    pub holiness: Holiness,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resistances: Resistances,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: CombatantFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: Option<Stats>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub weapon: Option<Weapon>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub offhand: Option<Weapon>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shield: Option<Shield>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub body_armour: Option<BodyArmour>,
    /// Starting head count for multi-headed species.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parts: Option<u8>,
}

impl SpeciesTemplate {
    pub fn new(id: &str, hit_dice: i32, hp: i32, attacks: [i32; 4]) -> Self {
        Self {
            id: SpeciesId::from(id),
            name: id.replace('_', " "),
            hit_dice,
            hp,
            armour_class: 0,
            evasion: 0,
            attacks: NaturalAttack::new(attacks),
            holiness: Holiness::Natural,
            resistances: Resistances::default(),
            flags: CombatantFlags::empty(),
            stats: None,
            weapon: None,
            offhand: None,
            shield: None,
            body_armour: None,
            parts: None,
        }
    }

    /// Instantiates a fresh, awake monster of this species.
    pub fn spawn(&self, id: CombatantId) -> Combatant {
        let mut monster = Combatant::monster(id, self.id, self.name.clone(), self.hp);
        monster.hit_dice = self.hit_dice;
        monster.base_ac = self.armour_class;
        monster.base_ev = self.evasion;
        monster.attacks = self.attacks;
        monster.holiness = self.holiness;
        monster.resistances = self.resistances;
        monster.flags = self.flags;
        monster.stats = self.stats.unwrap_or_default();
        monster.weapon = self.weapon.clone();
        monster.offhand = self.offhand.clone();
        monster.shield = self.shield;
        monster.body_armour = self.body_armour;
        monster.parts = self.parts;
        monster.behaviour = Behaviour::Hunting;
        monster
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_tag_truncates_long_names() {
        let id = SpeciesId::from("an_exceedingly_long_species_name");
        assert_eq!(id.as_str().len(), SpeciesId::MAX_LEN);
    }

    #[test]
    fn spawn_copies_template() {
        let mut hydra = SpeciesTemplate::new("hydra", 13, 60, [18, 0, 0, 0]);
        hydra.parts = Some(5);
        hydra.armour_class = 5;

        let monster = hydra.spawn(CombatantId(7));
        assert_eq!(monster.species(), Some(SpeciesId::from("hydra")));
        assert_eq!(monster.name, "hydra");
        assert_eq!(monster.parts, Some(5));
        assert_eq!(monster.armour_class(), 5);
        assert_eq!(monster.hp, monster.max_hp);
        assert_eq!(monster.behaviour, Behaviour::Hunting);
    }
}
