//! Weapons, ammunition, shields and body armour.

use bitflags::bitflags;

use super::SkillId;

/// Special property attached to a weapon or a piece of ammunition.
///
/// Each brand maps to a [`crate::combat::BrandEffect`] row in the
/// [`crate::combat::BrandTable`]; the enum itself carries no behaviour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Brand {
    #[default]
    None,
    Flaming,
    Freezing,
    Electrocution,
    Venom,
    Draining,
    Vampiric,
    Distortion,
    HolyWrath,
    OrcSlaying,
    Vorpal,
    Protection,
    Pain,
    Disruption,
    Speed,
    Confusion,
}

/// How many hands a weapon occupies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hands {
    #[default]
    One,
    /// Usable one-handed; grips with both hands when no shield is worn.
    HandAndAHalf,
    Two,
}

/// Physical damage category, used by severing and flavour text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DamageType {
    #[default]
    Crushing,
    Slicing,
    Piercing,
    Chopping,
}

impl DamageType {
    /// Whether the blow can take a head off a multi-headed defender.
    pub const fn severs(self) -> bool {
        matches!(self, Self::Slicing | Self::Chopping)
    }
}

bitflags! {
    /// Sub-type properties that change how a weapon is handled.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct WeaponTraits: u8 {
        const DAGGER      = 1 << 0;
        const LAUNCHER    = 1 << 1;
        const AMMO        = 1 << 2;
        const QUICK_BLADE = 1 << 3;
        const WHIP        = 1 << 4;
        const GIANT_CLUB  = 1 << 5;
    }
}

/// A wielded weapon, launcher or piece of ammunition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Weapon {
    pub name: String,
    pub skill: SkillId,
    /// Base damage die.
    pub damage: i32,
    /// Intrinsic accuracy of the weapon type.
    pub accuracy: i32,
    /// Base recovery time in tenths of a normal turn.
    pub speed: i32,
    /// Enchantment plus to accuracy.
    pub to_hit: i32,
    /// Enchantment plus to damage.
    pub to_dam: i32,
    pub brand: Brand,
    pub hands: Hands,
    pub damage_type: DamageType,
    pub traits: WeaponTraits,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            name: String::from("club"),
            skill: SkillId::MacesFlails,
            damage: 5,
            accuracy: 0,
            speed: 12,
            to_hit: 0,
            to_dam: 0,
            brand: Brand::None,
            hands: Hands::One,
            damage_type: DamageType::Crushing,
            traits: WeaponTraits::empty(),
        }
    }
}

impl Weapon {
    pub fn new(name: impl Into<String>, skill: SkillId, damage: i32, speed: i32) -> Self {
        Self {
            name: name.into(),
            skill,
            damage,
            speed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_brand(mut self, brand: Brand) -> Self {
        self.brand = brand;
        self
    }

    #[must_use]
    pub fn with_enchantment(mut self, to_hit: i32, to_dam: i32) -> Self {
        self.to_hit = to_hit;
        self.to_dam = to_dam;
        self
    }

    #[must_use]
    pub fn with_hands(mut self, hands: Hands) -> Self {
        self.hands = hands;
        self
    }

    #[must_use]
    pub fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    #[must_use]
    pub fn with_traits(mut self, traits: WeaponTraits) -> Self {
        self.traits = traits;
        self
    }

    pub fn is_launcher(&self) -> bool {
        self.traits.contains(WeaponTraits::LAUNCHER)
    }

    pub fn is_short_blade(&self) -> bool {
        self.skill == SkillId::ShortBlades
    }

    pub fn is_long_blade(&self) -> bool {
        self.skill == SkillId::LongSwords
    }

    /// Weight of strength against dexterity for this weapon, 0..=10.
    pub fn str_weight(&self) -> i32 {
        let mut weight = match self.skill {
            SkillId::ShortBlades => 2,
            SkillId::LongSwords | SkillId::Staves | SkillId::Polearms => 3,
            SkillId::Axes => 6,
            SkillId::MacesFlails => 7,
            _ => 5,
        };

        if self.traits.contains(WeaponTraits::WHIP) {
            weight = 2;
        } else if self.traits.contains(WeaponTraits::QUICK_BLADE) {
            weight = 1;
        }

        if self.hands == Hands::Two {
            weight += 2;
        }

        if weight > 8 {
            weight = if self.traits.contains(WeaponTraits::GIANT_CLUB) { 9 } else { 8 };
        }

        weight
    }
}

/// Strength weight used when fighting without a weapon.
pub const UNARMED_STR_WEIGHT: i32 = 4;

/// Shield categories, from lightest to heaviest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Shield {
    Buckler,
    Shield,
    Large,
}

impl Shield {
    /// Base blocking value before skill.
    pub const fn base_class(self) -> i32 {
        match self {
            Self::Buckler => 3,
            Self::Shield => 5,
            Self::Large => 7,
        }
    }
}

/// Worn body armour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyArmour {
    pub armour_class: i32,
    /// Zero or negative; heavier armour hinders accuracy and evasion.
    pub evasion_penalty: i32,
}

impl BodyArmour {
    /// Robes, leather and hides. Anything heavier enforces a minimum damage
    /// reduction on its wearer.
    pub const fn is_light(&self) -> bool {
        self.evasion_penalty >= -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_weight_follows_weapon_family() {
        let dagger = Weapon::new("dagger", SkillId::ShortBlades, 4, 11);
        let axe = Weapon::new("battleaxe", SkillId::Axes, 17, 17).with_hands(Hands::Two);
        let club = Weapon::new("giant club", SkillId::MacesFlails, 15, 16)
            .with_hands(Hands::Two)
            .with_traits(WeaponTraits::GIANT_CLUB);
        let whip = Weapon::new("whip", SkillId::MacesFlails, 3, 14).with_traits(WeaponTraits::WHIP);

        assert_eq!(dagger.str_weight(), 2);
        assert_eq!(axe.str_weight(), 8);
        assert_eq!(club.str_weight(), 9);
        assert_eq!(whip.str_weight(), 2);
    }

    #[test]
    fn only_edged_damage_severs() {
        assert!(DamageType::Slicing.severs());
        assert!(DamageType::Chopping.severs());
        assert!(!DamageType::Piercing.severs());
        assert!(!DamageType::Crushing.severs());
    }
}
