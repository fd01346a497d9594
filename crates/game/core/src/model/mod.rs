//! Combatant data model: attributes, equipment, statuses and the registry
//! that owns them.
mod combatant;
mod registry;
mod species;
mod stats;
mod status;
mod weapon;

pub use combatant::{
    Behaviour, BodyTraits, Combatant, CombatantFlags, CombatantId, CombatantKind, Element,
    Holiness, NaturalAttack, Resistances, Transformation,
};
pub use registry::CombatantRegistry;
pub use species::{SpeciesId, SpeciesTemplate};
pub use stats::{SkillId, SkillSet, Skills, StatKind, Stats};
pub use status::{Status, StatusKind, StatusSet};
pub use weapon::{
    BodyArmour, Brand, DamageType, Hands, Shield, UNARMED_STR_WEIGHT, Weapon, WeaponTraits,
};
