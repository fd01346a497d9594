//! Weapon catalog loader.

use std::path::Path;

use combat_core::Weapon;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Weapon catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeaponCatalog {
    pub weapons: Vec<Weapon>,
}

impl WeaponCatalog {
    /// Looks a weapon up by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.weapons.iter().map(|w| w.name.as_str())
    }
}

/// Loader for weapon catalogs from RON files.
pub struct WeaponLoader;

impl WeaponLoader {
    /// Load weapon catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<WeaponCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse weapon catalog RON {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<WeaponCatalog> {
        let catalog: WeaponCatalog = ron::from_str(content)?;
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::model::{Brand, Hands, SkillId, WeaponTraits};

    #[test]
    fn omitted_fields_keep_weapon_defaults() {
        let catalog = WeaponLoader::parse(
            r#"(weapons: [
                (name: "dagger", skill: ShortBlades, damage: 4, speed: 10, damage_type: Piercing, traits: ("DAGGER")),
                (name: "Great Sword", skill: LongSwords, damage: 17, speed: 17, hands: Two, brand: Flaming),
            ])"#,
        )
        .unwrap();

        let dagger = catalog.find("DAGGER").unwrap();
        assert!(dagger.traits.contains(WeaponTraits::DAGGER));
        assert_eq!(dagger.to_dam, 0);
        assert_eq!(dagger.hands, Hands::One);

        let sword = catalog.find("great sword").unwrap();
        assert_eq!(sword.skill, SkillId::LongSwords);
        assert_eq!(sword.brand, Brand::Flaming);
        assert!(catalog.find("halberd").is_none());
    }
}
