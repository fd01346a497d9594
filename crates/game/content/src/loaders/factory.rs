//! Content factory for building a combat engine from data files.

use std::path::{Path, PathBuf};

use combat_core::{BrandTable, CombatConfig, CombatEngine};
use tracing::debug;

use crate::loaders::{
    BrandTableLoader, ConfigLoader, LoadResult, SpeciesCatalog, SpeciesLoader, WeaponCatalog,
    WeaponLoader,
};

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── combat.toml
/// ├── brands.ron
/// ├── species.ron
/// └── weapons.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(crate::bundled_data_dir())
    }

    /// Load combat tunables from `combat.toml`.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        ConfigLoader::load(&self.data_dir.join("combat.toml"))
    }

    /// Load brand descriptors from `brands.ron`.
    pub fn load_brands(&self) -> LoadResult<BrandTable> {
        BrandTableLoader::load(&self.data_dir.join("brands.ron"))
    }

    /// Load species templates and reactive effects from `species.ron`.
    pub fn load_species(&self) -> LoadResult<SpeciesCatalog> {
        SpeciesLoader::load(&self.data_dir.join("species.ron"))
    }

    /// Load the weapon catalog from `weapons.ron`.
    pub fn load_weapons(&self) -> LoadResult<WeaponCatalog> {
        WeaponLoader::load(&self.data_dir.join("weapons.ron"))
    }

    /// Builds an engine from `combat.toml`, `brands.ron` and the reactive
    /// rows of `catalog`.
    pub fn build_engine(&self, catalog: &SpeciesCatalog) -> LoadResult<CombatEngine> {
        let config = self.load_config()?;
        let brands = self.load_brands()?;
        debug!(
            data_dir = %self.data_dir.display(),
            brands = brands.len(),
            species = catalog.len(),
            "combat content loaded"
        );
        Ok(CombatEngine::new(config, brands, catalog.specials().clone()))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }
}
