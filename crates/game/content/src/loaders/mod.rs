//! Content loaders for reading combat data from files.
//!
//! Each loader has a `load` entry point for files and a `parse` entry point
//! for in-memory text, so tests and embedders can skip the filesystem.

pub mod brands;
pub mod config;
pub mod factory;
pub mod species;
pub mod weapons;

pub use brands::BrandTableLoader;
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use species::{SpeciesCatalog, SpeciesEntry, SpeciesLoader};
pub use weapons::{WeaponCatalog, WeaponLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
