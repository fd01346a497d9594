//! Data-driven combat content and loaders.
//!
//! This crate houses the bundled combat data and provides loaders for RON/TOML
//! data files:
//! - Combat tunables (data-driven via TOML)
//! - Brand descriptors (data-driven via RON)
//! - Species templates and their reactive effects (data-driven via RON)
//! - Weapon catalogs (data-driven via RON)
//!
//! All loaders use combat-core types directly with serde for RON/TOML
//! deserialization. Adding a species or brand is a data change, not a code
//! change.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    BrandTableLoader, ConfigLoader, ContentFactory, SpeciesCatalog, SpeciesEntry, SpeciesLoader,
    WeaponCatalog, WeaponLoader,
};

/// Directory holding the data files shipped with this crate.
pub fn bundled_data_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}
