//! Species catalog loader.
//!
//! Loads monster templates together with the reactive effects their blows
//! carry, and splits them into spawnable templates and a
//! [`SpecialAttackTable`].

use std::collections::BTreeMap;
use std::path::Path;

use combat_core::combat::{ReactiveEffect, ReactiveKind};
use combat_core::{Combatant, CombatantId, SpecialAttackTable, SpeciesId, SpeciesTemplate};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// One species as written in `species.ron`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesEntry {
    pub template: SpeciesTemplate,
    #[serde(default)]
    pub reactive: Vec<ReactiveEffect>,
}

/// Spawnable species plus the reactive-effect table built from them.
#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    templates: BTreeMap<SpeciesId, SpeciesTemplate>,
    specials: SpecialAttackTable,
}

impl SpeciesCatalog {
    pub fn get(&self, id: SpeciesId) -> Option<&SpeciesTemplate> {
        self.templates.get(&id)
    }

    /// Spawns a fresh monster of `species` under `id`.
    pub fn spawn(&self, species: &str, id: CombatantId) -> Option<Combatant> {
        self.get(SpeciesId::from(species)).map(|t| t.spawn(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = SpeciesId> + '_ {
        self.templates.keys().copied()
    }

    pub fn specials(&self) -> &SpecialAttackTable {
        &self.specials
    }

    pub fn into_specials(self) -> SpecialAttackTable {
        self.specials
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Loader for species catalogs from RON files.
pub struct SpeciesLoader;

impl SpeciesLoader {
    /// Load species catalog from a RON file.
    ///
    /// RON format: `Vec<SpeciesEntry>`
    ///
    /// # Validation
    ///
    /// - Species ids must be unique.
    /// - `Chaos` rows may only borrow from species defined in the same file.
    pub fn load(path: &Path) -> LoadResult<SpeciesCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load species catalog {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<SpeciesCatalog> {
        let entries: Vec<SpeciesEntry> = ron::from_str(content)?;

        let mut catalog = SpeciesCatalog::default();
        for entry in entries {
            let id = entry.template.id;
            if catalog.templates.contains_key(&id) {
                anyhow::bail!("duplicate species '{}'", id);
            }
            if !entry.reactive.is_empty() {
                catalog.specials.insert(id, entry.reactive);
            }
            catalog.templates.insert(id, entry.template);
        }

        for id in catalog.specials.species() {
            for effect in catalog.specials.effects_for(id) {
                if let ReactiveKind::Chaos(pool) = &effect.kind
                    && let Some(missing) = pool.iter().find(|s| !catalog.templates.contains_key(s))
                {
                    anyhow::bail!("species '{}' borrows effects from unknown species '{}'", id, missing);
                }
            }
        }

        Ok(catalog)
    }
}
