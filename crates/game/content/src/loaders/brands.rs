//! Brand table loader.

use std::path::Path;

use combat_core::BrandTable;

use crate::loaders::{LoadResult, read_file};

/// Loader for brand descriptors from RON files.
///
/// RON format: a map from brand to effect. Brands the file leaves out are
/// inert.
///
/// ```ron
/// {
///     Flaming: Elemental(Fire),
///     Vampiric: Vampiric,
///     Distortion: Distortion((small: 9, large: 6)),
/// }
/// ```
pub struct BrandTableLoader;

impl BrandTableLoader {
    pub fn load(path: &Path) -> LoadResult<BrandTable> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse brand table RON {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<BrandTable> {
        let table: BrandTable = ron::from_str(content)?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::combat::{BrandEffect, DistortionWeights};
    use combat_core::model::{Brand, Element};

    #[test]
    fn listed_brands_take_effect() {
        let table = BrandTableLoader::parse(
            "{ Flaming: Elemental(Fire), Speed: Haste, Confusion: Confusion(turns: 3) }",
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.effect(Brand::Flaming), BrandEffect::Elemental(Element::Fire));
        assert!(table.hastes(Brand::Speed));
        assert_eq!(table.effect(Brand::Confusion), BrandEffect::Confusion { turns: 3 });
        assert_eq!(table.effect(Brand::Vorpal), BrandEffect::Inert);
    }

    #[test]
    fn distortion_weights_fill_defaults() {
        let table = BrandTableLoader::parse("{ Distortion: Distortion((defeat: 0)) }").unwrap();
        let BrandEffect::Distortion(weights) = table.effect(Brand::Distortion) else {
            panic!("distortion brand missing");
        };
        assert_eq!(weights.defeat, 0);
        assert_eq!(weights.small, DistortionWeights::default().small);
    }
}
