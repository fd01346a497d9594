//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Args;
use combat_core::model::{Brand, SkillId};

/// Player and opponent setup.
#[derive(Args, Debug, Clone)]
pub struct DuelArgs {
    /// Monster species to fight
    #[arg(short, long, default_value = "orc")]
    pub monster: String,

    /// Weapon from the catalog; fight bare-handed when omitted
    #[arg(short, long)]
    pub weapon: Option<String>,

    /// Override the weapon's brand
    #[arg(long, value_parser = parse_brand)]
    pub brand: Option<Brand>,

    /// Player hit points
    #[arg(long, default_value_t = 30)]
    pub hp: i32,

    #[arg(long = "str", default_value_t = 11)]
    pub strength: i32,

    #[arg(long = "dex", default_value_t = 11)]
    pub dexterity: i32,

    #[arg(long = "int", default_value_t = 11)]
    pub intelligence: i32,

    /// Skill levels as NAME=LEVEL, e.g. long_swords=10
    #[arg(long = "skill", value_parser = parse_skill)]
    pub skills: Vec<(SkillId, u8)>,

    /// Player armour class and evasion
    #[arg(long, default_value_t = 0)]
    pub ac: i32,

    #[arg(long, default_value_t = 10)]
    pub ev: i32,

    /// Start the monster asleep
    #[arg(long)]
    pub sleeping: bool,

    /// Both fighters stand in shallow water
    #[arg(long)]
    pub water: bool,

    /// Base seed; random when neither this nor COMBAT_SEED is set
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many rounds
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Print every attack report as a JSON line on stdout
    #[arg(long)]
    pub json: bool,

    /// Directory with combat.toml, brands.ron, species.ron and weapons.ron
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

fn parse_brand(raw: &str) -> Result<Brand, String> {
    raw.trim().parse::<Brand>().map_err(|_| format!("unknown brand '{raw}'"))
}

fn parse_skill(raw: &str) -> Result<(SkillId, u8), String> {
    let (name, level) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=LEVEL, got '{raw}'"))?;
    let skill = name
        .trim()
        .parse::<SkillId>()
        .map_err(|_| format!("unknown skill '{name}'"))?;
    let level = level
        .trim()
        .parse::<u8>()
        .map_err(|e| format!("bad level '{level}': {e}"))?;
    Ok((skill, level.min(27)))
}

/// Settings resolved from the environment, overridable by flags.
#[derive(Clone, Debug)]
pub struct DuelConfig {
    pub data_dir: PathBuf,
    pub seed: Option<u64>,
    pub max_rounds: u32,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            data_dir: combat_content::bundled_data_dir(),
            seed: None,
            max_rounds: 50,
        }
    }
}

impl DuelConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("COMBAT_DATA_DIR") {
            config.data_dir = dir;
        }
        if let Some(seed) = read_env::<u64>("COMBAT_SEED") {
            config.seed = Some(seed);
        }
        if let Some(rounds) = read_env::<u32>("COMBAT_MAX_ROUNDS") {
            config.max_rounds = rounds.max(1);
        }

        config
    }

    pub fn with_args(mut self, args: &DuelArgs) -> Self {
        if let Some(dir) = &args.data_dir {
            self.data_dir = dir.clone();
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if let Some(rounds) = args.rounds {
            self.max_rounds = rounds.max(1);
        }
        self
    }
}

fn read_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_pairs_parse() {
        assert_eq!(parse_skill("long_swords=10"), Ok((SkillId::LongSwords, 10)));
        assert_eq!(parse_skill("Stabbing = 40"), Ok((SkillId::Stabbing, 27)));
        assert!(parse_skill("juggling=3").is_err());
        assert!(parse_skill("fighting").is_err());
    }

    #[test]
    fn brands_parse_in_any_case() {
        assert_eq!(parse_brand("holy_wrath"), Ok(Brand::HolyWrath));
        assert_eq!(parse_brand("VAMPIRIC"), Ok(Brand::Vampiric));
        assert!(parse_brand("sparkly").is_err());
    }
}
