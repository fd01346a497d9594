//! Deterministic melee and missile combat resolution.
//!
//! `combat-core` resolves one attacker's action against one defender: to-hit,
//! stabbing, damage, brands, severing, reactive species effects and recovery
//! time. It performs no I/O. Randomness comes from an [`env::RngOracle`],
//! status changes go through an [`env::EffectSink`], and every resolution
//! returns an [`AttackReport`] that [`narration`] can turn into text.
//!
//! All entry points live on [`CombatEngine`]; supporting crates depend on the
//! types re-exported here.
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod model;
pub mod narration;

pub use combat::{
    AppliedEffect, AttackMode, AttackOutcome, AttackReport, AttackRequest, BrandTable,
    CombatEngine, Environment, Fatality, HitVerdict, SpecialAttackTable, SpeedAdjustment,
    StabTier, Termination,
};
pub use config::{
    BrandConfig, CombatConfig, DamageConfig, HitConfig, SpeedConfig, StabConfig, StabOrder,
};
pub use env::{
    EffectSink, MessageLog, MessageSink, NullMessages, PcgRng, RecordingEffects, RngOracle,
    ScriptedRng,
};
pub use error::{CombatError, ConfigError, ErrorSeverity, GameError};
pub use model::{
    Combatant, CombatantFlags, CombatantId, CombatantRegistry, SkillId, SpeciesId,
    SpeciesTemplate, Weapon,
};
pub use narration::{Names, narrate};
