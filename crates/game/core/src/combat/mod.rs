//! Combat resolution pipeline.
//!
//! Resolution of one attack runs in stages, each in its own module:
//!
//! - `hit`: accuracy die against evasion, blocks, natural hits
//! - `stab`: sneak-attack tier of the opening blow
//! - `damage`: stat and skill scaling, stab chain, armour
//! - `sever`: heads lost by multi-headed defenders
//! - `brand`: table-driven weapon and ammunition brands
//! - `special`: table-driven reactive effects of monster species
//! - `speed`: recovery time and energy of the attacker
//!
//! [`CombatEngine`] in `sequence` runs the stages over every attack slot and
//! returns an [`AttackReport`]. Stages never format text; narration reads the
//! report afterwards.

mod apply;
pub mod brand;
pub mod damage;
pub mod hit;
pub mod outcome;
pub mod sequence;
pub mod sever;
pub mod special;
pub mod speed;
pub mod stab;

pub use brand::{
    BrandContext, BrandEffect, BrandResult, BrandTable, DistortionWeights, SlayTarget,
    resolve_brand,
};
pub use damage::{DamageInputs, roll_monster_damage, roll_player_damage};
pub use hit::{AccuracyInputs, AccuracySource, check_hit};
pub use outcome::{
    AppliedEffect, AttackOutcome, AttackReport, DamageRoll, Fatality, HitCheck, HitVerdict,
    Termination,
};
pub use sequence::{AttackMode, AttackRequest, AuxAttack, CombatEngine, Environment};
pub use sever::{Severance, try_sever};
pub use special::{
    Magnitude, ReactiveContext, ReactiveEffect, ReactiveKind, ReactiveResult, ReactiveTarget,
    SpecialAttackTable, Trigger, resolve_reactive,
};
pub use speed::SpeedAdjustment;
pub use stab::{StabTier, detect_stab};
