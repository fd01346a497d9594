//! External collaborators of the combat pipeline.
//!
//! The engine draws randomness from an [`RngOracle`], pushes status
//! mutations through an [`EffectSink`], and leaves narration to a
//! [`MessageSink`]. Each has a default implementation good enough for
//! simulations and tests.
mod effects;
mod messages;
mod rng;

pub use effects::{EffectSink, LevelDrain, RecordingEffects, Relocation};
pub use messages::{MessageLog, MessageSink, NullMessages};
pub use rng::{Exhausted, PcgRng, RngOracle, ScriptedRng, compute_seed};
