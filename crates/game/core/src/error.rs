//! Common error infrastructure for combat-core.
//!
//! The engine is a numeric pipeline over validated inputs, so its error
//! surface is narrow: every variant of [`CombatError`] is a broken caller
//! contract, and [`ConfigError`] covers tunables rejected at load time.
//! Degenerate numbers inside a resolution are clamped in place.

use crate::model::CombatantId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: temporary conditions that may succeed on retry
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: the caller broke a contract the engine relies on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug in the caller or engine.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all combat-core errors.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant, for logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Precondition violations detected at the engine's entry points.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error("combatant {0} is not in the registry")]
    CombatantNotFound(CombatantId),

    #[error("combatant {0} cannot attack itself")]
    SelfTarget(CombatantId),

    #[error("combatant {0} has no weapon for a {1} attack")]
    MissingWeapon(CombatantId, &'static str),

    #[error("attack slot {slot} is out of range (combatant {attacker} has {available})")]
    SlotOutOfRange {
        attacker: CombatantId,
        slot: usize,
        available: usize,
    },

    #[error("defender {0} is already dead")]
    DefenderAlreadyDead(CombatantId),
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CombatantNotFound(_) | Self::SelfTarget(_) | Self::DefenderAlreadyDead(_) => {
                ErrorSeverity::Validation
            }
            Self::MissingWeapon(..) | Self::SlotOutOfRange { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CombatantNotFound(_) => "COMBAT_COMBATANT_NOT_FOUND",
            Self::SelfTarget(_) => "COMBAT_SELF_TARGET",
            Self::MissingWeapon(..) => "COMBAT_MISSING_WEAPON",
            Self::SlotOutOfRange { .. } => "COMBAT_SLOT_OUT_OF_RANGE",
            Self::DefenderAlreadyDead(_) => "COMBAT_DEFENDER_ALREADY_DEAD",
        }
    }
}

/// Tunables rejected by [`CombatConfig::validate`](crate::CombatConfig::validate).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("[{section}] {field} must be positive, got {value}")]
    NonPositive {
        section: &'static str,
        field: String,
        value: i32,
    },
}

impl GameError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositive { .. } => "CONFIG_NON_POSITIVE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_breaches_are_fatal() {
        let err = CombatError::MissingWeapon(CombatantId(3), "missile");
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert!(err.severity().is_internal());
        assert_eq!(err.error_code(), "COMBAT_MISSING_WEAPON");
        assert_eq!(err.to_string(), "combatant #3 has no weapon for a missile attack");
    }

    #[test]
    fn lookup_failures_are_validation_errors() {
        let err = CombatError::CombatantNotFound(CombatantId(9));
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert!(!err.severity().is_recoverable());
    }

    #[test]
    fn config_errors_name_the_key() {
        let err = ConfigError::NonPositive {
            section: "damage",
            field: "main.fighting_divisor".into(),
            value: 0,
        };
        assert_eq!(err.to_string(), "[damage] main.fighting_divisor must be positive, got 0");
        assert_eq!(err.error_code(), "CONFIG_NON_POSITIVE");
    }
}
