//! Error type for scenario construction, insertion and orders.
//!
//! Only operations that validate caller input return errors. Runtime
//! degradations inside a tick (fuel exhaustion, a target that vanished) are
//! absorbed into entity state and reported as [`TickEvent`]s instead.
//!
//! [`TickEvent`]: crate::events::TickEvent

use thiserror::Error;

use crate::entity::{EntityKey, SideId};

/// Errors surfaced synchronously by [`Scenario`](crate::Scenario) operations.
///
/// A failed operation never leaves partial state behind: validation runs
/// before anything is mutated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    /// Malformed construction parameters or order arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An entity with the same `(side, id)` is already present.
    #[error("entity {0} already exists")]
    DuplicateEntity(EntityKey),

    /// A side with the same id was already registered.
    #[error("side {0} already exists")]
    DuplicateSide(SideId),

    /// The entity record violates an invariant.
    #[error("invalid entity {key}: {reason}")]
    InvalidEntity {
        /// Key of the rejected entity.
        key: EntityKey,
        /// First violated invariant.
        reason: String,
    },

    /// An order addressed an entity that does not exist.
    #[error("entity {0} not found")]
    NotFound(EntityKey),

    /// Return-to-base was ordered but the side has no base to return to.
    #[error("no base available for {0}")]
    NoBaseAvailable(EntityKey),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScenarioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let key = EntityKey::new("blue", "viper-1");
        assert_eq!(
            ScenarioError::DuplicateEntity(key.clone()).to_string(),
            "entity blue/viper-1 already exists"
        );
        assert_eq!(
            ScenarioError::InvalidEntity {
                key: key.clone(),
                reason: "heading 400 is outside [0, 360)".into(),
            }
            .to_string(),
            "invalid entity blue/viper-1: heading 400 is outside [0, 360)"
        );
        assert_eq!(
            ScenarioError::NotFound(key).to_string(),
            "entity blue/viper-1 not found"
        );
    }

    #[test]
    fn implements_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<ScenarioError>();
    }
}
