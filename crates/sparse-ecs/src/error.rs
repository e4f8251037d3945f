//! World error types.

use thiserror::Error;

/// Errors reported by the type-keyed parts of the [`World`](crate::World).
///
/// Hot-path contract violations (adding an entity twice, removing an absent
/// one) are not represented here; they are debug assertions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// A pool for this component type was already created.
    #[error("pool for component `{component}` already exists")]
    PoolExists {
        /// Type name of the component.
        component: &'static str,
    },

    /// No pool was created for this component type.
    #[error("no pool for component `{component}`; create it before use")]
    MissingPool {
        /// Type name of the component.
        component: &'static str,
    },
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
