//! Errors raised while building the type graph.

use thiserror::Error;

use crate::Idx;

/// Construction error for named types.
///
/// Everything else the pool rejects is an internal invariant violation and
/// panics instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("illegal declaration cycle: `{name}` would become its own base type")]
    NamedCycle { name: String },

    #[error("{ty:?} is not a named type")]
    NotNamed { ty: Idx },

    #[error("base type of `{name}` is already set")]
    BaseAlreadySet { name: String },
}
