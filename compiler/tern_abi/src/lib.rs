//! Calling-convention classification for the Tern compiler.
//!
//! Turns procedure types from a [`tern_types::Pool`] into the physical
//! argument-passing layout of a target platform:
//!
//! - [`Target`]: architecture, OS and size parameters, parsed from a triple
//! - [`ReprType`]: representation-level types with their own size rules
//! - [`Lowering`]: front-end type to representation
//! - [`classify`]: per-architecture classification into a [`FunctionAbi`]
//! - [`AbiCache`]: one classification per distinct procedure type
//!
//! # Key Distinction
//!
//! - **`tern_types::ProcType`** = *semantic*: parameter entities, variadic flag
//! - **`FunctionAbi`** = *physical*: `Direct`/`Indirect`/`Ignore` per slot,
//!   casts, attributes, the split multi-value return
//!
//! # Debugging
//!
//! - `RUST_LOG=tern_abi=debug`: cache misses and return splits
//! - `RUST_LOG=tern_abi=trace`: every classifier decision
//! - `RUST_LOG=tern_abi::classify::sysv=trace`: eightbyte classes only

mod abi;
mod cache;
mod classify;
mod lower;
mod repr;
mod target;

pub use abi::{ArgAttr, ArgClass, ArgRepr, FunctionAbi, Signature, SplitReturn};
pub use cache::AbiCache;
pub use classify::classify;
pub use lower::Lowering;
pub use repr::ReprType;
pub use target::{Target, TargetAbi, TargetArch, TargetError, TargetOs, TargetTripleComponents};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing` subscriber filtered by `RUST_LOG`, e.g.
/// `RUST_LOG=tern_abi=debug` to see ABI cache misses. Does nothing when
/// `RUST_LOG` is unset; later calls are no-ops.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(filter) = EnvFilter::try_from_default_env() else {
            return;
        };
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init();
    });
}
