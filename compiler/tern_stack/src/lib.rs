//! Stack safety for recursive type-graph walks.
//!
//! Layout, structural identity, field selection and ABI classification all
//! recurse over the type graph. Deeply nested declarations (arrays of structs
//! of arrays, long chains of embedded members) can exhaust the default thread
//! stack, so every recursive entry point wraps itself in
//! [`ensure_sufficient_stack`].
//!
//! On native targets the stack is grown on demand through `stacker`; on
//! `wasm32` the call is a passthrough.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if fewer than `RED_ZONE` bytes remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
