//! Interned identifiers shared by the Tern compiler core.
//!
//! [`Name`] is a 32-bit handle into a [`StringInterner`]. Entities and
//! named types carry `Name`s, so the field selector compares members by
//! handle rather than by text.

/// Fails the build when `$ty` is not exactly `$size` bytes.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod interner;
mod name;

pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;

static_assert_size!(Name, 4);
