//! Type index handle.
//!
//! Every type lives in the [`Pool`](crate::Pool) and is referenced by a 32-bit
//! index. Basic types occupy fixed indices so they can be named without a pool.

use std::fmt;

use crate::BasicKind;

/// A 32-bit index into the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // === Basic Types ===
    // Pre-allocated at pool creation, one per `BasicKind` in declaration order.

    pub const INVALID: Self = Self(0);
    pub const BOOL: Self = Self(1);
    pub const I8: Self = Self(2);
    pub const U8: Self = Self(3);
    pub const I16: Self = Self(4);
    pub const U16: Self = Self(5);
    pub const I32: Self = Self(6);
    pub const U32: Self = Self(7);
    pub const I64: Self = Self(8);
    pub const U64: Self = Self(9);
    pub const I128: Self = Self(10);
    pub const U128: Self = Self(11);
    pub const F16: Self = Self(12);
    pub const F32: Self = Self(13);
    pub const F64: Self = Self(14);
    /// Word-sized signed integer.
    pub const INT: Self = Self(15);
    /// Word-sized unsigned integer.
    pub const UINT: Self = Self(16);
    /// Untyped pointer, one word.
    pub const RAWPTR: Self = Self(17);
    /// `{data, len}` pair, two words.
    pub const STRING: Self = Self(18);
    /// Boxed value `{type_info, data}`, two words.
    pub const ANY: Self = Self(19);
    pub const UNTYPED_BOOL: Self = Self(20);
    pub const UNTYPED_INTEGER: Self = Self(21);
    pub const UNTYPED_FLOAT: Self = Self(22);
    pub const UNTYPED_STRING: Self = Self(23);
    pub const UNTYPED_RUNE: Self = Self(24);
    pub const UNTYPED_NIL: Self = Self(25);

    /// `byte` is an alias of `u8`.
    pub const BYTE: Self = Self::U8;
    /// `rune` is an alias of `i32`.
    pub const RUNE: Self = Self::I32;

    /// First index for types allocated after the basics.
    pub const FIRST_DYNAMIC: u32 = BasicKind::COUNT as u32;

    /// Null-type sentinel.
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this index names one of the pre-allocated basic types.
    #[inline]
    pub const fn is_basic(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// The basic kind behind a pre-allocated index.
    #[inline]
    pub const fn basic_kind(self) -> Option<BasicKind> {
        if self.is_basic() {
            Some(BasicKind::ALL[self.0 as usize])
        } else {
            None
        }
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "Idx::NONE");
        }
        match self.basic_kind() {
            Some(kind) => write!(f, "Idx::{kind:?}"),
            None => write!(f, "Idx({})", self.0),
        }
    }
}

impl fmt::Display for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "<none>");
        }
        match self.basic_kind() {
            Some(kind) => write!(f, "{}", kind.name()),
            None => write!(f, "type#{}", self.0),
        }
    }
}

const _: () = assert!(std::mem::size_of::<Idx>() == 4);
