//! Catalogue of basic (primitive) kinds.
//!
//! Each kind carries a fixed flag set and a fixed byte size. A size of `-1`
//! marks the architecture-scaled kinds (`int`, `uint`, `rawptr`, `string`,
//! `any`) whose size derives from the target word size. Untyped constant
//! kinds have size `0` and no layout.

use bitflags::bitflags;

use crate::Idx;

bitflags! {
    /// Classification flags for basic kinds.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct BasicFlags: u16 {
        const BOOLEAN  = 1 << 0;
        const INTEGER  = 1 << 1;
        const UNSIGNED = 1 << 2;
        const FLOAT    = 1 << 3;
        const POINTER  = 1 << 4;
        const STRING   = 1 << 5;
        const RUNE     = 1 << 6;
        const UNTYPED  = 1 << 7;

        const NUMERIC = Self::INTEGER.bits() | Self::FLOAT.bits();
        const ORDERED = Self::NUMERIC.bits() | Self::STRING.bits() | Self::POINTER.bits();
        const CONSTANT_TYPE = Self::BOOLEAN.bits()
            | Self::NUMERIC.bits()
            | Self::POINTER.bits()
            | Self::STRING.bits()
            | Self::RUNE.bits();
    }
}

/// Basic kind, in pool order. The discriminant is the kind's fixed [`Idx`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BasicKind {
    Invalid,
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    I128,
    U128,
    F16,
    F32,
    F64,
    Int,
    Uint,
    Rawptr,
    String,
    Any,
    UntypedBool,
    UntypedInteger,
    UntypedFloat,
    UntypedString,
    UntypedRune,
    UntypedNil,
}

/// Static description of a basic kind.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct BasicType {
    pub kind: BasicKind,
    pub flags: BasicFlags,
    /// Byte size, or `-1` when scaled by the target word size.
    pub size: i64,
    pub name: &'static str,
}

impl BasicKind {
    pub const COUNT: usize = 26;

    pub const ALL: [BasicKind; Self::COUNT] = [
        BasicKind::Invalid,
        BasicKind::Bool,
        BasicKind::I8,
        BasicKind::U8,
        BasicKind::I16,
        BasicKind::U16,
        BasicKind::I32,
        BasicKind::U32,
        BasicKind::I64,
        BasicKind::U64,
        BasicKind::I128,
        BasicKind::U128,
        BasicKind::F16,
        BasicKind::F32,
        BasicKind::F64,
        BasicKind::Int,
        BasicKind::Uint,
        BasicKind::Rawptr,
        BasicKind::String,
        BasicKind::Any,
        BasicKind::UntypedBool,
        BasicKind::UntypedInteger,
        BasicKind::UntypedFloat,
        BasicKind::UntypedString,
        BasicKind::UntypedRune,
        BasicKind::UntypedNil,
    ];

    /// The fixed pool index of this kind.
    #[inline]
    pub const fn idx(self) -> Idx {
        Idx::from_raw(self as u32)
    }

    pub const fn info(self) -> BasicType {
        let (flags, size, name) = match self {
            BasicKind::Invalid => (BasicFlags::empty(), 0, "invalid type"),
            BasicKind::Bool => (BasicFlags::BOOLEAN, 1, "bool"),
            BasicKind::I8 => (BasicFlags::INTEGER, 1, "i8"),
            BasicKind::U8 => (unsigned(), 1, "u8"),
            BasicKind::I16 => (BasicFlags::INTEGER, 2, "i16"),
            BasicKind::U16 => (unsigned(), 2, "u16"),
            BasicKind::I32 => (BasicFlags::INTEGER, 4, "i32"),
            BasicKind::U32 => (unsigned(), 4, "u32"),
            BasicKind::I64 => (BasicFlags::INTEGER, 8, "i64"),
            BasicKind::U64 => (unsigned(), 8, "u64"),
            BasicKind::I128 => (BasicFlags::INTEGER, 16, "i128"),
            BasicKind::U128 => (unsigned(), 16, "u128"),
            BasicKind::F16 => (BasicFlags::FLOAT, 2, "f16"),
            BasicKind::F32 => (BasicFlags::FLOAT, 4, "f32"),
            BasicKind::F64 => (BasicFlags::FLOAT, 8, "f64"),
            BasicKind::Int => (BasicFlags::INTEGER, -1, "int"),
            BasicKind::Uint => (unsigned(), -1, "uint"),
            BasicKind::Rawptr => (BasicFlags::POINTER, -1, "rawptr"),
            BasicKind::String => (BasicFlags::STRING, -1, "string"),
            BasicKind::Any => (BasicFlags::empty(), -1, "any"),
            BasicKind::UntypedBool => (untyped(BasicFlags::BOOLEAN), 0, "untyped bool"),
            BasicKind::UntypedInteger => (untyped(BasicFlags::INTEGER), 0, "untyped integer"),
            BasicKind::UntypedFloat => (untyped(BasicFlags::FLOAT), 0, "untyped float"),
            BasicKind::UntypedString => (untyped(BasicFlags::STRING), 0, "untyped string"),
            BasicKind::UntypedRune => (
                untyped(BasicFlags::INTEGER.union(BasicFlags::RUNE)),
                0,
                "untyped rune",
            ),
            BasicKind::UntypedNil => (BasicFlags::UNTYPED, 0, "untyped nil"),
        };
        BasicType {
            kind: self,
            flags,
            size,
            name,
        }
    }

    #[inline]
    pub const fn flags(self) -> BasicFlags {
        self.info().flags
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        self.info().name
    }

    /// Whether this kind is an untyped constant kind with no layout.
    #[inline]
    pub const fn is_untyped(self) -> bool {
        self.flags().contains(BasicFlags::UNTYPED)
    }
}

const fn unsigned() -> BasicFlags {
    BasicFlags::INTEGER.union(BasicFlags::UNSIGNED)
}

const fn untyped(flags: BasicFlags) -> BasicFlags {
    flags.union(BasicFlags::UNTYPED)
}
