//! Declarations the type model refers to.
//!
//! Entities are owned by the [`Pool`](crate::Pool) arena and referenced by
//! [`EntityId`]. The front end creates them through the pool's entity
//! constructors; the pool itself only synthesizes the built-in accessor
//! members (see [`BuiltinFields`](crate::BuiltinFields)).

use bitflags::bitflags;
use tern_ir::Name;

use crate::Idx;

/// Handle to an entity in the pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
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
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EntityKind {
    /// Struct field, procedure parameter, or synthetic storage member.
    Variable,
    /// Enum constant, `count`, `min_value`, `max_value`.
    Constant,
    /// Declared type name; also the variants of a tagged union.
    TypeName,
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct EntityFlags: u8 {
        /// A record member occupying storage.
        const FIELD       = 1 << 0;
        /// Embedded member whose fields are promoted into the parent.
        const ANONYMOUS   = 1 << 1;
        /// `using` import of an anonymous member.
        const USING       = 1 << 2;
        /// Read-only synthetic member.
        const IMMUTABLE   = 1 << 3;
        /// Vector swizzle lane (`x`, `y`, `z`, `w`).
        const VECTOR_ELEM = 1 << 4;
    }
}

/// A named declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    pub name: Name,
    pub ty: Idx,
    pub flags: EntityFlags,
    /// Position of a field in source order (records may reorder storage).
    pub field_src_index: u32,
    /// Value of a constant entity.
    pub value: Option<i64>,
}

impl Entity {
    pub fn is_field(&self) -> bool {
        self.kind == EntityKind::Variable && self.flags.contains(EntityFlags::FIELD)
    }

    pub fn is_anonymous(&self) -> bool {
        self.flags.contains(EntityFlags::ANONYMOUS)
    }
}

/// Read-only table of synthetic members shared by every basic composite.
///
/// Built once in [`Pool::new`](crate::Pool::new). Per-type synthetic members
/// (a slice's `data`, an array's `count`, vector swizzles) are created with
/// their type instead and stored in its payload.
#[derive(Clone, Debug)]
pub struct BuiltinFields {
    /// `any.type_info`, index 0.
    pub any_type_info: EntityId,
    /// `any.data`, index 1.
    pub any_data: EntityId,
    /// `string.data` (`^u8`), index 0.
    pub string_data: EntityId,
    /// `string.count`, index 1.
    pub string_count: EntityId,
    /// `[]T.count`, index 1.
    pub slice_count: EntityId,
    /// `[]T.capacity`, index 2.
    pub slice_capacity: EntityId,
    /// Reserved slot 0 of every tagged union.
    pub union_none: EntityId,
}

/// Pre-interned member names the selector matches against.
#[derive(Copy, Clone, Debug)]
pub struct MemberNames {
    pub blank: Name,
    pub data: Name,
    pub len: Name,
    pub count: Name,
    pub capacity: Name,
    pub type_info: Name,
    pub names: Name,
    pub min_value: Name,
    pub max_value: Name,
    /// `x`, `y`, `z`, `w`.
    pub swizzle: [Name; 4],
}
