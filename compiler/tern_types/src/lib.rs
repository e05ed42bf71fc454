//! Type model, memory layout, and field selection for the Tern compiler core.
//!
//! - [`Pool`]: arena of [`Type`] nodes and [`Entity`] declarations, addressed by
//!   [`Idx`] and [`EntityId`]; resolution to base types and structural identity
//! - [`LayoutCx`]: size, alignment and offsets for a [`TargetLayout`]
//! - [`Selection`]: the result of resolving a member name
//!
//! The front end builds the pool once. Afterwards it is read-only apart from
//! the one-time memoization of struct/tuple offsets, and can be shared by
//! parallel codegen workers.

mod basic;
mod entity;
mod error;
mod identity;
mod idx;
mod layout;
mod pool;
mod select;
mod ty;

pub use basic::{BasicFlags, BasicKind, BasicType};
pub use entity::{BuiltinFields, Entity, EntityFlags, EntityId, EntityKind, MemberNames};
pub use error::PoolError;
pub use idx::Idx;
pub use layout::{align_formula, next_pow2, prev_pow2, LayoutCx, TargetLayout};
pub use pool::Pool;
pub use select::Selection;
pub use ty::{
    ArrayType, CallingConvention, EnumInfo, NamedType, ProcType, Record, RecordKind, SliceType,
    StructInfo, Tuple, Type, VectorType,
};

pub(crate) use ty::OffsetTable;

tern_ir::static_assert_size!(Idx, 4);
tern_ir::static_assert_size!(EntityId, 4);
