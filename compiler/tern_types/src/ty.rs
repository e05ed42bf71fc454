//! The type node and its payloads.
//!
//! `Type` is a closed sum over every kind the compiler core lays out.
//! Structural kinds (`Pointer`, `Array`, `Vector`, `Slice`) are hash-consed by
//! the pool; aggregates, named types, tuples and procedures are always fresh.

use std::sync::OnceLock;

use smallvec::SmallVec;
use tern_ir::Name;

use crate::{BasicKind, EntityId, Idx, TargetLayout};

/// A node in the type pool.
#[derive(Debug)]
pub enum Type {
    Basic(BasicKind),
    Pointer { elem: Idx },
    Array(ArrayType),
    Vector(VectorType),
    Slice(SliceType),
    Record(Record),
    Named(NamedType),
    Tuple(Tuple),
    Proc(ProcType),
}

/// `[count]elem`.
#[derive(Debug)]
pub struct ArrayType {
    pub elem: Idx,
    pub count: i64,
    /// Constant `count` member.
    pub count_entity: EntityId,
}

/// `[vector count]elem`.
#[derive(Debug)]
pub struct VectorType {
    pub elem: Idx,
    pub count: i64,
    /// Constant `count` member.
    pub count_entity: EntityId,
    /// Swizzle lanes `x`..`w`; empty when `count > 4` or the element is boolean.
    pub swizzle: SmallVec<[EntityId; 4]>,
}

/// `[]elem`: data pointer, count, capacity.
#[derive(Debug)]
pub struct SliceType {
    pub elem: Idx,
    /// `data` member of type `^elem`.
    pub data_entity: EntityId,
}

/// An aggregate: struct, enum, raw union or tagged union.
#[derive(Debug)]
pub struct Record {
    pub kind: RecordKind,
    /// Members in declaration order. Tagged unions reserve slot 0.
    pub fields: Vec<EntityId>,
    /// Type-level `names` member, present on enums.
    pub names: Option<EntityId>,
    pub(crate) offsets: OffsetTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Struct(StructInfo),
    Enum(EnumInfo),
    RawUnion,
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StructInfo {
    pub packed: bool,
    pub ordered: bool,
    /// Explicit `#align`; `0` when absent.
    pub custom_align: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumInfo {
    /// Underlying integer type.
    pub base: Idx,
    pub count: EntityId,
    pub min_value: EntityId,
    pub max_value: EntityId,
}

/// A declared type name.
#[derive(Debug)]
pub struct NamedType {
    pub name: Name,
    /// Underlying type; `Idx::NONE` until the declaration is resolved.
    pub base: Idx,
    /// The declaring `TypeName` entity.
    pub entity: EntityId,
}

/// Ordered member list, used for parameter and result lists.
#[derive(Debug)]
pub struct Tuple {
    pub members: Vec<EntityId>,
    pub(crate) offsets: OffsetTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcType {
    /// Parameter tuple, or `Idx::NONE`.
    pub params: Idx,
    /// Result tuple, or `Idx::NONE`.
    pub results: Idx,
    pub variadic: bool,
    pub call_conv: CallingConvention,
}

/// Calling convention tag carried by procedure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum CallingConvention {
    /// Language convention; receives the implicit context pointer.
    #[default]
    Native,
    /// Language convention without the context pointer.
    Contextless,
    CDecl,
    StdCall,
    FastCall,
    /// Foreign passthrough: no classification.
    None,
    InlineAsm,
    Win64,
    SysV,
}

impl CallingConvention {
    /// Conventions whose arguments bypass classification.
    pub fn is_passthrough(self) -> bool {
        matches!(self, CallingConvention::None | CallingConvention::InlineAsm)
    }

    /// Source spelling, as in `proc "c" ()`.
    pub fn as_str(self) -> &'static str {
        match self {
            CallingConvention::Native => "tern",
            CallingConvention::Contextless => "contextless",
            CallingConvention::CDecl => "c",
            CallingConvention::StdCall => "stdcall",
            CallingConvention::FastCall => "fastcall",
            CallingConvention::None => "none",
            CallingConvention::InlineAsm => "inline-asm",
            CallingConvention::Win64 => "win64",
            CallingConvention::SysV => "sysv",
        }
    }
}

/// Memoized member offsets of a struct or tuple.
///
/// Written at most once; concurrent first computations block on the cell.
/// The layout the offsets were computed under is kept so a request under a
/// different target is caught instead of answered wrongly.
#[derive(Debug, Default)]
pub(crate) struct OffsetTable {
    cell: OnceLock<(TargetLayout, Box<[i64]>)>,
}

impl OffsetTable {
    pub(crate) fn get_or_compute(
        &self,
        layout: TargetLayout,
        compute: impl FnOnce() -> Box<[i64]>,
    ) -> &[i64] {
        let (computed_for, offsets) = self.cell.get_or_init(|| (layout, compute()));
        assert!(
            *computed_for == layout,
            "offsets memoized for {computed_for:?} requested under {layout:?}"
        );
        offsets
    }
}
