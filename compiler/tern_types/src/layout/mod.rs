//! Memory layout: size, alignment and member offsets.
//!
//! All functions are pure over (target layout, pool). Struct and tuple
//! offsets are computed once per node and memoized in the node itself.
//!
//! Every walk carries a [`TypePath`] of the named types and aggregates it is
//! currently inside. Re-entering one of them through by-value members is an
//! illegal declaration cycle and aborts with the cycle printed.

use smallvec::SmallVec;
use tern_stack::ensure_sufficient_stack;

use crate::{BasicKind, BasicType, EntityId, Idx, Pool, RecordKind, Selection, Type};

/// The architecture parameters layout depends on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetLayout {
    /// Native integer/pointer width in bytes.
    pub word_size: i64,
    /// Upper bound on any alignment.
    pub max_align: i64,
}

impl TargetLayout {
    pub const fn new(word_size: i64, max_align: i64) -> Self {
        Self {
            word_size,
            max_align,
        }
    }
}

/// Round `size` up to a multiple of `align`; `size` unchanged if `align <= 0`.
#[inline]
pub const fn align_formula(size: i64, align: i64) -> i64 {
    if align > 0 {
        let result = size + align - 1;
        result - result % align
    } else {
        size
    }
}

/// Smallest power of two `>= n`; `0` for `n <= 0`.
pub fn next_pow2(n: i64) -> i64 {
    u64::try_from(n)
        .ok()
        .filter(|&n| n > 0)
        .and_then(|n| i64::try_from(n.next_power_of_two()).ok())
        .unwrap_or(0)
}

/// Largest power of two `<= n`; `0` for `n <= 0`.
pub fn prev_pow2(n: i64) -> i64 {
    if n <= 0 {
        0
    } else {
        1 << (63 - n.leading_zeros())
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Types currently being laid out, innermost last.
#[derive(Default)]
struct TypePath {
    path: SmallVec<[Idx; 8]>,
}

impl TypePath {
    fn enter(&mut self, pool: &Pool, ty: Idx) {
        if self.path.contains(&ty) {
            let mut cycle: Vec<String> = self
                .path
                .iter()
                .skip_while(|&&p| p != ty)
                .filter(|&&p| pool.is_named(p))
                .map(|&p| pool.format_type(p))
                .collect();
            cycle.push(pool.format_type(ty));
            tracing::error!(cycle = cycle.join(" -> "), "illegal declaration cycle");
            panic!(
                "illegal declaration cycle of `{}`: {}",
                pool.format_type(ty),
                cycle.join(" refers to ")
            );
        }
        self.path.push(ty);
    }

    fn leave(&mut self) {
        self.path.pop();
    }
}

/// Layout queries against one pool and target.
#[derive(Copy, Clone)]
pub struct LayoutCx<'p> {
    pool: &'p Pool,
    target: TargetLayout,
}

impl<'p> LayoutCx<'p> {
    pub fn new(pool: &'p Pool, target: TargetLayout) -> Self {
        Self { pool, target }
    }

    pub fn pool(&self) -> &'p Pool {
        self.pool
    }

    pub fn target(&self) -> TargetLayout {
        self.target
    }

    /// Byte size of `ty`; `0` for `Idx::NONE`.
    pub fn size_of(&self, ty: Idx) -> i64 {
        if ty.is_none() {
            return 0;
        }
        self.size_in(ty, &mut TypePath::default())
    }

    /// Alignment of `ty`; `1` for `Idx::NONE`.
    pub fn align_of(&self, ty: Idx) -> i64 {
        if ty.is_none() {
            return 1;
        }
        self.align_in(ty, &mut TypePath::default())
    }

    /// Memoized member offsets of a struct or tuple.
    pub fn field_offsets(&self, ty: Idx) -> &'p [i64] {
        self.offsets_in(self.pool.base_type(ty), &mut TypePath::default())
    }

    /// Byte offset of storage member `index` of `ty`.
    ///
    /// # Panics
    /// Panics when `ty` has no member `index`.
    pub fn offset_of(&self, ty: Idx, index: usize) -> i64 {
        let pool = self.pool;
        let base = pool.base_type(ty);
        let word = self.target.word_size;
        match pool.get(base) {
            Type::Record(record) if index < record.fields.len() => match record.kind {
                RecordKind::Struct(_) => self.field_offsets(base)[index],
                RecordKind::Union | RecordKind::RawUnion => 0,
                RecordKind::Enum(_) => {
                    panic!("enum `{}` has no storage members", pool.format_type(ty))
                }
            },
            Type::Tuple(tuple) if index < tuple.members.len() => self.field_offsets(base)[index],
            Type::Basic(BasicKind::String | BasicKind::Any) if index < 2 => to_i64(index) * word,
            Type::Slice(_) if index < 3 => to_i64(index) * word,
            Type::Vector(vector) if to_i64(index) < vector.count => {
                let stride = align_formula(self.size_of(vector.elem), self.align_of(vector.elem));
                stride * to_i64(index)
            }
            _ => panic!(
                "member index {index} out of range for `{}`",
                pool.format_type(ty)
            ),
        }
    }

    /// Byte offset of the member a selection reaches, summed along its path.
    ///
    /// # Panics
    /// Panics when the selection crosses a pointer.
    pub fn offset_of_selection(&self, ty: Idx, sel: &Selection) -> i64 {
        let pool = self.pool;
        assert!(
            !sel.indirect,
            "offset requested through a pointer indirection in `{}`",
            pool.format_type(ty)
        );
        let mut current = ty;
        let mut offset = 0;
        for &index in &sel.index {
            let index = index as usize;
            let base = pool.base_type(current);
            offset += self.offset_of(base, index);
            current = match pool.member_at(base, index) {
                Some(member) => pool.entity(member).ty,
                None => panic!(
                    "member index {index} out of range for `{}`",
                    pool.format_type(base)
                ),
            };
        }
        offset
    }

    fn size_in(&self, ty: Idx, path: &mut TypePath) -> i64 {
        let pool = self.pool;
        let word = self.target.word_size;
        ensure_sufficient_stack(|| match pool.get(ty) {
            Type::Named(named) => {
                let base = self.named_base(ty, named.base);
                path.enter(pool, ty);
                let size = self.size_in(base, path);
                path.leave();
                size
            }
            Type::Basic(kind) => {
                let size = self.basic_info(*kind).size;
                match kind {
                    _ if size > 0 => size,
                    BasicKind::String | BasicKind::Any => 2 * word,
                    _ => word,
                }
            }
            Type::Array(array) => self.stride_size(array.elem, array.count, path),
            Type::Vector(vector) => self.stride_size(vector.elem, vector.count, path),
            Type::Slice(_) => 3 * word,
            Type::Pointer { .. } | Type::Proc(_) => word,
            Type::Tuple(tuple) => match tuple.members.last() {
                None => 0,
                Some(&last) => self.sequential_size(ty, pool.entity(last).ty, path),
            },
            Type::Record(record) => match record.kind {
                RecordKind::Struct(_) => match record.fields.last() {
                    None => 0,
                    Some(&last) => self.sequential_size(ty, pool.entity(last).ty, path),
                },
                RecordKind::Union => {
                    let align = self.align_in(ty, path);
                    path.enter(pool, ty);
                    let max = self.max_member_size(record.fields.get(1..).unwrap_or_default(), path);
                    path.leave();
                    // Variants overlap at offset 0; the tag follows on a word boundary.
                    let size = align_formula(max, word) + self.size_in(Idx::INT, path);
                    align_formula(size, align)
                }
                RecordKind::RawUnion => {
                    let align = self.align_in(ty, path);
                    path.enter(pool, ty);
                    let max = self.max_member_size(&record.fields, path);
                    path.leave();
                    align_formula(max, align)
                }
                RecordKind::Enum(info) => self.size_in(info.base, path),
            },
        })
    }

    fn align_in(&self, ty: Idx, path: &mut TypePath) -> i64 {
        let pool = self.pool;
        let word = self.target.word_size;
        let max_align = self.target.max_align;
        ensure_sufficient_stack(|| match pool.get(ty) {
            Type::Named(named) => {
                let base = self.named_base(ty, named.base);
                path.enter(pool, ty);
                let align = self.align_in(base, path);
                path.leave();
                align
            }
            Type::Basic(kind) => match kind {
                BasicKind::String
                | BasicKind::Any
                | BasicKind::Int
                | BasicKind::Uint
                | BasicKind::Rawptr => word,
                _ => self.fallback_align(self.basic_info(*kind).size),
            },
            Type::Array(array) => self.align_in(array.elem, path),
            Type::Vector(vector) => {
                let elem_size = self.size_in(vector.elem, path);
                let lanes = prev_pow2(vector.count).max(1);
                (elem_size * lanes).clamp(1, max_align)
            }
            Type::Slice(_) | Type::Pointer { .. } | Type::Proc(_) => word,
            Type::Tuple(tuple) => {
                path.enter(pool, ty);
                let align = tuple
                    .members
                    .iter()
                    .map(|&m| self.align_in(pool.entity(m).ty, path))
                    .fold(1, i64::max);
                path.leave();
                align
            }
            Type::Record(record) => match record.kind {
                RecordKind::Struct(info) if info.custom_align > 0 => {
                    info.custom_align.clamp(1, max_align)
                }
                RecordKind::Struct(_) if record.fields.is_empty() => 1,
                RecordKind::Struct(_) | RecordKind::RawUnion => {
                    self.max_member_align(ty, &record.fields, 1, path)
                }
                RecordKind::Union => self.max_member_align(
                    ty,
                    record.fields.get(1..).unwrap_or_default(),
                    word,
                    path,
                ),
                RecordKind::Enum(info) => self.align_in(info.base, path),
            },
        })
    }

    fn offsets_in(&self, ty: Idx, path: &mut TypePath) -> &'p [i64] {
        let pool = self.pool;
        let (members, table, packed) = match pool.get(ty) {
            Type::Record(record) => match record.kind {
                RecordKind::Struct(info) => (&record.fields, &record.offsets, info.packed),
                _ => panic!("`{}` has no sequential offsets", pool.format_type(ty)),
            },
            Type::Tuple(tuple) => (&tuple.members, &tuple.offsets, false),
            _ => panic!("`{}` has no sequential offsets", pool.format_type(ty)),
        };
        table.get_or_compute(self.target, || {
            path.enter(pool, ty);
            let mut offsets = Vec::with_capacity(members.len());
            let mut current = 0;
            for &member in members {
                let member_ty = pool.entity(member).ty;
                if !packed {
                    current = align_formula(current, self.align_in(member_ty, path));
                }
                offsets.push(current);
                current += self.size_in(member_ty, path);
            }
            path.leave();
            tracing::trace!(ty = ty.raw(), members = members.len(), packed, "memoized offsets");
            offsets.into_boxed_slice()
        })
    }

    /// Size of a struct or tuple whose last member has type `last`.
    fn sequential_size(&self, ty: Idx, last: Idx, path: &mut TypePath) -> i64 {
        let align = self.align_in(ty, path);
        let offsets = self.offsets_in(ty, path);
        let last_offset = offsets.last().copied().unwrap_or(0);
        path.enter(self.pool, ty);
        let last_size = self.size_in(last, path);
        path.leave();
        align_formula(last_offset + last_size, align)
    }

    /// Every element but the last is padded to the element alignment.
    fn stride_size(&self, elem: Idx, count: i64, path: &mut TypePath) -> i64 {
        if count == 0 {
            return 0;
        }
        let align = self.align_in(elem, path);
        let size = self.size_in(elem, path);
        align_formula(size, align) * (count - 1) + size
    }

    fn max_member_size(&self, members: &[EntityId], path: &mut TypePath) -> i64 {
        members
            .iter()
            .map(|&m| self.size_in(self.pool.entity(m).ty, path))
            .fold(0, i64::max)
    }

    fn max_member_align(
        &self,
        ty: Idx,
        members: &[EntityId],
        floor: i64,
        path: &mut TypePath,
    ) -> i64 {
        path.enter(self.pool, ty);
        let align = members
            .iter()
            .map(|&m| self.align_in(self.pool.entity(m).ty, path))
            .fold(floor, i64::max);
        path.leave();
        align
    }

    fn fallback_align(&self, size: i64) -> i64 {
        next_pow2(size).clamp(1, self.target.word_size)
    }

    fn named_base(&self, ty: Idx, base: Idx) -> Idx {
        assert!(
            !base.is_none(),
            "layout of unresolved named type `{}`",
            self.pool.format_type(ty)
        );
        base
    }

    fn basic_info(&self, kind: BasicKind) -> BasicType {
        assert!(
            kind != BasicKind::Invalid && !kind.is_untyped(),
            "`{}` has no layout",
            kind.name()
        );
        kind.info()
    }
}
