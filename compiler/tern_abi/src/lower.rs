//! Front-end type to representation lowering.
//!
//! Every lowered aggregate has exactly the size the layout engine computes
//! for its source type. Members are placed at the layout engine's offsets:
//! a naturally aligned struct is used when the representation alignment
//! rules reproduce those offsets (with explicit `[n x i8]` padding where the
//! gap is larger than alignment alone would leave), otherwise a packed
//! struct with explicit padding. Arrays whose element stride exceeds the
//! element size pad every element but the last.

use tern_stack::ensure_sufficient_stack;
use tern_types::{align_formula, BasicKind, Idx, LayoutCx, Pool, RecordKind, Type};

use crate::{ArgRepr, ReprType, Signature, Target};

/// Lowers pool types for one target.
#[derive(Clone, Copy)]
pub struct Lowering<'p> {
    pool: &'p Pool,
    target: Target,
    layout: LayoutCx<'p>,
}

impl<'p> Lowering<'p> {
    pub fn new(pool: &'p Pool, target: Target) -> Self {
        Self {
            pool,
            target,
            layout: LayoutCx::new(pool, target.layout()),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The representation of `ty`; `void` for `Idx::NONE`.
    ///
    /// # Panics
    /// Panics on unresolved named types, on `invalid`, and on untyped
    /// constant kinds.
    pub fn lower(&self, ty: Idx) -> ReprType {
        if ty.is_none() {
            return ReprType::Void;
        }
        let pool = self.pool;
        let word = self.target.word_size;
        ensure_sufficient_stack(|| match pool.get(ty) {
            Type::Named(named) => {
                assert!(
                    !named.base.is_none(),
                    "lowering unresolved named type `{}`",
                    pool.format_type(ty)
                );
                self.lower(named.base)
            }
            Type::Basic(kind) => self.basic(*kind),
            Type::Pointer { .. } | Type::Proc(_) => ReprType::Pointer,
            Type::Array(array) => self.array(ty, array.elem, array.count),
            Type::Vector(vector) => ReprType::vector(self.lower(vector.elem), vector.count),
            Type::Slice(_) => self.data_and_words(2),
            Type::Tuple(tuple) => {
                let offsets = self.layout.field_offsets(ty);
                let members = tuple
                    .members
                    .iter()
                    .zip(offsets)
                    .map(|(&m, &offset)| (self.member_repr(pool.entity(m).ty), offset))
                    .collect::<Vec<_>>();
                self.sequence(&members, self.layout.size_of(ty), false)
            }
            Type::Record(record) => match record.kind {
                RecordKind::Struct(_) if record.fields.is_empty() => ReprType::empty_struct(),
                RecordKind::Struct(info) => {
                    let offsets = self.layout.field_offsets(ty);
                    let members = record
                        .fields
                        .iter()
                        .zip(offsets)
                        .map(|(&f, &offset)| (self.member_repr(pool.entity(f).ty), offset))
                        .collect::<Vec<_>>();
                    self.sequence(&members, self.layout.size_of(ty), info.packed)
                }
                RecordKind::Union => {
                    let largest = record
                        .fields
                        .iter()
                        .skip(1)
                        .map(|&v| self.layout.size_of(pool.entity(v).ty))
                        .fold(0, i64::max);
                    let block = align_formula(largest, word);
                    let tag = (ReprType::int_bytes(word), block);
                    let members = if block > 0 {
                        vec![(ReprType::filler(block, word), 0), tag]
                    } else {
                        vec![tag]
                    };
                    self.sequence(&members, self.layout.size_of(ty), false)
                }
                RecordKind::RawUnion => match self.layout.size_of(ty) {
                    0 => ReprType::empty_struct(),
                    size => ReprType::struct_of(vec![ReprType::filler(
                        size,
                        self.layout.align_of(ty),
                    )]),
                },
                RecordKind::Enum(info) => self.lower(info.base),
            },
        })
    }

    /// The classifier input for a procedure type.
    ///
    /// String and slice parameters are marked slice-like. Several results
    /// are combined into one struct flagged as a tuple return.
    ///
    /// # Panics
    /// Panics when `proc_ty` is not a procedure type.
    pub fn signature(&self, proc_ty: Idx) -> Signature {
        let pool = self.pool;
        assert!(!proc_ty.is_none(), "signature of the null type");
        let Type::Proc(proc) = *pool.get(pool.base_type(proc_ty)) else {
            panic!("`{}` is not a procedure type", pool.format_type(proc_ty))
        };

        let params = pool
            .tuple_types(proc.params)
            .into_iter()
            .map(|ty| ArgRepr {
                ty: self.lower(ty),
                slice_like: pool.is_slice(ty) || pool.base_type(ty) == Idx::STRING,
            })
            .collect();

        match pool.tuple_types(proc.results).as_slice() {
            [] => Signature::new(proc.call_conv, params, None),
            [single] => Signature::new(proc.call_conv, params, Some(self.lower(*single))),
            _ => Signature::new(proc.call_conv, params, Some(self.lower(proc.results)))
                .with_tuple_return(),
        }
    }

    fn basic(&self, kind: BasicKind) -> ReprType {
        let word = self.target.word_size;
        match kind {
            BasicKind::Bool => ReprType::I1,
            BasicKind::I8 | BasicKind::U8 => ReprType::I8,
            BasicKind::I16 | BasicKind::U16 => ReprType::I16,
            BasicKind::I32 | BasicKind::U32 => ReprType::I32,
            BasicKind::I64 | BasicKind::U64 => ReprType::I64,
            BasicKind::I128 | BasicKind::U128 => ReprType::I128,
            BasicKind::F16 => ReprType::Half,
            BasicKind::F32 => ReprType::Float,
            BasicKind::F64 => ReprType::Double,
            BasicKind::Int | BasicKind::Uint => ReprType::int_bytes(word),
            BasicKind::Rawptr => ReprType::Pointer,
            BasicKind::String => self.data_and_words(1),
            BasicKind::Any => self.sequence(
                &[(ReprType::Pointer, 0), (ReprType::Pointer, word)],
                2 * word,
                false,
            ),
            BasicKind::Invalid
            | BasicKind::UntypedBool
            | BasicKind::UntypedInteger
            | BasicKind::UntypedFloat
            | BasicKind::UntypedString
            | BasicKind::UntypedRune
            | BasicKind::UntypedNil => panic!("`{}` has no representation", kind.name()),
        }
    }

    /// `{ptr, int...}` for strings and slices; the pointer is padded to a
    /// full word when pointers are narrower than words.
    fn data_and_words(&self, words: usize) -> ReprType {
        let word = self.target.word_size;
        let mut fields = Vec::with_capacity(words + 2);
        fields.push(ReprType::Pointer);
        if self.target.ptr_size < word {
            fields.push(padding(word - self.target.ptr_size));
        }
        fields.extend(std::iter::repeat(ReprType::int_bytes(word)).take(words));
        ReprType::struct_of(fields)
    }

    /// `[count x elem]`, or when the element stride exceeds its size,
    /// `{[count-1 x {elem, pad}], elem}` so that every element sits at its
    /// layout offset and the tail carries no padding.
    fn array(&self, ty: Idx, elem: Idx, count: i64) -> ReprType {
        let member = self.member_repr(elem);
        let size = self.layout.size_of(elem);
        let stride = align_formula(size, self.layout.align_of(elem));
        if count <= 1 || stride == size {
            return ReprType::array(member, count);
        }
        let padded = self.sequence(&[(member.clone(), 0)], stride, false);
        let last = (count - 1) * stride;
        self.sequence(
            &[(ReprType::array(padded, count - 1), 0), (member, last)],
            self.layout.size_of(ty),
            false,
        )
    }

    /// `lower(ty)` resized to the layout size of `ty`.
    fn member_repr(&self, ty: Idx) -> ReprType {
        let repr = self.lower(ty);
        let size = self.layout.size_of(ty);
        let repr_size = repr.size(&self.target);
        if repr_size == size {
            return repr;
        }
        if repr_size < size {
            let padded = ReprType::struct_of(vec![repr, padding(size - repr_size)]);
            if padded.size(&self.target) == size {
                return padded;
            }
        }
        ReprType::filler(size, self.layout.align_of(ty))
    }

    /// A struct placing each member at its offset, `size` bytes in total.
    fn sequence(&self, members: &[(ReprType, i64)], size: i64, packed: bool) -> ReprType {
        if !packed {
            if let Some(natural) = self.natural(members, size) {
                return natural;
            }
        }

        let target = &self.target;
        let mut fields = Vec::with_capacity(members.len() + 1);
        let mut cursor = 0;
        for (ty, offset) in members {
            if *offset > cursor {
                fields.push(padding(offset - cursor));
            }
            fields.push(ty.clone());
            cursor = offset + ty.size(target);
        }
        if size > cursor {
            fields.push(padding(size - cursor));
        }
        ReprType::packed_struct(fields)
    }

    fn natural(&self, members: &[(ReprType, i64)], size: i64) -> Option<ReprType> {
        let target = &self.target;
        let mut fields = Vec::with_capacity(members.len() + 1);
        let mut cursor = 0;
        let mut align = 1;
        for (ty, offset) in members {
            let field_align = ty.align(target);
            let aligned = align_formula(cursor, field_align);
            if offset % field_align != 0 || aligned > *offset {
                return None;
            }
            if aligned < *offset {
                fields.push(padding(offset - cursor));
            }
            fields.push(ty.clone());
            cursor = offset + ty.size(target);
            align = align.max(field_align);
        }
        if cursor > size {
            return None;
        }
        if align_formula(cursor, align) < size {
            fields.push(padding(size - cursor));
        }

        let natural = ReprType::struct_of(fields);
        (natural.size(target) == size).then_some(natural)
    }
}

/// `[n x i8]`.
fn padding(bytes: i64) -> ReprType {
    ReprType::array(ReprType::I8, bytes)
}
