//! System V AMD64.
//!
//! Values up to four eightbytes are split into 8-byte chunks, each assigned a
//! register class from the primitives overlapping it. Chunks in memory, or a
//! large aggregate that is not a single SSE vector, send the whole value
//! through the stack. Otherwise the value is reinterpreted as a small struct
//! of one register type per chunk.
//!
//! No representation type maps to the x87 classes, so they are not modeled.

use smallvec::{smallvec, SmallVec};
use tern_stack::ensure_sufficient_stack;
use tern_types::align_formula;

use super::ArgClassifier;
use crate::{ArgClass, ArgRepr, ReprType, Target};

/// Class of one eightbyte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RegClass {
    NoClass,
    Int,
    /// Single `float` in the low half.
    SseFs,
    /// `float` pair.
    SseFv,
    /// Single `double`.
    SseDs,
    /// `double` vector lane.
    SseDv,
    SseInt8,
    SseInt16,
    SseInt32,
    SseInt64,
    /// Upper part of the preceding vector register.
    SseUp,
    Memory,
}

impl RegClass {
    fn is_sse(self) -> bool {
        matches!(
            self,
            RegClass::SseFs
                | RegClass::SseFv
                | RegClass::SseDs
                | RegClass::SseDv
                | RegClass::SseInt8
                | RegClass::SseInt16
                | RegClass::SseInt32
                | RegClass::SseInt64
        )
    }
}

type Classes = SmallVec<[RegClass; 4]>;

/// Four eightbytes: anything larger is passed in memory.
const MAX_EIGHTBYTES: i64 = 4;

pub(super) struct SysV<'t> {
    target: &'t Target,
}

impl<'t> SysV<'t> {
    pub(super) fn new(target: &'t Target) -> Self {
        Self { target }
    }

    fn classify_value(&self, ty: &ReprType, is_return: bool) -> ArgClass {
        if self.is_register(ty) {
            return ArgClass::scalar(ty.clone());
        }
        if ty.size(self.target) == 0 {
            return ArgClass::ignore(ty.clone());
        }

        let classes = self.classify(ty);
        tracing::trace!(ty = %ty, ?classes, "eightbyte classes");
        if classes.first() == Some(&RegClass::Memory) {
            return if is_return {
                ArgClass::struct_ret(ty.clone())
            } else {
                ArgClass::byval(ty.clone(), ty.align(self.target))
            };
        }

        if is_slice_like(self.target, ty) {
            ArgClass::direct(ty.clone())
        } else {
            ArgClass::direct_cast(ty.clone(), self.llreg(&classes, ty))
        }
    }

    fn is_register(&self, ty: &ReprType) -> bool {
        ty.size(self.target) > 0
            && matches!(
                ty,
                ReprType::Int { .. }
                    | ReprType::Half
                    | ReprType::Float
                    | ReprType::Double
                    | ReprType::Pointer
            )
    }

    fn classify(&self, ty: &ReprType) -> Classes {
        let words = (ty.size(self.target) + 7) / 8;
        let len = usize::try_from(words).unwrap_or(0);
        if words > MAX_EIGHTBYTES {
            return smallvec![RegClass::Memory; len];
        }
        let mut classes: Classes = smallvec![RegClass::NoClass; len];
        self.classify_with(ty, &mut classes, 0);
        fixup(ty, &mut classes);
        classes
    }

    fn classify_with(&self, ty: &ReprType, classes: &mut Classes, offset: i64) {
        let target = self.target;
        let size = ty.size(target);

        if offset % ty.align(target) != 0 {
            let end = (offset + size + 7) / 8;
            for word in offset / 8..end {
                unify(classes, word, RegClass::Memory);
            }
            return;
        }

        ensure_sufficient_stack(|| match ty {
            ReprType::Void => {}
            ReprType::Int { .. } => {
                let mut word_offset = offset;
                let mut remaining = size;
                while remaining > 0 {
                    unify(classes, word_offset / 8, RegClass::Int);
                    word_offset += 8;
                    remaining -= 8;
                }
            }
            ReprType::Pointer | ReprType::Half => unify(classes, offset / 8, RegClass::Int),
            ReprType::Float => {
                let class = if offset % 8 == 4 {
                    RegClass::SseFv
                } else {
                    RegClass::SseFs
                };
                unify(classes, offset / 8, class);
            }
            ReprType::Double => unify(classes, offset / 8, RegClass::SseDs),
            ReprType::Struct { fields, packed } => {
                let mut field_offset = offset;
                for field in fields {
                    if !*packed {
                        field_offset = align_formula(field_offset, field.align(target));
                    }
                    self.classify_with(field, classes, field_offset);
                    field_offset += field.size(target);
                }
            }
            ReprType::Array { elem, len } => {
                let elem_size = elem.size(target);
                for i in 0..*len {
                    self.classify_with(elem, classes, offset + i * elem_size);
                }
            }
            ReprType::Vector { elem, len } => {
                let elem_size = elem.size(target);
                let Some(mut class) = vector_lane_class(elem) else {
                    // Lanes wider than an SSE integer lane classify like scalars.
                    for i in 0..*len {
                        self.classify_with(elem, classes, offset + i * elem_size);
                    }
                    return;
                };
                for i in 0..*len {
                    unify(classes, (offset + i * elem_size) / 8, class);
                    class = RegClass::SseUp;
                }
            }
        });
    }

    /// The register type for each eightbyte, combined into one cast type.
    fn llreg(&self, classes: &[RegClass], ty: &ReprType) -> ReprType {
        let mut remaining = ty.size(self.target);
        let mut types = Vec::with_capacity(classes.len());

        if classes.iter().all(|&c| c == RegClass::Int) {
            for _ in classes {
                let bytes = remaining.min(8);
                types.push(ReprType::int_bytes(bytes));
                remaining -= bytes;
            }
        } else {
            let mut i = 0;
            while i < classes.len() {
                match classes[i] {
                    RegClass::Int | RegClass::NoClass => {
                        let bytes = remaining.clamp(1, 8);
                        types.push(ReprType::int_bytes(bytes));
                        remaining -= bytes;
                    }
                    RegClass::SseFs => {
                        types.push(ReprType::Float);
                        remaining -= 4;
                    }
                    RegClass::SseDs => {
                        types.push(ReprType::Double);
                        remaining -= 8;
                    }
                    class @ (RegClass::SseFv
                    | RegClass::SseDv
                    | RegClass::SseInt8
                    | RegClass::SseInt16
                    | RegClass::SseInt32
                    | RegClass::SseInt64
                    | RegClass::SseUp) => {
                        let (elem, per_word) = vector_lane(class);
                        let words = 1 + classes[i + 1..]
                            .iter()
                            .take_while(|&&c| c == RegClass::SseUp)
                            .count();
                        let lanes = i64::try_from(words).unwrap_or(i64::MAX) * per_word;
                        let vector = ReprType::vector(elem, lanes);
                        remaining -= vector.size(self.target);
                        types.push(vector);
                        i += words;
                        continue;
                    }
                    RegClass::Memory => {
                        panic!("memory class in register classification of `{ty}`")
                    }
                }
                i += 1;
            }
        }

        if types.len() == 1 {
            types.swap_remove(0)
        } else {
            ReprType::Struct {
                fields: types,
                packed: remaining == 0,
            }
        }
    }
}

impl ArgClassifier for SysV<'_> {
    fn param(&self, arg: &ArgRepr) -> ArgClass {
        self.classify_value(&arg.ty, false)
    }

    fn ret(&self, ty: &ReprType) -> ArgClass {
        self.classify_value(ty, true)
    }
}

/// Merge `new` into the class already recorded for eightbyte `word`.
fn unify(classes: &mut Classes, word: i64, new: RegClass) {
    let Some(slot) = usize::try_from(word).ok().and_then(|w| classes.get_mut(w)) else {
        return;
    };
    let old = *slot;
    *slot = match (old, new) {
        _ if old == new => return,
        (RegClass::NoClass, _) => new,
        (_, RegClass::NoClass) => return,
        (RegClass::Memory, _) | (_, RegClass::Memory) => RegClass::Memory,
        (RegClass::Int, _) | (_, RegClass::Int) => RegClass::Int,
        (_, RegClass::SseUp) if old.is_sse() => return,
        _ => new,
    };
}

/// Post-merge cleanup.
///
/// An aggregate over two eightbytes stays in registers only as one SSE
/// vector; any memory chunk sends the whole value to memory; a stray
/// continuation class becomes a vector class of its own.
fn fixup(ty: &ReprType, classes: &mut Classes) {
    let is_composite = matches!(
        ty,
        ReprType::Struct { .. } | ReprType::Array { .. } | ReprType::Vector { .. }
    );
    if classes.len() > 2 && is_composite {
        let single_vector =
            classes[0].is_sse() && classes[1..].iter().all(|&c| c == RegClass::SseUp);
        if !single_vector {
            classes.fill(RegClass::Memory);
            return;
        }
    }

    let mut i = 0;
    while i < classes.len() {
        match classes[i] {
            RegClass::Memory => {
                classes.fill(RegClass::Memory);
                return;
            }
            RegClass::SseUp => {
                classes[i] = RegClass::SseDv;
                i += 1;
            }
            class if class.is_sse() => {
                i += 1;
                while i < classes.len() && classes[i] == RegClass::SseUp {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
}

/// Class of the first lane of a vector with `elem` lanes; `None` for
/// integer lanes wider than 64 bits.
fn vector_lane_class(elem: &ReprType) -> Option<RegClass> {
    match elem {
        ReprType::Int { bits } => match bits {
            0..=8 => Some(RegClass::SseInt8),
            9..=16 => Some(RegClass::SseInt16),
            17..=32 => Some(RegClass::SseInt32),
            33..=64 => Some(RegClass::SseInt64),
            _ => None,
        },
        ReprType::Half => Some(RegClass::SseInt16),
        ReprType::Float => Some(RegClass::SseFv),
        ReprType::Double => Some(RegClass::SseDv),
        _ => panic!("unhandled vector lane type `{elem}`"),
    }
}

/// Lane type and lanes per eightbyte of a vector class.
fn vector_lane(class: RegClass) -> (ReprType, i64) {
    match class {
        RegClass::SseFv => (ReprType::Float, 2),
        RegClass::SseInt8 => (ReprType::I8, 8),
        RegClass::SseInt16 => (ReprType::I16, 4),
        RegClass::SseInt32 => (ReprType::I32, 2),
        RegClass::SseInt64 => (ReprType::I64, 1),
        _ => (ReprType::Double, 1),
    }
}

/// `{ptr, i64}`: strings keep their own shape in registers.
fn is_slice_like(target: &Target, ty: &ReprType) -> bool {
    matches!(
        ty.fields(),
        [ReprType::Pointer, second @ ReprType::Int { .. }] if second.size(target) == 8
    )
}
