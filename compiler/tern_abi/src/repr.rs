//! Representation-level types.
//!
//! The vocabulary code generation emits and the classifiers reason about.
//! Sizes and alignments here follow the machine representation (integers
//! aligned to their byte width, vectors to a power of two) rather than the
//! front-end layout rules in `tern_types`.

use std::fmt;

use tern_stack::ensure_sufficient_stack;
use tern_types::{align_formula, next_pow2};

use crate::Target;

/// A machine-representation type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ReprType {
    Void,
    /// Integer of `bits` width; `i1` for booleans.
    Int {
        bits: u32,
    },
    Half,
    Float,
    Double,
    /// Opaque pointer, `ptr_size` bytes.
    Pointer,
    Struct {
        fields: Vec<ReprType>,
        packed: bool,
    },
    Array {
        elem: Box<ReprType>,
        len: i64,
    },
    Vector {
        elem: Box<ReprType>,
        len: i64,
    },
}

impl ReprType {
    pub const I1: Self = ReprType::Int { bits: 1 };
    pub const I8: Self = ReprType::Int { bits: 8 };
    pub const I16: Self = ReprType::Int { bits: 16 };
    pub const I32: Self = ReprType::Int { bits: 32 };
    pub const I64: Self = ReprType::Int { bits: 64 };
    pub const I128: Self = ReprType::Int { bits: 128 };

    #[inline]
    pub const fn int(bits: u32) -> Self {
        ReprType::Int { bits }
    }

    /// Integer of `bytes` bytes.
    pub fn int_bytes(bytes: i64) -> Self {
        ReprType::Int {
            bits: u32::try_from(bytes * 8).unwrap_or(u32::MAX),
        }
    }

    pub fn struct_of(fields: Vec<ReprType>) -> Self {
        ReprType::Struct {
            fields,
            packed: false,
        }
    }

    pub fn packed_struct(fields: Vec<ReprType>) -> Self {
        ReprType::Struct {
            fields,
            packed: true,
        }
    }

    /// `{}`: zero-sized aggregate.
    pub fn empty_struct() -> Self {
        Self::struct_of(Vec::new())
    }

    pub fn array(elem: ReprType, len: i64) -> Self {
        ReprType::Array {
            elem: Box::new(elem),
            len,
        }
    }

    pub fn vector(elem: ReprType, len: i64) -> Self {
        ReprType::Vector {
            elem: Box::new(elem),
            len,
        }
    }

    /// `[size x i8]`, or wider integer lanes when `align` divides `size`.
    pub fn filler(size: i64, align: i64) -> Self {
        match align {
            2 | 4 | 8 if size % align == 0 => Self::array(Self::int_bytes(align), size / align),
            _ => Self::array(Self::I8, size),
        }
    }

    /// Byte size under `target`.
    pub fn size(&self, target: &Target) -> i64 {
        ensure_sufficient_stack(|| match self {
            ReprType::Void => 0,
            ReprType::Int { bits } => (i64::from(*bits) + 7) / 8,
            ReprType::Half => 2,
            ReprType::Float => 4,
            ReprType::Double => 8,
            ReprType::Pointer => target.ptr_size,
            ReprType::Struct {
                fields,
                packed: true,
            } => fields.iter().map(|f| f.size(target)).sum(),
            ReprType::Struct { fields, .. } => {
                let end = fields.iter().fold(0, |offset, field| {
                    align_formula(offset, field.align(target)) + field.size(target)
                });
                align_formula(end, self.align(target))
            }
            ReprType::Array { elem, len } => len * elem.size(target),
            ReprType::Vector { elem, len } => next_pow2(len * elem.size(target)),
        })
    }

    /// Alignment under `target`.
    pub fn align(&self, target: &Target) -> i64 {
        ensure_sufficient_stack(|| match self {
            ReprType::Void => 1,
            ReprType::Int { bits } => ((i64::from(*bits) + 7) / 8).clamp(1, target.max_align),
            ReprType::Half => 2,
            ReprType::Float => 4,
            ReprType::Double => 8,
            ReprType::Pointer => target.ptr_size,
            ReprType::Struct { packed: true, .. } => 1,
            ReprType::Struct { fields, .. } => {
                fields.iter().map(|f| f.align(target)).fold(1, i64::max)
            }
            ReprType::Array { elem, .. } => elem.align(target),
            ReprType::Vector { .. } => next_pow2(self.size(target)).clamp(1, target.max_simd_align),
        })
    }

    /// Structs and arrays.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, ReprType::Struct { .. } | ReprType::Array { .. })
    }

    /// Struct fields; empty for every other kind.
    pub fn fields(&self) -> &[ReprType] {
        match self {
            ReprType::Struct { fields, .. } => fields,
            _ => &[],
        }
    }
}

impl fmt::Display for ReprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReprType::Void => f.write_str("void"),
            ReprType::Int { bits } => write!(f, "i{bits}"),
            ReprType::Half => f.write_str("half"),
            ReprType::Float => f.write_str("float"),
            ReprType::Double => f.write_str("double"),
            ReprType::Pointer => f.write_str("ptr"),
            ReprType::Struct { fields, packed } => {
                if *packed {
                    f.write_str("<")?;
                }
                f.write_str("{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str("}")?;
                if *packed {
                    f.write_str(">")?;
                }
                Ok(())
            }
            ReprType::Array { elem, len } => write!(f, "[{len} x {elem}]"),
            ReprType::Vector { elem, len } => write!(f, "<{len} x {elem}>"),
        }
    }
}
