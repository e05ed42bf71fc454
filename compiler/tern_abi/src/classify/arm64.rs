//! ARM64 (AAPCS64).
//!
//! Homogeneous floating-point aggregates of up to four members travel as a
//! float array; other aggregates up to 16 bytes are reinterpreted as
//! integers; larger ones are passed through a pointer.

use tern_stack::ensure_sufficient_stack;

use super::ArgClassifier;
use crate::{ArgClass, ArgRepr, ReprType, Target};

/// Members of a homogeneous aggregate passed in registers.
const MAX_HOMOGENEOUS_MEMBERS: i64 = 4;

/// Larger non-homogeneous aggregates are passed indirectly.
const MAX_DIRECT_SIZE: i64 = 16;

pub(super) struct Arm64<'t> {
    target: &'t Target,
}

impl<'t> Arm64<'t> {
    pub(super) fn new(target: &'t Target) -> Self {
        Self { target }
    }

    fn classify_value(&self, ty: &ReprType, is_return: bool) -> ArgClass {
        if is_register(ty) {
            return ArgClass::scalar(ty.clone());
        }
        if let Some((base, members)) = self.homogeneous(ty) {
            if members <= MAX_HOMOGENEOUS_MEMBERS {
                return ArgClass::direct_cast(ty.clone(), ReprType::array(base, members));
            }
        }

        let size = ty.size(self.target);
        if size <= MAX_DIRECT_SIZE {
            ArgClass::direct_cast(ty.clone(), integer_coercion(size))
        } else if is_return {
            ArgClass::struct_ret(ty.clone())
        } else {
            ArgClass::indirect(ty.clone(), None)
        }
    }

    /// Base type and leaf count when every leaf of `ty` is the same
    /// floating-point type with no padding between them.
    fn homogeneous(&self, ty: &ReprType) -> Option<(ReprType, i64)> {
        ensure_sufficient_stack(|| match ty {
            ReprType::Float | ReprType::Double => Some((ty.clone(), 1)),
            ReprType::Array { elem, len } if *len > 0 => {
                let (base, members) = self.homogeneous(elem)?;
                Some((base, members * len))
            }
            ReprType::Struct { fields, .. } => {
                let mut base: Option<ReprType> = None;
                let mut members = 0;
                for field in fields {
                    let (field_base, field_members) = self.homogeneous(field)?;
                    match &base {
                        Some(existing) if *existing != field_base => return None,
                        Some(_) => {}
                        None => base = Some(field_base),
                    }
                    members += field_members;
                }
                let base = base?;
                (ty.size(self.target) == base.size(self.target) * members)
                    .then_some((base, members))
            }
            _ => None,
        })
    }
}

impl ArgClassifier for Arm64<'_> {
    fn param(&self, arg: &ArgRepr) -> ArgClass {
        self.classify_value(&arg.ty, false)
    }

    fn ret(&self, ty: &ReprType) -> ArgClass {
        self.classify_value(ty, true)
    }
}

fn is_register(ty: &ReprType) -> bool {
    matches!(
        ty,
        ReprType::Int { .. }
            | ReprType::Half
            | ReprType::Float
            | ReprType::Double
            | ReprType::Pointer
    )
}

/// Integer reinterpretation of a `size`-byte aggregate, `size <= 16`.
///
/// `{}` when empty, one integer up to 8 bytes, otherwise an array of
/// 64-bit words.
fn integer_coercion(size: i64) -> ReprType {
    match size {
        0 => ReprType::empty_struct(),
        1..=8 => ReprType::int_bytes(size),
        _ => ReprType::array(ReprType::I64, (size + 7) / 8),
    }
}
