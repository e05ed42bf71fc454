//! 32-bit ARM (AAPCS).
//!
//! Aggregates are coerced to arrays of 32-bit or 64-bit integers according
//! to their alignment. The language conventions pass aggregates over 8
//! bytes through a pointer instead.

use tern_types::CallingConvention;

use super::{is_language_convention, ArgClassifier};
use crate::{ArgClass, ArgRepr, ReprType, Target};

pub(super) struct Arm32<'t> {
    target: &'t Target,
    cc: CallingConvention,
}

impl<'t> Arm32<'t> {
    pub(super) fn new(target: &'t Target, cc: CallingConvention) -> Self {
        Self { target, cc }
    }

    fn is_register(&self, ty: &ReprType) -> bool {
        match ty {
            ReprType::Half
            | ReprType::Float
            | ReprType::Double
            | ReprType::Pointer
            | ReprType::Vector { .. } => true,
            ReprType::Int { .. } => ty.size(self.target) <= 8,
            _ => false,
        }
    }
}

impl ArgClassifier for Arm32<'_> {
    fn param(&self, arg: &ArgRepr) -> ArgClass {
        let ty = &arg.ty;
        if self.is_register(ty) {
            return ArgClass::scalar(ty.clone());
        }
        let size = ty.size(self.target);
        if is_language_convention(self.cc) && size > 8 {
            return ArgClass::indirect(ty.clone(), None);
        }
        let cast = if ty.align(self.target) <= 4 {
            ReprType::array(ReprType::I32, (size + 3) / 4)
        } else {
            ReprType::array(ReprType::I64, (size + 7) / 8)
        };
        ArgClass::direct_cast(ty.clone(), cast)
    }

    fn ret(&self, ty: &ReprType) -> ArgClass {
        if self.is_register(ty) {
            return ArgClass::scalar(ty.clone());
        }
        match ty.size(self.target) {
            1 => ArgClass::direct_cast(ty.clone(), ReprType::I8),
            2 => ArgClass::direct_cast(ty.clone(), ReprType::I16),
            3 | 4 => ArgClass::direct_cast(ty.clone(), ReprType::I32),
            _ => ArgClass::struct_ret(ty.clone()),
        }
    }
}
