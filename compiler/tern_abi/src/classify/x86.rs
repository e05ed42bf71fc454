//! 32-bit x86.
//!
//! Aggregates travel by value behind a pointer; only register-sized
//! aggregate results come back in registers.

use super::{register_sized_int, ArgClassifier};
use crate::{ArgAttr, ArgClass, ArgRepr, ReprType, Target};

pub(super) struct X86<'t> {
    target: &'t Target,
}

impl<'t> X86<'t> {
    pub(super) fn new(target: &'t Target) -> Self {
        Self { target }
    }
}

impl ArgClassifier for X86<'_> {
    fn param(&self, arg: &ArgRepr) -> ArgClass {
        let ty = &arg.ty;
        if !ty.is_aggregate() {
            return non_struct(self.target, ty, false, false);
        }
        if ty.size(self.target) == 0 {
            ArgClass::ignore(ty.clone())
        } else {
            ArgClass::indirect(ty.clone(), Some(ArgAttr::ByVal))
        }
    }

    fn ret(&self, ty: &ReprType) -> ArgClass {
        aggregate_or_scalar_return(self.target, ty, false)
    }
}

/// Scalars: `Direct`, except parameters wider than 8 bytes.
///
/// `windows_i128` casts 128-bit integers to `<2 x i64>` before the width
/// check, which only applies to results.
pub(super) fn non_struct(
    target: &Target,
    ty: &ReprType,
    is_return: bool,
    windows_i128: bool,
) -> ArgClass {
    if !is_return && ty.size(target) > 8 {
        return ArgClass::indirect(ty.clone(), None);
    }
    if windows_i128 && *ty == ReprType::I128 {
        return ArgClass::direct_cast(ty.clone(), super::i128_cast());
    }
    ArgClass::scalar(ty.clone())
}

/// Register-sized aggregates as integers, other aggregates through `sret`.
pub(super) fn aggregate_or_scalar_return(
    target: &Target,
    ty: &ReprType,
    windows_i128: bool,
) -> ArgClass {
    if !ty.is_aggregate() {
        return non_struct(target, ty, true, windows_i128);
    }
    match register_sized_int(ty.size(target)) {
        Some(cast) => ArgClass::direct_cast(ty.clone(), cast),
        None => ArgClass::struct_ret(ty.clone()),
    }
}
