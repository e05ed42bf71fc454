//! Windows x64.
//!
//! Aggregates of exactly 1, 2, 4 or 8 bytes travel as integers; every other
//! aggregate is passed through a pointer. Results follow the 32-bit x86 rule.

use super::x86::{aggregate_or_scalar_return, non_struct};
use super::{register_sized_int, ArgClassifier};
use crate::{ArgClass, ArgRepr, ReprType, Target};

pub(super) struct Win64<'t> {
    target: &'t Target,
}

impl<'t> Win64<'t> {
    pub(super) fn new(target: &'t Target) -> Self {
        Self { target }
    }
}

impl ArgClassifier for Win64<'_> {
    fn param(&self, arg: &ArgRepr) -> ArgClass {
        let ty = &arg.ty;
        if !ty.is_aggregate() {
            return non_struct(self.target, ty, false, true);
        }
        match register_sized_int(ty.size(self.target)) {
            Some(cast) => ArgClass::direct_cast(ty.clone(), cast),
            None => ArgClass::indirect(ty.clone(), None),
        }
    }

    fn ret(&self, ty: &ReprType) -> ArgClass {
        aggregate_or_scalar_return(self.target, ty, true)
    }
}
