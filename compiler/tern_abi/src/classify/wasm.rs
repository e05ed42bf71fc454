//! WebAssembly (`wasm32`, `wasm64p32`).
//!
//! There is no platform convention for the language's own calls, so small
//! aggregates of scalar members are passed as multiple values rather than by
//! pointer. The C convention follows the WebAssembly basic C ABI: only
//! scalars and single-member structs travel directly.

use tern_stack::ensure_sufficient_stack;
use tern_types::CallingConvention;

use super::{i128_cast, register_sized_int, ArgClassifier};
use crate::{ArgClass, ArgRepr, ReprType, Target};

/// Larger aggregates are passed indirectly.
const MAX_DIRECT_STRUCT_SIZE: i64 = 32;

pub(super) struct Wasm<'t> {
    target: &'t Target,
    cc: CallingConvention,
}

impl<'t> Wasm<'t> {
    pub(super) fn new(target: &'t Target, cc: CallingConvention) -> Self {
        Self { target, cc }
    }

    fn is_basic_register(&self, ty: &ReprType) -> bool {
        match ty {
            ReprType::Half | ReprType::Float | ReprType::Double | ReprType::Pointer => true,
            ReprType::Int { .. } => ty.size(self.target) <= 8,
            _ => false,
        }
    }

    fn can_be_direct(&self, ty: &ReprType) -> bool {
        let size = ty.size(self.target);
        if size == 0 {
            return false;
        }
        if self.cc == CallingConvention::CDecl {
            return ensure_sufficient_stack(|| match ty {
                ReprType::Array { .. } => false,
                ReprType::Struct { fields, .. } => match fields.as_slice() {
                    [single] => self.can_be_direct(single),
                    _ => false,
                },
                _ => self.is_basic_register(ty),
            });
        }
        if size > MAX_DIRECT_STRUCT_SIZE {
            return false;
        }
        match ty {
            ReprType::Array { elem, .. } => self.is_basic_register(elem),
            ReprType::Struct { fields, .. } => fields
                .iter()
                .all(|f| is_padding(f) || self.is_basic_register(f)),
            _ => false,
        }
    }

    fn non_struct(&self, ty: &ReprType, is_return: bool) -> ArgClass {
        if !is_return && *ty == ReprType::I128 {
            return ArgClass::direct_cast(ty.clone(), i128_cast());
        }
        if !is_return && ty.size(self.target) > 8 {
            return ArgClass::indirect(ty.clone(), None);
        }
        ArgClass::scalar(ty.clone())
    }

    fn aggregate(&self, ty: &ReprType) -> ArgClass {
        if ty.size(self.target) == 0 {
            ArgClass::ignore(ty.clone())
        } else if self.can_be_direct(ty) {
            ArgClass::direct(ty.clone())
        } else {
            ArgClass::indirect(ty.clone(), None)
        }
    }

    /// Strings and slices drop the padding between a narrow pointer and
    /// the word-sized counts that follow it.
    fn pseudo_slice(&self, ty: &ReprType) -> ArgClass {
        if self.target.ptr_size >= self.target.word_size || !self.can_be_direct(ty) {
            return self.aggregate(ty);
        }
        let fields = ty.fields();
        let values: Vec<ReprType> = fields.iter().filter(|f| !is_padding(f)).cloned().collect();
        if values.len() == fields.len() {
            ArgClass::direct(ty.clone())
        } else {
            ArgClass::direct_cast(ty.clone(), ReprType::struct_of(values))
        }
    }
}

impl ArgClassifier for Wasm<'_> {
    fn param(&self, arg: &ArgRepr) -> ArgClass {
        let ty = &arg.ty;
        if !ty.is_aggregate() {
            self.non_struct(ty, false)
        } else if arg.slice_like {
            self.pseudo_slice(ty)
        } else {
            self.aggregate(ty)
        }
    }

    fn ret(&self, ty: &ReprType) -> ArgClass {
        if !ty.is_aggregate() {
            return self.non_struct(ty, true);
        }
        if self.can_be_direct(ty) {
            return ArgClass::direct(ty.clone());
        }
        if self.cc != CallingConvention::CDecl {
            if let Some(cast) = register_sized_int(ty.size(self.target)) {
                return ArgClass::direct_cast(ty.clone(), cast);
            }
        }
        ArgClass::struct_ret(ty.clone())
    }
}

/// `[n x i8]` filler inserted by lowering.
fn is_padding(ty: &ReprType) -> bool {
    matches!(ty, ReprType::Array { elem, .. } if **elem == ReprType::I8)
}
