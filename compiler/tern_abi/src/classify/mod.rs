//! Per-architecture argument classification.
//!
//! [`classify`] selects a classifier from the calling convention and the
//! target, classifies every parameter and the result, then applies the two
//! language-convention adjustments shared by all architectures:
//!
//! 1. A combined multi-value result that would be returned through a hidden
//!    slot is split: every value but the last becomes a trailing out-pointer
//!    parameter and the last value is classified on its own.
//! 2. The native convention appends the implicit context pointer.

mod arm32;
mod arm64;
mod sysv;
mod wasm;
mod win64;
mod x86;

use tern_types::CallingConvention;

use crate::{
    ArgAttr, ArgClass, ArgRepr, FunctionAbi, ReprType, Signature, SplitReturn, Target, TargetArch,
};

/// Classification rules of one architecture.
trait ArgClassifier {
    /// Classify one parameter.
    fn param(&self, arg: &ArgRepr) -> ArgClass;

    /// Classify a defined result.
    fn ret(&self, ty: &ReprType) -> ArgClass;
}

/// Compute the physical ABI of a procedure signature on `target`.
///
/// # Panics
/// Panics when `Win64` or `SysV` is forced on a non-amd64 target, or when a
/// classifier meets a representation it has no rule for.
pub fn classify(target: &Target, sig: &Signature) -> FunctionAbi {
    let cc = sig.call_conv;
    let mut abi = match cc {
        _ if cc.is_passthrough() => passthrough(sig),
        CallingConvention::Win64 => {
            assert_amd64(target, cc);
            run(&win64::Win64::new(target), sig)
        }
        CallingConvention::SysV => {
            assert_amd64(target, cc);
            run(&sysv::SysV::new(target), sig)
        }
        _ => match target.arch {
            TargetArch::Amd64 if target.is_win64() => run(&win64::Win64::new(target), sig),
            TargetArch::Amd64 => run(&sysv::SysV::new(target), sig),
            TargetArch::I386 => run(&x86::X86::new(target), sig),
            TargetArch::Arm64 => run(&arm64::Arm64::new(target), sig),
            TargetArch::Arm32 => run(&arm32::Arm32::new(target, cc), sig),
            TargetArch::Wasm32 | TargetArch::Wasm64p32 => run(&wasm::Wasm::new(target, cc), sig),
        },
    };

    if cc == CallingConvention::Native {
        abi.params.push(ArgClass::direct(ReprType::Pointer));
    }

    tracing::trace!(
        arch = target.arch.as_str(),
        cc = cc.as_str(),
        params = abi.params.len(),
        ret = ?abi.ret,
        "classified signature"
    );
    abi
}

fn run(classifier: &impl ArgClassifier, sig: &Signature) -> FunctionAbi {
    let mut params: Vec<ArgClass> = sig
        .params
        .iter()
        .enumerate()
        .map(|(index, arg)| {
            let class = classifier.param(arg);
            tracing::trace!(index, ty = %arg.ty, ?class, "classified parameter");
            class
        })
        .collect();

    let mut split_return = None;
    let ret = match &sig.ret {
        None => ArgClass::direct(ReprType::Void),
        Some(ty) => {
            let ret = classifier.ret(ty);
            if sig.ret_is_tuple && is_language_convention(sig.call_conv) {
                match split_multi_return(classifier, ty, ret, &mut params) {
                    Ok((split, last)) => {
                        split_return = Some(split);
                        last
                    }
                    Err(ret) => ret,
                }
            } else {
                ret
            }
        }
    };

    FunctionAbi {
        params,
        ret,
        call_conv: sig.call_conv,
        split_return,
    }
}

/// Split an indirectly returned multi-value struct into out-pointers.
///
/// Hands `ret` back unchanged when it is not returned through a slot.
fn split_multi_return(
    classifier: &impl ArgClassifier,
    ty: &ReprType,
    ret: ArgClass,
    params: &mut Vec<ArgClass>,
) -> Result<(SplitReturn, ArgClass), ArgClass> {
    let fields = ty.fields();
    let Some((last, leading)) = fields.split_last() else {
        return Err(ret);
    };
    if leading.is_empty() || ret.attr() != Some(ArgAttr::StructRet) {
        return Err(ret);
    }

    let split = SplitReturn {
        original: ty.clone(),
        original_param_count: params.len(),
    };
    params.extend(leading.iter().map(|_| ArgClass::direct(ReprType::Pointer)));
    tracing::debug!(
        ty = %ty,
        out_params = leading.len(),
        "split multi-value return"
    );
    Ok((split, classifier.ret(last)))
}

/// `None` and `InlineAsm`: representation types verbatim.
fn passthrough(sig: &Signature) -> FunctionAbi {
    FunctionAbi {
        params: sig
            .params
            .iter()
            .map(|arg| ArgClass::direct(arg.ty.clone()))
            .collect(),
        ret: ArgClass::direct(sig.ret.clone().unwrap_or(ReprType::Void)),
        call_conv: sig.call_conv,
        split_return: None,
    }
}

fn assert_amd64(target: &Target, cc: CallingConvention) {
    assert!(
        target.arch == TargetArch::Amd64,
        "calling convention \"{}\" requires amd64, target is {}",
        cc.as_str(),
        target.arch.as_str()
    );
}

/// The language's own conventions, with or without the context pointer.
fn is_language_convention(cc: CallingConvention) -> bool {
    matches!(cc, CallingConvention::Native | CallingConvention::Contextless)
}

/// Same-size integer for aggregates of exactly 1, 2, 4 or 8 bytes.
fn register_sized_int(size: i64) -> Option<ReprType> {
    matches!(size, 1 | 2 | 4 | 8).then(|| ReprType::int_bytes(size))
}

/// `<2 x i64>`: the 128-bit integer cast on Windows x64 and WASM.
fn i128_cast() -> ReprType {
    ReprType::vector(ReprType::I64, 2)
}

#[cfg(test)]
mod tests;
