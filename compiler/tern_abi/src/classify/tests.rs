use super::*;
use crate::{TargetAbi, TargetOs};
use pretty_assertions::assert_eq;

fn target(arch: TargetArch, os: TargetOs) -> Target {
    Target::new(arch, os)
}

fn linux() -> Target {
    target(TargetArch::Amd64, TargetOs::Linux)
}

fn windows() -> Target {
    target(TargetArch::Amd64, TargetOs::Windows)
}

fn i386() -> Target {
    target(TargetArch::I386, TargetOs::Linux)
}

fn arm64() -> Target {
    target(TargetArch::Arm64, TargetOs::Darwin)
}

fn arm32() -> Target {
    target(TargetArch::Arm32, TargetOs::Linux)
}

fn wasm32() -> Target {
    target(TargetArch::Wasm32, TargetOs::Freestanding)
}

fn sig(cc: CallingConvention, params: &[ReprType], ret: Option<ReprType>) -> Signature {
    Signature::new(cc, params.iter().cloned().map(ArgRepr::from).collect(), ret)
}

fn c_param(t: &Target, ty: ReprType) -> ArgClass {
    classify(t, &sig(CallingConvention::CDecl, &[ty], None))
        .params
        .swap_remove(0)
}

fn c_ret(t: &Target, ty: ReprType) -> ArgClass {
    classify(t, &sig(CallingConvention::CDecl, &[], Some(ty))).ret
}

fn floats(n: usize) -> ReprType {
    ReprType::struct_of(vec![ReprType::Float; n])
}

fn ints(n: usize) -> ReprType {
    ReprType::struct_of(vec![ReprType::I32; n])
}

fn bytes(n: usize) -> ReprType {
    ReprType::struct_of(vec![ReprType::I8; n])
}

// === Dispatch ===

#[test]
fn passthrough_keeps_types_verbatim() {
    let pair = ReprType::struct_of(vec![ReprType::I8, ReprType::I64]);
    for cc in [CallingConvention::None, CallingConvention::InlineAsm] {
        let abi = classify(&linux(), &sig(cc, &[pair.clone(), ReprType::I1], None));
        assert_eq!(
            abi.params,
            vec![ArgClass::direct(pair.clone()), ArgClass::direct(ReprType::I1)]
        );
        assert_eq!(abi.ret, ArgClass::direct(ReprType::Void));
        assert_eq!(abi.split_return, None);
    }
}

#[test]
fn native_appends_context_pointer() {
    let abi = classify(
        &linux(),
        &sig(CallingConvention::Native, &[ReprType::I64], None),
    );
    assert_eq!(
        abi.params,
        vec![
            ArgClass::direct(ReprType::I64),
            ArgClass::direct(ReprType::Pointer)
        ]
    );
    assert_eq!(abi.call_conv, CallingConvention::Native);
}

#[test]
fn contextless_has_no_context_pointer() {
    let abi = classify(
        &linux(),
        &sig(CallingConvention::Contextless, &[ReprType::I64], None),
    );
    assert_eq!(abi.params, vec![ArgClass::direct(ReprType::I64)]);
}

#[test]
fn missing_result_is_direct_void() {
    for t in [linux(), windows(), i386(), arm64(), arm32(), wasm32()] {
        let abi = classify(&t, &sig(CallingConvention::CDecl, &[], None));
        assert_eq!(abi.ret, ArgClass::direct(ReprType::Void));
    }
}

#[test]
fn forced_conventions_override_the_os() {
    let three = bytes(3);
    let win = classify(
        &linux(),
        &sig(CallingConvention::Win64, &[three.clone()], None),
    );
    assert_eq!(win.params[0], ArgClass::indirect(three.clone(), None));

    let sysv = classify(
        &windows(),
        &sig(CallingConvention::SysV, &[three.clone()], None),
    );
    assert_eq!(sysv.params[0], ArgClass::direct_cast(three, ReprType::int(24)));
}

#[test]
fn target_abi_selects_win64_on_any_os() {
    let forced = linux().with_abi(TargetAbi::Win64);
    assert_eq!(
        c_param(&forced, bytes(3)),
        ArgClass::indirect(bytes(3), None)
    );
}

#[test]
#[should_panic(expected = "requires amd64")]
fn win64_convention_on_arm64_panics() {
    classify(&arm64(), &sig(CallingConvention::Win64, &[], None));
}

#[test]
#[should_panic(expected = "requires amd64")]
fn sysv_convention_on_i386_panics() {
    classify(&i386(), &sig(CallingConvention::SysV, &[], None));
}

// === Multi-value returns ===

#[test]
fn indirect_tuple_return_is_split() {
    let wide = ReprType::struct_of(vec![ReprType::I64, ReprType::Double, ReprType::I64]);
    let abi = classify(
        &linux(),
        &sig(CallingConvention::Native, &[ReprType::I32], Some(wide.clone())).with_tuple_return(),
    );
    assert_eq!(
        abi.params,
        vec![
            ArgClass::direct(ReprType::I32),
            ArgClass::direct(ReprType::Pointer),
            ArgClass::direct(ReprType::Pointer),
            ArgClass::direct(ReprType::Pointer),
        ]
    );
    assert_eq!(abi.ret, ArgClass::direct(ReprType::I64));
    assert_eq!(
        abi.split_return,
        Some(SplitReturn {
            original: wide,
            original_param_count: 1,
        })
    );
}

#[test]
fn register_tuple_return_is_kept() {
    let pair = ReprType::struct_of(vec![ReprType::I64, ReprType::I64]);
    let abi = classify(
        &linux(),
        &sig(CallingConvention::Contextless, &[], Some(pair.clone())).with_tuple_return(),
    );
    assert!(abi.ret.is_direct());
    assert_eq!(abi.split_return, None);
    assert!(abi.params.is_empty());
}

#[test]
fn foreign_tuple_return_is_not_split() {
    let wide = ReprType::struct_of(vec![ReprType::I64; 3]);
    let abi = classify(
        &linux(),
        &sig(CallingConvention::CDecl, &[], Some(wide.clone())).with_tuple_return(),
    );
    assert_eq!(abi.ret, ArgClass::struct_ret(wide));
    assert_eq!(abi.split_return, None);
}

#[test]
fn split_applies_on_every_architecture() {
    let wide = ReprType::struct_of(vec![ReprType::I64; 3]);
    for t in [windows(), i386(), arm64()] {
        let abi = classify(
            &t,
            &sig(CallingConvention::Contextless, &[], Some(wide.clone())).with_tuple_return(),
        );
        assert_eq!(abi.params.len(), 2, "{:?}", t.arch);
        assert_eq!(abi.ret, ArgClass::direct(ReprType::I64));
    }
}

// === 32-bit x86 ===

#[test]
fn x86_booleans_are_zero_extended() {
    let expected = ArgClass::Direct {
        ty: ReprType::I1,
        cast: None,
        attr: Some(ArgAttr::ZeroExt),
    };
    assert_eq!(c_param(&i386(), ReprType::I1), expected);
    assert_eq!(c_ret(&i386(), ReprType::I1), expected);
}

#[test]
fn x86_aggregate_params() {
    let t = i386();
    assert_eq!(
        c_param(&t, ints(2)),
        ArgClass::indirect(ints(2), Some(ArgAttr::ByVal))
    );
    assert_eq!(
        c_param(&t, ReprType::empty_struct()),
        ArgClass::ignore(ReprType::empty_struct())
    );
    assert_eq!(c_param(&t, ReprType::I128), ArgClass::indirect(ReprType::I128, None));
    assert_eq!(c_param(&t, ReprType::Double), ArgClass::direct(ReprType::Double));
}

#[test]
fn x86_aggregate_returns() {
    let t = i386();
    assert_eq!(c_ret(&t, ints(2)), ArgClass::direct_cast(ints(2), ReprType::I64));
    assert_eq!(c_ret(&t, bytes(2)), ArgClass::direct_cast(bytes(2), ReprType::I16));
    assert_eq!(c_ret(&t, ints(3)), ArgClass::struct_ret(ints(3)));
    assert_eq!(c_ret(&t, ReprType::I128), ArgClass::direct(ReprType::I128));
}

// === Windows x64 ===

#[test]
fn win64_register_sized_aggregates() {
    let t = windows();
    assert_eq!(c_param(&t, ints(2)), ArgClass::direct_cast(ints(2), ReprType::I64));
    assert_eq!(c_param(&t, bytes(1)), ArgClass::direct_cast(bytes(1), ReprType::I8));
    assert_eq!(c_param(&t, ints(3)), ArgClass::indirect(ints(3), None));
    assert_eq!(c_ret(&t, ints(4)), ArgClass::struct_ret(ints(4)));
}

#[test]
fn win64_i128() {
    let t = windows();
    assert_eq!(
        c_ret(&t, ReprType::I128),
        ArgClass::direct_cast(ReprType::I128, ReprType::vector(ReprType::I64, 2))
    );
    assert_eq!(c_param(&t, ReprType::I128), ArgClass::indirect(ReprType::I128, None));
}

// === ARM64 ===

#[test]
fn arm64_homogeneous_float_aggregates() {
    let t = arm64();
    assert_eq!(
        c_param(&t, floats(3)),
        ArgClass::direct_cast(floats(3), ReprType::array(ReprType::Float, 3))
    );
    let doubles = ReprType::struct_of(vec![ReprType::Double; 4]);
    assert_eq!(
        c_ret(&t, doubles.clone()),
        ArgClass::direct_cast(doubles, ReprType::array(ReprType::Double, 4))
    );
    let nested = ReprType::struct_of(vec![
        ReprType::array(ReprType::Float, 2),
        ReprType::struct_of(vec![ReprType::Float]),
    ]);
    assert_eq!(
        c_param(&t, nested.clone()),
        ArgClass::direct_cast(nested, ReprType::array(ReprType::Float, 3))
    );
}

#[test]
fn arm64_five_floats_are_indirect() {
    let t = arm64();
    assert_eq!(c_param(&t, floats(5)), ArgClass::indirect(floats(5), None));
    assert_eq!(c_ret(&t, floats(5)), ArgClass::struct_ret(floats(5)));
}

#[test]
fn arm64_small_aggregates_become_integers() {
    let t = arm64();
    let mixed = ReprType::struct_of(vec![ReprType::Float, ReprType::Double]);
    assert_eq!(
        c_param(&t, mixed.clone()),
        ArgClass::direct_cast(mixed, ReprType::array(ReprType::I64, 2))
    );
    assert_eq!(
        c_param(&t, bytes(3)),
        ArgClass::direct_cast(bytes(3), ReprType::int(24))
    );
    let float_int = ReprType::struct_of(vec![ReprType::Float, ReprType::I32]);
    assert_eq!(
        c_ret(&t, float_int.clone()),
        ArgClass::direct_cast(float_int, ReprType::I64)
    );
    assert_eq!(c_param(&t, ints(5)), ArgClass::indirect(ints(5), None));
}

// === 32-bit ARM ===

#[test]
fn arm32_coerces_by_alignment() {
    let t = arm32();
    assert_eq!(
        c_param(&t, bytes(3)),
        ArgClass::direct_cast(bytes(3), ReprType::array(ReprType::I32, 1))
    );
    let wide = ReprType::struct_of(vec![ReprType::I64, ReprType::I32]);
    assert_eq!(
        c_param(&t, wide.clone()),
        ArgClass::direct_cast(wide, ReprType::array(ReprType::I64, 2))
    );
    let vector = ReprType::vector(ReprType::Float, 4);
    assert_eq!(c_param(&t, vector.clone()), ArgClass::direct(vector));
}

#[test]
fn arm32_native_passes_large_aggregates_indirectly() {
    let abi = classify(
        &arm32(),
        &sig(CallingConvention::Contextless, &[ints(3), ints(2)], None),
    );
    assert_eq!(abi.params[0], ArgClass::indirect(ints(3), None));
    assert_eq!(
        abi.params[1],
        ArgClass::direct_cast(ints(2), ReprType::array(ReprType::I32, 2))
    );
}

#[test]
fn arm32_small_returns() {
    let t = arm32();
    assert_eq!(c_ret(&t, bytes(1)), ArgClass::direct_cast(bytes(1), ReprType::I8));
    assert_eq!(c_ret(&t, bytes(2)), ArgClass::direct_cast(bytes(2), ReprType::I16));
    assert_eq!(c_ret(&t, bytes(3)), ArgClass::direct_cast(bytes(3), ReprType::I32));
    assert_eq!(c_ret(&t, ints(1)), ArgClass::direct_cast(ints(1), ReprType::I32));
    assert_eq!(c_ret(&t, ints(2)), ArgClass::struct_ret(ints(2)));
    assert_eq!(c_ret(&t, ReprType::I64), ArgClass::direct(ReprType::I64));
}

// === WebAssembly ===

#[test]
fn wasm_native_passes_small_scalar_aggregates_directly() {
    let pair = ReprType::struct_of(vec![ReprType::I32, ReprType::Float]);
    let abi = classify(
        &wasm32(),
        &sig(CallingConvention::Contextless, &[pair.clone(), ints(10)], Some(ints(10))),
    );
    assert_eq!(abi.params[0], ArgClass::direct(pair));
    assert_eq!(abi.params[1], ArgClass::indirect(ints(10), None));
    assert_eq!(abi.ret, ArgClass::struct_ret(ints(10)));
}

#[test]
fn wasm_c_convention_only_passes_single_members_directly() {
    let t = wasm32();
    assert_eq!(c_param(&t, ints(1)), ArgClass::direct(ints(1)));
    assert_eq!(c_param(&t, ints(2)), ArgClass::indirect(ints(2), None));
    assert_eq!(c_ret(&t, ints(2)), ArgClass::struct_ret(ints(2)));
    assert_eq!(
        c_param(&t, ReprType::empty_struct()),
        ArgClass::ignore(ReprType::empty_struct())
    );
}

#[test]
fn wasm_native_returns_register_sized_aggregates_as_integers() {
    let nested = ReprType::struct_of(vec![ints(1)]);
    let abi = classify(
        &wasm32(),
        &sig(CallingConvention::Contextless, &[], Some(nested.clone())),
    );
    assert_eq!(abi.ret, ArgClass::direct_cast(nested, ReprType::I32));
}

#[test]
fn wasm_i128() {
    let t = wasm32();
    assert_eq!(
        c_param(&t, ReprType::I128),
        ArgClass::direct_cast(ReprType::I128, ReprType::vector(ReprType::I64, 2))
    );
    assert_eq!(c_ret(&t, ReprType::I128), ArgClass::direct(ReprType::I128));
}

#[test]
fn wasm_pseudo_slice_drops_pointer_padding() {
    let t = target(TargetArch::Wasm64p32, TargetOs::Freestanding);
    let string = ReprType::struct_of(vec![
        ReprType::Pointer,
        ReprType::array(ReprType::I8, 4),
        ReprType::I64,
    ]);
    let arg = ArgRepr {
        ty: string.clone(),
        slice_like: true,
    };
    let abi = classify(
        &t,
        &Signature::new(CallingConvention::Contextless, vec![arg], None),
    );
    assert_eq!(
        abi.params[0],
        ArgClass::direct_cast(
            string,
            ReprType::struct_of(vec![ReprType::Pointer, ReprType::I64])
        )
    );
}

#[test]
fn wasm32_strings_need_no_split() {
    let string = ReprType::struct_of(vec![ReprType::Pointer, ReprType::I32]);
    let arg = ArgRepr {
        ty: string.clone(),
        slice_like: true,
    };
    let abi = classify(
        &wasm32(),
        &Signature::new(CallingConvention::Contextless, vec![arg], None),
    );
    assert_eq!(abi.params[0], ArgClass::direct(string));
}
