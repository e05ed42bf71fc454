//! End-to-end: pool types through lowering and classification.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use tern_abi::{AbiCache, ArgAttr, ArgClass, Lowering, ReprType, SplitReturn, Target};
use tern_types::{CallingConvention, Idx, Pool, StructInfo};

fn make_struct(pool: &mut Pool, types: &[Idx]) -> Idx {
    let fields = (0u32..)
        .zip(types)
        .map(|(i, &ty)| {
            let name = pool.intern(&format!("f{i}"));
            pool.field(name, ty, i)
        })
        .collect();
    pool.struct_type(fields, StructInfo::default())
}

fn proc_of(pool: &mut Pool, params: &[Idx], results: &[Idx], cc: CallingConvention) -> Idx {
    let params = pool.tuple_of(params);
    let results = if results.is_empty() {
        Idx::NONE
    } else {
        pool.tuple_of(results)
    };
    pool.proc_type(params, results, false, cc)
}

#[test]
fn sysv_c_procedure() {
    tern_abi::init_tracing();
    let target = Target::from_triple("x86_64-unknown-linux-gnu").unwrap();
    let mut pool = Pool::new();
    let ints = make_struct(&mut pool, &[Idx::I32, Idx::I32, Idx::I32]);
    let floats = make_struct(&mut pool, &[Idx::F32, Idx::F32]);
    let proc_ty = proc_of(&mut pool, &[ints, Idx::BOOL], &[floats], CallingConvention::CDecl);

    let abi = AbiCache::new(target).function_abi(&pool, proc_ty);
    assert_eq!(abi.params.len(), 2);
    assert_eq!(abi.params[0].cast().map(ToString::to_string), Some("<{i64, i32}>".into()));
    assert_eq!(abi.params[1].attr(), Some(ArgAttr::ZeroExt));
    assert_eq!(abi.ret.cast().map(ToString::to_string), Some("<2 x float>".into()));
}

#[test]
fn arm64_homogeneous_aggregates() {
    let target = Target::from_triple("aarch64-apple-darwin").unwrap();
    let mut pool = Pool::new();
    let three = make_struct(&mut pool, &[Idx::F32; 3]);
    let five = make_struct(&mut pool, &[Idx::F32; 5]);
    let proc_ty = proc_of(&mut pool, &[three, five], &[], CallingConvention::CDecl);

    let abi = AbiCache::new(target).function_abi(&pool, proc_ty);
    assert_eq!(
        abi.params[0].cast(),
        Some(&ReprType::array(ReprType::Float, 3))
    );
    assert!(abi.params[1].is_indirect());
}

#[test]
fn native_multi_value_return_is_split() {
    let target = Target::from_triple("x86_64-unknown-linux-gnu").unwrap();
    let mut pool = Pool::new();
    let proc_ty = proc_of(
        &mut pool,
        &[Idx::INT],
        &[Idx::INT, Idx::STRING, Idx::F64],
        CallingConvention::Native,
    );

    let abi = AbiCache::new(target).function_abi(&pool, proc_ty);
    assert_eq!(
        abi.params,
        vec![
            ArgClass::direct(ReprType::I64),
            ArgClass::direct(ReprType::Pointer),
            ArgClass::direct(ReprType::Pointer),
            ArgClass::direct(ReprType::Pointer),
        ]
    );
    assert_eq!(abi.ret, ArgClass::direct(ReprType::Double));
    let string = ReprType::struct_of(vec![ReprType::Pointer, ReprType::I64]);
    assert_eq!(
        abi.split_return,
        Some(SplitReturn {
            original: ReprType::struct_of(vec![ReprType::I64, string, ReprType::Double]),
            original_param_count: 1,
        })
    );
}

#[test]
fn strings_on_windows_are_indirect() {
    let target = Target::from_triple("x86_64-pc-windows-msvc").unwrap();
    let mut pool = Pool::new();
    let proc_ty = proc_of(&mut pool, &[Idx::STRING], &[], CallingConvention::Contextless);

    let abi = AbiCache::new(target).function_abi(&pool, proc_ty);
    assert_eq!(
        abi.params,
        vec![ArgClass::indirect(
            ReprType::struct_of(vec![ReprType::Pointer, ReprType::I64]),
            None
        )]
    );
}

#[test]
fn variadic_slice_passes_by_value_on_sysv() {
    let target = Target::from_triple("x86_64-unknown-linux-gnu").unwrap();
    let mut pool = Pool::new();
    let rest = pool.slice(Idx::INT);
    let params = pool.tuple_of(&[rest]);
    let proc_ty = pool.proc_type(params, Idx::NONE, true, CallingConvention::Contextless);

    let abi = AbiCache::new(target).function_abi(&pool, proc_ty);
    assert_eq!(
        abi.params,
        vec![ArgClass::byval(
            ReprType::struct_of(vec![ReprType::Pointer, ReprType::I64, ReprType::I64]),
            8
        )]
    );
}

#[test]
fn wasm64p32_strings_drop_pointer_padding() {
    let target = Target::from_triple("wasm64-unknown-unknown").unwrap();
    let mut pool = Pool::new();
    let proc_ty = proc_of(&mut pool, &[Idx::STRING], &[], CallingConvention::Native);

    let abi = AbiCache::new(target).function_abi(&pool, proc_ty);
    assert_eq!(abi.params.len(), 2);
    assert_eq!(
        abi.params[0].cast(),
        Some(&ReprType::struct_of(vec![ReprType::Pointer, ReprType::I64]))
    );
}

#[test]
fn lowering_and_cache_agree() {
    let target = Target::from_triple("i686-unknown-linux-gnu").unwrap();
    let mut pool = Pool::new();
    let pair = make_struct(&mut pool, &[Idx::I32, Idx::F64]);
    let proc_ty = proc_of(&mut pool, &[pair], &[pair], CallingConvention::CDecl);

    let lowered = Lowering::new(&pool, target).lower(pair);
    assert_eq!(lowered.size(&target), 12);
    let abi = AbiCache::new(target).function_abi(&pool, proc_ty);
    assert_eq!(
        abi.params[0],
        ArgClass::indirect(lowered.clone(), Some(ArgAttr::ByVal))
    );
    assert_eq!(abi.ret, ArgClass::struct_ret(lowered));
}
