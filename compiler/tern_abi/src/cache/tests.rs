use super::*;
use crate::{ArgClass, ReprType, TargetArch, TargetOs};
use pretty_assertions::assert_eq;
use tern_types::CallingConvention;

fn amd64() -> Target {
    Target::new(TargetArch::Amd64, TargetOs::Linux)
}

#[test]
fn classifies_once_per_procedure_type() {
    let mut pool = Pool::new();
    let params = pool.tuple_of(&[Idx::INT, Idx::F64]);
    let proc_ty = pool.proc_type(params, Idx::NONE, false, CallingConvention::CDecl);
    let cache = AbiCache::new(amd64());
    assert!(cache.is_empty());

    let first = cache.function_abi(&pool, proc_ty);
    let second = cache.function_abi(&pool, proc_ty);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
    assert_eq!(
        first.params,
        vec![
            ArgClass::direct(ReprType::I64),
            ArgClass::direct(ReprType::Double)
        ]
    );
}

#[test]
fn distinct_procedure_types_get_distinct_entries() {
    let mut pool = Pool::new();
    let params = pool.tuple_of(&[Idx::I32]);
    let c = pool.proc_type(params, Idx::NONE, false, CallingConvention::CDecl);
    let native = pool.proc_type(params, Idx::NONE, false, CallingConvention::Native);
    let cache = AbiCache::new(amd64());

    assert_eq!(cache.function_abi(&pool, c).params.len(), 1);
    assert_eq!(cache.function_abi(&pool, native).params.len(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn shared_between_threads() {
    let mut pool = Pool::new();
    let params = pool.tuple_of(&[Idx::STRING]);
    let proc_ty = pool.proc_type(params, Idx::NONE, false, CallingConvention::Contextless);
    let cache = AbiCache::new(amd64());

    let results: Vec<Arc<FunctionAbi>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| cache.function_abi(&pool, proc_ty)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(cache.len(), 1);
    let cached = cache.function_abi(&pool, proc_ty);
    for abi in &results {
        assert_eq!(**abi, *cached);
    }
}

#[cfg(feature = "cache")]
#[test]
fn export_round_trips_into_a_new_cache() {
    let mut pool = Pool::new();
    let params = pool.tuple_of(&[Idx::I32]);
    let a = pool.proc_type(params, Idx::NONE, false, CallingConvention::CDecl);
    let b = pool.proc_type(params, Idx::NONE, false, CallingConvention::Native);
    let cache = AbiCache::new(amd64());
    cache.function_abi(&pool, b);
    cache.function_abi(&pool, a);

    let exported = cache.export();
    assert_eq!(
        exported.iter().map(|(idx, _)| *idx).collect::<Vec<_>>(),
        vec![a, b]
    );

    let restored = AbiCache::with_entries(amd64(), exported.clone());
    assert_eq!(restored.len(), 2);
    assert_eq!(*restored.function_abi(&pool, a), exported[0].1);
}
