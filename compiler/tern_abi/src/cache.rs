//! Per-procedure ABI cache.
//!
//! Classification is a pure function of the procedure type and the target,
//! so each distinct procedure type is lowered and classified once and the
//! result shared between codegen workers. The cache belongs to one target
//! and one pool; indices from another pool would alias.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tern_types::{Idx, Pool};

use crate::{classify, FunctionAbi, Lowering, Target};

/// Concurrent map from procedure type to its classification.
pub struct AbiCache {
    target: Target,
    entries: RwLock<FxHashMap<Idx, Arc<FunctionAbi>>>,
}

impl AbiCache {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The classification of `proc_ty`, computed on first request.
    ///
    /// Concurrent first requests may both classify; the first insert wins
    /// and every caller receives the same `Arc`.
    ///
    /// # Panics
    /// Panics when `proc_ty` is not a procedure type.
    pub fn function_abi(&self, pool: &Pool, proc_ty: Idx) -> Arc<FunctionAbi> {
        if let Some(abi) = self.entries.read().get(&proc_ty) {
            return Arc::clone(abi);
        }

        let sig = Lowering::new(pool, self.target).signature(proc_ty);
        let abi = Arc::new(classify(&self.target, &sig));
        tracing::debug!(
            proc_ty = proc_ty.raw(),
            params = abi.params.len(),
            split = abi.split_return.is_some(),
            "abi cache miss"
        );

        let mut entries = self.entries.write();
        Arc::clone(entries.entry(proc_ty).or_insert(abi))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Every cached classification, ordered by procedure type.
    #[cfg(feature = "cache")]
    pub fn export(&self) -> Vec<(Idx, FunctionAbi)> {
        let mut entries: Vec<(Idx, FunctionAbi)> = self
            .entries
            .read()
            .iter()
            .map(|(&idx, abi)| (idx, FunctionAbi::clone(abi)))
            .collect();
        entries.sort_by_key(|&(idx, _)| idx);
        entries
    }

    /// A cache pre-filled with classifications from [`AbiCache::export`].
    #[cfg(feature = "cache")]
    pub fn with_entries(
        target: Target,
        entries: impl IntoIterator<Item = (Idx, FunctionAbi)>,
    ) -> Self {
        let entries = entries
            .into_iter()
            .map(|(idx, abi)| (idx, Arc::new(abi)))
            .collect();
        Self {
            target,
            entries: RwLock::new(entries),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
