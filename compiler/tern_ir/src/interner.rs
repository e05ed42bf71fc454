//! Sharded string interner.
//!
//! Declaration and member names are interned once and compared as
//! [`Name`] handles afterwards. The shard is picked from the string's hash,
//! so concurrent front-end threads contend only when they intern into the
//! same shard.

use std::hash::{BuildHasher, BuildHasherDefault};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};

use crate::Name;

/// Interning failed because a shard ran out of local indices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("interner shard {shard} is full ({len} names)")]
pub struct InternError {
    pub shard: usize,
    pub len: usize,
}

#[derive(Default)]
struct Shard {
    by_text: FxHashMap<&'static str, u32>,
    texts: Vec<&'static str>,
}

impl Shard {
    fn find(&self, text: &str) -> Option<u32> {
        self.by_text.get(text).copied()
    }

    fn insert(&mut self, shard: usize, text: &str) -> Result<u32, InternError> {
        let local = u32::try_from(self.texts.len())
            .ok()
            .filter(|&local| local <= Name::MAX_LOCAL)
            .ok_or(InternError {
                shard,
                len: self.texts.len(),
            })?;
        let text: &'static str = Box::leak(text.into());
        self.texts.push(text);
        self.by_text.insert(text, local);
        Ok(local)
    }
}

/// Thread-safe string interner; strings are leaked and live for the
/// whole process.
pub struct StringInterner {
    shards: [RwLock<Shard>; Name::NUM_SHARDS],
}

impl StringInterner {
    pub fn new() -> Self {
        let interner = Self {
            shards: std::array::from_fn(|_| RwLock::default()),
        };
        // `Name::EMPTY` is shard 0, local 0.
        {
            let mut first = interner.shards[0].write();
            first.texts.push("");
            first.by_text.insert("", 0);
        }
        interner
    }

    fn shard_of(text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let hash = BuildHasherDefault::<FxHasher>::default().hash_one(text);
        usize::try_from(hash % Name::NUM_SHARDS as u64).unwrap_or(0)
    }

    /// Intern `text`, failing only when its shard is full.
    pub fn try_intern(&self, text: &str) -> Result<Name, InternError> {
        let shard = Self::shard_of(text);
        let tag = u32::try_from(shard).unwrap_or(0);
        if let Some(local) = self.shards[shard].read().find(text) {
            return Ok(Name::new(tag, local));
        }
        let mut guard = self.shards[shard].write();
        let local = match guard.find(text) {
            Some(local) => local,
            None => guard.insert(shard, text)?,
        };
        Ok(Name::new(tag, local))
    }

    /// # Panics
    /// Panics when the string's shard is full.
    pub fn intern(&self, text: &str) -> Name {
        self.try_intern(text).unwrap_or_else(|err| panic!("{err}"))
    }

    /// The text of `name`.
    ///
    /// # Panics
    /// Panics on a name this interner did not produce.
    pub fn lookup(&self, name: Name) -> &'static str {
        let shard = self.shards[name.shard()].read();
        match shard.texts.get(name.local()) {
            Some(text) => text,
            None => panic!("{name:?} was not interned here"),
        }
    }

    /// Number of distinct strings, counting the empty string.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().texts.len()).sum()
    }

    /// Whether nothing but the empty string has been interned.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// A reference-counted [`StringInterner`], cloned into every pool and
/// worker that needs names.
#[derive(Clone, Default)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &StringInterner {
        &self.0
    }
}
