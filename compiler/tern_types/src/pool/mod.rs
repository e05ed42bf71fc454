//! Arena of type nodes and entities.
//!
//! The pool owns every [`Type`] and [`Entity`] for the lifetime of the
//! compilation. The front end populates it through the constructors in
//! `construct`; after that it is only read, and can be shared across codegen
//! workers (`Pool: Sync`). The only interior mutation is the one-time
//! memoization of struct and tuple offsets.

mod construct;
mod format;

use rustc_hash::FxHashMap;
use tern_ir::{Name, SharedInterner};

use crate::{
    BasicFlags, BasicKind, BuiltinFields, Entity, EntityId, Idx, MemberNames, RecordKind, Type,
};

/// Hash-consing key for structural types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
enum StructuralKey {
    Pointer(Idx),
    Array(Idx, i64),
    Vector(Idx, i64),
    Slice(Idx),
}

/// The type arena.
pub struct Pool {
    types: Vec<Type>,
    entities: Vec<Entity>,
    interner: SharedInterner,
    names: MemberNames,
    builtins: BuiltinFields,
    structural: FxHashMap<StructuralKey, Idx>,
}

impl Pool {
    /// Create a pool with its own interner.
    pub fn new() -> Self {
        Self::with_interner(SharedInterner::new())
    }

    /// Create a pool sharing the front end's interner.
    pub fn with_interner(interner: SharedInterner) -> Self {
        let names = MemberNames {
            blank: interner.intern("_"),
            data: interner.intern("data"),
            len: interner.intern("len"),
            count: interner.intern("count"),
            capacity: interner.intern("capacity"),
            type_info: interner.intern("type_info"),
            names: interner.intern("names"),
            min_value: interner.intern("min_value"),
            max_value: interner.intern("max_value"),
            swizzle: [
                interner.intern("x"),
                interner.intern("y"),
                interner.intern("z"),
                interner.intern("w"),
            ],
        };

        let mut types = Vec::with_capacity(256);
        types.extend(BasicKind::ALL.iter().map(|&kind| Type::Basic(kind)));

        // Placeholder ids; the real table is built below once `self` exists.
        let placeholder = EntityId::from_raw(0);
        let mut pool = Pool {
            types,
            entities: Vec::with_capacity(256),
            interner,
            names,
            builtins: BuiltinFields {
                any_type_info: placeholder,
                any_data: placeholder,
                string_data: placeholder,
                string_count: placeholder,
                slice_count: placeholder,
                slice_capacity: placeholder,
                union_none: placeholder,
            },
            structural: FxHashMap::default(),
        };
        pool.builtins = pool.make_builtin_fields();
        pool
    }

    fn make_builtin_fields(&mut self) -> BuiltinFields {
        let names = self.names;
        let u8_ptr = self.pointer(Idx::U8);
        BuiltinFields {
            any_type_info: self.synthetic_field(names.type_info, Idx::RAWPTR, 0),
            any_data: self.synthetic_field(names.data, Idx::RAWPTR, 1),
            string_data: self.synthetic_field(names.data, u8_ptr, 0),
            string_count: self.synthetic_field(names.count, Idx::INT, 1),
            slice_count: self.synthetic_field(names.count, Idx::INT, 1),
            slice_capacity: self.synthetic_field(names.capacity, Idx::INT, 2),
            union_none: self.type_name(Name::EMPTY, Idx::NONE),
        }
    }

    // === Accessors ===

    /// Get the node behind an index.
    ///
    /// # Panics
    /// Panics on `Idx::NONE` or an index from another pool.
    #[inline]
    pub fn get(&self, idx: Idx) -> &Type {
        match self.types.get(idx.index()) {
            Some(ty) => ty,
            None => panic!("{idx:?} is not a type in this pool"),
        }
    }

    #[inline]
    pub fn entity(&self, id: EntityId) -> &Entity {
        match self.entities.get(id.index()) {
            Some(entity) => entity,
            None => panic!("{id:?} is not an entity in this pool"),
        }
    }

    /// Number of type nodes, basics included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Intern a name in the pool's interner.
    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn name_str(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    pub fn member_names(&self) -> &MemberNames {
        &self.names
    }

    pub fn builtins(&self) -> &BuiltinFields {
        &self.builtins
    }

    // === Resolution ===

    /// Resolve through `Named` links to the underlying type.
    ///
    /// Idempotent. An unresolved declaration resolves to `Idx::INVALID`;
    /// `Idx::NONE` resolves to itself.
    pub fn base_type(&self, mut idx: Idx) -> Idx {
        if idx.is_none() {
            return idx;
        }
        // Terminates: `set_named_base` rejects cycles.
        while let Type::Named(named) = self.get(idx) {
            if named.base.is_none() {
                return Idx::INVALID;
            }
            idx = named.base;
        }
        idx
    }

    /// The integer base of an enum, or the type itself.
    pub fn base_enum_type(&self, idx: Idx) -> Idx {
        let base = self.base_type(idx);
        match self.record_kind(base) {
            Some(RecordKind::Enum(info)) => info.base,
            _ => idx,
        }
    }

    /// Strip one pointer level.
    pub fn deref(&self, idx: Idx) -> Idx {
        if idx.is_none() {
            return idx;
        }
        match self.get(self.base_type(idx)) {
            Type::Pointer { elem } => *elem,
            _ => idx,
        }
    }

    /// Member entity at a storage index, including synthetic members.
    pub fn member_at(&self, idx: Idx, index: usize) -> Option<EntityId> {
        let base = self.base_type(idx);
        match self.get(base) {
            Type::Record(record) => record.fields.get(index).copied(),
            Type::Tuple(tuple) => tuple.members.get(index).copied(),
            Type::Basic(BasicKind::String) => match index {
                0 => Some(self.builtins.string_data),
                1 => Some(self.builtins.string_count),
                _ => None,
            },
            Type::Basic(BasicKind::Any) => match index {
                0 => Some(self.builtins.any_type_info),
                1 => Some(self.builtins.any_data),
                _ => None,
            },
            Type::Slice(slice) => match index {
                0 => Some(slice.data_entity),
                1 => Some(self.builtins.slice_count),
                2 => Some(self.builtins.slice_capacity),
                _ => None,
            },
            Type::Vector(vector) => vector.swizzle.get(index).copied(),
            _ => None,
        }
    }

    /// Member types of a tuple; empty for `Idx::NONE`.
    pub fn tuple_types(&self, idx: Idx) -> Vec<Idx> {
        if idx.is_none() {
            return Vec::new();
        }
        match self.get(self.base_type(idx)) {
            Type::Tuple(tuple) => tuple.members.iter().map(|&m| self.entity(m).ty).collect(),
            _ => panic!("{} is not a tuple", self.format_type(idx)),
        }
    }

    // === Kind Predicates ===
    // All predicates look through `Named`.

    pub fn record_kind(&self, idx: Idx) -> Option<RecordKind> {
        if idx.is_none() {
            return None;
        }
        match self.get(self.base_type(idx)) {
            Type::Record(record) => Some(record.kind),
            _ => None,
        }
    }

    pub fn basic_flags(&self, idx: Idx) -> Option<BasicFlags> {
        if idx.is_none() {
            return None;
        }
        match self.get(self.base_type(idx)) {
            Type::Basic(kind) => Some(kind.flags()),
            _ => None,
        }
    }

    pub fn is_named(&self, idx: Idx) -> bool {
        !idx.is_none() && matches!(self.get(idx), Type::Named(_))
    }

    pub fn is_pointer(&self, idx: Idx) -> bool {
        !idx.is_none() && matches!(self.get(self.base_type(idx)), Type::Pointer { .. })
    }

    pub fn is_slice(&self, idx: Idx) -> bool {
        !idx.is_none() && matches!(self.get(self.base_type(idx)), Type::Slice(_))
    }

    pub fn is_array(&self, idx: Idx) -> bool {
        !idx.is_none() && matches!(self.get(self.base_type(idx)), Type::Array(_))
    }

    pub fn is_vector(&self, idx: Idx) -> bool {
        !idx.is_none() && matches!(self.get(self.base_type(idx)), Type::Vector(_))
    }

    pub fn is_tuple(&self, idx: Idx) -> bool {
        !idx.is_none() && matches!(self.get(self.base_type(idx)), Type::Tuple(_))
    }

    pub fn is_proc(&self, idx: Idx) -> bool {
        !idx.is_none() && matches!(self.get(self.base_type(idx)), Type::Proc(_))
    }

    pub fn is_struct(&self, idx: Idx) -> bool {
        matches!(self.record_kind(idx), Some(RecordKind::Struct(_)))
    }

    pub fn is_union(&self, idx: Idx) -> bool {
        matches!(self.record_kind(idx), Some(RecordKind::Union))
    }

    pub fn is_raw_union(&self, idx: Idx) -> bool {
        matches!(self.record_kind(idx), Some(RecordKind::RawUnion))
    }

    pub fn is_enum(&self, idx: Idx) -> bool {
        matches!(self.record_kind(idx), Some(RecordKind::Enum(_)))
    }

    pub fn is_boolean(&self, idx: Idx) -> bool {
        self.basic_flags(idx)
            .is_some_and(|f| f.contains(BasicFlags::BOOLEAN))
    }

    pub fn is_integer(&self, idx: Idx) -> bool {
        self.basic_flags(idx)
            .is_some_and(|f| f.contains(BasicFlags::INTEGER))
    }

    pub fn is_float(&self, idx: Idx) -> bool {
        self.basic_flags(idx)
            .is_some_and(|f| f.contains(BasicFlags::FLOAT))
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}
