//! Type and entity constructors.

use smallvec::SmallVec;
use tern_ir::Name;

use super::{Pool, StructuralKey};
use crate::{
    ArrayType, CallingConvention, Entity, EntityFlags, EntityId, EntityKind, EnumInfo, Idx,
    NamedType, OffsetTable, PoolError, ProcType, Record, RecordKind, SliceType, StructInfo, Tuple,
    Type, VectorType,
};

impl Pool {
    fn push_type(&mut self, ty: Type) -> Idx {
        let raw = u32::try_from(self.types.len())
            .ok()
            .filter(|&raw| raw != u32::MAX)
            .unwrap_or_else(|| panic!("type pool exhausted"));
        self.types.push(ty);
        Idx::from_raw(raw)
    }

    fn push_entity(&mut self, entity: Entity) -> EntityId {
        let raw = u32::try_from(self.entities.len())
            .unwrap_or_else(|_| panic!("entity pool exhausted"));
        self.entities.push(entity);
        EntityId::from_raw(raw)
    }

    /// Index the next `push_type` will return.
    fn next_idx(&self) -> Idx {
        Idx::from_raw(u32::try_from(self.types.len()).unwrap_or(u32::MAX))
    }

    fn intern_structural(&mut self, key: StructuralKey, make: impl FnOnce(&mut Self) -> Type) -> Idx {
        if let Some(&idx) = self.structural.get(&key) {
            return idx;
        }
        let ty = make(self);
        let idx = self.push_type(ty);
        self.structural.insert(key, idx);
        idx
    }

    // === Entity Constructors ===

    /// A record field at source position `src_index`.
    pub fn field(&mut self, name: Name, ty: Idx, src_index: u32) -> EntityId {
        self.push_entity(Entity {
            kind: EntityKind::Variable,
            name,
            ty,
            flags: EntityFlags::FIELD,
            field_src_index: src_index,
            value: None,
        })
    }

    /// An anonymous (`using`) field whose members are promoted.
    pub fn embedded_field(&mut self, name: Name, ty: Idx, src_index: u32) -> EntityId {
        self.push_entity(Entity {
            kind: EntityKind::Variable,
            name,
            ty,
            flags: EntityFlags::FIELD | EntityFlags::ANONYMOUS | EntityFlags::USING,
            field_src_index: src_index,
            value: None,
        })
    }

    /// A non-field variable, e.g. a procedure parameter or result.
    pub fn variable(&mut self, name: Name, ty: Idx) -> EntityId {
        self.push_entity(Entity {
            kind: EntityKind::Variable,
            name,
            ty,
            flags: EntityFlags::empty(),
            field_src_index: 0,
            value: None,
        })
    }

    pub fn constant(&mut self, name: Name, ty: Idx, value: i64) -> EntityId {
        self.push_entity(Entity {
            kind: EntityKind::Constant,
            name,
            ty,
            flags: EntityFlags::empty(),
            field_src_index: 0,
            value: Some(value),
        })
    }

    pub fn type_name(&mut self, name: Name, ty: Idx) -> EntityId {
        self.push_entity(Entity {
            kind: EntityKind::TypeName,
            name,
            ty,
            flags: EntityFlags::empty(),
            field_src_index: 0,
            value: None,
        })
    }

    pub(super) fn synthetic_field(&mut self, name: Name, ty: Idx, index: u32) -> EntityId {
        self.push_entity(Entity {
            kind: EntityKind::Variable,
            name,
            ty,
            flags: EntityFlags::FIELD | EntityFlags::IMMUTABLE,
            field_src_index: index,
            value: None,
        })
    }

    // === Structural Types (hash-consed) ===

    /// `^elem`.
    pub fn pointer(&mut self, elem: Idx) -> Idx {
        self.intern_structural(StructuralKey::Pointer(elem), |_| Type::Pointer { elem })
    }

    /// `[count]elem`.
    pub fn array(&mut self, elem: Idx, count: i64) -> Idx {
        assert!(count >= 0, "array count {count} is negative");
        self.intern_structural(StructuralKey::Array(elem, count), |pool| {
            let count_entity = pool.constant(pool.names.count, Idx::INT, count);
            Type::Array(ArrayType {
                elem,
                count,
                count_entity,
            })
        })
    }

    /// `[vector count]elem`.
    pub fn vector(&mut self, elem: Idx, count: i64) -> Idx {
        assert!(count >= 0, "vector count {count} is negative");
        self.intern_structural(StructuralKey::Vector(elem, count), |pool| {
            let count_entity = pool.constant(pool.names.count, Idx::INT, count);
            let mut swizzle = SmallVec::new();
            if count <= 4 && !pool.is_boolean(elem) {
                let lanes = usize::try_from(count).unwrap_or(0);
                for (lane, name) in (0u32..).zip(pool.names.swizzle.into_iter().take(lanes)) {
                    swizzle.push(pool.push_entity(Entity {
                        kind: EntityKind::Variable,
                        name,
                        ty: elem,
                        flags: EntityFlags::FIELD | EntityFlags::VECTOR_ELEM,
                        field_src_index: lane,
                        value: None,
                    }));
                }
            }
            Type::Vector(VectorType {
                elem,
                count,
                count_entity,
                swizzle,
            })
        })
    }

    /// `[]elem`.
    pub fn slice(&mut self, elem: Idx) -> Idx {
        self.intern_structural(StructuralKey::Slice(elem), |pool| {
            let data_ptr = pool.pointer(elem);
            let data_entity = pool.synthetic_field(pool.names.data, data_ptr, 0);
            Type::Slice(SliceType { elem, data_entity })
        })
    }

    // === Aggregates (always fresh) ===

    pub fn struct_type(&mut self, fields: Vec<EntityId>, info: StructInfo) -> Idx {
        self.push_type(Type::Record(Record {
            kind: RecordKind::Struct(info),
            fields,
            names: None,
            offsets: OffsetTable::default(),
        }))
    }

    /// A raw (untagged) union; every member sits at offset 0.
    pub fn raw_union(&mut self, fields: Vec<EntityId>) -> Idx {
        self.push_type(Type::Record(Record {
            kind: RecordKind::RawUnion,
            fields,
            names: None,
            offsets: OffsetTable::default(),
        }))
    }

    /// A tagged union over `variants` (`TypeName` entities).
    ///
    /// The reserved "no value" slot 0 is inserted here, so the variants
    /// occupy slots `1..=variants.len()`.
    pub fn union_type(&mut self, variants: Vec<EntityId>) -> Idx {
        let mut fields = Vec::with_capacity(variants.len() + 1);
        fields.push(self.builtins.union_none);
        fields.extend(variants);
        self.push_type(Type::Record(Record {
            kind: RecordKind::Union,
            fields,
            names: None,
            offsets: OffsetTable::default(),
        }))
    }

    /// An enum over `base` with the given constants.
    ///
    /// Also creates the type-level `count`, `min_value`, `max_value` and
    /// `names` members.
    pub fn enum_type(&mut self, base: Idx, constants: &[(Name, i64)]) -> Idx {
        let idx = self.next_idx();
        let names = self.names;

        let fields: Vec<EntityId> = constants
            .iter()
            .map(|&(name, value)| self.constant(name, idx, value))
            .collect();
        let min = constants.iter().map(|&(_, v)| v).min().unwrap_or(0);
        let max = constants.iter().map(|&(_, v)| v).max().unwrap_or(0);
        let len = i64::try_from(constants.len()).unwrap_or(i64::MAX);

        let count = self.constant(names.count, Idx::INT, len);
        let min_value = self.constant(names.min_value, idx, min);
        let max_value = self.constant(names.max_value, idx, max);
        let names_ty = self.slice(Idx::STRING);
        let names_entity = self.push_entity(Entity {
            kind: EntityKind::Variable,
            name: names.names,
            ty: names_ty,
            flags: EntityFlags::IMMUTABLE,
            field_src_index: 0,
            value: None,
        });

        let pushed = self.push_type(Type::Record(Record {
            kind: RecordKind::Enum(EnumInfo {
                base,
                count,
                min_value,
                max_value,
            }),
            fields,
            names: Some(names_entity),
            offsets: OffsetTable::default(),
        }));
        debug_assert_eq!(pushed, idx);
        pushed
    }

    pub fn tuple(&mut self, members: Vec<EntityId>) -> Idx {
        self.push_type(Type::Tuple(Tuple {
            members,
            offsets: OffsetTable::default(),
        }))
    }

    /// Tuple of anonymous variables of the given types.
    pub fn tuple_of(&mut self, types: &[Idx]) -> Idx {
        let members = types
            .iter()
            .map(|&ty| self.variable(Name::EMPTY, ty))
            .collect();
        self.tuple(members)
    }

    /// A procedure type.
    ///
    /// # Panics
    /// Panics if `variadic` is set and the last parameter is not a slice.
    pub fn proc_type(
        &mut self,
        params: Idx,
        results: Idx,
        variadic: bool,
        call_conv: CallingConvention,
    ) -> Idx {
        if variadic {
            let last = self.tuple_types(params).last().copied();
            match last {
                Some(ty) if self.is_slice(ty) => {}
                _ => panic!(
                    "variadic procedure's last parameter must be a slice, found `{}`",
                    last.map_or_else(|| "nothing".to_owned(), |ty| self.format_type(ty))
                ),
            }
        }
        self.push_type(Type::Proc(ProcType {
            params,
            results,
            variadic,
            call_conv,
        }))
    }

    // === Named Types ===

    /// Declare a named type whose base is resolved later.
    pub fn declare_named(&mut self, name: Name) -> Idx {
        let idx = self.next_idx();
        let entity = self.type_name(name, idx);
        self.push_type(Type::Named(NamedType {
            name,
            base: Idx::NONE,
            entity,
        }))
    }

    /// Declare a named type with its base.
    pub fn named(&mut self, name: Name, base: Idx) -> Idx {
        let idx = self.declare_named(name);
        if let Type::Named(named) = &mut self.types[idx.index()] {
            // A fresh declaration cannot be reachable from `base`.
            named.base = base;
        }
        idx
    }

    /// Resolve a declared named type.
    ///
    /// Rejects a base link that would make the declaration its own base.
    pub fn set_named_base(&mut self, named: Idx, base: Idx) -> Result<(), PoolError> {
        let name = match self.get(named) {
            Type::Named(n) if n.base.is_none() => n.name,
            Type::Named(n) => {
                return Err(PoolError::BaseAlreadySet {
                    name: self.name_str(n.name).to_owned(),
                })
            }
            _ => return Err(PoolError::NotNamed { ty: named }),
        };

        let mut cursor = base;
        while !cursor.is_none() {
            if cursor == named {
                tracing::debug!(name = self.name_str(name), "rejected named base cycle");
                return Err(PoolError::NamedCycle {
                    name: self.name_str(name).to_owned(),
                });
            }
            match self.get(cursor) {
                Type::Named(n) => cursor = n.base,
                _ => break,
            }
        }

        if let Type::Named(n) = &mut self.types[named.index()] {
            n.base = base;
        }
        Ok(())
    }
}
