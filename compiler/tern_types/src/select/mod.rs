//! Field selection: resolving a member name against a type.
//!
//! Lookup looks through one pointer level, then matches the synthetic
//! members of basic composites before scanning record members. Anonymous
//! struct members are searched recursively with their promoted fields.

use smallvec::SmallVec;
use tern_ir::Name;
use tern_stack::ensure_sufficient_stack;

use crate::{BasicKind, EntityId, EntityKind, Idx, Pool, RecordKind, Type};

/// The result of a field lookup.
///
/// `index` is the storage path from the root type to the entity: one entry
/// for a direct member, more when reached through anonymous members.
/// Type-level results (enum constants, union variants, `count`) carry no
/// path. Once `indirect` is set it stays set for the rest of the path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub entity: Option<EntityId>,
    pub index: SmallVec<[u32; 4]>,
    pub indirect: bool,
}

impl Selection {
    /// Whether the lookup found nothing.
    pub fn is_empty(&self) -> bool {
        self.entity.is_none()
    }

    fn found(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }

    fn found_at(mut self, index: u32, entity: EntityId) -> Self {
        self.index.push(index);
        self.found(entity)
    }
}

impl Pool {
    /// Resolve `name` as a member of `ty`.
    ///
    /// With `is_type`, the lookup is on the type itself (`Enum.A`,
    /// `Enum.count`, `Union.Variant`) rather than on a value of it.
    /// The blank name `_` never resolves.
    pub fn lookup_field(&self, ty: Idx, name: Name, is_type: bool) -> Selection {
        self.lookup_field_with(ty, name, is_type, Selection::default())
    }

    /// Resolve a struct member by source position, or a tuple member by index.
    ///
    /// Out-of-range indices yield an empty selection.
    ///
    /// # Panics
    /// Panics if `ty` is neither a struct nor a tuple.
    pub fn lookup_field_from_index(&self, ty: Idx, index: usize) -> Selection {
        let base = self.base_type(ty);
        match self.get(base) {
            Type::Record(record) if matches!(record.kind, RecordKind::Struct(_)) => {
                if index >= record.fields.len() {
                    return Selection::default();
                }
                record
                    .fields
                    .iter()
                    .zip(0u32..)
                    .find(|&(&f, _)| {
                        let entity = self.entity(f);
                        entity.kind == EntityKind::Variable
                            && entity.field_src_index as usize == index
                    })
                    .map_or_else(Selection::default, |(&f, i)| {
                        Selection::default().found_at(i, f)
                    })
            }
            Type::Tuple(tuple) => match (tuple.members.get(index), u32::try_from(index)) {
                (Some(&member), Ok(i)) => Selection::default().found_at(i, member),
                _ => Selection::default(),
            },
            _ => panic!(
                "lookup by index on `{}`, which is neither a struct nor a tuple",
                self.format_type(ty)
            ),
        }
    }

    fn lookup_field_with(&self, ty: Idx, name: Name, is_type: bool, mut sel: Selection) -> Selection {
        let names = self.member_names();
        if name == names.blank {
            return Selection::default();
        }

        let deref = self.deref(ty);
        sel.indirect |= deref != ty;
        let base = self.base_type(deref);

        ensure_sufficient_stack(|| match self.get(base) {
            Type::Basic(BasicKind::Any) => {
                let builtins = self.builtins();
                if name == names.type_info {
                    sel.found_at(0, builtins.any_type_info)
                } else if name == names.data {
                    sel.found_at(1, builtins.any_data)
                } else {
                    sel
                }
            }
            Type::Basic(BasicKind::String) => {
                let builtins = self.builtins();
                if name == names.data {
                    sel.found_at(0, builtins.string_data)
                } else if name == names.count || name == names.len {
                    sel.found_at(1, builtins.string_count)
                } else {
                    sel
                }
            }
            Type::Array(array) if name == names.count => sel.found(array.count_entity),
            Type::Vector(vector) => {
                if name == names.count {
                    return sel.found(vector.count_entity);
                }
                let lane = names.swizzle.iter().position(|&s| s == name);
                match lane.and_then(|lane| vector.swizzle.get(lane).map(|&e| (lane, e))) {
                    Some((lane, entity)) => {
                        let lane = u32::try_from(lane).unwrap_or(u32::MAX);
                        sel.found_at(lane, entity)
                    }
                    None => sel,
                }
            }
            Type::Slice(slice) => {
                let builtins = self.builtins();
                if name == names.data {
                    sel.found_at(0, slice.data_entity)
                } else if name == names.count || name == names.len {
                    sel.found_at(1, builtins.slice_count)
                } else if name == names.capacity {
                    sel.found_at(2, builtins.slice_capacity)
                } else {
                    sel
                }
            }
            Type::Record(record) if is_type => {
                if name == names.names {
                    if let Some(names_entity) = record.names {
                        return sel.found(names_entity);
                    }
                }
                match record.kind {
                    RecordKind::Union => {
                        let variants = record.fields.get(1..).unwrap_or_default();
                        match self.find_by_name(variants, name) {
                            Some(variant) => sel.found(variant),
                            None => sel,
                        }
                    }
                    RecordKind::Enum(info) => {
                        if name == names.count {
                            sel.found(info.count)
                        } else if name == names.min_value {
                            sel.found(info.min_value)
                        } else if name == names.max_value {
                            sel.found(info.max_value)
                        } else {
                            match self.find_by_name(&record.fields, name) {
                                Some(constant) => sel.found(constant),
                                None => sel,
                            }
                        }
                    }
                    RecordKind::Struct(_) | RecordKind::RawUnion => sel,
                }
            }
            Type::Record(record) if record.kind != RecordKind::Union => {
                self.lookup_in_members(&record.fields, name, sel)
            }
            _ => sel,
        })
    }

    /// Scan storage members in order, descending into anonymous ones.
    fn lookup_in_members(&self, fields: &[EntityId], name: Name, mut sel: Selection) -> Selection {
        for (&field, i) in fields.iter().zip(0u32..) {
            let entity = self.entity(field);
            if !entity.is_field() {
                continue;
            }
            if entity.name == name {
                return sel.found_at(i, field);
            }
            if entity.is_anonymous() {
                let prev_len = sel.index.len();
                let prev_indirect = sel.indirect;
                sel.index.push(i);

                sel = self.lookup_field_with(entity.ty, name, false, sel);
                if sel.entity.is_some() {
                    if self.is_pointer(entity.ty) {
                        sel.indirect = true;
                    }
                    return sel;
                }

                sel.index.truncate(prev_len);
                sel.indirect = prev_indirect;
            }
        }
        sel
    }

    fn find_by_name(&self, entities: &[EntityId], name: Name) -> Option<EntityId> {
        entities
            .iter()
            .copied()
            .find(|&e| self.entity(e).name == name)
    }
}

#[cfg(test)]
mod tests;
