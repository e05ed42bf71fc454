//! Structural type identity.

use tern_stack::ensure_sufficient_stack;

use crate::{EntityId, Idx, Pool, RecordKind, Type};

impl Pool {
    /// Whether two types are identical.
    ///
    /// Equal indices are always identical, and `NONE` is identical only to
    /// itself. Otherwise identity is decided per kind of `x`:
    /// - basics by kind
    /// - pointers, slices, arrays and vectors by element (and count)
    /// - structs and unions by pairwise member types, structs also by their
    ///   packing and ordering flags
    /// - enums only by index: each declaration is a fresh type
    /// - named types by their resolved base
    /// - tuples by arity and member types
    /// - procedures by parameters, results, variadicity and convention
    pub fn types_identical(&self, x: Idx, y: Idx) -> bool {
        if x == y {
            return true;
        }
        if x.is_none() || y.is_none() {
            return false;
        }
        ensure_sufficient_stack(|| match (self.get(x), self.get(y)) {
            (Type::Basic(a), Type::Basic(b)) => a == b,
            (Type::Pointer { elem: a }, Type::Pointer { elem: b }) => self.types_identical(*a, *b),
            (Type::Slice(a), Type::Slice(b)) => self.types_identical(a.elem, b.elem),
            (Type::Array(a), Type::Array(b)) => {
                a.count == b.count && self.types_identical(a.elem, b.elem)
            }
            (Type::Vector(a), Type::Vector(b)) => {
                a.count == b.count && self.types_identical(a.elem, b.elem)
            }
            (Type::Record(a), Type::Record(b)) => match (a.kind, b.kind) {
                (RecordKind::Struct(sa), RecordKind::Struct(sb)) => {
                    sa.packed == sb.packed
                        && sa.ordered == sb.ordered
                        && self.members_identical(&a.fields, &b.fields)
                }
                (RecordKind::Union, RecordKind::Union)
                | (RecordKind::RawUnion, RecordKind::RawUnion) => {
                    self.members_identical(&a.fields, &b.fields)
                }
                // Enums are nominal; distinct indices were handled above.
                _ => false,
            },
            (Type::Named(_), Type::Named(_)) => self.base_type(x) == self.base_type(y),
            (Type::Tuple(a), Type::Tuple(b)) => self.members_identical(&a.members, &b.members),
            (Type::Proc(a), Type::Proc(b)) => {
                a.variadic == b.variadic
                    && a.call_conv == b.call_conv
                    && self.types_identical(a.params, b.params)
                    && self.types_identical(a.results, b.results)
            }
            _ => false,
        })
    }

    fn members_identical(&self, a: &[EntityId], b: &[EntityId]) -> bool {
        a.len() == b.len()
            && a.iter()
                .zip(b)
                .all(|(&fa, &fb)| self.types_identical(self.entity(fa).ty, self.entity(fb).ty))
    }
}
