//! Type formatting for diagnostics and invariant-violation messages.

use super::Pool;
use crate::{CallingConvention, EntityId, Idx, RecordKind, Type};

impl Pool {
    /// Render a type the way it would be written in source.
    pub fn format_type(&self, idx: Idx) -> String {
        let mut buf = String::new();
        self.format_type_into(idx, &mut buf);
        buf
    }

    /// Format a type into an existing buffer.
    pub fn format_type_into(&self, idx: Idx, buf: &mut String) {
        if idx.is_none() {
            buf.push_str("<none>");
            return;
        }
        tern_stack::ensure_sufficient_stack(|| match self.get(idx) {
            Type::Basic(kind) => buf.push_str(kind.name()),
            Type::Pointer { elem } => {
                buf.push('^');
                self.format_type_into(*elem, buf);
            }
            Type::Array(array) => {
                buf.push('[');
                buf.push_str(&array.count.to_string());
                buf.push(']');
                self.format_type_into(array.elem, buf);
            }
            Type::Vector(vector) => {
                buf.push_str("[vector ");
                buf.push_str(&vector.count.to_string());
                buf.push(']');
                self.format_type_into(vector.elem, buf);
            }
            Type::Slice(slice) => {
                buf.push_str("[]");
                self.format_type_into(slice.elem, buf);
            }
            Type::Named(named) => buf.push_str(self.name_str(named.name)),
            Type::Record(record) => match record.kind {
                RecordKind::Struct(info) => {
                    buf.push_str("struct ");
                    if info.packed {
                        buf.push_str("#packed ");
                    }
                    if info.ordered {
                        buf.push_str("#ordered ");
                    }
                    if info.custom_align > 0 {
                        buf.push_str("#align ");
                        buf.push_str(&info.custom_align.to_string());
                        buf.push(' ');
                    }
                    self.format_members(&record.fields, buf);
                }
                RecordKind::Union => {
                    buf.push_str("union ");
                    self.format_members(record.fields.get(1..).unwrap_or_default(), buf);
                }
                RecordKind::RawUnion => {
                    buf.push_str("raw_union ");
                    self.format_members(&record.fields, buf);
                }
                RecordKind::Enum(info) => {
                    buf.push_str("enum ");
                    self.format_type_into(info.base, buf);
                    buf.push_str(" {");
                    for (i, &field) in record.fields.iter().enumerate() {
                        if i > 0 {
                            buf.push_str(", ");
                        }
                        buf.push_str(self.name_str(self.entity(field).name));
                    }
                    buf.push('}');
                }
            },
            Type::Tuple(tuple) => {
                buf.push('(');
                self.format_params(&tuple.members, false, buf);
                buf.push(')');
            }
            Type::Proc(proc) => {
                buf.push_str("proc");
                if proc.call_conv != CallingConvention::Native {
                    buf.push_str(" \"");
                    buf.push_str(proc.call_conv.as_str());
                    buf.push_str("\" ");
                }
                buf.push('(');
                if let Type::Tuple(params) = self.get_or_empty(proc.params) {
                    self.format_params(&params.members, proc.variadic, buf);
                }
                buf.push(')');
                if let Type::Tuple(results) = self.get_or_empty(proc.results) {
                    match results.members.as_slice() {
                        [] => {}
                        [single] if self.entity(*single).name.is_empty() => {
                            buf.push_str(" -> ");
                            self.format_type_into(self.entity(*single).ty, buf);
                        }
                        members => {
                            buf.push_str(" -> (");
                            self.format_params(members, false, buf);
                            buf.push(')');
                        }
                    }
                }
            }
        });
    }

    /// `{a: i32, b: f32}`; anonymous members render as `using T`.
    fn format_members(&self, fields: &[EntityId], buf: &mut String) {
        buf.push('{');
        for (i, &field) in fields.iter().enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            let entity = self.entity(field);
            if entity.is_anonymous() {
                buf.push_str("using ");
            }
            if !entity.name.is_empty() {
                buf.push_str(self.name_str(entity.name));
                buf.push_str(": ");
            }
            self.format_type_into(entity.ty, buf);
        }
        buf.push('}');
    }

    /// `a: int, b: ..f32`. Unnamed members print only their type.
    fn format_params(&self, members: &[EntityId], variadic: bool, buf: &mut String) {
        for (i, &member) in members.iter().enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            let entity = self.entity(member);
            if !entity.name.is_empty() {
                buf.push_str(self.name_str(entity.name));
                buf.push_str(": ");
            }
            let is_last = i + 1 == members.len();
            match self.get(self.base_type(entity.ty)) {
                Type::Slice(slice) if variadic && is_last => {
                    buf.push_str("..");
                    self.format_type_into(slice.elem, buf);
                }
                _ => self.format_type_into(entity.ty, buf),
            }
        }
    }

    /// Node for a possibly-absent tuple; `Idx::NONE` reads as invalid.
    fn get_or_empty(&self, idx: Idx) -> &Type {
        if idx.is_none() {
            self.get(Idx::INVALID)
        } else {
            self.get(idx)
        }
    }
}
