use super::*;
use crate::StructInfo;
use pretty_assertions::assert_eq;

fn struct_named(pool: &mut Pool, members: &[(&str, Idx)]) -> Idx {
    let fields = (0u32..)
        .zip(members)
        .map(|(i, &(name, ty))| {
            let name = pool.intern(name);
            pool.field(name, ty, i)
        })
        .collect();
    pool.struct_type(fields, StructInfo::default())
}

#[test]
fn blank_never_resolves() {
    let mut pool = Pool::new();
    let s = struct_named(&mut pool, &[("_", Idx::I32)]);
    let blank = pool.intern("_");
    assert_eq!(pool.lookup_field(s, blank, false), Selection::default());
}

#[test]
fn direct_struct_member() {
    let mut pool = Pool::new();
    let s = struct_named(&mut pool, &[("a", Idx::I32), ("b", Idx::F64)]);
    let b = pool.intern("b");
    let missing = pool.intern("c");

    let sel = pool.lookup_field(s, b, false);
    assert_eq!(sel.index.as_slice(), [1]);
    assert!(!sel.indirect);
    assert_eq!(sel.entity.map(|e| pool.entity(e).ty), Some(Idx::F64));

    assert!(pool.lookup_field(s, missing, false).is_empty());
}

#[test]
fn pointer_receiver_is_indirect() {
    let mut pool = Pool::new();
    let s = struct_named(&mut pool, &[("a", Idx::I32)]);
    let ptr = pool.pointer(s);
    let a = pool.intern("a");
    let sel = pool.lookup_field(ptr, a, false);
    assert_eq!(sel.index.as_slice(), [0]);
    assert!(sel.indirect);
}

#[test]
fn string_and_any_members() {
    let pool = Pool::new();
    let names = *pool.member_names();
    let builtins = pool.builtins().clone();

    let data = pool.lookup_field(Idx::STRING, names.data, false);
    assert_eq!(data.entity, Some(builtins.string_data));
    assert_eq!(data.index.as_slice(), [0]);

    let len = pool.lookup_field(Idx::STRING, names.len, false);
    let count = pool.lookup_field(Idx::STRING, names.count, false);
    assert_eq!(len, count);
    assert_eq!(count.index.as_slice(), [1]);

    let type_info = pool.lookup_field(Idx::ANY, names.type_info, false);
    assert_eq!(type_info.entity, Some(builtins.any_type_info));
    let any_data = pool.lookup_field(Idx::ANY, names.data, false);
    assert_eq!(any_data.index.as_slice(), [1]);
}

#[test]
fn slice_members() {
    let mut pool = Pool::new();
    let slice = pool.slice(Idx::I16);
    let names = *pool.member_names();

    let data = pool.lookup_field(slice, names.data, false);
    let elem_ptr = pool.pointer(Idx::I16);
    assert_eq!(data.entity.map(|e| pool.entity(e).ty), Some(elem_ptr));

    assert_eq!(pool.lookup_field(slice, names.len, false).index.as_slice(), [1]);
    assert_eq!(pool.lookup_field(slice, names.capacity, false).index.as_slice(), [2]);
}

#[test]
fn array_count_is_constant() {
    let mut pool = Pool::new();
    let arr = pool.array(Idx::U8, 7);
    let names = *pool.member_names();
    let sel = pool.lookup_field(arr, names.count, false);
    assert!(sel.index.is_empty());
    assert_eq!(sel.entity.and_then(|e| pool.entity(e).value), Some(7));
}

#[test]
fn vector_swizzle_lanes() {
    let mut pool = Pool::new();
    let v3 = pool.vector(Idx::F32, 3);
    let vb = pool.vector(Idx::BOOL, 2);
    let names = *pool.member_names();
    let [x, _, z, w] = names.swizzle;

    assert_eq!(pool.lookup_field(v3, z, false).index.as_slice(), [2]);
    assert!(pool.lookup_field(v3, w, false).is_empty());
    assert!(pool.lookup_field(vb, x, false).is_empty());
    assert_eq!(
        pool.lookup_field(v3, names.count, false)
            .entity
            .and_then(|e| pool.entity(e).value),
        Some(3)
    );
}

#[test]
fn embedded_members_are_promoted() {
    let mut pool = Pool::new();
    let first = struct_named(&mut pool, &[("x", Idx::I32)]);
    let second = struct_named(&mut pool, &[("y", Idx::I32)]);
    let a = pool.intern("a");
    let b = pool.intern("b");
    let fa = pool.embedded_field(a, first, 0);
    let fb = pool.embedded_field(b, second, 1);
    let outer = pool.struct_type(vec![fa, fb], StructInfo::default());

    // The failed search through `a` must not leave its index behind.
    let y = pool.intern("y");
    let sel = pool.lookup_field(outer, y, false);
    assert_eq!(sel.index.as_slice(), [1, 0]);
    assert!(!sel.indirect);
}

#[test]
fn indirect_persists_through_pointer_embedding() {
    let mut pool = Pool::new();
    let inner = struct_named(&mut pool, &[("v", Idx::I32)]);
    let i = pool.intern("inner");
    let finner = pool.embedded_field(i, inner, 0);
    let mid = pool.struct_type(vec![finner], StructInfo::default());
    let mid_ptr = pool.pointer(mid);
    let m = pool.intern("mid");
    let fmid = pool.embedded_field(m, mid_ptr, 0);
    let outer = pool.struct_type(vec![fmid], StructInfo::default());

    let v = pool.intern("v");
    let sel = pool.lookup_field(outer, v, false);
    assert_eq!(sel.index.as_slice(), [0, 0, 0]);
    assert!(sel.indirect);
}

#[test]
fn failed_pointer_embedding_does_not_leak_indirect() {
    let mut pool = Pool::new();
    let other = struct_named(&mut pool, &[("q", Idx::I32)]);
    let other_ptr = pool.pointer(other);
    let p = pool.intern("p");
    let b = pool.intern("b");
    let fp = pool.embedded_field(p, other_ptr, 0);
    let fb = pool.field(b, Idx::I64, 1);
    let outer = pool.struct_type(vec![fp, fb], StructInfo::default());

    let sel = pool.lookup_field(outer, b, false);
    assert_eq!(sel.index.as_slice(), [1]);
    assert!(!sel.indirect);
}

#[test]
fn enum_type_level_members() {
    let mut pool = Pool::new();
    let red = pool.intern("Red");
    let blue = pool.intern("Blue");
    let e = pool.enum_type(Idx::I32, &[(red, 1), (blue, 4)]);
    let names = *pool.member_names();

    let sel = pool.lookup_field(e, blue, true);
    assert_eq!(sel.entity.and_then(|c| pool.entity(c).value), Some(4));
    assert!(sel.index.is_empty());

    let max = pool.lookup_field(e, names.max_value, true);
    assert_eq!(max.entity.and_then(|c| pool.entity(c).value), Some(4));
    let count = pool.lookup_field(e, names.count, true);
    assert_eq!(count.entity.and_then(|c| pool.entity(c).value), Some(2));
    assert!(pool.lookup_field(e, names.names, true).entity.is_some());

    // Constants are not value members.
    assert!(pool.lookup_field(e, blue, false).is_empty());
}

#[test]
fn union_variants_by_type_lookup() {
    let mut pool = Pool::new();
    let circle = pool.intern("Circle");
    let square = pool.intern("Square");
    let vc = pool.type_name(circle, Idx::F32);
    let vs = pool.type_name(square, Idx::F64);
    let u = pool.union_type(vec![vc, vs]);

    assert_eq!(pool.lookup_field(u, square, true).entity, Some(vs));
    assert!(pool.lookup_field(u, square, false).is_empty());
}

#[test]
fn lookup_by_source_index() {
    let mut pool = Pool::new();
    let a = pool.intern("a");
    let b = pool.intern("b");
    // Storage order differs from source order.
    let fb = pool.field(b, Idx::I64, 1);
    let fa = pool.field(a, Idx::I8, 0);
    let s = pool.struct_type(vec![fb, fa], StructInfo::default());

    let sel = pool.lookup_field_from_index(s, 0);
    assert_eq!(sel.entity, Some(fa));
    assert_eq!(sel.index.as_slice(), [1]);
    assert!(pool.lookup_field_from_index(s, 2).is_empty());

    let t = pool.tuple_of(&[Idx::BOOL, Idx::F32]);
    assert_eq!(pool.lookup_field_from_index(t, 1).index.as_slice(), [1]);
    assert!(pool.lookup_field_from_index(t, 5).is_empty());
}

#[test]
#[should_panic(expected = "neither a struct nor a tuple")]
fn lookup_by_index_on_scalar_panics() {
    let pool = Pool::new();
    pool.lookup_field_from_index(Idx::I32, 0);
}
