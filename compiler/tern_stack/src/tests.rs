use super::*;

/// A chain of nested nodes, the shape a deeply nested array type takes.
enum Nested {
    Leaf(u64),
    Wrap(Box<Nested>),
}

fn build(depth: u64) -> Nested {
    let mut node = Nested::Leaf(depth);
    for _ in 0..depth {
        node = Nested::Wrap(Box::new(node));
    }
    node
}

fn depth_of(node: &Nested) -> u64 {
    ensure_sufficient_stack(|| match node {
        Nested::Leaf(_) => 0,
        Nested::Wrap(inner) => depth_of(inner) + 1,
    })
}

fn leaf_of(node: &Nested) -> u64 {
    ensure_sufficient_stack(|| match node {
        Nested::Leaf(v) => *v,
        Nested::Wrap(inner) => leaf_of(inner),
    })
}

#[test]
fn shallow_walk() {
    let node = build(8);
    assert_eq!(depth_of(&node), 8);
    assert_eq!(leaf_of(&node), 8);
}

#[test]
fn deep_walk_does_not_overflow() {
    let node = build(100_000);
    assert_eq!(depth_of(&node), 100_000);

    // Drop iteratively; the default recursive drop would overflow.
    let mut cur = node;
    while let Nested::Wrap(inner) = cur {
        cur = *inner;
    }
}

#[test]
fn returns_closure_result() {
    let result: Result<u32, &str> = ensure_sufficient_stack(|| Ok(16));
    assert_eq!(result, Ok(16));
}
