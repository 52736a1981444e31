use elide_js::ast::{Node, VarBinding};
#[cfg(feature = "serde")]
use elide_js::ast::{CatchClause, SwitchCase};
use elide_js::visit::{walk_body, Traversal, Visit};
use elide_js::{eliminate_vars, Outcome};
use proptest::prelude::*;
use std::collections::BTreeSet;

const NAMES: &[&str] = &["a", "b", "c", "x", "y"];

fn ident() -> impl Strategy<Value = String> {
  prop::sample::select(NAMES).prop_map(str::to_string)
}

fn simple_expr() -> impl Strategy<Value = Node> {
  prop_oneof![
    (-100i32..100).prop_map(|n| Node::num(n as f64)),
    ident().prop_map(Node::name),
    (ident(), -10i32..10).prop_map(|(n, k)| Node::binary("+", Node::name(n), Node::num(k as f64))),
    (ident(), ident()).prop_map(|(o, i)| Node::sub(Node::name(o), Node::name(i))),
  ]
}

fn expr() -> impl Strategy<Value = Node> {
  prop_oneof![
    4 => simple_expr(),
    1 => (ident(), ident()).prop_map(|(f, a)| Node::call(Node::name(f), vec![Node::name(a)])),
    1 => ident().prop_map(|n| Node::Other {
      tag: "array".to_string(),
      children: vec![Node::name(n)],
    }),
  ]
}

fn stmt(depth: u32) -> BoxedStrategy<Node> {
  let leaf = prop_oneof![
    4 => (ident(), expr()).prop_map(|(n, e)| Node::var(vec![VarBinding::new(n, Some(e))])),
    3 => (ident(), expr()).prop_map(|(n, e)| Node::assign(Node::name(n), e)),
    2 => (ident(), ident()).prop_map(|(f, a)| Node::call(Node::name(f), vec![Node::name(a)])),
    2 => simple_expr(),
    2 => expr().prop_map(|e| Node::ret(Some(e))),
    1 => Just(Node::Function {
      name: None,
      params: vec![],
      body: vec![],
    }),
  ];
  if depth == 0 {
    return leaf.boxed();
  }
  prop_oneof![
    4 => leaf,
    1 => (ident(), prop::collection::vec(stmt(depth - 1), 0..4)).prop_map(|(c, body)| {
      Node::If {
        cond: Box::new(Node::name(c)),
        then: Box::new(Node::block(body)),
        otherwise: None,
      }
    }),
    1 => (ident(), prop::collection::vec(stmt(depth - 1), 0..4)).prop_map(|(c, body)| {
      Node::While {
        cond: Box::new(Node::name(c)),
        body: Box::new(Node::block(body)),
      }
    }),
  ]
  .boxed()
}

fn body() -> impl Strategy<Value = Vec<Node>> {
  prop::collection::vec(stmt(2), 0..8)
}

/// Arbitrary trees over every node variant, for the wire-format round-trip.
#[cfg(feature = "serde")]
fn any_node() -> impl Strategy<Value = Node> {
  let leaf = prop_oneof![
    ident().prop_map(Node::name),
    (-1000i32..1000).prop_map(|n| Node::num(n as f64)),
    ident().prop_map(Node::str),
    Just(Node::Debugger),
    prop::option::of(ident()).prop_map(|label| Node::Break { label }),
    prop::option::of(ident()).prop_map(|label| Node::Continue { label }),
  ];
  leaf.prop_recursive(3, 32, 4, |inner| {
    let exprs = prop_oneof![
      (ident(), prop::option::of(inner.clone()))
        .prop_map(|(name, init)| Node::var(vec![VarBinding::new(name, init)])),
      (inner.clone(), inner.clone()).prop_map(|(l, r)| Node::binary("+", l, r)),
      (inner.clone(), inner.clone()).prop_map(|(o, i)| Node::sub(o, i)),
      (inner.clone(), ident()).prop_map(|(o, p)| Node::dot(o, p)),
      (inner.clone(), inner.clone()).prop_map(|(t, v)| Node::assign(t, v)),
      inner.clone().prop_map(|operand| Node::UnaryPrefix {
        op: "-".to_string(),
        operand: Box::new(operand),
      }),
      inner.clone().prop_map(|operand| Node::UnaryPostfix {
        op: "++".to_string(),
        operand: Box::new(operand),
      }),
      (inner.clone(), prop::collection::vec(inner.clone(), 0..3))
        .prop_map(|(callee, args)| Node::call(callee, args)),
      (inner.clone(), prop::collection::vec(inner.clone(), 0..3)).prop_map(
        |(callee, args)| Node::New {
          callee: Box::new(callee),
          args,
        }
      ),
      (ident(), prop::collection::vec(inner.clone(), 0..3))
        .prop_map(|(tag, children)| Node::Other { tag, children }),
    ];
    let compounds = prop_oneof![
      (inner.clone(), inner.clone(), prop::option::of(inner.clone())).prop_map(
        |(cond, then, otherwise)| Node::If {
          cond: Box::new(cond),
          then: Box::new(then),
          otherwise: otherwise.map(Box::new),
        }
      ),
      (
        inner.clone(),
        prop::collection::vec(
          (
            prop::option::of(inner.clone()),
            prop::collection::vec(inner.clone(), 0..2),
          )
            .prop_map(|(test, body)| SwitchCase { test, body }),
          0..3,
        ),
      )
        .prop_map(|(discriminant, cases)| Node::Switch {
          discriminant: Box::new(discriminant),
          cases,
        }),
      (
        prop::collection::vec(inner.clone(), 0..2),
        prop::option::of(
          (ident(), prop::collection::vec(inner.clone(), 0..2))
            .prop_map(|(param, body)| CatchClause { param, body }),
        ),
        prop::option::of(prop::collection::vec(inner.clone(), 0..2)),
      )
        .prop_map(|(body, catch, finally)| Node::Try {
          body,
          catch,
          finally,
        }),
      (inner.clone(), inner.clone()).prop_map(|(body, cond)| Node::Do {
        body: Box::new(body),
        cond: Box::new(cond),
      }),
      (inner.clone(), inner.clone()).prop_map(|(cond, body)| Node::While {
        cond: Box::new(cond),
        body: Box::new(body),
      }),
      (
        prop::option::of(inner.clone()),
        prop::option::of(inner.clone()),
        prop::option::of(inner.clone()),
        inner.clone(),
      )
        .prop_map(|(init, cond, step, body)| Node::For {
          init: init.map(Box::new),
          cond: cond.map(Box::new),
          step: step.map(Box::new),
          body: Box::new(body),
        }),
      (ident(), inner.clone(), inner.clone()).prop_map(|(key, object, body)| Node::ForIn {
        decl: Box::new(Node::name(key)),
        object: Box::new(object),
        body: Box::new(body),
      }),
      (
        prop::option::of(ident()),
        prop::collection::vec(ident(), 0..2),
        prop::collection::vec(inner.clone(), 0..2),
      )
        .prop_map(|(name, params, body)| Node::Function { name, params, body }),
      (
        ident(),
        prop::collection::vec(ident(), 0..2),
        prop::collection::vec(inner.clone(), 0..2),
      )
        .prop_map(|(name, params, body)| Node::Defun { name, params, body }),
      (inner.clone(), inner.clone()).prop_map(|(object, body)| Node::With {
        object: Box::new(object),
        body: Box::new(body),
      }),
    ];
    let rest = prop_oneof![
      prop::option::of(inner.clone()).prop_map(|value| Node::Return {
        value: value.map(Box::new),
      }),
      inner.clone().prop_map(|value| Node::Throw {
        value: Box::new(value),
      }),
      (ident(), inner.clone()).prop_map(|(name, body)| Node::Label {
        name,
        body: Box::new(body),
      }),
      prop::collection::vec(inner, 0..3).prop_map(Node::block),
    ];
    prop_oneof![exprs, compounds, rest]
  })
}

fn has_closure(body: &[Node]) -> bool {
  let mut scratch = body.to_vec();
  let traversal = walk_body(&mut scratch, &mut |node| match node {
    Node::Function { .. } | Node::Defun { .. } | Node::With { .. } => Visit::Stop,
    _ => Visit::Continue,
  });
  traversal == Traversal::Stopped
}

fn binding_count(body: &[Node]) -> usize {
  let mut scratch = body.to_vec();
  let mut count = 0;
  walk_body(&mut scratch, &mut |node| {
    if let Node::Var { bindings } = node {
      count += bindings.len();
    }
    Visit::Continue
  });
  count
}

fn declared_names(body: &[Node]) -> BTreeSet<String> {
  let mut scratch = body.to_vec();
  let mut names = BTreeSet::new();
  walk_body(&mut scratch, &mut |node| {
    if let Node::Var { bindings } = node {
      names.extend(bindings.iter().map(|b| b.name.clone()));
    }
    Visit::Continue
  });
  names
}

fn assigned_names(body: &[Node]) -> BTreeSet<String> {
  let mut scratch = body.to_vec();
  let mut names = BTreeSet::new();
  walk_body(&mut scratch, &mut |node| {
    let target = match node {
      Node::Assign { target, .. } => Some(target),
      Node::UnaryPrefix { operand, .. } | Node::UnaryPostfix { operand, .. } => Some(operand),
      _ => None,
    };
    if let Some(target) = target {
      if let Node::Name { name } = target.as_ref() {
        names.insert(name.clone());
      }
    }
    Visit::Continue
  });
  names
}

fn read_names(body: &[Node]) -> BTreeSet<String> {
  let mut scratch = body.to_vec();
  let mut names = BTreeSet::new();
  walk_body(&mut scratch, &mut |node| {
    if let Node::Name { name } = node {
      names.insert(name.clone());
    }
    Visit::Continue
  });
  names
}

proptest! {
  #[test]
  fn structural_invariants_hold(body in body()) {
    let original = body.clone();
    let mut optimized = body;
    let outcome = eliminate_vars(&mut optimized);

    if has_closure(&original) {
      prop_assert_eq!(outcome, Outcome::Skipped);
      prop_assert_eq!(optimized, original);
      return Ok(());
    }

    prop_assert!(
      matches!(outcome, Outcome::Eliminated(_)),
      "guard-clean body reported as skipped"
    );
    let Outcome::Eliminated(count) = outcome else {
      unreachable!()
    };

    // Every elimination removes exactly one binding.
    prop_assert_eq!(binding_count(&original) - binding_count(&optimized), count);

    // No `var` statement survives with an empty binding list.
    let mut scratch = optimized.clone();
    walk_body(&mut scratch, &mut |node| {
      if let Node::Var { bindings } = node {
        assert!(!bindings.is_empty(), "empty var statement left in tree");
      }
      Visit::Continue
    });

    // A name with any assigning occurrence keeps its declaration.
    let declared_before = declared_names(&original);
    let declared_after = declared_names(&optimized);
    for name in declared_before.intersection(&assigned_names(&original)) {
      prop_assert!(declared_after.contains(name), "assigned var {} was eliminated", name);
    }

    // No reference to an eliminated variable remains anywhere.
    let reads = read_names(&optimized);
    for name in declared_before.difference(&declared_after) {
      prop_assert!(!reads.contains(name), "dangling reference to eliminated var {}", name);
    }
  }

  #[test]
  #[cfg(feature = "serde")]
  fn serialized_trees_round_trip(node in any_node()) {
    let json = serde_json::to_string(&node).unwrap();
    let back: Node = serde_json::from_str(&json).unwrap();
    prop_assert_eq!(back, node);
  }

  #[test]
  fn elimination_is_deterministic(body in body()) {
    let mut first = body.clone();
    let mut second = body;
    let outcome_first = eliminate_vars(&mut first);
    let outcome_second = eliminate_vars(&mut second);
    prop_assert_eq!(outcome_first, outcome_second);
    prop_assert_eq!(first, second);
  }
}
