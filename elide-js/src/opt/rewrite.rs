//! Rewrites for the eliminated set: declaration removal, mutual collapse of
//! initializers, and substitution at use sites.

use crate::ast::Node;
use crate::visit::{walk, walk_body, Visit};
use ahash::{HashMap, HashSet};

/// Filters every `var` statement down to the bindings that survive. A `var`
/// left with no bindings becomes an empty block.
pub(super) fn remove_declarations(body: &mut [Node], eliminated: &HashSet<String>) {
  walk_body(body, &mut |node| {
    let Node::Var { bindings } = node else {
      return Visit::Continue;
    };
    if !bindings.iter().any(|b| eliminated.contains(&b.name)) {
      return Visit::Continue;
    }
    bindings.retain(|b| !eliminated.contains(&b.name));
    if bindings.is_empty() {
      Visit::Replace(Node::Block { body: Vec::new() })
    } else {
      Visit::Continue
    }
  });
}

/// Resolves references among the eliminated variables' own initializers to a
/// fixpoint, so no substituted expression mentions another eliminated name.
/// The substitution graph is acyclic (single-def precludes cycles), so this
/// terminates.
pub(super) fn collapse(inits: &mut HashMap<String, Node>) {
  loop {
    let mut changed = false;
    let names: Vec<String> = inits.keys().cloned().collect();
    for name in names {
      let Some(mut init) = inits.remove(&name) else {
        continue;
      };
      walk(&mut init, &mut |node| {
        if let Node::Name { name: reference } = node {
          if let Some(replacement) = inits.get(reference) {
            changed = true;
            return Visit::Replace(replacement.clone());
          }
        }
        Visit::Continue
      });
      inits.insert(name, init);
    }
    if !changed {
      break;
    }
  }
}

/// Replaces every remaining read of an eliminated variable with a deep clone
/// of its collapsed initializer.
pub(super) fn substitute(body: &mut [Node], inits: &HashMap<String, Node>) {
  walk_body(body, &mut |node| {
    if let Node::Name { name } = node {
      if let Some(init) = inits.get(name) {
        return Visit::Replace(init.clone());
      }
    }
    Visit::Continue
  });
}
