//! Basic statistics pass.
//!
//! One traversal filling, per name: declared-local status, single-def
//! status, the declaration's initializer, and the read count. Initializer
//! subtrees are not skipped; reads inside them count toward the use totals
//! of the names they reference.

use super::{assign_target, Analysis, VarInfo};
use crate::ast::Node;
use crate::visit::{walk_body, Visit};

pub(super) fn collect(body: &mut [Node], analysis: &mut Analysis) {
  walk_body(body, &mut |node| {
    match node {
      Node::Var { bindings } => {
        for binding in bindings.iter() {
          // A name sighted before its declaration (an earlier read, an
          // earlier assignment, or another `var` binding) already has more
          // than one visible definition point.
          let seen = analysis.vars.contains_key(&binding.name);
          let info = analysis.vars.entry(binding.name.clone()).or_default();
          info.local = true;
          info.single_def = !seen;
          info.init = Some(
            binding
              .init
              .clone()
              .unwrap_or_else(|| Node::name("undefined")),
          );
        }
      }
      Node::Name { name } => match analysis.vars.get_mut(name) {
        Some(info) => info.uses += 1,
        // A read with no tracked declaration: a parameter or a global. The
        // entry pins the name as non-single-def.
        None => {
          analysis.vars.insert(name.clone(), VarInfo::default());
        }
      },
      Node::Assign { target, .. } => mark_assigned(analysis, target),
      Node::UnaryPrefix { operand, .. } | Node::UnaryPostfix { operand, .. } => {
        mark_assigned(analysis, operand)
      }
      // The construct reassigns a bare `name` head on every iteration. A
      // `var` head is invisible here; the traversal primitive skips it.
      Node::ForIn { decl, .. } => {
        if !matches!(decl.as_ref(), Node::Var { .. }) {
          mark_assigned(analysis, decl);
        }
      }
      _ => {}
    }
    Visit::Continue
  });
}

fn mark_assigned(analysis: &mut Analysis, target: &Node) {
  if let Some(name) = assign_target(target) {
    let name = name.to_string();
    analysis.vars.entry(name).or_default().single_def = false;
  }
}
