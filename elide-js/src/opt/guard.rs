//! Eligibility guard.
//!
//! Nested functions capture variables whose use sites this pass does not
//! see, and `with` injects unknown bindings; either invalidates local
//! single-def conclusions, so such bodies are left untouched.

use crate::ast::Node;
use crate::visit::{walk_body, Traversal, Visit};

pub(super) fn contains_closure(body: &mut [Node]) -> bool {
  let traversal = walk_body(body, &mut |node| match node {
    Node::Function { .. } | Node::Defun { .. } | Node::With { .. } => Visit::Stop,
    _ => Visit::Continue,
  });
  traversal == Traversal::Stopped
}
