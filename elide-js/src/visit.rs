//! Pre-order AST walker with in-place replacement and early termination.
//!
//! Every analysis and rewrite pass is built on [`walk`]. The callback decides
//! per node whether to descend, prune, splice in a replacement, or abort the
//! whole traversal.

use crate::ast::Node;

/// Callback outcome for one visited node.
pub enum Visit {
  /// Descend into the node's children.
  Continue,
  /// Keep the node but do not descend into it.
  Skip,
  /// Splice a replacement into the parent slot. The replacement is not
  /// descended into.
  Replace(Node),
  /// Abort the entire traversal.
  Stop,
}

/// Whether a traversal ran to completion or was aborted by [`Visit::Stop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Traversal {
  Complete,
  Stopped,
}

macro_rules! walk_try {
  ($e:expr) => {
    if let Traversal::Stopped = $e {
      return Traversal::Stopped;
    }
  };
}

/// Walks every node of `node`'s subtree in pre-order, including `node`
/// itself.
pub fn walk(node: &mut Node, f: &mut dyn FnMut(&mut Node) -> Visit) -> Traversal {
  match f(node) {
    Visit::Continue => {}
    Visit::Skip => return Traversal::Complete,
    Visit::Replace(replacement) => {
      *node = replacement;
      return Traversal::Complete;
    }
    Visit::Stop => return Traversal::Stopped,
  }
  walk_children(node, f)
}

/// Walks a statement list, visiting each element as a root.
pub fn walk_body(body: &mut [Node], f: &mut dyn FnMut(&mut Node) -> Visit) -> Traversal {
  for node in body {
    walk_try!(walk(node, f));
  }
  Traversal::Complete
}

fn walk_opt(node: &mut Option<Box<Node>>, f: &mut dyn FnMut(&mut Node) -> Visit) -> Traversal {
  match node {
    Some(node) => walk(node, f),
    None => Traversal::Complete,
  }
}

fn walk_children(node: &mut Node, f: &mut dyn FnMut(&mut Node) -> Visit) -> Traversal {
  match node {
    Node::Var { bindings } => {
      for binding in bindings {
        if let Some(init) = &mut binding.init {
          walk_try!(walk(init, f));
        }
      }
    }
    Node::Name { .. } | Node::Num { .. } | Node::Str { .. } | Node::Debugger => {}
    Node::Binary { left, right, .. } => {
      walk_try!(walk(left, f));
      walk_try!(walk(right, f));
    }
    Node::Sub { object, index } => {
      walk_try!(walk(object, f));
      walk_try!(walk(index, f));
    }
    Node::Dot { object, .. } => {
      walk_try!(walk(object, f));
    }
    Node::Assign { target, value, .. } => {
      walk_try!(walk(target, f));
      walk_try!(walk(value, f));
    }
    Node::UnaryPrefix { operand, .. } | Node::UnaryPostfix { operand, .. } => {
      walk_try!(walk(operand, f));
    }
    Node::Call { callee, args } | Node::New { callee, args } => {
      walk_try!(walk(callee, f));
      walk_try!(walk_body(args, f));
    }
    Node::If {
      cond,
      then,
      otherwise,
    } => {
      walk_try!(walk(cond, f));
      walk_try!(walk(then, f));
      walk_try!(walk_opt(otherwise, f));
    }
    Node::Switch {
      discriminant,
      cases,
    } => {
      walk_try!(walk(discriminant, f));
      for case in cases {
        if let Some(test) = &mut case.test {
          walk_try!(walk(test, f));
        }
        walk_try!(walk_body(&mut case.body, f));
      }
    }
    Node::Try {
      body,
      catch,
      finally,
    } => {
      walk_try!(walk_body(body, f));
      if let Some(catch) = catch {
        walk_try!(walk_body(&mut catch.body, f));
      }
      if let Some(finally) = finally {
        walk_try!(walk_body(finally, f));
      }
    }
    Node::Do { body, cond } => {
      walk_try!(walk(body, f));
      walk_try!(walk(cond, f));
    }
    Node::While { cond, body } => {
      walk_try!(walk(cond, f));
      walk_try!(walk(body, f));
    }
    Node::For {
      init,
      cond,
      step,
      body,
    } => {
      walk_try!(walk_opt(init, f));
      walk_try!(walk_opt(cond, f));
      walk_try!(walk_opt(step, f));
      walk_try!(walk(body, f));
    }
    Node::ForIn { decl, object, body } => {
      // `for-in` declares its iteration variable with unspecified mutation
      // semantics; a `var` head must stay invisible to every pass. The skip
      // is limited to the head slot: the object and body are ordinary code.
      walk_try!(walk_for_in_head(decl, f));
      walk_try!(walk(object, f));
      walk_try!(walk(body, f));
    }
    Node::Function { body, .. } | Node::Defun { body, .. } => {
      walk_try!(walk_body(body, f));
    }
    Node::With { object, body } => {
      walk_try!(walk(object, f));
      walk_try!(walk(body, f));
    }
    Node::Return { value } => {
      walk_try!(walk_opt(value, f));
    }
    Node::Break { .. } | Node::Continue { .. } => {}
    Node::Throw { value } => {
      walk_try!(walk(value, f));
    }
    Node::Label { body, .. } => {
      walk_try!(walk(body, f));
    }
    Node::Block { body } => {
      walk_try!(walk_body(body, f));
    }
    Node::Other { children, .. } => {
      walk_try!(walk_body(children, f));
    }
  }
  Traversal::Complete
}

fn walk_for_in_head(head: &mut Node, f: &mut dyn FnMut(&mut Node) -> Visit) -> Traversal {
  if matches!(head, Node::Var { .. }) {
    return Traversal::Complete;
  }
  walk(head, f)
}
