//! Live-range mutation analysis.
//!
//! Walks the body tracking which single-def variables are currently live
//! (declared, dependencies still fresh). A variable leaves the live set when
//! a dependency is reassigned or a control-flow boundary is crossed; a read
//! of a single-def variable that is not live marks it mutation-tainted,
//! which disqualifies inlining.
//!
//! Kills are recorded as events in addition to being applied to the live
//! set. Loop bodies are walked from an empty live set (they may run zero or
//! many times), so a kill inside one often targets a variable that is not in
//! the inner set at all; the event log is what lets that kill still
//! invalidate the variable in the enclosing scope.

use super::{assign_target, Analysis};
use crate::ast::Node;
use ahash::HashSet;

pub(super) fn analyze(body: &mut [Node], analysis: &mut Analysis) {
  let mut ranges = LiveRanges {
    analysis,
    live: HashSet::default(),
    kill_log: Vec::new(),
  };
  ranges.walk_stmts(body);
}

struct LiveRanges<'a> {
  analysis: &'a mut Analysis,
  live: HashSet<String>,
  kill_log: Vec<String>,
}

impl LiveRanges<'_> {
  fn walk_stmts(&mut self, stmts: &mut [Node]) {
    for stmt in stmts {
      self.walk_stmt(stmt);
    }
  }

  /// Statement-position visitor.
  fn walk_stmt(&mut self, node: &mut Node) {
    match node {
      Node::Var { bindings } => {
        for binding in bindings.iter_mut() {
          // The value's effects happen before the name is defined; a
          // self-referential initializer therefore reads its own name while
          // it is not yet live and taints it.
          if let Some(init) = &binding.init {
            self.visit_effects(init);
          }
          if self.analysis.is_single_def(&binding.name) {
            self.live.insert(binding.name.clone());
          }
        }
      }
      Node::If {
        cond,
        then,
        otherwise,
      } => {
        self.branch(|s| s.visit_effects(cond));
        self.branch(|s| s.walk_stmt(then));
        if let Some(otherwise) = otherwise {
          self.branch(|s| s.walk_stmt(otherwise));
        }
      }
      Node::Try {
        body,
        catch,
        finally,
      } => {
        self.branch(|s| s.walk_stmts(body));
        if let Some(catch) = catch {
          self.branch(|s| s.walk_stmts(&mut catch.body));
        }
        if let Some(finally) = finally {
          self.branch(|s| s.walk_stmts(finally));
        }
      }
      Node::Switch {
        discriminant,
        cases,
      } => {
        self.branch(|s| s.visit_effects(discriminant));
        for case in cases {
          self.branch(|s| {
            if let Some(test) = &case.test {
              s.visit_effects(test);
            }
            s.walk_stmts(&mut case.body);
          });
        }
      }
      Node::While { cond, body } => {
        self.loop_scope(|s| {
          s.visit_effects(cond);
          s.walk_stmt(body);
        });
      }
      Node::Do { body, cond } => {
        self.loop_scope(|s| {
          s.walk_stmt(body);
          s.visit_effects(cond);
        });
      }
      Node::For {
        init,
        cond,
        step,
        body,
      } => {
        self.loop_scope(|s| {
          if let Some(init) = init {
            s.walk_stmt(init);
          }
          if let Some(cond) = cond {
            s.visit_effects(cond);
          }
          if let Some(step) = step {
            s.visit_effects(step);
          }
          s.walk_stmt(body);
        });
      }
      Node::ForIn { decl, object, body } => {
        self.loop_scope(|s| {
          // The head is reassigned by the construct on every iteration,
          // which goes through the construct rather than an `assign` node;
          // kill its readers here. A `var` head is otherwise invisible,
          // matching the traversal primitive.
          match decl.as_ref() {
            Node::Var { bindings } => {
              for binding in bindings {
                let name = binding.name.clone();
                s.kill_readers_of(&name);
              }
            }
            head => {
              if let Some(target) = assign_target(head).map(str::to_string) {
                s.kill_readers_of(&target);
              }
            }
          }
          s.visit_effects(object);
          s.walk_stmt(body);
        });
      }
      // A label may transfer control to its statement's end from anywhere
      // inside it.
      Node::Label { body, .. } => {
        self.control_flow_kill(&HashSet::default());
        self.walk_stmt(body);
      }
      Node::Block { body } => self.walk_stmts(body),
      // Unreachable behind the closure guard.
      Node::Function { .. } | Node::Defun { .. } | Node::With { .. } => {}
      other => self.visit_effects(other),
    }
  }

  /// Mutation visitor: evaluates one statement-position expression subtree
  /// for its effects on the live set. Operand reads are processed before the
  /// enclosing node's own kills, so `return a;` still observes `a` live
  /// while everything after the `return` does not.
  fn visit_effects(&mut self, node: &Node) {
    match node {
      Node::Name { name } => self.note_read(name),
      Node::Num { .. } | Node::Str { .. } => {}
      Node::Binary { left, right, .. } => {
        self.visit_effects(left);
        self.visit_effects(right);
      }
      Node::Sub { object, index } => {
        self.visit_effects(object);
        self.visit_effects(index);
      }
      Node::Dot { object, .. } => self.visit_effects(object),
      Node::Assign { target, value, .. } => {
        self.visit_effects(target);
        self.visit_effects(value);
        if let Some(resolved) = assign_target(target).map(str::to_string) {
          self.kill_readers_of(&resolved);
        }
        // Assignment may run setters on non-locals; only values
        // re-established by this very statement survive.
        let mut used = HashSet::default();
        collect_names(target, &mut used);
        collect_names(value, &mut used);
        self.kill_global_dependents(&used);
      }
      Node::UnaryPrefix { op, operand } | Node::UnaryPostfix { op, operand } => {
        self.visit_effects(operand);
        if matches!(op.as_str(), "++" | "--") {
          if let Some(resolved) = assign_target(operand).map(str::to_string) {
            self.kill_readers_of(&resolved);
          }
        }
      }
      Node::Call { callee, args } => {
        self.visit_effects(callee);
        for arg in args {
          self.visit_effects(arg);
        }
        let mut used = HashSet::default();
        collect_names(callee, &mut used);
        for arg in args {
          collect_names(arg, &mut used);
        }
        self.control_flow_kill(&used);
      }
      Node::New { callee, args } => {
        self.visit_effects(callee);
        for arg in args {
          self.visit_effects(arg);
        }
        self.control_flow_kill(&HashSet::default());
      }
      Node::Return { value } => {
        if let Some(value) = value {
          self.visit_effects(value);
        }
        self.control_flow_kill(&HashSet::default());
      }
      Node::Throw { value } => {
        self.visit_effects(value);
        self.control_flow_kill(&HashSet::default());
      }
      Node::Break { .. } | Node::Continue { .. } | Node::Debugger => {
        self.control_flow_kill(&HashSet::default());
      }
      Node::Other { children, .. } => {
        for child in children {
          self.visit_effects(child);
        }
      }
      // Statement kinds do not occur in expression position; the block
      // visitor owns them.
      Node::Var { .. }
      | Node::If { .. }
      | Node::Switch { .. }
      | Node::Try { .. }
      | Node::Do { .. }
      | Node::While { .. }
      | Node::For { .. }
      | Node::ForIn { .. }
      | Node::Function { .. }
      | Node::Defun { .. }
      | Node::With { .. }
      | Node::Label { .. }
      | Node::Block { .. } => {}
    }
  }

  /// A read of a single-def variable outside its live range is the decisive
  /// disqualifying fact: its dependencies were invalidated before this use.
  fn note_read(&mut self, name: &str) {
    if self.analysis.is_single_def(name) && !self.live.contains(name) {
      self.analysis.taint(name);
    }
  }

  fn kill(&mut self, name: String) {
    self.live.remove(&name);
    self.kill_log.push(name);
  }

  /// `target` was reassigned; every variable whose initializer (transitively)
  /// read it is stale.
  fn kill_readers_of(&mut self, target: &str) {
    let Some(readers) = self.analysis.readers.get(target) else {
      return;
    };
    let readers: Vec<String> = readers.iter().cloned().collect();
    for reader in readers {
      self.kill(reader);
    }
  }

  /// Control flow may transfer execution elsewhere, where arbitrary code can
  /// mutate non-locals. Only variables re-established by this very statement
  /// whose every dependency is local survive.
  fn control_flow_kill(&mut self, used: &HashSet<String>) {
    let doomed: Vec<String> = self
      .live
      .iter()
      .filter(|name| !(used.contains(*name) && !self.analysis.reads_global(name.as_str())))
      .cloned()
      .collect();
    for name in doomed {
      self.kill(name);
    }
  }

  /// Assignment rule: a live variable depending on a non-local dies unless
  /// this statement re-established its value.
  fn kill_global_dependents(&mut self, used: &HashSet<String>) {
    let doomed: Vec<String> = self
      .live
      .iter()
      .filter(|name| self.analysis.reads_global(name.as_str()) && !used.contains(*name))
      .cloned()
      .collect();
    for name in doomed {
      self.kill(name);
    }
  }

  /// Snapshot-and-intersect discipline for one child of a compound node:
  /// whatever was killed inside the child leaves the enclosing live set too,
  /// and nothing that became live inside leaks out.
  fn branch(&mut self, f: impl FnOnce(&mut Self)) {
    let snapshot = self.live.clone();
    let mark = self.kill_log.len();
    f(self);
    self.live = snapshot;
    self.drop_killed_since(mark);
  }

  /// Like [`Self::branch`], but the child starts from an empty live set:
  /// loop children may execute zero or many times, so nothing from the
  /// enclosing scope can be assumed preserved inside them.
  fn loop_scope(&mut self, f: impl FnOnce(&mut Self)) {
    let snapshot = self.live.clone();
    let mark = self.kill_log.len();
    self.live.clear();
    f(self);
    self.live = snapshot;
    self.drop_killed_since(mark);
  }

  fn drop_killed_since(&mut self, mark: usize) {
    for i in mark..self.kill_log.len() {
      let name = &self.kill_log[i];
      self.live.remove(name);
    }
  }
}

/// Every `name` occurring in `node`'s subtree, for `used_in_this_statement`
/// sets.
fn collect_names(node: &Node, out: &mut HashSet<String>) {
  if let Node::Name { name } = node {
    out.insert(name.clone());
  }
  match node {
    Node::Binary { left, right, .. } => {
      collect_names(left, out);
      collect_names(right, out);
    }
    Node::Sub { object, index } => {
      collect_names(object, out);
      collect_names(index, out);
    }
    Node::Dot { object, .. } => collect_names(object, out),
    Node::Assign { target, value, .. } => {
      collect_names(target, out);
      collect_names(value, out);
    }
    Node::UnaryPrefix { operand, .. } | Node::UnaryPostfix { operand, .. } => {
      collect_names(operand, out)
    }
    Node::Call { callee, args } | Node::New { callee, args } => {
      collect_names(callee, out);
      for arg in args {
        collect_names(arg, out);
      }
    }
    Node::Other { children, .. } => {
      for child in children {
        collect_names(child, out);
      }
    }
    _ => {}
  }
}
