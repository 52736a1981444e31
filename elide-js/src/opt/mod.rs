//! Per-function redundant-variable elimination.
//!
//! Pass order is fixed: closure guard, basic statistics, initializer
//! analysis, transitive dependency closure, live-range mutation analysis,
//! eligibility, then the three rewrites (declaration removal, initializer
//! collapse, substitution). Analysis tables live for one function body and
//! are discarded on return.

use crate::ast::Node;
use crate::visit::{walk, Visit};
use ahash::{HashMap, HashSet};

mod deps;
mod guard;
mod live;
mod rewrite;
mod stats;

/// A variable read more than this many times is never inlined (duplicating
/// its initializer at every use site would grow the output); a variable with
/// zero reads is always droppable.
pub const MAX_USES: u32 = 3;

/// Result of one per-function invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
  /// The body was analyzed and rewritten; this many variables were removed.
  Eliminated(usize),
  /// The body contains a nested function or `with` and was left untouched.
  Skipped,
}

/// Per-function entry for the program driver's report.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionReport {
  pub name: Option<String>,
  pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub(crate) struct VarInfo {
  /// Declared via `var` in this body.
  pub local: bool,
  /// Exactly one assigning occurrence, namely the declaration.
  pub single_def: bool,
  /// Number of `name`-kind reads.
  pub uses: u32,
  /// The declaration's initializer; present for every single-def variable.
  pub init: Option<Node>,
  /// The initializer subtree contains only side-effect-free kinds.
  pub simple_init: bool,
  /// The initializer transitively reads at least one non-local name.
  pub reads_global: bool,
  /// Some dependency may have been mutated during the live range, or a read
  /// was seen outside it. Disqualifies inlining for used variables.
  pub tainted: bool,
}

/// Analysis tables for one function body, keyed by identifier name.
#[derive(Debug, Default)]
pub(crate) struct Analysis {
  pub vars: HashMap<String, VarInfo>,
  /// `readers[r]` is the set of single-def variables whose initializers read
  /// `r` — transitively, once [`deps::close_transitive`] has run.
  pub readers: HashMap<String, HashSet<String>>,
}

impl Analysis {
  pub fn is_local(&self, name: &str) -> bool {
    self.vars.get(name).map_or(false, |info| info.local)
  }

  pub fn is_single_def(&self, name: &str) -> bool {
    self.vars.get(name).map_or(false, |info| info.single_def)
  }

  pub fn reads_global(&self, name: &str) -> bool {
    self.vars.get(name).map_or(false, |info| info.reads_global)
  }

  pub fn taint(&mut self, name: &str) {
    if let Some(info) = self.vars.get_mut(name) {
      info.tainted = true;
    }
  }
}

/// Resolves the identifier an assignment-like node ultimately targets by
/// descending through `sub`/`dot` chains (`a[i].b = ...` targets `a`).
pub(crate) fn assign_target(mut node: &Node) -> Option<&str> {
  loop {
    match node {
      Node::Name { name } => return Some(name),
      Node::Sub { object, .. } | Node::Dot { object, .. } => node = object,
      _ => return None,
    }
  }
}

/// Runs the elimination on one function body, rewriting it in place.
pub fn eliminate_vars(body: &mut Vec<Node>) -> Outcome {
  if guard::contains_closure(body) {
    tracing::debug!("body contains a nested function or `with`; skipped");
    return Outcome::Skipped;
  }

  let mut analysis = Analysis::default();
  stats::collect(body, &mut analysis);
  deps::analyze_initializers(&mut analysis);
  deps::close_transitive(&mut analysis);
  live::analyze(body, &mut analysis);

  let mut inits = eligible_inits(&analysis);
  tracing::debug!(candidates = inits.len(), "eligibility decided");
  if inits.is_empty() {
    return Outcome::Eliminated(0);
  }

  let eliminated: HashSet<String> = inits.keys().cloned().collect();
  rewrite::remove_declarations(body, &eliminated);
  rewrite::collapse(&mut inits);
  rewrite::substitute(body, &inits);
  Outcome::Eliminated(eliminated.len())
}

/// The eliminable set with each variable's recorded initializer.
fn eligible_inits(analysis: &Analysis) -> HashMap<String, Node> {
  let mut inits = HashMap::default();
  for (name, info) in analysis.vars.iter() {
    if !info.single_def || !info.simple_init {
      continue;
    }
    if info.uses != 0 && (info.uses > MAX_USES || info.tainted) {
      continue;
    }
    let Some(init) = &info.init else {
      continue;
    };
    inits.insert(name.clone(), init.clone());
  }
  inits
}

/// Runs [`eliminate_vars`] on the body of every `function`/`defun` node in
/// `top`, in pre-order. An outer body skipped by the closure guard does not
/// prevent the functions nested inside it from being optimized on their own.
pub fn eliminate_vars_in_program(top: &mut Node) -> Vec<FunctionReport> {
  let mut reports = Vec::new();
  walk(top, &mut |node| {
    match node {
      Node::Function { name, body, .. } => {
        reports.push(FunctionReport {
          name: name.clone(),
          outcome: eliminate_vars(body),
        });
      }
      Node::Defun { name, body, .. } => {
        reports.push(FunctionReport {
          name: Some(name.clone()),
          outcome: eliminate_vars(body),
        });
      }
      _ => {}
    }
    Visit::Continue
  });
  reports
}
