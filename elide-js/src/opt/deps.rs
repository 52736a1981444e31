//! Initializer analysis and transitive dependency closure.

use super::Analysis;
use crate::ast::Node;
use crate::visit::{walk, Visit};

/// For every single-def variable, decides whether its initializer uses only
/// side-effect-free node kinds and records the immediate dependency edges:
/// `readers[r]` gains `v` for every name `r` read inside `v`'s initializer.
/// A non-local `r` marks `v` as reading a global.
pub(super) fn analyze_initializers(analysis: &mut Analysis) {
  let single_defs: Vec<String> = analysis
    .vars
    .iter()
    .filter(|(_, info)| info.single_def)
    .map(|(name, _)| name.clone())
    .collect();

  for var in single_defs {
    let Some(mut init) = analysis.vars.get_mut(&var).and_then(|info| info.init.take()) else {
      continue;
    };
    let mut simple = true;
    let mut reads = Vec::new();
    walk(&mut init, &mut |node| {
      if !node.kind().is_side_effect_free() {
        simple = false;
      }
      if let Node::Name { name } = node {
        if name != "undefined" {
          reads.push(name.clone());
        }
      }
      Visit::Continue
    });

    let info = analysis.vars.get_mut(&var).unwrap();
    info.init = Some(init);
    info.simple_init = simple;
    for read in reads {
      if !analysis.is_local(&read) {
        analysis.vars.get_mut(&var).unwrap().reads_global = true;
      }
      analysis.readers.entry(read).or_default().insert(var.clone());
    }
  }
}

/// Monotonic fixpoint over the dependency relation: if `v` reads `r` and `r`
/// reads `s`, then `v` reads `s`. A non-local `s` reached this way marks `v`
/// as reading a global. Terminates because the relation only grows over a
/// finite name set.
pub(super) fn close_transitive(analysis: &mut Analysis) {
  loop {
    let mut grew = false;
    let targets: Vec<String> = analysis.readers.keys().cloned().collect();
    for target in &targets {
      let direct: Vec<String> = analysis.readers[target].iter().cloned().collect();
      for reader in direct {
        // Everything that reads `reader` transitively reads `target` too.
        let Some(transitive) = analysis.readers.get(&reader) else {
          continue;
        };
        let transitive: Vec<String> = transitive.iter().cloned().collect();
        let target_is_local = analysis.is_local(target);
        let set = analysis.readers.get_mut(target).unwrap();
        let mut added = Vec::new();
        for var in transitive {
          if set.insert(var.clone()) {
            added.push(var);
            grew = true;
          }
        }
        if !target_is_local {
          for var in &added {
            if let Some(info) = analysis.vars.get_mut(var) {
              info.reads_global = true;
            }
          }
        }
      }
    }
    if !grew {
      break;
    }
  }
}
