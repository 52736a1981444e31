//! Redundant local-variable elimination over JavaScript-style ASTs.
//!
//! The optimizer runs on one function body at a time: it finds local
//! variables whose value can be inlined at every use site without changing
//! behavior, removes their declarations, and substitutes their initializer
//! expressions at the use sites. Parsing and printing are the caller's
//! concern; the input and output are the same in-memory tree.
//!
//! ```
//! use elide_js::ast::{Node, VarBinding};
//! use elide_js::{eliminate_vars, Outcome};
//!
//! // var a = x + 1; return a;
//! let mut body = vec![
//!   Node::var(vec![VarBinding::new(
//!     "a",
//!     Some(Node::binary("+", Node::name("x"), Node::num(1.0))),
//!   )]),
//!   Node::ret(Some(Node::name("a"))),
//! ];
//! assert_eq!(eliminate_vars(&mut body), Outcome::Eliminated(1));
//! // The declaration becomes an empty block; the use site holds the value.
//! assert_eq!(
//!   body,
//!   vec![
//!     Node::block(vec![]),
//!     Node::ret(Some(Node::binary("+", Node::name("x"), Node::num(1.0)))),
//!   ],
//! );
//! ```

pub mod ast;
mod opt;
pub mod visit;

pub use opt::{eliminate_vars, eliminate_vars_in_program, FunctionReport, Outcome, MAX_USES};
