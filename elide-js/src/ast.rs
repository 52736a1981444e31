//! AST node model.
//!
//! The optimizer does not parse source text; callers hand it a fully built
//! tree following this shape and receive the same tree, mutated in place.
//! Nodes are a tagged sum with owned children. Node kinds the analysis does
//! not understand are carried by [`Node::Other`] and treated as opaque:
//! descended structurally, contributing nothing.

/// One `(name, initializer)` entry of a `var` statement.
///
/// An absent initializer is analyzed as if it were the identifier reference
/// `undefined`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarBinding {
  pub name: String,
  pub init: Option<Node>,
}

impl VarBinding {
  pub fn new(name: impl Into<String>, init: Option<Node>) -> Self {
    Self {
      name: name.into(),
      init,
    }
  }
}

/// One arm of a `switch` statement. A `None` test is the `default` arm.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchCase {
  pub test: Option<Node>,
  pub body: Vec<Node>,
}

/// The `catch` clause of a `try` statement.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatchClause {
  pub param: String,
  pub body: Vec<Node>,
}

/// A tagged AST node. Children are listed in evaluation order.
///
/// The serialized form (behind the `serde` feature) is internally tagged by
/// `kind` with kebab-case kind names (`unary-prefix`, `for-in`, ...), which is
/// the wire format of the CLI driver.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
  feature = "serde",
  derive(serde::Serialize, serde::Deserialize),
  serde(tag = "kind", rename_all = "kebab-case")
)]
pub enum Node {
  Var {
    bindings: Vec<VarBinding>,
  },
  Name {
    name: String,
  },
  Num {
    value: f64,
  },
  #[cfg_attr(feature = "serde", serde(rename = "string"))]
  Str {
    value: String,
  },
  Binary {
    op: String,
    left: Box<Node>,
    right: Box<Node>,
  },
  /// Indexed access `object[index]`.
  Sub {
    object: Box<Node>,
    index: Box<Node>,
  },
  /// Property access `object.property`.
  Dot {
    object: Box<Node>,
    property: String,
  },
  /// `target op value`; `op` is `=` for a plain assignment.
  Assign {
    op: String,
    target: Box<Node>,
    value: Box<Node>,
  },
  UnaryPrefix {
    op: String,
    operand: Box<Node>,
  },
  UnaryPostfix {
    op: String,
    operand: Box<Node>,
  },
  Call {
    callee: Box<Node>,
    args: Vec<Node>,
  },
  New {
    callee: Box<Node>,
    args: Vec<Node>,
  },
  If {
    cond: Box<Node>,
    then: Box<Node>,
    otherwise: Option<Box<Node>>,
  },
  Switch {
    discriminant: Box<Node>,
    cases: Vec<SwitchCase>,
  },
  Try {
    body: Vec<Node>,
    catch: Option<CatchClause>,
    finally: Option<Vec<Node>>,
  },
  Do {
    body: Box<Node>,
    cond: Box<Node>,
  },
  While {
    cond: Box<Node>,
    body: Box<Node>,
  },
  For {
    init: Option<Box<Node>>,
    cond: Option<Box<Node>>,
    step: Option<Box<Node>>,
    body: Box<Node>,
  },
  /// `for (decl in object) body`. The head is either a `var` with a single
  /// binding or a bare `name`.
  ForIn {
    decl: Box<Node>,
    object: Box<Node>,
    body: Box<Node>,
  },
  Function {
    name: Option<String>,
    params: Vec<String>,
    body: Vec<Node>,
  },
  Defun {
    name: String,
    params: Vec<String>,
    body: Vec<Node>,
  },
  With {
    object: Box<Node>,
    body: Box<Node>,
  },
  Return {
    value: Option<Box<Node>>,
  },
  Break {
    label: Option<String>,
  },
  Continue {
    label: Option<String>,
  },
  Throw {
    value: Box<Node>,
  },
  Label {
    name: String,
    body: Box<Node>,
  },
  Debugger,
  Block {
    body: Vec<Node>,
  },
  /// Any node kind outside the analysis vocabulary (object and array
  /// literals, conditionals, regexes, ...). Opaque to every pass.
  Other {
    tag: String,
    children: Vec<Node>,
  },
}

/// Fieldless kind tag for a [`Node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
  Var,
  Name,
  Num,
  Str,
  Binary,
  Sub,
  Dot,
  Assign,
  UnaryPrefix,
  UnaryPostfix,
  Call,
  New,
  If,
  Switch,
  Try,
  Do,
  While,
  For,
  ForIn,
  Function,
  Defun,
  With,
  Return,
  Break,
  Continue,
  Throw,
  Label,
  Debugger,
  Block,
  Other,
}

impl NodeKind {
  /// Kinds whose evaluation is, by convention of this analysis, not
  /// observably effectful. The predicate looks at one kind only; callers
  /// walk subtrees themselves. Indexed access is included even though
  /// getters exist; inherited behavior.
  pub fn is_side_effect_free(self) -> bool {
    matches!(
      self,
      NodeKind::Name | NodeKind::Num | NodeKind::Str | NodeKind::Binary | NodeKind::Sub
    )
  }

  /// Kinds that may transfer control out of the current statement sequence
  /// or invoke arbitrary external code.
  pub fn is_control_flow(self) -> bool {
    matches!(
      self,
      NodeKind::Return
        | NodeKind::Break
        | NodeKind::Continue
        | NodeKind::New
        | NodeKind::Throw
        | NodeKind::Call
        | NodeKind::Label
        | NodeKind::Debugger
    )
  }
}

impl Node {
  pub fn kind(&self) -> NodeKind {
    match self {
      Node::Var { .. } => NodeKind::Var,
      Node::Name { .. } => NodeKind::Name,
      Node::Num { .. } => NodeKind::Num,
      Node::Str { .. } => NodeKind::Str,
      Node::Binary { .. } => NodeKind::Binary,
      Node::Sub { .. } => NodeKind::Sub,
      Node::Dot { .. } => NodeKind::Dot,
      Node::Assign { .. } => NodeKind::Assign,
      Node::UnaryPrefix { .. } => NodeKind::UnaryPrefix,
      Node::UnaryPostfix { .. } => NodeKind::UnaryPostfix,
      Node::Call { .. } => NodeKind::Call,
      Node::New { .. } => NodeKind::New,
      Node::If { .. } => NodeKind::If,
      Node::Switch { .. } => NodeKind::Switch,
      Node::Try { .. } => NodeKind::Try,
      Node::Do { .. } => NodeKind::Do,
      Node::While { .. } => NodeKind::While,
      Node::For { .. } => NodeKind::For,
      Node::ForIn { .. } => NodeKind::ForIn,
      Node::Function { .. } => NodeKind::Function,
      Node::Defun { .. } => NodeKind::Defun,
      Node::With { .. } => NodeKind::With,
      Node::Return { .. } => NodeKind::Return,
      Node::Break { .. } => NodeKind::Break,
      Node::Continue { .. } => NodeKind::Continue,
      Node::Throw { .. } => NodeKind::Throw,
      Node::Label { .. } => NodeKind::Label,
      Node::Debugger => NodeKind::Debugger,
      Node::Block { .. } => NodeKind::Block,
      Node::Other { .. } => NodeKind::Other,
    }
  }

  pub fn name(name: impl Into<String>) -> Node {
    Node::Name { name: name.into() }
  }

  pub fn num(value: f64) -> Node {
    Node::Num { value }
  }

  pub fn str(value: impl Into<String>) -> Node {
    Node::Str {
      value: value.into(),
    }
  }

  pub fn binary(op: impl Into<String>, left: Node, right: Node) -> Node {
    Node::Binary {
      op: op.into(),
      left: Box::new(left),
      right: Box::new(right),
    }
  }

  pub fn sub(object: Node, index: Node) -> Node {
    Node::Sub {
      object: Box::new(object),
      index: Box::new(index),
    }
  }

  pub fn dot(object: Node, property: impl Into<String>) -> Node {
    Node::Dot {
      object: Box::new(object),
      property: property.into(),
    }
  }

  /// Plain `=` assignment.
  pub fn assign(target: Node, value: Node) -> Node {
    Node::Assign {
      op: "=".to_string(),
      target: Box::new(target),
      value: Box::new(value),
    }
  }

  pub fn call(callee: Node, args: Vec<Node>) -> Node {
    Node::Call {
      callee: Box::new(callee),
      args,
    }
  }

  pub fn var(bindings: Vec<VarBinding>) -> Node {
    Node::Var { bindings }
  }

  pub fn ret(value: Option<Node>) -> Node {
    Node::Return {
      value: value.map(Box::new),
    }
  }

  pub fn block(body: Vec<Node>) -> Node {
    Node::Block { body }
  }
}
