use crate::syntax::token::Pos;

/// An ordered list of top-level statements. Scripts have no nesting other
/// than `if` and `for` bodies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign {
        target: LValue,
        value: Expr,
        pos: Pos,
    },
    Call {
        call: CallExpr,
        pos: Pos,
    },
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
        pos: Pos,
    },
    For {
        var_name: String,
        iterator: Expr,
        body: Vec<Stmt>,
        pos: Pos,
    },
}

impl Stmt {
    pub fn pos(&self) -> Pos {
        match self {
            Self::Assign { pos, .. }
            | Self::Call { pos, .. }
            | Self::If { pos, .. }
            | Self::For { pos, .. } => *pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal { value: Literal, pos: Pos },
    /// A plain or dotted name. Dotted member chains in expression position
    /// are flattened into one identifier, so `map.hexes` is the single name
    /// `"map.hexes"` here. Assignment targets keep their structure as
    /// [`LValue`] step lists instead.
    Ident { name: String, pos: Pos },
    Binary { left: Box<Expr>, op: String, right: Box<Expr>, pos: Pos },
    Call(CallExpr),
}

impl Expr {
    pub fn pos(&self) -> Pos {
        match self {
            Self::Literal { pos, .. } | Self::Ident { pos, .. } | Self::Binary { pos, .. } => *pos,
            Self::Call(call) => call.pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Expr>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// A structured assignment target: a root name followed by property and
/// index steps, e.g. `map.hexes[i].terrain`.
#[derive(Debug, Clone, PartialEq)]
pub struct LValue {
    pub root: String,
    pub steps: Vec<LValueStep>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LValueStep {
    Prop { name: String, pos: Pos },
    Index { index: Expr, pos: Pos },
}
