//! Expression syntax nodes.
//!
//! All nodes borrow from an arena (`'ast`) and are `Copy`; child expressions
//! are arena references. Every node carries its source [`Span`].

use edgeql_core::{QualifiedName, Span};
use ordered_float::OrderedFloat;

use crate::ops::{BinaryOp, UnaryOp};
use crate::stmt::SelectQuery;

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal constant
    Constant(ConstantExpr<'ast>),
    /// Empty set `{}`
    EmptySet(Span),
    /// Path `Issue.owner.name` or partial path `.name`
    Path(PathExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Function call
    Call(&'ast CallExpr<'ast>),
    /// Type cast `<std::int>expr`
    Cast(&'ast CastExpr<'ast>),
    /// Set literal `{a, b}`
    Set(SetExpr<'ast>),
    /// Subquery
    Select(&'ast SelectQuery<'ast>),
    /// Parenthesized expression
    Paren(&'ast ParenExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Constant(e) => e.span,
            Self::EmptySet(span) => *span,
            Self::Path(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Call(e) => e.span,
            Self::Cast(e) => e.span,
            Self::Set(e) => e.span,
            Self::Select(e) => e.span,
            Self::Paren(e) => e.span,
        }
    }
}

/// A literal constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantExpr<'ast> {
    pub value: Literal<'ast>,
    pub span: Span,
}

/// Literal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Literal<'ast> {
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(&'ast str),
    Bool(bool),
}

/// A possibly module-qualified name as written in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name<'ast> {
    /// Module or module alias, if written.
    pub module: Option<&'ast str>,
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Name<'ast> {
    pub fn to_qualified(&self) -> QualifiedName {
        match self.module {
            Some(module) => QualifiedName::new(module, self.name),
            None => QualifiedName::unqualified(self.name),
        }
    }
}

/// One pointer step in a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathStep<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

/// A path expression.
///
/// With a `root`, the path starts at an object type (`Issue.owner`).
/// Without one it is partial (`.name`) and starts at the path subject in
/// scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathExpr<'ast> {
    pub root: Option<Name<'ast>>,
    pub steps: &'ast [PathStep<'ast>],
    pub span: Span,
}

impl<'ast> PathExpr<'ast> {
    pub fn is_partial(&self) -> bool {
        self.root.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub func: Name<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastExpr<'ast> {
    pub target: Name<'ast>,
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

/// A set literal with at least one element. `{}` is [`Expr::EmptySet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetExpr<'ast> {
    pub elements: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}
