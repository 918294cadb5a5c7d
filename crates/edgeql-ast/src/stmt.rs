//! Statement and clause syntax nodes.

use edgeql_core::Span;

use crate::expr::Expr;
use crate::ops::{NonesOrder, SortDirection};

/// A top-level statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statement<'ast> {
    Select(&'ast SelectQuery<'ast>),
}

impl<'ast> Statement<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Statement::Select(select) => select.span,
        }
    }
}

/// `SELECT result { shape } FILTER ... GROUP BY ... ORDER BY ... OFFSET ... LIMIT ...`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectQuery<'ast> {
    /// `WITH MODULE m` / `WITH a AS MODULE m` declarations.
    pub aliases: &'ast [ModuleAlias<'ast>],
    pub result: &'ast Expr<'ast>,
    pub shape: &'ast [ShapeElement<'ast>],
    pub filter: Option<&'ast Expr<'ast>>,
    pub group_by: &'ast [Expr<'ast>],
    pub order_by: &'ast [SortExpr<'ast>],
    pub offset: Option<&'ast Expr<'ast>>,
    pub limit: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

impl<'ast> SelectQuery<'ast> {
    /// A bare `SELECT result` with no clauses.
    pub fn new(result: &'ast Expr<'ast>, span: Span) -> Self {
        Self {
            aliases: &[],
            result,
            shape: &[],
            filter: None,
            group_by: &[],
            order_by: &[],
            offset: None,
            limit: None,
            span,
        }
    }
}

/// A module declaration in a `WITH` block.
///
/// `alias: None` sets the default module; `Some(a)` binds `a` to `module`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleAlias<'ast> {
    pub alias: Option<&'ast str>,
    pub module: &'ast str,
    pub span: Span,
}

/// One element of a shape.
///
/// `name` alone selects a pointer of the subject; `name := expr` defines a
/// computable. A pointer element may carry a nested shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeElement<'ast> {
    pub name: &'ast str,
    pub compexpr: Option<&'ast Expr<'ast>>,
    pub elements: &'ast [ShapeElement<'ast>],
    pub span: Span,
}

/// One ORDER BY key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortExpr<'ast> {
    pub path: &'ast Expr<'ast>,
    pub direction: SortDirection,
    /// Explicit `EMPTY FIRST` / `EMPTY LAST`, if written.
    pub nones_order: Option<NonesOrder>,
    pub span: Span,
}
