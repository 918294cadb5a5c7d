//! Arena-backed construction helpers for syntax trees.
//!
//! Parsing query text is done elsewhere; [`AstBuilder`] is how callers that
//! already know the tree shape (tests, benchmarks, embedders generating
//! queries) allocate one. Each node gets a distinct span on line 1 so that
//! diagnostics can be traced back to the node that produced them.

use std::cell::Cell;

use bumpalo::Bump;
use edgeql_core::Span;
use ordered_float::OrderedFloat;

use crate::expr::*;
use crate::ops::{BinaryOp, NonesOrder, SortDirection, UnaryOp};
use crate::stmt::*;

/// Allocates syntax nodes in an arena.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    next_col: Cell<u32>,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            next_col: Cell::new(1),
        }
    }

    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// A fresh span, distinct from every span handed out before.
    pub fn span(&self) -> Span {
        let col = self.next_col.get();
        self.next_col.set(col + 1);
        Span::new(1, col, 1)
    }

    fn alloc(&self, expr: Expr<'ast>) -> &'ast Expr<'ast> {
        self.arena.alloc(expr)
    }

    fn name(&self, qualified: &str) -> Name<'ast> {
        let (module, name) = match qualified.rsplit_once("::") {
            Some((module, name)) if !module.is_empty() => (Some(module), name),
            Some((_, name)) => (None, name),
            None => (None, qualified),
        };
        let module = module.map(|module| {
            let module: &'ast str = self.arena.alloc_str(module);
            module
        });
        Name {
            module,
            name: self.arena.alloc_str(name),
            span: self.span(),
        }
    }

    fn exprs(&self, exprs: &[&'ast Expr<'ast>]) -> &'ast [Expr<'ast>] {
        self.arena.alloc_slice_fill_iter(exprs.iter().map(|e| **e))
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn constant(&self, value: Literal<'ast>) -> &'ast Expr<'ast> {
        self.alloc(Expr::Constant(ConstantExpr {
            value,
            span: self.span(),
        }))
    }

    pub fn int(&self, value: i64) -> &'ast Expr<'ast> {
        self.constant(Literal::Int(value))
    }

    pub fn float(&self, value: f64) -> &'ast Expr<'ast> {
        self.constant(Literal::Float(OrderedFloat(value)))
    }

    pub fn string(&self, value: &str) -> &'ast Expr<'ast> {
        let value = self.arena.alloc_str(value);
        self.constant(Literal::Str(value))
    }

    pub fn boolean(&self, value: bool) -> &'ast Expr<'ast> {
        self.constant(Literal::Bool(value))
    }

    pub fn empty_set(&self) -> &'ast Expr<'ast> {
        self.alloc(Expr::EmptySet(self.span()))
    }

    /// A path rooted at an object type: `path("test::Issue", &["owner"])`.
    pub fn path(&self, root: &str, steps: &[&str]) -> &'ast Expr<'ast> {
        let root = self.name(root);
        self.path_from(Some(root), steps)
    }

    /// A partial path resolved against the path subject: `.name`.
    pub fn partial_path(&self, steps: &[&str]) -> &'ast Expr<'ast> {
        self.path_from(None, steps)
    }

    fn path_from(&self, root: Option<Name<'ast>>, steps: &[&str]) -> &'ast Expr<'ast> {
        let steps = self
            .arena
            .alloc_slice_fill_iter(steps.iter().map(|step| PathStep {
                name: self.arena.alloc_str(step),
                span: self.span(),
            }));
        self.alloc(Expr::Path(PathExpr {
            root,
            steps,
            span: self.span(),
        }))
    }

    pub fn binary(
        &self,
        left: &'ast Expr<'ast>,
        op: BinaryOp,
        right: &'ast Expr<'ast>,
    ) -> &'ast Expr<'ast> {
        let node = self.arena.alloc(BinaryExpr {
            left,
            op,
            right,
            span: self.span(),
        });
        self.alloc(Expr::Binary(node))
    }

    pub fn unary(&self, op: UnaryOp, operand: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let node = self.arena.alloc(UnaryExpr {
            op,
            operand,
            span: self.span(),
        });
        self.alloc(Expr::Unary(node))
    }

    pub fn call(&self, func: &str, args: &[&'ast Expr<'ast>]) -> &'ast Expr<'ast> {
        let node = self.arena.alloc(CallExpr {
            func: self.name(func),
            args: self.exprs(args),
            span: self.span(),
        });
        self.alloc(Expr::Call(node))
    }

    pub fn cast(&self, target: &str, expr: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let node = self.arena.alloc(CastExpr {
            target: self.name(target),
            expr,
            span: self.span(),
        });
        self.alloc(Expr::Cast(node))
    }

    pub fn set(&self, elements: &[&'ast Expr<'ast>]) -> &'ast Expr<'ast> {
        self.alloc(Expr::Set(SetExpr {
            elements: self.exprs(elements),
            span: self.span(),
        }))
    }

    pub fn paren(&self, expr: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let node = self.arena.alloc(ParenExpr {
            expr,
            span: self.span(),
        });
        self.alloc(Expr::Paren(node))
    }

    pub fn subquery(&self, select: &'ast SelectQuery<'ast>) -> &'ast Expr<'ast> {
        self.alloc(Expr::Select(select))
    }

    // ==========================================================================
    // Clauses
    // ==========================================================================

    pub fn sort(
        &self,
        path: &'ast Expr<'ast>,
        direction: SortDirection,
        nones_order: Option<NonesOrder>,
    ) -> SortExpr<'ast> {
        SortExpr {
            path,
            direction,
            nones_order,
            span: self.span(),
        }
    }

    /// Shape element selecting a pointer of the subject.
    pub fn pointer(&self, name: &str) -> ShapeElement<'ast> {
        self.pointer_with_shape(name, &[])
    }

    pub fn pointer_with_shape(
        &self,
        name: &str,
        elements: &[ShapeElement<'ast>],
    ) -> ShapeElement<'ast> {
        ShapeElement {
            name: self.arena.alloc_str(name),
            compexpr: None,
            elements: self.arena.alloc_slice_copy(elements),
            span: self.span(),
        }
    }

    /// Shape element `name := expr`.
    pub fn computable(&self, name: &str, expr: &'ast Expr<'ast>) -> ShapeElement<'ast> {
        ShapeElement {
            name: self.arena.alloc_str(name),
            compexpr: Some(expr),
            elements: &[],
            span: self.span(),
        }
    }

    pub fn select(&self, result: &'ast Expr<'ast>) -> SelectBuilder<'_, 'ast> {
        SelectBuilder {
            builder: self,
            aliases: Vec::new(),
            query: SelectQuery::new(result, self.span()),
        }
    }
}

/// Incrementally assembles a [`SelectQuery`].
pub struct SelectBuilder<'b, 'ast> {
    builder: &'b AstBuilder<'ast>,
    aliases: Vec<ModuleAlias<'ast>>,
    query: SelectQuery<'ast>,
}

impl<'b, 'ast> SelectBuilder<'b, 'ast> {
    /// `WITH MODULE module`
    pub fn with_module(mut self, module: &str) -> Self {
        let arena = self.builder.arena;
        self.aliases.push(ModuleAlias {
            alias: None,
            module: arena.alloc_str(module),
            span: self.builder.span(),
        });
        self
    }

    /// `WITH alias AS MODULE module`
    pub fn with_alias(mut self, alias: &str, module: &str) -> Self {
        let arena = self.builder.arena;
        let alias: &'ast str = arena.alloc_str(alias);
        self.aliases.push(ModuleAlias {
            alias: Some(alias),
            module: arena.alloc_str(module),
            span: self.builder.span(),
        });
        self
    }

    pub fn shape(mut self, elements: &[ShapeElement<'ast>]) -> Self {
        self.query.shape = self.builder.arena.alloc_slice_copy(elements);
        self
    }

    pub fn filter(mut self, expr: &'ast Expr<'ast>) -> Self {
        self.query.filter = Some(expr);
        self
    }

    pub fn group_by(mut self, exprs: &[&'ast Expr<'ast>]) -> Self {
        self.query.group_by = self.builder.exprs(exprs);
        self
    }

    pub fn order_by(mut self, items: &[SortExpr<'ast>]) -> Self {
        self.query.order_by = self.builder.arena.alloc_slice_copy(items);
        self
    }

    pub fn offset(mut self, expr: &'ast Expr<'ast>) -> Self {
        self.query.offset = Some(expr);
        self
    }

    pub fn limit(mut self, expr: &'ast Expr<'ast>) -> Self {
        self.query.limit = Some(expr);
        self
    }

    pub fn build(mut self) -> &'ast SelectQuery<'ast> {
        self.query.aliases = self.builder.arena.alloc_slice_copy(&self.aliases);
        self.builder.arena.alloc(self.query)
    }

    pub fn statement(self) -> Statement<'ast> {
        Statement::Select(self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_are_distinct() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let a = b.int(1);
        let c = b.int(2);
        assert_ne!(a.span(), c.span());
    }

    #[test]
    fn path_splits_module() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let Expr::Path(path) = b.path("test::Issue", &["owner", "name"]) else {
            panic!("expected path");
        };
        let root = path.root.unwrap();
        assert_eq!(root.module, Some("test"));
        assert_eq!(root.name, "Issue");
        assert_eq!(path.steps.len(), 2);
        assert!(!path.is_partial());
    }

    #[test]
    fn partial_path_has_no_root() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let Expr::Path(path) = b.partial_path(&["name"]) else {
            panic!("expected path");
        };
        assert!(path.is_partial());
    }

    #[test]
    fn select_builder_keeps_clause_order() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let name = b.sort(b.partial_path(&["name"]), SortDirection::Asc, None);
        let age = b.sort(
            b.partial_path(&["age"]),
            SortDirection::Desc,
            Some(NonesOrder::Last),
        );
        let select = b
            .select(b.path("User", &[]))
            .with_module("test")
            .order_by(&[name, age])
            .limit(b.int(10))
            .build();

        assert_eq!(select.aliases.len(), 1);
        assert_eq!(select.order_by[0].direction, SortDirection::Asc);
        assert_eq!(select.order_by[1].nones_order, Some(NonesOrder::Last));
        assert!(select.limit.is_some());
        assert!(select.filter.is_none());
    }
}
