//! Clause compilers.
//!
//! Every clause follows the same pipeline: open a scope, dispatch the
//! operand, wrap it with the clause's type hint, then apply the clause's
//! cardinality constraint. An absent clause yields nothing and touches no
//! state.
//!
//! The set a clause produces carries the span of the clause operand, so
//! diagnostics and downstream consumers point at the operand as written.

use edgeql_ast::{Expr, SortExpr as AstSortExpr};
use edgeql_core::{TypeId, std_types};
use tracing::trace;

use crate::Result;
use crate::context::{Clause, CompilationContext};
use crate::dispatch;
use crate::ir::{Ir, SetId, SortExpr, TypedExpr};
use crate::pathctx;
use crate::setgen;

/// `FILTER expr`: a boolean predicate in its own scope.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_filter_clause(
    expr: Option<&Expr<'_>>,
    ctx: &mut CompilationContext<'_>,
) -> Result<Option<SetId>> {
    let Some(expr) = expr else {
        return Ok(None);
    };

    let mut scope = ctx.derive_scope();
    scope.set_clause(Clause::Filter);
    let set = compile_operand(expr, Some(std_types::BOOL), &mut scope)?;
    trace!(set = ?set, "compiled FILTER");
    Ok(Some(set))
}

/// `ORDER BY k1 [ASC|DESC] [EMPTY FIRST|LAST], ...`
///
/// Keys keep their input order; each compiles in its own scope and must be a
/// singleton.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_orderby_clause(
    sort_exprs: &[AstSortExpr<'_>],
    ctx: &mut CompilationContext<'_>,
) -> Result<Vec<SortExpr>> {
    if sort_exprs.is_empty() {
        return Ok(Vec::new());
    }

    let mut clause = ctx.derive();
    clause.set_clause(Clause::OrderBy);

    let mut result = Vec::with_capacity(sort_exprs.len());
    for sort_expr in sort_exprs {
        let mut scope = clause.derive_scope();
        let set = compile_operand(sort_expr.path, None, &mut scope)?;
        pathctx::enforce_singleton(set, &scope)?;
        result.push(SortExpr {
            expr: set,
            direction: sort_expr.direction,
            nones_order: sort_expr.nones_order,
            span: sort_expr.span,
        });
    }
    trace!(keys = result.len(), "compiled ORDER BY");
    Ok(result)
}

/// `OFFSET expr` / `LIMIT expr`: a singleton integer.
///
/// The caller tags the frame with [`Clause::Offset`] or [`Clause::Limit`].
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_limit_offset_clause(
    expr: Option<&Expr<'_>>,
    ctx: &mut CompilationContext<'_>,
) -> Result<Option<SetId>> {
    let Some(expr) = expr else {
        return Ok(None);
    };

    let mut scope = ctx.derive_scope();
    let set = compile_operand(expr, Some(std_types::INT), &mut scope)?;
    pathctx::enforce_singleton(set, &scope)?;
    Ok(Some(set))
}

/// `GROUP BY k1, ...`: singleton keys, each in its own scope.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_groupby_clause(
    exprs: &[Expr<'_>],
    ctx: &mut CompilationContext<'_>,
) -> Result<Vec<SetId>> {
    if exprs.is_empty() {
        return Ok(Vec::new());
    }

    let mut clause = ctx.derive();
    clause.set_clause(Clause::GroupBy);

    let mut keys = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let mut scope = clause.derive_scope();
        let set = compile_operand(expr, None, &mut scope)?;
        pathctx::enforce_singleton(set, &scope)?;
        keys.push(set);
    }
    Ok(keys)
}

/// Dispatch a clause operand and wrap it into a set spanning the operand.
fn compile_operand(
    expr: &Expr<'_>,
    type_hint: Option<TypeId>,
    ctx: &mut CompilationContext<'_>,
) -> Result<SetId> {
    let span = expr.span();
    let ir = match dispatch::compile(expr, ctx)? {
        Ir::Set(set) => Ir::Set(setgen::anchor_set(set, span, ctx)?),
        Ir::Expr(typed) => Ir::Expr(TypedExpr { span, ..typed }),
    };
    setgen::scoped_set(ir, type_hint, ctx)
}
