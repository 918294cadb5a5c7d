//! Cardinality constraints on compiled sets.
//!
//! Cardinality is always judged relative to the active scope node. A set
//! bound in a strict ancestor of that node is iterated one element at a
//! time, so inside the current scope it counts as exactly one value.

use edgeql_core::{Cardinality, CompilationError};

use crate::Result;
use crate::context::CompilationContext;
use crate::ir::{SetExpr, SetId};

/// Cardinality of `set` as seen from the active scope node.
pub fn infer_cardinality(set: SetId, ctx: &CompilationContext<'_>) -> Result<Cardinality> {
    let current = ctx.frame().scope;
    let mut id = set;
    let mut step_product = Cardinality::One;
    // Walk a path towards its root, stopping at the first correlated prefix.
    loop {
        let node = ctx.set(id)?;
        if ctx.scopes().is_strict_ancestor(node.scope, current) {
            return Ok(step_product);
        }
        match &node.expr {
            SetExpr::Step {
                source,
                pointer_cardinality,
                ..
            } => {
                step_product = step_product.mul(*pointer_cardinality);
                id = *source;
            }
            SetExpr::Root | SetExpr::Expr(_) => return Ok(step_product.mul(node.cardinality)),
        }
    }
}

/// Fail unless `set` has at most one element per evaluation of the active
/// scope.
pub fn enforce_singleton(set: SetId, ctx: &CompilationContext<'_>) -> Result<()> {
    let cardinality = infer_cardinality(set, ctx)?;
    if cardinality.is_singleton() {
        return Ok(());
    }
    let span = ctx.set(set)?.span;
    Err(CompilationError::CardinalityViolation {
        message: format!(
            "possibly more than one element returned by an expression{} where only singletons are allowed",
            ctx.clause_suffix()
        ),
        span,
    })
}
