//! EdgeQL semantic compiler.
//!
//! Turns a syntax tree into typed, scope-resolved IR.
//!
//! ## Architecture
//!
//! Compilation is a single recursive pass. Each syntax node goes through the
//! [`dispatch`] match; paths become sets deduplicated per scope node by
//! [`setgen`]; clauses wrap their operand with a type hint and check its
//! cardinality through [`pathctx`].
//!
//! ## Modules
//!
//! - [`context`]: Frame chain, options and name resolution
//! - [`scope`]: Scope tree for path correlation
//! - [`dispatch`]: Expression dispatcher
//! - [`setgen`]: Set wrapping, type hints and path steps
//! - [`pathctx`]: Scope-relative cardinality
//! - [`clauses`]: FILTER, ORDER BY, OFFSET/LIMIT and GROUP BY
//! - [`stmt`]: SELECT statements and shapes
//! - [`cast`]: Conversion rules
//! - [`operators`]: Operator typing
//! - [`ir`]: Output types

mod calls;
pub mod cast;
pub mod clauses;
pub mod context;
pub mod dispatch;
pub mod ir;
pub mod operators;
pub mod pathctx;
pub mod scope;
pub mod setgen;
pub mod stmt;

pub use cast::CastKind;
pub use context::{Clause, CompilationContext, CompileOptions, ContextGuard, Frame};
pub use ir::{CompiledQuery, Ir, IrArena, ScopeId, SelectStmt, Set, SetExpr, SetId, SortExpr};
pub use scope::ScopeTree;

pub use edgeql_core::CompilationError;

use edgeql_ast::Statement;
use edgeql_schema::Schema;
use tracing::debug;

pub(crate) type Result<T> = std::result::Result<T, CompilationError>;

/// Compile one statement against `schema`.
///
/// Module names in `options` must exist in the schema. The first error
/// aborts compilation.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_statement(
    statement: &Statement<'_>,
    schema: &Schema,
    options: &CompileOptions,
) -> Result<CompiledQuery> {
    let span = statement.span();
    let mut ctx = CompilationContext::new(schema, options);
    for module in options
        .default_module
        .iter()
        .chain(options.module_aliases.values())
    {
        ctx.check_module(module, span)?;
    }

    let stmt = match statement {
        Statement::Select(select) => {
            let mut stmt = stmt::compile_select(select, &mut ctx)?;
            if let Some(limit) = options.implicit_limit {
                stmt::apply_implicit_limit(&mut stmt, limit, &mut ctx)?;
            }
            stmt
        }
    };

    debug!(sets = ctx.arena().len(), scopes = ctx.scopes().len(), "compiled statement");
    Ok(CompiledQuery {
        arena: ctx.into_arena(),
        stmt,
    })
}
