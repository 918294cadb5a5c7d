//! SELECT statements.

use edgeql_ast::{ModuleAlias, SelectQuery, ShapeElement as AstShapeElement};
use edgeql_core::{Cardinality, CompilationError, Span, std_types};
use tracing::debug;

use crate::Result;
use crate::clauses;
use crate::context::{Clause, CompilationContext};
use crate::dispatch;
use crate::ir::{Expr, SelectStmt, SetExpr, SetId, ShapeElement, Value};
use crate::pathctx;
use crate::setgen;

/// Compile a SELECT in a fresh statement scope.
///
/// The result set becomes the path subject for the shape and every clause,
/// so `Issue.number` in a FILTER correlates with `SELECT Issue`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_select(
    select: &SelectQuery<'_>,
    ctx: &mut CompilationContext<'_>,
) -> Result<SelectStmt> {
    let mut scope = ctx.derive_scope();
    scope.set_clause(Clause::Result);
    apply_module_aliases(select.aliases, &mut scope)?;

    let result = dispatch::compile(select.result, &mut scope)?;
    let result = setgen::scoped_set(result, None, &mut scope)?;
    scope.set_subject(Some(result));

    let shape = compile_shape(select.shape, result, &mut scope)?;
    let filter = clauses::compile_filter_clause(select.filter, &mut scope)?;
    let group_by = clauses::compile_groupby_clause(select.group_by, &mut scope)?;
    let order_by = clauses::compile_orderby_clause(select.order_by, &mut scope)?;
    let offset = {
        let mut clause = scope.derive();
        clause.set_clause(Clause::Offset);
        clauses::compile_limit_offset_clause(select.offset, &mut clause)?
    };
    let limit = {
        let mut clause = scope.derive();
        clause.set_clause(Clause::Limit);
        clauses::compile_limit_offset_clause(select.limit, &mut clause)?
    };

    let mut cardinality = pathctx::infer_cardinality(result, &scope)?;
    if filter.is_some() {
        cardinality = cardinality.optional();
    }
    if let Some(limit) = limit {
        cardinality = apply_limit(cardinality, limit, &scope)?;
    }

    debug!(
        result = ?result,
        %cardinality,
        sets = scope.arena().len(),
        "compiled SELECT"
    );
    Ok(SelectStmt {
        result,
        shape,
        filter,
        group_by,
        order_by,
        offset,
        limit,
        cardinality,
        scope: scope.frame().scope,
        span: select.span,
    })
}

/// Add a constant LIMIT to a statement that has none.
pub(crate) fn apply_implicit_limit(
    stmt: &mut SelectStmt,
    limit: i64,
    ctx: &mut CompilationContext<'_>,
) -> Result<()> {
    if stmt.limit.is_some() {
        return Ok(());
    }
    let set = ctx.new_set(
        SetExpr::Expr(Expr::Constant(Value::Int(limit))),
        std_types::INT,
        Cardinality::One,
        stmt.span,
        None,
    );
    stmt.limit = Some(set);
    stmt.cardinality = apply_limit(stmt.cardinality, set, ctx)?;
    Ok(())
}

/// A constant `LIMIT 0` or `LIMIT 1` caps the statement at one element.
fn apply_limit(
    cardinality: Cardinality,
    limit: SetId,
    ctx: &CompilationContext<'_>,
) -> Result<Cardinality> {
    Ok(match &ctx.set(limit)?.expr {
        SetExpr::Expr(Expr::Constant(Value::Int(n))) if *n <= 1 => cardinality.at_most_one().optional(),
        _ => cardinality,
    })
}

fn apply_module_aliases(
    aliases: &[ModuleAlias<'_>],
    ctx: &mut CompilationContext<'_>,
) -> Result<()> {
    for alias in aliases {
        ctx.check_module(alias.module, alias.span)?;
        match alias.alias {
            Some(name) => ctx.add_alias(name, alias.module),
            None => ctx.set_default_module(alias.module),
        }
    }
    Ok(())
}

/// Compile shape elements against `subject`.
fn compile_shape(
    elements: &[AstShapeElement<'_>],
    subject: SetId,
    ctx: &mut CompilationContext<'_>,
) -> Result<Vec<ShapeElement>> {
    if elements.is_empty() {
        return Ok(Vec::new());
    }
    require_object(subject, elements[0].span, ctx)?;

    let mut clause = ctx.derive();
    clause.set_clause(Clause::Shape);
    clause.set_subject(Some(subject));

    let mut shape = Vec::with_capacity(elements.len());
    for element in elements {
        if shape.iter().any(|e: &ShapeElement| e.name == element.name) {
            return Err(CompilationError::TypeMismatch {
                message: format!("duplicate shape element '{}'", element.name),
                span: element.span,
            });
        }

        let mut scope = clause.derive_scope();
        let compiled = match element.compexpr {
            Some(expr) => {
                let ir = dispatch::compile(expr, &mut scope)?;
                let set = setgen::scoped_set(ir, None, &mut scope)?;
                ShapeElement {
                    name: element.name.to_string(),
                    set,
                    computable: true,
                    elements: Vec::new(),
                }
            }
            None => {
                let set = setgen::extend_path(subject, element.name, element.span, &mut scope)?;
                let elements = compile_shape(element.elements, set, &mut scope)?;
                ShapeElement {
                    name: element.name.to_string(),
                    set,
                    computable: false,
                    elements,
                }
            }
        };
        shape.push(compiled);
    }
    Ok(shape)
}

fn require_object(set: SetId, span: Span, ctx: &CompilationContext<'_>) -> Result<()> {
    let stype = ctx.set_type(set)?;
    let schema = ctx.schema();
    if schema.is_object(stype) {
        Ok(())
    } else {
        Err(CompilationError::UnsupportedConstruct {
            construct: format!("shape on non-object type '{}'", schema.type_name(stype)),
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompileOptions;
    use bumpalo::Bump;
    use edgeql_ast::{AstBuilder, BinaryOp};
    use edgeql_core::{ErrorKind, TypeId};
    use edgeql_schema::{PointerFlags, Schema, SchemaBuilder};

    fn schema() -> Schema {
        let mut builder = SchemaBuilder::with_std();
        builder
            .object_type("test::Issue")
            .property("number", "std::str", PointerFlags::REQUIRED)
            .property("time_spent", "std::int", PointerFlags::MULTI)
            .link("owner", "test::User", PointerFlags::REQUIRED)
            .register()
            .unwrap();
        builder
            .object_type("test::User")
            .property("name", "std::str", PointerFlags::REQUIRED)
            .register()
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn bare_select_is_many() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let select = b.select(b.path("test::Issue", &[])).build();
        let stmt = compile_select(select, &mut ctx).unwrap();
        assert_eq!(stmt.cardinality, Cardinality::Many);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn filter_paths_correlate_with_result() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let select = b
            .select(b.path("Issue", &[]))
            .with_module("test")
            .filter(b.binary(b.path("Issue", &["number"]), BinaryOp::Eq, b.string("1")))
            .build();
        let stmt = compile_select(select, &mut ctx).unwrap();

        let filter = stmt.filter.unwrap();
        let SetExpr::Expr(Expr::BinOp { left, .. }) = &ctx.set(filter).unwrap().expr else {
            panic!("expected a comparison");
        };
        let SetExpr::Step { source, .. } = &ctx.set(*left).unwrap().expr else {
            panic!("expected a path step");
        };
        assert_eq!(*source, stmt.result);
        assert_eq!(ctx.set(filter).unwrap().cardinality, Cardinality::One);
        assert_eq!(stmt.cardinality, Cardinality::Many);
    }

    #[test]
    fn computable_reuses_repeated_paths() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let expr = b.binary(
            b.path("test::Issue", &["number"]),
            BinaryOp::Concat,
            b.path("test::Issue", &["number"]),
        );
        let select = b
            .select(b.path("test::Issue", &[]))
            .shape(&[b.pointer("number"), b.computable("twice", expr)])
            .build();
        let stmt = compile_select(select, &mut ctx).unwrap();

        assert_eq!(stmt.shape.len(), 2);
        let twice = &stmt.shape[1];
        assert!(twice.computable);
        let SetExpr::Expr(Expr::BinOp { left, right, .. }) = &ctx.set(twice.set).unwrap().expr
        else {
            panic!("expected a concatenation");
        };
        assert_eq!(left, right);
    }

    #[test]
    fn nested_shape_follows_links() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let select = b
            .select(b.path("test::Issue", &[]))
            .shape(&[b.pointer_with_shape("owner", &[b.pointer("name")])])
            .build();
        let stmt = compile_select(select, &mut ctx).unwrap();
        let owner = &stmt.shape[0];
        assert_eq!(ctx.set_type(owner.set).unwrap(), TypeId::from_name("test::User"));
        assert_eq!(ctx.set_type(owner.elements[0].set).unwrap(), std_types::STR);
    }

    #[test]
    fn shape_on_scalar_is_unsupported() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let select = b
            .select(b.path("test::Issue", &["number"]))
            .shape(&[b.pointer("length")])
            .build();
        let err = compile_select(select, &mut ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedConstruct);
    }

    #[test]
    fn unknown_module_alias_fails() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let select = b
            .select(b.path("t::Issue", &[]))
            .with_alias("t", "nope")
            .build();
        let err = compile_select(select, &mut ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameResolution);
        assert!(err.to_string().contains("'nope'"));
    }

    #[test]
    fn limit_one_caps_cardinality() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let select = b
            .select(b.path("test::Issue", &[]))
            .limit(b.int(1))
            .build();
        let stmt = compile_select(select, &mut ctx).unwrap();
        assert_eq!(stmt.cardinality, Cardinality::AtMostOne);

        let mut stmt = compile_select(b.select(b.path("test::Issue", &[])).build(), &mut ctx).unwrap();
        apply_implicit_limit(&mut stmt, 1, &mut ctx).unwrap();
        assert!(stmt.limit.is_some());
        assert_eq!(stmt.cardinality, Cardinality::AtMostOne);
    }

    #[test]
    fn duplicate_shape_elements_fail() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let select = b
            .select(b.path("test::Issue", &[]))
            .shape(&[b.pointer("number"), b.computable("number", b.int(1))])
            .build();
        assert_eq!(
            compile_select(select, &mut ctx).unwrap_err().kind(),
            ErrorKind::TypeMismatch
        );
    }
}
