//! Expression dispatcher.
//!
//! [`compile`] is the single entry point for turning a syntax node into IR.
//! It matches every [`Expr`] variant explicitly, with no catch-all arm, so a
//! new syntax node cannot be added without a handler.

use edgeql_ast::{CastExpr, Expr, SetExpr as SetLiteral};
use edgeql_core::{Cardinality, CompilationError, TypeId, std_types};
use edgeql_schema::SchemaItem;

use crate::Result;
use crate::calls;
use crate::cast;
use crate::context::CompilationContext;
use crate::ir::{self, Ir, SetExpr, Value};
use crate::operators;
use crate::pathctx;
use crate::setgen::{self, typed};
use crate::stmt;

/// Compile one expression node in the given context.
pub fn compile(expr: &Expr<'_>, ctx: &mut CompilationContext<'_>) -> Result<Ir> {
    match expr {
        Expr::Constant(c) => Ok(compile_constant(Value::from(c.value), c.span)),
        Expr::EmptySet(span) => Ok(typed(
            ir::Expr::EmptySet,
            TypeId::EMPTY,
            Cardinality::AtMostOne,
            *span,
        )),
        Expr::Path(path) => setgen::compile_path(path, ctx).map(Ir::Set),
        Expr::Binary(bin) => operators::compile_binary(bin, ctx),
        Expr::Unary(un) => operators::compile_unary(un, ctx),
        Expr::Call(call) => calls::compile_call(call, ctx),
        Expr::Cast(c) => compile_cast(c, ctx),
        Expr::Set(set) => compile_set_literal(set, ctx),
        Expr::Select(select) => compile_subquery(select, ctx),
        Expr::Paren(paren) => compile(paren.expr, ctx),
    }
}

fn compile_constant(value: Value, span: edgeql_core::Span) -> Ir {
    let stype = match &value {
        Value::Int(_) => std_types::INT,
        Value::Float(_) => std_types::FLOAT,
        Value::Str(_) => std_types::STR,
        Value::Bool(_) => std_types::BOOL,
    };
    typed(ir::Expr::Constant(value), stype, Cardinality::One, span)
}

fn compile_cast(cast_expr: &CastExpr<'_>, ctx: &mut CompilationContext<'_>) -> Result<Ir> {
    let target = match ctx.resolve(&cast_expr.target)? {
        SchemaItem::Type(ty) => ty.type_id(),
        SchemaItem::Function(func) => {
            return Err(CompilationError::UnsupportedConstruct {
                construct: format!("function '{}' used as a cast target", func.name),
                span: cast_expr.target.span,
            });
        }
    };

    let operand = compile(cast_expr.expr, ctx)?;
    let hint = setgen::ir_type(&operand, ctx)?.is_empty().then_some(target);
    let operand = setgen::scoped_set(operand, hint, ctx)?;

    let schema = ctx.schema();
    let from = ctx.set_type(operand)?;
    let kind = cast::find_cast(from, target, schema).ok_or_else(|| CompilationError::TypeMismatch {
        message: format!(
            "cannot cast '{}' to '{}'",
            schema.type_name(from),
            schema.type_name(target)
        ),
        span: cast_expr.span,
    })?;
    let cardinality = pathctx::infer_cardinality(operand, ctx)?;
    Ok(typed(
        ir::Expr::Cast {
            expr: operand,
            to: target,
            kind,
        },
        target,
        cardinality,
        cast_expr.span,
    ))
}

/// `{a, b, ...}`: a union of its elements, typed by their common type.
fn compile_set_literal(set: &SetLiteral<'_>, ctx: &mut CompilationContext<'_>) -> Result<Ir> {
    match set.elements {
        [] => {
            return Ok(typed(
                ir::Expr::EmptySet,
                TypeId::EMPTY,
                Cardinality::AtMostOne,
                set.span,
            ));
        }
        [single] => return compile(single, ctx),
        _ => {}
    }

    let mut elements = Vec::with_capacity(set.elements.len());
    for element in set.elements {
        elements.push((compile(element, ctx)?, element.span()));
    }

    let schema = ctx.schema();
    let mut common = TypeId::EMPTY;
    for (ir, span) in &elements {
        let stype = setgen::ir_type(ir, ctx)?;
        if stype.is_empty() {
            continue;
        }
        if common.is_empty() {
            common = stype;
            continue;
        }
        common = operators::common_type(common, stype, schema).ok_or_else(|| {
            CompilationError::TypeMismatch {
                message: format!(
                    "set constructor has elements of incompatible types '{}' and '{}'",
                    schema.type_name(common),
                    schema.type_name(stype)
                ),
                span: *span,
            }
        })?;
    }
    let hint = (!common.is_empty()).then_some(common);

    let mut members = Vec::with_capacity(elements.len());
    let mut cardinality: Option<Cardinality> = None;
    for (ir, _) in elements {
        let member = setgen::scoped_set(ir, hint, ctx)?;
        let member_cardinality = pathctx::infer_cardinality(member, ctx)?;
        cardinality = Some(match cardinality {
            Some(acc) => acc.union(member_cardinality),
            None => member_cardinality,
        });
        members.push(member);
    }

    Ok(typed(
        ir::Expr::Union(members),
        common,
        cardinality.unwrap_or(Cardinality::Many),
        set.span,
    ))
}

fn compile_subquery(
    select: &edgeql_ast::SelectQuery<'_>,
    ctx: &mut CompilationContext<'_>,
) -> Result<Ir> {
    let stmt = stmt::compile_select(select, ctx)?;
    let stype = ctx.set_type(stmt.result)?;
    let cardinality = stmt.cardinality;
    let span = stmt.span;
    let id = ctx.new_set(
        SetExpr::Expr(ir::Expr::Subquery(Box::new(stmt))),
        stype,
        cardinality,
        span,
        None,
    );
    Ok(Ir::Set(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::CastKind;
    use crate::context::CompileOptions;
    use bumpalo::Bump;
    use edgeql_ast::AstBuilder;
    use edgeql_core::ErrorKind;
    use edgeql_schema::{PointerFlags, Schema, SchemaBuilder};

    fn schema() -> Schema {
        let mut builder = SchemaBuilder::with_std();
        builder
            .object_type("test::User")
            .property("name", "std::str", PointerFlags::REQUIRED)
            .property("age", "std::int", PointerFlags::empty())
            .register()
            .unwrap();
        builder.build().unwrap()
    }

    fn compile_to_set(expr: &Expr<'_>, ctx: &mut CompilationContext<'_>) -> Result<ir::SetId> {
        let ir = compile(expr, ctx)?;
        setgen::scoped_set(ir, None, ctx)
    }

    #[test]
    fn constants_are_typed_singletons() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());

        for (expr, stype) in [
            (b.int(1), std_types::INT),
            (b.float(1.5), std_types::FLOAT),
            (b.string("x"), std_types::STR),
            (b.boolean(true), std_types::BOOL),
        ] {
            let Ir::Expr(typed) = compile(expr, &mut ctx).unwrap() else {
                panic!("constants are not scope-attached");
            };
            assert_eq!(typed.stype, stype);
            assert_eq!(typed.cardinality, Cardinality::One);
            assert_eq!(typed.span, expr.span());
        }
    }

    #[test]
    fn parens_are_transparent() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let path = b.path("test::User", &["name"]);
        let direct = compile(path, &mut ctx).unwrap();
        let wrapped = compile(b.paren(path), &mut ctx).unwrap();
        assert_eq!(direct, wrapped);
    }

    #[test]
    fn dispatch_is_deterministic() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let expr = b.binary(
            b.path("test::User", &["age"]),
            edgeql_ast::BinaryOp::Add,
            b.int(1),
        );

        let mut first = CompilationContext::new(&schema, &CompileOptions::new());
        let mut second = CompilationContext::new(&schema, &CompileOptions::new());
        let a = compile_to_set(expr, &mut first).unwrap();
        let c = compile_to_set(expr, &mut second).unwrap();
        assert_eq!(first.set(a).unwrap(), second.set(c).unwrap());
        assert_eq!(first.arena().len(), second.arena().len());
    }

    #[test]
    fn explicit_cast() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());

        let set = compile_to_set(b.cast("str", b.int(42)), &mut ctx).unwrap();
        let s = ctx.set(set).unwrap();
        assert_eq!(s.stype, std_types::STR);
        assert!(matches!(
            s.expr,
            SetExpr::Expr(ir::Expr::Cast {
                kind: CastKind::Explicit,
                ..
            })
        ));

        let err = compile(b.cast("std::uuid", b.boolean(true)), &mut ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(err.to_string().contains("cannot cast 'std::bool' to 'std::uuid'"));
    }

    #[test]
    fn cast_types_empty_set() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let set = compile_to_set(b.cast("int", b.empty_set()), &mut ctx).unwrap();
        assert_eq!(ctx.set_type(set).unwrap(), std_types::INT);
        assert_eq!(
            pathctx::infer_cardinality(set, &ctx).unwrap(),
            Cardinality::AtMostOne
        );
    }

    #[test]
    fn set_literal_unifies_types() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());

        let set = compile_to_set(b.set(&[b.int(1), b.float(2.0), b.empty_set()]), &mut ctx).unwrap();
        let s = ctx.set(set).unwrap();
        assert_eq!(s.stype, std_types::FLOAT);
        assert_eq!(s.cardinality, Cardinality::AtLeastOne);
        let SetExpr::Expr(ir::Expr::Union(members)) = &s.expr else {
            panic!("expected a union");
        };
        assert_eq!(members.len(), 3);
        for member in members {
            assert_eq!(ctx.set_type(*member).unwrap(), std_types::FLOAT);
        }

        let err = compile(b.set(&[b.int(1), b.string("x")]), &mut ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn single_element_set_is_its_element() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let Ir::Expr(typed) = compile(b.set(&[b.int(7)]), &mut ctx).unwrap() else {
            panic!("expected a constant");
        };
        assert_eq!(typed.expr, ir::Expr::Constant(Value::Int(7)));
    }

    #[test]
    fn subquery_is_a_set() {
        let schema = schema();
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let select = b.select(b.path("test::User", &[])).limit(b.int(1)).build();
        let Ir::Set(id) = compile(b.subquery(select), &mut ctx).unwrap() else {
            panic!("subqueries are scope-attached");
        };
        let s = ctx.set(id).unwrap();
        assert_eq!(s.stype, TypeId::from_name("test::User"));
        assert_eq!(s.cardinality, Cardinality::AtMostOne);
    }
}
