//! Operator typing.
//!
//! | Operators | Operands | Result |
//! |---|---|---|
//! | `AND` `OR` `NOT` | `std::bool` | `std::bool` |
//! | `+ - * / %`, unary `-` | numeric | `std::int` if all ints, else `std::float` |
//! | `++` | `std::str` | `std::str` |
//! | `= != < <= > >=` | common type | `std::bool` |
//! | `EXISTS` | any | `std::bool` |
//!
//! Objects may only be compared with `=` and `!=`.

use edgeql_ast::{BinaryExpr, BinaryOp, UnaryExpr, UnaryOp};
use edgeql_core::{Cardinality, CompilationError, Span, TypeId, std_types};
use edgeql_schema::{ScalarKind, Schema};

use crate::Result;
use crate::cast::{self, CastKind};
use crate::context::CompilationContext;
use crate::dispatch;
use crate::ir::{self, Ir, SetId};
use crate::pathctx;
use crate::setgen::{self, typed};

/// The narrowest type both operands convert to implicitly.
pub fn common_type(a: TypeId, b: TypeId, schema: &Schema) -> Option<TypeId> {
    if cast::find_conversion(a, b, schema).is_some() {
        return Some(b);
    }
    if cast::find_conversion(b, a, schema).is_some() {
        return Some(a);
    }
    if schema.is_object(a) && schema.is_object(b) {
        return schema.common_supertype(a, b);
    }
    None
}

pub fn compile_binary(bin: &BinaryExpr<'_>, ctx: &mut CompilationContext<'_>) -> Result<Ir> {
    let left = dispatch::compile(bin.left, ctx)?;
    let right = dispatch::compile(bin.right, ctx)?;

    let (left, right) = if bin.op.is_logical() {
        (
            setgen::scoped_set(left, Some(std_types::BOOL), ctx)?,
            setgen::scoped_set(right, Some(std_types::BOOL), ctx)?,
        )
    } else {
        // An untyped `{}` operand takes the type of the other side.
        let left_type = setgen::ir_type(&left, ctx)?;
        let right_type = setgen::ir_type(&right, ctx)?;
        let left_hint = (left_type.is_empty() && !right_type.is_empty()).then_some(right_type);
        let right_hint = (right_type.is_empty() && !left_type.is_empty()).then_some(left_type);
        (
            setgen::scoped_set(left, left_hint, ctx)?,
            setgen::scoped_set(right, right_hint, ctx)?,
        )
    };

    let (left, right, result) = type_binary(bin.op, left, right, bin.span, ctx)?;
    let cardinality =
        pathctx::infer_cardinality(left, ctx)?.mul(pathctx::infer_cardinality(right, ctx)?);
    Ok(typed(
        ir::Expr::BinOp {
            left,
            op: bin.op,
            right,
        },
        result,
        cardinality,
        bin.span,
    ))
}

/// Check operand types, inserting implicit casts. Returns the (possibly
/// cast) operands and the result type.
fn type_binary(
    op: BinaryOp,
    left: SetId,
    right: SetId,
    span: Span,
    ctx: &mut CompilationContext<'_>,
) -> Result<(SetId, SetId, TypeId)> {
    let schema = ctx.schema();
    let left_type = ctx.set_type(left)?;
    let right_type = ctx.set_type(right)?;
    let mismatch = || CompilationError::TypeMismatch {
        message: format!(
            "operator '{}' cannot be applied to operands of type '{}' and '{}'",
            op,
            schema.type_name(left_type),
            schema.type_name(right_type)
        ),
        span,
    };

    if op.is_logical() {
        return Ok((left, right, std_types::BOOL));
    }

    let objects = schema.is_object(left_type) || schema.is_object(right_type);
    if objects && !op.is_equality() {
        return Err(CompilationError::UnsupportedConstruct {
            construct: format!("operator '{}' on object operands", op),
            span,
        });
    }

    if op.is_comparison() {
        let common = common_type(left_type, right_type, schema).ok_or_else(mismatch)?;
        if objects {
            return Ok((left, right, std_types::BOOL));
        }
        let left = convert_operand(left, common, ctx)?;
        let right = convert_operand(right, common, ctx)?;
        return Ok((left, right, std_types::BOOL));
    }

    let left_kind = schema.scalar_kind(left_type);
    let right_kind = schema.scalar_kind(right_type);
    if op == BinaryOp::Concat {
        return match (left_kind, right_kind) {
            (Some(ScalarKind::Str), Some(ScalarKind::Str)) => Ok((left, right, std_types::STR)),
            _ => Err(mismatch()),
        };
    }

    // Arithmetic.
    match (left_kind, right_kind) {
        (Some(ScalarKind::Int), Some(ScalarKind::Int)) => Ok((left, right, std_types::INT)),
        (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => {
            let left = convert_operand(left, std_types::FLOAT, ctx)?;
            let right = convert_operand(right, std_types::FLOAT, ctx)?;
            Ok((left, right, std_types::FLOAT))
        }
        _ => Err(mismatch()),
    }
}

fn convert_operand(set: SetId, to: TypeId, ctx: &mut CompilationContext<'_>) -> Result<SetId> {
    let from = ctx.set_type(set)?;
    match cast::find_conversion(from, to, ctx.schema()) {
        Some(CastKind::Implicit) => setgen::cast_set(set, to, CastKind::Implicit, ctx),
        _ => Ok(set),
    }
}

pub fn compile_unary(un: &UnaryExpr<'_>, ctx: &mut CompilationContext<'_>) -> Result<Ir> {
    match un.op {
        UnaryOp::Not => {
            let operand = dispatch::compile(un.operand, ctx)?;
            let operand = setgen::scoped_set(operand, Some(std_types::BOOL), ctx)?;
            let cardinality = pathctx::infer_cardinality(operand, ctx)?;
            Ok(unary(un, operand, std_types::BOOL, cardinality))
        }
        UnaryOp::Neg => {
            let operand = dispatch::compile(un.operand, ctx)?;
            let operand = setgen::scoped_set(operand, None, ctx)?;
            let schema = ctx.schema();
            let stype = ctx.set_type(operand)?;
            if schema.is_object(stype) {
                return Err(CompilationError::UnsupportedConstruct {
                    construct: "unary '-' on an object operand".to_string(),
                    span: un.span,
                });
            }
            if !schema.scalar_kind(stype).is_some_and(ScalarKind::is_numeric) {
                return Err(CompilationError::TypeMismatch {
                    message: format!(
                        "operator '-' cannot be applied to operand of type '{}'",
                        schema.type_name(stype)
                    ),
                    span: un.span,
                });
            }
            let cardinality = pathctx::infer_cardinality(operand, ctx)?;
            Ok(unary(un, operand, stype, cardinality))
        }
        UnaryOp::Exists => {
            // EXISTS consumes its whole operand set.
            let operand = {
                let mut scope = ctx.derive_scope();
                let operand = dispatch::compile(un.operand, &mut scope)?;
                setgen::scoped_set(operand, None, &mut scope)?
            };
            Ok(unary(un, operand, std_types::BOOL, Cardinality::One))
        }
    }
}

fn unary(un: &UnaryExpr<'_>, operand: SetId, stype: TypeId, cardinality: Cardinality) -> Ir {
    typed(
        ir::Expr::UnaryOp {
            op: un.op,
            operand,
        },
        stype,
        cardinality,
        un.span,
    )
}
