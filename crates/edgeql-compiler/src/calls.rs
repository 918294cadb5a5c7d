//! Function calls.

use edgeql_ast::CallExpr;
use edgeql_core::CompilationError;
use edgeql_schema::{FunctionEntry, ParamKind, ParamType, ReturnType, ScalarKind, SchemaItem};

use crate::Result;
use crate::cast::{self, CastKind};
use crate::context::CompilationContext;
use crate::dispatch;
use crate::ir::{self, Ir, SetId};
use crate::pathctx;
use crate::setgen::{self, typed};

pub fn compile_call(call: &CallExpr<'_>, ctx: &mut CompilationContext<'_>) -> Result<Ir> {
    let function = match ctx.resolve(&call.func)? {
        SchemaItem::Function(function) => function,
        SchemaItem::Type(ty) => {
            return Err(CompilationError::UnsupportedConstruct {
                construct: format!("type '{}' called as a function", ty.name()),
                span: call.func.span,
            });
        }
    };

    if call.args.len() != function.params.len() {
        return Err(CompilationError::TypeMismatch {
            message: format!(
                "function '{}' takes {} argument(s), got {}",
                function.name,
                function.params.len(),
                call.args.len()
            ),
            span: call.span,
        });
    }

    let mut args = Vec::with_capacity(call.args.len());
    let mut cardinality = function.return_cardinality;
    for (position, (arg, param)) in call.args.iter().zip(&function.params).enumerate() {
        let set = match param.kind {
            // SET OF arguments are consumed whole, in their own scope.
            ParamKind::SetOf => {
                let mut scope = ctx.derive_scope();
                let ir = dispatch::compile(arg, &mut scope)?;
                let set = setgen::scoped_set(ir, None, &mut scope)?;
                check_argument(set, param.ty, position, function, &mut scope)?
            }
            ParamKind::Singleton => {
                let ir = dispatch::compile(arg, ctx)?;
                let set = setgen::scoped_set(ir, None, ctx)?;
                let set = check_argument(set, param.ty, position, function, ctx)?;
                cardinality = cardinality.mul(pathctx::infer_cardinality(set, ctx)?);
                set
            }
        };
        args.push(set);
    }

    let stype = match function.return_type {
        ReturnType::Concrete(id) => id,
        ReturnType::SameAsArg(index) => {
            let arg = args.get(index).copied().ok_or_else(|| {
                CompilationError::internal(format!(
                    "'{}' returns the type of missing argument {}",
                    function.name, index
                ))
            })?;
            ctx.set_type(arg)?
        }
    };

    Ok(typed(
        ir::Expr::Call {
            function: function.name.clone(),
            args,
            aggregate: function.is_aggregate(),
        },
        stype,
        cardinality,
        call.span,
    ))
}

fn check_argument(
    set: SetId,
    ty: ParamType,
    position: usize,
    function: &FunctionEntry,
    ctx: &mut CompilationContext<'_>,
) -> Result<SetId> {
    let schema = ctx.schema();
    let stype = ctx.set_type(set)?;
    let expected = match ty {
        ParamType::Any => return Ok(set),
        ParamType::Numeric if schema.scalar_kind(stype).is_some_and(ScalarKind::is_numeric) => {
            return Ok(set);
        }
        ParamType::Numeric => "numeric value".to_string(),
        ParamType::Concrete(target) => {
            match cast::find_conversion(stype, target, schema) {
                Some(CastKind::Implicit) => {
                    return setgen::cast_set(set, target, CastKind::Implicit, ctx);
                }
                Some(_) => return Ok(set),
                None => {}
            }
            format!("'{}'", schema.type_name(target))
        }
    };
    Err(CompilationError::TypeMismatch {
        message: format!(
            "argument {} of '{}' expects {}, got '{}'",
            position + 1,
            function.name,
            expected,
            schema.type_name(stype)
        ),
        span: ctx.set(set)?.span,
    })
}
