//! Set generation: wrapping IR into scope-attached sets and building paths.

use edgeql_ast::PathExpr;
use edgeql_core::{Cardinality, CompilationError, PathId, Span, TypeId};
use edgeql_schema::SchemaItem;
use tracing::{debug, trace};

use crate::Result;
use crate::cast::{self, CastKind};
use crate::context::CompilationContext;
use crate::ir::{Expr, Ir, SetExpr, SetId, TypedExpr};
use crate::pathctx;

/// Attach `ir` to the active scope and check it against `type_hint`.
///
/// - an untyped empty set takes the hint's type;
/// - a subtype of the hint is returned unchanged;
/// - an implicitly convertible type is wrapped in a cast set;
/// - anything else is a type mismatch.
///
/// Without a hint, an untyped empty set is an error.
pub fn scoped_set(
    ir: Ir,
    type_hint: Option<TypeId>,
    ctx: &mut CompilationContext<'_>,
) -> Result<SetId> {
    let set = match ir {
        Ir::Set(id) => id,
        Ir::Expr(mut typed) => {
            if typed.stype.is_empty() {
                let Some(hint) = type_hint else {
                    return Err(untyped_empty_set(typed.span, ctx));
                };
                typed.stype = hint;
            }
            ctx.new_set(
                SetExpr::Expr(typed.expr),
                typed.stype,
                typed.cardinality,
                typed.span,
                None,
            )
        }
    };

    let Some(hint) = type_hint else {
        let s = ctx.set(set)?;
        if s.stype.is_empty() {
            return Err(untyped_empty_set(s.span, ctx));
        }
        return Ok(set);
    };
    coerce(set, hint, ctx)
}

/// Implicitly convert `set` to `target`, failing with a type mismatch.
pub fn coerce(set: SetId, target: TypeId, ctx: &mut CompilationContext<'_>) -> Result<SetId> {
    let (stype, span) = {
        let s = ctx.set(set)?;
        (s.stype, s.span)
    };
    let schema = ctx.schema();
    if stype.is_empty() {
        // An empty set typed elsewhere is re-typed by a fresh empty set.
        let cardinality = pathctx::infer_cardinality(set, ctx)?;
        return Ok(ctx.new_set(SetExpr::Expr(Expr::EmptySet), target, cardinality, span, None));
    }
    match cast::find_conversion(stype, target, schema) {
        Some(CastKind::Identity | CastKind::Upcast) => Ok(set),
        Some(kind) => cast_set(set, target, kind, ctx),
        None => Err(CompilationError::TypeMismatch {
            message: format!(
                "expected {}, got '{}'{}",
                schema.describe(target),
                schema.type_name(stype),
                ctx.clause_suffix()
            ),
            span,
        }),
    }
}

/// Wrap `set` in a cast to `to`.
pub fn cast_set(
    set: SetId,
    to: TypeId,
    kind: CastKind,
    ctx: &mut CompilationContext<'_>,
) -> Result<SetId> {
    let span = ctx.set(set)?.span;
    let cardinality = pathctx::infer_cardinality(set, ctx)?;
    Ok(ctx.new_set(
        SetExpr::Expr(Expr::Cast {
            expr: set,
            to,
            kind,
        }),
        to,
        cardinality,
        span,
        None,
    ))
}

/// Type of an IR value without attaching it.
pub fn ir_type(ir: &Ir, ctx: &CompilationContext<'_>) -> Result<TypeId> {
    match ir {
        Ir::Set(id) => ctx.set_type(*id),
        Ir::Expr(typed) => Ok(typed.stype),
    }
}

pub fn typed(expr: Expr, stype: TypeId, cardinality: Cardinality, span: Span) -> Ir {
    Ir::Expr(TypedExpr {
        expr,
        stype,
        cardinality,
        span,
    })
}

/// `set` as referenced by the syntax node at `span`.
///
/// Path sets are shared by every scope that sees them and keep the span of
/// their first occurrence, so a differing span gets a local alias instead.
pub fn anchor_set(set: SetId, span: Span, ctx: &mut CompilationContext<'_>) -> Result<SetId> {
    let (stype, existing) = {
        let s = ctx.set(set)?;
        (s.stype, s.span)
    };
    if existing == span {
        return Ok(set);
    }
    let cardinality = pathctx::infer_cardinality(set, ctx)?;
    Ok(ctx.new_set(SetExpr::Expr(Expr::Alias(set)), stype, cardinality, span, None))
}

fn untyped_empty_set(span: Span, ctx: &CompilationContext<'_>) -> CompilationError {
    CompilationError::TypeMismatch {
        message: format!("cannot determine the type of an empty set{}", ctx.clause_suffix()),
        span,
    }
}

// ============================================================================
// Paths
// ============================================================================

/// Compile `Type.a.b` or a partial `.a.b`.
pub fn compile_path(path: &PathExpr<'_>, ctx: &mut CompilationContext<'_>) -> Result<SetId> {
    let mut set = match &path.root {
        Some(root) => {
            let item = ctx.resolve(root)?;
            let construct = match item {
                SchemaItem::Type(ty) if ty.is_object() => None,
                SchemaItem::Type(ty) => Some(format!("scalar type '{}' used as a set", ty.name())),
                SchemaItem::Function(func) => {
                    Some(format!("function '{}' used as a set", func.name))
                }
            };
            if let Some(construct) = construct {
                return Err(CompilationError::UnsupportedConstruct {
                    construct,
                    span: root.span,
                });
            }
            let type_id = item
                .as_type()
                .map(|ty| ty.type_id())
                .ok_or_else(|| CompilationError::internal("resolved object type vanished"))?;
            root_set(type_id, root.span, ctx)
        }
        None => ctx
            .frame()
            .subject
            .ok_or_else(|| CompilationError::UnsupportedConstruct {
                construct: "partial path with no path subject".to_string(),
                span: path.span,
            })?,
    };

    for step in path.steps {
        set = extend_path(set, step.name, step.span, ctx)?;
    }
    Ok(set)
}

/// The set of all objects of `type_id`, shared with any visible binding.
pub fn root_set(type_id: TypeId, span: Span, ctx: &mut CompilationContext<'_>) -> SetId {
    let path_id = PathId::root(type_id);
    let existing = ctx.lookup_path(path_id);
    if let Some(existing) = existing {
        if is_root_of(existing, type_id, ctx) {
            trace!(?path_id, set = ?existing, "path root reused");
            return existing;
        }
        debug!(?path_id, set = ?existing, "path fingerprint collision");
    }
    let id = ctx.new_set(SetExpr::Root, type_id, Cardinality::Many, span, Some(path_id));
    if existing.is_none() {
        ctx.bind_path(path_id, id);
    }
    trace!(?path_id, set = ?id, scope = ?ctx.frame().scope, "path root bound");
    id
}

/// Follow pointer `name` from `source`.
pub fn extend_path(
    source: SetId,
    name: &str,
    span: Span,
    ctx: &mut CompilationContext<'_>,
) -> Result<SetId> {
    let (stype, source_path) = {
        let s = ctx.set(source)?;
        (s.stype, s.path_id.unwrap_or_else(|| PathId::anchored(u64::from(s.id.0))))
    };
    let schema = ctx.schema();
    if !schema.is_object(stype) {
        return Err(CompilationError::TypeMismatch {
            message: format!(
                "cannot follow pointer '{}' of non-object type '{}'{}",
                name,
                schema.type_name(stype),
                ctx.clause_suffix()
            ),
            span,
        });
    }
    let pointer = schema.find_pointer(stype, name).ok_or_else(|| {
        CompilationError::name_resolution(format!("{}.{}", schema.type_name(stype), name), span)
    })?;

    let path_id = source_path.extend(name);
    let existing = ctx.lookup_path(path_id);
    if let Some(existing) = existing {
        if is_step_of(existing, source, name, ctx) {
            trace!(?path_id, set = ?existing, "path step reused");
            return Ok(existing);
        }
        debug!(?path_id, set = ?existing, "path fingerprint collision");
    }

    let pointer_cardinality = pointer.cardinality();
    let cardinality = pathctx::infer_cardinality(source, ctx)?.mul(pointer_cardinality);
    let id = ctx.new_set(
        SetExpr::Step {
            source,
            pointer: name.to_string(),
            pointer_cardinality,
        },
        pointer.target,
        cardinality,
        span,
        Some(path_id),
    );
    if existing.is_none() {
        ctx.bind_path(path_id, id);
    }
    trace!(?path_id, set = ?id, scope = ?ctx.frame().scope, "path step bound");
    Ok(id)
}

// A fingerprint hit is reused only if it denotes the same canonical path.

fn is_root_of(set: SetId, type_id: TypeId, ctx: &CompilationContext<'_>) -> bool {
    ctx.set(set)
        .is_ok_and(|s| matches!(s.expr, SetExpr::Root) && s.stype == type_id)
}

fn is_step_of(set: SetId, source: SetId, pointer: &str, ctx: &CompilationContext<'_>) -> bool {
    match ctx.set(set).map(|s| &s.expr) {
        Ok(SetExpr::Step {
            source: bound,
            pointer: bound_pointer,
            ..
        }) => bound_pointer == pointer && same_path(*bound, source, ctx),
        _ => false,
    }
}

/// Whether two sets denote the same canonical path.
fn same_path(a: SetId, b: SetId, ctx: &CompilationContext<'_>) -> bool {
    if a == b {
        return true;
    }
    let (Ok(left), Ok(right)) = (ctx.set(a), ctx.set(b)) else {
        return false;
    };
    match (&left.expr, &right.expr) {
        (SetExpr::Root, SetExpr::Root) => left.stype == right.stype,
        (
            SetExpr::Step {
                source: left_source,
                pointer: left_pointer,
                ..
            },
            SetExpr::Step {
                source: right_source,
                pointer: right_pointer,
                ..
            },
        ) => left_pointer == right_pointer && same_path(*left_source, *right_source, ctx),
        _ => false,
    }
}
