//! Intermediate representation produced by the compiler.
//!
//! Every value the compiler produces is a [`Set`] stored in an [`IrArena`]
//! and referred to by [`SetId`]. Sets are never modified after they are
//! allocated; coercions allocate a new set wrapping the old one.

use std::fmt;

use edgeql_ast::{BinaryOp, Literal, NonesOrder, SortDirection, UnaryOp};
use edgeql_core::{Cardinality, PathId, QualifiedName, Span, TypeId};
use ordered_float::OrderedFloat;

use crate::cast::CastKind;

// ============================================================================
// Identities
// ============================================================================

/// Identity of a [`Set`]. Two references with the same id denote one
/// evaluated value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetId(pub(crate) u32);

impl SetId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "set#{}", self.0)
    }
}

/// Identity of a scope node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

// ============================================================================
// Sets and expressions
// ============================================================================

/// A typed, scope-attached value.
#[derive(Debug, Clone, PartialEq)]
pub struct Set {
    pub id: SetId,
    /// Canonical fingerprint for path sets; `None` for computed values.
    pub path_id: Option<PathId>,
    pub stype: TypeId,
    /// Cardinality relative to the scope the set was created in.
    pub cardinality: Cardinality,
    pub scope: ScopeId,
    pub span: Span,
    pub expr: SetExpr,
}

impl Set {
    pub fn is_path(&self) -> bool {
        self.path_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetExpr {
    /// All objects of the set's type.
    Root,
    /// Following `pointer` from every element of `source`.
    Step {
        source: SetId,
        pointer: String,
        pointer_cardinality: Cardinality,
    },
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    Bool(bool),
}

impl From<Literal<'_>> for Value {
    fn from(literal: Literal<'_>) -> Self {
        match literal {
            Literal::Int(v) => Value::Int(v),
            Literal::Float(v) => Value::Float(v),
            Literal::Str(v) => Value::Str(v.to_string()),
            Literal::Bool(v) => Value::Bool(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Value),
    EmptySet,
    BinOp {
        left: SetId,
        op: BinaryOp,
        right: SetId,
    },
    UnaryOp {
        op: UnaryOp,
        operand: SetId,
    },
    Call {
        function: QualifiedName,
        args: Vec<SetId>,
        aggregate: bool,
    },
    Cast {
        expr: SetId,
        to: TypeId,
        kind: CastKind,
    },
    Union(Vec<SetId>),
    Subquery(Box<SelectStmt>),
    /// The value of another set, referenced from a different syntax node.
    Alias(SetId),
}

/// An expression that has been typed but not yet attached to a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub expr: Expr,
    pub stype: TypeId,
    pub cardinality: Cardinality,
    pub span: Span,
}

/// Result of compiling one syntax node.
#[derive(Debug, Clone, PartialEq)]
pub enum Ir {
    /// Already scope-attached (paths, subqueries).
    Set(SetId),
    /// Awaiting [`crate::setgen::scoped_set`].
    Expr(TypedExpr),
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortExpr {
    pub expr: SetId,
    pub direction: SortDirection,
    pub nones_order: Option<NonesOrder>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeElement {
    pub name: String,
    pub set: SetId,
    pub computable: bool,
    pub elements: Vec<ShapeElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub result: SetId,
    pub shape: Vec<ShapeElement>,
    pub filter: Option<SetId>,
    pub group_by: Vec<SetId>,
    pub order_by: Vec<SortExpr>,
    pub offset: Option<SetId>,
    pub limit: Option<SetId>,
    pub cardinality: Cardinality,
    pub scope: ScopeId,
    pub span: Span,
}

// ============================================================================
// Arena
// ============================================================================

/// Owns every set of a compilation, in production order.
#[derive(Debug, Default, Clone)]
pub struct IrArena {
    sets: Vec<Set>,
}

impl IrArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc(
        &mut self,
        expr: SetExpr,
        stype: TypeId,
        cardinality: Cardinality,
        scope: ScopeId,
        span: Span,
        path_id: Option<PathId>,
    ) -> SetId {
        let id = SetId(self.sets.len() as u32);
        self.sets.push(Set {
            id,
            path_id,
            stype,
            cardinality,
            scope,
            span,
            expr,
        });
        id
    }

    pub fn get(&self, id: SetId) -> Option<&Set> {
        self.sets.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Set> {
        self.sets.iter()
    }
}

/// Output of compiling one statement.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub arena: IrArena,
    pub stmt: SelectStmt,
}

impl CompiledQuery {
    pub fn set(&self, id: SetId) -> Option<&Set> {
        self.arena.get(id)
    }

    pub fn result(&self) -> Option<&Set> {
        self.arena.get(self.stmt.result)
    }

    pub fn cardinality(&self) -> Cardinality {
        self.stmt.cardinality
    }
}
