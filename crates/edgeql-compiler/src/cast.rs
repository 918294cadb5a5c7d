//! Type conversion rules.
//!
//! Conversions are checked in this order:
//! 1. Identity (exact match)
//! 2. Upcast (subtype to supertype, objects and scalars alike)
//! 3. Implicit (`std::int` family to `std::float` family)
//! 4. Explicit (only through a `<type>` cast expression)

use edgeql_core::TypeId;
use edgeql_schema::{Schema, ScalarKind};

/// The kind of conversion applied by a cast set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    Identity,
    Upcast,
    Implicit,
    Explicit,
}

impl CastKind {
    pub fn is_implicit(self) -> bool {
        !matches!(self, CastKind::Explicit)
    }
}

/// Find a conversion usable without a cast expression (type hints, operands,
/// function arguments).
pub fn find_conversion(from: TypeId, to: TypeId, schema: &Schema) -> Option<CastKind> {
    if from == to {
        return Some(CastKind::Identity);
    }
    if schema.is_subtype(from, to) {
        return Some(CastKind::Upcast);
    }
    match (schema.scalar_kind(from), schema.scalar_kind(to)) {
        (Some(ScalarKind::Int), Some(ScalarKind::Float)) => Some(CastKind::Implicit),
        _ => None,
    }
}

/// Find a conversion for an explicit `<to>expr` cast.
pub fn find_cast(from: TypeId, to: TypeId, schema: &Schema) -> Option<CastKind> {
    if let Some(kind) = find_conversion(from, to, schema) {
        return Some(kind);
    }
    let (from_kind, to_kind) = (schema.scalar_kind(from)?, schema.scalar_kind(to)?);
    let allowed = from_kind == to_kind
        || (from_kind.is_numeric() && to_kind.is_numeric())
        || from_kind == ScalarKind::Str
        || to_kind == ScalarKind::Str;
    allowed.then_some(CastKind::Explicit)
}
