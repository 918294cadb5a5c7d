//! Catalog entries: types, pointers and functions.

use bitflags::bitflags;
use edgeql_core::{Cardinality, QualifiedName, TypeId};
use rustc_hash::FxHashMap;

// ============================================================================
// Types
// ============================================================================

/// The family a scalar type belongs to.
///
/// User-defined scalars inherit the kind of the std scalar they extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Str,
    Uuid,
    Datetime,
}

impl ScalarKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::Float)
    }

    /// Human-readable name used in diagnostics.
    pub fn description(self) -> &'static str {
        match self {
            ScalarKind::Bool => "boolean",
            ScalarKind::Int => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Str => "string",
            ScalarKind::Uuid => "uuid",
            ScalarKind::Datetime => "datetime",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScalarEntry {
    pub name: QualifiedName,
    pub type_id: TypeId,
    pub kind: ScalarKind,
    /// Direct base, if this scalar extends another one.
    pub base: Option<TypeId>,
}

bitflags! {
    /// Properties of a link or property declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PointerFlags: u8 {
        /// At least one value must be present.
        const REQUIRED = 0b0000_0001;
        /// More than one value may be present.
        const MULTI    = 0b0000_0010;
        /// Points at an object type rather than a scalar.
        const LINK     = 0b0000_0100;
    }
}

/// A property or link declared on an object type.
#[derive(Debug, Clone)]
pub struct PointerEntry {
    pub name: String,
    pub target: TypeId,
    pub flags: PointerFlags,
}

impl PointerEntry {
    /// How many targets one source object has through this pointer.
    pub fn cardinality(&self) -> Cardinality {
        Cardinality::from_bounds(
            self.flags.contains(PointerFlags::REQUIRED),
            self.flags.contains(PointerFlags::MULTI),
        )
    }

    pub fn is_link(&self) -> bool {
        self.flags.contains(PointerFlags::LINK)
    }
}

#[derive(Debug, Clone)]
pub struct ObjectEntry {
    pub name: QualifiedName,
    pub type_id: TypeId,
    /// Direct bases; every object type other than `std::Object` has at least one.
    pub bases: Vec<TypeId>,
    pub pointers: FxHashMap<String, PointerEntry>,
}

/// A schema type.
#[derive(Debug, Clone)]
pub enum TypeEntry {
    Scalar(ScalarEntry),
    Object(ObjectEntry),
}

impl TypeEntry {
    pub fn name(&self) -> &QualifiedName {
        match self {
            TypeEntry::Scalar(s) => &s.name,
            TypeEntry::Object(o) => &o.name,
        }
    }

    pub fn type_id(&self) -> TypeId {
        match self {
            TypeEntry::Scalar(s) => s.type_id,
            TypeEntry::Object(o) => o.type_id,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeEntry::Object(_))
    }

    pub fn as_scalar(&self) -> Option<&ScalarEntry> {
        match self {
            TypeEntry::Scalar(s) => Some(s),
            TypeEntry::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectEntry> {
        match self {
            TypeEntry::Object(o) => Some(o),
            TypeEntry::Scalar(_) => None,
        }
    }

    /// `boolean`, `integer`, ... for scalars; `object` for object types.
    pub fn description(&self) -> &'static str {
        match self {
            TypeEntry::Scalar(s) => s.kind.description(),
            TypeEntry::Object(_) => "object",
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Declared type of a function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Exactly this type or a subtype of it.
    Concrete(TypeId),
    /// Any integer or float type.
    Numeric,
    /// Any type.
    Any,
}

/// How an argument is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// The function is applied to each element of the argument.
    Singleton,
    /// The function consumes the whole argument set (`SET OF`).
    SetOf,
}

#[derive(Debug, Clone)]
pub struct ParamEntry {
    pub name: String,
    pub ty: ParamType,
    pub kind: ParamKind,
}

/// Declared return type of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Concrete(TypeId),
    /// The type of the argument at this position.
    SameAsArg(usize),
}

#[derive(Debug, Clone)]
pub struct FunctionEntry {
    pub name: QualifiedName,
    pub params: Vec<ParamEntry>,
    pub return_type: ReturnType,
    /// Cardinality of one invocation's result.
    ///
    /// The cardinality of a call is this value multiplied by the cardinality
    /// of every [`ParamKind::Singleton`] argument.
    pub return_cardinality: Cardinality,
}

impl FunctionEntry {
    /// Whether any parameter consumes a whole set.
    pub fn is_aggregate(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParamKind::SetOf)
    }
}

/// Result of a catalog lookup by name.
#[derive(Debug, Clone, Copy)]
pub enum SchemaItem<'a> {
    Type(&'a TypeEntry),
    Function(&'a FunctionEntry),
}

impl<'a> SchemaItem<'a> {
    pub fn as_type(&self) -> Option<&'a TypeEntry> {
        match self {
            SchemaItem::Type(t) => Some(t),
            SchemaItem::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&'a FunctionEntry> {
        match self {
            SchemaItem::Function(f) => Some(f),
            SchemaItem::Type(_) => None,
        }
    }
}
