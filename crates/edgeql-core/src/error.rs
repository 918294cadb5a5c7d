//! Error types for schema construction and query compilation.
//!
//! ```text
//! Error (top-level wrapper)
//! ├── SchemaError       - catalog construction errors
//! └── CompilationError  - semantic compilation errors
//! ```
//!
//! Every [`CompilationError`] carries the span of the offending syntax node.
//! The first error raised while compiling a statement aborts that statement;
//! nothing is recovered locally.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Schema Errors
// ============================================================================

/// Errors raised while building a schema catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A name was registered twice.
    #[error("duplicate definition: '{0}' is already registered")]
    Duplicate(String),

    /// A registration referenced a type that does not exist.
    #[error("unknown type '{name}' referenced by '{referrer}'")]
    UnknownType { name: String, referrer: String },

    /// An object type listed a scalar (or itself) as a base.
    #[error("invalid base '{base}' for object type '{name}'")]
    InvalidBase { name: String, base: String },

    /// A pointer was declared twice on the same type.
    #[error("duplicate pointer '{pointer}' on '{owner}'")]
    DuplicatePointer { owner: String, pointer: String },

    #[error("'{owner}.{pointer}' cannot target '{target}'")]
    InvalidPointerTarget {
        owner: String,
        pointer: String,
        target: String,
    },

    #[error("inheritance cycle through '{0}'")]
    InheritanceCycle(String),

    #[error("schema item name '{0}' must be qualified with a module")]
    Unqualified(String),
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Coarse classification of a [`CompilationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedConstruct,
    TypeMismatch,
    CardinalityViolation,
    NameResolution,
    Internal,
}

/// Errors raised by the semantic compiler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    /// A construct has no semantic support in the position it appears in.
    #[error("at {span}: unsupported construct: {construct}")]
    UnsupportedConstruct {
        /// Description of the construct.
        construct: String,
        /// Where the construct appears.
        span: Span,
    },

    /// An expression's type fails an expected-type or subtype check.
    #[error("at {span}: {message}")]
    TypeMismatch {
        /// Description of the mismatch.
        message: String,
        /// Where the mismatching expression appears.
        span: Span,
    },

    /// An expression expected to be a singleton may yield more than one value.
    #[error("at {span}: {message}")]
    CardinalityViolation {
        /// Description of the violation.
        message: String,
        /// Where the offending expression appears.
        span: Span,
    },

    /// A name does not resolve in the schema catalog.
    #[error("at {span}: reference to a non-existent schema item '{name}'")]
    NameResolution {
        /// The name as it was written or qualified.
        name: String,
        /// Where the name appears.
        span: Span,
    },

    /// A compiler invariant was broken.
    #[error("internal compiler error: {message}")]
    Internal { message: String },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::UnsupportedConstruct { span, .. } => *span,
            CompilationError::TypeMismatch { span, .. } => *span,
            CompilationError::CardinalityViolation { span, .. } => *span,
            CompilationError::NameResolution { span, .. } => *span,
            CompilationError::Internal { .. } => Span::default(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompilationError::UnsupportedConstruct { .. } => ErrorKind::UnsupportedConstruct,
            CompilationError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            CompilationError::CardinalityViolation { .. } => ErrorKind::CardinalityViolation,
            CompilationError::NameResolution { .. } => ErrorKind::NameResolution,
            CompilationError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn name_resolution(name: impl ToString, span: Span) -> Self {
        CompilationError::NameResolution {
            name: name.to_string(),
            span,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CompilationError::Internal {
            message: message.into(),
        }
    }
}

// ============================================================================
// Top-level Error
// ============================================================================

/// Any error produced by this workspace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

impl Error {
    pub fn is_schema(&self) -> bool {
        matches!(self, Error::Schema(_))
    }

    pub fn is_compilation(&self) -> bool {
        matches!(self, Error::Compilation(_))
    }
}
