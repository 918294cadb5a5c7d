//! Shared vocabulary for the EdgeQL semantic compiler.
//!
//! - [`Span`]: source positions carried by syntax and IR nodes
//! - [`QualifiedName`]: `module::name` schema names
//! - [`TypeId`] / [`PathId`]: hash-based type and path identities
//! - [`Cardinality`]: set multiplicity bounds
//! - [`CompilationError`] / [`SchemaError`]: error types

mod cardinality;
mod error;
mod qualified_name;
mod span;
mod type_id;

pub use cardinality::Cardinality;
pub use error::{CompilationError, Error, ErrorKind, SchemaError};
pub use qualified_name::QualifiedName;
pub use span::Span;
pub use type_id::{PathId, TypeId, hash_constants, std_types};
