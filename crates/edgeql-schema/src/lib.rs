//! Read-only schema catalog for the EdgeQL compiler.
//!
//! The compiler consults a [`Schema`] to resolve qualified names, look up
//! pointers and check subtyping. Schemas are assembled with
//! [`SchemaBuilder`] and immutable afterwards.
//!
//! # Example
//!
//! ```
//! use edgeql_schema::{PointerFlags, SchemaBuilder};
//! use edgeql_core::{std_types, TypeId};
//!
//! let mut builder = SchemaBuilder::with_std();
//! builder
//!     .object_type("test::User")
//!     .property("name", "std::str", PointerFlags::REQUIRED)
//!     .register()
//!     .unwrap();
//! let schema = builder.build().unwrap();
//!
//! let user = TypeId::from_name("test::User");
//! assert!(schema.is_subtype(user, std_types::OBJECT));
//! assert_eq!(schema.find_pointer(user, "name").unwrap().target, std_types::STR);
//! ```

mod builder;
mod entries;
mod schema;
mod std_lib;

pub use builder::{ObjectTypeBuilder, SchemaBuilder};
pub use entries::{
    FunctionEntry, ObjectEntry, ParamEntry, ParamKind, ParamType, PointerEntry, PointerFlags,
    ReturnType, ScalarEntry, ScalarKind, SchemaItem, TypeEntry,
};
pub use schema::Schema;
