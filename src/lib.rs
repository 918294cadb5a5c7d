//! EdgeQL semantic compiler.
//!
//! This crate bundles the compiler pipeline:
//!
//! - [`ast`]: syntax tree types and an arena-backed builder
//! - [`schema`]: the read-only type catalog
//! - [`compiler`]: dispatcher, scopes, clause and statement compilers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use edgeql::prelude::*;
//!
//! let mut builder = SchemaBuilder::with_std();
//! builder
//!     .object_type("test::User")
//!     .property("active", "std::bool", PointerFlags::REQUIRED)
//!     .register()
//!     .unwrap();
//! let compiler = Compiler::new(Arc::new(builder.build().unwrap()));
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let stmt = b
//!     .select(b.path("test::User", &[]))
//!     .filter(b.partial_path(&["active"]))
//!     .statement();
//!
//! let query = compiler.compile(&stmt).unwrap();
//! assert!(query.stmt.filter.is_some());
//! ```

use std::sync::Arc;

pub use edgeql_ast as ast;
pub use edgeql_compiler as compiler;
pub use edgeql_core as core;
pub use edgeql_schema as schema;

pub use edgeql_core::{CompilationError, Error, SchemaError};

use edgeql_ast::Statement;
use edgeql_compiler::{CompileOptions, CompiledQuery};
use edgeql_schema::Schema;

pub mod prelude {
    pub use crate::Compiler;
    pub use bumpalo::Bump;
    pub use edgeql_ast::{AstBuilder, BinaryOp, NonesOrder, SortDirection, Statement, UnaryOp};
    pub use edgeql_compiler::{CompileOptions, CompiledQuery, SetExpr, SetId};
    pub use edgeql_core::{
        Cardinality, CompilationError, Error, ErrorKind, SchemaError, Span, TypeId, std_types,
    };
    pub use edgeql_schema::{PointerFlags, Schema, SchemaBuilder};
}

/// Compiles statements against a shared schema.
///
/// Cloning is cheap; clones share the schema, so one compiler per thread can
/// serve concurrent compilations.
#[derive(Debug, Clone)]
pub struct Compiler {
    schema: Arc<Schema>,
    options: CompileOptions,
}

impl Compiler {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self::with_options(schema, CompileOptions::default())
    }

    pub fn with_options(schema: Arc<Schema>, options: CompileOptions) -> Self {
        tracing::debug!(types = schema.type_count(), "compiler created");
        Self { schema, options }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, statement: &Statement<'_>) -> Result<CompiledQuery, Error> {
        edgeql_compiler::compile_statement(statement, &self.schema, &self.options)
            .map_err(Error::from)
    }
}
