//! EdgeQL syntax tree.
//!
//! The tree is the frozen input of the semantic compiler. Nodes are
//! allocated in a [`bumpalo::Bump`] arena and borrowed for `'ast`; the
//! compiler never mutates them.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use edgeql_ast::{AstBuilder, BinaryOp};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//!
//! // SELECT test::Issue FILTER test::Issue.number = '1'
//! let select = b
//!     .select(b.path("test::Issue", &[]))
//!     .filter(b.binary(
//!         b.path("test::Issue", &["number"]),
//!         BinaryOp::Eq,
//!         b.string("1"),
//!     ))
//!     .build();
//! assert!(select.filter.is_some());
//! ```

mod builder;
pub mod expr;
pub mod ops;
pub mod stmt;

pub use builder::{AstBuilder, SelectBuilder};
pub use expr::*;
pub use ops::*;
pub use stmt::*;
