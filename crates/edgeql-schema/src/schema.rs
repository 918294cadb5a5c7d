//! Schema - the read-only type catalog consulted during compilation.
//!
//! # Storage Model
//!
//! - **Types**: scalar and object types stored by [`TypeId`], with a
//!   name index for resolution.
//! - **Functions**: stored by fully qualified name.
//! - **Hierarchy**: a `petgraph` DAG with one node per type and an edge from
//!   every type to each of its direct bases. Subtype checks are reachability
//!   queries on this graph.
//!
//! # Thread Safety
//!
//! A built [`Schema`] is immutable. It is `Send + Sync` and can be shared
//! (e.g. behind an `Arc`) by any number of concurrent compilations.

use edgeql_core::{CompilationError, QualifiedName, Span, TypeId};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::entries::{FunctionEntry, PointerEntry, ScalarKind, SchemaItem, TypeEntry};

/// Immutable schema snapshot.
#[derive(Debug)]
pub struct Schema {
    pub(crate) types: FxHashMap<TypeId, TypeEntry>,
    pub(crate) type_names: FxHashMap<QualifiedName, TypeId>,
    pub(crate) functions: FxHashMap<QualifiedName, FunctionEntry>,
    pub(crate) modules: FxHashSet<String>,
    pub(crate) hierarchy: DiGraph<TypeId, ()>,
    pub(crate) nodes: FxHashMap<TypeId, NodeIndex>,
}

impl Schema {
    /// A schema holding only the `std` module.
    pub fn with_std() -> Self {
        crate::SchemaBuilder::with_std().build_std()
    }

    // ==========================================================================
    // Name Lookup
    // ==========================================================================

    /// Look up a fully qualified name. Types shadow functions.
    pub fn lookup(&self, name: &QualifiedName) -> Option<SchemaItem<'_>> {
        if let Some(ty) = self.type_by_name(name) {
            return Some(SchemaItem::Type(ty));
        }
        self.functions.get(name).map(SchemaItem::Function)
    }

    /// Look up a fully qualified name, failing with a name-resolution error
    /// located at `span`.
    pub fn get(&self, name: &QualifiedName, span: Span) -> Result<SchemaItem<'_>, CompilationError> {
        self.lookup(name)
            .ok_or_else(|| CompilationError::name_resolution(name, span))
    }

    pub fn type_by_name(&self, name: &QualifiedName) -> Option<&TypeEntry> {
        self.type_names.get(name).and_then(|id| self.types.get(id))
    }

    pub fn get_type(&self, id: TypeId) -> Option<&TypeEntry> {
        self.types.get(&id)
    }

    pub fn function(&self, name: &QualifiedName) -> Option<&FunctionEntry> {
        self.functions.get(name)
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    // ==========================================================================
    // Type Queries
    // ==========================================================================

    /// Whether `sub` is `sup` or (transitively) extends it.
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        if sub == sup {
            return true;
        }
        match (self.nodes.get(&sub), self.nodes.get(&sup)) {
            (Some(&from), Some(&to)) => has_path_connecting(&self.hierarchy, from, to, None),
            _ => false,
        }
    }

    pub fn is_object(&self, id: TypeId) -> bool {
        self.get_type(id).is_some_and(TypeEntry::is_object)
    }

    pub fn scalar_kind(&self, id: TypeId) -> Option<ScalarKind> {
        self.get_type(id)
            .and_then(TypeEntry::as_scalar)
            .map(|s| s.kind)
    }

    /// `id` followed by all of its ancestors, nearest first.
    pub fn ancestors(&self, id: TypeId) -> Vec<TypeId> {
        let Some(&start) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut bfs = Bfs::new(&self.hierarchy, start);
        let mut out = Vec::new();
        while let Some(node) = bfs.next(&self.hierarchy) {
            out.push(self.hierarchy[node]);
        }
        out
    }

    /// The nearest type both `a` and `b` are subtypes of.
    pub fn common_supertype(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        self.ancestors(a)
            .into_iter()
            .find(|candidate| self.is_subtype(b, *candidate))
    }

    /// Find a pointer on `owner` or on the nearest ancestor declaring it.
    pub fn find_pointer(&self, owner: TypeId, name: &str) -> Option<&PointerEntry> {
        self.ancestors(owner).into_iter().find_map(|id| {
            self.get_type(id)
                .and_then(TypeEntry::as_object)
                .and_then(|obj| obj.pointers.get(name))
        })
    }

    // ==========================================================================
    // Diagnostics
    // ==========================================================================

    /// Display name of a type.
    pub fn type_name(&self, id: TypeId) -> String {
        if id.is_empty() {
            return "empty set".to_string();
        }
        self.get_type(id)
            .map(|t| t.name().to_string())
            .unwrap_or_else(|| format!("{:?}", id))
    }

    /// Human-readable family of a type (`boolean`, `integer`, `object`, ...).
    pub fn describe(&self, id: TypeId) -> &'static str {
        self.get_type(id)
            .map(TypeEntry::description)
            .unwrap_or("unknown type")
    }
}
