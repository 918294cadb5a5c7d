//! CompilationContext - the frame chain threaded through compilation.
//!
//! The context owns everything mutable about one statement compilation: the
//! IR arena, the scope tree and a stack of [`Frame`]s. The active frame is
//! the innermost one; [`CompilationContext::derive`] and
//! [`CompilationContext::derive_scope`] fork a child frame and return a
//! [`ContextGuard`] that restores the parent when dropped, including when an
//! error unwinds through `?`.

use std::fmt;
use std::ops::{Deref, DerefMut};

use edgeql_ast::Name;
use edgeql_core::{Cardinality, CompilationError, PathId, QualifiedName, Span, TypeId};
use edgeql_schema::{Schema, SchemaItem};
use rustc_hash::FxHashMap;

use crate::Result;
use crate::ir::{IrArena, ScopeId, Set, SetExpr, SetId};
use crate::scope::ScopeTree;

/// Module holding the built-in types and functions.
pub const STD_MODULE: &str = "std";

// ============================================================================
// Options
// ============================================================================

/// Per-compilation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Module searched for unqualified names before `std`.
    pub default_module: Option<String>,
    /// `alias -> module` bindings visible to the whole statement.
    pub module_aliases: FxHashMap<String, String>,
    /// LIMIT applied to a top-level SELECT that has none.
    pub implicit_limit: Option<i64>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_module(mut self, module: impl Into<String>) -> Self {
        self.default_module = Some(module.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>, module: impl Into<String>) -> Self {
        self.module_aliases.insert(alias.into(), module.into());
        self
    }

    pub fn with_implicit_limit(mut self, limit: i64) -> Self {
        self.implicit_limit = Some(limit);
        self
    }
}

// ============================================================================
// Frames
// ============================================================================

/// The clause a frame is compiling, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    Result,
    Shape,
    Filter,
    GroupBy,
    OrderBy,
    Offset,
    Limit,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Clause::Result => "SELECT",
            Clause::Shape => "shape",
            Clause::Filter => "FILTER",
            Clause::GroupBy => "GROUP BY",
            Clause::OrderBy => "ORDER BY",
            Clause::Offset => "OFFSET",
            Clause::Limit => "LIMIT",
        };
        f.write_str(s)
    }
}

/// One link of the context chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub clause: Option<Clause>,
    pub scope: ScopeId,
    pub default_module: Option<String>,
    pub aliases: FxHashMap<String, String>,
    /// Set that partial paths and shape elements resolve against.
    pub subject: Option<SetId>,
}

// ============================================================================
// CompilationContext
// ============================================================================

pub struct CompilationContext<'s> {
    schema: &'s Schema,
    arena: IrArena,
    scopes: ScopeTree,
    current: Frame,
    /// Parents of `current`, outermost first.
    saved: Vec<Frame>,
}

impl<'s> CompilationContext<'s> {
    pub fn new(schema: &'s Schema, options: &CompileOptions) -> Self {
        let scopes = ScopeTree::new();
        let current = Frame {
            clause: None,
            scope: scopes.root(),
            default_module: options.default_module.clone(),
            aliases: options.module_aliases.clone(),
            subject: None,
        };
        Self {
            schema,
            arena: IrArena::new(),
            scopes,
            current,
            saved: Vec::new(),
        }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn frame(&self) -> &Frame {
        &self.current
    }

    /// Number of frames above the root frame.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn arena(&self) -> &IrArena {
        &self.arena
    }

    pub fn into_arena(self) -> IrArena {
        self.arena
    }

    // ==========================================================================
    // Branching
    // ==========================================================================

    /// Fork a child frame sharing the current scope node.
    pub fn derive(&mut self) -> ContextGuard<'_, 's> {
        let depth = self.saved.len();
        self.saved.push(self.current.clone());
        ContextGuard { ctx: self, depth }
    }

    /// Fork a child frame with a fresh scope node below the current one.
    pub fn derive_scope(&mut self) -> ContextGuard<'_, 's> {
        let depth = self.saved.len();
        self.saved.push(self.current.clone());
        self.current.scope = self.scopes.attach(self.current.scope);
        ContextGuard { ctx: self, depth }
    }

    fn restore(&mut self, depth: usize) {
        if self.saved.len() > depth {
            self.saved.truncate(depth + 1);
            if let Some(frame) = self.saved.pop() {
                self.current = frame;
            }
        }
    }

    pub fn set_clause(&mut self, clause: Clause) {
        self.current.clause = Some(clause);
    }

    pub fn set_subject(&mut self, subject: Option<SetId>) {
        self.current.subject = subject;
    }

    pub fn set_default_module(&mut self, module: impl Into<String>) {
        self.current.default_module = Some(module.into());
    }

    pub fn add_alias(&mut self, alias: impl Into<String>, module: impl Into<String>) {
        self.current.aliases.insert(alias.into(), module.into());
    }

    /// ` in FILTER clause` etc., or empty outside any clause.
    pub fn clause_suffix(&self) -> String {
        match self.current.clause {
            Some(clause) => format!(" in {} clause", clause),
            None => String::new(),
        }
    }

    // ==========================================================================
    // Sets
    // ==========================================================================

    pub fn set(&self, id: SetId) -> Result<&Set> {
        self.arena
            .get(id)
            .ok_or_else(|| CompilationError::internal(format!("dangling set id {:?}", id)))
    }

    pub fn set_type(&self, id: SetId) -> Result<TypeId> {
        self.set(id).map(|s| s.stype)
    }

    /// Allocate a set attached to the current scope node.
    pub(crate) fn new_set(
        &mut self,
        expr: SetExpr,
        stype: TypeId,
        cardinality: Cardinality,
        span: Span,
        path_id: Option<PathId>,
    ) -> SetId {
        self.arena
            .alloc(expr, stype, cardinality, self.current.scope, span, path_id)
    }

    /// Find a path set visible from the current scope node.
    pub fn lookup_path(&self, path: PathId) -> Option<SetId> {
        self.scopes
            .lookup(self.current.scope, path)
            .map(|(_, set)| set)
    }

    pub(crate) fn bind_path(&mut self, path: PathId, set: SetId) {
        self.scopes.bind(self.current.scope, path, set);
    }

    // ==========================================================================
    // Name resolution
    // ==========================================================================

    /// Resolve a name as written in the query.
    ///
    /// A module qualifier is looked up among the aliases first. Unqualified
    /// names try the default module, then `std`.
    pub fn resolve(&self, name: &Name<'_>) -> Result<SchemaItem<'s>> {
        let schema = self.schema;
        match name.module {
            Some(module) => {
                let module = self
                    .current
                    .aliases
                    .get(module)
                    .map(String::as_str)
                    .unwrap_or(module);
                schema.get(&QualifiedName::new(module, name.name), name.span)
            }
            None => {
                let candidates = self
                    .current
                    .default_module
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::once(STD_MODULE));
                for module in candidates {
                    if let Some(item) = schema.lookup(&QualifiedName::new(module, name.name)) {
                        return Ok(item);
                    }
                }
                Err(CompilationError::name_resolution(name.name, name.span))
            }
        }
    }

    pub fn check_module(&self, module: &str, span: Span) -> Result<()> {
        if self.schema.has_module(module) {
            Ok(())
        } else {
            Err(CompilationError::name_resolution(module, span))
        }
    }
}

// ============================================================================
// ContextGuard
// ============================================================================

/// A derived frame. Dropping it restores the frame it was derived from.
pub struct ContextGuard<'c, 's> {
    ctx: &'c mut CompilationContext<'s>,
    depth: usize,
}

impl<'s> Deref for ContextGuard<'_, 's> {
    type Target = CompilationContext<'s>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for ContextGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for ContextGuard<'_, '_> {
    fn drop(&mut self) {
        self.ctx.restore(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeql_core::ErrorKind;

    fn name<'a>(module: Option<&'a str>, name: &'a str) -> Name<'a> {
        Name {
            module,
            name,
            span: Span::new(1, 1, name.len() as u32),
        }
    }

    #[test]
    fn derive_restores_parent_frame() {
        let schema = Schema::with_std();
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let before = ctx.frame().clone();
        {
            let mut child = ctx.derive();
            child.set_clause(Clause::Filter);
            child.add_alias("s", "std");
            assert_eq!(child.frame().scope, before.scope);
            assert_eq!(child.depth(), 1);
        }
        assert_eq!(ctx.frame(), &before);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn derive_scope_opens_child_node() {
        let schema = Schema::with_std();
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let root = ctx.frame().scope;
        let child_scope = {
            let child = ctx.derive_scope();
            let scope = child.frame().scope;
            assert_ne!(scope, root);
            assert_eq!(child.scopes().parent(scope), Some(root));
            scope
        };
        assert_eq!(ctx.frame().scope, root);
        assert!(ctx.scopes().is_strict_ancestor(root, child_scope));
    }

    #[test]
    fn frames_restore_on_error_paths() {
        fn fails(ctx: &mut CompilationContext<'_>) -> Result<()> {
            let mut inner = ctx.derive_scope();
            inner.set_clause(Clause::OrderBy);
            let mut nested = inner.derive();
            nested.set_subject(Some(SetId(9)));
            Err(CompilationError::internal("boom"))
        }

        let schema = Schema::with_std();
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let before = ctx.frame().clone();
        assert!(fails(&mut ctx).is_err());
        assert_eq!(ctx.frame(), &before);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn unqualified_names_fall_back_to_std() {
        let schema = Schema::with_std();
        let ctx = CompilationContext::new(&schema, &CompileOptions::new());
        let item = ctx.resolve(&name(None, "str")).unwrap();
        assert_eq!(item.as_type().unwrap().name().to_string(), "std::str");
    }

    #[test]
    fn aliases_resolve_before_modules() {
        let schema = Schema::with_std();
        let options = CompileOptions::new().with_alias("s", "std");
        let ctx = CompilationContext::new(&schema, &options);
        assert!(ctx.resolve(&name(Some("s"), "int")).is_ok());

        let err = ctx.resolve(&name(Some("nope"), "int")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameResolution);
        assert!(err.to_string().contains("nope::int"));
    }

    #[test]
    fn clause_suffix_names_clause() {
        let schema = Schema::with_std();
        let mut ctx = CompilationContext::new(&schema, &CompileOptions::new());
        assert_eq!(ctx.clause_suffix(), "");
        let mut child = ctx.derive();
        child.set_clause(Clause::OrderBy);
        assert_eq!(child.clause_suffix(), " in ORDER BY clause");
    }
}
