//! Scope tree used for path correlation.
//!
//! Each node records the path sets bound in it. Looking a path up walks from
//! a node to the root, so a path bound in an ancestor is visible to (and
//! correlated with) every descendant, while sibling nodes never see each
//! other's bindings.

use edgeql_core::PathId;
use rustc_hash::FxHashMap;

use crate::ir::{ScopeId, SetId};

#[derive(Debug, Default)]
struct ScopeNode {
    parent: Option<ScopeId>,
    paths: FxHashMap<PathId, SetId>,
}

#[derive(Debug)]
pub struct ScopeTree {
    nodes: Vec<ScopeNode>,
}

impl ScopeTree {
    /// A tree holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![ScopeNode::default()],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Add a child of `parent`.
    pub fn attach(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.nodes.len() as u32);
        self.nodes.push(ScopeNode {
            parent: Some(parent),
            paths: FxHashMap::default(),
        });
        id
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.nodes.get(id.index()).and_then(|n| n.parent)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `from` followed by its ancestors up to the root.
    pub fn ancestors(&self, from: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(from), |id| self.parent(*id))
    }

    /// Find `path` bound in `from` or any ancestor of it.
    pub fn lookup(&self, from: ScopeId, path: PathId) -> Option<(ScopeId, SetId)> {
        self.ancestors(from).find_map(|id| {
            self.nodes
                .get(id.index())
                .and_then(|n| n.paths.get(&path))
                .map(|set| (id, *set))
        })
    }

    pub fn bind(&mut self, scope: ScopeId, path: PathId, set: SetId) {
        if let Some(node) = self.nodes.get_mut(scope.index()) {
            node.paths.insert(path, set);
        }
    }

    /// Whether `ancestor` is a proper ancestor of `of`.
    pub fn is_strict_ancestor(&self, ancestor: ScopeId, of: ScopeId) -> bool {
        ancestor != of && self.ancestors(of).any(|id| id == ancestor)
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
