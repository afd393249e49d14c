//! The process-wide world.
//!
//! One `World` per process. It owns the root global scope (where each
//! successfully compiled module's exports are accumulated), registries of
//! named templates and generic class definitions, and the set of templates
//! currently being expanded, which guards against infinite expansion.
//!
//! Node ids are process-unique handles into the shared [`AstContext`], so
//! the registries are sets used to validate registration rather than maps;
//! looking a template up by id is an arena access.

use anodec_ast::{AstContext, NodeId, ScopeId, StorageKind};
use anodec_util::FxHashSet;

/// Cross-module compilation state.
pub struct World {
    /// Scope that accumulates exported symbols across modules.
    pub global_scope: ScopeId,
    templates: FxHashSet<NodeId>,
    generics: FxHashSet<NodeId>,
    expanding: FxHashSet<NodeId>,
}

impl World {
    pub fn new(cx: &mut AstContext) -> Self {
        let global_scope = cx.new_named_scope(StorageKind::Global, String::new());
        Self {
            global_scope,
            templates: FxHashSet::default(),
            generics: FxHashSet::default(),
            expanding: FxHashSet::default(),
        }
    }

    /// Register a named template definition.
    pub fn register_template(&mut self, node: NodeId) {
        self.templates.insert(node);
    }

    /// Fetch a registered template.
    ///
    /// # Panics
    ///
    /// Panics if the node was never registered; template symbols only ever
    /// point at registered definitions.
    pub fn template(&self, node: NodeId) -> NodeId {
        assert!(
            self.templates.contains(&node),
            "template node was never registered with the world"
        );
        node
    }

    /// Register a generic class definition.
    pub fn register_generic(&mut self, node: NodeId) {
        self.generics.insert(node);
    }

    /// Fetch a registered generic class definition.
    ///
    /// # Panics
    ///
    /// Panics if the node was never registered.
    pub fn generic(&self, node: NodeId) -> NodeId {
        assert!(
            self.generics.contains(&node),
            "generic class node was never registered with the world"
        );
        node
    }

    /// Mark a template as currently expanding.
    pub fn add_expanding(&mut self, node: NodeId) {
        let inserted = self.expanding.insert(node);
        debug_assert!(inserted, "template is already marked as expanding");
    }

    /// Whether a template is somewhere up the current expansion chain.
    pub fn is_expanding(&self, node: NodeId) -> bool {
        self.expanding.contains(&node)
    }

    /// Unmark a template; called when its expansion finishes, including on
    /// error paths.
    pub fn remove_expanding(&mut self, node: NodeId) {
        self.expanding.remove(&node);
    }
}
