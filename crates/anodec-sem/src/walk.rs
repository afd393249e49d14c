//! The pass walker.
//!
//! Every semantic pass is an in-place visitor over the AST, dispatching on
//! node kind. The walker owns the mechanics all passes share: recursion in
//! traversal order, the scope stack (compound scopes, function parameter
//! scopes, template-parameter scopes, namespace descent), and the
//! diagnostic context pushed around template expansions.
//!
//! Namespace scopes are materialized here: the first walk to encounter a
//! `namespace a::b` creates (or re-enters) one namespace symbol and scope
//! per path segment.

use anodec_ast::{
    AstContext, ExprKind, NodeId, ScopeId, StorageKind, Symbol, SymbolKind, TypeRefId, TypeRefKind,
};
use anodec_util::{ErrorKind, ErrorStream};

use crate::world::World;

/// Shared state handed to every pass hook.
pub struct PassContext<'x> {
    pub cx: &'x mut AstContext,
    pub world: &'x mut World,
    pub errors: &'x mut ErrorStream,
    /// The module's root compound; generic expansion appends to it.
    pub module_body: NodeId,
    scopes: Vec<ScopeId>,
}

impl PassContext<'_> {
    /// Topmost scope on the stack.
    pub fn top_scope(&self) -> ScopeId {
        *self
            .scopes
            .last()
            .expect("scope stack is empty; pass ran outside any scope")
    }

    /// The scope names are logically looked up from: the top scope with
    /// template-parameter scopes skipped.
    pub fn current_scope(&self) -> ScopeId {
        self.cx.logical_scope(self.top_scope())
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }
}

/// One semantic pass.
pub trait Pass {
    fn name(&self) -> &'static str;

    /// Whether the walk descends into the bodies of template definitions
    /// (only the parent-link pass does).
    fn visits_template_bodies(&self) -> bool {
        false
    }

    /// Called before a node's children; return false to skip them.
    fn enter(&mut self, pcx: &mut PassContext<'_>, node: NodeId) -> bool {
        let _ = (pcx, node);
        true
    }

    /// Called after a node's children (also after a skipped visit).
    fn leave(&mut self, pcx: &mut PassContext<'_>, node: NodeId) {
        let _ = (pcx, node);
    }

    /// Called for every resolution-deferred type ref, after its arguments.
    fn type_ref(&mut self, pcx: &mut PassContext<'_>, type_ref: TypeRefId) {
        let _ = (pcx, type_ref);
    }
}

/// Run one pass over a subtree. `starting_scopes` seeds the scope stack
/// (bottom first); the main pipeline starts empty, re-runs over expansion
/// clones seed the expansion's parameter scope.
pub fn run_pass(
    pass: &mut dyn Pass,
    cx: &mut AstContext,
    world: &mut World,
    errors: &mut ErrorStream,
    module_body: NodeId,
    root: NodeId,
    starting_scopes: &[ScopeId],
) {
    let mut pcx = PassContext {
        cx,
        world,
        errors,
        module_body,
        scopes: starting_scopes.to_vec(),
    };
    walk_node(pass, &mut pcx, root);
}

fn walk_node(pass: &mut dyn Pass, pcx: &mut PassContext<'_>, node: NodeId) {
    // Diagnostics reported anywhere inside an expansion, the expansion
    // work itself included, carry the expansion context.
    let is_expansion = matches!(pcx.cx.kind(node), ExprKind::TemplateExpansion { .. });
    if is_expansion {
        pcx.errors.push_context(format!(
            "While inside template expansion at: {}",
            pcx.cx.span(node)
        ));
    }

    let visit_children = pass.enter(pcx, node);

    if visit_children {
        let pushed = push_scopes(pcx, node);

        for type_ref in pcx.cx.node_type_refs(node) {
            walk_type_ref(pass, pcx, type_ref);
        }

        // Children are snapshotted: visiting may append to the module body.
        let children = pcx.cx.child_nodes(node, pass.visits_template_bodies());
        for child in children {
            walk_node(pass, pcx, child);
        }

        for _ in 0..pushed {
            pcx.scopes.pop();
        }
    }

    pass.leave(pcx, node);

    if is_expansion {
        pcx.errors.pop_context();
    }
}

fn walk_type_ref(pass: &mut dyn Pass, pcx: &mut PassContext<'_>, type_ref: TypeRefId) {
    let args = pcx.cx.type_ref_args(type_ref).to_vec();
    for arg in args {
        walk_type_ref(pass, pcx, arg);
    }
    if matches!(pcx.cx.type_ref(type_ref).kind, TypeRefKind::Deferred { .. }) {
        pass.type_ref(pcx, type_ref);
    }
}

/// Push the scopes a node introduces; returns how many were pushed.
fn push_scopes(pcx: &mut PassContext<'_>, node: NodeId) -> usize {
    match pcx.cx.kind(node) {
        ExprKind::Compound { scope, .. } => {
            let scope = *scope;
            pcx.scopes.push(scope);
            1
        }
        ExprKind::FuncDef { param_scope, .. } => {
            let scope = *param_scope;
            pcx.scopes.push(scope);
            1
        }
        ExprKind::TemplateExpansion { param_scope, .. } => {
            let scope = *param_scope;
            pcx.scopes.push(scope);
            1
        }
        ExprKind::Namespace { .. } => descend_namespaces(pcx, node),
        _ => 0,
    }
}

/// Enter (creating on first encounter) one namespace scope per path
/// segment of a `namespace a::b::c` statement, pushing each. Records the
/// innermost scope on the node.
fn descend_namespaces(pcx: &mut PassContext<'_>, node: NodeId) -> usize {
    let parts = match pcx.cx.kind(node) {
        ExprKind::Namespace { name, .. } => name.parts().to_vec(),
        _ => unreachable!(),
    };

    let mut current = if pcx.scope_depth() == 0 {
        pcx.world.global_scope
    } else {
        pcx.current_scope()
    };

    let mut pushed = 0;
    for part in &parts {
        match pcx.cx.find_in_current(current, part.text) {
            None => {
                let scope = pcx
                    .cx
                    .new_named_scope(StorageKind::Global, part.text.as_str().to_owned());
                pcx.cx.scope_set_parent(scope, current);
                pcx.cx.declare(
                    current,
                    Symbol::namespace(part.text, scope).with_storage(StorageKind::Global),
                );
                current = scope;
            }
            Some(found) => match pcx.cx.symbol(found).kind {
                SymbolKind::Namespace { scope } => current = scope,
                _ => {
                    pcx.errors.error(
                        ErrorKind::IdentifierIsNotNamespace,
                        part.span,
                        format!("identifier '{}' is not a namespace.", part.text),
                    );
                    // Keep the stack balanced; stay in the enclosing scope.
                }
            },
        }
        pcx.scopes.push(current);
        pushed += 1;
    }

    if let ExprKind::Namespace { scope, .. } = &mut pcx.cx.node_mut(node).kind {
        *scope = Some(current);
    }
    pushed
}
