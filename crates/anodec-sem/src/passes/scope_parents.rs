//! Pass 2: wire the scope tree.
//!
//! The module root scope is parented to the world's global scope; every
//! function parameter scope, compound scope and template-parameter scope is
//! parented to its lexical enclosing scope. Namespace scopes were parented
//! at creation, during descent.

use anodec_ast::{ExprKind, NodeId};

use crate::walk::{Pass, PassContext};

pub struct ScopeParents;

impl Pass for ScopeParents {
    fn name(&self) -> &'static str {
        "scope-parents"
    }

    fn enter(&mut self, pcx: &mut PassContext<'_>, node: NodeId) -> bool {
        match pcx.cx.kind(node) {
            ExprKind::Compound { scope, .. } => {
                let scope = *scope;
                if pcx.scope_depth() == 0 {
                    // The module root.
                    let global = pcx.world.global_scope;
                    pcx.cx.scope_set_parent(scope, global);
                } else {
                    let top = pcx.top_scope();
                    // Re-runs over expansion clones seed the stack with the
                    // clone's own wrapper scope; leave that parenting alone.
                    if top != scope {
                        pcx.cx.scope_set_parent(scope, top);
                    }
                }
            }
            ExprKind::FuncDef { param_scope, .. } => {
                let scope = *param_scope;
                let top = pcx.top_scope();
                pcx.cx.scope_set_parent(scope, top);
            }
            ExprKind::TemplateExpansion { param_scope, .. } => {
                let scope = *param_scope;
                let top = pcx.top_scope();
                if top != scope {
                    pcx.cx.scope_set_parent(scope, top);
                }
            }
            _ => {}
        }
        true
    }
}
