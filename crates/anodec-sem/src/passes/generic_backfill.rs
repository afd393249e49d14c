//! Pass 9: register expanded classes back into their generics.
//!
//! Classes produced inside a named-template expansion may originate from a
//! generic; each such class is added to the parent generic's expansion
//! cache, keyed by the argument types bound in the expansion's parameter
//! scope, unless a structurally equal entry already exists.

use anodec_ast::{ExprKind, NodeId, TypeId};

use crate::walk::{Pass, PassContext};

pub struct GenericBackfill;

impl Pass for GenericBackfill {
    fn name(&self) -> &'static str {
        "generic-backfill"
    }

    fn enter(&mut self, pcx: &mut PassContext<'_>, node: NodeId) -> bool {
        let (param_scope, expanded) = match pcx.cx.kind(node) {
            ExprKind::TemplateExpansion {
                param_scope,
                expanded,
                ..
            } => (*param_scope, *expanded),
            _ => return true,
        };
        let expanded = match expanded {
            Some(expanded) => expanded,
            None => return true,
        };

        let arg_types: Vec<TypeId> = pcx
            .cx
            .scope_types(param_scope)
            .into_iter()
            .map(|symbol| pcx.cx.symbol_type(symbol))
            .collect();

        // Walk the expanded subtree for complete classes born of a generic.
        let mut stack = vec![expanded];
        while let Some(current) = stack.pop() {
            if let ExprKind::CompleteClassDef { defined_type, .. } = pcx.cx.kind(current) {
                let class_ty = *defined_type;
                let generic = pcx.cx.types.class(class_ty).and_then(|c| c.generic_of);
                if let Some(generic) = generic {
                    if pcx
                        .cx
                        .types
                        .generic_find_expansion(generic, &arg_types)
                        .is_none()
                    {
                        pcx.cx
                            .types
                            .generic_add_expansion(generic, arg_types.clone(), class_ty);
                    }
                }
            }
            stack.extend(pcx.cx.child_nodes(current, false));
        }

        true
    }
}
