//! Pass 6: expand named templates.
//!
//! For each `expand Name<…>;` statement: resolve the template symbol, guard
//! against circular expansion through the world's currently-expanding set,
//! bind each argument as a type symbol named after the corresponding
//! parameter in the expansion's parameter scope, deep-clone the template
//! body, and re-run the pre-expansion passes on the clone. Nested
//! expansions inside the clone are reached by the continuing walk while the
//! outer template is still marked expanding, which is what makes cycles
//! detectable.

use anodec_ast::{
    ExpansionKind, ExprKind, NodeId, Symbol, SymbolKind, TemplateArg, TemplateExpansionContext,
};
use anodec_util::ErrorKind;

use crate::passes::run_pre_expansion_passes;
use crate::search::find_qualified_symbol;
use crate::walk::{Pass, PassContext};

pub struct ExpandNamedTemplates {
    /// Per-visit bookkeeping: the template marked expanding on enter, to be
    /// unmarked on leave (None when enter bailed out early).
    marked: Vec<Option<NodeId>>,
}

impl ExpandNamedTemplates {
    pub fn new() -> Self {
        Self { marked: Vec::new() }
    }
}

impl Default for ExpandNamedTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for ExpandNamedTemplates {
    fn name(&self) -> &'static str {
        "expand-named-templates"
    }

    fn enter(&mut self, pcx: &mut PassContext<'_>, node: NodeId) -> bool {
        let (name, type_args, param_scope, already_expanded) = match pcx.cx.kind(node) {
            ExprKind::TemplateExpansion {
                name,
                type_args,
                param_scope,
                expanded,
                ..
            } => (
                name.clone(),
                type_args.clone(),
                *param_scope,
                expanded.is_some(),
            ),
            _ => return true,
        };
        self.marked.push(None);

        if already_expanded {
            return true;
        }

        // The template name resolves from the expansion's lexical scope,
        // the parameter scope's parent.
        let lookup_scope = pcx
            .cx
            .scope(param_scope)
            .parent
            .expect("expansion parameter scope was not parented");
        let found = match find_qualified_symbol(
            pcx.cx,
            lookup_scope,
            &name,
            pcx.errors,
            ErrorKind::SymbolNotDefined,
        ) {
            Some(found) => found,
            None => return false,
        };

        let template_node = match pcx.cx.symbol(found).kind {
            SymbolKind::Template { node } => pcx.world.template(node),
            _ => {
                pcx.errors.error(
                    ErrorKind::SymbolIsNotATemplate,
                    name.span(),
                    format!("Symbol '{}' is not a template", name.qualified()),
                );
                return false;
            }
        };

        if let ExprKind::TemplateExpansion { template, .. } = &mut pcx.cx.node_mut(node).kind {
            *template = Some(template_node);
        }

        if pcx.world.is_expanding(template_node) {
            let span = pcx.cx.span(node);
            pcx.errors.error(
                ErrorKind::CircularTemplateReference,
                span,
                format!(
                    "Cannot expand template '{}' -- circular template expansion detected",
                    name.front().text
                ),
            );
            return false;
        }

        let (params, template_body) = match pcx.cx.kind(template_node) {
            ExprKind::NamedTemplate { params, body, .. } => (params.clone(), *body),
            _ => unreachable!("template symbol pointed at a non-template node"),
        };

        if params.len() != type_args.len() {
            let span = pcx.cx.span(node);
            let was_were = if type_args.len() == 1 { "was" } else { "were" };
            pcx.errors.error(
                ErrorKind::IncorrectNumberOfTemplateArguments,
                span,
                format!(
                    "Incorrect number of template arguments - expected {} but {} {} specified",
                    params.len(),
                    type_args.len(),
                    was_were
                ),
            );
            return false;
        }

        pcx.world.add_expanding(template_node);
        *self.marked.last_mut().unwrap() = Some(template_node);

        // Bind each argument as a type symbol named by its parameter.
        let mut args = Vec::with_capacity(params.len());
        for (param, arg_ref) in params.iter().zip(&type_args) {
            let arg_ty = pcx.cx.type_ref_type(*arg_ref);
            pcx.cx
                .declare(param_scope, Symbol::type_symbol(param.name.text, arg_ty));
            args.push(TemplateArg {
                param_name: param.name,
                type_ref: *arg_ref,
            });
        }

        let context = TemplateExpansionContext {
            kind: ExpansionKind::NamedTemplate,
            args,
        };
        let clone = pcx.cx.deep_copy_expand(template_body, &context);
        pcx.cx.set_parent(clone, node);
        if let ExprKind::TemplateExpansion { expanded, .. } = &mut pcx.cx.node_mut(node).kind {
            *expanded = Some(clone);
        }

        let module_body = pcx.module_body;
        run_pre_expansion_passes(pcx.cx, pcx.world, pcx.errors, module_body, clone, param_scope);

        true
    }

    fn leave(&mut self, pcx: &mut PassContext<'_>, node: NodeId) {
        if matches!(pcx.cx.kind(node), ExprKind::TemplateExpansion { .. }) {
            if let Some(Some(template)) = self.marked.pop() {
                pcx.world.remove_expanding(template);
            }
        }
    }
}
