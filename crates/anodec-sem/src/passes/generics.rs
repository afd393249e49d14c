//! Pass 7: expand generic type references.
//!
//! A resolution-deferred type ref carrying type arguments must point at a
//! generic with a matching parameter count. The generic's expansion cache
//! is consulted by structural equality of the argument list; on a miss the
//! generic class definition is deep-cloned into a complete class, wrapped
//! in a template-parameter-storage compound that binds the argument types,
//! appended to the module body, registered in the cache, and run through
//! the pre-expansion passes. Argument refs are visited before the refs
//! that carry them, so nested references (`Stack<Stack<int>>`) expand
//! inside-out.

use anodec_ast::{
    ExpansionKind, ExprKind, StorageKind, Symbol, TemplateArg, TemplateExpansionContext, TypeRefId,
    SCOPE_SEPARATOR,
};
use anodec_util::ErrorKind;

use crate::passes::{run_pre_expansion_passes, ResolveTypes};
use crate::walk::{run_pass, Pass, PassContext};

pub struct ExpandGenericRefs;

impl Pass for ExpandGenericRefs {
    fn name(&self) -> &'static str {
        "expand-generic-refs"
    }

    fn type_ref(&mut self, pcx: &mut PassContext<'_>, type_ref: TypeRefId) {
        if pcx.cx.type_ref_args(type_ref).is_empty() {
            return;
        }

        let span = pcx.cx.type_ref(type_ref).span;
        let referenced = pcx.cx.type_ref_type(type_ref);
        if !pcx.cx.types.is_generic(referenced) {
            let shown = pcx.cx.types.display_name(referenced);
            pcx.errors.error(
                ErrorKind::TypeIsNotGenericButIsReferencedWithGenericArgs,
                span,
                format!(
                    "Type '{}' is not generic but is referenced with generic arguments",
                    shown
                ),
            );
            return;
        }
        let generic_ty = pcx.cx.types.actual(referenced);

        let (param_count, generic_name) = {
            let generic = pcx.cx.types.generic(generic_ty).unwrap();
            (generic.param_names.len(), generic.name)
        };
        let arg_types = pcx.cx.type_ref_arg_types(type_ref);
        if param_count != arg_types.len() {
            pcx.errors.error(
                ErrorKind::IncorrectNumberOfGenericArguments,
                span,
                format!(
                    "Incorrect number of generic arguments for type '{}' - expected {} but found {}",
                    generic_name, param_count, arg_types.len()
                ),
            );
            return;
        }

        if pcx
            .cx
            .types
            .generic_find_expansion(generic_ty, &arg_types)
            .is_some()
        {
            return;
        }

        let generic_node = pcx.cx.types.generic(generic_ty).unwrap().node;
        let generic_node = pcx.world.generic(generic_node);
        let (params, class_symbol) = match pcx.cx.kind(generic_node) {
            ExprKind::GenericClassDef { params, symbol, .. } => (
                params.clone(),
                symbol.expect("generic class definition was never declared"),
            ),
            _ => unreachable!("generic type pointed at a non-generic node"),
        };

        let arg_refs = pcx.cx.type_ref_args(type_ref).to_vec();
        let args: Vec<TemplateArg> = params
            .iter()
            .zip(&arg_refs)
            .map(|(param, arg_ref)| TemplateArg {
                param_name: param.name,
                type_ref: *arg_ref,
            })
            .collect();

        let context = TemplateExpansionContext {
            kind: ExpansionKind::AnonymousTemplate,
            args: args.clone(),
        };
        let class = pcx.cx.deep_copy_expand(generic_node, &context);
        let class_ty = match pcx.cx.kind(class) {
            ExprKind::CompleteClassDef { defined_type, .. } => *defined_type,
            _ => unreachable!("anonymous expansion of a generic must yield a complete class"),
        };
        pcx.cx
            .types
            .generic_add_expansion(generic_ty, arg_types, class_ty);

        // Wrap the expansion in a compound that binds the argument types;
        // its scope is parented to the scope the generic was defined in, so
        // the clone resolves names in its definition context.
        let class_span = pcx.cx.span(class);
        let wrapper_name = format!(
            "{}{}ImplicitExpansion",
            pcx.cx
                .symbol(class_symbol)
                .fully_qualified
                .clone()
                .unwrap_or_else(|| generic_name.as_str().to_owned()),
            SCOPE_SEPARATOR
        );
        let wrapper = pcx.cx.named_compound(
            class_span,
            StorageKind::TemplateParameter,
            wrapper_name,
            vec![class],
        );
        let wrapper_scope = match pcx.cx.kind(wrapper) {
            ExprKind::Compound { scope, .. } => *scope,
            _ => unreachable!(),
        };
        for arg in &args {
            let arg_ty = pcx.cx.type_ref_type(arg.type_ref);
            pcx.cx
                .declare(wrapper_scope, Symbol::type_symbol(arg.param_name.text, arg_ty));
        }
        let defining_scope = pcx
            .cx
            .symbol(class_symbol)
            .table
            .expect("declared symbol has no owning scope");
        pcx.cx.scope_set_parent(wrapper_scope, defining_scope);

        // The expansion becomes part of the module.
        let module_body = pcx.module_body;
        if let ExprKind::Compound { exprs, .. } = &mut pcx.cx.node_mut(module_body).kind {
            exprs.push(wrapper);
        }
        pcx.cx.set_parent(wrapper, module_body);
        pcx.cx.set_parent(class, wrapper);

        run_pre_expansion_passes(
            pcx.cx,
            pcx.world,
            pcx.errors,
            module_body,
            wrapper,
            wrapper_scope,
        );
        if !pcx.errors.has_errors() {
            let mut resolve = ResolveTypes;
            run_pass(
                &mut resolve,
                pcx.cx,
                pcx.world,
                pcx.errors,
                module_body,
                wrapper,
                &[wrapper_scope],
            );
        }
    }
}
