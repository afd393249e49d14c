//! Pass 3: populate symbol tables.
//!
//! Declares every variable, function (plus its parameters), class,
//! namespace and named template into its enclosing scope, binding the
//! declaring node to its symbol. Re-declaring a name within one scope is
//! `SymbolAlreadyDefinedInScope`. Storage kind follows the owning scope
//! (module scope → global, compound → local, class body → instance);
//! template-parameter scopes are transparent, so declarations inside an
//! expanded template land in the surrounding real scope.

use anodec_ast::{ExprKind, NodeId, ScopeId, Symbol, SymbolId};
use anodec_util::{ErrorKind, Name, SourceSpan};

use crate::walk::{Pass, PassContext};

pub struct PopulateSymbolTables;

impl PopulateSymbolTables {
    /// Declare `symbol` under `name` in `scope`, reporting a collision
    /// instead when the name is taken. Returns the governing symbol (the
    /// existing one on collision, so later passes still have a binding).
    fn declare_checked(
        pcx: &mut PassContext<'_>,
        scope: ScopeId,
        name: Name,
        span: SourceSpan,
        symbol: Symbol,
    ) -> SymbolId {
        if let Some(existing) = pcx.cx.find_in_current(scope, name) {
            pcx.errors.error(
                ErrorKind::SymbolAlreadyDefinedInScope,
                span,
                format!("Symbol '{}' is already defined in this scope.", name),
            );
            return existing;
        }
        pcx.cx.declare(scope, symbol)
    }
}

impl Pass for PopulateSymbolTables {
    fn name(&self) -> &'static str {
        "populate-symbol-tables"
    }

    fn enter(&mut self, pcx: &mut PassContext<'_>, node: NodeId) -> bool {
        match pcx.cx.kind(node) {
            ExprKind::VariableDecl {
                name, type_ref, ..
            } => {
                let (name, type_ref) = (*name, *type_ref);
                let scope = pcx.current_scope();
                let storage = pcx.cx.scope(scope).storage;
                let ty = pcx.cx.type_ref_type(type_ref);
                let symbol = Self::declare_checked(
                    pcx,
                    scope,
                    name.text,
                    name.span,
                    Symbol::variable(name.text, ty).with_storage(storage),
                );
                if let ExprKind::VariableDecl { symbol: slot, .. } = &mut pcx.cx.node_mut(node).kind
                {
                    *slot = Some(symbol);
                }
            }
            ExprKind::FuncDef {
                name,
                fn_type,
                param_scope,
                params,
                ..
            } => {
                let (name, fn_type, param_scope) = (*name, *fn_type, *param_scope);
                let param_list: Vec<_> = params
                    .iter()
                    .map(|p| (p.name, pcx.cx.type_ref_type(p.type_ref)))
                    .collect();

                let scope = pcx.current_scope();
                let storage = pcx.cx.scope(scope).storage;
                let symbol = Self::declare_checked(
                    pcx,
                    scope,
                    name.text,
                    name.span,
                    Symbol::function(name.text, fn_type).with_storage(storage),
                );
                if let ExprKind::FuncDef { symbol: slot, .. } = &mut pcx.cx.node_mut(node).kind {
                    *slot = Some(symbol);
                }

                // Parameters live in the function's own argument scope.
                let mut param_symbols = Vec::with_capacity(param_list.len());
                for (param_name, param_ty) in param_list {
                    let param_symbol = Self::declare_checked(
                        pcx,
                        param_scope,
                        param_name.text,
                        param_name.span,
                        Symbol::variable(param_name.text, param_ty)
                            .with_storage(anodec_ast::StorageKind::Argument),
                    );
                    param_symbols.push(param_symbol);
                }
                if let ExprKind::FuncDef { params, .. } = &mut pcx.cx.node_mut(node).kind {
                    for (param, symbol) in params.iter_mut().zip(param_symbols) {
                        param.symbol = Some(symbol);
                    }
                }
            }
            ExprKind::CompleteClassDef {
                name,
                defined_type,
                template_args,
                ..
            } => {
                // Expanded generics are registered through the generic's
                // expansion cache, not declared by name.
                if template_args.is_empty() {
                    let (name, ty) = (*name, *defined_type);
                    let scope = pcx.current_scope();
                    let storage = pcx.cx.scope(scope).storage;
                    Self::declare_checked(
                        pcx,
                        scope,
                        name.text,
                        name.span,
                        Symbol::type_symbol(name.text, ty).with_storage(storage),
                    );
                }
            }
            ExprKind::GenericClassDef {
                name, defined_type, ..
            } => {
                let (name, ty) = (*name, *defined_type);
                let scope = pcx.current_scope();
                let storage = pcx.cx.scope(scope).storage;
                let symbol = Self::declare_checked(
                    pcx,
                    scope,
                    name.text,
                    name.span,
                    Symbol::type_symbol(name.text, ty).with_storage(storage),
                );
                if let ExprKind::GenericClassDef { symbol: slot, .. } =
                    &mut pcx.cx.node_mut(node).kind
                {
                    *slot = Some(symbol);
                }
                pcx.world.register_generic(node);
            }
            ExprKind::NamedTemplate { name, .. } => {
                let name = *name;
                let scope = pcx.current_scope();
                let storage = pcx.cx.scope(scope).storage;
                Self::declare_checked(
                    pcx,
                    scope,
                    name.text,
                    name.span,
                    Symbol::template(name.text, node).with_storage(storage),
                );
                pcx.world.register_template(node);
            }
            ExprKind::AnonymousTemplate { body, .. } => {
                // An anonymous template may only contain class definitions.
                let exprs = match pcx.cx.kind(*body) {
                    ExprKind::ExpressionList { exprs } => exprs.clone(),
                    _ => Vec::new(),
                };
                for expr in exprs {
                    if !matches!(pcx.cx.kind(expr), ExprKind::GenericClassDef { .. }) {
                        let span = pcx.cx.span(expr);
                        pcx.errors.error(
                            ErrorKind::OnlyClassesAllowedInAnonymousTemplates,
                            span,
                            "Only classes allowed in anonymous templates".to_owned(),
                        );
                    }
                }
            }
            _ => {}
        }
        true
    }
}
