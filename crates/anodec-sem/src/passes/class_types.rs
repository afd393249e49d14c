//! Pass 8: populate class types.
//!
//! Copies each complete class's body-scope variables into its class type as
//! fields (ordinals follow declaration order) and its functions as
//! methods. Every method receives a `this` symbol typed as the class.

use anodec_ast::{ExprKind, NodeId, StorageKind, Symbol, SymbolKind};
use anodec_util::Name;

use crate::walk::{Pass, PassContext};

pub struct PopulateClassTypes;

impl Pass for PopulateClassTypes {
    fn name(&self) -> &'static str {
        "populate-class-types"
    }

    fn enter(&mut self, pcx: &mut PassContext<'_>, node: NodeId) -> bool {
        let (body, class_ty) = match pcx.cx.kind(node) {
            ExprKind::CompleteClassDef {
                body, defined_type, ..
            } => (*body, *defined_type),
            _ => return true,
        };

        let body_scope = match pcx.cx.kind(body) {
            ExprKind::Compound { scope, .. } => *scope,
            _ => return true,
        };

        // Idempotent: rebuild from the body scope.
        if let Some(class) = pcx.cx.types.class_mut(class_ty) {
            class.fields.clear();
            class.methods.clear();
        }

        for variable in pcx.cx.scope_variables(body_scope) {
            let symbol = pcx.cx.symbol(variable);
            let (name, ty) = match symbol.kind {
                SymbolKind::Variable { ty } => (symbol.name, ty),
                _ => continue,
            };
            pcx.cx.types.class_add_field(class_ty, name, ty);
        }

        for method in pcx.cx.scope_functions(body_scope) {
            let name = pcx.cx.symbol(method).name;
            let this_symbol = pcx.cx.symbols.push(
                Symbol::variable(Name::intern("this"), class_ty)
                    .with_storage(StorageKind::Instance),
            );
            if let SymbolKind::Function { this, .. } = &mut pcx.cx.symbol_mut(method).kind {
                *this = Some(this_symbol);
            }
            pcx.cx.types.class_add_method(class_ty, name, method);
        }

        true
    }
}
