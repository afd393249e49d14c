//! Pass 5: resolve type references.
//!
//! Single-identifier primitive keywords short-circuit to their scalars;
//! everything else is looked up by the multi-part rules and must name a
//! type.

use anodec_ast::{SymbolKind, TypeRefId, TypeRefKind, TypeTable};
use anodec_util::ErrorKind;

use crate::search::find_qualified_symbol;
use crate::walk::{Pass, PassContext};

pub struct ResolveTypes;

impl Pass for ResolveTypes {
    fn name(&self) -> &'static str {
        "resolve-types"
    }

    fn type_ref(&mut self, pcx: &mut PassContext<'_>, type_ref: TypeRefId) {
        if pcx.cx.type_ref_is_resolved(type_ref) {
            return;
        }

        let (name, span) = match &pcx.cx.type_ref(type_ref).kind {
            TypeRefKind::Deferred { name, .. } => (name.clone(), pcx.cx.type_ref(type_ref).span),
            TypeRefKind::Known { .. } => return,
        };

        if name.len() == 1 {
            if let Some(scalar) = TypeTable::scalar_from_keyword(name.front().text.as_str()) {
                pcx.cx.resolve_type_ref(type_ref, scalar);
                return;
            }
        }

        let scope = pcx.top_scope();
        let found = match find_qualified_symbol(
            pcx.cx,
            scope,
            &name,
            pcx.errors,
            ErrorKind::SymbolNotDefined,
        ) {
            Some(found) => found,
            None => return,
        };

        // The raw symbol type, not its collapsed actual: a template
        // argument bound to a still-deferred type must stay chained so a
        // later rewrite of the argument propagates here.
        let ty = match pcx.cx.symbol(found).kind {
            SymbolKind::Type { ty } => ty,
            _ => {
                pcx.errors.error(
                    ErrorKind::SymbolIsNotAType,
                    span,
                    format!("Symbol '{}' is not a type.", name.qualified()),
                );
                return;
            }
        };
        pcx.cx.resolve_type_ref(type_ref, ty);
    }
}
