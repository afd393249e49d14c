//! Module export: REPL-level chaining.
//!
//! After a module's pipeline succeeds, its globally visible symbols are
//! cloned, with the external flag set, into the world's global scope, so
//! later modules resolve them. The emitter sees the flag and declares such
//! symbols extern, without storage or definition. Collisions are first
//! come, first served.

use anodec_ast::{AstContext, Module, StorageKind, SymbolKind};
use anodec_util::{ErrorKind, ErrorStream};

use crate::world::World;

/// Clone a compiled module's exportable root-scope symbols into the global
/// scope. Returns the number of symbols exported.
pub fn export_module_symbols(
    cx: &mut AstContext,
    world: &mut World,
    errors: &mut ErrorStream,
    module: &Module,
) -> usize {
    let module_scope = module.scope(cx);
    let mut exported = 0;

    for symbol_id in cx.scope_symbols(module_scope) {
        let symbol = cx.symbol(symbol_id);
        if symbol.external {
            continue;
        }
        // Namespaces stay module-local; variables, functions, types and
        // templates are the exportable kinds.
        if matches!(symbol.kind, SymbolKind::Namespace { .. }) {
            continue;
        }
        if symbol.storage != StorageKind::Global {
            continue;
        }

        let name = symbol.name;
        if cx.find_in_current(world.global_scope, name).is_some() {
            errors.error(
                ErrorKind::SymbolAlreadyDefinedInScope,
                cx.span(module.body),
                format!("Symbol '{}' is already defined in this scope.", name),
            );
            continue;
        }

        let clone = cx.clone_for_export(symbol_id);
        cx.add_symbol(world.global_scope, clone);
        exported += 1;
    }

    exported
}
