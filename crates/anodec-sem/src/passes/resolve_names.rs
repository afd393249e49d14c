//! Pass 4: resolve variable references to symbols.
//!
//! Lookup follows the multi-part-identifier rules. Local variables must be
//! declared before use in program order; the pass tracks locals whose
//! declarations it has walked past.

use anodec_ast::{ExprKind, NodeId, StorageKind};
use anodec_util::{ErrorKind, FxHashSet};

use crate::search::find_qualified_symbol;
use crate::walk::{Pass, PassContext};

pub struct ResolveNames {
    /// Local symbols whose declarations have been visited.
    defined: FxHashSet<anodec_ast::SymbolId>,
}

impl ResolveNames {
    pub fn new() -> Self {
        Self {
            defined: FxHashSet::default(),
        }
    }
}

impl Default for ResolveNames {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for ResolveNames {
    fn name(&self) -> &'static str {
        "resolve-names"
    }

    fn enter(&mut self, pcx: &mut PassContext<'_>, node: NodeId) -> bool {
        match pcx.cx.kind(node) {
            ExprKind::VariableDecl { symbol, .. } => {
                let symbol = symbol.expect("declaration was not bound by the populate pass");
                if pcx.cx.symbol(symbol).storage == StorageKind::Local {
                    self.defined.insert(symbol);
                }
            }
            ExprKind::VariableRef { name, symbol, .. } => {
                if symbol.is_some() {
                    return true;
                }
                let name = name.clone();
                let scope = pcx.current_scope();
                let found = find_qualified_symbol(
                    pcx.cx,
                    scope,
                    &name,
                    pcx.errors,
                    ErrorKind::VariableNotDefined,
                );
                let found = match found {
                    Some(found) => found,
                    None => return true,
                };

                let ty = pcx.cx.symbol_type(found);
                if !pcx.cx.types.is_class(ty) && !pcx.cx.types.is_function(ty) {
                    let is_local = pcx.cx.symbol(found).storage == StorageKind::Local;
                    if is_local && !self.defined.contains(&found) {
                        let span = pcx.cx.span(node);
                        pcx.errors.error(
                            ErrorKind::VariableUsedBeforeDefinition,
                            span,
                            format!("'{}' was used before its definition.", name.qualified()),
                        );
                        return true;
                    }
                }

                if let ExprKind::VariableRef { symbol: slot, .. } = &mut pcx.cx.node_mut(node).kind
                {
                    *slot = Some(found);
                }
            }
            _ => {}
        }
        true
    }
}
