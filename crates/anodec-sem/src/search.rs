//! Qualified symbol search.
//!
//! A one-part name searches up the scope parentage chain. A multi-part name
//! `a::b::c` resolves `a` by climbing, requires it to be a namespace,
//! resolves each middle part strictly within the namespace found so far,
//! and finally resolves the last part within the last namespace.

use anodec_ast::{AstContext, QualifiedName, ScopeId, SymbolId, SymbolKind};
use anodec_util::{ErrorKind, ErrorStream};

/// Resolve a possibly qualified name starting from `scope`.
///
/// `missing_kind` is reported when a one-part name is not found: variable
/// resolution reports `VariableNotDefined`, type and template resolution
/// report `SymbolNotDefined`. The multi-part failure kinds are fixed.
///
/// Reports its own diagnostics and returns `None` on failure.
pub fn find_qualified_symbol(
    cx: &AstContext,
    scope: ScopeId,
    name: &QualifiedName,
    errors: &mut ErrorStream,
    missing_kind: ErrorKind,
) -> Option<SymbolId> {
    if name.len() == 1 {
        let part = name.front();
        let found = cx.find_in_current_or_parents(scope, part.text);
        if found.is_none() {
            errors.error(
                missing_kind,
                part.span,
                format!(
                    "identifier '{}' does not exist or is not accessible from the current scope.",
                    part.text
                ),
            );
        }
        return found;
    }

    // Resolve the first part up the parentage chain; it must be a
    // namespace.
    let first = name.front();
    let maybe_namespace = match cx.find_in_current_or_parents(scope, first.text) {
        Some(found) => found,
        None => {
            errors.error(
                ErrorKind::NamespaceDoesNotExist,
                first.span,
                format!(
                    "namespace '{}' does not exist or is not accessible from the current scope.",
                    first.text
                ),
            );
            return None;
        }
    };

    let mut current_namespace = match cx.symbol(maybe_namespace).kind {
        SymbolKind::Namespace { scope } => scope,
        _ => {
            errors.error(
                ErrorKind::IdentifierIsNotNamespace,
                first.span,
                format!("identifier '{}' is not a namespace.", first.text),
            );
            return None;
        }
    };

    // Middle parts descend through namespaces without climbing.
    let mut scope_path = first.text.as_str().to_owned();
    for part in name.middle() {
        let maybe_namespace = match cx.find_in_current(current_namespace, part.text) {
            Some(found) => found,
            None => {
                errors.error(
                    ErrorKind::ChildNamespaceDoesNotExist,
                    part.span,
                    format!(
                        "namespace '{}' does not exist within namespace '{}'.",
                        part.text, scope_path
                    ),
                );
                return None;
            }
        };
        match cx.symbol(maybe_namespace).kind {
            SymbolKind::Namespace { scope } => current_namespace = scope,
            _ => {
                errors.error(
                    ErrorKind::MemberOfNamespaceIsNotNamespace,
                    part.span,
                    format!(
                        "identifier '{}' of namespace '{}' is not a child namespace.",
                        part.text, scope_path
                    ),
                );
                return None;
            }
        }
        scope_path.push_str("::");
        scope_path.push_str(part.text.as_str());
    }

    // The final part is resolved in the last namespace only.
    let last = name.back();
    let found = cx.find_in_current(current_namespace, last.text);
    if found.is_none() {
        errors.error(
            ErrorKind::NamespaceMemberDoesNotExist,
            last.span,
            format!(
                "symbol '{}' does not exist in namespace '{}'",
                last.text, scope_path
            ),
        );
    }
    found
}
