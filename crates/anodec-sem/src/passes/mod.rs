//! The fixed semantic pass pipeline.
//!
//! Passes run in this order for each module; a pass that reports any error
//! stops the pipeline for that module. Template expansion re-runs the
//! pre-expansion prefix (parent links through type resolution) on each
//! clone it synthesizes.

mod casts;
mod checks;
mod class_types;
mod convert_refs;
mod generic_backfill;
mod generics;
mod members;
mod parent_links;
mod populate;
mod resolve_names;
mod resolve_types;
mod scope_parents;
mod templates;

pub use casts::InsertImplicitCasts;
pub use checks::{BinaryChecks, CastChecks, FuncCallChecks};
pub use class_types::PopulateClassTypes;
pub use convert_refs::ConvertGenericRefs;
pub use generic_backfill::GenericBackfill;
pub use generics::ExpandGenericRefs;
pub use parent_links::ParentLinks;
pub use populate::PopulateSymbolTables;
pub use resolve_names::ResolveNames;
pub use resolve_types::ResolveTypes;
pub use scope_parents::ScopeParents;
pub use templates::ExpandNamedTemplates;

use anodec_ast::{AstContext, NodeId, ScopeId};
use anodec_util::ErrorStream;

use crate::walk::{run_pass, Pass};
use crate::world::World;

/// Run the full pipeline over a module body. Returns true when every pass
/// completed without reporting errors.
pub fn run_module_passes(
    cx: &mut AstContext,
    world: &mut World,
    errors: &mut ErrorStream,
    module_body: NodeId,
) -> bool {
    // Named-template expansion precedes the resolution passes so module
    // code after an `expand` statement can reference the declarations the
    // expansion produced; the clones themselves re-run the pre-expansion
    // prefix. Generic-reference expansion requires resolved types and so
    // follows them.
    let mut passes: Vec<Box<dyn Pass>> = vec![
        Box::new(ParentLinks::new()),
        Box::new(ScopeParents),
        Box::new(PopulateSymbolTables),
        Box::new(ExpandNamedTemplates::new()),
        Box::new(ResolveNames::new()),
        Box::new(ResolveTypes),
        Box::new(ExpandGenericRefs),
        Box::new(PopulateClassTypes),
        Box::new(GenericBackfill),
        Box::new(ConvertGenericRefs),
        Box::new(members::ResolveMembers),
        Box::new(InsertImplicitCasts),
        Box::new(BinaryChecks),
        Box::new(CastChecks),
        Box::new(FuncCallChecks),
    ];

    let initial_errors = errors.error_count();
    for pass in passes.iter_mut() {
        run_pass(
            pass.as_mut(),
            cx,
            world,
            errors,
            module_body,
            module_body,
            &[],
        );
        if errors.error_count() > initial_errors {
            return false;
        }
    }
    true
}

pub use members::ResolveMembers;

/// Re-run the pre-expansion passes (parent links through type resolution)
/// on a freshly cloned subtree, with the expansion's scope seeded at the
/// bottom of the scope stack.
pub(crate) fn run_pre_expansion_passes(
    cx: &mut AstContext,
    world: &mut World,
    errors: &mut ErrorStream,
    module_body: NodeId,
    root: NodeId,
    starting_scope: ScopeId,
) {
    let mut passes: Vec<Box<dyn Pass>> = vec![
        Box::new(ParentLinks::new()),
        Box::new(ScopeParents),
        Box::new(PopulateSymbolTables),
        Box::new(ResolveNames::new()),
        Box::new(ResolveTypes),
    ];

    let initial_errors = errors.error_count();
    for pass in passes.iter_mut() {
        run_pass(
            pass.as_mut(),
            cx,
            world,
            errors,
            module_body,
            root,
            &[starting_scope],
        );
        if errors.error_count() > initial_errors {
            return;
        }
    }
}
