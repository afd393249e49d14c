//! anodec-sem - Semantic analysis for the anode language.
//!
//! Takes a parsed module and runs the fixed, ordered pipeline of in-place
//! AST passes: scope wiring, symbol population, name and type resolution,
//! template and generic expansion, implicit-cast insertion, and the late
//! semantic checks. The [`World`] carries everything that outlives one
//! module: the global scope of exported symbols, the template and generic
//! registries, and the currently-expanding guard set.
//!
//! ```no_run
//! use anodec_ast::AstContext;
//! use anodec_sem::{analyze_module, export_module_symbols, World};
//! use anodec_util::ErrorStream;
//!
//! # fn parse(_: &mut AstContext, _: &mut ErrorStream) -> anodec_ast::Module { unimplemented!() }
//! let mut cx = AstContext::new();
//! let mut world = World::new(&mut cx);
//! let mut errors = ErrorStream::new();
//! let module = parse(&mut cx, &mut errors);
//! if analyze_module(&mut cx, &mut world, &mut errors, &module) {
//!     export_module_symbols(&mut cx, &mut world, &mut errors, &module);
//! }
//! ```

pub mod export;
pub mod passes;
pub mod search;
pub mod walk;
pub mod world;

pub use export::export_module_symbols;
pub use search::find_qualified_symbol;
pub use walk::{Pass, PassContext};
pub use world::World;

use anodec_ast::{AstContext, Module};
use anodec_util::ErrorStream;

/// Run the full semantic pipeline over a module. Returns true when the
/// module is semantically valid; on failure the diagnostics are in
/// `errors` and the module must be discarded.
pub fn analyze_module(
    cx: &mut AstContext,
    world: &mut World,
    errors: &mut ErrorStream,
    module: &Module,
) -> bool {
    passes::run_module_passes(cx, world, errors, module.body)
}

#[cfg(test)]
mod tests;
