//! anodec-emit - The emitter boundary.
//!
//! The core hands a semantically valid module to an [`Emitter`], which
//! lowers it to a backend artifact; a [`Loader`] installs the artifact and
//! returns the address of its initializer. The concrete backend (LLVM IR
//! emission, JIT orchestration) is an external collaborator behind these
//! traits; this crate defines only the contract:
//!
//! - each module gets an initializer named `<module>__initModule__`;
//! - exported globals get external linkage; imported (external-flagged)
//!   symbols get external-weak linkage and no initializer;
//! - classes become structs whose field order follows the class type's
//!   ordinals, mapped to pointer-to-struct;
//! - module-level expressions yielding a primitive store the value and call
//!   `__receive_result__` so the REPL can display it;
//! - `new<T>()` lowers to `__malloc__(sizeof(T))` plus a pointer cast, and
//!   `assert(x)` to a conditional call of `__assert_passed__` /
//!   `__assert_failed__`.

pub mod abi;
pub mod type_map;

pub use abi::{module_init_name, PrimTag};
pub use type_map::TypeMap;

use anodec_ast::{AstContext, Module};
use anodec_sem::World;
use thiserror::Error;

/// Errors crossing the emitter boundary.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The module references a type the backend cannot lower.
    #[error("unsupported type at emitter boundary: {0}")]
    UnsupportedType(String),

    /// A symbol required during lowering or loading was missing.
    #[error("missing symbol: {0}")]
    MissingSymbol(String),

    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Lowers a validated module to a backend artifact.
pub trait Emitter {
    type Artifact;

    fn emit_module(
        &mut self,
        cx: &AstContext,
        world: &World,
        module: &Module,
    ) -> Result<Self::Artifact, EmitError>;
}

/// Installs emitted artifacts and resolves symbols for them.
pub trait Loader {
    type Artifact;

    /// Install an artifact; returns the address of the module initializer.
    fn load_module(&mut self, artifact: Self::Artifact) -> Result<u64, EmitError>;

    /// Address of an installed symbol.
    fn find_symbol(&self, name: &str) -> Option<u64>;

    /// Install a host-side function (or global) JITed code can resolve
    /// against.
    fn set_export(&mut self, name: &str, address: u64);
}
