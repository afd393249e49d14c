//! anodec-util - Foundation types shared by every anode compiler crate.
//!
//! This crate carries the pieces the rest of the pipeline builds on:
//!
//! - [`span`]: source locations and spans (every token, AST node and
//!   diagnostic carries one)
//! - [`intern`]: a global string interner handing out compact [`Name`]
//!   handles with O(1) comparison
//! - [`index_vec`]: typed indices and vectors so the different id spaces
//!   (nodes, scopes, symbols, types) cannot be mixed up
//! - [`diagnostic`]: the closed [`ErrorKind`] enum and the [`ErrorStream`]
//!   collector the whole front end reports through

pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod intern;
pub mod span;

pub use diagnostic::{Diagnostic, ErrorKind, ErrorStream};
pub use index_vec::{Idx, IndexVec};
pub use intern::{unique_name, Name};
pub use span::{SourceLocation, SourceSpan};

// Re-export the hash types used across the compiler.
pub use rustc_hash::{FxHashMap, FxHashSet};
