//! anodec-ast - AST model for the anode language.
//!
//! The whole program representation lives in one [`AstContext`]: arenas of
//! nodes, type references, scopes, symbols and types, all cross-referenced
//! by typed ids. One context serves the whole process; module compilations
//! share it, which is what lets a REPL module reference the symbols, types
//! and templates of earlier modules, and makes node ids process-unique.
//!
//! Ownership flows strictly downward (a module owns its root compound,
//! which transitively owns everything reachable from it); all back
//! references (parent links, a symbol's owning table, `Class <-> Generic`)
//! are non-owning ids.

pub mod clone;
pub mod ident;
pub mod node;
pub mod scope;
pub mod types;

use anodec_util::{define_idx, IndexVec, SourceSpan};

pub use clone::{structurally_equal, TemplateExpansionContext};
pub use ident::{Ident, QualifiedName};
pub use node::{
    BinaryExprKind, BinaryOp, CastKind, ExpansionKind, ExprKind, FieldRef, Node, Param,
    TemplateArg, TemplateParam, UnaryOp, VariableAccess,
};
pub use scope::{StorageKind, Symbol, SymbolKind, SymbolTable, SCOPE_SEPARATOR};
pub use types::{ClassField, ClassType, GenericType, Primitive, Type, TypeId, TypeTable};

define_idx!(
    /// Id of a node in the [`AstContext`] node arena. Process-unique.
    NodeId
);
define_idx!(
    /// Id of a type reference.
    TypeRefId
);
define_idx!(
    /// Id of a scope (symbol table).
    ScopeId
);
define_idx!(
    /// Id of a symbol.
    SymbolId
);

/// A reference to a data type as written in source.
#[derive(Debug)]
pub struct TypeRef {
    pub span: SourceSpan,
    pub kind: TypeRefKind,
}

/// The two states of a type reference.
#[derive(Debug)]
pub enum TypeRefKind {
    /// Known at construction (compiler-synthesized refs, e.g. implicit
    /// casts).
    Known { ty: TypeId },
    /// Named in source; resolved by the type-resolution pass through the
    /// deferred placeholder created alongside the ref.
    Deferred {
        name: QualifiedName,
        args: Vec<TypeRefId>,
        ty: TypeId,
    },
}

/// The arena holding a process's entire program representation.
pub struct AstContext {
    pub nodes: IndexVec<NodeId, Node>,
    pub type_refs: IndexVec<TypeRefId, TypeRef>,
    pub scopes: IndexVec<ScopeId, SymbolTable>,
    pub symbols: IndexVec<SymbolId, Symbol>,
    pub types: TypeTable,
}

impl AstContext {
    pub fn new() -> Self {
        Self {
            nodes: IndexVec::new(),
            type_refs: IndexVec::new(),
            scopes: IndexVec::new(),
            symbols: IndexVec::new(),
            types: TypeTable::new(),
        }
    }

    /// A type ref resolved at construction.
    pub fn known_type_ref(&mut self, span: SourceSpan, ty: TypeId) -> TypeRefId {
        self.type_refs.push(TypeRef {
            span,
            kind: TypeRefKind::Known { ty },
        })
    }

    /// A type ref to be resolved later; allocates its deferred placeholder,
    /// carrying the (themselves possibly deferred) argument types.
    pub fn deferred_type_ref(
        &mut self,
        span: SourceSpan,
        name: QualifiedName,
        args: Vec<TypeRefId>,
    ) -> TypeRefId {
        let arg_types = args.iter().map(|a| self.type_ref_type(*a)).collect();
        let ty = self.types.new_deferred(arg_types);
        self.type_refs.push(TypeRef {
            span,
            kind: TypeRefKind::Deferred { name, args, ty },
        })
    }

    pub fn type_ref(&self, id: TypeRefId) -> &TypeRef {
        &self.type_refs[id]
    }

    /// The type a ref denotes (the deferred placeholder until resolution).
    pub fn type_ref_type(&self, id: TypeRefId) -> TypeId {
        match &self.type_refs[id].kind {
            TypeRefKind::Known { ty } => *ty,
            TypeRefKind::Deferred { ty, .. } => *ty,
        }
    }

    pub fn type_ref_is_resolved(&self, id: TypeRefId) -> bool {
        match &self.type_refs[id].kind {
            TypeRefKind::Known { .. } => true,
            TypeRefKind::Deferred { ty, .. } => self.types.is_resolved(*ty),
        }
    }

    /// Point a deferred ref's placeholder at its resolved type.
    pub fn resolve_type_ref(&mut self, id: TypeRefId, to: TypeId) {
        match &self.type_refs[id].kind {
            TypeRefKind::Deferred { ty, .. } => self.types.resolve_deferred(*ty, to),
            TypeRefKind::Known { .. } => {
                panic!("attempted to resolve a known type ref")
            }
        }
    }

    /// Generic argument refs of a deferred type ref.
    pub fn type_ref_args(&self, id: TypeRefId) -> &[TypeRefId] {
        match &self.type_refs[id].kind {
            TypeRefKind::Deferred { args, .. } => args,
            TypeRefKind::Known { .. } => &[],
        }
    }

    /// Types of a deferred ref's generic arguments.
    pub fn type_ref_arg_types(&self, id: TypeRefId) -> Vec<TypeId> {
        self.type_ref_args(id)
            .iter()
            .map(|a| self.type_ref_type(*a))
            .collect()
    }
}

impl Default for AstContext {
    fn default() -> Self {
        Self::new()
    }
}

/// One parsed module: a name plus the root compound that owns the module's
/// statements and scope.
#[derive(Clone, Debug)]
pub struct Module {
    pub name: String,
    pub body: NodeId,
}

impl Module {
    pub fn new(name: String, body: NodeId) -> Self {
        Self { name, body }
    }

    /// The module's root scope.
    pub fn scope(&self, cx: &AstContext) -> ScopeId {
        match cx.kind(self.body) {
            ExprKind::Compound { scope, .. } => *scope,
            _ => panic!("module body is not a compound expression"),
        }
    }
}
