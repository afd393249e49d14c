//! Symbols and lexical scopes.
//!
//! A [`SymbolTable`] is an ordered name→symbol map with a parent id forming
//! a scope tree; symbols and tables live in the [`AstContext`] arenas and
//! reference each other by id only. The `::` separator joins scope names
//! into fully-qualified symbol names.

use anodec_util::{unique_name, Name};
use indexmap::IndexMap;

use crate::types::{TypeId, TypeTable};
use crate::{AstContext, NodeId, ScopeId, SymbolId};

/// Separator between the parts of a qualified name.
pub const SCOPE_SEPARATOR: &str = "::";

/// How a symbol's storage is allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    NotSet,
    Global,
    Local,
    Argument,
    Instance,
    /// Scope holding the argument bindings of a template expansion. Such
    /// scopes are transparent when answering "which scope is this
    /// expression logically in".
    TemplateParameter,
}

/// What a symbol names.
#[derive(Clone, Copy, Debug)]
pub enum SymbolKind {
    /// A variable (global, local, argument or field).
    Variable { ty: TypeId },
    /// A function; methods additionally carry their `this` symbol.
    Function {
        fn_ty: TypeId,
        this: Option<SymbolId>,
    },
    /// A type name.
    Type { ty: TypeId },
    /// A named template, pointing at its defining AST node.
    Template { node: NodeId },
    /// A namespace, owning a nested symbol table.
    Namespace { scope: ScopeId },
}

/// A named entity in some scope.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: Name,
    pub kind: SymbolKind,
    pub storage: StorageKind,
    /// Set on clones exported to the world; the emitter declares external
    /// symbols without storage or definition.
    pub external: bool,
    /// Assigned once, when the symbol is added to a scope.
    pub fully_qualified: Option<String>,
    /// The scope the symbol was added to (non-owning back reference).
    pub table: Option<ScopeId>,
}

impl Symbol {
    pub fn variable(name: Name, ty: TypeId) -> Self {
        Self::new(name, SymbolKind::Variable { ty })
    }

    pub fn function(name: Name, fn_ty: TypeId) -> Self {
        Self::new(name, SymbolKind::Function { fn_ty, this: None })
    }

    pub fn type_symbol(name: Name, ty: TypeId) -> Self {
        Self::new(name, SymbolKind::Type { ty })
    }

    pub fn template(name: Name, node: NodeId) -> Self {
        Self::new(name, SymbolKind::Template { node })
    }

    pub fn namespace(name: Name, scope: ScopeId) -> Self {
        Self::new(name, SymbolKind::Namespace { scope })
    }

    fn new(name: Name, kind: SymbolKind) -> Self {
        Self {
            name,
            kind,
            storage: StorageKind::NotSet,
            external: false,
            fully_qualified: None,
            table: None,
        }
    }

    pub fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function { .. })
    }

    pub fn is_type(&self) -> bool {
        matches!(self.kind, SymbolKind::Type { .. })
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self.kind, SymbolKind::Namespace { .. })
    }

    pub fn is_template(&self) -> bool {
        matches!(self.kind, SymbolKind::Template { .. })
    }
}

/// One lexical scope: an ordered name→symbol map plus a parent pointer.
#[derive(Debug)]
pub struct SymbolTable {
    pub parent: Option<ScopeId>,
    pub storage: StorageKind,
    /// Lazily assigned; anonymous scopes get a unique synthesized name.
    name: Option<String>,
    pub symbols: IndexMap<Name, SymbolId>,
}

impl SymbolTable {
    pub fn new(storage: StorageKind) -> Self {
        Self {
            parent: None,
            storage,
            name: None,
            symbols: IndexMap::new(),
        }
    }

    pub fn named(storage: StorageKind, name: String) -> Self {
        Self {
            parent: None,
            storage,
            name: Some(name),
            symbols: IndexMap::new(),
        }
    }
}

impl AstContext {
    pub fn new_scope(&mut self, storage: StorageKind) -> ScopeId {
        self.scopes.push(SymbolTable::new(storage))
    }

    pub fn new_named_scope(&mut self, storage: StorageKind, name: String) -> ScopeId {
        self.scopes.push(SymbolTable::named(storage, name))
    }

    pub fn scope(&self, id: ScopeId) -> &SymbolTable {
        &self.scopes[id]
    }

    pub fn scope_set_parent(&mut self, scope: ScopeId, parent: ScopeId) {
        assert!(scope != parent, "a scope cannot be its own parent");
        self.scopes[scope].parent = Some(parent);
    }

    /// The scope's name, synthesizing a unique one on first use.
    pub fn scope_name(&mut self, scope: ScopeId) -> String {
        if self.scopes[scope].name.is_none() {
            self.scopes[scope].name = Some(unique_name("scope"));
        }
        self.scopes[scope].name.clone().unwrap()
    }

    /// `parent::…::name` for the scope chain.
    pub fn scope_full_name(&mut self, scope: ScopeId) -> String {
        let mut chain = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            chain.push(self.scope_name(id));
            current = self.scopes[id].parent;
        }
        chain.reverse();
        chain.join(SCOPE_SEPARATOR)
    }

    /// Find a symbol in this scope only.
    pub fn find_in_current(&self, scope: ScopeId, name: Name) -> Option<SymbolId> {
        self.scopes[scope].symbols.get(&name).copied()
    }

    /// Find a symbol in this scope or any parent.
    pub fn find_in_current_or_parents(&self, scope: ScopeId, name: Name) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(found) = self.scopes[id].symbols.get(&name) {
                return Some(*found);
            }
            current = self.scopes[id].parent;
        }
        None
    }

    /// The scope from which names are logically looked up: climbs past
    /// template-parameter scopes.
    pub fn logical_scope(&self, scope: ScopeId) -> ScopeId {
        let mut current = scope;
        loop {
            if self.scopes[current].storage != StorageKind::TemplateParameter {
                return current;
            }
            current = self.scopes[current]
                .parent
                .expect("topmost scope is a template-parameter scope with no parent");
        }
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id]
    }

    /// Add an existing symbol to a scope, recording the back reference and
    /// assigning the fully-qualified name once.
    pub fn add_symbol(&mut self, scope: ScopeId, symbol: SymbolId) {
        let name = self.symbols[symbol].name;
        if self.symbols[symbol].fully_qualified.is_none() {
            let full = self.scope_full_name(scope);
            let fq = if full.is_empty() {
                format!("{}{}", SCOPE_SEPARATOR, name.as_str())
            } else {
                format!("{}{}{}", full, SCOPE_SEPARATOR, name.as_str())
            };
            self.symbols[symbol].fully_qualified = Some(fq);
        }
        self.symbols[symbol].table = Some(scope);
        self.scopes[scope].symbols.insert(name, symbol);
    }

    /// Allocate a symbol and add it to a scope in one step.
    pub fn declare(&mut self, scope: ScopeId, symbol: Symbol) -> SymbolId {
        let id = self.symbols.push(symbol);
        self.add_symbol(scope, id);
        id
    }

    /// The type a symbol contributes to expressions referencing it.
    pub fn symbol_type(&self, id: SymbolId) -> TypeId {
        match &self.symbols[id].kind {
            SymbolKind::Variable { ty } => *ty,
            SymbolKind::Function { fn_ty, .. } => *fn_ty,
            SymbolKind::Type { ty } => self.types.actual(*ty),
            SymbolKind::Template { .. } | SymbolKind::Namespace { .. } => TypeTable::VOID,
        }
    }

    /// Clone a module-level symbol for export into the world's global
    /// scope. The clone carries the `external` flag so later modules emit
    /// it as an extern declaration.
    pub fn clone_for_export(&mut self, id: SymbolId) -> SymbolId {
        let source = &self.symbols[id];
        debug_assert_eq!(source.storage, StorageKind::Global);
        let clone = Symbol {
            external: true,
            table: None,
            ..source.clone()
        };
        self.symbols.push(clone)
    }

    /// Variable symbols of a scope, in declaration order.
    pub fn scope_variables(&self, scope: ScopeId) -> Vec<SymbolId> {
        self.scope_symbols_filtered(scope, Symbol::is_variable)
    }

    /// Function symbols of a scope, in declaration order.
    pub fn scope_functions(&self, scope: ScopeId) -> Vec<SymbolId> {
        self.scope_symbols_filtered(scope, Symbol::is_function)
    }

    /// Type symbols of a scope, in declaration order.
    pub fn scope_types(&self, scope: ScopeId) -> Vec<SymbolId> {
        self.scope_symbols_filtered(scope, Symbol::is_type)
    }

    /// All symbols of a scope, in declaration order.
    pub fn scope_symbols(&self, scope: ScopeId) -> Vec<SymbolId> {
        self.scopes[scope].symbols.values().copied().collect()
    }

    fn scope_symbols_filtered(
        &self,
        scope: ScopeId,
        filter: impl Fn(&Symbol) -> bool,
    ) -> Vec<SymbolId> {
        self.scopes[scope]
            .symbols
            .values()
            .copied()
            .filter(|s| filter(&self.symbols[*s]))
            .collect()
    }
}
