//! The anode type model.
//!
//! Types live in a [`TypeTable`] and are referred to by [`TypeId`]. The five
//! scalar types (plus the `Unresolved` sentinel) are interned once at table
//! construction, so scalar identity is id equality; class and generic types
//! are created once per defining AST node, so their identity is id equality
//! as well. The only types created in bulk are resolution-deferred
//! placeholders, which collapse through [`TypeTable::actual`].

use anodec_util::{define_idx, IndexVec, Name};
use indexmap::IndexMap;

use crate::{NodeId, SymbolId};

define_idx!(
    /// Index of a type in the [`TypeTable`].
    TypeId
);

/// Primitive type tags, listed in operand-priority order: in a binary
/// expression mixing two scalars, the higher-priority side wins the implicit
/// promotion (`int * float` is a `float`, `float * double` a `double`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Primitive {
    NotAPrimitive = 0,
    Void = 1,
    Bool = 2,
    Int32 = 3,
    Float = 4,
    Double = 5,
}

impl Primitive {
    /// Operand priority used by the implicit-promotion rules.
    #[inline]
    pub fn priority(self) -> u8 {
        self as u8
    }
}

/// One field of a class type. Ordinals follow declaration order and drive
/// struct layout at the emitter boundary.
#[derive(Clone, Debug)]
pub struct ClassField {
    pub name: Name,
    pub ty: TypeId,
    pub ordinal: u32,
}

/// A complete (non-generic, or fully expanded) class type.
#[derive(Clone, Debug)]
pub struct ClassType {
    /// Id of the defining AST node; class identity.
    pub node: NodeId,
    pub name: Name,
    /// Fields in declaration order.
    pub fields: Vec<ClassField>,
    /// Methods by name; values are function symbols.
    pub methods: IndexMap<Name, SymbolId>,
    /// The generic this class was expanded from, if any.
    pub generic_of: Option<TypeId>,
    /// Concrete type arguments of the expansion, if any.
    pub type_args: Vec<TypeId>,
}

/// An uninstantiated class template.
#[derive(Clone, Debug)]
pub struct GenericType {
    /// Id of the defining AST node; generic identity.
    pub node: NodeId,
    pub name: Name,
    pub param_names: Vec<Name>,
    /// Cache of expansions, keyed by structural equality of the argument
    /// list.
    pub expansions: Vec<(Vec<TypeId>, TypeId)>,
}

/// A type.
#[derive(Clone, Debug)]
pub enum Type {
    /// Sentinel for types that have not been resolved. Never participates
    /// in arithmetic, casts, or equality (not even with itself).
    Unresolved,
    /// A primitive scalar.
    Scalar {
        name: Name,
        primitive: Primitive,
        arithmetic: bool,
    },
    /// A first-class function type.
    Function { ret: TypeId, params: Vec<TypeId> },
    /// A record type.
    Class(ClassType),
    /// An uninstantiated class template.
    Generic(GenericType),
    /// Placeholder standing in for a type until resolution runs. `actual`
    /// stays `None` until the type-resolution pass fills it in.
    Deferred {
        actual: Option<TypeId>,
        type_args: Vec<TypeId>,
    },
}

/// The process-wide table of types.
pub struct TypeTable {
    types: IndexVec<TypeId, Type>,
}

impl TypeTable {
    pub const UNRESOLVED: TypeId = TypeId(0);
    pub const VOID: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const INT32: TypeId = TypeId(3);
    pub const FLOAT: TypeId = TypeId(4);
    pub const DOUBLE: TypeId = TypeId(5);

    pub fn new() -> Self {
        let mut types = IndexVec::new();
        let scalars: [(&str, Primitive, bool); 6] = [
            ("<unresolved type>", Primitive::NotAPrimitive, false),
            ("void", Primitive::Void, false),
            ("bool", Primitive::Bool, false),
            ("int", Primitive::Int32, true),
            ("float", Primitive::Float, true),
            ("double", Primitive::Double, true),
        ];
        for (i, (name, primitive, arithmetic)) in scalars.into_iter().enumerate() {
            let id: TypeId = if i == 0 {
                types.push(Type::Unresolved)
            } else {
                types.push(Type::Scalar {
                    name: Name::intern(name),
                    primitive,
                    arithmetic,
                })
            };
            debug_assert_eq!(id.0 as usize, i);
        }
        Self { types }
    }

    /// Resolve a primitive type keyword to its scalar id.
    pub fn scalar_from_keyword(keyword: &str) -> Option<TypeId> {
        match keyword {
            "void" => Some(Self::VOID),
            "bool" => Some(Self::BOOL),
            "int" => Some(Self::INT32),
            "float" => Some(Self::FLOAT),
            "double" => Some(Self::DOUBLE),
            _ => None,
        }
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id]
    }

    fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id]
    }

    /// Collapse resolution-deferred indirections. Every type query goes
    /// through this. An unresolved placeholder collapses to
    /// [`TypeTable::UNRESOLVED`].
    pub fn actual(&self, id: TypeId) -> TypeId {
        match &self.types[id] {
            Type::Deferred { actual: Some(t), .. } => self.actual(*t),
            Type::Deferred { actual: None, .. } => Self::UNRESOLVED,
            _ => id,
        }
    }

    /// True once a deferred placeholder points at a real type.
    pub fn is_resolved(&self, id: TypeId) -> bool {
        self.actual(id) != Self::UNRESOLVED
    }

    /// Type equality. The unresolved sentinel equals nothing, itself
    /// included; scalars, classes and generics compare by identity; function
    /// types compare by return type.
    pub fn is_same_type(&self, a: TypeId, b: TypeId) -> bool {
        let a = self.actual(a);
        let b = self.actual(b);
        if a == Self::UNRESOLVED || b == Self::UNRESOLVED {
            return false;
        }
        if a == b {
            return true;
        }
        match (&self.types[a], &self.types[b]) {
            (Type::Function { ret: ra, .. }, Type::Function { ret: rb, .. }) => {
                self.is_same_type(*ra, *rb)
            }
            _ => false,
        }
    }

    /// Primitive tag of the type (after collapsing).
    pub fn primitive(&self, id: TypeId) -> Primitive {
        match &self.types[self.actual(id)] {
            Type::Scalar { primitive, .. } => *primitive,
            _ => Primitive::NotAPrimitive,
        }
    }

    pub fn is_primitive(&self, id: TypeId) -> bool {
        self.primitive(id) != Primitive::NotAPrimitive
    }

    pub fn is_void(&self, id: TypeId) -> bool {
        self.primitive(id) == Primitive::Void
    }

    pub fn is_class(&self, id: TypeId) -> bool {
        matches!(self.types[self.actual(id)], Type::Class(_))
    }

    pub fn is_function(&self, id: TypeId) -> bool {
        matches!(self.types[self.actual(id)], Type::Function { .. })
    }

    pub fn is_generic(&self, id: TypeId) -> bool {
        matches!(self.types[self.actual(id)], Type::Generic(_))
    }

    pub fn can_do_arithmetic(&self, id: TypeId) -> bool {
        matches!(
            self.types[self.actual(id)],
            Type::Scalar { arithmetic: true, .. }
        )
    }

    /// Whether a value of `from` may be implicitly cast to `to`.
    ///
    /// Scalars only. Same type never needs a cast; `bool` casts to nothing;
    /// everything else casts to `bool` or widens toward a higher-priority
    /// scalar.
    pub fn can_implicit_cast(&self, from: TypeId, to: TypeId) -> bool {
        let (fp, tp) = match (self.scalar_primitive(from), self.scalar_primitive(to)) {
            (Some(f), Some(t)) => (f, t),
            _ => return false,
        };
        if fp == tp {
            return false;
        }
        if fp == Primitive::Bool {
            return false;
        }
        if tp == Primitive::Bool {
            return true;
        }
        fp.priority() <= tp.priority()
    }

    /// Whether a value of `from` may be explicitly cast to `to`. Covers the
    /// narrowing direction; explicit cast expressions also accept anything
    /// [`TypeTable::can_implicit_cast`] accepts.
    pub fn can_explicit_cast(&self, from: TypeId, to: TypeId) -> bool {
        let (fp, tp) = match (self.scalar_primitive(from), self.scalar_primitive(to)) {
            (Some(f), Some(t)) => (f, t),
            _ => return false,
        };
        if fp == tp {
            return false;
        }
        if fp == Primitive::Bool {
            return false;
        }
        fp.priority() >= tp.priority()
    }

    fn scalar_primitive(&self, id: TypeId) -> Option<Primitive> {
        match &self.types[self.actual(id)] {
            Type::Scalar { primitive, .. } => Some(*primitive),
            _ => None,
        }
    }

    /// Create a resolution-deferred placeholder carrying the types of its
    /// generic arguments (empty for plain references).
    pub fn new_deferred(&mut self, type_args: Vec<TypeId>) -> TypeId {
        self.types.push(Type::Deferred {
            actual: None,
            type_args,
        })
    }

    /// Argument types a deferred placeholder was created with.
    pub fn deferred_type_args(&self, id: TypeId) -> &[TypeId] {
        match &self.types[id] {
            Type::Deferred { type_args, .. } => type_args,
            _ => &[],
        }
    }

    /// Point a deferred placeholder at its resolved type.
    ///
    /// Resolution is monotonic: re-resolving is a programmer error, with one
    /// sanctioned exception: a placeholder resolved to a generic may later
    /// be rewritten to one of that generic's class expansions.
    pub fn resolve_deferred(&mut self, deferred: TypeId, to: TypeId) {
        debug_assert!(deferred != to, "a deferred type cannot resolve to itself");
        match self.get(deferred) {
            Type::Deferred { actual: None, .. } => {}
            Type::Deferred { actual: Some(prev), .. } => {
                let prev_is_generic = self.is_generic(*prev);
                let to_is_class = self.is_class(to);
                assert!(
                    prev_is_generic && to_is_class,
                    "attempted to re-resolve an already-resolved deferred type"
                );
            }
            _ => panic!("resolve_deferred called on a non-deferred type"),
        }
        match self.get_mut(deferred) {
            Type::Deferred { actual, .. } => *actual = Some(to),
            _ => unreachable!(),
        }
    }

    pub fn new_function(&mut self, ret: TypeId, params: Vec<TypeId>) -> TypeId {
        self.types.push(Type::Function { ret, params })
    }

    pub fn function_return(&self, id: TypeId) -> TypeId {
        match &self.types[self.actual(id)] {
            Type::Function { ret, .. } => *ret,
            _ => Self::UNRESOLVED,
        }
    }

    pub fn function_params(&self, id: TypeId) -> Vec<TypeId> {
        match &self.types[self.actual(id)] {
            Type::Function { params, .. } => params.clone(),
            _ => Vec::new(),
        }
    }

    pub fn new_class(&mut self, node: NodeId, name: Name, type_args: Vec<TypeId>) -> TypeId {
        self.types.push(Type::Class(ClassType {
            node,
            name,
            fields: Vec::new(),
            methods: IndexMap::new(),
            generic_of: None,
            type_args,
        }))
    }

    pub fn new_generic(&mut self, node: NodeId, name: Name, param_names: Vec<Name>) -> TypeId {
        self.types.push(Type::Generic(GenericType {
            node,
            name,
            param_names,
            expansions: Vec::new(),
        }))
    }

    pub fn class(&self, id: TypeId) -> Option<&ClassType> {
        match &self.types[self.actual(id)] {
            Type::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn class_mut(&mut self, id: TypeId) -> Option<&mut ClassType> {
        let actual = self.actual(id);
        match &mut self.types[actual] {
            Type::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn generic(&self, id: TypeId) -> Option<&GenericType> {
        match &self.types[self.actual(id)] {
            Type::Generic(g) => Some(g),
            _ => None,
        }
    }

    pub fn class_add_field(&mut self, class: TypeId, name: Name, ty: TypeId) {
        let c = self.class_mut(class).expect("class_add_field on non-class");
        let ordinal = c.fields.len() as u32;
        c.fields.push(ClassField { name, ty, ordinal });
    }

    pub fn class_find_field(&self, class: TypeId, name: Name) -> Option<&ClassField> {
        self.class(class)?.fields.iter().find(|f| f.name == name)
    }

    pub fn class_add_method(&mut self, class: TypeId, name: Name, symbol: SymbolId) {
        let c = self.class_mut(class).expect("class_add_method on non-class");
        c.methods.insert(name, symbol);
    }

    pub fn class_find_method(&self, class: TypeId, name: Name) -> Option<SymbolId> {
        self.class(class)?.methods.get(&name).copied()
    }

    pub fn set_generic_of(&mut self, class: TypeId, generic: TypeId) {
        let c = self.class_mut(class).expect("set_generic_of on non-class");
        c.generic_of = Some(generic);
    }

    /// Look up a cached expansion by structural equality of the argument
    /// list.
    pub fn generic_find_expansion(&self, generic: TypeId, args: &[TypeId]) -> Option<TypeId> {
        let g = self.generic(generic)?;
        for (cached_args, class) in &g.expansions {
            if cached_args.len() == args.len()
                && cached_args
                    .iter()
                    .zip(args)
                    .all(|(a, b)| self.is_same_type(*a, *b))
            {
                return Some(*class);
            }
        }
        None
    }

    pub fn generic_add_expansion(&mut self, generic: TypeId, args: Vec<TypeId>, class: TypeId) {
        let actual = self.actual(generic);
        match &mut self.types[actual] {
            Type::Generic(g) => g.expansions.push((args, class)),
            _ => panic!("generic_add_expansion on non-generic"),
        }
    }

    /// Display name, with generic arguments rendered for expanded classes.
    pub fn display_name(&self, id: TypeId) -> String {
        match &self.types[id] {
            Type::Unresolved => "<unresolved type>".to_owned(),
            Type::Scalar { name, .. } => name.as_str().to_owned(),
            Type::Function { ret, .. } => format!("func:{}", self.display_name(*ret)),
            Type::Generic(g) => g.name.as_str().to_owned(),
            Type::Class(c) => {
                let mut out = c.name.as_str().to_owned();
                if !c.type_args.is_empty() {
                    out.push('<');
                    for (i, arg) in c.type_args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push_str(&self.display_name(self.actual(*arg)));
                    }
                    out.push('>');
                }
                out
            }
            Type::Deferred { actual: Some(t), .. } => self.display_name(self.actual(*t)),
            Type::Deferred { actual: None, .. } => "<unresolved type>".to_owned(),
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anodec_util::Idx;

    #[test]
    fn test_scalar_singletons() {
        let t = TypeTable::new();
        assert!(t.is_same_type(TypeTable::INT32, TypeTable::INT32));
        assert!(!t.is_same_type(TypeTable::INT32, TypeTable::FLOAT));
        assert_eq!(t.primitive(TypeTable::BOOL), Primitive::Bool);
        assert!(t.can_do_arithmetic(TypeTable::DOUBLE));
        assert!(!t.can_do_arithmetic(TypeTable::BOOL));
    }

    #[test]
    fn test_unresolved_equals_nothing() {
        let t = TypeTable::new();
        assert!(!t.is_same_type(TypeTable::UNRESOLVED, TypeTable::UNRESOLVED));
        assert!(!t.is_same_type(TypeTable::UNRESOLVED, TypeTable::INT32));
    }

    #[test]
    fn test_scalar_keyword_lookup() {
        assert_eq!(TypeTable::scalar_from_keyword("int"), Some(TypeTable::INT32));
        assert_eq!(TypeTable::scalar_from_keyword("void"), Some(TypeTable::VOID));
        assert_eq!(TypeTable::scalar_from_keyword("Widget"), None);
    }

    #[test]
    fn test_implicit_cast_lattice() {
        let t = TypeTable::new();
        // widening
        assert!(t.can_implicit_cast(TypeTable::INT32, TypeTable::FLOAT));
        assert!(t.can_implicit_cast(TypeTable::FLOAT, TypeTable::DOUBLE));
        assert!(!t.can_implicit_cast(TypeTable::DOUBLE, TypeTable::FLOAT));
        // anything scalar casts to bool
        assert!(t.can_implicit_cast(TypeTable::INT32, TypeTable::BOOL));
        assert!(t.can_implicit_cast(TypeTable::DOUBLE, TypeTable::BOOL));
        // bool casts to nothing
        assert!(!t.can_implicit_cast(TypeTable::BOOL, TypeTable::INT32));
        // identity is not a cast
        assert!(!t.can_implicit_cast(TypeTable::INT32, TypeTable::INT32));
    }

    #[test]
    fn test_explicit_cast_lattice() {
        let t = TypeTable::new();
        assert!(t.can_explicit_cast(TypeTable::DOUBLE, TypeTable::INT32));
        assert!(!t.can_explicit_cast(TypeTable::BOOL, TypeTable::BOOL));
        assert!(!t.can_explicit_cast(TypeTable::BOOL, TypeTable::INT32));
        // widening handled by the implicit predicate
        assert!(!t.can_explicit_cast(TypeTable::INT32, TypeTable::DOUBLE));
    }

    #[test]
    fn test_deferred_resolution() {
        let mut t = TypeTable::new();
        let d = t.new_deferred(Vec::new());
        assert!(!t.is_resolved(d));
        assert_eq!(t.actual(d), TypeTable::UNRESOLVED);
        t.resolve_deferred(d, TypeTable::FLOAT);
        assert!(t.is_resolved(d));
        assert_eq!(t.actual(d), TypeTable::FLOAT);
        assert!(t.is_same_type(d, TypeTable::FLOAT));
    }

    #[test]
    fn test_deferred_chain_collapses() {
        let mut t = TypeTable::new();
        let inner = t.new_deferred(Vec::new());
        let outer = t.new_deferred(Vec::new());
        t.resolve_deferred(outer, inner);
        assert!(!t.is_resolved(outer));
        t.resolve_deferred(inner, TypeTable::INT32);
        assert_eq!(t.actual(outer), TypeTable::INT32);
    }

    #[test]
    #[should_panic]
    fn test_double_resolve_panics() {
        let mut t = TypeTable::new();
        let d = t.new_deferred(Vec::new());
        t.resolve_deferred(d, TypeTable::INT32);
        t.resolve_deferred(d, TypeTable::FLOAT);
    }

    #[test]
    fn test_generic_to_class_rewrite_allowed() {
        let mut t = TypeTable::new();
        let node = NodeId::from_usize(0);
        let generic = t.new_generic(node, Name::intern("Stack"), vec![Name::intern("T")]);
        let class = t.new_class(node, Name::intern("Stack"), vec![TypeTable::INT32]);
        let d = t.new_deferred(vec![TypeTable::INT32]);
        t.resolve_deferred(d, generic);
        t.resolve_deferred(d, class);
        assert_eq!(t.actual(d), class);
    }

    #[test]
    fn test_expansion_cache_structural_match() {
        let mut t = TypeTable::new();
        let node = NodeId::from_usize(0);
        let generic = t.new_generic(node, Name::intern("Pair"), vec![Name::intern("T")]);
        let class = t.new_class(node, Name::intern("Pair"), vec![TypeTable::INT32]);
        t.generic_add_expansion(generic, vec![TypeTable::INT32], class);

        assert_eq!(
            t.generic_find_expansion(generic, &[TypeTable::INT32]),
            Some(class)
        );
        assert_eq!(t.generic_find_expansion(generic, &[TypeTable::FLOAT]), None);

        // a deferred pointing at int matches structurally
        let d = t.new_deferred(Vec::new());
        t.resolve_deferred(d, TypeTable::INT32);
        assert_eq!(t.generic_find_expansion(generic, &[d]), Some(class));
    }

    #[test]
    fn test_function_type_identity_by_return() {
        let mut t = TypeTable::new();
        let f1 = t.new_function(TypeTable::INT32, vec![TypeTable::FLOAT]);
        let f2 = t.new_function(TypeTable::INT32, vec![]);
        let f3 = t.new_function(TypeTable::VOID, vec![]);
        assert!(t.is_same_type(f1, f2));
        assert!(!t.is_same_type(f1, f3));
    }

    #[test]
    fn test_display_name() {
        let mut t = TypeTable::new();
        let node = NodeId::from_usize(0);
        let class = t.new_class(node, Name::intern("Stack"), vec![TypeTable::INT32]);
        assert_eq!(t.display_name(class), "Stack<int>");
        assert_eq!(t.display_name(TypeTable::INT32), "int");
        let f = t.new_function(TypeTable::BOOL, vec![]);
        assert_eq!(t.display_name(f), "func:bool");
    }
}
