//! AST node definitions.
//!
//! The language is expression-oriented: statements are expressions, and a
//! module body is one big compound. Nodes live in the [`AstContext`] arena
//! and reference children by [`NodeId`]; each node carries a parent link
//! installed by a dedicated pass.

use anodec_util::SourceSpan;

use crate::ident::{Ident, QualifiedName};
use crate::scope::StorageKind;
use crate::types::{TypeId, TypeTable};
use crate::{AstContext, NodeId, ScopeId, SymbolId, TypeRefId};

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    PreIncrement,
    PreDecrement,
}

impl UnaryOp {
    pub fn display(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::PreIncrement => "++",
            UnaryOp::PreDecrement => "--",
        }
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    LogicalAnd,
    LogicalOr,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

/// Arithmetic operations always evaluate both operands; logical operations
/// may short-circuit. Emitters lower the two shapes differently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryExprKind {
    Arithmetic,
    Logical,
}

impl BinaryOp {
    /// Comparisons yield `bool` regardless of operand type.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
        )
    }

    pub fn expr_kind(self) -> BinaryExprKind {
        match self {
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => BinaryExprKind::Logical,
            _ => BinaryExprKind::Arithmetic,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            BinaryOp::Assign => "=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::LessThanOrEqual => "<=",
        }
    }
}

/// Whether a variable reference reads or writes its storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableAccess {
    Read,
    Write,
}

/// Whether a cast was written by the user or inserted by the compiler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastKind {
    Explicit,
    Implicit,
}

/// The two ways a template body gets expanded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpansionKind {
    /// A generic class reference (`Stack<int>`).
    AnonymousTemplate,
    /// An `expand Name<…>;` statement.
    NamedTemplate,
}

/// A function parameter.
#[derive(Clone, Debug)]
pub struct Param {
    pub span: SourceSpan,
    pub name: Ident,
    pub type_ref: TypeRefId,
    pub symbol: Option<SymbolId>,
}

/// A template parameter (a type name bound at expansion).
#[derive(Clone, Copy, Debug)]
pub struct TemplateParam {
    pub span: SourceSpan,
    pub name: Ident,
}

/// One bound template argument: the parameter it binds and the type ref
/// supplying the concrete type.
#[derive(Clone, Copy, Debug)]
pub struct TemplateArg {
    pub param_name: Ident,
    pub type_ref: TypeRefId,
}

/// A resolved class-field reference on a `Dot` expression.
#[derive(Clone, Copy, Debug)]
pub struct FieldRef {
    /// The class the field belongs to.
    pub class: TypeId,
    /// Field ordinal within the class layout.
    pub ordinal: u32,
    /// Field type.
    pub ty: TypeId,
}

/// A node in the AST.
#[derive(Debug)]
pub struct Node {
    pub span: SourceSpan,
    /// Enclosing node; installed by the parent-link pass.
    pub parent: Option<NodeId>,
    pub kind: ExprKind,
}

/// Every kind of expression-statement.
#[derive(Debug)]
pub enum ExprKind {
    LiteralBool {
        value: bool,
    },
    LiteralInt32 {
        value: i32,
    },
    LiteralFloat {
        value: f32,
    },
    /// Reference to a previously declared variable. May be
    /// namespace-qualified.
    VariableRef {
        name: QualifiedName,
        access: VariableAccess,
        symbol: Option<SymbolId>,
    },
    /// Declares a variable and references it.
    VariableDecl {
        name: Ident,
        type_ref: TypeRefId,
        access: VariableAccess,
        symbol: Option<SymbolId>,
    },
    /// Callee of a method call; bound to a function symbol during
    /// dot-expression resolution.
    MethodRef {
        name: Ident,
        symbol: Option<SymbolId>,
    },
    Unary {
        op: UnaryOp,
        op_span: SourceSpan,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        op_span: SourceSpan,
        lhs: NodeId,
        rhs: NodeId,
    },
    /// Member access; resolves to a class field.
    Dot {
        dot_span: SourceSpan,
        lvalue: NodeId,
        member: Ident,
        field: Option<FieldRef>,
        is_write: bool,
    },
    FuncCall {
        open_paren_span: SourceSpan,
        /// Receiver, for method calls.
        instance: Option<NodeId>,
        callee: NodeId,
        args: Vec<NodeId>,
    },
    Cast {
        to: TypeRefId,
        value: NodeId,
        kind: CastKind,
    },
    /// Heap-allocates a class instance via the external allocator.
    New {
        type_ref: TypeRefId,
    },
    If {
        cond: NodeId,
        then: NodeId,
        els: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    Assert {
        cond: NodeId,
    },
    /// `{ … }`: a series of expressions within its own lexical scope.
    Compound {
        scope: ScopeId,
        exprs: Vec<NodeId>,
    },
    /// Like `Compound` but introduces no scope.
    ExpressionList {
        exprs: Vec<NodeId>,
    },
    FuncDef {
        name: Ident,
        return_ref: TypeRefId,
        params: Vec<Param>,
        body: NodeId,
        param_scope: ScopeId,
        fn_type: TypeId,
        symbol: Option<SymbolId>,
    },
    /// A non-generic class, or a fully expanded generic.
    CompleteClassDef {
        name: Ident,
        body: NodeId,
        template_args: Vec<TemplateArg>,
        defined_type: TypeId,
    },
    /// A parameterized class awaiting expansion.
    GenericClassDef {
        name: Ident,
        body: NodeId,
        params: Vec<TemplateParam>,
        defined_type: TypeId,
        symbol: Option<SymbolId>,
    },
    Namespace {
        name: QualifiedName,
        body: NodeId,
        scope: Option<ScopeId>,
    },
    /// `template (T) { … }`, expandable only through generic classes
    /// defined inside it.
    AnonymousTemplate {
        params: Vec<TemplateParam>,
        body: NodeId,
    },
    /// `template Name(T) { … }`, expanded by `expand Name<…>;`.
    NamedTemplate {
        name: Ident,
        params: Vec<TemplateParam>,
        body: NodeId,
    },
    /// `expand Name<…>;` binds to a named template and receives a
    /// cloned, specialized copy of its body.
    TemplateExpansion {
        name: QualifiedName,
        type_args: Vec<TypeRefId>,
        /// The referenced template node, once resolved.
        template: Option<NodeId>,
        /// The cloned and specialized body, once expanded.
        expanded: Option<NodeId>,
        /// Scope holding the argument bindings of this expansion.
        param_scope: ScopeId,
    },
}

impl AstContext {
    /// Allocate a node.
    pub fn alloc(&mut self, span: SourceSpan, kind: ExprKind) -> NodeId {
        self.nodes.push(Node {
            span,
            parent: None,
            kind,
        })
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> &ExprKind {
        &self.nodes[id].kind
    }

    pub fn span(&self, id: NodeId) -> SourceSpan {
        self.nodes[id].span
    }

    pub fn set_parent(&mut self, node: NodeId, parent: NodeId) {
        debug_assert!(node != parent);
        self.nodes[node].parent = Some(parent);
    }

    /// Allocate a compound expression together with its scope.
    pub fn compound(&mut self, span: SourceSpan, storage: StorageKind, exprs: Vec<NodeId>) -> NodeId {
        let scope = self.new_scope(storage);
        self.alloc(span, ExprKind::Compound { scope, exprs })
    }

    /// Allocate a named-scope compound (used for expansion wrappers).
    pub fn named_compound(
        &mut self,
        span: SourceSpan,
        storage: StorageKind,
        name: String,
        exprs: Vec<NodeId>,
    ) -> NodeId {
        let scope = self.new_named_scope(storage, name);
        self.alloc(span, ExprKind::Compound { scope, exprs })
    }

    /// Allocate a function definition: builds its parameter scope and its
    /// function type from the (possibly still deferred) type refs.
    pub fn func_def(
        &mut self,
        span: SourceSpan,
        name: Ident,
        return_ref: TypeRefId,
        params: Vec<Param>,
        body: NodeId,
    ) -> NodeId {
        let param_scope = self.new_named_scope(
            StorageKind::Argument,
            format!("{}-parameters", name.text.as_str()),
        );
        let ret_ty = self.type_ref_type(return_ref);
        let param_tys = params.iter().map(|p| self.type_ref_type(p.type_ref)).collect();
        let fn_type = self.types.new_function(ret_ty, param_tys);
        self.alloc(
            span,
            ExprKind::FuncDef {
                name,
                return_ref,
                params,
                body,
                param_scope,
                fn_type,
                symbol: None,
            },
        )
    }

    /// Allocate a complete class definition and its class type.
    pub fn complete_class_def(
        &mut self,
        span: SourceSpan,
        name: Ident,
        template_args: Vec<TemplateArg>,
        body: NodeId,
    ) -> NodeId {
        let node = self.nodes.next_index();
        let arg_types = template_args
            .iter()
            .map(|a| self.type_ref_type(a.type_ref))
            .collect();
        let defined_type = self.types.new_class(node, name.text, arg_types);
        let id = self.alloc(
            span,
            ExprKind::CompleteClassDef {
                name,
                body,
                template_args,
                defined_type,
            },
        );
        debug_assert_eq!(id, node);
        id
    }

    /// Allocate a generic class definition and its generic type.
    pub fn generic_class_def(
        &mut self,
        span: SourceSpan,
        name: Ident,
        params: Vec<TemplateParam>,
        body: NodeId,
    ) -> NodeId {
        let node = self.nodes.next_index();
        let param_names = params.iter().map(|p| p.name.text).collect();
        let defined_type = self.types.new_generic(node, name.text, param_names);
        let id = self.alloc(
            span,
            ExprKind::GenericClassDef {
                name,
                body,
                params,
                defined_type,
                symbol: None,
            },
        );
        debug_assert_eq!(id, node);
        id
    }

    /// Allocate a template expansion together with its parameter scope.
    pub fn template_expansion(
        &mut self,
        span: SourceSpan,
        name: QualifiedName,
        type_args: Vec<TypeRefId>,
    ) -> NodeId {
        let scope_name = format!(
            "{}{}expanded_arguments",
            name.qualified(),
            crate::scope::SCOPE_SEPARATOR
        );
        let param_scope = self.new_named_scope(StorageKind::TemplateParameter, scope_name);
        self.alloc(
            span,
            ExprKind::TemplateExpansion {
                name,
                type_args,
                template: None,
                expanded: None,
                param_scope,
            },
        )
    }

    /// The type an expression yields.
    ///
    /// Declarations, control flow, namespaces and template definitions are
    /// void by construction; everything else derives from operands, bound
    /// symbols or resolved type refs. Unresolvable inputs yield the
    /// unresolved sentinel rather than panicking, so error paths can keep
    /// collecting diagnostics.
    pub fn expr_type(&self, id: NodeId) -> TypeId {
        match &self.nodes[id].kind {
            ExprKind::LiteralBool { .. } => TypeTable::BOOL,
            ExprKind::LiteralInt32 { .. } => TypeTable::INT32,
            ExprKind::LiteralFloat { .. } => TypeTable::FLOAT,
            ExprKind::VariableRef { symbol, .. } | ExprKind::MethodRef { symbol, .. } => symbol
                .map(|s| self.symbol_type(s))
                .unwrap_or(TypeTable::UNRESOLVED),
            ExprKind::VariableDecl { type_ref, .. } => self.type_ref_type(*type_ref),
            // Unary expressions are boolean-valued.
            ExprKind::Unary { .. } => TypeTable::BOOL,
            ExprKind::Binary { op, rhs, .. } => {
                if op.is_comparison() {
                    TypeTable::BOOL
                } else {
                    // Operand types agree after implicit-cast insertion; the
                    // rvalue's type is the operands' type.
                    self.expr_type(*rhs)
                }
            }
            ExprKind::Dot { field, .. } => {
                field.map(|f| f.ty).unwrap_or(TypeTable::UNRESOLVED)
            }
            ExprKind::FuncCall { callee, .. } => {
                let callee_ty = self.expr_type(*callee);
                if self.types.is_function(callee_ty) {
                    self.types.function_return(callee_ty)
                } else {
                    TypeTable::UNRESOLVED
                }
            }
            ExprKind::Cast { to, .. } => self.type_ref_type(*to),
            ExprKind::New { type_ref } => self.type_ref_type(*type_ref),
            ExprKind::If { then, els, .. } => match els {
                Some(els) => {
                    let then_ty = self.expr_type(*then);
                    if self.types.is_same_type(then_ty, self.expr_type(*els)) {
                        then_ty
                    } else {
                        TypeTable::VOID
                    }
                }
                None => TypeTable::VOID,
            },
            ExprKind::Compound { exprs, .. } | ExprKind::ExpressionList { exprs } => exprs
                .last()
                .map(|e| self.expr_type(*e))
                .unwrap_or(TypeTable::VOID),
            ExprKind::TemplateExpansion { expanded, .. } => expanded
                .map(|e| self.expr_type(e))
                .unwrap_or(TypeTable::VOID),
            ExprKind::While { .. }
            | ExprKind::Assert { .. }
            | ExprKind::FuncDef { .. }
            | ExprKind::CompleteClassDef { .. }
            | ExprKind::GenericClassDef { .. }
            | ExprKind::Namespace { .. }
            | ExprKind::AnonymousTemplate { .. }
            | ExprKind::NamedTemplate { .. } => TypeTable::VOID,
        }
    }

    /// Whether the expression denotes writable storage.
    pub fn can_write(&self, id: NodeId) -> bool {
        matches!(
            self.nodes[id].kind,
            ExprKind::VariableRef { .. }
                | ExprKind::VariableDecl { .. }
                | ExprKind::MethodRef { .. }
                | ExprKind::Dot { .. }
        )
    }

    /// Child nodes in traversal order. Template bodies are skipped unless
    /// `include_template_bodies` is set (the parent-link pass needs them).
    pub fn child_nodes(&self, id: NodeId, include_template_bodies: bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        match &self.nodes[id].kind {
            ExprKind::LiteralBool { .. }
            | ExprKind::LiteralInt32 { .. }
            | ExprKind::LiteralFloat { .. }
            | ExprKind::VariableRef { .. }
            | ExprKind::VariableDecl { .. }
            | ExprKind::MethodRef { .. }
            | ExprKind::New { .. } => {}
            ExprKind::Unary { operand, .. } => out.push(*operand),
            ExprKind::Binary { lhs, rhs, .. } => {
                out.push(*lhs);
                out.push(*rhs);
            }
            ExprKind::Dot { lvalue, .. } => out.push(*lvalue),
            ExprKind::FuncCall {
                instance,
                callee,
                args,
                ..
            } => {
                out.push(*callee);
                if let Some(instance) = instance {
                    out.push(*instance);
                }
                out.extend(args.iter().copied());
            }
            ExprKind::Cast { value, .. } => out.push(*value),
            ExprKind::If { cond, then, els } => {
                out.push(*cond);
                out.push(*then);
                if let Some(els) = els {
                    out.push(*els);
                }
            }
            ExprKind::While { cond, body } => {
                out.push(*cond);
                out.push(*body);
            }
            ExprKind::Assert { cond } => out.push(*cond),
            ExprKind::Compound { exprs, .. } | ExprKind::ExpressionList { exprs } => {
                out.extend(exprs.iter().copied());
            }
            ExprKind::FuncDef { body, .. } => out.push(*body),
            ExprKind::CompleteClassDef { body, .. } => out.push(*body),
            // A generic class body is template material: its type refs name
            // template parameters and resolve only in expansion clones.
            ExprKind::GenericClassDef { body, .. } => {
                if include_template_bodies {
                    out.push(*body);
                }
            }
            ExprKind::Namespace { body, .. } => out.push(*body),
            ExprKind::AnonymousTemplate { body, .. } | ExprKind::NamedTemplate { body, .. } => {
                if include_template_bodies {
                    out.push(*body);
                }
            }
            ExprKind::TemplateExpansion { expanded, .. } => {
                if let Some(expanded) = expanded {
                    out.push(*expanded);
                }
            }
        }
        out
    }

    /// Type refs attached directly to a node, in traversal order.
    pub fn node_type_refs(&self, id: NodeId) -> Vec<TypeRefId> {
        match &self.nodes[id].kind {
            ExprKind::VariableDecl { type_ref, .. } | ExprKind::New { type_ref } => {
                vec![*type_ref]
            }
            ExprKind::Cast { to, .. } => vec![*to],
            ExprKind::FuncDef {
                return_ref, params, ..
            } => {
                let mut refs = vec![*return_ref];
                refs.extend(params.iter().map(|p| p.type_ref));
                refs
            }
            ExprKind::TemplateExpansion { type_args, .. } => type_args.clone(),
            _ => Vec::new(),
        }
    }
}
