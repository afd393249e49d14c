//! Deep-cloning AST subtrees for template expansion.
//!
//! Expanding a template clones its body with fresh node ids, fresh scopes
//! and fresh (unresolved) type refs. Identifiers that named a template
//! parameter still name it in the clone; re-running the early passes over
//! the clone resolves them against the expansion's parameter scope, which
//! binds them to the concrete argument types.

use crate::node::{ExpansionKind, ExprKind, Param, TemplateArg};
use crate::{AstContext, NodeId, TypeRefId, TypeRefKind};

/// Details about the expansion a clone is being made for.
#[derive(Clone, Debug)]
pub struct TemplateExpansionContext {
    pub kind: ExpansionKind,
    pub args: Vec<TemplateArg>,
}

impl AstContext {
    /// Clone a type ref. Known refs share their type; deferred refs get a
    /// fresh unresolved placeholder.
    pub fn deep_copy_type_ref(&mut self, id: TypeRefId) -> TypeRefId {
        let (span, kind_is_known) = {
            let r = self.type_ref(id);
            (r.span, matches!(r.kind, TypeRefKind::Known { .. }))
        };
        if kind_is_known {
            let ty = self.type_ref_type(id);
            return self.known_type_ref(span, ty);
        }
        let (name, args) = match &self.type_refs[id].kind {
            TypeRefKind::Deferred { name, args, .. } => (name.clone(), args.clone()),
            TypeRefKind::Known { .. } => unreachable!(),
        };
        let cloned_args = args.iter().map(|a| self.deep_copy_type_ref(*a)).collect();
        self.deferred_type_ref(span, name, cloned_args)
    }

    fn deep_copy_param(&mut self, param: &Param, ctx: &TemplateExpansionContext) -> Param {
        let _ = ctx;
        Param {
            span: param.span,
            name: param.name,
            type_ref: self.deep_copy_type_ref(param.type_ref),
            symbol: None,
        }
    }

    /// Recursively reproduce an AST subtree for a template expansion.
    ///
    /// Symbol bindings, resolved fields and scopes are not carried over;
    /// the clone goes back through the early passes. A generic class def
    /// cloned for an anonymous expansion becomes a complete class def
    /// carrying the concrete arguments and a back-pointer to its generic;
    /// cloned for a named template expansion it stays generic, with a fresh
    /// generic type.
    pub fn deep_copy_expand(&mut self, id: NodeId, ctx: &TemplateExpansionContext) -> NodeId {
        let span = self.span(id);
        match &self.nodes[id].kind {
            ExprKind::LiteralBool { value } => {
                let value = *value;
                self.alloc(span, ExprKind::LiteralBool { value })
            }
            ExprKind::LiteralInt32 { value } => {
                let value = *value;
                self.alloc(span, ExprKind::LiteralInt32 { value })
            }
            ExprKind::LiteralFloat { value } => {
                let value = *value;
                self.alloc(span, ExprKind::LiteralFloat { value })
            }
            ExprKind::VariableRef { name, access, .. } => {
                let (name, access) = (name.clone(), *access);
                self.alloc(
                    span,
                    ExprKind::VariableRef {
                        name,
                        access,
                        symbol: None,
                    },
                )
            }
            ExprKind::VariableDecl {
                name,
                type_ref,
                access,
                ..
            } => {
                let (name, type_ref, access) = (*name, *type_ref, *access);
                let type_ref = self.deep_copy_type_ref(type_ref);
                self.alloc(
                    span,
                    ExprKind::VariableDecl {
                        name,
                        type_ref,
                        access,
                        symbol: None,
                    },
                )
            }
            ExprKind::MethodRef { name, .. } => {
                let name = *name;
                self.alloc(span, ExprKind::MethodRef { name, symbol: None })
            }
            ExprKind::Unary {
                op,
                op_span,
                operand,
            } => {
                let (op, op_span, operand) = (*op, *op_span, *operand);
                let operand = self.deep_copy_expand(operand, ctx);
                self.alloc(
                    span,
                    ExprKind::Unary {
                        op,
                        op_span,
                        operand,
                    },
                )
            }
            ExprKind::Binary {
                op,
                op_span,
                lhs,
                rhs,
            } => {
                let (op, op_span, lhs, rhs) = (*op, *op_span, *lhs, *rhs);
                let lhs = self.deep_copy_expand(lhs, ctx);
                let rhs = self.deep_copy_expand(rhs, ctx);
                self.alloc(span, ExprKind::Binary { op, op_span, lhs, rhs })
            }
            ExprKind::Dot {
                dot_span,
                lvalue,
                member,
                is_write,
                ..
            } => {
                let (dot_span, lvalue, member, is_write) = (*dot_span, *lvalue, *member, *is_write);
                let lvalue = self.deep_copy_expand(lvalue, ctx);
                self.alloc(
                    span,
                    ExprKind::Dot {
                        dot_span,
                        lvalue,
                        member,
                        field: None,
                        is_write,
                    },
                )
            }
            ExprKind::FuncCall {
                open_paren_span,
                instance,
                callee,
                args,
            } => {
                let (open_paren_span, instance, callee, args) =
                    (*open_paren_span, *instance, *callee, args.clone());
                let instance = instance.map(|i| self.deep_copy_expand(i, ctx));
                let callee = self.deep_copy_expand(callee, ctx);
                let args = args
                    .into_iter()
                    .map(|a| self.deep_copy_expand(a, ctx))
                    .collect();
                self.alloc(
                    span,
                    ExprKind::FuncCall {
                        open_paren_span,
                        instance,
                        callee,
                        args,
                    },
                )
            }
            ExprKind::Cast { to, value, kind } => {
                let (to, value, kind) = (*to, *value, *kind);
                let to = self.deep_copy_type_ref(to);
                let value = self.deep_copy_expand(value, ctx);
                self.alloc(span, ExprKind::Cast { to, value, kind })
            }
            ExprKind::New { type_ref } => {
                let type_ref = *type_ref;
                let type_ref = self.deep_copy_type_ref(type_ref);
                self.alloc(span, ExprKind::New { type_ref })
            }
            ExprKind::If { cond, then, els } => {
                let (cond, then, els) = (*cond, *then, *els);
                let cond = self.deep_copy_expand(cond, ctx);
                let then = self.deep_copy_expand(then, ctx);
                let els = els.map(|e| self.deep_copy_expand(e, ctx));
                self.alloc(span, ExprKind::If { cond, then, els })
            }
            ExprKind::While { cond, body } => {
                let (cond, body) = (*cond, *body);
                let cond = self.deep_copy_expand(cond, ctx);
                let body = self.deep_copy_expand(body, ctx);
                self.alloc(span, ExprKind::While { cond, body })
            }
            ExprKind::Assert { cond } => {
                let cond = *cond;
                let cond = self.deep_copy_expand(cond, ctx);
                self.alloc(span, ExprKind::Assert { cond })
            }
            ExprKind::Compound { scope, exprs } => {
                let storage = self.scopes[*scope].storage;
                let exprs = exprs.clone();
                let exprs = exprs
                    .into_iter()
                    .map(|e| self.deep_copy_expand(e, ctx))
                    .collect();
                self.compound(span, storage, exprs)
            }
            ExprKind::ExpressionList { exprs } => {
                let exprs = exprs.clone();
                let exprs = exprs
                    .into_iter()
                    .map(|e| self.deep_copy_expand(e, ctx))
                    .collect();
                self.alloc(span, ExprKind::ExpressionList { exprs })
            }
            ExprKind::FuncDef {
                name,
                return_ref,
                params,
                body,
                ..
            } => {
                let (name, return_ref, params, body) =
                    (*name, *return_ref, params.clone(), *body);
                let return_ref = self.deep_copy_type_ref(return_ref);
                let params = params
                    .iter()
                    .map(|p| self.deep_copy_param(p, ctx))
                    .collect();
                let body = self.deep_copy_expand(body, ctx);
                self.func_def(span, name, return_ref, params, body)
            }
            ExprKind::CompleteClassDef {
                name,
                body,
                template_args,
                ..
            } => {
                let (name, body, template_args) = (*name, *body, template_args.clone());
                let body = self.deep_copy_expand(body, ctx);
                self.complete_class_def(span, name, template_args, body)
            }
            ExprKind::GenericClassDef {
                name,
                body,
                params,
                defined_type,
                ..
            } => {
                let (name, body, params, generic_ty) = (*name, *body, params.clone(), *defined_type);
                let body = self.deep_copy_expand(body, ctx);
                match ctx.kind {
                    // Inside an expanded template a generic class is not
                    // generic anymore.
                    ExpansionKind::AnonymousTemplate => {
                        let class = self.complete_class_def(span, name, ctx.args.clone(), body);
                        let class_ty = match self.kind(class) {
                            ExprKind::CompleteClassDef { defined_type, .. } => *defined_type,
                            _ => unreachable!(),
                        };
                        self.types.set_generic_of(class_ty, generic_ty);
                        class
                    }
                    ExpansionKind::NamedTemplate => {
                        self.generic_class_def(span, name, params, body)
                    }
                }
            }
            ExprKind::Namespace { name, body, .. } => {
                let (name, body) = (name.clone(), *body);
                let body = self.deep_copy_expand(body, ctx);
                self.alloc(
                    span,
                    ExprKind::Namespace {
                        name,
                        body,
                        scope: None,
                    },
                )
            }
            ExprKind::AnonymousTemplate { params, body } => {
                let (params, body) = (params.clone(), *body);
                let body = self.deep_copy_expand(body, ctx);
                self.alloc(span, ExprKind::AnonymousTemplate { params, body })
            }
            ExprKind::NamedTemplate { name, params, body } => {
                let (name, params, body) = (*name, params.clone(), *body);
                let body = self.deep_copy_expand(body, ctx);
                self.alloc(span, ExprKind::NamedTemplate { name, params, body })
            }
            ExprKind::TemplateExpansion {
                name, type_args, ..
            } => {
                let (name, type_args) = (name.clone(), type_args.clone());
                let type_args = type_args
                    .into_iter()
                    .map(|a| self.deep_copy_type_ref(a))
                    .collect();
                self.template_expansion(span, name, type_args)
            }
        }
    }
}

/// Structural equality of two subtrees, ignoring node ids, scopes, symbol
/// bindings and resolution state. Cloning a subtree under an empty
/// expansion context yields a structurally equal tree.
pub fn structurally_equal(cx: &AstContext, a: NodeId, b: NodeId) -> bool {
    use ExprKind::*;

    let (na, nb) = (&cx.nodes[a].kind, &cx.nodes[b].kind);
    match (na, nb) {
        (LiteralBool { value: va }, LiteralBool { value: vb }) => va == vb,
        (LiteralInt32 { value: va }, LiteralInt32 { value: vb }) => va == vb,
        (LiteralFloat { value: va }, LiteralFloat { value: vb }) => va == vb,
        (
            VariableRef {
                name: qa,
                access: aa,
                ..
            },
            VariableRef {
                name: qb,
                access: ab,
                ..
            },
        ) => qa == qb && aa == ab,
        (
            VariableDecl {
                name: ia,
                type_ref: ta,
                access: aa,
                ..
            },
            VariableDecl {
                name: ib,
                type_ref: tb,
                access: ab,
                ..
            },
        ) => ia.text == ib.text && aa == ab && type_refs_structurally_equal(cx, *ta, *tb),
        (MethodRef { name: ia, .. }, MethodRef { name: ib, .. }) => ia.text == ib.text,
        (
            Unary {
                op: oa, operand: va, ..
            },
            Unary {
                op: ob, operand: vb, ..
            },
        ) => oa == ob && structurally_equal(cx, *va, *vb),
        (
            Binary {
                op: oa,
                lhs: la,
                rhs: ra,
                ..
            },
            Binary {
                op: ob,
                lhs: lb,
                rhs: rb,
                ..
            },
        ) => oa == ob && structurally_equal(cx, *la, *lb) && structurally_equal(cx, *ra, *rb),
        (
            Dot {
                lvalue: la,
                member: ma,
                is_write: wa,
                ..
            },
            Dot {
                lvalue: lb,
                member: mb,
                is_write: wb,
                ..
            },
        ) => ma.text == mb.text && wa == wb && structurally_equal(cx, *la, *lb),
        (
            FuncCall {
                instance: ia,
                callee: ca,
                args: aa,
                ..
            },
            FuncCall {
                instance: ib,
                callee: cb,
                args: ab,
                ..
            },
        ) => {
            let instances = match (ia, ib) {
                (None, None) => true,
                (Some(x), Some(y)) => structurally_equal(cx, *x, *y),
                _ => false,
            };
            instances
                && structurally_equal(cx, *ca, *cb)
                && aa.len() == ab.len()
                && aa
                    .iter()
                    .zip(ab)
                    .all(|(x, y)| structurally_equal(cx, *x, *y))
        }
        (
            Cast {
                to: ta,
                value: va,
                kind: ka,
            },
            Cast {
                to: tb,
                value: vb,
                kind: kb,
            },
        ) => {
            ka == kb
                && type_refs_structurally_equal(cx, *ta, *tb)
                && structurally_equal(cx, *va, *vb)
        }
        (New { type_ref: ta }, New { type_ref: tb }) => {
            type_refs_structurally_equal(cx, *ta, *tb)
        }
        (
            If {
                cond: ca,
                then: ta,
                els: ea,
            },
            If {
                cond: cb,
                then: tb,
                els: eb,
            },
        ) => {
            structurally_equal(cx, *ca, *cb)
                && structurally_equal(cx, *ta, *tb)
                && match (ea, eb) {
                    (None, None) => true,
                    (Some(x), Some(y)) => structurally_equal(cx, *x, *y),
                    _ => false,
                }
        }
        (While { cond: ca, body: ba }, While { cond: cb, body: bb }) => {
            structurally_equal(cx, *ca, *cb) && structurally_equal(cx, *ba, *bb)
        }
        (Assert { cond: ca }, Assert { cond: cb }) => structurally_equal(cx, *ca, *cb),
        (Compound { exprs: ea, scope: sa }, Compound { exprs: eb, scope: sb }) => {
            cx.scopes[*sa].storage == cx.scopes[*sb].storage
                && ea.len() == eb.len()
                && ea
                    .iter()
                    .zip(eb)
                    .all(|(x, y)| structurally_equal(cx, *x, *y))
        }
        (ExpressionList { exprs: ea }, ExpressionList { exprs: eb }) => {
            ea.len() == eb.len()
                && ea
                    .iter()
                    .zip(eb)
                    .all(|(x, y)| structurally_equal(cx, *x, *y))
        }
        (
            FuncDef {
                name: ia,
                return_ref: ra,
                params: pa,
                body: ba,
                ..
            },
            FuncDef {
                name: ib,
                return_ref: rb,
                params: pb,
                body: bb,
                ..
            },
        ) => {
            ia.text == ib.text
                && type_refs_structurally_equal(cx, *ra, *rb)
                && pa.len() == pb.len()
                && pa.iter().zip(pb).all(|(x, y)| {
                    x.name.text == y.name.text
                        && type_refs_structurally_equal(cx, x.type_ref, y.type_ref)
                })
                && structurally_equal(cx, *ba, *bb)
        }
        (
            CompleteClassDef {
                name: ia, body: ba, ..
            },
            CompleteClassDef {
                name: ib, body: bb, ..
            },
        ) => ia.text == ib.text && structurally_equal(cx, *ba, *bb),
        (
            GenericClassDef {
                name: ia,
                body: ba,
                params: pa,
                ..
            },
            GenericClassDef {
                name: ib,
                body: bb,
                params: pb,
                ..
            },
        ) => {
            ia.text == ib.text
                && pa.len() == pb.len()
                && pa.iter().zip(pb).all(|(x, y)| x.name.text == y.name.text)
                && structurally_equal(cx, *ba, *bb)
        }
        (
            Namespace {
                name: qa, body: ba, ..
            },
            Namespace {
                name: qb, body: bb, ..
            },
        ) => qa == qb && structurally_equal(cx, *ba, *bb),
        (
            AnonymousTemplate {
                params: pa,
                body: ba,
            },
            AnonymousTemplate {
                params: pb,
                body: bb,
            },
        ) => {
            pa.len() == pb.len()
                && pa.iter().zip(pb).all(|(x, y)| x.name.text == y.name.text)
                && structurally_equal(cx, *ba, *bb)
        }
        (
            NamedTemplate {
                name: ia,
                params: pa,
                body: ba,
            },
            NamedTemplate {
                name: ib,
                params: pb,
                body: bb,
            },
        ) => {
            ia.text == ib.text
                && pa.len() == pb.len()
                && pa.iter().zip(pb).all(|(x, y)| x.name.text == y.name.text)
                && structurally_equal(cx, *ba, *bb)
        }
        (
            TemplateExpansion {
                name: qa,
                type_args: ta,
                ..
            },
            TemplateExpansion {
                name: qb,
                type_args: tb,
                ..
            },
        ) => {
            qa == qb
                && ta.len() == tb.len()
                && ta
                    .iter()
                    .zip(tb)
                    .all(|(x, y)| type_refs_structurally_equal(cx, *x, *y))
        }
        _ => false,
    }
}

/// Structural equality for type refs: known refs compare their type,
/// deferred refs their written name and arguments.
pub fn type_refs_structurally_equal(cx: &AstContext, a: TypeRefId, b: TypeRefId) -> bool {
    match (&cx.type_refs[a].kind, &cx.type_refs[b].kind) {
        (TypeRefKind::Known { ty: ta }, TypeRefKind::Known { ty: tb }) => ta == tb,
        (
            TypeRefKind::Deferred {
                name: na, args: aa, ..
            },
            TypeRefKind::Deferred {
                name: nb, args: ab, ..
            },
        ) => {
            na == nb
                && aa.len() == ab.len()
                && aa
                    .iter()
                    .zip(ab)
                    .all(|(x, y)| type_refs_structurally_equal(cx, *x, *y))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{Ident, QualifiedName};
    use crate::node::{BinaryOp, VariableAccess};
    use crate::scope::StorageKind;
    use crate::types::TypeTable;
    use anodec_util::{Name, SourceSpan};

    fn ident(cx: &str) -> Ident {
        Ident::new(SourceSpan::any(), Name::intern(cx))
    }

    fn empty_context() -> TemplateExpansionContext {
        TemplateExpansionContext {
            kind: ExpansionKind::NamedTemplate,
            args: Vec::new(),
        }
    }

    /// Builds `{ foo:int = 1 + 2; }` by hand.
    fn sample_tree(cx: &mut AstContext) -> NodeId {
        let span = SourceSpan::any();
        let one = cx.alloc(span, ExprKind::LiteralInt32 { value: 1 });
        let two = cx.alloc(span, ExprKind::LiteralInt32 { value: 2 });
        let sum = cx.alloc(
            span,
            ExprKind::Binary {
                op: BinaryOp::Add,
                op_span: span,
                lhs: one,
                rhs: two,
            },
        );
        let int_ref = cx.deferred_type_ref(span, QualifiedName::single(ident("int")), Vec::new());
        let decl = cx.alloc(
            span,
            ExprKind::VariableDecl {
                name: ident("foo"),
                type_ref: int_ref,
                access: VariableAccess::Write,
                symbol: None,
            },
        );
        let assign = cx.alloc(
            span,
            ExprKind::Binary {
                op: BinaryOp::Assign,
                op_span: span,
                lhs: decl,
                rhs: sum,
            },
        );
        cx.compound(span, StorageKind::Local, vec![assign])
    }

    #[test]
    fn test_clone_is_structurally_equal() {
        let mut cx = AstContext::new();
        let original = sample_tree(&mut cx);
        let clone = cx.deep_copy_expand(original, &empty_context());
        assert_ne!(original, clone);
        assert!(structurally_equal(&cx, original, clone));
    }

    #[test]
    fn test_clone_gets_fresh_ids_and_scopes() {
        let mut cx = AstContext::new();
        let original = sample_tree(&mut cx);
        let clone = cx.deep_copy_expand(original, &empty_context());

        let (orig_scope, clone_scope) = match (cx.kind(original), cx.kind(clone)) {
            (
                ExprKind::Compound { scope: a, .. },
                ExprKind::Compound { scope: b, .. },
            ) => (*a, *b),
            _ => panic!("expected compounds"),
        };
        assert_ne!(orig_scope, clone_scope);
    }

    #[test]
    fn test_clone_drops_resolution_state() {
        let mut cx = AstContext::new();
        let span = SourceSpan::any();
        let tr = cx.deferred_type_ref(span, QualifiedName::single(ident("int")), Vec::new());
        cx.resolve_type_ref(tr, TypeTable::INT32);
        let decl = cx.alloc(
            span,
            ExprKind::VariableDecl {
                name: ident("x"),
                type_ref: tr,
                access: VariableAccess::Read,
                symbol: None,
            },
        );

        let clone = cx.deep_copy_expand(decl, &empty_context());
        let cloned_ref = match cx.kind(clone) {
            ExprKind::VariableDecl { type_ref, .. } => *type_ref,
            _ => panic!("expected a decl"),
        };
        assert!(cx.type_ref_is_resolved(tr));
        assert!(!cx.type_ref_is_resolved(cloned_ref));
    }
}
