//! Pass 11: resolve dot-expression members and method references.
//!
//! A `Dot` resolves to a field on the class type left of the dot. A call
//! whose callee is a method reference and which has a receiver binds the
//! method by lexical lookup on the receiver's static class type; dispatch
//! is static; there is no vtable.

use anodec_ast::{ExprKind, FieldRef, NodeId};
use anodec_util::ErrorKind;

use crate::walk::{Pass, PassContext};

pub struct ResolveMembers;

impl Pass for ResolveMembers {
    fn name(&self) -> &'static str {
        "resolve-members"
    }

    fn leave(&mut self, pcx: &mut PassContext<'_>, node: NodeId) {
        match pcx.cx.kind(node) {
            ExprKind::Dot {
                lvalue,
                member,
                dot_span,
                ..
            } => {
                let (lvalue, member, dot_span) = (*lvalue, *member, *dot_span);
                let lvalue_ty = pcx.cx.expr_type(lvalue);
                if !pcx.cx.types.is_class(lvalue_ty) {
                    let shown = pcx.cx.types.display_name(pcx.cx.types.actual(lvalue_ty));
                    pcx.errors.error(
                        ErrorKind::LeftOfDotNotClass,
                        dot_span,
                        format!(
                            "Dot operator is not usable with data type of expression on left side of '.' operator: {}",
                            shown
                        ),
                    );
                    return;
                }

                let class_ty = pcx.cx.types.actual(lvalue_ty);
                let field = pcx
                    .cx
                    .types
                    .class_find_field(class_ty, member.text)
                    .map(|f| FieldRef {
                        class: class_ty,
                        ordinal: f.ordinal,
                        ty: f.ty,
                    });
                match field {
                    Some(field) => {
                        if let ExprKind::Dot { field: slot, .. } = &mut pcx.cx.node_mut(node).kind {
                            *slot = Some(field);
                        }
                    }
                    None => {
                        let class_name = pcx.cx.types.display_name(class_ty);
                        pcx.errors.error(
                            ErrorKind::ClassMemberNotFound,
                            dot_span,
                            format!(
                                "Class '{}' does not have a member named '{}'",
                                class_name, member.text
                            ),
                        );
                    }
                }
            }
            ExprKind::FuncCall {
                instance: Some(instance),
                callee,
                ..
            } => {
                let (instance, callee) = (*instance, *callee);
                let method_name = match pcx.cx.kind(callee) {
                    ExprKind::MethodRef { name, .. } => *name,
                    _ => return,
                };

                let instance_ty = pcx.cx.types.actual(pcx.cx.expr_type(instance));
                let method = if pcx.cx.types.is_class(instance_ty) {
                    pcx.cx.types.class_find_method(instance_ty, method_name.text)
                } else {
                    None
                };

                match method {
                    Some(method) => {
                        if let ExprKind::MethodRef { symbol, .. } = &mut pcx.cx.node_mut(callee).kind
                        {
                            *symbol = Some(method);
                        }
                    }
                    None => {
                        let shown = pcx.cx.types.display_name(instance_ty);
                        pcx.errors.error(
                            ErrorKind::MethodNotDefined,
                            method_name.span,
                            format!(
                                "Type '{}' does not have a method named '{}'.",
                                shown, method_name.text
                            ),
                        );
                    }
                }
            }
            _ => {}
        }
    }
}
