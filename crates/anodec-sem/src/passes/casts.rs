//! Pass 12: insert implicit casts.
//!
//! Runs once every type is known. Wherever an operand's type differs from
//! what its context requires, the operand is rewritten in place into a
//! `Cast` with implicit kind, or the mismatch is reported when the scalar
//! lattice does not allow the conversion. The lattice: every non-`bool`
//! scalar widens toward higher operand priority, every scalar casts to
//! `bool`, and `bool` casts to nothing.

use anodec_ast::{BinaryExprKind, BinaryOp, CastKind, ExprKind, NodeId, TypeId, TypeTable};
use anodec_util::{ErrorKind, SourceSpan};

use crate::walk::{Pass, PassContext};

pub struct InsertImplicitCasts;

/// Wrap `value` in an implicit cast to `to`. The caller re-points the
/// parent's child slot at the returned node.
pub(crate) fn make_implicit_cast(
    pcx: &mut PassContext<'_>,
    value: NodeId,
    to: TypeId,
) -> NodeId {
    let span = pcx.cx.span(value);
    let old_parent = pcx.cx.node(value).parent;
    let to_ref = pcx.cx.known_type_ref(span, to);
    let cast = pcx.cx.alloc(
        span,
        ExprKind::Cast {
            to: to_ref,
            value,
            kind: CastKind::Implicit,
        },
    );
    pcx.cx.node_mut(cast).parent = old_parent;
    pcx.cx.set_parent(value, cast);
    cast
}

impl InsertImplicitCasts {
    fn cast_condition_to_bool(
        &self,
        pcx: &mut PassContext<'_>,
        cond: NodeId,
        failure_kind: ErrorKind,
    ) -> Option<NodeId> {
        let cond_ty = pcx.cx.expr_type(cond);
        if pcx.cx.types.is_same_type(cond_ty, TypeTable::BOOL) {
            return None;
        }
        if pcx.cx.types.can_implicit_cast(cond_ty, TypeTable::BOOL) {
            return Some(make_implicit_cast(pcx, cond, TypeTable::BOOL));
        }
        let span = pcx.cx.span(cond);
        let shown = pcx.cx.types.display_name(pcx.cx.types.actual(cond_ty));
        pcx.errors.error(
            failure_kind,
            span,
            format!(
                "Cannot implicitly cast condition expression from '{}' to 'bool'.",
                shown
            ),
        );
        None
    }

    fn binary_operand_to_bool(&self, pcx: &mut PassContext<'_>, operand: NodeId, op_span: SourceSpan) -> Option<NodeId> {
        let ty = pcx.cx.expr_type(operand);
        if pcx.cx.types.is_same_type(ty, TypeTable::BOOL) {
            return None;
        }
        if pcx.cx.types.can_implicit_cast(ty, TypeTable::BOOL) {
            return Some(make_implicit_cast(pcx, operand, TypeTable::BOOL));
        }
        let shown = pcx.cx.types.display_name(pcx.cx.types.actual(ty));
        pcx.errors.error(
            ErrorKind::InvalidImplicitCastInBinaryExpr,
            op_span,
            format!("Cannot implicitly cast operand from '{}' to 'bool'.", shown),
        );
        None
    }
}

impl Pass for InsertImplicitCasts {
    fn name(&self) -> &'static str {
        "insert-implicit-casts"
    }

    fn enter(&mut self, pcx: &mut PassContext<'_>, node: NodeId) -> bool {
        // The while condition is handled before its body, matching the
        // original visitation order.
        if let ExprKind::While { cond, .. } = pcx.cx.kind(node) {
            let cond = *cond;
            if let Some(cast) =
                self.cast_condition_to_bool(pcx, cond, ErrorKind::InvalidImplicitCastInInWhileCondition)
            {
                if let ExprKind::While { cond: slot, .. } = &mut pcx.cx.node_mut(node).kind {
                    *slot = cast;
                }
            }
        }
        true
    }

    fn leave(&mut self, pcx: &mut PassContext<'_>, node: NodeId) {
        match pcx.cx.kind(node) {
            ExprKind::Binary {
                op, op_span, lhs, rhs,
            } => {
                let (op, op_span, lhs, rhs) = (*op, *op_span, *lhs, *rhs);
                if op.expr_kind() == BinaryExprKind::Logical {
                    if let Some(cast) = self.binary_operand_to_bool(pcx, lhs, op_span) {
                        if let ExprKind::Binary { lhs: slot, .. } = &mut pcx.cx.node_mut(node).kind
                        {
                            *slot = cast;
                        }
                    }
                    if let Some(cast) = self.binary_operand_to_bool(pcx, rhs, op_span) {
                        if let ExprKind::Binary { rhs: slot, .. } = &mut pcx.cx.node_mut(node).kind
                        {
                            *slot = cast;
                        }
                    }
                    return;
                }

                let lhs_ty = pcx.cx.expr_type(lhs);
                let rhs_ty = pcx.cx.expr_type(rhs);
                if pcx.cx.types.is_same_type(lhs_ty, rhs_ty) {
                    return;
                }

                // Prefer casting the lvalue up to the rvalue's type, except
                // for assignment, where only right-to-left is meaningful.
                if op != BinaryOp::Assign && pcx.cx.types.can_implicit_cast(lhs_ty, rhs_ty) {
                    let cast = make_implicit_cast(pcx, lhs, rhs_ty);
                    if let ExprKind::Binary { lhs: slot, .. } = &mut pcx.cx.node_mut(node).kind {
                        *slot = cast;
                    }
                } else if pcx.cx.types.can_implicit_cast(rhs_ty, lhs_ty) {
                    let cast = make_implicit_cast(pcx, rhs, lhs_ty);
                    if let ExprKind::Binary { rhs: slot, .. } = &mut pcx.cx.node_mut(node).kind {
                        *slot = cast;
                    }
                } else {
                    let rhs_shown = pcx.cx.types.display_name(pcx.cx.types.actual(rhs_ty));
                    let lhs_shown = pcx.cx.types.display_name(pcx.cx.types.actual(lhs_ty));
                    let message = if op == BinaryOp::Assign {
                        format!(
                            "Cannot assign value of type '{}' to a variable of type '{}'",
                            rhs_shown, lhs_shown
                        )
                    } else {
                        format!(
                            "Cannot implicitly convert '{}' to '{}' or vice-versa",
                            rhs_shown, lhs_shown
                        )
                    };
                    pcx.errors
                        .error(ErrorKind::InvalidImplicitCastInBinaryExpr, op_span, message);
                }
            }
            ExprKind::If { cond, then, els } => {
                let (cond, then, els) = (*cond, *then, *els);
                if let Some(cast) =
                    self.cast_condition_to_bool(pcx, cond, ErrorKind::InvalidImplicitCastInIfCondition)
                {
                    if let ExprKind::If { cond: slot, .. } = &mut pcx.cx.node_mut(node).kind {
                        *slot = cast;
                    }
                }

                let els = match els {
                    Some(els) => els,
                    None => return,
                };
                let then_ty = pcx.cx.expr_type(then);
                let els_ty = pcx.cx.expr_type(els);
                if pcx.cx.types.is_same_type(then_ty, els_ty) {
                    return;
                }
                if pcx.cx.types.can_implicit_cast(els_ty, then_ty) {
                    let cast = make_implicit_cast(pcx, els, then_ty);
                    if let ExprKind::If { els: slot, .. } = &mut pcx.cx.node_mut(node).kind {
                        *slot = Some(cast);
                    }
                } else if pcx.cx.types.can_implicit_cast(then_ty, els_ty) {
                    let cast = make_implicit_cast(pcx, then, els_ty);
                    if let ExprKind::If { then: slot, .. } = &mut pcx.cx.node_mut(node).kind {
                        *slot = cast;
                    }
                } else {
                    let span = pcx.cx.span(node);
                    let then_shown = pcx.cx.types.display_name(pcx.cx.types.actual(then_ty));
                    let els_shown = pcx.cx.types.display_name(pcx.cx.types.actual(els_ty));
                    pcx.errors.error(
                        ErrorKind::InvalidImplicitCastInIfBodies,
                        span,
                        format!(
                            "Cannot implicitly cast '{}' to '{}' or vice-versa",
                            then_shown, els_shown
                        ),
                    );
                }
            }
            ExprKind::FuncDef {
                return_ref, body, ..
            } => {
                let (return_ref, body) = (*return_ref, *body);
                let return_ty = pcx.cx.type_ref_type(return_ref);
                if pcx.cx.types.is_void(return_ty) {
                    return;
                }
                let body_ty = pcx.cx.expr_type(body);
                if pcx.cx.types.is_same_type(return_ty, body_ty) {
                    return;
                }
                if !pcx.cx.types.can_implicit_cast(body_ty, return_ty) {
                    let span = pcx.cx.span(body);
                    let body_shown = pcx.cx.types.display_name(pcx.cx.types.actual(body_ty));
                    let ret_shown = pcx.cx.types.display_name(pcx.cx.types.actual(return_ty));
                    pcx.errors.error(
                        ErrorKind::InvalidImplicitCastInImplicitReturn,
                        span,
                        format!(
                            "Cannot implicitly cast implicit return value from '{}' to '{}'.",
                            body_shown, ret_shown
                        ),
                    );
                } else {
                    let cast = make_implicit_cast(pcx, body, return_ty);
                    if let ExprKind::FuncDef { body: slot, .. } = &mut pcx.cx.node_mut(node).kind {
                        *slot = cast;
                    }
                }
            }
            ExprKind::Assert { cond } => {
                let cond = *cond;
                if let Some(cast) = self.cast_condition_to_bool(
                    pcx,
                    cond,
                    ErrorKind::InvalidImplicitCastInAssertCondition,
                ) {
                    if let ExprKind::Assert { cond: slot } = &mut pcx.cx.node_mut(node).kind {
                        *slot = cast;
                    }
                }
            }
            _ => {}
        }
    }
}
