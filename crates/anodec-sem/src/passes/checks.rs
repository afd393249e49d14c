//! Pass 13: late semantic checks for binary operators, casts and function
//! calls. The function-call check also inserts the implicit casts for
//! arguments, the natural place to do it since parameter types live here.

use anodec_ast::{BinaryExprKind, BinaryOp, CastKind, ExprKind, NodeId};
use anodec_util::ErrorKind;

use super::casts::make_implicit_cast;
use crate::walk::{Pass, PassContext};

/// Assignability and operator/type compatibility of binary expressions.
pub struct BinaryChecks;

impl Pass for BinaryChecks {
    fn name(&self) -> &'static str {
        "binary-checks"
    }

    fn leave(&mut self, pcx: &mut PassContext<'_>, node: NodeId) {
        let (op, op_span, lhs) = match pcx.cx.kind(node) {
            ExprKind::Binary {
                op, op_span, lhs, ..
            } => (*op, *op_span, *lhs),
            _ => return,
        };

        if op.is_comparison() {
            return;
        }

        if op == BinaryOp::Assign {
            if !pcx.cx.can_write(lhs) {
                pcx.errors.error(
                    ErrorKind::CannotAssignToLValue,
                    op_span,
                    "Cannot assign a value to the expression left of '='".to_owned(),
                );
            }
        } else if op.expr_kind() == BinaryExprKind::Arithmetic {
            let result_ty = pcx.cx.expr_type(node);
            if !pcx.cx.types.can_do_arithmetic(result_ty) {
                let shown = pcx.cx.types.display_name(pcx.cx.types.actual(result_ty));
                pcx.errors.error(
                    ErrorKind::OperatorCannotBeUsedWithType,
                    op_span,
                    format!("Operator '{}' cannot be used with type '{}'.", op.display(), shown),
                );
            }
        }
    }
}

/// Validity of cast expressions. Implicit casts that fail here would mean
/// the insertion pass produced an impossible cast, which is a programmer
/// error, not a diagnostic.
pub struct CastChecks;

impl Pass for CastChecks {
    fn name(&self) -> &'static str {
        "cast-checks"
    }

    fn enter(&mut self, pcx: &mut PassContext<'_>, node: NodeId) -> bool {
        let (to, value, kind) = match pcx.cx.kind(node) {
            ExprKind::Cast { to, value, kind } => (*to, *value, *kind),
            _ => return true,
        };

        let from_ty = pcx.cx.expr_type(value);
        let to_ty = pcx.cx.type_ref_type(to);

        if pcx.cx.types.can_implicit_cast(from_ty, to_ty) {
            return true;
        }

        assert!(
            kind != CastKind::Implicit,
            "an implicit cast was inserted between types that cannot be implicitly cast"
        );

        if !pcx.cx.types.can_explicit_cast(from_ty, to_ty) {
            let span = pcx.cx.span(node);
            let from_shown = pcx.cx.types.display_name(pcx.cx.types.actual(from_ty));
            let to_shown = pcx.cx.types.display_name(pcx.cx.types.actual(to_ty));
            pcx.errors.error(
                ErrorKind::InvalidExplicitCast,
                span,
                format!("Cannot cast from '{}' to '{}'", from_shown, to_shown),
            );
        }
        true
    }
}

/// Function-call arity and argument compatibility; inserts implicit casts
/// on arguments that need them.
pub struct FuncCallChecks;

impl Pass for FuncCallChecks {
    fn name(&self) -> &'static str {
        "func-call-checks"
    }

    fn leave(&mut self, pcx: &mut PassContext<'_>, node: NodeId) {
        let (callee, args) = match pcx.cx.kind(node) {
            ExprKind::FuncCall { callee, args, .. } => (*callee, args.clone()),
            _ => return,
        };

        let callee_ty = pcx.cx.expr_type(callee);
        if !pcx.cx.types.is_function(callee_ty) {
            let span = pcx.cx.span(node);
            pcx.errors.error(
                ErrorKind::ExpressionIsNotFunction,
                span,
                "Result of expression left of '(' is not a function.".to_owned(),
            );
            return;
        }

        let param_types = pcx.cx.types.function_params(callee_ty);
        if param_types.len() != args.len() {
            let span = pcx.cx.span(node);
            pcx.errors.error(
                ErrorKind::IncorrectNumberOfArguments,
                span,
                format!(
                    "Incorrect number of arguments.  Expected {} but found {}",
                    param_types.len(),
                    args.len()
                ),
            );
            return;
        }

        for (i, (arg, param_ty)) in args.iter().zip(&param_types).enumerate() {
            let arg_ty = pcx.cx.expr_type(*arg);
            if pcx.cx.types.is_same_type(*param_ty, arg_ty) {
                continue;
            }
            if !pcx.cx.types.can_implicit_cast(arg_ty, *param_ty) {
                let span = pcx.cx.span(*arg);
                let arg_shown = pcx.cx.types.display_name(pcx.cx.types.actual(arg_ty));
                let param_shown = pcx.cx.types.display_name(pcx.cx.types.actual(*param_ty));
                pcx.errors.error(
                    ErrorKind::InvalidImplicitCastInFunctionCallArgument,
                    span,
                    format!(
                        "Cannot implicitly cast argument {} from '{}' to '{}'.",
                        i, arg_shown, param_shown
                    ),
                );
            } else {
                let cast = make_implicit_cast(pcx, *arg, *param_ty);
                if let ExprKind::FuncCall { args, .. } = &mut pcx.cx.node_mut(node).kind {
                    args[i] = cast;
                }
            }
        }
    }
}
