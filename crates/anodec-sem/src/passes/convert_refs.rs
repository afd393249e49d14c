//! Pass 10: rewrite generic-pointing type refs to class expansions.
//!
//! After expansion, a resolution-deferred ref still pointing at a generic
//! is rewritten to the class the generic expanded to for the ref's argument
//! list. A generic with no matching expansion at this point is an error.

use anodec_ast::{TypeRefId, TypeRefKind};
use anodec_util::ErrorKind;

use crate::walk::{Pass, PassContext};

pub struct ConvertGenericRefs;

impl Pass for ConvertGenericRefs {
    fn name(&self) -> &'static str {
        "convert-generic-refs"
    }

    fn type_ref(&mut self, pcx: &mut PassContext<'_>, type_ref: TypeRefId) {
        let span = pcx.cx.type_ref(type_ref).span;
        let deferred = pcx.cx.type_ref_type(type_ref);

        if pcx.cx.types.is_generic(deferred) {
            let arg_types = pcx.cx.types.deferred_type_args(deferred).to_vec();
            let generic_ty = pcx.cx.types.actual(deferred);
            let (param_count, generic_name) = {
                let generic = pcx.cx.types.generic(generic_ty).unwrap();
                (generic.param_names.len(), generic.name)
            };

            if param_count != arg_types.len() {
                pcx.errors.error(
                    ErrorKind::IncorrectNumberOfGenericArguments,
                    span,
                    format!(
                        "Incorrect number of generic arguments for type '{}' - expected {} but found {}",
                        generic_name, param_count, arg_types.len()
                    ),
                );
                return;
            }

            let class = match pcx.cx.types.generic_find_expansion(generic_ty, &arg_types) {
                Some(class) => class,
                None => {
                    pcx.errors.error(
                        ErrorKind::GenericTypeWasNotExpandedWithSpecifiedArguments,
                        span,
                        format!(
                            "Generic type '{}' was not expanded with the specified type arguments",
                            generic_name
                        ),
                    );
                    return;
                }
            };

            pcx.cx.resolve_type_ref(type_ref, class);
        } else if !pcx.cx.type_ref_args(type_ref).is_empty() {
            let has_deferred_kind =
                matches!(pcx.cx.type_ref(type_ref).kind, TypeRefKind::Deferred { .. });
            if has_deferred_kind && !pcx.cx.types.is_class(deferred) {
                let shown = pcx.cx.types.display_name(pcx.cx.types.actual(deferred));
                pcx.errors.error(
                    ErrorKind::TypeIsNotGenericButIsReferencedWithGenericArgs,
                    span,
                    format!(
                        "Type '{}' is not generic but is referenced with generic arguments",
                        shown
                    ),
                );
            }
        }
    }
}
