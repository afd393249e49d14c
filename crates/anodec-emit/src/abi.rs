//! The runtime ABI JIT-emitted code is linked against.
//!
//! Exactly these entry points must be resolvable by emitted code; the
//! host-side implementations live in `anodec-runtime`.

use anodec_ast::Primitive;

/// `__receive_result__(exec_ctx, prim_tag, value_ptr)`: delivers the value
/// of a module-level expression to the host.
pub const RECEIVE_RESULT_FN: &str = "__receive_result__";

/// `__assert_passed__()`: increments the pass counter.
pub const ASSERT_PASSED_FN: &str = "__assert_passed__";

/// `__assert_failed__(filename, line)`: non-returning.
pub const ASSERT_FAILED_FN: &str = "__assert_failed__";

/// `__malloc__(size) -> ptr`: zero-initialized allocation.
pub const MALLOC_FN: &str = "__malloc__";

/// Pointer-sized global carrying the host execution-context handle into
/// the JIT.
pub const EXECUTION_CONTEXT_GLOBAL: &str = "__execution__context__";

/// Suffix of the per-module initializer function.
pub const MODULE_INIT_SUFFIX: &str = "__initModule__";

/// Name of the initializer function emitted for a module.
pub fn module_init_name(module_name: &str) -> String {
    format!("{}{}", module_name, MODULE_INIT_SUFFIX)
}

/// Primitive tag passed to `__receive_result__`, matching the type model's
/// primitive ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum PrimTag {
    NotAPrimitive = 0,
    Void = 1,
    Bool = 2,
    Int32 = 3,
    Float = 4,
    Double = 5,
}

impl From<Primitive> for PrimTag {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::NotAPrimitive => PrimTag::NotAPrimitive,
            Primitive::Void => PrimTag::Void,
            Primitive::Bool => PrimTag::Bool,
            Primitive::Int32 => PrimTag::Int32,
            Primitive::Float => PrimTag::Float,
            Primitive::Double => PrimTag::Double,
        }
    }
}

impl PrimTag {
    pub fn from_u32(tag: u32) -> Option<Self> {
        Some(match tag {
            0 => PrimTag::NotAPrimitive,
            1 => PrimTag::Void,
            2 => PrimTag::Bool,
            3 => PrimTag::Int32,
            4 => PrimTag::Float,
            5 => PrimTag::Double,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_values_match_type_model_order() {
        assert_eq!(PrimTag::NotAPrimitive as u32, 0);
        assert_eq!(PrimTag::Void as u32, 1);
        assert_eq!(PrimTag::Bool as u32, 2);
        assert_eq!(PrimTag::Int32 as u32, 3);
        assert_eq!(PrimTag::Float as u32, 4);
        assert_eq!(PrimTag::Double as u32, 5);
    }

    #[test]
    fn test_tag_from_primitive() {
        assert_eq!(PrimTag::from(Primitive::Int32), PrimTag::Int32);
        assert_eq!(PrimTag::from(Primitive::Double), PrimTag::Double);
    }

    #[test]
    fn test_tag_round_trip() {
        for tag in 0..6 {
            assert_eq!(PrimTag::from_u32(tag).unwrap() as u32, tag);
        }
        assert!(PrimTag::from_u32(6).is_none());
    }

    #[test]
    fn test_module_init_name() {
        assert_eq!(module_init_name("repl_line_1"), "repl_line_1__initModule__");
    }
}
