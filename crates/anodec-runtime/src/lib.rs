//! anodec-runtime - Host-side runtime support.
//!
//! The `extern "C"` entry points JIT-emitted anode code calls back into. A
//! loader exposes these to emitted modules under the names the emitter
//! declared:
//!
//! | symbol | behavior |
//! |---|---|
//! | `__receive_result__(ctx, tag, ptr)` | delivers a module-level result |
//! | `__assert_passed__()` | increments the pass counter |
//! | `__assert_failed__(file, line)` | prints a diagnostic; does not return |
//! | `__malloc__(size)` | zero-initialized allocation |
//!
//! The primitive tag values match the core type model:
//! `0 = not a primitive, 1 = void, 2 = bool, 3 = int32, 4 = float,
//! 5 = double`.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::sync::atomic::{AtomicU64, Ordering};

/// A value delivered through `__receive_result__`, decoded host-side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResultValue {
    NotAPrimitive,
    Void,
    Bool(bool),
    Int32(i32),
    Float(f32),
    Double(f64),
}

/// Host-side execution context. The core installs a pointer to one of
/// these in the `__execution__context__` global of each loaded module.
pub struct ExecutionContext {
    result_handler: Option<Box<dyn FnMut(ResultValue)>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            result_handler: None,
        }
    }

    /// Install the callback invoked for every delivered result.
    pub fn set_result_handler(&mut self, handler: impl FnMut(ResultValue) + 'static) {
        self.result_handler = Some(Box::new(handler));
    }

    fn dispatch(&mut self, value: ResultValue) {
        if let Some(handler) = &mut self.result_handler {
            handler(value);
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

static ASSERT_PASS_COUNT: AtomicU64 = AtomicU64::new(0);

/// Number of assertions that have passed since process start.
pub fn assert_pass_count() -> u64 {
    ASSERT_PASS_COUNT.load(Ordering::Relaxed)
}

/// Decode a tagged value pointer.
///
/// # Safety
///
/// `value_ptr` must point to readable storage of the size implied by
/// `prim_tag`.
pub unsafe fn decode_result(prim_tag: u32, value_ptr: *const u8) -> ResultValue {
    match prim_tag {
        1 => ResultValue::Void,
        2 => ResultValue::Bool(*(value_ptr as *const u8) != 0),
        3 => ResultValue::Int32(*(value_ptr as *const i32)),
        4 => ResultValue::Float(*(value_ptr as *const f32)),
        5 => ResultValue::Double(*(value_ptr as *const f64)),
        _ => ResultValue::NotAPrimitive,
    }
}

/// Entry point for module-level expression results.
///
/// # Safety
///
/// `ctx` must point to a live [`ExecutionContext`]; `value_ptr` must be
/// valid for the tagged type.
#[no_mangle]
pub unsafe extern "C" fn __receive_result__(
    ctx: *mut ExecutionContext,
    prim_tag: u32,
    value_ptr: *const u8,
) {
    if ctx.is_null() {
        return;
    }
    let value = decode_result(prim_tag, value_ptr);
    (*ctx).dispatch(value);
}

/// Entry point for passing assertions.
#[no_mangle]
pub extern "C" fn __assert_passed__() {
    ASSERT_PASS_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// Entry point for failing assertions. Does not return.
///
/// # Safety
///
/// `filename` must be null or a valid C string.
#[no_mangle]
pub unsafe extern "C" fn __assert_failed__(filename: *const c_char, line: u32) -> ! {
    let name = if filename.is_null() {
        "<unknown>".to_owned()
    } else {
        CStr::from_ptr(filename).to_string_lossy().into_owned()
    };
    eprintln!("assertion failed at {}:{}", name, line);
    std::process::exit(101)
}

/// Zero-initialized allocation for `new<T>()`. The allocation is
/// intentionally leaked; object lifetime management belongs to a collector
/// outside the core.
#[no_mangle]
pub extern "C" fn __malloc__(size: u32) -> *mut u8 {
    let ptr = unsafe { libc::calloc(1, size.max(1) as libc::size_t) };
    assert!(!ptr.is_null(), "allocation of {} bytes failed", size);
    ptr as *mut u8
}
