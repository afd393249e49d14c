//! anodec-drv - Compiler driver.
//!
//! Orchestrates the pipeline: lex, parse, semantic analysis, export of the
//! module's symbols into the process-wide world. Two entry points sit on
//! top: the script runner ([`Compiler::run_file`]) and the REPL
//! ([`repl::Repl`]).
//!
//! Execution of compiled modules requires a plugged backend behind the
//! `anodec-emit` traits; without one, the driver reports the static type of
//! every value-yielding module-level expression in place of an evaluated
//! result.

pub mod repl;

use std::path::Path;

use anodec_ast::{AstContext, ExprKind, Module, Primitive, TypeId};
use anodec_emit::{abi, Loader};
use anodec_lex::Lexer;
use anodec_par::Parser;
use anodec_runtime::ExecutionContext;
use anodec_sem::{analyze_module, export_module_symbols, World};
use anodec_util::{Diagnostic, ErrorStream, Name};
use anyhow::Context as _;
use tracing::debug;

/// Install the host-side runtime entry points with a loader so JIT-emitted
/// modules can resolve them, and hand the execution-context handle to the
/// `__execution__context__` global. Call once per loader before loading
/// any module.
pub fn install_runtime_exports<L: Loader>(loader: &mut L, ctx: *mut ExecutionContext) {
    loader.set_export(
        abi::RECEIVE_RESULT_FN,
        anodec_runtime::__receive_result__ as usize as u64,
    );
    loader.set_export(
        abi::ASSERT_PASSED_FN,
        anodec_runtime::__assert_passed__ as usize as u64,
    );
    loader.set_export(
        abi::ASSERT_FAILED_FN,
        anodec_runtime::__assert_failed__ as usize as u64,
    );
    loader.set_export(abi::MALLOC_FN, anodec_runtime::__malloc__ as usize as u64);
    loader.set_export(abi::EXECUTION_CONTEXT_GLOBAL, ctx as u64);
}

/// Everything the driver knows after compiling one piece of source.
pub struct CompileOutcome {
    /// The module, when compilation succeeded.
    pub module: Option<Module>,
    /// All diagnostics reported.
    pub diagnostics: Vec<Diagnostic>,
    /// Static types of the module-level expressions that would deliver a
    /// primitive result at run time, in statement order.
    pub result_types: Vec<String>,
}

impl CompileOutcome {
    pub fn succeeded(&self) -> bool {
        self.module.is_some()
    }
}

/// One compilation session: the shared AST context and world, plus a
/// counter for naming REPL modules.
pub struct Compiler {
    pub cx: AstContext,
    pub world: World,
    module_counter: usize,
}

impl Compiler {
    pub fn new() -> Self {
        let mut cx = AstContext::new();
        let world = World::new(&mut cx);
        Self {
            cx,
            world,
            module_counter: 0,
        }
    }

    /// Name for the next REPL-entered module.
    pub fn next_repl_module_name(&mut self) -> String {
        self.module_counter += 1;
        format!("repl_line_{}", self.module_counter)
    }

    /// Compile one module from source: lex, parse, analyze; on success the
    /// module's symbols are exported to the world.
    pub fn compile_module(&mut self, module_name: &str, source: &str) -> CompileOutcome {
        let mut errors = ErrorStream::new();

        debug!(module = module_name, "parsing");
        let module = {
            let lexer = Lexer::new(Name::intern(module_name), source, &mut errors);
            let mut parser = Parser::new(lexer, &mut self.cx);
            parser.parse_module(module_name).ok()
        };

        let module = match module {
            Some(module) if !errors.has_errors() => module,
            _ => {
                return CompileOutcome {
                    module: None,
                    diagnostics: errors.take_diagnostics(),
                    result_types: Vec::new(),
                }
            }
        };

        debug!(module = module_name, "semantic analysis");
        if !analyze_module(&mut self.cx, &mut self.world, &mut errors, &module) {
            return CompileOutcome {
                module: None,
                diagnostics: errors.take_diagnostics(),
                result_types: Vec::new(),
            };
        }

        debug!(module = module_name, "exporting symbols");
        export_module_symbols(&mut self.cx, &mut self.world, &mut errors, &module);
        if errors.has_errors() {
            return CompileOutcome {
                module: None,
                diagnostics: errors.take_diagnostics(),
                result_types: Vec::new(),
            };
        }

        let result_types = self.result_types(&module);
        CompileOutcome {
            module: Some(module),
            diagnostics: errors.take_diagnostics(),
            result_types,
        }
    }

    /// The static types of the module-level expressions whose values the
    /// emitted code would deliver through `__receive_result__`.
    fn result_types(&self, module: &Module) -> Vec<String> {
        let exprs = match self.cx.kind(module.body) {
            ExprKind::Compound { exprs, .. } => exprs.clone(),
            _ => return Vec::new(),
        };
        exprs
            .into_iter()
            .filter_map(|expr| {
                let ty: TypeId = self.cx.expr_type(expr);
                match self.cx.types.primitive(ty) {
                    Primitive::NotAPrimitive | Primitive::Void => None,
                    _ => Some(self.cx.types.display_name(self.cx.types.actual(ty))),
                }
            })
            .collect()
    }

    /// Compile a source file; prints diagnostics to stderr. Returns true
    /// on success.
    pub fn run_file(&mut self, path: &Path) -> anyhow::Result<bool> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let module_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "script".to_owned());

        let outcome = self.compile_module(&module_name, &source);
        for diagnostic in &outcome.diagnostics {
            eprintln!("{}", diagnostic);
        }
        Ok(outcome.succeeded())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_success() {
        let mut compiler = Compiler::new();
        let outcome = compiler.compile_module("m1", "1 + 2 * 3;");
        assert!(outcome.succeeded());
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.result_types, vec!["int".to_owned()]);
    }

    #[test]
    fn test_compile_error_reports_diagnostics() {
        let mut compiler = Compiler::new();
        let outcome = compiler.compile_module("m1", "a = 1;");
        assert!(!outcome.succeeded());
        assert!(!outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_result_types_skip_void() {
        let mut compiler = Compiler::new();
        let outcome = compiler.compile_module("m1", "x:int = 1; while (false) x; x;");
        assert!(outcome.succeeded());
        // the declaration-assignment and the trailing reference yield ints;
        // the while loop is void
        assert_eq!(outcome.result_types, vec!["int".to_owned(), "int".to_owned()]);
    }

    #[test]
    fn test_module_chaining_through_compiler() {
        let mut compiler = Compiler::new();
        assert!(compiler.compile_module("m1", "foo:int = 100;").succeeded());
        let outcome = compiler.compile_module("m2", "foo + 2;");
        assert!(outcome.succeeded(), "{:#?}", outcome.diagnostics);
    }

    #[test]
    fn test_failed_module_leaves_world_clean() {
        let mut compiler = Compiler::new();
        assert!(!compiler.compile_module("m1", "nope = 1;").succeeded());
        // the failed module exported nothing
        let outcome = compiler.compile_module("m2", "nope;");
        assert!(!outcome.succeeded());
    }

    #[test]
    fn test_repl_module_names() {
        let mut compiler = Compiler::new();
        assert_eq!(compiler.next_repl_module_name(), "repl_line_1");
        assert_eq!(compiler.next_repl_module_name(), "repl_line_2");
    }

    #[test]
    fn test_install_runtime_exports() {
        struct RecordingLoader {
            exports: Vec<(String, u64)>,
        }
        impl Loader for RecordingLoader {
            type Artifact = ();
            fn load_module(&mut self, _artifact: ()) -> Result<u64, anodec_emit::EmitError> {
                Ok(0)
            }
            fn find_symbol(&self, name: &str) -> Option<u64> {
                self.exports
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, addr)| *addr)
            }
            fn set_export(&mut self, name: &str, address: u64) {
                self.exports.push((name.to_owned(), address));
            }
        }

        let mut loader = RecordingLoader { exports: Vec::new() };
        let mut ctx = ExecutionContext::new();
        install_runtime_exports(&mut loader, &mut ctx as *mut ExecutionContext);

        assert!(loader.find_symbol(abi::RECEIVE_RESULT_FN).unwrap() != 0);
        assert!(loader.find_symbol(abi::ASSERT_PASSED_FN).is_some());
        assert!(loader.find_symbol(abi::ASSERT_FAILED_FN).is_some());
        assert!(loader.find_symbol(abi::MALLOC_FN).is_some());
        assert!(loader.find_symbol(abi::EXECUTION_CONTEXT_GLOBAL).is_some());
    }
}
