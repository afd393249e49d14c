use anodec_ast::{AstContext, ExprKind, Module, NodeId, TypeRefKind, TypeTable};
use anodec_lex::Lexer;
use anodec_par::Parser;
use anodec_util::{ErrorKind, ErrorStream, Name};

use crate::export::export_module_symbols;
use crate::world::World;

/// A compilation session: one context and world, shared across the modules
/// it compiles, the way the REPL drives the pipeline.
struct Session {
    cx: AstContext,
    world: World,
    counter: usize,
}

impl Session {
    fn new() -> Self {
        let mut cx = AstContext::new();
        let world = World::new(&mut cx);
        Self {
            cx,
            world,
            counter: 0,
        }
    }

    /// Parse, analyze and (on success) export one module.
    fn compile(&mut self, source: &str) -> (Option<Module>, ErrorStream) {
        self.counter += 1;
        let name = format!("test_{}", self.counter);
        let mut errors = ErrorStream::new();

        let module = {
            let lexer = Lexer::new(Name::intern(&name), source, &mut errors);
            let mut parser = Parser::new(lexer, &mut self.cx);
            parser.parse_module(&name).ok()
        };
        let module = match module {
            Some(module) if !errors.has_errors() => module,
            _ => return (None, errors),
        };

        if crate::analyze_module(&mut self.cx, &mut self.world, &mut errors, &module) {
            export_module_symbols(&mut self.cx, &mut self.world, &mut errors, &module);
            (Some(module), errors)
        } else {
            (None, errors)
        }
    }
}

/// Compile one module that must succeed.
fn compile_ok(source: &str) -> (Session, Module) {
    let mut session = Session::new();
    let (module, errors) = session.compile(source);
    assert!(
        !errors.has_errors(),
        "unexpected errors for {:?}: {:#?}",
        source,
        errors.diagnostics()
    );
    (session, module.expect("compilation failed"))
}

/// Compile one module that must fail; returns the first error kind.
fn compile_err(source: &str) -> ErrorKind {
    let mut session = Session::new();
    let (module, errors) = session.compile(source);
    assert!(
        module.is_none() || errors.has_errors(),
        "expected errors for {:?}",
        source
    );
    errors
        .first_error()
        .unwrap_or_else(|| panic!("no error reported for {:?}", source))
        .kind
}

/// Walk a subtree checking the invariants that must hold after a
/// successful compile: every deferred type ref resolved, every variable
/// reference bound, every call's callee a function, and every binary
/// expression's operand types equal.
fn assert_invariants(session: &Session, root: NodeId) {
    let cx = &session.cx;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        for type_ref in cx.node_type_refs(node) {
            assert_type_ref_resolved(session, type_ref);
        }
        match cx.kind(node) {
            ExprKind::VariableRef { symbol, name, .. } => {
                assert!(
                    symbol.is_some(),
                    "unbound variable reference '{}'",
                    name.qualified()
                );
            }
            ExprKind::FuncCall { callee, .. } => {
                let callee_ty = cx.expr_type(*callee);
                assert!(cx.types.is_function(callee_ty), "call of a non-function");
            }
            ExprKind::Binary { op, lhs, rhs, .. } => {
                let _ = op;
                let lhs_ty = cx.types.actual(cx.expr_type(*lhs));
                let rhs_ty = cx.types.actual(cx.expr_type(*rhs));
                assert!(
                    cx.types.is_same_type(lhs_ty, rhs_ty),
                    "binary operand types differ after cast insertion: {} vs {}",
                    cx.types.display_name(lhs_ty),
                    cx.types.display_name(rhs_ty)
                );
            }
            _ => {}
        }
        stack.extend(cx.child_nodes(node, false));
    }
}

fn assert_type_ref_resolved(session: &Session, type_ref: anodec_ast::TypeRefId) {
    let cx = &session.cx;
    for arg in cx.type_ref_args(type_ref) {
        assert_type_ref_resolved(session, *arg);
    }
    if matches!(cx.type_ref(type_ref).kind, TypeRefKind::Deferred { .. }) {
        assert!(
            cx.type_ref_is_resolved(type_ref),
            "unresolved type ref survived a successful compile"
        );
    }
}

fn module_exprs(session: &Session, module: &Module) -> Vec<NodeId> {
    match session.cx.kind(module.body) {
        ExprKind::Compound { exprs, .. } => exprs.clone(),
        _ => panic!("module body is not a compound"),
    }
}

// ---------------------------------------------------------------------------
// positive paths
// ---------------------------------------------------------------------------

#[test]
fn test_arithmetic_module() {
    let (session, module) = compile_ok("1 + 2 * 3;");
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    assert_eq!(
        session.cx.types.actual(session.cx.expr_type(exprs[0])),
        TypeTable::INT32
    );
}

#[test]
fn test_declarations_and_assignment() {
    let (session, module) = compile_ok("foo:int = 100; foo = bar:int = 102; foo;");
    assert_invariants(&session, module.body);
}

#[test]
fn test_implicit_widening_inserts_cast() {
    let (session, module) = compile_ok("1 + 2.5;");
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    match session.cx.kind(exprs[0]) {
        ExprKind::Binary { lhs, .. } => {
            // the int side was wrapped in an implicit cast to float
            assert!(matches!(
                session.cx.kind(*lhs),
                ExprKind::Cast {
                    kind: anodec_ast::CastKind::Implicit,
                    ..
                }
            ));
        }
        other => panic!("expected binary, got {:?}", other),
    }
    assert_eq!(
        session.cx.types.actual(session.cx.expr_type(exprs[0])),
        TypeTable::FLOAT
    );
}

#[test]
fn test_if_condition_int_casts_to_bool() {
    let (session, module) = compile_ok("if (1) 2; else 3;");
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    match session.cx.kind(exprs[0]) {
        ExprKind::If { cond, .. } => {
            assert!(matches!(session.cx.kind(*cond), ExprKind::Cast { .. }));
            assert_eq!(
                session.cx.types.actual(session.cx.expr_type(*cond)),
                TypeTable::BOOL
            );
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_logical_operands_cast_to_bool() {
    let (session, module) = compile_ok("1 && 2.0;");
    assert_invariants(&session, module.body);
}

#[test]
fn test_while_condition_casts() {
    let (session, module) = compile_ok("i:int = 0; while (i) i = i - 1;");
    assert_invariants(&session, module.body);
}

#[test]
fn test_assert_condition_casts() {
    let (session, module) = compile_ok("assert(1);");
    assert_invariants(&session, module.body);
}

#[test]
fn test_float_narrows_to_bool_in_assignment() {
    // int/float may implicitly cast to bool (x != 0), so this succeeds
    let (session, module) = compile_ok("foo:bool = 1.0;");
    assert_invariants(&session, module.body);
}

#[test]
fn test_class_fields_and_ordinals() {
    let (session, module) = compile_ok("class Widget { a:int; b:float; c:bool; }");
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    let class_ty = match session.cx.kind(exprs[0]) {
        ExprKind::CompleteClassDef { defined_type, .. } => *defined_type,
        other => panic!("expected class def, got {:?}", other),
    };
    let class = session.cx.types.class(class_ty).unwrap();
    assert_eq!(class.fields.len(), 3);
    for (i, field) in class.fields.iter().enumerate() {
        assert_eq!(field.ordinal as usize, i);
    }
    assert_eq!(class.fields[0].name.as_str(), "a");
    assert_eq!(class.fields[2].name.as_str(), "c");
}

#[test]
fn test_field_access_and_write() {
    let (session, module) =
        compile_ok("class Widget { a:int; b:float; } w:Widget; w.a = 234; w.a;");
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    // w.a at the end types as int
    assert_eq!(
        session.cx.types.actual(session.cx.expr_type(exprs[3])),
        TypeTable::INT32
    );
}

#[test]
fn test_function_definition_and_call() {
    let (session, module) = compile_ok("func add:int(x:int, y:int) x + y; add(2, 3);");
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    assert_eq!(
        session.cx.types.actual(session.cx.expr_type(exprs[1])),
        TypeTable::INT32
    );
}

#[test]
fn test_call_argument_cast_inserted() {
    let (session, module) = compile_ok("func half:float(x:float) x / 2.0; half(3);");
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    match session.cx.kind(exprs[1]) {
        ExprKind::FuncCall { args, .. } => {
            assert!(matches!(session.cx.kind(args[0]), ExprKind::Cast { .. }));
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn test_implicit_return_cast() {
    let (session, module) = compile_ok("func f:double(x:int) x;");
    assert_invariants(&session, module.body);
}

#[test]
fn test_method_call_binds_statically() {
    let (session, module) = compile_ok(
        "class Counter { n:int; func bump:int() n + 1; } c:Counter; c.bump();",
    );
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    match session.cx.kind(exprs[2]) {
        ExprKind::FuncCall { callee, .. } => match session.cx.kind(*callee) {
            ExprKind::MethodRef { symbol, .. } => assert!(symbol.is_some()),
            other => panic!("expected method ref, got {:?}", other),
        },
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn test_method_this_symbol() {
    let (session, module) = compile_ok("class Counter { n:int; func bump:int() 1; }");
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    let class_ty = match session.cx.kind(exprs[0]) {
        ExprKind::CompleteClassDef { defined_type, .. } => *defined_type,
        other => panic!("expected class, got {:?}", other),
    };
    let method = session
        .cx
        .types
        .class_find_method(class_ty, Name::intern("bump"))
        .expect("method not populated");
    match session.cx.symbol(method).kind {
        anodec_ast::SymbolKind::Function { this, .. } => {
            let this = this.expect("method has no this symbol");
            assert_eq!(session.cx.symbol(this).name.as_str(), "this");
        }
        _ => panic!("method symbol is not a function"),
    }
}

#[test]
fn test_namespace_declaration_and_reference() {
    let (session, module) = compile_ok("namespace a::b { foo:int; } a::b::foo = 3; a::b::foo;");
    assert_invariants(&session, module.body);
}

#[test]
fn test_ternary_types() {
    let (session, module) = compile_ok("(? true, 1, 2);");
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    assert_eq!(
        session.cx.types.actual(session.cx.expr_type(exprs[0])),
        TypeTable::INT32
    );
}

#[test]
fn test_new_expression() {
    let (session, module) = compile_ok("class Widget { a:int; } w:Widget = new<Widget>();");
    assert_invariants(&session, module.body);
}

// ---------------------------------------------------------------------------
// templates and generics
// ---------------------------------------------------------------------------

#[test]
fn test_named_template_expansion() {
    let (session, module) = compile_ok(
        "template Decls(T) { value:T; } expand Decls<int>; value = 5; value;",
    );
    assert_invariants(&session, module.body);
}

#[test]
fn test_named_template_class_expansion() {
    let (session, module) = compile_ok(
        "template Pairs(T) { class Pair { first:T; second:T; } } \
         expand Pairs<int>; \
         p:Pair; p.first = 1; p.first;",
    );
    assert_invariants(&session, module.body);
}

#[test]
fn test_generic_class_expansion() {
    let (session, module) = compile_ok(
        "class Stack<T> { top:T; } s:Stack<int>; s.top = 3; s.top;",
    );
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    // s.top types as int through the expanded class
    assert_eq!(
        session.cx.types.actual(session.cx.expr_type(exprs[3])),
        TypeTable::INT32
    );
}

#[test]
fn test_generic_expansion_cache_dedup() {
    let (session, module) = compile_ok(
        "class Stack<T> { top:T; } a:Stack<int>; b:Stack<int>; c:Stack<float>;",
    );
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    let generic_ty = match session.cx.kind(exprs[0]) {
        ExprKind::GenericClassDef { defined_type, .. } => *defined_type,
        other => panic!("expected generic class, got {:?}", other),
    };
    let generic = session.cx.types.generic(generic_ty).unwrap();
    assert_eq!(generic.expansions.len(), 2);

    // a and b share one expansion
    let ty_of = |i: usize| {
        let expr = exprs[i];
        match session.cx.kind(expr) {
            ExprKind::VariableDecl { type_ref, .. } => session
                .cx
                .types
                .actual(session.cx.type_ref_type(*type_ref)),
            other => panic!("expected decl, got {:?}", other),
        }
    };
    assert_eq!(ty_of(1), ty_of(2));
    assert_ne!(ty_of(1), ty_of(3));
}

#[test]
fn test_generic_ref_rewritten_to_class() {
    let (session, module) = compile_ok("class Box<T> { value:T; } b:Box<float>;");
    assert_invariants(&session, module.body);
    let exprs = module_exprs(&session, &module);
    match session.cx.kind(exprs[1]) {
        ExprKind::VariableDecl { type_ref, .. } => {
            let ty = session.cx.type_ref_type(*type_ref);
            assert!(session.cx.types.is_class(ty));
            assert!(!session.cx.types.is_generic(ty));
            let class = session
                .cx
                .types
                .class(session.cx.types.actual(ty))
                .unwrap();
            assert!(class.generic_of.is_some());
        }
        other => panic!("expected decl, got {:?}", other),
    }
}

#[test]
fn test_clone_law_under_empty_context() {
    let mut session = Session::new();
    let (module, errors) = session.compile("x:int = 1; if (x) x + 2; else x - 2;");
    assert!(!errors.has_errors());
    let module = module.unwrap();

    let context = anodec_ast::TemplateExpansionContext {
        kind: anodec_ast::ExpansionKind::NamedTemplate,
        args: Vec::new(),
    };
    let clone = session.cx.deep_copy_expand(module.body, &context);
    assert!(anodec_ast::structurally_equal(
        &session.cx,
        module.body,
        clone
    ));
}

// ---------------------------------------------------------------------------
// module chaining
// ---------------------------------------------------------------------------

#[test]
fn test_exports_visible_to_later_modules() {
    let mut session = Session::new();
    let (_, errors) = session.compile("foo:int = 100;");
    assert!(!errors.has_errors());

    let (module, errors) = session.compile("foo + 1;");
    assert!(
        !errors.has_errors(),
        "second module failed: {:#?}",
        errors.diagnostics()
    );
    assert_invariants(&session, module.unwrap().body);
}

#[test]
fn test_function_export() {
    let mut session = Session::new();
    let (_, errors) = session.compile("func add:int(x:int, y:int) x + y;");
    assert!(!errors.has_errors());

    let (_, errors) = session.compile("add(2, 3);");
    assert!(!errors.has_errors(), "{:#?}", errors.diagnostics());
}

#[test]
fn test_type_export() {
    let mut session = Session::new();
    let (_, errors) = session.compile("class Widget { a:int; }");
    assert!(!errors.has_errors());

    let (_, errors) = session.compile("w:Widget; w.a = 1;");
    assert!(!errors.has_errors(), "{:#?}", errors.diagnostics());
}

#[test]
fn test_template_export() {
    let mut session = Session::new();
    let (_, errors) = session.compile("template Decls(T) { tvalue:T; }");
    assert!(!errors.has_errors());

    let (_, errors) = session.compile("expand Decls<int>; tvalue = 2;");
    assert!(!errors.has_errors(), "{:#?}", errors.diagnostics());
}

#[test]
fn test_export_collision_first_come_first_served() {
    let mut session = Session::new();
    let (_, errors) = session.compile("foo:int = 1;");
    assert!(!errors.has_errors());

    let (_, errors) = session.compile("foo:float;");
    assert_eq!(
        errors.first_error().unwrap().kind,
        ErrorKind::SymbolAlreadyDefinedInScope
    );
}

#[test]
fn test_exported_symbols_are_external_clones() {
    let mut session = Session::new();
    let (module, errors) = session.compile("foo:int = 1; func f:void() 0;");
    assert!(!errors.has_errors());
    let module = module.unwrap();

    let module_scope = module.scope(&session.cx);
    for symbol in session.cx.scope_symbols(module_scope) {
        assert!(!session.cx.symbol(symbol).external);
    }

    let global = session.world.global_scope;
    let exported = session.cx.scope_symbols(global);
    assert_eq!(exported.len(), 2);
    for symbol in exported {
        assert!(session.cx.symbol(symbol).external);
    }
}

// ---------------------------------------------------------------------------
// negative paths
// ---------------------------------------------------------------------------

#[test]
fn test_undefined_variable() {
    assert_eq!(compile_err("a = 1;"), ErrorKind::VariableNotDefined);
}

#[test]
fn test_use_before_definition() {
    assert_eq!(
        compile_err("func f:void() { y; y:int; }"),
        ErrorKind::VariableUsedBeforeDefinition
    );
}

#[test]
fn test_duplicate_declaration() {
    assert_eq!(
        compile_err("x:int; x:float;"),
        ErrorKind::SymbolAlreadyDefinedInScope
    );
}

#[test]
fn test_bool_explicit_cast_forbidden() {
    assert_eq!(compile_err("cast<bool>(true);"), ErrorKind::InvalidExplicitCast);
}

#[test]
fn test_class_to_bool_assignment_rejected() {
    assert_eq!(
        compile_err("class W { a:int; } w:W; foo:bool = w;"),
        ErrorKind::InvalidImplicitCastInBinaryExpr
    );
}

#[test]
fn test_class_in_if_condition_rejected() {
    assert_eq!(
        compile_err("class W { a:int; } w:W; if (w) 1;"),
        ErrorKind::InvalidImplicitCastInIfCondition
    );
}

#[test]
fn test_class_in_while_condition_rejected() {
    assert_eq!(
        compile_err("class W { a:int; } w:W; while (w) 1;"),
        ErrorKind::InvalidImplicitCastInInWhileCondition
    );
}

#[test]
fn test_if_branch_type_mismatch() {
    assert_eq!(
        compile_err("class W { a:int; } w:W; (? true, w, 1);"),
        ErrorKind::InvalidImplicitCastInIfBodies
    );
}

#[test]
fn test_assert_condition_class_rejected() {
    assert_eq!(
        compile_err("class W { a:int; } w:W; assert(w);"),
        ErrorKind::InvalidImplicitCastInAssertCondition
    );
}

#[test]
fn test_implicit_return_narrowing_rejected() {
    assert_eq!(
        compile_err("func f:int(x:double) x;"),
        ErrorKind::InvalidImplicitCastInImplicitReturn
    );
}

#[test]
fn test_call_argument_mismatch() {
    assert_eq!(
        compile_err("class W { a:int; } w:W; func f:int(x:int) x; f(w);"),
        ErrorKind::InvalidImplicitCastInFunctionCallArgument
    );
}

#[test]
fn test_assign_to_literal_rejected() {
    assert_eq!(compile_err("1 = 2;"), ErrorKind::CannotAssignToLValue);
}

#[test]
fn test_bool_arithmetic_rejected() {
    assert_eq!(
        compile_err("true + false;"),
        ErrorKind::OperatorCannotBeUsedWithType
    );
}

#[test]
fn test_dot_on_non_class() {
    assert_eq!(
        compile_err("x:int; x.field;"),
        ErrorKind::LeftOfDotNotClass
    );
}

#[test]
fn test_missing_class_member() {
    assert_eq!(
        compile_err("class W { a:int; } w:W; w.missing;"),
        ErrorKind::ClassMemberNotFound
    );
}

#[test]
fn test_missing_method() {
    assert_eq!(
        compile_err("class W { a:int; } w:W; w.run();"),
        ErrorKind::MethodNotDefined
    );
}

#[test]
fn test_call_of_non_function() {
    assert_eq!(
        compile_err("x:int = 5; x(1);"),
        ErrorKind::ExpressionIsNotFunction
    );
}

#[test]
fn test_wrong_argument_count() {
    assert_eq!(
        compile_err("func f:int(x:int) x; f(1, 2);"),
        ErrorKind::IncorrectNumberOfArguments
    );
}

#[test]
fn test_unknown_type() {
    assert_eq!(compile_err("x:NoSuchType;"), ErrorKind::SymbolNotDefined);
}

#[test]
fn test_symbol_is_not_a_type() {
    assert_eq!(compile_err("foo:int; x:foo;"), ErrorKind::SymbolIsNotAType);
}

#[test]
fn test_expand_of_non_template() {
    assert_eq!(
        compile_err("Foo:int; expand Foo<int>;"),
        ErrorKind::SymbolIsNotATemplate
    );
}

#[test]
fn test_expand_of_unknown_symbol() {
    assert_eq!(compile_err("expand Foo<int>;"), ErrorKind::SymbolNotDefined);
}

#[test]
fn test_circular_template_expansion() {
    assert_eq!(
        compile_err(
            "template A(T) { expand B<T>; } template B(T) { expand A<T>; } expand A<int>;"
        ),
        ErrorKind::CircularTemplateReference
    );
}

#[test]
fn test_template_argument_count() {
    assert_eq!(
        compile_err("template Decls(T, U) { v:T; } expand Decls<int>;"),
        ErrorKind::IncorrectNumberOfTemplateArguments
    );
}

#[test]
fn test_generic_argument_count() {
    assert_eq!(
        compile_err("class Stack<T> { top:T; } s:Stack<int, float>;"),
        ErrorKind::IncorrectNumberOfGenericArguments
    );
}

#[test]
fn test_non_generic_with_arguments() {
    assert_eq!(
        compile_err("class Widget { a:int; } w:Widget<int>;"),
        ErrorKind::TypeIsNotGenericButIsReferencedWithGenericArgs
    );
}

#[test]
fn test_namespace_does_not_exist() {
    assert_eq!(compile_err("a::b;"), ErrorKind::NamespaceDoesNotExist);
}

#[test]
fn test_identifier_is_not_namespace() {
    assert_eq!(compile_err("x:int; x::y;"), ErrorKind::IdentifierIsNotNamespace);
}

#[test]
fn test_child_namespace_does_not_exist() {
    assert_eq!(
        compile_err("namespace a { v:int; } a::b::c;"),
        ErrorKind::ChildNamespaceDoesNotExist
    );
}

#[test]
fn test_namespace_member_is_not_namespace() {
    assert_eq!(
        compile_err("namespace a { x:int; } a::x::y;"),
        ErrorKind::MemberOfNamespaceIsNotNamespace
    );
}

#[test]
fn test_namespace_member_does_not_exist() {
    assert_eq!(
        compile_err("namespace a { v:int; } a::missing;"),
        ErrorKind::NamespaceMemberDoesNotExist
    );
}

#[test]
fn test_anonymous_template_contents_restricted() {
    assert_eq!(
        compile_err("template (T) { v:int; }"),
        ErrorKind::OnlyClassesAllowedInAnonymousTemplates
    );
}

#[test]
fn test_expansion_error_carries_context() {
    let mut session = Session::new();
    let (_, errors) = session.compile(
        "template Decls(T) { v:T; w:NoSuch; } expand Decls<int>;",
    );
    assert!(errors.has_errors());
    let first = errors.first_error().unwrap();
    assert!(first.message.contains("While inside template expansion at:"));
}
