use anodec_ast::{
    AstContext, BinaryOp, CastKind, ExprKind, Module, StorageKind, UnaryOp, VariableAccess,
};
use anodec_lex::Lexer;
use anodec_util::{ErrorKind, ErrorStream, Name};

use crate::Parser;

/// Parse a module, returning the context, module and collected errors.
fn parse_source(source: &str) -> (AstContext, Option<Module>, ErrorStream) {
    let mut cx = AstContext::new();
    let mut errors = ErrorStream::new();
    let module = {
        let lexer = Lexer::new(Name::intern("test"), source, &mut errors);
        let mut parser = Parser::new(lexer, &mut cx);
        parser.parse_module("test").ok()
    };
    (cx, module, errors)
}

/// Parse a module expected to succeed and return its top-level statements.
fn parse_ok(source: &str) -> (AstContext, Vec<anodec_ast::NodeId>) {
    let (cx, module, errors) = parse_source(source);
    assert!(
        !errors.has_errors(),
        "unexpected parse errors: {:?}",
        errors.diagnostics()
    );
    let module = module.expect("parse aborted");
    let exprs = match cx.kind(module.body) {
        ExprKind::Compound { exprs, .. } => exprs.clone(),
        _ => panic!("module body is not a compound"),
    };
    (cx, exprs)
}

#[test]
fn test_literal_statement() {
    let (cx, exprs) = parse_ok("42;");
    assert_eq!(exprs.len(), 1);
    assert!(matches!(
        cx.kind(exprs[0]),
        ExprKind::LiteralInt32 { value: 42 }
    ));
}

#[test]
fn test_precedence_mul_over_add() {
    let (cx, exprs) = parse_ok("1 + 2 * 3;");
    match cx.kind(exprs[0]) {
        ExprKind::Binary { op, rhs, .. } => {
            assert_eq!(*op, BinaryOp::Add);
            assert!(matches!(
                cx.kind(*rhs),
                ExprKind::Binary {
                    op: BinaryOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("expected binary add, got {:?}", other),
    }
}

#[test]
fn test_left_associativity() {
    // a - b - c parses as (a - b) - c
    let (cx, exprs) = parse_ok("a - b - c;");
    match cx.kind(exprs[0]) {
        ExprKind::Binary { op, lhs, rhs, .. } => {
            assert_eq!(*op, BinaryOp::Sub);
            assert!(matches!(cx.kind(*lhs), ExprKind::Binary { .. }));
            assert!(matches!(cx.kind(*rhs), ExprKind::VariableRef { .. }));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_assignment_right_associativity() {
    // a = b = c parses as a = (b = c)
    let (cx, exprs) = parse_ok("a = b = c;");
    match cx.kind(exprs[0]) {
        ExprKind::Binary { op, lhs, rhs, .. } => {
            assert_eq!(*op, BinaryOp::Assign);
            assert!(matches!(cx.kind(*lhs), ExprKind::VariableRef { .. }));
            assert!(matches!(
                cx.kind(*rhs),
                ExprKind::Binary {
                    op: BinaryOp::Assign,
                    ..
                }
            ));
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_assignment_marks_write_access() {
    let (cx, exprs) = parse_ok("a = 1;");
    match cx.kind(exprs[0]) {
        ExprKind::Binary { lhs, .. } => match cx.kind(*lhs) {
            ExprKind::VariableRef { access, .. } => assert_eq!(*access, VariableAccess::Write),
            other => panic!("expected variable ref, got {:?}", other),
        },
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_dot_write_marking() {
    let (cx, exprs) = parse_ok("w.a = 1;");
    match cx.kind(exprs[0]) {
        ExprKind::Binary { lhs, .. } => match cx.kind(*lhs) {
            ExprKind::Dot { is_write, .. } => assert!(*is_write),
            other => panic!("expected dot, got {:?}", other),
        },
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_variable_declaration() {
    let (cx, exprs) = parse_ok("foo:int = 100;");
    match cx.kind(exprs[0]) {
        ExprKind::Binary { op, lhs, .. } => {
            assert_eq!(*op, BinaryOp::Assign);
            match cx.kind(*lhs) {
                ExprKind::VariableDecl { name, access, .. } => {
                    assert_eq!(name.text.as_str(), "foo");
                    assert_eq!(*access, VariableAccess::Write);
                }
                other => panic!("expected declaration, got {:?}", other),
            }
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_unary_binds_tighter_than_binary() {
    // !a && b parses as (!a) && b
    let (cx, exprs) = parse_ok("!a && b;");
    match cx.kind(exprs[0]) {
        ExprKind::Binary { op, lhs, .. } => {
            assert_eq!(*op, BinaryOp::LogicalAnd);
            assert!(matches!(
                cx.kind(*lhs),
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    ..
                }
            ));
        }
        other => panic!("expected logical and, got {:?}", other),
    }
}

#[test]
fn test_ternary() {
    let (cx, exprs) = parse_ok("(? a, 1, 2);");
    match cx.kind(exprs[0]) {
        ExprKind::If { els, .. } => assert!(els.is_some()),
        other => panic!("expected if/ternary, got {:?}", other),
    }
}

#[test]
fn test_if_without_semicolon() {
    let (cx, exprs) = parse_ok("if (1) 2; else 3;");
    assert_eq!(exprs.len(), 1);
    match cx.kind(exprs[0]) {
        ExprKind::If { els, .. } => assert!(els.is_some()),
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_while() {
    let (cx, exprs) = parse_ok("while (a < 10) { a = a + 1; }");
    assert!(matches!(cx.kind(exprs[0]), ExprKind::While { .. }));
}

#[test]
fn test_compound_scope_is_local() {
    let (cx, exprs) = parse_ok("{ 1; 2; }");
    match cx.kind(exprs[0]) {
        ExprKind::Compound { scope, exprs } => {
            assert_eq!(cx.scope(*scope).storage, StorageKind::Local);
            assert_eq!(exprs.len(), 2);
        }
        other => panic!("expected compound, got {:?}", other),
    }
}

#[test]
fn test_func_def() {
    let (cx, exprs) = parse_ok("func add:int(x:int, y:int) x + y;");
    match cx.kind(exprs[0]) {
        ExprKind::FuncDef { name, params, .. } => {
            assert_eq!(name.text.as_str(), "add");
            assert_eq!(params.len(), 2);
            assert_eq!(params[0].name.text.as_str(), "x");
        }
        other => panic!("expected func def, got {:?}", other),
    }
}

#[test]
fn test_func_call() {
    let (cx, exprs) = parse_ok("add(2, 3);");
    match cx.kind(exprs[0]) {
        ExprKind::FuncCall { instance, args, .. } => {
            assert!(instance.is_none());
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn test_method_call_rewrite() {
    let (cx, exprs) = parse_ok("w.area();");
    match cx.kind(exprs[0]) {
        ExprKind::FuncCall {
            instance, callee, ..
        } => {
            assert!(instance.is_some());
            match cx.kind(*callee) {
                ExprKind::MethodRef { name, .. } => assert_eq!(name.text.as_str(), "area"),
                other => panic!("expected method ref, got {:?}", other),
            }
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn test_class_def() {
    let (cx, exprs) = parse_ok("class Widget { a:int; b:float; }");
    match cx.kind(exprs[0]) {
        ExprKind::CompleteClassDef { name, body, .. } => {
            assert_eq!(name.text.as_str(), "Widget");
            match cx.kind(*body) {
                ExprKind::Compound { scope, exprs } => {
                    assert_eq!(cx.scope(*scope).storage, StorageKind::Instance);
                    assert_eq!(exprs.len(), 2);
                }
                other => panic!("expected compound body, got {:?}", other),
            }
        }
        other => panic!("expected class def, got {:?}", other),
    }
}

#[test]
fn test_generic_class_def() {
    let (cx, exprs) = parse_ok("class Stack<T, U> { top:T; }");
    match cx.kind(exprs[0]) {
        ExprKind::GenericClassDef { name, params, .. } => {
            assert_eq!(name.text.as_str(), "Stack");
            assert_eq!(params.len(), 2);
            assert_eq!(params[1].name.text.as_str(), "U");
        }
        other => panic!("expected generic class def, got {:?}", other),
    }
}

#[test]
fn test_namespace() {
    let (cx, exprs) = parse_ok("namespace a::b { foo:int; }");
    match cx.kind(exprs[0]) {
        ExprKind::Namespace { name, body, .. } => {
            assert_eq!(name.qualified(), "a::b");
            assert!(matches!(cx.kind(*body), ExprKind::ExpressionList { .. }));
        }
        other => panic!("expected namespace, got {:?}", other),
    }
}

#[test]
fn test_qualified_variable_ref() {
    let (cx, exprs) = parse_ok("a::b::c;");
    match cx.kind(exprs[0]) {
        ExprKind::VariableRef { name, .. } => assert_eq!(name.qualified(), "a::b::c"),
        other => panic!("expected variable ref, got {:?}", other),
    }
}

#[test]
fn test_named_template() {
    let (cx, exprs) = parse_ok("template Pairs(T) { class Pair { first:T; } }");
    match cx.kind(exprs[0]) {
        ExprKind::NamedTemplate { name, params, body } => {
            assert_eq!(name.text.as_str(), "Pairs");
            assert_eq!(params.len(), 1);
            assert!(matches!(cx.kind(*body), ExprKind::ExpressionList { .. }));
        }
        other => panic!("expected named template, got {:?}", other),
    }
}

#[test]
fn test_anonymous_template() {
    let (cx, exprs) = parse_ok("template (T) { class Box<T> { value:T; } }");
    assert!(matches!(
        cx.kind(exprs[0]),
        ExprKind::AnonymousTemplate { .. }
    ));
}

#[test]
fn test_expand() {
    let (cx, exprs) = parse_ok("expand Pairs<int, float>;");
    match cx.kind(exprs[0]) {
        ExprKind::TemplateExpansion {
            name, type_args, ..
        } => {
            assert_eq!(name.qualified(), "Pairs");
            assert_eq!(type_args.len(), 2);
        }
        other => panic!("expected expansion, got {:?}", other),
    }
}

#[test]
fn test_cast() {
    let (cx, exprs) = parse_ok("cast<int>(1.5);");
    match cx.kind(exprs[0]) {
        ExprKind::Cast { kind, .. } => assert_eq!(*kind, CastKind::Explicit),
        other => panic!("expected cast, got {:?}", other),
    }
}

#[test]
fn test_new() {
    let (cx, exprs) = parse_ok("new<Widget>();");
    assert!(matches!(cx.kind(exprs[0]), ExprKind::New { .. }));
}

#[test]
fn test_generic_type_ref_in_declaration() {
    let (cx, exprs) = parse_ok("s:Stack<Stack<float>>;");
    match cx.kind(exprs[0]) {
        ExprKind::VariableDecl { type_ref, .. } => {
            let args = cx.type_ref_args(*type_ref);
            assert_eq!(args.len(), 1);
            assert_eq!(cx.type_ref_args(args[0]).len(), 1);
        }
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_missing_semicolon_reported() {
    let (_, _, errors) = parse_source("1 + 2");
    assert!(errors
        .diagnostics()
        .iter()
        .any(|d| d.kind == ErrorKind::UnexpectedToken));
}

#[test]
fn test_surprise_token_aborts() {
    let (_, module, errors) = parse_source("1 + ;");
    assert!(module.is_none());
    assert_eq!(errors.first_error().unwrap().kind, ErrorKind::SurpriseToken);
}

#[test]
fn test_alias_keyword_is_reserved() {
    let (_, module, errors) = parse_source("alias Foo;");
    assert!(module.is_none());
    assert_eq!(errors.first_error().unwrap().kind, ErrorKind::SurpriseToken);
}

#[test]
fn test_error_location() {
    let (_, _, errors) = parse_source("1 +\n  @;");
    let first = errors.first_error().unwrap();
    assert_eq!(first.kind, ErrorKind::UnexpectedCharacter);
    assert_eq!(first.span.start.line, 2);
    assert_eq!(first.span.start.column, 3);
}
