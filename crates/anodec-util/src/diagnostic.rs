//! Compilation diagnostics.
//!
//! Every distinct user-facing condition the front end can report is listed
//! in [`ErrorKind`]. The closed enum lets integration tests assert that a
//! semantic check failed for the expected reason rather than matching on
//! message text.
//!
//! [`ErrorStream`] is the collector all passes report through: it counts
//! errors and warnings, remembers the first error, and keeps a stack of
//! context messages that are prepended to anything reported while the stack
//! is non-empty (template expansion pushes one).

use std::fmt;

use crate::span::SourceSpan;

/// Every distinct kind of compilation error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoError,

    // Lexer errors
    UnexpectedCharacter,
    InvalidLiteralInt32,
    InvalidLiteralFloat,
    UnexpectedEofInMultilineComment,

    // Parser errors
    UnexpectedToken,
    Syntax,
    SurpriseToken,

    // Semantic errors
    InvalidImplicitCastInBinaryExpr,
    InvalidImplicitCastInIfCondition,
    InvalidImplicitCastInIfBodies,
    InvalidImplicitCastInInWhileCondition,
    InvalidImplicitCastInImplicitReturn,
    InvalidImplicitCastInFunctionCallArgument,
    InvalidImplicitCastInAssertCondition,
    SymbolAlreadyDefinedInScope,
    VariableNotDefined,
    VariableUsedBeforeDefinition,
    TypeNotDefined,
    InvalidExplicitCast,
    CannotAssignToLValue,
    SymbolIsNotAType,
    OperatorCannotBeUsedWithType,
    LeftOfDotNotClass,
    ClassMemberNotFound,
    ExpressionIsNotFunction,
    IncorrectNumberOfArguments,
    MethodNotDefined,
    SymbolNotDefined,
    NamespaceDoesNotExist,
    IdentifierIsNotNamespace,
    ChildNamespaceDoesNotExist,
    NamespaceMemberDoesNotExist,
    MemberOfNamespaceIsNotNamespace,
    SymbolIsNotATemplate,
    CircularTemplateReference,
    IncorrectNumberOfTemplateArguments,
    IncorrectNumberOfGenericArguments,
    TypeIsNotGenericButIsReferencedWithGenericArgs,
    GenericTypeWasNotExpandedWithSpecifiedArguments,
    OnlyClassesAllowedInAnonymousTemplates,
}

/// One reported diagnostic.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Which check failed.
    pub kind: ErrorKind,
    /// Where.
    pub span: SourceSpan,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.span, self.message)
    }
}

/// Collector for diagnostics produced while compiling one or more modules.
///
/// # Examples
///
/// ```
/// use anodec_util::{ErrorKind, ErrorStream, SourceSpan};
///
/// let mut errors = ErrorStream::new();
/// errors.error(ErrorKind::VariableNotDefined, SourceSpan::any(), "no such variable".into());
/// assert_eq!(errors.error_count(), 1);
/// assert_eq!(errors.first_error().unwrap().kind, ErrorKind::VariableNotDefined);
/// ```
#[derive(Default)]
pub struct ErrorStream {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    first_error: Option<Diagnostic>,
    context_stack: Vec<String>,
}

impl ErrorStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a context message prepended to subsequently reported
    /// diagnostics until popped.
    pub fn push_context(&mut self, message: String) {
        self.context_stack.push(message);
    }

    /// Pop the most recent context message.
    ///
    /// # Panics
    ///
    /// Panics if the context stack is empty; pushes and pops must pair up.
    pub fn pop_context(&mut self) {
        self.context_stack
            .pop()
            .expect("popped an empty diagnostic context stack");
    }

    /// Report an error.
    pub fn error(&mut self, kind: ErrorKind, span: SourceSpan, message: String) {
        let message = self.contextualize(message);
        let diagnostic = Diagnostic { kind, span, message };
        if self.error_count == 0 {
            self.first_error = Some(diagnostic.clone());
        }
        self.error_count += 1;
        self.diagnostics.push(diagnostic);
    }

    /// Report a warning. Warnings do not stop the pipeline.
    pub fn warning(&mut self, span: SourceSpan, message: String) {
        self.warning_count += 1;
        let message = self.contextualize(message);
        self.diagnostics.push(Diagnostic {
            kind: ErrorKind::NoError,
            span,
            message,
        });
    }

    fn contextualize(&self, message: String) -> String {
        if self.context_stack.is_empty() {
            return message;
        }
        let mut out = String::new();
        for context in &self.context_stack {
            out.push_str(context);
            out.push('\n');
        }
        out.push_str(&message);
        out
    }

    /// Number of errors reported so far.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Number of warnings reported so far.
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// True if at least one error was reported.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// The first reported error, if any.
    pub fn first_error(&self) -> Option<Diagnostic> {
        self.first_error.clone()
    }

    /// All diagnostics in report order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain the collected diagnostics, keeping the counters.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
