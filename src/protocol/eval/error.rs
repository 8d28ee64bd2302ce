use std::fmt;

use backtrace::Backtrace;

use crate::protocol::input_source::{ErrorStatement, InputSource, InputSpan, StatementKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum EvalErrorKind {
    #[display(fmt = "unbound variable")]
    UnboundVariable,
    #[display(fmt = "duplicate binding")]
    DuplicateBinding,
    #[display(fmt = "type mismatch")]
    TypeMismatch,
    #[display(fmt = "invalid l-value")]
    InvalidLValue,
    // A bug in the runtime rather than in the program being run
    #[display(fmt = "internal invariant violated")]
    InternalInvariant,
}

/// Represents an error that occurred while compiling or executing a
/// statement. Errors are fatal to the run: they are created deep inside the
/// compiler or the VM with only a message, and gain a span and the source
/// context on their way back up to the runtime.
#[derive(Debug, Clone)]
pub struct EvalError {
    pub(crate) kind: EvalErrorKind,
    pub(crate) message: String,
    pub(crate) span: Option<InputSpan>,
    pub(crate) statements: Vec<ErrorStatement>,
    // Only captured for internal invariant violations
    pub(crate) backtrace: Option<Backtrace>,
}

impl EvalError {
    pub(crate) fn new(kind: EvalErrorKind, message: String) -> Self {
        debug_assert!(kind != EvalErrorKind::InternalInvariant, "use EvalError::internal");
        Self{
            kind,
            message,
            span: None,
            statements: Vec::new(),
            backtrace: None,
        }
    }

    pub(crate) fn new_at_span(kind: EvalErrorKind, span: InputSpan, message: String) -> Self {
        Self::new(kind, message).with_span(span)
    }

    pub(crate) fn internal(message: &str) -> Self {
        Self{
            kind: EvalErrorKind::InternalInvariant,
            message: message.to_string(),
            span: None,
            statements: Vec::new(),
            backtrace: Some(Backtrace::new()),
        }
    }

    /// Attaches the span of the offending code, unless a more precise one was
    /// already attached.
    pub(crate) fn with_span(mut self, span: InputSpan) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    /// Resolves the span against the source, producing the error statement
    /// that points the user to the offending code.
    pub(crate) fn with_source(mut self, source: &InputSource) -> Self {
        if let (Some(span), true) = (self.span, self.statements.is_empty()) {
            self.statements.push(ErrorStatement::from_source_at_span(
                StatementKind::Error, source, span, self.message.clone()
            ));
        }
        self
    }

    pub fn kind(&self) -> EvalErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Option<InputSpan> {
        self.span
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            writeln!(f, "ERROR: {}", &self.message)?;
        } else {
            self.statements[0].fmt(f)?;
            for statement in self.statements.iter().skip(1) {
                writeln!(f)?;
                statement.fmt(f)?;
            }
        }

        if let Some(backtrace) = &self.backtrace {
            writeln!(f)?;
            writeln!(f, " +-  Backtrace ({}):", self.kind)?;
            write!(f, "{:?}", backtrace)?;
        }

        Ok(())
    }
}
