use crate::diagnostic::{Diagnostic, Label, Span};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("NameError: undefined variable `{name}`")]
    UndefinedVariable { name: String, span: Span },
    #[error("TypeError: {message}")]
    TypeError { message: String, span: Span },
    #[error("ArithmeticError: division by zero")]
    DivisionByZero { span: Span },
    #[error("TypeError: {found} is not callable")]
    NotCallable { found: String, span: Span },
    #[error("ConversionError: {message}")]
    Conversion { message: String, span: Span },
    #[error("IndexError: index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize, span: Span },
    #[error("KeyError: mapping has no key \"{key}\"")]
    KeyNotFound { key: String, span: Span },
    #[error("RecursionError: maximum call depth of {limit} exceeded")]
    RecursionLimit { limit: usize, span: Span },
    #[error("IOError: {message}")]
    Io { message: String, span: Span },
    /// Raised by `exit()`. `Interpreter::run` turns it into an exit status.
    #[error("exit requested with status {code}")]
    Exit { code: i32, span: Span },
}

impl RuntimeError {
    // Spans start out empty and are filled in by the evaluator via `at`.
    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::UndefinedVariable { name: name.into(), span: Span::dummy() }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError { message: message.into(), span: Span::dummy() }
    }

    pub fn division_by_zero() -> Self {
        Self::DivisionByZero { span: Span::dummy() }
    }

    pub fn not_callable(found: impl Into<String>) -> Self {
        Self::NotCallable { found: found.into(), span: Span::dummy() }
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion { message: message.into(), span: Span::dummy() }
    }

    pub fn index_out_of_bounds(index: i64, length: usize) -> Self {
        Self::IndexOutOfBounds { index, length, span: Span::dummy() }
    }

    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into(), span: Span::dummy() }
    }

    pub fn recursion_limit(limit: usize) -> Self {
        Self::RecursionLimit { limit, span: Span::dummy() }
    }

    pub fn io(err: std::io::Error) -> Self {
        Self::Io { message: err.to_string(), span: Span::dummy() }
    }

    pub fn exit(code: i32) -> Self {
        Self::Exit { code, span: Span::dummy() }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UndefinedVariable { span, .. }
            | Self::TypeError { span, .. }
            | Self::DivisionByZero { span }
            | Self::NotCallable { span, .. }
            | Self::Conversion { span, .. }
            | Self::IndexOutOfBounds { span, .. }
            | Self::KeyNotFound { span, .. }
            | Self::RecursionLimit { span, .. }
            | Self::Io { span, .. }
            | Self::Exit { span, .. } => *span,
        }
    }

    fn span_mut(&mut self) -> &mut Span {
        match self {
            Self::UndefinedVariable { span, .. }
            | Self::TypeError { span, .. }
            | Self::DivisionByZero { span }
            | Self::NotCallable { span, .. }
            | Self::Conversion { span, .. }
            | Self::IndexOutOfBounds { span, .. }
            | Self::KeyNotFound { span, .. }
            | Self::RecursionLimit { span, .. }
            | Self::Io { span, .. }
            | Self::Exit { span, .. } => span,
        }
    }

    /// Attach a location, keeping any more precise one already recorded.
    pub fn at(mut self, span: Span) -> Self {
        let slot = self.span_mut();
        if slot.is_dummy() {
            *slot = span;
        }
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let span = self.span();
        match self {
            Self::UndefinedVariable { name, .. } => {
                Diagnostic::error(format!("undefined variable `{}`", name))
                    .with_code("E0201")
                    .with_label(Label::primary(span, "not found in this scope"))
                    .with_help(format!("declare it first with `bind {} to ...`", name))
            }
            Self::TypeError { message, .. } => Diagnostic::error(format!("type error: {}", message))
                .with_code("E0202")
                .with_label(Label::primary(span, "")),
            Self::DivisionByZero { .. } => Diagnostic::error("division by zero")
                .with_code("E0203")
                .with_label(Label::primary(span, "divisor is zero")),
            Self::NotCallable { found, .. } => {
                Diagnostic::error(format!("{} is not callable", found))
                    .with_code("E0204")
                    .with_label(Label::primary(span, "called here"))
            }
            Self::Conversion { message, .. } => {
                Diagnostic::error(format!("conversion failed: {}", message))
                    .with_code("E0205")
                    .with_label(Label::primary(span, ""))
            }
            Self::IndexOutOfBounds { index, length, .. } => Diagnostic::error(format!(
                "index out of bounds: index is {} but length is {}",
                index, length
            ))
            .with_code("E0206")
            .with_label(Label::primary(span, format!("index {} is out of bounds", index))),
            Self::KeyNotFound { key, .. } => {
                Diagnostic::error(format!("mapping has no key \"{}\"", key))
                    .with_code("E0207")
                    .with_label(Label::primary(span, "missing key"))
            }
            Self::RecursionLimit { limit, .. } => {
                Diagnostic::error(format!("maximum call depth of {} exceeded", limit))
                    .with_code("E0208")
                    .with_label(Label::primary(span, "in this call"))
                    .with_note("raise the limit with `--max-depth`")
            }
            Self::Io { message, .. } => Diagnostic::error(format!("i/o failure: {}", message))
                .with_code("E0209")
                .with_label(Label::primary(span, "")),
            Self::Exit { code, .. } => {
                Diagnostic::error(format!("exit({}) called outside a running program", code))
                    .with_code("E0210")
                    .with_label(Label::primary(span, "called here"))
            }
        }
    }
}
