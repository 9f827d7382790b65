use crate::diagnostic::{Diagnostic, Span};
use crate::interpreter::error::RuntimeError;
use crate::interpreter::parser::ParseError;
use crate::lexer::LexError;
use thiserror::Error;

/// Failure from any phase of running a program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("LexError: {0}")]
    Lex(#[from] LexError),
    #[error("ParseError: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Error::Lex(err) => err.span(),
            Error::Parse(err) => err.span,
            Error::Runtime(err) => err.span(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Lex(err) => err.to_diagnostic(),
            Error::Parse(err) => err.to_diagnostic(),
            Error::Runtime(err) => err.to_diagnostic(),
        }
    }
}
