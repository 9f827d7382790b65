pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod format;
pub mod interpreter;
pub mod lexer;
pub mod token;
pub mod value;

pub use ast::{Block, Expr, ExprKind, Program, Stmt};
pub use error::Error;
pub use interpreter::{parse, parse_and_run, parse_and_run_with_diagnostics, Interpreter};
pub use lexer::tokenize;
pub use token::{Token, TokenKind};
pub use value::Value;
