use std::fmt;

use crate::diagnostic::{Position, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Bind,
    To,
    Mirror,
    If,
    Else,
    While,
    Fn,
    Return,
    And,
    Or,
    Not,

    // Literals and identifiers
    Ident(String),
    Number(f64),
    Str(String),
    Bool(bool),

    // Punctuation
    Assign,
    Comma,
    Colon,
    Semicolon,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,

    Eof,
}

/// Reserved words. `true` and `false` are handled separately as boolean literals.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("bind", TokenKind::Bind),
    ("to", TokenKind::To),
    ("mirror", TokenKind::Mirror),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("fn", TokenKind::Fn),
    ("return", TokenKind::Return),
    ("and", TokenKind::And),
    ("or", TokenKind::Or),
    ("not", TokenKind::Not),
];

pub const SINGLE_CHAR_TOKENS: &[(char, TokenKind)] = &[
    ('=', TokenKind::Assign),
    (',', TokenKind::Comma),
    (':', TokenKind::Colon),
    (';', TokenKind::Semicolon),
    ('{', TokenKind::LBrace),
    ('}', TokenKind::RBrace),
    ('[', TokenKind::LBracket),
    (']', TokenKind::RBracket),
    ('(', TokenKind::LParen),
    (')', TokenKind::RParen),
    ('+', TokenKind::Plus),
    ('-', TokenKind::Minus),
    ('*', TokenKind::Star),
    ('/', TokenKind::Slash),
    ('<', TokenKind::Less),
    ('>', TokenKind::Greater),
];

pub fn keyword(word: &str) -> Option<TokenKind> {
    match word {
        "true" => Some(TokenKind::Bool(true)),
        "false" => Some(TokenKind::Bool(false)),
        _ => KEYWORDS
            .iter()
            .find(|(text, _)| *text == word)
            .map(|(_, kind)| kind.clone()),
    }
}

pub fn punctuation(ch: char) -> Option<TokenKind> {
    SINGLE_CHAR_TOKENS
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, kind)| kind.clone())
}

impl TokenKind {
    /// Whether a token of this kind can begin an expression.
    pub fn starts_expression(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Number(_)
                | TokenKind::Str(_)
                | TokenKind::Bool(_)
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Minus
                | TokenKind::Not
        )
    }

    /// Human readable description used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier `{}`", name),
            TokenKind::Number(n) => format!("number `{}`", n),
            TokenKind::Str(s) => format!("string \"{}\"", s),
            TokenKind::Bool(b) => format!("boolean `{}`", b),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("`{}`", other),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Bind => "bind",
            TokenKind::To => "to",
            TokenKind::Mirror => "mirror",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Fn => "fn",
            TokenKind::Return => "return",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::Ident(name) => return write!(f, "{}", name),
            TokenKind::Number(n) => return write!(f, "{}", n),
            TokenKind::Str(s) => return write!(f, "\"{}\"", s),
            TokenKind::Bool(b) => return write!(f, "{}", b),
            TokenKind::Assign => "=",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::LessEq => "<=",
            TokenKind::GreaterEq => ">=",
            TokenKind::Eof => "<eof>",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, position: Position) -> Self {
        Self {
            kind,
            span,
            position,
        }
    }
}
