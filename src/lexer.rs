use chumsky::prelude::*;
use thiserror::Error;

use crate::diagnostic::{Diagnostic, Label, Position, Span};
use crate::token::{keyword, punctuation, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {position}")]
    UnexpectedChar {
        ch: char,
        position: Position,
        span: Span,
    },
    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position, span: Span },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            Self::UnexpectedChar { position, .. } | Self::UnterminatedString { position, .. } => {
                *position
            }
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedChar { span, .. } | Self::UnterminatedString { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::UnexpectedChar { ch, span, .. } => {
                Diagnostic::error(format!("unexpected character '{}'", ch))
                    .with_code("E0001")
                    .with_label(Label::primary(*span, "not part of the language"))
            }
            Self::UnterminatedString { span, .. } => Diagnostic::error("unterminated string")
                .with_code("E0002")
                .with_label(Label::primary(*span, "string starts here"))
                .with_help("close the string with `\"` before the end of the line"),
        }
    }
}

/// Raw scanner output. Bad input is kept as a lexeme so the scan never fails and the
/// first problem can be reported with its exact location.
#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Token(TokenKind),
    UnterminatedString,
    Unexpected(char),
}

fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<(Lexeme, SimpleSpan)>, extra::Err<Rich<'a, char>>>
{
    let number = text::digits(10)
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .map(|s: &str| Lexeme::Token(TokenKind::Number(s.parse().unwrap_or_default())));

    let string = just('"')
        .ignore_then(none_of("\"\n").repeated().to_slice())
        .then(just('"').or_not())
        .map(|(body, closing): (&str, Option<char>)| match closing {
            Some(_) => Lexeme::Token(TokenKind::Str(body.to_string())),
            None => Lexeme::UnterminatedString,
        });

    let word = text::ascii::ident().map(|s: &str| {
        Lexeme::Token(keyword(s).unwrap_or_else(|| TokenKind::Ident(s.to_string())))
    });

    let double = choice((
        just("==").to(TokenKind::Eq),
        just("!=").to(TokenKind::NotEq),
        just("<=").to(TokenKind::LessEq),
        just(">=").to(TokenKind::GreaterEq),
    ))
    .map(Lexeme::Token);

    let single = any()
        .filter(|c: &char| punctuation(*c).is_some())
        .map(|c: char| punctuation(c).map_or(Lexeme::Unexpected(c), Lexeme::Token));

    let unexpected = any().map(Lexeme::Unexpected);

    let comment = just(";;").then(none_of("\n").repeated()).ignored();
    let whitespace = any().filter(|c: &char| c.is_whitespace()).ignored();
    let trivia = choice((comment, whitespace)).repeated();

    let lexeme = choice((number, string, word, double, single, unexpected))
        .map_with(|lexeme, e| (lexeme, e.span()));

    trivia
        .clone()
        .ignore_then(lexeme)
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(trivia)
        .then_ignore(end())
}

/// Walks the source once, turning monotonically increasing byte offsets into
/// line/column positions.
struct LineTracker<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> LineTracker<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn position_of(&mut self, target: usize) -> Position {
        if target > self.offset {
            for ch in self.source[self.offset..target].chars() {
                if ch == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
            }
            self.offset = target;
        }
        Position::new(self.line, self.column)
    }
}

/// Converts source text into tokens, always terminated by a single `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    tokenize_from(source, 0)
}

/// Tokenizes `source[start..]` with spans and positions measured from the start of
/// `source`, so a REPL can keep one growing buffer for every entry.
pub fn tokenize_from(source: &str, start: usize) -> Result<Vec<Token>, LexError> {
    let mut tracker = LineTracker::new(source);
    let text = source.get(start..).unwrap_or_default();

    let lexemes = lexer().parse(text).into_result().map_err(|errors| {
        let offset = start + errors.first().map_or(0, |err| err.span().start);
        let ch = source[offset..].chars().next().unwrap_or('\0');
        LexError::UnexpectedChar {
            ch,
            position: LineTracker::new(source).position_of(offset),
            span: Span::new(offset, offset + ch.len_utf8()),
        }
    })?;

    let mut tokens = Vec::with_capacity(lexemes.len() + 1);
    for (lexeme, simple_span) in lexemes {
        let span = Span::new(start + simple_span.start, start + simple_span.end);
        let position = tracker.position_of(span.start);
        match lexeme {
            Lexeme::Token(kind) => tokens.push(Token::new(kind, span, position)),
            Lexeme::UnterminatedString => {
                return Err(LexError::UnterminatedString {
                    position,
                    span: Span::new(span.start, span.start + 1),
                });
            }
            Lexeme::Unexpected(ch) => {
                return Err(LexError::UnexpectedChar { ch, position, span });
            }
        }
    }

    let end = source.len();
    let position = tracker.position_of(end);
    tokens.push(Token::new(TokenKind::Eof, Span::new(end, end), position));
    log::trace!("tokenized {} bytes into {} tokens", text.len(), tokens.len());
    Ok(tokens)
}
