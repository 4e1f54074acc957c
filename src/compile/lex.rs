//! Tokenizing of the pattern, including bracket expressions

use super::error::{HelpMsg, SyntaxError, SyntaxErrorKind};
use super::Span;
use crate::class::{Class, ClassId, ClassTable};
use std::iter::Peekable;
use std::str::CharIndices;

/// An operator that may be pushed onto the parser's operator stack
///
/// The ordering of the variants is their priority: reducing for an incoming operator pops every
/// pending operator that is at least as high.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operator {
    // Bottom of the operator stack; never produced by the lexer
    Sentinel,
    LParen,
    Alternate,
    Concat,
    Star,
    Plus,
    Quest,
}

impl Operator {
    /// The character used to refer to the operator in error messages
    pub fn symbol(self) -> Option<char> {
        match self {
            Operator::Sentinel | Operator::Concat => None,
            Operator::LParen => Some('('),
            Operator::Alternate => Some('|'),
            Operator::Star => Some('*'),
            Operator::Plus => Some('+'),
            Operator::Quest => Some('?'),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Char(char),
    Any,
    Bol,
    Eol,
    Class(ClassId),
    NegClass(ClassId),
    Op(Operator),
    RParen,
    End,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
}

/// Tokenizes the entire pattern, returning the tokens (terminated by `TokenKind::End`) and the
/// classes they refer to
pub fn lex(pattern: &str) -> Result<(Vec<Token>, ClassTable), SyntaxError> {
    let mut lexer = Lexer::new(pattern);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        tokens.push(token);
        if token.kind == TokenKind::End {
            return Ok((tokens, lexer.classes));
        }
    }
}

struct Lexer<'p> {
    len: usize,
    chars: Peekable<CharIndices<'p>>,
    classes: ClassTable,
}

// A character from inside a bracket expression; quoted characters never have special meaning
#[derive(Copy, Clone, PartialEq, Eq)]
enum ClassChar {
    Plain(char),
    Quoted(char),
}

impl ClassChar {
    fn value(self) -> char {
        match self {
            ClassChar::Plain(c) | ClassChar::Quoted(c) => c,
        }
    }
}

impl<'p> Lexer<'p> {
    fn new(pattern: &'p str) -> Self {
        Lexer {
            len: pattern.len(),
            chars: pattern.char_indices().peekable(),
            classes: ClassTable::new(),
        }
    }

    /// The byte offset of the next unconsumed character
    fn offset(&mut self) -> usize {
        self.chars.peek().map(|&(idx, _)| idx).unwrap_or(self.len)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        let (start, c) = match self.chars.next() {
            Some(next) => next,
            None => {
                let span = Span { start: self.len, end: self.len };
                return Ok(Token { span, kind: TokenKind::End });
            }
        };

        let kind = match c {
            // A trailing backslash is left as a literal
            '\\' => match self.chars.next() {
                Some((_, 'n')) => TokenKind::Char('\n'),
                Some((_, c)) => TokenKind::Char(c),
                None => TokenKind::Char('\\'),
            },
            '*' => TokenKind::Op(Operator::Star),
            '+' => TokenKind::Op(Operator::Plus),
            '?' => TokenKind::Op(Operator::Quest),
            '|' => TokenKind::Op(Operator::Alternate),
            '(' => TokenKind::Op(Operator::LParen),
            ')' => TokenKind::RParen,
            '.' => TokenKind::Any,
            '^' => TokenKind::Bol,
            '$' => TokenKind::Eol,
            '[' => self.class(start)?,
            c => TokenKind::Char(c),
        };

        let span = Span { start, end: self.offset() };
        Ok(Token { span, kind })
    }

    // Parses a bracket expression, with the opening '[' at byte offset `open` already consumed
    fn class(&mut self, open: usize) -> Result<TokenKind, SyntaxError> {
        let negated = self.peek_char() == Some('^');
        if negated {
            self.chars.next();
        }

        let mut class = Class::new(negated);
        let mut empty = true;

        loop {
            let lo = match self.class_char(open)? {
                ClassChar::Plain(']') => break,
                ClassChar::Plain('-') => return Err(self.malformed_dash(open)),
                c => c.value(),
            };

            if self.peek_char() == Some('-') {
                self.chars.next();
                let hi = match self.class_char(open)? {
                    ClassChar::Plain(']') => return Err(self.malformed_dash(open)),
                    c => c.value(),
                };
                class.push_range(lo, hi);
            } else {
                class.push_char(lo);
            }

            empty = false;
        }

        if empty {
            let span = Span { start: open, end: self.offset() };
            return Err(SyntaxError::new(span, SyntaxErrorKind::EmptyClass));
        }

        let id = self.classes.push(class);
        Ok(match negated {
            true => TokenKind::NegClass(id),
            false => TokenKind::Class(id),
        })
    }

    fn class_char(&mut self, open: usize) -> Result<ClassChar, SyntaxError> {
        let unterminated = |this: &mut Self| {
            let span = Span { start: open, end: this.len };
            SyntaxError::new(span, SyntaxErrorKind::MalformedClass).with_help(&[
                HelpMsg::EscapeToMatchLiteral { name: "open bracket", escaped: r"\[" },
            ])
        };

        match self.chars.next() {
            None => Err(unterminated(self)),
            Some((_, '\\')) => match self.chars.next() {
                None => Err(unterminated(self)),
                Some((_, 'n')) => Ok(ClassChar::Plain('\n')),
                Some((_, c)) => Ok(ClassChar::Quoted(c)),
            },
            Some((_, c)) => Ok(ClassChar::Plain(c)),
        }
    }

    fn malformed_dash(&mut self, open: usize) -> SyntaxError {
        let span = Span { start: open, end: self.offset() };
        SyntaxError::new(span, SyntaxErrorKind::MalformedClass).with_help(&[HelpMsg::EscapeDashInClass])
    }
}
