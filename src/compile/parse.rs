//! The actual implementation of pattern parsing & instruction emission

use super::error::{ErrorKind, HelpMsg, SyntaxError, SyntaxErrorKind};
use super::lex::{Operator, Token, TokenKind};
use super::Span;
use crate::exec::MAX_CAPTURES;
use crate::nfa::{Direction, Fragment, InstId, InstKind, Nfa};
use std::mem;

/// Parses the token stream, emitting a complete program into `nfa` and returning its entry point
///
/// The same tokens are parsed once per direction. For `Direction::Backward`, every concatenation
/// is emitted in reverse order (except the final one joining the `Match` instruction), so that
/// the resulting program accepts the same text when it is scanned right-to-left.
pub fn parse(
    tokens: &[Token],
    nfa: &mut Nfa,
    direction: Direction,
    stack_limit: usize,
) -> Result<InstId, ErrorKind> {
    // This function implements a fairly simple operator-precedence parser, with two stacks: one
    // of program fragments (operands) and one of pending operators. Instructions are emitted as
    // operators are reduced, linking together the fragments on the operand stack.
    //
    // Concatenation is implicit in the pattern, so we insert it whenever an operand follows
    // something that behaves like an operand (a literal, a closing parenthesis, or a postfix
    // operator).

    let mut parser = Parser {
        nfa,
        direction,
        stack_limit,
        operands: Vec::new(),
        operators: vec![Pending { op: Operator::Sentinel, span: Span::default(), group: None }],
        last_was_operand: false,
        group_count: 0,
        open_groups: Vec::new(),
    };

    let mut end_span = Span::default();

    for token in tokens {
        let span = token.span;
        match token.kind {
            TokenKind::End => {
                end_span = span;
                break;
            }
            TokenKind::Op(op) => parser.operator(op, span)?,
            TokenKind::RParen => parser.close_group(span)?,
            TokenKind::Char(c) => parser.operand(InstKind::Char(c), span)?,
            TokenKind::Any => parser.operand(InstKind::Any, span)?,
            TokenKind::Bol => parser.operand(InstKind::Bol, span)?,
            TokenKind::Eol => parser.operand(InstKind::Eol, span)?,
            TokenKind::Class(id) => parser.operand(InstKind::Class(id), span)?,
            TokenKind::NegClass(id) => parser.operand(InstKind::NegClass(id), span)?,
        }
    }

    if let Some(&span) = parser.open_groups.last() {
        let err = SyntaxError::new(span, SyntaxErrorKind::UnmatchedOpen).with_help(&[
            HelpMsg::EscapeToMatchLiteral { name: "open parenthesis", escaped: r"\(" },
        ]);
        return Err(ErrorKind::Syntax(err));
    }

    // Reduce everything that's left, then join on the final `Match`
    parser.reduce(Operator::LParen)?;
    parser.operand(InstKind::Match, end_span)?;
    parser.reduce(Operator::LParen)?;

    match parser.operands.as_slice() {
        [frag] => Ok(frag.first),
        _ => unreachable!("operand stack not fully reduced"),
    }
}

struct Parser<'a> {
    nfa: &'a mut Nfa,
    direction: Direction,
    stack_limit: usize,
    operands: Vec<Fragment>,
    // Note: the bottom of the stack is always `Operator::Sentinel`
    operators: Vec<Pending>,
    last_was_operand: bool,
    group_count: usize,
    // Spans of the groups that are currently open, innermost last
    open_groups: Vec<Span>,
}

// An operator waiting to be reduced. `group` is the submatch index of the most recently opened
// group at the time it was pushed, which is only used by `Operator::LParen`
#[derive(Debug, Copy, Clone)]
struct Pending {
    op: Operator,
    span: Span,
    group: Option<usize>,
}

impl<'a> Parser<'a> {
    fn operand(&mut self, kind: InstKind, span: Span) -> Result<(), ErrorKind> {
        if self.last_was_operand {
            self.operator(Operator::Concat, span)?;
        }

        let id = self.nfa.push(kind)?;
        self.push_operand(Fragment::single(id))?;
        self.last_was_operand = true;
        Ok(())
    }

    fn operator(&mut self, op: Operator, span: Span) -> Result<(), ErrorKind> {
        if op == Operator::LParen {
            self.group_count += 1;
            self.open_groups.push(span);
            if self.last_was_operand {
                self.operator(Operator::Concat, span)?;
            }
        } else {
            self.reduce(op)?;
        }

        self.push_operator(op, span)?;
        // postfix operators leave an operand behind them
        self.last_was_operand = matches!(op, Operator::Star | Operator::Plus | Operator::Quest);
        Ok(())
    }

    fn close_group(&mut self, span: Span) -> Result<(), ErrorKind> {
        if self.open_groups.pop().is_none() {
            let err = SyntaxError::new(span, SyntaxErrorKind::UnmatchedClose).with_help(&[
                HelpMsg::EscapeToMatchLiteral { name: "close parenthesis", escaped: r"\)" },
            ]);
            return Err(ErrorKind::Syntax(err));
        }

        loop {
            let pending = self.pop_operator();
            self.apply(pending)?;
            if pending.op == Operator::LParen {
                break;
            }
        }

        self.last_was_operand = true;
        Ok(())
    }

    /// Reduces every pending operator with priority at least `min`, stopping early after an open
    /// parenthesis is reduced
    fn reduce(&mut self, min: Operator) -> Result<(), ErrorKind> {
        while self.top_operator() >= min {
            let pending = self.pop_operator();
            self.apply(pending)?;
            if pending.op == Operator::LParen {
                break;
            }
        }

        Ok(())
    }

    fn apply(&mut self, pending: Pending) -> Result<(), ErrorKind> {
        match pending.op {
            Operator::LParen => {
                let body = self.pop_operand(pending)?;
                let close = self.nfa.push(InstKind::GroupClose(pending.group))?;
                self.nfa.link(body.last, close);
                let open = self.nfa.push(InstKind::GroupOpen(pending.group))?;
                self.nfa.link(open, body.first);
                self.push_operand(Fragment { first: open, last: close })
            }
            Operator::Alternate => {
                let snd = self.pop_operand(pending)?;
                let fst = self.pop_operand(pending)?;
                let exit = self.nfa.push(InstKind::Nop)?;
                self.nfa.link(snd.last, exit);
                self.nfa.link(fst.last, exit);
                let alt = self.nfa.push(InstKind::Alt { right: fst.first })?;
                self.nfa.link(alt, snd.first);
                self.push_operand(Fragment { first: alt, last: exit })
            }
            Operator::Concat => {
                let mut snd = self.pop_operand(pending)?;
                let mut fst = self.pop_operand(pending)?;
                if self.direction == Direction::Backward && self.nfa[snd.first].kind != InstKind::Match {
                    mem::swap(&mut fst, &mut snd);
                }
                self.nfa.link(fst.last, snd.first);
                self.push_operand(Fragment { first: fst.first, last: snd.last })
            }
            Operator::Star => {
                let body = self.pop_operand(pending)?;
                let alt = self.nfa.push(InstKind::Alt { right: body.first })?;
                self.nfa.link(body.last, alt);
                self.push_operand(Fragment::single(alt))
            }
            Operator::Plus => {
                let body = self.pop_operand(pending)?;
                let alt = self.nfa.push(InstKind::Alt { right: body.first })?;
                self.nfa.link(body.last, alt);
                self.push_operand(Fragment { first: body.first, last: alt })
            }
            Operator::Quest => {
                let body = self.pop_operand(pending)?;
                let alt = self.nfa.push(InstKind::Alt { right: body.first })?;
                let exit = self.nfa.push(InstKind::Nop)?;
                self.nfa.link(alt, exit);
                self.nfa.link(body.last, exit);
                self.push_operand(Fragment { first: alt, last: exit })
            }
            Operator::Sentinel => unreachable!("reduced the operator stack sentinel"),
        }
    }

    fn push_operand(&mut self, frag: Fragment) -> Result<(), ErrorKind> {
        if self.operands.len() >= self.stack_limit {
            return Err(ErrorKind::OperandStackOverflow { limit: self.stack_limit });
        }

        self.operands.push(frag);
        Ok(())
    }

    fn pop_operand(&mut self, pending: Pending) -> Result<Fragment, ErrorKind> {
        self.operands.pop().ok_or_else(|| {
            let msg = match pending.op.symbol() {
                Some(op) => SyntaxErrorKind::MissingOperand { op },
                None => SyntaxErrorKind::Malformed,
            };
            ErrorKind::Syntax(SyntaxError::new(pending.span, msg))
        })
    }

    fn push_operator(&mut self, op: Operator, span: Span) -> Result<(), ErrorKind> {
        if self.operators.len() >= self.stack_limit {
            return Err(ErrorKind::OperatorStackOverflow { limit: self.stack_limit });
        }

        let group = Some(self.group_count).filter(|&g| g < MAX_CAPTURES);
        self.operators.push(Pending { op, span, group });
        Ok(())
    }

    fn pop_operator(&mut self) -> Pending {
        match self.operators.pop() {
            Some(pending) => pending,
            None => unreachable!("operator stack underflow"),
        }
    }

    fn top_operator(&self) -> Operator {
        match self.operators.last() {
            Some(pending) => pending.op,
            None => unreachable!("operator stack underflow"),
        }
    }
}
