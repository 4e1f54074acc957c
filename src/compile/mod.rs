//! Pattern parsing & compilation

use crate::class::ClassTable;
use crate::config::Config;
use crate::exec::MAX_CAPTURES;
use crate::nfa::{Direction, InstId, Nfa};
use log::debug;
use std::ops::Range;

mod error;
mod lex;
mod parse;

pub use error::{CompileError, ErrorKind, HelpKind, HelpMsg, SyntaxError, SyntaxErrorKind};

/// The compiled form of a pattern: both programs, and the classes they reference
#[derive(Debug, Clone)]
pub struct Program {
    pub nfa: Nfa,
    pub classes: ClassTable,
    pub forward: InstId,
    pub backward: InstId,
    // The number of groups that were assigned capture slots
    pub groups: usize,
}

impl Program {
    pub fn entry(&self, direction: Direction) -> InstId {
        match direction {
            Direction::Forward => self.forward,
            Direction::Backward => self.backward,
        }
    }
}

impl AsRef<Program> for Program {
    fn as_ref(&self) -> &Program {
        self
    }
}

/// Compiles the pattern into its forward and backward programs
pub fn compile_program(pattern: &str, config: &Config) -> Result<Program, CompileError> {
    let err = |kind| CompileError { pattern: pattern.to_owned(), kind };

    let (tokens, classes) = lex::lex(pattern).map_err(|e| err(ErrorKind::Syntax(e)))?;

    let mut nfa = Nfa::with_limit(config.instruction_limit);
    let forward = parse::parse(&tokens, &mut nfa, Direction::Forward, config.stack_limit).map_err(err)?;
    let split = nfa.len();
    nfa.optimize(0..split);

    let backward = parse::parse(&tokens, &mut nfa, Direction::Backward, config.stack_limit).map_err(err)?;
    nfa.optimize(split..nfa.len());

    let opened = tokens
        .iter()
        .filter(|t| t.kind == lex::TokenKind::Op(lex::Operator::LParen))
        .count();
    let groups = opened.min(MAX_CAPTURES - 1);

    debug!(
        "compiled {:?}: {} forward + {} backward instructions, {} classes, {} groups",
        pattern,
        split,
        nfa.len() - split,
        classes.len(),
        groups,
    );

    Ok(Program { nfa, classes, forward, backward, groups })
}

/// A span of the input pattern, typically referenced in an error message
///
/// Spans can be trivially converted into an equivalent `Range` with the [`to_range`] method.
///
/// [`to_range`]: Self::to_range
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    /// The starting byte position within the pattern
    pub start: usize,
    /// The ending byte position within the pattern, exclusive
    pub end: usize,
}

impl Span {
    /// Converts the `Span` into an equivalent `Range`
    pub fn to_range(self) -> Range<usize> {
        self.start..self.end
    }
}
