//! Errors produced while compiling a pattern

use super::Span;
use thiserror::Error;

/// The error returned when a pattern fails to compile
///
/// A failed compilation never produces a partially-usable pattern: both the forward and backward
/// programs are discarded.
#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
#[error("regexp: {kind}")]
pub struct CompileError {
    /// The pattern that failed to compile
    pub pattern: String,
    pub kind: ErrorKind,
}

impl CompileError {
    /// Returns any additional hints attached to the error
    pub fn help(&self) -> &'static [HelpMsg] {
        match &self.kind {
            ErrorKind::Syntax(e) => e.help,
            ErrorKind::ProgramTooLong { .. } => &[HelpMsg::RaiseLimit { setting: "instruction_limit" }],
            ErrorKind::OperandStackOverflow { .. } | ErrorKind::OperatorStackOverflow { .. } => {
                &[HelpMsg::RaiseLimit { setting: "stack_limit" }]
            }
        }
    }
}

/// The reason a pattern failed to compile
#[derive(Copy, Clone, Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum ErrorKind {
    #[error(transparent)]
    Syntax(SyntaxError),
    #[error("expression too long (limit is {limit} instructions)")]
    ProgramTooLong { limit: usize },
    #[error("operand stack overflow (limit is {limit})")]
    OperandStackOverflow { limit: usize },
    #[error("operator stack overflow (limit is {limit})")]
    OperatorStackOverflow { limit: usize },
}

/// A pattern that isn't well-formed
#[derive(Copy, Clone, Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
#[error("{msg} at offset {}", .span.start)]
pub struct SyntaxError {
    /// Where in the pattern the problem was found
    pub span: Span,
    /// The "primary" message describing the error, e.g. "unmatched `)'"
    pub msg: SyntaxErrorKind,
    /// Any additional hints that might be useful, e.g. "to match a literal '(', use '\('"
    pub help: &'static [HelpMsg],
}

/// The specific problem with a malformed pattern
#[derive(Copy, Clone, Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum SyntaxErrorKind {
    #[error("unmatched `('")]
    UnmatchedOpen, // help: EscapeToMatchLiteral
    #[error("unmatched `)'")]
    UnmatchedClose, // help: EscapeToMatchLiteral
    #[error("missing operand for {op}")]
    MissingOperand { op: char },
    #[error("malformed regexp")]
    Malformed,
    #[error("malformed `[]'")]
    MalformedClass, // help: [ EscapeDashInClass ] when a '-' is misplaced
    #[error("empty `[]'")]
    EmptyClass,
}

impl SyntaxError {
    pub(crate) fn new(span: Span, msg: SyntaxErrorKind) -> Self {
        SyntaxError { span, msg, help: &[] }
    }

    pub(crate) fn with_help(self, help: &'static [HelpMsg]) -> Self {
        SyntaxError { help, ..self }
    }
}

/// A hint attached to a [`CompileError`], suggesting how to fix it
///
/// Some hints are meant for whoever wrote the pattern, and others for the program compiling it;
/// [`kind`] tells which.
///
/// [`kind`]: Self::kind
#[derive(Copy, Clone, Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum HelpMsg {
    #[error("to match a literal {name}, use '{escaped}'")]
    EscapeToMatchLiteral { name: &'static str, escaped: &'static str },
    #[error("to include a literal '-' in a character class, use '\\-'")]
    EscapeDashInClass,
    #[error("the pattern exceeds the configured `{setting}`; raise it with `RegexBuilder`")]
    RaiseLimit { setting: &'static str },
}

impl HelpMsg {
    /// Returns who the hint is addressed to
    pub fn kind(&self) -> HelpKind {
        match self {
            HelpMsg::EscapeToMatchLiteral { .. } | HelpMsg::EscapeDashInClass => HelpKind::RegexWriter,
            HelpMsg::RaiseLimit { .. } => HelpKind::Programmer,
        }
    }
}

/// The addressee of a [`HelpMsg`]
#[derive(Copy, Clone, Debug)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum HelpKind {
    /// The program using this library, e.g. about the limits it configured
    Programmer,
    /// The author of the pattern, who may be an editor's user typing a search
    RegexWriter,
}
