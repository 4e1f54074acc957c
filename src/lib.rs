//! # `regx`: regular expressions for editor search
//!
//! `regx` is a small regular expression engine built for the "find" commands of an interactive
//! text editor. A pattern is compiled once, and can then be searched for any number of times,
//! either forward or backward from a cursor position, over any randomly-addressable text (see
//! [`Text`]).
//!
//! Searches wrap around the ends of the text: a forward search that reaches the end of the text
//! without finding anything continues from the beginning, and a backward search continues from the
//! end. A forward search can instead be bounded, in which case it never wraps.
//!
//! Matching always takes time linear in the length of the text, and is bounded in memory by the
//! limits configured with [`RegexBuilder`].
//!
//! ## Syntax
//!
//! | Pattern   | Matches |
//! |-----------|---------|
//! | `c`       | the literal character `c` |
//! | `\c`      | the literal character `c`, even if it's special; `\n` is a newline |
//! | `.`       | any character except newline |
//! | `[abx-z]` | any character in the class; `\]`, `\-` and `\n` are allowed inside it |
//! | `[^abx-z]`| any character *not* in the class, and not newline |
//! | `^`, `$`  | the empty string at the start or end of a line |
//! | `(re)`    | `re`, recording the matched range as a group |
//! | `re*`, `re+`, `re?` | zero or more, one or more, or zero or one `re` |
//! | `re1re2`, `re1\|re2` | concatenation and alternation |
//!
//! Repetition binds tightest, then concatenation, then alternation. Quantifiers may be stacked:
//! `a**` is the same as `a*`.
//!
//! ## Match selection
//!
//! Searching forward, the match starting earliest (after the start position, taking wraparound
//! into account) is returned, and of those, the longest. Searching backward, it's the mirror
//! image: the match that *ends* closest before the start position, and of those, the longest.
//!
//! ```
//! use regx::Regex;
//!
//! let re = Regex::new("a(b*)").unwrap();
//! let text: Vec<char> = "xabbya".chars().collect();
//!
//! let m = re.search_forward(&text[..], 0, None).unwrap();
//! assert_eq!(m.range(), 1..4);
//! assert_eq!(m.get(1), Some(2..4));
//!
//! let m = re.search_backward(&text[..], 6).unwrap();
//! assert_eq!(m.range(), 5..6);
//! ```

mod class;
mod compile;
mod config;
mod exec;
mod nfa;
mod traits;

pub use compile::{CompileError, ErrorKind, HelpKind, HelpMsg, Span, SyntaxError, SyntaxErrorKind};
pub use exec::{Captures, MAX_CAPTURES};
pub use traits::Text;

use compile::Program;
use config::Config;
use std::borrow::Borrow;
use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;

/// A compiled pattern, ready to be searched for
///
/// A `Regex` is immutable once compiled, and may be freely shared between threads. Each search
/// goes through a [`Matcher`], which holds the scratch space for that search.
pub struct Regex {
    pattern: String,
    prog: Program,
    config: Config,
}

impl Regex {
    /// Compiles the pattern into a `Regex` with the default limits, returning a `CompileError` on
    /// failure
    pub fn new(pattern: &str) -> Result<Self, CompileError> {
        RegexBuilder::new().build(pattern)
    }

    /// Returns the pattern this `Regex` was compiled from
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns the number of groups in the pattern that have capture slots
    pub fn group_count(&self) -> usize {
        self.prog.groups
    }

    /// Produces a [`Matcher`] that borrows from this `Regex`
    ///
    /// Reusing a matcher for several searches avoids reallocating its thread lists.
    pub fn matcher(&self) -> MatcherRef {
        let this: &Regex = self;
        Matcher::new(this)
    }

    /// Searches forward from `start` for the earliest match
    ///
    /// If `end` is `Some`, the search stops at that (exclusive) position, treating it as the end
    /// of the text. If `end` is `None`, the search wraps around from the end of the text to the
    /// beginning, continuing until it returns to `start`.
    pub fn search_forward<T: Text + ?Sized>(
        &self,
        text: &T,
        start: usize,
        end: Option<usize>,
    ) -> Option<Captures> {
        self.matcher().search_forward(text, start, end)
    }

    /// Searches backward from `start` for the nearest match ending at or before it, wrapping
    /// around from the beginning of the text to the end
    pub fn search_backward<T: Text + ?Sized>(&self, text: &T, start: usize) -> Option<Captures> {
        self.matcher().search_backward(text, start)
    }
}

impl Debug for Regex {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("Regex").field(&self.pattern).finish()
    }
}

impl FromStr for Regex {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, CompileError> {
        Regex::new(s)
    }
}

/// A builder for a [`Regex`], to allow configuring its limits
///
/// Every limit defaults to the capacity used by the editor this engine was written for.
#[derive(Debug, Copy, Clone, Default)]
pub struct RegexBuilder(Config);

impl RegexBuilder {
    /// Creates a new regex builder with the default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles the pattern into a [`Regex`] with the configured limits
    pub fn build(&self, pattern: &str) -> Result<Regex, CompileError> {
        let prog = compile::compile_program(pattern, &self.0)?;
        Ok(Regex { pattern: pattern.to_owned(), prog, config: self.0 })
    }

    /// The maximum number of instructions the compiled pattern may use, in total across its
    /// forward and backward programs
    ///
    /// Default is `1024`.
    pub fn instruction_limit(&mut self, limit: usize) -> &mut Self {
        self.0.instruction_limit = limit;
        self
    }

    /// The maximum depth of each of the parser's stacks, which bounds how deeply the pattern may
    /// be nested
    ///
    /// Default is `20`.
    pub fn stack_limit(&mut self, limit: usize) -> &mut Self {
        self.0.stack_limit = limit;
        self
    }

    /// The maximum number of threads the matcher may track at a single position. A search that
    /// would need more reports no match.
    ///
    /// Default is `127`.
    pub fn thread_limit(&mut self, limit: usize) -> &mut Self {
        self.0.thread_limit = limit;
        self
    }
}

/// Scratch space for searching with a compiled [`Regex`]
///
/// `R` is any handle to the `Regex`: a plain reference (see [`MatcherRef`]), or an owning pointer
/// like `Rc<Regex>` or `Arc<Regex>` when the matcher needs to outlive the borrow.
///
/// A `Matcher` owns the scratch space used while searching, so concurrent searches with the same
/// `Regex` each need their own `Matcher`.
pub struct Matcher<R> {
    matcher: exec::Matcher<RegexRef<R>>,
}

/// A match-searching object, borrowing a compiled [`Regex`]
///
/// Returned by [`Regex::matcher`].
pub type MatcherRef<'re> = Matcher<&'re Regex>;

impl<R: Borrow<Regex>> Matcher<R> {
    /// Returns a new `Matcher`, using the provided reference to a compiled `Regex`
    pub fn new(re: R) -> Self {
        let thread_limit = re.borrow().config.thread_limit;
        Matcher { matcher: exec::Matcher::new(RegexRef { re }, thread_limit) }
    }

    /// Returns the `Regex` this matcher searches with
    pub fn regex(&self) -> &Regex {
        self.matcher.prog.re.borrow()
    }

    /// Searches forward from `start`; see [`Regex::search_forward`]
    pub fn search_forward<T: Text + ?Sized>(
        &mut self,
        text: &T,
        start: usize,
        end: Option<usize>,
    ) -> Option<Captures> {
        self.matcher.search_forward(text, start, end)
    }

    /// Searches backward from `start`; see [`Regex::search_backward`]
    pub fn search_backward<T: Text + ?Sized>(&mut self, text: &T, start: usize) -> Option<Captures> {
        self.matcher.search_backward(text, start)
    }
}

/// Helper type for granting access to the underlying program from arbitrary reference types
struct RegexRef<R> {
    re: R,
}

impl<R: Borrow<Regex>> AsRef<Program> for RegexRef<R> {
    fn as_ref(&self) -> &Program {
        &self.re.borrow().prog
    }
}

#[cfg(test)]
mod tests {
    use super::{Matcher, Regex, RegexBuilder};
    use std::rc::Rc;

    #[test]
    fn regex_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Regex>();
    }

    #[test]
    fn owned_matcher() {
        let re = Rc::new(Regex::new("b").unwrap());
        let mut matcher = Matcher::new(Rc::clone(&re));
        let text: Vec<char> = "abc".chars().collect();

        assert_eq!(matcher.regex().as_str(), "b");
        assert_eq!(matcher.search_forward(&text, 0, None).map(|m| m.range()), Some(1..2));
    }

    #[test]
    fn builder_limits() {
        let err = RegexBuilder::new().instruction_limit(4).build("abcd").unwrap_err();
        assert!(matches!(err.kind, super::ErrorKind::ProgramTooLong { limit: 4 }));

        let err = RegexBuilder::new().stack_limit(3).build("((((a))))").unwrap_err();
        assert!(matches!(err.kind, super::ErrorKind::OperatorStackOverflow { limit: 3 }));

        let re = RegexBuilder::new().instruction_limit(10).build("abcd").unwrap();
        assert_eq!(re.group_count(), 0);
    }

    #[test]
    fn from_str() {
        let re: Regex = "(a)(b)".parse().unwrap();
        assert_eq!(re.group_count(), 2);
        assert_eq!(format!("{:?}", re), r#"Regex("(a)(b)")"#);
        assert!("(a".parse::<Regex>().is_err());
    }
}
