//! The instruction graph executed by the matching engine
//!
//! A compiled pattern is a single arena of [`Inst`]s holding two programs: one that recognizes the
//! pattern scanning left-to-right, and one built from the same pattern with concatenation reversed
//! that recognizes it scanning right-to-left. Every link between instructions is an [`InstId`]
//! into the arena.

use crate::class::ClassId;
use crate::compile::ErrorKind;
use std::ops::{Index, Range};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct InstId(pub(crate) usize);

/// The direction a program is built for, and searched in
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InstKind {
    Char(char),
    // Any character except newline
    Any,
    Bol,
    Eol,
    Class(ClassId),
    NegClass(ClassId),
    // The submatch index is `None` for groups beyond the capture slot capacity
    GroupOpen(Option<usize>),
    GroupClose(Option<usize>),
    // Splits execution: `next` is followed immediately, `right` is deferred
    Alt { right: InstId },
    Nop,
    Match,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Inst {
    pub kind: InstKind,
    // Only `Match` is left without a successor once a program is complete.
    pub next: Option<InstId>,
}

/// A partially-built piece of a program: the entry instruction and the instruction whose `next`
/// is still to be linked
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub first: InstId,
    pub last: InstId,
}

impl Fragment {
    pub fn single(id: InstId) -> Self {
        Fragment { first: id, last: id }
    }
}

/// Fixed-capacity instruction arena
#[derive(Debug, Clone)]
pub struct Nfa {
    insts: Vec<Inst>,
    limit: usize,
}

impl Nfa {
    pub fn with_limit(limit: usize) -> Self {
        Nfa { insts: Vec::new(), limit }
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    /// Allocates a new, unlinked instruction
    pub fn push(&mut self, kind: InstKind) -> Result<InstId, ErrorKind> {
        if self.insts.len() >= self.limit {
            return Err(ErrorKind::ProgramTooLong { limit: self.limit });
        }

        let id = InstId(self.insts.len());
        self.insts.push(Inst { kind, next: None });
        Ok(id)
    }

    /// Sets the successor of `from`
    pub fn link(&mut self, from: InstId, to: InstId) {
        self.insts[from.0].next = Some(to);
    }

    /// Returns the successor of `id`
    ///
    /// ## Panics
    ///
    /// Panics if the instruction was never linked, which cannot happen for any instruction
    /// reachable in a completed program other than `Match`.
    pub fn next(&self, id: InstId) -> InstId {
        match self[id].next {
            Some(next) => next,
            None => unreachable!("unlinked instruction {:?} in compiled program", id),
        }
    }

    /// Rewrites every successor link within `range` to skip over chains of `Nop`s
    pub fn optimize(&mut self, range: Range<usize>) {
        for idx in range {
            let mut target = match self.insts[idx].next {
                Some(t) => t,
                None => continue,
            };

            while let Inst { kind: InstKind::Nop, next: Some(next) } = self[target] {
                target = next;
            }

            self.insts[idx].next = Some(target);
        }
    }

    /// Returns the literal character every match of the program must start with, if there is one
    pub fn first_char(&self, entry: InstId) -> Option<char> {
        match self[entry].kind {
            InstKind::Char(c) => Some(c),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }
}

impl Index<InstId> for Nfa {
    type Output = Inst;

    fn index(&self, id: InstId) -> &Inst {
        &self.insts[id.0]
    }
}
