//! Bracket-expression character classes
//!
//! Classes are built by the lexer while the pattern is being tokenized, stored in a [`ClassTable`]
//! owned by the compiled program, and referenced from instructions by [`ClassId`].

use std::ops::Index;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClassId(pub(crate) usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClassItem {
    Char(char),
    // Inclusive on both ends
    Range(char, char),
}

/// A single compiled bracket expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    items: Vec<ClassItem>,
}

impl Class {
    /// Starts a new, empty class
    ///
    /// Negated classes are seeded with a newline, so that the newline is excluded once the result
    /// of matching is flipped.
    pub fn new(negated: bool) -> Self {
        let items = match negated {
            true => vec![ClassItem::Char('\n')],
            false => Vec::new(),
        };

        Class { items }
    }

    pub fn push_char(&mut self, c: char) {
        self.items.push(ClassItem::Char(c));
    }

    pub fn push_range(&mut self, lo: char, hi: char) {
        self.items.push(ClassItem::Range(lo, hi));
    }

    /// Returns whether `c` appears in the class's items, with the result flipped if `negate` is
    /// true
    pub fn matches(&self, c: char, negate: bool) -> bool {
        let found = self.items.iter().any(|item| match *item {
            ClassItem::Char(x) => x == c,
            ClassItem::Range(lo, hi) => lo <= c && c <= hi,
        });

        found != negate
    }
}

/// The growable list of classes for a single compiled pattern
#[derive(Debug, Default, Clone)]
pub struct ClassTable {
    classes: Vec<Class>,
}

impl ClassTable {
    pub fn new() -> Self {
        ClassTable::default()
    }

    pub fn push(&mut self, class: Class) -> ClassId {
        let id = ClassId(self.classes.len());
        self.classes.push(class);
        id
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn matches(&self, id: ClassId, c: char, negate: bool) -> bool {
        self[id].matches(c, negate)
    }
}

impl Index<ClassId> for ClassTable {
    type Output = Class;

    fn index(&self, id: ClassId) -> &Class {
        &self.classes[id.0]
    }
}
