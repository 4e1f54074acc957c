//! Simulation of compiled programs over a text
//!
//! Both directions run the same kind of machine: a pair of thread lists (the threads active at
//! the current position, and those that will be active at the next one), advanced one character
//! at a time. Each list holds at most one thread per instruction, so the work done per position
//! is bounded by the length of the program.
//!
//! A thread that reaches an instruction consuming no input is driven through it immediately,
//! in the same step. Alternation continues on its `next` branch and defers the `right` branch by
//! appending it to the *current* list, which keeps the list in priority order.

use crate::compile::Program;
use crate::nfa::{Direction, InstId, InstKind};
use crate::traits::Text;
use log::{trace, warn};
use std::mem;
use std::ops::Range;

/// The number of capture slots in a [`Captures`], including the slot for the whole match
pub const MAX_CAPTURES: usize = 10;

/// The ranges of text matched by a search: the whole match, plus each parenthesized group
///
/// Groups are numbered by the order of their opening parenthesis, starting from 1. Groups past
/// `MAX_CAPTURES - 1` are still matched, but not recorded.
///
/// Ranges are always expressed with `start <= end`, regardless of the direction of the search
/// that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    whole: Range<usize>,
    groups: [Option<Range<usize>>; MAX_CAPTURES - 1],
}

impl Captures {
    fn new(whole: Range<usize>, slots: &Slots) -> Self {
        let groups = std::array::from_fn(|i| {
            let g = i + 1;
            match (slots.0[2 * g], slots.0[2 * g + 1]) {
                (Some(start), Some(end)) if start <= end => Some(start..end),
                _ => None,
            }
        });

        Captures { whole, groups }
    }

    /// The range of the whole match
    pub fn range(&self) -> Range<usize> {
        self.whole.clone()
    }

    pub fn start(&self) -> usize {
        self.whole.start
    }

    pub fn end(&self) -> usize {
        self.whole.end
    }

    /// Returns the range captured by slot `i`, where slot 0 is the whole match
    ///
    /// Returns `None` if the group did not participate in the match, or if `i` is out of bounds.
    pub fn get(&self, i: usize) -> Option<Range<usize>> {
        match i {
            0 => Some(self.range()),
            _ => self.groups.get(i - 1).cloned().flatten(),
        }
    }

    /// The total number of slots, including those that are unset
    pub fn len(&self) -> usize {
        MAX_CAPTURES
    }

    /// Iterates over every slot, starting with the whole match
    pub fn iter(&self) -> impl '_ + Iterator<Item = Option<Range<usize>>> {
        (0..MAX_CAPTURES).map(move |i| self.get(i))
    }
}

// Positions recorded by a thread for each group: `2*g` holds the start of group g, and `2*g+1`
// its end. The pair for slot 0 is unused; the whole match comes from the thread's seed position.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Slots([Option<usize>; 2 * MAX_CAPTURES]);

#[derive(Debug, Copy, Clone)]
struct Thread {
    inst: InstId,
    // The position the thread's match attempt began at
    seed: usize,
    slots: Slots,
}

impl Thread {
    fn new(inst: InstId, seed: usize) -> Self {
        Thread { inst, seed, slots: Slots([None; 2 * MAX_CAPTURES]) }
    }
}

/// Marker error for a thread list that has run out of capacity
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct ListOverflow;

/// A bounded list of threads, with at most one thread per instruction
#[derive(Debug)]
struct ThreadList {
    threads: Vec<Thread>,
    // Mapping of InstId -> index in `threads`, for the instructions currently present
    index: Vec<Option<usize>>,
    limit: usize,
}

impl ThreadList {
    fn new(limit: usize) -> Self {
        ThreadList { threads: Vec::new(), index: Vec::new(), limit }
    }

    /// Clears the list and makes room for a program with `len` instructions
    fn reset(&mut self, len: usize) {
        self.clear();
        self.index.resize(len, None);
    }

    fn clear(&mut self) {
        for t in &self.threads {
            self.index[t.inst.0] = None;
        }
        self.threads.clear();
    }

    fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Adds the thread to the list, where the first `ran` threads have already been run
    ///
    /// If there's already a thread for the same instruction, only the one whose match attempt
    /// started closest to where the search began is kept. A preferred thread replaces a pending
    /// one in place, but is queued again behind one that has already run.
    fn add(&mut self, thread: Thread, dir: Direction, ran: usize) -> Result<(), ListOverflow> {
        if let Some(i) = self.index[thread.inst.0] {
            if !dir.prefers(thread.seed, self.threads[i].seed) {
                return Ok(());
            } else if i >= ran {
                self.threads[i] = thread;
                return Ok(());
            }
        }

        if self.threads.len() >= self.limit {
            return Err(ListOverflow);
        }

        self.index[thread.inst.0] = Some(self.threads.len());
        self.threads.push(thread);
        Ok(())
    }
}

impl Direction {
    // The slot that a group's opening instruction records into. Scanning backwards, the group is
    // entered at its right edge, so the opening instruction records the end.
    fn open_slot(self, group: usize) -> usize {
        match self {
            Direction::Forward => 2 * group,
            Direction::Backward => 2 * group + 1,
        }
    }

    fn close_slot(self, group: usize) -> usize {
        match self {
            Direction::Forward => 2 * group + 1,
            Direction::Backward => 2 * group,
        }
    }

    // Returns true if a thread seeded at `new` should replace one seeded at `old`
    fn prefers(self, new: usize, old: usize) -> bool {
        match self {
            Direction::Forward => new < old,
            Direction::Backward => new > old,
        }
    }

    fn finish(self, seed: usize, pos: usize, slots: &Slots) -> Captures {
        let whole = match self {
            Direction::Forward => seed..pos,
            Direction::Backward => pos..seed,
        };

        Captures::new(whole, slots)
    }

    /// Returns true if `candidate` should replace `best` as the result of the search
    ///
    /// Forwards, the earliest start wins, with ties going to the longest match. Backwards, it's
    /// the mirror image: the latest end wins, with ties going to the earliest start.
    fn is_better(self, candidate: &Captures, best: &Captures) -> bool {
        match self {
            Direction::Forward => {
                candidate.start() < best.start()
                    || (candidate.start() == best.start() && candidate.end() > best.end())
            }
            Direction::Backward => {
                candidate.end() > best.end()
                    || (candidate.end() == best.end() && candidate.start() < best.start())
            }
        }
    }
}

// Everything about the current position that instructions may test
struct Cursor<'t, T: ?Sized> {
    text: &'t T,
    pos: usize,
    // The character being consumed at this step, or `None` at the end of input
    c: Option<char>,
    dir: Direction,
}

impl<'t, T: Text + ?Sized> Cursor<'t, T> {
    fn before(&self) -> Option<char> {
        match self.dir {
            Direction::Forward if self.pos == 0 => None,
            Direction::Forward => Some(self.text.char_at(self.pos - 1)),
            Direction::Backward => self.c,
        }
    }

    fn after(&self) -> Option<char> {
        match self.dir {
            Direction::Forward => self.c,
            Direction::Backward if self.pos < self.text.len() => Some(self.text.char_at(self.pos)),
            Direction::Backward => None,
        }
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.before() == Some('\n')
    }

    fn at_line_end(&self) -> bool {
        self.after() == Some('\n')
    }
}

/// The state for running searches with a compiled [`Program`]
///
/// The thread lists are kept between searches, so repeated searches don't need to reallocate.
pub struct Matcher<P> {
    pub prog: P,
    clist: ThreadList,
    nlist: ThreadList,
}

impl<P: AsRef<Program>> Matcher<P> {
    pub fn new(prog: P, thread_limit: usize) -> Self {
        Matcher {
            prog,
            clist: ThreadList::new(thread_limit),
            nlist: ThreadList::new(thread_limit),
        }
    }

    /// Searches forward from `start`, up to the exclusive bound `end`
    ///
    /// If `end` is `None`, the search runs to the end of the text and then wraps around to the
    /// beginning, stopping once it reaches `start` again.
    pub fn search_forward<T: Text + ?Sized>(
        &mut self,
        text: &T,
        start: usize,
        end: Option<usize>,
    ) -> Option<Captures> {
        match self.run_forward(text, start, end) {
            Ok(found) => found,
            Err(ListOverflow) => {
                warn!("regexp list overflow");
                None
            }
        }
    }

    /// Searches backward from `start`, wrapping around from the beginning of the text to its end
    pub fn search_backward<T: Text + ?Sized>(&mut self, text: &T, start: usize) -> Option<Captures> {
        match self.run_backward(text, start) {
            Ok(found) => found,
            Err(ListOverflow) => {
                warn!("regexp list overflow");
                None
            }
        }
    }

    fn run_forward<T: Text + ?Sized>(
        &mut self,
        text: &T,
        start: usize,
        end: Option<usize>,
    ) -> Result<Option<Captures>, ListOverflow> {
        let prog = self.prog.as_ref();
        let dir = Direction::Forward;
        let entry = prog.entry(dir);
        let first = prog.nfa.first_char(entry);

        let limit = end.map_or(text.len(), |e| e.min(text.len()));
        let start = start.min(limit);

        self.clist.reset(prog.nfa.len());
        self.nlist.reset(prog.nfa.len());

        let mut best = None;
        let mut wrapped = false;
        let mut pos = start;

        loop {
            let at_end = pos >= limit;

            // Once we've found a match (or come back around to where we started), we only
            // continue while there are threads that could still extend it.
            if !at_end && self.clist.is_empty() && (best.is_some() || (wrapped && pos >= start)) {
                break;
            }

            let c = match at_end {
                true => None,
                false => Some(text.char_at(pos)),
            };

            // fast check for the first character
            let skip = self.clist.is_empty() && first.is_some() && c != first;

            if !skip {
                if best.is_none() && (!wrapped || pos < start) {
                    self.clist.add(Thread::new(entry, pos), dir, 0)?;
                }

                let cursor = Cursor { text, pos, c, dir };
                step(prog, &mut self.clist, &mut self.nlist, &cursor, &mut best)?;
                mem::swap(&mut self.clist, &mut self.nlist);
                self.nlist.clear();
            }

            if at_end {
                if best.is_some() || end.is_some() || wrapped {
                    break;
                }

                trace!("forward search wrapped around from {}", pos);
                wrapped = true;
                self.clist.clear();
                pos = 0;
                continue;
            }

            pos += 1;
        }

        Ok(best)
    }

    fn run_backward<T: Text + ?Sized>(
        &mut self,
        text: &T,
        start: usize,
    ) -> Result<Option<Captures>, ListOverflow> {
        let prog = self.prog.as_ref();
        let dir = Direction::Backward;
        let entry = prog.entry(dir);
        let first = prog.nfa.first_char(entry);

        let start = start.min(text.len());

        self.clist.reset(prog.nfa.len());
        self.nlist.reset(prog.nfa.len());

        let mut best = None;
        let mut wrapped = false;
        let mut pos = start;

        loop {
            let at_start = pos == 0;

            if !at_start && self.clist.is_empty() && (best.is_some() || (wrapped && pos <= start)) {
                break;
            }

            let c = match at_start {
                true => None,
                false => Some(text.char_at(pos - 1)),
            };

            let skip = self.clist.is_empty() && first.is_some() && c != first;

            if !skip {
                if best.is_none() && (!wrapped || pos > start) {
                    self.clist.add(Thread::new(entry, pos), dir, 0)?;
                }

                let cursor = Cursor { text, pos, c, dir };
                step(prog, &mut self.clist, &mut self.nlist, &cursor, &mut best)?;
                mem::swap(&mut self.clist, &mut self.nlist);
                self.nlist.clear();
            }

            if at_start {
                if best.is_some() || wrapped {
                    break;
                }

                trace!("backward search wrapped around to {}", text.len());
                wrapped = true;
                self.clist.clear();
                pos = text.len();
                continue;
            }

            pos -= 1;
        }

        Ok(best)
    }
}

// Runs every thread in `clist` at the cursor's position. Threads that consume the current
// character are added to `nlist`; completed matches are offered to `best`.
fn step<T: Text + ?Sized>(
    prog: &Program,
    clist: &mut ThreadList,
    nlist: &mut ThreadList,
    cursor: &Cursor<T>,
    best: &mut Option<Captures>,
) -> Result<(), ListOverflow> {
    let dir = cursor.dir;
    let pos = cursor.pos;

    // `clist` may grow as we go, from alternations
    let mut i = 0;
    while let Some(&thread) = clist.threads.get(i) {
        i += 1;

        let Thread { mut inst, seed, mut slots } = thread;

        loop {
            let consumed = match prog.nfa[inst].kind {
                InstKind::Char(ch) => cursor.c == Some(ch),
                InstKind::Any => matches!(cursor.c, Some(c) if c != '\n'),
                InstKind::Class(id) => {
                    matches!(cursor.c, Some(c) if prog.classes.matches(id, c, false))
                }
                InstKind::NegClass(id) => {
                    matches!(cursor.c, Some(c) if prog.classes.matches(id, c, true))
                }
                InstKind::GroupOpen(group) => {
                    if let Some(g) = group {
                        slots.0[dir.open_slot(g)] = Some(pos);
                    }
                    inst = prog.nfa.next(inst);
                    continue;
                }
                InstKind::GroupClose(group) => {
                    if let Some(g) = group {
                        slots.0[dir.close_slot(g)] = Some(pos);
                    }
                    inst = prog.nfa.next(inst);
                    continue;
                }
                InstKind::Bol if cursor.at_line_start() => {
                    inst = prog.nfa.next(inst);
                    continue;
                }
                InstKind::Eol if cursor.at_line_end() => {
                    inst = prog.nfa.next(inst);
                    continue;
                }
                InstKind::Bol | InstKind::Eol => break,
                InstKind::Alt { right } => {
                    clist.add(Thread { inst: right, seed, slots }, dir, i)?;
                    inst = prog.nfa.next(inst);
                    continue;
                }
                InstKind::Nop => {
                    inst = prog.nfa.next(inst);
                    continue;
                }
                InstKind::Match => {
                    let candidate = dir.finish(seed, pos, &slots);
                    let replace = match best {
                        None => true,
                        Some(b) => dir.is_better(&candidate, b),
                    };
                    if replace {
                        *best = Some(candidate);
                    }
                    break;
                }
            };

            if consumed {
                nlist.add(Thread { inst: prog.nfa.next(inst), seed, slots }, dir, 0)?;
            }
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Direction, Matcher, Thread, ThreadList, MAX_CAPTURES};
    use crate::compile::compile_program;
    use crate::config::Config;
    use crate::nfa::InstId;
    use std::ops::Range;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn thread_list_dedup() {
        let mut list = ThreadList::new(4);
        list.reset(8);

        list.add(Thread::new(InstId(3), 5), Direction::Forward, 0).unwrap();
        list.add(Thread::new(InstId(3), 2), Direction::Forward, 0).unwrap();
        list.add(Thread::new(InstId(3), 7), Direction::Forward, 0).unwrap();
        assert_eq!(list.threads.len(), 1);
        assert_eq!(list.threads[0].seed, 2);

        list.clear();
        list.add(Thread::new(InstId(3), 5), Direction::Backward, 0).unwrap();
        list.add(Thread::new(InstId(3), 2), Direction::Backward, 0).unwrap();
        list.add(Thread::new(InstId(3), 7), Direction::Backward, 0).unwrap();
        assert_eq!(list.threads.len(), 1);
        assert_eq!(list.threads[0].seed, 7);
    }

    #[test]
    fn thread_list_requeues_after_run() {
        let mut list = ThreadList::new(4);
        list.reset(8);

        list.add(Thread::new(InstId(3), 5), Direction::Forward, 0).unwrap();
        list.add(Thread::new(InstId(4), 5), Direction::Forward, 0).unwrap();

        // The thread for instruction 3 has already run, so the better one goes to the back
        list.add(Thread::new(InstId(3), 2), Direction::Forward, 1).unwrap();
        assert_eq!(list.threads.len(), 3);
        assert_eq!(list.threads[2].seed, 2);

        // ... but a worse one is still dropped
        list.add(Thread::new(InstId(3), 4), Direction::Forward, 3).unwrap();
        assert_eq!(list.threads.len(), 3);

        // The thread for instruction 4 hasn't run yet, so it's replaced in place
        list.add(Thread::new(InstId(4), 1), Direction::Forward, 1).unwrap();
        assert_eq!(list.threads.len(), 3);
        assert_eq!(list.threads[1].seed, 1);

        list.clear();
        assert!(list.is_empty());
        assert!(list.index.iter().all(Option::is_none));
    }

    #[test]
    fn longest_match_survives_dedup() {
        let cases: &[(&str, &str, usize, Direction, Range<usize>)] = &[
            ("(b((a?|bc)))+", "bbbc", 0, Direction::Forward, 0..4),
            ("a((a?)?)+", "baaab", 0, Direction::Forward, 1..4),
            ("(((b|b)|(a|b)))+a", "aaba", 4, Direction::Backward, 0..4),
        ];

        for (pattern, text, start, dir, expected) in cases {
            let prog = compile_program(pattern, &Config::default()).unwrap();
            let mut matcher = Matcher::new(&prog, Config::default().thread_limit);
            let text = chars(text);
            let found = match dir {
                Direction::Forward => matcher.search_forward(&text[..], *start, None),
                Direction::Backward => matcher.search_backward(&text[..], *start),
            };
            assert_eq!(found.map(|m| m.range()), Some(expected.clone()), "pattern {:?}", pattern);
        }
    }

    #[test]
    fn thread_list_overflow() {
        let mut list = ThreadList::new(2);
        list.reset(4);
        assert!(list.add(Thread::new(InstId(0), 0), Direction::Forward, 0).is_ok());
        assert!(list.add(Thread::new(InstId(1), 0), Direction::Forward, 0).is_ok());
        // duplicates never overflow
        assert!(list.add(Thread::new(InstId(1), 0), Direction::Forward, 0).is_ok());
        assert!(list.add(Thread::new(InstId(2), 0), Direction::Forward, 0).is_err());
    }

    #[test]
    fn overflow_reports_no_match() {
        let config = Config { thread_limit: 2, ..Config::default() };
        let prog = compile_program("(a|b|c|d)*e", &config).unwrap();
        let mut matcher = Matcher::new(&prog, config.thread_limit);
        assert_eq!(matcher.search_forward(&chars("abcde")[..], 0, None), None);

        // The same matcher still works once the limit isn't hit
        let roomy = Config::default();
        let prog = compile_program("(a|b|c|d)*e", &roomy).unwrap();
        let mut matcher = Matcher::new(&prog, roomy.thread_limit);
        let m = matcher.search_forward(&chars("abcde")[..], 0, None).unwrap();
        assert_eq!(m.range(), 0..5);
        assert_eq!(m.get(1), Some(3..4));
    }

    #[test]
    fn matcher_reuse() {
        let prog = compile_program("b+", &Config::default()).unwrap();
        let mut matcher = Matcher::new(&prog, 16);
        let text = chars("abbxb");

        assert_eq!(matcher.search_forward(&text[..], 0, None).map(|m| m.range()), Some(1..3));
        assert_eq!(matcher.search_forward(&text[..], 3, None).map(|m| m.range()), Some(4..5));
        assert_eq!(matcher.search_backward(&text[..], 4).map(|m| m.range()), Some(1..3));
        assert_eq!(matcher.search_backward(&text[..], 5).map(|m| m.range()), Some(4..5));
    }

    #[test]
    fn captures_accessors() {
        let prog = compile_program("(a)(x)?(b)", &Config::default()).unwrap();
        let mut matcher = Matcher::new(&prog, 16);
        let m = matcher.search_forward(&chars("ab")[..], 0, None).unwrap();

        assert_eq!(m.len(), MAX_CAPTURES);
        let slots: Vec<_> = m.iter().take(4).collect();
        assert_eq!(slots, vec![Some(0..2), Some(0..1), None, Some(1..2)]);
        assert_eq!(m.get(MAX_CAPTURES), None);
    }
}
