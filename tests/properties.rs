use quickcheck::{quickcheck, Arbitrary, Gen, TestResult};
use regx::{Regex, RegexBuilder};
use std::collections::BTreeSet;
use std::fmt::{self, Debug, Formatter};

// Maps arbitrary bytes onto a small alphabet, so that matches are actually likely
fn text_from(bytes: &[u8]) -> Vec<char> {
    bytes
        .iter()
        .map(|b| match b % 3 {
            0 => 'a',
            1 => 'b',
            _ => '\n',
        })
        .collect()
}

fn needle_from(bytes: &[u8]) -> Vec<char> {
    bytes.iter().take(4).map(|b| if b % 2 == 0 { 'a' } else { 'b' }).collect()
}

#[test]
fn literal_search_matches_naive_scan() {
    fn prop(text: Vec<u8>, needle: Vec<u8>) -> TestResult {
        let needle = needle_from(&needle);
        if needle.is_empty() {
            return TestResult::discard();
        }

        let text = text_from(&text);
        let pattern: String = needle.iter().collect();
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => return TestResult::error(e.to_string()),
        };

        let n = needle.len();
        let first = text.windows(n).position(|w| w == &needle[..]).map(|i| i..i + n);
        let last = text.windows(n).rposition(|w| w == &needle[..]).map(|i| i..i + n);

        let forward = re.search_forward(&text[..], 0, Some(text.len())).map(|m| m.range());
        let backward = re.search_backward(&text[..], text.len()).map(|m| m.range());

        TestResult::from_bool(forward == first && backward == last)
    }

    quickcheck(prop as fn(Vec<u8>, Vec<u8>) -> TestResult);
}

#[test]
fn wrapped_search_finds_some_occurrence() {
    fn prop(text: Vec<u8>, start: usize) -> TestResult {
        let text = text_from(&text);
        if text.is_empty() {
            return TestResult::discard();
        }

        let start = start % (text.len() + 1);
        let re = match Regex::new("ab") {
            Ok(re) => re,
            Err(e) => return TestResult::error(e.to_string()),
        };

        let any = text.windows(2).any(|w| w == ['a', 'b']);
        let forward = re.search_forward(&text[..], start, None);
        let backward = re.search_backward(&text[..], start);

        let matched_ab = |m: &regx::Captures| text[m.range()] == ['a', 'b'];
        TestResult::from_bool(
            forward.is_some() == any
                && backward.is_some() == any
                && forward.iter().chain(backward.iter()).all(matched_ab),
        )
    }

    quickcheck(prop as fn(Vec<u8>, usize) -> TestResult);
}

#[test]
fn compilation_is_deterministic() {
    fn prop(pattern: String) -> bool {
        let text: Vec<char> = pattern.chars().collect();

        match (Regex::new(&pattern), Regex::new(&pattern)) {
            (Ok(a), Ok(b)) => {
                a.group_count() == b.group_count()
                    && a.search_forward(&text[..], 0, None) == b.search_forward(&text[..], 0, None)
                    && a.search_backward(&text[..], text.len())
                        == b.search_backward(&text[..], text.len())
            }
            (Err(a), Err(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }

    quickcheck(prop as fn(String) -> bool);
}

// A small pattern syntax tree, rendered into pattern text for the engine and interpreted directly
// by `ends` as the reference
#[derive(Clone)]
enum Node {
    Lit(char),
    Cat(Box<Node>, Box<Node>),
    Alt(Box<Node>, Box<Node>),
    Star(Box<Node>),
    Plus(Box<Node>),
    Quest(Box<Node>),
    Group(Box<Node>),
}

impl Node {
    fn gen(g: &mut Gen, depth: usize) -> Node {
        let pick = match depth {
            0 => 0,
            _ => u8::arbitrary(g) % 7,
        };

        let sub = |g: &mut Gen| Box::new(Node::gen(g, depth - 1));
        match pick {
            0 => Node::Lit(*g.choose(&['a', 'b', 'c']).unwrap()),
            1 => Node::Cat(sub(g), sub(g)),
            2 => Node::Alt(sub(g), sub(g)),
            3 => Node::Star(sub(g)),
            4 => Node::Plus(sub(g)),
            5 => Node::Quest(sub(g)),
            _ => Node::Group(sub(g)),
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            Node::Lit(c) => out.push(*c),
            Node::Group(x) => {
                out.push('(');
                x.render(out);
                out.push(')');
            }
            Node::Cat(a, b) => {
                a.render_wrapped(out, matches!(**a, Node::Alt(..)));
                b.render_wrapped(out, matches!(**b, Node::Alt(..)));
            }
            Node::Alt(a, b) => {
                a.render(out);
                out.push('|');
                b.render(out);
            }
            Node::Star(x) | Node::Plus(x) | Node::Quest(x) => {
                x.render_wrapped(out, !matches!(**x, Node::Lit(_) | Node::Group(_)));
                out.push(match self {
                    Node::Star(_) => '*',
                    Node::Plus(_) => '+',
                    _ => '?',
                });
            }
        }
    }

    fn render_wrapped(&self, out: &mut String, wrap: bool) {
        if wrap {
            out.push('(');
        }
        self.render(out);
        if wrap {
            out.push(')');
        }
    }

    // Every position a match of this node starting at `i` can end at
    fn ends(&self, text: &[char], i: usize) -> BTreeSet<usize> {
        match self {
            Node::Lit(c) => text.get(i).filter(|&t| t == c).map(|_| i + 1).into_iter().collect(),
            Node::Group(x) => x.ends(text, i),
            Node::Cat(a, b) => a.ends(text, i).into_iter().flat_map(|e| b.ends(text, e)).collect(),
            Node::Alt(a, b) => a.ends(text, i).union(&b.ends(text, i)).copied().collect(),
            Node::Quest(x) => {
                let mut ends = x.ends(text, i);
                ends.insert(i);
                ends
            }
            Node::Star(x) => repeat(x, text, BTreeSet::from([i])),
            Node::Plus(x) => repeat(x, text, x.ends(text, i)),
        }
    }
}

// Closes `from` under any number of further repetitions of `x`
fn repeat(x: &Node, text: &[char], from: BTreeSet<usize>) -> BTreeSet<usize> {
    let mut seen = from.clone();
    let mut todo: Vec<usize> = from.into_iter().collect();
    while let Some(p) = todo.pop() {
        for e in x.ends(text, p) {
            if seen.insert(e) {
                todo.push(e);
            }
        }
    }
    seen
}

#[derive(Clone)]
struct Pattern(Node);

impl Pattern {
    fn text(&self) -> String {
        let mut out = String::new();
        self.0.render(&mut out);
        out
    }
}

impl Debug for Pattern {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:?}", self.text())
    }
}

impl Arbitrary for Pattern {
    fn arbitrary(g: &mut Gen) -> Self {
        Pattern(Node::gen(g, 4))
    }
}

#[test]
fn operator_search_matches_reference() {
    fn prop(pattern: Pattern, text: Vec<u8>) -> TestResult {
        // room for every thread, so that overflow never stands in for a wrong answer
        let re = match RegexBuilder::new().thread_limit(1024).build(&pattern.text()) {
            Ok(re) => re,
            Err(_) => return TestResult::discard(),
        };

        let alphabet = ['a', 'b', 'c'];
        let text: Vec<char> = text.iter().take(8).map(|&b| alphabet[b as usize % 3]).collect();

        let mut all = Vec::new();
        for start in 0..=text.len() {
            all.extend(pattern.0.ends(&text, start).into_iter().map(|end| start..end));
        }

        // earliest start, then longest
        let first = all.iter().min_by_key(|r| (r.start, usize::MAX - r.end)).cloned();
        // latest end, then earliest start
        let last = all.iter().max_by_key(|r| (r.end, usize::MAX - r.start)).cloned();

        let forward = re.search_forward(&text[..], 0, Some(text.len())).map(|m| m.range());
        let backward = re.search_backward(&text[..], text.len()).map(|m| m.range());

        TestResult::from_bool(forward == first && backward == last)
    }

    quickcheck(prop as fn(Pattern, Vec<u8>) -> TestResult);
}
