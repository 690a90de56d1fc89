//! Compressed pattern matching.
//!
//! Occurrences of a pattern that touch a fixed point of the text always form
//! a single arithmetic progression, so the matching table stores exactly one
//! [`FiniteArithmeticSequence`] per (pattern, text) pair: the start positions
//! of occurrences touching the split point of the text. Everything else
//! (occurrences in a window, all occurrences) is assembled from these entries
//! with an Inorder walk that only enters subtrees able to hold a match.

use crate::arithmetic_sequence::FiniteArithmeticSequence;
use crate::inspector::{Inorder, Inspector, InspectorTask, TaskAcceptor};
use crate::vertex::{TerminalSymbol, Vertex};
use ahash::AHashMap;
use log::trace;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::cmp::{max, min};

/// Memo of pattern matches, keyed by the ordered (pattern, text) pair.
///
/// Reusing one table across calls shares all intermediate results.
#[derive(Default)]
pub struct MatchingTable {
    matches: AHashMap<(Vertex, Vertex), FiniteArithmeticSequence>,
}

impl MatchingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized pairs.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Start positions `x` of the occurrences of `pattern` in `text` with
    /// `split − |pattern| ≤ x ≤ split`, where `split` is the split point of
    /// `text`. For a terminal text this is `{0}` on equality.
    pub fn matches(&mut self, pattern: &Vertex, text: &Vertex) -> FiniteArithmeticSequence {
        if pattern.is_null() || text.is_null() || pattern.length() > text.length() {
            return FiniteArithmeticSequence::null();
        }
        if pattern == text {
            return FiniteArithmeticSequence::single(BigInt::zero());
        }
        if text.is_terminal() {
            // Same length but a different symbol.
            return FiniteArithmeticSequence::null();
        }

        let key = (pattern.clone(), text.clone());
        if let Some(found) = self.matches.get(&key) {
            return found.clone();
        }

        let result = match pattern.terminal_symbol() {
            Some(symbol) => terminal_match(symbol, text),
            None => self.nontrivial_match(pattern, text),
        };

        self.matches.insert(key, result.clone());
        trace!("Matching table holds {} pairs", self.matches.len());
        result
    }

    /// Every occurrence of `pattern` in `text`, as increasing progressions.
    pub fn find_all(&mut self, pattern: &Vertex, text: &Vertex) -> Vec<FiniteArithmeticSequence> {
        if pattern.is_null() {
            return Vec::new();
        }
        self.matches_between(pattern, text, &BigInt::zero(), &text.length())
    }

    /// Whether `pattern` occurs in `text` starting at `position`.
    ///
    /// Descends to the lowest vertex containing the whole range, where the
    /// occurrence necessarily touches the split point.
    pub fn occurs_at(&mut self, pattern: &Vertex, text: &Vertex, position: &BigInt) -> bool {
        let length = pattern.length();
        if position.is_negative() || position + &length > text.length() {
            return false;
        }
        if length.is_zero() {
            return true;
        }

        let mut node = text.clone();
        let mut offset = position.clone();
        while node.is_nonterminal() {
            let split = node.split_point();
            if &offset + &length <= split {
                node = node.left_child();
            } else if offset >= split {
                offset -= split;
                node = node.right_child();
            } else {
                break;
            }
        }

        self.matches(pattern, &node).contains(&offset)
    }

    /// Occurrences of `pattern` starting inside `[from, to]`.
    fn matches_between(
        &mut self,
        pattern: &Vertex,
        text: &Vertex,
        from: &BigInt,
        to: &BigInt,
    ) -> Vec<FiniteArithmeticSequence> {
        let mut found = Vec::new();
        if from > to {
            return found;
        }

        let mut generator = PatternMatchesGenerator::new(
            pattern.clone(),
            text.clone(),
            from.clone(),
            to - from + pattern.length(),
        );
        loop {
            let next = generator.next_match(self);
            if next.is_null() {
                return found;
            }
            found.push(next);
        }
    }

    /// Matches a nonterminal pattern against a nonterminal text.
    ///
    /// The longer half of the pattern is located around the split point with
    /// a windowed search. Each progression of its occurrences covers a region
    /// with period `step`, so the shorter half either fits inside that region
    /// (then one check decides all those candidates) or sticks out at its
    /// border (then it is located by a second windowed search there).
    fn nontrivial_match(&mut self, pattern: &Vertex, text: &Vertex) -> FiniteArithmeticSequence {
        let pattern_length = pattern.length();
        let split = text.split_point();
        let lower = max(BigInt::zero(), &split - &pattern_length);
        let upper = min(split, text.length() - &pattern_length);
        if lower > upper {
            return FiniteArithmeticSequence::null();
        }

        let left = pattern.left_child();
        let right = pattern.right_child();
        let big_is_left = left.length() >= right.length();
        let (big, small) = if big_is_left {
            (left, right)
        } else {
            (right, left)
        };
        let big_length = big.length();
        let small_length = small.length();
        let big_offset = if big_is_left {
            BigInt::zero()
        } else {
            small_length.clone()
        };

        let mut pieces = Vec::new();
        let big_matches = self.matches_between(
            &big,
            text,
            &(&lower + &big_offset),
            &(&upper + &big_offset),
        );

        for candidates in big_matches {
            if candidates.count().is_one() || candidates.step() > &big_length {
                // Spaced out occurrences fit only a few times into the window.
                for position in candidates.iter() {
                    let start = &position - &big_offset;
                    let small_start = if big_is_left {
                        &position + &big_length
                    } else {
                        start.clone()
                    };
                    if self.occurs_at(&small, text, &small_start) {
                        pieces.push(FiniteArithmeticSequence::single(start));
                    }
                }
                continue;
            }

            let step = candidates.step().clone();
            let count = candidates.count().clone();
            let sticking_out = div_ceil(&small_length, &step);
            let region_begin = candidates.first().clone();
            let region_end = candidates.last() + &big_length;

            if big_is_left {
                let small_starts = candidates.shift_right(&big_length);

                if count > sticking_out && self.occurs_at(&small, text, small_starts.first()) {
                    pieces.push(FiniteArithmeticSequence::new(
                        region_begin.clone(),
                        step.clone(),
                        &count - &sticking_out,
                    ));
                }

                let border_from = max(
                    small_starts.first().clone(),
                    &region_end - &small_length + 1,
                );
                for found in self.matches_between(&small, text, &border_from, &region_end) {
                    let shared = found.intersect_with(&small_starts);
                    pieces.push(shared.shift_right(&-&big_length));
                }
            } else {
                let small_starts = candidates.shift_right(&-&small_length);

                if count > sticking_out {
                    let first_inside = &region_begin + &sticking_out * &step - &small_length;
                    if self.occurs_at(&small, text, &first_inside) {
                        pieces.push(FiniteArithmeticSequence::new(
                            first_inside,
                            step.clone(),
                            &count - &sticking_out,
                        ));
                    }
                }

                let border_to = min(small_starts.last(), &region_begin - 1);
                for found in
                    self.matches_between(&small, text, small_starts.first(), &border_to)
                {
                    pieces.push(found.intersect_with(&small_starts));
                }
            }
        }

        unite(pieces).fit_into(&lower, &upper)
    }
}

fn div_ceil(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    -(-numerator).div_floor(denominator)
}

/// A single symbol against the two positions adjacent to the split point.
fn terminal_match(symbol: TerminalSymbol, text: &Vertex) -> FiniteArithmeticSequence {
    let split = text.split_point();
    let mut result = FiniteArithmeticSequence::null();
    for position in [&split - 1, split] {
        if text.symbol_at(&position) == symbol {
            result = result.join_with(&FiniteArithmeticSequence::single(position));
        }
    }
    result
}

/// Union of progressions whose union is known to be a progression.
///
/// The step of the union is the gcd of all internal steps and of the
/// distances between the pieces.
fn unite(pieces: Vec<FiniteArithmeticSequence>) -> FiniteArithmeticSequence {
    let pieces: Vec<_> = pieces.into_iter().filter(|piece| !piece.is_null()).collect();
    let Some(first) = pieces.iter().map(|piece| piece.first().clone()).min() else {
        return FiniteArithmeticSequence::null();
    };
    let last = pieces
        .iter()
        .map(FiniteArithmeticSequence::last)
        .max()
        .unwrap_or_else(|| first.clone());

    let mut step = BigInt::zero();
    for piece in &pieces {
        if piece.count() > &BigInt::from(1) {
            step = step.gcd(piece.step());
        }
        step = step.gcd(&(piece.first() - &first));
    }

    if step.is_zero() {
        return FiniteArithmeticSequence::single(first);
    }
    let count = (&last - &first) / &step + 1;
    FiniteArithmeticSequence::new(first, step, count)
}

/// Admits vertices long enough for the pattern whose span meets the window.
struct LookupWindow {
    pattern_length: BigInt,
    first_lookup_end: BigInt,
    last_lookup_begin: BigInt,
}

impl TaskAcceptor for LookupWindow {
    fn accept(&mut self, task: &InspectorTask) -> bool {
        let length = task.vertex.length();
        length >= self.pattern_length
            && &task.left_siblings_length + &length >= self.first_lookup_end
            && task.left_siblings_length <= self.last_lookup_begin
    }
}

/// Lists the occurrences of a pattern whose start lies in a window of the
/// text, as a sequence of progressions in increasing order.
pub struct PatternMatchesGenerator {
    pattern: Vertex,
    first_lookup_begin: BigInt,
    last_lookup_begin: BigInt,
    inspector: Inspector<Inorder, LookupWindow>,
}

impl PatternMatchesGenerator {
    /// Searches starts in `[lookup_from, lookup_from + lookup_length − |pattern|]`,
    /// clipped to the text.
    pub fn new(pattern: Vertex, text: Vertex, lookup_from: BigInt, lookup_length: BigInt) -> Self {
        let pattern_length = pattern.length();
        let first_lookup_end = &lookup_from + &pattern_length;
        let last_lookup_begin = min(&lookup_from + lookup_length, text.length()) - &pattern_length;

        let inspector = Inspector::with_acceptor(
            text,
            LookupWindow {
                pattern_length,
                first_lookup_end,
                last_lookup_begin: last_lookup_begin.clone(),
            },
        );

        Self {
            pattern,
            first_lookup_begin: lookup_from,
            last_lookup_begin,
            inspector,
        }
    }

    /// The next progression of occurrences, or Null once the window is
    /// exhausted. Each progression has a step of at most `|pattern|`.
    pub fn next_match(&mut self, table: &mut MatchingTable) -> FiniteArithmeticSequence {
        let pattern_length = self.pattern.length();
        let mut current = FiniteArithmeticSequence::null();

        while let Some(task) = self.inspector.current() {
            let found = table
                .matches(&self.pattern, &task.vertex)
                .shift_right(&task.left_siblings_length)
                .fit_into(&self.first_lookup_begin, &self.last_lookup_begin);

            let joined = current.join_with(&found);
            if !current.is_null() && (joined.is_null() || joined.step() > &pattern_length) {
                // Resume from this vertex next time.
                return current;
            }

            current = joined;
            self.inspector.advance();
        }

        current
    }
}
