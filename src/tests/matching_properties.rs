use super::{balanced, left_deep, right_deep, symbols_from, values};
use crate::common_prefix::{longest_common_prefix, strings_equal};
use crate::pattern_matching::{MatchingTable, PatternMatchesGenerator};
use crate::vertex::Vertex;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn naive_occurrences(pattern: &[i32], text: &[i32]) -> BTreeSet<usize> {
    if pattern.is_empty() || pattern.len() > text.len() {
        return BTreeSet::new();
    }
    text.windows(pattern.len())
        .enumerate()
        .filter(|(_, window)| *window == pattern)
        .map(|(start, _)| start)
        .collect()
}

fn found_occurrences(table: &mut MatchingTable, pattern: &Vertex, text: &Vertex) -> BTreeSet<usize> {
    table
        .find_all(pattern, text)
        .iter()
        .flat_map(|sequence| sequence.iter().collect::<Vec<_>>())
        .map(|start| start.to_usize().unwrap())
        .collect()
}

fn naive_common_prefix(first: &[i32], second: &[i32]) -> usize {
    first
        .iter()
        .zip(second.iter())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Fibonacci words over {1, 2}, sharing all earlier words.
fn fibonacci(count: usize) -> Vertex {
    let mut previous = Vertex::terminal(1);
    let mut current = Vertex::concat(Vertex::terminal(1), Vertex::terminal(2));
    for _ in 0..count {
        let next = Vertex::concat(current.clone(), previous);
        previous = current;
        current = next;
    }
    current
}

proptest! {
    /// Property 1: find_all agrees with a window scan.
    #[test]
    fn prop_find_all_matches_naive(
        text in prop::collection::vec(1..=2i32, 0..60),
        pattern in prop::collection::vec(1..=2i32, 1..6),
    ) {
        let mut table = MatchingTable::new();
        let expected = naive_occurrences(&pattern, &text);
        for pattern_vertex in [left_deep(&pattern), right_deep(&pattern)] {
            let found = found_occurrences(&mut table, &pattern_vertex, &balanced(&text));
            prop_assert_eq!(&found, &expected);
            let found = found_occurrences(&mut table, &pattern_vertex, &left_deep(&text));
            prop_assert_eq!(&found, &expected);
        }
    }

    /// Property 2: occurs_at agrees with a direct comparison at every offset.
    #[test]
    fn prop_occurs_at(
        text in prop::collection::vec(1..=2i32, 1..40),
        pattern in prop::collection::vec(1..=2i32, 1..4),
    ) {
        let mut table = MatchingTable::new();
        let text_vertex = right_deep(&text);
        let pattern_vertex = balanced(&pattern);
        let expected = naive_occurrences(&pattern, &text);
        for position in 0..=text.len() {
            prop_assert_eq!(
                table.occurs_at(&pattern_vertex, &text_vertex, &BigInt::from(position)),
                expected.contains(&position)
            );
        }
    }

    /// Property 3: the generator lists exactly the occurrences starting in
    /// the window.
    #[test]
    fn prop_generator_window(
        text in prop::collection::vec(1..=2i32, 1..50),
        pattern in prop::collection::vec(1..=2i32, 1..4),
        from in 0usize..50,
        length in 0usize..50,
    ) {
        let mut table = MatchingTable::new();
        let mut generator = PatternMatchesGenerator::new(
            balanced(&pattern),
            balanced(&text),
            BigInt::from(from),
            BigInt::from(length),
        );

        let mut found = BTreeSet::new();
        loop {
            let sequence = generator.next_match(&mut table);
            if sequence.is_null() {
                break;
            }
            prop_assert!(sequence.step() <= &BigInt::from(pattern.len()));
            found.extend(sequence.iter().map(|start| start.to_usize().unwrap()));
        }

        let expected: BTreeSet<usize> = naive_occurrences(&pattern, &text)
            .into_iter()
            .filter(|&start| start >= from && start + pattern.len() <= from + length)
            .collect();
        prop_assert_eq!(found, expected);
    }

    /// Property 4: equality and common prefixes ignore the tree shape.
    #[test]
    fn prop_common_prefix(
        first in prop::collection::vec(1..=2i32, 0..30),
        second in prop::collection::vec(1..=2i32, 0..30),
    ) {
        let mut table = MatchingTable::new();
        let first_vertex = balanced(&first);
        let second_vertex = left_deep(&second);

        prop_assert!(strings_equal(&first_vertex, &right_deep(&first), &mut table));
        prop_assert_eq!(
            strings_equal(&first_vertex, &second_vertex, &mut table),
            first == second
        );
        prop_assert_eq!(
            longest_common_prefix(&first_vertex, &second_vertex, &mut table),
            BigInt::from(naive_common_prefix(&first, &second))
        );
    }

    /// Property 5: symbol_at reads the same word as the iterator.
    #[test]
    fn prop_symbol_at(word in prop::collection::vec(super::symbol(), 1..40)) {
        let vertex = balanced(&word);
        prop_assert_eq!(values(&vertex), word.clone());
        for (index, &expected) in word.iter().enumerate() {
            prop_assert_eq!(vertex.symbol_at(&BigInt::from(index)).value(), expected);
        }
    }
}

#[test]
fn test_fibonacci_occurrences() {
    let text = fibonacci(12);
    let pattern = fibonacci(4);
    let mut table = MatchingTable::new();
    let expected = naive_occurrences(&values(&pattern), &values(&text));
    assert!(!expected.is_empty());
    assert_eq!(found_occurrences(&mut table, &pattern, &text), expected);
}

/// Bolero fuzz test: find_all never disagrees with the window scan
#[cfg(test)]
#[test]
fn fuzz_find_all() {
    bolero::check!()
        .with_type::<(Vec<i8>, Vec<i8>)>()
        .for_each(|(text, pattern)| {
            let text = symbols_from(text);
            let pattern = symbols_from(pattern);
            let mut table = MatchingTable::new();
            let found = found_occurrences(&mut table, &right_deep(&pattern), &balanced(&text));
            assert_eq!(found, naive_occurrences(&pattern, &text));
        });
}
