//! Free reduction of compressed words.

use crate::common_prefix::longest_common_prefix;
use crate::mapper::map_vertices;
use crate::pattern_matching::MatchingTable;
use crate::vertex::Vertex;
use ahash::AHashMap;
use log::debug;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

/// Returns a vertex producing the slice `[begin, end)` of the word of `root`.
///
/// Whole subtrees inside the slice are reused as they are; only the vertices
/// on the two cut paths are rebuilt.
pub fn get_sub_slp(root: &Vertex, begin: &BigInt, end: &BigInt) -> Vertex {
    let length = root.length();
    assert!(
        !begin.is_negative() && end <= &length,
        "Slice [{begin}, {end}) is out of range"
    );
    if begin >= end {
        return Vertex::Null;
    }

    let mut node = root.clone();
    let mut begin = begin.clone();
    let mut end = end.clone();
    while node.is_nonterminal() && !(begin.is_zero() && end == node.length()) {
        let split = node.split_point();
        if end <= split {
            node = node.left_child();
        } else if begin >= split {
            begin -= &split;
            end -= &split;
            node = node.right_child();
        } else {
            let left = suffix(&node.left_child(), &begin);
            let right = prefix(&node.right_child(), &(end - split));
            return Vertex::concat(left, right);
        }
    }
    node
}

/// The word of `root` without its first `begin` symbols.
fn suffix(root: &Vertex, begin: &BigInt) -> Vertex {
    let mut node = root.clone();
    let mut begin = begin.clone();
    let mut right_parts = Vec::new();
    while !begin.is_zero() {
        let split = node.split_point();
        if begin >= split {
            begin -= split;
            node = node.right_child();
        } else {
            right_parts.push(node.right_child());
            node = node.left_child();
        }
    }
    right_parts
        .into_iter()
        .rev()
        .fold(node, |acc, part| Vertex::concat(acc, part))
}

/// The first `end` symbols of the word of `root`.
fn prefix(root: &Vertex, end: &BigInt) -> Vertex {
    let mut node = root.clone();
    let mut end = end.clone();
    let mut left_parts = Vec::new();
    while end < node.length() {
        let split = node.split_point();
        if end <= split {
            node = node.left_child();
        } else {
            end -= &split;
            left_parts.push(node.left_child());
            node = node.right_child();
        }
    }
    left_parts
        .into_iter()
        .rev()
        .fold(node, |acc, part| Vertex::concat(part, acc))
}

/// How many symbols cancel at the split point of `vertex` under free
/// reduction, assuming both children are reduced.
pub fn get_cancellation_length(vertex: &Vertex, table: &mut MatchingTable) -> BigInt {
    longest_common_prefix(&vertex.left_child().negate(), &vertex.right_child(), table)
}

/// Reduces vertices, keeping the results and the matching table between
/// calls so shared subtrees are only reduced once.
#[derive(Default)]
pub struct Reducer {
    table: MatchingTable,
    reduced: AHashMap<Vertex, Vertex>,
}

impl Reducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a vertex producing the freely reduced word of `root`.
    ///
    /// A vertex whose word is already reduced is returned as it is.
    pub fn reduce(&mut self, root: &Vertex) -> Vertex {
        if root.is_null() {
            return Vertex::Null;
        }

        let table = &mut self.table;
        let before = self.reduced.len();
        map_vertices(root, &mut self.reduced, |vertex, images| {
            let image = if vertex.is_nonterminal() {
                let left = images[&vertex.left_child()].clone();
                let right = images[&vertex.right_child()].clone();
                reduce_concatenation(vertex, left, right, table)
            } else {
                vertex.clone()
            };
            images.insert(vertex.negate(), image.negate());
            image
        });
        debug!(
            "Reduced {} vertices, matching table holds {} pairs",
            self.reduced.len() - before,
            self.table.len()
        );

        self.reduced[root].clone()
    }

    pub fn table_mut(&mut self) -> &mut MatchingTable {
        &mut self.table
    }
}

fn reduce_concatenation(
    vertex: &Vertex,
    left: Vertex,
    right: Vertex,
    table: &mut MatchingTable,
) -> Vertex {
    if left.is_null() || right.is_null() {
        return Vertex::concat(left, right);
    }

    let cancelled = longest_common_prefix(&left.negate(), &right, table);
    if cancelled.is_zero() {
        if left == vertex.left_child() && right == vertex.right_child() {
            return vertex.clone();
        }
        return Vertex::concat(left, right);
    }

    let left_length = left.length();
    let right_length = right.length();
    Vertex::concat(
        get_sub_slp(&left, &BigInt::zero(), &(left_length - &cancelled)),
        get_sub_slp(&right, &cancelled, &right_length),
    )
}

/// Returns a vertex producing the freely reduced word of `root`.
pub fn reduce(root: &Vertex) -> Vertex {
    Reducer::new().reduce(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex_word::materialize;

    fn values(vertex: &Vertex) -> Vec<i32> {
        materialize(vertex).into_iter().map(|s| s.value()).collect()
    }

    fn word(symbols: &[i32]) -> Vertex {
        match symbols.len() {
            0 => Vertex::Null,
            1 => Vertex::terminal(symbols[0]),
            length => Vertex::concat(
                word(&symbols[..length / 2]),
                word(&symbols[length / 2..]),
            ),
        }
    }

    #[test]
    fn test_sub_slp() {
        let abcde = word(&[1, 2, 3, 4, 5]);
        for begin in 0..=5 {
            for end in begin..=5 {
                let slice = get_sub_slp(&abcde, &BigInt::from(begin), &BigInt::from(end));
                assert_eq!(values(&slice), (begin + 1..=end).collect::<Vec<i32>>());
            }
        }
    }

    #[test]
    fn test_sub_slp_reuses_aligned_subtrees() {
        let left = word(&[1, 2]);
        let right = word(&[3, 4]);
        let root = Vertex::concat(left.clone(), right.clone());

        assert_eq!(get_sub_slp(&root, &BigInt::from(0), &BigInt::from(4)), root);
        assert_eq!(get_sub_slp(&root, &BigInt::from(0), &BigInt::from(2)), left);
        assert_eq!(get_sub_slp(&root, &BigInt::from(2), &BigInt::from(4)), right);
        assert_eq!(get_sub_slp(&root, &BigInt::from(2), &BigInt::from(3)), Vertex::terminal(3));
    }

    #[test]
    fn test_cancel_symbol_with_inverse() {
        let a = Vertex::terminal(1);
        let root = Vertex::concat(a.clone(), a.negate());
        assert_eq!(reduce(&root), Vertex::Null);
    }

    #[test]
    fn test_cancellation_length() {
        let a = Vertex::terminal(1);
        let b = Vertex::terminal(2);
        let aab = Vertex::concat(a.clone(), Vertex::concat(a, b));
        let root = Vertex::concat(aab.negate(), aab.clone());

        let mut table = MatchingTable::new();
        assert_eq!(get_cancellation_length(&root, &mut table), BigInt::from(3));
        assert_eq!(reduce(&root), Vertex::Null);
    }

    #[test]
    fn test_partial_cancellation() {
        let root = Vertex::concat(word(&[1, 2, 3]), word(&[-3, -2, 4]));
        assert_eq!(values(&reduce(&root)), vec![1, 4]);

        let nested = Vertex::concat(word(&[5, 1, -1, 2]), word(&[-2, -5, 6]));
        assert_eq!(values(&reduce(&nested)), vec![6]);
    }

    #[test]
    fn test_reduced_vertex_returned_unchanged() {
        let root = word(&[1, 2, -1, 3, 3]);
        assert_eq!(reduce(&root), root);
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let root = Vertex::concat(word(&[1, 2, 2, -3]), word(&[3, -2, 1]));
        let mut reducer = Reducer::new();
        let once = reducer.reduce(&root);
        assert_eq!(values(&once), vec![1, 2, 1]);
        assert_eq!(reducer.reduce(&once), once);
        assert_eq!(reduce(&once), once);
    }

    #[test]
    fn test_reducer_shares_its_matching_table() {
        let root = Vertex::concat(word(&[1, 2, 3]), word(&[-3, -2, 4]));

        let mut reducer = Reducer::new();
        assert!(reducer.table_mut().is_empty());
        assert_eq!(values(&reducer.reduce(&root)), vec![1, 4]);
        let filled = reducer.table_mut().len();

        assert_eq!(
            get_cancellation_length(&root, reducer.table_mut()),
            BigInt::from(2)
        );
        assert!(reducer.table_mut().len() >= filled);
    }
}
