//! Property tests against naive word-level oracles.

mod matching_properties;
mod normal_form_properties;
mod persistence_properties;

use crate::vertex::Vertex;
use crate::vertex_word::materialize;
use proptest::prelude::*;

/// A symbol from a small signed alphabet, so that runs, matches and
/// cancellations are frequent.
pub(crate) fn symbol() -> impl Strategy<Value = i32> {
    prop_oneof![1..=3i32, -3..=-1i32]
}

/// Maps raw fuzzer bytes onto the same small signed alphabet.
pub(crate) fn symbols_from(raw: &[i8]) -> Vec<i32> {
    raw.iter()
        .map(|&byte| {
            let letter = i32::from(byte).rem_euclid(3) + 1;
            if byte < 0 {
                -letter
            } else {
                letter
            }
        })
        .collect()
}

/// One step of a random DAG: concatenate two earlier pool members, each
/// possibly negated. Indices wrap around the pool.
pub(crate) type DagStep = (usize, bool, usize, bool);

pub(crate) fn dag_step() -> impl Strategy<Value = DagStep> {
    (any::<usize>(), any::<bool>(), any::<usize>(), any::<bool>())
}

/// Builds a pool of vertices sharing subtrees: the leaves first, then one
/// vertex per step. The last vertex is the root.
pub(crate) fn dag_pool(leaves: &[i32], steps: &[DagStep]) -> Vec<Vertex> {
    let mut pool: Vec<Vertex> = leaves.iter().map(|&s| Vertex::terminal(s)).collect();
    for &(left, negate_left, right, negate_right) in steps {
        let pick = |index: usize, negate: bool| {
            let vertex = &pool[index % pool.len()];
            if negate {
                vertex.negate()
            } else {
                vertex.clone()
            }
        };
        let vertex = Vertex::concat(pick(left, negate_left), pick(right, negate_right));
        pool.push(vertex);
    }
    pool
}

pub(crate) fn left_deep(symbols: &[i32]) -> Vertex {
    symbols
        .iter()
        .map(|&s| Vertex::terminal(s))
        .reduce(Vertex::concat)
        .unwrap_or(Vertex::Null)
}

pub(crate) fn right_deep(symbols: &[i32]) -> Vertex {
    symbols
        .iter()
        .rev()
        .map(|&s| Vertex::terminal(s))
        .reduce(|right, left| Vertex::concat(left, right))
        .unwrap_or(Vertex::Null)
}

pub(crate) fn balanced(symbols: &[i32]) -> Vertex {
    match symbols.len() {
        0 => Vertex::Null,
        1 => Vertex::terminal(symbols[0]),
        length => {
            let (left, right) = symbols.split_at(length / 2);
            Vertex::concat(balanced(left), balanced(right))
        }
    }
}

pub(crate) fn values(root: &Vertex) -> Vec<i32> {
    materialize(root).into_iter().map(|s| s.value()).collect()
}

/// `x x⁻¹` cancellation with a stack.
pub(crate) fn naive_reduce(symbols: &[i32]) -> Vec<i32> {
    let mut stack: Vec<i32> = Vec::with_capacity(symbols.len());
    for &symbol in symbols {
        if stack.last() == Some(&-symbol) {
            stack.pop();
        } else {
            stack.push(symbol);
        }
    }
    stack
}

/// Whether two derivation trees have the same shape and the same leaves.
pub(crate) fn same_shape(first: &Vertex, second: &Vertex) -> bool {
    match (first, second) {
        (Vertex::Null, Vertex::Null) => true,
        (Vertex::Terminal(a), Vertex::Terminal(b)) => a == b,
        (Vertex::Nonterminal(_), Vertex::Nonterminal(_)) => {
            first.length() == second.length()
                && same_shape(&first.left_child(), &second.left_child())
                && same_shape(&first.right_child(), &second.right_child())
        }
        _ => false,
    }
}
