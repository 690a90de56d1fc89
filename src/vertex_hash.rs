//! Composable hashes of the words derived by vertices.
//!
//! A [`VertexHasher`] is a monoid homomorphism from words to some value:
//! the hash of a concatenation only depends on the hashes of its parts, and
//! the hash of an inverse word is the inverse hash. Hashes of whole
//! subtrees are memoized, so the hash of any slice costs a number of steps
//! proportional to the height of the vertex.

use crate::mapper::map_vertices;
use crate::vertex::{TerminalSymbol, Vertex};
use ahash::AHashMap;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cmp::{max, min};

pub trait VertexHasher: Clone + PartialEq {
    fn terminal(symbol: TerminalSymbol) -> Self;

    /// Hash of the empty word.
    fn empty() -> Self;

    fn concatenate_with(&mut self, other: &Self);

    fn inverse(&self) -> Self;
}

/// Signed occurrence count of each terminal `1..=RANK`.
///
/// Counts are `i64`; hashing a word in which some count leaves the `i64`
/// range panics.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PowerCountHash<const RANK: usize> {
    powers: [i64; RANK],
}

impl<const RANK: usize> PowerCountHash<RANK> {
    pub fn powers(&self) -> &[i64; RANK] {
        &self.powers
    }
}

impl<const RANK: usize> VertexHasher for PowerCountHash<RANK> {
    fn terminal(symbol: TerminalSymbol) -> Self {
        let index = symbol.value().unsigned_abs() as usize;
        assert!(
            (1..=RANK).contains(&index),
            "Terminal {symbol} is out of rank {RANK}"
        );
        let mut powers = [0; RANK];
        powers[index - 1] = if symbol.is_negative() { -1 } else { 1 };
        Self { powers }
    }

    fn empty() -> Self {
        Self { powers: [0; RANK] }
    }

    fn concatenate_with(&mut self, other: &Self) {
        for (power, other) in self.powers.iter_mut().zip(other.powers.iter()) {
            *power = power
                .checked_add(*other)
                .expect("Terminal power count overflows i64");
        }
    }

    fn inverse(&self) -> Self {
        Self {
            powers: self.powers.map(|power| {
                power
                    .checked_neg()
                    .expect("Terminal power count overflows i64")
            }),
        }
    }
}

/// Sum of the signs of all letters.
///
/// Panics once the sum leaves the `i64` range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SinglePowerHash(pub i64);

impl VertexHasher for SinglePowerHash {
    fn terminal(symbol: TerminalSymbol) -> Self {
        Self(if symbol.is_negative() { -1 } else { 1 })
    }

    fn empty() -> Self {
        Self(0)
    }

    fn concatenate_with(&mut self, other: &Self) {
        self.0 = self
            .0
            .checked_add(other.0)
            .expect("Terminal power sum overflows i64");
    }

    fn inverse(&self) -> Self {
        Self(
            self.0
                .checked_neg()
                .expect("Terminal power sum overflows i64"),
        )
    }
}

const PERMUTATION_RANK: usize = 16;

/// Image of the word in the symmetric group on 16 points.
///
/// Terminal 1 maps to a permutation of maximal order and terminal 2 to one
/// that generates the whole group together with it. Every other terminal
/// gets a shuffle seeded by its absolute value, so images are stable across
/// runs. Unlike the counting hashes this one tells `ab` from `ba`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PermutationHash {
    /// `permutation[i]` is the image of point `i`.
    permutation: [u8; PERMUTATION_RANK],
}

impl PermutationHash {
    const IDENTITY: [u8; PERMUTATION_RANK] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];
    const FIRST: [u8; PERMUTATION_RANK] = [11, 4, 5, 13, 15, 0, 12, 8, 3, 1, 6, 14, 9, 7, 2, 10];
    const SECOND: [u8; PERMUTATION_RANK] = [6, 14, 0, 4, 13, 7, 11, 12, 1, 10, 15, 9, 5, 8, 2, 3];

    pub fn permutation(&self) -> &[u8; PERMUTATION_RANK] {
        &self.permutation
    }

    fn positive_terminal(letter: u32) -> [u8; PERMUTATION_RANK] {
        match letter {
            1 => Self::FIRST,
            2 => Self::SECOND,
            _ => {
                let mut permutation = Self::IDENTITY;
                let mut rng = ChaCha8Rng::seed_from_u64(u64::from(letter));
                permutation.shuffle(&mut rng);
                permutation
            }
        }
    }
}

impl VertexHasher for PermutationHash {
    fn terminal(symbol: TerminalSymbol) -> Self {
        let hash = Self {
            permutation: Self::positive_terminal(symbol.value().unsigned_abs()),
        };
        if symbol.is_negative() {
            hash.inverse()
        } else {
            hash
        }
    }

    fn empty() -> Self {
        Self {
            permutation: Self::IDENTITY,
        }
    }

    /// Applies `self` first, then `other`.
    fn concatenate_with(&mut self, other: &Self) {
        self.permutation = self
            .permutation
            .map(|point| other.permutation[usize::from(point)]);
    }

    fn inverse(&self) -> Self {
        let mut permutation = [0; PERMUTATION_RANK];
        for (point, &image) in self.permutation.iter().enumerate() {
            permutation[usize::from(image)] = point as u8;
        }
        Self { permutation }
    }
}

/// Length of the word. Inversion keeps it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ImageLengthHash(pub BigInt);

impl VertexHasher for ImageLengthHash {
    fn terminal(_symbol: TerminalSymbol) -> Self {
        Self(BigInt::one())
    }

    fn empty() -> Self {
        Self(BigInt::zero())
    }

    fn concatenate_with(&mut self, other: &Self) {
        self.0 += &other.0;
    }

    fn inverse(&self) -> Self {
        self.clone()
    }
}

impl<A: VertexHasher, B: VertexHasher> VertexHasher for (A, B) {
    fn terminal(symbol: TerminalSymbol) -> Self {
        (A::terminal(symbol), B::terminal(symbol))
    }

    fn empty() -> Self {
        (A::empty(), B::empty())
    }

    fn concatenate_with(&mut self, other: &Self) {
        self.0.concatenate_with(&other.0);
        self.1.concatenate_with(&other.1);
    }

    fn inverse(&self) -> Self {
        (self.0.inverse(), self.1.inverse())
    }
}

/// Hash of the whole word of `root`, memoized in `cache`.
///
/// Every computed entry is stored together with the entry of the negated
/// vertex, so a vertex and its inverse are hashed once.
pub fn vertex_hash<H: VertexHasher>(root: &Vertex, cache: &mut AHashMap<Vertex, H>) -> H {
    if root.is_null() {
        return H::empty();
    }

    map_vertices(root, cache, |vertex, hashes| {
        let hash = if let Some(negated) = hashes.get(&vertex.negate()) {
            negated.inverse()
        } else if let Some(symbol) = vertex.terminal_symbol() {
            H::terminal(symbol)
        } else {
            let mut hash = hashes[&vertex.left_child()].clone();
            hash.concatenate_with(&hashes[&vertex.right_child()]);
            hash
        };
        hashes.insert(vertex.negate(), hash.inverse());
        hash
    });

    cache[root].clone()
}

/// Maximal whole subtrees of `root` covering `[begin, end)`, left to right.
fn covering_subtrees(root: &Vertex, begin: &BigInt, end: &BigInt) -> Vec<Vertex> {
    let mut subtrees = Vec::new();
    let mut pending = vec![(root.clone(), begin.clone(), end.clone())];

    while let Some((vertex, begin, end)) = pending.pop() {
        if begin >= end {
            continue;
        }
        if begin.is_zero() && end == vertex.length() {
            subtrees.push(vertex);
            continue;
        }

        let split = vertex.split_point();
        if end > split {
            pending.push((
                vertex.right_child(),
                max(&begin - &split, BigInt::zero()),
                &end - &split,
            ));
        }
        if begin < split {
            pending.push((vertex.left_child(), begin, min(end, split)));
        }
    }

    subtrees
}

/// Hash of the slice `[begin, end)` of the word of `root`.
///
/// The range is clamped to the word; an empty range hashes as the empty word.
pub fn subvertex_hash<H: VertexHasher>(
    root: &Vertex,
    begin: &BigInt,
    end: &BigInt,
    cache: &mut AHashMap<Vertex, H>,
) -> H {
    let begin = max(begin.clone(), BigInt::zero());
    let end = min(end.clone(), root.length());
    let mut hash = H::empty();
    if begin >= end {
        return hash;
    }

    for subtree in covering_subtrees(root, &begin, &end) {
        hash.concatenate_with(&vertex_hash(&subtree, cache));
    }
    hash
}

/// Length of the longest common prefix as seen through hash `H`.
///
/// Binary search over prefixes comparing slice hashes. The answer is exact
/// when `H` separates the compared slices, otherwise it may overshoot.
pub fn hashed_common_prefix<H: VertexHasher>(
    first: &Vertex,
    second: &Vertex,
    cache: &mut AHashMap<Vertex, H>,
) -> BigInt {
    let mut begin = BigInt::zero();
    let mut end = min(first.length(), second.length());

    // The prefixes of length `begin` agree.
    while begin < end {
        let split = (&begin + &end + 1) / 2;
        let first_hash = subvertex_hash(first, &begin, &split, cache);
        let second_hash = subvertex_hash(second, &begin, &split, cache);
        if first_hash == second_hash {
            begin = split;
        } else {
            end = split - 1;
        }
    }

    debug_assert!(!begin.is_negative());
    begin
}
