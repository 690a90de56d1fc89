//! Blocks: maximal runs `a^k` of one letter.

use crate::vertex::Vertex;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::cmp::Ordering;

/// Orders powers by their bit strings read from the least significant bit.
///
/// Powers sharing their low bits end up next to each other, so the
/// exponentiation trees built for them share the common partial products.
/// Limbs are compared one by one with their bits reversed; when one limb
/// sequence is a prefix of the other the shorter one sorts first.
pub(crate) fn reverse_bit_cmp(first: &BigUint, second: &BigUint) -> Ordering {
    let first = first.to_u64_digits();
    let second = second.to_u64_digits();
    for (x, y) in first.iter().zip(&second) {
        match x.reverse_bits().cmp(&y.reverse_bits()) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
    }
    first.len().cmp(&second.len())
}

/// Builds vertices for `base^power` for every power in `powers`.
///
/// `powers` must be sorted by [`reverse_bit_cmp`] and free of duplicates.
/// The vertices are built bit by bit: in round `k` every power with bit `k`
/// set is extended by `base^(2^k)`, and neighbouring powers whose partial
/// products coincide reuse the same extension.
pub(crate) fn block_vertices(base: &Vertex, powers: &[BigUint]) -> Vec<Vertex> {
    debug_assert!(powers
        .windows(2)
        .all(|pair| reverse_bit_cmp(&pair[0], &pair[1]) == Ordering::Less));

    let mut slots: Vec<(BigUint, Vertex)> = powers
        .iter()
        .map(|power| {
            assert!(!power.is_zero(), "Blocks have a positive power");
            (power.clone(), Vertex::Null)
        })
        .collect();

    let mut current = base.clone();
    loop {
        let mut last_vertex = Vertex::Null;
        let mut last_power = current.clone();
        let mut remaining = false;

        for (power, vertex) in slots.iter_mut() {
            if (&*power & BigUint::one()).is_one() {
                if *vertex != last_vertex {
                    last_vertex = vertex.clone();
                    last_power = Vertex::concat(last_vertex.clone(), current.clone());
                }
                *vertex = last_power.clone();
            }
            *power >>= 1;
            remaining |= !power.is_zero();
        }

        if !remaining {
            break;
        }
        current = Vertex::concat(current.clone(), current);
    }

    slots.into_iter().map(|(_, vertex)| vertex).collect()
}
