use crate::pattern_matching::MatchingTable;
use crate::reduce::get_sub_slp;
use crate::vertex::Vertex;
use num_bigint::BigInt;
use num_traits::{One, Zero};
use std::cmp::min;

/// Whether two vertices produce the same word.
pub fn strings_equal(first: &Vertex, second: &Vertex, table: &mut MatchingTable) -> bool {
    let length = first.length();
    if length != second.length() {
        return false;
    }
    if length.is_zero() || first == second {
        return true;
    }
    table.occurs_at(first, second, &BigInt::zero())
}

/// Length of the longest common prefix of the words of `first` and `second`.
///
/// Binary search over the prefix length; every probe compares two prefixes
/// through the matching table.
pub fn longest_common_prefix(first: &Vertex, second: &Vertex, table: &mut MatchingTable) -> BigInt {
    let max_length = min(first.length(), second.length());
    if max_length.is_zero() {
        return max_length;
    }
    if first == second {
        return max_length;
    }
    if first.symbol_at(&BigInt::zero()) != second.symbol_at(&BigInt::zero()) {
        return BigInt::zero();
    }

    let zero = BigInt::zero();
    let mut equal = BigInt::one();
    let mut different = max_length + 1;
    while &equal + 1 < different {
        let middle: BigInt = (&equal + &different) / 2;
        let first_prefix = get_sub_slp(first, &zero, &middle);
        let second_prefix = get_sub_slp(second, &zero, &middle);
        if strings_equal(&first_prefix, &second_prefix, table) {
            equal = middle;
        } else {
            different = middle;
        }
    }
    equal
}
