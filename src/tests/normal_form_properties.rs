use super::{balanced, left_deep, right_deep, same_shape, symbol, symbols_from, values};
use crate::recompression::normal_form;
use crate::vertex::Vertex;
use proptest::prelude::*;

proptest! {
    /// Property 1: the normal form produces the same word.
    #[test]
    fn prop_normal_form_keeps_word(word in prop::collection::vec(symbol(), 0..80)) {
        let normalized = normal_form(&balanced(&word));
        prop_assert_eq!(values(&normalized), word);
    }

    /// Property 2: equal words get identically shaped normal forms.
    #[test]
    fn prop_normal_form_canonical(word in prop::collection::vec(symbol(), 0..80)) {
        let from_balanced = normal_form(&balanced(&word));
        let from_left = normal_form(&left_deep(&word));
        let from_right = normal_form(&right_deep(&word));
        prop_assert!(same_shape(&from_balanced, &from_left));
        prop_assert!(same_shape(&from_balanced, &from_right));
    }

    /// Property 3: normalizing a normal form is stable.
    #[test]
    fn prop_normal_form_stable(word in prop::collection::vec(1..=2i32, 2..60)) {
        let once = normal_form(&right_deep(&word));
        let twice = normal_form(&once);
        prop_assert!(same_shape(&once, &twice));
    }

    /// Property 4: long runs stay logarithmically shallow.
    #[test]
    fn prop_power_height(exponent in 1u32..16, letter in 1..=3i32) {
        let mut power = Vertex::terminal(letter);
        for _ in 0..exponent {
            power = Vertex::concat(power.clone(), power);
        }
        let tail = Vertex::terminal(letter % 3 + 1);
        let normalized = normal_form(&Vertex::concat(power, tail));
        prop_assert!(normalized.height() <= 2 * exponent + 3);
    }
}

/// Bolero fuzz test: normal forms of differently shaped trees coincide
#[cfg(test)]
#[test]
fn fuzz_normal_form() {
    bolero::check!().with_type::<Vec<i8>>().for_each(|raw| {
        let word = symbols_from(raw);
        let first = normal_form(&left_deep(&word));
        let second = normal_form(&balanced(&word));
        assert_eq!(values(&first), word);
        assert!(same_shape(&first, &second));
    });
}
