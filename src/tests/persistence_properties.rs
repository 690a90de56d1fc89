use super::{balanced, left_deep, symbol, values};
use crate::persistence::{load, save};
use crate::vertex::Vertex;
use proptest::prelude::*;

fn round_trip(roots: &[(String, Vertex)]) -> Vec<(String, Vertex)> {
    let mut buffer = Vec::new();
    save(&mut buffer, roots).unwrap();
    load(buffer.as_slice()).unwrap()
}

proptest! {
    /// Property 1: saved fragments load back with the same names and words.
    #[test]
    fn prop_round_trip(
        words in prop::collection::vec(prop::collection::vec(symbol(), 0..30), 0..5),
    ) {
        let roots: Vec<(String, Vertex)> = words
            .iter()
            .enumerate()
            .map(|(index, word)| (format!("w{index}"), balanced(word)))
            .collect();

        let loaded = round_trip(&roots);
        prop_assert_eq!(loaded.len(), roots.len());
        for ((name, vertex), (loaded_name, loaded_vertex)) in roots.iter().zip(loaded.iter()) {
            prop_assert_eq!(name, loaded_name);
            prop_assert_eq!(values(vertex), values(loaded_vertex));
            prop_assert_eq!(vertex.height(), loaded_vertex.height());
        }
    }

    /// Property 2: negated roots and shared subtrees survive.
    #[test]
    fn prop_round_trip_negated(word in prop::collection::vec(symbol(), 1..30)) {
        let vertex = left_deep(&word);
        let both = Vertex::concat(vertex.clone(), vertex.negate());
        let roots = vec![
            ("word".to_string(), vertex.negate()),
            ("both".to_string(), both.clone()),
        ];

        let loaded = round_trip(&roots);
        prop_assert_eq!(values(&loaded[0].1), values(&vertex.negate()));
        prop_assert_eq!(values(&loaded[1].1), values(&both));
        if both.is_nonterminal() {
            prop_assert_eq!(loaded[1].1.left_child().negate(), loaded[1].1.right_child());
        }
    }
}
