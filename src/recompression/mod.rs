//! Recompression of straight-line programs into a canonical form.
//!
//! The vertex DAG is turned into a mutable grammar, one rule per vertex.
//! Each round first makes every maximal run `a^k` explicit and replaces it
//! by a fresh letter, then splits the alphabet greedily into left and right
//! letters and replaces the pairs `ab` with `a` left and `b` right, popping
//! letters out of rules wherever a run or pair crosses a rule boundary. All
//! choices depend on the word alone, so fragments producing the same word
//! end up with identically shaped results.

pub(crate) mod blocks;
pub(crate) mod pairs;
mod rules;

use crate::vertex::Vertex;
use log::{debug, trace};
use rules::Rules;

/// Returns a vertex producing the same word as `root`, built by repeated
/// block and pair compression.
///
/// Vertices of height below 2 are returned unchanged.
pub fn normal_form(root: &Vertex) -> Vertex {
    if root.height() < 2 {
        return root.clone();
    }

    let mut rules = Rules::new(root);
    debug!(
        "Recompressing {} rules over {} letters",
        rules.rules.len(),
        rules.ids.len()
    );

    let mut iteration = 0usize;
    loop {
        rules.unwrap_root();
        if let Some(id) = rules.root_terminal() {
            debug!(
                "Recompression finished after {iteration} rounds with {} terminal ids",
                rules.ids.len()
            );
            return rules.ids.vertex(id).clone();
        }
        iteration += 1;

        rules.remove_crossing_blocks();
        let blocks = rules.compress_blocks();

        let mut graph = rules.pair_graph();
        let pairs = graph.pair_count();
        let mut rounds = 0usize;
        let mut partition = graph.greedy_partition();
        while graph.is_resolved_by(&partition) {
            trace!(
                "Pair round {rounds}: left {:?}, right {:?}",
                partition.left,
                partition.right
            );
            for side in [partition.clone(), partition.swapped()] {
                let occurrences = rules.remove_crossing_pairs(&side);
                rules.compress_pairs(occurrences);
                graph.remove_compressed(&side);
            }
            rounds += 1;
            partition = graph.greedy_partition();
        }

        rules.empty_cleanup();
        debug!(
            "Round {iteration}: {blocks} blocks, {pairs} pairs in {rounds} partitions, {} letters left",
            rules.letter_count()
        );
    }
}
