//! Pairs: adjacent occurrences `ab` of two different letters.

use crate::id_gen::TerminalId;
use std::collections::{BTreeMap, BTreeSet};

/// Letters seen directly before and after one letter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Neighbours {
    pub left: BTreeSet<TerminalId>,
    pub right: BTreeSet<TerminalId>,
}

/// Split of the alphabet into letters that may start a compressed pair and
/// letters that may end one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Partition {
    pub left: BTreeSet<TerminalId>,
    pub right: BTreeSet<TerminalId>,
}

impl Partition {
    /// The same split with the sides swapped.
    pub(crate) fn swapped(&self) -> Partition {
        Partition {
            left: self.right.clone(),
            right: self.left.clone(),
        }
    }
}

/// The "precedes" graph over letters, built from every adjacent pair of the
/// current word.
#[derive(Clone, Debug, Default)]
pub(crate) struct PairGraph {
    letters: BTreeMap<TerminalId, Neighbours>,
}

impl PairGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records that `first` is directly followed by `second` somewhere.
    pub(crate) fn add(&mut self, first: TerminalId, second: TerminalId) {
        debug_assert_ne!(first, second, "Blocks are not pairs");
        self.letters.entry(first).or_default().right.insert(second);
        self.letters.entry(second).or_default().left.insert(first);
    }

    /// Number of distinct pairs still in the graph.
    pub(crate) fn pair_count(&self) -> usize {
        self.letters.values().map(|n| n.right.len()).sum()
    }

    /// Greedy left/right assignment, visiting letters in increasing order.
    ///
    /// A letter goes to the side that resolves more pairs, counting pairs
    /// with letters already placed on the opposite side plus pairs with
    /// letters not placed yet. Ties go left. Letters without remaining pairs
    /// are not placed at all.
    pub(crate) fn greedy_partition(&self) -> Partition {
        let mut partition = Partition::default();

        for (&id, neighbours) in &self.letters {
            if neighbours.left.is_empty() && neighbours.right.is_empty() {
                continue;
            }

            let if_left = neighbours
                .right
                .iter()
                .filter(|&&next| next > id || partition.right.contains(&next))
                .count();
            let if_right = neighbours
                .left
                .iter()
                .filter(|&&previous| previous > id || partition.left.contains(&previous))
                .count();

            if if_left >= if_right {
                partition.left.insert(id);
            } else {
                partition.right.insert(id);
            }
        }

        partition
    }

    /// Whether some remaining pair goes from `partition.left` to
    /// `partition.right` or the other way round.
    pub(crate) fn is_resolved_by(&self, partition: &Partition) -> bool {
        self.letters.iter().any(|(id, neighbours)| {
            let opposite = if partition.left.contains(id) {
                &partition.right
            } else if partition.right.contains(id) {
                &partition.left
            } else {
                return false;
            };
            neighbours.right.iter().any(|next| opposite.contains(next))
        })
    }

    /// Drops every pair going from `partition.left` to `partition.right`.
    pub(crate) fn remove_compressed(&mut self, partition: &Partition) {
        for (id, neighbours) in self.letters.iter_mut() {
            if partition.left.contains(id) {
                neighbours.right.retain(|next| !partition.right.contains(next));
            }
            if partition.right.contains(id) {
                neighbours.left.retain(|previous| !partition.left.contains(previous));
            }
        }
    }
}
