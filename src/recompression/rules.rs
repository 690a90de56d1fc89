//! Mutable grammar used while recompressing.
//!
//! Every rule is a doubly-linked list of letters stored in one arena. A
//! letter is either a run `id^power` of a terminal or a reference to another
//! rule. Each rule also keeps the list of letters referring to it, so that a
//! letter popped off one of its ends can be re-inserted next to every
//! occurrence.

use super::blocks::{block_vertices, reverse_bit_cmp};
use super::pairs::{PairGraph, Partition};
use crate::id_gen::{IdGenerator, TerminalId};
use crate::mapper::map_vertices;
use crate::vertex::Vertex;
use ahash::AHashMap;
use log::trace;
use num_bigint::BigUint;
use num_traits::One;
use slotmap::{new_key_type, SlotMap};
use std::collections::BTreeMap;

new_key_type! {
    pub(crate) struct LetterKey;
}

pub(crate) type RuleId = usize;

/// Occurrences of compressible pairs, keyed by `(first, second)` and holding
/// the key of the first letter of each occurrence.
pub(crate) type PairOccurrences = BTreeMap<(TerminalId, TerminalId), Vec<LetterKey>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    First,
    Last,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LetterKind {
    Terminal { id: TerminalId, power: BigUint },
    Nonterminal(RuleId),
}

#[derive(Debug)]
pub(crate) struct Letter {
    pub kind: LetterKind,
    pub rule: RuleId,
    pub prev: Option<LetterKey>,
    pub next: Option<LetterKey>,
}

#[derive(Debug, Default)]
pub(crate) struct Rule {
    pub head: Option<LetterKey>,
    pub tail: Option<LetterKey>,
    /// Nonterminal letters referring to this rule.
    pub inclusions: Vec<LetterKey>,
    /// Cached first and last terminal letters of the expansion. An entry is
    /// stale once its letter is gone from the arena.
    first_terminal: Option<LetterKey>,
    last_terminal: Option<LetterKey>,
}

impl Rule {
    fn end(&self, side: Side) -> Option<LetterKey> {
        match side {
            Side::First => self.head,
            Side::Last => self.tail,
        }
    }

    fn cached_terminal(&mut self, side: Side) -> &mut Option<LetterKey> {
        match side {
            Side::First => &mut self.first_terminal,
            Side::Last => &mut self.last_terminal,
        }
    }
}

pub(crate) struct Rules {
    pub letters: SlotMap<LetterKey, Letter>,
    /// Rules in creation order, children before parents.
    pub rules: Vec<Rule>,
    pub ids: IdGenerator,
    pub root: RuleId,
}

impl Rules {
    /// Builds one rule per vertex of height at least 2 reachable from `root`.
    ///
    /// Terminal vertices get ids in order of their first appearance in the
    /// word of `root`.
    pub(crate) fn new(root: &Vertex) -> Self {
        assert!(root.height() >= 2, "Only nonterminals have rules");

        let mut rules = Rules {
            letters: SlotMap::with_key(),
            rules: Vec::new(),
            ids: IdGenerator::new(),
            root: 0,
        };

        let mut images: AHashMap<Vertex, LetterKind> = AHashMap::new();
        map_vertices(root, &mut images, |vertex, images| {
            if vertex.height() < 2 {
                LetterKind::Terminal {
                    id: rules.ids.get(vertex.clone()),
                    power: BigUint::one(),
                }
            } else {
                let left = images[&vertex.left_child()].clone();
                let right = images[&vertex.right_child()].clone();
                LetterKind::Nonterminal(rules.add_rule([left, right]))
            }
        });

        rules.root = match images[root] {
            LetterKind::Nonterminal(rule) => rule,
            LetterKind::Terminal { .. } => unreachable!("Root of height 2 or more has a rule"),
        };
        rules
    }

    fn add_rule(&mut self, letters: impl IntoIterator<Item = LetterKind>) -> RuleId {
        let rule = self.rules.len();
        self.rules.push(Rule::default());
        for kind in letters {
            let tail = self.rules[rule].tail;
            if let (LetterKind::Terminal { id, power }, Some(tail)) = (&kind, tail) {
                if self.is_terminal_of(tail, *id) {
                    self.add_power(tail, power);
                    continue;
                }
            }
            self.link(rule, kind, tail, None);
        }
        rule
    }

    pub(crate) fn letter_count(&self) -> usize {
        self.letters.len()
    }

    /// The letters of `rule` from head to tail.
    pub(crate) fn rule_letters(&self, rule: RuleId) -> Vec<LetterKey> {
        let mut letters = Vec::new();
        let mut current = self.rules[rule].head;
        while let Some(letter) = current {
            letters.push(letter);
            current = self.letters[letter].next;
        }
        letters
    }

    /// The id of the root, once the root is a single unrepeated terminal.
    pub(crate) fn root_terminal(&self) -> Option<TerminalId> {
        let head = self.rules[self.root].head?;
        if self.letters[head].next.is_some() {
            return None;
        }
        match &self.letters[head].kind {
            LetterKind::Terminal { id, power } if power.is_one() => Some(*id),
            _ => None,
        }
    }

    /// Pops while the root consists of a single nonterminal letter, which
    /// would otherwise hide all of its pairs from the root.
    pub(crate) fn unwrap_root(&mut self) {
        while let Some(head) = self.rules[self.root].head {
            if self.letters[head].next.is_some() || self.is_terminal(head) {
                break;
            }
            self.pop(head, Side::First);
        }
    }

    fn is_terminal(&self, letter: LetterKey) -> bool {
        matches!(self.letters[letter].kind, LetterKind::Terminal { .. })
    }

    fn is_terminal_of(&self, letter: LetterKey, id: TerminalId) -> bool {
        matches!(self.letters[letter].kind, LetterKind::Terminal { id: own, .. } if own == id)
    }

    fn add_power(&mut self, letter: LetterKey, extra: &BigUint) {
        match &mut self.letters[letter].kind {
            LetterKind::Terminal { power, .. } => *power += extra,
            LetterKind::Nonterminal(_) => unreachable!("Only terminal letters have powers"),
        }
    }

    /// Inserts a letter between `prev` and `next`, which must be adjacent
    /// in `rule`.
    fn link(
        &mut self,
        rule: RuleId,
        kind: LetterKind,
        prev: Option<LetterKey>,
        next: Option<LetterKey>,
    ) -> LetterKey {
        let child = match kind {
            LetterKind::Nonterminal(child) => Some(child),
            LetterKind::Terminal { .. } => None,
        };
        let key = self.letters.insert(Letter {
            kind,
            rule,
            prev,
            next,
        });

        match prev {
            Some(prev) => self.letters[prev].next = Some(key),
            None => self.rules[rule].head = Some(key),
        }
        match next {
            Some(next) => self.letters[next].prev = Some(key),
            None => self.rules[rule].tail = Some(key),
        }
        if let Some(child) = child {
            self.rules[child].inclusions.push(key);
        }
        key
    }

    fn delete_letter(&mut self, key: LetterKey) -> LetterKind {
        let letter = self
            .letters
            .remove(key)
            .expect("Deleted letter must be alive");

        match letter.prev {
            Some(prev) => self.letters[prev].next = letter.next,
            None => self.rules[letter.rule].head = letter.next,
        }
        match letter.next {
            Some(next) => self.letters[next].prev = letter.prev,
            None => self.rules[letter.rule].tail = letter.prev,
        }
        if let LetterKind::Nonterminal(child) = letter.kind {
            let inclusions = &mut self.rules[child].inclusions;
            if let Some(index) = inclusions.iter().position(|&k| k == key) {
                inclusions.swap_remove(index);
            }
        }
        letter.kind
    }

    /// The first or last terminal letter in the expansion of `rule`.
    fn boundary_terminal(&mut self, rule: RuleId, side: Side) -> LetterKey {
        let mut path = Vec::new();
        let mut current = rule;
        let found = loop {
            if let Some(cached) = *self.rules[current].cached_terminal(side) {
                if self.letters.contains_key(cached) {
                    break cached;
                }
            }
            path.push(current);
            let end = self.rules[current]
                .end(side)
                .expect("Referenced rules are never empty");
            match self.letters[end].kind {
                LetterKind::Terminal { .. } => break end,
                LetterKind::Nonterminal(child) => current = child,
            }
        };

        for rule in path {
            *self.rules[rule].cached_terminal(side) = Some(found);
        }
        found
    }

    /// The terminal id at the `side` end of the expansion of `letter`.
    pub(crate) fn boundary_id(&mut self, letter: LetterKey, side: Side) -> TerminalId {
        let terminal = match self.letters[letter].kind {
            LetterKind::Terminal { .. } => letter,
            LetterKind::Nonterminal(child) => self.boundary_terminal(child, side),
        };
        match self.letters[terminal].kind {
            LetterKind::Terminal { id, .. } => id,
            LetterKind::Nonterminal(_) => unreachable!("Boundary letters are terminals"),
        }
    }

    /// Moves the terminal run at the `side` end of the expansion of `position`
    /// out into the rule holding `position`.
    ///
    /// The run is popped level by level; at each level it is re-inserted
    /// next to every occurrence of the rule it leaves, and occurrences of
    /// rules left empty are deleted. Returns the terminal letter holding the
    /// popped run in the rule of `position`. A terminal `position` is returned
    /// as is.
    pub(crate) fn pop(&mut self, position: LetterKey, side: Side) -> LetterKey {
        let mut chain = vec![position];
        while let LetterKind::Nonterminal(child) = self.letters[chain[chain.len() - 1]].kind {
            chain.push(
                self.rules[child]
                    .end(side)
                    .expect("Referenced rules are never empty"),
            );
        }

        let mut popped = chain.pop().expect("Chain starts with the position");
        while let Some(occurrence) = chain.pop() {
            popped = self.pop_level(occurrence, side);
        }
        popped
    }

    fn pop_level(&mut self, target: LetterKey, side: Side) -> LetterKey {
        let LetterKind::Nonterminal(child) = self.letters[target].kind else {
            unreachable!("Popping from a terminal letter");
        };
        let end = self.rules[child]
            .end(side)
            .expect("Referenced rules are never empty");
        let LetterKind::Terminal { id, power } = self.delete_letter(end) else {
            unreachable!("Nested runs are popped first");
        };
        let emptied = self.rules[child].head.is_none();

        // The target goes last so that no later merge can delete its letter.
        let mut occurrences = self.rules[child].inclusions.clone();
        occurrences.retain(|&occurrence| occurrence != target);
        occurrences.push(target);

        let mut inserted = target;
        for occurrence in occurrences {
            let letter = self.insert_beside(occurrence, side, id, &power);
            inserted = if emptied {
                let (before, after) = self.remove_empty_letter(occurrence);
                match side {
                    Side::First => before,
                    Side::Last => after,
                }
                .expect("The popped run stays next to the removed occurrence")
            } else {
                letter
            };
        }
        inserted
    }

    /// Puts `id^power` right before (`First`) or after (`Last`) `occurrence`,
    /// merging it into an equal neighbour.
    fn insert_beside(
        &mut self,
        occurrence: LetterKey,
        side: Side,
        id: TerminalId,
        power: &BigUint,
    ) -> LetterKey {
        let letter = &self.letters[occurrence];
        let rule = letter.rule;
        let neighbour = match side {
            Side::First => letter.prev,
            Side::Last => letter.next,
        };

        if let Some(neighbour) = neighbour {
            if self.is_terminal_of(neighbour, id) {
                self.add_power(neighbour, power);
                return neighbour;
            }
        }

        let kind = LetterKind::Terminal {
            id,
            power: power.clone(),
        };
        match side {
            Side::First => self.link(rule, kind, neighbour, Some(occurrence)),
            Side::Last => self.link(rule, kind, Some(occurrence), neighbour),
        }
    }

    /// Deletes a letter referring to an empty rule and merges its neighbours
    /// if they are runs of the same terminal. Returns the letters now before
    /// and after the removed one; after a merge both are the merged letter.
    fn remove_empty_letter(&mut self, position: LetterKey) -> (Option<LetterKey>, Option<LetterKey>) {
        let before = self.letters[position].prev;
        let after = self.letters[position].next;
        self.delete_letter(position);

        if let (Some(before), Some(after)) = (before, after) {
            if let LetterKind::Terminal { id, .. } = self.letters[after].kind {
                if self.is_terminal_of(before, id) {
                    let LetterKind::Terminal { power, .. } = self.delete_letter(after) else {
                        unreachable!("Checked to be a terminal");
                    };
                    self.add_power(before, &power);
                    return (Some(before), Some(before));
                }
            }
        }
        (before, after)
    }

    /// Makes every maximal run of a terminal a single letter of one rule.
    pub(crate) fn remove_crossing_blocks(&mut self) {
        let mut pops = 0usize;
        for rule in 0..self.rules.len() {
            let mut current = self.rules[rule].head;
            while let Some(letter) = current {
                let Some(next) = self.letters[letter].next else {
                    break;
                };
                let id = self.boundary_id(letter, Side::Last);
                if id != self.boundary_id(next, Side::First) {
                    current = Some(next);
                    continue;
                }

                if self.is_terminal(letter) && self.is_terminal(next) {
                    let LetterKind::Terminal { power, .. } = self.delete_letter(next) else {
                        unreachable!("Checked to be a terminal");
                    };
                    self.add_power(letter, &power);
                    continue;
                }

                pops += 1;
                let letter = self.pop(letter, Side::Last);
                let next = self.letters[letter].next;
                current = match next {
                    Some(next)
                        if !self.is_terminal(next) && self.boundary_id(next, Side::First) == id =>
                    {
                        Some(self.pop(next, Side::First))
                    }
                    _ => Some(letter),
                };
            }
        }
        trace!("Removed crossing blocks with {pops} pops");
    }

    /// Replaces every run `a^k` with `k > 1` by a fresh terminal. Returns the
    /// number of runs replaced.
    pub(crate) fn compress_blocks(&mut self) -> usize {
        let mut blocks: Vec<(TerminalId, BigUint, LetterKey)> = Vec::new();
        for rule in 0..self.rules.len() {
            for letter in self.rule_letters(rule) {
                if let LetterKind::Terminal { id, power } = &self.letters[letter].kind {
                    if !power.is_one() {
                        blocks.push((*id, power.clone(), letter));
                    }
                }
            }
        }
        blocks.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| reverse_bit_cmp(&a.1, &b.1)));

        let mut start = 0;
        while start < blocks.len() {
            let base = blocks[start].0;
            let end = start + blocks[start..].iter().take_while(|b| b.0 == base).count();
            let group = &blocks[start..end];

            let mut powers: Vec<BigUint> = group.iter().map(|(_, power, _)| power.clone()).collect();
            powers.dedup();
            let vertices = block_vertices(self.ids.vertex(base), &powers);
            let fresh: Vec<TerminalId> = vertices.into_iter().map(|v| self.ids.get(v)).collect();

            for (_, power, letter) in group {
                let index = powers
                    .binary_search_by(|p| reverse_bit_cmp(p, power))
                    .expect("Every block power is listed");
                self.letters[*letter].kind = LetterKind::Terminal {
                    id: fresh[index],
                    power: BigUint::one(),
                };
            }
            start = end;
        }
        blocks.len()
    }

    /// Collects every pair of adjacent letters into a graph.
    pub(crate) fn pair_graph(&mut self) -> PairGraph {
        let mut graph = PairGraph::new();
        for rule in 0..self.rules.len() {
            let mut current = self.rules[rule].head;
            while let Some(letter) = current {
                let Some(next) = self.letters[letter].next else {
                    break;
                };
                let first = self.boundary_id(letter, Side::Last);
                let second = self.boundary_id(next, Side::First);
                if first != second {
                    graph.add(first, second);
                }
                current = Some(next);
            }
        }
        graph
    }

    /// Pops the ends of letters so that every pair from `partition.left` to
    /// `partition.right` consists of two terminal letters of one rule, and
    /// returns those pairs.
    pub(crate) fn remove_crossing_pairs(&mut self, partition: &Partition) -> PairOccurrences {
        let mut occurrences = PairOccurrences::new();
        for rule in 0..self.rules.len() {
            let mut current = self.rules[rule].head;
            while let Some(letter) = current {
                let Some(next) = self.letters[letter].next else {
                    break;
                };
                let first = self.boundary_id(letter, Side::Last);
                let second = self.boundary_id(next, Side::First);
                if !partition.left.contains(&first) || !partition.right.contains(&second) {
                    current = Some(next);
                    continue;
                }

                let letter = self.pop(letter, Side::Last);
                let next = self.letters[letter]
                    .next
                    .expect("The second letter of a pair follows the first");
                let next = self.pop(next, Side::First);
                let letter = self.letters[next]
                    .prev
                    .expect("The first letter of a pair precedes the second");
                debug_assert!(self.is_terminal_of(letter, first));
                debug_assert!(self.is_terminal_of(next, second));

                occurrences.entry((first, second)).or_default().push(letter);
                current = Some(next);
            }
        }
        occurrences
    }

    /// Replaces the listed pairs by fresh terminals, one per distinct pair.
    pub(crate) fn compress_pairs(&mut self, occurrences: PairOccurrences) {
        for ((first, second), letters) in occurrences {
            let vertex = Vertex::concat(
                self.ids.vertex(first).clone(),
                self.ids.vertex(second).clone(),
            );
            let id = self.ids.get(vertex);
            for letter in letters {
                self.compress_pair(letter, id);
            }
        }
    }

    fn compress_pair(&mut self, letter: LetterKey, id: TerminalId) {
        let second = self.letters[letter]
            .next
            .expect("The second letter of a pair follows the first");
        self.delete_letter(second);
        self.letters[letter].kind = LetterKind::Terminal {
            id,
            power: BigUint::one(),
        };

        if let Some(prev) = self.letters[letter].prev {
            if self.is_terminal_of(prev, id) {
                self.delete_letter(letter);
                self.add_power(prev, &BigUint::one());
            }
        }
    }

    /// Deletes any letter still referring to an empty rule.
    pub(crate) fn empty_cleanup(&mut self) {
        for rule in 0..self.rules.len() {
            let mut current = self.rules[rule].head;
            while let Some(letter) = current {
                let empty = match self.letters[letter].kind {
                    LetterKind::Nonterminal(child) => self.rules[child].head.is_none(),
                    LetterKind::Terminal { .. } => false,
                };
                current = if empty {
                    self.remove_empty_letter(letter).1
                } else {
                    self.letters[letter].next
                };
            }
        }
    }

    /// Symbols of the expansion of `rule` as runs, for inspection in tests.
    #[cfg(test)]
    pub(crate) fn expand(&self, rule: RuleId) -> Vec<(TerminalId, u64)> {
        use num_traits::ToPrimitive;

        let mut runs = Vec::new();
        for letter in self.rule_letters(rule) {
            match &self.letters[letter].kind {
                LetterKind::Terminal { id, power } => {
                    runs.push((*id, power.to_u64().expect("Small test power")))
                }
                LetterKind::Nonterminal(child) => runs.extend(self.expand(*child)),
            }
        }
        runs
    }
}
