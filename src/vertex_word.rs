//! Sequential access to the symbols of a vertex.

use crate::inspector::{Inspector, InspectorTask, Preorder, TaskAcceptor};
use crate::vertex::{TerminalSymbol, Vertex};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use std::fmt;

/// Accepts only the tasks whose span ends after `position`.
struct SkipBefore {
    position: BigInt,
}

impl TaskAcceptor for SkipBefore {
    fn accept(&mut self, task: &InspectorTask) -> bool {
        &task.left_siblings_length + task.vertex.length() > self.position
    }
}

/// Lazy left-to-right iterator over the symbols of a vertex.
///
/// [`VertexWord::advance`] jumps forward by an arbitrary offset without
/// walking the skipped subtrees.
pub struct VertexWord {
    root: Vertex,
    inspector: Inspector<Preorder, SkipBefore>,
}

impl VertexWord {
    pub fn new(root: Vertex) -> Self {
        let inspector = Inspector::with_acceptor(
            root.clone(),
            SkipBefore {
                position: BigInt::zero(),
            },
        );
        Self { root, inspector }
    }

    /// Rewinds to the first symbol.
    pub fn restart(&mut self) {
        *self = Self::new(self.root.clone());
    }

    /// Index of the next symbol to be produced.
    pub fn position(&self) -> &BigInt {
        &self.inspector.acceptor().position
    }

    /// Skips the next `offset` symbols.
    pub fn advance(&mut self, offset: &BigInt) {
        assert!(!offset.is_negative(), "Cannot advance backwards");
        self.inspector.acceptor_mut().position += offset;
    }

    pub fn root(&self) -> &Vertex {
        &self.root
    }
}

impl Iterator for VertexWord {
    type Item = TerminalSymbol;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let task = self.inspector.current()?;
            let symbol = task.vertex.terminal_symbol();
            let offset = task.left_siblings_length.clone();

            match symbol {
                Some(symbol) if offset >= self.inspector.acceptor().position => {
                    self.inspector.acceptor_mut().position = offset + 1;
                    self.inspector.advance();
                    return Some(symbol);
                }
                // Nonterminals and symbols left behind by `advance`; the
                // acceptor prunes every subtree that ends before the position.
                _ => self.inspector.advance(),
            }
        }
    }
}

impl PartialEq for VertexWord {
    /// Compares the complete words, regardless of the iteration state.
    fn eq(&self, other: &Self) -> bool {
        self.root.length() == other.root.length()
            && VertexWord::new(self.root.clone()).eq(VertexWord::new(other.root.clone()))
    }
}

impl fmt::Debug for VertexWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexWord({})", self.root)
    }
}

/// Expands the whole word. Only meant for short words.
pub fn materialize(root: &Vertex) -> Vec<TerminalSymbol> {
    VertexWord::new(root.clone()).collect()
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, symbol) in VertexWord::new(self.clone()).enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}
