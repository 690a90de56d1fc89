//! # SLP - Compressed Strings over Free Groups
//!
//! Straight-line programs (SLPs) represent words over an alphabet of signed
//! terminal symbols as DAGs of binary concatenations. A word of length 2^n
//! fits in n vertices, and every operation here works directly on the DAG
//! without expanding it.
//!
//! - Pattern matching: find all occurrences of one compressed word in another
//! - Equality and longest common prefix of compressed words
//! - Free reduction: cancel every `x x⁻¹` pair
//! - Normal form by recompression: equal words get identical DAG shapes
//! - A plain-text format to save and load DAGs
//!
//! ## Example
//!
//! ```
//! use slp_rs::{materialize, reduce, Vertex};
//!
//! let a = Vertex::terminal(1);
//! let b = Vertex::terminal(2);
//! let ab = Vertex::concat(a.clone(), b.clone());
//!
//! // ab · (ab)⁻¹ · a reduces to a
//! let word = Vertex::concat(Vertex::concat(ab.clone(), ab.negate()), a.clone());
//! let reduced = reduce(&word);
//! assert_eq!(materialize(&reduced), vec![1.into()]);
//! ```
//!
//! ## Performance
//!
//! - Lengths are arbitrary precision, so exponentially long words are fine
//! - Matching tables and reduction images are memoized per vertex pair
//! - Traversals use explicit stacks and never recurse on the DAG

mod arithmetic_sequence;
mod common_prefix;
mod id_gen;
mod inspector;
mod mapper;
mod pattern_matching;
mod persistence;
mod recompression;
mod reduce;
mod vertex;
mod vertex_hash;
mod vertex_word;

#[cfg(test)]
mod tests;

pub use arithmetic_sequence::FiniteArithmeticSequence;
pub use common_prefix::{longest_common_prefix, strings_equal};
pub use inspector::{
    AcceptAll, Command, Inorder, InorderInspector, Inspector, InspectorTask, OrderPolicy,
    Postorder, PostorderInspector, Preorder, PreorderInspector, TaskAcceptor,
};
pub use mapper::{map_vertices, SkipMapped, SkipVisited};
pub use pattern_matching::{MatchingTable, PatternMatchesGenerator};
pub use persistence::{load, save, LoadError};
pub use recompression::normal_form;
pub use reduce::{get_cancellation_length, get_sub_slp, reduce, Reducer};
pub use vertex::{NonterminalVertex, TerminalSymbol, Vertex};
pub use vertex_hash::{
    hashed_common_prefix, subvertex_hash, vertex_hash, ImageLengthHash, PermutationHash,
    PowerCountHash, SinglePowerHash, VertexHasher,
};
pub use vertex_word::{materialize, VertexWord};
