use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Neg;
use std::rc::Rc;

/// A signed alphabet symbol.
///
/// Negative values denote the formal inverse of the corresponding positive
/// symbol, so `-a` cancels against `a` under free reduction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalSymbol(i32);

impl TerminalSymbol {
    /// Creates a symbol. Panics on zero, which is reserved for "no symbol".
    pub fn new(value: i32) -> Self {
        assert!(value != 0, "Terminal symbol must be nonzero");
        assert!(value != i32::MIN, "Terminal symbol must have an inverse");
        Self(value)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    pub fn inverse(self) -> Self {
        Self(-self.0)
    }

    pub fn is_inverse_of(self, other: TerminalSymbol) -> bool {
        self.0 == -other.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// The positive representative of `{self, self⁻¹}`.
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

impl Neg for TerminalSymbol {
    type Output = TerminalSymbol;

    fn neg(self) -> Self::Output {
        self.inverse()
    }
}

impl From<i32> for TerminalSymbol {
    fn from(value: i32) -> Self {
        TerminalSymbol::new(value)
    }
}

impl fmt::Display for TerminalSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared body of a nonterminal. Never mutated after construction.
struct NonterminalNode {
    left: Vertex,
    right: Vertex,
    length: BigInt,
    height: u32,
}

/// Handle to a shared nonterminal node together with its reading direction.
///
/// The sign bit lives in the handle, not in the node, so negating never
/// allocates and both orientations share every descendant.
#[derive(Clone)]
pub struct NonterminalVertex {
    node: Rc<NonterminalNode>,
    negated: bool,
}

/// A fragment of a (potentially exponentially long) word, stored as a vertex
/// of a straight-line program.
///
/// Cloning is cheap: nonterminals are reference counted. Equality is identity
/// (same node and same orientation), except for terminals which compare by
/// symbol.
#[derive(Clone, Default)]
pub enum Vertex {
    /// The empty word.
    #[default]
    Null,
    Terminal(TerminalSymbol),
    Nonterminal(NonterminalVertex),
}

impl Vertex {
    /// Creates a single-symbol fragment.
    pub fn terminal(symbol: impl Into<TerminalSymbol>) -> Self {
        Vertex::Terminal(symbol.into())
    }

    /// Concatenates two fragments.
    ///
    /// If either side is `Null` the other one is returned unchanged, so no
    /// trivial wrapper is ever allocated.
    pub fn concat(left: Vertex, right: Vertex) -> Self {
        if left.is_null() {
            return right;
        }
        if right.is_null() {
            return left;
        }

        let length = left.length() + right.length();
        let height = 1 + left.height().max(right.height());

        Vertex::Nonterminal(NonterminalVertex {
            node: Rc::new(NonterminalNode {
                left,
                right,
                length,
                height,
            }),
            negated: false,
        })
    }

    /// Returns the fragment for the inverted word (reversed, every symbol inverted).
    pub fn negate(&self) -> Vertex {
        match self {
            Vertex::Null => Vertex::Null,
            Vertex::Terminal(symbol) => Vertex::Terminal(symbol.inverse()),
            Vertex::Nonterminal(nonterminal) => Vertex::Nonterminal(NonterminalVertex {
                node: Rc::clone(&nonterminal.node),
                negated: !nonterminal.negated,
            }),
        }
    }

    /// The effective left child, `Null` for terminals and the empty fragment.
    pub fn left_child(&self) -> Vertex {
        match self {
            Vertex::Nonterminal(NonterminalVertex { node, negated: false }) => node.left.clone(),
            Vertex::Nonterminal(NonterminalVertex { node, negated: true }) => node.right.negate(),
            _ => Vertex::Null,
        }
    }

    /// The effective right child, `Null` for terminals and the empty fragment.
    pub fn right_child(&self) -> Vertex {
        match self {
            Vertex::Nonterminal(NonterminalVertex { node, negated: false }) => node.right.clone(),
            Vertex::Nonterminal(NonterminalVertex { node, negated: true }) => node.left.negate(),
            _ => Vertex::Null,
        }
    }

    pub fn length(&self) -> BigInt {
        match self {
            Vertex::Null => BigInt::zero(),
            Vertex::Terminal(_) => BigInt::one(),
            Vertex::Nonterminal(nonterminal) => nonterminal.node.length.clone(),
        }
    }

    /// Height of the derivation tree: 0 for `Null`, 1 for terminals.
    pub fn height(&self) -> u32 {
        match self {
            Vertex::Null => 0,
            Vertex::Terminal(_) => 1,
            Vertex::Nonterminal(nonterminal) => nonterminal.node.height,
        }
    }

    /// Length of the effective left child.
    pub fn split_point(&self) -> BigInt {
        match self {
            Vertex::Nonterminal(NonterminalVertex { node, negated: false }) => node.left.length(),
            Vertex::Nonterminal(NonterminalVertex { node, negated: true }) => node.right.length(),
            _ => BigInt::zero(),
        }
    }

    /// Returns the symbol at `index`, descending by the split points.
    ///
    /// Panics if `index` is outside `[0, length)`.
    pub fn symbol_at(&self, index: &BigInt) -> TerminalSymbol {
        assert!(
            !index.is_negative() && *index < self.length(),
            "Index {index} is out of range"
        );

        let mut current = self.clone();
        let mut index = index.clone();
        loop {
            match current {
                Vertex::Terminal(symbol) => return symbol,
                Vertex::Nonterminal(_) => {
                    let split = current.split_point();
                    if index < split {
                        current = current.left_child();
                    } else {
                        index -= split;
                        current = current.right_child();
                    }
                }
                Vertex::Null => unreachable!("Nonterminals never have empty children"),
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Vertex::Null)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Vertex::Terminal(_))
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Vertex::Nonterminal(_))
    }

    pub fn terminal_symbol(&self) -> Option<TerminalSymbol> {
        match self {
            Vertex::Terminal(symbol) => Some(*symbol),
            _ => None,
        }
    }

    /// Whether this handle reads its node in the inverted direction.
    ///
    /// For terminals this is the sign of the symbol.
    pub fn is_negative(&self) -> bool {
        match self {
            Vertex::Null => false,
            Vertex::Terminal(symbol) => symbol.is_negative(),
            Vertex::Nonterminal(nonterminal) => nonterminal.negated,
        }
    }

    /// The positive orientation of this vertex.
    pub fn abs(&self) -> Vertex {
        if self.is_negative() {
            self.negate()
        } else {
            self.clone()
        }
    }
}

impl From<TerminalSymbol> for Vertex {
    fn from(symbol: TerminalSymbol) -> Self {
        Vertex::Terminal(symbol)
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Vertex::Null, Vertex::Null) => true,
            (Vertex::Terminal(a), Vertex::Terminal(b)) => a == b,
            (Vertex::Nonterminal(a), Vertex::Nonterminal(b)) => {
                Rc::ptr_eq(&a.node, &b.node) && a.negated == b.negated
            }
            _ => false,
        }
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Vertex::Null => state.write_u8(0),
            Vertex::Terminal(symbol) => {
                state.write_u8(1);
                symbol.hash(state);
            }
            Vertex::Nonterminal(nonterminal) => {
                state.write_u8(2);
                state.write_usize(Rc::as_ptr(&nonterminal.node) as usize);
                nonterminal.negated.hash(state);
            }
        }
    }
}

impl fmt::Debug for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vertex::Null => write!(f, "Null"),
            Vertex::Terminal(symbol) => write!(f, "Terminal({symbol})"),
            Vertex::Nonterminal(nonterminal) => write!(
                f,
                "Nonterminal({}{:p}, length {}, height {})",
                if nonterminal.negated { "-" } else { "" },
                Rc::as_ptr(&nonterminal.node),
                nonterminal.node.length,
                nonterminal.node.height
            ),
        }
    }
}
