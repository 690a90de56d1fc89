//! Plain-text checkpoints of vertex DAGs.
//!
//! ```text
//! roots terminals nonterminals
//! index symbol                  (one line per terminal)
//! index left right              (one line per nonterminal, children first)
//! name index                    (one line per root)
//! ```
//!
//! Indices are positive and name the positive orientation of a vertex; a
//! negative index refers to the negated vertex. A root index of 0 stands for
//! the empty word. Every vertex is written once, so shared subtrees are
//! shared again after loading.

use crate::mapper::map_vertices;
use crate::vertex::{TerminalSymbol, Vertex};
use ahash::AHashMap;
use log::debug;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read the checkpoint: {0}")]
    Io(#[from] io::Error),

    /// The first line is absent or is not three counts.
    #[error("The checkpoint does not start with a `roots terminals nonterminals` header")]
    MissingHeader,

    #[error("Line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// A nonterminal or root refers to an index not defined above it.
    #[error("Line {line}: index {index} is not defined")]
    UnknownIndex { line: usize, index: i64 },

    #[error("Line {line}: terminal symbols must be nonzero")]
    ZeroSymbol { line: usize },
}

/// Writes `roots` and every vertex reachable from them to `out`.
///
/// Root names must be non-empty and free of whitespace.
pub fn save<W: Write>(out: &mut W, roots: &[(String, Vertex)]) -> io::Result<()> {
    let mut terminals: Vec<(i64, TerminalSymbol)> = Vec::new();
    let mut nonterminals: Vec<(i64, i64, i64)> = Vec::new();
    let mut indices: AHashMap<Vertex, i64> = AHashMap::new();
    let mut last_index = 0i64;

    for (name, root) in roots {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Root name {name:?} must be a single non-empty word"),
            ));
        }

        map_vertices(root, &mut indices, |vertex, indices| {
            last_index += 1;
            let positive = vertex.abs();
            match &positive {
                Vertex::Terminal(symbol) => terminals.push((last_index, *symbol)),
                Vertex::Nonterminal(_) => nonterminals.push((
                    last_index,
                    indices[&positive.left_child()],
                    indices[&positive.right_child()],
                )),
                Vertex::Null => unreachable!("Null is never part of a DAG"),
            }

            let index = if vertex.is_negative() { -last_index } else { last_index };
            indices.insert(vertex.negate(), -index);
            index
        });
    }

    writeln!(out, "{} {} {}", roots.len(), terminals.len(), nonterminals.len())?;
    for (index, symbol) in &terminals {
        writeln!(out, "{index} {symbol}")?;
    }
    for (index, left, right) in &nonterminals {
        writeln!(out, "{index} {left} {right}")?;
    }
    for (name, root) in roots {
        let index = if root.is_null() { 0 } else { indices[root] };
        writeln!(out, "{name} {index}")?;
    }
    Ok(())
}

/// Reads roots written by [`save`].
pub fn load<R: BufRead>(input: R) -> Result<Vec<(String, Vertex)>, LoadError> {
    let mut records = Records {
        lines: input.lines(),
        line: 0,
    };

    let (line, header) = records.next()?.ok_or(LoadError::MissingHeader)?;
    let [roots, terminals, nonterminals] =
        fields::<3>(line, &header).map_err(|_| LoadError::MissingHeader)?;
    let roots: usize = roots.parse().map_err(|_| LoadError::MissingHeader)?;
    let terminals: usize = terminals.parse().map_err(|_| LoadError::MissingHeader)?;
    let nonterminals: usize = nonterminals.parse().map_err(|_| LoadError::MissingHeader)?;

    let mut vertices: AHashMap<i64, Vertex> = AHashMap::new();

    for _ in 0..terminals {
        let (line, text) = records.next_required("a terminal")?;
        let [index, symbol] = fields::<2>(line, &text)?;
        let index = new_index(line, index, &vertices)?;
        let symbol: i32 = number(line, symbol)?;
        if symbol == 0 {
            return Err(LoadError::ZeroSymbol { line });
        }
        if symbol == i32::MIN {
            return Err(LoadError::Malformed {
                line,
                reason: format!("symbol {symbol} has no inverse"),
            });
        }
        vertices.insert(index, Vertex::terminal(symbol));
    }

    for _ in 0..nonterminals {
        let (line, text) = records.next_required("a nonterminal")?;
        let [index, left, right] = fields::<3>(line, &text)?;
        let index = new_index(line, index, &vertices)?;
        let left = lookup(line, number(line, left)?, &vertices)?;
        let right = lookup(line, number(line, right)?, &vertices)?;
        vertices.insert(index, Vertex::concat(left, right));
    }

    let mut loaded = Vec::new();
    for _ in 0..roots {
        let (line, text) = records.next_required("a root")?;
        let [name, index] = fields::<2>(line, &text)?;
        let index: i64 = number(line, index)?;
        let root = if index == 0 {
            Vertex::Null
        } else {
            lookup(line, index, &vertices)?
        };
        loaded.push((name.to_string(), root));
    }

    if let Some((line, _)) = records.next()? {
        return Err(LoadError::Malformed {
            line,
            reason: "unexpected data after the last root".to_string(),
        });
    }

    debug!("Loaded {terminals} terminals, {nonterminals} nonterminals and {roots} roots");
    Ok(loaded)
}

/// Non-blank lines with their 1-based line numbers.
struct Records<R> {
    lines: io::Lines<R>,
    line: usize,
}

impl<R: BufRead> Records<R> {
    fn next(&mut self) -> Result<Option<(usize, String)>, LoadError> {
        for text in self.lines.by_ref() {
            self.line += 1;
            let text = text?;
            if !text.trim().is_empty() {
                return Ok(Some((self.line, text)));
            }
        }
        Ok(None)
    }

    fn next_required(&mut self, what: &str) -> Result<(usize, String), LoadError> {
        match self.next()? {
            Some(record) => Ok(record),
            None => Err(LoadError::Malformed {
                line: self.line + 1,
                reason: format!("expected {what}, found the end of the input"),
            }),
        }
    }
}

fn fields<const N: usize>(line: usize, text: &str) -> Result<[&str; N], LoadError> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    parts.try_into().map_err(|parts: Vec<&str>| LoadError::Malformed {
        line,
        reason: format!("expected {N} fields, found {}", parts.len()),
    })
}

fn number<T: FromStr>(line: usize, field: &str) -> Result<T, LoadError> {
    field.parse().map_err(|_| LoadError::Malformed {
        line,
        reason: format!("`{field}` is not a valid number"),
    })
}

fn new_index(line: usize, field: &str, vertices: &AHashMap<i64, Vertex>) -> Result<i64, LoadError> {
    let index: i64 = number(line, field)?;
    if index <= 0 {
        return Err(LoadError::Malformed {
            line,
            reason: format!("index {index} must be positive"),
        });
    }
    if vertices.contains_key(&index) {
        return Err(LoadError::Malformed {
            line,
            reason: format!("index {index} is defined twice"),
        });
    }
    Ok(index)
}

fn lookup(line: usize, index: i64, vertices: &AHashMap<i64, Vertex>) -> Result<Vertex, LoadError> {
    let unknown = || LoadError::UnknownIndex { line, index };
    let vertex = vertices.get(&index.checked_abs().ok_or_else(unknown)?).ok_or_else(unknown)?;
    Ok(if index < 0 { vertex.negate() } else { vertex.clone() })
}
