use crate::vertex::Vertex;

/// Identifier of a letter of the recompression alphabet.
pub(crate) type TerminalId = u32;

/// Hands out fresh terminal ids and remembers the vertex each id stands for.
///
/// One generator lives for the duration of a single recompression run, so
/// ids are dense and start from 0 every time.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    vertices: Vec<Vertex>,
}

impl IdGenerator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocates the next id for `vertex`.
    pub(crate) fn get(&mut self, vertex: Vertex) -> TerminalId {
        let id = TerminalId::try_from(self.vertices.len()).expect("Terminal ids exhausted");
        self.vertices.push(vertex);
        id
    }

    /// The vertex produced by `id`.
    pub(crate) fn vertex(&self, id: TerminalId) -> &Vertex {
        &self.vertices[id as usize]
    }

    /// Number of ids handed out so far.
    pub(crate) fn len(&self) -> usize {
        self.vertices.len()
    }
}
