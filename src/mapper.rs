//! Memoized bottom-up rebuilding of a DAG.

use crate::inspector::{Inspector, InspectorTask, Postorder, TaskAcceptor};
use crate::vertex::Vertex;
use ahash::{AHashMap, AHashSet};

/// Rejects tasks for vertices that already have an image.
pub struct SkipMapped<'a, T> {
    pub images: &'a mut AHashMap<Vertex, T>,
}

impl<T> TaskAcceptor for SkipMapped<'_, T> {
    fn accept(&mut self, task: &InspectorTask) -> bool {
        !self.images.contains_key(&task.vertex)
    }
}

/// Rejects tasks for vertices that were already visited once.
#[derive(Default)]
pub struct SkipVisited {
    pub visited: AHashSet<Vertex>,
}

impl TaskAcceptor for SkipVisited {
    fn accept(&mut self, task: &InspectorTask) -> bool {
        !self.visited.contains(&task.vertex)
    }
}

/// Computes an image for every vertex reachable from `root`, children first.
///
/// `image_of` sees the images computed so far (both children of a nonterminal
/// are always present) and may insert extra entries, e.g. for the negated
/// vertex; such vertices are then skipped. Vertices already present in
/// `images` are not revisited, so a map can be reused across calls.
pub fn map_vertices<T, F>(root: &Vertex, images: &mut AHashMap<Vertex, T>, mut image_of: F)
where
    F: FnMut(&Vertex, &mut AHashMap<Vertex, T>) -> T,
{
    let mut inspector =
        Inspector::<Postorder, _>::with_acceptor(root.clone(), SkipMapped { images });

    while !inspector.stopped() {
        let vertex = inspector.vertex().clone();
        let images = &mut *inspector.acceptor_mut().images;
        let image = image_of(&vertex, images);
        images.insert(vertex, image);
        inspector.advance();
    }
}
