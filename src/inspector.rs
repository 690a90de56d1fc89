//! Suspendable traversal of a vertex DAG.
//!
//! An [`Inspector`] walks the derivation tree of a vertex with an explicit
//! stack of scheduled tasks, stopping at every `Visit` task. The order is
//! chosen by an [`OrderPolicy`], and a [`TaskAcceptor`] may reject any task
//! before it becomes current, which prunes the whole subtree below it.

use crate::vertex::Vertex;
use num_bigint::BigInt;
use num_traits::Zero;
use std::marker::PhantomData;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    GoLeft,
    GoRight,
    Visit,
}

/// One pending step of a walk.
#[derive(Clone, Debug)]
pub struct InspectorTask {
    pub vertex: Vertex,
    pub command: Command,
    /// Offset of `vertex` inside the word of the root.
    pub left_siblings_length: BigInt,
}

impl InspectorTask {
    pub fn new(vertex: Vertex, command: Command, left_siblings_length: BigInt) -> Self {
        Self {
            vertex,
            command,
            left_siblings_length,
        }
    }

    fn right_child_task(&self, command: Command) -> Self {
        Self::new(
            self.vertex.right_child(),
            command,
            &self.left_siblings_length + self.vertex.split_point(),
        )
    }

    fn left_child_task(&self, command: Command) -> Self {
        Self::new(
            self.vertex.left_child(),
            command,
            self.left_siblings_length.clone(),
        )
    }

    fn with_command(&self, command: Command) -> Self {
        Self::new(
            self.vertex.clone(),
            command,
            self.left_siblings_length.clone(),
        )
    }
}

/// Decides how a task unfolds into further tasks.
pub trait OrderPolicy {
    fn initial_command() -> Command;

    /// Consumes `task`, pushing tasks to resume later onto `scheduled`, and
    /// returns the task to continue with immediately, if any.
    fn process(task: InspectorTask, scheduled: &mut Vec<InspectorTask>) -> Option<InspectorTask>;
}

/// Parent, then left subtree, then right subtree.
pub struct Preorder;

/// Left subtree, parent, right subtree.
pub struct Inorder;

/// Left subtree, right subtree, parent.
pub struct Postorder;

impl OrderPolicy for Preorder {
    fn initial_command() -> Command {
        Command::Visit
    }

    fn process(task: InspectorTask, scheduled: &mut Vec<InspectorTask>) -> Option<InspectorTask> {
        if !task.vertex.is_nonterminal() {
            return None;
        }
        scheduled.push(task.right_child_task(Command::Visit));
        Some(task.left_child_task(Command::Visit))
    }
}

impl OrderPolicy for Inorder {
    fn initial_command() -> Command {
        Command::GoLeft
    }

    fn process(task: InspectorTask, scheduled: &mut Vec<InspectorTask>) -> Option<InspectorTask> {
        match (task.command, task.vertex.is_nonterminal()) {
            (Command::GoLeft, true) => {
                scheduled.push(task.with_command(Command::Visit));
                Some(task.left_child_task(Command::GoLeft))
            }
            (Command::GoLeft, false) => Some(task.with_command(Command::Visit)),
            (Command::Visit, true) => Some(task.right_child_task(Command::GoLeft)),
            (Command::Visit, false) => None,
            (Command::GoRight, _) => unreachable!("Inorder never schedules GoRight"),
        }
    }
}

impl OrderPolicy for Postorder {
    fn initial_command() -> Command {
        Command::GoLeft
    }

    fn process(task: InspectorTask, scheduled: &mut Vec<InspectorTask>) -> Option<InspectorTask> {
        match (task.command, task.vertex.is_nonterminal()) {
            (Command::GoLeft, true) => {
                scheduled.push(task.with_command(Command::GoRight));
                Some(task.left_child_task(Command::GoLeft))
            }
            (Command::GoLeft, false) => Some(task.with_command(Command::Visit)),
            (Command::GoRight, _) => {
                scheduled.push(task.with_command(Command::Visit));
                Some(task.right_child_task(Command::GoLeft))
            }
            (Command::Visit, _) => None,
        }
    }
}

/// Admission predicate for tasks.
///
/// Called whenever a task is about to become current. Rejected tasks are
/// dropped together with everything they would have scheduled.
pub trait TaskAcceptor {
    fn accept(&mut self, task: &InspectorTask) -> bool;
}

impl<F: FnMut(&InspectorTask) -> bool> TaskAcceptor for F {
    fn accept(&mut self, task: &InspectorTask) -> bool {
        self(task)
    }
}

/// Accepts every task.
#[derive(Copy, Clone, Debug, Default)]
pub struct AcceptAll;

impl TaskAcceptor for AcceptAll {
    fn accept(&mut self, _task: &InspectorTask) -> bool {
        true
    }
}

/// Cooperative tree walker stopping at every visited vertex.
///
/// ```
/// use slp_rs::{Inorder, Inspector, Vertex};
///
/// let ab = Vertex::concat(Vertex::terminal(1), Vertex::terminal(2));
/// let mut inspector = Inspector::<Inorder>::new(ab.clone());
/// let mut visited = Vec::new();
/// while !inspector.stopped() {
///     visited.push(inspector.vertex().clone());
///     inspector.advance();
/// }
/// assert_eq!(visited, vec![Vertex::terminal(1), ab, Vertex::terminal(2)]);
/// ```
pub struct Inspector<P: OrderPolicy, A: TaskAcceptor = AcceptAll> {
    current: Option<InspectorTask>,
    scheduled: Vec<InspectorTask>,
    acceptor: A,
    _policy: PhantomData<P>,
}

pub type PreorderInspector = Inspector<Preorder>;
pub type InorderInspector = Inspector<Inorder>;
pub type PostorderInspector = Inspector<Postorder>;

impl<P: OrderPolicy> Inspector<P, AcceptAll> {
    pub fn new(root: Vertex) -> Self {
        Self::with_acceptor(root, AcceptAll)
    }
}

impl<P: OrderPolicy, A: TaskAcceptor> Inspector<P, A> {
    /// Starts a walk over `root` and moves to the first visited vertex.
    pub fn with_acceptor(root: Vertex, acceptor: A) -> Self {
        let mut inspector = Self {
            current: None,
            scheduled: Vec::new(),
            acceptor,
            _policy: PhantomData,
        };

        if !root.is_null() {
            inspector.current = Some(InspectorTask::new(
                root,
                P::initial_command(),
                BigInt::zero(),
            ));
            inspector.admit();
            inspector.run_to_visit();
        }

        inspector
    }

    /// True once no task remains.
    pub fn stopped(&self) -> bool {
        self.current.is_none()
    }

    /// The task of the currently visited vertex.
    pub fn current(&self) -> Option<&InspectorTask> {
        self.current.as_ref()
    }

    /// The currently visited vertex. Panics if the walk is over.
    pub fn vertex(&self) -> &Vertex {
        &self.current.as_ref().expect("Inspector is stopped").vertex
    }

    /// Offset of the currently visited vertex. Panics if the walk is over.
    pub fn left_siblings_length(&self) -> &BigInt {
        &self
            .current
            .as_ref()
            .expect("Inspector is stopped")
            .left_siblings_length
    }

    /// Moves to the next visited vertex.
    pub fn advance(&mut self) {
        if self.current.is_some() {
            self.step();
            self.run_to_visit();
        }
    }

    /// Drops the current vertex and everything it would schedule, resuming
    /// from the next scheduled task.
    pub fn skip_subtree(&mut self) {
        self.current = self.scheduled.pop();
        self.admit();
        self.run_to_visit();
    }

    pub fn acceptor(&self) -> &A {
        &self.acceptor
    }

    pub fn acceptor_mut(&mut self) -> &mut A {
        &mut self.acceptor
    }

    pub fn into_acceptor(self) -> A {
        self.acceptor
    }

    fn step(&mut self) {
        if let Some(task) = self.current.take() {
            self.current = P::process(task, &mut self.scheduled);
            if self.current.is_none() {
                self.current = self.scheduled.pop();
            }
            self.admit();
        }
    }

    fn admit(&mut self) {
        while let Some(task) = &self.current {
            if self.acceptor.accept(task) {
                return;
            }
            self.current = self.scheduled.pop();
        }
    }

    fn run_to_visit(&mut self) {
        while matches!(&self.current, Some(task) if task.command != Command::Visit) {
            self.step();
        }
    }
}
