//! Lazy breadth-first and depth-first iterators over any [`GraphView`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

use crate::types::{DagError, DagResult};

use super::view::GraphView;

/// Options for [`BreadthFirst`].
#[derive(Debug, Clone)]
pub struct BreadthFirstOptions<N> {
    /// Maximum distance from the root. `None` = unbounded.
    pub depth: Option<usize>,
    /// Nodes that are never yielded nor expanded.
    pub ignore: HashSet<N>,
}

impl<N> Default for BreadthFirstOptions<N> {
    fn default() -> Self {
        Self {
            depth: None,
            ignore: HashSet::new(),
        }
    }
}

/// Breadth-first walk from a root, yielding `(node, distance)`.
///
/// The reported distance is the shortest path length from the root. Depth is
/// tracked with frontier boundaries rather than per-entry bookkeeping.
pub struct BreadthFirst<'g, N, G: ?Sized> {
    graph: &'g G,
    queue: VecDeque<N>,
    visited: HashSet<N>,
    options: BreadthFirstOptions<N>,
    depth: usize,
    /// Nodes of the current frontier still queued.
    frontier_left: usize,
    /// Nodes queued so far for the next frontier.
    next_frontier: usize,
}

impl<'g, N, G> BreadthFirst<'g, N, G>
where
    N: Clone + Eq + Hash,
    G: GraphView<N> + ?Sized,
{
    /// Start a walk at `root`. An ignored root yields nothing.
    pub fn new(graph: &'g G, root: N, options: BreadthFirstOptions<N>) -> Self {
        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        if !options.ignore.contains(&root) {
            visited.insert(root.clone());
            queue.push_back(root);
        }
        let frontier_left = queue.len();
        Self {
            graph,
            queue,
            visited,
            options,
            depth: 0,
            frontier_left,
            next_frontier: 0,
        }
    }
}

impl<'g, N, G> Iterator for BreadthFirst<'g, N, G>
where
    N: Clone + Eq + Hash,
    G: GraphView<N> + ?Sized,
{
    type Item = (N, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.frontier_left == 0 {
            if self.next_frontier == 0 {
                return None;
            }
            self.depth += 1;
            self.frontier_left = self.next_frontier;
            self.next_frontier = 0;
        }
        let node = self.queue.pop_front()?;
        self.frontier_left -= 1;

        let expand = self.options.depth.map_or(true, |max| self.depth < max);
        if expand {
            for child in self.graph.children_of(&node) {
                if self.options.ignore.contains(&child) || self.visited.contains(&child) {
                    continue;
                }
                self.visited.insert(child.clone());
                self.queue.push_back(child);
                self.next_frontier += 1;
            }
        }
        Some((node, self.depth))
    }
}

/// When a depth-first walk yields a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectOn {
    /// On first entry (preorder).
    Enter,
    /// After all descendants are finished (postorder).
    Leave,
    /// Both on entry and on leave.
    All,
}

impl InjectOn {
    fn on_enter(self) -> bool {
        matches!(self, InjectOn::Enter | InjectOn::All)
    }

    fn on_leave(self) -> bool {
        matches!(self, InjectOn::Leave | InjectOn::All)
    }
}

/// Options for [`DepthFirst`].
#[derive(Debug, Clone)]
pub struct DepthFirstOptions<N> {
    /// Maximum depth to expand. Boundary nodes are still yielded.
    pub depth: Option<usize>,
    /// Nodes that are never yielded nor expanded.
    pub ignore: HashSet<N>,
    /// Which events are yielded.
    pub inject_on: InjectOn,
}

impl<N> Default for DepthFirstOptions<N> {
    fn default() -> Self {
        Self {
            depth: None,
            ignore: HashSet::new(),
            inject_on: InjectOn::Enter,
        }
    }
}

/// One yielded depth-first event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfsStep {
    /// Depth of the node within its tree.
    pub depth: usize,
    /// `Enter` or `Leave`. Never `All`.
    pub inject_on: InjectOn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// On the current path.
    Gray,
    /// Finished.
    Black,
}

struct Frame<N> {
    node: N,
    children: std::vec::IntoIter<N>,
}

/// Depth-first walk with tri-colour cycle detection.
///
/// Meeting a node that is still on the current path yields a single
/// [`DagError::CycleProhibited`], after which the iterator is exhausted.
pub struct DepthFirst<'g, N, G: ?Sized> {
    graph: &'g G,
    roots: VecDeque<N>,
    stack: Vec<Frame<N>>,
    colors: HashMap<N, Color>,
    options: DepthFirstOptions<N>,
    failed: bool,
}

impl<'g, N, G> DepthFirst<'g, N, G>
where
    N: Clone + Eq + Hash,
    G: GraphView<N> + ?Sized,
{
    /// Walk from a single root.
    pub fn new(graph: &'g G, root: N, options: DepthFirstOptions<N>) -> Self {
        Self::forest(graph, vec![root], options)
    }

    /// Walk from each root in turn. Nodes finished under an earlier root are
    /// not visited again.
    pub fn forest(graph: &'g G, roots: Vec<N>, options: DepthFirstOptions<N>) -> Self {
        Self {
            graph,
            roots: roots.into(),
            stack: Vec::new(),
            colors: HashMap::new(),
            options,
            failed: false,
        }
    }

    fn push(&mut self, node: N) {
        self.colors.insert(node.clone(), Color::Gray);
        let children = self.graph.children_of(&node).into_iter();
        self.stack.push(Frame { node, children });
    }

    fn step(depth: usize, inject_on: InjectOn) -> DfsStep {
        DfsStep { depth, inject_on }
    }
}

impl<'g, N, G> Iterator for DepthFirst<'g, N, G>
where
    N: Clone + Eq + Hash,
    G: GraphView<N> + ?Sized,
{
    type Item = DagResult<(N, DfsStep)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }

            let Some(frame) = self.stack.last_mut() else {
                let root = loop {
                    let candidate = self.roots.pop_front()?;
                    if !self.options.ignore.contains(&candidate)
                        && !self.colors.contains_key(&candidate)
                    {
                        break candidate;
                    }
                };
                self.push(root.clone());
                if self.options.inject_on.on_enter() {
                    return Some(Ok((root, Self::step(0, InjectOn::Enter))));
                }
                continue;
            };

            match frame.children.next() {
                Some(child) => {
                    if self.options.ignore.contains(&child) {
                        continue;
                    }
                    match self.colors.get(&child) {
                        Some(Color::Gray) => {
                            self.failed = true;
                            return Some(Err(DagError::CycleProhibited(
                                "depth-first walk re-entered a node on its own path".to_string(),
                            )));
                        }
                        Some(Color::Black) => continue,
                        None => {}
                    }
                    if self.options.depth.is_some_and(|max| self.stack.len() > max) {
                        continue;
                    }
                    self.push(child.clone());
                    if self.options.inject_on.on_enter() {
                        let depth = self.stack.len() - 1;
                        return Some(Ok((child, Self::step(depth, InjectOn::Enter))));
                    }
                }
                None => {
                    let Some(done) = self.stack.pop() else {
                        continue;
                    };
                    self.colors.insert(done.node.clone(), Color::Black);
                    if self.options.inject_on.on_leave() {
                        let depth = self.stack.len();
                        return Some(Ok((done.node, Self::step(depth, InjectOn::Leave))));
                    }
                }
            }
        }
    }
}
