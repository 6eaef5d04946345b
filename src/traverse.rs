use smallvec::SmallVec;

use crate::tree::{NodeId, Tree};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Depth-first visit order for [`Tree::traverse`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraverseOrder {
    /// Parents before their children. Same order as [`Tree::render`].
    Pre,
    /// Children always before their parent.
    Post,
}

#[derive(Clone, Copy)]
struct Frame {
    node: NodeId,
    // Whether this node's children are walked at all (collapsed suppression).
    descend: bool,
    // Post-order only: the node was already pushed back behind its children.
    expanded: bool,
}

/// Lazy depth-first walk over a subtree.
///
/// Returned by [`Tree::traverse`]. Each call produces an independent
/// iterator with its own explicit stack, so walks are restartable and can be
/// abandoned at any point without cleanup. No node is yielded twice.
pub struct Traverse<'a, T> {
    tree: &'a Tree<T>,
    order: TraverseOrder,
    render_collapsed: bool,
    stack: SmallVec<[Frame; 16]>,
}

impl<T> Tree<T> {
    /// Walks the subtree rooted at `node` depth-first in the given order.
    ///
    /// With `render_collapsed == false` the walk does not descend into
    /// collapsed nodes: such a node is still yielded itself, only its
    /// descendants are suppressed. The start node's own collapsed flag has
    /// no effect; suppression applies when a collapsed node is reached as a
    /// child.
    pub fn traverse(
        &self,
        node: NodeId,
        order: TraverseOrder,
        render_collapsed: bool,
    ) -> Traverse<'_, T> {
        let _ = self.node(node);
        let mut stack = SmallVec::new();
        stack.push(Frame {
            node,
            descend: true,
            expanded: false,
        });
        Traverse {
            tree: self,
            order,
            render_collapsed,
            stack,
        }
    }
}

impl<T> Traverse<'_, T> {
    fn push_children(&mut self, node: NodeId) {
        // Reversed so the first child is popped first.
        for &child in self.tree.children(node).iter().rev() {
            let descend = self.render_collapsed || !self.tree.collapsed(child);
            self.stack.push(Frame {
                node: child,
                descend,
                expanded: false,
            });
        }
    }
}

impl<T> Iterator for Traverse<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(frame) = self.stack.pop() {
            match self.order {
                TraverseOrder::Pre => {
                    if frame.descend {
                        self.push_children(frame.node);
                    }
                    return Some(frame.node);
                }
                TraverseOrder::Post => {
                    if frame.expanded || !frame.descend {
                        return Some(frame.node);
                    }
                    // Revisit this node once its children are done.
                    self.stack.push(Frame {
                        expanded: true,
                        ..frame
                    });
                    self.push_children(frame.node);
                }
            }
        }
        None
    }
}
