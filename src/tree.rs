use std::fmt;

use rustc_hash::{FxBuildHasher, FxHashSet};
use smallvec::SmallVec;

use crate::error::TreeError;
use crate::glyphs::TreeGlyphs;
use crate::render::RenderLine;
use crate::traverse::TraverseOrder;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Separator used by [`Tree::display_path`].
pub(crate) const PATH_SEP: char = '/';

pub(crate) type ChildList = SmallVec<[NodeId; 4]>;

/// Handle to a node in a [`Tree`].
///
/// Handles are stable for the lifetime of the node. Slots of removed nodes
/// are recycled, so a handle also carries a generation; using a handle after
/// its node was removed (or with a different tree) is a caller bug and
/// panics rather than silently addressing an unrelated node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Returns the slot index of this handle.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: ChildList,
    pub(crate) collapsed: bool,
    pub(crate) dirty: bool,
    pub(crate) render_cache: Vec<RenderLine>,
}

/// Ordered tree of payload-carrying nodes, addressed by [`NodeId`] handles.
///
/// The tree is the sole owner of every node; parent links are plain indices,
/// so dropping the tree drops all nodes in one go and no reference cycles
/// can form. Sibling order is significant: children render and traverse in
/// insertion order.
///
/// Parent and children links are kept bidirectionally consistent by every
/// mutation: `tree.parent(c) == Some(p)` holds exactly when `c` appears in
/// `tree.children(p)`.
///
/// ## Example
///
/// ```rust
/// use tabtree::Tree;
///
/// let mut tree = Tree::new();
/// let root = tree.insert("foo");
/// let child = tree.insert_under("bar", root);
/// tree.insert_under("baz", root);
///
/// assert_eq!(tree.path(child), vec![root, child]);
/// assert_eq!(tree.display_path(child).to_string(), "foo/bar");
/// ```
#[derive(Clone, Debug)]
pub struct Tree<T> {
    // Slot storage: `None` marks a freed slot awaiting reuse.
    slots: Vec<Option<Node<T>>>,
    // Current generation per slot; bumped when the slot is freed.
    generations: Vec<u32>,
    free_list: Vec<usize>,
    len: usize,
    glyphs: TreeGlyphs,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    /// Creates an empty tree with the default (unicode) glyph set.
    pub fn new() -> Self {
        Self::with_glyphs(TreeGlyphs::unicode())
    }

    /// Creates an empty tree rendering with the given glyph set.
    pub const fn with_glyphs(glyphs: TreeGlyphs) -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            glyphs,
        }
    }

    /// Creates an empty tree with preallocated capacity for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            generations: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
            glyphs: TreeGlyphs::unicode(),
        }
    }

    /// Returns the glyph set used for rendering.
    #[inline]
    pub const fn glyphs(&self) -> TreeGlyphs {
        self.glyphs
    }

    /// Returns the number of live nodes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no nodes.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `id` refers to a live node of this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.get(id.index()).is_some_and(Option::is_some)
            && self.generations[id.index()] == id.generation
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        let live = self.generations.get(id.index()) == Some(&id.generation);
        match self.slots.get(id.index()) {
            Some(Some(node)) if live => node,
            _ => panic!("NodeId does not refer to a live node of this tree"),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        let live = self.generations.get(id.index()) == Some(&id.generation);
        match self.slots.get_mut(id.index()) {
            Some(Some(node)) if live => node,
            _ => panic!("NodeId does not refer to a live node of this tree"),
        }
    }

    /// Inserts a new root node (no parent, no children).
    pub fn insert(&mut self, value: T) -> NodeId {
        let node = Node {
            value,
            parent: None,
            children: ChildList::new(),
            collapsed: false,
            dirty: true,
            render_cache: Vec::new(),
        };
        let id = if let Some(index) = self.free_list.pop() {
            // Recycled indices were range-checked when first issued.
            self.slots[index] = Some(node);
            NodeId {
                index: index as u32,
                generation: self.generations[index],
            }
        } else {
            let index = self.slots.len();
            assert!(index < u32::MAX as usize, "tree slot index overflow");
            self.slots.push(Some(node));
            self.generations.push(0);
            NodeId {
                index: index as u32,
                generation: 0,
            }
        };
        self.len += 1;
        id
    }

    /// Inserts a new node as the last child of `parent`.
    pub fn insert_under(&mut self, value: T, parent: NodeId) -> NodeId {
        let _ = self.node(parent);
        let id = self.insert(value);
        self.attach(id, parent);
        self.mark_path_dirty(id);
        id
    }

    /// Inserts a new node with an initial parent and/or initial children in
    /// one step.
    ///
    /// Existing entries of `children` are reparented under the new node,
    /// detaching them from any prior owner. Fails with
    /// [`TreeError::DuplicateChild`] if `children` repeats an entry, or with
    /// [`TreeError::WouldCycle`] if an entry is `parent` or one of its
    /// ancestors; either way nothing is allocated or mutated.
    pub fn insert_with(
        &mut self,
        value: T,
        parent: Option<NodeId>,
        children: &[NodeId],
    ) -> Result<NodeId, TreeError> {
        if let Some(parent) = parent {
            let _ = self.node(parent);
        }
        let mut seen = FxHashSet::with_capacity_and_hasher(children.len(), FxBuildHasher);
        for &child in children {
            let _ = self.node(child);
            if !seen.insert(child) {
                return Err(TreeError::DuplicateChild { node: child });
            }
            // A child that is an ancestor of the designated parent (or the
            // parent itself) would close a loop through the new node.
            if let Some(parent) = parent {
                if self.in_path(child, parent) {
                    return Err(TreeError::WouldCycle { node: child });
                }
            }
        }

        let id = self.insert(value);
        if let Some(parent) = parent {
            self.attach(id, parent);
        }
        for &child in children {
            self.detach(child);
            self.attach(child, id);
            self.mark_path_dirty(child);
        }
        self.mark_path_dirty(id);
        Ok(id)
    }

    /// Returns the parent of `id`, or `None` for roots.
    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Returns the ordered children of `id`.
    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Returns a shared reference to the node's payload.
    #[inline]
    pub fn value(&self, id: NodeId) -> &T {
        &self.node(id).value
    }

    /// Returns a mutable reference to the node's payload.
    ///
    /// Payload changes do not invalidate render caches; the cached listing
    /// stores handles, not payload text.
    #[inline]
    pub fn value_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.node_mut(id).value
    }

    /// Returns whether the node is collapsed.
    #[inline]
    pub fn collapsed(&self, id: NodeId) -> bool {
        self.node(id).collapsed
    }

    /// Collapses or expands the node.
    ///
    /// Collapsing hides the node's descendants from rendering and (opt-in)
    /// traversal; the node itself stays visible and its children stay
    /// attached. Ancestor caches are invalidated since their listings
    /// include this subtree.
    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) {
        if self.node(id).collapsed != collapsed {
            self.node_mut(id).collapsed = collapsed;
            self.mark_path_dirty(id);
        }
    }

    /// Moves `node` (with its entire subtree unchanged) under `new_parent`,
    /// or detaches it into a root when `new_parent` is `None`.
    ///
    /// The node is appended at the end of the new parent's children,
    /// preserving the existing sibling order. Repeat-safe: assigning the
    /// current parent again keeps the node attached (at the end). Fails with
    /// [`TreeError::WouldCycle`] if `new_parent` is `node` itself or one of
    /// its descendants, leaving the tree untouched.
    pub fn set_parent(&mut self, node: NodeId, new_parent: Option<NodeId>) -> Result<(), TreeError> {
        let _ = self.node(node);
        if let Some(parent) = new_parent {
            if self.in_path(node, parent) {
                return Err(TreeError::WouldCycle { node });
            }
        }
        self.detach(node);
        if let Some(parent) = new_parent {
            self.attach(node, parent);
        }
        self.mark_path_dirty(node);
        Ok(())
    }

    /// Replaces the node's children with `new_list`, in the given order.
    ///
    /// Entries not currently owned by `node` are reparented under it,
    /// detaching them from any prior owner. Children previously owned by
    /// `node` but absent from `new_list` become parentless roots, keeping
    /// parent/child links consistent in both directions.
    ///
    /// Fails atomically with [`TreeError::DuplicateChild`] if `new_list`
    /// repeats an entry, or with [`TreeError::WouldCycle`] if an entry is
    /// `node` itself or one of its ancestors.
    pub fn set_children(&mut self, node: NodeId, new_list: &[NodeId]) -> Result<(), TreeError> {
        let _ = self.node(node);
        let mut seen = FxHashSet::with_capacity_and_hasher(new_list.len(), FxBuildHasher);
        for &child in new_list {
            let _ = self.node(child);
            if !seen.insert(child) {
                return Err(TreeError::DuplicateChild { node: child });
            }
            if self.in_path(child, node) {
                return Err(TreeError::WouldCycle { node: child });
            }
        }

        // Orphan previously-owned children missing from the new list.
        let old: ChildList = self.node(node).children.clone();
        for &child in &old {
            if !seen.contains(&child) {
                self.node_mut(child).parent = None;
                self.mark_path_dirty(child);
            }
        }
        for &child in new_list {
            if self.node(child).parent != Some(node) {
                self.detach(child);
                self.node_mut(child).parent = Some(node);
                self.mark_path_dirty(child);
            }
        }
        self.node_mut(node).children = ChildList::from_slice(new_list);
        self.mark_path_dirty(node);
        Ok(())
    }

    /// Swaps the node with its previous sibling. Returns `false` if the node
    /// is a root or already first.
    pub fn move_up(&mut self, node: NodeId) -> bool {
        self.move_by(node, -1)
    }

    /// Swaps the node with its next sibling. Returns `false` if the node is
    /// a root or already last.
    pub fn move_down(&mut self, node: NodeId) -> bool {
        self.move_by(node, 1)
    }

    fn move_by(&mut self, node: NodeId, offset: isize) -> bool {
        let Some(parent) = self.node(node).parent else {
            return false;
        };
        let siblings = &mut self.node_mut(parent).children;
        let Some(pos) = siblings.iter().position(|&c| c == node) else {
            return false;
        };
        let Some(target) = pos.checked_add_signed(offset) else {
            return false;
        };
        if target >= siblings.len() {
            return false;
        }
        siblings.swap(pos, target);
        // The moved node's own listing is unchanged; only ancestors reorder.
        self.mark_path_dirty(parent);
        true
    }

    /// Removes `node` and every descendant, returning the removed node's
    /// payload. Slots are recycled; handles into the removed subtree become
    /// stale and panic on use.
    pub fn remove_subtree(&mut self, node: NodeId) -> T {
        self.detach(node);
        self.mark_path_dirty(node);
        let doomed: Vec<NodeId> = self.traverse(node, TraverseOrder::Post, true).collect();
        let mut value = None;
        for id in doomed {
            let slot = self.slots[id.index()].take();
            self.generations[id.index()] = self.generations[id.index()].wrapping_add(1);
            self.free_list.push(id.index());
            self.len -= 1;
            if id == node {
                value = slot.map(|n| n.value);
            }
        }
        // Post-order traversal always yields `node` itself.
        value.expect("removed node missing from its own subtree")
    }

    /// Returns the chain of nodes from the root down to `id`, both ends
    /// inclusive. For a root this is just `[id]`.
    ///
    /// Computed on demand and never cached; cost is O(depth).
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cursor = self.node(id).parent;
        while let Some(ancestor) = cursor {
            path.push(ancestor);
            cursor = self.node(ancestor).parent;
        }
        path.reverse();
        path
    }

    /// Returns the node's siblings in sibling order, excluding the node
    /// itself. Empty for roots.
    pub fn siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let siblings: &[NodeId] = match self.node(id).parent {
            Some(parent) => &self.node(parent).children,
            None => &[],
        };
        siblings.iter().copied().filter(move |&c| c != id)
    }

    /// Returns a lazily formatted `/`-joined chain of ancestor payloads from
    /// the root to `id`, for debugging and identity display.
    pub const fn display_path(&self, id: NodeId) -> DisplayPath<'_, T> {
        DisplayPath { tree: self, id }
    }

    // Appends `node` to `parent`'s children (unless already present) and
    // sets the back-link. Callers have already ruled out cycles.
    fn attach(&mut self, node: NodeId, parent: NodeId) {
        let entry = &mut self.node_mut(parent).children;
        if !entry.contains(&node) {
            entry.push(node);
        }
        self.node_mut(node).parent = Some(parent);
    }

    // Removes `node` from its current parent's children, dirtying the old
    // parent's path. No-op for roots.
    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.node(node).parent {
            self.mark_path_dirty(parent);
            self.node_mut(parent).children.retain(|c| *c != node);
            self.node_mut(node).parent = None;
        }
    }

    // Returns `true` if `needle` lies on the root path of `node` (including
    // `node` itself).
    fn in_path(&self, needle: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == needle {
                return true;
            }
            cursor = self.node(id).parent;
        }
        false
    }

    // Dirty cascade: a structural change to a node stales the cached
    // listing of the node and of every ancestor up to its root.
    pub(crate) fn mark_path_dirty(&mut self, node: NodeId) {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            let entry = self.node_mut(id);
            entry.dirty = true;
            cursor = entry.parent;
        }
    }

    #[cfg(test)]
    pub(crate) fn is_dirty(&self, id: NodeId) -> bool {
        self.node(id).dirty
    }
}

/// Lazily formatted root-to-node payload chain, joined with `/`.
///
/// Returned by [`Tree::display_path`]. Two nodes with equal payloads can
/// produce equal strings; this is a display aid, not an identity key.
pub struct DisplayPath<'a, T> {
    tree: &'a Tree<T>,
    id: NodeId,
}

impl<T: fmt::Display> fmt::Display for DisplayPath<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write as _;

        for (i, id) in self.tree.path(self.id).into_iter().enumerate() {
            if i > 0 {
                f.write_char(PATH_SEP)?;
            }
            write!(f, "{}", self.tree.node(id).value)?;
        }
        Ok(())
    }
}
