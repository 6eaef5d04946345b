use crate::tree::{ChildList, NodeId, Tree};

/// One line of a rendered subtree listing: the ASCII connector prefix and
/// the node it refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderLine {
    /// Connector/continuation prefix, empty for the listing's first line.
    pub prefix: String,
    /// The node this line stands for.
    pub node: NodeId,
}

impl RenderLine {
    pub(crate) fn new(prefix: String, node: NodeId) -> Self {
        Self { prefix, node }
    }
}

impl<T> Tree<T> {
    /// Renders the subtree rooted at `node` as a pre-order listing of
    /// `(prefix, node)` lines.
    ///
    /// Lines appear in the same order as [`Tree::traverse`] with
    /// [`TraverseOrder::Pre`](crate::TraverseOrder::Pre), except that the
    /// descendants of a collapsed child are omitted; the collapsed child
    /// itself still gets its summary line.
    ///
    /// Results are memoized per node: if nothing on the subtree was mutated
    /// since the last call, the cached listing is returned as-is without
    /// recomputation. Structural mutations and collapse toggles invalidate
    /// the caches of every affected ancestor.
    ///
    /// ```rust
    /// use tabtree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let root = tree.insert("foo");
    /// let bar = tree.insert_under("bar", root);
    /// tree.insert_under("baz", root);
    ///
    /// let prefixes: Vec<&str> = tree
    ///     .render(root)
    ///     .iter()
    ///     .map(|line| line.prefix.as_str())
    ///     .collect();
    /// assert_eq!(prefixes, ["", "├─", "└─"]);
    /// # let _ = bar;
    /// ```
    pub fn render(&mut self, node: NodeId) -> &[RenderLine] {
        self.rebuild_render(node);
        &self.node(node).render_cache
    }

    fn rebuild_render(&mut self, node: NodeId) {
        if !self.node(node).dirty {
            return;
        }

        let glyphs = self.glyphs();
        let mut result = vec![RenderLine::new(String::new(), node)];
        let children: ChildList = self.node(node).children.clone();
        let last = children.len().wrapping_sub(1);

        for (i, child) in children.iter().copied().enumerate() {
            let is_last = i == last;
            let connector = if is_last {
                glyphs.corner
            } else {
                glyphs.intersection
            };

            if self.node(child).children.is_empty() {
                result.push(RenderLine::new(connector.to_owned(), child));
                continue;
            }

            // The child's subtree renders against its own cache/dirty state.
            self.rebuild_render(child);
            let entry = self.node(child);
            // A collapsed child contributes only its summary line; the rest
            // of its (still cached) subtree is left out.
            let keep = if entry.collapsed {
                1
            } else {
                entry.render_cache.len()
            };
            for (j, line) in entry.render_cache.iter().take(keep).enumerate() {
                let prefix = if j == 0 {
                    connector.to_owned()
                } else if is_last {
                    format!("  {}", line.prefix)
                } else {
                    format!("{} {}", glyphs.pipe, line.prefix)
                };
                result.push(RenderLine::new(prefix, line.node));
            }
        }

        let entry = self.node_mut(node);
        entry.render_cache = result;
        entry.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs::TreeGlyphs;

    // root=foo, children bar/baz, bar's children lorem/ipsum.
    fn sample() -> (Tree<&'static str>, [NodeId; 5]) {
        let mut tree = Tree::new();
        let root = tree.insert("foo");
        let child = tree.insert_under("bar", root);
        let child2 = tree.insert_under("baz", root);
        let child3 = tree.insert_under("lorem", child);
        let child4 = tree.insert_under("ipsum", child);
        (tree, [root, child, child2, child3, child4])
    }

    fn lines(tree: &mut Tree<&'static str>, node: NodeId) -> Vec<(String, NodeId)> {
        tree.render(node)
            .iter()
            .map(|line| (line.prefix.clone(), line.node))
            .collect()
    }

    #[test]
    fn renders_nested_tree_with_connectors() {
        let (mut tree, [root, child, child2, child3, child4]) = sample();

        assert_eq!(
            lines(&mut tree, root),
            vec![
                (String::new(), root),
                ("├─".to_owned(), child),
                ("│ ├─".to_owned(), child3),
                ("│ └─".to_owned(), child4),
                ("└─".to_owned(), child2),
            ]
        );
    }

    #[test]
    fn collapsed_child_keeps_only_its_summary_line() {
        let (mut tree, [root, child, child2, _, _]) = sample();

        tree.set_collapsed(child, true);

        assert_eq!(
            lines(&mut tree, root),
            vec![
                (String::new(), root),
                ("├─".to_owned(), child),
                ("└─".to_owned(), child2),
            ]
        );
    }

    #[test]
    fn render_is_idempotent_without_mutations() {
        let (mut tree, [root, ..]) = sample();

        let first = lines(&mut tree, root);
        let second = lines(&mut tree, root);

        assert_eq!(first, second);
    }

    #[test]
    fn cache_is_reused_until_marked_dirty() {
        let (mut tree, [root, child, ..]) = sample();

        tree.render(root);
        assert!(!tree.is_dirty(root));
        assert!(!tree.is_dirty(child));

        // A second render must be a pure cache hit.
        tree.render(root);
        assert!(!tree.is_dirty(root));
    }

    #[test]
    fn leaf_mutation_dirties_every_ancestor() {
        let (mut tree, [root, child, child2, child3, child4]) = sample();

        tree.render(root);
        tree.set_parent(child3, Some(child2)).unwrap();

        // Both the old and the new path to the root are stale now.
        assert!(tree.is_dirty(root));
        assert!(tree.is_dirty(child));
        assert!(tree.is_dirty(child2));

        assert_eq!(
            lines(&mut tree, root),
            vec![
                (String::new(), root),
                ("├─".to_owned(), child),
                ("│ └─".to_owned(), child4),
                ("└─".to_owned(), child2),
                ("  └─".to_owned(), child3),
            ]
        );
    }

    #[test]
    fn collapse_toggle_invalidates_ancestor_caches() {
        let (mut tree, [root, child, ..]) = sample();

        let expanded = lines(&mut tree, root);
        tree.set_collapsed(child, true);
        assert!(tree.is_dirty(root));
        let collapsed = lines(&mut tree, root);

        assert_ne!(expanded, collapsed);
        assert_eq!(collapsed.len(), 3);

        tree.set_collapsed(child, false);
        assert_eq!(lines(&mut tree, root), expanded);
    }

    #[test]
    fn subtree_render_reuses_child_cache_independently() {
        let (mut tree, [root, child, _, child3, child4]) = sample();

        assert_eq!(
            lines(&mut tree, child),
            vec![
                (String::new(), child),
                ("├─".to_owned(), child3),
                ("└─".to_owned(), child4),
            ]
        );

        // Rendering an ancestor afterwards reuses the child's fresh cache.
        tree.render(root);
        assert!(!tree.is_dirty(root));
    }

    #[test]
    fn deeper_nesting_extends_continuation_prefixes() {
        let mut tree = Tree::new();
        let root = tree.insert("root");
        let a = tree.insert_under("a", root);
        let b = tree.insert_under("b", a);
        let c = tree.insert_under("c", b);
        let tail = tree.insert_under("tail", root);

        assert_eq!(
            lines(&mut tree, root),
            vec![
                (String::new(), root),
                ("├─".to_owned(), a),
                ("│ └─".to_owned(), b),
                ("│   └─".to_owned(), c),
                ("└─".to_owned(), tail),
            ]
        );
    }

    #[test]
    fn ascii_glyphs_render_without_box_drawing() {
        let mut tree = Tree::with_glyphs(TreeGlyphs::ascii());
        let root = tree.insert("foo");
        let a = tree.insert_under("a", root);
        let b = tree.insert_under("b", a);
        let c = tree.insert_under("c", root);

        assert_eq!(
            lines(&mut tree, root),
            vec![
                (String::new(), root),
                ("|-".to_owned(), a),
                ("| `-".to_owned(), b),
                ("`-".to_owned(), c),
            ]
        );
    }

    #[test]
    fn single_node_renders_one_empty_prefixed_line() {
        let mut tree = Tree::new();
        let root = tree.insert("foo");

        assert_eq!(lines(&mut tree, root), vec![(String::new(), root)]);
    }
}
