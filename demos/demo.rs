// Minimal example: build a small tab tree, print it, collapse a branch.
use tabtree::{TraverseOrder, Tree};

fn main() {
    // Build the tree: root -> {bar -> {lorem, ipsum}, baz}.
    let mut tree = Tree::new();
    let root = tree.insert("foo");
    let bar = tree.insert_under("bar", root);
    tree.insert_under("baz", root);
    tree.insert_under("lorem", bar);
    tree.insert_under("ipsum", bar);

    // Each line pairs an ASCII connector prefix with the node it stands for.
    println!("full listing:");
    for line in tree.render(root).to_vec() {
        println!("{}{}", line.prefix, tree.value(line.node));
    }

    // Collapsing hides descendants from the listing, not from the tree.
    tree.set_collapsed(bar, true);
    println!("\nwith 'bar' collapsed:");
    for line in tree.render(root).to_vec() {
        println!("{}{}", line.prefix, tree.value(line.node));
    }

    // Traversal respects the collapse flag only when asked to.
    let post: Vec<_> = tree
        .traverse(root, TraverseOrder::Post, true)
        .map(|id| *tree.value(id))
        .collect();
    println!("\npost-order: {}", post.join(", "));
    println!("path of 'bar': {}", tree.display_path(bar));
}
