//! Read-only views of the tree's shape for tests and debugging.
//!
//! [`TreeDump`] is a structured, level-by-level snapshot that compares by
//! value; [`BPlusTreeIndex::render_tree`] produces an indented text listing of
//! every node and record.

use std::fmt::{self, Write};

use crate::types::{BPlusTreeIndex, NodeRef};

/// Which kind of node a [`NodeDump`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Branch,
}

/// Keys of one node: records' keys for a leaf, separators for a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDump<K> {
    pub kind: NodeKind,
    pub keys: Vec<K>,
}

/// Snapshot of a tree's keys, one entry per level.
///
/// `levels[0]` holds the root and the last level holds the leaves, each
/// level listed left to right. Node IDs are left out, so two trees with the
/// same shape and keys produce equal dumps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDump<K> {
    pub levels: Vec<Vec<NodeDump<K>>>,
}

impl<K> TreeDump<K> {
    /// Number of levels, counting the leaf level.
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// Every leaf key, left to right.
    pub fn leaf_keys(&self) -> Vec<&K> {
        self.levels
            .last()
            .map(|leaves| leaves.iter().flat_map(|node| node.keys.iter()).collect())
            .unwrap_or_default()
    }
}

impl<K: fmt::Display> fmt::Display for TreeDump<K> {
    /// One line per level, each node as `[k1 k2 ...]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, level) in self.levels.iter().enumerate() {
            if depth > 0 {
                writeln!(f)?;
            }
            for (position, node) in level.iter().enumerate() {
                if position > 0 {
                    f.write_str(" ")?;
                }
                f.write_str("[")?;
                for (i, key) in node.keys.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", key)?;
                }
                f.write_str("]")?;
            }
        }
        Ok(())
    }
}

impl<K: Clone, V> BPlusTreeIndex<K, V> {
    /// Structured level-by-level dump of the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTreeIndex;
    ///
    /// let mut tree = BPlusTreeIndex::<i64, u64>::new(4).unwrap();
    /// for key in 1..=5 {
    ///     tree.insert(key, 0).unwrap();
    /// }
    /// assert_eq!(tree.dump().to_string(), "[3]\n[1 2] [3 4 5]");
    /// ```
    pub fn dump(&self) -> TreeDump<K> {
        let mut levels = Vec::new();
        self.dump_node(self.root, 0, &mut levels);
        TreeDump { levels }
    }

    fn dump_node(&self, node: NodeRef<K, V>, depth: usize, levels: &mut Vec<Vec<NodeDump<K>>>) {
        if levels.len() == depth {
            levels.push(Vec::new());
        }
        match node {
            NodeRef::Leaf(id, _) => levels[depth].push(NodeDump {
                kind: NodeKind::Leaf,
                keys: self.leaf(id).keys.clone(),
            }),
            NodeRef::Branch(id, _) => {
                let branch = self.branch(id);
                levels[depth].push(NodeDump {
                    kind: NodeKind::Branch,
                    keys: branch.keys.clone(),
                });
                for child in &branch.children {
                    self.dump_node(*child, depth + 1, levels);
                }
            }
        }
    }
}

impl<K, V> BPlusTreeIndex<K, V> {
    /// Record count of each leaf, in chain order.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        self.leaves().map(|leaf| leaf.leaf.len()).collect()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> BPlusTreeIndex<K, V> {
    /// Indented listing of the whole tree, records included.
    ///
    /// Each nesting level is indented by one tab. Branches list their
    /// children with the separator between each pair.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        out.push_str("BEGIN TREE\n");
        self.render_node(self.root, 0, &mut out)
            .expect("writing to a String cannot fail");
        out.push_str("END TREE\n");
        out
    }

    fn render_node(&self, node: NodeRef<K, V>, level: usize, out: &mut String) -> fmt::Result {
        let indent = "\t".repeat(level);
        match node {
            NodeRef::Leaf(id, _) => {
                let leaf = self.leaf(id);
                writeln!(out, "{}BEGIN LEAF", indent)?;
                for (key, value) in leaf.keys.iter().zip(&leaf.values) {
                    writeln!(out, "{}key: {:?}, record: {:?}", indent, key, value)?;
                }
                writeln!(out, "{}END LEAF", indent)
            }
            NodeRef::Branch(id, _) => {
                let branch = self.branch(id);
                writeln!(out, "{}BEGIN BRANCH", indent)?;
                self.render_node(branch.children[0], level + 1, out)?;
                for (key, child) in branch.keys.iter().zip(&branch.children[1..]) {
                    writeln!(out, "{}key: {:?}", indent, key)?;
                    self.render_node(*child, level + 1, out)?;
                }
                writeln!(out, "{}END BRANCH", indent)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(capacity: usize, keys: impl IntoIterator<Item = i64>) -> BPlusTreeIndex<i64, u64> {
        let mut tree = BPlusTreeIndex::new(capacity).unwrap();
        for key in keys {
            tree.insert(key, key as u64 * 10).unwrap();
        }
        tree
    }

    #[test]
    fn test_dump_of_empty_tree() {
        let dump = tree_with(4, []).dump();
        assert_eq!(dump.height(), 1);
        assert_eq!(
            dump.levels,
            vec![vec![NodeDump {
                kind: NodeKind::Leaf,
                keys: vec![]
            }]]
        );
        assert!(dump.leaf_keys().is_empty());
        assert_eq!(dump.to_string(), "[]");
    }

    #[test]
    fn test_dump_levels() {
        let dump = tree_with(3, 1..=8).dump();
        assert_eq!(dump.height(), 3);
        assert_eq!(dump.to_string(), "[5]\n[3] [7]\n[1 2] [3 4] [5 6] [7 8]");
        assert!(dump.levels[0].iter().all(|node| node.kind == NodeKind::Branch));
        assert!(dump.levels[2].iter().all(|node| node.kind == NodeKind::Leaf));
        let keys: Vec<i64> = dump.leaf_keys().into_iter().copied().collect();
        assert_eq!(keys, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_dump_height_matches_tree() {
        let tree = tree_with(4, 0..200);
        assert_eq!(tree.dump().height(), tree.height());
    }

    #[test]
    fn test_leaf_sizes() {
        let tree = tree_with(4, 1..=9);
        assert_eq!(tree.leaf_sizes(), vec![2, 2, 2, 3]);
        assert_eq!(tree.leaf_sizes().iter().sum::<usize>(), tree.len());
    }

    #[test]
    fn test_render_tree() {
        let tree = tree_with(4, 1..=5);
        let expected = "\
BEGIN TREE
BEGIN BRANCH
\tBEGIN LEAF
\tkey: 1, record: 10
\tkey: 2, record: 20
\tEND LEAF
key: 3
\tBEGIN LEAF
\tkey: 3, record: 30
\tkey: 4, record: 40
\tkey: 5, record: 50
\tEND LEAF
END BRANCH
END TREE
";
        assert_eq!(tree.render_tree(), expected);
    }
}
