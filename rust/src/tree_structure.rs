//! Tree structure management operations for BPlusTreeIndex.
//!
//! This module contains the tree-level queries and bulk operations: size
//! queries, height, node counting, clearing, and the first/last leaf helpers
//! used by iteration and validation.

use crate::types::{BPlusTreeIndex, LeafNode, NodeId, NodeRef};

// ============================================================================
// TREE STRUCTURE OPERATIONS
// ============================================================================

impl<K, V> BPlusTreeIndex<K, V> {
    /// Returns the number of records in the tree.
    pub fn len(&self) -> usize {
        self.leaves().map(|leaf| leaf.leaf.len()).sum()
    }

    /// Returns true if the tree holds no records.
    ///
    /// Only a root leaf can be empty: every other leaf keeps at least
    /// `ceil(M/2)` records.
    pub fn is_empty(&self) -> bool {
        match self.root {
            NodeRef::Leaf(id, _) => self.leaf(id).is_empty(),
            NodeRef::Branch(_, _) => false,
        }
    }

    /// Returns true if the root is a leaf node.
    pub fn is_leaf_root(&self) -> bool {
        self.root.is_leaf()
    }

    /// Number of levels, counting the leaf level. A lone root leaf has
    /// height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;
        while let NodeRef::Branch(id, _) = current {
            current = self.branch(id).children[0];
            height += 1;
        }
        height
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Clear all records, leaving a single empty root leaf.
    pub fn clear(&mut self) {
        self.leaf_arena.clear();
        self.branch_arena.clear();

        let root_id = self.leaf_arena.allocate(LeafNode::new(self.capacity));
        self.root = NodeRef::leaf(root_id);
    }

    /// Count the leaf and branch nodes reachable from the root, as
    /// `(leaves, branches)`.
    pub fn count_nodes_in_tree(&self) -> (usize, usize) {
        self.count_nodes_recursive(self.root)
    }

    fn count_nodes_recursive(&self, node: NodeRef<K, V>) -> (usize, usize) {
        match node {
            NodeRef::Leaf(_, _) => (1, 0),
            NodeRef::Branch(id, _) => self.branch(id).children.iter().fold(
                (0, 1),
                |(leaves, branches), child| {
                    let (child_leaves, child_branches) = self.count_nodes_recursive(*child);
                    (leaves + child_leaves, branches + child_branches)
                },
            ),
        }
    }

    // ============================================================================
    // TREE NAVIGATION HELPERS
    // ============================================================================

    /// ID of the first (leftmost) leaf, the head of the leaf chain.
    pub fn first_leaf_id(&self) -> NodeId {
        self.edge_leaf_id(|children| children[0])
    }

    /// ID of the last (rightmost) leaf, the tail of the leaf chain.
    pub fn last_leaf_id(&self) -> NodeId {
        self.edge_leaf_id(|children| children[children.len() - 1])
    }

    fn edge_leaf_id(&self, pick: impl Fn(&[NodeRef<K, V>]) -> NodeRef<K, V>) -> NodeId {
        let mut current = self.root;
        loop {
            match current {
                NodeRef::Leaf(id, _) => return id,
                NodeRef::Branch(id, _) => current = pick(self.branch(id).children.as_slice()),
            }
        }
    }
}
