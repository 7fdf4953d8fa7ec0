//! INSERT operations for BPlusTreeIndex.
//!
//! This module contains record insertion, leaf and branch splitting, and root
//! growth. Splits cascade upward through the parent links until a branch with
//! room absorbs the new separator or a new root is created.

use tracing::trace;

use crate::error::{BPlusTreeError, ModifyResult};
use crate::types::{BPlusTreeIndex, BranchNode, NodeId, NodeRef, NULL_NODE};

impl<K: Ord + Clone, V: PartialEq> BPlusTreeIndex<K, V> {
    /// Insert a record under `key`.
    ///
    /// Duplicate keys are allowed; a new record goes in front of any records
    /// the target leaf already holds under the same key.
    ///
    /// # Errors
    ///
    /// Returns `BPlusTreeError::AllocationError` if the splits this insert
    /// needs would exceed the tree's node limit. The tree is unchanged in that
    /// case.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTreeIndex;
    ///
    /// let mut tree = BPlusTreeIndex::<i64, u64>::new(3).unwrap();
    /// for key in 0..10 {
    ///     tree.insert(key, key as u64).unwrap();
    /// }
    /// assert_eq!(tree.len(), 10);
    /// assert!(tree.height() > 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> ModifyResult<()> {
        let leaf_id = self.find_leaf_id(&key);

        if !self.leaf(leaf_id).is_full() {
            self.leaf_mut(leaf_id).insert_sorted(key, value);
            return Ok(());
        }

        self.reserve_split_path(leaf_id)?;
        self.split_leaf(leaf_id, key, value);
        Ok(())
    }

    // ============================================================================
    // PRIVATE HELPER METHODS FOR INSERT OPERATIONS
    // ============================================================================

    /// Check that the node limit leaves room for every node a split starting
    /// at the full leaf `leaf_id` will allocate.
    fn reserve_split_path(&self, leaf_id: NodeId) -> ModifyResult<()> {
        let demand = self.split_demand(leaf_id);
        let in_use = self.allocated_node_count();
        if in_use + demand > self.node_limit {
            return Err(BPlusTreeError::allocation_error(
                "nodes for split",
                &format!(
                    "{} needed, {} of {} in use",
                    demand, in_use, self.node_limit
                ),
            ));
        }
        Ok(())
    }

    /// Nodes allocated by splitting the full leaf `leaf_id`: the new leaf, one
    /// branch per full ancestor, and a new root if every ancestor is full.
    fn split_demand(&self, leaf_id: NodeId) -> usize {
        let mut demand = 1;
        let mut parent = self.leaf(leaf_id).parent;
        while parent != NULL_NODE {
            let branch = self.branch(parent);
            if !branch.is_full() {
                return demand;
            }
            demand += 1;
            parent = branch.parent;
        }
        demand + 1
    }

    /// Split the full leaf `leaf_id` around the incoming record and hand the
    /// new leaf's first key to the parent.
    fn split_leaf(&mut self, leaf_id: NodeId, key: K, value: V) {
        let mut right = self.leaf_mut(leaf_id).split_with(key, value);
        let separator = right.keys[0].clone();

        let (parent, old_next) = {
            let left = self.leaf(leaf_id);
            (left.parent, left.next)
        };
        right.parent = parent;
        right.prev = leaf_id;
        right.next = old_next;
        let right_id = self.allocate_leaf(right);

        self.leaf_mut(leaf_id).next = right_id;
        if old_next != NULL_NODE {
            self.leaf_mut(old_next).prev = right_id;
        }

        trace!(
            target: "bplustree_index::insert",
            left = leaf_id,
            right = right_id,
            "split leaf"
        );
        self.insert_in_parent(NodeRef::leaf(leaf_id), separator, NodeRef::leaf(right_id));
    }

    /// Register `right`, the new upper half of `left`, with `left`'s parent.
    fn insert_in_parent(&mut self, left: NodeRef<K, V>, key: K, right: NodeRef<K, V>) {
        if self.parent_of(left) == NULL_NODE {
            self.grow_root(left, key, right);
            return;
        }

        let (parent, index) = self.locate_in_parent(left);
        if self.branch(parent).is_full() {
            self.split_branch(parent, index, key, right);
        } else {
            self.branch_mut(parent).insert_child_after(index, key, right);
            self.set_parent(right, parent);
        }
    }

    /// Split the full branch `branch_id` while inserting `child` after its
    /// child at `index`, then promote the middle key.
    fn split_branch(&mut self, branch_id: NodeId, index: usize, key: K, child: NodeRef<K, V>) {
        self.set_parent(child, branch_id);
        let (mut right, promoted) = {
            let branch = self.branch_mut(branch_id);
            branch.insert_child_after(index, key, child);
            branch.split_overfull()
        };
        right.parent = self.branch(branch_id).parent;

        let moved = right.children.clone();
        let right_id = self.allocate_branch(right);
        for moved_child in moved {
            self.set_parent(moved_child, right_id);
        }

        trace!(
            target: "bplustree_index::insert",
            left = branch_id,
            right = right_id,
            "split branch"
        );
        self.insert_in_parent(
            NodeRef::branch(branch_id),
            promoted,
            NodeRef::branch(right_id),
        );
    }

    /// Put a new root above the two halves of the old root.
    fn grow_root(&mut self, left: NodeRef<K, V>, key: K, right: NodeRef<K, V>) {
        let mut root = BranchNode::new(self.capacity);
        root.keys.push(key);
        root.children.push(left);
        root.children.push(right);
        let root_id = self.allocate_branch(root);

        self.set_parent(left, root_id);
        self.set_parent(right, root_id);
        self.root = NodeRef::branch(root_id);

        trace!(
            target: "bplustree_index::insert",
            root = root_id,
            "grew new root"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_into_root_leaf() {
        let mut tree = BPlusTreeIndex::<i64, u64>::new(4).unwrap();
        tree.insert(20, 2).unwrap();
        tree.insert(10, 1).unwrap();
        tree.insert(30, 3).unwrap();

        assert!(tree.is_leaf_root());
        assert_eq!(tree.leaf(tree.root.id()).keys(), &[10, 20, 30]);
        assert_eq!(tree.allocated_node_count(), 1);
    }

    #[test]
    fn test_root_leaf_split_grows_tree() {
        let mut tree = BPlusTreeIndex::<i64, u64>::new(4).unwrap();
        for key in [10, 20, 30, 40, 25] {
            tree.insert(key, key as u64).unwrap();
        }

        assert!(!tree.is_leaf_root());
        assert_eq!(tree.height(), 2);
        let root = tree.branch(tree.root.id());
        assert_eq!(root.keys(), &[25]);
        assert_eq!(root.parent, NULL_NODE);

        let left = tree.leaf(root.children[0].id());
        let right = tree.leaf(root.children[1].id());
        assert_eq!(left.keys(), &[10, 20]);
        assert_eq!(right.keys(), &[25, 30, 40]);
        assert_eq!(left.parent, tree.root.id());
        assert_eq!(right.parent, tree.root.id());
        assert_eq!(left.next, root.children[1].id());
        assert_eq!(right.prev, root.children[0].id());
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_split_in_middle_of_chain_fixes_both_neighbours() {
        let mut tree = BPlusTreeIndex::<i64, u64>::new(4).unwrap();
        for key in [10, 20, 30, 40, 50] {
            tree.insert(key, key as u64).unwrap();
        }
        // Leaves are [10, 20] and [30, 40, 50]; fill and split the first one
        tree.insert(11, 11).unwrap();
        tree.insert(12, 12).unwrap();
        tree.insert(13, 13).unwrap();

        let keys: Vec<Vec<i64>> = tree.leaves().map(|leaf| leaf.keys().to_vec()).collect();
        assert_eq!(keys, vec![vec![10, 11], vec![12, 13, 20], vec![30, 40, 50]]);

        let middle = tree.lookup_leaf(&12);
        let last = tree.lookup_leaf(&50);
        assert_eq!(middle.next_id(), Some(last.id()));
        assert_eq!(last.prev_id(), Some(middle.id()));
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_cascading_split_with_minimum_fanout() {
        let mut tree = BPlusTreeIndex::<i64, u64>::new(3).unwrap();
        for key in 1..=7 {
            tree.insert(key, key as u64).unwrap();
        }
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.branch(tree.root.id()).keys(), &[3, 5]);

        tree.insert(8, 8).unwrap();
        assert_eq!(tree.height(), 3);
        let root = tree.branch(tree.root.id());
        assert_eq!(root.keys(), &[5]);
        for child in root.children() {
            assert_eq!(tree.parent_of(*child), tree.root.id());
        }
        assert_eq!(tree.allocated_node_count(), 7);
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_node_limit_rejects_split_without_changes() {
        let mut tree = BPlusTreeIndex::<i64, u64>::with_node_limit(3, 6).unwrap();
        for key in 1..=7 {
            tree.insert(key, key as u64).unwrap();
        }
        assert_eq!(tree.allocated_node_count(), 4);

        // Key 8 needs a leaf, a branch, and a new root
        let err = tree.insert(8, 8).unwrap_err();
        assert!(matches!(err, BPlusTreeError::AllocationError(_)));
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.allocated_node_count(), 4);
        assert!(!tree.contains_key(&8));
        assert!(tree.check_invariants());

        // Inserts that need no split still succeed
        tree.insert(0, 0).unwrap();
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn test_node_limit_exactly_sufficient() {
        let mut tree = BPlusTreeIndex::<i64, u64>::with_node_limit(3, 7).unwrap();
        for key in 1..=8 {
            tree.insert(key, key as u64).unwrap();
        }
        assert_eq!(tree.allocated_node_count(), 7);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn test_duplicate_keys_stay_adjacent() {
        let mut tree = BPlusTreeIndex::<i64, u64>::new(4).unwrap();
        tree.insert(7, 1).unwrap();
        tree.insert(7, 2).unwrap();
        tree.insert(3, 3).unwrap();

        let leaf = tree.lookup_leaf(&7);
        assert_eq!(leaf.keys(), &[3, 7, 7]);
        assert_eq!(leaf.values(), &[3, 2, 1]);
        assert!(tree.contains(&7, &1));
        assert!(tree.contains(&7, &2));
    }

    #[test]
    fn test_descending_inserts() {
        let mut tree = BPlusTreeIndex::<i64, u64>::new(4).unwrap();
        for key in (0..100).rev() {
            tree.insert(key, key as u64).unwrap();
            assert!(tree.check_invariants(), "invariants broken after {}", key);
        }
        let keys: Vec<i64> = tree.keys().copied().collect();
        assert_eq!(keys, (0..100).collect::<Vec<_>>());
    }
}
