//! DELETE operations for BPlusTreeIndex.
//!
//! This module contains record removal and the repair that follows it: an
//! under-occupied node either borrows one entry from a close sibling or is
//! merged with it, merges cascade up through the parent links, and a root
//! branch left with a single child is collapsed.

use tracing::{debug, trace};

use crate::error::{BPlusTreeError, ModifyResult};
use crate::types::{BPlusTreeIndex, NodeId, NodeRef, Sibling, NULL_NODE};

impl<K: Ord + Clone, V: PartialEq> BPlusTreeIndex<K, V> {
    /// Remove the record `(key, value)`.
    ///
    /// Only the leaf `key` routes to is searched, and the record must match
    /// both the key and the value.
    ///
    /// # Errors
    ///
    /// Returns `BPlusTreeError::ValueNotFound` if that leaf has no such
    /// record. The tree is unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTreeIndex;
    ///
    /// let mut tree = BPlusTreeIndex::<i64, u64>::new(4).unwrap();
    /// tree.insert(5, 50).unwrap();
    /// assert!(tree.delete(&5, &51).is_err());
    /// tree.delete(&5, &50).unwrap();
    /// assert!(tree.is_empty());
    /// ```
    pub fn delete(&mut self, key: &K, value: &V) -> ModifyResult<()> {
        let leaf_id = self.find_leaf_id(key);
        let Some(index) = self.leaf(leaf_id).position_of(key, value) else {
            debug!(
                target: "bplustree_index::delete",
                leaf = leaf_id,
                "no matching record"
            );
            return Err(BPlusTreeError::value_not_found(leaf_id));
        };

        self.leaf_mut(leaf_id).remove_at(index);
        self.rebalance(NodeRef::leaf(leaf_id));
        Ok(())
    }

    // ============================================================================
    // PRIVATE HELPER METHODS FOR DELETE OPERATIONS
    // ============================================================================

    /// Restore occupancy starting at `node`, which just lost an entry.
    fn rebalance(&mut self, mut node: NodeRef<K, V>) {
        loop {
            if self.parent_of(node) == NULL_NODE {
                if let NodeRef::Branch(id, _) = node {
                    if self.branch(id).len() < 2 {
                        self.collapse_root(id);
                    }
                }
                return;
            }

            if self.is_sufficiently_occupied(node) {
                return;
            }

            let sibling = self.close_sibling(node);
            if self.entry_count(node) + self.entry_count(sibling.node) <= self.capacity {
                node = self.merge_with_sibling(node, sibling);
            } else {
                self.borrow_from_sibling(node, sibling);
                return;
            }
        }
    }

    /// The sibling to the left of `node`, or the one to its right when `node`
    /// is its parent's first child.
    fn close_sibling(&self, node: NodeRef<K, V>) -> Sibling<K, V> {
        let (parent, index) = self.locate_in_parent(node);
        let children = &self.branch(parent).children;
        if index == 0 {
            Sibling {
                node: children[1],
                parent,
                separator: 0,
                precedes: false,
            }
        } else {
            Sibling {
                node: children[index - 1],
                parent,
                separator: index - 1,
                precedes: true,
            }
        }
    }

    /// Merge the higher-keyed of `node` and its sibling into the lower one and
    /// drop it from their parent. Returns the parent, which has lost a child.
    fn merge_with_sibling(&mut self, node: NodeRef<K, V>, sibling: Sibling<K, V>) -> NodeRef<K, V> {
        let (lower, upper) = if sibling.precedes {
            (sibling.node, node)
        } else {
            (node, sibling.node)
        };

        let (separator, removed) = self
            .branch_mut(sibling.parent)
            .remove_child(sibling.separator + 1);
        debug_assert!(removed == upper);

        match (lower, upper) {
            (NodeRef::Leaf(lower, _), NodeRef::Leaf(upper, _)) => {
                self.merge_leaves(lower, upper);
            }
            (NodeRef::Branch(lower, _), NodeRef::Branch(upper, _)) => {
                self.merge_branches(lower, separator, upper);
            }
            _ => unreachable!("siblings {} and {} are at different depths", lower.id(), upper.id()),
        }

        NodeRef::branch(sibling.parent)
    }

    fn merge_leaves(&mut self, lower: NodeId, upper: NodeId) {
        let (keys, values, next) = self.leaf_mut(upper).extract_all();
        {
            let lower_leaf = self.leaf_mut(lower);
            lower_leaf.absorb(keys, values);
            lower_leaf.next = next;
        }
        if next != NULL_NODE {
            self.leaf_mut(next).prev = lower;
        }
        self.free_leaf(upper);

        trace!(
            target: "bplustree_index::delete",
            into = lower,
            from = upper,
            "merged leaves"
        );
    }

    /// Merge branch `upper` into `lower`, pulling down the separator that
    /// stood between them.
    fn merge_branches(&mut self, lower: NodeId, separator: K, upper: NodeId) {
        let (keys, children) = self.branch_mut(upper).extract_all();
        for child in &children {
            self.set_parent(*child, lower);
        }
        self.branch_mut(lower).absorb(separator, keys, children);
        self.free_branch(upper);

        trace!(
            target: "bplustree_index::delete",
            into = lower,
            from = upper,
            "merged branches"
        );
    }

    /// Move one entry from the sibling into `node` and fix the separator
    /// between them.
    fn borrow_from_sibling(&mut self, node: NodeRef<K, V>, sibling: Sibling<K, V>) {
        match (node, sibling.node) {
            (NodeRef::Leaf(id, _), NodeRef::Leaf(from, _)) => {
                let new_separator = if sibling.precedes {
                    let (key, value) = self
                        .leaf_mut(from)
                        .pop_last()
                        .unwrap_or_else(|| unreachable!("lending leaf {} is empty", from));
                    let leaf = self.leaf_mut(id);
                    leaf.accept_from_left(key, value);
                    leaf.keys[0].clone()
                } else {
                    let (key, value) = self
                        .leaf_mut(from)
                        .pop_first()
                        .unwrap_or_else(|| unreachable!("lending leaf {} is empty", from));
                    self.leaf_mut(id).accept_from_right(key, value);
                    self.leaf(from).keys[0].clone()
                };
                self.branch_mut(sibling.parent).keys[sibling.separator] = new_separator;
            }
            (NodeRef::Branch(id, _), NodeRef::Branch(from, _)) => {
                let lent = if sibling.precedes {
                    self.branch_mut(from).pop_last()
                } else {
                    self.branch_mut(from).pop_first()
                };
                let (key, child) =
                    lent.unwrap_or_else(|| unreachable!("lending branch {} has no spare child", from));
                let separator = std::mem::replace(
                    &mut self.branch_mut(sibling.parent).keys[sibling.separator],
                    key,
                );
                if sibling.precedes {
                    self.branch_mut(id).accept_from_left(separator, child);
                } else {
                    self.branch_mut(id).accept_from_right(separator, child);
                }
                self.set_parent(child, id);
            }
            _ => unreachable!(
                "siblings {} and {} are at different depths",
                node.id(),
                sibling.node.id()
            ),
        }

        trace!(
            target: "bplustree_index::delete",
            node = node.id(),
            from = sibling.node.id(),
            from_left = sibling.precedes,
            "borrowed entry"
        );
    }

    /// Replace a root branch that has a single child by that child.
    fn collapse_root(&mut self, root_id: NodeId) {
        let child = self.branch(root_id).children[0];
        self.set_parent(child, NULL_NODE);
        self.free_branch(root_id);
        self.root = child;

        trace!(
            target: "bplustree_index::delete",
            old_root = root_id,
            new_root = child.id(),
            "collapsed root"
        );
    }
}
