//! Validation utilities for BPlusTreeIndex.
//!
//! The checker walks the whole tree and reports the first broken invariant:
//! key order and separator bounds, occupancy, uniform leaf depth, parent
//! links, the doubly linked leaf chain, and agreement between the tree and its
//! arenas.

use crate::error::{BPlusTreeError, BTreeResult, TreeResult};
use crate::node::min_entries;
use crate::types::{BPlusTreeIndex, NodeId, NodeRef, NULL_NODE};

/// Key range a subtree must respect: `[lower, upper)`, either side open.
struct KeyBounds<'a, K> {
    lower: Option<&'a K>,
    upper: Option<&'a K>,
}

impl<K: Ord> KeyBounds<'_, K> {
    fn admits(&self, key: &K) -> bool {
        self.lower.map_or(true, |lower| key >= lower) && self.upper.map_or(true, |upper| key < upper)
    }
}

/// State gathered while walking the tree.
struct Walk {
    leaf_depth: Option<usize>,
    leaves_in_order: Vec<NodeId>,
}

// ============================================================================
// VALIDATION METHODS
// ============================================================================

impl<K: Ord, V> BPlusTreeIndex<K, V> {
    /// Check if the tree maintains B+ tree invariants.
    /// Returns true if all invariants are satisfied.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check invariants with detailed error reporting.
    ///
    /// Content problems inside a node are reported as
    /// `BPlusTreeError::DataIntegrityError`; broken links between nodes and
    /// arena mismatches as `BPlusTreeError::CorruptedTree`.
    pub fn check_invariants_detailed(&self) -> BTreeResult<()> {
        let mut walk = Walk {
            leaf_depth: None,
            leaves_in_order: Vec::new(),
        };
        let unbounded = KeyBounds {
            lower: None,
            upper: None,
        };
        self.check_node(self.root, NULL_NODE, unbounded, 0, &mut walk)?;

        self.check_leaf_chain(&walk.leaves_in_order)?;
        self.check_arena_tree_consistency()
    }

    /// Alias for check_invariants_detailed (for test compatibility).
    pub fn validate(&self) -> BTreeResult<()> {
        self.check_invariants_detailed()
    }

    /// Recursively check a node and its subtree.
    fn check_node(
        &self,
        node: NodeRef<K, V>,
        expected_parent: NodeId,
        bounds: KeyBounds<'_, K>,
        depth: usize,
        walk: &mut Walk,
    ) -> TreeResult<()> {
        let is_root = expected_parent == NULL_NODE;
        match node {
            NodeRef::Leaf(id, _) => {
                let leaf = self.get_leaf(id).ok_or_else(|| {
                    BPlusTreeError::corrupted_tree("Arena", &format!("leaf {} is not allocated", id))
                })?;
                let context = format!("Leaf {}", id);

                if leaf.parent != expected_parent {
                    return Err(BPlusTreeError::corrupted_tree(
                        "Parent link",
                        &format!("leaf {} names {}, listed by {}", id, leaf.parent, expected_parent),
                    ));
                }
                if leaf.keys.len() != leaf.values.len() {
                    return Err(BPlusTreeError::data_integrity(
                        &context,
                        &format!("{} keys but {} values", leaf.keys.len(), leaf.values.len()),
                    ));
                }
                if leaf.keys.windows(2).any(|pair| pair[0] > pair[1]) {
                    return Err(BPlusTreeError::data_integrity(&context, "keys out of order"));
                }
                if leaf.len() > self.capacity {
                    return Err(BPlusTreeError::data_integrity(
                        &context,
                        &format!("{} records exceed capacity {}", leaf.len(), self.capacity),
                    ));
                }
                if !is_root && leaf.len() < min_entries(self.capacity) {
                    return Err(BPlusTreeError::data_integrity(
                        &context,
                        &format!("underfull with {} records", leaf.len()),
                    ));
                }
                if !leaf.keys.iter().all(|key| bounds.admits(key)) {
                    return Err(BPlusTreeError::data_integrity(
                        &context,
                        "key outside the range of its parent separators",
                    ));
                }

                match walk.leaf_depth {
                    None => walk.leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        return Err(BPlusTreeError::data_integrity(
                            &context,
                            &format!("at depth {}, other leaves at depth {}", depth, expected),
                        ));
                    }
                    Some(_) => {}
                }
                walk.leaves_in_order.push(id);
                Ok(())
            }
            NodeRef::Branch(id, _) => {
                let branch = self.get_branch(id).ok_or_else(|| {
                    BPlusTreeError::corrupted_tree("Arena", &format!("branch {} is not allocated", id))
                })?;
                let context = format!("Branch {}", id);

                if branch.parent != expected_parent {
                    return Err(BPlusTreeError::corrupted_tree(
                        "Parent link",
                        &format!(
                            "branch {} names {}, listed by {}",
                            id, branch.parent, expected_parent
                        ),
                    ));
                }
                if branch.keys.len() + 1 != branch.children.len() {
                    return Err(BPlusTreeError::data_integrity(
                        &context,
                        &format!(
                            "{} keys for {} children",
                            branch.keys.len(),
                            branch.children.len()
                        ),
                    ));
                }
                if branch.keys.windows(2).any(|pair| pair[0] >= pair[1]) {
                    return Err(BPlusTreeError::data_integrity(&context, "separators out of order"));
                }
                if !branch.keys.iter().all(|key| bounds.admits(key)) {
                    return Err(BPlusTreeError::data_integrity(
                        &context,
                        "separator outside the range of its parent separators",
                    ));
                }
                let children = branch.children.len();
                let minimum = if is_root { 2 } else { min_entries(self.capacity) };
                if children > self.capacity || children < minimum {
                    return Err(BPlusTreeError::data_integrity(
                        &context,
                        &format!(
                            "{} children outside {}..={}",
                            children, minimum, self.capacity
                        ),
                    ));
                }

                for (i, child) in branch.children.iter().enumerate() {
                    let child_bounds = KeyBounds {
                        lower: if i == 0 { bounds.lower } else { Some(&branch.keys[i - 1]) },
                        upper: if i == branch.keys.len() {
                            bounds.upper
                        } else {
                            Some(&branch.keys[i])
                        },
                    };
                    self.check_node(*child, id, child_bounds, depth + 1, walk)?;
                }
                Ok(())
            }
        }
    }

    /// Walk the chain forward from its head and compare it with the leaves
    /// found by descending the tree.
    fn check_leaf_chain(&self, leaves_in_order: &[NodeId]) -> TreeResult<()> {
        let mut previous = NULL_NODE;
        let mut current = leaves_in_order.first().copied().unwrap_or(NULL_NODE);

        for (position, &expected) in leaves_in_order.iter().enumerate() {
            if current != expected {
                return Err(BPlusTreeError::corrupted_tree(
                    "Leaf chain",
                    &format!(
                        "position {} holds leaf {}, tree order has {}",
                        position, current, expected
                    ),
                ));
            }
            let leaf = self.get_leaf(current).ok_or_else(|| {
                BPlusTreeError::corrupted_tree("Leaf chain", &format!("leaf {} is not allocated", current))
            })?;
            if leaf.prev != previous {
                return Err(BPlusTreeError::corrupted_tree(
                    "Leaf chain",
                    &format!("leaf {} links back to {}, expected {}", current, leaf.prev, previous),
                ));
            }
            if let (Some(last), Some(next_first)) = (
                self.get_leaf(previous).and_then(|prev| prev.keys.last()),
                leaf.keys.first(),
            ) {
                if last > next_first {
                    return Err(BPlusTreeError::corrupted_tree(
                        "Leaf chain",
                        &format!("keys descend between leaves {} and {}", previous, current),
                    ));
                }
            }
            previous = current;
            current = leaf.next;
        }

        if current != NULL_NODE {
            return Err(BPlusTreeError::corrupted_tree(
                "Leaf chain",
                &format!("last leaf {} links forward to {}", previous, current),
            ));
        }
        Ok(())
    }

    /// Check that arena allocation matches tree structure
    fn check_arena_tree_consistency(&self) -> TreeResult<()> {
        let (tree_leaf_count, tree_branch_count) = self.count_nodes_in_tree();

        if tree_leaf_count != self.leaf_arena.len() {
            return Err(BPlusTreeError::corrupted_tree(
                "Leaf arena",
                &format!(
                    "{} in tree vs {} in arena",
                    tree_leaf_count,
                    self.leaf_arena.len()
                ),
            ));
        }
        if tree_branch_count != self.branch_arena.len() {
            return Err(BPlusTreeError::corrupted_tree(
                "Branch arena",
                &format!(
                    "{} in tree vs {} in arena",
                    tree_branch_count,
                    self.branch_arena.len()
                ),
            ));
        }
        Ok(())
    }
}
