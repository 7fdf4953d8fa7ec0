//! GET operations for BPlusTreeIndex.
//!
//! This module contains the read path of the index (descending from the root
//! to the leaf a key routes to) and the node accessors shared by the
//! insert and delete paths.

use crate::types::{BPlusTreeIndex, BranchNode, LeafNode, LeafRef, NodeId, NodeRef, NULL_NODE};

impl<K: Ord, V: PartialEq> BPlusTreeIndex<K, V> {
    // ============================================================================
    // PUBLIC GET OPERATIONS
    // ============================================================================

    /// Find the leaf that would contain `key`.
    ///
    /// At each branch the search takes the child left of the first separator
    /// greater than `key`; a separator equal to `key` sends it right. The
    /// returned leaf may or may not actually hold `key`, and an empty tree
    /// returns its empty root leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTreeIndex;
    ///
    /// let mut tree = BPlusTreeIndex::<i64, u64>::new(4).unwrap();
    /// for key in [10, 20, 30, 40, 50] {
    ///     tree.insert(key, key as u64).unwrap();
    /// }
    /// let leaf = tree.lookup_leaf(&30);
    /// assert!(leaf.contains_key(&30));
    /// assert!(!tree.lookup_leaf(&35).contains_key(&35));
    /// ```
    pub fn lookup_leaf(&self, key: &K) -> LeafRef<'_, K, V> {
        let id = self.find_leaf_id(key);
        LeafRef {
            id,
            leaf: self.leaf(id),
        }
    }

    /// Get the first record stored under `key` in the leaf `key` routes to.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTreeIndex;
    ///
    /// let mut tree = BPlusTreeIndex::<i64, u64>::new(4).unwrap();
    /// tree.insert(1, 100).unwrap();
    /// assert_eq!(tree.get(&1), Some(&100));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        self.leaf(self.find_leaf_id(key)).get(key)
    }

    /// Check if `key` has at least one record.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Check if the exact record `(key, value)` is indexed.
    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.leaf(self.find_leaf_id(key))
            .position_of(key, value)
            .is_some()
    }

    // ============================================================================
    // PRIVATE HELPER METHODS FOR GET OPERATIONS
    // ============================================================================

    /// Descend from the root to the leaf `key` routes to.
    pub(crate) fn find_leaf_id(&self, key: &K) -> NodeId {
        let mut node = self.root;
        loop {
            match node {
                NodeRef::Leaf(id, _) => return id,
                NodeRef::Branch(id, _) => {
                    let branch = self.branch(id);
                    node = branch.children[branch.find_child_index(key)];
                }
            }
        }
    }
}

impl<K, V> BPlusTreeIndex<K, V> {
    // ============================================================================
    // ARENA ACCESS METHODS
    // ============================================================================

    /// Get a reference to a leaf node in the arena.
    pub fn get_leaf(&self, id: NodeId) -> Option<&LeafNode<K, V>> {
        self.leaf_arena.get(id)
    }

    /// Get a reference to a branch node in the arena.
    pub fn get_branch(&self, id: NodeId) -> Option<&BranchNode<K, V>> {
        self.branch_arena.get(id)
    }

    /// Get the next pointer of a leaf node in the arena.
    pub fn get_leaf_next(&self, id: NodeId) -> Option<NodeId> {
        self.get_leaf(id)
            .map(|leaf| leaf.next)
            .filter(|&next| next != NULL_NODE)
    }

    // The accessors below are for IDs the tree itself handed out. A missing
    // node there means the structure is already broken, so they panic.

    pub(crate) fn leaf(&self, id: NodeId) -> &LeafNode<K, V> {
        self.leaf_arena
            .get(id)
            .unwrap_or_else(|| panic!("leaf {} is not allocated", id))
    }

    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> &mut LeafNode<K, V> {
        self.leaf_arena
            .get_mut(id)
            .unwrap_or_else(|| panic!("leaf {} is not allocated", id))
    }

    pub(crate) fn branch(&self, id: NodeId) -> &BranchNode<K, V> {
        self.branch_arena
            .get(id)
            .unwrap_or_else(|| panic!("branch {} is not allocated", id))
    }

    pub(crate) fn branch_mut(&mut self, id: NodeId) -> &mut BranchNode<K, V> {
        self.branch_arena
            .get_mut(id)
            .unwrap_or_else(|| panic!("branch {} is not allocated", id))
    }

    // ============================================================================
    // PARENT AND OCCUPANCY HELPERS
    // ============================================================================

    /// Branch listing `node` as a child, `NULL_NODE` for the root.
    pub(crate) fn parent_of(&self, node: NodeRef<K, V>) -> NodeId {
        match node {
            NodeRef::Leaf(id, _) => self.leaf(id).parent,
            NodeRef::Branch(id, _) => self.branch(id).parent,
        }
    }

    pub(crate) fn set_parent(&mut self, node: NodeRef<K, V>, parent: NodeId) {
        match node {
            NodeRef::Leaf(id, _) => self.leaf_mut(id).parent = parent,
            NodeRef::Branch(id, _) => self.branch_mut(id).parent = parent,
        }
    }

    /// Parent of a non-root `node` and its position among the parent's
    /// children.
    pub(crate) fn locate_in_parent(&self, node: NodeRef<K, V>) -> (NodeId, usize) {
        let parent = self.parent_of(node);
        let index = self
            .branch(parent)
            .position_of_child(node)
            .unwrap_or_else(|| panic!("node {} is not listed by its parent {}", node.id(), parent));
        (parent, index)
    }

    /// Records in a leaf, children in a branch.
    pub(crate) fn entry_count(&self, node: NodeRef<K, V>) -> usize {
        match node {
            NodeRef::Leaf(id, _) => self.leaf(id).len(),
            NodeRef::Branch(id, _) => self.branch(id).len(),
        }
    }

    pub(crate) fn is_sufficiently_occupied(&self, node: NodeRef<K, V>) -> bool {
        match node {
            NodeRef::Leaf(id, _) => self.leaf(id).is_sufficiently_occupied(),
            NodeRef::Branch(id, _) => self.branch(id).is_sufficiently_occupied(),
        }
    }
}
