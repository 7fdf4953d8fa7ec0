//! Construction and initialization logic for BPlusTreeIndex and nodes.
//!
//! This module contains capacity validation, arena initialization, the node
//! budget, and the default implementations.

use crate::compact_arena::CompactArena;
use crate::error::{BPlusTreeError, InitResult};
use crate::types::{
    BPlusTreeIndex, BranchNode, LeafNode, NodeRef, DEFAULT_CAPACITY, MIN_CAPACITY, NULL_NODE,
};

/// Node budget used when none is given: every handle below `NULL_NODE`.
pub const UNLIMITED_NODES: usize = NULL_NODE as usize;

impl<K, V> BPlusTreeIndex<K, V> {
    /// Create an empty index with fanout `capacity`.
    ///
    /// The tree starts as a single empty root leaf.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum records per leaf and children per branch
    ///   (minimum 3)
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTreeIndex;
    ///
    /// let tree = BPlusTreeIndex::<i64, u64>::new(4).unwrap();
    /// assert!(tree.is_empty());
    /// assert!(BPlusTreeIndex::<i64, u64>::new(2).is_err());
    /// ```
    pub fn new(capacity: usize) -> InitResult<Self> {
        Self::with_node_limit(capacity, UNLIMITED_NODES)
    }

    /// Create an index with default capacity.
    ///
    /// This is equivalent to calling `new(DEFAULT_CAPACITY)`.
    pub fn with_default_capacity() -> InitResult<Self> {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Create an index that never holds more than `node_limit` nodes.
    ///
    /// An insert whose splits would push the tree past the limit fails with
    /// `BPlusTreeError::AllocationError` and leaves the tree unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTreeIndex;
    ///
    /// let mut tree = BPlusTreeIndex::<i64, u64>::with_node_limit(3, 1).unwrap();
    /// for key in 0..3 {
    ///     tree.insert(key, key as u64).unwrap();
    /// }
    /// // A fourth record would split the root leaf.
    /// assert!(tree.insert(3, 3).is_err());
    /// assert_eq!(tree.len(), 3);
    /// ```
    pub fn with_node_limit(capacity: usize, node_limit: usize) -> InitResult<Self> {
        validation::validate_capacity(capacity)?;
        if node_limit == 0 || node_limit > UNLIMITED_NODES {
            return Err(BPlusTreeError::InvalidCapacity(format!(
                "Node limit {} is invalid (must be between 1 and {})",
                node_limit, UNLIMITED_NODES
            )));
        }

        Ok(Self::with_empty_root(capacity, node_limit))
    }

    /// Assemble a tree whose root is a fresh empty leaf. Arguments are
    /// already validated.
    fn with_empty_root(capacity: usize, node_limit: usize) -> Self {
        let mut leaf_arena = CompactArena::new();
        let root_id = leaf_arena.allocate(LeafNode::new(capacity));

        Self {
            capacity,
            node_limit,
            root: NodeRef::leaf(root_id),
            leaf_arena,
            branch_arena: CompactArena::new(),
        }
    }

    /// Create an empty index with a fanout sized for `expected_records`.
    ///
    /// ```
    /// use bplustree_index::BPlusTreeIndex;
    ///
    /// let tree = BPlusTreeIndex::<i64, u64>::for_expected_records(50_000);
    /// assert_eq!(tree.capacity(), 32);
    /// ```
    pub fn for_expected_records(expected_records: usize) -> Self {
        Self::with_empty_root(
            validation::recommended_capacity(expected_records),
            UNLIMITED_NODES,
        )
    }

    /// Fanout `M` of this tree.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum number of live nodes this tree may allocate.
    pub fn node_limit(&self) -> usize {
        self.node_limit
    }
}

impl<K, V> LeafNode<K, V> {
    /// Creates a new, unlinked leaf node with the specified capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::LeafNode;
    ///
    /// let leaf: LeafNode<i64, u64> = LeafNode::new(4);
    /// assert!(leaf.is_empty());
    /// assert!(leaf.is_root());
    /// ```
    pub fn new(capacity: usize) -> Self {
        // One spare slot so a full leaf can take the incoming record before
        // it is split.
        Self {
            capacity,
            keys: Vec::with_capacity(capacity + 1),
            values: Vec::with_capacity(capacity + 1),
            parent: NULL_NODE,
            prev: NULL_NODE,
            next: NULL_NODE,
        }
    }
}

impl<K, V> BranchNode<K, V> {
    /// Creates a new branch node with the specified capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BranchNode;
    ///
    /// let branch: BranchNode<i64, u64> = BranchNode::new(4);
    /// assert_eq!(branch.len(), 0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        // Up to `capacity` keys and `capacity + 1` children while splitting
        Self {
            capacity,
            keys: Vec::with_capacity(capacity),
            children: Vec::with_capacity(capacity + 1),
            parent: NULL_NODE,
        }
    }
}

// Default implementations
impl<K, V> Default for BPlusTreeIndex<K, V> {
    /// Create an index with default capacity.
    fn default() -> Self {
        Self::with_empty_root(DEFAULT_CAPACITY, UNLIMITED_NODES)
    }
}

impl<K, V> Default for LeafNode<K, V> {
    /// Create a leaf node with default capacity.
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V> Default for BranchNode<K, V> {
    /// Create a branch node with default capacity.
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Validation utilities for construction
pub mod validation {
    use super::*;

    /// Validate that a capacity is suitable for B+ tree nodes.
    ///
    /// Returns `Ok(())` if valid, `Err(BPlusTreeError)` otherwise.
    pub fn validate_capacity(capacity: usize) -> InitResult<()> {
        if capacity < MIN_CAPACITY {
            Err(BPlusTreeError::invalid_capacity(capacity, MIN_CAPACITY))
        } else {
            Ok(())
        }
    }

    /// Get the recommended capacity for a given expected number of records.
    ///
    /// Small indexes stay at the default fanout; larger ones trade wider
    /// nodes for fewer levels.
    pub fn recommended_capacity(expected_records: usize) -> usize {
        if expected_records < 100 {
            DEFAULT_CAPACITY
        } else if expected_records < 10_000 {
            16
        } else if expected_records < 1_000_000 {
            32
        } else {
            64
        }
    }
}
