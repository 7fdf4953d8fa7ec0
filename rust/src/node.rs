//! Node implementations for BPlusTreeIndex.
//!
//! Node-local operations only: occupancy queries, sorted insertion and
//! removal, split halves, and the entry moves used by borrowing and merging.
//! Anything that changes which branch lists a node lives on the tree, next to
//! the parent-id update that has to accompany it.

use crate::types::{BranchNode, LeafNode, NodeId, NodeRef, NULL_NODE};

/// Index of the first key `>= target`, or `keys.len()` if every key is
/// smaller.
///
/// # Examples
///
/// ```
/// use bplustree_index::first_index_ge;
///
/// assert_eq!(first_index_ge(&[10, 20, 20, 30], &20), 1);
/// assert_eq!(first_index_ge(&[10, 20, 30], &5), 0);
/// assert_eq!(first_index_ge(&[10, 20, 30], &31), 3);
/// ```
#[inline]
pub fn first_index_ge<K: Ord>(keys: &[K], target: &K) -> usize {
    keys.partition_point(|key| key < target)
}

/// Minimum entries of a non-root node with fanout `capacity`: `ceil(M/2)`.
#[inline]
pub(crate) fn min_entries(capacity: usize) -> usize {
    capacity.div_ceil(2)
}

// ============================================================================
// LEAF NODE IMPLEMENTATION
// ============================================================================

impl<K, V> LeafNode<K, V> {
    /// Returns the number of records in this leaf.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this leaf holds no records.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of keys; for a leaf this is the record count.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Record references, aligned with [`keys`](Self::keys).
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Returns true if no branch lists this leaf.
    pub fn is_root(&self) -> bool {
        self.parent == NULL_NODE
    }

    /// Returns true if this leaf holds `capacity` records.
    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.capacity
    }

    /// Minimum records of a non-root leaf.
    pub fn min_entries(&self) -> usize {
        min_entries(self.capacity)
    }

    /// Root leaves have no lower bound; other leaves need `ceil(M/2)` records.
    pub fn is_sufficiently_occupied(&self) -> bool {
        self.is_root() || self.keys.len() >= self.min_entries()
    }

    /// Insert a record at `index`, shifting later records right.
    pub(crate) fn insert_at(&mut self, index: usize, key: K, value: V) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    /// Remove the record at `index`, shifting later records left.
    pub(crate) fn remove_at(&mut self, index: usize) -> (K, V) {
        (self.keys.remove(index), self.values.remove(index))
    }

    /// Remove and return the highest record (lending to the next sibling).
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        let key = self.keys.pop()?;
        let value = self.values.pop()?;
        Some((key, value))
    }

    /// Remove and return the lowest record (lending to the previous sibling).
    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        if self.keys.is_empty() {
            return None;
        }
        Some(self.remove_at(0))
    }

    /// Accept a borrowed record at the beginning (from the previous sibling)
    pub(crate) fn accept_from_left(&mut self, key: K, value: V) {
        self.insert_at(0, key, value);
    }

    /// Accept a borrowed record at the end (from the next sibling)
    pub(crate) fn accept_from_right(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    /// Extract all records and the successor link (used for merging)
    pub(crate) fn extract_all(&mut self) -> (Vec<K>, Vec<V>, NodeId) {
        let keys = std::mem::take(&mut self.keys);
        let values = std::mem::take(&mut self.values);
        let next = self.next;
        self.next = NULL_NODE;
        self.prev = NULL_NODE;
        (keys, values, next)
    }

    /// Append the records of the higher-keyed sibling being merged away.
    pub(crate) fn absorb(&mut self, mut keys: Vec<K>, mut values: Vec<V>) {
        self.keys.append(&mut keys);
        self.values.append(&mut values);
    }
}

impl<K: Ord, V: PartialEq> LeafNode<K, V> {
    /// First record stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let index = first_index_ge(&self.keys, key);
        match self.keys.get(index) {
            Some(found) if found == key => Some(&self.values[index]),
            _ => None,
        }
    }

    /// Index of the record `(key, value)`. Equal keys are scanned in order
    /// and the value picks among them.
    pub fn position_of(&self, key: &K, value: &V) -> Option<usize> {
        let start = first_index_ge(&self.keys, key);
        self.keys[start..]
            .iter()
            .take_while(|candidate| *candidate == key)
            .zip(&self.values[start..])
            .position(|(_, candidate)| candidate == value)
            .map(|offset| start + offset)
    }

    /// Insert before any records with an equal key, keeping keys ascending.
    ///
    /// The leaf must not be full.
    pub(crate) fn insert_sorted(&mut self, key: K, value: V) {
        debug_assert!(!self.is_full(), "insert into a full leaf");
        let index = first_index_ge(&self.keys, &key);
        self.insert_at(index, key, value);
    }

    /// Split a full leaf around the incoming record.
    ///
    /// The `M + 1` records (existing plus new, in key order) are divided so
    /// that this leaf keeps `floor((M+1)/2)` and the returned leaf receives
    /// the rest. The returned leaf is not linked into the chain or the tree.
    pub(crate) fn split_with(&mut self, key: K, value: V) -> LeafNode<K, V> {
        debug_assert!(self.is_full(), "only a full leaf is split");
        let index = first_index_ge(&self.keys, &key);
        self.insert_at(index, key, value);

        let keep = self.keys.len() / 2;
        let mut right = LeafNode::new(self.capacity);
        right.keys = self.keys.split_off(keep);
        right.values = self.values.split_off(keep);
        right
    }
}

// ============================================================================
// BRANCH NODE IMPLEMENTATION
// ============================================================================

impl<K, V> BranchNode<K, V> {
    /// Number of children (the branch's entry count).
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of separator keys: one fewer than the children.
    pub fn key_count(&self) -> usize {
        self.children.len().saturating_sub(1)
    }

    /// Separator keys in ascending order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Child references, one more than [`keys`](Self::keys).
    pub fn children(&self) -> &[NodeRef<K, V>] {
        &self.children
    }

    /// Returns true if no branch lists this branch.
    pub fn is_root(&self) -> bool {
        self.parent == NULL_NODE
    }

    /// Returns true if this branch has `capacity` children.
    pub fn is_full(&self) -> bool {
        self.children.len() >= self.capacity
    }

    /// Minimum children of a non-root branch.
    pub fn min_entries(&self) -> usize {
        min_entries(self.capacity)
    }

    /// A root branch needs two children; other branches need `ceil(M/2)`.
    pub fn is_sufficiently_occupied(&self) -> bool {
        if self.is_root() {
            self.children.len() >= 2
        } else {
            self.children.len() >= self.min_entries()
        }
    }

    /// Position of `child` among this branch's children.
    pub fn position_of_child(&self, child: NodeRef<K, V>) -> Option<usize> {
        self.children.iter().position(|candidate| *candidate == child)
    }

    /// Insert `key` at `index` and `child` right after the child at `index`.
    pub(crate) fn insert_child_after(&mut self, index: usize, key: K, child: NodeRef<K, V>) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
    }

    /// Remove the child at `index` (never the first) together with the
    /// separator to its left.
    pub(crate) fn remove_child(&mut self, index: usize) -> (K, NodeRef<K, V>) {
        debug_assert!(index > 0, "the first child has no separator to its left");
        let key = self.keys.remove(index - 1);
        let child = self.children.remove(index);
        (key, child)
    }

    /// Split an overfull branch holding `M + 1` children.
    ///
    /// This branch keeps `floor((M+1)/2)` children and one fewer key; the
    /// returned branch takes the remaining children and the keys between
    /// them. The last key of this branch's share is removed and returned as
    /// the key to promote.
    pub(crate) fn split_overfull(&mut self) -> (BranchNode<K, V>, K) {
        debug_assert_eq!(self.children.len(), self.capacity + 1);
        let keep = self.children.len() / 2;

        let mut right = BranchNode::new(self.capacity);
        right.children = self.children.split_off(keep);
        right.keys = self.keys.split_off(keep);
        let promoted = self
            .keys
            .pop()
            .unwrap_or_else(|| unreachable!("a branch with {} children has a separator", keep));

        (right, promoted)
    }

    /// Remove and return the last separator and child (lending to the next
    /// sibling).
    pub(crate) fn pop_last(&mut self) -> Option<(K, NodeRef<K, V>)> {
        let key = self.keys.pop()?;
        let child = self.children.pop()?;
        Some((key, child))
    }

    /// Remove and return the first child and the separator after it (lending
    /// to the previous sibling).
    pub(crate) fn pop_first(&mut self) -> Option<(K, NodeRef<K, V>)> {
        if self.keys.is_empty() {
            return None;
        }
        Some((self.keys.remove(0), self.children.remove(0)))
    }

    /// Accept a borrowed child at the beginning (from the previous sibling).
    /// The old parent separator becomes this branch's first key.
    pub(crate) fn accept_from_left(&mut self, separator: K, moved_child: NodeRef<K, V>) {
        self.keys.insert(0, separator);
        self.children.insert(0, moved_child);
    }

    /// Accept a borrowed child at the end (from the next sibling).
    /// The old parent separator becomes this branch's last key.
    pub(crate) fn accept_from_right(&mut self, separator: K, moved_child: NodeRef<K, V>) {
        self.keys.push(separator);
        self.children.push(moved_child);
    }

    /// Extract all keys and children (used for merging)
    pub(crate) fn extract_all(&mut self) -> (Vec<K>, Vec<NodeRef<K, V>>) {
        (
            std::mem::take(&mut self.keys),
            std::mem::take(&mut self.children),
        )
    }

    /// Append the higher-keyed sibling's contents, with the parent separator
    /// between the two key runs.
    pub(crate) fn absorb(
        &mut self,
        separator: K,
        mut keys: Vec<K>,
        mut children: Vec<NodeRef<K, V>>,
    ) {
        self.keys.push(separator);
        self.keys.append(&mut keys);
        self.children.append(&mut children);
    }
}

impl<K: Ord, V> BranchNode<K, V> {
    /// Find the index of the child that should contain the given key.
    ///
    /// Equal keys route right: a key equal to separator `i` belongs to child
    /// `i + 1`.
    pub fn find_child_index(&self, key: &K) -> usize {
        let index = first_index_ge(&self.keys, key);
        if index == self.keys.len() {
            index
        } else if self.keys[index] == *key {
            index + 1
        } else {
            index
        }
    }
}
