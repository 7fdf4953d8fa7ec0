//! Iterator implementations for BPlusTreeIndex.
//!
//! Every iterator here walks the leaf chain from the first leaf, so a full
//! scan touches each leaf once and never revisits a branch.

use crate::types::{BPlusTreeIndex, LeafNode, LeafRef, NodeId, NULL_NODE};

// ============================================================================
// ITERATOR STRUCTS
// ============================================================================

/// Iterator over key-record pairs in key order using the leaf linked list.
pub struct ItemIterator<'a, K, V> {
    leaves: LeafIterator<'a, K, V>,
    current_leaf_ref: Option<&'a LeafNode<K, V>>,
    current_leaf_index: usize,
}

/// Iterator over keys in the B+ tree.
pub struct KeyIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
}

/// Iterator over record references in key order.
pub struct ValueIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
}

/// Iterator over the leaves themselves, first to last along the chain.
pub struct LeafIterator<'a, K, V> {
    tree: &'a BPlusTreeIndex<K, V>,
    next_leaf_id: NodeId,
}

// ============================================================================
// BPLUSTREE ITERATOR METHODS
// ============================================================================

impl<K, V> BPlusTreeIndex<K, V> {
    /// Returns an iterator over all key-record pairs in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTreeIndex;
    ///
    /// let mut tree = BPlusTreeIndex::<i64, u64>::new(4).unwrap();
    /// for key in [30, 10, 20] {
    ///     tree.insert(key, key as u64 * 10).unwrap();
    /// }
    /// let items: Vec<_> = tree.items().collect();
    /// assert_eq!(items, vec![(&10, &100), (&20, &200), (&30, &300)]);
    /// ```
    pub fn items(&self) -> ItemIterator<'_, K, V> {
        ItemIterator::new(self)
    }

    /// Returns an iterator over all keys in order, duplicates included.
    pub fn keys(&self) -> KeyIterator<'_, K, V> {
        KeyIterator {
            items: ItemIterator::new(self),
        }
    }

    /// Returns an iterator over all record references in key order.
    pub fn values(&self) -> ValueIterator<'_, K, V> {
        ValueIterator {
            items: ItemIterator::new(self),
        }
    }

    /// Returns an iterator over the leaves along the chain.
    pub fn leaves(&self) -> LeafIterator<'_, K, V> {
        LeafIterator {
            tree: self,
            next_leaf_id: self.first_leaf_id(),
        }
    }
}

// ============================================================================
// LEAFITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K, V> Iterator for LeafIterator<'a, K, V> {
    type Item = LeafRef<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_leaf_id == NULL_NODE {
            return None;
        }
        let id = self.next_leaf_id;
        let leaf = self.tree.leaf(id);
        self.next_leaf_id = leaf.next;
        Some(LeafRef { id, leaf })
    }
}

// ============================================================================
// ITEMITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K, V> ItemIterator<'a, K, V> {
    pub fn new(tree: &'a BPlusTreeIndex<K, V>) -> Self {
        let mut leaves = tree.leaves();
        let current_leaf_ref = leaves.next().map(|leaf| leaf.leaf);
        Self {
            leaves,
            current_leaf_ref,
            current_leaf_index: 0,
        }
    }
}

impl<'a, K, V> Iterator for ItemIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.current_leaf_ref?;
            if self.current_leaf_index < leaf.keys.len() {
                let index = self.current_leaf_index;
                self.current_leaf_index += 1;
                return Some((&leaf.keys[index], &leaf.values[index]));
            }
            // Cached leaf exhausted; the chain is the only way forward
            self.current_leaf_ref = self.leaves.next().map(|next| next.leaf);
            self.current_leaf_index = 0;
        }
    }
}

// ============================================================================
// KEYITERATOR / VALUEITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K, V> Iterator for KeyIterator<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(k, _)| k)
    }
}

impl<'a, K, V> Iterator for ValueIterator<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(_, v)| v)
    }
}
