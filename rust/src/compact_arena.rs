//! Compact arena storing tree nodes behind stable `NodeId` handles.
//!
//! Slots are plain `Vec<T>` entries with a separate allocation mask and free
//! list, so a freed slot is reused by the next allocation without shifting any
//! other node.

use std::convert::TryFrom;

use crate::types::{BPlusTreeIndex, BranchNode, LeafNode, NodeId, NULL_NODE};

/// Statistics for a compact arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompactArenaStats {
    pub total_slots: usize,
    pub allocated_count: usize,
    pub free_count: usize,
    pub utilization: f64,
}

/// Compact arena allocator with a free list for slot reuse.
#[derive(Debug)]
pub struct CompactArena<T> {
    /// Direct storage without Option wrapper
    storage: Vec<T>,
    /// Free slot indices for reuse
    free_list: Vec<usize>,
    /// Track which slots are actually allocated
    allocated_mask: Vec<bool>,
    /// Number of allocated slots
    live: usize,
}

impl<T> CompactArena<T> {
    /// Create a new empty compact arena
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            free_list: Vec::new(),
            allocated_mask: Vec::new(),
            live: 0,
        }
    }

    /// Allocate a new item in the arena and return its ID.
    ///
    /// # Panics
    ///
    /// Panics if the arena already spans every `NodeId` below `NULL_NODE`.
    /// Callers budget allocations up front, so this is never reached through
    /// the public tree API.
    #[inline]
    pub fn allocate(&mut self, item: T) -> NodeId {
        let index = if let Some(free_index) = self.free_list.pop() {
            // Reuse a free slot
            self.storage[free_index] = item;
            self.allocated_mask[free_index] = true;
            free_index
        } else {
            let index = self.storage.len();
            assert!(index < NULL_NODE as usize, "arena exhausted the NodeId space");
            self.storage.push(item);
            self.allocated_mask.push(true);
            index
        };
        self.live += 1;

        index as NodeId
    }

    /// Deallocate an item from the arena and return it
    #[inline]
    pub fn deallocate(&mut self, id: NodeId) -> Option<T>
    where
        T: Default,
    {
        let index = self.slot(id)?;

        self.allocated_mask[index] = false;
        self.free_list.push(index);
        self.live -= 1;

        Some(std::mem::take(&mut self.storage[index]))
    }

    /// Get a reference to an item in the arena
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slot(id).map(|index| &self.storage[index])
    }

    /// Get a mutable reference to an item in the arena
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slot(id).map(|index| &mut self.storage[index])
    }

    /// Check if an ID is valid and allocated
    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    /// Storage index of an allocated ID
    fn slot(&self, id: NodeId) -> Option<usize> {
        if id == NULL_NODE {
            return None;
        }
        let index = usize::try_from(id).ok()?;
        self.allocated_mask
            .get(index)
            .copied()
            .unwrap_or(false)
            .then_some(index)
    }

    /// Get arena statistics
    pub fn stats(&self) -> CompactArenaStats {
        let total_slots = self.storage.len();
        let utilization = if total_slots > 0 {
            self.live as f64 / total_slots as f64
        } else {
            0.0
        };

        CompactArenaStats {
            total_slots,
            allocated_count: self.live,
            free_count: self.free_list.len(),
            utilization,
        }
    }

    /// Get the number of allocated items
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Clear all items from the arena
    pub fn clear(&mut self) {
        self.storage.clear();
        self.allocated_mask.clear();
        self.free_list.clear();
        self.live = 0;
    }

    /// Get the number of free slots
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }
}

impl<T> Default for CompactArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// BPLUSTREE ARENA ALLOCATION HELPERS
// ============================================================================

impl<K, V> BPlusTreeIndex<K, V> {
    /// Allocate a new leaf node in the arena and return its ID.
    #[inline]
    pub(crate) fn allocate_leaf(&mut self, leaf: LeafNode<K, V>) -> NodeId {
        self.leaf_arena.allocate(leaf)
    }

    /// Allocate a new branch node in the arena and return its ID.
    #[inline]
    pub(crate) fn allocate_branch(&mut self, branch: BranchNode<K, V>) -> NodeId {
        self.branch_arena.allocate(branch)
    }

    /// Release a leaf that has been emptied by a merge.
    #[inline]
    pub(crate) fn free_leaf(&mut self, id: NodeId) -> Option<LeafNode<K, V>> {
        self.leaf_arena.deallocate(id)
    }

    /// Release a branch that has been emptied by a merge or root collapse.
    #[inline]
    pub(crate) fn free_branch(&mut self, id: NodeId) -> Option<BranchNode<K, V>> {
        self.branch_arena.deallocate(id)
    }

    /// Number of live nodes across both arenas.
    pub fn allocated_node_count(&self) -> usize {
        self.leaf_arena.len() + self.branch_arena.len()
    }

    /// Get statistics for the leaf node arena.
    pub fn leaf_arena_stats(&self) -> CompactArenaStats {
        self.leaf_arena.stats()
    }

    /// Get statistics for the branch node arena.
    pub fn branch_arena_stats(&self) -> CompactArenaStats {
        self.branch_arena.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_arena_basic_operations() {
        let mut arena = CompactArena::new();

        let id1 = arena.allocate(42);
        let id2 = arena.allocate(84);
        let id3 = arena.allocate(126);

        assert_eq!(arena.get(id1), Some(&42));
        assert_eq!(arena.get(id2), Some(&84));
        assert_eq!(arena.get(id3), Some(&126));

        assert!(arena.contains(id1));
        assert!(arena.contains(id2));
        assert!(arena.contains(id3));
        assert!(!arena.contains(NULL_NODE));
        assert_eq!(arena.get(NULL_NODE), None);

        let stats = arena.stats();
        assert_eq!(stats.allocated_count, 3);
        assert_eq!(stats.free_count, 0);
        assert_eq!(stats.total_slots, 3);
    }

    #[test]
    fn test_deallocate_and_reuse_slot() {
        let mut arena: CompactArena<i32> = CompactArena::new();

        let id1 = arena.allocate(42);
        let id2 = arena.allocate(84);

        assert_eq!(arena.deallocate(id1), Some(42));
        assert!(!arena.contains(id1));
        assert!(arena.contains(id2));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.free_count(), 1);

        // Double free is rejected
        assert_eq!(arena.deallocate(id1), None);

        // The freed slot is reused
        let id3 = arena.allocate(168);
        assert_eq!(id3, id1);
        assert_eq!(arena.get(id3), Some(&168));

        let stats = arena.stats();
        assert_eq!(stats.allocated_count, 2);
        assert_eq!(stats.free_count, 0);
    }

    #[test]
    fn test_get_mut_and_clear() {
        let mut arena = CompactArena::new();
        let id = arena.allocate(String::from("leaf"));
        if let Some(item) = arena.get_mut(id) {
            item.push_str("-node");
        }
        assert_eq!(arena.get(id).map(String::as_str), Some("leaf-node"));

        arena.clear();
        assert!(arena.is_empty());
        assert!(!arena.contains(id));
        assert_eq!(arena.stats().utilization, 0.0);
    }

    #[test]
    fn test_tree_reuses_freed_slots_after_drain() {
        let mut tree = BPlusTreeIndex::<i64, u64>::new(3).unwrap();
        for key in 0..60 {
            tree.insert(key, key as u64).unwrap();
        }
        let leaves = tree.leaf_arena_stats();
        let branches = tree.branch_arena_stats();
        assert_eq!(leaves.allocated_count, tree.leaf_count());
        assert_eq!(leaves.utilization, 1.0);
        assert_eq!(branches.free_count, 0);

        for key in 0..60 {
            tree.delete(&key, &(key as u64)).unwrap();
        }
        let drained = tree.leaf_arena_stats();
        assert_eq!(drained.allocated_count, 1);
        assert_eq!(drained.total_slots, leaves.total_slots);
        assert_eq!(drained.free_count, leaves.total_slots - 1);
        assert_eq!(tree.branch_arena_stats().allocated_count, 0);
        assert_eq!(tree.branch_arena_stats().free_count, branches.total_slots);

        // Refilling draws from the free lists instead of growing storage
        for key in 0..60 {
            tree.insert(key, key as u64).unwrap();
        }
        assert_eq!(tree.leaf_arena_stats(), leaves);
        assert_eq!(tree.branch_arena_stats(), branches);
    }
}
