//! Core types and data structures for BPlusTreeIndex.
//!
//! This module contains all the fundamental data structures, type definitions,
//! and constants used throughout the B+ tree index.

use std::marker::PhantomData;

use crate::compact_arena::CompactArena;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Minimum fanout for any B+ tree node. Splitting and minimum-occupancy
/// arithmetic need `M > 2`.
pub const MIN_CAPACITY: usize = 3;

/// Fanout used by `with_default_capacity` and `Default`.
pub const DEFAULT_CAPACITY: usize = 4;

// ============================================================================
// TYPE DEFINITIONS
// ============================================================================

/// Node ID type for arena-based allocation
pub type NodeId = u32;

/// Sentinel for "no node": the parent of a root, the ends of the leaf chain.
pub const NULL_NODE: NodeId = u32::MAX;

/// Opaque reference to a record stored outside the index, for example a
/// heap-file page and slot packed into a `u64`.
///
/// The index never looks inside a `RecordRef`; it only compares two of them
/// for identity when deleting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordRef(u64);

impl RecordRef {
    /// Wrap a raw record locator.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw record locator.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordRef {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// An index from fixed-width integer keys to record references.
pub type RecordIndex = BPlusTreeIndex<i64, RecordRef>;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// In-memory B+ tree index.
///
/// Keys live in every node; values live only in leaves. Leaves are linked in
/// key order in both directions, and every node records the branch that lists
/// it as a child, so insertion and deletion can walk back up the tree after
/// descending to a leaf.
///
/// # Type Parameters
///
/// * `K` - Key type, `Ord + Clone`
/// * `V` - Record reference type, `Clone + PartialEq`; values are compared
///   only to pick the entry to delete
///
/// # Examples
///
/// ```
/// use bplustree_index::{RecordIndex, RecordRef};
///
/// let mut index = RecordIndex::new(4).unwrap();
/// index.insert(10, RecordRef::new(100)).unwrap();
/// index.insert(20, RecordRef::new(200)).unwrap();
///
/// let leaf = index.lookup_leaf(&20);
/// assert_eq!(leaf.get(&20), Some(&RecordRef::new(200)));
///
/// index.delete(&10, &RecordRef::new(100)).unwrap();
/// assert_eq!(index.len(), 1);
/// ```
///
/// # Performance Characteristics
///
/// - **Lookup**: O(log_M n) node visits, O(log M) work per visit
/// - **Insertion**: O(log_M n), plus O(M) per split
/// - **Deletion**: O(log_M n), plus O(M) per merge or borrow
#[derive(Debug)]
pub struct BPlusTreeIndex<K, V> {
    /// Fanout `M`: maximum records per leaf and maximum children per branch.
    pub(crate) capacity: usize,
    /// Upper bound on the number of live nodes across both arenas.
    pub(crate) node_limit: usize,
    /// The root node of the tree.
    pub(crate) root: NodeRef<K, V>,
    /// Arena storage for leaf nodes.
    pub(crate) leaf_arena: CompactArena<LeafNode<K, V>>,
    /// Arena storage for branch nodes.
    pub(crate) branch_arena: CompactArena<BranchNode<K, V>>,
}

/// Leaf node containing key-record pairs.
#[derive(Debug, Clone)]
pub struct LeafNode<K, V> {
    /// Maximum number of records this node can hold.
    pub(crate) capacity: usize,
    /// Keys in ascending order.
    pub(crate) keys: Vec<K>,
    /// Record references, index-aligned with `keys`.
    pub(crate) values: Vec<V>,
    /// Branch listing this leaf as a child, `NULL_NODE` for a root leaf.
    pub(crate) parent: NodeId,
    /// Previous leaf in key order.
    pub(crate) prev: NodeId,
    /// Next leaf in key order.
    pub(crate) next: NodeId,
}

/// Internal (branch) node containing separator keys and child references.
#[derive(Debug, Clone)]
pub struct BranchNode<K, V> {
    /// Maximum number of children this node can hold.
    pub(crate) capacity: usize,
    /// Separator keys; always one fewer than `children`.
    pub(crate) keys: Vec<K>,
    /// Child nodes (all leaves or all branches).
    pub(crate) children: Vec<NodeRef<K, V>>,
    /// Branch listing this branch as a child, `NULL_NODE` for the root.
    pub(crate) parent: NodeId,
}

// ============================================================================
// ENUMS AND VIEW TYPES
// ============================================================================

/// Node reference that can be either a leaf or branch node
#[derive(Debug)]
pub enum NodeRef<K, V> {
    Leaf(NodeId, PhantomData<(K, V)>),
    Branch(NodeId, PhantomData<(K, V)>),
}

impl<K, V> Clone for NodeRef<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<K, V> {}

impl<K, V> PartialEq for NodeRef<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.is_leaf() == other.is_leaf() && self.id() == other.id()
    }
}

impl<K, V> Eq for NodeRef<K, V> {}

impl<K, V> NodeRef<K, V> {
    /// Reference to the leaf with the given ID.
    pub fn leaf(id: NodeId) -> Self {
        NodeRef::Leaf(id, PhantomData)
    }

    /// Reference to the branch with the given ID.
    pub fn branch(id: NodeId) -> Self {
        NodeRef::Branch(id, PhantomData)
    }

    /// Return the raw node ID.
    pub fn id(&self) -> NodeId {
        match *self {
            NodeRef::Leaf(id, _) => id,
            NodeRef::Branch(id, _) => id,
        }
    }

    /// Returns true if this reference points to a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf(_, _))
    }
}

/// Borrowed view of a leaf returned by [`BPlusTreeIndex::lookup_leaf`].
///
/// The leaf is the one that *would* hold the key; whether it actually does is
/// for the caller to check.
#[derive(Debug)]
pub struct LeafRef<'a, K, V> {
    pub(crate) id: NodeId,
    pub(crate) leaf: &'a LeafNode<K, V>,
}

impl<K, V> Clone for LeafRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for LeafRef<'_, K, V> {}

impl<'a, K: Ord, V: PartialEq> LeafRef<'a, K, V> {
    /// Arena ID of the leaf. Stable until the leaf is merged away.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The underlying leaf node.
    pub fn node(&self) -> &'a LeafNode<K, V> {
        self.leaf
    }

    /// Keys stored in the leaf, ascending.
    pub fn keys(&self) -> &'a [K] {
        &self.leaf.keys
    }

    /// Record references, aligned with [`keys`](Self::keys).
    pub fn values(&self) -> &'a [V] {
        &self.leaf.values
    }

    /// Number of records in the leaf.
    pub fn len(&self) -> usize {
        self.leaf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaf.is_empty()
    }

    /// First record stored under `key` in this leaf.
    pub fn get(&self, key: &K) -> Option<&'a V> {
        self.leaf.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.leaf.get(key).is_some()
    }

    /// Returns true if this leaf holds exactly the pair `(key, value)`.
    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.leaf.position_of(key, value).is_some()
    }

    /// Previous leaf in the chain, if any.
    pub fn prev_id(&self) -> Option<NodeId> {
        (self.leaf.prev != NULL_NODE).then_some(self.leaf.prev)
    }

    /// Next leaf in the chain, if any.
    pub fn next_id(&self) -> Option<NodeId> {
        (self.leaf.next != NULL_NODE).then_some(self.leaf.next)
    }
}

/// Close sibling of an under-occupied node, as chosen during deletion.
#[derive(Debug)]
pub(crate) struct Sibling<K, V> {
    /// The sibling itself.
    pub(crate) node: NodeRef<K, V>,
    /// Branch that lists both nodes.
    pub(crate) parent: NodeId,
    /// Index of the separator key between the two nodes. The lower node is
    /// child `separator`, the higher one child `separator + 1`.
    pub(crate) separator: usize,
    /// True if the sibling holds the lower keys.
    pub(crate) precedes: bool,
}
