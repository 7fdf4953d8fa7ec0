//! In-memory B+ tree index from integer keys to record references.
//!
//! The tree maps fixed-width keys to opaque record references with a
//! configurable fanout. Leaves form a doubly linked chain in key order and
//! every node knows its parent, so insertion splits and deletion
//! borrows/merges repair the tree bottom-up after a single descent.
//!
//! ```
//! use bplustree_index::{RecordIndex, RecordRef};
//!
//! let mut index = RecordIndex::new(4).unwrap();
//! for key in 0..10 {
//!     index.insert(key, RecordRef::new(key as u64 * 100)).unwrap();
//! }
//! assert_eq!(index.get(&7), Some(&RecordRef::new(700)));
//!
//! index.delete(&7, &RecordRef::new(700)).unwrap();
//! assert!(!index.contains_key(&7));
//! assert!(index.check_invariants());
//! ```

mod compact_arena;
mod construction;
mod delete_operations;
mod diagnostics;
mod error;
mod get_operations;
mod insert_operations;
mod iteration;
mod node;
mod tree_structure;
mod types;
mod validation;

pub use compact_arena::{CompactArena, CompactArenaStats};
pub use construction::{validation as capacity, UNLIMITED_NODES};
pub use diagnostics::{NodeDump, NodeKind, TreeDump};
pub use error::{BPlusTreeError, BTreeResult, InitResult, ModifyResult};
pub use iteration::{ItemIterator, KeyIterator, LeafIterator, ValueIterator};
pub use node::first_index_ge;
pub use types::{
    BPlusTreeIndex, BranchNode, LeafNode, LeafRef, NodeId, NodeRef, RecordIndex, RecordRef,
    DEFAULT_CAPACITY, MIN_CAPACITY, NULL_NODE,
};
