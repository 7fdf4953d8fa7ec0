//! Error handling and result types for BPlusTreeIndex operations.
//!
//! Caller mistakes (bad configuration, deleting a record that is not there,
//! exhausting the node budget) come back as `BPlusTreeError` values. Broken
//! internal invariants are bugs and panic instead.

use crate::types::NodeId;

/// Error type for B+ tree operations.
#[derive(Debug, Clone, PartialEq)]
pub enum BPlusTreeError {
    /// Invalid capacity or node budget specified.
    InvalidCapacity(String),
    /// The `(key, value)` pair to delete is not in the leaf the key routes to.
    ValueNotFound(String),
    /// Internal data structure integrity violation.
    DataIntegrityError(String),
    /// Tree corruption detected.
    CorruptedTree(String),
    /// The node budget cannot hold the nodes an operation needs.
    AllocationError(String),
}

impl BPlusTreeError {
    /// Create an InvalidCapacity error with context
    pub fn invalid_capacity(capacity: usize, min_required: usize) -> Self {
        Self::InvalidCapacity(format!(
            "Capacity {} is invalid (minimum required: {})",
            capacity, min_required
        ))
    }

    /// Create a ValueNotFound error for the leaf that was searched
    pub fn value_not_found(leaf_id: NodeId) -> Self {
        Self::ValueNotFound(format!("no matching record in leaf {}", leaf_id))
    }

    /// Create a DataIntegrityError with context
    pub fn data_integrity(context: &str, details: &str) -> Self {
        Self::DataIntegrityError(format!("{}: {}", context, details))
    }

    /// Create a CorruptedTree error with context
    pub fn corrupted_tree(component: &str, details: &str) -> Self {
        Self::CorruptedTree(format!("{} corruption: {}", component, details))
    }

    /// Create an AllocationError with context
    pub fn allocation_error(resource: &str, reason: &str) -> Self {
        Self::AllocationError(format!("Failed to allocate {}: {}", resource, reason))
    }

    /// Check if this error is a capacity error
    pub fn is_capacity_error(&self) -> bool {
        matches!(self, Self::InvalidCapacity(_))
    }

    /// Check if this error reports a missing record
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ValueNotFound(_))
    }
}

impl std::fmt::Display for BPlusTreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BPlusTreeError::InvalidCapacity(msg) => write!(f, "Invalid capacity: {}", msg),
            BPlusTreeError::ValueNotFound(msg) => write!(f, "Value not found: {}", msg),
            BPlusTreeError::DataIntegrityError(msg) => write!(f, "Data integrity error: {}", msg),
            BPlusTreeError::CorruptedTree(msg) => write!(f, "Corrupted tree: {}", msg),
            BPlusTreeError::AllocationError(msg) => write!(f, "Allocation error: {}", msg),
        }
    }
}

impl std::error::Error for BPlusTreeError {}

/// Internal result type for tree operations
pub(crate) type TreeResult<T> = Result<T, BPlusTreeError>;

/// Public result type for tree operations that may fail
pub type BTreeResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree modification operations
pub type ModifyResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree construction and validation
pub type InitResult<T> = Result<T, BPlusTreeError>;
