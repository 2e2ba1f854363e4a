use thiserror::Error;

/// Errors surfaced by graph operations.
///
/// Lookup misses are not errors here: an absent index key during a scan
/// means "zero matches", and an unknown node during delete means "nothing
/// to remove". Divergence between the three permutation indexes is storage
/// corruption and panics instead of returning a variant.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The node ID space is exhausted; the enclosing mutation is aborted.
    #[error("node id space exhausted")]
    DbFull,

    /// A stored byte sequence does not decode into a node. Indicates
    /// on-disk corruption or a codec mismatch; fatal for that read.
    #[error("cannot decode stored node: {0}")]
    DecodeCorruption(String),

    /// `update` without a WHERE clause was given a pattern containing
    /// variables.
    #[error("update without WHERE requires fully concrete patterns")]
    NonConcretePattern,

    /// A concrete pattern cannot form a valid triple (literal subject or
    /// non-named predicate).
    #[error("pattern cannot form a valid triple")]
    MalformedPattern,

    /// A single query used more distinct variables than the reserved ID
    /// range allows.
    #[error("query exceeds {0} distinct variables")]
    TooManyVariables(u32),

    /// An error from the underlying transactional store, propagated
    /// unchanged.
    #[error("storage: {0}")]
    Storage(String),

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redb::DatabaseError> for StoreError {
    fn from(e: redb::DatabaseError) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(e: redb::TransactionError) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(e: redb::TableError) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(e: redb::StorageError) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(e: redb::CommitError) -> Self {
        StoreError::Storage(e.to_string())
    }
}
