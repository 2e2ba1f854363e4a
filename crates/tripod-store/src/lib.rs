//! Tripod: an embedded graph database for RDF triples.
//!
//! Two interchangeable engines expose the same surface (the [`Graph`]
//! trait):
//!
//! - [`MemoryGraph`]: dictionary and indexes in process memory, rebuilt on
//!   load, no internal locking (callers serialize access).
//! - [`DiskGraph`]: the same layout persisted in a single redb file, with
//!   every mutation applied in one ACID write transaction.
//!
//! Both are built around the same storage idea:
//!
//! 1. **Node dictionary**: every distinct node (named node, blank node,
//!    literal) is assigned a dense `u32` ID.
//! 2. **Three permuted indexes**: `(subject, predicate) → objects`,
//!    `(object, subject) → predicates` and `(predicate, object) → subjects`,
//!    each value a Roaring bitmap. A triple exists iff it is present in all
//!    three at once.
//! 3. **BGP evaluation**: triple patterns are compiled against the
//!    dictionary, grouped by shared variables, scanned in ascending
//!    estimated-cardinality order with bitmap semi-join narrowing, and the
//!    per-pattern solution tables are merged by a nested-loop join.
//!
//! Mutation ([`Graph::insert`], [`Graph::delete`], [`Graph::update`]) and
//! query ([`Graph::where_`], [`Graph::select`]) reuse that one pipeline.

mod disk;
mod eq;
mod error;
mod memory;
mod pattern;
mod query;

pub mod codec;

pub use disk::{DiskConfig, DiskGraph};
pub use error::StoreError;
pub use memory::MemoryGraph;
pub use pattern::{TermPattern, TriplePattern};

// The node model is oxrdf's; re-export the parts of it that appear in this
// crate's own signatures.
pub use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple, Variable};

use serde::{Deserialize, Serialize};

/// Highest pattern-local variable marker.
///
/// Node ID `0` means "not present"; IDs `1..=MAX_VARIABLES` are reserved for
/// query variables and never persisted; real dictionary IDs start above.
pub const MAX_VARIABLES: u32 = 1 << 10;

/// First ID the dictionary may hand out.
pub(crate) const FIRST_NODE_ID: u32 = MAX_VARIABLES + 1;

pub(crate) fn is_variable_id(id: u32) -> bool {
    (1..=MAX_VARIABLES).contains(&id)
}

/// Tunable cardinality estimates for the pattern compiler.
///
/// The one-concrete-two-variable case has no cheap exact count available
/// from the permutation indexes, so it uses a coarse constant. It only
/// influences the order patterns are scanned in, never the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardinalityHints {
    /// Estimate for patterns with exactly one concrete position.
    pub one_concrete: u64,
}

impl Default for CardinalityHints {
    fn default() -> Self {
        Self { one_concrete: 1000 }
    }
}

/// Structural counts of a graph.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Nodes in the dictionary.
    pub nodes: u64,
    /// Stored triples.
    pub triples: u64,
    /// Distinct predicates.
    pub predicates: u64,
}

/// The common surface of both engines.
///
/// Calls are synchronous and single-call-at-a-time per graph handle. The
/// disk engine serializes mutations through redb write transactions; the
/// memory engine relies on the caller for serialization.
pub trait Graph {
    /// Add triples. Duplicates are no-ops. Blank nodes are given fresh
    /// identity per call, with equal labels inside one call mapping to one
    /// node. Returns the number of newly added triples.
    fn insert(&mut self, triples: &[Triple]) -> Result<usize, StoreError>;

    /// Remove triples. Triples referencing unknown nodes (including blank
    /// labels that are not a store-internal identity) are skipped, never
    /// created. Returns the number actually removed.
    fn delete(&mut self, triples: &[Triple]) -> Result<usize, StoreError>;

    /// Delete and insert driven by an optional WHERE clause.
    ///
    /// With `wher` non-empty, the clause is evaluated once and both the
    /// deletions and the insertions are computed from that single solution
    /// snapshot, deletions applied first. With `wher` empty, `del` and
    /// `ins` must be fully concrete. Returns `(deleted, inserted)`.
    fn update(
        &mut self,
        del: &[TriplePattern],
        ins: &[TriplePattern],
        wher: &[TriplePattern],
    ) -> Result<(usize, usize), StoreError>;

    /// Evaluate a basic graph pattern and materialize every matched pattern
    /// instantiation into a fresh in-memory result graph.
    fn where_(&self, patterns: &[TriplePattern]) -> Result<MemoryGraph, StoreError>;

    /// Evaluate a basic graph pattern and project the requested variables.
    /// Row order is unspecified; multiplicity is preserved.
    fn select(
        &self,
        vars: &[Variable],
        patterns: &[TriplePattern],
    ) -> Result<Vec<Vec<Term>>, StoreError>;

    /// Dump every stored triple.
    fn triples(&self) -> Result<Vec<Triple>, StoreError>;

    /// Structural counts.
    fn stats(&self) -> Result<Stats, StoreError>;

    /// Graph equality modulo blank-node relabeling.
    ///
    /// Ground triples must match exactly; blank nodes are compared by a
    /// one-hop neighborhood signature. This is a heuristic, not a complete
    /// isomorphism test: symmetric blank structures that differ only beyond
    /// one hop can compare equal.
    fn eq(&self, other: &dyn Graph) -> Result<bool, StoreError>;
}
