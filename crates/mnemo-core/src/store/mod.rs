//! Memory store facade.
//!
//! One `MemoryStore` contract, two backends:
//!
//! - **Lexical** ([`LexicalMemoryStore`]): flat-file ledger plus a BM25 index
//!   rebuilt on every insert. Retrieval ranks every memory by token overlap.
//! - **Graph** ([`GraphMemoryStore`]): embedded database persisting memories
//!   as nodes, with inferred `FOLLOWS` (temporal) and `RELATED_TO`
//!   (content-similarity) edges. Retrieval is importance-first with substring
//!   matching.
//!
//! Callers depend only on the trait; the agent-facing tool layer works with
//! either backend unchanged.

mod graph;
mod lexical;
mod similarity;

pub use graph::{GraphMemoryStore, GraphStoreConfig};
pub use lexical::LexicalMemoryStore;
pub use similarity::content_similarity;

use crate::error::Result;
use crate::types::{MemoryRecord, ScoredMemory};

/// Default number of memories returned by `retrieve`.
pub const DEFAULT_RETRIEVE_LIMIT: usize = 5;

/// Maximum importance score for a memory.
pub const MAX_IMPORTANCE: i32 = 10;
/// Minimum importance score for a memory.
pub const MIN_IMPORTANCE: i32 = 1;

/// Clamp an importance score into the valid 1-10 range.
pub(crate) fn clamp_importance(importance: i32) -> i32 {
    importance.clamp(MIN_IMPORTANCE, MAX_IMPORTANCE)
}

/// Persistent memory store exposed to the agent-orchestration layer.
///
/// All operations are synchronous and complete fully or return an error;
/// nothing here panics past the facade boundary. A store instance owns its
/// index and storage handle exclusively — two instances may point at the same
/// backing path only to simulate a process restart, never concurrently.
pub trait MemoryStore: Send + Sync {
    /// Store a memory and return its generated id.
    ///
    /// Empty or whitespace-only content is rejected. `importance` is clamped
    /// to 1-10. The record is flushed to the backing store before the id is
    /// returned, so an acknowledged add survives a crash.
    fn add(&self, content: &str, importance: i32) -> Result<String>;

    /// Return up to `limit` memories relevant to `query`, best first.
    ///
    /// Empty-query behavior is backend-specific: the lexical backend returns
    /// nothing, the graph backend returns the top memories by importance.
    fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<ScoredMemory>>;

    /// Look up a memory by id. Unknown ids are `Ok(None)`, never an error.
    fn get_by_id(&self, id: &str) -> Result<Option<MemoryRecord>>;

    /// Wipe all memories and delete the backing file or database.
    ///
    /// Until the next `add`, the backing path does not exist.
    fn clear_all(&self) -> Result<()>;
}
