//! Agent-facing memory tools.
//!
//! The orchestration loop talks to the memory store through two named
//! callables with a plain string-in / string-out contract: `save_memory` and
//! `retrieve_memories`. Both absorb internal errors into user-facing text —
//! the agent loop cannot recover from a propagated error, so none ever
//! crosses this boundary.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mnemo_core::LexicalMemoryStore;
//! use mnemo_tools::create_memory_tools;
//!
//! let store = Arc::new(LexicalMemoryStore::open("db_cache/memories"));
//! let (save, retrieve) = create_memory_tools(store);
//!
//! let reply = save.run("the user prefers dark mode", 1);
//! assert!(reply.starts_with("Memory saved"));
//! let listing = retrieve.run("user preferences", 5);
//! # let _ = listing;
//! ```

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, warn};

use mnemo_core::{DEFAULT_RETRIEVE_LIMIT, MemoryStore, ScoredMemory};

/// Tool that saves a memory and reports the generated id.
pub struct SaveMemoryTool {
    store: Arc<dyn MemoryStore>,
}

impl SaveMemoryTool {
    /// Tool name exposed to the orchestration loop.
    pub const NAME: &'static str = "save_memory";

    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }

    /// Human-readable tool description for the agent's tool listing.
    pub fn description() -> &'static str {
        "Save important information to the memory store for later retrieval. \
         Input is the memory content and an optional importance score (1-10)."
    }

    /// Save `content` and return a user-facing result message.
    pub fn run(&self, content: &str, importance: i32) -> String {
        match self.store.add(content, importance) {
            Ok(id) => format!("Memory saved with id: {id}."),
            Err(e) => {
                warn!("save_memory failed: {}", e);
                format!("Failed to save memory: {e}.")
            }
        }
    }
}

/// Tool that retrieves relevant memories as a formatted listing.
pub struct RetrieveMemoriesTool {
    store: Arc<dyn MemoryStore>,
}

impl RetrieveMemoriesTool {
    /// Tool name exposed to the orchestration loop.
    pub const NAME: &'static str = "retrieve_memories";

    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }

    /// Human-readable tool description for the agent's tool listing.
    pub fn description() -> &'static str {
        "Retrieve memories relevant to a query. Input is the query string."
    }

    /// Retrieve up to `limit` memories and return a user-facing listing.
    pub fn run(&self, query: &str, limit: usize) -> String {
        let limit = if limit == 0 { DEFAULT_RETRIEVE_LIMIT } else { limit };
        let memories = match self.store.retrieve(query, limit) {
            Ok(memories) => memories,
            Err(e) => {
                warn!("retrieve_memories failed: {}", e);
                Vec::new()
            }
        };

        if memories.is_empty() {
            return "No relevant memories found.".to_string();
        }

        debug!("Formatting {} memories for query {:?}", memories.len(), query);
        format_memories(&memories)
    }
}

fn format_memories(memories: &[ScoredMemory]) -> String {
    let mut out = format!("Found {} relevant memories:\n\n", memories.len());
    for (i, memory) in memories.iter().enumerate() {
        let _ = write!(out, "{}. {} (score: {:.4}", i + 1, memory.record.content, memory.score);
        if memory.record.importance > 1 {
            let _ = write!(out, ", importance: {}", memory.record.importance);
        }
        out.push_str(")\n\n");
    }
    out
}

/// Create a save/retrieve tool pair sharing one memory store.
pub fn create_memory_tools(
    store: Arc<dyn MemoryStore>,
) -> (SaveMemoryTool, RetrieveMemoriesTool) {
    (
        SaveMemoryTool::new(store.clone()),
        RetrieveMemoriesTool::new(store),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::{GraphMemoryStore, LexicalMemoryStore};
    use tempfile::TempDir;

    fn lexical_tools(dir: &TempDir) -> (SaveMemoryTool, RetrieveMemoriesTool) {
        create_memory_tools(Arc::new(LexicalMemoryStore::open(dir.path())))
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(SaveMemoryTool::NAME, "save_memory");
        assert_eq!(RetrieveMemoriesTool::NAME, "retrieve_memories");
    }

    #[test]
    fn test_save_reports_id() {
        let dir = TempDir::new().unwrap();
        let (save, _) = lexical_tools(&dir);
        let reply = save.run("the user prefers tabs over spaces", 1);
        assert!(reply.starts_with("Memory saved with id: mem_"), "got: {reply}");
    }

    #[test]
    fn test_save_failure_becomes_message() {
        let dir = TempDir::new().unwrap();
        let (save, _) = lexical_tools(&dir);
        let reply = save.run("", 1);
        assert!(reply.starts_with("Failed to save memory"), "got: {reply}");
    }

    #[test]
    fn test_retrieve_formats_numbered_list() {
        let dir = TempDir::new().unwrap();
        let (save, retrieve) = lexical_tools(&dir);
        save.run("apples are a fruit", 1);
        save.run("bananas are a fruit", 1);

        let listing = retrieve.run("fruit", 5);
        assert!(listing.starts_with("Found 2 relevant memories:"), "got: {listing}");
        assert!(listing.contains("1. "));
        assert!(listing.contains("2. "));
        assert!(listing.contains("score: "));
    }

    #[test]
    fn test_retrieve_no_matches_message() {
        let dir = TempDir::new().unwrap();
        let (_, retrieve) = lexical_tools(&dir);
        assert_eq!(retrieve.run("anything", 5), "No relevant memories found.");
        // Empty query is the documented no-candidates case for this backend.
        assert_eq!(retrieve.run("", 5), "No relevant memories found.");
    }

    #[test]
    fn test_tools_share_one_store() {
        let dir = TempDir::new().unwrap();
        let (save, retrieve) = lexical_tools(&dir);
        save.run("the meeting is on friday", 1);
        let listing = retrieve.run("meeting", 5);
        assert!(listing.contains("the meeting is on friday"));
    }

    #[test]
    fn test_graph_backend_behind_same_tools() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(GraphMemoryStore::open_path(dir.path().join("memory.db")));
        let (save, retrieve) = create_memory_tools(store);

        let reply = save.run("the user likes blue", 7);
        assert!(reply.starts_with("Memory saved with id: mem_"));

        let listing = retrieve.run("blue", 5);
        assert!(listing.contains("the user likes blue"), "got: {listing}");
        assert!(listing.contains("importance: 7"));
    }

    #[test]
    fn test_zero_limit_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let (save, retrieve) = lexical_tools(&dir);
        for i in 0..8 {
            save.run(&format!("note {i}"), 1);
        }
        let listing = retrieve.run("note", 0);
        assert!(listing.starts_with(&format!("Found {DEFAULT_RETRIEVE_LIMIT} relevant memories:")));
    }
}
