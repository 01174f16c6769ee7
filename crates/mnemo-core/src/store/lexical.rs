//! Lexical memory store: flat-file ledger + BM25 ranking.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::index::Bm25Index;
use crate::ledger::Ledger;
use crate::store::{MemoryStore, clamp_importance};
use crate::tokenize::tokenize;
use crate::types::{MemoryRecord, ScoredMemory};

/// Id of the synthetic record seeded when the corpus would be empty.
///
/// BM25 statistics are undefined over zero documents, so an empty store
/// carries this placeholder instead. It lives only in memory; the ledger
/// stays absent until a real memory is added.
pub const PLACEHOLDER_ID: &str = "init_memory";
const PLACEHOLDER_CONTENT: &str = "memory store initialized";

struct LexicalState {
    /// All records in insertion order.
    records: Vec<MemoryRecord>,
    /// Tokenized contents, parallel to `records`.
    corpus: Vec<Vec<String>>,
    index: Bm25Index,
}

impl LexicalState {
    fn seed_placeholder() -> Self {
        let mut state = Self {
            records: vec![MemoryRecord::new(PLACEHOLDER_ID, PLACEHOLDER_CONTENT, 1)],
            corpus: vec![tokenize(PLACEHOLDER_CONTENT)],
            index: Bm25Index::new(),
        };
        state.index.index(&state.corpus);
        state
    }

    fn push(&mut self, record: MemoryRecord) {
        self.corpus.push(tokenize(&record.content));
        self.records.push(record);
        // Full statistics rebuild on every insert; see Bm25Index docs for
        // the cost tradeoff.
        self.index.index(&self.corpus);
    }
}

/// Memory store ranked purely by token overlap, persisted to a flat file.
pub struct LexicalMemoryStore {
    ledger: Ledger,
    state: Mutex<LexicalState>,
}

impl LexicalMemoryStore {
    /// Open a store rooted at `data_dir`, loading any persisted memories.
    ///
    /// Load failures degrade to an empty store with a logged warning; the
    /// constructor itself never fails.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let ledger = Ledger::new(&data_dir);
        let loaded = match ledger.load() {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to load memory ledger: {}", e);
                Vec::new()
            }
        };

        let state = if loaded.is_empty() {
            debug!("No persisted memories; seeding placeholder record");
            LexicalState::seed_placeholder()
        } else {
            let records: Vec<MemoryRecord> = loaded
                .into_iter()
                .map(|(id, content)| MemoryRecord::new(id, content, 1))
                .collect();
            let corpus: Vec<Vec<String>> = records.iter().map(|r| tokenize(&r.content)).collect();
            let mut index = Bm25Index::new();
            index.index(&corpus);
            info!("Loaded {} memories", records.len());
            LexicalState {
                records,
                corpus,
                index,
            }
        };

        Self {
            ledger,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LexicalState>> {
        self.state.lock().map_err(|_| Error::LockPoisoned)
    }

    fn generate_id() -> String {
        let uuid = Uuid::new_v4().simple().to_string();
        format!("mem_{}", &uuid[..8])
    }
}

impl MemoryStore for LexicalMemoryStore {
    fn add(&self, content: &str, importance: i32) -> Result<String> {
        if content.trim().is_empty() {
            return Err(Error::EmptyContent);
        }

        let id = Self::generate_id();
        let record = MemoryRecord::new(id.clone(), content, clamp_importance(importance));

        // Durable first: the id is only acknowledged once the line is synced.
        self.ledger.append(&id, content)?;

        let mut state = self.lock()?;
        state.push(record);
        debug!("Saved memory {} ({} total)", id, state.records.len());
        Ok(id)
    }

    fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<ScoredMemory>> {
        // Empty query yields no candidates in this backend.
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let state = self.lock()?;
        let query_tokens = tokenize(query);
        let mut scored = state.index.score(&query_tokens);
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        // Ranking, not filtering: zero-scoring entries stay in the result.
        // Only the synthetic placeholder is withheld; it is index plumbing,
        // not a memory anyone saved.
        let results = scored
            .into_iter()
            .map(|(doc_idx, score)| ScoredMemory {
                record: state.records[doc_idx].clone(),
                score,
            })
            .filter(|m| m.record.id != PLACEHOLDER_ID)
            .take(limit)
            .collect::<Vec<_>>();
        debug!("Retrieved {} of {} memories", results.len(), state.records.len());
        Ok(results)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<MemoryRecord>> {
        let state = self.lock()?;
        Ok(state.records.iter().find(|r| r.id == id).cloned())
    }

    fn clear_all(&self) -> Result<()> {
        let mut state = self.lock()?;
        self.ledger.clear()?;
        *state = LexicalState::seed_placeholder();
        info!("Cleared all memories");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_and_get_by_id() {
        let dir = TempDir::new().unwrap();
        let store = LexicalMemoryStore::open(dir.path());

        let id = store.add("the user prefers dark mode", 1).unwrap();
        assert!(!id.is_empty());
        assert!(id.starts_with("mem_"));

        let record = store.get_by_id(&id).unwrap().unwrap();
        assert_eq!(record.content, "the user prefers dark mode");
        assert!(store.get_by_id("mem_missing").unwrap().is_none());
    }

    #[test]
    fn test_empty_content_rejected() {
        let dir = TempDir::new().unwrap();
        let store = LexicalMemoryStore::open(dir.path());
        assert!(matches!(store.add("", 1), Err(Error::EmptyContent)));
        assert!(matches!(store.add("   \n", 1), Err(Error::EmptyContent)));
    }

    #[test]
    fn test_empty_store_seeds_placeholder() {
        let dir = TempDir::new().unwrap();
        let store = LexicalMemoryStore::open(dir.path());
        let placeholder = store.get_by_id(PLACEHOLDER_ID).unwrap().unwrap();
        assert!(!placeholder.content.is_empty());
        // The placeholder is in-memory only; nothing was persisted yet.
        assert!(!dir.path().join("memories.txt").exists());
    }

    #[test]
    fn test_retrieval_ranks_by_relevance() {
        let dir = TempDir::new().unwrap();
        let store = LexicalMemoryStore::open(dir.path());
        let fruit_a = store.add("苹果是一种水果", 1).unwrap();
        let fruit_b = store.add("香蕉是黄色的水果", 1).unwrap();
        let lang = store.add("Python是编程语言", 1).unwrap();

        let results = store.retrieve("水果", 5).unwrap();
        assert_eq!(results.len(), 3);
        let top_two: Vec<&str> = results[..2].iter().map(|m| m.record.id.as_str()).collect();
        assert!(top_two.contains(&fruit_a.as_str()));
        assert!(top_two.contains(&fruit_b.as_str()));
        assert!(results[0].score > 0.0);

        // Non-matching documents are ranked below, not filtered out.
        let lang_result = results.iter().find(|m| m.record.id == lang).unwrap();
        assert_eq!(lang_result.score, 0.0);
    }

    #[test]
    fn test_zero_score_query_still_returns_entries() {
        let dir = TempDir::new().unwrap();
        let store = LexicalMemoryStore::open(dir.path());
        store.add("alpha beta", 1).unwrap();

        let results = store.retrieve("zzz_unmatched_token", 5).unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|m| m.score == 0.0));
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let dir = TempDir::new().unwrap();
        let store = LexicalMemoryStore::open(dir.path());
        store.add("something worth remembering", 1).unwrap();
        assert!(store.retrieve("", 5).unwrap().is_empty());
        assert!(store.retrieve("   ", 5).unwrap().is_empty());
    }

    #[test]
    fn test_limit_truncates_results() {
        let dir = TempDir::new().unwrap();
        let store = LexicalMemoryStore::open(dir.path());
        for i in 0..10 {
            store.add(format!("note number {i}").as_str(), 1).unwrap();
        }
        let results = store.retrieve("note", 3).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_persistence_across_instances() {
        let dir = TempDir::new().unwrap();
        let mut ids = Vec::new();
        {
            let store = LexicalMemoryStore::open(dir.path());
            ids.push(store.add("first fact", 1).unwrap());
            ids.push(store.add("second fact", 1).unwrap());
            ids.push(store.add("third fact", 1).unwrap());
        }

        let reopened = LexicalMemoryStore::open(dir.path());
        for id in &ids {
            assert!(reopened.get_by_id(id).unwrap().is_some(), "lost {id}");
        }
        let results = reopened.retrieve("fact", 5).unwrap();
        assert!(results.len() >= 3);
    }

    #[test]
    fn test_clear_all() {
        let dir = TempDir::new().unwrap();
        let store = LexicalMemoryStore::open(dir.path());
        let id = store.add("ephemeral", 1).unwrap();
        assert!(dir.path().join("memories.txt").exists());

        store.clear_all().unwrap();
        assert!(!dir.path().join("memories.txt").exists());
        assert!(store.get_by_id(&id).unwrap().is_none());
        assert!(store.retrieve("ephemeral", 5).unwrap().is_empty());

        // The degenerate placeholder state is re-seeded.
        assert!(store.get_by_id(PLACEHOLDER_ID).unwrap().is_some());
    }
}
