//! Graph-backed memory store.
//!
//! Memories persist as nodes in an embedded database. Every add also infers
//! relationships to existing memories: temporal adjacency (`FOLLOWS` to the
//! five most recent) and content similarity (`RELATED_TO` wherever the
//! similarity heuristic clears its threshold). Edges are derived data; they
//! are written once and never updated or recomputed retroactively.

use std::path::{Path, PathBuf};

use chrono::DateTime;
use tracing::{debug, warn};

use crate::db::GraphDb;
use crate::error::{Error, Result};
use crate::store::{MemoryStore, clamp_importance, content_similarity};
use crate::types::{FollowsEdge, MemoryRecord, RelatedEdge, ScoredMemory, now_timestamp};

/// Configuration for the graph backend.
#[derive(Debug, Clone)]
pub struct GraphStoreConfig {
    /// Path to the embedded database file.
    pub db_path: PathBuf,
    /// How many of the most recent memories each new memory links to
    /// with a FOLLOWS edge (default: 5).
    pub recent_link_limit: usize,
    /// Minimum content similarity for creating a RELATED_TO edge
    /// (default: 0.1, exclusive).
    pub edge_similarity_threshold: f64,
    /// Minimum adjusted score for a retrieval hit (default: 0.0).
    pub similarity_threshold: f64,
}

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("memory.db"),
            recent_link_limit: 5,
            edge_similarity_threshold: 0.1,
            similarity_threshold: 0.0,
        }
    }
}

/// Memory store persisting records as graph nodes with inferred edges.
pub struct GraphMemoryStore {
    db: GraphDb,
    config: GraphStoreConfig,
}

impl GraphMemoryStore {
    /// Open the store described by `config`.
    pub fn open(config: GraphStoreConfig) -> Self {
        let db = GraphDb::open(&config.db_path);
        Self { db, config }
    }

    /// Open a store at `db_path` with default settings.
    pub fn open_path(db_path: impl AsRef<Path>) -> Self {
        Self::open(GraphStoreConfig {
            db_path: db_path.as_ref().to_path_buf(),
            ..Default::default()
        })
    }

    pub fn config(&self) -> &GraphStoreConfig {
        &self.config
    }

    /// Id derived from the creation timestamp, filesystem- and query-safe.
    fn id_from_timestamp(timestamp: &str) -> String {
        format!("mem_{}", timestamp.replace([':', '.'], "_"))
    }

    /// Link the new memory to the most recently created others.
    ///
    /// Creates at most `recent_link_limit` FOLLOWS edges, each carrying the
    /// creation gap in seconds. Per-neighbor failures are logged and skipped
    /// so one bad row never blocks the add.
    fn connect_to_recent(&self, record: &MemoryRecord) {
        let recent = match self.db.recent_except(&record.id, self.config.recent_link_limit) {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!("Failed to query recent memories: {}", e);
                return;
            }
        };

        let Ok(created) = DateTime::parse_from_rfc3339(&record.timestamp) else {
            warn!("Unparseable timestamp on new memory {}", record.id);
            return;
        };

        for other in recent {
            let other_time = match DateTime::parse_from_rfc3339(&other.timestamp) {
                Ok(t) => t,
                Err(e) => {
                    warn!("Skipping FOLLOWS edge to {}: bad timestamp ({})", other.id, e);
                    continue;
                }
            };
            let time_diff = (created - other_time).num_milliseconds() as f64 / 1000.0;
            match self.db.insert_follows(&record.id, &other.id, time_diff) {
                Ok(()) => debug!(
                    "FOLLOWS {} -> {} ({:.3}s apart)",
                    record.id, other.id, time_diff
                ),
                Err(e) => warn!("Failed to create FOLLOWS edge to {}: {}", other.id, e),
            }
        }
    }

    /// Link the new memory to every sufficiently similar existing one.
    ///
    /// Scans all other memories, O(store size) per add and quadratic over
    /// the life of the store; fine at the scale this store targets.
    fn connect_to_similar(&self, record: &MemoryRecord) {
        let others = match self.db.all_except(&record.id) {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!("Failed to scan memories for similarity: {}", e);
                return;
            }
        };

        for other in others {
            let similarity = content_similarity(&record.content, &other.content);
            if similarity <= self.config.edge_similarity_threshold {
                continue;
            }
            match self.db.insert_related(&record.id, &other.id, similarity) {
                Ok(()) => debug!(
                    "RELATED_TO {} -> {} (similarity {:.3})",
                    record.id, other.id, similarity
                ),
                Err(e) => warn!("Failed to create RELATED_TO edge to {}: {}", other.id, e),
            }
        }
    }

    /// Update a memory's importance score (clamped to 1-10).
    ///
    /// Returns false when the id is unknown.
    pub fn update_importance(&self, id: &str, importance: i32) -> Result<bool> {
        self.db.set_importance(id, clamp_importance(importance))
    }

    /// RELATED_TO edges created when the memory `from` was added.
    pub fn related_edges(&self, from: &str) -> Result<Vec<RelatedEdge>> {
        self.db.related_from(from)
    }

    /// FOLLOWS edges created when the memory `from` was added.
    pub fn follows_edges(&self, from: &str) -> Result<Vec<FollowsEdge>> {
        self.db.follows_from(from)
    }

    /// Total number of stored memories.
    pub fn len(&self) -> Result<usize> {
        Ok(self.db.count_nodes()? as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.db.count_nodes()? == 0)
    }
}

impl MemoryStore for GraphMemoryStore {
    fn add(&self, content: &str, importance: i32) -> Result<String> {
        if content.trim().is_empty() {
            return Err(Error::EmptyContent);
        }

        // Reopen after clear_all; surfaces the original open error if the
        // database is genuinely unavailable.
        self.db.ensure_open()?;

        let timestamp = now_timestamp();
        let record = MemoryRecord {
            id: Self::id_from_timestamp(&timestamp),
            content: content.to_string(),
            timestamp,
            importance: clamp_importance(importance),
        };
        self.db.insert_node(&record)?;

        // The record is durable at this point; edge inference failures are
        // logged, not surfaced, matching edges' derived-data status.
        self.connect_to_recent(&record);
        self.connect_to_similar(&record);

        debug!("Saved memory {}", record.id);
        Ok(record.id)
    }

    fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<ScoredMemory>> {
        // Candidate selection is importance-first: only the top `limit`
        // memories by importance are even considered for matching. This can
        // return fewer hits than exist for the query; the narrower candidate
        // set is the intended precision/cost tradeoff.
        let candidates = self.db.top_by_importance(limit)?;

        let query = query.trim().to_lowercase();
        if query.is_empty() {
            // No text to match against: fall back to importance ranking.
            return Ok(candidates
                .into_iter()
                .map(|record| ScoredMemory { record, score: 0.0 })
                .collect());
        }

        let mut results: Vec<ScoredMemory> = candidates
            .into_iter()
            .filter_map(|record| {
                let content = record.content.to_lowercase();
                if !content.contains(&query) {
                    return None;
                }
                let base = if content == query {
                    1.0
                } else if content.starts_with(&query) || content.ends_with(&query) {
                    0.8
                } else {
                    0.5
                };
                let score = base * (1.0 + record.importance as f64 / 10.0);
                if score < self.config.similarity_threshold {
                    return None;
                }
                Some(ScoredMemory { record, score })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.record.importance.cmp(&a.record.importance))
        });
        results.truncate(limit);
        debug!("Retrieved {} memories for query {:?}", results.len(), query);
        Ok(results)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<MemoryRecord>> {
        self.db.get_node(id)
    }

    fn clear_all(&self) -> Result<()> {
        self.db.close_and_delete()
    }
}
