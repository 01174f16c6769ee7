//! Shared data types for the memory store.

use serde::{Deserialize, Serialize};

/// A single stored memory.
///
/// Records are immutable once created except for `importance`, which the
/// graph backend may update in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Globally unique identifier, generated at creation.
    pub id: String,
    /// The memory text.
    pub content: String,
    /// Creation instant as an ISO-8601 string.
    pub timestamp: String,
    /// Importance score in 1-10. Only meaningful in the graph backend;
    /// the lexical backend leaves it at 1.
    pub importance: i32,
}

impl MemoryRecord {
    /// Create a record stamped with the current time.
    pub fn new(id: impl Into<String>, content: impl Into<String>, importance: i32) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            timestamp: now_timestamp(),
            importance,
        }
    }
}

/// A memory paired with its retrieval score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMemory {
    pub record: MemoryRecord,
    pub score: f64,
}

/// Directed similarity relation between two memories.
///
/// Derived when a new memory is added; never updated or removed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedEdge {
    pub from: String,
    pub to: String,
    /// Content similarity in [0, 1].
    pub similarity: f64,
}

/// Directed temporal relation between two memories.
///
/// `from` was created `time_diff` seconds after `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowsEdge {
    pub from: String,
    pub to: String,
    /// Creation gap in seconds.
    pub time_diff: f64,
}

/// Current time as a fixed-width ISO-8601 UTC string.
///
/// Microsecond precision keeps the strings lexicographically ordered, which
/// the graph backend relies on for timestamp-descending queries.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_new_stamps_time() {
        let record = MemoryRecord::new("mem_1", "hello", 3);
        assert_eq!(record.id, "mem_1");
        assert_eq!(record.content, "hello");
        assert_eq!(record.importance, 3);
        assert!(!record.timestamp.is_empty());
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }

    #[test]
    fn test_timestamps_are_ordered() {
        let a = now_timestamp();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = now_timestamp();
        // Fixed-width formatting means string order matches time order.
        assert!(a < b);
    }
}
