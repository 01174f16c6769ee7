//! Embedded graph database access for the graph backend.
//!
//! Memories are nodes; `RELATED_TO` and `FOLLOWS` edges are rows in their own
//! tables. The connection is guarded by a Mutex and can be closed so
//! `clear_all` can delete the backing file; the next write reopens it and
//! re-applies the (idempotent) schema.

pub mod migrations;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::{FollowsEdge, MemoryRecord, RelatedEdge};

/// Graph database connection wrapper.
///
/// Thread-safe via internal Mutex; single-writer by contract, no concurrent
/// access to the same backing file from two processes.
pub struct GraphDb {
    path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl GraphDb {
    /// Open (or create) the database at `path` and apply the schema.
    ///
    /// Open failure is logged and leaves the store in a degenerate closed
    /// state rather than aborting; the first `add` retries the open and
    /// surfaces the error to the caller.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let conn = match Self::connect(&path) {
            Ok(conn) => Some(conn),
            Err(e) => {
                warn!("Failed to open graph database {:?}: {}", path, e);
                None
            }
        };
        Self {
            path,
            conn: Mutex::new(conn),
        }
    }

    fn connect(path: &Path) -> Result<Connection> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        migrations::run_migrations(&conn)?;
        debug!("Opened graph database {:?}", path);
        Ok(conn)
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Reopen the connection if the database was closed by `close_and_delete`.
    pub fn ensure_open(&self) -> Result<()> {
        let mut guard = self.lock()?;
        if guard.is_none() {
            *guard = Some(Self::connect(&self.path)?);
        }
        Ok(())
    }

    /// Whether a live connection exists.
    pub fn is_open(&self) -> bool {
        self.lock().map(|g| g.is_some()).unwrap_or(false)
    }

    /// Close the connection and delete the backing file.
    ///
    /// Reads against a closed database return empty results; the next write
    /// recreates the file.
    pub fn close_and_delete(&self) -> Result<()> {
        let mut guard = self.lock()?;
        // Dropping the connection releases the file handle before removal.
        guard.take();
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn map_node(row: &Row) -> rusqlite::Result<MemoryRecord> {
        Ok(MemoryRecord {
            id: row.get(0)?,
            content: row.get(1)?,
            timestamp: row.get(2)?,
            importance: row.get(3)?,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Node operations
    // ─────────────────────────────────────────────────────────────────────

    /// Insert a memory node. Requires an open connection.
    pub fn insert_node(&self, record: &MemoryRecord) -> Result<()> {
        let guard = self.lock()?;
        let conn = guard
            .as_ref()
            .ok_or_else(|| Error::Other("graph database is closed".into()))?;
        conn.execute(
            "INSERT INTO memory_nodes (memory_id, content, timestamp, importance)
             VALUES (?1, ?2, ?3, ?4)",
            params![record.id, record.content, record.timestamp, record.importance],
        )?;
        Ok(())
    }

    /// Get a node by id. `Ok(None)` when absent or the database is closed.
    pub fn get_node(&self, id: &str) -> Result<Option<MemoryRecord>> {
        let guard = self.lock()?;
        let Some(conn) = guard.as_ref() else {
            return Ok(None);
        };
        let mut stmt = conn.prepare(
            "SELECT memory_id, content, timestamp, importance
             FROM memory_nodes WHERE memory_id = ?1",
        )?;
        Ok(stmt.query_row(params![id], Self::map_node).optional()?)
    }

    /// Top nodes by importance, descending.
    pub fn top_by_importance(&self, limit: usize) -> Result<Vec<MemoryRecord>> {
        let guard = self.lock()?;
        let Some(conn) = guard.as_ref() else {
            return Ok(Vec::new());
        };
        let mut stmt = conn.prepare(
            "SELECT memory_id, content, timestamp, importance
             FROM memory_nodes ORDER BY importance DESC LIMIT ?1",
        )?;
        let nodes = stmt
            .query_map(params![limit as i64], Self::map_node)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    /// The most recently created nodes other than `id`, newest first.
    pub fn recent_except(&self, id: &str, limit: usize) -> Result<Vec<MemoryRecord>> {
        let guard = self.lock()?;
        let Some(conn) = guard.as_ref() else {
            return Ok(Vec::new());
        };
        let mut stmt = conn.prepare(
            "SELECT memory_id, content, timestamp, importance
             FROM memory_nodes WHERE memory_id <> ?1
             ORDER BY timestamp DESC LIMIT ?2",
        )?;
        let nodes = stmt
            .query_map(params![id, limit as i64], Self::map_node)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    /// All nodes other than `id`, in insertion order.
    pub fn all_except(&self, id: &str) -> Result<Vec<MemoryRecord>> {
        let guard = self.lock()?;
        let Some(conn) = guard.as_ref() else {
            return Ok(Vec::new());
        };
        let mut stmt = conn.prepare(
            "SELECT memory_id, content, timestamp, importance
             FROM memory_nodes WHERE memory_id <> ?1
             ORDER BY timestamp ASC",
        )?;
        let nodes = stmt
            .query_map(params![id], Self::map_node)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    /// Update a node's importance. Returns false when the id is unknown.
    pub fn set_importance(&self, id: &str, importance: i32) -> Result<bool> {
        let guard = self.lock()?;
        let Some(conn) = guard.as_ref() else {
            return Ok(false);
        };
        let changed = conn.execute(
            "UPDATE memory_nodes SET importance = ?2 WHERE memory_id = ?1",
            params![id, importance],
        )?;
        Ok(changed > 0)
    }

    /// Total node count.
    pub fn count_nodes(&self) -> Result<i64> {
        let guard = self.lock()?;
        let Some(conn) = guard.as_ref() else {
            return Ok(0);
        };
        let count = conn.query_row("SELECT COUNT(*) FROM memory_nodes", [], |row| row.get(0))?;
        Ok(count)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Edge operations
    // ─────────────────────────────────────────────────────────────────────

    /// Insert a RELATED_TO edge.
    pub fn insert_related(&self, from: &str, to: &str, similarity: f64) -> Result<()> {
        let guard = self.lock()?;
        let conn = guard
            .as_ref()
            .ok_or_else(|| Error::Other("graph database is closed".into()))?;
        conn.execute(
            "INSERT INTO related_to (from_id, to_id, similarity) VALUES (?1, ?2, ?3)",
            params![from, to, similarity],
        )?;
        Ok(())
    }

    /// Insert a FOLLOWS edge.
    pub fn insert_follows(&self, from: &str, to: &str, time_diff: f64) -> Result<()> {
        let guard = self.lock()?;
        let conn = guard
            .as_ref()
            .ok_or_else(|| Error::Other("graph database is closed".into()))?;
        conn.execute(
            "INSERT INTO follows (from_id, to_id, time_diff) VALUES (?1, ?2, ?3)",
            params![from, to, time_diff],
        )?;
        Ok(())
    }

    /// RELATED_TO edges originating at `from`.
    pub fn related_from(&self, from: &str) -> Result<Vec<RelatedEdge>> {
        let guard = self.lock()?;
        let Some(conn) = guard.as_ref() else {
            return Ok(Vec::new());
        };
        let mut stmt = conn
            .prepare("SELECT from_id, to_id, similarity FROM related_to WHERE from_id = ?1")?;
        let edges = stmt
            .query_map(params![from], |row| {
                Ok(RelatedEdge {
                    from: row.get(0)?,
                    to: row.get(1)?,
                    similarity: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    /// FOLLOWS edges originating at `from`.
    pub fn follows_from(&self, from: &str) -> Result<Vec<FollowsEdge>> {
        let guard = self.lock()?;
        let Some(conn) = guard.as_ref() else {
            return Ok(Vec::new());
        };
        let mut stmt =
            conn.prepare("SELECT from_id, to_id, time_diff FROM follows WHERE from_id = ?1")?;
        let edges = stmt
            .query_map(params![from], |row| {
                Ok(FollowsEdge {
                    from: row.get(0)?,
                    to: row.get(1)?,
                    time_diff: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(edges)
    }
}
