//! Graph database migrations.
//!
//! SQL is embedded as a string and executed when the database is opened.
//! All statements are idempotent, so reopening an existing database file
//! across process restarts never fails.

use rusqlite::Connection;

use crate::error::Result;

/// Graph tables SQL (001)
pub const GRAPH_TABLES_SQL: &str = include_str!("001_graph_tables.sql");

/// Run all graph migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(GRAPH_TABLES_SQL)?;
    Ok(())
}
