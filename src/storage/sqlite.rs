//! SQLite storage implementation

use std::path::{Path, PathBuf};
use rusqlite::Connection;
use serde::Serialize;
use crate::Result;
use super::schema;

/// SQLite-backed store for the service catalogue.
///
/// One store is opened per process and handed to every caller; it is never
/// reached through a global.
pub struct ShopStore {
    pub(super) conn: Connection,
    path: Option<PathBuf>,
}

impl ShopStore {
    /// Open a database file with the built-in schema (creates it and its
    /// directory if they don't exist)
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_schema(path, None)
    }

    /// Open a database file, applying the schema file at `schema_path` when
    /// given instead of the built-in one.
    ///
    /// Any error here leaves no usable store behind and must be treated as
    /// fatal by the caller.
    pub fn open_with_schema(path: &Path, schema_path: Option<&Path>) -> Result<Self> {
        let schema_sql = schema::load_schema(schema_path)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                tracing::debug!("Created store directory {}", parent.display());
            }
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.initialize_schema(&schema_sql)?;
        tracing::info!("Opened store at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, path: None };
        store.initialize_schema(schema::SCHEMA_SQL)?;
        Ok(store)
    }

    /// Enable foreign keys, then apply the schema batch
    fn initialize_schema(&self, schema_sql: &str) -> Result<()> {
        self.conn.execute_batch(schema::CONNECTION_PRAGMAS)?;
        self.conn.execute_batch(schema_sql)?;
        Ok(())
    }

    /// Path of the backing file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether SQLite is enforcing foreign keys on this connection
    pub fn foreign_keys_enabled(&self) -> Result<bool> {
        let enabled: i64 = self.conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        Ok(enabled == 1)
    }

    /// Row counts for every user table, in creation order
    pub fn table_counts(&self) -> Result<TableCounts> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY rowid",
        )?;
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        let mut counts = Vec::with_capacity(tables.len());
        for table in tables {
            // Table names come from sqlite_master, quoted as identifiers.
            let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.replace('"', "\"\""));
            let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
            counts.push(TableCount {
                table,
                rows: count as usize,
            });
        }

        Ok(TableCounts { tables: counts })
    }

    /// Close the connection. Consumes the store, so it can only happen once.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| err)?;
        tracing::info!("Closed store");
        Ok(())
    }
}

/// Current time in stored form (microseconds since the Unix epoch)
pub(super) fn now_micros() -> i64 {
    crate::model::to_micros(chrono::Utc::now())
}

/// Map a model conversion failure into a rusqlite row error for `column`
pub(super) fn conversion_error(column: usize, err: crate::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table: String,
    pub rows: usize,
}

/// Per-table row counts
#[derive(Debug, Clone, Serialize)]
pub struct TableCounts {
    pub tables: Vec<TableCount>,
}

impl TableCounts {
    pub fn get(&self, table: &str) -> Option<usize> {
        self.tables.iter().find(|t| t.table == table).map(|t| t.rows)
    }
}

impl std::fmt::Display for TableCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for entry in &self.tables {
            writeln!(f, "  {}: {}", entry.table, entry.rows)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_in_memory_store_enforces_foreign_keys() {
        let store = ShopStore::open_in_memory().unwrap();
        assert!(store.foreign_keys_enabled().unwrap());
        assert!(store.path().is_none());
    }

    #[test]
    fn test_fresh_store_has_seed_rows() {
        let store = ShopStore::open_in_memory().unwrap();
        let counts = store.table_counts().unwrap();

        for table in schema::TABLES {
            assert!(counts.get(table).is_some(), "missing table {}", table);
        }
        assert!(counts.get("service_categories").unwrap() > 0);
        assert!(counts.get("services").unwrap() > 0);
    }

    #[test]
    fn test_counts_render_as_plain_lines() {
        let store = ShopStore::open_in_memory().unwrap();
        let text = store.table_counts().unwrap().to_string();

        assert!(text.starts_with("Database Statistics:\n"));
        assert!(text.contains("  services: 4\n"));
        assert!(text.contains("  service_categories: 3\n"));
    }

    #[test]
    fn test_open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join("shop.db");

        let store = ShopStore::open(&db_path).unwrap();
        assert!(db_path.exists());
        assert_eq!(store.path(), Some(db_path.as_path()));
        store.close().unwrap();
    }

    #[test]
    fn test_reopen_does_not_duplicate_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("shop.db");

        let first = ShopStore::open(&db_path).unwrap();
        let before = first.table_counts().unwrap();
        first.close().unwrap();

        let second = ShopStore::open(&db_path).unwrap();
        let after = second.table_counts().unwrap();
        assert!(second.foreign_keys_enabled().unwrap());

        for entry in &before.tables {
            assert_eq!(after.get(&entry.table), Some(entry.rows), "table {}", entry.table);
        }
    }

    #[test]
    fn test_custom_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.sql");
        std::fs::write(
            &schema_path,
            format!(
                "{}\nCREATE TABLE IF NOT EXISTS vehicles (id INTEGER PRIMARY KEY, plate TEXT NOT NULL);",
                schema::SCHEMA_SQL
            ),
        )
        .unwrap();

        let store = ShopStore::open_with_schema(&dir.path().join("shop.db"), Some(&schema_path)).unwrap();
        assert_eq!(store.table_counts().unwrap().get("vehicles"), Some(0));
    }

    #[test]
    fn test_unreadable_schema_is_fatal_and_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("shop.db");

        let result = ShopStore::open_with_schema(&db_path, Some(&dir.path().join("missing.sql")));
        assert!(matches!(result, Err(Error::SchemaLoad { .. })));
        assert!(!db_path.exists());
    }

    #[test]
    fn test_broken_schema_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.sql");
        std::fs::write(&schema_path, "CREATE TABLE oops (").unwrap();

        let result = ShopStore::open_with_schema(&dir.path().join("shop.db"), Some(&schema_path));
        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
