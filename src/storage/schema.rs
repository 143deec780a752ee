//! Database schema definitions

use crate::{Error, Result};
use std::borrow::Cow;
use std::path::Path;

/// Default schema, compiled into the binary
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Pragmas applied to every connection before the schema runs
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// Tables created by the default schema, in dependency order
pub const TABLES: &[&str] = &[
    "workshops",
    "service_categories",
    "services",
    "customers",
    "mechanics",
    "appointments",
];

/// Load the schema text: the file at `path` when given, the built-in one otherwise.
///
/// The schema is read exactly once per initialization.
pub fn load_schema(path: Option<&Path>) -> Result<Cow<'static, str>> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map(Cow::Owned)
            .map_err(|source| Error::SchemaLoad {
                path: path.to_path_buf(),
                source,
            }),
        None => Ok(Cow::Borrowed(SCHEMA_SQL)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_is_idempotent_text() {
        for line in SCHEMA_SQL.lines().map(str::trim) {
            if line.starts_with("CREATE TABLE") {
                assert!(line.contains("IF NOT EXISTS"), "non-idempotent: {}", line);
            }
            if line.starts_with("INSERT") {
                assert!(line.starts_with("INSERT OR IGNORE"), "non-idempotent: {}", line);
            }
        }
    }

    #[test]
    fn test_default_schema_mentions_every_table() {
        for table in TABLES {
            assert!(SCHEMA_SQL.contains(&format!("CREATE TABLE IF NOT EXISTS {} ", table)));
        }
    }

    #[test]
    fn test_missing_schema_file_is_schema_load_error() {
        let err = load_schema(Some(Path::new("/definitely/not/here.sql"))).unwrap_err();
        assert!(matches!(err, Error::SchemaLoad { .. }));
    }
}
