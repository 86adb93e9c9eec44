use crate::db::connection::Database;
use crate::map::selection::{Storage, StorageError};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

/// Selection storage backed by the `local_storage` table.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.db
            .with_conn(|conn| Ok(read_value(conn, key)?))
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db
            .with_conn(|conn| Ok(write_value(conn, key, value)?))
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    /// Read and write under one `BEGIN IMMEDIATE`, so concurrent requests
    /// toggling the same list serialize instead of overwriting each other.
    fn update(
        &mut self,
        key: &str,
        edit: &mut dyn FnMut(Option<String>) -> Option<String>,
    ) -> Result<(), StorageError> {
        self.db
            .with_conn(|conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let current = read_value(&tx, key)?;
                if let Some(next) = edit(current) {
                    write_value(&tx, key, &next)?;
                }
                tx.commit()?;
                Ok(())
            })
            .map_err(|e| StorageError::Backend(e.to_string()))
    }
}

fn read_value(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM local_storage WHERE key = ?1",
        params![key],
        |r| r.get(0),
    )
    .optional()
}

fn write_value(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
        params![key, value, Utc::now()],
    )?;
    Ok(())
}
