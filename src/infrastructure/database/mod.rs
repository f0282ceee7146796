//! SQLite persistence for commands added at runtime

use rusqlite::Connection;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::traits::CommandStore;

pub struct SqliteCommandStore {
    conn: Mutex<Connection>,
}

impl SqliteCommandStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> Result<(), StorageError> {
        self.conn()?.execute(
            "CREATE TABLE IF NOT EXISTS command (
                cmd_key TEXT PRIMARY KEY NOT NULL,
                cmd_response TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl CommandStore for SqliteCommandStore {
    fn insert(&self, name: &str, reply: &str) -> Result<(), StorageError> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO command (cmd_key, cmd_response) VALUES (?1, ?2)",
            rusqlite::params![name, reply],
        )?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool, StorageError> {
        let rows = self
            .conn()?
            .execute("DELETE FROM command WHERE cmd_key = ?1", [name])?;
        Ok(rows > 0)
    }

    fn all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT cmd_key, cmd_response FROM command")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut commands = BTreeMap::new();
        for row in rows {
            let (key, response): (String, String) = row?;
            commands.insert(key, response);
        }
        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites_same_name() {
        let store = SqliteCommandStore::open_in_memory().unwrap();
        assert!(store.all().unwrap().is_empty());

        store.insert("kek", "dee").unwrap();
        assert_eq!(store.all().unwrap().get("kek").map(String::as_str), Some("dee"));

        store.insert("kek", "bee").unwrap();
        let all = store.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all.get("kek").map(String::as_str), Some("bee"));
    }

    #[test]
    fn test_remove() {
        let store = SqliteCommandStore::open_in_memory().unwrap();
        store.insert("kek", "dee").unwrap();
        assert!(store.remove("kek").unwrap());
        assert!(!store.remove("kek").unwrap());
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chad-test.db");

        SqliteCommandStore::open(&path).unwrap().insert("foo", "bar baz").unwrap();

        let reopened = SqliteCommandStore::open(&path).unwrap();
        assert_eq!(reopened.all().unwrap().get("foo").map(String::as_str), Some("bar baz"));
    }
}
