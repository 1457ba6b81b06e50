use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::store::KeyValueBackend;
use crate::error::StoreError;

/// The Library is the SQLite file behind the key-value store.
/// It keeps one row per key, holding the JSON text written by `Store`.
pub struct Library {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl Library {
    /// Open (or create) the library at its default location.
    ///
    /// The database file is created in the user's data directory:
    /// - Linux: ~/.local/share/smart-scan/smart_scan.db
    /// - macOS: ~/Library/Application Support/smart-scan/smart_scan.db
    /// - Windows: %APPDATA%\smart-scan\smart_scan.db
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = Self::default_dir().ok_or(StoreError::NoDataDir)?;
        Self::open_in(&dir)
    }

    /// Open (or create) the library inside `dir`
    pub fn open_in(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        Self::open(dir.join("smart_scan.db"))
    }

    /// Open (or create) the library at an explicit database path
    pub fn open(db_path: PathBuf) -> Result<Self, StoreError> {
        let conn = Connection::open(&db_path)?;

        tracing::info!(path = %db_path.display(), "library opened");

        let library = Library {
            conn: Mutex::new(conn),
            db_path,
        };
        library.init_schema()?;

        Ok(library)
    }

    /// Directory where the database lives by default
    pub fn default_dir() -> Option<PathBuf> {
        let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
        path.push("smart-scan");
        Some(path)
    }

    /// Create the key-value table if it doesn't exist.
    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      INTEGER NOT NULL
            )",
            [],
        )?;

        tracing::debug!("library schema initialized");

        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Number of keys currently stored
    pub fn key_count(&self) -> Result<i64, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl KeyValueBackend for Library {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, chrono::Utc::now().timestamp()],
        )?;
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::Store;
    use std::sync::Arc;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let library = Library::open_in(dir.path()).unwrap();
            library.set("folders", r#"["Invoices"]"#).unwrap();
        }

        let library = Library::open_in(dir.path()).unwrap();
        assert_eq!(library.get("folders").unwrap().as_deref(), Some(r#"["Invoices"]"#));
        assert_eq!(library.key_count().unwrap(), 1);
    }

    #[test]
    fn test_open_in_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("smart-scan");

        let library = Library::open_in(&nested).unwrap();

        assert_eq!(library.path(), &nested.join("smart_scan.db"));
        assert!(library.path().exists());
        assert_eq!(library.key_count().unwrap(), 0);
    }

    #[test]
    fn test_set_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in(dir.path()).unwrap();

        library.set("k", "1").unwrap();
        library.set("k", "2").unwrap();

        assert_eq!(library.get("k").unwrap().as_deref(), Some("2"));
        assert_eq!(library.key_count().unwrap(), 1);
    }

    #[test]
    fn test_store_round_trip_through_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(Arc::new(Library::open_in(dir.path()).unwrap()));
        let recipients = vec!["a@x.com".to_string(), "b@x.com".to_string()];

        store.write("employees", &recipients).unwrap();

        let restored: Vec<String> = store.read("employees");
        assert_eq!(restored, recipients);
    }
}
