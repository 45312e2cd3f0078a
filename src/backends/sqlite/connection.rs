//! SQLite connection
//!
//! A [`Connection`] owns one engine handle. Statements borrow the connection,
//! so it cannot be disconnected or dropped while any statement is alive.

use super::statement::Statement;
use crate::core::error::{DatabaseError, Result};
use crate::core::properties::Properties;
use rusqlite::ffi;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Connection to one SQLite database
///
/// # Examples
///
/// ```rust
/// use rust_sql_bridge::prelude::*;
///
/// let db = Connection::open_in_memory()?;
/// db.execute_batch("CREATE TABLE players (id INTEGER PRIMARY KEY, name TEXT)")?;
///
/// let mut insert = db.prepare("INSERT INTO players (name) VALUES (?)")?;
/// insert.bind(1, "Player1")?.execute()?;
/// assert_eq!(db.last_insert_rowid()?, 1);
/// # Ok::<(), DatabaseError>(())
/// ```
pub struct Connection {
    inner: Option<rusqlite::Connection>,
    properties: Properties,
}

impl Connection {
    /// Create a disconnected instance; call [`Connection::connect`] to open it
    pub fn new(properties: Properties) -> Self {
        Self {
            inner: None,
            properties,
        }
    }

    /// Open (creating if missing) a read-write database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let filename = path
            .as_ref()
            .to_str()
            .ok_or_else(|| DatabaseError::connection("filename is not valid UTF-8"))?;
        let mut connection = Self::new(Properties::file(filename).create(true));
        connection.connect()?;
        Ok(connection)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let mut connection = Self::new(Properties::memory());
        connection.connect()?;
        Ok(connection)
    }

    /// Open the database described by the properties
    ///
    /// Fails if already connected. On failure the instance stays disconnected.
    pub fn connect(&mut self) -> Result<()> {
        if self.inner.is_some() {
            return Err(DatabaseError::connection("already connected"));
        }

        let filename = self.properties.resolved_filename()?;
        let flags = self.properties.open_flags();
        let conn = rusqlite::Connection::open_with_flags(filename, flags)?;

        debug!(filename, ?flags, "connected");
        self.inner = Some(conn);
        Ok(())
    }

    /// Close the database
    ///
    /// Closing is best-effort: a failure is logged and the handle is released
    /// anyway. Calling this while disconnected does nothing.
    pub fn disconnect(&mut self) {
        let Some(conn) = self.inner.take() else {
            return;
        };

        match conn.close() {
            Ok(()) => debug!(filename = %self.properties.filename, "disconnected"),
            Err((conn, err)) => {
                warn!(error = %err, "close failed; releasing handle");
                drop(conn);
            }
        }
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.inner.is_some()
    }

    /// Run one or more semicolon-separated statements that return no rows
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.inner()?.execute_batch(sql)?;
        Ok(())
    }

    /// Prepare a statement
    pub fn prepare(&self, query: &str) -> Result<Statement<'_>> {
        Statement::new(self, query)
    }

    /// Prepare a statement that will be kept and reused many times
    pub fn prepare_persistent(&self, query: &str) -> Result<Statement<'_>> {
        Statement::persistent(self, query)
    }

    /// Rowid of the most recent successful insert on this connection
    pub fn last_insert_rowid(&self) -> Result<i64> {
        Ok(self.inner()?.last_insert_rowid())
    }

    /// Properties the connection was configured with
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    fn inner(&self) -> Result<&rusqlite::Connection> {
        self.inner
            .as_ref()
            .ok_or_else(|| DatabaseError::connection("not connected"))
    }

    /// Raw engine handle, valid for as long as `self` is borrowed
    pub(crate) fn handle(&self) -> Result<*mut ffi::sqlite3> {
        let conn = self.inner()?;
        // SAFETY: the pointer is only used by statements borrowing `self`, and
        // `disconnect` needs `&mut self`, so the handle outlives every use.
        Ok(unsafe { conn.handle() })
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("properties", &self.properties)
            .field("connected", &self.is_connected())
            .finish()
    }
}
