//! Connection properties
//!
//! [`Properties`] describes how a connection is opened. It can be built in code
//! or deserialized from configuration (all fields are optional in serialized
//! form and fall back to [`Properties::default`]).

use super::error::{DatabaseError, Result};
use rusqlite::OpenFlags;
use serde::{Deserialize, Serialize};

/// Filename SQLite treats as a private in-memory database
pub const MEMORY_FILENAME: &str = ":memory:";

/// Connection details
///
/// # Examples
///
/// ```
/// use rust_sql_bridge::Properties;
///
/// // In-memory database
/// let props = Properties::memory();
///
/// // On-disk database, created if missing
/// let props = Properties::file("players.db").create(true);
///
/// // Override just one field
/// let props = Properties {
///     read_only: true,
///     ..Properties::file("players.db")
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Properties {
    /// Database filename (UTF-8), or a URI when `uri` is set
    pub filename: String,

    /// Open read-only instead of read-write
    ///
    /// Default: false
    pub read_only: bool,

    /// Open as an in-memory database
    ///
    /// With an empty filename the database is private to the connection.
    ///
    /// Default: false
    pub memory: bool,

    /// Create the database file if it does not exist
    ///
    /// Default: false
    pub create: bool,

    /// Interpret the filename as a URI
    ///
    /// Default: false
    pub uri: bool,

    /// Serialized threading mode (full mutex) instead of multi-thread mode
    ///
    /// Default: false
    pub synchronized: bool,

    /// Enable shared cache mode
    ///
    /// Default: false
    pub shared: bool,
}

impl Properties {
    /// Properties for a private in-memory database
    pub fn memory() -> Self {
        Self {
            memory: true,
            create: true,
            ..Self::default()
        }
    }

    /// Properties for an existing on-disk database
    pub fn file<S: Into<String>>(filename: S) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// Set the filename
    pub fn filename<S: Into<String>>(mut self, filename: S) -> Self {
        self.filename = filename.into();
        self
    }

    /// Set read-only mode
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set in-memory mode
    pub fn in_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }

    /// Set whether a missing database is created
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Set URI filename interpretation
    pub fn uri(mut self, uri: bool) -> Self {
        self.uri = uri;
        self
    }

    /// Set serialized threading mode
    pub fn synchronized(mut self, synchronized: bool) -> Self {
        self.synchronized = synchronized;
        self
    }

    /// Set shared cache mode
    pub fn shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    /// Encode the properties as engine open flags
    pub fn open_flags(&self) -> OpenFlags {
        let mut flags = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };

        if self.create {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }
        if self.memory {
            flags |= OpenFlags::SQLITE_OPEN_MEMORY;
        }
        if self.uri {
            flags |= OpenFlags::SQLITE_OPEN_URI;
        }
        flags |= if self.synchronized {
            OpenFlags::SQLITE_OPEN_FULL_MUTEX
        } else {
            OpenFlags::SQLITE_OPEN_NO_MUTEX
        };
        flags |= if self.shared {
            OpenFlags::SQLITE_OPEN_SHARED_CACHE
        } else {
            OpenFlags::SQLITE_OPEN_PRIVATE_CACHE
        };

        flags
    }

    /// Filename handed to the engine
    ///
    /// An in-memory database without a filename opens `:memory:`; any other
    /// empty filename is rejected.
    pub fn resolved_filename(&self) -> Result<&str> {
        if !self.filename.is_empty() {
            Ok(&self.filename)
        } else if self.memory {
            Ok(MEMORY_FILENAME)
        } else {
            Err(DatabaseError::connection("expected filename"))
        }
    }
}
