//! Storage cells
//!
//! SQLite stores every value in one of five storage classes. [`Cell`] is the
//! owned form of such a value and [`StorageClass`] its fieldless tag.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Storage class reported by the engine for a parameter or column value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StorageClass {
    /// SQL NULL
    Null = 0,
    /// 64-bit signed integer
    Integer = 1,
    /// 64-bit IEEE floating point
    Real = 2,
    /// UTF-8 text
    Text = 3,
    /// Raw bytes
    Blob = 4,
}

impl StorageClass {
    /// Map a `sqlite3_column_type` code to a storage class
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            rusqlite::ffi::SQLITE_NULL => Some(StorageClass::Null),
            rusqlite::ffi::SQLITE_INTEGER => Some(StorageClass::Integer),
            rusqlite::ffi::SQLITE_FLOAT => Some(StorageClass::Real),
            rusqlite::ffi::SQLITE_TEXT => Some(StorageClass::Text),
            rusqlite::ffi::SQLITE_BLOB => Some(StorageClass::Blob),
            _ => None,
        }
    }

    /// Convert storage class to string representation
    pub fn to_str(&self) -> &'static str {
        match self {
            StorageClass::Null => "null",
            StorageClass::Integer => "integer",
            StorageClass::Real => "real",
            StorageClass::Text => "text",
            StorageClass::Blob => "blob",
        }
    }

    /// Check if the class is numeric (integer or real)
    pub fn is_numeric(&self) -> bool {
        matches!(self, StorageClass::Integer | StorageClass::Real)
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// A single parameter or column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Cell {
    /// Null value
    #[default]
    Null,
    /// 64-bit integer
    Integer(i64),
    /// 64-bit floating point
    Real(f64),
    /// UTF-8 text
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
}

impl Cell {
    /// Storage class of this cell
    pub fn storage_class(&self) -> StorageClass {
        match self {
            Cell::Null => StorageClass::Null,
            Cell::Integer(_) => StorageClass::Integer,
            Cell::Real(_) => StorageClass::Real,
            Cell::Text(_) => StorageClass::Text,
            Cell::Blob(_) => StorageClass::Blob,
        }
    }

    /// Check if the cell is null
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Get the integer payload without conversion
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the real payload without conversion
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Cell::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the text payload (zero-copy)
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get the blob payload (zero-copy)
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Cell::Blob(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NULL"),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Real(v) => write!(f, "{:?}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// A row snapshot (column name -> cell)
pub type CellRow = HashMap<String, Cell>;
