//! # Rust SQL Bridge
//!
//! A typed binding layer over SQLite. Values move between Rust types and the
//! engine's storage classes through compile-time bridges, and prepared
//! statements walk an explicit state machine that rejects misuse before it
//! reaches the engine.
//!
//! ## Features
//!
//! - **Compile-time bridges**: every bindable or readable type implements
//!   [`Encode`] / [`Decode`]; unsupported types fail to compile
//! - **Checked statements**: `Unbound`, `Bound`, `Row` and `Done` are tracked on
//!   every call; parameter and column indices are validated up front
//! - **Borrow-checked lifetimes**: a statement borrows its connection and a row
//!   borrows its statement, so dangling handles cannot be written
//! - **User blob types**: implement [`BlobStorage`] and read or write through
//!   [`Blob<T>`]
//! - **Optional bridges**: `chrono` date/time types and serde types via
//!   [`Json<T>`]
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! rust_sql_bridge = "0.1"
//! ```
//!
//! ### Basic Usage
//!
//! ```rust
//! use rust_sql_bridge::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let db = Connection::open_in_memory()?;
//!     db.execute_batch("CREATE TABLE players (id INTEGER PRIMARY KEY, name TEXT, cash REAL)")?;
//!
//!     let mut insert = db.prepare("INSERT INTO players (name, cash) VALUES (?, ?)")?;
//!     for i in 1..=10 {
//!         insert.bind(1, format!("Player{}", i))?.bind(2, i as f64 * 1000.0)?;
//!         insert.execute()?;
//!     }
//!
//!     let mut select = db.prepare("SELECT id, name, cash FROM players")?;
//!     let rows = select.execute_with(|row, _| {
//!         let (id, name, cash) = row.results::<(i64, String, f64)>(0)?;
//!         println!("{:?} {:?} {:?}", id, name, cash);
//!         Ok(())
//!     })?;
//!     assert_eq!(rows, 10);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Stepping by Hand
//!
//! ```rust
//! use rust_sql_bridge::prelude::*;
//!
//! let db = Connection::open_in_memory()?;
//! let mut stmt = db.prepare("SELECT ? * 2")?;
//!
//! stmt.bind(1, 21)?;
//! assert_eq!(stmt.state(), State::Bound);
//! assert!(stmt.step()?);
//! assert_eq!(stmt.result::<i32>(0)?, Some(42));
//! assert!(!stmt.step()?);
//! assert_eq!(stmt.state(), State::Done);
//!
//! stmt.reset(false);
//! assert_eq!(stmt.state(), State::Bound);
//! # Ok::<(), DatabaseError>(())
//! ```
//!
//! ## Project Structure
//!
//! ```text
//! rust_sql_bridge/
//! ├── src/
//! │   ├── core/                # Engine-independent types
//! │   │   ├── bridge/          # Encode/Decode traits and impls
//! │   │   ├── error.rs         # Error types
//! │   │   ├── properties.rs    # Connection properties
//! │   │   ├── state.rs         # Statement states
//! │   │   ├── value.rs         # Storage classes and cells
//! │   │   └── mod.rs
//! │   ├── backends/
//! │   │   ├── sqlite/          # Connection, Statement, Row
//! │   │   └── mod.rs
//! │   └── lib.rs
//! ├── demos/                   # Example programs
//! ├── tests/                   # Integration and property tests
//! ├── benches/                 # Criterion benchmarks
//! └── Cargo.toml
//! ```

/// Core types: bridges, errors, properties, states and cells
pub mod core;

/// Engine-facing connection and statement types
pub mod backends;

pub use crate::core::bridge;

/// Prelude for convenient imports
///
/// ```rust
/// use rust_sql_bridge::prelude::*;
///
/// fn main() -> Result<()> {
///     let db = Connection::open_in_memory()?;
///     let mut stmt = db.prepare("SELECT 1")?;
///     assert_eq!(stmt.execute()?, 1);
///     Ok(())
/// }
/// ```
pub mod prelude {
    pub use crate::core::{
        Blob, BlobStorage, Cell, DatabaseError, Decode, Encode, Null, Properties, Result, State,
        StorageClass,
    };

    #[cfg(feature = "json")]
    pub use crate::core::Json;

    pub use crate::backends::{Connection, Row, Statement};
}

// Re-export at root level for convenience
pub use crate::core::{
    Blob, BlobStorage, Cell, CellRow, ColumnSource, DatabaseError, Decode, DecodeRow, Encode,
    EncodeMany, Null, ParamSink, Properties, Result, State, StorageClass,
};

#[cfg(feature = "json")]
pub use crate::core::Json;

pub use backends::{Connection, ParamIndex, Row, Statement};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let state = State::default();
        assert_eq!(state.to_str(), "unbound");
        assert!(!state.has_row());
        assert_eq!(Properties::memory().filename, "");
    }

    #[test]
    fn test_bridge_path() {
        let cell = bridge::encode(&true).unwrap();
        assert_eq!(cell, Cell::Integer(1));
        assert_eq!(bridge::decode::<bool>(&cell), Some(true));
    }
}
