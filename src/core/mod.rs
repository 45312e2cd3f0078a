//! Core binding types
//!
//! This module provides the engine-independent building blocks: error types,
//! storage cells, the value bridge, connection properties and statement states.

pub mod bridge;
pub mod error;
pub mod properties;
pub mod state;
pub mod value;

// Re-export commonly used types
pub use bridge::{Blob, BlobStorage, ColumnSource, Decode, DecodeRow, Encode, EncodeMany, Null, ParamSink};
#[cfg(feature = "json")]
pub use bridge::Json;
pub use error::{DatabaseError, Result};
pub use properties::Properties;
pub use state::State;
pub use value::{Cell, CellRow, StorageClass};
