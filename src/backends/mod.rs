//! Database backend implementations
//!
//! This module contains the engine-facing side of the binding layer.

pub mod sqlite;

pub use sqlite::{Connection, ParamIndex, Row, Statement};
