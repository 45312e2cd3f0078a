//! SQLite backend
//!
//! [`Connection`] owns the engine handle, [`Statement`] walks a prepared query
//! through its states and [`Row`] reads the row the statement is positioned on.

mod connection;
mod execute;
mod raw;
mod row;
mod statement;

pub use connection::Connection;
pub use row::Row;
pub use statement::{ParamIndex, Statement};
